//! # Composers
//!
//! The mutation layer. A composer borrows the session, checks its
//! preconditions with the guard helpers and applies each edit as a single
//! replace-and-rebind of the smallest enclosing node. Operations return the
//! composer for chaining; a failed operation leaves the session untouched.
//!
//! Container composers (compilation unit, namespace, type) resolve a pivot
//! to a container plus an optional anchor:
//!
//! ```text
//! current = container           → (container, none)
//! current = child of container  → (container, child)
//! ```
//!
//! New declarations land right after the anchor, or at the end of the
//! container, and become the current selection.

mod compilation_unit;
mod member;
mod namespace;
mod type_composer;

pub use compilation_unit::CompilationUnitComposer;
pub use member::MemberComposer;
pub use namespace::NamespaceComposer;
pub use type_composer::TypeComposer;

use crate::errors::{NavigatorError, NavigatorResult};
use crate::guards::{require_immediate_kind, require_not_blank};
use crate::handlers::KindFilter;
use crate::navigator::Navigator;
use crate::rebind::RebindReport;
use rosewood_parser::{
    ensure_tagged, resolve_by_tag, validate_identifier, GreenNode, RelocationTag, SyntaxNode,
};
use std::sync::Arc;
use tracing::debug;

/// Where a composer anchors relative to the current selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pivot {
    /// The current node, or for container composers its parent
    #[default]
    Immediate,
    /// The node enclosing the current one
    Parent,
}

/// A container and the selected child of it, if any
#[derive(Debug, Clone)]
pub(crate) struct PivotNodes {
    pub container: SyntaxNode,
    pub anchor: Option<SyntaxNode>,
}

impl PivotNodes {
    /// Child index right after the anchor, or the end of the container
    pub fn insertion_index(&self) -> usize {
        let children = &self.container.green().children;
        self.anchor
            .as_ref()
            .and_then(|anchor| {
                children
                    .iter()
                    .position(|child| Arc::ptr_eq(child, anchor.green()))
            })
            .map_or(children.len(), |position| position + 1)
    }
}

/// What is selected once a container edit is rebound
pub(crate) enum Focus {
    /// The child that was selected before the edit, if it still exists
    Anchor,
    /// The node carrying this tag
    Tagged(RelocationTag),
}

/// Make the container named by `pivot` current, pushing its parent for
/// `Pivot::Parent`
pub(crate) fn enter_pivot(
    nav: &mut Navigator,
    pivot: Pivot,
    filter: KindFilter,
) -> NavigatorResult<()> {
    if pivot == Pivot::Parent {
        let current = nav.current_node()?;
        let parent = current.parent();
        let parent = require_immediate_kind(parent.as_ref(), filter)?.clone();
        nav.push_node(parent)?;
    }
    resolve_pivot(nav, filter).map(|_| ())
}

pub(crate) fn resolve_pivot(nav: &Navigator, filter: KindFilter) -> NavigatorResult<PivotNodes> {
    let current = nav.current_node()?;
    if filter.matches(current.kind()) {
        return Ok(PivotNodes {
            container: current,
            anchor: None,
        });
    }
    match current.parent() {
        Some(parent) if filter.matches(parent.kind()) => Ok(PivotNodes {
            container: parent,
            anchor: Some(current),
        }),
        _ => Err(NavigatorError::invalid_action(format!(
            "neither {} `{}` nor its parent is {}",
            current.kind(),
            current.name(),
            filter
        ))),
    }
}

/// Replace the pivot's container with `updated` and rebind the stack
pub(crate) fn rewrite_container(
    nav: &mut Navigator,
    pivot: &PivotNodes,
    updated: Arc<GreenNode>,
    focus: Focus,
) -> NavigatorResult<RebindReport> {
    nav.transaction(|nav| {
        if pivot.anchor.is_some() {
            nav.pop()?;
        }
        if nav.current_node().ok().as_ref() != Some(&pivot.container) {
            nav.push_node(pivot.container.clone())?;
        }
        nav.prepare_snapshot()?;
        let report = nav.replace_and_rebind(&pivot.container, updated)?;

        match focus {
            Focus::Anchor => {
                if let Some(anchor) = &pivot.anchor {
                    let container = nav.current_node()?;
                    let found = container.children().find(|c| c.id() == anchor.id());
                    if let Some(node) = found {
                        nav.push_node(node)?;
                    }
                }
            }
            Focus::Tagged(tag) => {
                let node = resolve_by_tag(&nav.root()?, &tag).ok_or_else(|| {
                    NavigatorError::invalid_state("inserted declaration is missing after the edit")
                })?;
                nav.push_node(node)?;
            }
        }
        Ok(report)
    })
}

/// Insert `child` at `index` of the pivot's container and select it
pub(crate) fn insert_child(
    nav: &mut Navigator,
    pivot: &PivotNodes,
    index: usize,
    child: Arc<GreenNode>,
) -> NavigatorResult<RebindReport> {
    let (child, tag) = ensure_tagged(child);
    debug!(
        container = %pivot.container.name(),
        kind = %child.kind,
        name = %child.name,
        index,
        "Inserting declaration"
    );
    let updated = Arc::new(pivot.container.green().with_child_inserted(index, child));
    rewrite_container(nav, pivot, updated, Focus::Tagged(tag))
}

/// Dotted name made of identifiers, such as `System.Collections`
pub(crate) fn validate_qualified_name(name: &str) -> NavigatorResult<()> {
    require_not_blank(name, "name")?;
    for segment in name.split('.') {
        validate_identifier(segment)?;
    }
    Ok(())
}

/// Delete the pivot's container from its parent
pub(crate) fn delete_container(nav: &mut Navigator, pivot: &PivotNodes) -> NavigatorResult<()> {
    let parent = pivot.container.parent().ok_or_else(|| {
        NavigatorError::invalid_action(format!(
            "cannot delete {} `{}`: it has no parent",
            pivot.container.kind(),
            pivot.container.name()
        ))
    })?;
    nav.transaction(|nav| {
        if pivot.anchor.is_some() {
            nav.pop()?;
        }
        if nav.current_node().ok().as_ref() != Some(&pivot.container) {
            nav.push_node(pivot.container.clone())?;
        }
        nav.delete_selected(parent.kind()).map(|_| ())
    })
}
