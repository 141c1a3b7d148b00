//! Specialized navigators. Each one borrows the session, checks that the
//! current selection is of its kind and offers the finders that make sense
//! there. Finders push what they find and hand over to the next navigator.

mod compilation_unit;
mod member;
mod namespace;
mod type_nav;

pub use compilation_unit::CompilationUnitNavigator;
pub use member::MemberNavigator;
pub use namespace::NamespaceNavigator;
pub use type_nav::TypeNavigator;

use crate::errors::{NavigatorError, NavigatorResult};
use crate::guards::require_not_blank;
use crate::navigator::Navigator;
use rosewood_common::collect_types;
use rosewood_parser::{SyntaxKind, SyntaxNode};

/// Make `node` the current selection unless it already is
fn anchor(nav: &mut Navigator, node: &SyntaxNode) -> NavigatorResult<()> {
    if nav.current_node().ok().as_ref() != Some(node) {
        nav.push_node(node.clone())?;
    }
    Ok(())
}

/// First type declaration named `name` below `scope`
fn find_type(scope: &SyntaxNode, kind: Option<SyntaxKind>, name: &str) -> NavigatorResult<SyntaxNode> {
    require_not_blank(name, "name")?;
    collect_types(scope, kind)
        .into_iter()
        .find(|node| node.name() == name)
        .ok_or_else(|| {
            let what = kind.map_or_else(|| "type".to_string(), |k| k.to_string());
            NavigatorError::not_found(format!(
                "{} `{}` in {} `{}`",
                what,
                name,
                scope.kind(),
                scope.name()
            ))
        })
}
