//! # Rebind engine
//!
//! Edits never mutate a tree; they produce a new generation. Before an edit
//! every selected node is tagged in a [`TrackedSnapshot`]. After the edit each
//! frame of the old stack is resolved to its counterpart in the new
//! generation and the rebuilt stack replaces the old one in a single step.
//!
//! ```text
//! prepare_snapshot()            replace_and_rebind(old, new)
//!   root ──track(selected)──▶ snapshot ──replace──▶ new root
//!                                 │                   │
//!                                 └── counterpart ────┴─▶ new stack
//! ```

use crate::config::RelocationPolicy;
use crate::errors::{NavigatorError, NavigatorResult};
use crate::navigator::Navigator;
use crate::selection::Selection;
use rosewood_parser::{ensure_tagged, replace, resolve_by_tag, track, GreenNode, SyntaxNode};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Outcome of a rebind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebindReport {
    /// Generation number of the new tree
    pub generation: u64,
    /// Selected nodes without a counterpart in the new tree
    pub dropped: usize,
    /// Node count of every surviving frame, oldest first
    pub frame_sizes: Vec<usize>,
}

impl Navigator {
    /// Tag every selected node so it can be found again after the next edit
    #[instrument(skip(self), fields(frames = self.stack.len()))]
    pub fn prepare_snapshot(&mut self) -> NavigatorResult<()> {
        let root = self
            .stack
            .root()
            .cloned()
            .ok_or_else(|| NavigatorError::invalid_state("no frame of the selection stack holds a tree root"))?;

        let selected = self.stack.all_selected_nodes();
        let snapshot = track(&root, &selected)?;
        debug!(
            tracked = snapshot.tracked_count(),
            generation = snapshot.root().generation(),
            "Prepared tracked snapshot"
        );

        self.snapshot = Some(snapshot);
        Ok(())
    }

    /// Replace the current node `old` with `new` and move the whole selection
    /// stack into the resulting tree generation.
    ///
    /// Requires a snapshot from [`Navigator::prepare_snapshot`], consumed on
    /// success. On failure the session is left as it was.
    #[instrument(skip(self, old, new), fields(kind = %old.kind(), id = %old.id()))]
    pub fn replace_and_rebind(
        &mut self,
        old: &SyntaxNode,
        new: Arc<GreenNode>,
    ) -> NavigatorResult<RebindReport> {
        match self.stack.peek()? {
            Selection::Single(top) if top == old => {}
            _ => {
                return Err(NavigatorError::invalid_state(format!(
                    "{} `{}` is not the current selection; only the current node can be replaced",
                    old.kind(),
                    old.name()
                )))
            }
        }
        let snapshot = self.snapshot.as_ref().ok_or_else(|| {
            NavigatorError::invalid_state("no tracked snapshot; call prepare_snapshot before editing")
        })?;
        if old.kind() != new.kind {
            return Err(NavigatorError::unsupported(format!(
                "cannot replace {} `{}` with {} `{}`",
                old.kind(),
                old.name(),
                new.kind,
                new.name
            )));
        }

        let (new, tag) = ensure_tagged(new);
        let target = snapshot.current_node(old).ok_or_else(|| {
            NavigatorError::invalid_state(format!(
                "{} `{}` was not tracked by the snapshot",
                old.kind(),
                old.name()
            ))
        })?;
        reject_foreign_ids(&target, &new)?;
        let new_root = replace(snapshot.root(), &target, new)?;

        let mut frames = Vec::with_capacity(self.stack.len());
        let mut dropped = 0;
        for frame in self.stack.all_selected_frames() {
            let relocated: Vec<SyntaxNode> = frame
                .nodes()
                .iter()
                .filter_map(|node| {
                    if matches!(frame, Selection::Single(_)) && node == old {
                        resolve_by_tag(&new_root, &tag)
                    } else {
                        // Nodes rebuilt from an untagged green keep their id
                        snapshot
                            .counterpart(&new_root, node)
                            .or_else(|| new_root.find_by_id(node.id()))
                    }
                })
                .collect();
            dropped += frame.len() - relocated.len();

            match (frame, relocated.len()) {
                (_, 0) => {}
                (Selection::Single(_), _) => frames.extend(relocated.into_iter().map(Selection::Single)),
                (Selection::Multiple(_), _) => frames.push(Selection::Multiple(relocated)),
            }
        }

        if dropped > 0 {
            match self.config().relocation {
                RelocationPolicy::Strict => {
                    return Err(NavigatorError::RelocationLost {
                        kind: old.kind(),
                        dropped,
                    })
                }
                RelocationPolicy::Lenient => {
                    warn!(dropped, "Selected nodes have no counterpart after the edit; dropping them")
                }
            }
        }

        let report = RebindReport {
            generation: new_root.generation(),
            dropped,
            frame_sizes: frames.iter().map(Selection::len).collect(),
        };
        self.stack.replace_frames(frames);
        self.snapshot = None;

        debug!(
            generation = report.generation,
            frames = report.frame_sizes.len(),
            "Rebound selection stack"
        );
        Ok(report)
    }

    /// Snapshot, replace the current node and rebind in one step
    pub fn replace_current(&mut self, new: Arc<GreenNode>) -> NavigatorResult<RebindReport> {
        let old = self.current_node()?;
        self.transaction(|nav| {
            nav.prepare_snapshot()?;
            nav.replace_and_rebind(&old, new)
        })
    }
}

/// Every id in `new` must be unique and either fresh or taken from the
/// subtree of `target` it replaces
fn reject_foreign_ids(target: &SyntaxNode, new: &Arc<GreenNode>) -> NavigatorResult<()> {
    let mut seen = HashSet::new();
    let mut pending = vec![new];
    while let Some(green) = pending.pop() {
        let reused_elsewhere = target
            .find_by_id(green.id)
            .map_or(false, |existing| !target.contains(&existing));
        if !seen.insert(green.id) || reused_elsewhere {
            return Err(NavigatorError::argument(
                "new",
                format!(
                    "{} `{}` reuses id {} of another node in the tree",
                    green.kind, green.name, green.id
                ),
            ));
        }
        pending.extend(green.children.iter());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosewood_parser::SyntaxKind;

    const SOURCE: &str = r#"
        class T {
            int P { get; set; }
            void A() { }
            void B() { }
        }
    "#;

    fn select_member(nav: &mut Navigator, name: &str) -> SyntaxNode {
        let class = nav.root().unwrap().children().next().unwrap();
        nav.push_node(class.clone()).unwrap();
        let member = class.children().find(|c| c.name() == name).unwrap();
        nav.push_node(member.clone()).unwrap();
        member
    }

    #[test]
    fn test_replace_requires_snapshot() {
        let mut nav = Navigator::attach(SOURCE).unwrap();
        let p = select_member(&mut nav, "P");
        let err = nav
            .replace_and_rebind(&p, Arc::new(p.green().with_name("Q")))
            .unwrap_err();
        assert!(matches!(err, NavigatorError::InvalidState(_)));
    }

    #[test]
    fn test_replace_requires_current_selection() {
        let mut nav = Navigator::attach(SOURCE).unwrap();
        let p = select_member(&mut nav, "P");
        let class = p.parent().unwrap();
        nav.prepare_snapshot().unwrap();

        let err = nav
            .replace_and_rebind(&class, Arc::new(class.green().with_name("U")))
            .unwrap_err();
        assert!(matches!(err, NavigatorError::InvalidState(_)));
        assert!(nav.has_snapshot());
    }

    #[test]
    fn test_replace_rejects_kind_mismatch() {
        let mut nav = Navigator::attach(SOURCE).unwrap();
        let p = select_member(&mut nav, "P");
        let a = p.parent().unwrap().children().find(|c| c.name() == "A").unwrap();
        nav.prepare_snapshot().unwrap();

        let err = nav
            .replace_and_rebind(&p, Arc::clone(a.green()))
            .unwrap_err();
        assert!(matches!(err, NavigatorError::UnsupportedOperation(_)));
        assert_eq!(nav.current_node().unwrap(), p);
        assert_eq!(nav.root().unwrap(), p.root());
    }

    #[test]
    fn test_rebind_moves_every_frame() {
        let mut nav = Navigator::attach(SOURCE).unwrap();
        let p = select_member(&mut nav, "P");
        let old_generation = p.generation();

        nav.prepare_snapshot().unwrap();
        let report = nav
            .replace_and_rebind(&p, Arc::new(p.green().with_name("Q")))
            .unwrap();

        assert_eq!(report.dropped, 0);
        assert_eq!(report.frame_sizes, vec![1, 1, 1]);
        assert!(!nav.has_snapshot());

        let nodes = nav.stack().all_selected_nodes();
        assert!(nodes.iter().all(|n| n.generation() == report.generation));
        assert_ne!(report.generation, old_generation);
        assert_eq!(nodes[1].name(), "T");
        assert_eq!(nodes[2].name(), "Q");
        assert_eq!(nodes[2].kind(), SyntaxKind::Property);
    }

    #[test]
    fn test_untagged_descendant_survives_ancestor_edit() {
        let mut nav = Navigator::attach(SOURCE).unwrap();
        let p = select_member(&mut nav, "P");
        let class = p.parent().unwrap();
        nav.push_node(class.clone()).unwrap();
        assert!(p.green().tags.is_empty());

        nav.prepare_snapshot().unwrap();
        let report = nav
            .replace_and_rebind(&class, Arc::new(class.green().with_name("U")))
            .unwrap();

        assert_eq!(report.dropped, 0);
        let names: Vec<_> = nav
            .stack()
            .all_selected_nodes()
            .iter()
            .map(|n| n.name().to_string())
            .collect();
        assert_eq!(names, vec!["", "U", "P", "U"]);
    }

    #[test]
    fn test_replace_rejects_reused_sibling_id() {
        let mut nav = Navigator::attach(SOURCE).unwrap();
        let a = select_member(&mut nav, "A");
        let b = a.parent().unwrap().children().find(|c| c.name() == "B").unwrap();
        let before = nav.stack().all_selected_frames().to_vec();
        nav.prepare_snapshot().unwrap();

        let err = nav
            .replace_and_rebind(&a, Arc::clone(b.green()))
            .unwrap_err();
        assert!(matches!(err, NavigatorError::Argument { .. }));
        assert_eq!(nav.stack().all_selected_frames(), before.as_slice());
        assert!(nav.render().unwrap().contains("void A() { }"));
    }

    #[test]
    fn test_snapshot_is_consumed() {
        let mut nav = Navigator::attach(SOURCE).unwrap();
        let p = select_member(&mut nav, "P");
        nav.prepare_snapshot().unwrap();
        nav.replace_and_rebind(&p, Arc::new(p.green().with_name("Q")))
            .unwrap();

        let q = nav.current_node().unwrap();
        let err = nav
            .replace_and_rebind(&q, Arc::new(q.green().with_name("R")))
            .unwrap_err();
        assert!(matches!(err, NavigatorError::InvalidState(_)));
    }

    #[test]
    fn test_prepare_without_root_frame_fails() {
        let mut nav = Navigator::attach(SOURCE).unwrap();
        let class = nav.root().unwrap().children().next().unwrap();
        nav.set_head(class).unwrap();
        assert!(matches!(
            nav.prepare_snapshot(),
            Err(NavigatorError::InvalidState(_))
        ));
    }
}
