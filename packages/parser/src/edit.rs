//! # Structural edits
//!
//! Non-mutating edit primitives over [`SyntaxNode`] generations:
//!
//! - [`replace`]: swap one node, rebuilding only the path up to the root
//! - [`remove`]: a parent copy without some of its children
//! - [`track`]: tag nodes so they can be found again after later edits
//! - [`ensure_tagged`] / [`resolve_by_tag`]: tag a freshly built node and find
//!   it again in a new generation

use crate::ast::{GreenNode, RelocationTag, SyntaxKind};
use crate::id_generator::NodeId;
use crate::tree::{SyntaxNode, SyntaxTree};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("{kind} #{id} does not belong to the edited tree generation")]
    ForeignNode { id: NodeId, kind: SyntaxKind },

    #[error("{kind} #{id} is not the root of its tree")]
    NotRoot { id: NodeId, kind: SyntaxKind },

    #[error("{member_kind} #{member} is not a child of {parent_kind} #{parent}")]
    NotAChild {
        member: NodeId,
        member_kind: SyntaxKind,
        parent: NodeId,
        parent_kind: SyntaxKind,
    },
}

impl TreeError {
    fn foreign(node: &SyntaxNode) -> Self {
        TreeError::ForeignNode {
            id: node.id(),
            kind: node.kind(),
        }
    }
}

/// Replace `old` with `new` inside the generation rooted at `root`.
///
/// Returns the root of a new generation. Subtrees off the edited path are
/// shared with the old generation.
pub fn replace(
    root: &SyntaxNode,
    old: &SyntaxNode,
    new: Arc<GreenNode>,
) -> Result<SyntaxNode, TreeError> {
    if !root.is_root() {
        return Err(TreeError::NotRoot {
            id: root.id(),
            kind: root.kind(),
        });
    }
    if !root.same_generation(old) {
        return Err(TreeError::foreign(old));
    }

    let mut current_old = Arc::clone(old.green());
    let mut current_new = new;
    for ancestor in old.ancestors() {
        let rebuilt = ancestor.green().with_child_replaced(&current_old, current_new);
        current_old = Arc::clone(ancestor.green());
        current_new = Arc::new(rebuilt);
    }

    Ok(SyntaxTree::build(current_new))
}

/// Copy of `parent` without `members`.
///
/// Sibling order is preserved. Every member must be a direct child of `parent`.
pub fn remove(parent: &SyntaxNode, members: &[SyntaxNode]) -> Result<Arc<GreenNode>, TreeError> {
    for member in members {
        if member.parent().as_ref() != Some(parent) {
            return Err(TreeError::NotAChild {
                member: member.id(),
                member_kind: member.kind(),
                parent: parent.id(),
                parent_kind: parent.kind(),
            });
        }
    }

    let children = parent
        .green()
        .children
        .iter()
        .filter(|child| !members.iter().any(|m| Arc::ptr_eq(m.green(), child)))
        .cloned()
        .collect();

    Ok(Arc::new(parent.green().with_children(children)))
}

/// Make sure `green` carries a relocation tag, reusing the first one it has
pub fn ensure_tagged(green: Arc<GreenNode>) -> (Arc<GreenNode>, RelocationTag) {
    match green.first_tag() {
        Some(tag) => (green, tag),
        None => {
            let tag = RelocationTag::new();
            (Arc::new(green.with_tag(tag)), tag)
        }
    }
}

/// Find the node carrying `tag` in the generation of `root`
pub fn resolve_by_tag(root: &SyntaxNode, tag: &RelocationTag) -> Option<SyntaxNode> {
    root.find_by_tag(tag)
}

/// A whole-tree capture in which a set of nodes carries relocation tags
#[derive(Debug, Clone)]
pub struct TrackedSnapshot {
    root: SyntaxNode,
    tags: HashMap<NodeId, RelocationTag>,
}

impl TrackedSnapshot {
    /// Root of the tagged generation
    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    /// Tag assigned to `original`, if it was tracked
    pub fn tag_of(&self, original: &SyntaxNode) -> Option<RelocationTag> {
        self.tags.get(&original.id()).copied()
    }

    pub fn tracked_count(&self) -> usize {
        self.tags.len()
    }

    /// Counterpart of `original` inside the snapshot itself
    pub fn current_node(&self, original: &SyntaxNode) -> Option<SyntaxNode> {
        self.counterpart(&self.root, original)
    }

    /// Counterpart of `original` in a generation derived from the snapshot
    pub fn counterpart(&self, root: &SyntaxNode, original: &SyntaxNode) -> Option<SyntaxNode> {
        let tag = self.tags.get(&original.id())?;
        root.find_by_tag(tag)
    }
}

/// Tag every node of `nodes` inside the generation rooted at `root`.
///
/// Nodes that already carry a tag keep it. Subtrees without tracked nodes are
/// shared, not copied.
pub fn track(root: &SyntaxNode, nodes: &[SyntaxNode]) -> Result<TrackedSnapshot, TreeError> {
    if !root.is_root() {
        return Err(TreeError::NotRoot {
            id: root.id(),
            kind: root.kind(),
        });
    }

    let mut tags = HashMap::new();
    let mut fresh: HashMap<NodeId, RelocationTag> = HashMap::new();
    for node in nodes {
        if !root.same_generation(node) {
            return Err(TreeError::foreign(node));
        }
        if tags.contains_key(&node.id()) {
            continue;
        }
        let tag = match node.green().first_tag() {
            Some(tag) => tag,
            None => {
                let tag = RelocationTag::new();
                fresh.insert(node.id(), tag);
                tag
            }
        };
        tags.insert(node.id(), tag);
    }

    let mut on_path: HashSet<NodeId> = HashSet::new();
    for id in fresh.keys() {
        if let Some(node) = root.find_by_id(*id) {
            on_path.insert(node.id());
            on_path.extend(node.ancestors().map(|a| a.id()));
        }
    }

    let green = tag_subtree(root.green(), &fresh, &on_path);
    Ok(TrackedSnapshot {
        root: SyntaxTree::build(green),
        tags,
    })
}

fn tag_subtree(
    green: &Arc<GreenNode>,
    fresh: &HashMap<NodeId, RelocationTag>,
    on_path: &HashSet<NodeId>,
) -> Arc<GreenNode> {
    if !on_path.contains(&green.id) {
        return Arc::clone(green);
    }

    let children = green
        .children
        .iter()
        .map(|child| tag_subtree(child, fresh, on_path))
        .collect();
    let mut node = green.with_children(children);
    if let Some(tag) = fresh.get(&green.id) {
        node = node.with_tag(*tag);
    }
    Arc::new(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SyntaxKind;
    use crate::parse;

    const SOURCE: &str = r#"
        public class T {
            public int P { get; set; }
            public void A() { }
            public void B() { }
            public void C() { }
        }
    "#;

    fn member(root: &SyntaxNode, name: &str) -> SyntaxNode {
        root.descendants()
            .into_iter()
            .find(|n| n.name() == name)
            .unwrap()
    }

    #[test]
    fn test_replace_shares_untouched_subtrees() {
        let root = parse(SOURCE).unwrap();
        let p = member(&root, "P");
        let a = member(&root, "A");

        let renamed = Arc::new(p.green().with_name("Q"));
        let new_root = replace(&root, &p, renamed).unwrap();

        assert!(new_root.is_root());
        assert!(!new_root.same_generation(&root));
        let new_a = member(&new_root, "A");
        assert!(Arc::ptr_eq(new_a.green(), a.green()));
        assert_eq!(member(&new_root, "Q").id(), p.id());
        assert!(!Arc::ptr_eq(new_root.green(), root.green()));
    }

    #[test]
    fn test_replace_rejects_foreign_node() {
        let root = parse(SOURCE).unwrap();
        let other = parse(SOURCE).unwrap();
        let p = member(&other, "P");
        let err = replace(&root, &p, Arc::clone(p.green())).unwrap_err();
        assert!(matches!(err, TreeError::ForeignNode { .. }));
    }

    #[test]
    fn test_remove_preserves_sibling_order() {
        let root = parse(SOURCE).unwrap();
        let class = member(&root, "T");
        let b = member(&root, "B");

        let without_b = remove(&class, &[b]).unwrap();
        let names: Vec<_> = without_b.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["P", "A", "C"]);
    }

    #[test]
    fn test_remove_rejects_non_children() {
        let root = parse(SOURCE).unwrap();
        let p = member(&root, "P");
        let err = remove(&root, &[p]).unwrap_err();
        assert!(matches!(
            err,
            TreeError::NotAChild {
                parent_kind: SyntaxKind::CompilationUnit,
                ..
            }
        ));
    }

    #[test]
    fn test_track_and_resolve() {
        let root = parse(SOURCE).unwrap();
        let a = member(&root, "A");
        let c = member(&root, "C");
        let snapshot = track(&root, &[root.clone(), a.clone(), c.clone()]).unwrap();

        assert_eq!(snapshot.tracked_count(), 3);
        let tracked_a = snapshot.current_node(&a).unwrap();
        assert_eq!(tracked_a.id(), a.id());
        assert!(tracked_a.same_generation(snapshot.root()));

        // Edit inside the snapshot, then resolve the untouched node in the result
        let renamed = Arc::new(tracked_a.green().with_name("A2"));
        let new_root = replace(snapshot.root(), &tracked_a, renamed).unwrap();
        let new_c = snapshot.counterpart(&new_root, &c).unwrap();
        assert_eq!(new_c.name(), "C");
        assert!(new_c.same_generation(&new_root));
        assert_eq!(snapshot.counterpart(&new_root, &a).unwrap().name(), "A2");
    }

    #[test]
    fn test_track_is_idempotent() {
        let root = parse(SOURCE).unwrap();
        let a = member(&root, "A");
        let first = track(&root, &[a.clone()]).unwrap();
        let tag = first.tag_of(&a).unwrap();

        let tracked_a = first.current_node(&a).unwrap();
        let second = track(first.root(), &[tracked_a.clone(), tracked_a]).unwrap();
        assert_eq!(second.tracked_count(), 1);
        assert_eq!(second.tag_of(&a), Some(tag));
    }

    #[test]
    fn test_ensure_tagged_reuses_existing_tag() {
        let root = parse(SOURCE).unwrap();
        let p = member(&root, "P");
        let (tagged, tag) = ensure_tagged(Arc::clone(p.green()));
        let (again, same) = ensure_tagged(Arc::clone(&tagged));
        assert_eq!(tag, same);
        assert!(Arc::ptr_eq(&tagged, &again));
    }
}
