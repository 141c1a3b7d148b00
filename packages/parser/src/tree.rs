//! # Tree generations
//!
//! A [`SyntaxTree`] is one immutable generation of a document: a root
//! [`GreenNode`] plus lookup tables for parents, ids and relocation tags.
//! Generations share every subtree an edit did not touch.
//!
//! A [`SyntaxNode`] is a handle to one green node *inside one generation*.
//! Two handles are equal only when they point at the same green node of the
//! same generation; the same logical node in a newer generation is a different
//! handle and has to be resolved again.

use crate::ast::{GreenNode, RelocationTag, SyntaxKind};
use crate::id_generator::NodeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// One immutable generation of a document
pub struct SyntaxTree {
    root: Arc<GreenNode>,
    generation: u64,
    nodes: HashMap<NodeId, Arc<GreenNode>>,
    parents: HashMap<NodeId, NodeId>,
    tagged: HashMap<RelocationTag, NodeId>,
}

impl SyntaxTree {
    /// Index `root` as a new generation and return a handle to it
    pub fn build(root: Arc<GreenNode>) -> SyntaxNode {
        let mut tree = SyntaxTree {
            root: Arc::clone(&root),
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            nodes: HashMap::new(),
            parents: HashMap::new(),
            tagged: HashMap::new(),
        };
        tree.index(&root, None);

        SyntaxNode {
            tree: Arc::new(tree),
            green: root,
        }
    }

    fn index(&mut self, green: &Arc<GreenNode>, parent: Option<NodeId>) {
        self.nodes.insert(green.id, Arc::clone(green));
        if let Some(parent) = parent {
            self.parents.insert(green.id, parent);
        }
        // Preorder: the first node carrying a tag wins
        for tag in &green.tags {
            self.tagged.entry(*tag).or_insert(green.id);
        }
        for child in &green.children {
            self.index(child, Some(green.id));
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("generation", &self.generation)
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

/// Handle to a node inside one tree generation
#[derive(Clone)]
pub struct SyntaxNode {
    tree: Arc<SyntaxTree>,
    green: Arc<GreenNode>,
}

impl SyntaxNode {
    fn in_tree(&self, green: Arc<GreenNode>) -> SyntaxNode {
        SyntaxNode {
            tree: Arc::clone(&self.tree),
            green,
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.green.kind
    }

    pub fn id(&self) -> NodeId {
        self.green.id
    }

    pub fn name(&self) -> &str {
        &self.green.name
    }

    pub fn green(&self) -> &Arc<GreenNode> {
        &self.green
    }

    pub fn tree(&self) -> &Arc<SyntaxTree> {
        &self.tree
    }

    pub fn generation(&self) -> u64 {
        self.tree.generation
    }

    pub fn is_root(&self) -> bool {
        Arc::ptr_eq(&self.green, &self.tree.root)
    }

    /// Whether both handles belong to the same tree generation
    pub fn same_generation(&self, other: &SyntaxNode) -> bool {
        Arc::ptr_eq(&self.tree, &other.tree)
    }

    pub fn root(&self) -> SyntaxNode {
        self.in_tree(Arc::clone(&self.tree.root))
    }

    pub fn parent(&self) -> Option<SyntaxNode> {
        let parent_id = self.tree.parents.get(&self.green.id)?;
        let parent = self.tree.nodes.get(parent_id)?;
        Some(self.in_tree(Arc::clone(parent)))
    }

    /// Parent chain, nearest first
    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode> {
        std::iter::successors(self.parent(), |node| node.parent())
    }

    pub fn children(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.green
            .children
            .iter()
            .map(move |child| self.in_tree(Arc::clone(child)))
    }

    pub fn children_of_kind(&self, kind: SyntaxKind) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.children().filter(move |child| child.kind() == kind)
    }

    /// All descendants in preorder, excluding `self`
    pub fn descendants(&self) -> Vec<SyntaxNode> {
        let mut out = Vec::new();
        let mut stack: Vec<Arc<GreenNode>> = self.green.children.iter().rev().cloned().collect();
        while let Some(green) = stack.pop() {
            stack.extend(green.children.iter().rev().cloned());
            out.push(self.in_tree(green));
        }
        out
    }

    /// Look up a node of this generation by logical id
    pub fn find_by_id(&self, id: NodeId) -> Option<SyntaxNode> {
        let green = self.tree.nodes.get(&id)?;
        Some(self.in_tree(Arc::clone(green)))
    }

    /// Look up the node of this generation that carries `tag`
    pub fn find_by_tag(&self, tag: &RelocationTag) -> Option<SyntaxNode> {
        let id = self.tree.tagged.get(tag)?;
        self.find_by_id(*id)
    }

    /// Whether `self` is `other` or one of its ancestors
    pub fn contains(&self, other: &SyntaxNode) -> bool {
        *self == *other || other.ancestors().any(|ancestor| ancestor == *self)
    }

    /// Normalized source text of this subtree
    pub fn text(&self) -> String {
        crate::serializer::Serializer::new().serialize_node(&self.green)
    }
}

impl PartialEq for SyntaxNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.tree, &other.tree) && Arc::ptr_eq(&self.green, &other.green)
    }
}

impl Eq for SyntaxNode {}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) #{} @gen{}",
            self.kind(),
            self.name(),
            self.id(),
            self.generation()
        )
    }
}
