//! # Selection stack
//!
//! Navigation history of a session. Each frame selects either one node or an
//! ordered group of siblings (overloads, constructors). The top frame is the
//! current selection; the bottom-most frame holding a tree root anchors edits.

use crate::errors::{NavigatorError, NavigatorResult};
use rosewood_parser::{SyntaxKind, SyntaxNode};

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Single(SyntaxNode),
    /// Non-empty, in document order
    Multiple(Vec<SyntaxNode>),
}

impl Selection {
    pub fn single(&self) -> Option<&SyntaxNode> {
        match self {
            Selection::Single(node) => Some(node),
            Selection::Multiple(_) => None,
        }
    }

    /// Selected nodes in stored order
    pub fn nodes(&self) -> &[SyntaxNode] {
        match self {
            Selection::Single(node) => std::slice::from_ref(node),
            Selection::Multiple(nodes) => nodes,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes().is_empty()
    }

    fn generation_matches(&self, root: &SyntaxNode) -> bool {
        self.nodes().iter().all(|node| node.same_generation(root))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectionStack {
    frames: Vec<Selection>,
}

impl SelectionStack {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub fn with_root(root: SyntaxNode) -> Self {
        Self {
            frames: vec![Selection::Single(root)],
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Push a frame. Every frame must belong to the generation of the root frame.
    pub fn push(&mut self, frame: Selection) -> NavigatorResult<()> {
        if frame.is_empty() {
            return Err(NavigatorError::argument(
                "frame",
                "a multiple selection needs at least one node",
            ));
        }
        if let Some(root) = self.root() {
            if !frame.generation_matches(root) {
                return Err(NavigatorError::invalid_state(format!(
                    "cannot select {} nodes from another tree generation",
                    describe(&frame)
                )));
            }
        }

        self.frames.push(frame);
        Ok(())
    }

    /// Pop the current frame. The last remaining frame is never popped.
    pub fn pop(&mut self) -> NavigatorResult<Selection> {
        if self.frames.len() <= 1 {
            return Err(NavigatorError::invalid_state(
                "cannot pop the last frame of the selection stack",
            ));
        }
        self.frames
            .pop()
            .ok_or_else(|| NavigatorError::invalid_state("selection stack is empty"))
    }

    pub fn peek(&self) -> NavigatorResult<&Selection> {
        self.frames
            .last()
            .ok_or_else(|| NavigatorError::invalid_state("selection stack is empty"))
    }

    /// Clear the stack and anchor it on `node`
    pub fn set_head(&mut self, node: SyntaxNode) {
        self.frames.clear();
        self.frames.push(Selection::Single(node));
    }

    /// Pop frames until the current one is a single node of `kind`.
    ///
    /// Nothing is popped when no such frame exists.
    pub fn pop_until(&mut self, kind: SyntaxKind) -> NavigatorResult<&SyntaxNode> {
        let position = self
            .frames
            .iter()
            .rposition(|frame| frame.single().map_or(false, |node| node.kind() == kind))
            .ok_or_else(|| {
                NavigatorError::not_found(format!("no selected {} on the selection stack", kind))
            })?;

        self.frames.truncate(position + 1);
        match self.frames.last() {
            Some(Selection::Single(node)) => Ok(node),
            _ => Err(NavigatorError::invalid_state("selection stack is empty")),
        }
    }

    /// Every selected node, oldest frame first
    pub fn all_selected_nodes(&self) -> Vec<SyntaxNode> {
        self.frames
            .iter()
            .flat_map(|frame| frame.nodes().iter().cloned())
            .collect()
    }

    /// Every frame, oldest first
    pub fn all_selected_frames(&self) -> &[Selection] {
        &self.frames
    }

    /// Bottom-most single frame whose node is a tree root
    pub fn root(&self) -> Option<&SyntaxNode> {
        self.frames
            .iter()
            .filter_map(Selection::single)
            .find(|node| node.is_root())
    }

    pub(crate) fn replace_frames(&mut self, frames: Vec<Selection>) {
        self.frames = frames;
    }
}

fn describe(frame: &Selection) -> String {
    let kinds: Vec<String> = frame.nodes().iter().map(|n| n.kind().to_string()).collect();
    kinds.join(", ")
}
