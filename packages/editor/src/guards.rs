//! Precondition checks shared by navigators and composers.
//!
//! All guards are pure: they inspect nodes and never touch session state.

use crate::errors::{NavigatorError, NavigatorResult};
use crate::handlers::KindFilter;
use rosewood_parser::SyntaxNode;

/// `node` must be present and match `kind`
pub fn require_immediate_kind(
    node: Option<&SyntaxNode>,
    kind: impl Into<KindFilter>,
) -> NavigatorResult<&SyntaxNode> {
    let kind = kind.into();
    match node {
        Some(node) if kind.matches(node.kind()) => Ok(node),
        Some(node) => Err(NavigatorError::invalid_action(format!(
            "expected {} but the selection is {} `{}`",
            kind,
            node.kind(),
            node.name()
        ))),
        None => Err(NavigatorError::invalid_action(format!(
            "expected {} but nothing is selected",
            kind
        ))),
    }
}

/// `node` or its parent must match `kind`; returns whichever matched, `node` first
pub fn require_node_or_parent_kind(
    node: Option<&SyntaxNode>,
    kind: impl Into<KindFilter>,
) -> NavigatorResult<SyntaxNode> {
    let kind = kind.into();
    let node = node.ok_or_else(|| {
        NavigatorError::invalid_action(format!("expected {} but nothing is selected", kind))
    })?;

    if kind.matches(node.kind()) {
        return Ok(node.clone());
    }
    match node.parent() {
        Some(parent) if kind.matches(parent.kind()) => Ok(parent),
        _ => Err(NavigatorError::invalid_action(format!(
            "neither {} `{}` nor its parent is {}",
            node.kind(),
            node.name(),
            kind
        ))),
    }
}

pub fn require_not_blank(value: &str, argument: &str) -> NavigatorResult<()> {
    if value.trim().is_empty() {
        return Err(NavigatorError::argument(argument, "must not be blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosewood_parser::{parse, SyntaxKind};

    fn property() -> SyntaxNode {
        let root = parse("class T { int P { get; } }").unwrap();
        root.descendants().pop().unwrap()
    }

    #[test]
    fn test_require_immediate_kind() {
        let p = property();
        assert!(require_immediate_kind(Some(&p), SyntaxKind::Property).is_ok());
        assert!(require_immediate_kind(Some(&p), KindFilter::AnyMember).is_ok());
        assert!(matches!(
            require_immediate_kind(Some(&p), SyntaxKind::Method),
            Err(NavigatorError::InvalidActionForState(_))
        ));
        assert!(matches!(
            require_immediate_kind(None, SyntaxKind::Method),
            Err(NavigatorError::InvalidActionForState(_))
        ));
    }

    #[test]
    fn test_require_node_or_parent_kind() {
        let p = property();
        let found = require_node_or_parent_kind(Some(&p), SyntaxKind::Class).unwrap();
        assert_eq!(found.name(), "T");
        let same = require_node_or_parent_kind(Some(&p), SyntaxKind::Property).unwrap();
        assert_eq!(same, p);
        assert!(require_node_or_parent_kind(Some(&p), SyntaxKind::Namespace).is_err());
    }

    #[test]
    fn test_require_not_blank() {
        assert!(require_not_blank("Name", "name").is_ok());
        let err = require_not_blank(" \t", "name").unwrap_err();
        assert!(err.to_string().contains("`name`"));
    }
}
