use rosewood_parser::{SyntaxKind, SyntaxNode};

/// Visitor pattern for traversing syntax trees
///
/// The default implementations walk the entire tree. Override specific
/// visit_* methods to act on nodes; call the matching walk_* function to keep
/// descending.
pub trait Visitor: Sized {
    fn visit_node(&mut self, node: &SyntaxNode) {
        walk_node(self, node);
    }

    fn visit_compilation_unit(&mut self, node: &SyntaxNode) {
        walk_children(self, node);
    }

    fn visit_using(&mut self, _node: &SyntaxNode) {
        // Leaf node, no children to walk
    }

    fn visit_namespace(&mut self, node: &SyntaxNode) {
        walk_children(self, node);
    }

    /// Class, struct or interface
    fn visit_type(&mut self, node: &SyntaxNode) {
        walk_children(self, node);
    }

    /// Field, property, method, constructor or destructor
    fn visit_member(&mut self, _node: &SyntaxNode) {
        // Leaf node, no children to walk
    }
}

pub fn walk_node<V: Visitor>(visitor: &mut V, node: &SyntaxNode) {
    match node.kind() {
        SyntaxKind::CompilationUnit => visitor.visit_compilation_unit(node),
        SyntaxKind::UsingDirective => visitor.visit_using(node),
        SyntaxKind::Namespace => visitor.visit_namespace(node),
        SyntaxKind::Class | SyntaxKind::Struct | SyntaxKind::Interface => visitor.visit_type(node),
        SyntaxKind::Field
        | SyntaxKind::Property
        | SyntaxKind::Method
        | SyntaxKind::Constructor
        | SyntaxKind::Destructor => visitor.visit_member(node),
    }
}

pub fn walk_children<V: Visitor>(visitor: &mut V, node: &SyntaxNode) {
    for child in node.children() {
        visitor.visit_node(&child);
    }
}

/// Collects type declarations in document order, nested types included
pub struct TypeCollector {
    kind: Option<SyntaxKind>,
    pub types: Vec<SyntaxNode>,
}

impl TypeCollector {
    pub fn new() -> Self {
        Self {
            kind: None,
            types: Vec::new(),
        }
    }

    /// Only collect declarations of `kind`
    pub fn of_kind(kind: SyntaxKind) -> Self {
        Self {
            kind: Some(kind),
            types: Vec::new(),
        }
    }
}

impl Default for TypeCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Visitor for TypeCollector {
    fn visit_type(&mut self, node: &SyntaxNode) {
        if self.kind.map_or(true, |kind| kind == node.kind()) {
            self.types.push(node.clone());
        }
        walk_children(self, node);
    }
}

/// Type declarations below `scope` (excluding `scope` itself)
pub fn collect_types(scope: &SyntaxNode, kind: Option<SyntaxKind>) -> Vec<SyntaxNode> {
    let mut collector = match kind {
        Some(kind) => TypeCollector::of_kind(kind),
        None => TypeCollector::new(),
    };
    walk_children(&mut collector, scope);
    collector.types
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosewood_parser::parse;

    const SOURCE: &str = r#"
        using System;
        namespace A {
            class Outer {
                int x;
                struct Inner { }
            }
            interface IThing { void Run(); }
        }
        class Loose { }
    "#;

    #[test]
    fn test_collect_types_in_document_order() {
        let root = parse(SOURCE).unwrap();
        let names: Vec<_> = collect_types(&root, None)
            .iter()
            .map(|n| n.name().to_string())
            .collect();
        assert_eq!(names, vec!["Outer", "Inner", "IThing", "Loose"]);
    }

    #[test]
    fn test_collect_types_of_kind() {
        let root = parse(SOURCE).unwrap();
        let interfaces = collect_types(&root, Some(SyntaxKind::Interface));
        assert_eq!(interfaces.len(), 1);
        assert_eq!(interfaces[0].name(), "IThing");
    }

    #[test]
    fn test_custom_visitor_counts_members() {
        struct MemberCounter(usize);

        impl Visitor for MemberCounter {
            fn visit_member(&mut self, _node: &SyntaxNode) {
                self.0 += 1;
            }
        }

        let root = parse(SOURCE).unwrap();
        let mut counter = MemberCounter(0);
        counter.visit_node(&root);
        assert_eq!(counter.0, 2);
    }
}
