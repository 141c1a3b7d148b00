use crate::ast::*;
use crate::tree::SyntaxNode;

/// Serializer converts green trees back to source code
///
/// Output is normalized: one declaration per line, block bodies on their own
/// indented line, opaque texts exactly as stored. Comments and original
/// whitespace are not kept by the parser, so they cannot be reproduced.
pub struct Serializer {
    indent_level: usize,
    indent_string: String,
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            indent_string: "    ".to_string(), // 4 spaces
        }
    }

    pub fn with_indent(width: usize) -> Self {
        Self {
            indent_level: 0,
            indent_string: " ".repeat(width),
        }
    }

    /// Serialize a node and everything below it
    pub fn serialize_node(&mut self, node: &GreenNode) -> String {
        let mut output = String::new();
        self.serialize_declaration(node, &mut output);
        output
    }

    fn serialize_declaration(&mut self, node: &GreenNode, output: &mut String) {
        match node.kind {
            SyntaxKind::CompilationUnit => self.serialize_compilation_unit(node, output),
            SyntaxKind::UsingDirective => {
                output.push_str("using ");
                output.push_str(&node.name);
                output.push(';');
            }
            SyntaxKind::Namespace => {
                output.push_str("namespace ");
                output.push_str(&node.name);
                self.serialize_members(&node.children, output);
            }
            SyntaxKind::Class | SyntaxKind::Struct | SyntaxKind::Interface => {
                self.serialize_type(node, output)
            }
            SyntaxKind::Field => self.serialize_field(node, output),
            SyntaxKind::Property => self.serialize_property(node, output),
            SyntaxKind::Method | SyntaxKind::Constructor | SyntaxKind::Destructor => {
                self.serialize_callable(node, output)
            }
        }
    }

    fn serialize_compilation_unit(&mut self, node: &GreenNode, output: &mut String) {
        let mut previous: Option<SyntaxKind> = None;
        for child in &node.children {
            // Blank line between the using block and the declarations
            if previous == Some(SyntaxKind::UsingDirective) && child.kind != SyntaxKind::UsingDirective {
                output.push('\n');
            }
            self.serialize_declaration(child, output);
            output.push('\n');
            previous = Some(child.kind);
        }
    }

    fn serialize_type(&mut self, node: &GreenNode, output: &mut String) {
        self.write_attributes(node, output);
        self.write_modifiers(&node.modifiers, output);
        if let Some(keyword) = node.kind.keyword() {
            output.push_str(keyword);
            output.push(' ');
        }
        output.push_str(&node.name);

        if !node.base_types.is_empty() {
            output.push_str(" : ");
            output.push_str(&node.base_types.join(", "));
        }

        self.serialize_members(&node.children, output);
    }

    fn serialize_field(&mut self, node: &GreenNode, output: &mut String) {
        self.write_attributes(node, output);
        self.write_modifiers(&node.modifiers, output);
        self.write_type(node, output);
        output.push_str(&node.name);
        if let Some(init) = &node.initializer {
            output.push_str(" = ");
            output.push_str(init);
        }
        output.push(';');
    }

    fn serialize_property(&mut self, node: &GreenNode, output: &mut String) {
        self.write_attributes(node, output);
        self.write_modifiers(&node.modifiers, output);
        self.write_type(node, output);
        output.push_str(&node.name);

        if let Some(Body::Expression(expr)) = &node.body {
            output.push_str(" => ");
            output.push_str(expr);
            output.push(';');
            return;
        }

        output.push_str(" {");
        for accessor in &node.accessors {
            output.push(' ');
            self.write_modifiers(&accessor.modifiers, output);
            output.push_str(accessor.kind.as_str());
            match &accessor.body {
                None => output.push(';'),
                Some(Body::Block(text)) if text.is_empty() => output.push_str(" { }"),
                Some(Body::Block(text)) => {
                    output.push_str(" { ");
                    output.push_str(text);
                    output.push_str(" }");
                }
                Some(Body::Expression(expr)) => {
                    output.push_str(" => ");
                    output.push_str(expr);
                    output.push(';');
                }
            }
        }
        output.push_str(" }");

        if let Some(init) = &node.initializer {
            output.push_str(" = ");
            output.push_str(init);
            output.push(';');
        }
    }

    fn serialize_callable(&mut self, node: &GreenNode, output: &mut String) {
        self.write_attributes(node, output);
        self.write_modifiers(&node.modifiers, output);

        match node.kind {
            SyntaxKind::Destructor => output.push('~'),
            SyntaxKind::Method => self.write_type(node, output),
            _ => {}
        }
        output.push_str(&node.name);

        output.push('(');
        for (i, param) in node.parameters.iter().enumerate() {
            if i > 0 {
                output.push_str(", ");
            }
            output.push_str(&param.ty);
            output.push(' ');
            output.push_str(&param.name);
            if let Some(default) = &param.default {
                output.push_str(" = ");
                output.push_str(default);
            }
        }
        output.push(')');

        // Constructor chaining: `: base(...)` / `: this(...)`
        if let Some(init) = &node.initializer {
            output.push_str(" : ");
            output.push_str(init);
        }

        self.serialize_body(node.body.as_ref(), output);
    }

    fn serialize_body(&mut self, body: Option<&Body>, output: &mut String) {
        match body {
            None => output.push(';'),
            Some(Body::Expression(expr)) => {
                output.push_str(" => ");
                output.push_str(expr);
                output.push(';');
            }
            Some(Body::Block(text)) if text.is_empty() => output.push_str(" { }"),
            Some(Body::Block(text)) => {
                output.push_str(" {\n");
                self.indent_level += 1;
                self.write_indent(output);
                output.push_str(text);
                output.push('\n');
                self.indent_level -= 1;
                self.write_indent(output);
                output.push('}');
            }
        }
    }

    fn serialize_members(&mut self, children: &[std::sync::Arc<GreenNode>], output: &mut String) {
        if children.is_empty() {
            output.push_str(" { }");
            return;
        }

        output.push_str(" {\n");
        self.indent_level += 1;

        for child in children {
            self.write_indent(output);
            self.serialize_declaration(child, output);
            output.push('\n');
        }

        self.indent_level -= 1;
        self.write_indent(output);
        output.push('}');
    }

    fn write_attributes(&self, node: &GreenNode, output: &mut String) {
        for attribute in &node.attributes {
            output.push('[');
            output.push_str(attribute);
            output.push_str("]\n");
            self.write_indent(output);
        }
    }

    fn write_modifiers(&self, modifiers: &[Modifier], output: &mut String) {
        for modifier in modifiers {
            output.push_str(modifier.as_str());
            output.push(' ');
        }
    }

    fn write_type(&self, node: &GreenNode, output: &mut String) {
        if let Some(ty) = &node.ty {
            output.push_str(ty);
            output.push(' ');
        }
    }

    fn write_indent(&self, output: &mut String) {
        for _ in 0..self.indent_level {
            output.push_str(&self.indent_string);
        }
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a node (usually a root) to normalized source text
pub fn render(node: &SyntaxNode) -> String {
    Serializer::new().serialize_node(node.green())
}

pub fn render_with_indent(node: &SyntaxNode, width: usize) -> String {
    Serializer::with_indent(width).serialize_node(node.green())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_serialize_document() {
        let source = r#"
            using System;
            namespace Demo {
              [Serializable] public class Person : Entity {
                private string name = "x";
                public int Age { get; private set; } = 18;
                public Person(string name) : base(name) { this.name = name; }
                public override string ToString() => name;
                public void Empty() { }
              }
            }
        "#;

        let root = parse(source).unwrap();
        let expected = r#"using System;

namespace Demo {
    [Serializable]
    public class Person : Entity {
        private string name = "x";
        public int Age { get; private set; } = 18;
        public Person(string name) : base(name) {
            this.name = name;
        }
        public override string ToString() => name;
        public void Empty() { }
    }
}
"#;
        assert_eq!(render(&root), expected);
    }

    #[test]
    fn test_rendered_output_parses_back_identically() {
        let source = r#"
            interface IRepo { Item Find(int id); int Count { get; } }
            struct Pair { public int A; public int B; ~Pair() { Release(); } }
        "#;

        let first = render(&parse(source).unwrap());
        let second = render(&parse(&first).unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_indent() {
        let root = parse("class C { int x; }").unwrap();
        assert_eq!(render_with_indent(&root, 2), "class C {\n  int x;\n}\n");
    }

    #[test]
    fn test_serialize_single_member() {
        let root = parse("class C { static void M(int a = 1) => Run(a); }").unwrap();
        let method = root.descendants().pop().unwrap();
        assert_eq!(method.text(), "static void M(int a = 1) => Run(a);");
    }
}
