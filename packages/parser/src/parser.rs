use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::id_generator::IdGenerator;
use crate::tokenizer::{tokenize, Token};
use crate::tree::{SyntaxNode, SyntaxTree};
use std::ops::Range;
use std::sync::Arc;

/// Contextual keywords that may prefix a parameter type
const PARAMETER_MODIFIERS: &[&str] = &["ref", "out", "in", "params", "this"];

/// Recursive-descent parser for C#-like declarations
pub struct Parser<'src, 'ids> {
    source: &'src str,
    tokens: Vec<(Token<'src>, Range<usize>)>,
    pos: usize,
    ids: &'ids mut IdGenerator,
}

impl<'src, 'ids> Parser<'src, 'ids> {
    pub fn new(source: &'src str, ids: &'ids mut IdGenerator) -> Self {
        let tokens = tokenize(source);
        Self {
            source,
            tokens,
            pos: 0,
            ids,
        }
    }

    /// Parse a complete compilation unit
    pub fn parse_compilation_unit(&mut self) -> ParseResult<GreenNode> {
        let mut unit = GreenNode::new(self.ids.new_id(), SyntaxKind::CompilationUnit, "");

        while self.check(Token::Using) {
            unit.children.push(Arc::new(self.parse_using()?));
        }

        while !self.is_at_end() {
            unit.children.push(Arc::new(self.parse_declaration(false)?));
        }

        Ok(unit)
    }

    /// Parse exactly one type member (field, property, method, constructor,
    /// destructor or nested type)
    pub fn parse_member_fragment(&mut self) -> ParseResult<GreenNode> {
        let member = self.parse_declaration(true)?;
        if !self.is_at_end() {
            return Err(ParseError::unexpected_token(
                self.peek_span(),
                "end of fragment",
                Self::format_token(self.peek()),
            ));
        }
        Ok(member)
    }

    /// Parse a using directive
    fn parse_using(&mut self) -> ParseResult<GreenNode> {
        let id = self.ids.new_id();
        self.expect(Token::Using)?;
        let name = self.parse_qualified_name()?;
        self.expect(Token::Semicolon)?;

        Ok(GreenNode::new(id, SyntaxKind::UsingDirective, name))
    }

    /// Parse a namespace, type or (inside types) member declaration
    fn parse_declaration(&mut self, in_type: bool) -> ParseResult<GreenNode> {
        let start = self.peek_span();
        let attributes = self.parse_attributes()?;
        let modifiers = self.parse_modifiers();

        match self.peek() {
            Some((Token::Namespace, _)) if !in_type => {
                if !attributes.is_empty() || !modifiers.is_empty() {
                    return Err(ParseError::invalid_syntax(
                        start,
                        "Namespaces cannot have attributes or modifiers",
                    ));
                }
                self.parse_namespace()
            }
            Some((Token::Class, _)) => self.parse_type_decl(SyntaxKind::Class, attributes, modifiers),
            Some((Token::Struct, _)) => self.parse_type_decl(SyntaxKind::Struct, attributes, modifiers),
            Some((Token::Interface, _)) => {
                self.parse_type_decl(SyntaxKind::Interface, attributes, modifiers)
            }
            _ if in_type => self.parse_member(attributes, modifiers),
            _ => Err(ParseError::unexpected_token(
                self.peek_span(),
                "namespace or type declaration",
                Self::format_token(self.peek()),
            )),
        }
    }

    /// Parse a namespace with a braced body
    fn parse_namespace(&mut self) -> ParseResult<GreenNode> {
        let id = self.ids.new_id();
        self.expect(Token::Namespace)?;
        let name = self.parse_qualified_name()?;
        let mut namespace = GreenNode::new(id, SyntaxKind::Namespace, name);

        self.expect(Token::LBrace)?;
        while !self.check(Token::RBrace) && !self.is_at_end() {
            namespace.children.push(Arc::new(self.parse_declaration(false)?));
        }
        self.expect(Token::RBrace)?;

        Ok(namespace)
    }

    /// Parse a class, struct or interface declaration
    fn parse_type_decl(
        &mut self,
        kind: SyntaxKind,
        attributes: Vec<String>,
        modifiers: Vec<Modifier>,
    ) -> ParseResult<GreenNode> {
        let id = self.ids.new_id();
        self.advance(); // consume the type keyword

        let name = self.expect_ident()?;
        let mut decl = GreenNode::new(id, kind, name);
        decl.attributes = attributes;
        decl.modifiers = modifiers;

        if self.match_token(Token::Colon) {
            loop {
                decl.base_types.push(self.parse_type_name()?);
                if !self.match_token(Token::Comma) {
                    break;
                }
            }
        }

        self.expect(Token::LBrace)?;
        while !self.check(Token::RBrace) && !self.is_at_end() {
            decl.children.push(Arc::new(self.parse_declaration(true)?));
        }
        self.expect(Token::RBrace)?;
        self.match_token(Token::Semicolon);

        Ok(decl)
    }

    /// Parse a field, property, method, constructor or destructor after its
    /// attributes and modifiers
    fn parse_member(
        &mut self,
        attributes: Vec<String>,
        modifiers: Vec<Modifier>,
    ) -> ParseResult<GreenNode> {
        let id = self.ids.new_id();

        // Destructor: ~Name() { }
        if self.match_token(Token::Tilde) {
            let name = self.expect_ident()?;
            self.expect(Token::LParen)?;
            self.expect(Token::RParen)?;
            let mut dtor = GreenNode::new(id, SyntaxKind::Destructor, name);
            dtor.attributes = attributes;
            dtor.modifiers = modifiers;
            dtor.body = self.parse_body_or_semicolon()?;
            return Ok(dtor);
        }

        // Constructor: Name(params) (: base(...))? { }
        if let (Some((Token::Ident(_), _)), Some((Token::LParen, _))) = (self.peek(), self.peek_ahead(1)) {
            let name = self.expect_ident()?;
            let mut ctor = GreenNode::new(id, SyntaxKind::Constructor, name);
            ctor.attributes = attributes;
            ctor.modifiers = modifiers;
            ctor.parameters = self.parse_parameters()?;
            if self.match_token(Token::Colon) {
                ctor.initializer = Some(self.capture_until(|t| {
                    matches!(t, Token::LBrace | Token::Arrow | Token::Semicolon)
                })?);
            }
            ctor.body = self.parse_body_or_semicolon()?;
            return Ok(ctor);
        }

        let ty = self.parse_type_name()?;
        let name = self.expect_ident()?;

        let mut member = match self.peek() {
            Some((Token::LParen, _)) => {
                let mut method = GreenNode::new(id, SyntaxKind::Method, name);
                method.parameters = self.parse_parameters()?;
                method.body = self.parse_body_or_semicolon()?;
                method
            }
            Some((Token::LBrace, _)) => {
                let mut property = GreenNode::new(id, SyntaxKind::Property, name);
                property.accessors = self.parse_accessors()?;
                if self.match_token(Token::Equals) {
                    property.initializer = Some(self.capture_until(|t| matches!(t, Token::Semicolon))?);
                    self.expect(Token::Semicolon)?;
                }
                property
            }
            Some((Token::Arrow, _)) => {
                self.advance();
                let mut property = GreenNode::new(id, SyntaxKind::Property, name);
                let expr = self.capture_until(|t| matches!(t, Token::Semicolon))?;
                self.expect(Token::Semicolon)?;
                property.body = Some(Body::Expression(expr));
                property
            }
            Some((Token::Equals, _)) => {
                self.advance();
                let mut field = GreenNode::new(id, SyntaxKind::Field, name);
                field.initializer = Some(self.capture_until(|t| matches!(t, Token::Semicolon))?);
                self.expect(Token::Semicolon)?;
                field
            }
            Some((Token::Semicolon, _)) => {
                self.advance();
                GreenNode::new(id, SyntaxKind::Field, name)
            }
            _ => {
                return Err(ParseError::unexpected_token(
                    self.peek_span(),
                    "'(', '{', '=>', '=' or ';'",
                    Self::format_token(self.peek()),
                ))
            }
        };

        member.ty = Some(ty);
        member.attributes = attributes;
        member.modifiers = modifiers;
        Ok(member)
    }

    /// Parse `[...]` attribute lists preceding a declaration
    fn parse_attributes(&mut self) -> ParseResult<Vec<String>> {
        let mut attributes = Vec::new();
        while self.match_token(Token::LBracket) {
            let text = self.capture_until(|t| matches!(t, Token::RBracket))?;
            self.expect(Token::RBracket)?;
            attributes.push(text);
        }
        Ok(attributes)
    }

    fn parse_modifiers(&mut self) -> Vec<Modifier> {
        let mut modifiers = Vec::new();
        loop {
            let modifier = match self.peek() {
                Some((Token::Public, _)) => Modifier::Public,
                Some((Token::Private, _)) => Modifier::Private,
                Some((Token::Protected, _)) => Modifier::Protected,
                Some((Token::Internal, _)) => Modifier::Internal,
                Some((Token::Static, _)) => Modifier::Static,
                Some((Token::Abstract, _)) => Modifier::Abstract,
                Some((Token::Virtual, _)) => Modifier::Virtual,
                Some((Token::Override, _)) => Modifier::Override,
                Some((Token::Sealed, _)) => Modifier::Sealed,
                Some((Token::Readonly, _)) => Modifier::Readonly,
                Some((Token::Async, _)) => Modifier::Async,
                Some((Token::Partial, _)) => Modifier::Partial,
                Some((Token::Const, _)) => Modifier::Const,
                _ => return modifiers,
            };
            self.advance();
            modifiers.push(modifier);
        }
    }

    /// Parse `(T a, ref U b = default)`
    fn parse_parameters(&mut self) -> ParseResult<Vec<Parameter>> {
        self.expect(Token::LParen)?;
        let mut parameters = Vec::new();
        if self.match_token(Token::RParen) {
            return Ok(parameters);
        }

        loop {
            self.parse_attributes()?;
            let prefix = match (self.peek(), self.peek_ahead(1)) {
                (Some((Token::Ident(word), _)), Some((Token::Ident(_), _)))
                    if PARAMETER_MODIFIERS.contains(word) =>
                {
                    let word = word.to_string();
                    self.advance();
                    Some(word)
                }
                _ => None,
            };

            let ty = self.parse_type_name()?;
            let ty = match prefix {
                Some(prefix) => format!("{} {}", prefix, ty),
                None => ty,
            };
            let name = self.expect_ident()?;
            let default = if self.match_token(Token::Equals) {
                Some(self.capture_until(|t| matches!(t, Token::Comma | Token::RParen))?)
            } else {
                None
            };
            parameters.push(Parameter { ty, name, default });

            if !self.match_token(Token::Comma) {
                break;
            }
        }

        self.expect(Token::RParen)?;
        Ok(parameters)
    }

    /// Parse `{ get; private set; init { ... } }`
    fn parse_accessors(&mut self) -> ParseResult<Vec<Accessor>> {
        self.expect(Token::LBrace)?;
        let mut accessors = Vec::new();

        while !self.check(Token::RBrace) && !self.is_at_end() {
            self.parse_attributes()?;
            let modifiers = self.parse_modifiers();
            let kind = match self.peek() {
                Some((Token::Ident("get"), _)) => AccessorKind::Get,
                Some((Token::Ident("set"), _)) => AccessorKind::Set,
                Some((Token::Ident("init"), _)) => AccessorKind::Init,
                _ => {
                    return Err(ParseError::unexpected_token(
                        self.peek_span(),
                        "'get', 'set' or 'init'",
                        Self::format_token(self.peek()),
                    ))
                }
            };
            self.advance();
            let body = self.parse_body_or_semicolon()?;
            accessors.push(Accessor {
                kind,
                modifiers,
                body,
            });
        }

        self.expect(Token::RBrace)?;
        Ok(accessors)
    }

    /// `{ ... }`, `=> expr;` or `;`
    fn parse_body_or_semicolon(&mut self) -> ParseResult<Option<Body>> {
        match self.peek() {
            Some((Token::LBrace, _)) => Ok(Some(Body::Block(self.parse_block()?))),
            Some((Token::Arrow, _)) => {
                self.advance();
                let expr = self.capture_until(|t| matches!(t, Token::Semicolon))?;
                self.expect(Token::Semicolon)?;
                Ok(Some(Body::Expression(expr)))
            }
            Some((Token::Semicolon, _)) => {
                self.advance();
                Ok(None)
            }
            _ => Err(ParseError::unexpected_token(
                self.peek_span(),
                "'{', '=>' or ';'",
                Self::format_token(self.peek()),
            )),
        }
    }

    /// Consume a balanced `{ ... }` block and return its inner text
    fn parse_block(&mut self) -> ParseResult<String> {
        let open = self.peek_span();
        self.expect(Token::LBrace)?;

        let mut depth = 1usize;
        while let Some((token, span)) = self.advance() {
            match token {
                Token::LBrace => depth += 1,
                Token::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        let inner = &self.source[open.end..span.start];
                        return Ok(normalize(inner));
                    }
                }
                _ => {}
            }
        }

        Err(ParseError::unexpected_eof("'}'"))
    }

    /// Capture source text up to (not including) the first token at nesting
    /// depth zero for which `stop` holds
    fn capture_until(&mut self, stop: impl Fn(&Token<'src>) -> bool) -> ParseResult<String> {
        let start = self.peek_span().start;
        let mut depth = 0usize;

        while let Some((token, span)) = self.peek() {
            if depth == 0 && stop(token) {
                let text = &self.source[start..span.start];
                return Ok(normalize(text));
            }
            match token {
                Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
                Token::RParen | Token::RBracket | Token::RBrace => {
                    if depth == 0 {
                        return Err(ParseError::invalid_syntax(span.clone(), "Unbalanced delimiter"));
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.advance();
        }

        Err(ParseError::unexpected_eof("end of expression"))
    }

    /// `A.B.C`
    fn parse_qualified_name(&mut self) -> ParseResult<String> {
        let mut name = self.expect_ident()?;
        while self.match_token(Token::Dot) {
            name.push('.');
            name.push_str(&self.expect_ident()?);
        }
        Ok(name)
    }

    /// `System.Collections.Generic.List<int>[]?`
    fn parse_type_name(&mut self) -> ParseResult<String> {
        let mut ty = self.parse_qualified_name()?;

        if self.match_token(Token::LAngle) {
            ty.push('<');
            loop {
                ty.push_str(&self.parse_type_name()?);
                if self.match_token(Token::Comma) {
                    ty.push_str(", ");
                } else {
                    break;
                }
            }
            self.expect(Token::RAngle)?;
            ty.push('>');
        }

        while self.check(Token::LBracket) {
            if !matches!(self.peek_ahead(1), Some((Token::RBracket, _))) {
                break;
            }
            self.advance();
            self.advance();
            ty.push_str("[]");
        }

        if self.match_token(Token::Question) {
            ty.push('?');
        }

        Ok(ty)
    }

    // Helper methods

    fn peek(&self) -> Option<&(Token<'src>, Range<usize>)> {
        self.tokens.get(self.pos)
    }

    fn peek_ahead(&self, offset: usize) -> Option<&(Token<'src>, Range<usize>)> {
        self.tokens.get(self.pos + offset)
    }

    fn advance(&mut self) -> Option<(Token<'src>, Range<usize>)> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn check(&self, token: Token) -> bool {
        if let Some((t, _)) = self.peek() {
            std::mem::discriminant(t) == std::mem::discriminant(&token)
        } else {
            false
        }
    }

    fn match_token(&mut self, token: Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token) -> ParseResult<()> {
        if self.check(token.clone()) {
            self.advance();
            Ok(())
        } else if self.is_at_end() {
            Err(ParseError::unexpected_eof(token.to_string()))
        } else {
            Err(ParseError::unexpected_token(
                self.peek_span(),
                token.to_string(),
                Self::format_token(self.peek()),
            ))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some((Token::Ident(s), _)) => {
                let val = s.to_string();
                self.advance();
                Ok(val)
            }
            None => Err(ParseError::unexpected_eof("identifier")),
            _ => Err(ParseError::unexpected_token(
                self.peek_span(),
                "identifier",
                Self::format_token(self.peek()),
            )),
        }
    }

    /// Get the span of the next token (the one we're about to consume)
    fn peek_span(&self) -> Range<usize> {
        self.tokens
            .get(self.pos)
            .map(|(_, span)| span.clone())
            .unwrap_or_else(|| {
                // If we're at EOF, use the end of the last token
                let end = self.tokens.last().map(|(_, span)| span.end).unwrap_or(0);
                end..end
            })
    }

    /// Format a token for display in error messages
    fn format_token(token: Option<&(Token, Range<usize>)>) -> String {
        match token {
            None => "end of file".to_string(),
            Some((token, _)) => token.to_string(),
        }
    }
}

/// Collapse every whitespace run to a single space
fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn parse(source: &str) -> ParseResult<SyntaxNode> {
    parse_with_path(source, "<anonymous>")
}

pub fn parse_with_path(source: &str, path: &str) -> ParseResult<SyntaxNode> {
    let mut ids = IdGenerator::new(path);
    parse_with_generator(source, &mut ids)
}

/// Parse a document, drawing node ids from `ids`
pub fn parse_with_generator(source: &str, ids: &mut IdGenerator) -> ParseResult<SyntaxNode> {
    let mut parser = Parser::new(source, ids);
    let unit = parser.parse_compilation_unit()?;
    Ok(SyntaxTree::build(Arc::new(unit)))
}

/// Parse a single member declaration into a detached green node
pub fn parse_member(source: &str, ids: &mut IdGenerator) -> ParseResult<Arc<GreenNode>> {
    let mut parser = Parser::new(source, ids);
    Ok(Arc::new(parser.parse_member_fragment()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_member(root: &SyntaxNode, kind: SyntaxKind) -> SyntaxNode {
        root.descendants()
            .into_iter()
            .find(|n| n.kind() == kind)
            .unwrap()
    }

    #[test]
    fn test_parse_simple_class() {
        let source = r#"
            using System;
            using System.Collections.Generic;

            namespace Demo.Models {
                public class Person : Entity, IComparable<Person> {
                    private readonly string name = "anonymous";
                    public int Age { get; private set; } = 18;
                    public Person(string name) : base(name) { this.name = name; }
                    ~Person() { }
                    public override string ToString() => name;
                }
            }
        "#;

        let result = parse(source);
        if let Err(ref e) = result {
            eprintln!("Parse error: {:?}", e);
        }
        let root = result.unwrap();
        let kinds: Vec<_> = root.children().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::UsingDirective,
                SyntaxKind::UsingDirective,
                SyntaxKind::Namespace
            ]
        );

        let class = first_member(&root, SyntaxKind::Class);
        assert_eq!(class.name(), "Person");
        assert_eq!(class.green().base_types, vec!["Entity", "IComparable<Person>"]);

        let field = first_member(&root, SyntaxKind::Field);
        assert_eq!(field.green().ty.as_deref(), Some("string"));
        assert_eq!(field.green().initializer.as_deref(), Some("\"anonymous\""));
        assert_eq!(field.green().modifiers, vec![Modifier::Private, Modifier::Readonly]);

        let property = first_member(&root, SyntaxKind::Property);
        assert_eq!(property.green().accessors.len(), 2);
        assert_eq!(property.green().accessors[1].modifiers, vec![Modifier::Private]);
        assert_eq!(property.green().initializer.as_deref(), Some("18"));

        let ctor = first_member(&root, SyntaxKind::Constructor);
        assert_eq!(ctor.green().parameter_types(), vec!["string"]);
        assert_eq!(ctor.green().initializer.as_deref(), Some("base(name)"));
        assert_eq!(
            ctor.green().body,
            Some(Body::Block("this.name = name;".to_string()))
        );

        assert_eq!(first_member(&root, SyntaxKind::Destructor).name(), "Person");

        let method = first_member(&root, SyntaxKind::Method);
        assert_eq!(method.green().body, Some(Body::Expression("name".to_string())));
    }

    #[test]
    fn test_parse_interface_and_struct() {
        let source = r#"
            interface IShape { double Area(); string Name { get; } }
            struct Point { public int X; public int Y; }
        "#;

        let root = parse(source).unwrap();
        let interface = first_member(&root, SyntaxKind::Interface);
        let method = interface.children().next().unwrap();
        assert_eq!(method.kind(), SyntaxKind::Method);
        assert_eq!(method.green().body, None);

        let point = first_member(&root, SyntaxKind::Struct);
        assert_eq!(point.children().count(), 2);
    }

    #[test]
    fn test_parse_generic_and_array_types() {
        let source = r#"
            class C {
                Dictionary<string, List<int>> map;
                int[] values;
                string? maybe;
                void Run(ref int count, params string[] args, int retries = 3) { }
            }
        "#;

        let root = parse(source).unwrap();
        let types: Vec<_> = root
            .descendants()
            .iter()
            .filter(|n| n.kind() == SyntaxKind::Field)
            .map(|n| n.green().ty.clone().unwrap())
            .collect();
        assert_eq!(types, vec!["Dictionary<string, List<int>>", "int[]", "string?"]);

        let run = first_member(&root, SyntaxKind::Method);
        assert_eq!(run.green().parameter_types(), vec!["ref int", "params string[]", "int"]);
        assert_eq!(run.green().parameters[2].default.as_deref(), Some("3"));
    }

    #[test]
    fn test_nested_braces_in_body() {
        let source = r#"
            class C {
                void M() {
                    if (x) { y(); } else { Log("}"); }
                }
                void N() { }
            }
        "#;

        let root = parse(source).unwrap();
        let methods: Vec<_> = root
            .descendants()
            .into_iter()
            .filter(|n| n.kind() == SyntaxKind::Method)
            .collect();
        assert_eq!(methods.len(), 2);
        assert_eq!(
            methods[0].green().body,
            Some(Body::Block(r#"if (x) { y(); } else { Log("}"); }"#.to_string()))
        );
    }

    #[test]
    fn test_block_comments_between_members() {
        let source = "class T { /* c */ int a; /* multi\n line { */ int b; }";
        let root = parse(source).unwrap();
        let names: Vec<_> = root
            .descendants()
            .iter()
            .filter(|n| n.kind() == SyntaxKind::Field)
            .map(|n| n.name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse("class { }"),
            Err(ParseError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            parse("class C { void M() { "),
            Err(ParseError::UnexpectedEof { .. })
        ));
        assert!(parse("public namespace N { }").is_err());
        assert!(parse("int x;").is_err());
    }

    #[test]
    fn test_parse_member_fragment() {
        let mut ids = IdGenerator::new("/test.cs");
        let member = parse_member("public static void Log(string message) { }", &mut ids).unwrap();
        assert_eq!(member.kind, SyntaxKind::Method);
        assert_eq!(member.modifiers, vec![Modifier::Public, Modifier::Static]);

        assert!(parse_member("void A() { } void B() { }", &mut ids).is_err());
        assert!(parse_member("void Broken( { }", &mut ids).is_err());
    }

    #[test]
    fn test_ids_continue_from_generator() {
        let mut ids = IdGenerator::new("/test.cs");
        let root = parse_with_generator("class C { int x; }", &mut ids).unwrap();
        assert_eq!(ids.issued(), 3);
        assert_eq!(root.id().index(), 1);
    }
}
