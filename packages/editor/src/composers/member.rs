use super::Pivot;
use crate::errors::{NavigatorError, NavigatorResult};
use crate::guards::{require_immediate_kind, require_not_blank};
use crate::handlers::KindFilter;
use crate::navigator::Navigator;
use crate::selection::Selection;
use rosewood_parser::{
    tokenize, validate_identifier, AccessModifier, Body, GreenNode, Modifier, SyntaxKind,
    SyntaxNode, Token,
};
use std::sync::Arc;

/// Edits the selected member. Group selections (overloads, constructors) can
/// only be deleted.
pub struct MemberComposer<'a> {
    nav: &'a mut Navigator,
}

impl<'a> MemberComposer<'a> {
    pub fn new(nav: &'a mut Navigator, pivot: Pivot) -> NavigatorResult<Self> {
        let selection = nav.current_selection()?;
        if pivot == Pivot::Parent {
            let first = selection
                .nodes()
                .first()
                .ok_or_else(|| NavigatorError::invalid_state("the current selection is empty"))?;
            return Err(NavigatorError::unsupported(format!(
                "{} `{}` has no descendants which a composer can handle",
                first.kind(),
                first.name()
            )));
        }
        for node in selection.nodes() {
            require_immediate_kind(Some(node), KindFilter::AnyMember)?;
        }
        Ok(Self { nav })
    }

    pub fn rename(&mut self, name: &str) -> NavigatorResult<&mut Self> {
        require_not_blank(name, "name")?;
        validate_identifier(name)?;
        let node = self.single("rename")?;
        if matches!(node.kind(), SyntaxKind::Constructor | SyntaxKind::Destructor) {
            return Err(NavigatorError::unsupported(format!(
                "{} takes the name of its type; rename `{}` instead",
                node.kind(),
                node.name()
            )));
        }
        self.replace(node.green().with_name(name))
    }

    /// Field type, property type or method return type
    pub fn set_type(&mut self, ty: &str) -> NavigatorResult<&mut Self> {
        require_not_blank(ty, "type")?;
        let node = self.single("set_type")?;
        if !matches!(
            node.kind(),
            SyntaxKind::Field | SyntaxKind::Property | SyntaxKind::Method
        ) {
            return Err(NavigatorError::unsupported(format!(
                "{} `{}` has no type",
                node.kind(),
                node.name()
            )));
        }
        self.replace(node.green().with_type(ty.trim()))
    }

    pub fn set_access_modifier(&mut self, access: AccessModifier) -> NavigatorResult<&mut Self> {
        let node = self.single("set_access_modifier")?;
        let modifiers = access.apply(&node.green().modifiers);
        self.replace(node.green().with_modifiers(modifiers))
    }

    /// No-op when the member is already static
    pub fn make_static(&mut self) -> NavigatorResult<&mut Self> {
        let node = self.single("make_static")?;
        if node.green().is_static() {
            return Ok(self);
        }
        let mut modifiers = node.green().modifiers.clone();
        let position = modifiers
            .iter()
            .rposition(|m| m.is_access())
            .map_or(0, |p| p + 1);
        modifiers.insert(position, Modifier::Static);
        self.replace(node.green().with_modifiers(modifiers))
    }

    /// No-op when the member is not static
    pub fn make_non_static(&mut self) -> NavigatorResult<&mut Self> {
        let node = self.single("make_non_static")?;
        if !node.green().is_static() {
            return Ok(self);
        }
        let modifiers = node
            .green()
            .modifiers
            .iter()
            .copied()
            .filter(|m| *m != Modifier::Static)
            .collect();
        self.replace(node.green().with_modifiers(modifiers))
    }

    /// Replace every attribute; each entry is the text between the brackets
    pub fn set_attributes(&mut self, attributes: Vec<String>) -> NavigatorResult<&mut Self> {
        for attribute in &attributes {
            require_not_blank(attribute, "attributes")?;
        }
        let node = self.single("set_attributes")?;
        self.replace(node.green().with_attributes(attributes))
    }

    /// Replace the statements of a method, constructor or destructor body
    pub fn set_body(&mut self, statements: &str) -> NavigatorResult<&mut Self> {
        let node = self.single("set_body")?;
        if !matches!(
            node.kind(),
            SyntaxKind::Method | SyntaxKind::Constructor | SyntaxKind::Destructor
        ) {
            return Err(NavigatorError::unsupported(format!(
                "{} `{}` has no body",
                node.kind(),
                node.name()
            )));
        }
        if node.parent().map(|p| p.kind()) == Some(SyntaxKind::Interface) {
            return Err(NavigatorError::unsupported(format!(
                "interface method `{}` cannot have a body",
                node.name()
            )));
        }
        require_balanced_braces(statements)?;
        let body = Body::Block(statements.split_whitespace().collect::<Vec<_>>().join(" "));
        self.replace(node.green().with_body(Some(body)))
    }

    /// Delete the selection from its type; the type becomes current
    pub fn delete(self) -> NavigatorResult<&'a mut Navigator> {
        let nodes = self.nav.current_nodes()?;
        let parent = nodes.first().and_then(SyntaxNode::parent);
        let parent = require_immediate_kind(parent.as_ref(), KindFilter::AnyType)?;
        self.nav.delete_selected(parent.kind())?;
        Ok(self.nav)
    }

    pub fn into_inner(self) -> &'a mut Navigator {
        self.nav
    }

    fn single(&self, operation: &str) -> NavigatorResult<SyntaxNode> {
        match self.nav.current_selection()? {
            Selection::Single(node) => Ok(node.clone()),
            Selection::Multiple(nodes) => Err(NavigatorError::unsupported(format!(
                "{} needs a single member but {} are selected",
                operation,
                nodes.len()
            ))),
        }
    }

    fn replace(&mut self, node: GreenNode) -> NavigatorResult<&mut Self> {
        self.nav.replace_current(Arc::new(node))?;
        Ok(self)
    }
}

/// Statements are stored as text, so they must not close the enclosing body
fn require_balanced_braces(statements: &str) -> NavigatorResult<()> {
    let mut depth = 0usize;
    for (token, _) in tokenize(statements) {
        match token {
            Token::LBrace => depth += 1,
            Token::RBrace => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| NavigatorError::argument("statements", "unbalanced braces"))?;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(NavigatorError::argument("statements", "unbalanced braces"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
        class Account {
            private int balance;
            public Account() { }
            public void Deposit(int amount) { balance += amount; }
            public void Deposit(long amount) { }
        }
        interface ILedger {
            void Post();
        }
    "#;

    fn account(nav: &mut Navigator) -> crate::navigators::TypeNavigator<'_> {
        nav.compilation_unit().unwrap().select_class("Account").unwrap()
    }

    #[test]
    fn test_chained_member_edits() {
        let mut nav = Navigator::attach(SOURCE).unwrap();
        let mut composer = account(&mut nav).select_field("balance").unwrap().compose().unwrap();
        composer
            .rename("total")
            .unwrap()
            .set_type("long")
            .unwrap()
            .set_access_modifier(AccessModifier::Protected)
            .unwrap()
            .make_static()
            .unwrap();

        let field = nav.current_node().unwrap();
        assert_eq!(field.name(), "total");
        assert_eq!(field.green().ty.as_deref(), Some("long"));
        assert_eq!(
            field.green().modifiers,
            vec![Modifier::Protected, Modifier::Static]
        );
        assert!(nav.render().unwrap().contains("protected static long total;"));
    }

    #[test]
    fn test_static_toggles_are_idempotent() {
        let mut nav = Navigator::attach(SOURCE).unwrap();
        let mut composer = account(&mut nav).select_field("balance").unwrap().compose().unwrap();
        composer.make_non_static().unwrap();
        let generation = composer.nav.root().unwrap().generation();
        composer.make_non_static().unwrap();
        assert_eq!(nav.root().unwrap().generation(), generation);
    }

    #[test]
    fn test_rename_rejects_invalid_identifier() {
        let mut nav = Navigator::attach(SOURCE).unwrap();
        let mut composer = account(&mut nav).select_field("balance").unwrap().compose().unwrap();
        assert!(matches!(
            composer.rename("two words"),
            Err(NavigatorError::Parse(_))
        ));
        assert!(matches!(
            composer.rename("  "),
            Err(NavigatorError::Argument { .. })
        ));
        assert_eq!(nav.current_node().unwrap().name(), "balance");
    }

    #[test]
    fn test_set_body_and_type_restrictions() {
        let mut nav = Navigator::attach(SOURCE).unwrap();
        let mut composer = account(&mut nav).select_constructor(&[]).unwrap().compose().unwrap();
        assert!(matches!(
            composer.set_type("int"),
            Err(NavigatorError::UnsupportedOperation(_))
        ));
        assert!(matches!(
            composer.rename("Other"),
            Err(NavigatorError::UnsupportedOperation(_))
        ));
        composer.set_body("balance = 0;").unwrap();
        assert!(nav.render().unwrap().contains("public Account() {\n        balance = 0;\n    }"));

        let mut composer = nav
            .compilation_unit()
            .unwrap()
            .select_interface("ILedger")
            .unwrap()
            .select_method("Post")
            .unwrap()
            .compose()
            .unwrap();
        assert!(matches!(
            composer.set_body("return;"),
            Err(NavigatorError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_set_body_rejects_unbalanced_braces() {
        let mut nav = Navigator::attach(SOURCE).unwrap();
        let before = nav.render().unwrap();
        let mut composer = account(&mut nav).select_constructor(&[]).unwrap().compose().unwrap();
        for statements in ["} int x; {", "if (ok) { return;", "return; }"] {
            assert!(matches!(
                composer.set_body(statements),
                Err(NavigatorError::Argument { .. })
            ));
        }
        assert_eq!(nav.render().unwrap(), before);

        let mut composer = account(&mut nav).select_constructor(&[]).unwrap().compose().unwrap();
        composer.set_body(r#"if (ok) { Log("}"); }"#).unwrap();
        assert!(nav.render().unwrap().contains(r#"Log("}");"#));
    }

    #[test]
    fn test_parent_pivot_is_unsupported() {
        let mut nav = Navigator::attach(SOURCE).unwrap();
        account(&mut nav).select_field("balance").unwrap();
        let err = MemberComposer::new(&mut nav, Pivot::Parent).err().unwrap();
        assert!(err.to_string().contains("has no descendants which a composer can handle"));
    }

    #[test]
    fn test_group_selection_can_only_be_deleted() {
        let mut nav = Navigator::attach(SOURCE).unwrap();
        let mut composer = account(&mut nav)
            .select_overloaded_methods("Deposit")
            .unwrap()
            .compose()
            .unwrap();
        assert!(matches!(
            composer.rename("Credit"),
            Err(NavigatorError::UnsupportedOperation(_))
        ));

        let session = composer.delete().unwrap();
        let class = session.current_node().unwrap();
        assert_eq!(class.name(), "Account");
        assert_eq!(class.children_of_kind(SyntaxKind::Method).count(), 0);
    }
}
