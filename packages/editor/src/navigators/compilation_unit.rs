use super::{anchor, find_type, NamespaceNavigator, TypeNavigator};
use crate::composers::{CompilationUnitComposer, Pivot};
use crate::errors::{NavigatorError, NavigatorResult};
use crate::guards::{require_immediate_kind, require_not_blank};
use crate::navigator::Navigator;
use rosewood_parser::{SyntaxKind, SyntaxNode};

pub struct CompilationUnitNavigator<'a> {
    nav: &'a mut Navigator,
    node: SyntaxNode,
}

impl<'a> CompilationUnitNavigator<'a> {
    pub fn new(nav: &'a mut Navigator, node: SyntaxNode) -> NavigatorResult<Self> {
        require_immediate_kind(Some(&node), SyntaxKind::CompilationUnit)?;
        anchor(nav, &node)?;
        Ok(Self { nav, node })
    }

    pub fn node(&self) -> &SyntaxNode {
        &self.node
    }

    /// First namespace with this exact (qualified) name, nested ones included
    pub fn select_namespace(self, name: &str) -> NavigatorResult<NamespaceNavigator<'a>> {
        require_not_blank(name, "name")?;
        let found = self
            .node
            .descendants()
            .into_iter()
            .find(|n| n.kind() == SyntaxKind::Namespace && n.name() == name)
            .ok_or_else(|| NavigatorError::not_found(format!("namespace `{}`", name)))?;
        NamespaceNavigator::new(self.nav, found)
    }

    /// First class, struct or interface named `name` anywhere in the unit
    pub fn select_type(self, name: &str) -> NavigatorResult<TypeNavigator<'a>> {
        let found = find_type(&self.node, None, name)?;
        TypeNavigator::new(self.nav, found)
    }

    pub fn select_class(self, name: &str) -> NavigatorResult<TypeNavigator<'a>> {
        let found = find_type(&self.node, Some(SyntaxKind::Class), name)?;
        TypeNavigator::new(self.nav, found)
    }

    pub fn select_struct(self, name: &str) -> NavigatorResult<TypeNavigator<'a>> {
        let found = find_type(&self.node, Some(SyntaxKind::Struct), name)?;
        TypeNavigator::new(self.nav, found)
    }

    pub fn select_interface(self, name: &str) -> NavigatorResult<TypeNavigator<'a>> {
        let found = find_type(&self.node, Some(SyntaxKind::Interface), name)?;
        TypeNavigator::new(self.nav, found)
    }

    /// Select a using directive, e.g. to delete it
    pub fn select_using(self, name: &str) -> NavigatorResult<&'a mut Navigator> {
        require_not_blank(name, "name")?;
        let found = self
            .node
            .children_of_kind(SyntaxKind::UsingDirective)
            .find(|n| n.name() == name)
            .ok_or_else(|| NavigatorError::not_found(format!("using directive `{}`", name)))?;
        self.nav.push_node(found)?;
        Ok(self.nav)
    }

    pub fn compose(self) -> NavigatorResult<CompilationUnitComposer<'a>> {
        CompilationUnitComposer::new(self.nav, Pivot::Immediate)
    }

    pub fn into_inner(self) -> &'a mut Navigator {
        self.nav
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
        using System;
        using System.Linq;
        namespace App.Core {
            class Service { }
            interface IService { }
        }
        struct Point { }
    "#;

    #[test]
    fn test_select_namespace_and_types() {
        let mut nav = Navigator::attach(SOURCE).unwrap();
        let ns = nav.compilation_unit().unwrap().select_namespace("App.Core").unwrap();
        assert_eq!(ns.node().kind(), SyntaxKind::Namespace);

        let point = nav.compilation_unit().unwrap().select_struct("Point").unwrap();
        assert_eq!(point.node().name(), "Point");
        assert_eq!(nav.stack().len(), 2);

        let service = nav.compilation_unit().unwrap().select_type("IService").unwrap();
        assert_eq!(service.node().kind(), SyntaxKind::Interface);
    }

    #[test]
    fn test_kind_specific_finders_do_not_cross_kinds() {
        let mut nav = Navigator::attach(SOURCE).unwrap();
        let err = nav
            .compilation_unit()
            .unwrap()
            .select_class("Point")
            .err()
            .unwrap();
        assert!(matches!(err, NavigatorError::NotFound(_)));
        assert_eq!(nav.stack().len(), 1);
    }

    #[test]
    fn test_blank_name_is_argument_error() {
        let mut nav = Navigator::attach(SOURCE).unwrap();
        let err = nav.compilation_unit().unwrap().select_type(" ").err().unwrap();
        assert!(matches!(err, NavigatorError::Argument { .. }));
    }

    #[test]
    fn test_select_using() {
        let mut nav = Navigator::attach(SOURCE).unwrap();
        let session = nav.compilation_unit().unwrap().select_using("System.Linq").unwrap();
        assert_eq!(
            session.current_node().unwrap().kind(),
            SyntaxKind::UsingDirective
        );
    }
}
