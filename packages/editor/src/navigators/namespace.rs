use super::{anchor, find_type, TypeNavigator};
use crate::composers::{NamespaceComposer, Pivot};
use crate::errors::NavigatorResult;
use crate::guards::require_immediate_kind;
use crate::navigator::Navigator;
use rosewood_parser::{SyntaxKind, SyntaxNode};

pub struct NamespaceNavigator<'a> {
    nav: &'a mut Navigator,
    node: SyntaxNode,
}

impl<'a> NamespaceNavigator<'a> {
    pub fn new(nav: &'a mut Navigator, node: SyntaxNode) -> NavigatorResult<Self> {
        require_immediate_kind(Some(&node), SyntaxKind::Namespace)?;
        anchor(nav, &node)?;
        Ok(Self { nav, node })
    }

    pub fn node(&self) -> &SyntaxNode {
        &self.node
    }

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

    pub fn compose(self) -> NavigatorResult<NamespaceComposer<'a>> {
        NamespaceComposer::new(self.nav, Pivot::Immediate)
    }

    pub fn into_inner(self) -> &'a mut Navigator {
        self.nav
    }
}
