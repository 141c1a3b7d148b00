use super::{anchor, MemberNavigator};
use crate::composers::{Pivot, TypeComposer};
use crate::errors::{NavigatorError, NavigatorResult};
use crate::guards::{require_immediate_kind, require_not_blank};
use crate::handlers::KindFilter;
use crate::navigator::Navigator;
use rosewood_parser::{SyntaxKind, SyntaxNode};

/// Navigator over a class, struct or interface
pub struct TypeNavigator<'a> {
    nav: &'a mut Navigator,
    node: SyntaxNode,
}

impl<'a> TypeNavigator<'a> {
    pub fn new(nav: &'a mut Navigator, node: SyntaxNode) -> NavigatorResult<Self> {
        require_immediate_kind(Some(&node), KindFilter::AnyType)?;
        anchor(nav, &node)?;
        Ok(Self { nav, node })
    }

    pub fn node(&self) -> &SyntaxNode {
        &self.node
    }

    pub fn select_field(self, name: &str) -> NavigatorResult<MemberNavigator<'a>> {
        self.select_named(SyntaxKind::Field, name, false)
    }

    pub fn select_last_field(self, name: &str) -> NavigatorResult<MemberNavigator<'a>> {
        self.select_named(SyntaxKind::Field, name, true)
    }

    pub fn select_property(self, name: &str) -> NavigatorResult<MemberNavigator<'a>> {
        self.select_named(SyntaxKind::Property, name, false)
    }

    pub fn select_last_property(self, name: &str) -> NavigatorResult<MemberNavigator<'a>> {
        self.select_named(SyntaxKind::Property, name, true)
    }

    /// First method named `name`, whatever its parameters
    pub fn select_method(self, name: &str) -> NavigatorResult<MemberNavigator<'a>> {
        self.select_named(SyntaxKind::Method, name, false)
    }

    pub fn select_last_method(self, name: &str) -> NavigatorResult<MemberNavigator<'a>> {
        self.select_named(SyntaxKind::Method, name, true)
    }

    /// Method named `name` whose parameter types are exactly `parameter_types`
    pub fn select_method_with_params(
        self,
        name: &str,
        parameter_types: &[&str],
    ) -> NavigatorResult<MemberNavigator<'a>> {
        require_not_blank(name, "name")?;
        let found = self
            .node
            .children_of_kind(SyntaxKind::Method)
            .find(|m| m.name() == name && m.green().parameter_types() == parameter_types)
            .ok_or_else(|| {
                NavigatorError::not_found(format!(
                    "method `{}({})` in {} `{}`",
                    name,
                    parameter_types.join(", "),
                    self.node.kind(),
                    self.node.name()
                ))
            })?;
        MemberNavigator::new(self.nav, found)
    }

    /// Every overload of `name`, selected together
    pub fn select_overloaded_methods(self, name: &str) -> NavigatorResult<MemberNavigator<'a>> {
        require_not_blank(name, "name")?;
        let overloads: Vec<SyntaxNode> = self
            .node
            .children_of_kind(SyntaxKind::Method)
            .filter(|m| m.name() == name)
            .collect();
        if overloads.is_empty() {
            return Err(self.missing(SyntaxKind::Method, name));
        }
        MemberNavigator::group(self.nav, overloads)
    }

    /// Every constructor, selected together
    pub fn select_constructors(self) -> NavigatorResult<MemberNavigator<'a>> {
        let constructors: Vec<SyntaxNode> =
            self.node.children_of_kind(SyntaxKind::Constructor).collect();
        if constructors.is_empty() {
            return Err(self.missing(SyntaxKind::Constructor, self.node.name()));
        }
        MemberNavigator::group(self.nav, constructors)
    }

    pub fn select_parameterless_constructor(self) -> NavigatorResult<MemberNavigator<'a>> {
        self.select_constructor(&[])
    }

    /// Constructor whose parameter types are exactly `parameter_types`
    pub fn select_constructor(self, parameter_types: &[&str]) -> NavigatorResult<MemberNavigator<'a>> {
        let found = self
            .node
            .children_of_kind(SyntaxKind::Constructor)
            .find(|c| c.green().parameter_types() == parameter_types)
            .ok_or_else(|| {
                NavigatorError::not_found(format!(
                    "constructor `{}({})`",
                    self.node.name(),
                    parameter_types.join(", ")
                ))
            })?;
        MemberNavigator::new(self.nav, found)
    }

    pub fn select_last_constructor(self) -> NavigatorResult<MemberNavigator<'a>> {
        let found = self
            .node
            .children_of_kind(SyntaxKind::Constructor)
            .last()
            .ok_or_else(|| self.missing(SyntaxKind::Constructor, self.node.name()))?;
        MemberNavigator::new(self.nav, found)
    }

    pub fn select_destructor(self) -> NavigatorResult<MemberNavigator<'a>> {
        let found = self
            .node
            .children_of_kind(SyntaxKind::Destructor)
            .next()
            .ok_or_else(|| self.missing(SyntaxKind::Destructor, self.node.name()))?;
        MemberNavigator::new(self.nav, found)
    }

    /// Class, struct or interface declared directly in this type
    pub fn select_nested_type(self, name: &str) -> NavigatorResult<TypeNavigator<'a>> {
        require_not_blank(name, "name")?;
        let found = self
            .node
            .children()
            .find(|c| c.kind().is_type() && c.name() == name)
            .ok_or_else(|| self.missing_type(name))?;
        TypeNavigator::new(self.nav, found)
    }

    pub fn compose(self) -> NavigatorResult<TypeComposer<'a>> {
        TypeComposer::new(self.nav, Pivot::Immediate)
    }

    pub fn into_inner(self) -> &'a mut Navigator {
        self.nav
    }

    fn select_named(
        self,
        kind: SyntaxKind,
        name: &str,
        last: bool,
    ) -> NavigatorResult<MemberNavigator<'a>> {
        require_not_blank(name, "name")?;
        let found = {
            let mut matching = self
                .node
                .children_of_kind(kind)
                .filter(|c| c.name() == name);
            if last {
                matching.last()
            } else {
                matching.next()
            }
        };
        let found = found.ok_or_else(|| self.missing(kind, name))?;
        MemberNavigator::new(self.nav, found)
    }

    fn missing(&self, kind: SyntaxKind, name: &str) -> NavigatorError {
        NavigatorError::not_found(format!(
            "{} `{}` in {} `{}`",
            kind,
            name,
            self.node.kind(),
            self.node.name()
        ))
    }

    fn missing_type(&self, name: &str) -> NavigatorError {
        NavigatorError::not_found(format!(
            "nested type `{}` in {} `{}`",
            name,
            self.node.kind(),
            self.node.name()
        ))
    }
}
