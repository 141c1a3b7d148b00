use super::{delete_container, enter_pivot, insert_child, resolve_pivot, rewrite_container, Focus, Pivot, PivotNodes};
use crate::errors::{NavigatorError, NavigatorResult};
use crate::guards::require_not_blank;
use crate::handlers::KindFilter;
use crate::navigator::Navigator;
use rosewood_parser::{
    parse_member, validate_identifier, AccessModifier, FieldOptions, GreenNode, MethodOptions,
    PropertyOptions, SyntaxKind, TypeOptions,
};
use std::sync::Arc;
use tracing::debug;

/// Edits a class, struct or interface, either selected itself or through
/// one of its selected members
pub struct TypeComposer<'a> {
    nav: &'a mut Navigator,
}

impl<'a> TypeComposer<'a> {
    pub fn new(nav: &'a mut Navigator, pivot: Pivot) -> NavigatorResult<Self> {
        enter_pivot(nav, pivot, KindFilter::AnyType)?;
        Ok(Self { nav })
    }

    pub fn add_field(&mut self, options: &FieldOptions) -> NavigatorResult<&mut Self> {
        let field = options.build(self.nav.ids_mut())?;
        self.add(field)
    }

    pub fn add_property(&mut self, options: &PropertyOptions) -> NavigatorResult<&mut Self> {
        let property = options.build(self.nav.ids_mut())?;
        self.add(property)
    }

    pub fn add_method(&mut self, options: &MethodOptions) -> NavigatorResult<&mut Self> {
        let method = options.build(self.nav.ids_mut())?;
        self.add(method)
    }

    /// Add a nested type
    pub fn add_type(&mut self, options: &TypeOptions) -> NavigatorResult<&mut Self> {
        let decl = options.build(self.nav.ids_mut())?;
        self.add(decl)
    }

    /// Parse a single member declaration and add it
    pub fn add_member_source(&mut self, source: &str) -> NavigatorResult<&mut Self> {
        require_not_blank(source, "source")?;
        let member = parse_member(source, self.nav.ids_mut())?;
        self.add(member)
    }

    /// Rename the type along with its constructors and destructor
    pub fn rename(&mut self, name: &str) -> NavigatorResult<&mut Self> {
        require_not_blank(name, "name")?;
        validate_identifier(name)?;
        let pivot = self.pivot()?;
        let green = pivot.container.green();
        let children = green
            .children
            .iter()
            .map(|child| match child.kind {
                SyntaxKind::Constructor | SyntaxKind::Destructor => Arc::new(child.with_name(name)),
                _ => Arc::clone(child),
            })
            .collect();
        let updated = green.with_name(name).with_children(children);
        self.rewrite(&pivot, updated)
    }

    pub fn set_base_types(&mut self, base_types: Vec<String>) -> NavigatorResult<&mut Self> {
        for base in &base_types {
            require_not_blank(base, "base_types")?;
        }
        let pivot = self.pivot()?;
        let updated = pivot.container.green().with_base_types(base_types);
        self.rewrite(&pivot, updated)
    }

    pub fn set_access_modifier(&mut self, access: AccessModifier) -> NavigatorResult<&mut Self> {
        let pivot = self.pivot()?;
        let green = pivot.container.green();
        let updated = green.with_modifiers(access.apply(&green.modifiers));
        self.rewrite(&pivot, updated)
    }

    /// Delete the type from its parent, which becomes current
    pub fn delete(self) -> NavigatorResult<&'a mut Navigator> {
        let pivot = self.pivot()?;
        delete_container(self.nav, &pivot)?;
        Ok(self.nav)
    }

    pub fn into_inner(self) -> &'a mut Navigator {
        self.nav
    }

    fn pivot(&self) -> NavigatorResult<PivotNodes> {
        resolve_pivot(self.nav, KindFilter::AnyType)
    }

    fn add(&mut self, member: Arc<GreenNode>) -> NavigatorResult<&mut Self> {
        let pivot = self.pivot()?;
        let member = fit_to_container(pivot.container.kind(), member)?;
        insert_child(self.nav, &pivot, pivot.insertion_index(), member)?;
        Ok(self)
    }

    fn rewrite(&mut self, pivot: &PivotNodes, updated: GreenNode) -> NavigatorResult<&mut Self> {
        debug!(kind = %pivot.container.kind(), name = %updated.name, "Rewriting type");
        rewrite_container(self.nav, pivot, Arc::new(updated), Focus::Anchor)?;
        Ok(self)
    }
}

/// Interfaces declare no state and no bodies
fn fit_to_container(
    container: SyntaxKind,
    member: Arc<GreenNode>,
) -> NavigatorResult<Arc<GreenNode>> {
    if container != SyntaxKind::Interface {
        return Ok(member);
    }
    match member.kind {
        SyntaxKind::Field | SyntaxKind::Constructor | SyntaxKind::Destructor => {
            Err(NavigatorError::unsupported(format!(
                "an interface cannot declare {} `{}`",
                member.kind, member.name
            )))
        }
        SyntaxKind::Method if member.body.is_some() => Ok(Arc::new(member.with_body(None))),
        _ => Ok(member),
    }
}
