use super::{
    delete_container, enter_pivot, insert_child, resolve_pivot, rewrite_container,
    validate_qualified_name, Focus, Pivot, PivotNodes,
};
use crate::errors::NavigatorResult;
use crate::handlers::KindFilter;
use crate::navigator::Navigator;
use rosewood_parser::{SyntaxKind, TypeOptions};
use std::sync::Arc;

pub struct NamespaceComposer<'a> {
    nav: &'a mut Navigator,
}

impl<'a> NamespaceComposer<'a> {
    pub fn new(nav: &'a mut Navigator, pivot: Pivot) -> NavigatorResult<Self> {
        enter_pivot(nav, pivot, KindFilter::Exact(SyntaxKind::Namespace))?;
        Ok(Self { nav })
    }

    pub fn add_type(&mut self, options: &TypeOptions) -> NavigatorResult<&mut Self> {
        let decl = options.build(self.nav.ids_mut())?;
        let pivot = self.pivot()?;
        insert_child(self.nav, &pivot, pivot.insertion_index(), decl)?;
        Ok(self)
    }

    pub fn rename(&mut self, name: &str) -> NavigatorResult<&mut Self> {
        validate_qualified_name(name)?;
        let pivot = self.pivot()?;
        let updated = pivot.container.green().with_name(name);
        rewrite_container(self.nav, &pivot, Arc::new(updated), Focus::Anchor)?;
        Ok(self)
    }

    /// Delete the namespace and everything in it
    pub fn delete(self) -> NavigatorResult<&'a mut Navigator> {
        let pivot = self.pivot()?;
        delete_container(self.nav, &pivot)?;
        Ok(self.nav)
    }

    pub fn into_inner(self) -> &'a mut Navigator {
        self.nav
    }

    fn pivot(&self) -> NavigatorResult<PivotNodes> {
        resolve_pivot(self.nav, KindFilter::Exact(SyntaxKind::Namespace))
    }
}
