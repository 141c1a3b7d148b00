use super::{
    enter_pivot, insert_child, resolve_pivot, rewrite_container, validate_qualified_name, Focus,
    Pivot, PivotNodes,
};
use crate::errors::NavigatorResult;
use crate::handlers::KindFilter;
use crate::navigator::Navigator;
use rosewood_parser::{GreenNode, SyntaxKind, TypeOptions};
use std::sync::Arc;

pub struct CompilationUnitComposer<'a> {
    nav: &'a mut Navigator,
}

impl<'a> CompilationUnitComposer<'a> {
    pub fn new(nav: &'a mut Navigator, pivot: Pivot) -> NavigatorResult<Self> {
        enter_pivot(nav, pivot, KindFilter::Exact(SyntaxKind::CompilationUnit))?;
        Ok(Self { nav })
    }

    /// Add `using name;` after the existing directives. Adding a directive
    /// that is already present does nothing.
    pub fn add_using(&mut self, name: &str) -> NavigatorResult<&mut Self> {
        validate_qualified_name(name)?;
        let pivot = self.pivot()?;
        if pivot
            .container
            .children_of_kind(SyntaxKind::UsingDirective)
            .any(|using| using.name() == name)
        {
            return Ok(self);
        }

        let using = GreenNode::new(self.nav.ids_mut().new_id(), SyntaxKind::UsingDirective, name);
        let updated = pivot
            .container
            .green()
            .with_child_inserted(usings_end(&pivot), Arc::new(using));
        rewrite_container(self.nav, &pivot, Arc::new(updated), Focus::Anchor)?;
        Ok(self)
    }

    pub fn add_namespace(&mut self, name: &str) -> NavigatorResult<&mut Self> {
        validate_qualified_name(name)?;
        let namespace = GreenNode::new(self.nav.ids_mut().new_id(), SyntaxKind::Namespace, name);
        self.add(Arc::new(namespace))
    }

    pub fn add_type(&mut self, options: &TypeOptions) -> NavigatorResult<&mut Self> {
        let decl = options.build(self.nav.ids_mut())?;
        self.add(decl)
    }

    pub fn into_inner(self) -> &'a mut Navigator {
        self.nav
    }

    fn pivot(&self) -> NavigatorResult<PivotNodes> {
        resolve_pivot(self.nav, KindFilter::Exact(SyntaxKind::CompilationUnit))
    }

    fn add(&mut self, decl: Arc<GreenNode>) -> NavigatorResult<&mut Self> {
        let pivot = self.pivot()?;
        let index = pivot.insertion_index().max(usings_end(&pivot));
        insert_child(self.nav, &pivot, index, decl)?;
        Ok(self)
    }
}

/// Index right after the last using directive
fn usings_end(pivot: &PivotNodes) -> usize {
    pivot
        .container
        .green()
        .children
        .iter()
        .rposition(|child| child.kind == SyntaxKind::UsingDirective)
        .map_or(0, |position| position + 1)
}
