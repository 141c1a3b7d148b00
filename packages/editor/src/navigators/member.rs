use super::anchor;
use crate::composers::{MemberComposer, Pivot};
use crate::errors::NavigatorResult;
use crate::guards::require_immediate_kind;
use crate::handlers::KindFilter;
use crate::navigator::Navigator;
use crate::selection::Selection;
use rosewood_parser::SyntaxNode;

/// Navigator over one member or a group of sibling members
pub struct MemberNavigator<'a> {
    nav: &'a mut Navigator,
}

impl<'a> MemberNavigator<'a> {
    pub fn new(nav: &'a mut Navigator, node: SyntaxNode) -> NavigatorResult<Self> {
        require_immediate_kind(Some(&node), KindFilter::AnyMember)?;
        anchor(nav, &node)?;
        Ok(Self { nav })
    }

    /// Select `nodes` as one frame
    pub fn group(nav: &'a mut Navigator, nodes: Vec<SyntaxNode>) -> NavigatorResult<Self> {
        for node in &nodes {
            require_immediate_kind(Some(node), KindFilter::AnyMember)?;
        }
        nav.push_nodes(nodes)?;
        Ok(Self { nav })
    }

    pub fn selection(&self) -> NavigatorResult<&Selection> {
        self.nav.current_selection()
    }

    /// The selected member; fails for group selections
    pub fn node(&self) -> NavigatorResult<SyntaxNode> {
        self.nav.current_node()
    }

    pub fn compose(self) -> NavigatorResult<MemberComposer<'a>> {
        MemberComposer::new(self.nav, Pivot::Immediate)
    }

    pub fn into_inner(self) -> &'a mut Navigator {
        self.nav
    }
}
