use crate::errors::{NavigatorError, NavigatorResult};
use crate::navigator::Navigator;
use crate::rebind::RebindReport;
use crate::selection::Selection;
use rosewood_parser::{remove, SyntaxKind, SyntaxNode};
use tracing::{debug, instrument};

impl Navigator {
    /// Remove the current selection from its parent, which must be of
    /// `expected_parent_kind`. The parent becomes the current selection.
    ///
    /// Everything is validated before the stack is touched, and the stack is
    /// restored if the edit itself fails.
    #[instrument(skip(self), fields(frames = self.stack.len()))]
    pub fn delete_selected(
        &mut self,
        expected_parent_kind: SyntaxKind,
    ) -> NavigatorResult<RebindReport> {
        let members: Vec<SyntaxNode> = match self.stack.peek()? {
            Selection::Single(node) => vec![node.clone()],
            Selection::Multiple(nodes) => nodes.clone(),
        };
        let first = members
            .first()
            .ok_or_else(|| NavigatorError::invalid_state("the current selection is empty"))?;

        let parent = first.parent().ok_or_else(|| {
            NavigatorError::invalid_action(format!(
                "cannot delete {} `{}`: it has no parent",
                first.kind(),
                first.name()
            ))
        })?;
        if let Some(stray) = members
            .iter()
            .find(|member| member.parent().as_ref() != Some(&parent))
        {
            return Err(NavigatorError::invalid_state(format!(
                "selected {} `{}` does not share the parent {} `{}`",
                stray.kind(),
                stray.name(),
                parent.kind(),
                parent.name()
            )));
        }
        if parent.kind() != expected_parent_kind {
            return Err(NavigatorError::invalid_action(format!(
                "cannot delete from {} `{}`: expected the parent to be a {}",
                parent.kind(),
                parent.name(),
                expected_parent_kind
            )));
        }
        if self.stack.len() < 2 {
            return Err(NavigatorError::invalid_state(
                "cannot delete the only frame of the selection stack",
            ));
        }

        let new_parent = remove(&parent, &members)?;
        debug!(
            removed = members.len(),
            parent = %parent.name(),
            "Deleting selected nodes"
        );

        self.transaction(|nav| {
            nav.pop()?;
            if nav.current_node().ok().as_ref() != Some(&parent) {
                nav.push_node(parent.clone())?;
            }
            nav.prepare_snapshot()?;
            nav.replace_and_rebind(&parent, new_parent)
        })
    }
}
