//! The editing session: selection stack, live snapshot, id generator,
//! configuration and handler chain, threaded explicitly through every
//! navigator and composer.

use crate::config::EditorConfig;
use crate::errors::{NavigatorError, NavigatorResult};
use crate::handlers::{Context, Descended, HandlerChain, KindFilter, NavigatorFactory};
use crate::navigators::CompilationUnitNavigator;
use crate::selection::{Selection, SelectionStack};
use rosewood_common::{CommonError, FileSystem};
use rosewood_parser::{
    parse_with_generator, render_with_indent, IdGenerator, SyntaxKind, SyntaxNode,
    TrackedSnapshot,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, instrument};

const ANONYMOUS_PATH: &str = "<anonymous>";

#[derive(Debug)]
pub struct Navigator {
    pub(crate) stack: SelectionStack,
    pub(crate) snapshot: Option<TrackedSnapshot>,
    ids: IdGenerator,
    config: EditorConfig,
    handlers: Arc<HandlerChain>,
    source_path: Option<PathBuf>,
}

impl Navigator {
    /// Parse `text` and anchor a new session on its root
    pub fn attach(text: &str) -> NavigatorResult<Self> {
        Self::attach_with(text, ANONYMOUS_PATH, EditorConfig::default())
    }

    pub fn attach_with(text: &str, path: &str, config: EditorConfig) -> NavigatorResult<Self> {
        let mut ids = IdGenerator::new(path);
        let root = parse_with_generator(text, &mut ids)?;
        debug!(path, nodes = root.tree().len(), "Attached to document");
        Self::attach_root(root, ids, config)
    }

    /// Anchor a session on an already parsed root. `ids` must be the generator
    /// the root was parsed with.
    pub fn attach_root(
        root: SyntaxNode,
        ids: IdGenerator,
        config: EditorConfig,
    ) -> NavigatorResult<Self> {
        if !root.is_root() {
            return Err(NavigatorError::invalid_state(format!(
                "cannot attach to {} `{}`: it is not a tree root",
                root.kind(),
                root.name()
            )));
        }

        Ok(Self {
            stack: SelectionStack::with_root(root),
            snapshot: None,
            ids,
            config,
            handlers: Arc::new(HandlerChain::standard()),
            source_path: None,
        })
    }

    #[instrument(skip(fs, path, config), fields(path = %path.display()))]
    pub fn open(fs: &dyn FileSystem, path: &Path, config: EditorConfig) -> NavigatorResult<Self> {
        let text = fs.read_to_string(path).map_err(CommonError::from)?;
        let mut nav = Self::attach_with(&text, &path.to_string_lossy(), config)?;
        nav.source_path = Some(path.to_path_buf());
        Ok(nav)
    }

    /// Render the current generation into `path`, or into the file the session
    /// was opened from
    pub fn save(&self, fs: &mut dyn FileSystem, path: Option<&Path>) -> NavigatorResult<()> {
        let path = path
            .or(self.source_path.as_deref())
            .ok_or_else(|| NavigatorError::invalid_state("session is not file-backed"))?;
        let text = self.render()?;
        fs.write(path, &text).map_err(CommonError::from)?;
        debug!(path = %path.display(), bytes = text.len(), "Saved document");
        Ok(())
    }

    pub fn render(&self) -> NavigatorResult<String> {
        Ok(render_with_indent(&self.root()?, self.config.indent))
    }

    /// Root of the active tree generation
    pub fn root(&self) -> NavigatorResult<SyntaxNode> {
        self.stack
            .root()
            .cloned()
            .ok_or_else(|| NavigatorError::invalid_state("no selected tree root"))
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn ids_mut(&mut self) -> &mut IdGenerator {
        &mut self.ids
    }

    pub fn stack(&self) -> &SelectionStack {
        &self.stack
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn handlers(&self) -> &HandlerChain {
        &self.handlers
    }

    /// Replace the session's handler chain
    pub fn set_handlers(&mut self, chain: HandlerChain) {
        self.handlers = Arc::new(chain);
    }

    /// Append a handler to this session's chain
    pub fn register_handler<F>(
        &mut self,
        filter: impl Into<KindFilter>,
        label: impl Into<String>,
        factory: F,
    ) where
        F: for<'a> Fn(&'a mut Navigator, SyntaxNode) -> NavigatorResult<Descended<'a>>
            + Send
            + Sync
            + 'static,
    {
        Arc::make_mut(&mut self.handlers).register(filter, label, factory);
    }

    pub fn push_node(&mut self, node: SyntaxNode) -> NavigatorResult<()> {
        self.stack.push(Selection::Single(node))
    }

    pub fn push_nodes(&mut self, nodes: Vec<SyntaxNode>) -> NavigatorResult<()> {
        self.stack.push(Selection::Multiple(nodes))
    }

    pub fn pop(&mut self) -> NavigatorResult<Selection> {
        self.stack.pop()
    }

    pub fn pop_until(&mut self, kind: SyntaxKind) -> NavigatorResult<SyntaxNode> {
        self.stack.pop_until(kind).cloned()
    }

    /// Clear the stack and anchor it on `node`. The node must come from a
    /// tree numbered by this session's id generator, so that new
    /// declarations never collide with its ids.
    pub fn set_head(&mut self, node: SyntaxNode) -> NavigatorResult<()> {
        if node.id().seed() != self.ids.seed() {
            return Err(NavigatorError::argument(
                "node",
                format!(
                    "{} `{}` was numbered by another document (seed {:08x}, expected {:08x})",
                    node.kind(),
                    node.name(),
                    node.id().seed(),
                    self.ids.seed()
                ),
            ));
        }
        self.snapshot = None;
        self.stack.set_head(node);
        Ok(())
    }

    pub fn current_selection(&self) -> NavigatorResult<&Selection> {
        self.stack.peek()
    }

    /// Node of the current frame, which must be a single selection
    pub fn current_node(&self) -> NavigatorResult<SyntaxNode> {
        match self.stack.peek()? {
            Selection::Single(node) => Ok(node.clone()),
            Selection::Multiple(nodes) => Err(NavigatorError::invalid_state(format!(
                "the current selection holds {} nodes, expected one",
                nodes.len()
            ))),
        }
    }

    pub fn current_nodes(&self) -> NavigatorResult<Vec<SyntaxNode>> {
        Ok(self.stack.peek()?.nodes().to_vec())
    }

    /// Navigator over the compilation unit, unwinding the stack to it
    pub fn compilation_unit(&mut self) -> NavigatorResult<CompilationUnitNavigator<'_>> {
        let root = self.pop_until(SyntaxKind::CompilationUnit)?;
        CompilationUnitNavigator::new(self, root)
    }

    /// Select the first node of `kind` at or below the current node and hand
    /// it to the handler chain
    #[instrument(skip(self), fields(frames = self.stack.len()))]
    pub fn descend(&mut self, kind: SyntaxKind) -> NavigatorResult<Descended<'_>> {
        let factory: NavigatorFactory = Arc::clone(&self.handlers.handler_for(kind)?.factory);
        let current = self.current_node()?;
        let target = if current.kind() == kind {
            current
        } else {
            current
                .descendants()
                .into_iter()
                .find(|node| node.kind() == kind)
                .ok_or_else(|| {
                    NavigatorError::not_found(format!(
                        "no {} below {} `{}`",
                        kind,
                        current.kind(),
                        current.name()
                    ))
                })?
        };

        debug!(target = %target.name(), kind = %target.kind(), "Descending");
        factory(self, target)
    }

    /// Dispatch `context` through this session's handler chain
    pub fn dispatch(&mut self, context: Context) -> NavigatorResult<Descended<'_>> {
        let chain = Arc::clone(&self.handlers);
        chain.dispatch(self, context)
    }

    /// Run `edit`; if it fails, restore the stack and snapshot it started with
    pub fn transaction<T>(
        &mut self,
        edit: impl FnOnce(&mut Navigator) -> NavigatorResult<T>,
    ) -> NavigatorResult<T> {
        let stack = self.stack.clone();
        let snapshot = self.snapshot.clone();

        let result = edit(self);
        if result.is_err() {
            self.stack = stack;
            self.snapshot = snapshot;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosewood_common::MockFileSystem;

    const SOURCE: &str = "namespace N { class T { int a; } }";

    #[test]
    fn test_attach_anchors_on_root() {
        let nav = Navigator::attach(SOURCE).unwrap();
        assert_eq!(nav.stack().len(), 1);
        assert_eq!(nav.current_node().unwrap().kind(), SyntaxKind::CompilationUnit);
        assert!(!nav.has_snapshot());
    }

    #[test]
    fn test_attach_root_requires_root() {
        let mut ids = IdGenerator::new("/T.cs");
        let root = parse_with_generator(SOURCE, &mut ids).unwrap();
        let ns = root.children().next().unwrap();
        let err = Navigator::attach_root(ns, ids, EditorConfig::default()).unwrap_err();
        assert!(matches!(err, NavigatorError::InvalidState(_)));
    }

    #[test]
    fn test_attach_reports_parse_errors() {
        let err = Navigator::attach("class { }").unwrap_err();
        assert!(matches!(err, NavigatorError::Parse(_)));
    }

    #[test]
    fn test_descend_selects_first_of_kind() {
        let mut nav = Navigator::attach(SOURCE).unwrap();
        let descended = nav.descend(SyntaxKind::Class).unwrap();
        assert_eq!(descended.name(), "type navigator");
        assert_eq!(nav.current_node().unwrap().name(), "T");
        assert_eq!(nav.stack().len(), 2);
    }

    #[test]
    fn test_descend_unsupported_kind_leaves_stack() {
        let mut nav = Navigator::attach("using System; class T { }").unwrap();
        let err = nav.descend(SyntaxKind::UsingDirective).err().unwrap();
        assert!(matches!(err, NavigatorError::UnsupportedOperation(_)));
        assert_eq!(nav.stack().len(), 1);
    }

    #[test]
    fn test_open_and_save_through_filesystem() {
        let mut fs = MockFileSystem::new();
        fs.add_file("/src/T.cs", SOURCE);

        let nav = Navigator::open(&fs, Path::new("/src/T.cs"), EditorConfig::default()).unwrap();
        assert_eq!(nav.source_path(), Some(Path::new("/src/T.cs")));
        nav.save(&mut fs, None).unwrap();
        assert_eq!(
            fs.files[Path::new("/src/T.cs")],
            "namespace N {\n    class T {\n        int a;\n    }\n}\n"
        );

        let missing = Navigator::open(&fs, Path::new("/nope.cs"), EditorConfig::default());
        assert!(matches!(missing, Err(NavigatorError::Common(CommonError::Io(_)))));
    }

    #[test]
    fn test_set_head_requires_same_id_seed() {
        let mut nav = Navigator::attach_with(SOURCE, "/T.cs", EditorConfig::default()).unwrap();
        let other = parse_with_generator(SOURCE, &mut IdGenerator::new("/Other.cs")).unwrap();
        let err = nav.set_head(other).unwrap_err();
        assert!(matches!(err, NavigatorError::Argument { .. }));
        assert_eq!(nav.stack().len(), 1);

        let mut ids = IdGenerator::new("/T.cs");
        let reparsed = parse_with_generator(SOURCE, &mut ids).unwrap();
        nav.set_head(reparsed.clone()).unwrap();
        assert_eq!(nav.root().unwrap(), reparsed);
    }

    #[test]
    fn test_transaction_restores_on_error() {
        let mut nav = Navigator::attach(SOURCE).unwrap();
        let result: NavigatorResult<()> = nav.transaction(|nav| {
            let ns = nav.root()?.children().next().unwrap();
            nav.push_node(ns)?;
            Err(NavigatorError::invalid_state("boom"))
        });
        assert!(result.is_err());
        assert_eq!(nav.stack().len(), 1);
    }
}
