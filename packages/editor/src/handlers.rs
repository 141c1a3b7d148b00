//! # Handler chain
//!
//! Decides which specialized navigator takes over when a session descends
//! into a node of a requested kind. Handlers are tried in registration order
//! and the first whose filter accepts the requested kind wins.
//!
//! The standard chain, in precedence order:
//!
//! 1. `compilation unit` → [`CompilationUnitNavigator`]
//! 2. `namespace` → [`NamespaceNavigator`]
//! 3. any type (class, struct, interface) → [`TypeNavigator`]
//! 4. any member (field, property, method, constructor, destructor, nested
//!    type) → [`MemberNavigator`]
//!
//! Types match both 3 and 4; 3 is registered first, so a class is navigated
//! as a type.

use crate::errors::{NavigatorError, NavigatorResult};
use crate::navigator::Navigator;
use crate::navigators::{
    CompilationUnitNavigator, MemberNavigator, NamespaceNavigator, TypeNavigator,
};
use rosewood_parser::{SyntaxKind, SyntaxNode};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Which requested kinds a handler accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindFilter {
    Exact(SyntaxKind),
    /// Class, struct or interface
    AnyType,
    /// Anything declarable inside a type body, nested types included
    AnyMember,
}

impl KindFilter {
    pub fn matches(self, kind: SyntaxKind) -> bool {
        match self {
            KindFilter::Exact(expected) => expected == kind,
            KindFilter::AnyType => kind.is_type(),
            KindFilter::AnyMember => kind.is_member(),
        }
    }
}

impl From<SyntaxKind> for KindFilter {
    fn from(kind: SyntaxKind) -> Self {
        KindFilter::Exact(kind)
    }
}

impl fmt::Display for KindFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KindFilter::Exact(kind) => write!(f, "{}", kind),
            KindFilter::AnyType => f.write_str("a type declaration"),
            KindFilter::AnyMember => f.write_str("a type member"),
        }
    }
}

/// Navigator produced by a dispatch
pub enum Descended<'a> {
    CompilationUnit(CompilationUnitNavigator<'a>),
    Namespace(NamespaceNavigator<'a>),
    Type(TypeNavigator<'a>),
    Member(MemberNavigator<'a>),
}

impl<'a> Descended<'a> {
    pub fn name(&self) -> &'static str {
        match self {
            Descended::CompilationUnit(_) => "compilation unit navigator",
            Descended::Namespace(_) => "namespace navigator",
            Descended::Type(_) => "type navigator",
            Descended::Member(_) => "member navigator",
        }
    }

    fn mismatch(&self, wanted: &str) -> NavigatorError {
        NavigatorError::unsupported(format!("expected a {} but got a {}", wanted, self.name()))
    }

    pub fn into_compilation_unit(self) -> NavigatorResult<CompilationUnitNavigator<'a>> {
        match self {
            Descended::CompilationUnit(nav) => Ok(nav),
            other => Err(other.mismatch("compilation unit navigator")),
        }
    }

    pub fn into_namespace(self) -> NavigatorResult<NamespaceNavigator<'a>> {
        match self {
            Descended::Namespace(nav) => Ok(nav),
            other => Err(other.mismatch("namespace navigator")),
        }
    }

    pub fn into_type(self) -> NavigatorResult<TypeNavigator<'a>> {
        match self {
            Descended::Type(nav) => Ok(nav),
            other => Err(other.mismatch("type navigator")),
        }
    }

    pub fn into_member(self) -> NavigatorResult<MemberNavigator<'a>> {
        match self {
            Descended::Member(nav) => Ok(nav),
            other => Err(other.mismatch("member navigator")),
        }
    }
}

/// Builds the navigator for a node the chain selected
pub type NavigatorFactory = Arc<
    dyn for<'a> Fn(&'a mut Navigator, SyntaxNode) -> NavigatorResult<Descended<'a>> + Send + Sync,
>;

#[derive(Clone)]
pub struct Handler {
    pub filter: KindFilter,
    pub label: String,
    pub factory: NavigatorFactory,
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("filter", &self.filter)
            .field("label", &self.label)
            .finish()
    }
}

/// One dispatch request: the node to anchor on and the kind asked for
#[derive(Debug, Clone)]
pub struct Context {
    pub current: SyntaxNode,
    pub requested: SyntaxKind,
}

impl Context {
    pub fn new(current: SyntaxNode, requested: SyntaxKind) -> Self {
        Self { current, requested }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HandlerChain {
    handlers: Vec<Handler>,
}

impl HandlerChain {
    /// Chain without handlers; every dispatch fails until one is registered
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn standard() -> Self {
        let mut chain = Self::new();
        chain.register(SyntaxKind::CompilationUnit, "compilation-unit", compilation_unit_navigator);
        chain.register(SyntaxKind::Namespace, "namespace", namespace_navigator);
        chain.register(KindFilter::AnyType, "type", type_navigator);
        chain.register(KindFilter::AnyMember, "member", member_navigator);
        chain
    }

    /// Append a handler. It loses against every handler registered before it.
    pub fn register<F>(&mut self, filter: impl Into<KindFilter>, label: impl Into<String>, factory: F)
    where
        F: for<'a> Fn(&'a mut Navigator, SyntaxNode) -> NavigatorResult<Descended<'a>>
            + Send
            + Sync
            + 'static,
    {
        self.handlers.push(Handler {
            filter: filter.into(),
            label: label.into(),
            factory: Arc::new(factory),
        });
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Labels in precedence order
    pub fn labels(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.label.as_str()).collect()
    }

    /// First handler accepting `kind`
    pub fn handler_for(&self, kind: SyntaxKind) -> NavigatorResult<&Handler> {
        self.handlers
            .iter()
            .find(|handler| handler.filter.matches(kind))
            .ok_or_else(|| {
                NavigatorError::unsupported(format!("no handler registered for {}", kind))
            })
    }

    #[instrument(skip(self, nav, context), fields(current = %context.current.kind(), requested = %context.requested))]
    pub fn dispatch<'a>(
        &self,
        nav: &'a mut Navigator,
        context: Context,
    ) -> NavigatorResult<Descended<'a>> {
        let handler = self.handler_for(context.requested)?;
        debug!(handler = %handler.label, node = %context.current.name(), "Dispatching descent");
        (handler.factory)(nav, context.current)
    }
}

fn compilation_unit_navigator(
    nav: &mut Navigator,
    node: SyntaxNode,
) -> NavigatorResult<Descended<'_>> {
    Ok(Descended::CompilationUnit(CompilationUnitNavigator::new(nav, node)?))
}

fn namespace_navigator(nav: &mut Navigator, node: SyntaxNode) -> NavigatorResult<Descended<'_>> {
    Ok(Descended::Namespace(NamespaceNavigator::new(nav, node)?))
}

fn type_navigator(nav: &mut Navigator, node: SyntaxNode) -> NavigatorResult<Descended<'_>> {
    Ok(Descended::Type(TypeNavigator::new(nav, node)?))
}

fn member_navigator(nav: &mut Navigator, node: SyntaxNode) -> NavigatorResult<Descended<'_>> {
    Ok(Descended::Member(MemberNavigator::new(nav, node)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_kind_filters() {
        assert!(KindFilter::AnyType.matches(SyntaxKind::Struct));
        assert!(!KindFilter::AnyType.matches(SyntaxKind::Field));
        assert!(KindFilter::AnyMember.matches(SyntaxKind::Class));
        assert!(KindFilter::AnyMember.matches(SyntaxKind::Destructor));
        assert!(!KindFilter::AnyMember.matches(SyntaxKind::Namespace));
        assert!(KindFilter::from(SyntaxKind::Method).matches(SyntaxKind::Method));
    }

    #[test]
    fn test_standard_chain_order() {
        let chain = HandlerChain::standard();
        assert_eq!(chain.labels(), vec!["compilation-unit", "namespace", "type", "member"]);
        assert_eq!(chain.handler_for(SyntaxKind::Class).unwrap().label, "type");
        assert_eq!(chain.handler_for(SyntaxKind::Interface).unwrap().label, "type");
        assert_eq!(chain.handler_for(SyntaxKind::Method).unwrap().label, "member");
        assert!(matches!(
            chain.handler_for(SyntaxKind::UsingDirective),
            Err(NavigatorError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_earlier_handler_wins() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut chain = HandlerChain::new();

        let first = Arc::clone(&calls);
        chain.register(SyntaxKind::Method, "first", move |nav, node| {
            first.lock().unwrap().push("first");
            Ok(Descended::Member(MemberNavigator::new(nav, node)?))
        });
        let second = Arc::clone(&calls);
        chain.register(KindFilter::AnyMember, "second", move |nav, node| {
            second.lock().unwrap().push("second");
            Ok(Descended::Member(MemberNavigator::new(nav, node)?))
        });

        let mut nav = Navigator::attach("class T { void m() { } }").unwrap();
        let method = nav.root().unwrap().descendants().pop().unwrap();
        let descended = chain
            .dispatch(&mut nav, Context::new(method, SyntaxKind::Method))
            .unwrap();
        assert_eq!(descended.name(), "member navigator");
        assert_eq!(*calls.lock().unwrap(), vec!["first"]);
    }

    #[test]
    fn test_empty_chain_is_unsupported() {
        let chain = HandlerChain::new();
        let mut nav = Navigator::attach("class T { }").unwrap();
        let root = nav.root().unwrap();
        let err = chain
            .dispatch(&mut nav, Context::new(root, SyntaxKind::CompilationUnit))
            .err()
            .unwrap();
        assert!(matches!(err, NavigatorError::UnsupportedOperation(_)));
    }
}
