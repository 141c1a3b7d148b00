//! # Rosewood Editor
//!
//! Navigation and editing sessions over immutable syntax trees.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: source text → immutable tree        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Navigator session                   │
//! │  - Selection stack of single/group frames   │
//! │  - Handler chain picks navigators           │
//! │  - Composers edit through replace + rebind  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ parser: tree → rendered source text         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Trees are never mutated**: every edit yields a new generation
//! 2. **The stack follows the edit**: every selected node is relocated into
//!    the new generation, or dropped according to the relocation policy
//! 3. **Validate, then touch**: a failed operation leaves the session as it was
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rosewood_editor::Navigator;
//!
//! let mut nav = Navigator::attach("class Account { int balance; }")?;
//! nav.compilation_unit()?
//!     .select_class("Account")?
//!     .select_field("balance")?
//!     .compose()?
//!     .rename("total")?;
//!
//! assert_eq!(nav.render()?, "class Account {\n    int total;\n}\n");
//! ```

mod composers;
mod config;
mod deletion;
mod errors;
mod guards;
mod handlers;
mod navigator;
mod navigators;
mod rebind;
mod selection;

pub use composers::{
    CompilationUnitComposer, MemberComposer, NamespaceComposer, Pivot, TypeComposer,
};
pub use config::{EditorConfig, RelocationPolicy};
pub use errors::{NavigatorError, NavigatorResult};
pub use guards::{require_immediate_kind, require_node_or_parent_kind, require_not_blank};
pub use handlers::{Context, Descended, Handler, HandlerChain, KindFilter, NavigatorFactory};
pub use navigator::Navigator;
pub use navigators::{
    CompilationUnitNavigator, MemberNavigator, NamespaceNavigator, TypeNavigator,
};
pub use rebind::RebindReport;
pub use selection::{Selection, SelectionStack};

// Re-export provider types for convenience
pub use rosewood_parser::{
    AccessModifier, FieldOptions, MethodOptions, Parameter, PropertyOptions, SyntaxKind,
    SyntaxNode, TypeKind, TypeOptions,
};
