//! # rosewood-parser
//!
//! Tree provider for a C#-like declaration language: parse source into an
//! immutable, structurally shared tree, edit it without mutation, tag nodes
//! so they survive rebuilds, and render it back to text.

pub mod ast;
pub mod builder;
pub mod edit;
pub mod error;
pub mod id_generator;
pub mod parser;
pub mod serializer;
pub mod tokenizer;
pub mod tree;

pub use ast::{
    AccessModifier, Accessor, AccessorKind, Body, GreenNode, Modifier, Parameter, RelocationTag,
    SyntaxKind,
};
pub use builder::{
    validate_identifier, FieldOptions, MethodOptions, PropertyOptions, TypeKind, TypeOptions,
};
pub use edit::{ensure_tagged, remove, replace, resolve_by_tag, track, TrackedSnapshot, TreeError};
pub use error::{ParseError, ParseResult};
pub use id_generator::{get_document_id, IdGenerator, NodeId};
pub use parser::{parse, parse_member, parse_with_generator, parse_with_path, Parser};
pub use serializer::{render, render_with_indent, Serializer};
pub use tokenizer::{tokenize, Token};
pub use tree::{SyntaxNode, SyntaxTree};

#[cfg(feature = "pretty-errors")]
pub use error::format_error;
