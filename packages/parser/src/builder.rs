//! Typed builders for new declarations
//!
//! Each options struct builds a detached [`GreenNode`] with fresh ids drawn
//! from the document's [`IdGenerator`]. Names are validated up front so an
//! edit never produces a tree the parser would reject.

use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::id_generator::IdGenerator;
use crate::tokenizer::{tokenize, Token};
use serde::Deserialize;
use std::sync::Arc;

/// Check that `name` lexes as exactly one identifier
pub fn validate_identifier(name: &str) -> ParseResult<()> {
    let tokens = tokenize(name);
    match tokens.as_slice() {
        [(Token::Ident(ident), span)] if *ident == name && span.len() == name.len() => Ok(()),
        _ => Err(ParseError::invalid_identifier(name)),
    }
}

fn validate_type(ty: &str) -> ParseResult<()> {
    if ty.trim().is_empty() {
        return Err(ParseError::invalid_identifier(ty));
    }
    Ok(())
}

fn modifiers_for(access: AccessModifier, extra: &[(bool, Modifier)]) -> Vec<Modifier> {
    let mut modifiers = access.modifiers().to_vec();
    modifiers.extend(extra.iter().filter(|(on, _)| *on).map(|(_, m)| *m));
    modifiers
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FieldOptions {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub access: AccessModifier,
    pub is_static: bool,
    pub is_readonly: bool,
    pub initializer: Option<String>,
    pub attributes: Vec<String>,
}

impl FieldOptions {
    pub fn new(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            ..Default::default()
        }
    }

    pub fn build(&self, ids: &mut IdGenerator) -> ParseResult<Arc<GreenNode>> {
        validate_identifier(&self.name)?;
        validate_type(&self.ty)?;

        let mut field = GreenNode::new(ids.new_id(), SyntaxKind::Field, self.name.clone());
        field.ty = Some(self.ty.clone());
        field.modifiers = modifiers_for(
            self.access,
            &[
                (self.is_static, Modifier::Static),
                (self.is_readonly, Modifier::Readonly),
            ],
        );
        field.initializer = self.initializer.clone();
        field.attributes = self.attributes.clone();
        Ok(Arc::new(field))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PropertyOptions {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub access: AccessModifier,
    pub is_static: bool,
    pub getter: bool,
    pub setter: bool,
    /// Access level of the setter when it differs from the property's
    pub setter_access: AccessModifier,
    pub initializer: Option<String>,
    pub attributes: Vec<String>,
}

impl Default for PropertyOptions {
    fn default() -> Self {
        Self {
            name: String::new(),
            ty: String::new(),
            access: AccessModifier::None,
            is_static: false,
            getter: true,
            setter: true,
            setter_access: AccessModifier::None,
            initializer: None,
            attributes: Vec::new(),
        }
    }
}

impl PropertyOptions {
    pub fn new(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            ..Default::default()
        }
    }

    pub fn build(&self, ids: &mut IdGenerator) -> ParseResult<Arc<GreenNode>> {
        validate_identifier(&self.name)?;
        validate_type(&self.ty)?;

        let mut property = GreenNode::new(ids.new_id(), SyntaxKind::Property, self.name.clone());
        property.ty = Some(self.ty.clone());
        property.modifiers = modifiers_for(self.access, &[(self.is_static, Modifier::Static)]);
        if self.getter {
            property.accessors.push(Accessor::auto(AccessorKind::Get));
        }
        if self.setter {
            property.accessors.push(Accessor {
                kind: AccessorKind::Set,
                modifiers: self.setter_access.modifiers().to_vec(),
                body: None,
            });
        }
        property.initializer = self.initializer.clone();
        property.attributes = self.attributes.clone();
        Ok(Arc::new(property))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MethodOptions {
    pub name: String,
    pub return_type: String,
    pub access: AccessModifier,
    pub is_static: bool,
    pub parameters: Vec<Parameter>,
    /// Statements of the block body; `None` builds an empty block
    pub body: Option<String>,
    pub attributes: Vec<String>,
}

impl Default for MethodOptions {
    fn default() -> Self {
        Self {
            name: String::new(),
            return_type: "void".to_string(),
            access: AccessModifier::None,
            is_static: false,
            parameters: Vec::new(),
            body: None,
            attributes: Vec::new(),
        }
    }
}

impl MethodOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn build(&self, ids: &mut IdGenerator) -> ParseResult<Arc<GreenNode>> {
        validate_identifier(&self.name)?;
        validate_type(&self.return_type)?;
        for param in &self.parameters {
            validate_identifier(&param.name)?;
            validate_type(&param.ty)?;
        }

        let mut method = GreenNode::new(ids.new_id(), SyntaxKind::Method, self.name.clone());
        method.ty = Some(self.return_type.clone());
        method.modifiers = modifiers_for(self.access, &[(self.is_static, Modifier::Static)]);
        method.parameters = self.parameters.clone();
        let statements = self.body.as_deref().unwrap_or_default();
        method.body = Some(Body::Block(
            statements.split_whitespace().collect::<Vec<_>>().join(" "),
        ));
        method.attributes = self.attributes.clone();
        Ok(Arc::new(method))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Struct,
    Interface,
}

impl From<TypeKind> for SyntaxKind {
    fn from(kind: TypeKind) -> Self {
        match kind {
            TypeKind::Class => SyntaxKind::Class,
            TypeKind::Struct => SyntaxKind::Struct,
            TypeKind::Interface => SyntaxKind::Interface,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TypeOptions {
    pub kind: TypeKind,
    pub name: String,
    pub access: AccessModifier,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_sealed: bool,
    pub is_partial: bool,
    pub base_types: Vec<String>,
    pub attributes: Vec<String>,
}

impl TypeOptions {
    pub fn new(kind: TypeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn build(&self, ids: &mut IdGenerator) -> ParseResult<Arc<GreenNode>> {
        validate_identifier(&self.name)?;
        for base in &self.base_types {
            validate_type(base)?;
        }

        let mut decl = GreenNode::new(ids.new_id(), self.kind.into(), self.name.clone());
        decl.modifiers = modifiers_for(
            self.access,
            &[
                (self.is_static, Modifier::Static),
                (self.is_abstract, Modifier::Abstract),
                (self.is_sealed, Modifier::Sealed),
                (self.is_partial, Modifier::Partial),
            ],
        );
        decl.base_types = self.base_types.clone();
        decl.attributes = self.attributes.clone();
        Ok(Arc::new(decl))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::Serializer;

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("Name").is_ok());
        assert!(validate_identifier("_value").is_ok());
        assert!(validate_identifier("@class").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("  ").is_err());
        assert!(validate_identifier("two words").is_err());
        assert!(validate_identifier("1st").is_err());
        assert!(validate_identifier("class").is_err());
    }

    #[test]
    fn test_build_field() {
        let mut ids = IdGenerator::new("/test.cs");
        let options = FieldOptions {
            access: AccessModifier::Private,
            is_readonly: true,
            initializer: Some("0".to_string()),
            ..FieldOptions::new("int", "count")
        };
        let field = options.build(&mut ids).unwrap();
        assert_eq!(
            Serializer::new().serialize_node(&field),
            "private readonly int count = 0;"
        );
    }

    #[test]
    fn test_build_property_with_private_setter() {
        let mut ids = IdGenerator::new("/test.cs");
        let options = PropertyOptions {
            access: AccessModifier::Public,
            setter_access: AccessModifier::Private,
            ..PropertyOptions::new("string", "Name")
        };
        let property = options.build(&mut ids).unwrap();
        assert_eq!(
            Serializer::new().serialize_node(&property),
            "public string Name { get; private set; }"
        );
    }

    #[test]
    fn test_build_method() {
        let mut ids = IdGenerator::new("/test.cs");
        let options = MethodOptions {
            access: AccessModifier::Public,
            return_type: "int".to_string(),
            parameters: vec![Parameter::new("int", "a"), Parameter::new("int", "b")],
            body: Some("return a +\n    b;".to_string()),
            ..MethodOptions::new("Add")
        };
        let method = options.build(&mut ids).unwrap();
        assert_eq!(method.parameter_types(), vec!["int", "int"]);
        assert_eq!(method.body, Some(Body::Block("return a + b;".to_string())));
    }

    #[test]
    fn test_blank_names_rejected() {
        let mut ids = IdGenerator::new("/test.cs");
        assert!(matches!(
            FieldOptions::new("int", " ").build(&mut ids),
            Err(ParseError::InvalidIdentifier { .. })
        ));
        assert!(MethodOptions::new("").build(&mut ids).is_err());
        let bad_param = MethodOptions {
            parameters: vec![Parameter::new("int", "not valid")],
            ..MethodOptions::new("Run")
        };
        assert!(bad_param.build(&mut ids).is_err());
    }

    #[test]
    fn test_options_from_json() {
        let options: PropertyOptions =
            serde_json::from_str(r#"{ "name": "Id", "type": "Guid", "setter": false }"#).unwrap();
        assert!(options.getter);
        assert!(!options.setter);

        let kind: TypeOptions = serde_json::from_str(r#"{ "kind": "interface", "name": "IThing" }"#).unwrap();
        assert_eq!(SyntaxKind::from(kind.kind), SyntaxKind::Interface);
    }
}
