use crate::id_generator::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Structural kind of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntaxKind {
    CompilationUnit,
    UsingDirective,
    Namespace,
    Class,
    Struct,
    Interface,
    Field,
    Property,
    Method,
    Constructor,
    Destructor,
}

impl SyntaxKind {
    /// Class, struct or interface
    pub fn is_type(self) -> bool {
        matches!(self, SyntaxKind::Class | SyntaxKind::Struct | SyntaxKind::Interface)
    }

    /// Anything that can be declared inside a type body
    pub fn is_member(self) -> bool {
        self.is_type()
            || matches!(
                self,
                SyntaxKind::Field
                    | SyntaxKind::Property
                    | SyntaxKind::Method
                    | SyntaxKind::Constructor
                    | SyntaxKind::Destructor
            )
    }

    /// Members that cannot contain other declarations
    pub fn is_leaf_member(self) -> bool {
        self.is_member() && !self.is_type()
    }

    /// Nodes that can hold namespaces and type declarations
    pub fn is_container(self) -> bool {
        matches!(self, SyntaxKind::CompilationUnit | SyntaxKind::Namespace)
    }

    /// Type declaration keyword
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            SyntaxKind::Class => Some("class"),
            SyntaxKind::Struct => Some("struct"),
            SyntaxKind::Interface => Some("interface"),
            SyntaxKind::Namespace => Some("namespace"),
            SyntaxKind::UsingDirective => Some("using"),
            _ => None,
        }
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyntaxKind::CompilationUnit => "compilation unit",
            SyntaxKind::UsingDirective => "using directive",
            SyntaxKind::Namespace => "namespace",
            SyntaxKind::Class => "class",
            SyntaxKind::Struct => "struct",
            SyntaxKind::Interface => "interface",
            SyntaxKind::Field => "field",
            SyntaxKind::Property => "property",
            SyntaxKind::Method => "method",
            SyntaxKind::Constructor => "constructor",
            SyntaxKind::Destructor => "destructor",
        };
        f.write_str(name)
    }
}

/// Declaration modifiers, kept in source order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Public,
    Private,
    Protected,
    Internal,
    Static,
    Abstract,
    Virtual,
    Override,
    Sealed,
    Readonly,
    Async,
    Partial,
    Const,
}

impl Modifier {
    pub fn is_access(self) -> bool {
        matches!(
            self,
            Modifier::Public | Modifier::Private | Modifier::Protected | Modifier::Internal
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Private => "private",
            Modifier::Protected => "protected",
            Modifier::Internal => "internal",
            Modifier::Static => "static",
            Modifier::Abstract => "abstract",
            Modifier::Virtual => "virtual",
            Modifier::Override => "override",
            Modifier::Sealed => "sealed",
            Modifier::Readonly => "readonly",
            Modifier::Async => "async",
            Modifier::Partial => "partial",
            Modifier::Const => "const",
        }
    }
}

/// Access level of a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessModifier {
    #[default]
    None,
    Public,
    Internal,
    Private,
    Protected,
    PrivateProtected,
    ProtectedInternal,
}

impl AccessModifier {
    /// Modifier tokens spelling this access level
    pub fn modifiers(self) -> &'static [Modifier] {
        match self {
            AccessModifier::None => &[],
            AccessModifier::Public => &[Modifier::Public],
            AccessModifier::Internal => &[Modifier::Internal],
            AccessModifier::Private => &[Modifier::Private],
            AccessModifier::Protected => &[Modifier::Protected],
            AccessModifier::PrivateProtected => &[Modifier::Private, Modifier::Protected],
            AccessModifier::ProtectedInternal => &[Modifier::Protected, Modifier::Internal],
        }
    }

    /// Replace the access modifiers of `modifiers` with this access level.
    /// Access keywords go first, the remaining modifiers keep their order.
    pub fn apply(self, modifiers: &[Modifier]) -> Vec<Modifier> {
        self.modifiers()
            .iter()
            .copied()
            .chain(modifiers.iter().copied().filter(|m| !m.is_access()))
            .collect()
    }
}

/// Method or constructor parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub ty: String,
    pub name: String,
    #[serde(default)]
    pub default: Option<String>,
}

impl Parameter {
    pub fn new(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            name: name.into(),
            default: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessorKind {
    Get,
    Set,
    Init,
}

impl AccessorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessorKind::Get => "get",
            AccessorKind::Set => "set",
            AccessorKind::Init => "init",
        }
    }
}

/// Property accessor (`get;`, `private set;`, `get { ... }`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessor {
    pub kind: AccessorKind,
    pub modifiers: Vec<Modifier>,
    pub body: Option<Body>,
}

impl Accessor {
    pub fn auto(kind: AccessorKind) -> Self {
        Self {
            kind,
            modifiers: Vec::new(),
            body: None,
        }
    }
}

/// Opaque, whitespace-normalized body text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// `{ statements }`
    Block(String),
    /// `=> expression;`
    Expression(String),
}

/// Marker that lets a node be found again after the tree is rebuilt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelocationTag(Uuid);

impl RelocationTag {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RelocationTag {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RelocationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable tree element. Shared between tree generations behind `Arc`.
///
/// Every `with_*` method returns an updated copy that keeps the id, the tags and
/// the untouched children of the original.
#[derive(Debug, Clone, PartialEq)]
pub struct GreenNode {
    pub id: NodeId,
    pub kind: SyntaxKind,
    /// Identifier, or the qualified name for usings and namespaces
    pub name: String,
    /// Declared type of a field or property, return type of a method
    pub ty: Option<String>,
    pub modifiers: Vec<Modifier>,
    pub attributes: Vec<String>,
    pub base_types: Vec<String>,
    pub parameters: Vec<Parameter>,
    pub accessors: Vec<Accessor>,
    pub initializer: Option<String>,
    pub body: Option<Body>,
    pub children: Vec<Arc<GreenNode>>,
    pub tags: Vec<RelocationTag>,
}

impl GreenNode {
    pub fn new(id: NodeId, kind: SyntaxKind, name: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            ty: None,
            modifiers: Vec::new(),
            attributes: Vec::new(),
            base_types: Vec::new(),
            parameters: Vec::new(),
            accessors: Vec::new(),
            initializer: None,
            body: None,
            children: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    pub fn with_type(&self, ty: impl Into<String>) -> Self {
        Self {
            ty: Some(ty.into()),
            ..self.clone()
        }
    }

    pub fn with_modifiers(&self, modifiers: Vec<Modifier>) -> Self {
        Self {
            modifiers,
            ..self.clone()
        }
    }

    pub fn with_attributes(&self, attributes: Vec<String>) -> Self {
        Self {
            attributes,
            ..self.clone()
        }
    }

    pub fn with_base_types(&self, base_types: Vec<String>) -> Self {
        Self {
            base_types,
            ..self.clone()
        }
    }

    pub fn with_body(&self, body: Option<Body>) -> Self {
        Self {
            body,
            ..self.clone()
        }
    }

    pub fn with_children(&self, children: Vec<Arc<GreenNode>>) -> Self {
        Self {
            children,
            ..self.clone()
        }
    }

    /// Copy with `child` inserted at `index` (clamped to the child count)
    pub fn with_child_inserted(&self, index: usize, child: Arc<GreenNode>) -> Self {
        let mut children = self.children.clone();
        let index = index.min(children.len());
        children.insert(index, child);
        self.with_children(children)
    }

    /// Copy with the child that is `old` (by reference) swapped for `new`
    pub fn with_child_replaced(&self, old: &Arc<GreenNode>, new: Arc<GreenNode>) -> Self {
        let children = self
            .children
            .iter()
            .map(|child| {
                if Arc::ptr_eq(child, old) {
                    Arc::clone(&new)
                } else {
                    Arc::clone(child)
                }
            })
            .collect();
        self.with_children(children)
    }

    /// Copy carrying `tag`. Adding a tag twice is a no-op.
    pub fn with_tag(&self, tag: RelocationTag) -> Self {
        let mut node = self.clone();
        if !node.tags.contains(&tag) {
            node.tags.push(tag);
        }
        node
    }

    pub fn has_tag(&self, tag: &RelocationTag) -> bool {
        self.tags.contains(tag)
    }

    pub fn first_tag(&self) -> Option<RelocationTag> {
        self.tags.first().copied()
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(&Modifier::Static)
    }

    /// Access level spelled by the modifiers
    pub fn access(&self) -> AccessModifier {
        let has = |m: Modifier| self.modifiers.contains(&m);
        match (
            has(Modifier::Public),
            has(Modifier::Private),
            has(Modifier::Protected),
            has(Modifier::Internal),
        ) {
            (true, _, _, _) => AccessModifier::Public,
            (_, true, true, _) => AccessModifier::PrivateProtected,
            (_, _, true, true) => AccessModifier::ProtectedInternal,
            (_, true, _, _) => AccessModifier::Private,
            (_, _, true, _) => AccessModifier::Protected,
            (_, _, _, true) => AccessModifier::Internal,
            _ => AccessModifier::None,
        }
    }

    /// Parameter types, in declaration order
    pub fn parameter_types(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.ty.as_str()).collect()
    }
}
