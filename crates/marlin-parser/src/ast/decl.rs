//! Declaration nodes: compilation units, type definitions and members.

use super::expr::Expression;
use super::node::NodeId;
use super::stmt::Block;
use super::types::TypeReference;
use marlin_core::{Accessibility, SetAccessibility, SourceLocation};

/// The root of one parsed file, or of all files of one module after merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    pub id: NodeId,
    pub location: Option<SourceLocation>,
    /// Full module name, e.g. `app::core`.
    pub module_name: String,
    /// Modules named by `using` directives.
    pub dependencies: Vec<Dependency>,
    pub types: Vec<TypeDefinition>,
}

/// A `using a::b;` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,
    pub location: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDefinition {
    Class(ClassDefinition),
    Struct(StructDefinition),
    ExternType(ExternTypeDefinition),
}

impl TypeDefinition {
    pub fn id(&self) -> NodeId {
        match self {
            TypeDefinition::Class(class) => class.id,
            TypeDefinition::Struct(structure) => structure.id,
            TypeDefinition::ExternType(extern_type) => extern_type.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TypeDefinition::Class(class) => &class.name,
            TypeDefinition::Struct(structure) => &structure.name,
            TypeDefinition::ExternType(extern_type) => &extern_type.name,
        }
    }

    pub fn module(&self) -> &str {
        match self {
            TypeDefinition::Class(class) => &class.module,
            TypeDefinition::Struct(structure) => &structure.module,
            TypeDefinition::ExternType(extern_type) => &extern_type.module,
        }
    }

    /// `module::Name`, the name the type's symbol is registered under.
    pub fn full_name(&self) -> String {
        format!("{}::{}", self.module(), self.name())
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            TypeDefinition::Class(class) => class.location.as_ref(),
            TypeDefinition::Struct(structure) => structure.location.as_ref(),
            TypeDefinition::ExternType(extern_type) => extern_type.location.as_ref(),
        }
    }

    pub fn accessibility(&self) -> Accessibility {
        match self {
            TypeDefinition::Class(class) => class.accessibility,
            TypeDefinition::Struct(structure) => structure.accessibility,
            TypeDefinition::ExternType(extern_type) => extern_type.accessibility,
        }
    }

    pub fn members(&self) -> &[Member] {
        match self {
            TypeDefinition::Class(class) => &class.members,
            TypeDefinition::Struct(structure) => &structure.members,
            TypeDefinition::ExternType(extern_type) => &extern_type.members,
        }
    }
}

/// `[mods] class Name [<T, U>] [: Base] { members }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDefinition {
    pub id: NodeId,
    pub location: Option<SourceLocation>,
    pub name: String,
    pub module: String,
    pub accessibility: Accessibility,
    pub is_static: bool,
    pub base_type: Option<TypeReference>,
    pub generic_params: Vec<String>,
    pub members: Vec<Member>,
}

/// `[mods] struct Name { members }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDefinition {
    pub id: NodeId,
    pub location: Option<SourceLocation>,
    pub name: String,
    pub module: String,
    pub accessibility: Accessibility,
    pub members: Vec<Member>,
}

/// `[mods] extern Name [@NativeType] { extern methods }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternTypeDefinition {
    pub id: NodeId,
    pub location: Option<SourceLocation>,
    pub name: String,
    pub module: String,
    pub accessibility: Accessibility,
    pub is_static: bool,
    pub native_type_name: Option<String>,
    /// Always [`Member::ExternMethod`]s.
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Property(PropertyDeclaration),
    Method(MethodDeclaration),
    Constructor(ConstructorDeclaration),
    ExternMethod(ExternMethodMapping),
}

impl Member {
    pub fn id(&self) -> NodeId {
        match self {
            Member::Property(property) => property.id,
            Member::Method(method) => method.id,
            Member::Constructor(constructor) => constructor.id,
            Member::ExternMethod(mapping) => mapping.id,
        }
    }

    /// The member's name; constructors have none.
    pub fn name(&self) -> Option<&str> {
        match self {
            Member::Property(property) => Some(&property.name),
            Member::Method(method) => Some(&method.name),
            Member::Constructor(_) => None,
            Member::ExternMethod(mapping) => mapping.name.as_deref(),
        }
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Member::Property(property) => property.location.as_ref(),
            Member::Method(method) => method.location.as_ref(),
            Member::Constructor(constructor) => constructor.location.as_ref(),
            Member::ExternMethod(mapping) => mapping.location.as_ref(),
        }
    }
}

/// `[mods] Type name [-> get, set] [= initializer];`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDeclaration {
    pub id: NodeId,
    pub location: Option<SourceLocation>,
    pub type_ref: TypeReference,
    pub name: String,
    pub is_static: bool,
    pub initializer: Option<Expression>,
    pub get_accessibility: Accessibility,
    pub set_accessibility: SetAccessibility,
}

/// `[mods] ReturnType name(params) { body }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDeclaration {
    pub id: NodeId,
    pub location: Option<SourceLocation>,
    pub accessibility: Accessibility,
    pub return_type: TypeReference,
    pub name: String,
    pub is_static: bool,
    pub params: Vec<Parameter>,
    pub body: Block,
}

/// `[mods] constructor(params) { body }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorDeclaration {
    pub id: NodeId,
    pub location: Option<SourceLocation>,
    pub accessibility: Accessibility,
    pub params: Vec<Parameter>,
    pub body: Block,
}

/// `[mods] (constructor | Type name)(params) -> @native(args);`
///
/// `mapped_type` and `name` are `None` exactly when the mapping is a
/// constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternMethodMapping {
    pub id: NodeId,
    pub location: Option<SourceLocation>,
    pub accessibility: Accessibility,
    pub mapped_type: Option<TypeReference>,
    pub name: Option<String>,
    pub is_static: bool,
    pub expected_params: Vec<Parameter>,
    pub native_name: String,
    pub passed_args: Vec<Expression>,
}

impl ExternMethodMapping {
    pub fn is_constructor(&self) -> bool {
        self.name.is_none()
    }
}

/// `Type name` in a parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub id: NodeId,
    pub location: Option<SourceLocation>,
    pub type_ref: TypeReference,
    pub name: String,
}
