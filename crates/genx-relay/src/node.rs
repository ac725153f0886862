//! Projection of the enhanced schema into domain entities for the emitters.
//!
//! All views borrow the runtime-owned schema; nothing here owns AST nodes.
//! The node-name set travels alongside because the `@node` marker has been
//! stripped from the enhanced document.

use std::collections::BTreeSet;
use std::fmt;

use apollo_compiler::ast::{FieldDefinition, Type};
use apollo_compiler::schema::{ExtendedType, InputObjectType, ObjectType};
use apollo_compiler::Schema;
use genx_core::{Error, Result};

use crate::util::{camel_case, pascal_case};

/// Concrete Go record type for a projected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoType {
    /// `int`
    Int,
    /// `float64`
    Float64,
    /// `string`
    String,
    /// `bool`
    Bool,
    /// `time.Time`
    Time,
    /// Named string type generated for a schema enum.
    Enum(String),
    /// `gorm.DeletedAt`, the soft-delete column.
    DeletedAt,
    /// `[]T`
    Slice(Box<GoType>),
    /// `*T`
    Pointer(Box<GoType>),
}

impl GoType {
    /// Whether the type is pointer-shaped.
    #[must_use]
    pub fn is_pointer(&self) -> bool {
        matches!(self, GoType::Pointer(_))
    }
}

impl fmt::Display for GoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoType::Int => write!(f, "int"),
            GoType::Float64 => write!(f, "float64"),
            GoType::String => write!(f, "string"),
            GoType::Bool => write!(f, "bool"),
            GoType::Time => write!(f, "time.Time"),
            GoType::Enum(name) => write!(f, "{name}"),
            GoType::DeletedAt => write!(f, "gorm.DeletedAt"),
            GoType::Slice(inner) => write!(f, "[]{inner}"),
            GoType::Pointer(inner) => write!(f, "*{inner}"),
        }
    }
}

/// A projected field: either derived from a schema field or synthesized
/// outright (the persisted-entity overrides and the soft-delete column).
#[derive(Debug, Clone)]
pub enum Field<'a> {
    /// Derived from a schema field or input value definition.
    Ast(AstField<'a>),
    /// Synthesized with explicit name, type, and tag.
    Synth(SynthField),
}

impl Field<'_> {
    /// The Go struct field name.
    #[must_use]
    pub fn go_name(&self) -> String {
        match self {
            Field::Ast(f) => f.go_name(),
            Field::Synth(f) => f.name.clone(),
        }
    }

    /// The concrete Go type.
    ///
    /// # Errors
    ///
    /// Fails for schema types with no record representation.
    pub fn go_type(&self) -> Result<GoType> {
        match self {
            Field::Ast(f) => f.go_type(),
            Field::Synth(f) => Ok(f.ty.clone()),
        }
    }

    /// The gorm/json struct tag, backticks excluded.
    #[must_use]
    pub fn go_tag(&self) -> String {
        match self {
            Field::Ast(f) => f.go_tag(),
            Field::Synth(f) => f.tag.clone(),
        }
    }

    /// The schema-side field name, when schema-derived.
    #[must_use]
    pub fn schema_name(&self) -> Option<&str> {
        match self {
            Field::Ast(f) => Some(f.name),
            Field::Synth(_) => None,
        }
    }

    /// Whether the schema type (outer shape) is non-null.
    #[must_use]
    pub fn is_non_null(&self) -> bool {
        match self {
            Field::Ast(f) => f.ty.is_non_null(),
            Field::Synth(_) => true,
        }
    }
}

/// Schema-derived field projection.
#[derive(Debug, Clone)]
pub struct AstField<'a> {
    name: &'a str,
    ty: &'a Type,
    schema: &'a Schema,
    node_names: &'a BTreeSet<String>,
}

impl AstField<'_> {
    fn is_node_type(&self) -> bool {
        let type_name = self.ty.inner_named_type().as_str();
        self.node_names.contains(type_name)
            && matches!(self.schema.types.get(type_name), Some(ExtendedType::Object(_)))
    }

    /// Go struct field name: `PascalCase`, trailing `Id` capitalized to
    /// `ID`, node references suffixed with `ID` (they are stored by id).
    #[must_use]
    pub fn go_name(&self) -> String {
        let mut name = pascal_case(self.name);
        if let Some(stem) = name.strip_suffix("Id") {
            name = format!("{stem}ID");
        }
        if self.is_node_type() {
            name.push_str("ID");
        }
        name
    }

    /// Concrete record type per the scalar mapping table; nullable fields
    /// become pointers, list fields slices.
    ///
    /// # Errors
    ///
    /// Fails for interface/union/object types that reach a record field.
    pub fn go_type(&self) -> Result<GoType> {
        let base = if self.is_node_type() {
            GoType::String
        } else {
            let type_name = self.ty.inner_named_type().as_str();
            match type_name {
                "Int" => GoType::Int,
                "Float" => GoType::Float64,
                "String" | "ID" => GoType::String,
                "Boolean" => GoType::Bool,
                "Time" => GoType::Time,
                other => match self.schema.types.get(other) {
                    Some(ExtendedType::Enum(_)) => GoType::Enum(other.to_string()),
                    _ => {
                        return Err(Error::TemplateRender {
                            what: self.name.to_string(),
                            message: format!("unsupported record type `{other}`"),
                        })
                    }
                },
            }
        };

        if matches!(self.ty, Type::List(_) | Type::NonNullList(_)) {
            // Slices are natively nullable; no pointer wrapping.
            return Ok(GoType::Slice(Box::new(base)));
        }
        if self.ty.is_non_null() {
            Ok(base)
        } else {
            Ok(GoType::Pointer(Box::new(base)))
        }
    }

    /// Tag rules: non-null → `gorm:"not null"` plus a plain json key,
    /// nullable → `omitempty`.
    #[must_use]
    pub fn go_tag(&self) -> String {
        let json = camel_case(&self.go_name());
        if self.ty.is_non_null() {
            format!("gorm:\"not null\" json:\"{json}\"")
        } else {
            format!("json:\"{json},omitempty\"")
        }
    }
}

/// Synthesized field projection.
#[derive(Debug, Clone)]
pub struct SynthField {
    /// Go struct field name.
    pub name: String,
    /// Concrete type.
    pub ty: GoType,
    /// Struct tag, backticks excluded.
    pub tag: String,
}

/// A create/update/delete input projection.
#[derive(Debug, Clone, Copy)]
pub struct InputView<'a> {
    def: &'a InputObjectType,
    node: NodeView<'a>,
}

impl<'a> InputView<'a> {
    /// Input fields minus the relay bookkeeping (`clientMutationId` and the
    /// `<node>Id` selector).
    #[must_use]
    pub fn fields(&self) -> Vec<Field<'a>> {
        let id_field = format!("{}Id", camel_case(self.node.name()));
        self.def
            .fields
            .iter()
            .filter(|(name, _)| {
                name.as_str() != "clientMutationId" && name.as_str() != id_field
            })
            .map(|(name, value)| {
                Field::Ast(AstField {
                    name: name.as_str(),
                    ty: &*value.ty,
                    schema: self.node.schema,
                    node_names: self.node.node_names,
                })
            })
            .collect()
    }
}

/// Viewer-permission projection: only the capabilities whose mutation input
/// actually exists.
#[derive(Debug, Clone, Copy)]
pub struct ViewerPermissionView<'a> {
    def: &'a ObjectType,
    node: NodeView<'a>,
}

impl<'a> ViewerPermissionView<'a> {
    /// The `canCreate`/`canUpdate`/`canDelete` fields, gated on the
    /// corresponding inputs.
    #[must_use]
    pub fn fields(&self) -> Vec<Field<'a>> {
        self.def
            .fields
            .iter()
            .filter(|(name, _)| match name.as_str() {
                "canCreate" => self.node.create_input().is_some(),
                "canUpdate" => self.node.update_input().is_some(),
                "canDelete" => self.node.delete_input().is_some(),
                _ => false,
            })
            .map(|(name, f)| {
                Field::Ast(AstField {
                    name: name.as_str(),
                    ty: &f.ty,
                    schema: self.node.schema,
                    node_names: self.node.node_names,
                })
            })
            .collect()
    }
}

/// A node-marked object over the validated schema.
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
    schema: &'a Schema,
    node_names: &'a BTreeSet<String>,
    object: &'a ObjectType,
}

impl<'a> NodeView<'a> {
    /// The node's type name.
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.object.name.as_str()
    }

    fn is_node_type(&self, type_name: &str) -> bool {
        self.node_names.contains(type_name)
            && matches!(self.schema.types.get(type_name), Some(ExtendedType::Object(_)))
    }

    fn input(&self, action: &str) -> Option<InputView<'a>> {
        let name = format!("{action}{}Input", self.name());
        match self.schema.types.get(name.as_str()) {
            Some(ExtendedType::InputObject(def)) => Some(InputView { def, node: *self }),
            _ => None,
        }
    }

    /// The `Create<T>Input` projection, when defined.
    #[must_use]
    pub fn create_input(&self) -> Option<InputView<'a>> {
        self.input("Create")
    }

    /// The `Update<T>Input` projection, when defined.
    #[must_use]
    pub fn update_input(&self) -> Option<InputView<'a>> {
        self.input("Update")
    }

    /// The `Delete<T>Input` projection, when defined.
    #[must_use]
    pub fn delete_input(&self) -> Option<InputView<'a>> {
        self.input("Delete")
    }

    /// The viewer-permission projection, when its type exists and exposes
    /// at least one capability.
    #[must_use]
    pub fn viewer_permission(&self) -> Option<ViewerPermissionView<'a>> {
        let name = format!("{}ViewerPermission", self.name());
        match self.schema.types.get(name.as_str()) {
            Some(ExtendedType::Object(def)) => {
                let view = ViewerPermissionView { def, node: *self };
                if view.fields().is_empty() {
                    None
                } else {
                    Some(view)
                }
            }
            _ => None,
        }
    }

    /// Non-list fields referencing another node directly.
    #[must_use]
    pub fn one_to_one(&self) -> Vec<&'a FieldDefinition> {
        self.object
            .fields
            .values()
            .map(|f| &***f)
            .filter(|f| self.is_node_type(f.ty.inner_named_type().as_str()))
            .collect()
    }

    /// Connection fields whose target is another node.
    #[must_use]
    pub fn one_to_many(&self) -> Vec<&'a FieldDefinition> {
        self.object
            .fields
            .values()
            .map(|f| &***f)
            .filter(|f| {
                f.ty.inner_named_type()
                    .as_str()
                    .strip_suffix("Connection")
                    .is_some_and(|target| self.is_node_type(target))
            })
            .collect()
    }

    /// True when the node carries the persisted-entity triple
    /// (`id: ID`, `createdAt: Time`, `updatedAt: Time`).
    #[must_use]
    pub fn is_persisted_entity(&self) -> bool {
        let has = |name: &str, ty: &str| {
            self.object
                .fields
                .get(name)
                .is_some_and(|f| f.ty.inner_named_type().as_str() == ty)
        };
        has("id", "ID") && has("createdAt", "Time") && has("updatedAt", "Time")
    }

    /// The record field projection. For persisted entities the built-in
    /// triple is overridden with primary-key and indexed-timestamp shapes
    /// and a `DeletedAt` soft-delete column is inserted after them unless
    /// the user declared one.
    #[must_use]
    pub fn fields(&self) -> Vec<Field<'a>> {
        let mut fields: Vec<Field<'a>> = self
            .object
            .fields
            .iter()
            .filter(|(name, f)| {
                name.as_str() != "viewerPermission" && f.arguments.is_empty()
            })
            .map(|(name, f)| {
                Field::Ast(AstField {
                    name: name.as_str(),
                    ty: &f.ty,
                    schema: self.schema,
                    node_names: self.node_names,
                })
            })
            .collect();

        if !self.is_persisted_entity() {
            return fields;
        }

        let deleted_at = || {
            Field::Synth(SynthField {
                name: "DeletedAt".to_string(),
                ty: GoType::DeletedAt,
                tag: "gorm:\"index\" json:\"deletedAt\"".to_string(),
            })
        };

        let mut last_builtin = None;
        let mut deleted_at_exists = false;
        for (i, field) in fields.iter_mut().enumerate() {
            match field.go_name().as_str() {
                "ID" => {
                    last_builtin = Some(i);
                    *field = Field::Synth(SynthField {
                        name: "ID".to_string(),
                        ty: GoType::String,
                        tag: "gorm:\"primaryKey\" json:\"id\"".to_string(),
                    });
                }
                "CreatedAt" => {
                    last_builtin = Some(i);
                    *field = Field::Synth(SynthField {
                        name: "CreatedAt".to_string(),
                        ty: GoType::Time,
                        tag: "gorm:\"index;not null\" json:\"createdAt\"".to_string(),
                    });
                }
                "UpdatedAt" => {
                    last_builtin = Some(i);
                    *field = Field::Synth(SynthField {
                        name: "UpdatedAt".to_string(),
                        ty: GoType::Time,
                        tag: "gorm:\"index;not null\" json:\"updatedAt\"".to_string(),
                    });
                }
                "DeletedAt" => {
                    deleted_at_exists = true;
                    *field = deleted_at();
                }
                _ => {}
            }
        }
        if !deleted_at_exists {
            if let Some(last) = last_builtin {
                fields.insert(last + 1, deleted_at());
            }
        }
        fields
    }

    /// Look up a projected field by its Go name.
    #[must_use]
    pub fn field(&self, go_name: &str) -> Option<Field<'a>> {
        self.fields().into_iter().find(|f| f.go_name() == go_name)
    }

    /// Project one schema field of this node (used for relation fields,
    /// which carry the target's id column).
    #[must_use]
    pub fn project(&self, field: &'a FieldDefinition) -> Field<'a> {
        Field::Ast(AstField {
            name: field.name.as_str(),
            ty: &field.ty,
            schema: self.schema,
            node_names: self.node_names,
        })
    }
}

/// Everything the emitters consume: nodes sorted by name plus the Go module
/// path.
#[derive(Debug)]
pub struct Data<'a> {
    /// Node views, sorted by name (case-sensitive).
    pub nodes: Vec<NodeView<'a>>,
    /// Go module path forwarded from the configuration.
    pub go_module: &'a str,
}

impl<'a> Data<'a> {
    /// Project `schema` over the given node-name set.
    #[must_use]
    pub fn new(schema: &'a Schema, node_names: &'a BTreeSet<String>, go_module: &'a str) -> Self {
        let mut nodes: Vec<NodeView<'a>> = schema
            .types
            .iter()
            .filter(|(name, _)| node_names.contains(name.as_str()))
            .filter_map(|(_, ty)| match ty {
                ExtendedType::Object(object) => Some(NodeView { schema, node_names, object }),
                _ => None,
            })
            .collect();
        nodes.sort_by(|a, b| a.name().cmp(b.name()));
        Data { nodes, go_module }
    }

    /// Look up a node by type name.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<NodeView<'a>> {
        self.nodes.iter().copied().find(|n| n.name() == name)
    }
}
