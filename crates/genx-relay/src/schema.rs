//! Schema enhancement: prototype SDL → fully elaborated Relay-style API.
//!
//! Each `@node` object is processed once, in document order:
//!
//! 1. built-in `id`/`createdAt`/`updatedAt` fields, reordered first
//! 2. list-of-node fields rewritten to connection methods
//! 3. a plural connection field on `Query`
//! 4. `TConnection`/`TEdge` object types
//! 5. a `TFilter` input
//! 6. `TOrder`/`TOrderField` ordering types
//! 7. create/update/delete fields on `Mutation`
//! 8. their input and payload types
//! 9. a `viewerPermission` field and its type
//! 10. removal of the `@node` marker directive
//!
//! Every addition is gated by an existence check, so enhancing an already
//! enhanced document is a fixed point. Synthesized definitions are appended
//! directly after the node that produced them; `Query`/`Mutation` additions
//! become type extensions at the end of the document.

use std::collections::BTreeSet;

use apollo_compiler::ast::{
    Definition, DirectiveList, Document, EnumTypeDefinition, EnumValueDefinition, FieldDefinition,
    InputObjectTypeDefinition, InputValueDefinition, ObjectTypeDefinition, ObjectTypeExtension,
    Type,
};
use apollo_compiler::{Name, Node};
use genx_core::{Error, Result};
use tracing::debug;

use crate::util::{camel_case, is_list_type, is_method_field, pascal_case, plural, upper_snake_case};

/// The marker directive driving enhancement.
pub const NODE_DIRECTIVE: &str = "node";

/// Field names owned by the enhancer; user fields with these names are
/// never projected.
const RESERVED_FIELDS: &[&str] = &["viewerPermission"];

const BUILTIN_NODE_FIELDS: &[&str] = &["id", "createdAt", "updatedAt"];

const ACTIONS: &[&str] = &["create", "update", "delete"];

/// SDL merged in before enhancement: `Time`/`Cursor` scalars, `PageInfo`,
/// `OrderDirection`, the built-in filter inputs, and the `@node` declaration.
pub const PRELUDE: &str = include_str!("prelude.graphql");

/// Output of [`enhance`]: the elaborated document plus the names of every
/// node-marked object (the marker directive itself is removed from the
/// document, so the set is the only record of which types were nodes).
#[derive(Debug)]
pub struct EnhanceResult {
    /// Elaborated schema document.
    pub document: Document,
    /// Names of the `@node`-marked object types, sorted.
    pub nodes: BTreeSet<String>,
}

/// Enhance a parsed prototype document.
///
/// # Errors
///
/// Fails with [`Error::SchemaParse`] when the embedded prelude does not
/// parse and [`Error::SchemaInvariant`] when a list-of-node field violates
/// the non-null requirements; the message names the offending `Type.field`.
pub fn enhance(input: &Document) -> Result<EnhanceResult> {
    let prelude = Document::parse(PRELUDE, "prelude.relay.genx.graphql")
        .map_err(|e| Error::SchemaParse(format!("prelude: {e}")))?;

    // Prelude definitions the input does not shadow come first, then the
    // input itself. The name check keeps re-enhancement from duplicating
    // prelude types.
    let type_names: BTreeSet<String> = input
        .definitions
        .iter()
        .filter_map(type_definition_name)
        .map(str::to_string)
        .collect();
    let directive_names: BTreeSet<String> = input
        .definitions
        .iter()
        .filter_map(|def| match def {
            Definition::DirectiveDefinition(d) => Some(d.name.to_string()),
            _ => None,
        })
        .collect();

    let mut work: Vec<Definition> = prelude
        .definitions
        .iter()
        .filter(|def| match def {
            Definition::DirectiveDefinition(d) => !directive_names.contains(d.name.as_str()),
            other => type_definition_name(other)
                .is_none_or(|name| !type_names.contains(name)),
        })
        .cloned()
        .collect();
    work.extend(input.definitions.iter().cloned());

    let mut out: Vec<Definition> = Vec::new();
    let mut extensions: Vec<Definition> = Vec::new();
    let mut nodes = BTreeSet::new();

    for idx in 0..work.len() {
        let Definition::ObjectTypeDefinition(obj_node) = &work[idx] else {
            out.push(work[idx].clone());
            continue;
        };
        if obj_node.directives.get(NODE_DIRECTIVE).is_none() {
            out.push(work[idx].clone());
            continue;
        }

        let mut obj = obj_node.as_ref().clone();
        nodes.insert(obj.name.to_string());

        ensure_builtin_node_fields(&mut obj)?;
        ensure_field_connections(&work, &mut obj)?;

        let mut synthesized = Vec::new();
        if let Some(ext) = ensure_query(&work, &extensions, &obj)? {
            extensions.push(ext);
        }
        synthesized.extend(ensure_connection_types(&work, &obj)?);
        synthesized.extend(ensure_filter(&work, &obj)?);
        synthesized.extend(ensure_order_types(&work, &obj)?);
        if let Some(ext) = ensure_mutation(&work, &extensions, &obj)? {
            extensions.push(ext);
        }
        synthesized.extend(ensure_mutation_types(&work, &obj)?);
        synthesized.extend(ensure_viewer_permission(&work, &mut obj)?);

        work[idx] = Definition::ObjectTypeDefinition(Node::new(obj));
        out.push(work[idx].clone());
        out.extend(synthesized);
    }

    // Strict validators reject extensions of undefined types; when the
    // prototype declares no Query/Mutation base, promote the first
    // extension into the base definition.
    for root in ["Query", "Mutation"] {
        if definition_exists(&work, root) {
            continue;
        }
        if let Some(pos) = extensions.iter().position(|def| {
            matches!(def, Definition::ObjectTypeExtension(ext) if ext.name.as_str() == root)
        }) {
            let Definition::ObjectTypeExtension(ext) = extensions[pos].clone() else {
                unreachable!("position matched an extension");
            };
            let ext = ext.as_ref().clone();
            extensions[pos] = Definition::ObjectTypeDefinition(Node::new(ObjectTypeDefinition {
                description: None,
                name: ext.name,
                implements_interfaces: ext.implements_interfaces,
                directives: ext.directives,
                fields: ext.fields,
            }));
        }
    }

    out.extend(extensions);
    remove_node_directives(&mut out);

    let mut document = Document::new();
    document.definitions = out;
    Ok(EnhanceResult { document, nodes })
}

/// Name of a type definition (not an extension or directive declaration).
fn type_definition_name(def: &Definition) -> Option<&str> {
    match def {
        Definition::ScalarTypeDefinition(d) => Some(d.name.as_str()),
        Definition::ObjectTypeDefinition(d) => Some(d.name.as_str()),
        Definition::InterfaceTypeDefinition(d) => Some(d.name.as_str()),
        Definition::UnionTypeDefinition(d) => Some(d.name.as_str()),
        Definition::EnumTypeDefinition(d) => Some(d.name.as_str()),
        Definition::InputObjectTypeDefinition(d) => Some(d.name.as_str()),
        _ => None,
    }
}

fn find_type_definition<'a>(defs: &'a [Definition], name: &str) -> Option<&'a Definition> {
    defs.iter()
        .find(|def| type_definition_name(def) == Some(name))
}

fn definition_exists(defs: &[Definition], name: &str) -> bool {
    find_type_definition(defs, name).is_some()
}

fn is_node_object(defs: &[Definition], name: &str) -> bool {
    matches!(
        find_type_definition(defs, name),
        Some(Definition::ObjectTypeDefinition(obj)) if obj.directives.get(NODE_DIRECTIVE).is_some()
    )
}

fn ident(name: &str) -> Result<Name> {
    Name::new(name).map_err(|e| Error::SchemaParse(format!("invalid name `{name}`: {e}")))
}

fn named(name: &str) -> Result<Type> {
    Ok(Type::Named(ident(name)?))
}

fn non_null(name: &str) -> Result<Type> {
    Ok(Type::NonNullNamed(ident(name)?))
}

fn field(name: &str, ty: Type) -> Result<Node<FieldDefinition>> {
    Ok(Node::new(FieldDefinition {
        description: None,
        name: ident(name)?,
        arguments: Vec::new(),
        ty,
        directives: DirectiveList::default(),
    }))
}

fn input_value(name: &str, ty: Type) -> Result<Node<InputValueDefinition>> {
    Ok(Node::new(InputValueDefinition {
        description: None,
        name: ident(name)?,
        ty: Node::new(ty),
        default_value: None,
        directives: DirectiveList::default(),
    }))
}

fn object_def(name: &str, fields: Vec<Node<FieldDefinition>>) -> Result<Definition> {
    Ok(Definition::ObjectTypeDefinition(Node::new(
        ObjectTypeDefinition {
            description: None,
            name: ident(name)?,
            implements_interfaces: Vec::new(),
            directives: DirectiveList::default(),
            fields,
        },
    )))
}

fn input_def(name: &str, fields: Vec<Node<InputValueDefinition>>) -> Result<Definition> {
    Ok(Definition::InputObjectTypeDefinition(Node::new(
        InputObjectTypeDefinition {
            description: None,
            name: ident(name)?,
            directives: DirectiveList::default(),
            fields,
        },
    )))
}

/// Ensure `id: ID!`, `createdAt: Time!`, `updatedAt: Time!` exist and come
/// first, in that order; all other fields keep their relative order.
fn ensure_builtin_node_fields(obj: &mut ObjectTypeDefinition) -> Result<()> {
    let existing: BTreeSet<String> = obj.fields.iter().map(|f| f.name.to_string()).collect();
    for (name, ty) in [("id", "ID"), ("createdAt", "Time"), ("updatedAt", "Time")] {
        if !existing.contains(name) {
            obj.fields.push(field(name, non_null(ty)?)?);
        }
    }
    obj.fields.sort_by_key(|f| builtin_field_rank(f.name.as_str()));
    Ok(())
}

fn builtin_field_rank(name: &str) -> usize {
    BUILTIN_NODE_FIELDS
        .iter()
        .position(|b| *b == name)
        .unwrap_or(BUILTIN_NODE_FIELDS.len())
}

fn is_builtin_node_field(name: &str) -> bool {
    BUILTIN_NODE_FIELDS.contains(&name)
}

/// The standard six pagination arguments over `T`.
fn connection_method(type_name: &str, method_name: &str) -> Result<FieldDefinition> {
    Ok(FieldDefinition {
        description: None,
        name: ident(method_name)?,
        arguments: vec![
            input_value("after", named("Cursor")?)?,
            input_value("first", named("Int")?)?,
            input_value("before", named("Cursor")?)?,
            input_value("last", named("Int")?)?,
            input_value("filterBy", named(&format!("{type_name}Filter"))?)?,
            input_value(
                "orderBy",
                Type::List(Box::new(non_null(&format!("{type_name}Order"))?)),
            )?,
        ],
        ty: non_null(&format!("{type_name}Connection"))?,
        directives: DirectiveList::default(),
    })
}

/// Replace each list-of-node field with a connection method. Both the list
/// and its element must be non-null.
fn ensure_field_connections(defs: &[Definition], obj: &mut ObjectTypeDefinition) -> Result<()> {
    for i in 0..obj.fields.len() {
        let f = &obj.fields[i];
        if RESERVED_FIELDS.contains(&f.name.as_str()) {
            continue;
        }
        let (elem, field_non_null, elem_non_null) = match &f.ty {
            Type::List(inner) | Type::NonNullList(inner) => {
                let field_non_null = matches!(f.ty, Type::NonNullList(_));
                match inner.as_ref() {
                    Type::Named(n) => (n.to_string(), field_non_null, false),
                    Type::NonNullNamed(n) => (n.to_string(), field_non_null, true),
                    _ => continue, // nested lists never become connections
                }
            }
            _ => continue,
        };
        if !is_node_object(defs, &elem) {
            continue;
        }
        if !field_non_null {
            return Err(Error::SchemaInvariant(format!(
                "field {}.{} should be non-null",
                obj.name, f.name
            )));
        }
        if !elem_non_null {
            return Err(Error::SchemaInvariant(format!(
                "elem of field {}.{} should be non-null",
                obj.name, f.name
            )));
        }
        let method = connection_method(&elem, f.name.as_str())?;
        obj.fields[i] = Node::new(method);
    }
    Ok(())
}

/// Every field already declared on `type_name` or its extensions.
fn declared_methods(defs: &[Definition], extensions: &[Definition], type_name: &str) -> BTreeSet<String> {
    let mut methods = BTreeSet::new();
    for def in defs.iter().chain(extensions) {
        let fields = match def {
            Definition::ObjectTypeDefinition(d) if d.name.as_str() == type_name => &d.fields,
            Definition::ObjectTypeExtension(d) if d.name.as_str() == type_name => &d.fields,
            _ => continue,
        };
        methods.extend(fields.iter().map(|f| f.name.to_string()));
    }
    methods
}

fn object_extension(type_name: &str, fields: Vec<Node<FieldDefinition>>) -> Result<Definition> {
    Ok(Definition::ObjectTypeExtension(Node::new(
        ObjectTypeExtension {
            name: ident(type_name)?,
            implements_interfaces: Vec::new(),
            directives: DirectiveList::default(),
            fields,
        },
    )))
}

/// Add `Query.<plural>` returning `TConnection!` unless a field of that
/// name already exists on `Query` or any of its extensions.
fn ensure_query(
    defs: &[Definition],
    extensions: &[Definition],
    obj: &ObjectTypeDefinition,
) -> Result<Option<Definition>> {
    let methods = declared_methods(defs, extensions, "Query");
    let method_name = camel_case(&plural(obj.name.as_str()));
    if methods.contains(&method_name) {
        return Ok(None);
    }
    let method = connection_method(obj.name.as_str(), &method_name)?;
    Ok(Some(object_extension("Query", vec![Node::new(method)])?))
}

fn ensure_connection_types(defs: &[Definition], obj: &ObjectTypeDefinition) -> Result<Vec<Definition>> {
    let name = obj.name.as_str();
    let mut out = Vec::new();

    let connection_name = format!("{name}Connection");
    if !definition_exists(defs, &connection_name) {
        out.push(object_def(
            &connection_name,
            vec![
                field("nodes", Type::NonNullList(Box::new(non_null(name)?)))?,
                field(
                    "edges",
                    Type::NonNullList(Box::new(non_null(&format!("{name}Edge"))?)),
                )?,
                field("pageInfo", non_null("PageInfo")?)?,
                field("totalCount", named("Int")?)?,
            ],
        )?);
    }

    let edge_name = format!("{name}Edge");
    if !definition_exists(defs, &edge_name) {
        out.push(object_def(
            &edge_name,
            vec![
                field("node", non_null(name)?)?,
                field("cursor", non_null("Cursor")?)?,
            ],
        )?);
    }
    Ok(out)
}

/// The matching built-in filter input for a scalar/enum field, the target's
/// filter for a node reference, `None` for everything else.
fn filter_input_name(defs: &[Definition], ty: &Type) -> Option<String> {
    let type_name = ty.inner_named_type().as_str();
    if let Some(def) = find_type_definition(defs, type_name) {
        match def {
            Definition::ScalarTypeDefinition(_) | Definition::EnumTypeDefinition(_) => {}
            Definition::ObjectTypeDefinition(obj)
                if obj.directives.get(NODE_DIRECTIVE).is_some() =>
            {
                return Some(format!("{type_name}Filter"));
            }
            _ => return None,
        }
    }
    match type_name {
        "String" => Some("StringFilter".to_string()),
        "Int" => Some("IntFilter".to_string()),
        "Float" => Some("FloatFilter".to_string()),
        "Boolean" => Some("BooleanFilter".to_string()),
        "ID" => Some("IDFilter".to_string()),
        "Time" => Some("TimeFilter".to_string()),
        _ => match find_type_definition(defs, type_name) {
            Some(Definition::EnumTypeDefinition(_)) => Some("EnumFilter".to_string()),
            _ => None,
        },
    }
}

fn ensure_filter(defs: &[Definition], obj: &ObjectTypeDefinition) -> Result<Vec<Definition>> {
    let filter_name = format!("{}Filter", obj.name);
    if definition_exists(defs, &filter_name) {
        return Ok(Vec::new());
    }

    let mut fields = vec![
        input_value("not", named(&filter_name)?)?,
        input_value("and", Type::List(Box::new(non_null(&filter_name)?)))?,
        input_value("or", Type::List(Box::new(non_null(&filter_name)?)))?,
    ];
    for f in &obj.fields {
        if RESERVED_FIELDS.contains(&f.name.as_str()) {
            continue;
        }
        if is_list_type(&f.ty) || is_method_field(f) {
            continue;
        }
        if let Some(filter_ty) = filter_input_name(defs, &f.ty) {
            fields.push(input_value(f.name.as_str(), named(&filter_ty)?)?);
        }
    }
    Ok(vec![input_def(&filter_name, fields)?])
}

/// Scalar/enum, non-list, non-method fields are orderable.
fn is_orderable(defs: &[Definition], f: &FieldDefinition) -> bool {
    if RESERVED_FIELDS.contains(&f.name.as_str()) || is_list_type(&f.ty) || is_method_field(f) {
        return false;
    }
    match find_type_definition(defs, f.ty.inner_named_type().as_str()) {
        None
        | Some(Definition::ScalarTypeDefinition(_) | Definition::EnumTypeDefinition(_)) => true,
        Some(_) => false,
    }
}

fn ensure_order_types(defs: &[Definition], obj: &ObjectTypeDefinition) -> Result<Vec<Definition>> {
    let name = obj.name.as_str();
    let mut out = Vec::new();

    let order_name = format!("{name}Order");
    if !definition_exists(defs, &order_name) {
        out.push(input_def(
            &order_name,
            vec![
                input_value("field", non_null(&format!("{name}OrderField"))?)?,
                input_value("direction", non_null("OrderDirection")?)?,
            ],
        )?);
    }

    let order_field_name = format!("{name}OrderField");
    if !definition_exists(defs, &order_field_name) {
        let values = obj
            .fields
            .iter()
            .filter(|f| is_orderable(defs, f))
            .map(|f| {
                Ok(Node::new(EnumValueDefinition {
                    description: None,
                    value: ident(&upper_snake_case(f.name.as_str()))?,
                    directives: DirectiveList::default(),
                }))
            })
            .collect::<Result<Vec<_>>>()?;
        out.push(Definition::EnumTypeDefinition(Node::new(
            EnumTypeDefinition {
                description: None,
                name: ident(&order_field_name)?,
                directives: DirectiveList::default(),
                values,
            },
        )));
    }
    Ok(out)
}

/// Add `create<T>`/`update<T>`/`delete<T>` to `Mutation` unless present.
fn ensure_mutation(
    defs: &[Definition],
    extensions: &[Definition],
    obj: &ObjectTypeDefinition,
) -> Result<Option<Definition>> {
    let methods = declared_methods(defs, extensions, "Mutation");
    let mut added = Vec::new();
    for &action in ACTIONS {
        let method_name = format!("{action}{}", obj.name);
        if methods.contains(&method_name) {
            continue;
        }
        let pascal = pascal_case(&method_name);
        added.push(Node::new(FieldDefinition {
            description: None,
            name: ident(&method_name)?,
            arguments: vec![input_value("input", non_null(&format!("{pascal}Input"))?)?],
            ty: non_null(&format!("{pascal}Payload"))?,
            directives: DirectiveList::default(),
        }));
    }
    if added.is_empty() {
        return Ok(None);
    }
    Ok(Some(object_extension("Mutation", added)?))
}

fn nullable(ty: &Type) -> Type {
    match ty {
        Type::NonNullNamed(n) => Type::Named(n.clone()),
        Type::NonNullList(inner) => Type::List(inner.clone()),
        other => other.clone(),
    }
}

fn with_inner_name(ty: &Type, name: Name) -> Type {
    match ty {
        Type::Named(_) => Type::Named(name),
        Type::NonNullNamed(_) => Type::NonNullNamed(name),
        other => other.clone(),
    }
}

/// Project a node field into a mutation input field. `None` when the field
/// is unsupported (lists, nested non-node objects, interfaces, unions).
fn project_input_field(
    defs: &[Definition],
    obj_name: &str,
    f: &FieldDefinition,
    action: &str,
) -> Result<Option<Node<InputValueDefinition>>> {
    if RESERVED_FIELDS.contains(&f.name.as_str())
        || is_method_field(f)
        || is_builtin_node_field(f.name.as_str())
    {
        return Ok(None);
    }
    if is_list_type(&f.ty) {
        debug!(
            field = %format!("{obj_name}.{}", f.name),
            "skipping list field in mutation input; not supported in this iteration"
        );
        return Ok(None);
    }

    let mut ty = f.ty.clone();
    let mut name = f.name.to_string();
    if let Some(def) = find_type_definition(defs, f.ty.inner_named_type().as_str()) {
        match def {
            Definition::ObjectTypeDefinition(target)
                if target.directives.get(NODE_DIRECTIVE).is_some() =>
            {
                // References are stored by id.
                ty = with_inner_name(&ty, ident("ID")?);
                name = format!("{name}Id");
            }
            Definition::ObjectTypeDefinition(_) => {
                debug!(
                    field = %format!("{obj_name}.{}", f.name),
                    "skipping nested non-node object in mutation input"
                );
                return Ok(None);
            }
            Definition::ScalarTypeDefinition(_) | Definition::EnumTypeDefinition(_) => {}
            _ => return Ok(None),
        }
    }
    if action == "update" {
        ty = nullable(&ty);
    }
    Ok(Some(input_value(&name, ty)?))
}

fn ensure_mutation_types(defs: &[Definition], obj: &ObjectTypeDefinition) -> Result<Vec<Definition>> {
    let name = obj.name.as_str();
    let mut out = Vec::new();

    for &action in ACTIONS {
        let action_pascal = pascal_case(action);

        let input_name = format!("{action_pascal}{name}Input");
        if !definition_exists(defs, &input_name) {
            let mut fields = vec![input_value("clientMutationId", named("String")?)?];
            if action != "create" {
                fields.push(input_value(
                    &format!("{}Id", camel_case(name)),
                    non_null("ID")?,
                )?);
            }
            if action != "delete" {
                for f in &obj.fields {
                    if let Some(projected) = project_input_field(defs, name, f, action)? {
                        fields.push(projected);
                    }
                }
            }
            out.push(input_def(&input_name, fields)?);
        }

        let payload_name = format!("{action_pascal}{name}Payload");
        if !definition_exists(defs, &payload_name) {
            out.push(object_def(
                &payload_name,
                vec![
                    field("clientMutationId", named("String")?)?,
                    field(&camel_case(name), non_null(name)?)?,
                ],
            )?);
        }
    }
    Ok(out)
}

/// Ensure `viewerPermission: <T>ViewerPermission!` on the node and define
/// the permission type when absent.
fn ensure_viewer_permission(
    defs: &[Definition],
    obj: &mut ObjectTypeDefinition,
) -> Result<Vec<Definition>> {
    let vp_name = format!("{}ViewerPermission", obj.name);

    if let Some(existing) = obj
        .fields
        .iter_mut()
        .find(|f| f.name.as_str() == "viewerPermission")
    {
        existing.make_mut().ty = non_null(&vp_name)?;
    } else {
        obj.fields.push(field("viewerPermission", non_null(&vp_name)?)?);
    }

    if definition_exists(defs, &vp_name) {
        return Ok(Vec::new());
    }
    Ok(vec![object_def(
        &vp_name,
        vec![
            field("canCreate", non_null("Boolean")?)?,
            field("canUpdate", non_null("Boolean")?)?,
            field("canDelete", non_null("Boolean")?)?,
        ],
    )?])
}

/// Strip the marker directive everywhere: its declaration, every type's
/// directive list, and every field's directive list.
fn remove_node_directives(defs: &mut Vec<Definition>) {
    defs.retain(|def| {
        !matches!(def, Definition::DirectiveDefinition(d) if d.name.as_str() == NODE_DIRECTIVE)
    });

    let strip = |list: &mut DirectiveList| {
        list.0.retain(|d| d.name.as_str() != NODE_DIRECTIVE);
    };

    for def in defs {
        match def {
            Definition::ObjectTypeDefinition(node) => {
                let obj = node.make_mut();
                strip(&mut obj.directives);
                for f in &mut obj.fields {
                    strip(&mut f.make_mut().directives);
                }
            }
            Definition::ObjectTypeExtension(node) => {
                let obj = node.make_mut();
                strip(&mut obj.directives);
                for f in &mut obj.fields {
                    strip(&mut f.make_mut().directives);
                }
            }
            Definition::InterfaceTypeDefinition(node) => {
                let iface = node.make_mut();
                strip(&mut iface.directives);
                for f in &mut iface.fields {
                    strip(&mut f.make_mut().directives);
                }
            }
            Definition::InputObjectTypeDefinition(node) => {
                let input = node.make_mut();
                strip(&mut input.directives);
                for f in &mut input.fields {
                    strip(&mut f.make_mut().directives);
                }
            }
            Definition::ScalarTypeDefinition(node) => strip(&mut node.make_mut().directives),
            Definition::EnumTypeDefinition(node) => strip(&mut node.make_mut().directives),
            _ => {}
        }
    }
}
