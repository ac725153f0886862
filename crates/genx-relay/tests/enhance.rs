//! Enhancement scenarios over small prototype schemas.
//!
//! Structure checks re-parse or inspect the output document rather than
//! comparing serialized text, except for the idempotence law where the
//! serialized form is the fixed point being asserted.

use apollo_compiler::ast::{Definition, Document, ObjectTypeDefinition};
use genx_core::Error;
use genx_relay::{enhance, EnhanceResult};
use pretty_assertions::assert_eq;

fn enhanced(sdl: &str) -> EnhanceResult {
    let doc = Document::parse(sdl, "prototype.graphql").expect("prototype should parse");
    enhance(&doc).expect("enhancement should succeed")
}

fn type_names(doc: &Document) -> Vec<String> {
    doc.definitions
        .iter()
        .filter_map(|def| match def {
            Definition::ObjectTypeDefinition(d) => Some(d.name.to_string()),
            Definition::InputObjectTypeDefinition(d) => Some(d.name.to_string()),
            Definition::EnumTypeDefinition(d) => Some(d.name.to_string()),
            Definition::ScalarTypeDefinition(d) => Some(d.name.to_string()),
            _ => None,
        })
        .collect()
}

fn object<'a>(doc: &'a Document, name: &str) -> &'a ObjectTypeDefinition {
    doc.definitions
        .iter()
        .find_map(|def| match def {
            Definition::ObjectTypeDefinition(d) if d.name.as_str() == name => Some(d.as_ref()),
            _ => None,
        })
        .unwrap_or_else(|| panic!("object `{name}` should exist"))
}

/// Fields of `name` across its definition and all extensions.
fn root_fields(doc: &Document, name: &str) -> Vec<String> {
    let mut fields = Vec::new();
    for def in &doc.definitions {
        match def {
            Definition::ObjectTypeDefinition(d) if d.name.as_str() == name => {
                fields.extend(d.fields.iter().map(|f| f.name.to_string()));
            }
            Definition::ObjectTypeExtension(d) if d.name.as_str() == name => {
                fields.extend(d.fields.iter().map(|f| f.name.to_string()));
            }
            _ => {}
        }
    }
    fields
}

fn input_fields(doc: &Document, name: &str) -> Vec<(String, String)> {
    doc.definitions
        .iter()
        .find_map(|def| match def {
            Definition::InputObjectTypeDefinition(d) if d.name.as_str() == name => Some(
                d.fields
                    .iter()
                    .map(|f| (f.name.to_string(), f.ty.to_string()))
                    .collect::<Vec<_>>(),
            ),
            _ => None,
        })
        .unwrap_or_else(|| panic!("input `{name}` should exist"))
}

#[test]
fn single_node_elaborates_the_full_relay_surface() {
    let result = enhanced("type Company @node {\n  name: String!\n}\n");
    let doc = &result.document;

    assert_eq!(result.nodes.iter().collect::<Vec<_>>(), vec!["Company"]);

    let names = type_names(doc);
    for expected in [
        "Company",
        "CompanyConnection",
        "CompanyEdge",
        "CompanyFilter",
        "CompanyOrder",
        "CompanyOrderField",
        "CompanyViewerPermission",
        "CreateCompanyInput",
        "CreateCompanyPayload",
        "UpdateCompanyInput",
        "UpdateCompanyPayload",
        "DeleteCompanyInput",
        "DeleteCompanyPayload",
    ] {
        assert!(names.iter().any(|n| n == expected), "missing {expected}");
    }

    assert!(root_fields(doc, "Query").contains(&"companies".to_string()));
    let mutations = root_fields(doc, "Mutation");
    for expected in ["createCompany", "updateCompany", "deleteCompany"] {
        assert!(mutations.contains(&expected.to_string()), "missing {expected}");
    }

    // Order enum carries the user field.
    let order_values: Vec<String> = doc
        .definitions
        .iter()
        .find_map(|def| match def {
            Definition::EnumTypeDefinition(d) if d.name.as_str() == "CompanyOrderField" => {
                Some(d.values.iter().map(|v| v.value.to_string()).collect())
            }
            _ => None,
        })
        .expect("order field enum");
    assert!(order_values.contains(&"NAME".to_string()));
    assert_eq!(order_values[..3], ["ID", "CREATED_AT", "UPDATED_AT"]);

    // The marker directive is gone everywhere.
    assert!(!doc.to_string().contains("@node"));

    // The elaborated document validates as a schema.
    result
        .document
        .to_schema()
        .expect("schema build")
        .validate()
        .expect("schema validation");
}

#[test]
fn builtin_node_fields_come_first_and_non_null() {
    let result = enhanced("type Company @node {\n  name: String!\n  id: ID!\n}\n");
    let company = object(&result.document, "Company");

    let heads: Vec<&str> = company.fields.iter().take(3).map(|f| f.name.as_str()).collect();
    assert_eq!(heads, ["id", "createdAt", "updatedAt"]);
    for f in company.fields.iter().take(3) {
        assert!(f.ty.is_non_null(), "{} must be non-null", f.name);
    }
    // The user field keeps its position after the built-ins.
    assert_eq!(company.fields[3].name.as_str(), "name");
}

#[test]
fn list_of_node_fields_become_connection_methods() {
    let result = enhanced(
        "type Company @node {\n  name: String!\n  employees: [User!]!\n}\n\n\
         type User @node {\n  name: String!\n}\n",
    );
    let company = object(&result.document, "Company");
    let employees = company
        .fields
        .iter()
        .find(|f| f.name.as_str() == "employees")
        .expect("employees field");

    assert_eq!(employees.ty.to_string(), "UserConnection!");
    let args: Vec<String> = employees
        .arguments
        .iter()
        .map(|a| format!("{}: {}", a.name, a.ty))
        .collect();
    assert_eq!(
        args,
        [
            "after: Cursor",
            "first: Int",
            "before: Cursor",
            "last: Int",
            "filterBy: UserFilter",
            "orderBy: [UserOrder!]"
        ]
    );
}

#[test]
fn nullable_list_of_node_is_a_schema_invariant_violation() {
    let doc = Document::parse(
        "type Company @node {\n  employees: [User!]\n}\n\ntype User @node {\n  name: String!\n}\n",
        "prototype.graphql",
    )
    .unwrap();
    let err = enhance(&doc).unwrap_err();
    assert!(matches!(err, Error::SchemaInvariant(_)));
    assert!(err.to_string().contains("Company.employees"));

    let doc = Document::parse(
        "type Company @node {\n  employees: [User]!\n}\n\ntype User @node {\n  name: String!\n}\n",
        "prototype.graphql",
    )
    .unwrap();
    let err = enhance(&doc).unwrap_err();
    assert!(err.to_string().contains("elem of field Company.employees"));
}

#[test]
fn node_references_project_to_id_inputs() {
    let result = enhanced(
        "type Company @node {\n  name: String!\n}\n\n\
         type User @node {\n  name: String!\n  company: Company!\n}\n",
    );
    let doc = &result.document;

    // The reference field itself stays a single reference.
    let user = object(doc, "User");
    let company_field = user
        .fields
        .iter()
        .find(|f| f.name.as_str() == "company")
        .expect("company field");
    assert_eq!(company_field.ty.to_string(), "Company!");

    let create = input_fields(doc, "CreateUserInput");
    assert!(create.contains(&("companyId".to_string(), "ID!".to_string())));
    assert!(create.contains(&("name".to_string(), "String!".to_string())));
    assert!(!create.iter().any(|(n, _)| n == "id" || n == "createdAt"));

    // Update inputs relax everything to nullable and add the selector.
    let update = input_fields(doc, "UpdateUserInput");
    assert!(update.contains(&("userId".to_string(), "ID!".to_string())));
    assert!(update.contains(&("companyId".to_string(), "ID".to_string())));
    assert!(update.contains(&("name".to_string(), "String".to_string())));

    let delete = input_fields(doc, "DeleteUserInput");
    assert_eq!(
        delete,
        [
            ("clientMutationId".to_string(), "String".to_string()),
            ("userId".to_string(), "ID!".to_string()),
        ]
    );
}

#[test]
fn predefined_root_fields_and_types_are_preserved() {
    let result = enhanced(
        "type Query {\n  companies: String\n}\n\n\
         type Mutation {\n  createCompany(input: CreateCompanyInput!): CreateCompanyPayload!\n}\n\n\
         input CompanyFilter {\n  custom: StringFilter\n}\n\n\
         type Company @node {\n  name: String!\n}\n",
    );
    let doc = &result.document;

    // No second `companies` field was added.
    let query_fields = root_fields(doc, "Query");
    assert_eq!(
        query_fields.iter().filter(|f| f.as_str() == "companies").count(),
        1
    );
    let query = object(doc, "Query");
    assert_eq!(query.fields[0].ty.to_string(), "String");

    // Pre-existing mutation fields are kept, absent ones added.
    let mutations = root_fields(doc, "Mutation");
    assert_eq!(
        mutations.iter().filter(|f| f.as_str() == "createCompany").count(),
        1
    );
    assert!(mutations.contains(&"updateCompany".to_string()));
    assert!(mutations.contains(&"deleteCompany".to_string()));

    // The user's filter input is left intact.
    let filter = input_fields(doc, "CompanyFilter");
    assert_eq!(filter, [("custom".to_string(), "StringFilter".to_string())]);
}

#[test]
fn user_enums_map_to_enum_filter_and_order_values() {
    let result = enhanced(
        "enum TaskStatus {\n  OPEN\n  DONE\n}\n\n\
         type Task @node {\n  title: String!\n  status: TaskStatus!\n}\n",
    );
    let filter = input_fields(&result.document, "TaskFilter");
    assert!(filter.contains(&("status".to_string(), "EnumFilter".to_string())));
    assert!(filter.contains(&("title".to_string(), "StringFilter".to_string())));
    assert!(filter.contains(&("not".to_string(), "TaskFilter".to_string())));
    assert!(filter.contains(&("and".to_string(), "[TaskFilter!]".to_string())));
}

#[test]
fn enhancement_is_idempotent() {
    let sdl = "type Company @node {\n  name: String!\n  employees: [User!]!\n}\n\n\
               type User @node {\n  name: String!\n  age: Int\n  company: Company!\n}\n";
    let first = enhanced(sdl).document.to_string();

    let reparsed = Document::parse(first.clone(), "enhanced.graphql").expect("round-trip parse");
    let second = enhance(&reparsed).expect("re-enhancement");

    assert_eq!(second.document.to_string(), first);
}

#[test]
fn viewer_permission_field_is_replaced_not_duplicated() {
    let result = enhanced(
        "type Company @node {\n  name: String!\n  viewerPermission: String\n}\n",
    );
    let company = object(&result.document, "Company");
    let vp: Vec<&str> = company
        .fields
        .iter()
        .filter(|f| f.name.as_str() == "viewerPermission")
        .map(|f| f.ty.inner_named_type().as_str())
        .collect();
    assert_eq!(vp, ["CompanyViewerPermission"]);
}
