//! Naming helpers shared by the enhancer and the emitters.

use apollo_compiler::ast::{FieldDefinition, Type};
use heck::{ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};

/// `companyId` style.
pub(crate) fn camel_case(s: &str) -> String {
    s.to_lower_camel_case()
}

/// `CompanyId` style.
pub(crate) fn pascal_case(s: &str) -> String {
    s.to_upper_camel_case()
}

/// `company_id` style.
pub(crate) fn snake_case(s: &str) -> String {
    s.to_snake_case()
}

/// `COMPANY_ID` style.
pub(crate) fn upper_snake_case(s: &str) -> String {
    s.to_shouty_snake_case()
}

/// English plural, enough for type names: `Company` → `Companies`,
/// `Task` → `Tasks`, `Box` → `Boxes`.
pub(crate) fn plural(s: &str) -> String {
    let lower = s.to_lowercase();
    if let Some(stem) = s.strip_suffix('y') {
        let before = stem.chars().last();
        if before.is_some_and(|c| !matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')) {
            return format!("{stem}ies");
        }
    }
    if lower.ends_with('s')
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        return format!("{s}es");
    }
    format!("{s}s")
}

/// List-shaped type, any nullability.
pub(crate) fn is_list_type(ty: &Type) -> bool {
    matches!(ty, Type::List(_) | Type::NonNullList(_))
}

/// A field that takes arguments resolves to a method, not a stored column.
pub(crate) fn is_method_field(field: &FieldDefinition) -> bool {
    !field.arguments.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plural_covers_type_name_shapes() {
        assert_eq!(plural("Company"), "Companies");
        assert_eq!(plural("User"), "Users");
        assert_eq!(plural("Task"), "Tasks");
        assert_eq!(plural("Box"), "Boxes");
        assert_eq!(plural("Status"), "Statuses");
        assert_eq!(plural("Branch"), "Branches");
        assert_eq!(plural("Day"), "Days");
    }

    #[test]
    fn case_helpers_handle_acronyms() {
        assert_eq!(camel_case("CompanyID"), "companyId");
        assert_eq!(pascal_case("companyId"), "CompanyId");
        assert_eq!(snake_case("CompanyResolver"), "company_resolver");
        assert_eq!(upper_snake_case("createdAt"), "CREATED_AT");
    }
}
