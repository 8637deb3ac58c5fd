use crate::decl::FieldDefault;
use crate::schema::FieldType;

/// Reserved words of the emitted declaration syntax.
const RESERVED: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break",
    "class", "continue", "def", "del", "elif", "else", "except", "finally", "for",
    "from", "global", "if", "import", "in", "is", "lambda", "nonlocal", "not", "or",
    "pass", "raise", "return", "try", "while", "with", "yield",
];

const RESERVED_SUFFIX: &str = "_";

pub fn is_reserved(identifier: &str) -> bool {
    RESERVED.contains(&identifier)
}

/// `valueQuantity` style: only the first character is raised.
pub fn upper_camel(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Safe identifier plus default for one field.
///
/// A renamed field always keeps its wire name through `FieldDefault::Aliased`.
pub fn resolve_identifier(identifier: &str, ty: &FieldType) -> (String, Option<FieldDefault>) {
    if is_reserved(identifier) {
        let safe = format!("{identifier}{RESERVED_SUFFIX}");
        let default = FieldDefault::Aliased {
            wire_name: identifier.to_string(),
            absent: !ty.required,
        };
        return (safe, Some(default));
    }

    let default = if !ty.required {
        Some(FieldDefault::Absent)
    } else if ty.is_literal && !ty.is_array {
        Some(FieldDefault::Literal { value: ty.code.clone() })
    } else {
        None
    };
    (identifier.to_string(), default)
}
