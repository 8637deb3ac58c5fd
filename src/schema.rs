// Schema tree handed to the declaration builder. Read-only input; nothing here
// knows about declarations or rendering.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Kind {
    #[serde(rename = "primitive-type")]
    Primitive,
    #[serde(rename = "complex-type")]
    Complex,
    #[serde(rename = "capability")]
    Capability,
    #[serde(rename = "operation")]
    Operation,
    #[serde(rename = "resource")]
    Resource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Derivation {
    Constraint,
    Specialization,
}

/// One candidate type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldType {
    pub code: String,
    pub required: bool,      // min > 0
    pub is_array: bool,      // max > 1
    pub is_literal: bool,    // `code` is the fixed value, not a type name
    pub target_profile: Option<Vec<String>>,
}

impl FieldType {
    pub fn new(code: impl Into<String>, required: bool, is_array: bool) -> Self {
        Self {
            code: code.into(),
            required,
            is_array,
            is_literal: false,
            target_profile: None,
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            code: value.into(),
            required: true,
            is_array: false,
            is_literal: true,
            target_profile: None,
        }
    }

    pub fn with_code(&self, code: impl Into<String>) -> Self {
        Self { code: code.into(), ..self.clone() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaNode {
    pub id: String,
    pub docstring: String,
    pub types: Vec<FieldType>,
    pub elements: IndexMap<String, SchemaNode>,
    pub is_choice: bool,
    pub derivation: Option<Derivation>,
    pub is_abstract: bool,
    pub kind: Option<Kind>,
}

impl SchemaNode {
    pub fn new(id: impl Into<String>, docstring: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            docstring: docstring.into(),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: Kind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_type(mut self, ty: FieldType) -> Self {
        self.types.push(ty);
        self
    }

    pub fn with_element(mut self, name: impl Into<String>, node: SchemaNode) -> Self {
        self.elements.insert(name.into(), node);
        self
    }

    pub fn choice(mut self) -> Self {
        self.is_choice = true;
        self
    }

    pub fn is_polymorphic(&self) -> bool {
        self.is_choice
    }

    pub fn is_resource_profile(&self) -> bool {
        self.derivation == Some(Derivation::Constraint) && self.kind == Some(Kind::Resource)
    }

    /// A choice element with at least one required candidate forces expansion.
    pub fn has_required_polymorphics(&self) -> bool {
        self.elements
            .values()
            .any(|e| e.is_polymorphic() && e.types.iter().any(|t| t.required))
    }

    pub fn nested_complex(&self) -> impl Iterator<Item = &SchemaNode> {
        self.elements.values().filter(|e| e.kind == Some(Kind::Complex))
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Kind::Primitive => "primitive-type",
            Kind::Complex => "complex-type",
            Kind::Capability => "capability",
            Kind::Operation => "operation",
            Kind::Resource => "resource",
        };
        f.write_str(s)
    }
}
