//! Choice-element expansion.
//!
//! A node with required choice elements cannot be one class: every instance
//! carries exactly one of the candidate fields. It becomes a base class
//! (everything else), one variant class per candidate type, and an alias
//! unioning the variants under the node's own name.

use indexmap::IndexMap;

use crate::decl::{AliasDeclaration, Annotation};
use crate::schema::{Kind, SchemaNode};

use super::ident::upper_camel;

const SYNTHETIC_PREFIX: &str = "_";

/// Synthetic nodes derived from one polymorphic node. The input is untouched.
#[derive(Debug, Clone)]
pub struct Expansion {
    pub base: SchemaNode,
    pub variants: Vec<SchemaNode>,
    pub alias: AliasDeclaration,
}

pub fn is_expanded_choice(element: &SchemaNode) -> bool {
    element.is_polymorphic() && element.types.iter().any(|t| t.required)
}

pub fn base_id(node: &SchemaNode) -> String {
    format!("{SYNTHETIC_PREFIX}{}Base", node.id)
}

pub fn variant_id(node: &SchemaNode, element: &str, code: &str) -> String {
    format!("{SYNTHETIC_PREFIX}{}{}{}", node.id, upper_camel(element), upper_camel(code))
}

/// Copy of `node` without its children. Nested complex types are declared
/// from the original tree, so the synthetic nodes never need them.
fn shallow(node: &SchemaNode) -> SchemaNode {
    SchemaNode {
        id: node.id.clone(),
        docstring: node.docstring.clone(),
        types: node.types.clone(),
        elements: IndexMap::new(),
        is_choice: node.is_choice,
        derivation: node.derivation,
        is_abstract: node.is_abstract,
        kind: node.kind,
    }
}

pub fn expand(node: &SchemaNode) -> Expansion {
    let (choices, rest): (IndexMap<_, _>, IndexMap<_, _>) = node
        .elements
        .iter()
        .map(|(k, e)| (k.clone(), shallow(e)))
        .partition(|(_, e)| is_expanded_choice(e));

    let base = SchemaNode {
        id: base_id(node),
        elements: rest,
        ..shallow(node)
    };

    let mut variants = Vec::new();
    for (name, choice) in &choices {
        for ty in &choice.types {
            let element = SchemaNode {
                types: vec![ty.clone()],
                ..shallow(choice)
            };
            let mut elements = IndexMap::new();
            elements.insert(name.clone(), element);
            variants.push(SchemaNode {
                id: variant_id(node, name, &ty.code),
                docstring: choice.docstring.clone(),
                types: Vec::new(),
                elements,
                is_choice: false,
                derivation: None,
                is_abstract: false,
                kind: Some(Kind::Complex),
            });
        }
    }

    let alias = AliasDeclaration {
        name: node.id.clone(),
        annotation: Annotation::Union(
            variants.iter().map(|v| Annotation::Name(v.id.clone())).collect(),
        ),
        docstring: None,
    };

    Expansion { base, variants, alias }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    fn observation() -> SchemaNode {
        SchemaNode::new("Observation", "Measurements")
            .with_kind(Kind::Resource)
            .with_element("status", SchemaNode::new("status", "").with_type(FieldType::new("code", true, false)))
            .with_element(
                "value",
                SchemaNode::new("value", "Actual result")
                    .choice()
                    .with_type(FieldType::new("Quantity", true, false))
                    .with_type(FieldType::new("string", true, false))
                    .with_type(FieldType::new("boolean", true, false)),
            )
            .with_element(
                "effective",
                SchemaNode::new("effective", "Clinically relevant time")
                    .choice()
                    .with_type(FieldType::new("dateTime", false, false))
                    .with_type(FieldType::new("Period", false, false)),
            )
    }

    #[test]
    fn expansion_is_complete() {
        let node = observation();
        let exp = expand(&node);

        assert_eq!(exp.base.id, "_ObservationBase");
        assert_eq!(exp.base.kind, Some(Kind::Resource));
        let base_fields: Vec<&str> = exp.base.elements.keys().map(String::as_str).collect();
        assert_eq!(base_fields, ["status", "effective"]);

        let ids: Vec<&str> = exp.variants.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(
            ids,
            ["_ObservationValueQuantity", "_ObservationValueString", "_ObservationValueBoolean"]
        );
        for v in &exp.variants {
            assert_eq!(v.elements.len(), 1);
            assert_eq!(v.elements["value"].types.len(), 1);
            assert_eq!(v.docstring, "Actual result");
        }

        assert_eq!(exp.alias.name, "Observation");
        match &exp.alias.annotation {
            Annotation::Union(arms) => assert_eq!(arms.len(), 3),
            other => panic!("expected union, got {other:?}"),
        }

        // input untouched
        assert_eq!(node, observation());
    }

    #[test]
    fn synthetic_nodes_do_not_carry_nested_children() {
        let period = SchemaNode::new("Period", "")
            .with_kind(Kind::Complex)
            .with_type(FieldType::new("Period", false, false))
            .with_element("start", SchemaNode::new("start", "").with_type(FieldType::new("dateTime", false, false)));
        let node = observation().with_element("window", period);
        let exp = expand(&node);
        let window = &exp.base.elements["window"];
        assert_eq!(window.types, node.elements["window"].types);
        assert!(window.elements.is_empty());
        assert!(exp.variants.iter().all(|v| v.elements.values().all(|e| e.elements.is_empty())));
    }

    #[test]
    fn several_choices_expand_independently() {
        let mut node = observation();
        node.elements.get_mut("effective").unwrap().types[1].required = true;
        let exp = expand(&node);
        assert_eq!(exp.variants.len(), 5);
        assert_eq!(exp.variants[3].id, "_ObservationEffectiveDateTime");
        assert_eq!(exp.variants[4].id, "_ObservationEffectivePeriod");
        assert_eq!(exp.base.elements.keys().collect::<Vec<_>>(), ["status"]);
    }
}
