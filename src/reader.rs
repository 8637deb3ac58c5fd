//! FHIR bundle reader: `StructureDefinition` resources → `SchemaNode` forest.
//!
//! Snapshot elements are flat, addressed by dotted paths. They are attached
//! under their parent path (shallowest paths first); elements that end up with
//! children become nested complex types named after their path.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::path_de::{from_str_with_path, from_value_with_path};
use crate::primitives::PrimitiveMap;
use crate::schema::{Derivation, FieldType, Kind, SchemaNode};
use crate::synth::{is_reserved, upper_camel, DEFAULT_DISCRIMINANT};

const CHOICE_SUFFIX: &str = "[x]";

// ————————————————————————————————————————————————————————————————————————————
// ERRORS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{context}: at JSON path {path} → {message}")]
    Json {
        context: String,
        path: String,
        message: String,
    },
    #[error("StructureDefinition {0}: no root element in snapshot")]
    MissingRoot(String),
    #[error("StructureDefinition {definition}: element {element} has no parent {parent}")]
    DanglingElement {
        definition: String,
        element: String,
        parent: String,
    },
    #[error("unknown target profile type: {0}")]
    UnknownTargetProfile(String),
}

// ————————————————————————————————————————————————————————————————————————————
// WIRE TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Deserialize)]
struct BundleDoc {
    #[serde(default)]
    entry: Vec<EntryDoc>,
}

#[derive(Debug, Deserialize)]
struct EntryDoc {
    resource: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StructureDefinitionDoc {
    id: String,
    #[serde(rename = "type")]
    type_: String,
    kind: Kind,
    derivation: Option<Derivation>,
    #[serde(default, rename = "abstract")]
    is_abstract: bool,
    description: Option<String>,
    snapshot: SnapshotDoc,
}

#[derive(Debug, Deserialize)]
struct SnapshotDoc {
    element: Vec<ElementDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElementDoc {
    id: String,
    path: String,
    #[serde(default)]
    definition: String,
    #[serde(default)]
    min: u32,
    max: Option<String>,
    #[serde(rename = "type")]
    types: Option<Vec<TypeRefDoc>>,
    content_reference: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeRefDoc {
    code: String,
    #[serde(default)]
    target_profile: Vec<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// API
// ————————————————————————————————————————————————————————————————————————————

pub fn load_bundle(path: &Path, primitives: &PrimitiveMap) -> Result<Vec<SchemaNode>, ReadError> {
    let source = std::fs::read_to_string(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_bundle_str(&source, &path.to_string_lossy(), primitives)
}

pub fn read_bundle_str(
    source: &str,
    context: &str,
    primitives: &PrimitiveMap,
) -> Result<Vec<SchemaNode>, ReadError> {
    let bundle: BundleDoc = from_str_with_path(source, context)?;
    read_entries(bundle, context, primitives)
}

pub fn read_bundle_value(
    value: Value,
    context: &str,
    primitives: &PrimitiveMap,
) -> Result<Vec<SchemaNode>, ReadError> {
    let bundle: BundleDoc = from_value_with_path(value, context)?;
    read_entries(bundle, context, primitives)
}

fn read_entries(
    bundle: BundleDoc,
    context: &str,
    primitives: &PrimitiveMap,
) -> Result<Vec<SchemaNode>, ReadError> {
    let mut out = Vec::new();
    for (index, entry) in bundle.entry.into_iter().enumerate() {
        let Some(resource) = entry.resource else { continue };
        if resource.get("resourceType").and_then(Value::as_str) != Some("StructureDefinition") {
            continue;
        }
        let doc: StructureDefinitionDoc =
            from_value_with_path(resource, &format!("{context} entry[{index}]"))?;
        let node = read_structure_definition(doc, primitives)?;
        if node.is_resource_profile() {
            tracing::warn!("skipping resource profile {}", node.id);
            continue;
        }
        tracing::debug!("read {} ({:?})", node.id, node.kind);
        out.push(node);
    }
    Ok(out)
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn read_structure_definition(
    doc: StructureDefinitionDoc,
    primitives: &PrimitiveMap,
) -> Result<SchemaNode, ReadError> {
    let elements = doc.snapshot.element;
    let root_element = elements
        .iter()
        .find(|e| e.id == doc.type_)
        .ok_or_else(|| ReadError::MissingRoot(doc.id.clone()))?;

    let docstring = if root_element.definition.is_empty() {
        doc.description.clone().unwrap_or_default()
    } else {
        root_element.definition.clone()
    };

    let mut root = SchemaNode {
        id: doc.id.clone(),
        docstring,
        types: parse_element_type(root_element, &doc.id, primitives)?,
        elements: IndexMap::new(),
        is_choice: false,
        derivation: doc.derivation,
        is_abstract: doc.is_abstract,
        kind: Some(doc.kind),
    };

    let mut rest: Vec<&ElementDoc> = elements
        .iter()
        .filter(|e| e.id != doc.type_)
        .filter(|e| !e.id.contains(':'))
        .filter(|e| e.max.as_deref() != Some("0"))
        .collect();
    // parents before children; document order within a depth
    rest.sort_by_key(|e| e.path.matches('.').count());

    for element in rest {
        attach_element(&mut root, element, primitives)?;
    }

    if doc.kind == Kind::Primitive {
        root.types = root
            .elements
            .get("value")
            .map(|v| v.types.clone())
            .unwrap_or_default();
        root.elements.clear();
    }

    if doc.kind == Kind::Resource && !doc.is_abstract && doc.derivation != Some(Derivation::Constraint) {
        let tag = SchemaNode::new(DEFAULT_DISCRIMINANT, "").with_type(FieldType::literal(doc.id.clone()));
        root.elements.shift_insert(0, DEFAULT_DISCRIMINANT.to_string(), tag);
    }

    Ok(root)
}

fn attach_element(
    root: &mut SchemaNode,
    element: &ElementDoc,
    primitives: &PrimitiveMap,
) -> Result<(), ReadError> {
    let components: Vec<&str> = element.path.split('.').skip(1).collect();
    let Some((_, parents)) = components.split_last() else {
        return Ok(());
    };

    let root_id = root.id.clone();
    let mut in_focus = root;
    let mut class_name = root_id.clone();
    for component in parents {
        let key = strip_choice(component);
        class_name.push_str(&upper_camel(key));
        in_focus = in_focus
            .elements
            .get_mut(key)
            .ok_or_else(|| ReadError::DanglingElement {
                definition: root_id.clone(),
                element: element.id.clone(),
                parent: key.to_string(),
            })?;
    }
    if !parents.is_empty() && in_focus.kind.is_none() {
        promote_to_complex(in_focus, class_name);
    }

    let name = parse_element_name(element);
    let node = SchemaNode {
        id: name.to_string(),
        docstring: element.definition.clone(),
        types: parse_element_type(element, &root_id, primitives)?,
        elements: IndexMap::new(),
        is_choice: is_choice(element),
        derivation: None,
        is_abstract: false,
        kind: None,
    };
    in_focus.elements.insert(name.to_string(), node);
    Ok(())
}

/// An element that owns children is declared as its own class.
fn promote_to_complex(node: &mut SchemaNode, class_name: String) {
    if node.types.is_empty() {
        node.types.push(FieldType::new(class_name.clone(), false, false));
    }
    for ty in &mut node.types {
        ty.code = class_name.clone();
    }
    node.id = class_name;
    node.kind = Some(Kind::Complex);
}

fn parse_element_name(element: &ElementDoc) -> &str {
    let last = element.id.rsplit('.').next().unwrap_or(&element.id);
    let name = strip_choice(last);
    if is_reserved(name) {
        tracing::warn!("in parsing '{}' id: '{}' is a keyword", element.id, name);
    }
    name
}

fn strip_choice(s: &str) -> &str {
    s.strip_suffix(CHOICE_SUFFIX).unwrap_or(s)
}

fn is_choice(element: &ElementDoc) -> bool {
    element.path.ends_with(CHOICE_SUFFIX)
}

fn parse_element_type(
    element: &ElementDoc,
    definition_id: &str,
    primitives: &PrimitiveMap,
) -> Result<Vec<FieldType>, ReadError> {
    let required = element.min != 0;
    let is_array = element.max.as_deref().is_some_and(|m| m != "1");

    if let Some(types) = &element.types {
        return types
            .iter()
            .map(|t| {
                let code = t.code.rsplit('/').next().unwrap_or(&t.code);
                let target_profile = parse_target_profile(&t.target_profile)?;
                Ok(FieldType {
                    code: primitives.resolve(code).to_string(),
                    required,
                    is_array,
                    is_literal: false,
                    target_profile,
                })
            })
            .collect();
    }

    if let Some(reference) = &element.content_reference {
        let code = content_reference_class(reference, definition_id);
        return Ok(vec![FieldType::new(code, required, is_array)]);
    }

    Ok(Vec::new())
}

/// `#Questionnaire.item` → `QuestionnaireItem`; the definition id replaces the
/// leading type so names match the ones assigned by `promote_to_complex`.
fn content_reference_class(reference: &str, definition_id: &str) -> String {
    let path = reference.rsplit('#').next().unwrap_or(reference);
    let mut name = definition_id.to_string();
    for component in path.split('.').skip(1) {
        name.push_str(&upper_camel(strip_choice(component)));
    }
    name
}

fn parse_target_profile(profiles: &[String]) -> Result<Option<Vec<String>>, ReadError> {
    if profiles.is_empty() {
        return Ok(None);
    }
    profiles
        .iter()
        .map(|p| {
            let mut segments = p.rsplit('/');
            match (segments.next(), segments.next()) {
                (Some(name), Some("StructureDefinition")) => Ok(name.to_string()),
                _ => Err(ReadError::UnknownTargetProfile(p.clone())),
            }
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
