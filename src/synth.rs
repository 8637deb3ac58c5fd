//! Declaration synthesis engine.
//!
//! Walk a schema forest and decide, per node, which declarations must exist,
//! what their fields and defaults are, how choice elements expand into variant
//! classes plus a union alias, and in which order everything is emitted.
//!
//! Design goals:
//! - Pure: no I/O, no global logger. Anomalies go to an explicit `Diagnostics`.
//! - Deterministic: same forest in, same declaration list out.
//! - In-body references are forward-ref tokens; a trailing link step per class
//!   resolves them, so declaration order never needs a topological sort.
//! - Deep trees are walked with an explicit work list.
pub mod annotation;
pub mod ident;
pub mod order;
pub mod poly;
pub mod tagged;
pub mod walk;

use serde::Serialize;

use crate::decl::Declaration;
use crate::schema::{FieldType, Kind, SchemaNode};

pub use annotation::{annotate, AnnotationForm};
pub use ident::{is_reserved, resolve_identifier, upper_camel};

// ------------------------------- Policy ---------------------------------- //

pub const DEFAULT_DISCRIMINANT: &str = "resourceType";
pub const DEFAULT_ANY_RESOURCE: &str = "AnyResource";
pub const DEFAULT_ABSTRACT_RESOURCE: &str = "Resource";

#[derive(Debug, Clone)]
pub struct SynthConfig {
    /// Field that tells resources apart at runtime.
    pub discriminant: String,
    /// Name of the tagged union over all concrete resources.
    pub any_resource: String,
    /// Type code that really means "any resource"; remapped to `any_resource`.
    pub abstract_resource: String,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            discriminant: DEFAULT_DISCRIMINANT.to_string(),
            any_resource: DEFAULT_ANY_RESOURCE.to_string(),
            abstract_resource: DEFAULT_ABSTRACT_RESOURCE.to_string(),
        }
    }
}

impl SynthConfig {
    pub fn remap_type(&self, ty: &FieldType) -> FieldType {
        if !ty.is_literal && ty.code == self.abstract_resource {
            ty.with_code(self.any_resource.clone())
        } else {
            ty.clone()
        }
    }
}

// ----------------------------- Diagnostics -------------------------------- //

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub node_id: String,
    pub kind: Option<Kind>,
    pub message: String,
}

/// Sink the walker reports into. Callers decide whether and how to log.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self { Self::default() }

    pub fn warn(&mut self, node: &SchemaNode, message: impl Into<String>) {
        self.records.push(Diagnostic {
            node_id: node.id.clone(),
            kind: node.kind,
            message: message.into(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> { self.records.iter() }
    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }
}

// ------------------------------- Front API -------------------------------- //

pub struct DeclarationBuilder { config: SynthConfig }

impl DeclarationBuilder {
    pub fn new(config: SynthConfig) -> Self { Self { config } }

    /// Build the full ordered declaration list for `roots`.
    pub fn build(&self, roots: &[SchemaNode], diagnostics: &mut Diagnostics) -> Vec<Declaration> {
        let mut decls = Vec::new();
        for root in roots {
            for node in walk::post_order(root) {
                walk::define_node(node, &self.config, diagnostics, &mut decls);
            }
        }
        if let Some(union) = tagged::any_resource_union(roots, &self.config) {
            decls.push(Declaration::Union(union));
        }
        order::defer_links(decls)
    }
}

impl Default for DeclarationBuilder {
    fn default() -> Self { Self::new(SynthConfig::default()) }
}

/// Convenience: default config, fresh diagnostics.
pub fn build_declarations(roots: &[SchemaNode]) -> (Vec<Declaration>, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let decls = DeclarationBuilder::default().build(roots, &mut diagnostics);
    (decls, diagnostics)
}

// ------------------------------- Tests ------------------------------------ //
