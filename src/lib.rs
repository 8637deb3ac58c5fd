//! FHIR `StructureDefinition` bundles → ordered type declarations → Python models.
//!
//! `reader` builds the schema forest, `synth` turns it into declarations,
//! `python` renders them.
pub mod decl;
pub mod path_de;
pub mod primitives;
pub mod python;
pub mod reader;
pub mod schema;
pub mod synth;

pub use decl::Declaration;
pub use schema::{FieldType, Kind, SchemaNode};
pub use synth::{build_declarations, DeclarationBuilder, Diagnostics, SynthConfig};
