//! Python source emitter for a declaration list (pydantic-style models).
//!
//! Declarations arrive in emission order; this module only decides syntax.

use crate::decl::{
    AliasDeclaration, Annotation, ClassDeclaration, Declaration, FieldDefault, FieldSpec,
    UnionDeclaration,
};

const INDENT: &str = "    ";
const SEPARATOR: &str = "\n\n\n";
const TYPING_IMPORTS: &str =
    "from typing import List as List_, Optional as Optional_, Literal as Literal_, Annotated as Annotated_";
const PYDANTIC_IMPORTS: &str = "from pydantic import Field, Extra";
const BASE_MODEL_ALIAS: &str = "BaseModel";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("base model must be a qualified name like `pydantic.BaseModel`, got `{0}`")]
    InvalidBaseModel(String),
}

pub struct PythonEmitter {
    base_module: String,
    base_class: String,
    imports: Vec<String>,
    blocks: Vec<String>,
}

impl PythonEmitter {
    pub fn new(base_model: &str) -> Result<Self, RenderError> {
        let (module, class) = base_model
            .rsplit_once('.')
            .filter(|(m, c)| !m.is_empty() && !c.is_empty())
            .ok_or_else(|| RenderError::InvalidBaseModel(base_model.to_string()))?;
        Ok(Self {
            base_module: module.to_string(),
            base_class: class.to_string(),
            imports: Vec::new(),
            blocks: Vec::new(),
        })
    }

    /// Extra import lines, e.g. for overridden primitive types.
    pub fn with_imports(mut self, imports: &[String]) -> Self {
        self.imports.extend(imports.iter().cloned());
        self
    }

    pub fn emit(&mut self, decls: &[Declaration]) {
        for decl in decls {
            let block = match decl {
                Declaration::Class(c) => class_block(c),
                Declaration::Alias(a) => alias_block(a),
                Declaration::Union(u) => union_block(u),
                Declaration::Link(l) => format!("{}.update_forward_refs()", l.target),
            };
            self.blocks.push(block);
        }
    }

    pub fn into_string(self) -> String {
        let mut out = String::new();
        out.push_str(TYPING_IMPORTS);
        out.push('\n');
        for import in &self.imports {
            out.push_str(import);
            out.push('\n');
        }
        out.push_str(&format!(
            "from {} import {} as {BASE_MODEL_ALIAS}\n",
            self.base_module, self.base_class
        ));
        out.push_str(PYDANTIC_IMPORTS);
        out.push('\n');
        if !self.blocks.is_empty() {
            out.push_str("\n\n");
            out.push_str(&self.blocks.join(SEPARATOR));
            out.push('\n');
        }
        out
    }
}

// ————————————————————————————————————————————————————————————————————————————
// BLOCKS
// ————————————————————————————————————————————————————————————————————————————

fn class_block(class: &ClassDeclaration) -> String {
    let header = match &class.base {
        None => format!(
            "class {}({BASE_MODEL_ALIAS}, extra=Extra.forbid, validate_assignment=True):",
            class.name
        ),
        Some(base) => format!("class {}({base}):", class.name),
    };

    let mut body: Vec<String> = Vec::new();
    if !class.docstring.is_empty() {
        body.push(docstring(&class.docstring));
    }
    for field in &class.fields {
        body.push(field_line(field));
        if !field.doc.is_empty() {
            body.push(docstring(&field.doc));
        }
    }
    if body.is_empty() {
        body.push("pass".to_string());
    }

    let mut out = header;
    for line in body {
        out.push('\n');
        out.push_str(INDENT);
        out.push_str(&line);
    }
    out
}

fn field_line(field: &FieldSpec) -> String {
    let mut line = format!("{}: {}", field.identifier, annotation(&field.annotation));
    if let Some(default) = &field.default {
        line.push_str(" = ");
        line.push_str(&default_value(default));
    }
    line
}

fn alias_block(alias: &AliasDeclaration) -> String {
    let mut out = format!("{} = {}", alias.name, annotation(&alias.annotation));
    if let Some(doc) = alias.docstring.as_deref().filter(|d| !d.is_empty()) {
        out.push('\n');
        out.push_str(&docstring(doc));
    }
    out
}

fn union_block(union: &UnionDeclaration) -> String {
    format!(
        "{} = Annotated_[{}, Field(..., discriminator={})]",
        union.name,
        union.members.join(" | "),
        py_str(&union.discriminant)
    )
}

// ————————————————————————————————————————————————————————————————————————————
// EXPRESSIONS
// ————————————————————————————————————————————————————————————————————————————

pub fn annotation(a: &Annotation) -> String {
    match a {
        Annotation::Name(n) => n.clone(),
        Annotation::ForwardRef(n) => py_str(n),
        Annotation::Literal(v) => format!("Literal_[{}]", py_str(v)),
        Annotation::List(inner) => format!("List_[{}]", annotation(inner)),
        Annotation::Optional(inner) => format!("Optional_[{}]", annotation(inner)),
        Annotation::Union(arms) => arms.iter().map(annotation).collect::<Vec<_>>().join(" | "),
    }
}

fn default_value(d: &FieldDefault) -> String {
    match d {
        FieldDefault::Absent => "None".to_string(),
        FieldDefault::Literal { value } => py_str(value),
        FieldDefault::Aliased { wire_name, absent: true } => {
            format!("Field(default=None, alias={})", py_str(wire_name))
        }
        FieldDefault::Aliased { wire_name, absent: false } => {
            format!("Field(alias={})", py_str(wire_name))
        }
    }
}

fn py_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn docstring(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"\"\"{escaped}\"\"\"")
}
