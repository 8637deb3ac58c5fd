// Declaration model produced by `synth`. Annotations are fully resolved here;
// the renderer only decides syntax.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Annotation {
    Name(String),            // resolved reference, usable outside class bodies
    ForwardRef(String),      // deferred token, resolved by the link step
    Literal(String),         // exactly this value
    List(Box<Annotation>),
    Optional(Box<Annotation>),
    Union(Vec<Annotation>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldDefault {
    Absent,
    Literal { value: String },
    /// Safe identifier differs from the wire name; keep the wire name explicit.
    Aliased { wire_name: String, absent: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub identifier: String,
    pub annotation: Annotation,
    pub default: Option<FieldDefault>,
    pub doc: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassDeclaration {
    pub name: String,
    pub docstring: String,
    /// `None` inherits from the renderer's base model.
    pub base: Option<String>,
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasDeclaration {
    pub name: String,
    pub annotation: Annotation,
    pub docstring: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnionDeclaration {
    pub name: String,
    pub discriminant: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkDeclaration {
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decl", rename_all = "snake_case")]
pub enum Declaration {
    Class(ClassDeclaration),
    Alias(AliasDeclaration),
    Union(UnionDeclaration),
    Link(LinkDeclaration),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Class(c) => &c.name,
            Declaration::Alias(a) => &a.name,
            Declaration::Union(u) => &u.name,
            Declaration::Link(l) => &l.target,
        }
    }

    pub fn is_link(&self) -> bool {
        matches!(self, Declaration::Link(_))
    }

    pub fn as_class(&self) -> Option<&ClassDeclaration> {
        match self {
            Declaration::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_alias(&self) -> Option<&AliasDeclaration> {
        match self {
            Declaration::Alias(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_union(&self) -> Option<&UnionDeclaration> {
        match self {
            Declaration::Union(u) => Some(u),
            _ => None,
        }
    }
}

impl Annotation {
    pub fn is_optional(&self) -> bool {
        matches!(self, Annotation::Optional(_))
    }

    /// Names reachable from this annotation (forward refs included).
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(a) = stack.pop() {
            match a {
                Annotation::Name(n) | Annotation::ForwardRef(n) => out.push(n.as_str()),
                Annotation::Literal(_) => {}
                Annotation::List(inner) | Annotation::Optional(inner) => stack.push(inner),
                Annotation::Union(arms) => stack.extend(arms.iter().rev()),
            }
        }
        out
    }
}
