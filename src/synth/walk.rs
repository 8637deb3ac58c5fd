use crate::decl::{
    AliasDeclaration, Annotation, ClassDeclaration, Declaration, FieldSpec, LinkDeclaration,
};
use crate::schema::{Kind, SchemaNode};

use super::annotation::{annotate, AnnotationForm};
use super::ident::{resolve_identifier, upper_camel};
use super::{order, poly, Diagnostics, SynthConfig};

/// Nested complex types first, then their container. Explicit stack, so
/// nesting depth is bounded by memory, not by the call stack.
pub fn post_order(root: &SchemaNode) -> Vec<&SchemaNode> {
    let mut out = Vec::new();
    let mut stack: Vec<(&SchemaNode, bool)> = vec![(root, false)];

    while let Some((node, children_done)) = stack.pop() {
        if children_done {
            out.push(node);
            continue;
        }
        stack.push((node, true));
        let children: Vec<&SchemaNode> = node.nested_complex().collect();
        // reversed so the first element is visited first
        stack.extend(children.into_iter().rev().map(|c| (c, false)));
    }

    out
}

pub fn define_node(
    node: &SchemaNode,
    config: &SynthConfig,
    diagnostics: &mut Diagnostics,
    out: &mut Vec<Declaration>,
) {
    match node.kind {
        Some(Kind::Resource | Kind::Complex) => {
            if node.has_required_polymorphics() {
                define_polymorphic(node, config, diagnostics, out);
            } else {
                define_class(node, None, config, diagnostics, out);
            }
        }
        Some(Kind::Primitive) => {
            if let Some(alias) = define_alias(node, diagnostics) {
                out.push(Declaration::Alias(alias));
            }
        }
        Some(kind) => {
            diagnostics.warn(node, format!("unsupported definition {} of kind {kind}, skipping", node.id));
        }
        None => {
            diagnostics.warn(node, format!("definition {} has no kind, skipping", node.id));
        }
    }
}

fn define_polymorphic(
    node: &SchemaNode,
    config: &SynthConfig,
    diagnostics: &mut Diagnostics,
    out: &mut Vec<Declaration>,
) {
    let expansion = poly::expand(node);
    define_class(&expansion.base, None, config, diagnostics, out);
    for variant in &expansion.variants {
        define_class(variant, Some(expansion.base.id.clone()), config, diagnostics, out);
    }
    out.push(Declaration::Alias(expansion.alias));
}

fn define_class(
    node: &SchemaNode,
    base: Option<String>,
    config: &SynthConfig,
    diagnostics: &mut Diagnostics,
    out: &mut Vec<Declaration>,
) {
    let mut fields = Vec::new();
    for (name, element) in order::order_fields(&node.elements) {
        if element.types.is_empty() {
            diagnostics.warn(node, format!("element {name} has no type, no field emitted"));
            continue;
        }
        fields.extend(element_fields(name, element, config));
    }

    out.push(Declaration::Class(ClassDeclaration {
        name: node.id.clone(),
        docstring: node.docstring.clone(),
        base,
        fields,
    }));
    out.push(Declaration::Link(LinkDeclaration { target: node.id.clone() }));
}

/// One field per candidate type. Only choice elements have more than one, and
/// each candidate then gets `name + Code` as its wire name.
pub fn element_fields(name: &str, element: &SchemaNode, config: &SynthConfig) -> Vec<FieldSpec> {
    element
        .types
        .iter()
        .map(|ty| {
            let wire_name = if element.is_polymorphic() {
                format!("{name}{}", upper_camel(&ty.code))
            } else {
                name.to_string()
            };
            let ty = config.remap_type(ty);
            let (identifier, default) = resolve_identifier(&wire_name, &ty);
            FieldSpec {
                identifier,
                annotation: annotate(&ty, AnnotationForm::Field),
                default,
                doc: element.docstring.clone(),
            }
        })
        .collect()
}

fn define_alias(node: &SchemaNode, diagnostics: &mut Diagnostics) -> Option<AliasDeclaration> {
    let mut arms: Vec<Annotation> = node
        .types
        .iter()
        .map(|t| annotate(t, AnnotationForm::Alias))
        .collect();

    let annotation = match arms.len() {
        0 => {
            diagnostics.warn(node, format!("primitive {} has no value type, skipping", node.id));
            return None;
        }
        1 => arms.remove(0),
        _ => Annotation::Union(arms),
    };

    Some(AliasDeclaration {
        name: node.id.clone(),
        annotation,
        docstring: Some(node.docstring.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::FieldDefault;
    use crate::schema::FieldType;

    fn complex(id: &str) -> SchemaNode {
        SchemaNode::new(id, format!("{id} doc")).with_kind(Kind::Complex)
    }

    fn typed(code: &str, required: bool) -> SchemaNode {
        SchemaNode::new("", "").with_type(FieldType::new(code, required, false))
    }

    #[test]
    fn post_order_puts_children_before_parents() {
        let grandchild = complex("C");
        let child = complex("B").with_element("c", grandchild).with_element("x", typed("string", false));
        let sibling = complex("D");
        let root = complex("A").with_element("b", child).with_element("d", sibling);

        let ids: Vec<&str> = post_order(&root).iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["C", "B", "D", "A"]);
    }

    #[test]
    fn deep_nesting_does_not_recurse() {
        let mut node = complex("N0");
        for i in 1..20_000 {
            node = complex(&format!("N{i}")).with_element("inner", node);
        }
        let order = post_order(&node);
        assert_eq!(order.len(), 20_000);
        assert_eq!(order[0].id, "N0");
        assert_eq!(order.last().unwrap().id, "N19999");
        // nested owned nodes drop recursively; leak instead of overflowing in the test thread
        std::mem::forget(node);
    }

    #[test]
    fn deep_nesting_under_required_choice_does_not_recurse() {
        let mut node = complex("N0");
        for i in 1..20_000 {
            let inner = node.with_type(FieldType::new(format!("N{}", i - 1), true, false));
            node = complex(&format!("N{i}")).with_element("inner", inner);
        }
        let value = SchemaNode::new("value", "")
            .choice()
            .with_type(FieldType::new("string", true, false))
            .with_type(FieldType::new("integer", true, false));
        let roots = vec![node.with_element("value", value)];

        let (decls, diags) = crate::synth::build_declarations(&roots);
        assert!(diags.is_empty());
        let defs: Vec<&Declaration> = decls.iter().filter(|d| !d.is_link()).collect();
        let base = defs.iter().find_map(|d| d.as_class().filter(|c| c.name == "_N19999Base")).unwrap();
        assert_eq!(base.fields[0].identifier, "inner");
        assert_eq!(defs.last().unwrap().name(), "N19999");
        assert_eq!(defs.len(), 19_999 + 4);
        std::mem::forget(roots);
    }

    #[test]
    fn optional_choice_stays_inline_as_optional_fields() {
        let value = SchemaNode::new("value", "value doc")
            .choice()
            .with_type(FieldType::new("string", false, false))
            .with_type(FieldType::new("Quantity", false, false));
        let node = complex("Component").with_element("value", value);

        let mut diags = Diagnostics::new();
        let mut out = Vec::new();
        define_node(&node, &SynthConfig::default(), &mut diags, &mut out);

        let class = out[0].as_class().unwrap();
        let idents: Vec<&str> = class.fields.iter().map(|f| f.identifier.as_str()).collect();
        assert_eq!(idents, ["valueString", "valueQuantity"]);
        assert!(class.fields.iter().all(|f| f.annotation.is_optional()));
        assert!(class.fields.iter().all(|f| f.default == Some(FieldDefault::Absent)));
    }

    #[test]
    fn sibling_type_collision_orders_field_last() {
        let node = complex("Coding")
            .with_element("code", typed("code", false))
            .with_element("system", typed("uri", false))
            .with_element("display", typed("string", false));
        let mut out = Vec::new();
        define_node(&node, &SynthConfig::default(), &mut Diagnostics::new(), &mut out);
        let idents: Vec<&str> = out[0].as_class().unwrap().fields.iter().map(|f| f.identifier.as_str()).collect();
        assert_eq!(idents, ["system", "display", "code"]);
    }

    #[test]
    fn typeless_element_is_reported() {
        let node = complex("Odd").with_element("nothing", SchemaNode::new("nothing", ""));
        let mut diags = Diagnostics::new();
        let mut out = Vec::new();
        define_node(&node, &SynthConfig::default(), &mut diags, &mut out);
        assert!(out[0].as_class().unwrap().fields.is_empty());
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn keyword_element_keeps_wire_name() {
        let node = complex("Encounter").with_element("class", typed("Coding", true));
        let mut out = Vec::new();
        define_node(&node, &SynthConfig::default(), &mut Diagnostics::new(), &mut out);
        let f = &out[0].as_class().unwrap().fields[0];
        assert_eq!(f.identifier, "class_");
        assert_eq!(f.default, Some(FieldDefault::Aliased { wire_name: "class".into(), absent: false }));
    }
}
