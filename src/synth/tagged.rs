use crate::decl::UnionDeclaration;
use crate::schema::{Kind, SchemaNode};

use super::SynthConfig;

/// Top-level resources that expose the discriminant field.
pub fn select_tagged_resources<'a>(
    roots: &'a [SchemaNode],
    discriminant: &'a str,
) -> impl Iterator<Item = &'a SchemaNode> + 'a {
    roots
        .iter()
        .filter(move |n| n.kind == Some(Kind::Resource) && n.elements.contains_key(discriminant))
}

pub fn any_resource_union(roots: &[SchemaNode], config: &SynthConfig) -> Option<UnionDeclaration> {
    let members: Vec<String> = select_tagged_resources(roots, &config.discriminant)
        .map(|n| n.id.clone())
        .collect();
    if members.is_empty() {
        return None;
    }
    Some(UnionDeclaration {
        name: config.any_resource.clone(),
        discriminant: config.discriminant.clone(),
        members,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    fn tagged(id: &str, kind: Kind) -> SchemaNode {
        SchemaNode::new(id, "")
            .with_kind(kind)
            .with_element("resourceType", SchemaNode::new("resourceType", "").with_type(FieldType::literal(id)))
    }

    #[test]
    fn exactly_tagged_resources_are_members() {
        let roots = vec![
            tagged("Patient", Kind::Resource),
            SchemaNode::new("DomainResource", "").with_kind(Kind::Resource),
            tagged("Coding", Kind::Complex),
            tagged("Observation", Kind::Resource),
        ];
        let union = any_resource_union(&roots, &SynthConfig::default()).unwrap();
        assert_eq!(union.members, ["Patient", "Observation"]);
    }

    #[test]
    fn no_union_without_members() {
        let roots = vec![SchemaNode::new("Coding", "").with_kind(Kind::Complex)];
        assert!(any_resource_union(&roots, &SynthConfig::default()).is_none());
    }

    #[test]
    fn discriminant_is_configurable() {
        let config = SynthConfig {
            discriminant: "kind".into(),
            any_resource: "AnyThing".into(),
            ..SynthConfig::default()
        };
        let roots = vec![
            tagged("Patient", Kind::Resource),
            SchemaNode::new("Thing", "")
                .with_kind(Kind::Resource)
                .with_element("kind", SchemaNode::new("kind", "")),
        ];
        let union = any_resource_union(&roots, &config).unwrap();
        assert_eq!(union.name, "AnyThing");
        assert_eq!(union.members, ["Thing"]);
    }
}
