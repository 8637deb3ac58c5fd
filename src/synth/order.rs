use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::decl::Declaration;
use crate::schema::SchemaNode;

/// Elements whose name is also a type code used in the same declaration go
/// last, so the field name cannot shadow the type it is referenced as.
/// Stable: relative order inside each group is kept.
pub fn order_fields(elements: &IndexMap<String, SchemaNode>) -> Vec<(&String, &SchemaNode)> {
    let referenced: BTreeSet<&str> = elements
        .values()
        .flat_map(|e| e.types.iter().map(|t| t.code.as_str()))
        .collect();

    let mut ordered: Vec<(&String, &SchemaNode)> = elements.iter().collect();
    ordered.sort_by_key(|(name, _)| referenced.contains(name.as_str()));
    ordered
}

/// Link steps run after everything they might resolve is declared.
pub fn defer_links(decls: Vec<Declaration>) -> Vec<Declaration> {
    let (links, mut rest): (Vec<_>, Vec<_>) = decls.into_iter().partition(Declaration::is_link);
    rest.extend(links);
    rest
}
