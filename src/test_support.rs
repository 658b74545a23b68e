//! Builders and proptest strategies shared by the unit and integration tests.

use proptest::prelude::*;
use serde_json::{json, Value};

use crate::{
    component::{Component, Tree},
    frequency::FrequencyTable,
};

pub mod prelude {
    pub(crate) use super::{
        arb_component, arb_table, composite, edition_document, leaf, table,
    };
    pub(crate) use proptest::prelude::*;
}

pub fn leaf(lines: &[&str]) -> Component {
    Tree::Leaf(lines.iter().map(|line| line.to_string()).collect())
}

pub fn composite(children: Vec<(&str, Component)>) -> Component {
    Tree::Composite(
        children
            .into_iter()
            .map(|(name, child)| (name.to_string(), child))
            .collect(),
    )
}

pub fn table(entries: &[(&str, u64)]) -> FrequencyTable {
    let mut table = FrequencyTable::new();
    for (token, count) in entries {
        table.add_count(token, *count);
    }
    table
}

/// A raw edition document in the shape the pipeline reads.
pub fn edition_document(components: Value) -> Value {
    json!({
        "title": "Adventures of Huckleberry Finn",
        "source": "test",
        "components": components,
    })
}

pub fn arb_table() -> impl Strategy<Value = FrequencyTable> {
    prop::collection::hash_map("[a-f]{1,2}", 1u64..20, 0..12).prop_map(|entries| {
        let mut table = FrequencyTable::new();
        for (token, count) in entries {
            table.add_count(&token, count);
        }
        table
    })
}

fn arb_line() -> impl Strategy<Value = String> {
    "(the|boat|river|raft|huck|jim|, |\\. |!| |'|-){0,12}"
}

/// Component trees mixing flat leaves and nested composites, never with empty composites.
pub fn arb_component() -> impl Strategy<Value = Component> {
    let leaf = prop::collection::vec(arb_line(), 0..4).prop_map(Tree::Leaf);
    let tree = leaf.prop_recursive(3, 24, 4, |inner| {
        prop::collection::vec(inner, 1..4).prop_map(|children| {
            Tree::Composite(
                children
                    .into_iter()
                    .enumerate()
                    .map(|(i, child)| (format!("unit_{i}"), child))
                    .collect(),
            )
        })
    });
    // the edition root is always a composite
    prop::collection::vec(tree, 1..4).prop_map(|children| {
        Tree::Composite(
            children
                .into_iter()
                .enumerate()
                .map(|(i, child)| (format!("component_{i}"), child))
                .collect(),
        )
    })
}
