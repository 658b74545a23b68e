//! The structural tree of an edition.
//!
//! Editions do not share a schema: some are a flat list of chapters, others nest a body
//! of chapters next to a preface and an appendix. All of them are a [`Tree`] whose nodes
//! either hold data directly (a leaf) or hold named children (a composite). The raw
//! edition is a `Tree<Vec<String>>` of lines; the aggregator builds trees of cleaned
//! lines and of frequency tables with the same shape.

use serde::{ser::SerializeMap, Serialize, Serializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructureError {
    #[error("composite component `{0}` has no children")]
    EmptyComposite(String),
    #[error("leaf component `{path}` has a non-text entry at position {index}")]
    NonTextLine { path: String, index: usize },
    #[error("component `{0}` is neither a list of lines nor a keyed collection")]
    UnexpectedNode(String),
    #[error("component `{path}` has a child named `{name}`; names must be non-empty and must not contain `/`")]
    InvalidName { path: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tree<L> {
    Leaf(L),
    /// Children in document order. Names are non-empty and free of `/`, so that every
    /// node has its own slash-joined path; [`Component::from_value`] rejects anything else.
    Composite(Vec<(String, Tree<L>)>),
}

/// A raw component: lines of text at the leaves.
pub type Component = Tree<Vec<String>>;

pub fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.to_string()
    }
}

impl<L> Tree<L> {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Tree::Leaf(_))
    }

    pub fn children(&self) -> &[(String, Tree<L>)] {
        match self {
            Tree::Leaf(_) => &[],
            Tree::Composite(children) => children,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Tree<L>> {
        self.children()
            .iter()
            .find(|(child_name, _)| child_name == name)
            .map(|(_, child)| child)
    }

    /// Look up a node by slash-separated path. The empty path is `self`.
    pub fn find(&self, path: &str) -> Option<&Tree<L>> {
        if path.is_empty() {
            return Some(self);
        }
        path.split('/').try_fold(self, |node, name| node.get(name))
    }

    pub fn leaf(&self) -> Option<&L> {
        match self {
            Tree::Leaf(data) => Some(data),
            Tree::Composite(_) => None,
        }
    }

    /// Visit every leaf in document order together with its path.
    pub fn for_each_leaf<'a>(&'a self, mut f: impl FnMut(&str, &'a L)) {
        fn walk<'a, L>(node: &'a Tree<L>, path: &str, f: &mut impl FnMut(&str, &'a L)) {
            match node {
                Tree::Leaf(data) => f(path, data),
                Tree::Composite(children) => {
                    for (name, child) in children {
                        walk(child, &join_path(path, name), f);
                    }
                }
            }
        }
        walk(self, "", &mut f);
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            Tree::Leaf(_) => 1,
            Tree::Composite(children) => children.iter().map(|(_, c)| c.leaf_count()).sum(),
        }
    }
}

impl Component {
    /// Build a component tree from its document form.
    ///
    /// A JSON array is a leaf and must contain only strings; a JSON object is a composite
    /// and must have at least one child, each with a non-empty name without `/`. `path`
    /// names the node in error messages.
    pub fn from_value(path: &str, value: &Value) -> Result<Self, StructureError> {
        match value {
            Value::Array(lines) => {
                let mut result = Vec::with_capacity(lines.len());
                for (index, line) in lines.iter().enumerate() {
                    match line {
                        Value::String(line) => result.push(line.clone()),
                        _ => {
                            return Err(StructureError::NonTextLine {
                                path: display_path(path),
                                index,
                            })
                        }
                    }
                }
                Ok(Tree::Leaf(result))
            }
            Value::Object(children) => {
                if children.is_empty() {
                    return Err(StructureError::EmptyComposite(display_path(path)));
                }
                let children = children
                    .iter()
                    .map(|(name, child)| {
                        if name.is_empty() || name.contains('/') {
                            return Err(StructureError::InvalidName {
                                path: display_path(path),
                                name: name.clone(),
                            });
                        }
                        Ok((name.clone(), Self::from_value(&join_path(path, name), child)?))
                    })
                    .collect::<Result<Vec<_>, StructureError>>()?;
                Ok(Tree::Composite(children))
            }
            _ => Err(StructureError::UnexpectedNode(display_path(path))),
        }
    }

    pub fn line_count(&self) -> usize {
        let mut count = 0;
        self.for_each_leaf(|_, lines| count += lines.len());
        count
    }
}

impl<L: Serialize> Serialize for Tree<L> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Tree::Leaf(data) => data.serialize(serializer),
            Tree::Composite(children) => {
                let mut map = serializer.serialize_map(Some(children.len()))?;
                for (name, child) in children {
                    map.serialize_entry(name, child)?;
                }
                map.end()
            }
        }
    }
}
