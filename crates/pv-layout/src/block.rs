#![forbid(unsafe_code)]

//! Zero-copy view over protocol blocks.
//!
//! A protocol document is a JSON tree. Every block is an object carrying
//! string `namespace` and `name` fields plus a variant-specific payload.
//! Nothing here knows which payload fields hold children: child discovery
//! belongs to each variant's [`RendererEntry`](crate::registry::RendererEntry).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Variant tag of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeTag<'a> {
    pub namespace: &'a str,
    pub name: &'a str,
}

impl fmt::Display for TypeTag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

/// Structural problem found while reading a block payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeError(pub String);

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ShapeError {}

/// Borrowed view of one block inside a protocol document.
#[derive(Debug, Clone, Copy)]
pub struct Block<'a> {
    tag: TypeTag<'a>,
    payload: &'a Map<String, Value>,
}

impl<'a> Block<'a> {
    /// View `value` as a block.
    pub fn from_value(value: &'a Value) -> Result<Self, ShapeError> {
        let payload = value
            .as_object()
            .ok_or_else(|| ShapeError(format!("expected block object, found {}", kind(value))))?;
        let field = |key: &str| {
            payload
                .get(key)
                .and_then(Value::as_str)
                .ok_or_else(|| ShapeError(format!("block is missing string field `{key}`")))
        };
        Ok(Self {
            tag: TypeTag {
                namespace: field("namespace")?,
                name: field("name")?,
            },
            payload,
        })
    }

    #[inline]
    pub fn tag(&self) -> TypeTag<'a> {
        self.tag
    }

    /// Raw payload field.
    #[inline]
    pub fn attr(&self, key: &str) -> Option<&'a Value> {
        self.payload.get(key)
    }

    /// String payload field.
    pub fn str_attr(&self, key: &str) -> Option<&'a str> {
        self.attr(key).and_then(Value::as_str)
    }

    /// Required sub-block stored under `key`.
    pub fn child_attr(&self, key: &str) -> Result<Block<'a>, ShapeError> {
        let value = self
            .attr(key)
            .ok_or_else(|| ShapeError(format!("{} is missing child `{key}`", self.tag)))?;
        Block::from_value(value).map_err(|err| ShapeError(format!("{}.{key}: {err}", self.tag)))
    }

    /// Sub-blocks stored as an array under `key`. A missing key reads as empty.
    pub fn child_list_attr(&self, key: &str) -> Result<Vec<Block<'a>>, ShapeError> {
        match self.attr(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(idx, item)| {
                    Block::from_value(item)
                        .map_err(|err| ShapeError(format!("{}.{key}[{idx}]: {err}", self.tag)))
                })
                .collect(),
            Some(other) => Err(ShapeError(format!(
                "{}.{key}: expected array, found {}",
                self.tag,
                kind(other)
            ))),
        }
    }

    /// Identity check: both views point at the same JSON object.
    #[inline]
    pub fn same_as(&self, other: &Block<'_>) -> bool {
        std::ptr::eq(self.payload, other.payload)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Child-key sequence identifying a block from the root.
///
/// Ordering is lexicographic over keys, which also serves as the stable
/// tie-break for navigation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockPath(Vec<usize>);

impl BlockPath {
    /// The root path (no keys).
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Path of child `key` below this one.
    #[must_use]
    pub fn child(&self, key: usize) -> Self {
        let mut keys = Vec::with_capacity(self.0.len() + 1);
        keys.extend_from_slice(&self.0);
        keys.push(key);
        Self(keys)
    }

    #[inline]
    pub fn keys(&self) -> &[usize] {
        &self.0
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// True if `self` equals `other` or lies below it.
    pub fn starts_with(&self, other: &BlockPath) -> bool {
        self.0.starts_with(&other.0)
    }
}

impl From<Vec<usize>> for BlockPath {
    fn from(keys: Vec<usize>) -> Self {
        Self(keys)
    }
}

impl<const N: usize> From<[usize; N]> for BlockPath {
    fn from(keys: [usize; N]) -> Self {
        Self(keys.to_vec())
    }
}

impl fmt::Display for BlockPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for key in &self.0 {
            write!(f, "/{key}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_tag_and_children() {
        let doc = json!({
            "namespace": "sequence", "name": "_",
            "children": [
                { "namespace": "segment", "name": "_", "label": "A" },
                { "namespace": "segment", "name": "_", "label": "B" }
            ]
        });
        let block = Block::from_value(&doc).expect("block");
        assert_eq!(block.tag().to_string(), "sequence._");
        let children = block.child_list_attr("children").expect("children");
        assert_eq!(children.len(), 2);
        assert_eq!(children[1].str_attr("label"), Some("B"));
        assert!(block.child_list_attr("missing").expect("empty").is_empty());
    }

    #[test]
    fn rejects_malformed_blocks() {
        assert!(Block::from_value(&json!(3)).is_err());
        assert!(Block::from_value(&json!({ "namespace": "x" })).is_err());
        let doc = json!({ "namespace": "repeat", "name": "_", "child": 4 });
        let err = Block::from_value(&doc)
            .expect("block")
            .child_attr("child")
            .expect_err("number is not a block");
        assert!(err.to_string().contains("repeat._.child"));
    }

    #[test]
    fn identity_is_by_object() {
        let doc = json!({ "namespace": "a", "name": "b" });
        let twin = doc.clone();
        let a = Block::from_value(&doc).expect("block");
        let b = Block::from_value(&doc).expect("block");
        let c = Block::from_value(&twin).expect("block");
        assert!(a.same_as(&b));
        assert!(!a.same_as(&c));
    }

    #[test]
    fn path_order_and_display() {
        let root = BlockPath::root();
        assert_eq!(root.to_string(), "/");
        let p = root.child(0).child(2);
        assert_eq!(p.to_string(), "/0/2");
        assert!(BlockPath::from([0, 1, 5]) < BlockPath::from([0, 2]));
        assert!(BlockPath::from([0]) < BlockPath::from([0, 0]));
        assert!(p.starts_with(&BlockPath::from([0])));
        assert_eq!(p.depth(), 2);
    }

    #[test]
    fn path_serializes_as_key_array() {
        let path = BlockPath::from([1, 0, 3]);
        assert_eq!(serde_json::to_value(&path).expect("serialize"), json!([1, 0, 3]));
        let back: BlockPath = serde_json::from_value(json!([1, 0, 3])).expect("deserialize");
        assert_eq!(back, path);
        assert!(serde_json::from_value::<BlockPath>(json!("/1/0")).is_err());
    }
}
