#![forbid(unsafe_code)]

//! Built-in block variants.
//!
//! | namespace  | shape                                   | own metrics |
//! |------------|-----------------------------------------|-------------|
//! | `sequence` | `children: [block]`, run in order       | yes         |
//! | `parallel` | `children: [block]`, forked then joined | yes         |
//! | `segment`  | leaf running one `process`              | yes         |
//! | `repeat`   | `child`, `count`                        | no          |
//! | `name`     | `child`, `value`                        | no          |
//! | `state`    | `child`, `state`                        | no          |
//!
//! All built-ins use the variant name `_`.

mod parallel;
mod segment;
mod sequence;
mod wrappers;

use serde_json::Value;

use crate::block::{Block, ShapeError};
use crate::registry::{Registry, RendererEntry};

pub use parallel::arrange as arrange_parallel;
pub use sequence::arrange as arrange_sequence;

/// Variant name shared by the built-ins.
pub const VARIANT: &str = "_";

/// Register every built-in variant into `registry`.
pub fn register(registry: &mut Registry) {
    registry.register("sequence", VARIANT, sequence::entry());
    registry.register("parallel", VARIANT, parallel::entry());
    registry.register("segment", VARIANT, segment::entry());
    registry.register("repeat", VARIANT, wrappers::repeat());
    registry.register("name", VARIANT, wrappers::name());
    registry.register("state", VARIANT, wrappers::state());
}

/// Children accessor for variants that keep one sub-block under `child`.
fn single_child(block: Block<'_>) -> Result<Vec<Block<'_>>, ShapeError> {
    block.child_attr("child").map(|child| vec![child])
}

/// Children accessor for variants that keep sub-blocks under `children`.
fn child_list(block: Block<'_>) -> Result<Vec<Block<'_>>, ShapeError> {
    block.child_list_attr("children")
}

/// Location accessor for `{ "child": <location> }`.
fn single_child_location<'a>(_block: Block<'a>, location: &'a Value) -> Vec<Option<&'a Value>> {
    vec![location.get("child")]
}

/// Location accessor for `{ "children": [<location> | null, ...] }`.
fn child_list_locations<'a>(_block: Block<'a>, location: &'a Value) -> Vec<Option<&'a Value>> {
    location
        .get("children")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(Some).collect())
        .unwrap_or_default()
}

/// Compact display of a JSON scalar.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "none".to_string(),
        other => other.to_string(),
    }
}

fn base_entry() -> RendererEntry {
    RendererEntry::default()
}
