//! Recursive argument tree merge.

use crate::types::{Arguments, Value};

/// Deep-merge `overlay` on top of `base`.
///
/// At every level:
/// - scalar vs scalar: the overlay value wins
/// - map vs map: merged recursively
/// - scalar vs map (either side): the map wins
///
/// Keys only present in `overlay` are appended after the keys of `base`.
pub fn merge_recursive(mut base: Arguments, overlay: Arguments) -> Arguments {
    for (key, value) in overlay {
        match base.get_mut(&key) {
            Some(existing) => merge_value(existing, value),
            None => {
                base.insert(key, value);
            }
        }
    }
    base
}

fn merge_value(existing: &mut Value, incoming: Value) {
    match (existing, incoming) {
        (Value::Map(left), Value::Map(right)) => {
            let left_tree = std::mem::take(left);
            *left = merge_recursive(left_tree, right);
        }
        (Value::Map(_), Value::Scalar(_)) => {}
        (slot, incoming) => *slot = incoming,
    }
}
