//! Deep merge of config layers.

use serde_json::Value;

/// Lay `top` over `base`. Objects merge key by key; any other value, arrays
/// included, replaces what was underneath.
pub(super) fn overlay(base: &mut Value, top: Value) {
    let Value::Object(top_map) = top else {
        *base = top;
        return;
    };
    let Value::Object(base_map) = base else {
        *base = Value::Object(top_map);
        return;
    };
    for (key, value) in top_map {
        match base_map.get_mut(&key) {
            Some(slot) => overlay(slot, value),
            None => {
                base_map.insert(key, value);
            }
        }
    }
}
