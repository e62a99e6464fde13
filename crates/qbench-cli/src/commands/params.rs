use serde_json::{Map, Value};

pub fn run(input_path: &str) {
    let raw: Map<String, Value> = super::read_json(input_path).unwrap_or_else(|e| super::fail(e));
    let typed = qbench_core::type_parameters(&raw);

    let untyped: Vec<&str> = typed
        .iter()
        .filter(|(_, v)| v.is_none())
        .map(|(k, _)| k)
        .collect();
    if !untyped.is_empty() {
        log::warn!("could not type: {}", untyped.join(", "));
    }

    match serde_json::to_value(&typed) {
        Ok(json) => super::emit(&json, None),
        Err(e) => super::fail(e),
    }
}
