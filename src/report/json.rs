//! JSON output for scripting and piping.

use serde::Serialize;

pub fn render<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        log::error!("could not serialize output: {e}");
        String::from("{}")
    })
}
