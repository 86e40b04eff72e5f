use serde_json::{json, Value};

/// JSON Schema for a cocktail create/replace payload.
///
/// Only presence and primitive types are checked; a rating of `-3` is as
/// valid as `5`.
pub fn cocktail_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "cocktailname": {"type": "string"},
            "description": {"type": "string"},
            "location": {"type": "string"},
            "rating": {"type": "integer"}
        },
        "required": ["cocktailname", "description", "location", "rating"]
    })
}
