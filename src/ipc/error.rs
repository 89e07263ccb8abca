use serde_json::json;

use crate::error::RosterError;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

pub fn roster_err(id: &str, e: &RosterError) -> serde_json::Value {
    match e {
        RosterError::Validation(v) => err(
            id,
            "validation_failed",
            v.to_string(),
            Some(json!({ "reason": v.reason() })),
        ),
        RosterError::NotFound(key) => err(
            id,
            "not_found",
            e.to_string(),
            Some(json!({ "key": key })),
        ),
        RosterError::EmptyRoster => err(id, "empty_roster", e.to_string(), None),
        RosterError::Storage(inner) => err(id, "io_failed", format!("{inner:#}"), None),
    }
}
