//! JSON payloads returned by the persona tools.

use personasmith_core::persona::Persona;
use serde_json::json;

/// Success payload carrying the persona's fields.
pub fn persona_ok(persona: &Persona) -> String {
    json!({
        "ok": true,
        "persona": {
            "persona_id": persona.persona_id,
            "system_prompt": persona.system_prompt,
            "begin_dialogs": persona.begin_dialogs,
            "tools": persona.tools,
        }
    })
    .to_string()
}

/// Failure payload, optionally naming the persona it concerns.
pub fn error(message: impl AsRef<str>, persona_id: Option<&str>) -> String {
    let mut payload = json!({
        "ok": false,
        "error": message.as_ref(),
    });
    if let Some(id) = persona_id {
        payload["persona_id"] = json!(id);
    }
    payload.to_string()
}
