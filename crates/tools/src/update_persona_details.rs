//! `update_persona_details` — partially overwrite a persona record.
//!
//! Only the fields present in the arguments are written. Arguments are
//! validated before the store is touched; `begin_dialogs` must hold an even
//! number of strings (alternating user/assistant turns).

use std::sync::Arc;

use async_trait::async_trait;
use personasmith_core::error::ToolError;
use personasmith_core::persona::{PersonaStore, PersonaUpdate};
use personasmith_core::tool::{Tool, ToolResult};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::payload;

pub struct UpdatePersonaDetailsTool {
    store: Arc<dyn PersonaStore>,
}

impl UpdatePersonaDetailsTool {
    pub fn new(store: Arc<dyn PersonaStore>) -> Self {
        Self { store }
    }
}

/// Decode tool arguments into a persona ID and a partial update.
fn parse_arguments(arguments: &Value) -> Result<(String, PersonaUpdate), String> {
    let Some(args) = arguments.as_object() else {
        return Err("arguments must be a JSON object".into());
    };

    let persona_id = match args.get("persona_id").and_then(Value::as_str).map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => return Err("persona_id is required and must be a non-empty string".into()),
    };

    let system_prompt = match args.get("system_prompt") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return Err("system_prompt must be a string".into()),
    };

    let begin_dialogs = match args.get("begin_dialogs") {
        None | Some(Value::Null) => None,
        Some(value) => {
            let dialogs = string_list(value).ok_or("begin_dialogs must be a list of strings")?;
            if dialogs.len() % 2 != 0 {
                return Err(
                    "begin_dialogs must contain an even number of entries, alternating user/assistant"
                        .into(),
                );
            }
            Some(dialogs)
        }
    };

    // Explicit null resets the allowlist to "all tools".
    let tools = match args.get("tools") {
        None => None,
        Some(Value::Null) => Some(None),
        Some(value) => Some(Some(
            string_list(value).ok_or("tools must be a list of strings or null")?,
        )),
    };

    Ok((
        persona_id,
        PersonaUpdate {
            system_prompt,
            begin_dialogs,
            tools,
        },
    ))
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

#[async_trait]
impl Tool for UpdatePersonaDetailsTool {
    fn name(&self) -> &str {
        "update_persona_details"
    }

    fn description(&self) -> &str {
        "更新指定ID的人格信息。只有提供的参数才会被更新。"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "persona_id": {
                    "type": "string",
                    "description": "要更新的人格的ID。"
                },
                "system_prompt": {
                    "type": "string",
                    "description": "新的系统提示。"
                },
                "begin_dialogs": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "新的开场白列表。必须为偶数条，按用户、助手轮流排列。"
                },
                "tools": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "新的工具列表。null表示默认全部，空列表表示无。"
                }
            },
            "required": ["persona_id"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let (persona_id, update) = match parse_arguments(&arguments) {
            Ok(parsed) => parsed,
            Err(message) => {
                warn!(error = %message, "update_persona_details: rejected arguments");
                let persona_id = arguments["persona_id"].as_str();
                return Ok(ToolResult::failed(payload::error(message, persona_id)));
            }
        };

        info!(
            persona_id = %persona_id,
            system_prompt = update.system_prompt.is_some(),
            begin_dialogs = update.begin_dialogs.is_some(),
            tools = update.tools.is_some(),
            "update_persona_details: updating persona"
        );

        let updated = match self.store.update(&persona_id, update).await {
            Ok(updated) => updated,
            Err(e) => {
                error!(persona_id = %persona_id, error = %e, "update_persona_details: update failed");
                return Ok(ToolResult::failed(payload::error(
                    format!("update failed: {e}"),
                    Some(&persona_id),
                )));
            }
        };

        let persona = match updated {
            Some(persona) => persona,
            None => match self.store.get(&persona_id).await {
                Ok(Some(persona)) => persona,
                Ok(None) => {
                    error!(persona_id = %persona_id, "update_persona_details: updated persona is gone");
                    return Ok(ToolResult::failed(payload::error(
                        "update succeeded but the updated persona could not be read back",
                        Some(&persona_id),
                    )));
                }
                Err(e) => {
                    error!(persona_id = %persona_id, error = %e, "update_persona_details: read-back failed");
                    return Ok(ToolResult::failed(payload::error(
                        format!("update succeeded but reading back the persona failed: {e}"),
                        Some(&persona_id),
                    )));
                }
            },
        };

        info!(persona_id = %persona_id, "update_persona_details: persona updated");
        Ok(ToolResult::ok(payload::persona_ok(&persona)))
    }
}
