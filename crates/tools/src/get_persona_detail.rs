//! `get_persona_detail` — read one persona record.

use std::sync::Arc;

use async_trait::async_trait;
use personasmith_core::error::ToolError;
use personasmith_core::persona::PersonaStore;
use personasmith_core::tool::{Tool, ToolResult};
use tracing::{error, info};

use crate::payload;

pub struct GetPersonaDetailTool {
    store: Arc<dyn PersonaStore>,
}

impl GetPersonaDetailTool {
    pub fn new(store: Arc<dyn PersonaStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for GetPersonaDetailTool {
    fn name(&self) -> &str {
        "get_persona_detail"
    }

    fn description(&self) -> &str {
        "获取指定ID的人格的详细信息。"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "persona_id": {
                    "type": "string",
                    "description": "要查询的人格的ID。"
                }
            },
            "required": ["persona_id"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let Some(persona_id) = arguments["persona_id"].as_str() else {
            return Ok(ToolResult::failed(payload::error(
                "persona_id is required and must be a string",
                None,
            )));
        };

        info!(persona_id, "get_persona_detail: fetching persona");

        match self.store.get(persona_id).await {
            Ok(Some(persona)) => {
                info!(persona_id, "get_persona_detail: persona found");
                Ok(ToolResult::ok(payload::persona_ok(&persona)))
            }
            Ok(None) => {
                error!(persona_id, "get_persona_detail: persona not found");
                Ok(ToolResult::failed(payload::error("persona not found", Some(persona_id))))
            }
            Err(e) => {
                error!(persona_id, error = %e, "get_persona_detail: store lookup failed");
                Ok(ToolResult::failed(payload::error(e.to_string(), Some(persona_id))))
            }
        }
    }
}
