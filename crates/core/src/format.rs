//! Human-readable rendering of persona records for chat replies.

use crate::persona::Persona;

/// Marker for an empty list.
pub const NONE_MARKER: &str = "无";

/// Marker for an unset tool allowlist.
pub const ALL_TOOLS_MARKER: &str = "默认全部";

/// One bullet line per dialog turn, or the none marker.
pub fn format_begin_dialogs(begin_dialogs: &[String]) -> String {
    if begin_dialogs.is_empty() {
        return NONE_MARKER.to_string();
    }
    begin_dialogs
        .iter()
        .map(|d| format!("  - {d}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_tools(tools: Option<&[String]>) -> String {
    match tools {
        None => ALL_TOOLS_MARKER.to_string(),
        Some([]) => NONE_MARKER.to_string(),
        Some(names) => names.join(", "),
    }
}

/// Detail view of a single persona.
pub fn build_persona_detail_text(persona_id: &str, persona: &Persona) -> String {
    let mut text = format!("以下是人格 '{persona_id}' 的详细信息：\n");
    text.push_str(&format!(
        "- 系统提示 (System Prompt):\n---\n{}\n---\n",
        persona.system_prompt
    ));
    text.push_str(&format!(
        "- 开场白 (Begin Dialogs):\n{}\n",
        format_begin_dialogs(&persona.begin_dialogs)
    ));
    text.push_str(&format!(
        "- 工具 (Tools): {}",
        format_tools(persona.tools.as_deref())
    ));
    text
}

/// Numbered listing of personas, starting at 1.
pub fn build_persona_list_text(personas: &[Persona]) -> String {
    let mut text = String::from("📖 数据库中的人格列表：\n");
    for (i, p) in personas.iter().enumerate() {
        text.push_str(&format!("---------- {} ----------\n", i + 1));
        text.push_str(&format!("👤 人格ID: {}\n", p.persona_id));
        text.push_str(&format!("📝 系统提示: {}\n", p.system_prompt));
        text.push_str(&format!("💬 开场白: {}\n", format_begin_dialogs(&p.begin_dialogs)));
        text.push_str(&format!("🛠️ 工具: {}\n", format_tools(p.tools.as_deref())));
    }
    text.push('\n');
    text
}
