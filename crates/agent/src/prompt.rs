//! Prompt text for persona update runs.

/// First user prompt of every run.
pub const INITIAL_PROMPT: &str = "开始执行。";

/// Build the fixed system prompt for updating `persona_id` according to `requirement`.
///
/// The model is told to call `get_persona_detail` first, apply a single
/// `update_persona_details`, and put `sentinel` in front of its final summary.
pub fn build_update_system_prompt(persona_id: &str, requirement: &str, sentinel: &str) -> String {
    format!(
        "你是人格配置专家，负责根据用户要求更新 AI 人格设定。
可用工具：
- get_persona_detail(persona_id): 获取人格当前设定 - 必须先调用
- update_persona_details(persona_id, system_prompt?, begin_dialogs?, tools?): 更新人格设定，begin_dialogs为偶数个字符串，每个字符串代表一个对话，用户和助手轮流对话

任务：更新人格 '{persona_id}'，要求：{requirement}

重要：你必须严格按以下步骤执行：
1. 调用 get_persona_detail 获取当前人格信息
2. 根据要求分析需要修改的内容
3. 调用 update_persona_details 应用修改
4. 先输出标记 {sentinel}，然后在标记之后简洁总结修改内容

请严格按照上述流程执行。特别注意：
- begin_dialogs 必须包含偶数条对话，且需按照“用户、助手”轮流排列。
- 只有在完成分析并确定改动后，才调用一次 update_persona_details 应用修改。
- 标记 {sentinel} 之前的内容不会展示给用户，总结必须写在标记之后。

请立即开始执行，先调用 get_persona_detail 工具。"
    )
}
