use personasmith_core::error::ReplyError;

/// Command failures. The display text is what the user sees.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("参数不足，请提供人格ID和更新要求。")]
    MissingArguments,

    #[error("人格ID 不能为空，请重新输入。")]
    EmptyPersonaId,

    #[error("更新要求不能为空，请提供具体说明。")]
    EmptyRequirement,

    #[error("请提供人格ID。")]
    MissingDetailId,

    #[error("获取服务提供商失败: 无法获取有效的服务提供商。请检查是否有启用的 Provider。")]
    ProviderUnavailable,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error(transparent)]
    Reply(#[from] ReplyError),
}

impl CommandError {
    /// Whether this error is answered with a plain reply instead of being
    /// propagated to the front end.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, Self::UnknownCommand(_) | Self::Reply(_))
    }
}
