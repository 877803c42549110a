//! Command text parsing.

use crate::error::CommandError;

/// A recognised chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Detail { persona_id: Option<String> },
    List,
    Update { persona_id: String, requirement: String },
}

const DETAIL_NAMES: [&str; 2] = ["人格详情", "persona_detail"];
const LIST_NAMES: [&str; 2] = ["人格列表", "persona_list"];
const UPDATE_NAMES: [&str; 2] = ["人格更新", "persona_update"];

/// Parse a raw chat line into a [`Command`].
///
/// Returns [`CommandError::UnknownCommand`] when the first word is not one of
/// the persona commands, and the update validation errors for malformed
/// `人格更新` lines.
pub fn parse_command(text: &str) -> Result<Command, CommandError> {
    let parts = split_args(text, 2);
    let Some(&name) = parts.first() else {
        return Err(CommandError::UnknownCommand(String::new()));
    };
    let name = name.strip_prefix('/').unwrap_or(name);

    if DETAIL_NAMES.contains(&name) {
        let persona_id = parts
            .get(1)
            .map(|rest| rest.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        Ok(Command::Detail { persona_id })
    } else if LIST_NAMES.contains(&name) {
        Ok(Command::List)
    } else if UPDATE_NAMES.contains(&name) {
        let (persona_id, requirement) = parse_update_command(text)?;
        Ok(Command::Update {
            persona_id,
            requirement,
        })
    } else {
        Err(CommandError::UnknownCommand(name.to_string()))
    }
}

/// Split an update line into `(persona_id, requirement)`.
///
/// The line is split on whitespace into at most three parts: the command
/// word, the persona ID, and the rest of the line as the requirement.
pub fn parse_update_command(text: &str) -> Result<(String, String), CommandError> {
    let parts = split_args(text, 3);
    let [_, persona_id, requirement] = parts.as_slice() else {
        return Err(CommandError::MissingArguments);
    };

    let persona_id = persona_id.trim();
    let requirement = requirement.trim();

    if persona_id.is_empty() {
        return Err(CommandError::EmptyPersonaId);
    }
    if requirement.is_empty() {
        return Err(CommandError::EmptyRequirement);
    }

    Ok((persona_id.to_string(), requirement.to_string()))
}

/// Split on runs of whitespace into at most `max` parts; the last part keeps
/// the remainder of the line.
fn split_args(text: &str, max: usize) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = text.trim();

    while !rest.is_empty() {
        if parts.len() + 1 == max {
            parts.push(rest);
            break;
        }
        match rest.find(char::is_whitespace) {
            Some(end) => {
                parts.push(&rest[..end]);
                rest = rest[end..].trim_start();
            }
            None => {
                parts.push(rest);
                break;
            }
        }
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_keeps_rest_of_line_as_requirement() {
        let (id, requirement) = parse_update_command("人格更新 Bert make him  sound more formal").unwrap();
        assert_eq!(id, "Bert");
        assert_eq!(requirement, "make him  sound more formal");
    }

    #[test]
    fn update_with_too_few_tokens() {
        for text in ["", "人格更新", "人格更新 Bert", "  人格更新   Bert   "] {
            assert!(
                matches!(parse_update_command(text), Err(CommandError::MissingArguments)),
                "{text:?}"
            );
        }
    }

    #[test]
    fn update_error_messages() {
        assert_eq!(
            CommandError::MissingArguments.to_string(),
            "参数不足，请提供人格ID和更新要求。"
        );
        assert_eq!(CommandError::EmptyPersonaId.to_string(), "人格ID 不能为空，请重新输入。");
        assert_eq!(
            CommandError::EmptyRequirement.to_string(),
            "更新要求不能为空，请提供具体说明。"
        );
    }

    #[test]
    fn recognises_commands_and_aliases() {
        assert_eq!(parse_command("人格列表").unwrap(), Command::List);
        assert_eq!(parse_command("/persona_list").unwrap(), Command::List);
        assert_eq!(
            parse_command("/人格详情 Bert").unwrap(),
            Command::Detail {
                persona_id: Some("Bert".into())
            }
        );
        assert_eq!(
            parse_command("persona_detail").unwrap(),
            Command::Detail { persona_id: None }
        );
        assert_eq!(
            parse_command("persona_update Bert be nicer").unwrap(),
            Command::Update {
                persona_id: "Bert".into(),
                requirement: "be nicer".into()
            }
        );
    }

    #[test]
    fn update_validation_surfaces_through_parse_command() {
        assert!(matches!(
            parse_command("/人格更新 Bert"),
            Err(CommandError::MissingArguments)
        ));
    }

    #[test]
    fn unknown_command() {
        let err = parse_command("/help me").unwrap_err();
        assert!(matches!(err, CommandError::UnknownCommand(ref name) if name == "help"));
        assert!(!err.is_user_facing());
        assert!(matches!(parse_command("   "), Err(CommandError::UnknownCommand(_))));
    }

    #[test]
    fn split_collapses_whitespace() {
        assert_eq!(split_args(" a \t b  c d ", 3), vec!["a", "b", "c d"]);
        assert_eq!(split_args("a", 3), vec!["a"]);
        assert!(split_args("   ", 3).is_empty());
    }
}
