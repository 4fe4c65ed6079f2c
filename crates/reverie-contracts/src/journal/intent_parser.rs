use std::collections::BTreeMap;

use serde_json::Value;

use super::command_registry::{
    CommandSpec, ANALYZE_MARKER, EXPORT_COMMAND, MERGE_COMMAND, NO_ARG_COMMANDS, PANELS_COMMAND,
};
use crate::analysis::parse_flag;

#[derive(Debug, Clone, PartialEq)]
pub struct JournalIntent {
    pub action: String,
    pub raw: String,
    /// Narrative text for `append`.
    pub text: Option<String>,
    pub settings_update: BTreeMap<String, Value>,
    pub command_args: BTreeMap<String, Value>,
}

impl JournalIntent {
    fn new(action: &str, raw: &str) -> Self {
        Self {
            action: action.to_string(),
            raw: raw.to_string(),
            text: None,
            settings_update: BTreeMap::new(),
            command_args: BTreeMap::new(),
        }
    }

    fn invalid(raw: &str, command: &str, reason: String) -> Self {
        let mut intent = Self::new("invalid", raw);
        intent
            .command_args
            .insert("command".to_string(), Value::String(command.to_string()));
        intent
            .command_args
            .insert("reason".to_string(), Value::String(reason));
        intent
    }
}

fn find_action(command: &str, specs: &[CommandSpec]) -> Option<&'static str> {
    specs
        .iter()
        .find(|spec| spec.command == command)
        .map(|spec| spec.action)
}

fn parse_path_arg(arg: &str) -> String {
    if arg.trim().is_empty() {
        return String::new();
    }
    match shell_words::split(arg) {
        Ok(parts) => parts
            .into_iter()
            .filter(|value| !value.is_empty())
            .collect::<Vec<String>>()
            .join(" "),
        Err(_) => arg.trim().to_string(),
    }
}

pub fn parse_intent(line: &str) -> JournalIntent {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return JournalIntent::new("noop", line);
    }
    if trimmed == ANALYZE_MARKER {
        return JournalIntent::new("analyze", line);
    }

    if let Some(slash_tail) = trimmed.strip_prefix('/') {
        let command_len = slash_tail
            .chars()
            .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
            .count();
        if command_len > 0 {
            let command = slash_tail[..command_len].to_ascii_lowercase();
            let arg = slash_tail[command_len..].trim();

            if let Some(action) = find_action(&command, NO_ARG_COMMANDS) {
                return JournalIntent::new(action, line);
            }

            if command == PANELS_COMMAND.command {
                return match arg.parse::<u64>() {
                    Ok(value) if value > 0 => {
                        let mut intent = JournalIntent::new(PANELS_COMMAND.action, line);
                        intent
                            .settings_update
                            .insert("max_panels".to_string(), Value::Number(value.into()));
                        intent
                    }
                    _ => JournalIntent::invalid(
                        line,
                        &command,
                        format!("expected a panel count of at least 1, got '{arg}'"),
                    ),
                };
            }

            if command == MERGE_COMMAND.command {
                return match parse_flag(arg) {
                    Some(value) => {
                        let mut intent = JournalIntent::new(MERGE_COMMAND.action, line);
                        intent
                            .settings_update
                            .insert("merge_short".to_string(), Value::Bool(value));
                        intent
                    }
                    None => JournalIntent::invalid(
                        line,
                        &command,
                        format!("expected on or off, got '{arg}'"),
                    ),
                };
            }

            if command == EXPORT_COMMAND.command {
                let mut intent = JournalIntent::new(EXPORT_COMMAND.action, line);
                intent
                    .command_args
                    .insert("path".to_string(), Value::String(parse_path_arg(arg)));
                return intent;
            }

            let mut intent = JournalIntent::new("unknown", line);
            intent
                .command_args
                .insert("command".to_string(), Value::String(command));
            intent
                .command_args
                .insert("arg".to_string(), Value::String(arg.to_string()));
            return intent;
        }
    }

    let mut intent = JournalIntent::new("append", line);
    intent.text = Some(trimmed.to_string());
    intent
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::parse_intent;

    #[test]
    fn blank_line_is_noop() {
        assert_eq!(parse_intent("   ").action, "noop");
    }

    #[test]
    fn plain_text_appends_to_dream() {
        let intent = parse_intent("  I was flying over a crystal city.  ");
        assert_eq!(intent.action, "append");
        assert_eq!(
            intent.text.as_deref(),
            Some("I was flying over a crystal city.")
        );
    }

    #[test]
    fn dot_line_and_analyze_command_analyze() {
        assert_eq!(parse_intent(".").action, "analyze");
        assert_eq!(parse_intent("/analyze").action, "analyze");
        assert_eq!(parse_intent("/ANALYZE").action, "analyze");
    }

    #[test]
    fn no_arg_commands() {
        for (line, action) in [
            ("/help", "help"),
            ("/show", "show"),
            ("/prompts", "prompts"),
            ("/render", "render"),
            ("/reset", "reset"),
        ] {
            assert_eq!(parse_intent(line).action, action);
        }
    }

    #[test]
    fn panels_command_sets_max_panels() {
        let intent = parse_intent("/panels 4");
        assert_eq!(intent.action, "set_panels");
        assert_eq!(intent.settings_update["max_panels"], json!(4));
    }

    #[test]
    fn panels_command_rejects_zero_and_garbage() {
        for line in ["/panels 0", "/panels lots", "/panels"] {
            let intent = parse_intent(line);
            assert_eq!(intent.action, "invalid", "{line}");
            assert_eq!(intent.command_args["command"], json!("panels"));
        }
    }

    #[test]
    fn merge_command_parses_flag() {
        assert_eq!(
            parse_intent("/merge off").settings_update["merge_short"],
            json!(false)
        );
        assert_eq!(
            parse_intent("/merge ON").settings_update["merge_short"],
            json!(true)
        );
        assert_eq!(parse_intent("/merge sometimes").action, "invalid");
    }

    #[test]
    fn export_accepts_quoted_paths() {
        let intent = parse_intent("/export \"/tmp/my dream.json\"");
        assert_eq!(intent.action, "export");
        assert_eq!(intent.command_args["path"], json!("/tmp/my dream.json"));

        let bare = parse_intent("/export");
        assert_eq!(bare.command_args["path"], json!(""));
    }

    #[test]
    fn unknown_command_keeps_arg() {
        let intent = parse_intent("/levitate slowly now");
        assert_eq!(intent.action, "unknown");
        assert_eq!(intent.command_args["command"], json!("levitate"));
        assert_eq!(intent.command_args["arg"], json!("slowly now"));
    }

    #[test]
    fn lone_slash_is_text() {
        assert_eq!(parse_intent("/ / /").action, "append");
    }
}
