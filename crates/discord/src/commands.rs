use serde::Serialize;

/// A legacy text command: first token after the prefix, case-folded, plus
/// whatever positional arguments followed it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrefixedCommand {
    pub name: String,
    pub args: Vec<String>,
}

/// Recognize a prefixed text command in raw message content.
///
/// Returns `None` for anything that is not a command: content without the
/// prefix, or the bare prefix with nothing after it. The command token is
/// matched case-insensitively downstream, so it is folded here; arguments
/// keep their original casing.
pub fn parse_prefixed(content: &str, prefix: &str) -> Option<PrefixedCommand> {
    let rest = content.strip_prefix(prefix)?;
    let mut tokens = rest.split_whitespace();
    let name = tokens.next()?.to_ascii_lowercase();
    let args = tokens.map(str::to_owned).collect();

    Some(PrefixedCommand { name, args })
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    pub name: String,
    pub description: String,
    pub options: Vec<OptionSpec>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OptionSpec {
    pub name: String,
    pub description: String,
    pub kind: OptionKind,
    pub required: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    Text,
}

/// The native command set registered against the platform's global command
/// registry once at startup.
pub fn command_catalog() -> Vec<CommandSpec> {
    vec![
        CommandSpec {
            name: "ping".to_string(),
            description: "Check bot latency".to_string(),
            options: vec![],
        },
        CommandSpec {
            name: "echo".to_string(),
            description: "Echoes your message".to_string(),
            options: vec![OptionSpec {
                name: "text".to_string(),
                description: "The text to echo".to_string(),
                kind: OptionKind::Text,
                required: true,
            }],
        },
        CommandSpec {
            name: "menu".to_string(),
            description: "Show the interactive menu with buttons".to_string(),
            options: vec![],
        },
        CommandSpec {
            name: "helpview".to_string(),
            description: "Show interactive help buttons".to_string(),
            options: vec![],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::{command_catalog, parse_prefixed, PrefixedCommand};

    #[test]
    fn parses_name_and_positional_args() {
        let command = parse_prefixed("!echo hello there", "!").expect("command");
        assert_eq!(
            command,
            PrefixedCommand {
                name: "echo".to_string(),
                args: vec!["hello".to_string(), "there".to_string()],
            }
        );
    }

    #[test]
    fn folds_the_command_token_but_not_arguments() {
        let command = parse_prefixed("!ECHO Hello There", "!").expect("command");
        assert_eq!(command.name, "echo");
        assert_eq!(command.args, vec!["Hello".to_string(), "There".to_string()]);
    }

    #[test]
    fn collapses_repeated_whitespace_between_tokens() {
        let command = parse_prefixed("!echo   spaced\t out", "!").expect("command");
        assert_eq!(command.args, vec!["spaced".to_string(), "out".to_string()]);
    }

    #[test]
    fn ignores_content_without_the_prefix() {
        assert_eq!(parse_prefixed("ping", "!"), None);
        assert_eq!(parse_prefixed(" !ping", "!"), None);
    }

    #[test]
    fn ignores_the_bare_prefix() {
        assert_eq!(parse_prefixed("!", "!"), None);
        assert_eq!(parse_prefixed("!   ", "!"), None);
    }

    #[test]
    fn respects_a_configured_multi_char_prefix() {
        let command = parse_prefixed("bot! ping", "bot!").expect("command");
        assert_eq!(command.name, "ping");
    }

    #[test]
    fn catalog_registers_the_four_native_commands() {
        let catalog = command_catalog();
        let names: Vec<&str> = catalog.iter().map(|spec| spec.name.as_str()).collect();
        assert_eq!(names, vec!["ping", "echo", "menu", "helpview"]);

        let echo = &catalog[1];
        assert_eq!(echo.options.len(), 1);
        assert_eq!(echo.options[0].name, "text");
        assert!(echo.options[0].required);
    }
}
