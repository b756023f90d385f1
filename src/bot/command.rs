//! Command parser for the file management chat surface.
//!
//! Input lines are slash-style commands; anything else is rejected with a
//! usage hint rather than treated as chat.

/// A parsed management command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// List files, optionally filtered by a substring.
    Search(Option<String>),
    /// Select a file from the last listing by its number.
    Select(usize),
    /// Rename the selected file to a new base name.
    Rename(String),
    /// Set or clear the selected file's password (empty clears).
    Password(Option<String>),
    /// Set or clear the selected file's visit limit (empty clears).
    Lock(Option<u32>),
    /// Delete the selected file.
    Delete,
    /// Produce a shareable link for the selected file.
    Link,
    /// Show the selected file's status.
    Status,
    /// End the management session.
    Quit,
    /// Show help.
    Help,
    /// Unknown command.
    Unknown(String),
}

impl BotCommand {
    /// Get the command name.
    pub fn name(&self) -> &str {
        match self {
            BotCommand::Search(_) => "search",
            BotCommand::Select(_) => "select",
            BotCommand::Rename(_) => "rename",
            BotCommand::Password(_) => "password",
            BotCommand::Lock(_) => "lock",
            BotCommand::Delete => "delete",
            BotCommand::Link => "link",
            BotCommand::Status => "status",
            BotCommand::Quit => "quit",
            BotCommand::Help => "help",
            BotCommand::Unknown(cmd) => cmd,
        }
    }
}

/// Parse an input line into a command.
///
/// Returns `None` for blank input. The leading slash is optional.
pub fn parse_command(input: &str) -> Option<BotCommand> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let without_slash = trimmed.strip_prefix('/').unwrap_or(trimmed);
    let (cmd, args) = match without_slash.find(' ') {
        Some(pos) => (&without_slash[..pos], without_slash[pos + 1..].trim()),
        None => (without_slash, ""),
    };

    let command = match cmd.to_lowercase().as_str() {
        "search" | "find" | "list" => {
            if args.is_empty() {
                BotCommand::Search(None)
            } else {
                BotCommand::Search(Some(args.to_string()))
            }
        }
        "select" | "sel" => match args.parse::<usize>() {
            Ok(n) if n > 0 => BotCommand::Select(n),
            _ => BotCommand::Unknown(format!("select {args}")),
        },
        "rename" | "mv" => {
            if args.is_empty() {
                BotCommand::Unknown("rename".to_string())
            } else {
                BotCommand::Rename(args.to_string())
            }
        }
        "password" | "pw" => {
            if args.is_empty() {
                BotCommand::Password(None)
            } else {
                BotCommand::Password(Some(args.to_string()))
            }
        }
        "lock" => {
            if args.is_empty() {
                BotCommand::Lock(None)
            } else {
                match args.parse::<u32>() {
                    Ok(n) => BotCommand::Lock(Some(n)),
                    Err(_) => BotCommand::Unknown(format!("lock {args}")),
                }
            }
        }
        "delete" | "del" | "rm" => BotCommand::Delete,
        "link" | "url" => BotCommand::Link,
        "status" | "info" => BotCommand::Status,
        "quit" | "q" | "exit" => BotCommand::Quit,
        "help" | "h" | "?" => BotCommand::Help,
        _ => BotCommand::Unknown(cmd.to_string()),
    };

    Some(command)
}

/// Help text for the management commands.
pub fn help_text() -> String {
    [
        "Commands:",
        "  search [query]   list files, optionally filtered",
        "  select <n>       pick file n from the last listing",
        "  rename <name>    rename the selected file (extension is kept)",
        "  password [pw]    set the password; no argument clears it",
        "  lock [n]         set the visit limit; no argument clears it",
        "  delete           delete the selected file",
        "  link             shareable link for the selected file",
        "  status           protection state of the selected file",
        "  quit             end the session",
    ]
    .join("\n")
}
