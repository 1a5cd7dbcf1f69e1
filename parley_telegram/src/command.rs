use parley_conversation::Command;
use teloxide::types::BotCommand;

/// Command menu registered with Telegram at startup.
#[must_use]
pub fn bot_commands() -> Vec<BotCommand> {
    Command::all()
        .into_iter()
        .map(|cmd| BotCommand {
            command: cmd.name().to_string(),
            description: cmd.description().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_lists_commands_without_marker() {
        let names: Vec<String> = bot_commands().into_iter().map(|c| c.command).collect();
        assert_eq!(names, vec!["start", "new", "help"]);
    }
}
