//! Recognized bot commands and classification of inbound text.

/// Prefix that marks a message as a command.
pub const COMMAND_MARKER: char = '/';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    /// Archive the current conversation and start an empty one.
    Reset,
}

/// How a piece of inbound text should be handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Inbound {
    Command(Command),
    /// Starts with the command marker but names no known command. Ignored.
    UnknownCommand,
    Plain,
}

impl Inbound {
    #[must_use]
    pub fn classify(text: &str) -> Self {
        if !text.starts_with(COMMAND_MARKER) {
            return Self::Plain;
        }
        Command::parse_from_text(text).map_or(Self::UnknownCommand, Self::Command)
    }
}

impl Command {
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Start, Self::Reset, Self::Help]
    }

    /// Command name without the marker, as registered with the platform.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Help => "help",
            Self::Reset => "new",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Start => "Start a conversation",
            Self::Help => "List available commands",
            Self::Reset => "Start a new chat",
        }
    }

    /// Parse the leading token of `text`.
    ///
    /// Case-insensitive; a bot mention suffix (`/new@my_bot`) is ignored and
    /// anything after the first whitespace is treated as arguments.
    #[must_use]
    pub fn parse_from_text(text: &str) -> Option<Self> {
        let token = text.split_whitespace().next()?;
        let token = token.split('@').next().unwrap_or(token).to_lowercase();

        match token.as_str() {
            "/start" => Some(Self::Start),
            "/help" => Some(Self::Help),
            "/new" | "/reset" => Some(Self::Reset),
            _ => None,
        }
    }

    #[must_use]
    pub const fn welcome_text() -> &'static str {
        "Hello! I'm your AI-powered chatbot. Send me a message to start chatting! \
         Use /help to see available commands."
    }

    #[must_use]
    pub const fn help_text() -> &'static str {
        r"Chatbot Commands:

/start - Start a conversation
/new - Start a new chat
/help - List available commands"
    }
}
