use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Next,
    Prev,
    Reset,
    /// `None` flips the current value
    Launch(Option<bool>),
    Help,
    /// Version and project information
    About,
    Quit,
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Invalid argument for :{0}: {1}")]
    InvalidArgument(&'static str, String),
}

pub fn parse_command(input: &str) -> Result<Command, CommandError> {
    let input = input.trim();
    let mut parts = input.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("");
    let arg = parts.next().map(|s| s.trim().to_string());

    match cmd {
        "next" | "n" | "finish" => Ok(Command::Next),
        "prev" | "p" | "back" | "b" => Ok(Command::Prev),
        "reset" | "r" => Ok(Command::Reset),
        "launch" | "l" => match arg.as_deref() {
            None | Some("") | Some("toggle") => Ok(Command::Launch(None)),
            Some("on") | Some("true") => Ok(Command::Launch(Some(true))),
            Some("off") | Some("false") => Ok(Command::Launch(Some(false))),
            Some(other) => Err(CommandError::InvalidArgument("launch", other.to_string())),
        },
        "help" | "h" | "?" => Ok(Command::Help),
        "about" | "version" => Ok(Command::About),
        "q" | "quit" | "exit" => Ok(Command::Quit),
        "" => Err(CommandError::Unknown("empty command".to_string())),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}
