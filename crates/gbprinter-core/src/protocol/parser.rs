use serde_json::Value;

use super::error::ProtocolError;
use super::layout;

/// One classified input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Blank,
    Comment,
    Command(Command),
    /// Data payload with separating spaces removed.
    Data(String),
}

/// Recognized command frames; everything else lands in `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Init,
    Print,
    /// Valid JSON without a recognized `command` value (`None` if the key is absent).
    Unknown(Option<String>),
}

/// Classify a line that has already been stripped of its line terminator.
///
/// # Examples
/// ```
/// use gbprinter_core::{Command, Line, classify_line};
///
/// let line = classify_line(r#"!{"command":"INIT"}"#)?;
/// assert_eq!(line, Line::Command(Command::Init));
/// # Ok::<(), gbprinter_core::ProtocolError>(())
/// ```
pub fn classify_line(line: &str) -> Result<Line, ProtocolError> {
    if line.is_empty() {
        return Ok(Line::Blank);
    }
    if line.starts_with(layout::COMMENT_PREFIX) {
        return Ok(Line::Comment);
    }
    if let Some(payload) = line.strip_prefix(layout::COMMAND_PREFIX) {
        return parse_command(payload).map(Line::Command);
    }
    Ok(Line::Data(line.replace(layout::DATA_SEPARATOR, "")))
}

pub fn parse_command(payload: &str) -> Result<Command, ProtocolError> {
    let value: Value =
        serde_json::from_str(payload).map_err(|err| ProtocolError::MalformedCommand {
            message: err.to_string(),
        })?;

    let command = match value.get(layout::COMMAND_KEY) {
        Some(command) => command,
        None => return Ok(Command::Unknown(None)),
    };
    Ok(match command.as_str() {
        Some(layout::COMMAND_INIT) => Command::Init,
        Some(layout::COMMAND_PRINT) => Command::Print,
        Some(other) => Command::Unknown(Some(other.to_string())),
        None => Command::Unknown(Some(command.to_string())),
    })
}

#[cfg(test)]
mod tests {
    use super::{Command, Line, classify_line, parse_command};
    use crate::protocol::error::ProtocolError;

    #[test]
    fn blank_and_comment_lines() {
        assert_eq!(classify_line("").unwrap(), Line::Blank);
        assert_eq!(
            classify_line("# GAMEBOY PRINTER Emulator").unwrap(),
            Line::Comment
        );
    }

    #[test]
    fn print_command_ignores_extra_keys() {
        let line = classify_line(r#"!{"command":"PRNT","sheets":1,"margin_upper":1}"#).unwrap();
        assert_eq!(line, Line::Command(Command::Print));
    }

    #[test]
    fn unknown_command_values() {
        assert_eq!(
            parse_command(r#"{"command":"DATA","compressed":0}"#).unwrap(),
            Command::Unknown(Some("DATA".to_string()))
        );
        assert_eq!(
            parse_command(r#"{"status":1}"#).unwrap(),
            Command::Unknown(None)
        );
        assert_eq!(
            parse_command(r#"{"command":7}"#).unwrap(),
            Command::Unknown(Some("7".to_string()))
        );
        assert_eq!(parse_command("[1,2]").unwrap(), Command::Unknown(None));
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = classify_line(r#"!{"command":"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedCommand { .. }));
        assert!(err.to_string().contains("malformed command"));
    }

    #[test]
    fn data_line_strips_spaces() {
        let line = classify_line("FF 00 FF 00").unwrap();
        assert_eq!(line, Line::Data("FF00FF00".to_string()));
    }
}
