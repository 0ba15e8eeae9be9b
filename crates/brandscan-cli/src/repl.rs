//! Line commands for the interactive chat

use std::path::PathBuf;

/// One line of chat input
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Line {
    /// Plain text, sent with any pending attachment
    Say(String),
    /// Pick a local file as the pending attachment
    Attach(PathBuf),
    /// Attach a design link
    Link(String),
    /// Send the pending attachment without text
    Send,
    /// Open a report by id
    Open(String),
    /// Close the viewed report
    Close,
    /// List recent reports
    List,
    Help,
    Quit,
    /// Blank line
    Nothing,
}

/// Problems with a slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineError {
    Unknown(String),
    MissingArgument(&'static str),
}

impl std::fmt::Display for LineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown(cmd) => write!(f, "unknown command '/{cmd}', try /help"),
            Self::MissingArgument(cmd) => write!(f, "/{cmd} needs an argument"),
        }
    }
}

pub(crate) const HELP: &str = "\
/attach <path>  attach a local PNG or JPG image
/link <url>     attach a design link
/send           send the pending attachment
/open <id>      open a report
/close          close the open report
/list           list recent reports
/quit           leave
Anything else is sent as a message.";

pub(crate) fn parse(input: &str) -> Result<Line, LineError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Line::Nothing);
    }
    let Some(command) = input.strip_prefix('/') else {
        return Ok(Line::Say(input.to_string()));
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
        None => (command, None),
    };
    let required = |cmd: &'static str| arg.map(str::to_string).ok_or(LineError::MissingArgument(cmd));

    match name {
        "attach" => required("attach").map(|p| Line::Attach(PathBuf::from(p))),
        "link" => required("link").map(Line::Link),
        "open" => required("open").map(Line::Open),
        "send" => Ok(Line::Send),
        "close" => Ok(Line::Close),
        "list" => Ok(Line::List),
        "help" => Ok(Line::Help),
        "quit" | "exit" => Ok(Line::Quit),
        other => Err(LineError::Unknown(other.to_string())),
    }
}

/// MIME type guessed from a file extension
pub(crate) fn guess_mime(path: &std::path::Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("pdf") => "application/pdf",
        Some("svg") => "image/svg+xml",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    #[test]
    fn help_offers_only_images_for_attach() {
        let attach = HELP.lines().find(|l| l.starts_with("/attach")).unwrap();
        assert!(attach.contains("PNG"));
        assert!(!attach.contains("PDF"));
    }

    #[test]
    fn plain_text_is_said() {
        assert_eq!(parse("  what about color? "), Ok(Line::Say("what about color?".into())));
        assert_eq!(parse("   "), Ok(Line::Nothing));
    }

    #[test]
    fn commands_with_arguments() {
        assert_eq!(parse("/attach ./hero.png"), Ok(Line::Attach("./hero.png".into())));
        assert_eq!(
            parse("/link https://figma.com/file/k"),
            Ok(Line::Link("https://figma.com/file/k".into()))
        );
        assert_eq!(parse("/open"), Err(LineError::MissingArgument("open")));
        assert_eq!(parse("/quit"), Ok(Line::Quit));
        assert_eq!(parse("/nope"), Err(LineError::Unknown("nope".into())));
    }

    #[test]
    fn mime_from_extension() {
        assert_eq!(guess_mime(Path::new("a/B.PNG")), "image/png");
        assert_eq!(guess_mime(Path::new("brief.pdf")), "application/pdf");
        assert_eq!(guess_mime(Path::new("run.exe")), "application/octet-stream");
    }
}
