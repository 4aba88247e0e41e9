//! Line-oriented terminal front end.
//!
//! Maps input lines to UI events and prints the effects the runtime returns.
//! Text from the user or the backend is sanitized before printing so it
//! cannot inject terminal escape sequences.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use codechat_chat::{ChatController, Effect};
use codechat_core::types::{EntryId, Role};

pub const HELP: &str = "Commands: /attach <path>  /voice  /help  /quit. Anything else is sent as a question.";

/// What an input line on the chat view means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    Attach(PathBuf),
    Voice,
    Help,
    Quit,
    /// A command that needs an argument was given none.
    Usage(&'static str),
}

pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    let (head, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (trimmed, ""),
    };
    match head {
        "/quit" | "/exit" => Command::Quit,
        "/help" => Command::Help,
        "/voice" => Command::Voice,
        "/attach" if rest.is_empty() => Command::Usage("/attach <path>"),
        "/attach" => Command::Attach(PathBuf::from(rest)),
        _ => Command::Ask(line.to_string()),
    }
}

// CSI sequences, OSC sequences (BEL or ST terminated), then any other
// two-byte escape.
static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b[@-_]?")
        .expect("Invalid ANSI escape regex")
});

/// Strip ANSI escape sequences and control characters, keeping newlines and tabs.
pub fn sanitize(text: &str) -> String {
    ANSI_ESCAPE
        .replace_all(text, "")
        .chars()
        .filter(|c| matches!(c, '\n' | '\t') || !c.is_control())
        .collect()
}

/// Prints effects and transcript entries to a writer.
pub struct TerminalFrontend<W: Write> {
    out: W,
}

impl<W: Write> TerminalFrontend<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn name_prompt(&mut self) -> io::Result<()> {
        write!(self.out, "Enter your name: ")?;
        self.out.flush()
    }

    /// Input prompt, showing the selected file if there is one.
    pub fn chat_prompt(&mut self, controller: &ChatController) -> io::Result<()> {
        match controller.session().pending_attachment() {
            Some(attachment) => write!(self.out, "[{}] > ", sanitize(&attachment.label()))?,
            None => write!(self.out, "> ")?,
        }
        self.out.flush()
    }

    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text)
    }

    pub fn render(&mut self, controller: &ChatController, effects: &[Effect]) -> io::Result<()> {
        for effect in effects {
            match effect {
                Effect::ShowChat { user_name } => {
                    writeln!(self.out, "Welcome, {}! {}", sanitize(user_name), HELP)?;
                }
                Effect::Alert(text) => writeln!(self.out, "[!] {}", sanitize(text))?,
                Effect::Notice(text) => writeln!(self.out, "[i] {}", sanitize(text))?,
                Effect::EntryAppended(id) | Effect::EntryUpdated(id) => {
                    self.entry(controller, *id)?;
                }
                Effect::SetInput(text) => writeln!(self.out, "(heard) {}", sanitize(text))?,
                Effect::ClearInput | Effect::Send(_) | Effect::StartVoice(_) => {}
            }
        }
        self.out.flush()
    }

    fn entry(&mut self, controller: &ChatController, id: EntryId) -> io::Result<()> {
        let Some(entry) = controller.transcript().get(id) else {
            return Ok(());
        };
        let text = sanitize(&controller.display_text(entry));
        match entry.role {
            Role::User => {
                let name = controller.session().user_name().unwrap_or("you");
                writeln!(self.out, "{} {}: {}", id, sanitize(name), text)
            }
            Role::Bot => writeln!(self.out, "{} {}", id, text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codechat_chat::UiEvent;
    use codechat_core::config::CodechatConfig;
    use codechat_core::types::Attachment;

    fn rendered(controller: &ChatController, effects: &[Effect]) -> String {
        let mut frontend = TerminalFrontend::new(Vec::new());
        frontend.render(controller, effects).unwrap();
        String::from_utf8(frontend.into_inner()).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("/quit"), Command::Quit);
        assert_eq!(parse_command("  /exit "), Command::Quit);
        assert_eq!(parse_command("/help"), Command::Help);
        assert_eq!(parse_command("/voice"), Command::Voice);
        assert_eq!(
            parse_command("/attach  src/my file.c "),
            Command::Attach(PathBuf::from("src/my file.c"))
        );
        assert_eq!(parse_command("/attach"), Command::Usage("/attach <path>"));
        assert_eq!(
            parse_command("what does /attach do?"),
            Command::Ask("what does /attach do?".to_string())
        );
        assert_eq!(parse_command(""), Command::Ask(String::new()));
    }

    #[test]
    fn test_sanitize_strips_escapes() {
        assert_eq!(sanitize("plain text"), "plain text");
        assert_eq!(sanitize("\u{1b}[31mred\u{1b}[0m"), "red");
        assert_eq!(sanitize("a\u{1b}]0;title\u{7}b"), "ab");
        assert_eq!(sanitize("a\u{1b}]8;;http://x\u{1b}\\b"), "ab");
        assert_eq!(sanitize("bell\u{7} and\rcr"), "bell andcr");
        assert_eq!(sanitize("line\n\tindent"), "line\n\tindent");
        assert_eq!(sanitize("<b>html stays literal</b>"), "<b>html stays literal</b>");
    }

    #[test]
    fn test_render_exchange() {
        let mut controller = ChatController::new(&CodechatConfig::default(), false);
        let effects = controller.confirm_name("Ada");
        let out = rendered(&controller, &effects);
        assert!(out.starts_with("Welcome, Ada!"));

        let effects = controller.submit_message("hello");
        let out = rendered(&controller, &effects);
        assert_eq!(out, "#1 Ada: hello\n#2 🤖 Thinking...\n");

        let effects = controller.dispatch(UiEvent::AnswerReceived {
            bot_entry: EntryId(1),
            outcome: Ok("hi \u{1b}[2Jthere".to_string()),
        });
        assert_eq!(rendered(&controller, &effects), "#2 🤖 hi there\n");
    }

    #[test]
    fn test_render_alerts_and_notices() {
        let mut controller = ChatController::new(&CodechatConfig::default(), false);
        controller.confirm_name("Ada");
        let effects = controller.select_attachment(Attachment::from_path("main.c"));
        let out = rendered(&controller, &effects);
        assert!(out.contains("[i] Selected: main.c\n"));
        assert!(out.contains("[!] 📁 File \"main.c\" is ready"));
    }

    #[test]
    fn test_chat_prompt_shows_attachment() {
        let mut controller = ChatController::new(&CodechatConfig::default(), false);
        controller.confirm_name("Ada");

        let mut frontend = TerminalFrontend::new(Vec::new());
        frontend.chat_prompt(&controller).unwrap();
        controller.select_attachment(Attachment::from_path("main.c"));
        frontend.chat_prompt(&controller).unwrap();
        let out = String::from_utf8(frontend.into_inner()).unwrap();
        assert_eq!(out, "> [Selected: main.c] > ");
    }
}
