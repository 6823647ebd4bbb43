use std::io::Write;

use crossterm::style::Stylize;
use tracing::warn;

use super::conversation_state::{Role, Turn};

pub const USER_LABEL: &str = "You:";
pub const BOT_LABEL: &str = "DentalBot:";

/// Something that shows (speaker, text) pairs to the user.
///
/// Rendering is fire-and-forget: failures are the display's own business.
pub trait ChatDisplay {
    fn render(&mut self, entries: &[(&str, &str)]);
}

pub fn label_for(turn: &Turn) -> &'static str {
    match turn.role() {
        Role::User => USER_LABEL,
        Role::Assistant => BOT_LABEL,
        Role::System => "System:",
    }
}

/// Render a user/assistant exchange.
pub fn render_exchange(display: &mut dyn ChatDisplay, user: &Turn, assistant: &Turn) {
    display.render(&[
        (label_for(user), user.content()),
        (label_for(assistant), assistant.content()),
    ]);
}

pub struct TerminalDisplay<W: Write> {
    output: W,
    styled: bool,
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(output: W, styled: bool) -> Self {
        Self { output, styled }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.output
    }

    fn write_entry(&mut self, label: &str, text: &str) -> std::io::Result<()> {
        if self.styled {
            let label = if label == USER_LABEL {
                label.bold().cyan()
            } else {
                label.bold().green()
            };
            writeln!(self.output, "{} {}", label, text.trim_end())
        } else {
            writeln!(self.output, "{} {}", label, text.trim_end())
        }
    }
}

impl<W: Write> ChatDisplay for TerminalDisplay<W> {
    fn render(&mut self, entries: &[(&str, &str)]) {
        for (label, text) in entries {
            if let Err(e) = self.write_entry(label, text) {
                warn!("Failed to render message: {}", e);
                return;
            }
        }
        if let Err(e) = writeln!(self.output).and_then(|_| self.output.flush()) {
            warn!("Failed to flush display: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_rendering() {
        let mut display = TerminalDisplay::new(Vec::new(), false);
        render_exchange(
            &mut display,
            &Turn::new(Role::User, "Hi there"),
            &Turn::new(Role::Assistant, "Hello! How can I help?\n"),
        );

        let out = String::from_utf8(display.into_inner()).unwrap();
        assert_eq!(out, "You: Hi there\nDentalBot: Hello! How can I help?\n\n");
    }

    #[test]
    fn test_styled_rendering_keeps_text() {
        let mut display = TerminalDisplay::new(Vec::new(), true);
        display.render(&[(USER_LABEL, "book a cleaning")]);

        let out = String::from_utf8(display.into_inner()).unwrap();
        assert!(out.contains("You:"));
        assert!(out.contains("book a cleaning"));
        assert!(out.contains('\u{1b}'));
    }
}
