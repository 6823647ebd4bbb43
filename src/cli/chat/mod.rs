pub mod controller;
pub mod conversation_state;
pub mod display;
pub mod prompt;

use std::io::Write;
use std::process::ExitCode;

use color_print::cstr;
use eyre::Result;
use prompt::generate_prompt;
use rustyline::error::ReadlineError;
use tracing::{error, warn};

use crate::error::BotError;
use controller::ConversationController;
use conversation_state::Role;
use display::{label_for, render_exchange, ChatDisplay};

const WELCOME_TEXT: &str = cstr!(
    "
<bold>Welcome to BrightSmile Dental Clinic!</bold>
I'm DentalBot. I can book an appointment or answer questions about
our hours, insurance and policies.

<dim>/help         Show the help dialogue
/quit         Quit the application</dim>
"
);

const HELP_TEXT: &str = "
BrightSmile DentalBot

/appointments Show the appointments saved so far
/history      Show this conversation
/help         Show this help dialogue
/quit         Quit the application
";

pub struct ChatContext {
    output: Box<dyn Write>,
    display: Box<dyn ChatDisplay>,
    input: Option<String>,
    interactive: bool,
    controller: ConversationController,
}

impl ChatContext {
    pub fn new(
        output: Box<dyn Write>,
        display: Box<dyn ChatDisplay>,
        input: Option<String>,
        interactive: bool,
        controller: ConversationController,
    ) -> Self {
        Self {
            output,
            display,
            input,
            interactive,
            controller,
        }
    }

    pub async fn run(&mut self) -> Result<ExitCode> {
        // Single message, then exit
        if let Some(input) = self.input.take() {
            return match self.process_chat_input(&input).await {
                Ok(()) => Ok(ExitCode::SUCCESS),
                Err(e) => {
                    writeln!(self.output, "Error: {}", e)?;
                    Ok(ExitCode::FAILURE)
                }
            };
        }

        if self.interactive {
            self.print_welcome()?;
            self.run_interactive().await?;
        }

        Ok(ExitCode::SUCCESS)
    }

    fn print_welcome(&mut self) -> Result<()> {
        writeln!(self.output, "{}", WELCOME_TEXT)?;
        Ok(())
    }

    async fn run_interactive(&mut self) -> Result<()> {
        let mut rl = prompt::rl()?;

        loop {
            let prompt_text = generate_prompt(None);

            match rl.readline(&prompt_text) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }

                    rl.add_history_entry(line.as_str());

                    if line.trim() == "/quit" {
                        break;
                    }

                    if let Err(e) = self.handle_input(&line).await {
                        writeln!(self.output, "Error: {}", e)?;
                    }
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(e) => {
                    writeln!(self.output, "Error: {}", e)?;
                    break;
                }
            }
        }

        writeln!(self.output, "Goodbye!")?;
        Ok(())
    }

    async fn handle_input(&mut self, input: &str) -> Result<()> {
        match input.trim() {
            "/help" => {
                writeln!(self.output, "{}", HELP_TEXT)?;
            }
            "/appointments" => self.print_appointments()?,
            "/history" => self.print_history()?,
            _ => self.process_chat_input(input).await?,
        }

        Ok(())
    }

    async fn process_chat_input(&mut self, input: &str) -> Result<()> {
        let saved_before = self.controller.bookings_saved();

        match self.controller.handle_user_input(input).await {
            Ok(Some((user, assistant))) => {
                render_exchange(self.display.as_mut(), &user, &assistant);
                if self.controller.bookings_saved() > saved_before {
                    writeln!(
                        self.output,
                        "Appointment saved to {}",
                        self.controller.records_path().display()
                    )?;
                }
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e @ BotError::Storage { .. }) => {
                // The exchange happened; only persisting the booking failed.
                self.render_last_exchange();
                error!("{}", e);
                Err(e.into())
            }
            Err(e) => {
                warn!(
                    "{} message(s) left unanswered",
                    self.controller.history().unanswered().len()
                );
                Err(e.into())
            }
        }
    }

    fn render_last_exchange(&mut self) {
        let turns = self.controller.history().turns();
        if let [.., user, assistant] = turns {
            if user.role() == Role::User && assistant.role() == Role::Assistant {
                render_exchange(self.display.as_mut(), user, assistant);
            }
        }
    }

    fn print_history(&mut self) -> Result<()> {
        let entries: Vec<(&str, &str)> = self
            .controller
            .history()
            .turns()
            .iter()
            .filter(|t| t.role() != Role::System)
            .map(|t| (label_for(t), t.content()))
            .collect();

        if entries.is_empty() {
            writeln!(self.output, "No messages yet.")?;
        } else {
            self.display.render(&entries);
        }
        Ok(())
    }

    fn print_appointments(&mut self) -> Result<()> {
        let records = self.controller.records().read_all()?;

        if records.is_empty() {
            writeln!(
                self.output,
                "No appointments saved in {}",
                self.controller.records_path().display()
            )?;
            return Ok(());
        }

        for (i, record) in records.iter().enumerate() {
            writeln!(
                self.output,
                "{}. {} | {} | {} {} | {}",
                i + 1,
                or_dash(&record.name),
                or_dash(&record.service),
                or_dash(&record.date),
                or_dash(&record.time),
                or_dash(&record.notes)
            )?;
        }
        Ok(())
    }
}

fn or_dash(field: &str) -> &str {
    if field.is_empty() {
        "-"
    } else {
        field
    }
}
