use rustyline::{CompletionType, Config, EditMode, Editor, Result};

pub const DEFAULT_PROMPT: &str = "You> ";

pub fn generate_prompt(custom_prompt: Option<&str>) -> String {
    custom_prompt.unwrap_or(DEFAULT_PROMPT).to_string()
}

/// Line editor for the chat loop. Lines starting with a space stay out of
/// the history.
pub fn rl() -> Result<Editor<()>> {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .edit_mode(EditMode::Emacs)
        .build();
    Editor::with_config(config)
}
