use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        f.write_str(role)
    }
}

/// One message of the conversation. Fields are private so a turn cannot
/// change once it has been recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Append-only history, always starting with the system prompt.
pub struct ConversationState {
    turns: Vec<Turn>,
}

impl ConversationState {
    pub fn new(system_prompt: &str) -> Self {
        Self {
            turns: vec![Turn::new(Role::System, system_prompt)],
        }
    }

    pub fn add_user_message(&mut self, message: &str) -> Turn {
        self.push(Turn::new(Role::User, message))
    }

    pub fn add_assistant_message(&mut self, message: &str) -> Turn {
        self.push(Turn::new(Role::Assistant, message))
    }

    fn push(&mut self, turn: Turn) -> Turn {
        self.turns.push(turn.clone());
        turn
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// User turns that never got an assistant reply, e.g. because the chat
    /// service failed.
    pub fn unanswered(&self) -> Vec<&Turn> {
        self.turns
            .iter()
            .enumerate()
            .filter(|(i, turn)| {
                turn.role == Role::User
                    && self
                        .turns
                        .get(i + 1)
                        .map_or(true, |next| next.role != Role::Assistant)
            })
            .map(|(_, turn)| turn)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_with_system_prompt() {
        let state = ConversationState::new("be nice");
        assert_eq!(state.len(), 1);
        assert_eq!(state.turns()[0].role(), Role::System);
        assert_eq!(state.turns()[0].content(), "be nice");
    }

    #[test]
    fn test_appends_in_order() {
        let mut state = ConversationState::new("be nice");
        let user = state.add_user_message("hi");
        let assistant = state.add_assistant_message("hello!");

        assert_eq!(user, Turn::new(Role::User, "hi"));
        assert_eq!(assistant.role(), Role::Assistant);
        assert_eq!(state.len(), 3);
        assert_eq!(state.turns()[2].content(), "hello!");
        assert!(state.unanswered().is_empty());
    }

    #[test]
    fn test_unanswered_user_turns() {
        let mut state = ConversationState::new("be nice");
        state.add_user_message("first try");
        state.add_user_message("second try");
        state.add_assistant_message("answer");
        state.add_user_message("dangling");

        let unanswered: Vec<&str> = state.unanswered().iter().map(|t| t.content()).collect();
        assert_eq!(unanswered, vec!["first try", "dangling"]);
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Assistant.to_string(), "assistant");
        assert_eq!(Role::System.to_string(), "system");
    }
}
