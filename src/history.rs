use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_MAX_HISTORY: usize = 20;
const SUMMARY_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Chat turns of one session, oldest first, capped at `max_history` entries.
/// Once the cap is reached every new message evicts the oldest one.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    messages: VecDeque<Message>,
    max_history: usize,
}

impl ConversationHistory {
    pub fn new(max_history: usize) -> Result<Self, ConfigError> {
        if max_history == 0 {
            return Err(ConfigError::ZeroHistory);
        }
        Ok(Self {
            messages: VecDeque::with_capacity(max_history),
            max_history,
        })
    }

    pub fn add(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push_back(Message::new(role, content));
        while self.messages.len() > self.max_history {
            self.messages.pop_front();
        }
    }

    /// Owned copy of every stored message in chronological order.
    pub fn get_history(&self) -> Vec<Message> {
        self.messages.iter().cloned().collect()
    }

    /// The last `n` messages, oldest first.
    pub fn recent(&self, n: usize) -> Vec<Message> {
        let skip = self.messages.len().saturating_sub(n);
        self.messages.iter().skip(skip).cloned().collect()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// One `ROLE: content` line per message, long contents cut to a preview.
    pub fn summarize(&self) -> String {
        self.messages
            .iter()
            .map(|m| {
                let role = m.role.as_str().to_uppercase();
                match m.content.char_indices().nth(SUMMARY_PREVIEW_CHARS) {
                    Some((cut, _)) => format!("{}: {}...", role, &m.content[..cut]),
                    None => format!("{}: {}", role, m.content),
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self {
            messages: VecDeque::with_capacity(DEFAULT_MAX_HISTORY),
            max_history: DEFAULT_MAX_HISTORY,
        }
    }
}
