//! Message types for model communication
//!
//! A message is a role plus either plain text or a list of text blocks. The
//! generate-content API returns a candidate as a list of parts; those map
//! onto [`ContentBlock::Text`] one-to-one.

use serde::{Deserialize, Serialize};

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message
    User,
    /// Model (assistant) message
    Assistant,
}

impl Role {
    /// Role name as used on the generate-content wire format
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "model",
        }
    }
}

/// Content block in a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text content
    Text {
        /// Text content
        text: String,
    },
}

/// Message content: either simple text or structured blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text content
    Text(String),
    /// Structured content blocks
    Blocks(Vec<ContentBlock>),
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message role
    pub role: Role,

    /// Message content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
}

impl Message {
    /// Create a user message with text
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(MessageContent::Text(text.into())),
        }
    }

    /// Create an assistant message with text
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(MessageContent::Text(text.into())),
        }
    }

    /// Create an assistant message from several text parts
    pub fn assistant_parts(parts: Vec<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(MessageContent::Blocks(
                parts
                    .into_iter()
                    .map(|text| ContentBlock::Text { text })
                    .collect(),
            )),
        }
    }

    /// Text parts of the message, in order
    pub fn parts(&self) -> Vec<&str> {
        match &self.content {
            Some(MessageContent::Text(s)) => vec![s.as_str()],
            Some(MessageContent::Blocks(blocks)) => blocks
                .iter()
                .map(|b| match b {
                    ContentBlock::Text { text } => text.as_str(),
                })
                .collect(),
            None => Vec::new(),
        }
    }

    /// All text parts concatenated
    pub fn text(&self) -> String {
        self.parts().concat()
    }
}
