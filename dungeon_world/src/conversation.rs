//! Conversation data for NPC interactions.
//!
//! Conversations are plain page sequences; playback and rendering belong to
//! the host.

use serde::{Deserialize, Serialize};

/// A single page of conversation text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationPage {
    pub text: String,
    pub speaker: String,
    /// Seconds to display this page.
    pub duration_secs: f32,
}

impl ConversationPage {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            speaker: speaker.into(),
            duration_secs: 4.0,
        }
    }

    pub fn with_duration(mut self, duration_secs: f32) -> Self {
        self.duration_secs = duration_secs;
        self
    }
}

/// An ordered sequence of conversation pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub pages: Vec<ConversationPage>,
}

impl Conversation {
    pub fn new(pages: Vec<ConversationPage>) -> Self {
        Self { pages }
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Total display time across all pages.
    pub fn duration_secs(&self) -> f32 {
        self.pages.iter().map(|p| p.duration_secs).sum()
    }
}
