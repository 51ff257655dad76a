//! The external text generator that phrases answers from a digest.

mod http;
pub mod prompt;

pub use http::ChatCompletionsClient;

use std::time::Duration;

use thiserror::Error;

/// Shown to the user in place of the summarizer's reply when it fails.
pub const SUMMARIZER_FAILED: &str = "⚠️ Sorry, I couldn't generate an answer right now. Please try again in a moment.";

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("summarizer timed out after {0:?}")]
    Timeout(Duration),
    #[error("summarizer returned HTTP {0}")]
    Status(u16),
    #[error("summarizer request failed: {0}")]
    Transport(String),
    #[error("summarizer reply was malformed: {0}")]
    Malformed(String),
    #[error("summarizer is not configured: {0}")]
    NotConfigured(String),
}

/// Receives the bounded data context and the user's question; its reply is
/// returned to the user unmodified.
pub trait Summarizer {
    fn summarize(&self, context: &str, question: &str) -> Result<String, CollaboratorError>;
}

impl<F> Summarizer for F
where
    F: Fn(&str, &str) -> Result<String, CollaboratorError>,
{
    fn summarize(&self, context: &str, question: &str) -> Result<String, CollaboratorError> {
        self(context, question)
    }
}

/// Stand-in used when no credentials are available.
#[derive(Debug, Clone)]
pub struct Unavailable {
    reason: String,
}

impl Unavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Summarizer for Unavailable {
    fn summarize(&self, _context: &str, _question: &str) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::NotConfigured(self.reason.clone()))
    }
}
