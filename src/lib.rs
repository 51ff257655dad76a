//! Answers free-text questions about a weekly sales workbook.
//!
//! A question flows through [`intent`] extraction and the ordered [`rules`]
//! catalog; when no rule applies, [`digest`] builds a bounded excerpt for the
//! [`summarizer`]. [`engine::answer`] ties the steps together.

pub mod config;
pub mod dates;
pub mod digest;
pub mod engine;
pub mod format;
pub mod intent;
pub mod metrics;
pub mod rules;
pub mod schema;
pub mod summarizer;
pub mod workbook;

pub use engine::{answer, Engine};
