//! One question in, one answer string out.

use tracing::{info, instrument, warn};

use crate::digest::{build_digest, DigestLimits};
use crate::intent::Intent;
use crate::rules::{self, Dispatch};
use crate::schema::normalize;
use crate::summarizer::{Summarizer, SUMMARIZER_FAILED};
use crate::workbook::DatasetSource;

/// Answers questions against a dataset source. Nothing is cached between
/// calls: every question reloads and renormalizes the workbook.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    limits: DigestLimits,
}

impl Engine {
    pub fn new(limits: DigestLimits) -> Self {
        Self { limits }
    }

    #[instrument(level = "info", skip_all, fields(question = %question))]
    pub fn answer(
        &self,
        question: &str,
        source: &dyn DatasetSource,
        summarizer: &dyn Summarizer,
    ) -> String {
        if let Some(reply) = rules::short_circuit(question) {
            info!("short-circuited");
            return reply.to_string();
        }

        let workbook = match source.load() {
            Ok(wb) => wb,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "dataset load failed");
                return format!("⚠️ Error processing file: {e:#}");
            }
        };
        let dataset = normalize(&workbook);

        let intent = Intent::extract(question);
        if let Dispatch::Answered(text) = rules::dispatch(&intent, &dataset) {
            return text;
        }

        let digest = build_digest(&dataset, &intent, &self.limits);
        info!(digest_bytes = digest.len(), "no rule matched; asking summarizer");
        match summarizer.summarize(&digest, question) {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "summarizer failed");
                SUMMARIZER_FAILED.to_string()
            }
        }
    }
}

/// [`Engine::answer`] with default digest limits.
pub fn answer(question: &str, source: &dyn DatasetSource, summarizer: &dyn Summarizer) -> String {
    Engine::default().answer(question, source, summarizer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarizer::CollaboratorError;
    use crate::workbook::{Cell, RawSheet, Workbook};
    use std::cell::RefCell;

    struct Failing;

    impl DatasetSource for Failing {
        fn load(&self) -> anyhow::Result<Workbook> {
            anyhow::bail!("file is not a zip archive")
        }
    }

    fn never(_: &str, _: &str) -> Result<String, CollaboratorError> {
        panic!("summarizer must not be called")
    }

    #[test]
    fn load_error_is_reported() {
        assert_eq!(
            answer("total units sold", &Failing, &never),
            "⚠️ Error processing file: file is not a zip archive"
        );
    }

    #[test]
    fn greeting_skips_loading() {
        assert_eq!(answer("hey", &Failing, &never), rules::GREETING_REPLY);
    }

    #[test]
    fn schema_error_is_reported() {
        let wb = Workbook::new().with_sheet(
            "Raw Data - Date Wise",
            RawSheet::new(["Product", "Vendor"]).with_row(vec![Cell::from("Kale"), Cell::from("FreshCo")]),
        );
        let reply = answer("total units sold", &wb, &never);
        assert!(reply.starts_with("⚠️ Sheet `Raw Data - Date Wise` is missing required columns"), "{reply}");
    }

    #[test]
    fn broken_sheet_does_not_block_others() {
        let wb = Workbook::new()
            .with_sheet(
                "Raw Data - Date Wise",
                RawSheet::new(["Product", "Vendor", "OrderDate", "SoldQuantity"]).with_row(vec![
                    Cell::from("Kale"),
                    Cell::from("FreshCo"),
                    Cell::from("2024-06-03"),
                    Cell::from(6i64),
                ]),
            )
            .with_sheet("Overall Avg & Change", RawSheet::new(["Week"]));
        assert_eq!(
            answer("total units sold in week 23", &wb, &never),
            "📦 Total units sold in week 23: 6"
        );
        assert!(answer("avg daily osv in week 23", &wb, &never)
            .starts_with("⚠️ Sheet `Overall Avg & Change` is missing required columns"));
    }

    #[test]
    fn summarizer_failure_is_apology() {
        let failing = |_: &str, _: &str| -> Result<String, CollaboratorError> {
            Err(CollaboratorError::Status(503))
        };
        assert_eq!(answer("what about the weather", &Workbook::new(), &failing), SUMMARIZER_FAILED);
    }

    #[test]
    fn digest_limits_reach_summarizer() {
        let mut sheet = RawSheet::new(["Product", "Vendor", "OrderDate", "SoldQuantity"]);
        for i in 0..5 {
            sheet.push_row(vec![
                Cell::from("Kale"),
                Cell::from("FreshCo"),
                Cell::from("2024-06-03"),
                Cell::from(i as i64),
            ]);
        }
        let wb = Workbook::new().with_sheet("Raw Data - Date Wise", sheet);
        let seen = RefCell::new(String::new());
        let recording = |context: &str, _: &str| -> Result<String, CollaboratorError> {
            *seen.borrow_mut() = context.to_string();
            Ok("ok".into())
        };
        let engine = Engine::new(DigestLimits {
            raw_sales: 2,
            ..Default::default()
        });
        assert_eq!(engine.answer("tell me about kale", &wb, &recording), "ok");
        assert_eq!(seen.borrow().matches("FreshCo").count(), 2);
    }
}
