//! Ordered phrase rules that map a question onto one metric call.
//!
//! The catalog is a plain slice walked top to bottom; the first rule whose
//! phrases and required fields are all present answers the question.

mod catalog;

pub use catalog::catalog;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::intent::Intent;
use crate::schema::{Dataset, SchemaError};

pub const GREETING_REPLY: &str = "👋 Hello! Ask me about units sold, vendors, organic or media performance, COGS, net income or week-over-week changes.";

pub const NOT_A_QUESTION: &str = "⚠️ That doesn't appear to be a valid business question. Please rephrase your query to relate to product performance, sales, marketing, or supply chain.";

const GREETINGS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "hola",
    "good morning",
    "good afternoon",
    "good evening",
    "greetings",
    "yo",
];

static OPAQUE_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{15,}$").expect("opaque token pattern"));

/// Outcome of walking the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Answered(String),
    NoMatch,
}

/// Intent fields a rule cannot run without.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Needs {
    pub product: bool,
    pub week: bool,
    pub week_pair: bool,
    pub month: bool,
    pub top_n: bool,
    pub vendor: bool,
}

impl Needs {
    pub const NONE: Needs = Needs {
        product: false,
        week: false,
        week_pair: false,
        month: false,
        top_n: false,
        vendor: false,
    };

    fn satisfied_by(&self, intent: &Intent) -> bool {
        (!self.product || intent.product.is_some())
            && (!self.week || intent.week.is_some())
            && (!self.week_pair || intent.week_pair().is_some())
            && (!self.month || intent.month().is_some())
            && (!self.top_n || intent.top_n().is_some())
            && (!self.vendor || intent.vendor().is_some())
    }
}

pub type Handler = fn(&Intent, &Dataset) -> Result<String, SchemaError>;

pub struct Rule {
    pub name: &'static str,
    /// Every phrase must appear in the lowercased question.
    pub all: &'static [&'static str],
    /// At least one must appear, unless empty.
    pub any: &'static [&'static str],
    pub needs: Needs,
    pub handler: Handler,
}

impl Rule {
    pub fn matches(&self, intent: &Intent) -> bool {
        self.all.iter().all(|p| intent.mentions(p))
            && (self.any.is_empty() || self.any.iter().any(|p| intent.mentions(p)))
            && self.needs.satisfied_by(intent)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("all", &self.all)
            .field("any", &self.any)
            .field("needs", &self.needs)
            .finish()
    }
}

/// Greeting and opaque-identifier checks. Runs before any data is touched.
pub fn short_circuit(question: &str) -> Option<&'static str> {
    let trimmed = question.trim();
    if OPAQUE_TOKEN_RE.is_match(trimmed) {
        return Some(NOT_A_QUESTION);
    }
    let bare = trimmed
        .trim_end_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
        .to_lowercase();
    let bare = bare.split_whitespace().collect::<Vec<_>>().join(" ");
    GREETINGS
        .iter()
        .any(|g| *g == bare)
        .then_some(GREETING_REPLY)
}

/// First matching rule in `rules` answers. A rule that needs an absent sheet
/// answers with the schema error text.
pub fn dispatch_with(rules: &[Rule], intent: &Intent, dataset: &Dataset) -> Dispatch {
    let Some(rule) = rules.iter().find(|r| r.matches(intent)) else {
        debug!("no rule matched");
        return Dispatch::NoMatch;
    };
    debug!(rule = rule.name, "rule matched");
    match (rule.handler)(intent, dataset) {
        Ok(text) => Dispatch::Answered(text),
        Err(e) => Dispatch::Answered(format!("⚠️ {}", e)),
    }
}

pub fn dispatch(intent: &Intent, dataset: &Dataset) -> Dispatch {
    dispatch_with(catalog(), intent, dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(_: &Intent, _: &Dataset) -> Result<String, SchemaError> {
        Ok("first".into())
    }

    fn second(_: &Intent, _: &Dataset) -> Result<String, SchemaError> {
        Ok("second".into())
    }

    fn broken(_: &Intent, d: &Dataset) -> Result<String, SchemaError> {
        d.require_media().map(|_| String::new())
    }

    const ORDERED: &[Rule] = &[
        Rule {
            name: "narrow",
            all: &["units sold", "week 25"],
            any: &[],
            needs: Needs::NONE,
            handler: first,
        },
        Rule {
            name: "broad",
            all: &["units sold"],
            any: &[],
            needs: Needs::NONE,
            handler: second,
        },
    ];

    #[test]
    fn first_match_wins() {
        let d = Dataset::default();
        assert_eq!(
            dispatch_with(ORDERED, &Intent::extract("units sold in week 25"), &d),
            Dispatch::Answered("first".into())
        );
        assert_eq!(
            dispatch_with(ORDERED, &Intent::extract("Units Sold in week 24"), &d),
            Dispatch::Answered("second".into())
        );
        assert_eq!(
            dispatch_with(ORDERED, &Intent::extract("weather"), &d),
            Dispatch::NoMatch
        );
    }

    #[test]
    fn missing_field_skips_rule() {
        let rules = [
            Rule {
                name: "needs product",
                all: &["units"],
                any: &[],
                needs: Needs {
                    product: true,
                    ..Needs::NONE
                },
                handler: first,
            },
            Rule {
                name: "fallback",
                all: &["units"],
                any: &["sold", "moved"],
                needs: Needs::NONE,
                handler: second,
            },
        ];
        let d = Dataset::default();
        assert_eq!(
            dispatch_with(&rules, &Intent::extract("units moved"), &d),
            Dispatch::Answered("second".into())
        );
        assert_eq!(
            dispatch_with(&rules, &Intent::extract("kale units"), &d),
            Dispatch::Answered("first".into())
        );
        assert_eq!(
            dispatch_with(&rules, &Intent::extract("units"), &d),
            Dispatch::NoMatch
        );
    }

    #[test]
    fn absent_sheet_is_reported() {
        let rules = [Rule {
            name: "media",
            all: &["media"],
            any: &[],
            needs: Needs::NONE,
            handler: broken,
        }];
        assert_eq!(
            dispatch_with(&rules, &Intent::extract("media"), &Dataset::default()),
            Dispatch::Answered("⚠️ Sheet `Media` is not available in the current dataset".into())
        );
    }

    #[test]
    fn greetings_and_tokens() {
        assert_eq!(short_circuit("Hello!"), Some(GREETING_REPLY));
        assert_eq!(short_circuit("  good   Morning "), Some(GREETING_REPLY));
        assert_eq!(short_circuit("hi, units sold in week 3"), None);
        assert_eq!(short_circuit("xK7f92mQplweiUZnq"), Some(NOT_A_QUESTION));
        assert_eq!(short_circuit(" abc_DEF-1234567890 "), Some(NOT_A_QUESTION));
        // too short, or contains spaces
        assert_eq!(short_circuit("abc123"), None);
        assert_eq!(short_circuit("xK7f92mQplwe iUZnq"), None);
    }
}
