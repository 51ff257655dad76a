//! Free-text question → structured intent.
//!
//! Extraction is best-effort and never fails: anything not recognized is `None`,
//! which downstream code treats as "unconstrained".

use once_cell::sync::Lazy;
use regex::Regex;

use crate::metrics::Period;

/// Closed product vocabulary, in priority order. The first keyword found wins.
pub const PRODUCT_KEYWORDS: &[&str] = &[
    "lettuce", "thyme", "rosemary", "basil", "tomato", "cucumber", "kale", "mix", "frisee",
    "pepper",
];

const MONTHS: &[&str] = &[
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

static WEEK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"week\s*(\d{1,2})").expect("week pattern"));
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(20\d{2})\b").expect("year pattern"));
static WEEK_PAIR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"week\s*(\d{1,2})\s*(?:vs\.?|versus|and|to|with|or|,|&)\s*(?:week\s*)?(\d{1,2})\b")
        .expect("week pair pattern")
});
static TOP_N_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:top|bottom|best|worst|lowest|highest)\s+(\d{1,2})\b").expect("top n pattern")
});
static VENDOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?:by|from|for)\s+vendor\s+["']?([a-z0-9][a-z0-9 &.'-]*?)["']?\s*(?:\b(?:in|during|for|on)\b|[?!,]|$)"#,
    )
    .expect("vendor pattern")
});
// "may" is also a verb, so it only counts after a preposition.
static MONTH_RE: Lazy<Regex> = Lazy::new(|| {
    let unambiguous: Vec<&str> = MONTHS.iter().copied().filter(|m| *m != "may").collect();
    Regex::new(&format!(
        r"\b({})\b|\b(?:in|during|of|for|since|until|through)\s+(may)\b",
        unambiguous.join("|")
    ))
    .expect("month pattern")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Intent {
    /// Matched product keyword, lowercased.
    pub product: Option<String>,
    pub week: Option<u32>,
    pub year: Option<i32>,
    /// The whole question, lowercased, for phrase matching.
    pub question: String,
}

impl Intent {
    pub fn extract(question: &str) -> Self {
        let q = question.to_lowercase();

        let week = WEEK_RE
            .captures(&q)
            .and_then(|c| c[1].parse::<u32>().ok());
        let year = YEAR_RE
            .captures(question)
            .and_then(|c| c[1].parse::<i32>().ok());
        let product = PRODUCT_KEYWORDS
            .iter()
            .find(|kw| q.contains(*kw))
            .map(|kw| kw.to_string());

        Intent {
            product,
            week,
            year,
            question: q,
        }
    }

    pub fn period(&self) -> Period {
        Period::new(self.week, self.year)
    }

    /// Does the lowercased question contain `phrase`?
    ///
    /// A phrase padded with a space on a side only matches at a word boundary on
    /// that side: `" wow "` matches "wow, week 23" but not "wowza".
    pub fn mentions(&self, phrase: &str) -> bool {
        if phrase.starts_with(' ') || phrase.ends_with(' ') {
            let spaced: String = self
                .question
                .chars()
                .map(|c| if c.is_alphanumeric() { c } else { ' ' })
                .collect();
            return format!(" {} ", spaced).contains(phrase);
        }
        self.question.contains(phrase)
    }

    /// The two weeks of a comparison: "week 22 vs week 23", "week 22 and 23",
    /// otherwise the first two `week N` mentions.
    pub fn week_pair(&self) -> Option<(u32, u32)> {
        if let Some(c) = WEEK_PAIR_RE.captures(&self.question) {
            if let (Ok(a), Ok(b)) = (c[1].parse(), c[2].parse()) {
                return Some((a, b));
            }
        }
        let mut weeks = WEEK_RE
            .captures_iter(&self.question)
            .filter_map(|c| c[1].parse::<u32>().ok());
        Some((weeks.next()?, weeks.next()?))
    }

    /// "top 3", "worst 5", ...
    pub fn top_n(&self) -> Option<usize> {
        TOP_N_RE
            .captures(&self.question)
            .and_then(|c| c[1].parse::<usize>().ok())
            .filter(|n| *n > 0)
    }

    /// Vendor named after "by vendor", "from vendor" or "for vendor".
    pub fn vendor(&self) -> Option<String> {
        let name = VENDOR_RE.captures(&self.question)?.get(1)?.as_str();
        let name = name
            .trim_end_matches(|c: char| matches!(c, '.' | '\'' | '"'))
            .trim();
        (!name.is_empty()).then(|| name.to_string())
    }

    /// First full month name mentioned, as 1-12.
    pub fn month(&self) -> Option<u32> {
        let c = MONTH_RE.captures(&self.question)?;
        let name = c.get(1).or_else(|| c.get(2))?.as_str();
        MONTHS.iter().position(|m| *m == name).map(|i| i as u32 + 1)
    }
}
