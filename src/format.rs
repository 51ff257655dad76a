//! Number and period rendering shared by answers and the digest.

use crate::metrics::Period;

/// Whole values print without decimals, everything else with two.
pub fn number(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{:.0}", v)
    } else {
        format!("{:.2}", v)
    }
}

pub fn opt_number(v: Option<f64>) -> String {
    v.map(number).unwrap_or_else(|| "no data".to_string())
}

/// Explicit sign for deltas: "+15", "-2.50", "0".
pub fn signed(v: f64) -> String {
    if v > 0.0 {
        format!("+{}", number(v))
    } else {
        number(v)
    }
}

pub fn opt_signed(v: Option<f64>) -> String {
    v.map(signed).unwrap_or_else(|| "no data".to_string())
}

/// "lettuce" -> "Lettuce".
pub fn title(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// "in week 23", "in week 23 of 2024", "in 2024" or "across all weeks".
pub fn period(p: Period) -> String {
    match (p.week, p.year) {
        (Some(w), Some(y)) => format!("in week {} of {}", w, y),
        (Some(w), None) => format!("in week {}", w),
        (None, Some(y)) => format!("in {}", y),
        (None, None) => "across all weeks".to_string(),
    }
}

/// Numbered list, one entry per line.
pub fn ranked<V>(entries: &[(String, V)], value: impl Fn(&V) -> String) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(i, (name, v))| format!("{}. {}: {}", i + 1, name, value(v)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers() {
        assert_eq!(number(25.0), "25");
        assert_eq!(number(-0.0), "0");
        assert_eq!(number(3.14159), "3.14");
        assert_eq!(number(-2.5), "-2.50");
        assert_eq!(opt_number(None), "no data");
        assert_eq!(signed(15.0), "+15");
        assert_eq!(signed(-0.5), "-0.50");
        assert_eq!(opt_signed(None), "no data");
        assert_eq!(title("lettuce"), "Lettuce");
        assert_eq!(title(""), "");
    }

    #[test]
    fn periods() {
        assert_eq!(period(Period::week(23)), "in week 23");
        assert_eq!(period(Period::new(Some(1), Some(2025))), "in week 1 of 2025");
        assert_eq!(period(Period::new(None, Some(2024))), "in 2024");
        assert_eq!(period(Period::ALL), "across all weeks");
    }

    #[test]
    fn ranked_list() {
        let entries = vec![("Kale".to_string(), 3i64), ("Basil".to_string(), 1)];
        assert_eq!(ranked(&entries, |v| v.to_string()), "1. Kale: 3\n2. Basil: 1");
    }
}
