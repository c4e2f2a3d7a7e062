use crate::domain::model::TransactionStatus;
use crate::utils::error::{CheckError, Result};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::BTreeMap;

/// Lowercase English name of the current local month, e.g. "october".
pub fn current_month() -> String {
    chrono::Local::now().format("%B").to_string().to_lowercase()
}

/// Pattern matching a commodity cell like "FRice (KG)" anywhere in a
/// flattened table. The portal sometimes pads the unit with spaces.
pub fn commodity_regex(name: &str) -> Result<Regex> {
    Regex::new(&format!(r"(?i)\b{}\s*\(kg\)", regex::escape(name))).map_err(|e| {
        CheckError::ProcessingError {
            message: format!("Invalid commodity pattern for '{}': {}", name, e),
        }
    })
}

/// Finds the month's "Transaction Details" table and returns its flattened
/// text. Tables are visited in document order and the first match wins, so a
/// page listing several months resolves to the earliest matching table.
pub fn month_table_text(html: &str, month: &str) -> Option<String> {
    let table_selector = Selector::parse("table").ok()?;
    let document = Html::parse_document(html);

    for table in document.select(&table_selector) {
        let text = table
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        let lower = text.to_lowercase();
        if lower.contains("transaction details") && lower.contains(month) {
            return Some(text);
        }
    }

    None
}

/// Resolves the status from the month table, if any. A fetched page without
/// a matching table means nothing was distributed this month.
pub fn classify_table(table_text: Option<&str>, commodity: &Regex) -> TransactionStatus {
    match table_text {
        Some(text) if commodity.is_match(text) => TransactionStatus::Done,
        _ => TransactionStatus::NotDone,
    }
}

/// Presence map over a configured commodity watch list. With no matching
/// month table every commodity reports false.
pub fn commodity_presence(
    table_text: Option<&str>,
    watch_list: &[(String, Regex)],
) -> BTreeMap<String, bool> {
    watch_list
        .iter()
        .map(|(name, pattern)| {
            let present = table_text.map(|t| pattern.is_match(t)).unwrap_or(false);
            (name.clone(), present)
        })
        .collect()
}
