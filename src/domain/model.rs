use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One entry of the benefits registry list. Registry rows carry more columns
/// than these two, the rest are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardEntry {
    #[serde(rename = "CARDNO")]
    pub card_no: Option<String>,

    #[serde(rename = "HEAD OF THE FAMILY", default = "unknown_head")]
    pub head_name: String,
}

fn unknown_head() -> String {
    "Unknown".to_string()
}

impl CardEntry {
    /// Card number with empty/whitespace-only values treated as missing.
    pub fn card_no(&self) -> Option<&str> {
        self.card_no
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    Done,
    #[serde(rename = "Not Done")]
    NotDone,
    Unknown,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Done => write!(f, "Done"),
            TransactionStatus::NotDone => write!(f, "Not Done"),
            TransactionStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Output record for one card. Field names match the registry's own
/// spelling so downstream consumers of the registry JSON can reuse tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardResult {
    #[serde(rename = "CARDNO")]
    pub card_no: String,

    #[serde(rename = "HEAD OF THE FAMILY")]
    pub head_name: String,

    pub transaction_status: TransactionStatus,

    /// Per-commodity presence in the month's transaction table. Only present
    /// when a commodity watch list is configured and the portal page was
    /// fetched successfully.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commodities: Option<BTreeMap<String, bool>>,
}

/// Collected results of a run plus the counts reported in the summary.
#[derive(Debug, Clone, Default)]
pub struct CheckOutcome {
    pub results: Vec<CardResult>,
    pub done: usize,
    pub not_done: usize,
    pub unknown: usize,
    pub skipped: usize,
}

impl CheckOutcome {
    pub fn push(&mut self, result: CardResult) {
        match result.transaction_status {
            TransactionStatus::Done => self.done += 1,
            TransactionStatus::NotDone => self.not_done += 1,
            TransactionStatus::Unknown => self.unknown += 1,
        }
        self.results.push(result);
    }
}
