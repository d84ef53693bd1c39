//! Domain models for spendsight

use std::sync::OnceLock;

use chrono::{NaiveDateTime, Timelike};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

/// Category name used when a record has no resolvable category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Memo marker the card issuer uses for installment plans ("3 מתוך 12")
pub const INSTALLMENT_MARKER: &str = "מתוך";

/// A transaction row as returned by the backend
///
/// Every field is optional. Amounts and identifiers are read leniently:
/// numbers and numeric strings are accepted, anything else reads as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub identifier: Option<String>,
    #[serde(default, rename = "cardlast4", deserialize_with = "lenient_string")]
    pub card_last4: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "originalamount", deserialize_with = "lenient_amount")]
    pub original_amount: Option<f64>,
    #[serde(default, rename = "chargedamount", deserialize_with = "lenient_amount")]
    pub charged_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category_id: Option<String>,
    /// Legacy free-text category column
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_ai_categorized: bool,
    #[serde(default)]
    pub installment_info: Option<serde_json::Value>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Category joined through `category_id`
    #[serde(default, rename = "categories")]
    pub linked_category: Option<LinkedCategory>,
}

/// Category fields embedded in a transaction row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkedCategory {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// A spending category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "required_lenient_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default = "default_true", rename = "is_active", alias = "active")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// A transaction after normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Opaque key (external identifier plus card suffix)
    pub id: String,
    /// Effective date; `None` when the source value could not be parsed
    pub timestamp: Option<NaiveDateTime>,
    /// Whether `timestamp` carried a time of day
    pub time_known: bool,
    /// When the row was created upstream
    pub created_at: Option<NaiveDateTime>,
    pub description: String,
    /// Non-negative magnitude
    pub amount: f64,
    pub category_id: Option<String>,
    pub category_name: String,
    pub category_color: Option<String>,
    pub is_auto_categorized: bool,
    pub installment_memo: Option<String>,
    pub has_installment_info: bool,
}

/// Best available hour for a purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseHour {
    /// Hour taken from `created_at` or a timestamp with a time of day
    Known(u32),
    /// Only a calendar date is available
    DateOnly,
    /// No usable timestamp at all
    Unknown,
}

impl TransactionRecord {
    /// Create a dated record with sensible defaults (mostly for tests and fixtures)
    pub fn new(id: impl Into<String>, timestamp: NaiveDateTime, amount: f64) -> Self {
        Self {
            id: id.into(),
            timestamp: Some(timestamp),
            time_known: false,
            created_at: None,
            description: String::new(),
            amount: amount.abs(),
            category_id: None,
            category_name: UNCATEGORIZED.to_string(),
            category_color: None,
            is_auto_categorized: false,
            installment_memo: None,
            has_installment_info: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, name: impl Into<String>) -> Self {
        self.category_name = name.into();
        self
    }

    pub fn with_created_at(mut self, created_at: NaiveDateTime) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_time_known(mut self) -> Self {
        self.time_known = true;
        self
    }

    pub fn with_auto_categorized(mut self, auto: bool) -> Self {
        self.is_auto_categorized = auto;
        self
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.installment_memo = Some(memo.into());
        self
    }

    /// Calendar date of the record, if it has one
    pub fn date(&self) -> Option<chrono::NaiveDate> {
        self.timestamp.map(|ts| ts.date())
    }

    /// Hour used by the night-purchase heuristics
    ///
    /// `created_at` wins over the effective date, matching how the backend
    /// stamps card-issuer imports.
    pub fn purchase_hour(&self) -> PurchaseHour {
        if let Some(created) = self.created_at {
            return PurchaseHour::Known(created.hour());
        }
        match self.timestamp {
            Some(ts) if self.time_known => PurchaseHour::Known(ts.hour()),
            Some(_) => PurchaseHour::DateOnly,
            None => PurchaseHour::Unknown,
        }
    }

    /// Whether the record belongs to an installment plan
    pub fn is_installment(&self) -> bool {
        if self.has_installment_info {
            return true;
        }
        self.installment_memo.as_deref().is_some_and(|memo| {
            memo.contains(INSTALLMENT_MARKER) || InstallmentProgress::parse(memo).is_some()
        })
    }

    /// Parsed installment progress from the memo, if any
    pub fn installment_progress(&self) -> Option<InstallmentProgress> {
        self.installment_memo.as_deref().and_then(InstallmentProgress::parse)
    }
}

/// "k of n" installment progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentProgress {
    pub current: u32,
    pub total: u32,
}

impl InstallmentProgress {
    /// Parse progress from a memo like "3 מתוך 12" or "3 of 12"
    pub fn parse(memo: &str) -> Option<Self> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let re = PATTERN.get_or_init(|| {
            Regex::new(r"(\d+)\s*(?:מתוך|of)\s*(\d+)").expect("installment pattern is valid")
        });
        let caps = re.captures(memo)?;
        let current = caps.get(1)?.as_str().parse().ok()?;
        let total = caps.get(2)?.as_str().parse().ok()?;
        Some(Self { current, total })
    }

    /// Payments left after this one (never negative)
    pub fn remaining(&self) -> u32 {
        self.total.saturating_sub(self.current)
    }

    pub fn is_last(&self) -> bool {
        self.remaining() == 0
    }
}

impl std::fmt::Display for InstallmentProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_last() {
            write!(f, "{}/{} - last", self.current, self.total)
        } else {
            write!(f, "{}/{} - {} left", self.current, self.total, self.remaining())
        }
    }
}

/// Read a number or a numeric string; anything else is `None`
fn lenient_amount<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let amount = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(amount.filter(|a| a.is_finite()))
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn required_lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_string(deserializer)?.ok_or_else(|| serde::de::Error::custom("missing id"))
}

fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(matches!(value, Some(serde_json::Value::Bool(true))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_raw_record_lenient_amounts() {
        let raw: RawRecord = serde_json::from_str(
            r#"{"identifier": 42, "chargedamount": "12.50", "originalamount": "abc"}"#,
        )
        .unwrap();
        assert_eq!(raw.identifier.as_deref(), Some("42"));
        assert_eq!(raw.charged_amount, Some(12.5));
        assert_eq!(raw.original_amount, None);
        assert!(!raw.is_ai_categorized);
    }

    #[test]
    fn test_raw_record_joined_category() {
        let raw: RawRecord = serde_json::from_str(
            r##"{"categories": {"id": 7, "name": "Food", "color": "#ff0000"}, "is_ai_categorized": true}"##,
        )
        .unwrap();
        let cat = raw.linked_category.unwrap();
        assert_eq!(cat.id.as_deref(), Some("7"));
        assert_eq!(cat.name.as_deref(), Some("Food"));
        assert!(raw.is_ai_categorized);
    }

    #[test]
    fn test_category_defaults_active() {
        let cat: Category = serde_json::from_str(r#"{"id": 3, "name": "Transport"}"#).unwrap();
        assert_eq!(cat.id, "3");
        assert!(cat.active);

        let cat: Category =
            serde_json::from_str(r#"{"id": "x", "name": "Old", "is_active": false}"#).unwrap();
        assert!(!cat.active);
    }

    #[test]
    fn test_purchase_hour_prefers_created_at() {
        let record = TransactionRecord::new("a", at(0, 0), 10.0).with_created_at(at(23, 30));
        assert_eq!(record.purchase_hour(), PurchaseHour::Known(23));

        let record = TransactionRecord::new("b", at(14, 0), 10.0).with_time_known();
        assert_eq!(record.purchase_hour(), PurchaseHour::Known(14));

        let record = TransactionRecord::new("c", at(0, 0), 10.0);
        assert_eq!(record.purchase_hour(), PurchaseHour::DateOnly);

        let mut record = TransactionRecord::new("d", at(0, 0), 10.0);
        record.timestamp = None;
        assert_eq!(record.purchase_hour(), PurchaseHour::Unknown);
    }

    #[test]
    fn test_installment_progress_parse() {
        let p = InstallmentProgress::parse("תשלום 3 מתוך 12").unwrap();
        assert_eq!(p, InstallmentProgress { current: 3, total: 12 });
        assert_eq!(p.remaining(), 9);
        assert_eq!(p.to_string(), "3/12 - 9 left");

        let p = InstallmentProgress::parse("payment 6 of 6").unwrap();
        assert!(p.is_last());
        assert_eq!(p.to_string(), "6/6 - last");

        assert!(InstallmentProgress::parse("one-off").is_none());
    }

    #[test]
    fn test_is_installment() {
        let base = TransactionRecord::new("a", at(10, 0), 10.0);
        assert!(!base.is_installment());
        assert!(base.clone().with_memo("2 מתוך 3").is_installment());
        assert!(base.clone().with_memo("installment 2 of 3").is_installment());

        let mut flagged = base;
        flagged.has_installment_info = true;
        assert!(flagged.is_installment());
    }
}
