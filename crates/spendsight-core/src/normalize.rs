//! Record normalization
//!
//! Maps backend rows of varying shape into [`TransactionRecord`]s:
//! - amount = |charged ?? original ?? 0|
//! - category = joined category ?? active category by id ?? legacy text ?? "Uncategorized"
//! - timestamps parsed from date-only, RFC 3339 or naive date-time strings
//!
//! Rows with an unparseable date are kept (they still count toward record
//! totals) but carry `timestamp: None`, which keeps them out of every window
//! and bucket.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};
use tracing::debug;

use crate::models::{Category, RawRecord, TransactionRecord, UNCATEGORIZED};

/// Options that affect how raw values are interpreted
#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions {
    /// Offset that zoned timestamps are converted to before use
    pub utc_offset: FixedOffset,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            utc_offset: Utc.fix(),
        }
    }
}

/// Normalize raw rows without an external category list
pub fn normalize(raw: &[RawRecord], opts: &NormalizeOptions) -> Vec<TransactionRecord> {
    normalize_with_categories(raw, &[], opts)
}

/// Normalize raw rows, resolving bare `category_id`s against `categories`
pub fn normalize_with_categories(
    raw: &[RawRecord],
    categories: &[Category],
    opts: &NormalizeOptions,
) -> Vec<TransactionRecord> {
    let by_id: HashMap<&str, &Category> = categories.iter().map(|c| (c.id.as_str(), c)).collect();

    let records: Vec<TransactionRecord> = raw
        .iter()
        .enumerate()
        .map(|(index, row)| normalize_record(index, row, &by_id, opts))
        .collect();

    let undated = records.iter().filter(|r| r.timestamp.is_none()).count();
    debug!(
        total = records.len(),
        undated, "Normalized transaction records"
    );

    records
}

fn normalize_record(
    index: usize,
    row: &RawRecord,
    categories: &HashMap<&str, &Category>,
    opts: &NormalizeOptions,
) -> TransactionRecord {
    let (timestamp, time_known) = match row.date.as_deref().and_then(|d| parse_timestamp(d, opts)) {
        Some((ts, known)) => (Some(ts), known),
        None => (None, false),
    };
    let created_at = row
        .created_at
        .as_deref()
        .and_then(|c| parse_timestamp(c, opts))
        .map(|(ts, _)| ts);

    let (category_name, category_color) = resolve_category(row, categories);

    TransactionRecord {
        id: record_id(index, row),
        timestamp,
        time_known,
        created_at,
        description: row.description.clone().unwrap_or_default(),
        amount: resolve_amount(row),
        category_id: row
            .category_id
            .clone()
            .or_else(|| row.linked_category.as_ref().and_then(|c| c.id.clone())),
        category_name,
        category_color,
        is_auto_categorized: row.is_ai_categorized,
        installment_memo: row.memo.clone().filter(|m| !m.trim().is_empty()),
        has_installment_info: row.installment_info.as_ref().is_some_and(is_truthy),
    }
}

/// |charged ?? original ?? 0|
pub fn resolve_amount(row: &RawRecord) -> f64 {
    row.charged_amount
        .or(row.original_amount)
        .filter(|a| a.is_finite())
        .unwrap_or(0.0)
        .abs()
}

fn resolve_category(
    row: &RawRecord,
    categories: &HashMap<&str, &Category>,
) -> (String, Option<String>) {
    if let Some(linked) = &row.linked_category {
        if let Some(name) = non_blank(linked.name.as_deref()) {
            return (name.to_string(), linked.color.clone());
        }
    }
    if let Some(category) = row
        .category_id
        .as_deref()
        .and_then(|id| categories.get(id))
    {
        if let Some(name) = non_blank(Some(&category.name)) {
            return (name.to_string(), category.color.clone());
        }
    }
    if let Some(name) = non_blank(row.category.as_deref()) {
        return (name.to_string(), None);
    }
    (UNCATEGORIZED.to_string(), None)
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn record_id(index: usize, row: &RawRecord) -> String {
    match (&row.identifier, &row.card_last4) {
        (Some(id), Some(card)) => format!("{}-{}", id, card),
        (Some(id), None) => id.clone(),
        (None, _) => format!("row-{}", index),
    }
}

/// Parse a timestamp, returning the local date-time and whether it carried a time
///
/// Accepts `YYYY-MM-DD`, RFC 3339 (converted to `opts.utc_offset`) and naive
/// `YYYY-MM-DD[T ]HH:MM:SS[.f]`.
pub fn parse_timestamp(value: &str, opts: &NormalizeOptions) -> Option<(NaiveDateTime, bool)> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|ts| (ts, false));
    }

    if let Ok(zoned) = DateTime::parse_from_rfc3339(value) {
        return Some((zoned.with_timezone(&opts.utc_offset).naive_local(), true));
    }

    // Postgres renders timestamptz as "2024-03-05 21:14:00+00"
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(zoned) = DateTime::parse_from_str(value, fmt) {
            return Some((zoned.with_timezone(&opts.utc_offset).naive_local(), true));
        }
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some((ts, true));
        }
    }

    None
}

/// JavaScript-style truthiness for loosely typed JSON columns
fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinkedCategory;
    use chrono::Timelike;

    fn raw(json: &str) -> RawRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_amount_priority() {
        let opts = NormalizeOptions::default();
        let records = normalize(
            &[
                raw(r#"{"chargedamount": -120.5, "originalamount": 99}"#),
                raw(r#"{"originalamount": -40}"#),
                raw(r#"{}"#),
                raw(r#"{"chargedamount": "n/a", "originalamount": "15"}"#),
                raw(r#"{"chargedamount": 0, "originalamount": 80}"#),
            ],
            &opts,
        );

        let amounts: Vec<f64> = records.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![120.5, 40.0, 0.0, 15.0, 0.0]);
        assert!(records.iter().all(|r| r.amount >= 0.0));
    }

    #[test]
    fn test_category_resolution_order() {
        let opts = NormalizeOptions::default();
        let categories = vec![Category {
            id: "5".to_string(),
            name: "Transport".to_string(),
            color: Some("#00ff00".to_string()),
            icon: None,
            active: true,
        }];

        let joined = RawRecord {
            linked_category: Some(LinkedCategory {
                name: Some("Food".to_string()),
                color: Some("#ff0000".to_string()),
                ..Default::default()
            }),
            category_id: Some("5".to_string()),
            ..Default::default()
        };
        let by_id = RawRecord {
            category_id: Some("5".to_string()),
            ..Default::default()
        };
        let legacy = RawRecord {
            category: Some("Misc".to_string()),
            ..Default::default()
        };
        let blank = RawRecord {
            linked_category: Some(LinkedCategory {
                name: Some("   ".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let records = normalize_with_categories(
            &[joined, by_id, legacy, blank, RawRecord::default()],
            &categories,
            &opts,
        );
        let names: Vec<&str> = records.iter().map(|r| r.category_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Food", "Transport", "Misc", UNCATEGORIZED, UNCATEGORIZED]
        );
        assert_eq!(records[0].category_color.as_deref(), Some("#ff0000"));
        assert_eq!(records[1].category_color.as_deref(), Some("#00ff00"));
    }

    #[test]
    fn test_unparseable_date_is_kept_without_timestamp() {
        let opts = NormalizeOptions::default();
        let records = normalize(
            &[
                raw(r#"{"identifier": "a", "date": "not a date", "chargedamount": 10}"#),
                raw(r#"{"identifier": "b", "date": "2024-03-05", "chargedamount": 10}"#),
            ],
            &opts,
        );
        assert_eq!(records.len(), 2);
        assert!(records[0].timestamp.is_none());
        assert!(records[1].timestamp.is_some());
        assert!(!records[1].time_known);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let opts = NormalizeOptions::default();

        let (ts, known) = parse_timestamp("2024-03-05", &opts).unwrap();
        assert_eq!(ts.hour(), 0);
        assert!(!known);

        let (ts, known) = parse_timestamp("2024-03-05T23:30:00", &opts).unwrap();
        assert_eq!(ts.hour(), 23);
        assert!(known);

        let (ts, _) = parse_timestamp("2024-03-05T21:00:00Z", &opts).unwrap();
        assert_eq!(ts.hour(), 21);

        let (ts, _) = parse_timestamp("2024-03-05 21:14:00.123+00", &opts).unwrap();
        assert_eq!(ts.hour(), 21);

        assert!(parse_timestamp("", &opts).is_none());
        assert!(parse_timestamp("05/03/2024", &opts).is_none());
    }

    #[test]
    fn test_rfc3339_converted_to_offset() {
        let opts = NormalizeOptions {
            utc_offset: FixedOffset::east_opt(2 * 3600).unwrap(),
        };
        let (ts, _) = parse_timestamp("2024-03-05T23:30:00Z", &opts).unwrap();
        assert_eq!(ts.hour(), 1);
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());
    }

    #[test]
    fn test_record_ids() {
        let opts = NormalizeOptions::default();
        let records = normalize(
            &[
                raw(r#"{"identifier": "tx1", "cardlast4": "4321"}"#),
                raw(r#"{"identifier": 77}"#),
                raw(r#"{"description": "no id"}"#),
            ],
            &opts,
        );
        assert_eq!(records[0].id, "tx1-4321");
        assert_eq!(records[1].id, "77");
        assert_eq!(records[2].id, "row-2");
    }

    #[test]
    fn test_installment_info_truthiness() {
        let opts = NormalizeOptions::default();
        let records = normalize(
            &[
                raw(r#"{"installment_info": {"number": 2, "total": 6}}"#),
                raw(r#"{"installment_info": ""}"#),
                raw(r#"{"installment_info": null}"#),
                raw(r#"{"memo": "תשלום 2 מתוך 6"}"#),
            ],
            &opts,
        );
        assert!(records[0].has_installment_info);
        assert!(!records[1].has_installment_info);
        assert!(!records[2].has_installment_info);
        assert!(records[3].is_installment());
    }
}
