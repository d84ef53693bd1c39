//! Transaction data sources
//!
//! The pipeline reads raw backend rows through the [`TransactionSource`]
//! trait, so a recorded JSON snapshot, the live REST backend and test mocks
//! are interchangeable.
//!
//! # Implementations
//!
//! - [`JsonFileSource`] - a snapshot exported to disk
//! - [`RestSource`] - a PostgREST-style backend (`/rest/v1/{table}`)

mod file;
mod rest;

pub use file::JsonFileSource;
pub use rest::RestSource;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::Result;
use crate::models::{Category, RawRecord};
use crate::window::month_start_offset;

/// Where raw transaction rows and the category list come from
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Rows dated on or after the first day of the month `window_months`
    /// before `now`, newest first
    async fn fetch_recent_transactions(
        &self,
        window_months: u32,
        now: NaiveDateTime,
    ) -> Result<Vec<RawRecord>>;

    /// Active categories, ordered by name
    async fn fetch_active_categories(&self) -> Result<Vec<Category>>;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// First calendar day included in a fetch
pub fn fetch_cutoff(window_months: u32, now: NaiveDateTime) -> chrono::NaiveDate {
    month_start_offset(now, window_months).date()
}
