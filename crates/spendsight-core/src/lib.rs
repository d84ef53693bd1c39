//! Spendsight Core Library
//!
//! Shared functionality for the spendsight personal finance dashboard:
//! - Record normalization from backend rows of varying shape
//! - Rolling windows, calendar buckets and insertion-ordered aggregation
//! - Trend classification and a dampened spend forecast
//! - Rule-based alerts, patterns and savings recommendations
//! - Dashboard KPIs and chart series
//! - Pluggable transaction sources (JSON snapshot file, REST backend)
//! - Client for the optional categorization suggestion service

pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fmt;
pub mod insights;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod source;
pub mod suggestions;
pub mod trend;
pub mod window;

/// Test utilities including mock backend and suggestion servers
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use aggregate::{Bucket, BucketMap};
pub use config::AppConfig;
pub use dashboard::{DashboardConfig, DashboardSummary};
pub use error::{Error, Result};
pub use insights::{
    Alert, AnalysisContext, Impact, InsightConfig, InsightEngine, InsightSnapshot, Pattern,
    Prediction, Recommendation, Severity,
};
pub use models::{Category, InstallmentProgress, RawRecord, TransactionRecord, UNCATEGORIZED};
pub use normalize::{normalize, normalize_with_categories, NormalizeOptions};
pub use source::{JsonFileSource, RestSource, TransactionSource};
pub use suggestions::{NewBusiness, Suggestion, SuggestionClient, SuggestionService};
pub use trend::{Trend, TrendLabel, TrendPolicy};
pub use window::MonthKey;
