//! Core types for the insight engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::fmt::whole;
use crate::trend::TrendLabel;

/// Severity level of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Nothing to report
    Success,
    /// Informational - no action needed
    Info,
    /// Worth attention but not urgent
    Warning,
    /// Spending well above the usual level
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }

    /// Numeric priority for sorting (higher = more urgent)
    pub fn priority(&self) -> u8 {
        match self {
            Severity::Success => 0,
            Severity::Info => 1,
            Severity::Warning => 2,
            Severity::Critical => 3,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Success => "✅",
            Severity::Info => "💡",
            Severity::Warning => "⚠️",
            Severity::Critical => "🚨",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Severity::Success),
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    CategorySpike,
    NightPurchases,
    DuplicateSubscription,
    AllClear,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::CategorySpike => "category_spike",
            AlertKind::NightPurchases => "night_purchases",
            AlertKind::DuplicateSubscription => "duplicate_subscription",
            AlertKind::AllClear => "all_clear",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Weekend,
    Frequent,
    Installments,
    Impulse,
}

impl PatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Weekend => "weekend",
            PatternKind::Frequent => "frequent",
            PatternKind::Installments => "installments",
            PatternKind::Impulse => "impulse",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    ReduceDelivery,
    ReviewSubscriptions,
    AvoidNightPurchases,
    TrackSubscriptions,
    PlannedShopping,
    KeepItUp,
}

impl RecommendationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationKind::ReduceDelivery => "reduce_delivery",
            RecommendationKind::ReviewSubscriptions => "review_subscriptions",
            RecommendationKind::AvoidNightPurchases => "avoid_night_purchases",
            RecommendationKind::TrackSubscriptions => "track_subscriptions",
            RecommendationKind::PlannedShopping => "planned_shopping",
            RecommendationKind::KeepItUp => "keep_it_up",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactPeriod {
    Month,
    Year,
}

impl ImpactPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactPeriod::Month => "month",
            ImpactPeriod::Year => "year",
        }
    }
}

/// Estimated money effect of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Impact {
    /// Extra spend caused by a pattern ("+150")
    Extra { amount: i64 },
    /// A single amount, optionally per period ("150/year")
    Amount {
        amount: i64,
        period: Option<ImpactPeriod>,
    },
    /// A savings range per period ("50-150/month")
    Range {
        low: i64,
        high: i64,
        period: ImpactPeriod,
    },
    /// Ongoing savings with no fixed figure
    Ongoing,
}

impl Impact {
    /// Human-readable form with a currency symbol
    pub fn render(&self, currency: &str) -> String {
        match self {
            Impact::Extra { amount } => format!("+{}{}", currency, whole(*amount as f64)),
            Impact::Amount { amount, period } => {
                let base = format!("{}{}", currency, whole(*amount as f64));
                match period {
                    Some(p) => format!("{}/{}", base, p.as_str()),
                    None => base,
                }
            }
            Impact::Range { low, high, period } => format!(
                "{}{}-{}/{}",
                currency,
                whole(*low as f64),
                whole(*high as f64),
                period.as_str()
            ),
            Impact::Ongoing => "Ongoing savings".to_string(),
        }
    }

    /// Whole amount carried by this impact, if any (upper bound for ranges)
    pub fn amount(&self) -> Option<i64> {
        match self {
            Impact::Extra { amount } | Impact::Amount { amount, .. } => Some(*amount),
            Impact::Range { high, .. } => Some(*high),
            Impact::Ongoing => None,
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(""))
    }
}

/// A rule-based alert about recent spending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: Severity,
    pub icon: String,
    pub title: String,
    pub description: String,
    pub impact: Option<Impact>,
}

impl Alert {
    pub fn new(
        kind: AlertKind,
        severity: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            icon: severity.icon().to_string(),
            title: title.into(),
            description: description.into(),
            impact: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_impact(mut self, impact: Impact) -> Self {
        self.impact = Some(impact);
        self
    }
}

/// A recurring spending habit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub kind: PatternKind,
    pub title: String,
    pub description: String,
    pub impact: Impact,
}

impl Pattern {
    pub fn new(
        kind: PatternKind,
        title: impl Into<String>,
        description: impl Into<String>,
        impact: Impact,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
            impact,
        }
    }
}

/// An actionable savings suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub icon: String,
    pub title: String,
    pub description: String,
    pub impact: Impact,
}

impl Recommendation {
    pub fn new(
        kind: RecommendationKind,
        icon: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        impact: Impact,
    ) -> Self {
        Self {
            kind,
            icon: icon.into(),
            title: title.into(),
            description: description.into(),
            impact,
        }
    }
}

/// One forecast horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Horizon label ("Next month", "In two months")
    pub month: String,
    pub amount: i64,
    pub confidence_percent: u8,
    pub trend: TrendLabel,
    /// Short human-readable trend note
    pub note: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_priority() {
        assert!(Severity::Critical.priority() > Severity::Warning.priority());
        assert!(Severity::Warning.priority() > Severity::Info.priority());
        assert!(Severity::Info.priority() > Severity::Success.priority());
    }

    #[test]
    fn test_severity_round_trips_through_str() {
        for severity in [
            Severity::Success,
            Severity::Info,
            Severity::Warning,
            Severity::Critical,
        ] {
            assert_eq!(severity.as_str().parse::<Severity>().unwrap(), severity);
        }
        assert!("alert".parse::<Severity>().is_err());
    }

    #[test]
    fn test_impact_rendering() {
        assert_eq!(Impact::Extra { amount: 150 }.render("₪"), "+₪150");
        assert_eq!(
            Impact::Amount {
                amount: 1340,
                period: Some(ImpactPeriod::Year)
            }
            .render("₪"),
            "₪1,340/year"
        );
        assert_eq!(
            Impact::Amount {
                amount: 89,
                period: None
            }
            .to_string(),
            "89"
        );
        assert_eq!(
            Impact::Range {
                low: 50,
                high: 150,
                period: ImpactPeriod::Month
            }
            .render("$"),
            "$50-150/month"
        );
        assert_eq!(Impact::Ongoing.render("₪"), "Ongoing savings");
    }

    #[test]
    fn test_alert_builder() {
        let alert = Alert::new(AlertKind::AllClear, Severity::Success, "All clear", "Nothing")
            .with_impact(Impact::Ongoing);
        assert_eq!(alert.icon, "✅");
        assert_eq!(alert.impact, Some(Impact::Ongoing));

        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["kind"], "all_clear");
        assert_eq!(json["severity"], "success");
        assert_eq!(json["impact"]["type"], "ongoing");
    }
}
