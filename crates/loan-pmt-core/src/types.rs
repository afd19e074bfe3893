use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LoanPmtError;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Year fractions or counts
pub type Years = Decimal;

/// When each payment falls within its period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum PaymentTiming {
    /// Payment at the end of each period
    #[default]
    Ordinary,
    /// Payment at the start of each period
    AnnuityDue,
}

impl PaymentTiming {
    pub fn key(&self) -> &'static str {
        match self {
            PaymentTiming::Ordinary => "ordinary",
            PaymentTiming::AnnuityDue => "annuity-due",
        }
    }
}

impl fmt::Display for PaymentTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PaymentTiming {
    type Err = LoanPmtError;

    /// Accepts the spreadsheet `type` flag (0/1) as well as the named forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ordinary" | "end" | "0" => Ok(PaymentTiming::Ordinary),
            "annuity-due" | "annuity_due" | "due" | "begin" | "start" | "1" => {
                Ok(PaymentTiming::AnnuityDue)
            }
            other => Err(LoanPmtError::invalid(
                "payment_timing",
                format!("'{other}' is not one of ordinary, annuity-due"),
            )),
        }
    }
}

impl TryFrom<String> for PaymentTiming {
    type Error = LoanPmtError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
