use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LoanPmtError;

/// How many level payments fall in each year of the loan term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum PaymentFrequency {
    /// One payment per year
    Annual,
    /// Two payments per year
    Semiannual,
    /// Three payments per year
    EveryFourMonths,
    /// Four payments per year
    Quarterly,
    /// Twelve payments per year
    Monthly,
}

impl PaymentFrequency {
    /// Every supported frequency, fewest payments per year first.
    pub const ALL: [PaymentFrequency; 5] = [
        PaymentFrequency::Annual,
        PaymentFrequency::Semiannual,
        PaymentFrequency::EveryFourMonths,
        PaymentFrequency::Quarterly,
        PaymentFrequency::Monthly,
    ];

    pub fn periods_per_year(&self) -> u32 {
        match self {
            PaymentFrequency::Annual => 1,
            PaymentFrequency::Semiannual => 2,
            PaymentFrequency::EveryFourMonths => 3,
            PaymentFrequency::Quarterly => 4,
            PaymentFrequency::Monthly => 12,
        }
    }

    /// Canonical lookup key, as accepted by `from_str` and emitted by serde.
    pub fn key(&self) -> &'static str {
        match self {
            PaymentFrequency::Annual => "annual",
            PaymentFrequency::Semiannual => "semiannual",
            PaymentFrequency::EveryFourMonths => "every-four-months",
            PaymentFrequency::Quarterly => "quarterly",
            PaymentFrequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PaymentFrequency {
    type Err = LoanPmtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let frequency = match normalized.as_str() {
            "annual" | "annually" | "yearly" => PaymentFrequency::Annual,
            "semiannual" | "semi-annual" | "bi-annual" | "biannual" => {
                PaymentFrequency::Semiannual
            }
            "every-four-months" | "every four months" | "thirdly" | "triannual" => {
                PaymentFrequency::EveryFourMonths
            }
            "quarterly" | "quaterly" => PaymentFrequency::Quarterly,
            "monthly" => PaymentFrequency::Monthly,
            _ => return Err(LoanPmtError::UnsupportedFrequency(s.to_string())),
        };
        Ok(frequency)
    }
}

impl TryFrom<String> for PaymentFrequency {
    type Error = LoanPmtError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
