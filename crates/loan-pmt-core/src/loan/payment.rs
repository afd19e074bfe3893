use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::LoanPmtError;
use crate::loan::frequency::PaymentFrequency;
use crate::time_value;
use crate::types::*;
use crate::LoanPmtResult;

/// Input for a level-payment loan calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanParameters {
    /// Principal borrowed today
    pub present_value: Money,
    /// Loan term in years (may be fractional)
    pub payment_term: Years,
    /// Number of payments per year
    pub payment_cycle: PaymentFrequency,
    /// Nominal annual rate as a decimal (0.05 = 5%)
    pub annual_interest_rate: Rate,
    /// Balance still owed once the last level payment is made
    #[serde(default)]
    pub future_value: Money,
    #[serde(default)]
    pub payment_timing: PaymentTiming,
}

impl LoanParameters {
    /// A fully amortizing loan with payments at period end.
    pub fn new(
        present_value: Money,
        payment_term: Years,
        payment_cycle: PaymentFrequency,
        annual_interest_rate: Rate,
    ) -> Self {
        Self {
            present_value,
            payment_term,
            payment_cycle,
            annual_interest_rate,
            future_value: Decimal::ZERO,
            payment_timing: PaymentTiming::Ordinary,
        }
    }

    pub fn with_future_value(mut self, future_value: Money) -> Self {
        self.future_value = future_value;
        self
    }

    pub fn with_payment_timing(mut self, payment_timing: PaymentTiming) -> Self {
        self.payment_timing = payment_timing;
        self
    }

    pub fn total_periods(&self) -> LoanPmtResult<Decimal> {
        self.payment_term
            .checked_mul(Decimal::from(self.payment_cycle.periods_per_year()))
            .ok_or_else(|| {
                LoanPmtError::invalid(
                    "payment_term",
                    "Total number of periods exceeds decimal range",
                )
            })
    }

    /// Nominal rate pro-rated per period, not the compounding-equivalent rate.
    pub fn per_period_rate(&self) -> Rate {
        self.annual_interest_rate / Decimal::from(self.payment_cycle.periods_per_year())
    }

    pub fn validate(&self) -> LoanPmtResult<()> {
        if self.present_value <= Decimal::ZERO {
            return Err(LoanPmtError::invalid(
                "present_value",
                "Present value must be positive",
            ));
        }
        if self.payment_term <= Decimal::ZERO {
            return Err(LoanPmtError::invalid(
                "payment_term",
                "Payment term must be positive",
            ));
        }
        if self.annual_interest_rate < Decimal::ZERO {
            return Err(LoanPmtError::invalid(
                "annual_interest_rate",
                "Interest rate cannot be negative",
            ));
        }
        Ok(())
    }
}

/// Output of a level-payment loan calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSummary {
    /// Amount due each period
    pub payment: Money,
    pub payment_cycle: PaymentFrequency,
    pub payment_timing: PaymentTiming,
    pub periods_per_year: u32,
    pub total_periods: Decimal,
    pub per_period_rate: Rate,
    /// Sum of all level payments
    pub total_of_payments: Money,
    /// Level payments plus the final balance, less the principal
    pub total_interest: Money,
}

/// Level payment per period for a validated set of loan parameters.
///
/// Expressed through the signed `time_value::pmt`: the balance still owed
/// at term end is an outflow, and the result is flipped so that a loan
/// yields a positive payment.
pub fn periodic_payment(params: &LoanParameters) -> LoanPmtResult<Money> {
    params.validate()?;

    let payment = time_value::pmt(
        params.per_period_rate(),
        params.total_periods()?,
        params.present_value,
        -params.future_value,
        params.payment_timing,
    )?;

    Ok(-payment)
}

/// Periodic payment from loose arguments, with the cycle given as a key
/// such as `"monthly"` (matched case-insensitively).
pub fn compute_payment(
    present_value: Money,
    payment_term: Years,
    payment_cycle: &str,
    annual_interest_rate: Rate,
    future_value: Money,
    payment_timing: PaymentTiming,
) -> LoanPmtResult<Money> {
    let params = LoanParameters::new(
        present_value,
        payment_term,
        payment_cycle.parse()?,
        annual_interest_rate,
    )
    .with_future_value(future_value)
    .with_payment_timing(payment_timing);

    periodic_payment(&params)
}

/// Calculate the level payment together with term totals.
pub fn calculate_loan_payment(
    params: &LoanParameters,
) -> LoanPmtResult<ComputationOutput<PaymentSummary>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let payment = periodic_payment(params)?;

    let total_periods = params.total_periods()?;
    if !total_periods.fract().is_zero() {
        warnings.push(format!(
            "Term of {} years gives a fractional period count ({}); final period is partial",
            params.payment_term, total_periods
        ));
    }
    if params.annual_interest_rate.is_zero() {
        warnings.push("Zero interest rate; payment is straight-line principal".into());
    }
    if payment <= Decimal::ZERO {
        warnings.push(format!(
            "Future value {} is at least the accrued principal; payment is non-positive",
            params.future_value
        ));
    }

    let totals = payment.checked_mul(total_periods).and_then(|paid| {
        paid.checked_add(params.future_value)
            .and_then(|outlay| outlay.checked_sub(params.present_value))
            .map(|interest| (paid, interest))
    });
    let (total_of_payments, total_interest) = totals.ok_or_else(|| {
        LoanPmtError::invalid(
            "payment_term",
            "Total of payments over the term exceeds decimal range",
        )
    })?;

    let output = PaymentSummary {
        payment,
        payment_cycle: params.payment_cycle,
        payment_timing: params.payment_timing,
        periods_per_year: params.payment_cycle.periods_per_year(),
        total_periods,
        per_period_rate: params.per_period_rate(),
        total_of_payments,
        total_interest,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment annuity (PMT) at nominal rate pro-rated per period",
        &serde_json::json!({
            "present_value": params.present_value.to_string(),
            "payment_term": params.payment_term.to_string(),
            "payment_cycle": params.payment_cycle.key(),
            "annual_interest_rate": params.annual_interest_rate.to_string(),
            "future_value": params.future_value.to_string(),
            "payment_timing": params.payment_timing.key(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn car_loan() -> LoanParameters {
        LoanParameters::new(dec!(20000), dec!(4), PaymentFrequency::Monthly, dec!(0.05))
    }

    #[test]
    fn test_monthly_car_loan() {
        let payment = periodic_payment(&car_loan()).unwrap();
        assert!(
            (payment - dec!(460.5859)).abs() < dec!(0.0001),
            "Expected ~460.59, got {}",
            payment
        );
    }

    #[test]
    fn test_validation_fields() {
        let cases = [
            (car_loan().with_future_value(dec!(0)), None),
            (LoanParameters { present_value: dec!(0), ..car_loan() }, Some("present_value")),
            (LoanParameters { payment_term: dec!(-1), ..car_loan() }, Some("payment_term")),
            (
                LoanParameters { annual_interest_rate: dec!(-0.01), ..car_loan() },
                Some("annual_interest_rate"),
            ),
        ];
        for (params, expected) in cases {
            match (params.validate(), expected) {
                (Ok(()), None) => {}
                (Err(LoanPmtError::InvalidArgument { field, .. }), Some(f)) => assert_eq!(field, f),
                (other, _) => panic!("unexpected validation outcome {:?}", other),
            }
        }
    }

    #[test]
    fn test_balloon_reduces_payment() {
        let full = periodic_payment(&car_loan()).unwrap();
        let balloon = periodic_payment(&car_loan().with_future_value(dec!(5000))).unwrap();
        assert!(balloon < full);
        assert!(balloon > Decimal::ZERO);
    }

    #[test]
    fn test_summary_totals() {
        let out = calculate_loan_payment(&car_loan()).unwrap();
        let s = &out.result;
        assert_eq!(s.periods_per_year, 12);
        assert_eq!(s.total_periods, dec!(48));
        assert_eq!(s.total_of_payments, s.payment * dec!(48));
        assert!((s.total_interest - dec!(2108.12)).abs() < dec!(0.01));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_summary_warns_on_fractional_term() {
        let params = LoanParameters::new(dec!(1000), dec!(1.5), PaymentFrequency::Annual, dec!(0.04));
        let out = calculate_loan_payment(&params).unwrap();
        assert_eq!(out.result.total_periods, dec!(1.5));
        assert!(out.warnings.iter().any(|w| w.contains("fractional")));
    }

    #[test]
    fn test_parameters_deserialize_with_defaults() {
        let params: LoanParameters = serde_json::from_str(
            r#"{"present_value":"20000","payment_term":"4","payment_cycle":"Monthly","annual_interest_rate":"0.05"}"#,
        )
        .unwrap();
        assert_eq!(params, car_loan());
    }

    #[test]
    fn test_parameters_deserialize_timing_aliases() {
        let params: LoanParameters = serde_json::from_str(
            r#"{"present_value":"20000","payment_term":"4","payment_cycle":"monthly","annual_interest_rate":"0.05","payment_timing":"Annuity-Due"}"#,
        )
        .unwrap();
        assert_eq!(params.payment_timing, PaymentTiming::AnnuityDue);

        let params: LoanParameters = serde_json::from_str(
            r#"{"present_value":"20000","payment_term":"4","payment_cycle":"monthly","annual_interest_rate":"0.05","payment_timing":"1"}"#,
        )
        .unwrap();
        assert_eq!(params.payment_timing, PaymentTiming::AnnuityDue);
    }

    #[test]
    fn test_unknown_cycle_in_json_names_the_key() {
        let err = serde_json::from_str::<LoanParameters>(
            r#"{"present_value":"20000","payment_term":"4","payment_cycle":"biweekly","annual_interest_rate":"0.05"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Unsupported payment frequency: 'biweekly'"));
    }

    #[test]
    fn test_summary_warns_on_zero_rate() {
        let params = LoanParameters::new(dec!(12000), dec!(1), PaymentFrequency::Monthly, Decimal::ZERO);
        let out = calculate_loan_payment(&params).unwrap();
        assert_eq!(out.result.payment, dec!(1000));
        assert_eq!(out.result.total_interest, Decimal::ZERO);
        assert!(out.warnings.iter().any(|w| w.contains("Zero interest rate")));
    }

    #[test]
    fn test_summary_warns_on_non_positive_payment() {
        // 20000 grows to ~24418 over the term, so a 30000 balloon is never reached
        let params = car_loan().with_future_value(dec!(30000));
        let out = calculate_loan_payment(&params).unwrap();
        assert!(out.result.payment < Decimal::ZERO);
        assert!(out.warnings.iter().any(|w| w.contains("non-positive")));
    }

    #[test]
    fn test_oversized_principal_is_invalid_not_a_panic() {
        let err = compute_payment(
            Decimal::from_i128_with_scale(5 * 10_i128.pow(28), 0),
            Decimal::ONE,
            "annual",
            Decimal::ONE,
            Decimal::ZERO,
            PaymentTiming::Ordinary,
        )
        .unwrap_err();
        assert!(matches!(err, LoanPmtError::InvalidArgument { ref field, .. } if field == "present_value"));
    }

    #[test]
    fn test_oversized_term_is_invalid_not_a_panic() {
        let err = compute_payment(
            dec!(1000),
            Decimal::from_i128_with_scale(10_i128.pow(28), 0),
            "monthly",
            dec!(0.05),
            Decimal::ZERO,
            PaymentTiming::Ordinary,
        )
        .unwrap_err();
        assert!(matches!(err, LoanPmtError::InvalidArgument { ref field, .. } if field == "payment_term"));

        let term = Decimal::from_i128_with_scale(10_i128.pow(28), 0);
        let params = LoanParameters::new(dec!(1000), term, PaymentFrequency::Monthly, dec!(0.05));
        assert!(params.total_periods().is_err());
        assert!(calculate_loan_payment(&params).is_err());
    }
}
