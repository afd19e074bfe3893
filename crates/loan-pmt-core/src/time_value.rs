use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::LoanPmtError;
use crate::types::{Money, PaymentTiming, Rate};
use crate::LoanPmtResult;

// Sign convention follows the spreadsheet functions: cash received is
// positive, cash paid out is negative. A loan of +20000 therefore has a
// negative payment. Rates are signed periodic rates and only need to
// stay above -100%.
//
// Every step uses checked arithmetic so that amounts beyond the decimal
// range come back as InvalidArgument instead of panicking.

fn out_of_range(field: &str, what: &str) -> LoanPmtError {
    LoanPmtError::invalid(field, format!("{what} exceeds decimal range"))
}

fn checked(value: Option<Decimal>, field: &str, what: &str) -> LoanPmtResult<Decimal> {
    value.ok_or_else(|| out_of_range(field, what))
}

/// Compound growth factor (1 + rate)^nper.
pub(crate) fn growth_factor(rate: Rate, nper: Decimal) -> LoanPmtResult<Decimal> {
    if rate <= dec!(-1) {
        return Err(LoanPmtError::invalid(
            "rate",
            "Periodic rate must be greater than -100%",
        ));
    }
    let base = checked(Decimal::ONE.checked_add(rate), "rate", "1 + rate")?;
    checked(
        base.checked_powd(nper),
        "rate",
        &format!("Growth factor (1 + {rate})^{nper}"),
    )
}

fn timing_adjustment(rate: Rate, timing: PaymentTiming) -> LoanPmtResult<Decimal> {
    match timing {
        PaymentTiming::Ordinary => Ok(Decimal::ONE),
        PaymentTiming::AnnuityDue => checked(Decimal::ONE.checked_add(rate), "rate", "1 + rate"),
    }
}

/// (g - 1) / rate, scaled for payment timing
fn annuity_factor(rate: Rate, growth: Decimal, timing: PaymentTiming) -> LoanPmtResult<Decimal> {
    let adjustment = timing_adjustment(rate, timing)?;
    let factor = (growth - Decimal::ONE)
        .checked_div(rate)
        .and_then(|f| f.checked_mul(adjustment));
    let factor = checked(factor, "rate", "Annuity factor")?;
    if factor.is_zero() {
        return Err(LoanPmtError::invalid(
            "rate",
            "Annuity factor underflows to zero; rate too small for this term",
        ));
    }
    Ok(factor)
}

fn check_nper(nper: Decimal) -> LoanPmtResult<()> {
    if nper <= Decimal::ZERO {
        return Err(LoanPmtError::invalid(
            "nper",
            "Number of periods must be > 0",
        ));
    }
    Ok(())
}

/// Payment (PMT)
///
/// `rate` is a signed periodic rate; anything above -100% is accepted.
/// `nper` may be fractional; the growth factor is then evaluated with a
/// decimal exponent.
pub fn pmt(
    rate: Rate,
    nper: Decimal,
    present_value: Money,
    future_value: Money,
    timing: PaymentTiming,
) -> LoanPmtResult<Money> {
    check_nper(nper)?;

    if rate.is_zero() {
        let owed = checked(
            present_value.checked_add(future_value),
            "present_value",
            "Present value plus future value",
        )?;
        return checked(owed.checked_div(nper), "present_value", "Straight-line payment").map(|p| -p);
    }

    let growth = growth_factor(rate, nper)?;
    let factor = annuity_factor(rate, growth, timing)?;

    let owed = present_value
        .checked_mul(growth)
        .and_then(|grown| grown.checked_add(future_value));
    let owed = checked(owed, "present_value", "Present value grown over the term")?;
    checked(owed.checked_div(factor), "present_value", "Payment").map(|p| -p)
}

/// Present Value
pub fn pv(
    rate: Rate,
    nper: Decimal,
    payment: Money,
    future_value: Money,
    timing: PaymentTiming,
) -> LoanPmtResult<Money> {
    check_nper(nper)?;

    if rate.is_zero() {
        let total = payment
            .checked_mul(nper)
            .and_then(|paid| paid.checked_add(future_value));
        return checked(total, "payment", "Total of payments").map(|t| -t);
    }

    let growth = growth_factor(rate, nper)?;
    let factor = annuity_factor(rate, growth, timing)?;

    let value = payment
        .checked_mul(factor)
        .and_then(|annuity| annuity.checked_add(future_value))
        .and_then(|total| total.checked_div(growth));
    checked(value, "payment", "Discounted payments").map(|v| -v)
}

/// Future Value
pub fn fv(
    rate: Rate,
    nper: Decimal,
    payment: Money,
    present_value: Money,
    timing: PaymentTiming,
) -> LoanPmtResult<Money> {
    check_nper(nper)?;

    if rate.is_zero() {
        let total = payment
            .checked_mul(nper)
            .and_then(|paid| present_value.checked_add(paid));
        return checked(total, "payment", "Total of payments").map(|t| -t);
    }

    let growth = growth_factor(rate, nper)?;
    let factor = annuity_factor(rate, growth, timing)?;

    let value = present_value
        .checked_mul(growth)
        .and_then(|grown| payment.checked_mul(factor).and_then(|paid| grown.checked_add(paid)));
    checked(value, "present_value", "Accumulated balance").map(|v| -v)
}
