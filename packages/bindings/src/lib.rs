use napi::Result as NapiResult;
use napi_derive::napi;

use loan_pmt_core::loan::{self, LoanParameters, PaymentFrequency};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Loan payments
// ---------------------------------------------------------------------------

/// Periodic payment only, as a decimal string. Cycle and timing keys go
/// through the same lenient parsers as the CLI.
#[napi]
pub fn compute_payment(input_json: String) -> NapiResult<String> {
    let input: LoanParameters = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let payment = loan::periodic_payment(&input).map_err(to_napi_error)?;
    Ok(payment.to_string())
}

/// Payment with term totals in the standard output envelope.
#[napi]
pub fn calculate_loan_payment(input_json: String) -> NapiResult<String> {
    let input: LoanParameters = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loan::calculate_loan_payment(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn payment_frequencies() -> NapiResult<String> {
    let rows: Vec<serde_json::Value> = PaymentFrequency::ALL
        .iter()
        .map(|f| {
            serde_json::json!({
                "cycle": f.key(),
                "periods_per_year": f.periods_per_year(),
            })
        })
        .collect();
    serde_json::to_string(&rows).map_err(to_napi_error)
}
