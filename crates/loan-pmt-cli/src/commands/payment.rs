use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use tracing::{debug, info};

use loan_pmt_core::loan::{self, LoanParameters, PaymentFrequency, PaymentSummary};
use loan_pmt_core::PaymentTiming;

use crate::input;

/// Arguments for the periodic payment calculation
#[derive(Args)]
pub struct PaymentArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed today
    #[arg(long, allow_hyphen_values = true)]
    pub present_value: Option<Decimal>,

    /// Loan term in years
    #[arg(long, allow_hyphen_values = true)]
    pub term: Option<Decimal>,

    /// Payment cycle: annual, semiannual, every-four-months, quarterly, monthly
    #[arg(long)]
    pub cycle: Option<String>,

    /// Nominal annual interest rate as a decimal (0.05 = 5%)
    #[arg(long, allow_hyphen_values = true)]
    pub rate: Option<Decimal>,

    /// Balance still owed at the end of the term
    #[arg(long, allow_hyphen_values = true)]
    pub future_value: Option<Decimal>,

    /// Payment timing: ordinary (period end) or annuity-due (period start)
    #[arg(long)]
    pub timing: Option<String>,
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params: LoanParameters = if let Some(ref path) = args.input {
        info!(path = %path, "reading loan parameters from file");
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        info!("reading loan parameters from stdin");
        serde_json::from_value(data)?
    } else {
        params_from_flags(&args)?
    };
    debug!(?params, "resolved loan parameters");

    let output = loan::calculate_loan_payment(&params)?;
    let description = describe_scenario(&params, &output.result);

    let mut value = serde_json::to_value(output)?;
    if let Some(result) = value.get_mut("result").and_then(Value::as_object_mut) {
        result.insert("description".into(), Value::String(description));
    }
    Ok(value)
}

fn params_from_flags(args: &PaymentArgs) -> Result<LoanParameters, Box<dyn std::error::Error>> {
    let present_value = args
        .present_value
        .ok_or("--present-value is required (or provide --input)")?;
    let term = args.term.ok_or("--term is required (or provide --input)")?;
    let cycle: PaymentFrequency = args
        .cycle
        .as_deref()
        .ok_or("--cycle is required (or provide --input)")?
        .parse()?;
    let rate = args.rate.ok_or("--rate is required (or provide --input)")?;
    let timing: PaymentTiming = match args.timing.as_deref() {
        Some(t) => t.parse()?,
        None => PaymentTiming::default(),
    };

    Ok(LoanParameters::new(present_value, term, cycle, rate)
        .with_future_value(args.future_value.unwrap_or_default())
        .with_payment_timing(timing))
}

/// One-sentence narrative of the loan scenario.
fn describe_scenario(params: &LoanParameters, summary: &PaymentSummary) -> String {
    let timing = match params.payment_timing {
        PaymentTiming::Ordinary => "at the end of each period",
        PaymentTiming::AnnuityDue => "at the start of each period",
    };
    let balloon = if params.future_value.is_zero() {
        String::new()
    } else {
        format!(", leaving {} owed at maturity", params.future_value.round_dp(2))
    };
    let rate = match params.annual_interest_rate.checked_mul(dec!(100)) {
        Some(pct) => format!("{}%", pct.normalize()),
        None => params.annual_interest_rate.to_string(),
    };
    format!(
        "A loan of {} over {} years at {} nominal annual interest, repaid {} ({} payments {}), \
         costs {} per payment{}.",
        params.present_value.round_dp(2),
        params.payment_term.normalize(),
        rate,
        params.payment_cycle,
        summary.total_periods.normalize(),
        timing,
        summary.payment.round_dp(2),
        balloon,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn flags() -> PaymentArgs {
        PaymentArgs {
            input: None,
            present_value: Some(dec!(20000)),
            term: Some(dec!(4)),
            cycle: Some("Monthly".into()),
            rate: Some(dec!(0.05)),
            future_value: None,
            timing: None,
        }
    }

    #[test]
    fn test_flags_build_default_parameters() {
        let params = params_from_flags(&flags()).unwrap();
        assert_eq!(
            params,
            LoanParameters::new(dec!(20000), dec!(4), PaymentFrequency::Monthly, dec!(0.05))
        );
    }

    #[test]
    fn test_flags_reject_unknown_cycle() {
        let args = PaymentArgs {
            cycle: Some("biweekly".into()),
            ..flags()
        };
        let err = params_from_flags(&args).unwrap_err();
        assert!(err.to_string().contains("biweekly"));
    }

    #[test]
    fn test_flags_require_rate() {
        let args = PaymentArgs {
            rate: None,
            ..flags()
        };
        assert!(params_from_flags(&args).is_err());
    }

    #[test]
    fn test_description_mentions_payment() {
        let params = params_from_flags(&flags()).unwrap();
        let summary = loan::calculate_loan_payment(&params).unwrap().result;
        let text = describe_scenario(&params, &summary);
        assert!(text.contains("20000"));
        assert!(text.contains("5%"));
        assert!(text.contains("monthly"));
        assert!(text.contains("48 payments"));
        assert!(text.contains("460.59"));
    }

    #[test]
    fn test_run_payment_reads_input_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"present_value":"20000","payment_term":"4","payment_cycle":"Monthly","annual_interest_rate":"0.05","future_value":"5000","payment_timing":"annuity-due"}}"#
        )
        .unwrap();

        let args = PaymentArgs {
            input: Some(file.path().to_string_lossy().into_owned()),
            present_value: None,
            term: None,
            cycle: None,
            rate: None,
            future_value: None,
            timing: None,
        };
        let value = run_payment(args).unwrap();

        let result = &value["result"];
        assert_eq!(result["payment_cycle"], "monthly");
        assert_eq!(result["payment_timing"], "annuity-due");
        let payment: Decimal = result["payment"].as_str().unwrap().parse().unwrap();
        let expected = loan::compute_payment(
            dec!(20000),
            dec!(4),
            "monthly",
            dec!(0.05),
            dec!(5000),
            PaymentTiming::AnnuityDue,
        )
        .unwrap();
        assert_eq!(payment, expected);

        let description = result["description"].as_str().unwrap();
        assert!(description.contains("start of each period"));
        assert!(description.contains("leaving 5000 owed at maturity"));
    }

    #[test]
    fn test_run_payment_reports_bad_input_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"present_value":"1","payment_term":"1","payment_cycle":"weekly","annual_interest_rate":"0"}}"#).unwrap();
        let args = PaymentArgs {
            input: Some(file.path().to_string_lossy().into_owned()),
            ..flags()
        };
        let err = run_payment(args).unwrap_err();
        assert!(err.to_string().contains("weekly"));
    }

    #[test]
    fn test_read_json_missing_file() {
        let err = input::file::read_json::<LoanParameters>("/nonexistent/loan.json").unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
