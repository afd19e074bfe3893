use serde::Serialize;
use serde_json::Value;

use loan_pmt_core::loan::PaymentFrequency;

#[derive(Debug, Serialize)]
struct FrequencyRow {
    cycle: &'static str,
    periods_per_year: u32,
}

pub fn run_frequencies() -> Result<Value, Box<dyn std::error::Error>> {
    let rows: Vec<FrequencyRow> = PaymentFrequency::ALL
        .iter()
        .map(|f| FrequencyRow {
            cycle: f.key(),
            periods_per_year: f.periods_per_year(),
        })
        .collect();
    Ok(serde_json::to_value(rows)?)
}
