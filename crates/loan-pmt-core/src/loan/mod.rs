pub mod frequency;
pub mod payment;

pub use frequency::PaymentFrequency;
pub use payment::{
    calculate_loan_payment, compute_payment, periodic_payment, LoanParameters, PaymentSummary,
};
