pub mod frequencies;
pub mod payment;
