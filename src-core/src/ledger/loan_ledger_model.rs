use serde::{Deserialize, Serialize};

/// Repayment activity of one loan in one budget year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanPayment {
    pub loan_id: String,
    pub loan_name: String,
    pub year: String,
    /// Sum of the year's linked expense cells.
    pub total_payment: f64,
    /// Principal left after this year's payments, never below zero.
    pub remaining: f64,
}
