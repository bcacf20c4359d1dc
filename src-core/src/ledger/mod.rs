pub mod loan_ledger;
pub mod loan_ledger_model;

pub use loan_ledger::{build_loan_ledger, rows_for_year, yearly_payment};
pub use loan_ledger_model::LoanPayment;
