use async_trait::async_trait;

use crate::errors::Result;
use crate::loans::loans_model::{Loan, LoanChangeset, LoanUpdate, NewLoan, NewLoanDB};

pub trait LoanRepositoryTrait: Send + Sync {
    fn load_loans(&self, user_id: &str) -> Result<Vec<Loan>>;
    fn find_loan(&self, user_id: &str, loan_id: &str) -> Result<Option<Loan>>;
    fn insert_loan(&self, new_loan: NewLoanDB) -> Result<Loan>;
    /// Applies `changes` to the loan if `user_id` owns it.
    fn update_loan(
        &self,
        user_id: &str,
        loan_id: &str,
        changes: LoanChangeset,
    ) -> Result<Option<Loan>>;
    /// Number of rows removed; zero when the caller owns no such loan.
    fn delete_loan(&self, user_id: &str, loan_id: &str) -> Result<usize>;
}

#[async_trait]
pub trait LoanServiceTrait: Send + Sync {
    fn get_loans(&self, user_id: &str) -> Result<Vec<Loan>>;
    async fn create_loan(&self, user_id: &str, new_loan: NewLoan) -> Result<Loan>;
    async fn update_loan(&self, user_id: &str, loan_id: &str, update: LoanUpdate) -> Result<Loan>;
    async fn delete_loan(&self, user_id: &str, loan_id: &str) -> Result<()>;
}
