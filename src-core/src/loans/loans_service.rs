use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::{Error, Result};
use crate::loans::loans_model::{Loan, LoanUpdate, NewLoan};
use crate::loans::loans_traits::{LoanRepositoryTrait, LoanServiceTrait};

pub struct LoanService<T: LoanRepositoryTrait> {
    loan_repo: Arc<T>,
}

impl<T: LoanRepositoryTrait> LoanService<T> {
    pub fn new(loan_repo: Arc<T>) -> Self {
        LoanService { loan_repo }
    }
}

fn loan_not_found(loan_id: &str) -> Error {
    Error::NotFound(format!("Loan '{}' not found", loan_id))
}

#[async_trait]
impl<T: LoanRepositoryTrait> LoanServiceTrait for LoanService<T> {
    fn get_loans(&self, user_id: &str) -> Result<Vec<Loan>> {
        self.loan_repo.load_loans(user_id)
    }

    async fn create_loan(&self, user_id: &str, new_loan: NewLoan) -> Result<Loan> {
        let new_loan = new_loan.validate(user_id)?;
        self.loan_repo.insert_loan(new_loan)
    }

    async fn update_loan(&self, user_id: &str, loan_id: &str, update: LoanUpdate) -> Result<Loan> {
        // Ownership first, so a foreign id is a 404 even when the body is invalid.
        if self.loan_repo.find_loan(user_id, loan_id)?.is_none() {
            return Err(loan_not_found(loan_id));
        }
        let changes = update.validate()?;
        self.loan_repo
            .update_loan(user_id, loan_id, changes)?
            .ok_or_else(|| loan_not_found(loan_id))
    }

    async fn delete_loan(&self, user_id: &str, loan_id: &str) -> Result<()> {
        match self.loan_repo.delete_loan(user_id, loan_id)? {
            0 => Err(loan_not_found(loan_id)),
            _ => Ok(()),
        }
    }
}
