use std::sync::Arc;

use diesel::prelude::*;
use log::debug;

use crate::db::{get_connection, DbPool};
use crate::errors::{Error, Result};
use crate::loans::loans_model::{Loan, LoanChangeset, NewLoanDB};
use crate::loans::loans_traits::LoanRepositoryTrait;
use crate::schema::loans;

const MAX_ID_ATTEMPTS: usize = 5;

pub struct LoanRepository {
    pool: Arc<DbPool>,
}

impl LoanRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        LoanRepository { pool }
    }
}

impl LoanRepositoryTrait for LoanRepository {
    fn load_loans(&self, user_id: &str) -> Result<Vec<Loan>> {
        let mut conn = get_connection(&self.pool)?;
        let loans = loans::table
            .filter(loans::user_id.eq(user_id))
            .order((loans::start_date.asc(), loans::name.asc()))
            .select(Loan::as_select())
            .load::<Loan>(&mut conn)?;
        Ok(loans)
    }

    fn find_loan(&self, user_id: &str, loan_id: &str) -> Result<Option<Loan>> {
        let mut conn = get_connection(&self.pool)?;
        let loan = loans::table
            .filter(loans::id.eq(loan_id))
            .filter(loans::user_id.eq(user_id))
            .select(Loan::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(loan)
    }

    fn insert_loan(&self, new_loan: NewLoanDB) -> Result<Loan> {
        let mut conn = get_connection(&self.pool)?;
        let base_id = new_loan.id.clone();
        let mut candidate = new_loan;

        // Ids are derived from the creation timestamp; two loans created in the
        // same millisecond get a numeric suffix.
        for attempt in 1..=MAX_ID_ATTEMPTS {
            match diesel::insert_into(loans::table)
                .values(&candidate)
                .returning(Loan::as_returning())
                .get_result(&mut conn)
            {
                Ok(loan) => {
                    debug!("Created loan {} for user {}", loan.id, loan.user_id);
                    return Ok(loan);
                }
                Err(e) if Error::is_unique_violation(&e) && attempt < MAX_ID_ATTEMPTS => {
                    candidate.id = format!("{}-{}", base_id, attempt);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(Error::invalid_input("Could not allocate a loan id"))
    }

    fn update_loan(
        &self,
        user_id: &str,
        loan_id: &str,
        changes: LoanChangeset,
    ) -> Result<Option<Loan>> {
        let mut conn = get_connection(&self.pool)?;
        let updated = diesel::update(
            loans::table
                .filter(loans::id.eq(loan_id))
                .filter(loans::user_id.eq(user_id)),
        )
        .set(&changes)
        .returning(Loan::as_returning())
        .get_result(&mut conn)
        .optional()?;
        Ok(updated)
    }

    fn delete_loan(&self, user_id: &str, loan_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        let removed = diesel::delete(
            loans::table
                .filter(loans::id.eq(loan_id))
                .filter(loans::user_id.eq(user_id)),
        )
        .execute(&mut conn)?;
        Ok(removed)
    }
}
