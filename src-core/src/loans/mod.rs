pub mod loans_model;
pub mod loans_repository;
pub mod loans_service;
pub mod loans_traits;

pub use loans_model::{Loan, LoanUpdate, NewLoan};
pub use loans_repository::LoanRepository;
pub use loans_service::LoanService;
pub use loans_traits::{LoanRepositoryTrait, LoanServiceTrait};
