pub mod budget_items_model;
pub mod budget_items_repository;
pub mod budget_items_service;
pub mod budget_items_traits;

pub use budget_items_model::{ItemKind, ItemRole, LineItem, FORMULAS_KEY};
pub use budget_items_repository::BudgetItemRepository;
pub use budget_items_service::BudgetItemService;
pub use budget_items_traits::{BudgetItemRepositoryTrait, BudgetItemServiceTrait};
