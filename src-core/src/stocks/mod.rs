pub mod stock_book;
pub mod stocks_model;

pub use stock_book::StockBook;
pub use stocks_model::StockEntry;
