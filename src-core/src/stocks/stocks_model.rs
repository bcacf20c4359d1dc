use serde::{Deserialize, Serialize};

use crate::months::MonthlyValues;

/// A manually tracked holding: its value per month of one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockEntry {
    pub id: String,
    pub name: String,
    pub year: String,
    #[serde(default)]
    pub months: MonthlyValues,
}

impl StockEntry {
    pub fn new(name: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            year: year.into(),
            months: MonthlyValues::new(),
        }
    }
}
