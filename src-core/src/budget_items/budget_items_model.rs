use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::formula;
use crate::months::{Month, MonthlyFormulas, MonthlyValues};

/// Reserved key under which formulas ride along inside the stored month map.
pub const FORMULAS_KEY: &str = "__formulas";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Income,
    Expense,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Income => "income",
            ItemKind::Expense => "expense",
        }
    }

    /// Lenient reading for stored rows: anything but `income` is an expense.
    pub fn parse(value: &str) -> ItemKind {
        value.parse().unwrap_or(ItemKind::Expense)
    }
}

impl FromStr for ItemKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("income") {
            Ok(ItemKind::Income)
        } else if value.eq_ignore_ascii_case("expense") {
            Ok(ItemKind::Expense)
        } else {
            Err(format!("unknown item type '{}'", value))
        }
    }
}

/// What an item is for, beyond its kind. Decided once when the item enters the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ItemRole {
    #[default]
    None,
    /// Repayment of one of the user's loans.
    #[serde(rename_all = "camelCase")]
    LoanLinked { loan_id: String },
    /// One-off ("fun") expense: `price` lands in the month of `date`.
    #[serde(rename_all = "camelCase")]
    StaticExpense { date: NaiveDate, price: f64 },
}

impl ItemRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemRole::None => "none",
            ItemRole::LoanLinked { .. } => "loanLinked",
            ItemRole::StaticExpense { .. } => "staticExpense",
        }
    }

    pub fn loan_id(&self) -> Option<&str> {
        match self {
            ItemRole::LoanLinked { loan_id } => Some(loan_id),
            _ => None,
        }
    }
}

/// One row of a yearly budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "LineItemInput")]
pub struct LineItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub months: MonthlyValues,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub formulas: MonthlyFormulas,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    pub role: ItemRole,
}

impl LineItem {
    pub fn new(name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            kind,
            months: MonthlyValues::new(),
            formulas: BTreeMap::new(),
            frequency: None,
            role: ItemRole::None,
        }
    }

    pub fn with_role(mut self, role: ItemRole) -> Self {
        self.role = role;
        self.normalize();
        self
    }

    pub fn with_value(mut self, month: Month, value: f64) -> Self {
        self.months.set(month, value);
        self
    }

    pub fn is_static_expense(&self) -> bool {
        matches!(self.role, ItemRole::StaticExpense { .. })
    }

    pub fn linked_loan_id(&self) -> Option<&str> {
        self.role.loan_id()
    }

    /// Partition rank used for insertion ordering. Loan rows, which are not stored
    /// items, always sit after rank 3.
    pub fn rank(&self) -> u8 {
        match (self.kind, &self.role) {
            (ItemKind::Income, _) => 0,
            (ItemKind::Expense, ItemRole::None) => 1,
            (ItemKind::Expense, ItemRole::LoanLinked { .. }) => 2,
            (ItemKind::Expense, ItemRole::StaticExpense { .. }) => 3,
        }
    }

    /// Formula result if the cell has a formula, otherwise the stored value.
    pub fn cell_value(&self, month: Month) -> f64 {
        match self.formulas.get(&month) {
            Some(f) => formula::evaluate_or_zero(f),
            None => self.months.get(month),
        }
    }

    pub fn resolved_months(&self) -> MonthlyValues {
        let mut values = MonthlyValues::new();
        for month in Month::ALL {
            values.set(month, self.cell_value(month));
        }
        values
    }

    /// Brings derived state in line with the role and formulas:
    /// income items carry no role, a static expense owns exactly one month bucket,
    /// and every formula's result is written to its month.
    pub fn normalize(&mut self) {
        if self.kind == ItemKind::Income {
            self.role = ItemRole::None;
        }
        if let ItemRole::StaticExpense { date, price } = &self.role {
            self.months.clear();
            self.months.set(Month::from_date(*date), *price);
            self.formulas.clear();
        }
        self.formulas.retain(|_, f| formula::is_formula(f));
        for (month, f) in &self.formulas {
            self.months.set(*month, formula::evaluate_or_zero(f));
        }
    }
}

/// Accepts both the `role` field and the flat legacy fields
/// (`linkedLoanId`, `isStaticExpense`, `staticDate`/`date`, `staticPrice`/`price`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineItemInput {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type", alias = "kind", default)]
    kind: Option<String>,
    #[serde(default)]
    months: Option<serde_json::Value>,
    #[serde(default)]
    formulas: Option<serde_json::Value>,
    #[serde(default)]
    frequency: Option<String>,
    #[serde(default)]
    role: Option<ItemRole>,
    #[serde(default)]
    linked_loan_id: Option<String>,
    #[serde(default, alias = "date")]
    static_date: Option<String>,
    #[serde(default, alias = "price")]
    static_price: Option<f64>,
}

impl TryFrom<LineItemInput> for LineItem {
    type Error = String;

    fn try_from(input: LineItemInput) -> Result<Self, Self::Error> {
        let kind = match input.kind.as_deref() {
            Some(raw) => raw.parse()?,
            None => ItemKind::Expense,
        };
        let months_map = match &input.months {
            Some(serde_json::Value::Object(map)) => Some(map),
            _ => None,
        };
        let months = months_map
            .map(MonthlyValues::from_json_map)
            .unwrap_or_default();

        // Formulas may arrive on their own or still embedded in the month map.
        let mut formulas = input.formulas.as_ref().map(parse_formulas).unwrap_or_default();
        if let Some(embedded) = months_map.and_then(|m| m.get(FORMULAS_KEY)) {
            for (month, f) in parse_formulas(embedded) {
                formulas.entry(month).or_insert(f);
            }
        }

        let role = input.role.unwrap_or_else(|| {
            legacy_role(
                input.linked_loan_id.as_deref(),
                input.static_date.as_deref(),
                input.static_price,
            )
        });

        let mut item = LineItem {
            id: input
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            name: input.name.unwrap_or_default(),
            kind,
            months,
            formulas,
            frequency: input.frequency.filter(|f| !f.trim().is_empty()),
            role,
        };
        item.normalize();
        Ok(item)
    }
}

/// Derives a role from the flat fields: a static expense needs both a valid date
/// and a price; otherwise a non-empty loan id makes it loan-linked.
pub fn legacy_role(
    linked_loan_id: Option<&str>,
    static_date: Option<&str>,
    static_price: Option<f64>,
) -> ItemRole {
    if let (Some(date), Some(price)) = (static_date.and_then(parse_item_date), static_price) {
        return ItemRole::StaticExpense { date, price };
    }
    match linked_loan_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(loan_id) => ItemRole::LoanLinked {
            loan_id: loan_id.to_string(),
        },
        None => ItemRole::None,
    }
}

/// Parses `YYYY-MM-DD`, also accepting a full ISO timestamp.
pub fn parse_item_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let day = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn parse_formulas(value: &serde_json::Value) -> MonthlyFormulas {
    let mut formulas = BTreeMap::new();
    if let serde_json::Value::Object(map) = value {
        for (key, raw) in map {
            if let (Ok(month), Some(text)) = (key.parse::<Month>(), raw.as_str()) {
                if !text.trim().is_empty() {
                    formulas.insert(month, text.to_string());
                }
            }
        }
    }
    formulas
}

/// Row in `budget_items`.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::budget_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BudgetItemDB {
    pub id: i32,
    pub budget_id: String,
    pub user_id: String,
    pub year: String,
    pub item_id: String,
    pub name: String,
    pub item_type: String,
    pub frequency: Option<String>,
    pub position: i32,
    pub months_json: String,
    pub role: String,
    pub linked_loan_id: Option<String>,
    pub static_date: Option<String>,
    pub static_price: Option<f64>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::budget_items)]
pub struct NewBudgetItemDB {
    pub budget_id: String,
    pub user_id: String,
    pub year: String,
    pub item_id: String,
    pub name: String,
    pub item_type: String,
    pub frequency: Option<String>,
    pub position: i32,
    pub months_json: String,
    pub role: String,
    pub linked_loan_id: Option<String>,
    pub static_date: Option<String>,
    pub static_price: Option<f64>,
}

impl NewBudgetItemDB {
    pub fn from_item(
        item: &LineItem,
        budget_id: &str,
        user_id: &str,
        year: &str,
        position: i32,
    ) -> Self {
        let mut months = item.months.to_json_map();
        if !item.formulas.is_empty() {
            let formulas: serde_json::Map<String, serde_json::Value> = item
                .formulas
                .iter()
                .map(|(m, f)| (m.key().to_string(), serde_json::Value::String(f.clone())))
                .collect();
            months.insert(FORMULAS_KEY.to_string(), serde_json::Value::Object(formulas));
        }

        let (linked_loan_id, static_date, static_price) = match &item.role {
            ItemRole::None => (None, None, None),
            ItemRole::LoanLinked { loan_id } => (Some(loan_id.clone()), None, None),
            ItemRole::StaticExpense { date, price } => (
                None,
                Some(date.format("%Y-%m-%d").to_string()),
                Some(*price),
            ),
        };

        Self {
            budget_id: budget_id.to_string(),
            user_id: user_id.to_string(),
            year: year.to_string(),
            item_id: item.id.clone(),
            name: item.name.clone(),
            item_type: item.kind.as_str().to_string(),
            frequency: item.frequency.clone(),
            position,
            months_json: serde_json::Value::Object(months).to_string(),
            role: item.role.as_str().to_string(),
            linked_loan_id,
            static_date,
            static_price,
        }
    }
}

impl From<BudgetItemDB> for LineItem {
    fn from(row: BudgetItemDB) -> Self {
        let stored: serde_json::Value =
            serde_json::from_str(&row.months_json).unwrap_or(serde_json::Value::Null);
        let (months, formulas) = match &stored {
            serde_json::Value::Object(map) => (
                MonthlyValues::from_json_map(map),
                map.get(FORMULAS_KEY).map(parse_formulas).unwrap_or_default(),
            ),
            _ => (MonthlyValues::new(), BTreeMap::new()),
        };

        let role = match row.role.as_str() {
            "loanLinked" | "staticExpense" => legacy_role(
                row.linked_loan_id.as_deref(),
                row.static_date.as_deref(),
                row.static_price,
            ),
            _ => ItemRole::None,
        };

        let mut item = LineItem {
            id: row.item_id,
            name: row.name,
            kind: ItemKind::parse(&row.item_type),
            months,
            formulas,
            frequency: row.frequency,
            role,
        };
        item.normalize();
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_static_fields_become_static_role() {
        let item: LineItem = serde_json::from_value(json!({
            "id": "fun-1",
            "name": "Concert",
            "type": "expense",
            "months": {},
            "isStaticExpense": false,
            "date": "2025-07-15",
            "price": 42
        }))
        .unwrap();

        assert!(item.is_static_expense());
        assert_eq!(item.months.get(Month::July), 42.0);
        assert_eq!(item.months.total(), 42.0);
        assert_eq!(item.rank(), 3);
    }

    #[test]
    fn static_flag_without_price_is_repaired_away() {
        let item: LineItem = serde_json::from_value(json!({
            "id": "x",
            "name": "Half filled",
            "type": "expense",
            "isStaticExpense": true,
            "staticDate": "2025-03-01"
        }))
        .unwrap();
        assert_eq!(item.role, ItemRole::None);
    }

    #[test]
    fn linked_loan_id_becomes_loan_role() {
        let item: LineItem = serde_json::from_value(json!({
            "id": "car",
            "name": "Car loan",
            "type": "expense",
            "linkedLoanId": "loan-1",
            "months": {"january": 300}
        }))
        .unwrap();
        assert_eq!(item.linked_loan_id(), Some("loan-1"));
        assert_eq!(item.rank(), 2);
    }

    #[test]
    fn item_type_must_be_known() {
        let err = serde_json::from_value::<LineItem>(json!({
            "name": "Salary",
            "type": "incme"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("unknown item type 'incme'"));

        let shouted: LineItem =
            serde_json::from_value(json!({ "name": "Salary", "type": "INCOME" })).unwrap();
        assert_eq!(shouted.kind, ItemKind::Income);
        let untyped: LineItem = serde_json::from_value(json!({ "name": "Misc" })).unwrap();
        assert_eq!(untyped.kind, ItemKind::Expense);
        assert_eq!(ItemKind::parse("legacy"), ItemKind::Expense);
    }

    #[test]
    fn income_items_never_carry_a_role() {
        let item: LineItem = serde_json::from_value(json!({
            "name": "Salary",
            "type": "income",
            "role": {"type": "loanLinked", "loanId": "loan-1"}
        }))
        .unwrap();
        assert_eq!(item.role, ItemRole::None);
        assert!(!item.id.is_empty());
    }

    #[test]
    fn formulas_override_stored_values() {
        let item: LineItem = serde_json::from_value(json!({
            "id": "groceries",
            "name": "Groceries",
            "type": "expense",
            "months": {"january": 1, "february": 7},
            "formulas": {"january": "=100+50", "february": "12"}
        }))
        .unwrap();
        assert_eq!(item.months.get(Month::January), 150.0);
        assert_eq!(item.months.get(Month::February), 7.0);
        assert_eq!(item.formulas.len(), 1);
        assert_eq!(item.cell_value(Month::January), 150.0);
    }

    #[test]
    fn storage_row_round_trips_with_embedded_formulas() {
        let mut item = LineItem::new("Rent", ItemKind::Expense).with_value(Month::March, 900.0);
        item.formulas.insert(Month::April, "=450*2".to_string());
        item.frequency = Some("monthly".to_string());
        item.normalize();

        let row = NewBudgetItemDB::from_item(&item, "b1", "user", "2025", 0);
        let stored: serde_json::Value = serde_json::from_str(&row.months_json).unwrap();
        assert_eq!(stored[FORMULAS_KEY]["april"], json!("=450*2"));

        let loaded = LineItem::from(BudgetItemDB {
            id: 1,
            budget_id: row.budget_id,
            user_id: row.user_id,
            year: row.year,
            item_id: row.item_id,
            name: row.name,
            item_type: row.item_type,
            frequency: row.frequency,
            position: row.position,
            months_json: row.months_json,
            role: row.role,
            linked_loan_id: row.linked_loan_id,
            static_date: row.static_date,
            static_price: row.static_price,
        });
        assert_eq!(loaded, item);
    }

    #[test]
    fn role_serializes_as_tagged_object() {
        let role = ItemRole::StaticExpense {
            date: NaiveDate::from_ymd_opt(2025, 7, 15).unwrap(),
            price: 42.0,
        };
        assert_eq!(
            serde_json::to_value(&role).unwrap(),
            json!({"type": "staticExpense", "date": "2025-07-15", "price": 42.0})
        );
    }
}
