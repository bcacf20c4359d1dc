use log::debug;

use crate::budgets::budgets_model::sort_years;
use crate::errors::{Error, Result};
use crate::local_store::{LocalStore, STOCKS_KEY};
use crate::months::{Month, MonthlyValues};
use crate::stocks::stocks_model::StockEntry;

/// Stock entries kept in the local store. Every mutation is written through.
pub struct StockBook {
    store: LocalStore,
    entries: Vec<StockEntry>,
}

impl StockBook {
    pub fn load(store: LocalStore) -> Result<Self> {
        let entries = store.get::<Vec<StockEntry>>(STOCKS_KEY)?.unwrap_or_default();
        debug!("Loaded {} stock entr(ies)", entries.len());
        Ok(Self { store, entries })
    }

    fn persist(&self) -> Result<()> {
        self.store.set(STOCKS_KEY, &self.entries)
    }

    pub fn entries(&self) -> &[StockEntry] {
        &self.entries
    }

    pub fn for_year<'a>(&'a self, year: &'a str) -> impl Iterator<Item = &'a StockEntry> + 'a {
        self.entries.iter().filter(move |e| e.year == year)
    }

    /// Distinct years with entries, ascending.
    pub fn years(&self) -> Vec<String> {
        let mut years: Vec<String> = self.entries.iter().map(|e| e.year.clone()).collect();
        sort_years(&mut years);
        years.dedup();
        years
    }

    pub fn add(&mut self, name: &str, year: &str) -> Result<&StockEntry> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::missing_field("name"));
        }
        self.entries.push(StockEntry::new(name, year.trim()));
        self.persist()?;
        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn set_value(&mut self, id: &str, month: Month, value: f64) -> Result<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| Error::NotFound(format!("Stock '{}' not found", id)))?;
        entry.months.set(month, value);
        self.persist()
    }

    pub fn remove(&mut self, id: &str) -> Result<()> {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        if self.entries.len() == before {
            return Err(Error::NotFound(format!("Stock '{}' not found", id)));
        }
        self.persist()
    }

    /// Sum of all holdings per month for `year`.
    pub fn monthly_totals(&self, year: &str) -> MonthlyValues {
        let mut totals = MonthlyValues::new();
        for entry in self.for_year(year) {
            for (month, value) in entry.months.iter() {
                totals.set(month, totals.get(month) + value);
            }
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_written_through_and_totalled() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path().join("local.json")).unwrap();

        let mut book = StockBook::load(store.clone()).unwrap();
        let a = book.add("ACME", "2025").unwrap().id.clone();
        let b = book.add("Globex", "2025").unwrap().id.clone();
        book.add("Initech", "2024").unwrap();
        book.set_value(&a, Month::March, 100.0).unwrap();
        book.set_value(&b, Month::March, 50.5).unwrap();

        let reloaded = StockBook::load(store).unwrap();
        assert_eq!(reloaded.entries().len(), 3);
        assert_eq!(reloaded.monthly_totals("2025").get(Month::March), 150.5);
        assert_eq!(reloaded.monthly_totals("2024").total(), 0.0);
        assert_eq!(reloaded.years(), vec!["2024", "2025"]);
    }

    #[test]
    fn remove_unknown_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path().join("local.json")).unwrap();
        let mut book = StockBook::load(store).unwrap();
        assert!(matches!(book.remove("nope"), Err(Error::NotFound(_))));
        assert!(book.add("  ", "2025").is_err());
    }
}
