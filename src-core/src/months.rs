//! Calendar months and the twelve-bucket value map used by line items and stocks.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Zero-based position in the calendar year.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Month> {
        Self::ALL.get(index).copied()
    }

    pub fn from_date(date: NaiveDate) -> Month {
        Self::ALL[date.month0() as usize]
    }

    pub fn key(self) -> &'static str {
        match self {
            Month::January => "january",
            Month::February => "february",
            Month::March => "march",
            Month::April => "april",
            Month::May => "may",
            Month::June => "june",
            Month::July => "july",
            Month::August => "august",
            Month::September => "september",
            Month::October => "october",
            Month::November => "november",
            Month::December => "december",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Month {
    type Err = String;

    /// Accepts the full name or the three-letter abbreviation, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Month::ALL
            .iter()
            .copied()
            .find(|m| m.key() == lower || (lower.len() == 3 && m.key().starts_with(&lower)))
            .ok_or_else(|| format!("Unknown month '{}'", s))
    }
}

/// Twelve monthly amounts, zero by default.
///
/// Serialized as a `{ "january": 0.0, ... }` map. Unknown keys are ignored on input
/// so that callers can embed auxiliary entries in the same object.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MonthlyValues([f64; 12]);

impl MonthlyValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_array(values: [f64; 12]) -> Self {
        Self(values)
    }

    pub fn get(&self, month: Month) -> f64 {
        self.0[month.index()]
    }

    pub fn set(&mut self, month: Month, value: f64) {
        self.0[month.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Month, f64)> + '_ {
        Month::ALL.iter().map(move |m| (*m, self.0[m.index()]))
    }

    pub fn as_array(&self) -> &[f64; 12] {
        &self.0
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|v| *v == 0.0)
    }

    pub fn clear(&mut self) {
        self.0 = [0.0; 12];
    }

    /// Builds values from a JSON object, skipping keys that are not month names and
    /// treating non-numeric values as zero.
    pub fn from_json_map(map: &serde_json::Map<String, serde_json::Value>) -> Self {
        let mut values = Self::new();
        for (key, value) in map {
            if let Ok(month) = key.parse::<Month>() {
                values.set(month, json_number(value));
            }
        }
        values
    }

    pub fn to_json_map(&self) -> serde_json::Map<String, serde_json::Value> {
        self.iter()
            .map(|(m, v)| (m.key().to_string(), serde_json::json!(v)))
            .collect()
    }
}

fn json_number(value: &serde_json::Value) -> f64 {
    match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

impl Serialize for MonthlyValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(12))?;
        for (month, value) in self.iter() {
            map.serialize_entry(month.key(), &value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MonthlyValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MonthlyValuesVisitor;

        impl<'de> Visitor<'de> for MonthlyValuesVisitor {
            type Value = MonthlyValues;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of month names to numbers")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut values = MonthlyValues::new();
                while let Some(key) = access.next_key::<String>()? {
                    let raw: serde_json::Value = access.next_value()?;
                    if let Ok(month) = key.parse::<Month>() {
                        values.set(month, json_number(&raw));
                    }
                }
                Ok(values)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(MonthlyValues::new())
            }
        }

        deserializer.deserialize_any(MonthlyValuesVisitor)
    }
}

/// Month → formula string. Only months with a formula are present.
pub type MonthlyFormulas = BTreeMap<Month, String>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_and_short_names() {
        assert_eq!("July".parse::<Month>().unwrap(), Month::July);
        assert_eq!("jul".parse::<Month>().unwrap(), Month::July);
        assert_eq!(" DECEMBER ".parse::<Month>().unwrap(), Month::December);
        assert!("ju".parse::<Month>().is_err());
        assert!("__formulas".parse::<Month>().is_err());
    }

    #[test]
    fn month_from_date() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
        assert_eq!(Month::from_date(date), Month::July);
        assert_eq!(Month::July.index(), 6);
    }

    #[test]
    fn deserialize_ignores_unknown_keys_and_defaults_missing() {
        let values: MonthlyValues = serde_json::from_str(
            r#"{"january": 10, "march": "2.5", "__formulas": {"january": "=5+5"}}"#,
        )
        .unwrap();
        assert_eq!(values.get(Month::January), 10.0);
        assert_eq!(values.get(Month::February), 0.0);
        assert_eq!(values.get(Month::March), 2.5);
        assert_eq!(values.total(), 12.5);
    }

    #[test]
    fn serializes_all_twelve_months() {
        let mut values = MonthlyValues::new();
        values.set(Month::May, 3.0);
        let json = serde_json::to_value(values).unwrap();
        let map = json.as_object().unwrap();
        assert_eq!(map.len(), 12);
        assert_eq!(map["may"], serde_json::json!(3.0));
        assert_eq!(map["june"], serde_json::json!(0.0));
    }
}
