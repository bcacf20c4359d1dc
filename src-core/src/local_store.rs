//! Client-local key/value storage in a single JSON file.
//!
//! Holds state that never reaches the server: stock entries, the active budget
//! year and the preferred currency.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::currency::{Currency, DEFAULT_CURRENCY_CODE};
use crate::errors::Result;

pub const STOCKS_KEY: &str = "stocks";
pub const ACTIVE_BUDGET_KEY: &str = "activeBudget";
pub const CURRENCY_KEY: &str = "currency";

const TMP_SUFFIX: &str = "tmp";

#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let data = fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&data)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }

    fn write_all(&self, map: &Map<String, Value>) -> Result<()> {
        let data = serde_json::to_string_pretty(map)?;
        write_atomic(&self.path, &data)
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_all()?.remove(key) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let mut map = self.read_all()?;
        map.insert(key.to_string(), serde_json::to_value(value)?);
        self.write_all(&map)
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let mut map = self.read_all()?;
        if map.remove(key).is_some() {
            self.write_all(&map)?;
        }
        Ok(())
    }

    pub fn active_budget(&self) -> Result<Option<String>> {
        self.get(ACTIVE_BUDGET_KEY)
    }

    pub fn set_active_budget(&self, year: Option<&str>) -> Result<()> {
        match year {
            Some(year) => self.set(ACTIVE_BUDGET_KEY, &year),
            None => self.remove(ACTIVE_BUDGET_KEY),
        }
    }

    pub fn currency_code(&self) -> Result<String> {
        Ok(self
            .get::<String>(CURRENCY_KEY)?
            .unwrap_or_else(|| DEFAULT_CURRENCY_CODE.to_string()))
    }

    pub fn currency(&self) -> Result<Currency> {
        Ok(Currency::from_code_or_generic(&self.currency_code()?))
    }

    pub fn set_currency(&self, code: &str) -> Result<()> {
        self.set(CURRENCY_KEY, &code.trim().to_uppercase())
    }
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    let tmp = path.with_extension(TMP_SUFFIX);
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(data.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}
