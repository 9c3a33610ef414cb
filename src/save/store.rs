use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

/// One stored scalar. TOML distinguishes the three shapes natively, so the
/// enum round-trips untagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Flat string-keyed scalar store backing save games.
///
/// Loads are lenient by policy: a missing key or a value of the wrong shape
/// resolves to the caller's default instead of an error. There is no schema
/// or version field; keys are built by concatenating an entity id and a
/// field suffix.
#[derive(Debug)]
pub struct PrefStore {
    path: PathBuf,
    values: BTreeMap<String, PrefValue>,
}

impl PrefStore {
    /// Opens the store at `path`, reading any existing snapshot. An
    /// unreadable or malformed file starts the store empty rather than
    /// failing.
    pub fn open(path: &Path) -> Self {
        let values = match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(values) => values,
                Err(e) => {
                    warn!("ignoring malformed save file {}: {e}", path.display());
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
        PrefStore {
            path: path.to_path_buf(),
            values,
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        match self.values.get(key) {
            Some(PrefValue::Int(v)) => *v,
            Some(PrefValue::Float(f)) => *f as i64,
            Some(PrefValue::Text(s)) => s.trim().parse().unwrap_or(default),
            None => default,
        }
    }

    pub fn get_float(&self, key: &str, default: f32) -> f32 {
        match self.values.get(key) {
            Some(PrefValue::Float(v)) => *v as f32,
            Some(PrefValue::Int(v)) => *v as f32,
            Some(PrefValue::Text(s)) => s.trim().parse().unwrap_or(default),
            None => default,
        }
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        match self.values.get(key) {
            Some(PrefValue::Text(s)) => s.clone(),
            Some(PrefValue::Int(v)) => v.to_string(),
            Some(PrefValue::Float(v)) => v.to_string(),
            None => default.to_string(),
        }
    }

    pub fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), PrefValue::Int(value));
    }

    pub fn set_float(&mut self, key: &str, value: f32) {
        self.values
            .insert(key.to_string(), PrefValue::Float(value as f64));
    }

    pub fn set_string(&mut self, key: &str, value: &str) {
        self.values
            .insert(key.to_string(), PrefValue::Text(value.to_string()));
    }

    /// Writes the snapshot to disk.
    pub fn save(&self) -> io::Result<()> {
        let content = toml::to_string(&self.values)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        std::fs::write(&self.path, content)
    }

    /// Wipes every key, in memory and on disk.
    pub fn delete_all(&mut self) -> io::Result<()> {
        self.values.clear();
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
