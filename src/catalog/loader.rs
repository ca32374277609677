//! Loading content collections from `<dir>/<key>.json`.
//!
//! Each file is shaped `{"<key>": [ {...}, ... ]}`. A missing file is created
//! with an empty array, a malformed file is logged and treated as empty, and
//! individual records that fail to parse are skipped.

use crate::utils::persistence::save_json;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub const CLASSES_KEY: &str = "classes";
pub const RELICS_KEY: &str = "relics";
pub const PERKS_KEY: &str = "perks";
pub const CONSUMABLES_KEY: &str = "consumables";
pub const ENCOUNTERS_KEY: &str = "encounters";
pub const ACHIEVEMENTS_KEY: &str = "achievements";
pub const CHALLENGE_MODES_KEY: &str = "challenge_modes";
pub const QUESTIONS_KEY: &str = "questions";

/// Path of the collection file for `key`.
pub fn collection_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{}.json", key))
}

/// Loads every parsable record stored under `key`.
pub fn load_records<T: DeserializeOwned>(dir: &Path, key: &str) -> Vec<T> {
    let path = collection_path(dir, key);

    if !path.exists() {
        tracing::debug!("Creating empty catalog file {}", path.display());
        if let Err(e) = save_json(&path, &serde_json::json!({ key: [] })) {
            tracing::warn!("Could not create {}: {}", path.display(), e);
        }
        return Vec::new();
    }

    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Could not read {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    let document: Value = match serde_json::from_str(&text) {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!("Malformed catalog file {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    let Some(entries) = document.get(key).and_then(Value::as_array) else {
        tracing::warn!("Catalog file {} has no \"{}\" array", path.display(), key);
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match T::deserialize(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(
                    "Skipping {} record #{} in {}: {}",
                    key,
                    index,
                    path.display(),
                    e
                );
                None
            }
        })
        .collect()
}
