use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::store_io::write_text_atomic;
use crate::world::PlayerId;

#[derive(Debug, Error)]
pub enum PropertyError {
    #[error("property {name} is not registered")]
    Unregistered { name: String },
    #[error("value for {name} is {actual} bytes, bound is {max}")]
    ValueTooLong {
        name: String,
        max: usize,
        actual: usize,
    },
    #[error("failed to write property save at {path}: {source}")]
    WriteSave {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read property save at {path}: {source}")]
    ReadSave {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("property save at {path} is not valid JSON: {source}")]
    ParseSave {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode property save: {0}")]
    EncodeSave(#[source] serde_json::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SavedPropertyStore {
    registered: HashMap<String, usize>,
    values: HashMap<u64, HashMap<String, String>>,
}

/// Per-player string properties with registered length bounds.
/// Values persist across a player's disconnect until explicitly cleared.
#[derive(Debug, Default)]
pub struct PropertyStore {
    registered: HashMap<String, usize>,
    values: HashMap<u64, HashMap<String, String>>,
}

impl PropertyStore {
    pub fn register(&mut self, name: &str, max_len: usize) {
        self.registered.insert(name.to_string(), max_len);
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registered.contains_key(name)
    }

    /// `Some(value)` writes, `None` clears. Oversized values are rejected
    /// whole rather than truncated.
    pub fn set(
        &mut self,
        player_id: PlayerId,
        name: &str,
        value: Option<&str>,
    ) -> Result<(), PropertyError> {
        let Some(max) = self.registered.get(name).copied() else {
            return Err(PropertyError::Unregistered {
                name: name.to_string(),
            });
        };

        match value {
            Some(value) => {
                if value.len() > max {
                    return Err(PropertyError::ValueTooLong {
                        name: name.to_string(),
                        max,
                        actual: value.len(),
                    });
                }
                self.values
                    .entry(player_id.0)
                    .or_default()
                    .insert(name.to_string(), value.to_string());
            }
            None => {
                if let Some(entries) = self.values.get_mut(&player_id.0) {
                    entries.remove(name);
                    if entries.is_empty() {
                        self.values.remove(&player_id.0);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, player_id: PlayerId, name: &str) -> Option<&str> {
        self.values
            .get(&player_id.0)
            .and_then(|entries| entries.get(name))
            .map(String::as_str)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), PropertyError> {
        let saved = SavedPropertyStore {
            registered: self.registered.clone(),
            values: self.values.clone(),
        };
        let text = serde_json::to_string_pretty(&saved).map_err(PropertyError::EncodeSave)?;
        write_text_atomic(path, &text).map_err(|source| PropertyError::WriteSave {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "properties_saved");
        Ok(())
    }

    pub fn load_from(path: &Path) -> Result<Self, PropertyError> {
        let text = fs::read_to_string(path).map_err(|source| PropertyError::ReadSave {
            path: path.to_path_buf(),
            source,
        })?;
        let saved: SavedPropertyStore =
            serde_json::from_str(&text).map_err(|source| PropertyError::ParseSave {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            registered: saved.registered,
            values: saved.values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_enforces_registration_and_bound() {
        let mut store = PropertyStore::default();
        let player = PlayerId(1);

        assert!(matches!(
            store.set(player, "morph:missing", Some("x")),
            Err(PropertyError::Unregistered { .. })
        ));

        store.register("morph:short", 4);
        store.set(player, "morph:short", Some("abcd")).expect("in bound");
        assert!(matches!(
            store.set(player, "morph:short", Some("abcde")),
            Err(PropertyError::ValueTooLong { .. })
        ));
        assert_eq!(store.get(player, "morph:short"), Some("abcd"));
    }

    #[test]
    fn clearing_removes_the_value() {
        let mut store = PropertyStore::default();
        let player = PlayerId(1);
        store.register("morph:short", 16);
        store.set(player, "morph:short", Some("value")).expect("set");

        store.set(player, "morph:short", None).expect("clear");

        assert_eq!(store.get(player, "morph:short"), None);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("properties.json");

        let mut store = PropertyStore::default();
        store.register("morph:current_id", 32);
        store
            .set(PlayerId(7), "morph:current_id", Some("creeper"))
            .expect("set");
        store.save_to(&path).expect("save");

        let loaded = PropertyStore::load_from(&path).expect("load");
        assert!(loaded.is_registered("morph:current_id"));
        assert_eq!(loaded.get(PlayerId(7), "morph:current_id"), Some("creeper"));
    }

    #[test]
    fn load_rejects_malformed_save() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("properties.json");
        fs::write(&path, "not json").expect("write");

        assert!(matches!(
            PropertyStore::load_from(&path),
            Err(PropertyError::ParseSave { .. })
        ));
    }
}
