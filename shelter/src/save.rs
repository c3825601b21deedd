//! JSON save slots stored in a key-value store.

use std::{
    collections::HashMap,
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::grid::{TileGrid, TileKind};

/// Prefix shared by every save key.
pub const SAVE_KEY_PREFIX: &str = "shelter_war_save_";

/// Slot every save is mirrored to.
pub const AUTO_SLOT: &str = "auto";

/// Stored state of a single dweller.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedWorker {
    /// Horizontal position in tiles.
    pub x: f32,
    /// Vertical position in tiles.
    pub y: f32,
    /// Movement speed in tiles per second.
    pub speed: f32,
}

/// Everything needed to resume a shelter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    /// Day the shelter was on.
    pub day: u32,
    /// Dwellers in spawn order.
    pub workers: Vec<SavedWorker>,
    /// Tile matrix indexed `[row][column]`.
    pub tiles: Vec<Vec<TileKind>>,
}

/// Failures raised while reading or writing saves.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// The backing store failed.
    #[error("save store i/o failed for `{key}`")]
    Io {
        /// Key being accessed.
        key: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The save could not be encoded.
    #[error("failed to encode save data")]
    Encode(#[from] serde_json::Error),
    /// The stored tile matrix is empty or ragged.
    #[error("saved tile matrix is not rectangular")]
    InvalidGrid,
}

/// Full store key of a slot.
#[must_use]
pub fn save_key(slot: &str) -> String {
    format!("{SAVE_KEY_PREFIX}{slot}")
}

/// String key-value storage backing the save slots.
pub trait KeyValueStore {
    /// Reads the value of `key`, `None` when absent.
    fn read(&self, key: &str) -> Result<Option<String>, SaveError>;

    /// Writes `value` under `key`, replacing any previous value.
    fn write(&mut self, key: &str, value: &str) -> Result<(), SaveError>;
}

/// Store kept in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, SaveError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), SaveError> {
        let _ = self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Store writing one `<key>.json` file per key inside a directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Uses `root` as the save directory; it is created on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the save files.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, SaveError> {
        match fs::read_to_string(self.path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SaveError::Io {
                key: key.to_owned(),
                source,
            }),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), SaveError> {
        let io_error = |source| SaveError::Io {
            key: key.to_owned(),
            source,
        };
        fs::create_dir_all(&self.root).map_err(io_error)?;
        let path = self.path(key);
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, value).map_err(io_error)?;
        fs::rename(&temp_path, &path).map_err(io_error)
    }
}

/// Writes `data` to `slot` and mirrors it to the auto slot.
pub fn save<S: KeyValueStore + ?Sized>(
    store: &mut S,
    slot: &str,
    data: &SaveData,
) -> Result<(), SaveError> {
    let json = serde_json::to_string(data)?;
    store.write(&save_key(slot), &json)?;
    if slot != AUTO_SLOT {
        store.write(&save_key(AUTO_SLOT), &json)?;
    }
    info!(slot, day = data.day, "shelter saved");
    Ok(())
}

/// Reads `slot`.
///
/// Missing slots and entries that do not decode into a rectangular grid are
/// reported as `Ok(None)`; only store failures are errors.
pub fn load<S: KeyValueStore + ?Sized>(
    store: &S,
    slot: &str,
) -> Result<Option<SaveData>, SaveError> {
    let Some(json) = store.read(&save_key(slot))? else {
        return Ok(None);
    };
    let data = match serde_json::from_str::<SaveData>(&json) {
        Ok(data) => data,
        Err(err) => {
            warn!(slot, error = %err, "ignoring malformed save");
            return Ok(None);
        }
    };
    if TileGrid::from_matrix(&data.tiles).is_none() {
        warn!(slot, error = %SaveError::InvalidGrid, "ignoring malformed save");
        return Ok(None);
    }
    Ok(Some(data))
}

/// Reports whether `slot` holds any entry.
pub fn has_save<S: KeyValueStore + ?Sized>(store: &S, slot: &str) -> Result<bool, SaveError> {
    Ok(store.read(&save_key(slot))?.is_some())
}
