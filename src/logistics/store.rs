//! Save File Store
//!
//! Reads and writes a [`SaveBlock`] on disk.
//!
//! # Atomic Write
//!
//! 1. Write `<path>.tmp`
//! 2. Flush and sync
//! 3. Rename over `<path>`
//!
//! A crash mid-save leaves the previous file intact.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::PersistenceConfig;

use super::codec::{self, SaveBlock, SaveFormat};
use super::error::LogisticsError;

pub struct SaveStore {
    path: PathBuf,
    format: SaveFormat,
}

impl SaveStore {
    pub fn new(path: impl AsRef<Path>, format: SaveFormat) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            format,
        }
    }

    pub fn from_config(config: &PersistenceConfig) -> Self {
        Self::new(&config.save_path, SaveFormat::from_config(&config.format))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Write `block` atomically, creating parent directories as needed.
    pub fn save(&self, block: &SaveBlock) -> Result<(), LogisticsError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let text = codec::encode(block, self.format)?;
        let temp_path = self.temp_path();
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            writer.write_all(text.as_bytes())?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;

        info!(
            path = %self.path.display(),
            pending = block.pending.len(),
            expired = block.expired.len(),
            "Logistics save written"
        );
        Ok(())
    }

    /// Read the save file. `None` on cold start (no file yet).
    pub fn load(&self) -> Result<Option<SaveBlock>, LogisticsError> {
        if !self.path.exists() {
            if self.temp_path().exists() {
                warn!(
                    path = %self.temp_path().display(),
                    "Ignoring leftover temporary save from an interrupted write"
                );
            }
            return Ok(None);
        }

        let text = fs::read_to_string(&self.path)?;
        let block = codec::decode(&text, self.format)?;

        info!(
            path = %self.path.display(),
            records = block.len(),
            "Logistics save read"
        );
        Ok(Some(block))
    }
}
