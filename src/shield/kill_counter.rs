//! Durable count of successful removals
//!
//! Stored as a single text file holding the decimal value, rewritten in full
//! (truncate + write) after every increment.

use std::fs;
use std::path::PathBuf;

use crate::core::ShieldResult;

/// Default file holding the counter
pub const KILLS_FILE: &str = "kills.txt";

#[derive(Debug, Clone)]
pub struct KillCounter {
    path: PathBuf,
    value: u64,
}

impl KillCounter {
    /// Load the counter stored at `path`.
    ///
    /// A missing, unreadable or non-numeric file yields zero.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let value = match fs::read_to_string(&path) {
            Ok(content) => content.trim().parse().unwrap_or_else(|e| {
                tracing::warn!(
                    "[KillCounter] {} does not hold a number ({}), starting from 0",
                    path.display(),
                    e
                );
                0
            }),
            Err(e) => {
                tracing::info!(
                    "[KillCounter] Could not read {} ({}), starting from 0",
                    path.display(),
                    e
                );
                0
            }
        };

        Self { path, value }
    }

    /// Counter starting at `value`, persisted to `path`
    pub fn with_value(path: impl Into<PathBuf>, value: u64) -> Self {
        Self {
            path: path.into(),
            value,
        }
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    /// Write the current value to disk
    pub fn save(&self) -> ShieldResult<()> {
        fs::write(&self.path, self.value.to_string())?;
        Ok(())
    }

    /// Count one more removal and persist it.
    ///
    /// A failed write is logged; the in-memory value keeps the increment.
    pub fn increment(&mut self) -> u64 {
        self.value += 1;
        if let Err(e) = self.save() {
            tracing::error!(
                "[KillCounter] Saving kills to {} failed: {}",
                self.path.display(),
                e
            );
        }
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(KILLS_FILE);

        KillCounter::with_value(&path, 10).save().unwrap();
        assert_eq!(KillCounter::load(&path).value(), 10);
        assert_eq!(fs::read_to_string(&path).unwrap(), "10");
    }

    #[test]
    fn test_non_numeric_file_loads_zero() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(KILLS_FILE);
        fs::write(&path, "isso-nao-eh-um-numero").unwrap();

        assert_eq!(KillCounter::load(&path).value(), 0);
    }

    #[test]
    fn test_missing_file_loads_zero() {
        let temp = TempDir::new().unwrap();
        assert_eq!(KillCounter::load(temp.path().join("absent.txt")).value(), 0);
    }

    #[test]
    fn test_increment_persists() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(KILLS_FILE);
        fs::write(&path, "41\n").unwrap();

        let mut kills = KillCounter::load(&path);
        assert_eq!(kills.increment(), 42);
        assert_eq!(KillCounter::load(&path).value(), 42);
    }

    #[test]
    fn test_failed_write_keeps_memory_value() {
        let temp = TempDir::new().unwrap();
        // A directory cannot be written as a file
        let mut kills = KillCounter::with_value(temp.path(), 5);

        assert_eq!(kills.increment(), 6);
        assert_eq!(kills.value(), 6);
        assert!(kills.save().is_err());
    }
}
