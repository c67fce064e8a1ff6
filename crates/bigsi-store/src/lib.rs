//! Persistence adapter: maps BIGSI's two logical tables (row-id -> bit
//! vector bytes, colour-id -> sequence-ID string) onto an embedded ordered
//! key-value store, plus the JSON metadata sidecar.
//!
//! Two physical SQLite databases live side by side in the BIGSI directory,
//! `bitvectors.db` and `colours.db`, alongside `metadata.json`. Each
//! connection is wrapped in `Arc<Mutex<..>>` so the same [`Store`] handle can
//! be cloned and shared across query threads.

pub mod metadata;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use sqlite::State;
use thiserror::Error;

pub use metadata::Metadata;

pub const ROW_STORE_FILENAME: &str = "bitvectors.db";
pub const COLOUR_STORE_FILENAME: &str = "colours.db";
pub const METADATA_FILENAME: &str = "metadata.json";

#[derive(Error, Debug)]
pub enum Error {
    #[error("storage directory {0} does not exist")]
    MissingDirectory(PathBuf),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] sqlite::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("metadata (de)serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A single connection wrapped for cross-thread sharing.
#[derive(Clone)]
struct Handle(Arc<Mutex<sqlite::Connection>>);

impl Handle {
    fn open(path: &Path) -> Result<Self, Error> {
        let connection = sqlite::Connection::open(path)?;
        connection.execute("PRAGMA journal_mode = WAL;")?;
        Ok(Self(Arc::new(Mutex::new(connection))))
    }
}

/// The persistence adapter backing a frozen BIGSI.
#[derive(Clone)]
pub struct Store {
    dir: PathBuf,
    rows: Handle,
    colours: Handle,
}

impl Store {
    /// Opens `dir`'s two databases, creating them (and their tables) if they
    /// don't exist yet. Used by `freeze()`.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self, Error> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;

        let rows = Handle::open(&dir.join(ROW_STORE_FILENAME))?;
        rows.0
            .lock()
            .unwrap()
            .execute("CREATE TABLE IF NOT EXISTS rows (row_id INTEGER PRIMARY KEY, bits BLOB NOT NULL)")?;

        let colours = Handle::open(&dir.join(COLOUR_STORE_FILENAME))?;
        colours.0.lock().unwrap().execute(
            "CREATE TABLE IF NOT EXISTS colours (colour_id INTEGER PRIMARY KEY, sequence_id TEXT NOT NULL)",
        )?;

        Ok(Self { dir, rows, colours })
    }

    /// Opens an existing store directory. Fails unless `metadata.json` and
    /// both database files are present.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, Error> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(Error::MissingDirectory(dir));
        }
        for filename in [METADATA_FILENAME, ROW_STORE_FILENAME, COLOUR_STORE_FILENAME] {
            let path = dir.join(filename);
            if !path.is_file() {
                return Err(Error::MissingDirectory(path));
            }
        }
        let rows = Handle::open(&dir.join(ROW_STORE_FILENAME))?;
        let colours = Handle::open(&dir.join(COLOUR_STORE_FILENAME))?;

        Ok(Self { dir, rows, colours })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes (or overwrites) the serialized bit vector for `row_id`.
    pub fn put_row(&self, row_id: u32, bits: &[u8]) -> Result<(), Error> {
        let connection = self.rows.0.lock().unwrap();
        let mut statement =
            connection.prepare("INSERT OR REPLACE INTO rows (row_id, bits) VALUES (?, ?)")?;
        statement.bind((1, row_id as i64))?;
        statement.bind((2, bits))?;
        statement.next()?;
        Ok(())
    }

    /// Fetches the serialized bit vector for `row_id`, if present.
    pub fn get_row(&self, row_id: u32) -> Result<Option<Vec<u8>>, Error> {
        let connection = self.rows.0.lock().unwrap();
        let mut statement = connection.prepare("SELECT bits FROM rows WHERE row_id = ?")?;
        statement.bind((1, row_id as i64))?;
        if let State::Row = statement.next()? {
            Ok(Some(statement.read::<Vec<u8>, _>("bits")?))
        } else {
            Ok(None)
        }
    }

    /// Writes (or overwrites) the sequence ID for `colour_id`.
    pub fn put_colour(&self, colour_id: u32, sequence_id: &str) -> Result<(), Error> {
        let connection = self.colours.0.lock().unwrap();
        let mut statement = connection
            .prepare("INSERT OR REPLACE INTO colours (colour_id, sequence_id) VALUES (?, ?)")?;
        statement.bind((1, colour_id as i64))?;
        statement.bind((2, sequence_id))?;
        statement.next()?;
        Ok(())
    }

    /// Fetches the sequence ID for `colour_id`, if present.
    pub fn get_colour(&self, colour_id: u32) -> Result<Option<String>, Error> {
        let connection = self.colours.0.lock().unwrap();
        let mut statement =
            connection.prepare("SELECT sequence_id FROM colours WHERE colour_id = ?")?;
        statement.bind((1, colour_id as i64))?;
        if let State::Row = statement.next()? {
            Ok(Some(statement.read::<String, _>("sequence_id")?))
        } else {
            Ok(None)
        }
    }

    /// Flushes both databases to disk via a WAL checkpoint. Defined as the
    /// durability point for "close" in the persistence contract.
    pub fn close(self) -> Result<(), Error> {
        self.rows
            .0
            .lock()
            .unwrap()
            .execute("PRAGMA wal_checkpoint(TRUNCATE);")?;
        self.colours
            .0
            .lock()
            .unwrap()
            .execute("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn create_then_put_get_row() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::create(dir.path()).unwrap();
        assert_eq!(store.get_row(0).unwrap(), None);
        store.put_row(0, &[1, 2, 3]).unwrap();
        assert_eq!(store.get_row(0).unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn create_then_put_get_colour() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::create(dir.path()).unwrap();
        assert_eq!(store.get_colour(0).unwrap(), None);
        store.put_colour(0, "seq-a").unwrap();
        assert_eq!(store.get_colour(0).unwrap(), Some("seq-a".to_string()));
    }

    #[test]
    fn open_without_metadata_fails() {
        let dir = tempfile::tempdir().unwrap();
        Store::create(dir.path()).unwrap();
        assert!(Store::open(dir.path()).is_err());
    }

    #[test]
    fn open_after_metadata_written_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = Store::create(dir.path()).unwrap();
            store.put_row(0, &[9]).unwrap();
            store.close().unwrap();
        }
        let meta = Metadata {
            row_store_filename: ROW_STORE_FILENAME.to_string(),
            colour_store_filename: COLOUR_STORE_FILENAME.to_string(),
            num_bits: 8,
            num_hashes: 1,
            colour_iterator: 0,
        };
        meta.write(dir.path()).unwrap();

        let store = Store::open(dir.path()).unwrap();
        assert_eq!(store.get_row(0).unwrap(), Some(vec![9]));
    }
}
