use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::store::SharedStore;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read dataset {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("dataset {} has no records", path.display())]
    Empty { path: PathBuf },
    #[error("dataset has no records")]
    NoRecords,
}

/// The initial records of every run, one per line of the source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dataset {
    lines: Vec<String>,
}

impl Dataset {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let io_err = |source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(io_err)?;
        let lines = BufReader::new(file)
            .lines()
            .collect::<io::Result<Vec<_>>>()
            .map_err(io_err)?;

        if lines.is_empty() {
            return Err(LoadError::Empty {
                path: path.to_path_buf(),
            });
        }

        log::debug!("loaded {} records from {}", lines.len(), path.display());
        Ok(Self { lines })
    }

    /// Builds a dataset from in-memory records; at least one is required.
    pub fn from_lines<I, L>(lines: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        if lines.is_empty() {
            return Err(LoadError::NoRecords);
        }
        Ok(Self { lines })
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// A fresh store holding a copy of every record.
    pub fn to_store(&self) -> SharedStore {
        SharedStore::from_lines(self.lines.clone())
    }
}
