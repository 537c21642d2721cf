//! Struct archiving functionality
//!
//! An [`Archiver`] appends serialisable records to a CSV file under the
//! session's archive directory, one file per archived quantity.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use csv::WriterBuilder;
pub use csv::Writer;
use std::fs::{File, OpenOptions};
use std::path::Path;
use thiserror::Error;

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
#[derive(Default)]
pub struct Archiver {
    writer: Option<Writer<File>>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors associated with archiving.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Cannot create the archive file: {0}")]
    FileCreateError(std::io::Error),

    #[error("Cannot serialise the record into the archive: {0}")]
    SerialiseError(csv::Error),

    #[error("The archiver has no initialised writer")]
    NoWriter,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Create a new archiver from a paricular path relative to the session's
    /// archive root.
    pub fn from_path<P: AsRef<Path>>(
        session: &Session, path: P
    ) -> Result<Self, ArchiveError> {
        let mut session_path = session.arch_root.clone();
        session_path.push(path);

        // Create any missing parent directories
        if let Some(parent) = session_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(ArchiveError::FileCreateError)?;
        }

        // Create the file if it does not exist
        std::fs::File::create(session_path.clone())
            .map_err(ArchiveError::FileCreateError)?;

        // Open the file in append mode
        let file = OpenOptions::new()
            .append(true)
            .open(session_path)
            .map_err(ArchiveError::FileCreateError)?;

        let w = WriterBuilder::new()
            .has_headers(true)
            .from_writer(file);

        Ok(Self {
            writer: Some(w)
        })
    }

    /// Serialise a record into the archive.
    pub fn serialise<T: serde::Serialize>(
        &mut self, record: T
    ) -> Result<(), ArchiveError> {
        match self.writer {
            Some(ref mut w) => {
                w.serialize(record).map_err(ArchiveError::SerialiseError)?;
                w.flush().map_err(|e| ArchiveError::FileCreateError(e))?;

                Ok(())
            },
            None => Err(ArchiveError::NoWriter)
        }
    }
}
