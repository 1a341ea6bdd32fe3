use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use tracing::info;

use crate::error::Error;

/// Where a generated script ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    /// Overwrite the file.
    File(PathBuf),
    /// Append to the file, creating it if needed.
    Append(PathBuf),
}

impl Output {
    /// `file` takes precedence over `append`; with neither, the script goes to stdout.
    #[must_use]
    pub fn new(file: Option<PathBuf>, append: Option<PathBuf>) -> Self {
        match (file, append) {
            (Some(path), _) => Self::File(path),
            (None, Some(path)) => Self::Append(path),
            (None, None) => Self::Stdout,
        }
    }

    pub fn write(&self, text: &str) -> Result<(), Error> {
        match self {
            Self::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout
                    .write_all(text.as_bytes())
                    .and_then(|()| stdout.flush())
                    .map_err(|source| Error::Stdout { source })
            }
            Self::File(path) => {
                fs::write(path, text).map_err(|source| Error::write(path, source))?;
                info!(path = %path.display(), "wrote script");
                Ok(())
            }
            Self::Append(path) => {
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .and_then(|mut file| file.write_all(text.as_bytes()))
                    .map_err(|source| Error::write(path, source))?;
                info!(path = %path.display(), "appended script");
                Ok(())
            }
        }
    }
}
