//! JSON output. The whole crawl result is written once, at the end of a run.

use crate::model::CrawlResult;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from writing the crawl result.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize crawl result: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write output: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> OutputError + '_ {
    move |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Sibling path the result is staged in before the rename.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

/// Serialize `result` and replace `path` with it in one rename. A failure leaves no partial file at `path`.
pub fn write_json(result: &CrawlResult, path: &Path) -> Result<(), OutputError> {
    let json = serde_json::to_vec(result)?;
    let staging = staging_path(path);
    let written = File::create(&staging)
        .and_then(|f| {
            let mut w = BufWriter::new(f);
            w.write_all(&json)?;
            w.flush()
        })
        .map_err(io_error(&staging));
    if let Err(e) = written {
        let _ = std::fs::remove_file(&staging);
        return Err(e);
    }
    std::fs::rename(&staging, path).map_err(io_error(path))
}

/// Read a result written by [write_json].
pub fn read_json(path: &Path) -> Result<CrawlResult, OutputError> {
    let f = File::open(path).map_err(io_error(path))?;
    Ok(serde_json::from_reader(std::io::BufReader::new(f))?)
}
