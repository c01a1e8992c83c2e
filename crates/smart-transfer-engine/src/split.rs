use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::EngineError;

/// Path of the `index`-th volume of `archive` (1-based): `a.zip.001`.
pub fn volume_path(archive: &Path, index: usize) -> PathBuf {
    let mut name = OsString::from(archive.as_os_str());
    name.push(format!(".{index:03}"));
    PathBuf::from(name)
}

/// Cut `archive` into volumes of at most `volume_size` bytes and remove the
/// original. An archive that already fits is left alone and returned as is.
pub fn split_archive(archive: &Path, volume_size: u64) -> Result<Vec<PathBuf>, EngineError> {
    let total = fs::metadata(archive).map_err(EngineError::io(archive))?.len();
    if total <= volume_size {
        return Ok(vec![archive.to_path_buf()]);
    }

    let mut reader = BufReader::new(File::open(archive).map_err(EngineError::io(archive))?);
    let mut volumes = Vec::new();
    let mut written = 0u64;
    while written < total {
        let path = volume_path(archive, volumes.len() + 1);
        let mut out = File::create(&path).map_err(EngineError::io(&path))?;
        let copied = io::copy(&mut (&mut reader).take(volume_size), &mut out)
            .map_err(EngineError::io(&path))?;
        out.flush().map_err(EngineError::io(&path))?;
        volumes.push(path);
        if copied == 0 {
            break;
        }
        written += copied;
    }

    fs::remove_file(archive).map_err(EngineError::io(archive))?;
    tracing::debug!(archive = %archive.display(), volumes = volumes.len(), "archive split");
    Ok(volumes)
}
