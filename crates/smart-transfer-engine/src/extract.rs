use std::collections::{BTreeSet, HashSet};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive as TarArchive;
use zip::ZipArchive;
use zstd::stream::read::Decoder as ZstdDecoder;

use crate::error::EngineError;
use crate::format::ArchiveFormat;

/// One entry of an archive, as it would land on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEntry {
    pub name: String,
    pub dest: PathBuf,
    pub is_dir: bool,
}

/// Join an entry name onto `dest_root`, refusing anything that would
/// escape it. Names like `./` resolve to `dest_root` itself.
pub fn safe_join(dest_root: &Path, raw: &Path) -> Option<PathBuf> {
    let mut clean = PathBuf::new();
    for comp in raw.components() {
        match comp {
            Component::Normal(v) => clean.push(v),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(dest_root.join(clean))
}

/// List where every entry of `archive` would be written under `dest_root`.
///
/// An entry whose name escapes the destination fails the whole archive.
pub fn plan(archive: &Path, dest_root: &Path) -> Result<Vec<PlannedEntry>, EngineError> {
    let format = ArchiveFormat::detect(archive)?;
    let raw = match format {
        ArchiveFormat::Zip => list_zip(archive)?,
        ArchiveFormat::SevenZ => list_7z(archive)?,
        ArchiveFormat::Tar | ArchiveFormat::TarGz | ArchiveFormat::TarZst => {
            if holds_tar(archive, format)? {
                list_tar(TarArchive::new(open_stream(archive, format)?), archive)?
            } else {
                vec![(plain_name(archive)?, false)]
            }
        }
    };

    let mut planned = Vec::with_capacity(raw.len());
    for (name, is_dir) in raw {
        let dest = safe_join(dest_root, Path::new(&name))
            .ok_or_else(|| EngineError::read(archive)(format!("unsafe entry path: {name}")))?;
        // The archive root entry (7z writes one, `tar -C dir .` writes `./`).
        if dest != dest_root {
            planned.push(PlannedEntry { name, dest, is_dir });
        }
    }
    Ok(planned)
}

/// Destinations that extracting `plans` would overwrite, sorted and
/// deduplicated. A directory entry over an existing directory is not a
/// collision. A file written by more than one entry is, even when
/// nothing is on disk yet.
pub fn collisions<'a>(plans: impl IntoIterator<Item = &'a PlannedEntry>) -> Vec<PathBuf> {
    let mut existing = BTreeSet::new();
    let mut planned_files = HashSet::new();
    for entry in plans {
        if entry.dest.exists() && !(entry.is_dir && entry.dest.is_dir()) {
            existing.insert(entry.dest.clone());
        }
        if !entry.is_dir && !planned_files.insert(&entry.dest) {
            existing.insert(entry.dest.clone());
        }
    }
    existing.into_iter().collect()
}

/// Extract `archive` into `dest_root`, replacing existing files.
pub fn extract(archive: &Path, dest_root: &Path) -> Result<usize, EngineError> {
    fs::create_dir_all(dest_root).map_err(EngineError::io(dest_root))?;
    let format = ArchiveFormat::detect(archive)?;
    tracing::debug!(?format, archive = %archive.display(), dest = %dest_root.display(), "extracting");

    match format {
        ArchiveFormat::Zip => extract_zip(archive, dest_root),
        ArchiveFormat::SevenZ => extract_7z(archive, dest_root),
        ArchiveFormat::Tar | ArchiveFormat::TarGz | ArchiveFormat::TarZst => {
            if holds_tar(archive, format)? {
                extract_tar(TarArchive::new(open_stream(archive, format)?), archive, dest_root)
            } else {
                extract_plain(archive, format, dest_root)
            }
        }
    }
}

/// Decoded bytes of a tar-family archive.
fn open_stream(archive: &Path, format: ArchiveFormat) -> Result<Box<dyn Read>, EngineError> {
    let file = File::open(archive).map_err(EngineError::io(archive))?;
    Ok(match format {
        ArchiveFormat::TarGz => Box::new(GzDecoder::new(file)),
        ArchiveFormat::TarZst => {
            Box::new(ZstdDecoder::new(file).map_err(EngineError::io(archive))?)
        }
        _ => Box::new(file),
    })
}

/// A `.gz` or `.zst` file may hold one compressed file rather than a tar
/// stream. Decide by the first decoded block.
fn holds_tar(archive: &Path, format: ArchiveFormat) -> Result<bool, EngineError> {
    if format == ArchiveFormat::Tar {
        return Ok(true);
    }
    let mut head = Vec::with_capacity(TAR_BLOCK);
    open_stream(archive, format)?
        .take(TAR_BLOCK as u64)
        .read_to_end(&mut head)
        .map_err(|e| EngineError::read(archive)(e.to_string()))?;
    Ok(is_tar_block(&head))
}

const TAR_BLOCK: usize = 512;

/// A full block that is either the all-zero end marker or a header whose
/// stored checksum matches its bytes.
fn is_tar_block(block: &[u8]) -> bool {
    let Some(block) = block.get(..TAR_BLOCK) else {
        return false;
    };
    if block.iter().all(|b| *b == 0) {
        return true;
    }
    let header = tar::Header::from_byte_slice(block);
    let Ok(stored) = header.cksum() else {
        return false;
    };
    // The checksum field counts as spaces.
    let sum: u32 = block
        .iter()
        .enumerate()
        .map(|(i, b)| if (148..156).contains(&i) { 32 } else { u32::from(*b) })
        .sum();
    stored == sum
}

/// File name a plain compressed stream decodes to: `notes.txt.zst`
/// becomes `notes.txt`.
fn plain_name(archive: &Path) -> Result<String, EngineError> {
    archive
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty() && s != "." && s != "..")
        .ok_or_else(|| EngineError::read(archive)("no name for the decoded file".to_owned()))
}

fn extract_plain(
    archive: &Path,
    format: ArchiveFormat,
    dest_root: &Path,
) -> Result<usize, EngineError> {
    let dest = dest_root.join(plain_name(archive)?);
    let mut stream = open_stream(archive, format)?;
    write_entry(&dest, false, &mut stream)?;
    Ok(1)
}

fn list_zip(archive: &Path) -> Result<Vec<(String, bool)>, EngineError> {
    let file = File::open(archive).map_err(EngineError::io(archive))?;
    let mut zip = ZipArchive::new(file).map_err(|e| EngineError::read(archive)(e.to_string()))?;
    let mut entries = Vec::with_capacity(zip.len());
    for idx in 0..zip.len() {
        let entry = zip
            .by_index(idx)
            .map_err(|e| EngineError::read(archive)(e.to_string()))?;
        entries.push((entry.name().to_owned(), entry.is_dir()));
    }
    Ok(entries)
}

fn list_7z(archive: &Path) -> Result<Vec<(String, bool)>, EngineError> {
    let file = File::open(archive).map_err(EngineError::io(archive))?;
    let reader = sevenz_rust2::SevenZReader::new(file, sevenz_rust2::Password::empty())
        .map_err(|e| EngineError::read(archive)(e.to_string()))?;
    Ok(reader
        .archive()
        .files
        .iter()
        .map(|e| (e.name.clone(), e.is_directory))
        .collect())
}

fn list_tar<R: Read>(mut tar: TarArchive<R>, archive: &Path) -> Result<Vec<(String, bool)>, EngineError> {
    let mut entries = Vec::new();
    for entry in tar.entries().map_err(EngineError::io(archive))? {
        let entry = entry.map_err(|e| EngineError::read(archive)(e.to_string()))?;
        let path = entry
            .path()
            .map_err(|e| EngineError::read(archive)(e.to_string()))?;
        entries.push((
            path.to_string_lossy().into_owned(),
            entry.header().entry_type().is_dir(),
        ));
    }
    Ok(entries)
}

/// Make room for a new entry at `dest`: a file over a directory (or the
/// reverse) removes what is there.
fn clear_destination(dest: &Path, is_dir: bool) -> Result<(), EngineError> {
    match fs::symlink_metadata(dest) {
        Ok(meta) if meta.is_dir() && !is_dir => {
            fs::remove_dir_all(dest).map_err(EngineError::io(dest))
        }
        Ok(meta) if !meta.is_dir() => fs::remove_file(dest).map_err(EngineError::io(dest)),
        _ => Ok(()),
    }
}

fn write_entry(dest: &Path, is_dir: bool, reader: &mut dyn Read) -> Result<(), EngineError> {
    clear_destination(dest, is_dir)?;
    if is_dir {
        return fs::create_dir_all(dest).map_err(EngineError::io(dest));
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(EngineError::io(parent))?;
    }
    let mut out = File::create(dest).map_err(EngineError::io(dest))?;
    io::copy(reader, &mut out).map_err(EngineError::io(dest))?;
    Ok(())
}

fn extract_zip(archive: &Path, dest_root: &Path) -> Result<usize, EngineError> {
    let file = File::open(archive).map_err(EngineError::io(archive))?;
    let mut zip = ZipArchive::new(file).map_err(|e| EngineError::read(archive)(e.to_string()))?;
    for idx in 0..zip.len() {
        let mut entry = zip
            .by_index(idx)
            .map_err(|e| EngineError::read(archive)(e.to_string()))?;
        let name = entry.name().to_owned();
        let dest = safe_join(dest_root, Path::new(&name))
            .ok_or_else(|| EngineError::read(archive)(format!("unsafe entry path: {name}")))?;
        if dest == dest_root {
            continue;
        }
        let is_dir = entry.is_dir();
        write_entry(&dest, is_dir, &mut entry)?;
    }
    Ok(zip.len())
}

fn extract_tar<R: Read>(
    mut tar: TarArchive<R>,
    archive: &Path,
    dest_root: &Path,
) -> Result<usize, EngineError> {
    let mut count = 0;
    for entry in tar.entries().map_err(EngineError::io(archive))? {
        let mut entry = entry.map_err(|e| EngineError::read(archive)(e.to_string()))?;
        let name = entry
            .path()
            .map_err(|e| EngineError::read(archive)(e.to_string()))?
            .into_owned();
        let dest = safe_join(dest_root, &name).ok_or_else(|| {
            EngineError::read(archive)(format!("unsafe entry path: {}", name.display()))
        })?;
        if dest == dest_root {
            continue;
        }
        let kind = entry.header().entry_type();
        if kind.is_dir() {
            write_entry(&dest, true, &mut io::empty())?;
        } else if kind.is_file() {
            write_entry(&dest, false, &mut entry)?;
        } else {
            tracing::debug!(entry = %name.display(), ?kind, "skipping special tar entry");
            continue;
        }
        count += 1;
    }
    Ok(count)
}

/// The 7z reader writes entries itself, so existing destinations are
/// cleared up front from the validated plan.
fn extract_7z(archive: &Path, dest_root: &Path) -> Result<usize, EngineError> {
    let entries = plan(archive, dest_root)?;
    for entry in &entries {
        clear_destination(&entry.dest, entry.is_dir)?;
    }
    sevenz_rust2::decompress_file(archive, dest_root)
        .map_err(|e| EngineError::read(archive)(e.to_string()))?;
    Ok(entries.len())
}
