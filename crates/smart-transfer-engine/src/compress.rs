use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use smart_transfer::CompressionMode;
use tar::Builder as TarBuilder;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};
use zstd::stream::write::Encoder as ZstdEncoder;

use crate::error::EngineError;
use crate::format::ArchiveFormat;

const ZSTD_DEFAULT_LEVEL: i32 = 3;
const ZSTD_TEXT_LEVEL: i32 = 19;
const DEFLATE_TEXT_LEVEL: i64 = 9;

/// A file or directory to be written into an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceItem {
    pub source_path: PathBuf,
    /// Relative name inside the archive, `/`-separated.
    pub archive_name: String,
    pub is_dir: bool,
}

/// Expand the inputs into archive entries. Each input lands at the archive
/// root under its own file name; directories are walked recursively.
pub fn collect_sources(inputs: &[PathBuf]) -> Result<Vec<SourceItem>, EngineError> {
    let mut items = Vec::new();
    for input in inputs {
        let name = input.file_name().ok_or_else(|| {
            EngineError::io(input)(io::Error::new(
                io::ErrorKind::InvalidInput,
                "input has no file name",
            ))
        })?;
        collect_recursive(input, Path::new(name), &mut items)?;
    }
    Ok(items)
}

fn collect_recursive(
    source: &Path,
    archive_path: &Path,
    out: &mut Vec<SourceItem>,
) -> Result<(), EngineError> {
    let meta = fs::symlink_metadata(source).map_err(EngineError::io(source))?;
    out.push(SourceItem {
        source_path: source.to_path_buf(),
        archive_name: archive_name(archive_path),
        is_dir: meta.is_dir(),
    });
    if meta.is_dir() {
        let mut children = fs::read_dir(source)
            .map_err(EngineError::io(source))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(EngineError::io(source))?;
        children.sort_by_key(|entry| entry.file_name());
        for child in children {
            collect_recursive(&child.path(), &archive_path.join(child.file_name()), out)?;
        }
    }
    Ok(())
}

fn archive_name(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(v) => Some(v.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Write `inputs` into a new archive at `output_path`.
///
/// The caller has already checked that the destination is free. On failure
/// no partial archive is left behind.
pub fn write_archive(
    format: ArchiveFormat,
    inputs: &[PathBuf],
    output_path: &Path,
    mode: CompressionMode,
) -> Result<(), EngineError> {
    let items = collect_sources(inputs)?;
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(EngineError::io(parent))?;
    }
    tracing::debug!(?format, entries = items.len(), path = %output_path.display(), "writing archive");

    let result = match format {
        ArchiveFormat::Zip => write_zip(&items, output_path, mode),
        ArchiveFormat::SevenZ => write_7z(inputs, output_path),
        ArchiveFormat::Tar => write_tar(&items, output_path),
        ArchiveFormat::TarGz => write_tar_gz(&items, output_path, mode),
        ArchiveFormat::TarZst => write_tar_zst(&items, output_path, mode),
    };
    if result.is_err() {
        let _ = fs::remove_file(output_path);
    }
    result
}

fn write_zip(items: &[SourceItem], output_path: &Path, mode: CompressionMode) -> Result<(), EngineError> {
    let mut options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    if mode == CompressionMode::Text {
        options = options.compression_level(Some(DEFLATE_TEXT_LEVEL));
    }

    let file = File::create(output_path).map_err(EngineError::io(output_path))?;
    let mut writer = ZipWriter::new(file);
    for item in items {
        if item.is_dir {
            writer
                .add_directory(format!("{}/", item.archive_name), options)
                .map_err(|e| EngineError::write(output_path)(e.to_string()))?;
        } else {
            writer
                .start_file(item.archive_name.as_str(), options)
                .map_err(|e| EngineError::write(output_path)(e.to_string()))?;
            let mut src = File::open(&item.source_path).map_err(EngineError::io(&item.source_path))?;
            io::copy(&mut src, &mut writer).map_err(EngineError::io(&item.source_path))?;
        }
    }
    let mut file = writer
        .finish()
        .map_err(|e| EngineError::write(output_path)(e.to_string()))?;
    file.flush().map_err(EngineError::io(output_path))
}

fn write_tar(items: &[SourceItem], output_path: &Path) -> Result<(), EngineError> {
    let file = File::create(output_path).map_err(EngineError::io(output_path))?;
    let mut builder = TarBuilder::new(file);
    append_tar_entries(&mut builder, items)?;
    builder.finish().map_err(EngineError::io(output_path))
}

fn write_tar_gz(items: &[SourceItem], output_path: &Path, mode: CompressionMode) -> Result<(), EngineError> {
    let level = match mode {
        CompressionMode::Binary => Compression::default(),
        CompressionMode::Text => Compression::best(),
    };
    let file = File::create(output_path).map_err(EngineError::io(output_path))?;
    let mut builder = TarBuilder::new(GzEncoder::new(file, level));
    append_tar_entries(&mut builder, items)?;
    let encoder = builder.into_inner().map_err(EngineError::io(output_path))?;
    encoder.finish().map_err(EngineError::io(output_path))?;
    Ok(())
}

fn write_tar_zst(items: &[SourceItem], output_path: &Path, mode: CompressionMode) -> Result<(), EngineError> {
    let level = match mode {
        CompressionMode::Binary => ZSTD_DEFAULT_LEVEL,
        CompressionMode::Text => ZSTD_TEXT_LEVEL,
    };
    let file = File::create(output_path).map_err(EngineError::io(output_path))?;
    let encoder = ZstdEncoder::new(file, level).map_err(EngineError::io(output_path))?;
    let mut builder = TarBuilder::new(encoder);
    append_tar_entries(&mut builder, items)?;
    let encoder = builder.into_inner().map_err(EngineError::io(output_path))?;
    encoder.finish().map_err(EngineError::io(output_path))?;
    Ok(())
}

fn append_tar_entries<W: Write>(
    builder: &mut TarBuilder<W>,
    items: &[SourceItem],
) -> Result<(), EngineError> {
    for item in items {
        if item.is_dir {
            builder
                .append_dir(&item.archive_name, &item.source_path)
                .map_err(EngineError::io(&item.source_path))?;
        } else {
            let mut src = File::open(&item.source_path).map_err(EngineError::io(&item.source_path))?;
            builder
                .append_file(&item.archive_name, &mut src)
                .map_err(EngineError::io(&item.source_path))?;
        }
    }
    Ok(())
}

/// 7z archives a directory tree, so the inputs are first copied into a
/// staging directory that becomes the archive root.
fn write_7z(inputs: &[PathBuf], output_path: &Path) -> Result<(), EngineError> {
    let staging = tempfile::Builder::new()
        .prefix("smart-transfer-7z-")
        .tempdir()
        .map_err(EngineError::io(&std::env::temp_dir()))?;
    for input in inputs {
        let Some(name) = input.file_name() else {
            continue;
        };
        copy_recursive(input, &staging.path().join(name))?;
    }
    tracing::debug!(inputs = inputs.len(), path = %output_path.display(), "writing 7z archive");

    sevenz_rust2::compress_to_path(staging.path(), output_path)
        .map_err(|e| EngineError::write(output_path)(e.to_string()))
}

fn copy_recursive(src: &Path, dest: &Path) -> Result<(), EngineError> {
    let meta = fs::symlink_metadata(src).map_err(EngineError::io(src))?;
    if meta.is_dir() {
        fs::create_dir_all(dest).map_err(EngineError::io(dest))?;
        for entry in fs::read_dir(src).map_err(EngineError::io(src))? {
            let entry = entry.map_err(EngineError::io(src))?;
            copy_recursive(&entry.path(), &dest.join(entry.file_name()))?;
        }
        return Ok(());
    }
    fs::copy(src, dest).map_err(EngineError::io(src))?;
    Ok(())
}
