use std::fmt;
use std::path::{Path, PathBuf};

use crate::plugin::CompressionOptions;

/// Name used for the archive when the input set has no single usable stem.
pub const FALLBACK_ARCHIVE_STEM: &str = "compressed";

/// A compress job ready for dispatch.
///
/// The output path is derived from the inputs, the plugin and the output
/// directory when the request is built; it cannot be set independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressRequest {
    inputs: Vec<PathBuf>,
    plugin: String,
    output_path: PathBuf,
    options: CompressionOptions,
}

impl CompressRequest {
    pub(crate) fn new(
        inputs: Vec<PathBuf>,
        plugin: String,
        output_dir: &Path,
        options: CompressionOptions,
    ) -> Self {
        let output_path = output_dir.join(archive_file_name(&inputs, &plugin));
        Self {
            inputs,
            plugin,
            output_path,
            options,
        }
    }

    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn options(&self) -> &CompressionOptions {
        &self.options
    }
}

/// A decompress job ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecompressRequest {
    inputs: Vec<PathBuf>,
    output_dir: PathBuf,
    overwrite: bool,
}

impl DecompressRequest {
    pub(crate) fn new(inputs: Vec<PathBuf>, output_dir: PathBuf) -> Self {
        Self {
            inputs,
            output_dir,
            overwrite: false,
        }
    }

    /// The same request with overwriting allowed.
    pub fn with_overwrite(&self) -> Self {
        Self {
            overwrite: true,
            ..self.clone()
        }
    }

    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }
}

/// A job submitted to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobRequest {
    Compress(CompressRequest),
    Decompress(DecompressRequest),
}

impl JobRequest {
    pub fn kind(&self) -> JobKind {
        match self {
            Self::Compress(_) => JobKind::Compress,
            Self::Decompress(_) => JobKind::Decompress,
        }
    }

    pub fn inputs(&self) -> &[PathBuf] {
        match self {
            Self::Compress(req) => req.inputs(),
            Self::Decompress(req) => req.inputs(),
        }
    }
}

impl From<CompressRequest> for JobRequest {
    fn from(req: CompressRequest) -> Self {
        Self::Compress(req)
    }
}

impl From<DecompressRequest> for JobRequest {
    fn from(req: DecompressRequest) -> Self {
        Self::Decompress(req)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Compress,
    Decompress,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compress => write!(f, "compress"),
            Self::Decompress => write!(f, "decompress"),
        }
    }
}

/// Recognized failure subtypes, so presentation never re-parses the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The compress destination already exists.
    ArchiveExists,
    /// Any other backend error.
    Backend,
    /// The caller-level dispatch timeout expired.
    TimedOut,
}

/// Classified result of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Success,
    /// Decompression would overwrite these files. Only produced for
    /// decompress requests without `overwrite`.
    Conflict { existing_paths: Vec<PathBuf> },
    Failure { kind: FailureKind, reason: String },
}

impl JobOutcome {
    pub fn failure(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// File name of the archive a compress job writes.
///
/// One input: its file name cut at the first `.` (`backup.tar.gz` →
/// `backup`). Several inputs, or a single input whose name is empty before
/// the first `.` (`.bashrc`): the fallback name. The plugin name is always
/// the extension.
pub fn archive_file_name(inputs: &[PathBuf], plugin: &str) -> String {
    let stem = match inputs {
        [single] => single.file_name().and_then(|name| {
            let name = name.to_string_lossy();
            let base = name.split('.').next().unwrap_or_default();
            (!base.is_empty()).then(|| base.to_owned())
        }),
        _ => None,
    };
    let stem = stem.as_deref().unwrap_or(FALLBACK_ARCHIVE_STEM);
    format!("{stem}.{plugin}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(list: &[&str]) -> Vec<PathBuf> {
        list.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn single_input_uses_stem() {
        assert_eq!(archive_file_name(&paths(&["/x/report.pdf"]), "zip"), "report.zip");
    }

    #[test]
    fn single_input_cuts_at_first_dot() {
        assert_eq!(
            archive_file_name(&paths(&["/x/backup.tar.gz"]), "zip"),
            "backup.zip"
        );
        assert_eq!(
            archive_file_name(&paths(&["/x/v1.2.notes.txt"]), "7z"),
            "v1.7z"
        );
    }

    #[test]
    fn dotfile_uses_fallback() {
        assert_eq!(archive_file_name(&paths(&["/x/.bashrc"]), "zip"), "compressed.zip");
    }

    #[test]
    fn single_input_without_extension_keeps_name() {
        assert_eq!(archive_file_name(&paths(&["/x/Makefile"]), "tar"), "Makefile.tar");
    }

    #[test]
    fn multiple_inputs_use_fallback() {
        assert_eq!(
            archive_file_name(&paths(&["/x/a.txt", "/x/b.txt"]), "7z"),
            "compressed.7z"
        );
    }

    #[test]
    fn empty_stem_uses_fallback() {
        assert_eq!(archive_file_name(&paths(&["/"]), "zip"), "compressed.zip");
        assert_eq!(archive_file_name(&paths(&[""]), "zip"), "compressed.zip");
    }

    #[test]
    fn with_overwrite_changes_only_the_flag() {
        let req = DecompressRequest::new(paths(&["/x/a.zip"]), PathBuf::from("/out"));
        let forced = req.with_overwrite();
        assert!(!req.overwrite());
        assert!(forced.overwrite());
        assert_eq!(forced.inputs(), req.inputs());
        assert_eq!(forced.output_dir(), req.output_dir());
    }
}
