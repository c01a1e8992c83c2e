use std::path::{Path, PathBuf};

use crate::catalog::PluginCatalog;
use crate::job::{CompressRequest, DecompressRequest};
use crate::selection::Selection;

/// Extensions recognized as archives when decompressing.
pub const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "7z", "gz", "rar", "tar", "zst", "zstd"];

/// Pre-flight rejections. The dispatcher is never called for these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("no input files selected")]
    MissingInput,

    #[error("no compression format selected")]
    MissingPlugin,

    #[error("unknown compression format: {name}")]
    UnknownPlugin { name: String },

    #[error("no output directory selected")]
    MissingOutputDir,

    #[error("not an archive: {}", path.display())]
    NotAnArchive { path: PathBuf },
}

/// True if the whole path ends in a recognized archive extension,
/// case-insensitively. `notes.zip.txt` is not an archive; `backup.tar.gz` is.
pub fn is_archive_path(path: &Path) -> bool {
    let lower = path.to_string_lossy().to_lowercase();
    ARCHIVE_EXTENSIONS.iter().any(|ext| {
        lower
            .strip_suffix(ext)
            .is_some_and(|rest| rest.ends_with('.'))
    })
}

/// Derive a compress request from the selection.
pub fn build_compress(
    selection: &Selection,
    catalog: &PluginCatalog,
) -> Result<CompressRequest, BuildError> {
    if selection.files.is_empty() {
        return Err(BuildError::MissingInput);
    }
    let plugin = selection.plugin.as_deref().ok_or(BuildError::MissingPlugin)?;
    if !catalog.contains(plugin) {
        return Err(BuildError::UnknownPlugin {
            name: plugin.to_owned(),
        });
    }
    let output_dir = selection
        .output_dir
        .as_deref()
        .ok_or(BuildError::MissingOutputDir)?;

    Ok(CompressRequest::new(
        selection.files.clone(),
        plugin.to_owned(),
        output_dir,
        selection.options,
    ))
}

/// Derive a first-attempt decompress request (no overwrite) from the selection.
pub fn build_decompress(selection: &Selection) -> Result<DecompressRequest, BuildError> {
    if selection.files.is_empty() {
        return Err(BuildError::MissingInput);
    }
    let output_dir = selection
        .output_dir
        .clone()
        .ok_or(BuildError::MissingOutputDir)?;
    if let Some(path) = selection.files.iter().find(|p| !is_archive_path(p)) {
        return Err(BuildError::NotAnArchive { path: path.clone() });
    }

    Ok(DecompressRequest::new(selection.files.clone(), output_dir))
}

#[cfg(test)]
mod tests {
    use crate::plugin::{CompressionMode, PluginDescriptor};

    use super::*;

    fn catalog() -> PluginCatalog {
        PluginCatalog::from_plugins(vec![
            PluginDescriptor::new("zip", "1.0.0"),
            PluginDescriptor::new("7z", "1.0.0"),
        ])
    }

    fn selection(files: &[&str], plugin: Option<&str>, output_dir: Option<&str>) -> Selection {
        Selection {
            files: files.iter().map(PathBuf::from).collect(),
            plugin: plugin.map(str::to_owned),
            output_dir: output_dir.map(PathBuf::from),
            ..Selection::default()
        }
    }

    #[test]
    fn single_input_output_path() {
        let req = build_compress(&selection(&["/x/report.pdf"], Some("zip"), Some("/out")), &catalog())
            .unwrap();
        assert_eq!(req.output_path(), Path::new("/out/report.zip"));
        assert_eq!(req.plugin(), "zip");
        assert_eq!(req.inputs(), &[PathBuf::from("/x/report.pdf")]);
    }

    #[test]
    fn multi_input_output_path() {
        let req = build_compress(
            &selection(&["/x/a.txt", "/x/b.txt"], Some("7z"), Some("/out")),
            &catalog(),
        )
        .unwrap();
        assert_eq!(req.output_path(), Path::new("/out/compressed.7z"));
    }

    #[test]
    fn output_extension_is_plugin_name() {
        for input in ["/x/report.pdf", "/x/archive.tar.gz", "/x/noext", "/x/.hidden"] {
            let req = build_compress(&selection(&[input], Some("7z"), Some("/out")), &catalog())
                .unwrap();
            let ext = req.output_path().extension().unwrap();
            assert_eq!(ext, "7z", "input {input}");
        }
    }

    #[test]
    fn output_name_cuts_at_first_dot() {
        let cases = [
            ("/x/archive.tar.gz", "/out/archive.7z"),
            ("/x/noext", "/out/noext.7z"),
            ("/x/.hidden", "/out/compressed.7z"),
        ];
        for (input, expected) in cases {
            let req = build_compress(&selection(&[input], Some("7z"), Some("/out")), &catalog())
                .unwrap();
            assert_eq!(req.output_path(), Path::new(expected), "input {input}");
        }
    }

    #[test]
    fn compress_checks_run_in_order() {
        let cat = catalog();
        assert_eq!(
            build_compress(&selection(&[], None, None), &cat),
            Err(BuildError::MissingInput)
        );
        assert_eq!(
            build_compress(&selection(&["/x/a"], None, None), &cat),
            Err(BuildError::MissingPlugin)
        );
        assert_eq!(
            build_compress(&selection(&["/x/a"], Some("rar"), None), &cat),
            Err(BuildError::UnknownPlugin { name: "rar".into() })
        );
        assert_eq!(
            build_compress(&selection(&["/x/a"], Some("zip"), None), &cat),
            Err(BuildError::MissingOutputDir)
        );
    }

    #[test]
    fn compress_with_empty_catalog_is_rejected() {
        let result = build_compress(
            &selection(&["/x/a"], Some("zip"), Some("/out")),
            &PluginCatalog::empty(),
        );
        assert!(matches!(result, Err(BuildError::UnknownPlugin { .. })));
    }

    #[test]
    fn build_is_idempotent() {
        let mut sel = selection(&["/x/a.txt", "/x/b.txt"], Some("zip"), Some("/out"));
        sel.set_mode(CompressionMode::Text);
        sel.set_split_size(1 << 20);
        let cat = catalog();
        assert_eq!(build_compress(&sel, &cat), build_compress(&sel, &cat));
        assert_eq!(build_decompress(&sel), build_decompress(&sel));
    }

    #[test]
    fn options_are_carried_over() {
        let mut sel = selection(&["/x/a.txt"], Some("zip"), Some("/out"));
        sel.set_split_size(0);
        let req = build_compress(&sel, &catalog()).unwrap();
        assert_eq!(req.options().split_size, None);
        assert_eq!(req.options().to_wire().split_size, 0);
    }

    #[test]
    fn archive_pattern_matches_end_of_path() {
        for path in [
            "/x/a.zip",
            "/x/a.ZIP",
            "/x/a.7z",
            "/x/backup.tar.gz",
            "/x/a.rar",
            "/x/a.tar",
            "/x/a.zst",
            "/x/a.Zstd",
            "/x/v1.2.release.zip",
        ] {
            assert!(is_archive_path(Path::new(path)), "{path}");
        }
        for path in ["/x/notes.txt", "/x/a.zip.txt", "/x/zip", "/x/a.gzip", "/x.zip/readme"] {
            assert!(!is_archive_path(Path::new(path)), "{path}");
        }
    }

    #[test]
    fn decompress_rejects_non_archive() {
        let result = build_decompress(&selection(&["/x/notes.txt"], None, Some("/out")));
        assert_eq!(
            result,
            Err(BuildError::NotAnArchive {
                path: PathBuf::from("/x/notes.txt")
            })
        );
    }

    #[test]
    fn decompress_reports_first_non_archive() {
        let result = build_decompress(&selection(
            &["/x/a.zip", "/x/b.txt", "/x/c.txt"],
            None,
            Some("/out"),
        ));
        assert_eq!(
            result,
            Err(BuildError::NotAnArchive {
                path: PathBuf::from("/x/b.txt")
            })
        );
    }

    #[test]
    fn decompress_first_attempt_does_not_overwrite() {
        let req = build_decompress(&selection(&["/x/archive.zip"], None, Some("/out"))).unwrap();
        assert!(!req.overwrite());
        assert_eq!(req.output_dir(), Path::new("/out"));
    }

    #[test]
    fn decompress_requires_input_and_output_dir() {
        assert_eq!(
            build_decompress(&selection(&[], None, Some("/out"))),
            Err(BuildError::MissingInput)
        );
        assert_eq!(
            build_decompress(&selection(&["/x/a.zip"], None, None)),
            Err(BuildError::MissingOutputDir)
        );
    }
}
