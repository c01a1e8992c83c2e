use std::path::Path;

use smart_transfer::PluginDescriptor;

use crate::error::EngineError;

/// Archive formats the local engine can write and read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    SevenZ,
    Tar,
    TarGz,
    TarZst,
}

impl ArchiveFormat {
    pub const ALL: [ArchiveFormat; 5] = [
        ArchiveFormat::Zip,
        ArchiveFormat::SevenZ,
        ArchiveFormat::Tar,
        ArchiveFormat::TarGz,
        ArchiveFormat::TarZst,
    ];

    /// Plugin name, which is also the extension of archives it writes.
    pub fn plugin_name(self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::SevenZ => "7z",
            ArchiveFormat::Tar => "tar",
            ArchiveFormat::TarGz => "gz",
            ArchiveFormat::TarZst => "zst",
        }
    }

    pub fn from_plugin(name: &str) -> Result<Self, EngineError> {
        Self::ALL
            .into_iter()
            .find(|f| f.plugin_name() == name)
            .ok_or_else(|| EngineError::UnknownPlugin(name.to_owned()))
    }

    /// Pick a reader for `path` by its extension, case-insensitively.
    pub fn detect(path: &Path) -> Result<Self, EngineError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "zip" => Ok(ArchiveFormat::Zip),
            "7z" => Ok(ArchiveFormat::SevenZ),
            "tar" => Ok(ArchiveFormat::Tar),
            "gz" | "tgz" => Ok(ArchiveFormat::TarGz),
            "zst" | "zstd" => Ok(ArchiveFormat::TarZst),
            _ => Err(EngineError::Unsupported(path.to_path_buf())),
        }
    }

    pub fn descriptor(self) -> PluginDescriptor {
        PluginDescriptor::new(self.plugin_name(), env!("CARGO_PKG_VERSION"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_by_extension() {
        assert_eq!(ArchiveFormat::detect(Path::new("a.ZIP")).unwrap(), ArchiveFormat::Zip);
        assert_eq!(ArchiveFormat::detect(Path::new("a.7z")).unwrap(), ArchiveFormat::SevenZ);
        assert_eq!(
            ArchiveFormat::detect(Path::new("backup.tar.gz")).unwrap(),
            ArchiveFormat::TarGz
        );
        assert_eq!(
            ArchiveFormat::detect(Path::new("a.zstd")).unwrap(),
            ArchiveFormat::TarZst
        );
    }

    #[test]
    fn rar_is_unsupported() {
        assert!(matches!(
            ArchiveFormat::detect(Path::new("a.rar")),
            Err(EngineError::Unsupported(_))
        ));
    }

    #[test]
    fn plugin_names_round_trip() {
        for format in ArchiveFormat::ALL {
            assert_eq!(ArchiveFormat::from_plugin(format.plugin_name()).unwrap(), format);
        }
        assert!(matches!(
            ArchiveFormat::from_plugin("rar"),
            Err(EngineError::UnknownPlugin(_))
        ));
    }
}
