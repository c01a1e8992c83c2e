use std::fmt;
use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

/// A compression format offered by the execution backend.
///
/// The name is unique within a catalog and doubles as the extension of
/// archives the plugin produces (`zip` → `report.zip`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub name: String,
    pub version: String,
}

impl PluginDescriptor {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// How the backend should treat the input data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompressionMode {
    #[default]
    Binary,
    Text,
}

impl CompressionMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "binary" => Some(Self::Binary),
            "text" => Some(Self::Text),
            _ => None,
        }
    }

    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            Self::Binary => Self::Text,
            Self::Text => Self::Binary,
        }
    }
}

impl fmt::Display for CompressionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary => write!(f, "Binary"),
            Self::Text => write!(f, "Text"),
        }
    }
}

/// User-facing compression options.
///
/// Splitting is disabled when `split_size` is `None`. A zero split size
/// cannot be represented, so "no split" and "zero-byte chunks" never mix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CompressionOptions {
    pub mode: CompressionMode,
    pub split_size: Option<NonZeroU64>,
}

impl CompressionOptions {
    pub fn new(mode: CompressionMode) -> Self {
        Self {
            mode,
            split_size: None,
        }
    }

    /// Set the split size in bytes. Zero disables splitting.
    pub fn with_split_size(mut self, bytes: u64) -> Self {
        self.split_size = NonZeroU64::new(bytes);
        self
    }

    /// Split size in bytes, or `None` when splitting is disabled.
    pub fn split_bytes(&self) -> Option<u64> {
        self.split_size.map(NonZeroU64::get)
    }

    /// Options as handed to the backend: an absent split size becomes `0`.
    pub fn to_wire(&self) -> WireOptions {
        WireOptions {
            mode: self.mode,
            split_size: self.split_bytes().unwrap_or(0),
        }
    }
}

/// The backend's uniform numeric view of [`CompressionOptions`].
/// `split_size == 0` means splitting is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireOptions {
    pub mode: CompressionMode,
    pub split_size: u64,
}
