pub mod backend;
pub mod builder;
pub mod catalog;
pub mod conflict;
pub mod dispatch;
pub mod feedback;
pub mod job;
pub mod notify;
pub mod plugin;
pub mod selection;
pub mod workflow;

pub use backend::{Backend, BackendError};
pub use builder::{BuildError, build_compress, build_decompress, is_archive_path};
pub use catalog::{CatalogError, PluginCatalog};
pub use conflict::{ConflictController, ConflictError, ConflictPhase, ConflictSession, Observed};
pub use dispatch::Dispatcher;
pub use feedback::Feedback;
pub use job::{
    CompressRequest, DecompressRequest, FailureKind, JobKind, JobOutcome, JobRequest,
    archive_file_name,
};
pub use plugin::{CompressionMode, CompressionOptions, PluginDescriptor, WireOptions};
pub use selection::Selection;
pub use workflow::{Step, Workflow, settle};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
