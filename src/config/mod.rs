mod settings;

pub use settings::{ArchiveConfig, Config, PackageConfig, PathConfig, SetupConfig, EXAMPLE_CONFIG};
