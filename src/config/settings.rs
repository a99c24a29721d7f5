use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{BootstrapError, Result};
use crate::util::paths::{anchor, default_config_path};

/// Example configuration file contents (bundled with the binary)
pub const EXAMPLE_CONFIG: &str = include_str!("config.toml.example");

/// Application configuration, with every path already anchored at `home`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Home directory everything else is resolved against
    pub home: PathBuf,
    pub package: PackageConfig,
    pub path: PathConfig,
    pub setup: SetupConfig,
    pub archive: ArchiveConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageConfig {
    /// Package installed in the first stage
    pub name: String,
    /// Package-manager program followed by its arguments; the package name is appended
    pub manager: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathConfig {
    /// Directory the package manager puts executables in
    pub install_dir: PathBuf,
    /// Path fragment file owned by this installer
    pub fragment: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupConfig {
    pub tool: String,
    /// Setup arguments before placeholder substitution
    pub args: Vec<String>,
    pub checkout_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveConfig {
    /// Directory manifest entries are relative to
    pub root: PathBuf,
    pub manifest: PathBuf,
    pub output: PathBuf,
}

/// TOML representation of configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    package: Option<TomlPackageConfig>,
    path: Option<TomlPathConfig>,
    setup: Option<TomlSetupConfig>,
    archive: Option<TomlArchiveConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlPackageConfig {
    name: Option<String>,
    manager: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlPathConfig {
    install_dir: Option<PathBuf>,
    fragment: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlSetupConfig {
    tool: Option<String>,
    args: Option<Vec<String>>,
    checkout_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlArchiveConfig {
    root: Option<PathBuf>,
    manifest: Option<PathBuf>,
    output: Option<PathBuf>,
}

impl Config {
    /// Built-in defaults for the given home directory
    pub fn defaults(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            package: PackageConfig {
                name: "qmk".into(),
                manager: vec![
                    "python3".into(),
                    "-m".into(),
                    "pip".into(),
                    "install".into(),
                    "--user".into(),
                ],
            },
            path: PathConfig {
                install_dir: home.join(".local").join("bin"),
                fragment: home.join(".config").join("path.d").join("bootstrap"),
            },
            setup: SetupConfig {
                tool: "qmk".into(),
                args: vec!["setup".into(), "-H".into(), "{checkout}".into(), "-y".into()],
                checkout_dir: home.join("qmk_firmware"),
            },
            archive: ArchiveConfig {
                root: home.clone(),
                manifest: home.join("w").join("provides.txt"),
                output: home.join("provides.tar"),
            },
            home,
        }
    }

    /// Load configuration, merging a TOML file over the defaults.
    ///
    /// With no explicit path the default location is used, and a missing file
    /// there simply means defaults. An explicit path must exist.
    pub fn load(home: impl Into<PathBuf>, explicit: Option<&Path>) -> Result<Self> {
        let mut config = Config::defaults(home);

        let (config_file, required) = match explicit {
            Some(path) => (anchor(&config.home, path), true),
            None => (default_config_path(&config.home), false),
        };

        let contents = match fs::read_to_string(&config_file) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound && !required => {
                tracing::debug!(path = %config_file.display(), "No config file; using defaults");
                return Ok(config);
            }
            Err(e) => {
                return Err(BootstrapError::Config {
                    path: config_file,
                    message: e.to_string(),
                })
            }
        };

        let toml_config =
            toml::from_str::<TomlConfig>(&contents).map_err(|e| BootstrapError::Config {
                path: config_file.clone(),
                message: e.message().to_string(),
            })?;

        config.merge(toml_config);
        config.validate(&config_file)?;

        tracing::info!(path = %config_file.display(), "Loaded configuration");
        Ok(config)
    }

    fn merge(&mut self, toml_config: TomlConfig) {
        let home = self.home.clone();

        if let Some(package) = toml_config.package {
            if let Some(name) = package.name {
                self.package.name = name;
            }
            if let Some(manager) = package.manager {
                self.package.manager = manager;
            }
        }

        if let Some(path) = toml_config.path {
            if let Some(install_dir) = path.install_dir {
                self.path.install_dir = anchor(&home, install_dir);
            }
            if let Some(fragment) = path.fragment {
                self.path.fragment = anchor(&home, fragment);
            }
        }

        if let Some(setup) = toml_config.setup {
            if let Some(tool) = setup.tool {
                self.setup.tool = tool;
            }
            if let Some(args) = setup.args {
                self.setup.args = args;
            }
            if let Some(checkout_dir) = setup.checkout_dir {
                self.setup.checkout_dir = anchor(&home, checkout_dir);
            }
        }

        if let Some(archive) = toml_config.archive {
            if let Some(root) = archive.root {
                self.archive.root = anchor(&home, root);
            }
            if let Some(manifest) = archive.manifest {
                self.archive.manifest = anchor(&home, manifest);
            }
            if let Some(output) = archive.output {
                self.archive.output = anchor(&home, output);
            }
        }
    }

    fn validate(&self, source: &Path) -> Result<()> {
        let invalid = |message: &str| BootstrapError::Config {
            path: source.to_path_buf(),
            message: message.to_string(),
        };

        if self.package.manager.first().map_or(true, |p| p.is_empty()) {
            return Err(invalid("package.manager must name a program"));
        }
        if self.package.name.is_empty() {
            return Err(invalid("package.name must not be empty"));
        }
        if self.setup.tool.is_empty() {
            return Err(invalid("setup.tool must not be empty"));
        }
        Ok(())
    }

    /// Setup arguments with `{checkout}` and `{home}` substituted
    pub fn setup_args(&self) -> Vec<String> {
        let checkout = self.setup.checkout_dir.display().to_string();
        let home = self.home.display().to_string();
        self.setup
            .args
            .iter()
            .map(|arg| arg.replace("{checkout}", &checkout).replace("{home}", &home))
            .collect()
    }
}
