use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_KILN_ROOT: &str = "/kiln";

/// A collection of paths and options that affect how Kiln runs. This is not
/// specific to one build; it relates to the host Kiln is running on.
///
#[derive(Builder, Debug, Clone)]
#[builder(build_fn(error = "ConfigError"))]
pub struct Config {
    /// The root of kiln's operating directory. By default this is `/kiln`.
    #[builder(default = "self.default_kiln_root()")]
    kiln_root: PathBuf,

    /// The location of the content-addressable store on the current host.
    #[builder(default = "self.default_store_root()")]
    store_root: PathBuf,

    /// Where per-request execution roots get created.
    #[builder(default = "self.default_sandbox_root()")]
    sandbox_root: PathBuf,

    /// The current working directory kiln was invoked from.
    #[builder(default = "self.default_invocation_dir()?")]
    invocation_dir: PathBuf,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        Default::default()
    }

    pub fn kiln_root(&self) -> &PathBuf {
        &self.kiln_root
    }

    pub fn store_root(&self) -> &PathBuf {
        &self.store_root
    }

    pub fn sandbox_root(&self) -> &PathBuf {
        &self.sandbox_root
    }

    pub fn invocation_dir(&self) -> &PathBuf {
        &self.invocation_dir
    }
}

impl ConfigBuilder {
    fn root(&self) -> PathBuf {
        self.kiln_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_KILN_ROOT))
    }

    fn default_kiln_root(&self) -> PathBuf {
        PathBuf::from(DEFAULT_KILN_ROOT)
    }

    fn default_store_root(&self) -> PathBuf {
        self.root().join("store")
    }

    fn default_sandbox_root(&self) -> PathBuf {
        self.root().join("sandbox")
    }

    fn default_invocation_dir(&self) -> Result<PathBuf, ConfigError> {
        std::env::current_dir().map_err(ConfigError::CouldNotGetCurrentDir)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("attempted to build a Config with a missing field: {0}")]
    BuilderError(String),

    #[error("could not determine the current directory: {0:?}")]
    CouldNotGetCurrentDir(std::io::Error),
}

impl From<derive_builder::UninitializedFieldError> for ConfigError {
    fn from(value: derive_builder::UninitializedFieldError) -> Self {
        ConfigError::BuilderError(value.field_name().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_store_and_sandbox_roots_from_the_kiln_root() {
        let config = Config::builder()
            .kiln_root(PathBuf::from("/tmp/kiln-test"))
            .build()
            .unwrap();

        assert_eq!(config.store_root(), &PathBuf::from("/tmp/kiln-test/store"));
        assert_eq!(
            config.sandbox_root(),
            &PathBuf::from("/tmp/kiln-test/sandbox")
        );
    }

    #[test]
    fn explicit_roots_win_over_derived_defaults() {
        let config = Config::builder()
            .kiln_root(PathBuf::from("/tmp/kiln-test"))
            .store_root(PathBuf::from("/somewhere/else"))
            .build()
            .unwrap();

        assert_eq!(config.store_root(), &PathBuf::from("/somewhere/else"));
    }
}
