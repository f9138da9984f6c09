//! Runtime settings.
//!
//! Every command-line argument is a variable name to look up, so there is no room for flags.
//! Settings come from `ENVDUMP_*` environment variables instead.

use std::ffi::OsString;

use log::LevelFilter;

use super::error::{Error, Result};

pub const LOG_VAR: &str = "ENVDUMP_LOG";
pub const AUXV_VAR: &str = "ENVDUMP_AUXV";
pub const AUXV_SOURCE_VAR: &str = "ENVDUMP_AUXV_SOURCE";

/// How much of the aux vector to print.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AuxvMode {
    /// Only `AT_EXECFN`.
    ExecFn,
    /// `AT_EXECFN` followed by every entry.
    Full,
}

/// Where the full aux vector is read from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AuxvSource {
    Procfs,
    /// Walk past the startup envp. Also reports where the vector starts.
    Stack,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub log_level: LevelFilter,
    pub auxv: AuxvMode,
    pub auxv_source: AuxvSource,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: LevelFilter::Warn,
            auxv: AuxvMode::ExecFn,
            auxv_source: AuxvSource::Procfs,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Config> {
        Config::from_lookup(|var| std::env::var_os(var))
    }

    /// Build a config from an arbitrary variable lookup. Unset or empty variables keep their
    /// defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let mut config = Config::default();

        if let Some(value) = setting(&lookup, LOG_VAR) {
            config.log_level = match value.to_ascii_lowercase().as_str() {
                "off" => LevelFilter::Off,
                "error" => LevelFilter::Error,
                "warn" => LevelFilter::Warn,
                "info" => LevelFilter::Info,
                "debug" => LevelFilter::Debug,
                "trace" => LevelFilter::Trace,
                _ => return Err(invalid(LOG_VAR, value)),
            };
        }

        if let Some(value) = setting(&lookup, AUXV_VAR) {
            config.auxv = match value.as_str() {
                "execfn" => AuxvMode::ExecFn,
                "full" => AuxvMode::Full,
                _ => return Err(invalid(AUXV_VAR, value)),
            };
        }

        if let Some(value) = setting(&lookup, AUXV_SOURCE_VAR) {
            config.auxv_source = match value.as_str() {
                "procfs" => AuxvSource::Procfs,
                "stack" => AuxvSource::Stack,
                _ => return Err(invalid(AUXV_SOURCE_VAR, value)),
            };
        }

        Ok(config)
    }
}

fn setting<F>(lookup: &F, var: &str) -> Option<String>
where
    F: Fn(&str) -> Option<OsString>,
{
    lookup(var)
        .map(|v| v.to_string_lossy().trim().to_string())
        .filter(|v| !v.is_empty())
}

fn invalid(var: &'static str, value: String) -> Error {
    Error::Config { var, value }
}
