//! Environment-derived configuration.
//!
//! Every subcommand is configured entirely by environment variables. The
//! variables are read once at process start into explicit config structs;
//! nothing deeper in the workflow consults the environment. Presence
//! checks happen here, before any connection is opened.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

pub const ENV_HOST: &str = "VPS_HOST";
pub const ENV_USER: &str = "VPS_USER";
pub const ENV_PORT: &str = "VPS_PORT";
pub const ENV_PASSWORD: &str = "PASSWORD";
pub const ENV_DOMAIN: &str = "DOMAIN";
pub const ENV_APP_DIR: &str = "APP_DIR";
pub const ENV_PROJECT_DIR: &str = "PROJECT_DIR";
pub const ENV_COMMAND: &str = "CMD";
pub const ENV_MANAGE_COMMAND: &str = "MANAGE_CMD";

pub const DEFAULT_USER: &str = "root";
pub const DEFAULT_PORT: u16 = 22;
pub const DEFAULT_APP_DIR: &str = "/opt/app/webapp";
pub const DEFAULT_MANAGE_COMMAND: &str = "python manage.py --help";
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// "Set VPS_HOST and PASSWORD env vars" style usage error.
fn missing_env(vars: &[&str]) -> Error {
    let list = match vars {
        [] => String::new(),
        [only] => (*only).to_string(),
        [head @ .., last] => format!("{} and {}", head.join(", "), last),
    };
    Error::Config(format!("Set {} env vars", list))
}

/// Target host and credentials for one script invocation.
///
/// Held in process memory only, for the duration of a single run.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub port: u16,
    pub connect_timeout: Duration,
}

impl HostConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup(ENV_HOST);
        let password = lookup(ENV_PASSWORD);

        let mut missing = Vec::new();
        if host.is_none() {
            missing.push(ENV_HOST);
        }
        if password.is_none() {
            missing.push(ENV_PASSWORD);
        }
        if !missing.is_empty() {
            return Err(missing_env(&missing));
        }

        let port = match lookup(ENV_PORT) {
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                Error::Config(format!("{} must be a port number, got '{}'", ENV_PORT, raw))
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host: host.unwrap_or_default(),
            user: lookup(ENV_USER).unwrap_or_else(|| DEFAULT_USER.to_string()),
            password: password.unwrap_or_default(),
            port,
            connect_timeout: CONNECT_TIMEOUT,
        })
    }
}

/// Inputs for the full provisioning workflow.
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    /// Public domain the site is served under; defaults to the host address.
    pub domain: String,
    /// Remote application directory.
    pub app_dir: String,
    /// Local project tree to mirror.
    pub project_dir: PathBuf,
}

impl ProvisionConfig {
    pub fn from_env(fallback_domain: &str) -> Result<Self> {
        Self::from_lookup(env_lookup, fallback_domain)
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        fallback_domain: &str,
    ) -> Result<Self> {
        Ok(Self {
            domain: lookup(ENV_DOMAIN).unwrap_or_else(|| fallback_domain.to_string()),
            app_dir: lookup(ENV_APP_DIR).unwrap_or_else(|| DEFAULT_APP_DIR.to_string()),
            project_dir: project_dir(&lookup)?,
        })
    }
}

/// Inputs for the one-shot remote command script.
#[derive(Debug, Clone)]
pub struct ExecConfig {
    pub command: String,
}

impl ExecConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        match lookup(ENV_COMMAND) {
            Some(command) => Ok(Self { command }),
            None => Err(missing_env(&[ENV_COMMAND])),
        }
    }
}

/// Inputs for running a management command inside the remote virtualenv.
#[derive(Debug, Clone)]
pub struct ManageConfig {
    pub app_dir: String,
    pub command: String,
}

impl ManageConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            app_dir: lookup(ENV_APP_DIR).unwrap_or_else(|| DEFAULT_APP_DIR.to_string()),
            command: lookup(ENV_MANAGE_COMMAND)
                .unwrap_or_else(|| DEFAULT_MANAGE_COMMAND.to_string()),
        })
    }
}

/// Inputs for the asset push script.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub app_dir: String,
    pub project_dir: PathBuf,
}

impl SyncConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            app_dir: lookup(ENV_APP_DIR).unwrap_or_else(|| DEFAULT_APP_DIR.to_string()),
            project_dir: project_dir(&lookup)?,
        })
    }
}

fn project_dir(lookup: impl Fn(&str) -> Option<String>) -> Result<PathBuf> {
    let raw = lookup(ENV_PROJECT_DIR).unwrap_or_else(|| ".".to_string());
    let expanded = shellexpand::tilde(&raw).to_string();
    let path = PathBuf::from(expanded);
    if !path.is_dir() {
        return Err(Error::Config(format!(
            "{} is not a directory: {}",
            ENV_PROJECT_DIR,
            path.display()
        )));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn host_config_reads_values_and_defaults() {
        let cfg =
            HostConfig::from_lookup(lookup_from(&[("VPS_HOST", "vps.example"), ("PASSWORD", "s3")]))
                .unwrap();
        assert_eq!(cfg.host, "vps.example");
        assert_eq!(cfg.user, "root");
        assert_eq!(cfg.port, 22);
        assert_eq!(cfg.password, "s3");
        assert_eq!(cfg.connect_timeout, Duration::from_secs(30));
    }

    #[test]
    fn host_config_missing_vars_names_them_all() {
        let err = HostConfig::from_lookup(lookup_from(&[])).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("VPS_HOST"));
        assert!(message.contains("PASSWORD"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn host_config_rejects_bad_port() {
        let err = HostConfig::from_lookup(lookup_from(&[
            ("VPS_HOST", "h"),
            ("PASSWORD", "p"),
            ("VPS_PORT", "not-a-port"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("VPS_PORT"));
    }

    #[test]
    fn exec_config_requires_cmd() {
        let err = ExecConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("CMD"));

        let cfg = ExecConfig::from_lookup(lookup_from(&[("CMD", "uptime")])).unwrap();
        assert_eq!(cfg.command, "uptime");
    }

    #[test]
    fn manage_config_defaults_to_help() {
        let cfg = ManageConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg.app_dir, "/opt/app/webapp");
        assert_eq!(cfg.command, "python manage.py --help");
    }

    #[test]
    fn provision_config_domain_falls_back_to_host() {
        let dir = tempfile::tempdir().unwrap();
        let dir_str = dir.path().to_string_lossy().to_string();
        let cfg = ProvisionConfig::from_lookup(
            lookup_from(&[("PROJECT_DIR", &dir_str)]),
            "203.0.113.9",
        )
        .unwrap();
        assert_eq!(cfg.domain, "203.0.113.9");
        assert_eq!(cfg.app_dir, "/opt/app/webapp");
        assert_eq!(cfg.project_dir, dir.path());
    }

    #[test]
    fn provision_config_rejects_missing_project_dir() {
        let err = ProvisionConfig::from_lookup(
            lookup_from(&[("PROJECT_DIR", "/definitely/not/here")]),
            "h",
        )
        .unwrap_err();
        assert!(err.to_string().contains("PROJECT_DIR"));
    }
}
