use anyhow::{Context, Result};
use directories::BaseDirs;
use std::path::PathBuf;

use crate::config::Config;
use crate::system::default_hosts_file;

/// Overrides the base directory (~/.hostswap)
pub const HOME_ENV: &str = "HOSTSWAP_HOME";
/// Overrides the live hosts file location
pub const HOSTS_FILE_ENV: &str = "HOSTSWAP_HOSTS_FILE";

/// Extension of profile files inside the profiles directory
pub const PROFILE_EXTENSION: &str = "txt";

/// All computed paths used by hostswap
#[derive(Debug, Clone)]
pub struct Paths {
    /// ~/.hostswap
    pub base_dir: PathBuf,
    /// ~/.hostswap/profiles
    pub profiles_dir: PathBuf,
    /// ~/.hostswap/config.json
    pub config_file: PathBuf,
    /// The live hosts file, e.g. /etc/hosts
    pub hosts_file: PathBuf,
}

impl Paths {
    /// Resolve paths from the environment, the config file and platform defaults.
    ///
    /// Priority for the hosts file: `HOSTSWAP_HOSTS_FILE`, then `hosts_file`
    /// in config.json, then the platform location.
    pub fn new() -> Result<Self> {
        let base_dir = match std::env::var_os(HOME_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => {
                let base_dirs = BaseDirs::new().context("Failed to determine home directory")?;
                base_dirs.home_dir().join(".hostswap")
            }
        };

        Self::resolve(base_dir)
    }

    fn resolve(base_dir: PathBuf) -> Result<Self> {
        let config_file = base_dir.join("config.json");
        let config = Config::read(&config_file)?;

        let profiles_dir = config
            .profiles_dir
            .unwrap_or_else(|| base_dir.join("profiles"));

        let hosts_file = std::env::var_os(HOSTS_FILE_ENV)
            .map(PathBuf::from)
            .or(config.hosts_file)
            .unwrap_or_else(default_hosts_file);

        Ok(Self {
            base_dir,
            profiles_dir,
            config_file,
            hosts_file,
        })
    }

    /// Get the path of a profile file
    pub fn profile_file(&self, name: &str) -> PathBuf {
        self.profiles_dir
            .join(format!("{}.{}", name, PROFILE_EXTENSION))
    }

    /// Ensure all required directories exist
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.profiles_dir).with_context(|| {
            format!(
                "Failed to create profiles directory: {:?}",
                self.profiles_dir
            )
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    struct EnvGuard(&'static str, Option<std::ffi::OsString>);

    impl EnvGuard {
        fn set(key: &'static str, value: impl AsRef<std::ffi::OsStr>) -> Self {
            let prev = std::env::var_os(key);
            unsafe { std::env::set_var(key, value) };
            Self(key, prev)
        }

        fn unset(key: &'static str) -> Self {
            let prev = std::env::var_os(key);
            unsafe { std::env::remove_var(key) };
            Self(key, prev)
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.1 {
                Some(v) => unsafe { std::env::set_var(self.0, v) },
                None => unsafe { std::env::remove_var(self.0) },
            }
        }
    }

    #[test]
    #[serial]
    fn test_profile_file_path() {
        let temp_dir = TempDir::new().unwrap();
        let _home = EnvGuard::set(HOME_ENV, temp_dir.path());

        let paths = Paths::new().unwrap();
        let profile_path = paths.profile_file("work");
        assert!(profile_path.ends_with("profiles/work.txt"));
        assert!(profile_path.starts_with(temp_dir.path()));
    }

    #[test]
    #[serial]
    fn test_hosts_file_priority() {
        let temp_dir = TempDir::new().unwrap();
        let _home = EnvGuard::set(HOME_ENV, temp_dir.path());
        let _hosts = EnvGuard::unset(HOSTS_FILE_ENV);

        let paths = Paths::new().unwrap();
        assert_eq!(paths.hosts_file, default_hosts_file());

        std::fs::write(
            temp_dir.path().join("config.json"),
            r#"{"hosts_file": "/srv/hosts"}"#,
        )
        .unwrap();
        let paths = Paths::new().unwrap();
        assert_eq!(paths.hosts_file, PathBuf::from("/srv/hosts"));

        let _override = EnvGuard::set(HOSTS_FILE_ENV, "/tmp/override-hosts");
        let paths = Paths::new().unwrap();
        assert_eq!(paths.hosts_file, PathBuf::from("/tmp/override-hosts"));
    }

    #[test]
    #[serial]
    fn test_profiles_dir_from_config() {
        let temp_dir = TempDir::new().unwrap();
        let _home = EnvGuard::set(HOME_ENV, temp_dir.path());
        let custom = temp_dir.path().join("elsewhere");
        std::fs::write(
            temp_dir.path().join("config.json"),
            serde_json::json!({ "profiles_dir": custom }).to_string(),
        )
        .unwrap();

        let paths = Paths::new().unwrap();
        assert_eq!(paths.profiles_dir, custom);

        paths.ensure_dirs().unwrap();
        assert!(custom.is_dir());
    }
}
