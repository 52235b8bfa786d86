//! # Arc Configuration
//!
//! Hosts and credentials are usually configured the way `arc` (Arcanist) expects them: JSON
//! files of the shape
//!
//! ```json
//! {
//!   "hosts": {
//!     "https://phabricator.example.com/api/": {
//!       "user": "alice",
//!       "cert": "...",
//!       "token": "api-..."
//!     }
//!   }
//! }
//! ```
//!
//! read from several layers, each later one overriding the host entries of the earlier ones:
//!
//! 1. system: `/etc/arcconfig` (`%ProgramData%\Phabricator\Arcanist\config` on Windows)
//! 2. user: `~/.arcrc` (`%AppData%\.arcrc` on Windows)
//! 3. project: `./.arcconfig`
//! 4. local project: `./.git/arc/config`
//!
//! The first configured host is the default one. [`Arcrc::resolve`] combines the files with
//! explicit overrides into a [`ConduitConfig`].
use crate::client::{ConduitConfig, ConfigurationError, Credentials};
use indexmap::IndexMap;
use serde::Deserialize;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

/// Credentials configured for one host. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HostConfig {
    pub user: Option<String>,
    pub cert: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ArcFile {
    #[serde(default)]
    hosts: IndexMap<String, HostConfig>,
}

/// Values given explicitly, e.g. on the command line. They win over file values.
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
    pub host: Option<String>,
    pub token: Option<String>,
    pub user: Option<String>,
    pub cert: Option<String>,
}

/// The merged contents of every arc configuration layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arcrc {
    hosts: IndexMap<String, HostConfig>,
}

impl Arcrc {
    /// Reads the standard configuration layers. Missing files are skipped.
    pub fn load() -> Result<Self, ConfigurationError> {
        Self::load_from(&default_paths())
    }

    /// Reads `paths` in order, later files overriding the host entries of earlier ones.
    /// Missing files are skipped.
    pub fn load_from<P: AsRef<Path>>(paths: &[P]) -> Result<Self, ConfigurationError> {
        let mut arcrc = Self::default();

        for path in paths {
            let path = path.as_ref();
            let bytes = match std::fs::read(path) {
                Ok(bytes) => bytes,
                Err(err) if err.kind() == ErrorKind::NotFound => continue,
                Err(source) => {
                    return Err(ConfigurationError::ReadFailed {
                        path: path.to_path_buf(),
                        source,
                    });
                }
            };

            let file: ArcFile =
                serde_json::from_slice(&bytes).map_err(|source| ConfigurationError::Malformed {
                    path: path.to_path_buf(),
                    source,
                })?;

            tracing::debug!(
                path = %path.display(),
                hosts = file.hosts.len(),
                "loaded arc config"
            );
            arcrc.merge(file.hosts);
        }

        Ok(arcrc)
    }

    /// Adds or replaces a host entry.
    pub fn insert(&mut self, host: impl Into<String>, config: HostConfig) {
        self.hosts.insert(host.into(), config);
    }

    pub fn hosts(&self) -> impl Iterator<Item = (&str, &HostConfig)> {
        self.hosts.iter().map(|(host, config)| (host.as_str(), config))
    }

    /// The first configured host.
    pub fn default_host(&self) -> Option<&str> {
        self.hosts.keys().next().map(String::as_str)
    }

    /// Looks up a host, ignoring a trailing `/` on either side.
    pub fn host(&self, host: &str) -> Option<&HostConfig> {
        let wanted = host.trim_end_matches('/');
        self.hosts
            .iter()
            .find(|(candidate, _)| candidate.trim_end_matches('/') == wanted)
            .map(|(_, config)| config)
    }

    /// Builds the client configuration for the overridden host, or the default one.
    ///
    /// A token, from the overrides or the file, takes precedence over a user/certificate pair.
    pub fn resolve(
        &self,
        overrides: ConnectionOverrides,
    ) -> Result<ConduitConfig, ConfigurationError> {
        let host = overrides
            .host
            .or_else(|| self.default_host().map(str::to_string))
            .ok_or(ConfigurationError::NoHost)?;

        let file = self.host(&host).cloned().unwrap_or_default();

        let credentials = match overrides.token.or(file.token) {
            Some(token) => Credentials::Token(token),
            None => match (overrides.user.or(file.user), overrides.cert.or(file.cert)) {
                (Some(user), Some(certificate)) => Credentials::Certificate { user, certificate },
                _ => return Err(ConfigurationError::MissingCredentials(host)),
            },
        };

        ConduitConfig::new(&host, credentials)
    }

    fn merge(&mut self, hosts: IndexMap<String, HostConfig>) {
        for (host, config) in hosts {
            self.hosts.insert(host, config);
        }
    }
}

/// The configuration layers, lowest precedence first.
pub fn default_paths() -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(4);

    if cfg!(windows) {
        if let Some(program_data) = std::env::var_os("ProgramData") {
            paths.push(
                PathBuf::from(program_data)
                    .join("Phabricator")
                    .join("Arcanist")
                    .join("config"),
            );
        }
        if let Some(app_data) = dirs::config_dir() {
            paths.push(app_data.join(".arcrc"));
        }
    } else {
        paths.push(PathBuf::from("/etc/arcconfig"));
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".arcrc"));
        }
    }

    paths.push(PathBuf::from(".arcconfig"));
    paths.push(PathBuf::from(".git").join("arc").join("config"));
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_layers_override_per_host() {
        let dir = TempDir::new().unwrap();
        let system = write(
            &dir,
            "system",
            r#"{"hosts": {
                "https://a.example.com/api/": {"user": "alice", "cert": "old"},
                "https://b.example.com/api/": {"token": "api-b"}
            }}"#,
        );
        let user = write(
            &dir,
            "user",
            r#"{"hosts": {"https://a.example.com/api/": {"token": "api-a"}}, "config": {}}"#,
        );
        let missing = dir.path().join("does-not-exist");

        let arcrc = Arcrc::load_from(&[system, missing, user]).unwrap();

        assert_eq!(arcrc.default_host(), Some("https://a.example.com/api/"));
        assert_eq!(
            arcrc.host("https://a.example.com/api"),
            Some(&HostConfig {
                token: Some("api-a".to_string()),
                ..HostConfig::default()
            })
        );
        assert_eq!(arcrc.hosts().count(), 2);
    }

    #[test]
    fn test_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "arcrc", "{not json");

        let err = Arcrc::load_from(&[path]).unwrap_err();
        assert!(matches!(err, ConfigurationError::Malformed { .. }));
    }

    #[test]
    fn test_resolve_defaults_to_first_host() {
        let mut arcrc = Arcrc::default();
        arcrc.insert(
            "https://phab.example.com/api/",
            HostConfig {
                user: Some("alice".to_string()),
                cert: Some("secret".to_string()),
                token: None,
            },
        );

        let config = arcrc.resolve(ConnectionOverrides::default()).unwrap();

        assert_eq!(config.host.as_str(), "https://phab.example.com/api/");
        assert_eq!(
            config.credentials,
            Credentials::Certificate {
                user: "alice".to_string(),
                certificate: "secret".to_string()
            }
        );
    }

    #[test]
    fn test_resolve_overrides_win() {
        let mut arcrc = Arcrc::default();
        arcrc.insert(
            "https://phab.example.com/api/",
            HostConfig {
                token: Some("from-file".to_string()),
                ..HostConfig::default()
            },
        );

        let config = arcrc
            .resolve(ConnectionOverrides {
                token: Some("from-flag".to_string()),
                ..ConnectionOverrides::default()
            })
            .unwrap();

        assert_eq!(config.credentials, Credentials::Token("from-flag".to_string()));
    }

    #[test]
    fn test_resolve_errors() {
        let arcrc = Arcrc::default();
        assert!(matches!(
            arcrc.resolve(ConnectionOverrides::default()),
            Err(ConfigurationError::NoHost)
        ));

        let err = arcrc
            .resolve(ConnectionOverrides {
                host: Some("https://phab.example.com/api/".to_string()),
                user: Some("alice".to_string()),
                ..ConnectionOverrides::default()
            })
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingCredentials(_)));
        assert_eq!(
            err.to_string(),
            "No token or user/certificate pair configured for host 'https://phab.example.com/api/'"
        );
    }
}
