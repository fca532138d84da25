//! Command-line argument parsing

use crate::config::ClientConfig;
use crate::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "blob-transfer")]
#[command(about = "Move blobs to and from a Docker/OCI registry")]
#[command(version)]
pub struct Args {
    /// Registry address; falls back to REGISTRY_ADDRESS
    #[arg(
        long = "registry",
        short = 'r',
        global = true,
        help = "Registry base URL, e.g. https://registry.example.com"
    )]
    pub registry: Option<String>,

    /// Registry username
    #[arg(long = "username", short = 'u', global = true)]
    pub username: Option<String>,

    /// Registry password
    #[arg(long = "password", short = 'p', global = true)]
    pub password: Option<String>,

    /// Bearer token used instead of username/password
    #[arg(long = "token", global = true)]
    pub token: Option<String>,

    /// Skip TLS verification
    #[arg(long = "skip-tls", short = 'k', global = true)]
    pub skip_tls: bool,

    /// Timeout in seconds for each operation (0 disables it)
    #[arg(long = "timeout", short = 't', global = true)]
    pub timeout: Option<u64>,

    /// Verbose output
    #[arg(long = "verbose", short = 'v', global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(long = "quiet", short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Check whether a blob exists
    Exists { repository: String, digest: String },

    /// Download a blob to a file or stdout
    Pull {
        repository: String,
        digest: String,
        /// Destination file (stdout when omitted)
        #[arg(long = "output", short = 'o')]
        output: Option<PathBuf>,
    },

    /// Upload a file as a blob
    Push {
        repository: String,
        file: PathBuf,
        /// Declared digest (sha256 of the file when omitted)
        #[arg(long = "digest")]
        digest: Option<String>,
        /// Skip the upload when the registry already has the blob
        #[arg(long = "skip-existing")]
        skip_existing: bool,
    },

    /// Download a JSON config blob and print it
    Config { repository: String, digest: String },
}

impl Args {
    /// Client configuration from flags, with REGISTRY_* environment fallback
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.registry {
            Some(registry) => ClientConfig::new(registry.clone()),
            None => ClientConfig::from_env()?,
        };

        if self.username.is_some() {
            config.auth.username = self.username.clone();
        }
        if self.password.is_some() {
            config.auth.password = self.password.clone();
        }
        if self.token.is_some() {
            config.auth.token = self.token.clone();
        }
        if self.skip_tls {
            config.skip_tls = true;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = Some(Duration::from_secs(timeout));
        }
        config.verbose = self.verbose;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_push_command() {
        let args = Args::try_parse_from([
            "blob-transfer",
            "--registry",
            "http://localhost:5000",
            "push",
            "library/app",
            "layer.tar.gz",
            "--skip-existing",
            "-u",
            "alice",
            "-p",
            "secret",
        ])
        .unwrap();

        match &args.command {
            Command::Push {
                repository,
                file,
                digest,
                skip_existing,
            } => {
                assert_eq!(repository, "library/app");
                assert_eq!(file, &PathBuf::from("layer.tar.gz"));
                assert!(digest.is_none());
                assert!(*skip_existing);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let config = args.client_config().unwrap();
        assert_eq!(config.registry_url, "http://localhost:5000");
        assert_eq!(config.auth.username.as_deref(), Some("alice"));
        assert_eq!(config.auth.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_timeout_override() {
        let args = Args::try_parse_from([
            "blob-transfer",
            "-r",
            "localhost:5000",
            "-t",
            "12",
            "exists",
            "repo",
            "sha256:abc",
        ])
        .unwrap();
        assert_eq!(
            args.client_config().unwrap().timeout(),
            Some(Duration::from_secs(12))
        );
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Args::try_parse_from([
            "blob-transfer",
            "-q",
            "-v",
            "config",
            "repo",
            "sha256:abc",
        ]);
        assert!(result.is_err());
    }
}
