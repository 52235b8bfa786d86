//! # CLI
//!
//! This module defines the command-line interface of `conduit` using `clap`.
//!
//! It is responsible for parsing user input and validating it early (e.g., method names must be
//! `app.method`, parameters must be a JSON object).
use clap::{ArgAction, Args, Parser, Subcommand};
use conduit_core::client::Params;
use std::{path::PathBuf, time::Duration};

#[derive(Parser)]
#[command(name = "conduit", version, about = "Dynamic Conduit (Phabricator API) CLI")]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `CONDUIT_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection settings. Anything not given here is read from the arc configuration files
/// (`/etc/arcconfig`, `~/.arcrc`, `./.arcconfig`, `./.git/arc/config`).
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// API base URL (e.g. https://phabricator.example.com/api/)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Conduit API token
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// User name, for certificate authentication
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Conduit certificate, for certificate authentication
    #[arg(long, global = true)]
    pub cert: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value = "5", value_parser = parse_timeout)]
    pub timeout: Duration,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Call a remote method
    ///
    /// Arguments are validated against the catalog before anything is sent. Methods missing from
    /// the catalog can still be called; they are sent without validation.
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// conduit call maniphest.find --params '{"ids": [1, 2]}'
    /// conduit call diffusion.repository.edit --params '{"transactions": []}'
    /// ```
    Call {
        /// Method name (app.method)
        #[arg(value_parser = parse_method)]
        method: String,

        /// JSON object with the call arguments
        #[arg(long, default_value = "{}", value_parser = parse_params)]
        params: Params,
    },

    /// List apps, or the methods of one app
    List {
        /// Only list the methods of this app
        app: Option<String>,

        /// Use the server's live catalog instead of the bundled one
        #[arg(long)]
        live: bool,
    },

    /// Describe a method's parameters
    Describe {
        /// Method name (app.method)
        #[arg(value_parser = parse_method)]
        method: String,

        /// Use the server's live catalog instead of the bundled one
        #[arg(long)]
        live: bool,
    },

    /// Generate Markdown documentation for the catalog
    Docs {
        /// Directory the pages are written to
        output_dir: PathBuf,

        /// Use the server's live catalog instead of the bundled one
        #[arg(long)]
        live: bool,
    },

    /// Check that the server is reachable and the credentials work
    Ping,
}

fn parse_method(value: &str) -> Result<String, String> {
    let (app, method) = value
        .split_once('.')
        .ok_or_else(|| format!("Invalid method name: '{value}'. Expected 'app.method'"))?;

    if app.trim().is_empty() || method.trim().is_empty() {
        return Err("App and method names cannot be empty".to_string());
    }

    Ok(value.to_string())
}

fn parse_params(value: &str) -> Result<Params, String> {
    match serde_json::from_str(value) {
        Ok(serde_json::Value::Object(params)) => Ok(params),
        Ok(_) => Err("Parameters must be a JSON object".to_string()),
        Err(e) => Err(format!("Invalid JSON: {e}")),
    }
}

fn parse_timeout(value: &str) -> Result<Duration, String> {
    let secs: f64 = value
        .parse()
        .map_err(|_| format!("Invalid timeout: '{value}'"))?;

    Duration::try_from_secs_f64(secs).map_err(|e| format!("Invalid timeout: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_call() {
        let cli = Cli::try_parse_from([
            "conduit",
            "--host",
            "https://phab.example.com/api/",
            "call",
            "diffusion.repository.edit",
            "--params",
            r#"{"transactions": []}"#,
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(
            cli.connection.host.as_deref(),
            Some("https://phab.example.com/api/")
        );
        assert_eq!(cli.connection.timeout, Duration::from_secs(5));

        match cli.command {
            Commands::Call { method, params } => {
                assert_eq!(method, "diffusion.repository.edit");
                assert_eq!(params["transactions"], json!([]));
            }
            _ => panic!("expected the call command"),
        }
    }

    #[test]
    fn test_call_params_default_to_empty() {
        let cli = Cli::try_parse_from(["conduit", "call", "user.whoami"]).unwrap();

        match cli.command {
            Commands::Call { params, .. } => assert!(params.is_empty()),
            _ => panic!("expected the call command"),
        }
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Cli::try_parse_from(["conduit", "call", "whoami"]).is_err());
        assert!(Cli::try_parse_from(["conduit", "describe", ".whoami"]).is_err());
        assert!(
            Cli::try_parse_from(["conduit", "call", "user.whoami", "--params", "[1]"]).is_err()
        );
        assert!(Cli::try_parse_from(["conduit", "--timeout", "-1", "ping"]).is_err());
    }

    #[test]
    fn test_parse_params() {
        assert_eq!(parse_params(r#"{"a": 1}"#).unwrap()["a"], json!(1));
        assert!(parse_params("nope").unwrap_err().starts_with("Invalid JSON"));
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("2.5").unwrap(), Duration::from_millis(2500));
        assert!(parse_timeout("soon").is_err());
    }
}
