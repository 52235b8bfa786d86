//! # Conduit CLI Entry Point
//!
//! The main executable for the Conduit tool. This file drives the application lifecycle:
//!
//! 1. **Initialization**: Parses command-line arguments using [`cli::Cli`] and installs logging.
//! 2. **Configuration**: Merges the arc configuration files with the command-line overrides.
//! 3. **Execution**: Delegates the request processing to the `ConduitClient`.
//! 4. **Presentation**: Formats and prints the resulting data or error to standard output/error.
mod cli;
mod docgen;
mod formatter;
mod telemetry;

use clap::Parser;
use cli::{Cli, Commands, ConnectionArgs};
use conduit_core::{
    arcrc::{Arcrc, ConnectionOverrides},
    catalog::{Schema, default_schema},
    client::{ConduitClient, Params},
};
use formatter::{AppList, FormattedString, GenericError, MethodDescription, MethodList};
use std::{path::Path, process};

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    telemetry::init(args.verbose);

    let connection = args.connection;

    match args.command {
        Commands::Call { method, params } => run_call(&connection, &method, params).await,
        Commands::List { app, live } => list(&connection, app.as_deref(), live).await,
        Commands::Describe { method, live } => describe(&connection, &method, live).await,
        Commands::Docs { output_dir, live } => docs(&connection, &output_dir, live).await,
        Commands::Ping => run_call(&connection, "conduit.ping", Params::new()).await,
    }
}

fn exit_with(message: impl Into<FormattedString>) -> ! {
    eprintln!("{}", message.into());
    process::exit(1);
}

fn connect_or_exit(connection: &ConnectionArgs) -> ConduitClient {
    let arcrc = Arcrc::load().unwrap_or_else(|err| exit_with(err));

    let overrides = ConnectionOverrides {
        host: connection.host.clone(),
        token: connection.token.clone(),
        user: connection.user.clone(),
        cert: connection.cert.clone(),
    };

    let config = arcrc
        .resolve(overrides)
        .unwrap_or_else(|err| exit_with(err))
        .with_timeout(connection.timeout);

    tracing::debug!(host = %config.host, "resolved connection");

    ConduitClient::new(config).unwrap_or_else(|err| exit_with(err))
}

async fn schema_or_exit(connection: &ConnectionArgs, live: bool) -> Schema {
    if !live {
        return default_schema();
    }

    let mut client = connect_or_exit(connection);
    match client.refresh_catalog().await {
        Ok(methods) => {
            tracing::info!(methods, "fetched live catalog");
            client.schema().clone()
        }
        Err(err) => exit_with(err),
    }
}

async fn run_call(connection: &ConnectionArgs, method: &str, params: Params) {
    let mut client = connect_or_exit(connection);

    match client.call(method, params).await {
        Ok(result) => println!("{}", FormattedString::from(result)),
        Err(err) => exit_with(err),
    }
}

async fn list(connection: &ConnectionArgs, app: Option<&str>, live: bool) {
    let schema = schema_or_exit(connection, live).await;

    match app {
        Some(app) => match schema.app(app) {
            Some(methods) => println!("{}", FormattedString::from(MethodList { app, methods })),
            None => exit_with(GenericError("App not found", app)),
        },
        None => {
            let apps = schema
                .apps()
                .map(|app| (app.to_string(), schema.app(app).map_or(0, |m| m.len())))
                .collect();
            println!("{}", FormattedString::from(AppList(apps)));
        }
    }
}

async fn describe(connection: &ConnectionArgs, method: &str, live: bool) {
    let schema = schema_or_exit(connection, live).await;

    match schema.method_by_path(method) {
        Some(schema) => println!(
            "{}",
            FormattedString::from(MethodDescription {
                name: method,
                schema
            })
        ),
        None => exit_with(GenericError("Method not found in the catalog", method)),
    }
}

async fn docs(connection: &ConnectionArgs, output_dir: &Path, live: bool) {
    let schema = schema_or_exit(connection, live).await;

    match docgen::generate(output_dir, &schema) {
        Ok(written) => {
            for filename in written {
                println!("Generated: {filename}");
            }
        }
        Err(err) => exit_with(err),
    }
}
