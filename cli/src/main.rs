/*!

This is the command line interface for checking that a cluster controller records Kubernetes
`Event`s about the `Cluster` objects it manages.

!*/

mod crd;
mod delete;
mod install;
mod status;
mod verify;
mod watch;

use anyhow::{Context, Result};
use capi_model::ClusterManager;
use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;
use std::path::PathBuf;

/// The command line interface for checking that a cluster controller reacts to `Cluster` objects.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
    /// Set logging verbosity [trace|debug|info|warn|error]. If the environment variable `RUST_LOG`
    /// is present, it overrides the default logging behavior. See https://docs.rs/env_logger/latest
    #[clap(long = "log-level", default_value = "info")]
    log_level: LevelFilter,
    /// Path to the kubeconfig file. Also can be passed with the KUBECONFIG environment variable.
    #[clap(long = "kubeconfig")]
    kubeconfig: Option<PathBuf>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Parser)]
enum Command {
    /// Print the `Cluster` CRD.
    Crd(crd::Crd),
    /// Install the `Cluster` CRD into the cluster.
    Install(install::Install),
    /// Create a `Cluster` and wait for the controller to record an event about it.
    Verify(verify::Verify),
    /// Print events about `Cluster` objects as they are recorded.
    Watch(watch::Watch),
    /// Get the status of `Cluster` objects.
    Status(status::Status),
    /// Delete a `Cluster`.
    Delete(delete::Delete),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logger(args.log_level);
    if let Err(e) = run(args).await {
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let kubeconfig = args.kubeconfig;
    match args.command {
        // Printing the CRD does not need a cluster.
        Command::Crd(crd) => crd.run(),
        Command::Install(install) => install.run(manager(kubeconfig).await?).await,
        Command::Verify(verify) => verify.run(manager(kubeconfig).await?).await,
        Command::Watch(watch) => watch.run(manager(kubeconfig).await?).await,
        Command::Status(status) => status.run(manager(kubeconfig).await?).await,
        Command::Delete(delete) => delete.run(manager(kubeconfig).await?).await,
    }
}

async fn manager(kubeconfig: Option<PathBuf>) -> Result<ClusterManager> {
    match kubeconfig {
        Some(path) => ClusterManager::new_from_kubeconfig_path(&path)
            .await
            .context(format!(
                "Unable to create cluster manager from path '{:?}'",
                path
            )),
        None => ClusterManager::new()
            .await
            .context("Unable to create default cluster manager"),
    }
}

/// Initialize the logger with the value passed by `--log-level` (or its default) when the
/// `RUST_LOG` environment variable is not present. If present, the `RUST_LOG` environment variable
/// overrides `--log-level`/`level`.
fn init_logger(level: LevelFilter) {
    match std::env::var(env_logger::DEFAULT_FILTER_ENV).ok() {
        Some(_) => {
            // RUST_LOG exists; env_logger will use it.
            Builder::from_default_env().init();
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate and the library.
            Builder::new()
                .filter(Some(env!("CARGO_CRATE_NAME")), level)
                .filter(Some("capi_model"), level)
                .init();
        }
    }
}
