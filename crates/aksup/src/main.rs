mod args;
mod commands;

use aksup_cloud::CloudError;
use args::ProvisionArgs;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aksup")]
#[command(about = "Provision an AKS cluster and wait until it is ready", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create (or update) the cluster and wait for the operation to finish
    Create(ProvisionArgs),
    /// Print the request body without contacting Azure
    Plan(ProvisionArgs),
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries command output; logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let result = match cli.command {
        Commands::Create(args) => commands::create::handle(&args).await,
        Commands::Plan(args) => commands::plan::handle(&args),
        Commands::Version => {
            println!("aksup {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::error!("{:#}", e);
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(exit_code(&e));
    }

    Ok(())
}

/// Distinct exit codes per failure category, 1 for anything else
fn exit_code(err: &anyhow::Error) -> i32 {
    let Some(e) = err.downcast_ref::<CloudError>() else {
        return 1;
    };
    match e {
        CloudError::Authentication(_) => 2,
        CloudError::Submission(_) => 3,
        CloudError::Operation(_) => 4,
        CloudError::ResultFetch(_) => 5,
        CloudError::Cancelled(_) => 130,
        CloudError::InvalidConfig(_) | CloudError::Io(_) | CloudError::Json(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_by_category() {
        let err = anyhow::Error::new(CloudError::Operation("Conflict: busy".into()));
        assert_eq!(exit_code(&err), 4);

        let err = anyhow::Error::new(CloudError::Authentication("denied".into()))
            .context("failed to authenticate");
        assert_eq!(exit_code(&err), 2);

        let err = anyhow::Error::new(CloudError::Cancelled("op-1".into()));
        assert_eq!(exit_code(&err), 130);

        let err = anyhow::Error::new(CloudError::InvalidConfig("bad".into()));
        assert_eq!(exit_code(&err), 1);

        let err = anyhow::anyhow!("config broken");
        assert_eq!(exit_code(&err), 1);
    }

    #[test]
    fn test_cli_parses_create_flags() {
        let cli = Cli::try_parse_from([
            "aksup",
            "create",
            "--resource-group",
            "rg",
            "--name",
            "c1",
            "--node-count",
            "2",
        ])
        .unwrap();

        match cli.command {
            Commands::Create(args) => {
                assert_eq!(args.resource_group.as_deref(), Some("rg"));
                assert_eq!(args.cluster_name.as_deref(), Some("c1"));
                assert_eq!(args.node_count, Some(2));
            }
            _ => panic!("expected create"),
        }
    }
}
