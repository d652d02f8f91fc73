use crate::args::ProvisionArgs;
use aksup_cloud::{
    Authenticator, CancellationToken, OperationPoller, ResourceState, ServicePrincipal,
    outcome_into_result,
};
use aksup_cloud_azure::{AzureControlPlane, AzureError, AzureSettings, ClientSecretAuthenticator};
use anyhow::Context;
use colored::Colorize;

pub async fn handle(args: &ProvisionArgs) -> anyhow::Result<()> {
    let config = args.resolve()?;
    let settings = AzureSettings::from_env()
        .map_err(AzureError::into_auth)
        .context("failed to load Azure settings")?;

    println!("{}", "Creating AKS cluster...".blue());
    println!("  {} {}", "Resource group:".bold(), config.resource_group.cyan());
    println!("  {} {}", "Cluster:".bold(), config.cluster_name.cyan());
    println!("  {} {}", "Location:".bold(), config.location);
    println!(
        "  {} {} x {}",
        "Nodes:".bold(),
        config.node_pool.count,
        config.node_pool.vm_size
    );

    let authenticator = ClientSecretAuthenticator::new(settings.clone());
    let credentials = authenticator.get_credentials().await?;

    let spec = super::build_spec(
        &config,
        &settings.subscription_id,
        Some(ServicePrincipal {
            client_id: settings.client_id.clone(),
            secret: settings.client_secret.clone(),
        }),
    )?;

    let control_plane = AzureControlPlane::new(&settings, credentials);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, stopping local polling");
            on_interrupt.cancel();
        }
    });

    let poller = OperationPoller::new(&control_plane)
        .with_interval(config.poll_interval())
        .with_cancellation(cancel);

    let handle = poller
        .submit(&config.resource_group, &config.cluster_name, &spec)
        .await?;
    println!("{} operation {}", "✓".green(), handle.to_string().cyan());

    let outcome = poller.poll_until_done(&handle).await?;
    let cluster = outcome_into_result(&handle, outcome)?;

    tracing::info!("ok");
    print_summary(&cluster);
    Ok(())
}

fn print_summary(cluster: &ResourceState) {
    println!();
    println!("{} {}", "✓".green(), "Cluster is ready".green().bold());
    println!("  {} {}", "Name:".bold(), cluster.name.cyan());
    if !cluster.id.is_empty() {
        println!("  {} {}", "Id:".bold(), cluster.id);
    }
    println!("  {} {}", "Status:".bold(), cluster.status);
    if let Some(fqdn) = &cluster.fqdn {
        println!("  {} {}", "FQDN:".bold(), fqdn);
    }
    if let Some(version) = &cluster.kubernetes_version {
        println!("  {} {}", "Kubernetes:".bold(), version);
    }
    if let Some(nodes) = cluster.get_attribute::<u32>("node_count") {
        println!("  {} {}", "Nodes:".bold(), nodes);
    }
    if let Some(rg) = cluster.get_attribute::<String>("node_resource_group") {
        println!("  {} {}", "Node resource group:".bold(), rg);
    }
}
