use crate::args::ProvisionArgs;
use aksup_cloud::ServicePrincipal;
use aksup_cloud_azure::{API_VERSION, AzureSettings, ManagedCluster};
use colored::Colorize;

const SUBSCRIPTION_PLACEHOLDER: &str = "<subscription-id>";

pub fn handle(args: &ProvisionArgs) -> anyhow::Result<()> {
    let config = args.resolve()?;

    // Settings are optional here; nothing is sent
    let settings = AzureSettings::from_env().ok();
    let subscription_id = settings
        .as_ref()
        .map(|s| s.subscription_id.as_str())
        .unwrap_or(SUBSCRIPTION_PLACEHOLDER);
    let service_principal = settings.as_ref().map(|s| ServicePrincipal {
        client_id: s.client_id.clone(),
        secret: s.client_secret.clone(),
    });

    let spec = super::build_spec(&config, subscription_id, service_principal)?;
    let body = ManagedCluster::from_spec(&spec).redacted();

    eprintln!(
        "{} PUT subscriptions/{}/resourceGroups/{}/providers/Microsoft.ContainerService/managedClusters/{}?api-version={}",
        "→".blue(),
        subscription_id,
        config.resource_group,
        config.cluster_name,
        API_VERSION
    );
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
