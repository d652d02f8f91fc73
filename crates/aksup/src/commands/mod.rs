pub mod create;
pub mod plan;

use aksup_cloud::{AgentPoolMode, AgentPoolProfile, ResourceSpec, ServicePrincipal};
use aksup_cloud_azure::public_ip_prefix_id;
use aksup_config::ProvisionConfig;

/// Build the desired cluster from config.
///
/// The service principal the cluster runs as is the one aksup authenticates
/// with, mirroring a plain `az aks create --service-principal`.
pub fn build_spec(
    config: &ProvisionConfig,
    subscription_id: &str,
    service_principal: Option<ServicePrincipal>,
) -> anyhow::Result<ResourceSpec> {
    let pool_config = &config.node_pool;
    let mode: AgentPoolMode = pool_config
        .mode
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let mut pool = AgentPoolProfile::new(&pool_config.name, pool_config.count, &pool_config.vm_size)
        .with_mode(mode);
    if let Some(prefix) = &pool_config.public_ip_prefix {
        pool = pool.with_public_ip_prefix(public_ip_prefix_id(
            subscription_id,
            &config.resource_group,
            prefix,
        ));
    }

    let mut builder = ResourceSpec::builder(&config.location, config.dns_prefix()).agent_pool(pool);
    if let Some(sp) = service_principal {
        builder = builder.service_principal(sp);
    }
    if let Some(version) = &config.kubernetes_version {
        builder = builder.kubernetes_version(version);
    }
    for (key, value) in &config.tags {
        builder = builder.tag(key, value);
    }

    Ok(builder.build())
}
