//! `ragguard serve`: start the HTTP API server.

use std::path::Path;

pub async fn run(
    config_path: Option<&Path>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config_path)?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("ragguard gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!(
        "   Index:     {} ({:?}, {})",
        config.index.url, config.index.api_version, config.index.collection
    );
    println!("   Model:     {} via {}", config.completion.model, config.completion.provider);

    ragguard_gateway::start(config).await?;

    Ok(())
}
