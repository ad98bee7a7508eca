use anyhow::Result;
use std::sync::Arc;
use tripgraph::cache::DestinationCache;
use tripgraph::graph::{lock_graph, open_store};
use tripgraph::recommend::RecommendOptions;
use tripgraph::server::{AppState, HttpServer};
use tripgraph::{Config, GraphStore, ServiceSet};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", config.tripgraph.log_level.as_str())
    ).init();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("serve");

    if command != "serve" {
        log::warn!("Unknown command '{}', starting the HTTP server", command);
    }
    run_http_server(config).await?;

    Ok(())
}

/// Run the HTTP API
async fn run_http_server(config: Config) -> Result<()> {
    log::info!("Starting Tripgraph HTTP Server v{}", env!("CARGO_PKG_VERSION"));

    let graph = open_store(&config.graph)?;
    {
        let store = lock_graph(&graph)?;
        log::info!(
            "Knowledge graph ready: {} nodes and {} edges",
            store.node_count()?,
            store.edge_count()?
        );
    }

    let destinations = Arc::new(DestinationCache::load(config.known_destinations_path())?);
    log::info!("{} destinations already ingested", destinations.names().len());

    let services = ServiceSet::from_config(&config)?;
    let state = AppState::new(
        graph,
        destinations,
        services,
        RecommendOptions::from(&config),
    );

    let server = HttpServer::new(state, config.http_server.clone());
    server.run().await?;

    Ok(())
}
