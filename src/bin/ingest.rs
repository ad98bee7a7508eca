use anyhow::Result;
use clap::Parser;
use std::time::Instant;
use tripgraph::cache::DestinationCache;
use tripgraph::graph::{ingest_destination, open_store, ExtractionOptions};
use tripgraph::{Config, ServiceSet};

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Extract travel knowledge for destinations and merge it into the graph")]
struct Args {
    /// Destinations to ingest (e.g. "Paris" "Rome")
    #[arg(required = true)]
    destinations: Vec<String>,

    /// Re-extract destinations that are already recorded as ingested
    #[arg(short, long)]
    force: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;

    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", config.tripgraph.log_level.as_str())
    ).init();

    log::info!("Starting Tripgraph ingestion");
    log::info!("Graph backend: {:?} ({})", config.graph.backend, config.db_path().display());

    let graph = open_store(&config.graph)?;
    let destinations = DestinationCache::load(config.known_destinations_path())?;
    let services = ServiceSet::from_config(&config)?;
    let options = ExtractionOptions::from(&config.places);

    let start = Instant::now();
    let mut ingested = 0usize;
    let mut failed = 0usize;

    for destination in &args.destinations {
        if !args.force && destinations.contains(destination) {
            log::info!("Skipping {} (already ingested, use --force to redo)", destination);
            continue;
        }

        match ingest_destination(destination, &graph, services.borrow(), &options).await {
            Ok(report) => {
                destinations.insert(destination)?;
                ingested += 1;
                println!(
                    "{}: +{} nodes, +{} edges (graph now {} nodes, {} edges)",
                    destination,
                    report.nodes_added,
                    report.edges_added,
                    report.nodes_total,
                    report.edges_total
                );
            }
            Err(e) => {
                failed += 1;
                log::error!("Failed to ingest {}: {}", destination, e);
            }
        }
    }

    log::info!(
        "Ingestion complete in {:.2}s: {} ingested, {} failed",
        start.elapsed().as_secs_f64(),
        ingested,
        failed
    );

    if failed > 0 {
        anyhow::bail!("{} destination(s) failed to ingest", failed);
    }

    Ok(())
}
