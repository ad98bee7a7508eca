use anyhow::Result;
use clap::Parser;
use tripgraph::graph::{build_context, lock_graph, open_store};
use tripgraph::{Config, GraphStore};

#[derive(Parser, Debug)]
#[command(name = "traverse")]
#[command(about = "Print the multi-hop context the recommender sees for a set of places")]
struct Args {
    /// Place names to use as traversal seeds
    #[arg(required = true)]
    seeds: Vec<String>,

    /// Largest hop cutoff (defaults to graph.max_depth)
    #[arg(short, long)]
    depth: Option<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;

    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", config.tripgraph.log_level.as_str())
    ).init();

    let depth = args.depth.unwrap_or(config.graph.max_depth);
    if depth == 0 {
        anyhow::bail!("--depth must be greater than 0");
    }

    let graph = open_store(&config.graph)?;
    let store = lock_graph(&graph)?;
    log::info!(
        "Loaded graph with {} nodes and {} edges",
        store.node_count()?,
        store.edge_count()?
    );

    for line in build_context(&**store, &args.seeds, depth) {
        println!("{}", line);
    }

    Ok(())
}
