pub mod config;
pub mod error;
pub mod db;
pub mod graph;
pub mod llm;
pub mod sources;
pub mod cache;
pub mod services;
pub mod recommend;
pub mod itinerary;
pub mod server;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{Result, TripgraphError};
pub use graph::{normalize_identifier, GraphStore, SharedGraph};
pub use services::{ServiceSet, Services};
