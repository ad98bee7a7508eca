pub mod destinations;
pub mod extract_cache;

pub use destinations::DestinationCache;
pub use extract_cache::ExtractCache;
