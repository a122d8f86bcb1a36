// Pattern analyzers and the engine that runs them
pub mod analysis;

// Raw table normalization
pub mod ingest;
