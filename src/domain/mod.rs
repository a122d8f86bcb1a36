// Daily records, raw input tables and calendar identities
pub mod market;

// Streaks, range blocks and conditional outcomes
pub mod patterns;

// Shared descriptive statistics
pub mod statistics;

// Domain-specific error types
pub mod errors;
