// Descriptive statistics shared by the analyzers
pub mod accumulator;
pub mod stats;
