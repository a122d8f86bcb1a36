// Pattern analyzers over normalized daily records
pub mod calendar;
pub mod conditional;
pub mod engine;
pub mod index_base;
pub mod overview;
pub mod price_levels;
pub mod range_blocks;
pub mod report;
