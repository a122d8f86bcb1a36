// Sequential pattern primitives: streaks, range bands, conditional outcomes
pub mod outcome;
pub mod range_block;
pub mod streak;
