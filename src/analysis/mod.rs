pub mod aggregate;
pub mod classify;

#[cfg(test)]
mod tests;

pub use aggregate::{aggregate, aggregate_commits, Aggregator};
pub use classify::{AiUsageRule, TagClassifier, TagRule, TagSet, DEFAULT_RULES};
