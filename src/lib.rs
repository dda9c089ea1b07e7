pub mod audit;
pub mod categorize;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod issue;
pub mod pipeline;
pub mod plan;
pub mod work_set;

#[cfg(test)]
pub mod test_helpers;
