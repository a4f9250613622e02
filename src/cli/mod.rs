//! CLI module for tourcheck.
//!
//! All CLI logic lives here rather than in main.rs so it can be tested. The
//! entry point `run_cli` is called from main.rs with parsed arguments.

mod args;
mod commands;
mod output;

pub use args::{Args, Command};
pub use commands::{
    best_tour_similarity, check, cost, execute, latex, log_convexity, log_run, run_cli,
    similarity, tour_costs,
};
pub use output::{costs_agree, TourCosts};

#[cfg(test)]
mod tests;
