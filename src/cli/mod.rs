//! CLI module - Command-line interface for bizdir
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

pub use commands::{cmd_search, cmd_top_items};

use clap::{Parser, Subcommand};

/// bizdir - Local business directory
/// Geo-bounded business search with a read-through cache
#[derive(Parser)]
#[command(name = "bizdir")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server
    #[command(alias = "daemon", alias = "-d")]
    Serve,

    /// Create default config file
    Init,

    /// Search businesses around a point
    #[command(alias = "s", allow_negative_numbers = true)]
    Search {
        /// Latitude of the search origin
        lat: f64,
        /// Longitude of the search origin
        lng: f64,
        /// Free-text query; empty matches everything nearby
        query: Vec<String>,
    },

    /// Show the most searched items
    TopItems {
        /// Number of entries to show
        #[arg(default_value = "10")]
        limit: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_with_negative_longitude() {
        let cli = Cli::try_parse_from(["bizdir", "search", "40.7", "-74.0", "pizza", "place"])
            .unwrap();
        match cli.command {
            Some(Commands::Search { lat, lng, query }) => {
                assert!((lat - 40.7).abs() < f64::EPSILON);
                assert!((lng + 74.0).abs() < f64::EPSILON);
                assert_eq!(query, vec!["pizza", "place"]);
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn test_parse_top_items_default_limit() {
        let cli = Cli::try_parse_from(["bizdir", "top-items"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::TopItems { limit: 10 })));
    }
}
