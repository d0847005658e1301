//! # Command-Line Interface Module
//!
//! This module defines the command-line interface for Melodeon using Clap
//! derive macros. Every engine operation is reachable as a subcommand, so
//! the catalog can be exercised without a media-server host around it.
//!
//! ## Commands
//!
//! - `browse`: list the next level of the virtual folder hierarchy
//! - `search`: structured fuzzy or exact search over tracks and albums
//! - `lookup`: resolve a track or album URI into its tracks
//! - `distinct`: list distinct values for a browsable field
//! - `completion`: generate shell completion scripts
//!
//! ## Examples
//!
//! ```bash
//! melodeon browse
//! melodeon browse "catalog:genre?grouping=Classical"
//! melodeon search artist=Nightwish --exact
//! melodeon --library /tmp/library.db distinct genre
//! ```

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main application arguments structure.
///
/// Uses Clap derive macros to automatically generate argument parsing,
/// help text, and validation.
#[derive(Parser)]
#[command(name = "melodeon")]
#[command(about = "Melodeon: hierarchical browsing & search for a beets music catalog")]
#[command(version)]
pub struct Args {
    /// Path to the beets catalog file
    ///
    /// Defaults to the platform beets location, e.g.
    /// ~/.config/beets/library.db on Linux.
    #[arg(long, env = "MELODEON_LIBRARY", global = true)]
    pub library: Option<PathBuf>,

    /// Derive dates from the original release instead of the edition
    ///
    /// Reads original_year/original_month/original_day from the catalog
    /// rather than the plain year/month/day columns.
    #[arg(long, global = true)]
    pub original_dates: bool,

    /// Emit results as JSON instead of human-readable lines
    #[arg(long, global = true)]
    pub json: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Browse the virtual folder hierarchy
    ///
    /// Prints the next level of browsable nodes below the given URI.
    /// Directory nodes carry URIs that can be fed straight back into
    /// this command to descend further.
    Browse {
        /// Browse URI, e.g. catalog:root or catalog:genre?grouping=Live
        #[arg(default_value = "catalog:root")]
        uri: String,
    },

    /// Search tracks and albums
    ///
    /// Terms are field=value pairs (artist=Nightwish, genre=Rock,
    /// track_name=Nemo). A bare word without '=' matches across title,
    /// artist, album and genre. Repeating a field narrows the match.
    Search {
        /// Require exact field equality instead of substring matching
        #[arg(long)]
        exact: bool,

        /// Search terms
        terms: Vec<String>,
    },

    /// Resolve a track or album URI into tracks
    ///
    /// Track URIs yield the single track, album URIs yield every track
    /// on the album.
    Lookup {
        /// Entity URI, e.g. catalog:album:42:
        uri: String,
    },

    /// List distinct values for a browsable field
    ///
    /// Supported fields: artist, genre, album. Terms scope the listing
    /// the same way search terms do.
    Distinct {
        /// Field name
        field: String,

        /// Optional scoping terms, field=value pairs
        terms: Vec<String>,
    },

    /// Generate shell completions
    ///
    /// Usage: melodeon completion bash > ~/.local/share/bash-completion/completions/melodeon
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}
