//! # Melodeon - Catalog Browser
//!
//! Melodeon exposes a beets music catalog as a browsable virtual folder
//! hierarchy with structured search on top. The binary is a thin shell
//! around the [`melodeon`] library crate, which carries the actual
//! engine.
//!
//! ## Usage
//!
//! ```bash
//! # Walk the hierarchy from the top
//! melodeon browse
//! melodeon browse "catalog:artist?genre=Jazz"
//!
//! # Search, fuzzy and exact
//! melodeon search nightwish
//! melodeon search track_name=Nemo --exact
//!
//! # Resolve an album into its tracks
//! melodeon lookup catalog:album:42:
//! ```

use anyhow::Result;
use clap::{CommandFactory, Parser};
use log::info;
use std::path::Path;

use melodeon::cli::{Args, Command};
use melodeon::config::Config;
use melodeon::library::Library;
use melodeon::model::{BrowseNode, SearchResult, Track};
use melodeon::query::Query;

/// Main entry point for the Melodeon application.
///
/// Initializes logging, parses command-line arguments, and routes
/// commands to the engine. Logging is controlled via `RUST_LOG`:
///
/// - `RUST_LOG=debug melodeon browse` - Enable debug logging
/// - `RUST_LOG=melodeon::store=debug melodeon search x` - Statement log
fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let json = args.json;

    match args.command {
        Command::Browse { uri } => {
            let library = open_library(args.library.as_deref(), args.original_dates)?;
            info!("Browsing {uri}");
            let nodes = library.browse(&uri);
            if json {
                println!("{}", serde_json::to_string_pretty(&nodes)?);
            } else {
                print_nodes(&nodes);
            }
        }
        Command::Search { exact, terms } => {
            let library = open_library(args.library.as_deref(), args.original_dates)?;
            let result = library.search(parse_terms(&terms), exact);
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_search_result(&result);
            }
        }
        Command::Lookup { uri } => {
            let library = open_library(args.library.as_deref(), args.original_dates)?;
            let tracks = library.lookup(&uri);
            if json {
                println!("{}", serde_json::to_string_pretty(&tracks)?);
            } else {
                for track in &tracks {
                    print_track(track);
                }
            }
        }
        Command::Distinct { field, terms } => {
            let library = open_library(args.library.as_deref(), args.original_dates)?;
            let values = library.get_distinct(&field, parse_terms(&terms));
            if json {
                println!("{}", serde_json::to_string_pretty(&values)?);
            } else {
                for value in &values {
                    println!("{value}");
                }
            }
        }
        Command::Completion { shell } => {
            let mut cmd = Args::command();
            clap_complete::generate(shell, &mut cmd, "melodeon", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn open_library(library: Option<&Path>, original_dates: bool) -> Result<Library> {
    let config = Config::resolve(library, original_dates)?;
    Library::open(&config)
}

/// Turn CLI terms into a query map. `field=value` pairs bind that field;
/// bare words match any field. Repeated fields accumulate values.
fn parse_terms(terms: &[String]) -> Option<Query> {
    if terms.is_empty() {
        return None;
    }
    let mut query = Query::new();
    for term in terms {
        let (field, value) = term.split_once('=').unwrap_or(("any", term.as_str()));
        query
            .entry(field.to_string())
            .or_default()
            .push(value.to_string());
    }
    Some(query)
}

fn print_nodes(nodes: &[BrowseNode]) {
    for node in nodes {
        let marker = match node {
            BrowseNode::Directory { .. } => "dir",
            BrowseNode::Album { .. } => "album",
            BrowseNode::Track { .. } => "track",
        };
        println!("[{marker}] {}  {}", node.name(), node.uri());
    }
}

fn print_search_result(result: &SearchResult) {
    for track in &result.tracks {
        print_track(track);
    }
    for album in &result.albums {
        let artist = album
            .artists
            .first()
            .and_then(|a| a.name.as_deref())
            .unwrap_or("Unknown Artist");
        println!(
            "[album] {artist} - {}  {}",
            album.name.as_deref().unwrap_or(""),
            album.uri.as_deref().unwrap_or("")
        );
    }
}

fn print_track(track: &Track) {
    let artist = track
        .artists
        .first()
        .and_then(|a| a.name.as_deref())
        .unwrap_or("Unknown Artist");
    println!(
        "[track] {artist} - {}  {}",
        track.name.as_deref().unwrap_or(""),
        track.uri.as_deref().unwrap_or("")
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_terms_become_any_queries() {
        let query = parse_terms(&["nightwish".to_string()]).unwrap();
        assert_eq!(query.get("any"), Some(&vec!["nightwish".to_string()]));
    }

    #[test]
    fn field_terms_accumulate() {
        let terms = vec!["genre=Rock".to_string(), "genre=Pop".to_string()];
        let query = parse_terms(&terms).unwrap();
        assert_eq!(
            query.get("genre"),
            Some(&vec!["Rock".to_string(), "Pop".to_string()])
        );
    }

    #[test]
    fn no_terms_mean_no_query() {
        assert!(parse_terms(&[]).is_none());
    }
}
