//! Hierarchical browsing and search over a beets music catalog.
//!
//! Melodeon turns a beets library file into a navigable virtual folder
//! tree and a structured search surface. A request comes in as either a
//! `catalog:` URI or an attribute-map query, gets normalized and
//! translated into filter predicates, runs against the catalog inside a
//! scoped transaction, and comes back out as typed domain objects whose
//! URIs can be fed straight back in.
//!
//! Core modules:
//! - [`uri`] - The `catalog:` addressing scheme
//! - [`query`] - Query normalization
//! - [`predicate`] - Translation into scoped filter clauses
//! - [`browse`] - The browse hierarchy state machine
//! - [`library`] - The engine facade: browse, search, lookup, distinct
//! - [`store`] - The read-only catalog boundary
//! - [`model`] - Track, Album, Artist and friends
//!
//! ### Supporting Modules
//!
//! - [`config`] - Catalog location and date-source selection
//! - [`cli`] - Command-line interface definitions with clap integration
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use melodeon::config::Config;
//! use melodeon::library::Library;
//! use std::path::Path;
//!
//! let config = Config::resolve(Some(Path::new("/music/library.db")), false)?;
//! let library = Library::open(&config)?;
//!
//! // Walk the hierarchy from the top.
//! for node in library.browse(Library::root_uri()) {
//!     println!("{}  {}", node.name(), node.uri());
//! }
//!
//! // Exact search on a single field.
//! let mut query = melodeon::query::Query::new();
//! query.insert("artist".to_string(), vec!["Nightwish".to_string()]);
//! let result = library.search(Some(query), true);
//! println!("{} tracks, {} albums", result.tracks.len(), result.albums.len());
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Construction is the only fatal path: a missing or corrupt catalog file
//! fails [`library::Library::open`]. Every later failure is logged and
//! degrades to an empty result by policy; a malformed URI or a bad
//! predicate never escalates into a request failure.

pub mod browse;
pub mod cli;
pub mod config;
pub mod library;
pub mod model;
pub mod predicate;
pub mod query;
pub mod store;
pub mod uri;
