//! # Library Engine Module
//!
//! The facade the host runtime talks to. Four operations make up the
//! whole contract:
//!
//! - [`Library::browse`] walks the virtual folder hierarchy,
//! - [`Library::search`] runs structured exact or fuzzy queries over both
//!   catalog projections,
//! - [`Library::lookup`] resolves an entity URI back into tracks,
//! - [`Library::get_distinct`] lists distinct values for a browsable
//!   field.
//!
//! Construction is the only fatal path. After that every failure is
//! logged and degrades to an empty result; a stray bad predicate never
//! escalates into a request failure.

use std::collections::BTreeSet;

use anyhow::Result;
use log::{debug, info};

use crate::browse;
use crate::config::Config;
use crate::model::{Album, BrowseNode, DateSource, SearchResult, Track};
use crate::predicate::{self, Scope};
use crate::query::{self, Query};
use crate::store::{CatalogStore, FuzzyToken};
use crate::uri;

pub struct Library {
    store: CatalogStore,
    date_source: DateSource,
}

impl Library {
    /// Open the engine over the configured catalog. A missing or corrupt
    /// catalog file fails construction; the host surfaces that as a
    /// startup error.
    pub fn open(config: &Config) -> Result<Self> {
        let store = CatalogStore::open(&config.library)?;
        info!("Opened catalog {}", config.library.display());
        Ok(Self {
            store,
            date_source: DateSource::from_flag(config.use_original_release_date),
        })
    }

    /// The entry point of the browse hierarchy.
    pub fn root_uri() -> &'static str {
        uri::ROOT_URI
    }

    /// List the next level of the hierarchy below `uri`.
    pub fn browse(&self, target: &str) -> Vec<BrowseNode> {
        debug!("Browse being called for {target}");
        let (level, raw) = uri::decode(target);
        if level.is_empty() {
            log::error!("No level for uri {target}");
            return Vec::new();
        }
        let query = query::normalize(Some(raw)).unwrap_or_default();
        browse::browse(&self.store, &level, &query)
    }

    /// Structured search over both projections.
    ///
    /// With `exact` the query becomes equality predicates; otherwise it is
    /// translated into the store's fuzzy token syntax. An absent or empty
    /// query is the "browse everything" fallback and returns the entire
    /// catalog. Result order is whatever the store returns.
    pub fn search(&self, query: Option<Query>, exact: bool) -> SearchResult {
        let query = query::normalize(query);
        debug!("Search sanitized query: {query:?} (exact: {exact})");
        if exact {
            return self.find_exact(query.unwrap_or_default());
        }

        let query = match query {
            None => Query::new(),
            Some(query) => query,
        };
        if query.is_empty() {
            return SearchResult {
                uri: format!("{}:search-all", uri::SCHEME),
                tracks: self.tracks_or_empty(self.store.list_items(&[])),
                albums: self.albums_or_empty(self.store.list_albums(&[])),
            };
        }

        let tracks =
            self.tracks_or_empty(self.store.list_items_fuzzy(&fuzzy_tokens(&query, Scope::Items)));
        // A track name is a track-only signal; skip the album pass.
        let albums = if query.contains_key("track_name") {
            Vec::new()
        } else {
            self.albums_or_empty(
                self.store
                    .list_albums_fuzzy(&fuzzy_tokens(&query, Scope::Albums)),
            )
        };
        debug!("Query found {} tracks and {} albums", tracks.len(), albums.len());
        SearchResult {
            uri: uri::encode_browse("search", &query),
            tracks,
            albums,
        }
    }

    /// Field-equality search used for `exact` queries.
    fn find_exact(&self, query: Query) -> SearchResult {
        // Track-only signals also suppress the album pass here, composer
        // included.
        let albums = if query.contains_key("track_name") || query.contains_key("composer") {
            Vec::new()
        } else {
            self.albums_or_empty(
                self.store
                    .list_albums(&predicate::build(&query, Scope::Albums)),
            )
        };
        let tracks =
            self.tracks_or_empty(self.store.list_items(&predicate::build(&query, Scope::Items)));
        debug!("Find found {} tracks and {} albums", tracks.len(), albums.len());
        SearchResult {
            uri: uri::encode_browse("find", &query),
            tracks,
            albums,
        }
    }

    /// Resolve an entity URI into its tracks. Track URIs yield one track,
    /// album URIs yield every track on the album, anything else yields
    /// nothing.
    pub fn lookup(&self, target: &str) -> Vec<Track> {
        debug!("Looking up uri {target}");
        let Some(entity) = uri::parse_entity(target) else {
            debug!("Failed to parse lookup uri {target}");
            return Vec::new();
        };
        let Ok(id) = entity.id.parse::<i64>() else {
            debug!("Non-numeric id in lookup uri {target}");
            return Vec::new();
        };
        match entity.item_type.as_str() {
            "track" => match self.store.get_item(id) {
                Ok(item) => vec![Track::from_item(&item, self.date_source)],
                Err(err) => {
                    debug!("Failed to lookup {target}: {err:#}");
                    Vec::new()
                }
            },
            "album" => match self
                .store
                .get_album(id)
                .and_then(|album| self.store.album_items(album.id))
            {
                Ok(items) => items
                    .iter()
                    .map(|item| Track::from_item(item, self.date_source))
                    .collect(),
                Err(err) => {
                    debug!("Failed to lookup {target}: {err:#}");
                    Vec::new()
                }
            },
            other => {
                debug!("Dont know what to do with item_type: {other}");
                Vec::new()
            }
        }
    }

    /// Distinct values for a browsable field, scoped by an optional
    /// query. Unsupported fields return an empty set.
    pub fn get_distinct(&self, field: &str, query: Option<Query>) -> BTreeSet<String> {
        let query = query::normalize(query).unwrap_or_default();
        debug!("get_distinct field: {field}, query: {query:?}");
        let nodes = match field {
            "artist" => browse::artist_nodes(&self.store, &query),
            "genre" => browse::genre_nodes(&self.store, &query),
            "album" => browse::album_nodes(&self.store, &query),
            _ => {
                info!("get_distinct does not support field: {field}");
                Vec::new()
            }
        };
        nodes
            .into_iter()
            .map(|node| node.name().to_string())
            .collect()
    }

    fn tracks_or_empty(&self, result: Result<Vec<crate::store::ItemRow>>) -> Vec<Track> {
        match result {
            Ok(items) => items
                .iter()
                .map(|item| Track::from_item(item, self.date_source))
                .collect(),
            Err(err) => {
                log::error!("Track query failed: {err:#}");
                Vec::new()
            }
        }
    }

    fn albums_or_empty(&self, result: Result<Vec<crate::store::AlbumRow>>) -> Vec<Album> {
        match result {
            Ok(rows) => rows
                .iter()
                .map(|row| Album::from_row(row, self.date_source))
                .collect(),
            Err(err) => {
                log::error!("Album query failed: {err:#}");
                Vec::new()
            }
        }
    }
}

/// Translate a canonical query into the store's fuzzy token syntax.
/// Multi-valued fields join their values with spaces; field names go
/// through the same per-scope remapping as exact predicates.
fn fuzzy_tokens(query: &Query, scope: Scope) -> Vec<FuzzyToken> {
    query
        .iter()
        .map(|(field, values)| {
            let field = if field == "any" {
                "any"
            } else {
                predicate::remap_field(field, scope)
            };
            FuzzyToken {
                field: field.to_string(),
                value: values.join(" ").trim().to_string(),
            }
        })
        .collect()
}
