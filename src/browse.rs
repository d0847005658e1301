//! # Browse Hierarchy Module
//!
//! A state machine over named levels. Each level lists the next layer of
//! navigable nodes for the inherited query context and emits URIs that
//! thread that context downward:
//!
//! `root -> {grouping, genre, mood, format, samplerate, year,
//! compilations, added_at, album} -> artist -> album -> track`
//!
//! Transitions run strictly forward; going back means the caller issues a
//! previously emitted URI again. Every store failure inside a level
//! degrades to an empty listing after logging, never to a request
//! failure.

use log::{debug, error, warn};

use crate::model::BrowseNode;
use crate::predicate::{self, Scope};
use crate::query::Query;
use crate::store::CatalogStore;
use crate::uri;

/// The fixed first level, in declared order.
const ROOT_LEVEL: &[(&str, &str)] = &[
    ("Grouping", "grouping"),
    ("Genre", "genre"),
    ("Mood", "mood"),
    ("Format", "format"),
    ("Sample Rate", "samplerate"),
    ("Year", "year"),
    ("Compilations", "compilations"),
    ("Added At", "added_at"),
    ("Albums", "album"),
];

/// Recency windows behind the Added At category; the token travels in the
/// `added` attribute and is expanded by the predicate builder.
const ADDED_LEVEL: &[(&str, &str)] = &[
    ("Last Month", "1m"),
    ("Last Week", "1w"),
    ("Last Day", "1d"),
];

/// Dispatch one browse request to its level. Unknown levels are
/// non-fatal; they log and return nothing.
pub fn browse(store: &CatalogStore, level: &str, query: &Query) -> Vec<BrowseNode> {
    debug!("Browsing level {level} with query {query:?}");
    match level {
        "root" => browse_root(),
        "grouping" => grouping_nodes(store),
        "genre" => {
            let mut nodes = Vec::new();
            if query.contains_key("grouping") {
                nodes.push(BrowseNode::directory(
                    uri::encode_browse("artist", query),
                    "All Artists",
                ));
            }
            nodes.extend(genre_nodes(store, query));
            nodes
        }
        "mood" => mood_nodes(store),
        "format" => field_nodes(store, "format"),
        "samplerate" => field_nodes(store, "samplerate"),
        "year" => year_nodes(store),
        "compilations" => compilation_nodes(store),
        "added_at" => added_at_nodes(),
        "artist" => {
            let mut nodes = vec![BrowseNode::directory(
                uri::encode_browse("album", query),
                "All albums",
            )];
            nodes.extend(artist_nodes(store, query));
            nodes
        }
        "album" => album_nodes(store, query),
        "track" => track_nodes(store, query),
        _ => {
            debug!("Unknown browse level: {level}");
            Vec::new()
        }
    }
}

/// Collapse a store failure to an empty listing, keeping the policy that
/// one bad statement never fails the whole request.
fn rows_or_empty<T>(result: anyhow::Result<Vec<T>>) -> Vec<T> {
    match result {
        Ok(rows) => rows,
        Err(err) => {
            error!("Catalog query failed: {err:#}");
            Vec::new()
        }
    }
}

fn browse_root() -> Vec<BrowseNode> {
    ROOT_LEVEL
        .iter()
        .map(|(name, level)| {
            BrowseNode::directory(uri::encode_browse(level, &Query::new()), *name)
        })
        .collect()
}

fn grouping_nodes(store: &CatalogStore) -> Vec<BrowseNode> {
    let rows = rows_or_empty(
        store.distinct_strings("select distinct grouping from items where grouping is not null"),
    );
    rows.into_iter()
        .map(|grouping| {
            let mut attrs = Query::new();
            attrs.insert("grouping".to_string(), vec![grouping.clone()]);
            BrowseNode::directory(
                uri::encode_browse("genre", &attrs),
                fallback(grouping, "No Grouping"),
            )
        })
        .collect()
}

/// Distinct genres scoped by the inherited context. Also answers
/// `get_distinct("genre")`.
pub fn genre_nodes(store: &CatalogStore, query: &Query) -> Vec<BrowseNode> {
    let statement = format!(
        "select distinct genre from items where 1=1{}",
        predicate::where_suffix(&predicate::build(query, Scope::Items))
    );
    let inherited = first_values(query);
    rows_or_empty(store.distinct_strings(&statement))
        .into_iter()
        .map(|genre| {
            let mut attrs = inherited.clone();
            attrs.insert("genre".to_string(), vec![genre.clone()]);
            BrowseNode::directory(
                uri::encode_browse("artist", &attrs),
                fallback(genre, "No Genre"),
            )
        })
        .collect()
}

fn mood_nodes(store: &CatalogStore) -> Vec<BrowseNode> {
    // Moods live in the catalog's flexible attribute table, not in a
    // dedicated column.
    let rows = rows_or_empty(store.distinct_strings(
        "select distinct value from item_attributes where key = 'mood'",
    ));
    rows.into_iter()
        .map(|mood| {
            let mut attrs = Query::new();
            attrs.insert("mood".to_string(), vec![mood.clone()]);
            BrowseNode::directory(uri::encode_browse("artist", &attrs), mood)
        })
        .collect()
}

fn field_nodes(store: &CatalogStore, field: &str) -> Vec<BrowseNode> {
    let statement = format!(
        "select distinct cast({field} as text) from items where {field} is not null"
    );
    rows_or_empty(store.distinct_strings(&statement))
        .into_iter()
        .map(|value| {
            let mut attrs = Query::new();
            attrs.insert(field.to_string(), vec![value.clone()]);
            BrowseNode::directory(uri::encode_browse("artist", &attrs), value)
        })
        .collect()
}

fn year_nodes(store: &CatalogStore) -> Vec<BrowseNode> {
    // Listed from original_year, carried as the plain year key; later
    // levels therefore filter items.year. Long-standing behavior, kept.
    let statement =
        "select distinct cast(original_year as text) from items where original_year is not null";
    rows_or_empty(store.distinct_strings(statement))
        .into_iter()
        .map(|year| {
            let mut attrs = Query::new();
            attrs.insert("year".to_string(), vec![year.clone()]);
            BrowseNode::directory(uri::encode_browse("artist", &attrs), year)
        })
        .collect()
}

fn compilation_nodes(store: &CatalogStore) -> Vec<BrowseNode> {
    let mut comp = Query::new();
    comp.insert("comp".to_string(), vec!["1".to_string()]);
    let albums = rows_or_empty(store.list_albums(&predicate::build(&comp, Scope::Albums)));
    albums
        .into_iter()
        .map(|album| {
            let mut attrs = Query::new();
            attrs.insert("album".to_string(), vec![album.id.to_string()]);
            BrowseNode::album(
                uri::encode_browse("track", &attrs),
                album.album.unwrap_or_default(),
            )
        })
        .collect()
}

fn added_at_nodes() -> Vec<BrowseNode> {
    ADDED_LEVEL
        .iter()
        .map(|(name, token)| {
            let mut attrs = Query::new();
            attrs.insert("added".to_string(), vec![token.to_string()]);
            BrowseNode::directory(uri::encode_browse("artist", &attrs), *name)
        })
        .collect()
}

/// Distinct album artists for the inherited context, via the items/albums
/// join. Also answers `get_distinct("artist")`.
pub fn artist_nodes(store: &CatalogStore, query: &Query) -> Vec<BrowseNode> {
    let statement = format!(
        "select distinct albums.albumartist, albums.mb_albumartistid \
         from items join albums on items.album_id = albums.id where 1=1{}",
        predicate::where_suffix(&predicate::build(query, Scope::Items))
    );
    // Any previously bound artist identity is stripped before rebinding;
    // the node itself decides which identity key it carries.
    let inherited = first_values(&without_keys(query, &["mb_artistid", "albumartist"]));
    rows_or_empty(store.distinct_pairs(&statement))
        .into_iter()
        .map(|(name, mbid)| {
            let mut attrs = inherited.clone();
            if mbid.is_empty() {
                attrs.insert("albumartist".to_string(), vec![name.clone()]);
            } else {
                attrs.insert("mb_artistid".to_string(), vec![mbid]);
            }
            BrowseNode::directory(
                uri::encode_browse("album", &attrs),
                fallback(name, "No Artist"),
            )
        })
        .collect()
}

/// Albums matching the inherited context, translated at album scope. Also
/// answers `get_distinct("album")`.
pub fn album_nodes(store: &CatalogStore, query: &Query) -> Vec<BrowseNode> {
    // Only the keys that mean something on the album projection survive
    // the descent; the rest of the context has already done its work.
    let mut filter = Query::new();
    for key in ["mb_artistid", "albumartist", "genre", "year"] {
        if let Some(first) = query.get(key).and_then(|values| values.first()) {
            filter.insert(key.to_string(), vec![first.clone()]);
        }
    }
    let albums = rows_or_empty(store.list_albums(&predicate::build(&filter, Scope::Albums)));
    albums
        .into_iter()
        .map(|album| {
            let mut attrs = Query::new();
            attrs.insert("album".to_string(), vec![album.id.to_string()]);
            BrowseNode::album(
                uri::encode_browse("track", &attrs),
                album.album.unwrap_or_default(),
            )
        })
        .collect()
}

fn track_nodes(store: &CatalogStore, query: &Query) -> Vec<BrowseNode> {
    let Some(album_id) = query.get("album").and_then(|values| values.first()) else {
        warn!("Track level browsed without an album attribute");
        return Vec::new();
    };
    let Ok(album_id) = album_id.parse::<i64>() else {
        warn!("Track level browsed with non-numeric album id: {album_id}");
        return Vec::new();
    };
    rows_or_empty(store.album_items(album_id))
        .into_iter()
        .map(|item| {
            BrowseNode::track(
                uri::track_uri(item.id, item.path.as_deref().unwrap_or_default()),
                item.title.unwrap_or_default(),
            )
        })
        .collect()
}

fn fallback(value: String, label: &str) -> String {
    if value.is_empty() {
        label.to_string()
    } else {
        value
    }
}

fn first_values(query: &Query) -> Query {
    query
        .iter()
        .filter_map(|(key, values)| {
            values
                .first()
                .map(|first| (key.clone(), vec![first.clone()]))
        })
        .collect()
}

fn without_keys(query: &Query, keys: &[&str]) -> Query {
    query
        .iter()
        .filter(|(key, _)| !keys.contains(&key.as_str()))
        .map(|(key, values)| (key.clone(), values.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_has_nine_categories_in_declared_order() {
        let nodes = browse_root();
        let names: Vec<&str> = nodes.iter().map(BrowseNode::name).collect();
        assert_eq!(
            names,
            [
                "Grouping",
                "Genre",
                "Mood",
                "Format",
                "Sample Rate",
                "Year",
                "Compilations",
                "Added At",
                "Albums"
            ]
        );
        assert_eq!(nodes[0].uri(), "catalog:grouping");
        assert_eq!(nodes[8].uri(), "catalog:album");
    }

    #[test]
    fn added_at_lists_the_three_windows() {
        let nodes = added_at_nodes();
        let uris: Vec<&str> = nodes.iter().map(BrowseNode::uri).collect();
        assert_eq!(
            uris,
            [
                "catalog:artist?added=1m",
                "catalog:artist?added=1w",
                "catalog:artist?added=1d"
            ]
        );
    }

    #[test]
    fn without_keys_strips_bound_artist_identity() {
        let mut query = Query::new();
        query.insert("genre".to_string(), vec!["Rock".to_string()]);
        query.insert("mb_artistid".to_string(), vec!["abc".to_string()]);
        let stripped = without_keys(&query, &["mb_artistid", "albumartist"]);
        assert!(stripped.contains_key("genre"));
        assert!(!stripped.contains_key("mb_artistid"));
    }
}
