//! # Catalog Store Module
//!
//! The only module that talks SQL. It owns a single read-only connection
//! to the beets catalog file, opened once at engine construction and held
//! for the engine's lifetime. Every query runs inside its own scoped
//! transaction; there are no cross-call transactions and no retries.
//!
//! Rows are decoded into typed structs right here at the boundary, by
//! column name. Nothing downstream ever addresses a row by ordinal
//! position.

use anyhow::{bail, Context, Result};
use log::debug;
use rusqlite::{Connection, OpenFlags, Row};
use std::path::Path;

use crate::predicate::{self, Predicate};

/// Columns selected for every track projection query.
const ITEM_COLUMNS: &str = "id, title, artist, albumartist, album, composer, genre, comments, \
     track, tracktotal, disc, disctotal, \
     year, month, day, original_year, original_month, original_day, \
     length, bitrate, mtime, cast(path as text) as path, \
     mb_trackid, mb_albumid, mb_artistid, mb_albumartistid";

/// Columns selected for every album projection query.
const ALBUM_COLUMNS: &str = "id, album, albumartist, disctotal, \
     year, month, day, original_year, original_month, original_day, \
     cast(artpath as text) as artpath, mb_albumid, mb_albumartistid";

/// One row of the track projection, decoded once at the store boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemRow {
    pub id: i64,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub albumartist: Option<String>,
    pub album: Option<String>,
    pub composer: Option<String>,
    pub genre: Option<String>,
    pub comments: Option<String>,
    pub track: Option<i32>,
    pub tracktotal: Option<i32>,
    pub disc: Option<i32>,
    pub disctotal: Option<i32>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub day: Option<i32>,
    pub original_year: Option<i32>,
    pub original_month: Option<i32>,
    pub original_day: Option<i32>,
    pub length: Option<f64>,
    pub bitrate: Option<i32>,
    pub mtime: Option<f64>,
    pub path: Option<String>,
    pub mb_trackid: Option<String>,
    pub mb_albumid: Option<String>,
    pub mb_artistid: Option<String>,
    pub mb_albumartistid: Option<String>,
}

/// One row of the album projection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlbumRow {
    pub id: i64,
    pub album: Option<String>,
    pub albumartist: Option<String>,
    pub disctotal: Option<i32>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub day: Option<i32>,
    pub original_year: Option<i32>,
    pub original_month: Option<i32>,
    pub original_day: Option<i32>,
    pub artpath: Option<String>,
    pub mb_albumid: Option<String>,
    pub mb_albumartistid: Option<String>,
}

/// A token of the store's fuzzy query syntax, `field:value`.
///
/// The pseudo-field `any` matches across the main text columns of the
/// projection instead of a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyToken {
    pub field: String,
    pub value: String,
}

fn item_from_row(row: &Row) -> rusqlite::Result<ItemRow> {
    Ok(ItemRow {
        id: row.get("id")?,
        title: row.get("title")?,
        artist: row.get("artist")?,
        albumartist: row.get("albumartist")?,
        album: row.get("album")?,
        composer: row.get("composer")?,
        genre: row.get("genre")?,
        comments: row.get("comments")?,
        track: row.get("track")?,
        tracktotal: row.get("tracktotal")?,
        disc: row.get("disc")?,
        disctotal: row.get("disctotal")?,
        year: row.get("year")?,
        month: row.get("month")?,
        day: row.get("day")?,
        original_year: row.get("original_year")?,
        original_month: row.get("original_month")?,
        original_day: row.get("original_day")?,
        length: row.get("length")?,
        bitrate: row.get("bitrate")?,
        mtime: row.get("mtime")?,
        path: row.get("path")?,
        mb_trackid: row.get("mb_trackid")?,
        mb_albumid: row.get("mb_albumid")?,
        mb_artistid: row.get("mb_artistid")?,
        mb_albumartistid: row.get("mb_albumartistid")?,
    })
}

fn album_from_row(row: &Row) -> rusqlite::Result<AlbumRow> {
    Ok(AlbumRow {
        id: row.get("id")?,
        album: row.get("album")?,
        albumartist: row.get("albumartist")?,
        disctotal: row.get("disctotal")?,
        year: row.get("year")?,
        month: row.get("month")?,
        day: row.get("day")?,
        original_year: row.get("original_year")?,
        original_month: row.get("original_month")?,
        original_day: row.get("original_day")?,
        artpath: row.get("artpath")?,
        mb_albumid: row.get("mb_albumid")?,
        mb_albumartistid: row.get("mb_albumartistid")?,
    })
}

/// Read-only handle to the catalog file.
pub struct CatalogStore {
    conn: Connection,
}

impl CatalogStore {
    /// Open the catalog. A missing or unreadable file is fatal; the
    /// engine must not be constructed over a broken catalog.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            bail!("Can not find catalog file {}", path.display());
        }
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("Can not open catalog file {}", path.display()))?;

        // SQLite opens corrupt files lazily; corruption must surface
        // here, not as zero rows on every later query.
        conn.query_row("select count(id) from items", [], |row| {
            row.get::<_, i64>(0)
        })
        .with_context(|| format!("{} is not a readable catalog", path.display()))?;

        Ok(Self { conn })
    }

    /// Run one statement inside its own scoped transaction and decode
    /// every row through `map`. This is the single funnel all queries go
    /// through, including the raw `DISTINCT`/join statements the browse
    /// hierarchy needs.
    fn run_in_transaction<T>(
        &self,
        statement: &str,
        map: impl Fn(&Row) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        debug!("{statement}");
        let tx = self
            .conn
            .unchecked_transaction()
            .context("Could not begin catalog transaction")?;
        let rows = {
            let mut stmt = tx
                .prepare(statement)
                .with_context(|| format!("Statement failed: {statement}"))?;
            let mapped = stmt
                .query_map([], |row| map(row))
                .with_context(|| format!("Statement failed: {statement}"))?;
            let mut rows = Vec::new();
            for row in mapped {
                rows.push(row.context("Could not decode catalog row")?);
            }
            rows
        };
        tx.commit().context("Could not finish catalog transaction")?;
        Ok(rows)
    }

    /// Tracks matching every predicate.
    pub fn list_items(&self, predicates: &[Predicate]) -> Result<Vec<ItemRow>> {
        let statement = format!(
            "select {ITEM_COLUMNS} from items where 1=1{}",
            predicate::where_suffix(predicates)
        );
        self.run_in_transaction(&statement, item_from_row)
    }

    /// Albums matching every predicate.
    pub fn list_albums(&self, predicates: &[Predicate]) -> Result<Vec<AlbumRow>> {
        let statement = format!(
            "select {ALBUM_COLUMNS} from albums where 1=1{}",
            predicate::where_suffix(predicates)
        );
        self.run_in_transaction(&statement, album_from_row)
    }

    /// Tracks matching the fuzzy token list, case-insensitive substring
    /// semantics per token.
    pub fn list_items_fuzzy(&self, tokens: &[FuzzyToken]) -> Result<Vec<ItemRow>> {
        let statement = format!(
            "select {ITEM_COLUMNS} from items where 1=1{}",
            fuzzy_suffix(tokens, &["title", "artist", "album", "genre"])
        );
        self.run_in_transaction(&statement, item_from_row)
    }

    /// Albums matching the fuzzy token list.
    pub fn list_albums_fuzzy(&self, tokens: &[FuzzyToken]) -> Result<Vec<AlbumRow>> {
        let statement = format!(
            "select {ALBUM_COLUMNS} from albums where 1=1{}",
            fuzzy_suffix(tokens, &["album", "albumartist", "genre"])
        );
        self.run_in_transaction(&statement, album_from_row)
    }

    /// A single track by catalog id.
    pub fn get_item(&self, id: i64) -> Result<ItemRow> {
        let statement = format!("select {ITEM_COLUMNS} from items where id = {id}");
        self.run_in_transaction(&statement, item_from_row)?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No catalog item with id {id}"))
    }

    /// A single album by catalog id.
    pub fn get_album(&self, id: i64) -> Result<AlbumRow> {
        let statement = format!("select {ALBUM_COLUMNS} from albums where id = {id}");
        self.run_in_transaction(&statement, album_from_row)?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No catalog album with id {id}"))
    }

    /// Every track belonging to an album, in store order.
    pub fn album_items(&self, album_id: i64) -> Result<Vec<ItemRow>> {
        let statement =
            format!("select {ITEM_COLUMNS} from items where album_id = {album_id}");
        self.run_in_transaction(&statement, item_from_row)
    }

    /// Raw escape hatch for single-column `DISTINCT` statements. NULL
    /// decodes to the empty string so callers can apply their fallback
    /// labels uniformly.
    pub fn distinct_strings(&self, statement: &str) -> Result<Vec<String>> {
        self.run_in_transaction(statement, |row| {
            Ok(row.get::<_, Option<String>>(0)?.unwrap_or_default())
        })
    }

    /// Raw escape hatch for two-column `DISTINCT` statements.
    pub fn distinct_pairs(&self, statement: &str) -> Result<Vec<(String, String)>> {
        self.run_in_transaction(statement, |row| {
            Ok((
                row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            ))
        })
    }
}

fn fuzzy_suffix(tokens: &[FuzzyToken], any_fields: &[&str]) -> String {
    let mut suffix = String::new();
    for token in tokens {
        let pattern = like_pattern(&token.value);
        if token.field == "any" {
            let alternatives: Vec<String> = any_fields
                .iter()
                .map(|field| format!("{field} like {pattern}"))
                .collect();
            suffix.push_str(&format!(" and ({})", alternatives.join(" or ")));
        } else {
            suffix.push_str(&format!(" and {} like {pattern}", token.field));
        }
    }
    suffix
}

fn like_pattern(value: &str) -> String {
    format!("'%{}%'", value.replace('\'', "''"))
}
