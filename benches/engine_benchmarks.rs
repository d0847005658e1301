//! # Melodeon Performance Benchmarks
//!
//! Benchmarks for the hot paths of the engine: query normalization,
//! predicate building, the URI codec, and full browse requests over a
//! small catalog.
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Run specific benchmark group
//! cargo bench normalize
//! cargo bench browse
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use std::path::PathBuf;
use tempfile::TempDir;

use melodeon::config::Config;
use melodeon::library::Library;
use melodeon::predicate::{self, Scope};
use melodeon::query::{self, Query};
use melodeon::uri;

/// Helper function to create a catalog with realistic volume.
fn create_benchmark_catalog() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("benchmark_library.db");

    let conn = rusqlite::Connection::open(&db_path).expect("Failed to open database");
    conn.execute_batch(
        "CREATE TABLE items (
            id INTEGER PRIMARY KEY, title TEXT, artist TEXT, albumartist TEXT,
            album TEXT, album_id INTEGER, composer TEXT, grouping TEXT, genre TEXT,
            comments TEXT, track INTEGER, tracktotal INTEGER, disc INTEGER,
            disctotal INTEGER, year INTEGER, month INTEGER, day INTEGER,
            original_year INTEGER, original_month INTEGER, original_day INTEGER,
            length REAL, bitrate INTEGER, format TEXT, samplerate INTEGER,
            mtime REAL, added REAL, path BLOB, mb_trackid TEXT, mb_albumid TEXT,
            mb_artistid TEXT, mb_albumartistid TEXT
        );
        CREATE TABLE albums (
            id INTEGER PRIMARY KEY, album TEXT, albumartist TEXT, disctotal INTEGER,
            year INTEGER, month INTEGER, day INTEGER, original_year INTEGER,
            original_month INTEGER, original_day INTEGER, artpath BLOB,
            comp INTEGER, mb_albumid TEXT, mb_albumartistid TEXT
        );
        CREATE TABLE item_attributes (
            id INTEGER PRIMARY KEY, entity_id INTEGER, key TEXT, value TEXT
        );",
    )
    .expect("Failed to create schema");

    let mut album_stmt = conn
        .prepare(
            "INSERT INTO albums (id, album, albumartist, disctotal, year, original_year,
                                 comp, mb_albumid, mb_albumartistid)
             VALUES (?1, ?2, ?3, 1, ?4, ?4, 0, ?5, ?6)",
        )
        .expect("Failed to prepare album insert");
    for album in 1..=100i64 {
        let artist = (album - 1) / 5 + 1;
        album_stmt
            .execute(rusqlite::params![
                album,
                format!("Album {album:03}"),
                format!("Artist {artist:02}"),
                1990 + (album % 30),
                format!("mb-album-{album}"),
                format!("mb-artist-{artist}"),
            ])
            .expect("Failed to insert album");
    }

    let mut item_stmt = conn
        .prepare(
            "INSERT INTO items (id, title, artist, albumartist, album, album_id, grouping,
                                genre, track, tracktotal, disc, disctotal, year, month, day,
                                original_year, original_month, original_day, length, bitrate,
                                format, samplerate, mtime, added, path,
                                mb_trackid, mb_albumid, mb_artistid, mb_albumartistid)
             VALUES (?1, ?2, ?3, ?3, ?4, ?5, ?6, ?7, ?8, 10, 1, 1, ?9, 1, 1, ?9, 1, 1,
                     240.0, 320, 'FLAC', 44100, 1455912000.0, 1455912000.0, ?10,
                     ?11, ?12, ?13, ?13)",
        )
        .expect("Failed to prepare item insert");
    for item in 1..=1000i64 {
        let album = (item - 1) / 10 + 1;
        let artist = (album - 1) / 5 + 1;
        let genre = ["Rock", "Jazz", "Electronic", "Classical"][(album % 4) as usize];
        item_stmt
            .execute(rusqlite::params![
                item,
                format!("Song {item:04}"),
                format!("Artist {artist:02}"),
                format!("Album {album:03}"),
                album,
                ["Modern", "Vintage"][(album % 2) as usize],
                genre,
                (item - 1) % 10 + 1,
                1990 + (album % 30),
                format!("/music/Artist {artist:02}/Album {album:03}/{item:04}.flac"),
                format!("mb-track-{item}"),
                format!("mb-album-{album}"),
                format!("mb-artist-{artist}"),
            ])
            .expect("Failed to insert item");
    }

    (temp_dir, db_path)
}

fn sample_query() -> Query {
    let mut raw = Query::new();
    raw.insert("artist".to_string(), vec!["Artist 05".to_string()]);
    raw.insert("genre".to_string(), vec!["Rock".to_string(), "Jazz".to_string()]);
    raw.insert(
        "date".to_string(),
        vec!["1998".to_string(), "2004-06-07".to_string(), "junk".to_string()],
    );
    raw
}

/// Benchmark query normalization
fn benchmark_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    group.bench_function("mixed_query", |b| {
        b.iter(|| query::normalize(black_box(Some(sample_query()))))
    });

    group.bench_function("already_canonical", |b| {
        let canonical = query::normalize(Some(sample_query())).unwrap();
        b.iter(|| query::normalize(black_box(Some(canonical.clone()))))
    });

    group.finish();
}

/// Benchmark predicate building and rendering
fn benchmark_predicates(c: &mut Criterion) {
    let mut group = c.benchmark_group("predicates");
    let canonical = query::normalize(Some(sample_query())).unwrap();

    for scope in [Scope::Items, Scope::Albums] {
        group.bench_with_input(
            BenchmarkId::new("build_and_render", scope.table()),
            &scope,
            |b, scope| {
                b.iter(|| {
                    let predicates = predicate::build(black_box(&canonical), *scope);
                    predicate::where_suffix(black_box(&predicates))
                })
            },
        );
    }

    group.finish();
}

/// Benchmark the URI codec round trip
fn benchmark_uri_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("uri_codec");
    let canonical = query::normalize(Some(sample_query())).unwrap();

    group.bench_function("encode", |b| {
        b.iter(|| uri::encode_browse(black_box("artist"), black_box(&canonical)))
    });

    let encoded = uri::encode_browse("artist", &canonical);
    group.bench_function("decode", |b| b.iter(|| uri::decode(black_box(&encoded))));

    group.finish();
}

/// Benchmark full browse and search requests over a real catalog file
fn benchmark_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");

    let (_temp_dir, db_path) = create_benchmark_catalog();
    let config =
        Config::resolve(Some(db_path.as_path()), false).expect("Failed to resolve config");
    let library = Library::open(&config).expect("Failed to open catalog");

    group.bench_function("browse_root", |b| {
        b.iter(|| library.browse(black_box("catalog:root")))
    });

    group.bench_function("browse_artists_scoped", |b| {
        b.iter(|| library.browse(black_box("catalog:artist?genre=Rock")))
    });

    group.bench_function("exact_search", |b| {
        b.iter(|| {
            let mut query = Query::new();
            query.insert("artist".to_string(), vec!["Artist 05".to_string()]);
            library.search(black_box(Some(query)), true)
        })
    });

    group.bench_function("fuzzy_search", |b| {
        b.iter(|| {
            let mut query = Query::new();
            query.insert("any".to_string(), vec!["Song 05".to_string()]);
            library.search(black_box(Some(query)), false)
        })
    });

    group.bench_function("album_lookup", |b| {
        b.iter(|| library.lookup(black_box("catalog:album:42:")))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_normalize,
    benchmark_predicates,
    benchmark_uri_codec,
    benchmark_engine
);

criterion_main!(benches);
