//! # Domain Model Module
//!
//! Typed result objects the engine hands back to its caller, plus the
//! mapping from catalog rows into them. All of these are request-scoped:
//! built from rows at query time, returned, and dropped. The engine keeps
//! no entity cache.

use serde::Serialize;

use crate::store::{AlbumRow, ItemRow};
use crate::uri;

/// An artist identity. The external id is a MusicBrainz id and may be the
/// empty string, meaning "unknown artist"; the derived URI is still valid,
/// it just never resolves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Artist {
    pub name: Option<String>,
    pub musicbrainz_id: Option<String>,
    pub uri: Option<String>,
}

/// An album, possibly embedded inside a [`Track`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Album {
    pub name: Option<String>,
    pub artists: Vec<Artist>,
    pub date: Option<String>,
    pub num_tracks: Option<i32>,
    pub num_discs: Option<i32>,
    pub musicbrainz_id: Option<String>,
    pub images: Vec<String>,
    pub uri: Option<String>,
}

/// A single track. Owns its embedded album and artists; results never
/// share entity instances.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Track {
    pub name: Option<String>,
    pub artists: Vec<Artist>,
    pub composers: Vec<Artist>,
    pub album: Option<Album>,
    pub track_no: Option<i32>,
    pub disc_no: Option<i32>,
    /// Partial ISO date: `YYYY`, `YYYY-M` or `YYYY-M-D`.
    pub date: Option<String>,
    /// Milliseconds.
    pub length: Option<i64>,
    pub bitrate: Option<i32>,
    pub comment: Option<String>,
    pub musicbrainz_id: Option<String>,
    /// Epoch milliseconds.
    pub last_modified: Option<i64>,
    pub genre: Option<String>,
    pub uri: Option<String>,
}

/// A browsable node: either a directory to descend into or a terminal
/// track/album reference. Constructed per request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BrowseNode {
    Directory { uri: String, name: String },
    Album { uri: String, name: String },
    Track { uri: String, name: String },
}

impl BrowseNode {
    pub fn directory(uri: String, name: impl Into<String>) -> Self {
        BrowseNode::Directory {
            uri,
            name: name.into(),
        }
    }

    pub fn album(uri: String, name: impl Into<String>) -> Self {
        BrowseNode::Album {
            uri,
            name: name.into(),
        }
    }

    pub fn track(uri: String, name: impl Into<String>) -> Self {
        BrowseNode::Track {
            uri,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            BrowseNode::Directory { name, .. }
            | BrowseNode::Album { name, .. }
            | BrowseNode::Track { name, .. } => name,
        }
    }

    pub fn uri(&self) -> &str {
        match self {
            BrowseNode::Directory { uri, .. }
            | BrowseNode::Album { uri, .. }
            | BrowseNode::Track { uri, .. } => uri,
        }
    }
}

/// The combined result of one search pass over both projections.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResult {
    /// URI naming the search itself, re-issuable by the caller.
    pub uri: String,
    pub tracks: Vec<Track>,
    pub albums: Vec<Album>,
}

/// Which of the two date column families rows are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    Release,
    OriginalRelease,
}

impl DateSource {
    pub fn from_flag(use_original_release_date: bool) -> Self {
        if use_original_release_date {
            DateSource::OriginalRelease
        } else {
            DateSource::Release
        }
    }
}

/// Collapse a (year, month, day) triple into a partial ISO string.
///
/// Empty when the year is zero or absent; the month and day extend the
/// string only while the preceding component is present.
pub fn build_date_string(year: i32, month: i32, day: i32) -> String {
    let mut date = String::new();
    if year != 0 {
        date = year.to_string();
        if month != 0 {
            date.push_str(&format!("-{month}"));
            if day != 0 {
                date.push_str(&format!("-{day}"));
            }
        }
    }
    date
}

fn date_option(year: Option<i32>, month: Option<i32>, day: Option<i32>) -> Option<String> {
    let date = build_date_string(
        year.unwrap_or(0),
        month.unwrap_or(0),
        day.unwrap_or(0),
    );
    if date.is_empty() {
        None
    } else {
        Some(date)
    }
}

/// Seconds (possibly fractional) to truncated milliseconds.
fn millis(seconds: Option<f64>) -> Option<i64> {
    seconds.map(|s| (s * 1000.0) as i64)
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| !v.is_empty()).map(String::from)
}

/// An artist sub-object is only built when at least one of name and
/// external id is present on the source row.
fn artist_from_fields(name: &Option<String>, mbid: &Option<String>) -> Option<Artist> {
    let name = non_empty(name);
    let musicbrainz_id = non_empty(mbid);
    if name.is_none() && musicbrainz_id.is_none() {
        return None;
    }
    let uri = uri::artist_uri(musicbrainz_id.as_deref().unwrap_or(""));
    Some(Artist {
        name,
        musicbrainz_id,
        uri: Some(uri),
    })
}

impl Track {
    /// Map one track-projection row into a [`Track`], deriving the date
    /// string, millisecond fields, URI and embedded artist/album
    /// sub-objects. Total on well-formed rows; absent columns simply omit
    /// the output field.
    pub fn from_item(item: &ItemRow, date_source: DateSource) -> Track {
        let date = match date_source {
            DateSource::OriginalRelease => {
                date_option(item.original_year, item.original_month, item.original_day)
            }
            DateSource::Release => date_option(item.year, item.month, item.day),
        };

        let artists = artist_from_fields(&item.artist, &item.mb_artistid)
            .into_iter()
            .collect();

        let composers = non_empty(&item.composer)
            .map(|name| Artist {
                uri: Some(uri::composer_uri(&name)),
                name: Some(name),
                musicbrainz_id: None,
            })
            .into_iter()
            .collect();

        // The album artist falls back to the track artist when the row
        // carries no albumartist of its own.
        let albumartist_name = non_empty(&item.albumartist).or_else(|| non_empty(&item.artist));
        let albumartist = artist_from_fields(&albumartist_name, &item.mb_albumartistid);

        let album = album_embedded_in(item, albumartist, date.clone());

        Track {
            name: item.title.clone(),
            artists,
            composers,
            album,
            track_no: item.track,
            disc_no: item.disc,
            date,
            length: millis(item.length),
            bitrate: item.bitrate,
            comment: item.comments.clone(),
            musicbrainz_id: non_empty(&item.mb_trackid),
            last_modified: millis(item.mtime),
            genre: item.genre.clone(),
            uri: item
                .path
                .as_deref()
                .map(|path| uri::track_uri(item.id, path)),
        }
    }
}

fn album_embedded_in(
    item: &ItemRow,
    albumartist: Option<Artist>,
    date: Option<String>,
) -> Option<Album> {
    let name = non_empty(&item.album);
    let musicbrainz_id = non_empty(&item.mb_albumid);
    if name.is_none()
        && musicbrainz_id.is_none()
        && albumartist.is_none()
        && item.tracktotal.is_none()
        && item.disctotal.is_none()
    {
        return None;
    }
    let uri = musicbrainz_id
        .as_deref()
        .map(uri::mb_album_uri);
    Some(Album {
        name,
        artists: albumartist.into_iter().collect(),
        date,
        num_tracks: item.tracktotal,
        num_discs: item.disctotal,
        musicbrainz_id,
        images: Vec::new(),
        uri,
    })
}

impl Album {
    /// Map one album-projection row into an [`Album`].
    pub fn from_row(row: &AlbumRow, date_source: DateSource) -> Album {
        let date = match date_source {
            DateSource::OriginalRelease => {
                date_option(row.original_year, row.original_month, row.original_day)
            }
            DateSource::Release => date_option(row.year, row.month, row.day),
        };

        let artists = artist_from_fields(&row.albumartist, &row.mb_albumartistid)
            .into_iter()
            .collect();

        Album {
            name: row.album.clone(),
            artists,
            date,
            num_tracks: None,
            num_discs: row.disctotal,
            musicbrainz_id: non_empty(&row.mb_albumid),
            images: non_empty(&row.artpath).into_iter().collect(),
            uri: Some(uri::album_uri(row.id)),
        }
    }
}
