//! # URI Codec Module
//!
//! Everything the engine hands out is re-navigable through an opaque URI
//! in the `catalog:` scheme. Two families exist:
//!
//! - browse URIs: `catalog:<level>[?key=value&key=value...]`, where the
//!   query string threads the accumulated browse context downward,
//! - entity URIs: `catalog:<item_type>:<id>:<suffix>`, identifying a
//!   single track, album or artist.
//!
//! Encoding is canonical: attribute keys are emitted in sorted order with
//! the first value per key, so semantically identical queries always
//! produce byte-identical URIs. Decoding accepts repeated keys and
//! accumulates their values in order.
//!
//! A URI outside the `catalog:` scheme is not an error; it decodes to an
//! empty level and the caller treats it as "no match".

use crate::query::Query;

/// The engine's URI scheme.
pub const SCHEME: &str = "catalog";

/// The root of the browse hierarchy.
pub const ROOT_URI: &str = "catalog:root";

/// Encode a browse level plus attribute context into a URI.
///
/// Multi-valued attributes are flattened to their first value; multi-value
/// support exists only on decode.
pub fn encode_browse(level: &str, attrs: &Query) -> String {
    let mut uri = format!("{SCHEME}:{level}");
    let mut separator = '?';
    for (key, values) in attrs {
        let Some(first) = values.first() else {
            continue;
        };
        uri.push(separator);
        uri.push_str(&urlencoding::encode(key));
        uri.push('=');
        uri.push_str(&urlencoding::encode(first));
        separator = '&';
    }
    uri
}

/// Decode a browse URI into its level and attribute map.
///
/// Yields an empty level for URIs outside the `catalog:` scheme.
pub fn decode(uri: &str) -> (String, Query) {
    let Some(rest) = uri.strip_prefix("catalog:") else {
        return (String::new(), Query::new());
    };
    let (level, query_string) = match rest.split_once('?') {
        Some((level, query_string)) => (level, query_string),
        None => (rest, ""),
    };

    let mut attrs = Query::new();
    for pair in query_string.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        attrs
            .entry(percent_decode(key))
            .or_default()
            .push(percent_decode(value));
    }
    (level.to_string(), attrs)
}

fn percent_decode(raw: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(raw.as_bytes())).into_owned()
}

/// `catalog:track:<item_id>:<percent-encoded path>`
pub fn track_uri(item_id: i64, path: &str) -> String {
    format!("{SCHEME}:track:{item_id}:{}", urlencoding::encode(path))
}

/// `catalog:album:<album_id>:`
pub fn album_uri(album_id: i64) -> String {
    format!("{SCHEME}:album:{album_id}:")
}

/// `catalog:mb_album:<mbid>:`
pub fn mb_album_uri(mbid: &str) -> String {
    format!("{SCHEME}:mb_album:{}:", urlencoding::encode(mbid))
}

/// `catalog:artist:<encoded external id>:`
///
/// An empty external id is legal and yields a valid but non-resolving
/// identity.
pub fn artist_uri(external_id: &str) -> String {
    format!("{SCHEME}:artist:{}:", urlencoding::encode(external_id))
}

/// `catalog:composer:<encoded name>:`
pub fn composer_uri(name: &str) -> String {
    format!("{SCHEME}:composer:{}:", urlencoding::encode(name))
}

/// A parsed entity URI, as consumed by `lookup`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityUri {
    pub item_type: String,
    pub id: String,
}

/// Split an entity URI into item type and identifier.
///
/// Returns `None` for URIs outside the scheme or without an id segment;
/// the caller logs and produces an empty result.
pub fn parse_entity(uri: &str) -> Option<EntityUri> {
    let rest = uri.strip_prefix("catalog:")?;
    let mut segments = rest.splitn(3, ':');
    let item_type = segments.next()?;
    let id = segments.next()?;
    if item_type.is_empty() {
        return None;
    }
    Some(EntityUri {
        item_type: item_type.to_string(),
        id: id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Query {
        let mut query = Query::new();
        for (k, v) in pairs {
            query
                .entry(k.to_string())
                .or_default()
                .push(v.to_string());
        }
        query
    }

    #[test]
    fn encode_without_attrs_has_no_query_string() {
        assert_eq!(encode_browse("root", &Query::new()), "catalog:root");
    }

    #[test]
    fn encode_is_canonical_regardless_of_insertion_order() {
        let forward = attrs(&[("genre", "Rock"), ("albumartist", "Ayreon")]);
        let backward = attrs(&[("albumartist", "Ayreon"), ("genre", "Rock")]);
        assert_eq!(
            encode_browse("album", &forward),
            encode_browse("album", &backward)
        );
        assert_eq!(
            encode_browse("album", &forward),
            "catalog:album?albumartist=Ayreon&genre=Rock"
        );
    }

    #[test]
    fn round_trip_preserves_level_and_first_values() {
        let original = attrs(&[("genre", "Symphonic Metal"), ("year", "1998")]);
        let (level, decoded) = decode(&encode_browse("artist", &original));
        assert_eq!(level, "artist");
        assert_eq!(decoded, original);
    }

    #[test]
    fn decode_accumulates_repeated_keys() {
        let (level, decoded) = decode("catalog:album?genre=Rock&genre=Pop");
        assert_eq!(level, "album");
        assert_eq!(
            decoded.get("genre"),
            Some(&vec!["Rock".to_string(), "Pop".to_string()])
        );
    }

    #[test]
    fn foreign_scheme_decodes_to_empty_level() {
        let (level, decoded) = decode("spotify:track:xyz");
        assert_eq!(level, "");
        assert!(decoded.is_empty());
    }

    #[test]
    fn encode_flattens_to_first_value() {
        let mut query = Query::new();
        query.insert(
            "genre".to_string(),
            vec!["Rock".to_string(), "Pop".to_string()],
        );
        assert_eq!(encode_browse("artist", &query), "catalog:artist?genre=Rock");
    }

    #[test]
    fn track_uri_encodes_the_path() {
        let uri = track_uri(17, "/music/a b/c.flac");
        assert_eq!(uri, "catalog:track:17:%2Fmusic%2Fa%20b%2Fc.flac");
    }

    #[test]
    fn entity_uri_parses_type_and_id() {
        let entity = parse_entity("catalog:track:17:%2Fmusic%2Fc.flac").unwrap();
        assert_eq!(entity.item_type, "track");
        assert_eq!(entity.id, "17");

        let entity = parse_entity("catalog:album:5:").unwrap();
        assert_eq!(entity.item_type, "album");
        assert_eq!(entity.id, "5");
    }

    #[test]
    fn entity_uri_rejects_foreign_and_truncated_input() {
        assert!(parse_entity("file:///music/c.flac").is_none());
        assert!(parse_entity("catalog:root").is_none());
    }

    #[test]
    fn empty_artist_id_still_yields_a_uri() {
        assert_eq!(artist_uri(""), "catalog:artist::");
    }
}
