//! # Predicate Builder Module
//!
//! Translates a canonical query into filter clauses scoped to one of the
//! two catalog projections. The scope decides field remapping: a query
//! written against tracks means something slightly different when applied
//! to the albums table (`artist` becomes `albumartist`, and the artist
//! identity key `mb_artistid` becomes `mb_albumartistid`).
//!
//! Literal escaping is deliberately minimal. A value containing a double
//! quote is wrapped in single quotes, anything else in double quotes, and
//! that is the entire hardening story: this is a best-effort translation
//! layer over a local catalog file, not a secure query interface.

use std::fmt;

use crate::query::Query;

/// Which catalog projection a predicate targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The track projection (`items` table).
    Items,
    /// The album projection (`albums` table).
    Albums,
}

impl Scope {
    pub fn table(self) -> &'static str {
        match self {
            Scope::Items => "items",
            Scope::Albums => "albums",
        }
    }
}

/// A single filter clause against a scope table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub scope: Scope,
    pub field: String,
    pub value: String,
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.scope.table();
        // The added field carries a recency window token, not a literal;
        // the epoch cutoff is computed inside SQLite.
        if self.field == "added" {
            if let Some(modifier) = window_modifier(&self.value) {
                return write!(f, "{table}.added >= strftime('%s','now','{modifier}')");
            }
        }
        write!(f, "{table}.{} = {}", self.field, quoted(&self.value))
    }
}

fn window_modifier(token: &str) -> Option<&'static str> {
    match token {
        "1d" => Some("-1 day"),
        "1w" => Some("-7 days"),
        "1m" => Some("-1 month"),
        _ => None,
    }
}

fn quoted(value: &str) -> String {
    if value.contains('"') {
        format!("'{value}'")
    } else {
        format!("\"{value}\"")
    }
}

/// Remap a query field name for the given scope.
///
/// Unknown fields pass through untouched; the builder does not validate
/// field existence.
pub fn remap_field<'a>(field: &'a str, scope: Scope) -> &'a str {
    match (scope, field) {
        (Scope::Albums, "artist") => "albumartist",
        (_, "mb_artistid") => "mb_albumartistid",
        (Scope::Items, "track_name") => "title",
        _ => field,
    }
}

/// Build the ordered clause list for a canonical query.
///
/// Every value of a multi-valued field contributes its own equality
/// clause, and clauses are ANDed by the consumer. Repeated values for one
/// field therefore narrow the match instead of widening it. That is
/// long-standing engine behavior which clients depend on, and it is pinned
/// by a test below rather than changed.
pub fn build(query: &Query, scope: Scope) -> Vec<Predicate> {
    let mut predicates = Vec::new();
    for (field, values) in query {
        let field = remap_field(field, scope);
        for value in values {
            predicates.push(Predicate {
                scope,
                field: field.to_string(),
                value: value.clone(),
            });
        }
    }
    log::trace!("Built {} predicates for scope {scope:?}", predicates.len());
    predicates
}

/// Render predicates as a trailing `and ...` chain for a `where 1=1`
/// statement.
pub fn where_suffix(predicates: &[Predicate]) -> String {
    let mut suffix = String::new();
    for predicate in predicates {
        suffix.push_str(" and ");
        suffix.push_str(&predicate.to_string());
    }
    suffix
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &[&str])]) -> Query {
        pairs
            .iter()
            .map(|(k, vs)| (k.to_string(), vs.iter().map(ToString::to_string).collect()))
            .collect()
    }

    #[test]
    fn multiple_values_for_one_field_and_together() {
        // Two values for genre yield two conjunctive clauses. Rows must
        // satisfy both; this narrows rather than widens the match.
        let predicates = build(&query(&[("genre", &["Rock", "Pop"])]), Scope::Items);
        assert_eq!(predicates.len(), 2);
        assert_eq!(
            where_suffix(&predicates),
            " and items.genre = \"Rock\" and items.genre = \"Pop\""
        );
    }

    #[test]
    fn album_scope_remaps_artist_to_albumartist() {
        let predicates = build(&query(&[("artist", &["X"])]), Scope::Albums);
        assert_eq!(predicates[0].to_string(), "albums.albumartist = \"X\"");
        assert!(!where_suffix(&predicates).contains("albums.artist"));
    }

    #[test]
    fn artist_identity_key_remaps_in_both_scopes() {
        let q = query(&[("mb_artistid", &["abc-123"])]);
        assert_eq!(
            build(&q, Scope::Albums)[0].to_string(),
            "albums.mb_albumartistid = \"abc-123\""
        );
        assert_eq!(
            build(&q, Scope::Items)[0].to_string(),
            "items.mb_albumartistid = \"abc-123\""
        );
    }

    #[test]
    fn track_name_remaps_to_title() {
        let predicates = build(&query(&[("track_name", &["Foo"])]), Scope::Items);
        assert_eq!(predicates[0].to_string(), "items.title = \"Foo\"");
    }

    #[test]
    fn double_quoted_values_switch_to_single_quotes() {
        let predicates = build(&query(&[("title", &["the \"hit\" single"])]), Scope::Items);
        assert_eq!(
            predicates[0].to_string(),
            "items.title = 'the \"hit\" single'"
        );
    }

    #[test]
    fn unknown_fields_are_emitted_verbatim() {
        let predicates = build(&query(&[("samplerate", &["44100"])]), Scope::Items);
        assert_eq!(predicates[0].to_string(), "items.samplerate = \"44100\"");
    }

    #[test]
    fn added_window_tokens_render_as_epoch_cutoffs() {
        let predicates = build(&query(&[("added", &["1w"])]), Scope::Items);
        assert_eq!(
            predicates[0].to_string(),
            "items.added >= strftime('%s','now','-7 days')"
        );
    }

    #[test]
    fn unknown_added_token_falls_back_to_equality() {
        let predicates = build(&query(&[("added", &["yesterday"])]), Scope::Items);
        assert_eq!(predicates[0].to_string(), "items.added = \"yesterday\"");
    }
}
