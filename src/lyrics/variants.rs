//! Query variant generation.
//!
//! Expands one noisy `(title, artist)` pair into an ordered list of search
//! candidates, from the exact query to the most aggressively normalized one.

use super::normalize::{
    ascii_fold, collapse_whitespace, first_segment, primary_artist, strip_bracketed,
    strip_featured, strip_version_tags,
};
use super::Query;
use std::collections::HashSet;

/// Ordered, case-insensitively unique list of candidates.
#[derive(Debug, Default)]
struct VariantList {
    seen: HashSet<String>,
    items: Vec<Query>,
}

impl VariantList {
    fn dedup_key(title: &str, artist: &str) -> String {
        format!("{}-{}", title.to_lowercase(), artist.to_lowercase())
    }

    fn push(&mut self, title: &str, artist: &str) {
        if title.trim().is_empty() || artist.trim().is_empty() {
            return;
        }
        if self.seen.insert(Self::dedup_key(title, artist)) {
            self.items.push(Query::new(title, artist));
        }
    }
}

/// Build the candidate list for `query`. The original query is always first.
pub fn generate(query: &Query) -> Vec<Query> {
    let title = query.title.as_str();
    let artist = query.artist.as_str();
    let primary = primary_artist(artist);
    let has_primary = primary != artist;

    let mut list = VariantList::default();
    list.seen.insert(VariantList::dedup_key(title, artist));
    list.items.push(query.clone());

    list.push(&collapse_whitespace(title), &collapse_whitespace(artist));

    let bracketless = strip_bracketed(title);
    list.push(&bracketless, artist);

    list.push(&strip_featured(title), artist);

    if has_primary {
        list.push(title, &primary);
        if bracketless != title {
            list.push(&bracketless, &primary);
        }
    }

    let versionless = strip_version_tags(title);
    list.push(&versionless, artist);
    if has_primary {
        list.push(&versionless, &primary);
    }

    if let Some(segment) = first_segment(title) {
        list.push(&segment, artist);
        if has_primary {
            list.push(&segment, &primary);
        }
    }

    let folded_title = ascii_fold(title);
    let folded_artist = ascii_fold(artist);
    if !folded_title.is_empty() && !folded_artist.is_empty() {
        list.push(&folded_title, &folded_artist);
    }

    list.items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(variants: &[Query]) -> Vec<(&str, &str)> {
        variants
            .iter()
            .map(|q| (q.title.as_str(), q.artist.as_str()))
            .collect()
    }

    #[test]
    fn test_original_is_first() {
        let q = Query::new("  Weird   Spacing ", "Someone");
        let variants = generate(&q);
        assert_eq!(variants[0], q);
        assert_eq!(variants[1], Query::new("Weird Spacing", "Someone"));
    }

    #[test]
    fn test_clean_query_yields_only_original() {
        // Every rewrite, including the folded one, collides with the original key
        let variants = generate(&Query::new("Yesterday", "The Beatles"));
        assert_eq!(pairs(&variants), vec![("Yesterday", "The Beatles")]);
    }

    #[test]
    fn test_bracketed_before_primary_artist() {
        let variants = generate(&Query::new("Song (Remix) [Live]", "A feat. B"));
        let list = pairs(&variants);

        let bracketless = list.iter().position(|p| *p == ("Song", "A feat. B")).unwrap();
        let primary_only = list
            .iter()
            .position(|p| *p == ("Song (Remix) [Live]", "A"))
            .unwrap();
        assert!(bracketless < primary_only);

        assert_eq!(
            list,
            vec![
                ("Song (Remix) [Live]", "A feat. B"),
                ("Song", "A feat. B"),
                ("Song (Remix) [Live]", "A"),
                ("Song", "A"),
                ("song remix live", "a feat b"),
            ]
        );
    }

    #[test]
    fn test_full_order() {
        let variants = generate(&Query::new("Track feat. X - Radio Edit", "Main & Guest"));
        assert_eq!(
            pairs(&variants),
            vec![
                ("Track feat. X - Radio Edit", "Main & Guest"),
                ("Track", "Main & Guest"),
                ("Track feat. X - Radio Edit", "Main"),
                ("Track feat. X", "Main & Guest"),
                ("Track feat. X", "Main"),
                ("track feat x radio edit", "main guest"),
            ]
        );
    }

    #[test]
    fn test_no_case_insensitive_duplicates() {
        let variants = generate(&Query::new("HELLO (Live)", "ADELE"));
        let mut keys: Vec<String> = variants
            .iter()
            .map(|q| format!("{}-{}", q.title.to_lowercase(), q.artist.to_lowercase()))
            .collect();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), total);
    }

    #[test]
    fn test_deterministic() {
        let q = Query::new("Song (feat. Z) [2011 Remaster]", "A x B");
        assert_eq!(generate(&q), generate(&q));
    }

    #[test]
    fn test_fold_skipped_when_blank() {
        let variants = generate(&Query::new("日本語", "歌手"));
        assert_eq!(pairs(&variants), vec![("日本語", "歌手")]);
    }
}
