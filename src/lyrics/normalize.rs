//! Canonical text transforms for noisy title and artist tags.
//!
//! Every function here is pure. The variant generator composes them into
//! progressively more aggressive rewrites of a query.

use once_cell::sync::Lazy;
use regex::Regex;

/// `(...)` and `[...]` spans, shortest match.
static BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(.*?\)|\[.*?\]").expect("valid bracket regex"));

/// A "feat." credit and everything after it, with an optional opening bracket.
static FEATURED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*[(\[]?\s*\b(?:featuring|feat\.?|ft\.?)(?:\s|$).*$")
        .expect("valid featured regex")
});

/// A version qualifier to end of string. After a delimiter the keyword may be
/// surrounded by other words ("- 2011 Remastered", "(Live at Wembley)").
/// Without one, only a trailing run of bare keywords counts, so "Live Forever"
/// and "Video Killed the Radio Star" survive.
static VERSION_TAG: Lazy<Regex> = Lazy::new(|| {
    const KEYWORDS: &str = "version|remix|mix|edit|remastered|remaster|live|acoustic|radio";
    Regex::new(&format!(
        r"(?i)(?:\s*[\-–(\[][^\-–(\[]*?\b(?:{KEYWORDS})\b.*|(?:\s+(?:{KEYWORDS}))+\s*)$"
    ))
    .expect("valid version tag regex")
});

/// Artist separators in priority order. The earliest match in the string wins;
/// ties go to the entry listed first.
pub const ARTIST_SEPARATORS: &[&str] = &[
    " feat. ",
    " feat ",
    " ft. ",
    " ft ",
    " featuring ",
    " & ",
    " x ",
    " X ",
    " vs. ",
    " vs ",
    " with ",
    ", ",
    " / ",
    "/",
];

/// Minimum length of a useful [`first_segment`].
const MIN_SEGMENT_CHARS: usize = 3;

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn strip_bracketed(s: &str) -> String {
    collapse_whitespace(&BRACKETED.replace_all(s, " "))
}

pub fn strip_featured(s: &str) -> String {
    collapse_whitespace(&FEATURED.replace(s, ""))
}

pub fn strip_version_tags(s: &str) -> String {
    collapse_whitespace(&VERSION_TAG.replace(s, ""))
}

/// Text before the first `(`, `[` or `-`, or `None` when that is too short to
/// search with.
pub fn first_segment(s: &str) -> Option<String> {
    let end = s.find(['(', '[', '-']).unwrap_or(s.len());
    let segment = s[..end].trim();
    if segment.chars().count() < MIN_SEGMENT_CHARS {
        return None;
    }
    Some(segment.to_string())
}

/// Split an artist tag at its earliest separator into the primary artist and
/// the remainder (featured or collaborating artists).
pub fn split_artist(s: &str) -> (String, Option<String>) {
    let earliest = ARTIST_SEPARATORS
        .iter()
        .filter_map(|sep| s.find(sep).map(|idx| (idx, *sep)))
        .min_by_key(|(idx, _)| *idx);

    match earliest {
        Some((idx, sep)) if !s[..idx].trim().is_empty() => {
            let rest = s[idx + sep.len()..].trim();
            let secondary = (!rest.is_empty()).then(|| rest.to_string());
            (s[..idx].trim().to_string(), secondary)
        }
        _ => (s.to_string(), None),
    }
}

pub fn primary_artist(s: &str) -> String {
    split_artist(s).0
}

/// Aggressive fallback: lowercase ASCII letters, digits and single spaces only.
pub fn ascii_fold(s: &str) -> String {
    let kept: String = s
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ')
        .collect();
    collapse_whitespace(&kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Hey \t  Jude\n"), "Hey Jude");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn test_strip_bracketed() {
        assert_eq!(strip_bracketed("Song (Remix) [Live]"), "Song");
        assert_eq!(strip_bracketed("A (b) C (d)"), "A C");
        assert_eq!(strip_bracketed("No brackets"), "No brackets");
        // Unclosed brackets are left alone
        assert_eq!(strip_bracketed("Broken (tag"), "Broken (tag");
    }

    #[test]
    fn test_strip_featured() {
        assert_eq!(strip_featured("Song feat. Someone"), "Song");
        assert_eq!(strip_featured("Song (feat. Someone)"), "Song");
        assert_eq!(strip_featured("Song [FT. Someone Else]"), "Song");
        assert_eq!(strip_featured("Song Featuring X & Y"), "Song");
        assert_eq!(strip_featured("Song ft Z"), "Song");
        // "ft" inside a word is not a credit
        assert_eq!(strip_featured("Left Behind"), "Left Behind");
        assert_eq!(strip_featured("Defeat"), "Defeat");
    }

    #[test]
    fn test_strip_version_tags() {
        assert_eq!(strip_version_tags("Song - Radio Edit"), "Song");
        assert_eq!(strip_version_tags("Song (Tiesto Remix)"), "Song");
        assert_eq!(strip_version_tags("Song - 2011 Remastered"), "Song");
        assert_eq!(strip_version_tags("Song (Live at Wembley)"), "Song");
        assert_eq!(strip_version_tags("Song Acoustic"), "Song");
        assert_eq!(strip_version_tags("Paint It Black - Mono Version"), "Paint It Black");
        assert_eq!(strip_version_tags("Live Forever"), "Live Forever");
        assert_eq!(strip_version_tags("Mixed Emotions"), "Mixed Emotions");
        assert_eq!(strip_version_tags("Live Forever (Remix)"), "Live Forever");
    }

    #[test]
    fn test_bare_keyword_must_be_trailing() {
        assert_eq!(strip_version_tags("We Live Forever"), "We Live Forever");
        assert_eq!(
            strip_version_tags("Video Killed the Radio Star"),
            "Video Killed the Radio Star"
        );
        assert_eq!(strip_version_tags("Song Radio Edit"), "Song");
        assert_eq!(strip_version_tags("Song Remixes"), "Song Remixes");
        assert_eq!(strip_version_tags("Radio Star - Live"), "Radio Star");
    }

    #[test]
    fn test_first_segment() {
        assert_eq!(first_segment("Song Title - Extended").as_deref(), Some("Song Title"));
        assert_eq!(first_segment("Song (Remix)").as_deref(), Some("Song"));
        assert_eq!(first_segment("Ok [x]"), None);
        assert_eq!(first_segment("-Intro"), None);
        assert_eq!(first_segment("Plain").as_deref(), Some("Plain"));
    }

    #[test]
    fn test_primary_artist() {
        assert_eq!(primary_artist("A feat. B"), "A");
        assert_eq!(primary_artist("A & B"), "A");
        assert_eq!(primary_artist("AC/DC"), "AC");
        assert_eq!(primary_artist("Solo"), "Solo");
        // Earliest position wins over list priority
        assert_eq!(primary_artist("A, B feat. C"), "A");
        assert_eq!(primary_artist("A x B & C"), "A");
        // Matching is case-sensitive apart from the explicit " X "
        assert_eq!(primary_artist("A Feat. B"), "A Feat. B");
        assert_eq!(primary_artist("A X B"), "A");
    }

    #[test]
    fn test_split_artist_secondary() {
        assert_eq!(
            split_artist("A feat. B & C"),
            ("A".to_string(), Some("B & C".to_string()))
        );
        assert_eq!(split_artist("Solo"), ("Solo".to_string(), None));
        // A leading separator would leave no primary artist
        assert_eq!(split_artist("/A"), ("/A".to_string(), None));
    }

    #[test]
    fn test_ascii_fold() {
        assert_eq!(ascii_fold("Beyoncé — Halo!"), "beyonc halo");
        assert_eq!(ascii_fold("  AC/DC  "), "acdc");
        assert_eq!(ascii_fold("ümlaut"), "mlaut");
        assert_eq!(ascii_fold("日本語"), "");
    }
}
