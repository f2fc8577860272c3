//! LRC to plain text.
//!
//! Some providers only carry timed lyrics:
//! [00:12.34] Hello world
//! [00:15.00][01:20.00] Chorus line
//!
//! Timing is discarded; lines come out in playback order so repeated
//! choruses appear where they are sung.

/// Parse a timestamp like "00:12.34", "00:12:34" or "00:12" into milliseconds.
fn parse_timestamp(s: &str) -> Option<u64> {
    let parts: Vec<&str> = s.split([':', '.']).collect();
    let (min, sec, frac) = match parts.as_slice() {
        [min, sec] => (min, sec, None),
        [min, sec, frac] => (min, sec, Some(*frac)),
        _ => return None,
    };
    let min: u64 = min.parse().ok()?;
    let sec: u64 = sec.parse().ok()?;
    let ms = match frac {
        None => 0,
        Some(f) => {
            let v: u64 = f.parse().ok()?;
            match f.len() {
                1 => v * 100,
                2 => v * 10,
                3 => v,
                _ => return None,
            }
        }
    };
    min.checked_mul(60_000)?
        .checked_add(sec.checked_mul(1000)?)?
        .checked_add(ms)
}

/// Metadata tags look like `[ar:Artist]`: a short alphabetic name and a colon.
fn is_metadata_tag(line: &str) -> bool {
    let Some(inner) = line.strip_prefix('[').and_then(|l| l.split(']').next()) else {
        return false;
    };
    match inner.split_once(':') {
        Some((tag, _)) => {
            !tag.is_empty() && tag.len() <= 6 && tag.chars().all(|c| c.is_ascii_alphabetic())
        }
        None => false,
    }
}

/// Leading timestamps of a line and the remaining text.
fn split_timed(line: &str) -> (Vec<u64>, &str) {
    let mut stamps = Vec::new();
    let mut rest = line;
    while let Some(tail) = rest.strip_prefix('[') {
        let Some(end) = tail.find(']') else { break };
        let Some(ms) = parse_timestamp(&tail[..end]) else { break };
        stamps.push(ms);
        rest = &tail[end + 1..];
    }
    (stamps, rest.trim())
}

/// True when the content has at least one timestamped line.
pub fn is_timed(content: &str) -> bool {
    content
        .lines()
        .any(|l| !split_timed(l.trim()).0.is_empty())
}

/// Strip LRC timing and metadata, returning one lyric line per output line.
pub fn to_plain_text(content: &str) -> String {
    let mut timed: Vec<(u64, &str)> = Vec::new();
    let mut untimed: Vec<&str> = Vec::new();

    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if is_metadata_tag(line) {
            continue;
        }
        let (stamps, text) = split_timed(line);
        if stamps.is_empty() {
            untimed.push(line);
        } else if !text.is_empty() {
            timed.extend(stamps.into_iter().map(|ms| (ms, text)));
        }
    }

    if timed.is_empty() {
        return untimed.join("\n");
    }
    timed.sort_by_key(|(ms, _)| *ms);
    timed
        .into_iter()
        .map(|(_, text)| text)
        .collect::<Vec<_>>()
        .join("\n")
}
