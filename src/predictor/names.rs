//! Team-name normalization and matching.
//!
//! Upstream names ("FC Internazionale Milano", "Club Atlético de Madrid")
//! rarely equal the names in the strength table ("Inter Milan", "Atlético
//! Madrid").  Names are normalized into tokens (lowercase, diacritics folded,
//! club affixes dropped) and compared two ways: whole-name equality, then a
//! first-token containment test in both directions.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Club-form tokens that carry no identity ("FC", "Calcio", "Club" …).
const AFFIXES: &[&str] = &[
    "fc", "cf", "afc", "sc", "ssc", "ac", "acf", "as", "ss", "sl", "cp", "rb", "sv", "bv",
    "club", "calcio", "de", "cd", "ud", "sd",
];

/// Shortest token kept after normalization.
const MIN_TOKEN_LEN: usize = 3;

/// Lowercase `name` and strip diacritics: NFKD decomposition with combining
/// marks dropped, plus the handful of letters that do not decompose.
fn fold(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
    {
        match c {
            'ß' => out.push_str("ss"),
            'æ' => out.push_str("ae"),
            'œ' => out.push_str("oe"),
            'ø' => out.push('o'),
            'ł' => out.push('l'),
            'đ' => out.push('d'),
            'ı' => out.push('i'),
            _ => out.push(c),
        }
    }
    out
}

/// Normalize a team name into identity tokens.
///
/// "FC Bayern München" → ["bayern", "munchen"]
/// "AS Roma" → ["roma"]
///
/// Falls back to the unfiltered tokens when every token is an affix or too
/// short, so "AC" still yields ["ac"].
pub fn normalize_tokens(name: &str) -> Vec<String> {
    let folded = fold(name);

    let raw: Vec<&str> = folded
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
        .collect();

    let kept: Vec<String> = raw
        .iter()
        .filter(|t| t.len() >= MIN_TOKEN_LEN && !AFFIXES.contains(t))
        .map(|t| t.to_string())
        .collect();

    if kept.is_empty() {
        raw.into_iter().map(str::to_string).collect()
    } else {
        kept
    }
}

/// Normalized name as a single space-joined string.
pub fn normalize(name: &str) -> String {
    normalize_tokens(name).join(" ")
}

/// Whole-name equality after normalization.
pub fn same_team(a: &str, b: &str) -> bool {
    let a = normalize(a);
    !a.is_empty() && a == normalize(b)
}

/// First-token containment in either direction.
///
/// "Inter" matches "Inter Milan"; "FC Internazionale Milano" matches
/// "Inter Milan" because "internazionale milano" contains "inter".
pub fn first_token_match(query: &str, candidate: &str) -> bool {
    let q = normalize_tokens(query);
    let c = normalize_tokens(candidate);
    let (Some(q_first), Some(c_first)) = (q.first(), c.first()) else {
        return false;
    };
    let q_joined = q.join(" ");
    let c_joined = c.join(" ");
    c_joined.contains(q_first.as_str()) || q_joined.contains(c_first.as_str())
}
