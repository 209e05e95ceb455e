//! Canonicalization of raw size/color/article values.
//!
//! All functions here are total: any input maps to a defined canonical value,
//! never an error. Callers normalize before grouping or comparing, never
//! after.

use stockbook_core::ColorId;

/// A raw color value as it arrives from entry forms, imports or legacy rows.
///
/// The conversions cover the shapes the surrounding flows actually hand us, so
/// call sites can pass their value as-is.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RawColor<'a> {
    /// No value present (NULL column, absent field).
    Missing,
    /// A numeric value, possibly zero or negative.
    Number(i64),
    /// A free-text value, possibly numeric-looking.
    Text(&'a str),
}

impl From<i64> for RawColor<'_> {
    fn from(value: i64) -> Self {
        RawColor::Number(value)
    }
}

impl From<Option<i64>> for RawColor<'_> {
    fn from(value: Option<i64>) -> Self {
        match value {
            Some(n) => RawColor::Number(n),
            None => RawColor::Missing,
        }
    }
}

impl<'a> From<&'a str> for RawColor<'a> {
    fn from(value: &'a str) -> Self {
        RawColor::Text(value)
    }
}

impl<'a> From<Option<&'a str>> for RawColor<'a> {
    fn from(value: Option<&'a str>) -> Self {
        match value {
            Some(s) => RawColor::Text(s),
            None => RawColor::Missing,
        }
    }
}

impl From<Option<ColorId>> for RawColor<'_> {
    fn from(value: Option<ColorId>) -> Self {
        match value {
            Some(c) => RawColor::Number(c.get() as i64),
            None => RawColor::Missing,
        }
    }
}

/// Map a raw color value to its canonical reference id.
///
/// Missing, zero (`0` or `"0"`), negative and non-numeric inputs all mean
/// "no color" and map to `None`; any positive numeric value maps to its
/// `ColorId`. Idempotent: feeding the result back in yields the same result.
pub fn normalize_color_id<'a>(raw: impl Into<RawColor<'a>>) -> Option<ColorId> {
    match raw.into() {
        RawColor::Missing => None,
        RawColor::Number(n) => {
            if n > 0 && n <= u32::MAX as i64 {
                ColorId::new(n as u32)
            } else {
                None
            }
        }
        RawColor::Text(s) => match s.trim().parse::<i64>() {
            Ok(n) => normalize_color_id(n),
            Err(_) => None,
        },
    }
}

/// Growth-banded size labels used by the school-uniform line.
///
/// These combine a garment size with a height band (`size/height-height`) and
/// carry meaning as a whole, so they are preserved verbatim instead of being
/// cut at the first token.
const GROWTH_BANDED_SIZES: &[&str] = &[
    "26/104-110",
    "28/110-116",
    "30/116-122",
    "32/122-128",
    "34/128-134",
    "36/134-140",
    "38/140-146",
];

/// Fold Cyrillic homoglyphs in letter sizes to their Latin counterparts.
///
/// Single-letter and short letter sizes ("М", "ХЛ") are routinely typed on a
/// Cyrillic layout; visually identical, different code points.
fn fold_homoglyph(c: char) -> char {
    match c {
        'А' => 'A',
        'В' => 'B',
        'Е' => 'E',
        'К' => 'K',
        'Л' => 'L',
        'М' => 'M',
        'Н' => 'H',
        'О' => 'O',
        'Р' => 'P',
        'С' => 'S',
        'Т' => 'T',
        'Х' => 'X',
        'а' => 'a',
        'в' => 'b',
        'е' => 'e',
        'к' => 'k',
        'л' => 'l',
        'м' => 'm',
        'н' => 'h',
        'о' => 'o',
        'р' => 'p',
        'с' => 's',
        'т' => 't',
        'х' => 'x',
        other => other,
    }
}

/// Canonicalize a raw size label.
///
/// Growth-banded labels are preserved verbatim (trimmed). Otherwise a trailing
/// descriptive suffix — an age annotation or a parenthesized range after the
/// size proper — is dropped, keeping only the leading token. Short letter
/// sizes are homoglyph-folded and upper-cased so "м", "M" and "М" land on the
/// same key. Plain labels pass through trimmed.
///
/// Takes no context beyond the label itself: every stage of the pipeline
/// (aggregation, validation, commit) must derive the same key from the same
/// raw value, with or without reference data at hand.
pub fn normalize_size_code(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if GROWTH_BANDED_SIZES.contains(&trimmed) {
        return trimmed.to_string();
    }

    // "30 (7 лет)" -> "30", "XL (52-54)" -> "XL".
    let token = leading_token(trimmed);

    let folded: String = token.chars().map(fold_homoglyph).collect();
    if folded.chars().count() <= 4 && folded.chars().all(|c| c.is_alphabetic()) {
        folded.to_uppercase()
    } else {
        folded
    }
}

fn leading_token(label: &str) -> &str {
    let end = label
        .char_indices()
        .find(|(_, c)| c.is_whitespace() || *c == '(')
        .map(|(i, _)| i)
        .unwrap_or(label.len());
    &label[..end]
}

/// Canonicalize a raw article code.
///
/// Legacy rows carry articles with a lowercase Latin first letter; only that
/// first character is upper-cased, everything else stays untouched.
pub fn normalize_article(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {
            let mut out = String::with_capacity(trimmed.len());
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
            out
        }
        _ => trimmed.to_string(),
    }
}
