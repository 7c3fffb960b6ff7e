//! Entity decoding and cleanup for editor-supplied titles.
use regex::{Captures, Regex};
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Named entities decoded by [`decode_entities`]; anything else passes through.
/// `&#39;` needs no entry, the numeric pass handles it.
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("nbsp", "\u{00A0}"),
    ("ndash", "\u{2013}"),
    ("mdash", "\u{2014}"),
    ("copy", "\u{00A9}"),
    ("reg", "\u{00AE}"),
    ("trade", "\u{2122}"),
];

/// Non-breaking, zero-width and typographic spaces that editors paste in.
pub(crate) const SPACE_LIKE: &[char] = &[
    '\u{00A0}', '\u{200B}', '\u{2002}', '\u{2003}', '\u{2009}', '\u{202F}', '\u{FEFF}',
];

static NAMED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&([A-Za-z]+);").expect("NAMED_RE: hardcoded regex is valid"));

static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#([0-9]+);").expect("DECIMAL_RE: hardcoded regex is valid"));

static HEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)&#x([0-9a-f]+);").expect("HEX_RE: hardcoded regex is valid")
});

// Unicode-aware: letters, digits and marks of any script count as word characters.
static NO_WORD_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\W_]*$").expect("NO_WORD_CHARS_RE: hardcoded regex is valid"));

pub(crate) fn is_space_like(c: char) -> bool {
    c.is_whitespace() || SPACE_LIKE.contains(&c)
}

fn code_point(caps: &Captures<'_>, radix: u32) -> String {
    u32::from_str_radix(&caps[1], radix)
        .ok()
        .and_then(char::from_u32)
        .map(String::from)
        .unwrap_or_else(|| caps[0].to_string())
}

/// Decode the fixed named-entity table, then decimal, then hex references.
///
/// The passes run in sequence, so `&amp;#39;` ends up as `'`.
pub fn decode_entities(raw: &str) -> String {
    let named = NAMED_RE.replace_all(raw, |caps: &Captures<'_>| {
        let name = caps[1].to_ascii_lowercase();
        NAMED_ENTITIES
            .iter()
            .find(|(entity, _)| *entity == name)
            .map(|(_, decoded)| (*decoded).to_string())
            .unwrap_or_else(|| caps[0].to_string())
    });
    let decimal = DECIMAL_RE.replace_all(&named, |caps: &Captures<'_>| code_point(caps, 10));
    HEX_RE
        .replace_all(&decimal, |caps: &Captures<'_>| code_point(caps, 16))
        .into_owned()
}

/// Decode entities, NFKC-normalize, flatten odd spaces, collapse and trim.
///
/// ```
/// use bryte_cms::normalize::clean_title;
///
/// assert_eq!(clean_title("A&nbsp;&amp;&nbsp;B"), "A & B");
/// assert_eq!(clean_title("  \u{200B} Foo \u{00A0} Bar  "), "Foo Bar");
/// ```
pub fn clean_title(raw: &str) -> String {
    let decoded = decode_entities(raw);
    let normalized: String = decoded
        .nfkc()
        .map(|c| if SPACE_LIKE.contains(&c) { ' ' } else { c })
        .collect();
    normalized.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether a cleaned title is real, visible text.
///
/// ```
/// use bryte_cms::normalize::is_valid_title;
///
/// assert!(is_valid_title("OK"));
/// assert!(!is_valid_title(""));
/// assert!(!is_valid_title("   "));
/// assert!(!is_valid_title("!!!"));
/// ```
pub fn is_valid_title(title: &str) -> bool {
    if title.chars().count() < 2 {
        return false;
    }
    if title.chars().all(is_space_like) {
        return false;
    }
    !NO_WORD_CHARS_RE.is_match(title)
}
