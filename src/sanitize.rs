use regex::Regex;
use std::sync::LazyLock;

use crate::config::MAX_LINK_PASSES;

// ── Link patterns ───────────────────────────────────────────────────
//
// Real data examples:
//   [[Ottawa]]
//   [[Canadian dollar|Canadian dollar]] ($) ([[ISO 4217|CAD]])
//   [[Right- and left-hand traffic|right]]
//
// Both patterns refuse brackets inside the link body, so each pass
// rewrites the innermost links and the next pass sees the outer ones.

// [[Target|Label]] → Label (last pipe segment wins)
static RE_PIPED_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[[^\[\]]*?\|([^\[\]|]*)\]\]").unwrap());

// [[Label]] → Label
static RE_BARE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\[\]|]*)\]\]").unwrap());

/// Turn a captured infobox substring into plain text.
///
/// Steps run in a fixed order: markup tags and comments, the `{{nbsp}}`
/// template, piped links, bare links.
pub fn sanitize(raw: &str) -> String {
    let text = decode_entities(&strip_tags(raw));
    let text = text.replace("{{nbsp}}", " ");
    let text = collapse_links(&text, &RE_PIPED_LINK, "piped");
    collapse_links(&text, &RE_BARE_LINK, "bare")
}

/// Keep only character data outside `<...>` tags and `<!-- -->` comments.
///
/// A `<` counts as a tag opener only when followed by a letter, `/`, `!`
/// or `?`; anything else is literal text. An unterminated tag or comment
/// swallows the rest of the input.
pub fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('<') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(body) = tail.strip_prefix("<!--") {
            match body.find("-->") {
                Some(end) => rest = &body[end + 3..],
                None => return out,
            }
        } else if opens_tag(tail) {
            match tail.find('>') {
                Some(end) => rest = &tail[end + 1..],
                None => return out,
            }
        } else {
            out.push('<');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}

fn opens_tag(tail: &str) -> bool {
    matches!(
        tail[1..].chars().next(),
        Some(c) if c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?')
    )
}

// &name; &#DDDD; &#xHHHH;
static RE_CHAR_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9a-fA-F]{1,6})|([a-zA-Z]+));").unwrap()
});

/// Decode character references in one pass, so `&amp;lt;` stays `&lt;`.
///
/// Non-breaking spaces become plain spaces. Unknown names and invalid
/// code points are left as written.
fn decode_entities(s: &str) -> String {
    RE_CHAR_REF
        .replace_all(s, |caps: &regex::Captures| {
            let decoded = if let Some(dec) = caps.get(1) {
                dec.as_str().parse().ok().and_then(char::from_u32)
            } else if let Some(hex) = caps.get(2) {
                u32::from_str_radix(hex.as_str(), 16).ok().and_then(char::from_u32)
            } else {
                caps.get(3).and_then(|name| named_entity(name.as_str()))
            };
            match decoded {
                Some('\u{a0}') => " ".to_string(),
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    Some(match name {
        "nbsp" => '\u{a0}',
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "minus" => '\u{2212}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "thinsp" => '\u{2009}',
        "times" => '\u{d7}',
        "deg" => '\u{b0}',
        "pound" => '\u{a3}',
        "euro" => '\u{20ac}',
        _ => return None,
    })
}

/// Rewrite `re` matches to their first group until none remain.
///
/// Gives up after `MAX_LINK_PASSES` and returns the text as it stands, so
/// malformed markup cannot spin forever.
fn collapse_links(text: &str, re: &Regex, kind: &str) -> String {
    let mut text = text.to_string();
    for _ in 0..MAX_LINK_PASSES {
        if !re.is_match(&text) {
            return text;
        }
        text = re.replace_all(&text, "${1}").into_owned();
    }
    if re.is_match(&text) {
        tracing::warn!(kind, text = %text, "link nesting too deep, leaving remainder as is");
    }
    text
}
