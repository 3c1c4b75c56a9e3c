//! Minimal XML extraction for Atom and PubMed responses
//!
//! Both feeds are flat and well-formed enough that pulling elements out by
//! tag name is sufficient. Nested elements with the same name are not
//! supported.

use regex_lite::Regex;
use std::sync::OnceLock;

fn element_regex(tag: &str) -> Regex {
    let pattern = format!(
        r"(?s)<{tag}(\s[^>]*)?>(.*?)</{tag}>",
        tag = regex_lite::escape(tag)
    );
    Regex::new(&pattern).expect("escaped tag name forms a valid pattern")
}

/// `(attributes, body)` for every `<tag ...>body</tag>`, in document order
pub fn elements_with_attrs<'a>(xml: &'a str, tag: &str) -> Vec<(&'a str, &'a str)> {
    element_regex(tag)
        .captures_iter(xml)
        .map(|caps| {
            let attrs = caps.get(1).map_or("", |m| m.as_str());
            let body = caps.get(2).map_or("", |m| m.as_str());
            (attrs, body)
        })
        .collect()
}

/// Bodies of every `<tag>` element
pub fn elements<'a>(xml: &'a str, tag: &str) -> Vec<&'a str> {
    elements_with_attrs(xml, tag)
        .into_iter()
        .map(|(_, body)| body)
        .collect()
}

/// Body of the first `<tag>` element
pub fn element<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    element_regex(tag)
        .captures(xml)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
}

/// Cleaned text of the first `<tag>` element, if non-blank
pub fn element_text(xml: &str, tag: &str) -> Option<String> {
    element(xml, tag).map(text).filter(|t| !t.is_empty())
}

/// Value of `name="..."` inside an attribute string
pub fn attr(attrs: &str, name: &str) -> Option<String> {
    let pattern = format!(r#"\b{}\s*=\s*"([^"]*)""#, regex_lite::escape(name));
    let re = Regex::new(&pattern).expect("escaped attribute name forms a valid pattern");
    re.captures(attrs)
        .and_then(|caps| caps.get(1))
        .map(|m| decode_entities(m.as_str()))
}

/// `name` attribute values on every `<tag ...>` opening or self-closing tag
pub fn attribute_values(xml: &str, tag: &str, name: &str) -> Vec<String> {
    let pattern = format!(r"<{}(\s[^>]*)>", regex_lite::escape(tag));
    let re = Regex::new(&pattern).expect("escaped tag name forms a valid pattern");
    re.captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| attr(m.as_str(), name))
        .collect()
}

fn cdata_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("valid CDATA pattern"))
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"))
}

fn escape_markup(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Inline markup removed, entities decoded, whitespace collapsed
pub fn text(fragment: &str) -> String {
    let unwrapped = cdata_regex().replace_all(fragment, |caps: &regex_lite::Captures| {
        escape_markup(caps.get(1).map_or("", |m| m.as_str()))
    });
    let stripped = tag_regex().replace_all(&unwrapped, "");
    let decoded = decode_entities(&stripped);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode the predefined entities plus numeric character references
pub fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];

        let decoded = tail
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&tail[1..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_elements_with_and_without_attributes() {
        let xml = r#"<root><a>one</a><a href="x">two</a><ab>no</ab></root>"#;
        assert_eq!(elements(xml, "a"), vec!["one", "two"]);
        assert_eq!(element(xml, "ab"), Some("no"));
        assert_eq!(element(xml, "missing"), None);
    }

    #[test]
    fn reads_attributes() {
        let xml = r#"<category term="cs.CL" scheme="x"/><category term="cs.LG"/>"#;
        assert_eq!(attribute_values(xml, "category", "term"), vec!["cs.CL", "cs.LG"]);
        assert_eq!(attr(r#" IdType="doi""#, "IdType").as_deref(), Some("doi"));
    }

    #[test]
    fn text_strips_markup_and_whitespace() {
        assert_eq!(text("  H<sub>2</sub>O \n  is   <i>wet</i> "), "H2O is wet");
        assert_eq!(text("<![CDATA[a < b & c]]>"), "a < b & c");
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(decode_entities("Tom &amp; Jerry &lt;3"), "Tom & Jerry <3");
        assert_eq!(decode_entities("&#233;t&#xE9;"), "été");
        assert_eq!(decode_entities("R&D; & more"), "R&D; & more");
    }
}
