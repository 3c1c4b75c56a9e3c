//! Style-specific renderers

use super::names::{parse_all, PersonName};
use super::CitationMetadata;

fn nonblank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Append a period unless the text already ends a sentence
fn terminate(text: &str) -> String {
    let text = text.trim_end();
    if text.ends_with(['.', '?', '!']) {
        text.to_string()
    } else {
        format!("{}.", text)
    }
}

/// `"Title."` with the period inside the quotes
fn quoted_title(title: &str) -> String {
    let title = title.trim();
    if title.ends_with(['.', '?', '!']) {
        format!("\"{}\"", title)
    } else {
        format!("\"{}.\"", title)
    }
}

fn doi_link(doi: &str) -> String {
    if doi.starts_with("http://") || doi.starts_with("https://") {
        return doi.to_string();
    }
    let bare = doi.strip_prefix("doi:").unwrap_or(doi).trim();
    format!("https://doi.org/{}", bare)
}

fn link(meta: &CitationMetadata) -> Option<String> {
    nonblank(&meta.doi)
        .map(doi_link)
        .or_else(|| nonblank(&meta.url).map(String::from))
}

// ============================================================================
// APA
// ============================================================================

fn apa_authors(names: &[PersonName]) -> Option<String> {
    let formatted: Vec<String> = names.iter().map(PersonName::family_initials).collect();
    match formatted.len() {
        0 => None,
        1 => Some(formatted[0].clone()),
        2 => Some(format!("{}, & {}", formatted[0], formatted[1])),
        n if n <= 20 => Some(format!(
            "{}, & {}",
            formatted[..n - 1].join(", "),
            formatted[n - 1]
        )),
        n => Some(format!(
            "{}, . . . {}",
            formatted[..19].join(", "),
            formatted[n - 1]
        )),
    }
}

pub(super) fn apa(meta: &CitationMetadata) -> String {
    let names = parse_all(&meta.authors);
    let mut parts = Vec::new();

    let year = match meta.year {
        Some(y) => format!("({}).", y),
        None => "(n.d.).".to_string(),
    };
    let title = meta.title.trim();

    match apa_authors(&names) {
        Some(authors) => {
            parts.push(terminate(&authors));
            parts.push(year);
            if !title.is_empty() {
                parts.push(terminate(title));
            }
        }
        None => {
            if !title.is_empty() {
                parts.push(terminate(title));
            }
            parts.push(year);
        }
    }

    if let Some(journal) = nonblank(&meta.journal) {
        let mut source = journal.to_string();
        if let Some(volume) = nonblank(&meta.volume) {
            source.push_str(&format!(", {}", volume));
            if let Some(issue) = nonblank(&meta.issue) {
                source.push_str(&format!("({})", issue));
            }
        }
        if let Some(pages) = nonblank(&meta.pages) {
            source.push_str(&format!(", {}", pages));
        }
        parts.push(terminate(&source));
    } else if let Some(publisher) = nonblank(&meta.publisher) {
        parts.push(terminate(publisher));
    }

    if let Some(link) = link(meta) {
        parts.push(link);
    }

    parts.join(" ")
}

// ============================================================================
// MLA
// ============================================================================

fn mla_authors(names: &[PersonName]) -> Option<String> {
    match names {
        [] => None,
        [only] => Some(only.family_given()),
        [first, second] => Some(format!(
            "{}, and {}",
            first.family_given(),
            second.given_family()
        )),
        [first, ..] => Some(format!("{}, et al", first.family_given())),
    }
}

pub(super) fn mla(meta: &CitationMetadata) -> String {
    let names = parse_all(&meta.authors);
    let mut parts = Vec::new();

    if let Some(authors) = mla_authors(&names) {
        parts.push(terminate(&authors));
    }
    if !meta.title.trim().is_empty() {
        parts.push(quoted_title(&meta.title));
    }

    let mut container: Vec<String> = Vec::new();
    if let Some(journal) = nonblank(&meta.journal) {
        container.push(journal.to_string());
    }
    if let Some(volume) = nonblank(&meta.volume) {
        container.push(format!("vol. {}", volume));
    }
    if let Some(issue) = nonblank(&meta.issue) {
        container.push(format!("no. {}", issue));
    }
    if let Some(publisher) = nonblank(&meta.publisher).filter(|_| meta.journal.is_none()) {
        container.push(publisher.to_string());
    }
    if let Some(year) = meta.year {
        container.push(year.to_string());
    }
    if let Some(pages) = nonblank(&meta.pages) {
        container.push(format!("pp. {}", pages));
    }
    if !container.is_empty() {
        parts.push(terminate(&container.join(", ")));
    }

    if let Some(link) = link(meta) {
        parts.push(format!("{}.", link));
    }

    parts.join(" ")
}

// ============================================================================
// Chicago (notes-bibliography, bibliography entry)
// ============================================================================

fn chicago_authors(names: &[PersonName]) -> Option<String> {
    match names {
        [] => None,
        [only] => Some(only.family_given()),
        [first, second] => Some(format!(
            "{}, and {}",
            first.family_given(),
            second.given_family()
        )),
        all if all.len() <= 10 => {
            let mut listed = vec![all[0].family_given()];
            listed.extend(all[1..all.len() - 1].iter().map(PersonName::given_family));
            Some(format!(
                "{}, and {}",
                listed.join(", "),
                all[all.len() - 1].given_family()
            ))
        }
        all => {
            let mut listed = vec![all[0].family_given()];
            listed.extend(all[1..7].iter().map(PersonName::given_family));
            Some(format!("{}, et al", listed.join(", ")))
        }
    }
}

pub(super) fn chicago(meta: &CitationMetadata) -> String {
    let names = parse_all(&meta.authors);
    let mut parts = Vec::new();

    if let Some(authors) = chicago_authors(&names) {
        parts.push(terminate(&authors));
    }
    if !meta.title.trim().is_empty() {
        parts.push(quoted_title(&meta.title));
    }

    if let Some(journal) = nonblank(&meta.journal) {
        let mut source = journal.to_string();
        if let Some(volume) = nonblank(&meta.volume) {
            source.push_str(&format!(" {}", volume));
        }
        if let Some(issue) = nonblank(&meta.issue) {
            source.push_str(&format!(", no. {}", issue));
        }
        if let Some(year) = meta.year {
            source.push_str(&format!(" ({})", year));
        }
        if let Some(pages) = nonblank(&meta.pages) {
            source.push_str(&format!(": {}", pages));
        }
        parts.push(terminate(&source));
    } else {
        let mut source: Vec<String> = Vec::new();
        if let Some(publisher) = nonblank(&meta.publisher) {
            source.push(publisher.to_string());
        }
        if let Some(year) = meta.year {
            source.push(year.to_string());
        }
        if !source.is_empty() {
            parts.push(terminate(&source.join(", ")));
        }
    }

    if let Some(link) = link(meta) {
        parts.push(format!("{}.", link));
    }

    parts.join(" ")
}

// ============================================================================
// BibTeX
// ============================================================================

fn alnum_lower(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// `turing1936computable`: family name, year, first title word over 3 chars
pub(super) fn bibtex_key(meta: &CitationMetadata, names: &[PersonName]) -> String {
    let mut key = names
        .first()
        .map(|n| alnum_lower(&n.family))
        .unwrap_or_default();

    if let Some(year) = meta.year {
        key.push_str(&year.to_string());
    }

    if let Some(word) = meta
        .title
        .split_whitespace()
        .map(alnum_lower)
        .find(|w| w.chars().count() > 3)
    {
        key.push_str(&word);
    }

    if key.is_empty() {
        "paper".to_string()
    } else {
        key
    }
}

pub(super) fn bibtex(meta: &CitationMetadata) -> String {
    let names = parse_all(&meta.authors);
    let entry_type = if nonblank(&meta.journal).is_some() {
        "article"
    } else {
        "misc"
    };

    let mut fields: Vec<(&str, String)> = Vec::new();
    if !meta.title.trim().is_empty() {
        fields.push(("title", meta.title.trim().to_string()));
    }
    if !names.is_empty() {
        let authors = names
            .iter()
            .map(PersonName::family_given)
            .collect::<Vec<_>>()
            .join(" and ");
        fields.push(("author", authors));
    }
    if let Some(journal) = nonblank(&meta.journal) {
        fields.push(("journal", journal.to_string()));
    }
    if let Some(year) = meta.year {
        fields.push(("year", year.to_string()));
    }
    if let Some(volume) = nonblank(&meta.volume) {
        fields.push(("volume", volume.to_string()));
    }
    if let Some(issue) = nonblank(&meta.issue) {
        fields.push(("number", issue.to_string()));
    }
    if let Some(pages) = nonblank(&meta.pages) {
        fields.push(("pages", pages.replace("--", "-").replace('-', "--")));
    }
    if let Some(publisher) = nonblank(&meta.publisher) {
        fields.push(("publisher", publisher.to_string()));
    }
    if let Some(doi) = nonblank(&meta.doi) {
        fields.push(("doi", doi.to_string()));
    }
    if let Some(url) = nonblank(&meta.url) {
        fields.push(("url", url.to_string()));
    }

    let body = fields
        .iter()
        .map(|(name, value)| format!("  {} = {{{}}}", name, value))
        .collect::<Vec<_>>()
        .join(",\n");

    if body.is_empty() {
        format!("@{}{{{}\n}}", entry_type, bibtex_key(meta, &names))
    } else {
        format!(
            "@{}{{{},\n{}\n}}",
            entry_type,
            bibtex_key(meta, &names),
            body
        )
    }
}

// ============================================================================
// EndNote (tagged import format)
// ============================================================================

pub(super) fn endnote(meta: &CitationMetadata) -> String {
    let names = parse_all(&meta.authors);
    let mut lines = Vec::new();

    if nonblank(&meta.journal).is_some() {
        lines.push("%0 Journal Article".to_string());
    } else {
        lines.push("%0 Generic".to_string());
    }
    if !meta.title.trim().is_empty() {
        lines.push(format!("%T {}", meta.title.trim()));
    }
    for name in &names {
        lines.push(format!("%A {}", name.family_given()));
    }
    if let Some(journal) = nonblank(&meta.journal) {
        lines.push(format!("%J {}", journal));
    }
    if let Some(year) = meta.year {
        lines.push(format!("%D {}", year));
    }
    if let Some(volume) = nonblank(&meta.volume) {
        lines.push(format!("%V {}", volume));
    }
    if let Some(issue) = nonblank(&meta.issue) {
        lines.push(format!("%N {}", issue));
    }
    if let Some(pages) = nonblank(&meta.pages) {
        lines.push(format!("%P {}", pages));
    }
    if let Some(publisher) = nonblank(&meta.publisher) {
        lines.push(format!("%I {}", publisher));
    }
    if let Some(doi) = nonblank(&meta.doi) {
        lines.push(format!("%R {}", doi));
    }
    if let Some(url) = nonblank(&meta.url) {
        lines.push(format!("%U {}", url));
    } else if let Some(doi) = nonblank(&meta.doi) {
        lines.push(format!("%U {}", doi_link(doi)));
    }

    lines.join("\n")
}
