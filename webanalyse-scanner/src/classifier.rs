//! Internal/external classification of raw `href` values.
//!
//! Everything here is pure: no I/O, no shared state.

use serde::{Deserialize, Serialize};
use url::{ParseError, Url};

/// Base used only to validate relative references. Never leaks into results.
const RELATIVE_BASE: &str = "http://relative.invalid/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkClass {
    Internal,
    External,
    Ignored,
}

/// Scheme and host of a reference. Both are empty for a relative reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAuthority {
    pub scheme: String,
    pub host: String,
}

impl ParsedAuthority {
    /// Validates `reference` with the url crate, then reads scheme and host
    /// from the text as written. The host keeps its case and any port.
    pub fn parse(reference: &str) -> Result<Self, ParseError> {
        match Url::parse(reference) {
            Ok(_) => {}
            Err(ParseError::RelativeUrlWithoutBase) => {
                Url::parse(RELATIVE_BASE)?.join(reference)?;
            }
            Err(e) => return Err(e),
        }

        let (scheme, rest) = split_scheme(reference);
        let host = rest.strip_prefix("//").map(raw_host).unwrap_or_default();

        Ok(Self { scheme, host })
    }

    pub fn is_relative(&self) -> bool {
        self.scheme.is_empty() && self.host.is_empty()
    }

    pub fn is_http(&self) -> bool {
        self.scheme == "http" || self.scheme == "https"
    }
}

/// Splits a leading `scheme:` off `reference`. The scheme is lowercased;
/// references without one come back with an empty scheme and unchanged.
fn split_scheme(reference: &str) -> (String, &str) {
    for (i, c) in reference.char_indices() {
        match c {
            'a'..='z' | 'A'..='Z' => {}
            '0'..='9' | '+' | '-' | '.' if i > 0 => {}
            ':' if i > 0 => return (reference[..i].to_ascii_lowercase(), &reference[i + 1..]),
            _ => break,
        }
    }
    (String::new(), reference)
}

/// Host and port of an authority section, without userinfo.
fn raw_host(after_slashes: &str) -> String {
    let end = after_slashes
        .find(['/', '?', '#'])
        .unwrap_or(after_slashes.len());
    let authority = &after_slashes[..end];
    match authority.rfind('@') {
        Some(at) => authority[at + 1..].to_string(),
        None => authority.to_string(),
    }
}

/// Host of the analysed page, or empty when the page URL does not parse.
pub fn page_host(page_url: &str) -> String {
    ParsedAuthority::parse(page_url)
        .map(|authority| authority.host)
        .unwrap_or_default()
}

/// Classify `reference` against the page host, surfacing parse failures so
/// the caller can log them.
pub fn try_classify(page_host: &str, reference: &str) -> Result<LinkClass, ParseError> {
    let authority = ParsedAuthority::parse(reference)?;

    if reference.starts_with("mailto:") {
        return Ok(LinkClass::Ignored);
    }

    let class = if authority.is_relative() {
        LinkClass::Internal
    } else if authority.is_http() && !authority.host.is_empty() {
        if authority.host == page_host {
            LinkClass::Internal
        } else {
            LinkClass::External
        }
    } else {
        LinkClass::Ignored
    };

    Ok(class)
}

pub fn classify(page_url: &str, reference: &str) -> LinkClass {
    try_classify(&page_host(page_url), reference).unwrap_or(LinkClass::Ignored)
}
