//! Locale-alternate links for `<link rel="alternate" hreflang="…">`.

use serde::Serialize;
use std::collections::BTreeMap;

use super::language::{DEFAULT_LANGUAGE, SUPPORTED_LANGUAGES};
use super::paths::{add_language_prefix, remove_language_prefix};

/// `hreflang` value pointing crawlers at the fallback variant.
pub const X_DEFAULT: &str = "x-default";

/// One alternate URL of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HreflangLink {
    pub hreflang: String,
    pub href: String,
}

/// One link per supported language, in declaration order.
///
/// Any language already present in `current_path` is replaced. A trailing
/// slash on `base_url` is dropped so hrefs never contain `//`.
pub fn generate_hreflang_links(current_path: &str, base_url: &str) -> Vec<HreflangLink> {
    let clean = remove_language_prefix(current_path);
    let base = base_url.trim_end_matches('/');

    SUPPORTED_LANGUAGES
        .iter()
        .map(|&lang| HreflangLink {
            hreflang: lang.locale().to_string(),
            href: format!("{base}{}", add_language_prefix(&clean, lang)),
        })
        .collect()
}

/// Alternate URLs keyed by locale, plus an `x-default` entry pointing at the
/// default language's URL. Shaped for Next.js `alternates.languages`.
pub fn alternate_languages(current_path: &str, base_url: &str) -> BTreeMap<String, String> {
    let links = generate_hreflang_links(current_path, base_url);
    let default_href = links
        .iter()
        .find(|link| link.hreflang == DEFAULT_LANGUAGE.locale())
        .map(|link| link.href.clone());

    let mut alternates: BTreeMap<String, String> = links
        .into_iter()
        .map(|link| (link.hreflang, link.href))
        .collect();
    if let Some(href) = default_href {
        alternates.insert(X_DEFAULT.to_string(), href);
    }
    alternates
}
