//! Language detection and language-aware URL shaping.

mod hreflang;
mod language;
mod paths;

pub use hreflang::{alternate_languages, generate_hreflang_links, HreflangLink, X_DEFAULT};
pub use language::{Language, ParseLanguageError, DEFAULT_LANGUAGE, SUPPORTED_LANGUAGES};
pub use paths::{
    add_language_prefix, detect_language, detect_language_or, has_language_prefix,
    is_public_route, localized_path, normalize_path, remove_language_prefix, PUBLIC_ROUTES,
};
