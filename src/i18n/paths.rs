//! Language segments in URL paths.
//!
//! Public pages always carry a language segment (`/en/landing`,
//! `/auth/jp/login`). Protected pages use clean URLs for signed-in users,
//! whose language lives in their session, and prefixed URLs for anonymous
//! visitors. Every function here is total: unrecognized input falls back
//! to the default language or is returned unchanged.

use super::language::{Language, DEFAULT_LANGUAGE};

/// Segment under which the auth pages nest their language.
const AUTH_SEGMENT: &str = "auth";

/// Route prefixes that always carry a language segment.
pub const PUBLIC_ROUTES: [&str; 5] = ["/auth", "/login", "/register", "/forgot-password", "/landing"];

/// Public pages served under `/auth/{lang}`.
const AUTH_PAGES: [&str; 3] = ["/login", "/register", "/forgot-password"];

/// Detect the language of a path or bare code, falling back to the default.
pub fn detect_language(input: &str) -> Language {
    detect_language_or(input, DEFAULT_LANGUAGE)
}

/// Detect the language of a path or bare code, falling back to `default`.
///
/// Looks at the first segment, or at the second when the first is `auth`.
pub fn detect_language_or(input: &str, default: Language) -> Language {
    let mut segments = path_segments(input);
    match segments.next() {
        Some(AUTH_SEGMENT) => segments.next().and_then(Language::from_segment),
        Some(first) => Language::from_segment(first),
        None => None,
    }
    .unwrap_or(default)
}

/// Whether the first path segment is a language code or numeric alias.
pub fn has_language_prefix(path: &str) -> bool {
    path_segments(path)
        .next()
        .and_then(Language::from_segment)
        .is_some()
}

/// Strip the language segment from `path`.
///
/// `/auth/{lang}/rest` keeps its `auth` segment and becomes `/auth/rest`.
/// Otherwise every leading language segment is removed, so the function is
/// idempotent. An empty result becomes `/`.
pub fn remove_language_prefix(path: &str) -> String {
    let path = ensure_leading_slash(path);
    let (_, rest) = strip_language_segments(&path);
    let rest = if rest.is_empty() { "/" } else { rest };

    if let Some(after_auth) = auth_remainder(rest) {
        let (stripped, tail) = strip_language_segments(after_auth);
        if stripped {
            return format!("/{AUTH_SEGMENT}{tail}");
        }
    }

    rest.to_string()
}

/// Remove leading `/{lang}` segments. The remainder is empty or starts
/// with `/`.
fn strip_language_segments(mut path: &str) -> (bool, &str) {
    let mut stripped = false;
    while let Some(rest) = path.strip_prefix('/') {
        let end = rest.find('/').unwrap_or(rest.len());
        if Language::from_segment(&rest[..end]).is_none() {
            break;
        }
        path = &rest[end..];
        stripped = true;
    }
    (stripped, path)
}

/// Prefix `path` with `language`, replacing any language it already has.
///
/// The root becomes `/{lang}` and auth paths become `/auth/{lang}/…`.
/// For a clean path `p`, `remove_language_prefix(&add_language_prefix(p, l)) == p`.
pub fn add_language_prefix(path: &str, language: Language) -> String {
    let clean = remove_language_prefix(path);

    if clean == "/" {
        return format!("/{language}");
    }

    if let Some(rest) = auth_remainder(&clean) {
        return format!("/{AUTH_SEGMENT}/{language}{rest}");
    }

    format!("/{language}{clean}")
}

/// Whether the language-free form of `path` is a public route.
pub fn is_public_route(path: &str) -> bool {
    let clean = remove_language_prefix(path);
    PUBLIC_ROUTES.iter().any(|route| matches_route(&clean, route))
}

/// URL a visitor in `language` should see for `path`.
///
/// Public routes are always prefixed: auth pages as `/auth/{lang}/…`, the
/// landing page as `/{lang}/landing`. Protected routes are clean for
/// authenticated visitors and prefixed for everyone else.
pub fn localized_path(path: &str, language: Language, authenticated: bool) -> String {
    let clean = remove_language_prefix(path);

    if AUTH_PAGES.iter().any(|page| matches_route(&clean, page)) {
        return format!("/{AUTH_SEGMENT}/{language}{clean}");
    }

    if is_public_route(&clean) || !authenticated {
        add_language_prefix(&clean, language)
    } else {
        clean
    }
}

/// Strip query and fragment, ensure a leading slash, and drop a trailing
/// slash except on the root.
pub fn normalize_path(path: &str) -> String {
    let end = path.find(|c: char| c == '?' || c == '#').unwrap_or(path.len());
    let mut normalized = ensure_leading_slash(&path[..end]);
    if normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

/// The part of `path` after a leading `/auth` segment.
fn auth_remainder(path: &str) -> Option<&str> {
    path.strip_prefix("/auth")
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Segments following the leading slash, which is implied when missing.
/// Empty segments are kept, so `//en` has no language segment.
fn path_segments(path: &str) -> std::str::Split<'_, char> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}

fn ensure_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

fn matches_route(path: &str, route: &str) -> bool {
    path == route
        || path
            .strip_prefix(route)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::SUPPORTED_LANGUAGES;

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language("/vn/home"), Language::Vn);
        assert_eq!(detect_language("/jp/jlpt"), Language::Jp);
        assert_eq!(detect_language("/en/challenge"), Language::En);
        assert_eq!(detect_language("/auth/jp/register"), Language::Jp);
        assert_eq!(detect_language("/auth/3/forgot-password"), Language::En);
        assert_eq!(detect_language("2"), Language::Jp);
        assert_eq!(detect_language("en"), Language::En);
    }

    #[test]
    fn test_detect_language_falls_back() {
        assert_eq!(detect_language("/invalid/path"), Language::Vn);
        assert_eq!(detect_language("/auth/invalid/login"), Language::Vn);
        assert_eq!(detect_language("/auth"), Language::Vn);
        assert_eq!(detect_language("/"), Language::Vn);
        assert_eq!(detect_language(""), Language::Vn);
        assert_eq!(detect_language_or("/home", Language::En), Language::En);
    }

    #[test]
    fn test_has_language_prefix() {
        assert!(has_language_prefix("/en/home"));
        assert!(has_language_prefix("/1/home"));
        assert!(has_language_prefix("/jp"));
        assert!(!has_language_prefix("/home"));
        assert!(!has_language_prefix("/auth/en/login"));
        assert!(!has_language_prefix("/english/home"));
        assert!(!has_language_prefix(""));
    }

    #[test]
    fn test_prefix_helpers_agree_on_segment_boundaries() {
        assert!(has_language_prefix("en/home"));
        assert_eq!(detect_language("en/home"), Language::En);
        assert_eq!(remove_language_prefix("en/home"), "/home");

        assert!(!has_language_prefix("//en/home"));
        assert_eq!(detect_language("//en/home"), Language::Vn);
        assert_eq!(remove_language_prefix("//en/home"), "//en/home");

        assert_eq!(detect_language("auth/jp/login"), Language::Jp);
        assert_eq!(remove_language_prefix("auth/jp/login"), "/auth/login");
    }

    #[test]
    fn test_remove_language_prefix() {
        assert_eq!(remove_language_prefix("/vn/home"), "/home");
        assert_eq!(remove_language_prefix("/jp/jlpt/custom"), "/jlpt/custom");
        assert_eq!(remove_language_prefix("/2/challenge/n1"), "/challenge/n1");
        assert_eq!(remove_language_prefix("/en"), "/");
        assert_eq!(remove_language_prefix("/en/"), "/");
        assert_eq!(remove_language_prefix("/home"), "/home");
        assert_eq!(remove_language_prefix("/"), "/");
        assert_eq!(remove_language_prefix(""), "/");
        assert_eq!(remove_language_prefix("/entry/list"), "/entry/list");
    }

    #[test]
    fn test_remove_language_prefix_keeps_auth_segment() {
        assert_eq!(remove_language_prefix("/auth/en/login"), "/auth/login");
        assert_eq!(remove_language_prefix("/auth/1/register"), "/auth/register");
        assert_eq!(remove_language_prefix("/auth/jp"), "/auth");
        assert_eq!(remove_language_prefix("/auth/login"), "/auth/login");
        assert_eq!(remove_language_prefix("/authors/en"), "/authors/en");
    }

    #[test]
    fn test_remove_language_prefix_is_idempotent() {
        let paths = ["/en/en/home", "/auth/vn/jp/login", "/en/auth/jp/login", "/jp/", "/library", "", "/3/1"];
        for path in paths {
            let once = remove_language_prefix(path);
            assert_eq!(remove_language_prefix(&once), once, "path {path:?}");
        }
    }

    #[test]
    fn test_add_language_prefix() {
        assert_eq!(add_language_prefix("/home", Language::En), "/en/home");
        assert_eq!(add_language_prefix("/vn/home", Language::Jp), "/jp/home");
        assert_eq!(add_language_prefix("/", Language::Vn), "/vn");
        assert_eq!(add_language_prefix("", Language::En), "/en");
        assert_eq!(add_language_prefix("library", Language::En), "/en/library");
        assert_eq!(add_language_prefix("/auth/login", Language::Jp), "/auth/jp/login");
        assert_eq!(add_language_prefix("/auth/en/login", Language::Vn), "/auth/vn/login");
    }

    #[test]
    fn test_add_then_remove_round_trips_clean_paths() {
        let clean_paths = [
            "/",
            "/home",
            "/jlpt/official",
            "/challenge/n1",
            "/auth",
            "/auth/login",
            "/landing",
            "/settings/",
        ];
        for path in clean_paths {
            for lang in SUPPORTED_LANGUAGES {
                let prefixed = add_language_prefix(path, lang);
                assert_eq!(remove_language_prefix(&prefixed), path, "{path} in {lang}");
            }
        }
    }

    #[test]
    fn test_is_public_route() {
        assert!(is_public_route("/login"));
        assert!(is_public_route("/auth/en/register"));
        assert!(is_public_route("/jp/landing"));
        assert!(is_public_route("/forgot-password"));
        assert!(!is_public_route("/home"));
        assert!(!is_public_route("/loginx"));
        assert!(!is_public_route("/"));
    }

    #[test]
    fn test_localized_path_protected_routes() {
        assert_eq!(localized_path("/home", Language::En, true), "/home");
        assert_eq!(localized_path("/home", Language::En, false), "/en/home");
        assert_eq!(localized_path("/vn/jlpt/official", Language::Jp, true), "/jlpt/official");
        assert_eq!(localized_path("/vn/jlpt/official", Language::Jp, false), "/jp/jlpt/official");
    }

    #[test]
    fn test_localized_path_public_routes_always_prefixed() {
        for authenticated in [true, false] {
            assert_eq!(localized_path("/login", Language::En, authenticated), "/auth/en/login");
            assert_eq!(
                localized_path("/auth/vn/register", Language::Jp, authenticated),
                "/auth/jp/register"
            );
            assert_eq!(localized_path("/landing", Language::Vn, authenticated), "/vn/landing");
            assert_eq!(
                localized_path("forgot-password", Language::Jp, authenticated),
                "/auth/jp/forgot-password"
            );
        }
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/home/?tab=1#top"), "/home");
        assert_eq!(normalize_path("jlpt"), "/jlpt");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("?x=1"), "/");
    }
}
