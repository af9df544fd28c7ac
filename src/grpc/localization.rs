//! Localization service implementation.

use tonic::{Request, Response, Status};
use tracing::{debug, instrument, warn};

use super::proto::jlpt4you::edge::v1::{
    localization_server::Localization, HreflangLink as ProtoHreflangLink, HreflangLinksRequest,
    HreflangLinksResponse, ResolvePathRequest, ResolvePathResponse,
};

use crate::config::LocalizationConfig;
use crate::error::EdgeError;
use crate::i18n::{
    alternate_languages, detect_language_or, generate_hreflang_links, has_language_prefix,
    is_public_route, localized_path, normalize_path, remove_language_prefix, Language, X_DEFAULT,
};

/// Implementation of the `Localization` gRPC interface.
pub struct LocalizationServiceImpl {
    config: LocalizationConfig,
}

impl LocalizationServiceImpl {
    pub fn new(config: LocalizationConfig) -> Self {
        Self { config }
    }
}

#[tonic::async_trait]
impl Localization for LocalizationServiceImpl {
    /// Resolve the language and canonical URLs of a request path.
    #[instrument(skip(self, request), fields(path = %request.get_ref().path))]
    async fn resolve_path(
        &self,
        request: Request<ResolvePathRequest>,
    ) -> Result<Response<ResolvePathResponse>, Status> {
        let req = request.into_inner();
        let path = normalize_path(&req.path);

        let language = if req.language.trim().is_empty() {
            detect_language_or(&path, self.config.default_language)
        } else {
            req.language.parse::<Language>().map_err(|e| {
                warn!(language = %req.language, "Rejected unsupported language");
                Status::invalid_argument(EdgeError::from(e).to_string())
            })?
        };

        let response = ResolvePathResponse {
            language: language.code().to_string(),
            locale: language.locale().to_string(),
            clean_path: remove_language_prefix(&path),
            localized_path: localized_path(&path, language, req.authenticated),
            has_language_prefix: has_language_prefix(&path),
            public_route: is_public_route(&path),
        };

        debug!(
            language = %response.language,
            localized = %response.localized_path,
            "Resolved path"
        );

        Ok(Response::new(response))
    }

    #[instrument(skip(self, request), fields(path = %request.get_ref().path))]
    async fn hreflang_links(
        &self,
        request: Request<HreflangLinksRequest>,
    ) -> Result<Response<HreflangLinksResponse>, Status> {
        let req = request.into_inner();
        let base_url = if req.base_url.trim().is_empty() {
            self.config.base_url.as_str()
        } else {
            req.base_url.trim()
        };

        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(Status::invalid_argument("base_url must be an absolute http(s) URL"));
        }

        let path = normalize_path(&req.path);
        let links = generate_hreflang_links(&path, base_url);
        let x_default = alternate_languages(&path, base_url)
            .remove(X_DEFAULT)
            .unwrap_or_default();

        Ok(Response::new(HreflangLinksResponse {
            links: links
                .into_iter()
                .map(|link| ProtoHreflangLink {
                    hreflang: link.hreflang,
                    href: link.href,
                })
                .collect(),
            x_default,
        }))
    }
}
