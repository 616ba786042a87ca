//! Session cookie management.
//!
//! The `ophost` cookie is a fallback identity channel held by the client.
//! It is advisory: an explicit query parameter on a later request always wins.

use axum::http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode};
use cookie::{Cookie, SameSite};

use crate::config::SessionConfig;
use crate::origin::{TargetOrigin, OPHOST_COOKIE};

/// Attaches the `ophost` cookie to root-path responses.
#[derive(Debug, Clone)]
pub struct SessionCookieManager {
    secure: bool,
    http_only: bool,
}

impl SessionCookieManager {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            secure: config.secure,
            http_only: config.http_only,
        }
    }

    /// The cookie binding a client to `target`.
    pub fn cookie(&self, target: &TargetOrigin) -> Cookie<'static> {
        Cookie::build((OPHOST_COOKIE, target.to_string()))
            .path("/")
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .http_only(self.http_only)
            .build()
    }

    /// Whether a response for `path` with `status` should carry the cookie.
    pub fn applies(path: &str, status: StatusCode) -> bool {
        path == "/" && status.is_success()
    }

    /// Append the cookie when it applies. Returns whether it was set.
    pub fn annotate(
        &self,
        headers: &mut HeaderMap,
        path: &str,
        status: StatusCode,
        target: &TargetOrigin,
    ) -> bool {
        if !Self::applies(path, status) {
            return false;
        }
        match HeaderValue::from_str(&self.cookie(target).to_string()) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
                true
            }
            Err(e) => {
                tracing::warn!(origin = %target, error = %e, "Session cookie not representable as header");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> TargetOrigin {
        TargetOrigin::new("site.test").unwrap()
    }

    #[test]
    fn test_cookie_attributes() {
        let manager = SessionCookieManager::new(&SessionConfig::default());
        let rendered = manager.cookie(&target()).to_string();
        assert!(rendered.starts_with("ophost=site.test"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Path=/"));
        assert!(rendered.contains("Secure"));
        assert!(rendered.contains("HttpOnly"));
    }

    #[test]
    fn test_optional_flags() {
        let manager = SessionCookieManager::new(&SessionConfig {
            secure: false,
            http_only: false,
        });
        let rendered = manager.cookie(&target()).to_string();
        assert!(!rendered.contains("Secure"));
        assert!(!rendered.contains("HttpOnly"));
    }

    #[test]
    fn test_root_path_only() {
        let manager = SessionCookieManager::new(&SessionConfig::default());
        let mut headers = HeaderMap::new();

        assert!(!manager.annotate(&mut headers, "/page", StatusCode::OK, &target()));
        assert!(!manager.annotate(&mut headers, "/", StatusCode::NOT_FOUND, &target()));
        assert!(headers.get(SET_COOKIE).is_none());

        assert!(manager.annotate(&mut headers, "/", StatusCode::OK, &target()));
        assert_eq!(headers.get_all(SET_COOKIE).iter().count(), 1);
    }
}
