use std::future::{ready, Ready};

use actix_web::{http::header, FromRequest, HttpRequest};

/// Caller identity, resolved once at the RPC boundary and handed to the core
/// as an opaque voter/author key.
///
/// Authenticated ids arrive in `X-Forwarded-User` from the auth proxy in
/// front of this service. Anonymous callers are keyed by their User-Agent
/// string: a deliberately weak pseudo-identity that enforces
/// one-fingerprint-one-vote, nothing stronger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Authenticated(String),
    Anonymous(String),
}

pub const FORWARDED_USER_HEADER: &str = "X-Forwarded-User";

impl Identity {
    pub fn resolve(req: &HttpRequest) -> Self {
        if let Some(user) = header_value(req, FORWARDED_USER_HEADER) {
            return Identity::Authenticated(user);
        }
        match header_value(req, header::USER_AGENT.as_str()) {
            Some(fingerprint) => Identity::Anonymous(fingerprint),
            None => Identity::Anonymous("anonymous".to_string()),
        }
    }

    /// The uniqueness key for votes and the author id for comments.
    pub fn key(&self) -> &str {
        match self {
            Identity::Authenticated(id) => id,
            Identity::Anonymous(fingerprint) => fingerprint,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::Authenticated(_))
    }
}

fn header_value(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

impl FromRequest for Identity {
    type Error = actix_web::error::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        ready(Ok(Identity::resolve(req)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn forwarded_user_wins_over_user_agent() {
        let req = TestRequest::default()
            .insert_header((FORWARDED_USER_HEADER, "mcrabtree"))
            .insert_header((header::USER_AGENT, "Mozilla/5.0"))
            .to_http_request();
        let identity = Identity::resolve(&req);
        assert_eq!(identity, Identity::Authenticated("mcrabtree".into()));
        assert!(identity.is_authenticated());
        assert_eq!(identity.key(), "mcrabtree");
    }

    #[test]
    fn user_agent_is_the_anonymous_fingerprint() {
        let req = TestRequest::default()
            .insert_header((header::USER_AGENT, "Mozilla/5.0"))
            .to_http_request();
        let identity = Identity::resolve(&req);
        assert_eq!(identity, Identity::Anonymous("Mozilla/5.0".into()));
        assert!(!identity.is_authenticated());
    }

    #[test]
    fn bare_requests_fall_back_to_the_anonymous_literal() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(
            Identity::resolve(&req),
            Identity::Anonymous("anonymous".into())
        );
    }

    #[test]
    fn blank_headers_are_treated_as_absent() {
        let req = TestRequest::default()
            .insert_header((FORWARDED_USER_HEADER, "  "))
            .insert_header((header::USER_AGENT, "curl/8.4.0"))
            .to_http_request();
        assert_eq!(
            Identity::resolve(&req),
            Identity::Anonymous("curl/8.4.0".into())
        );
    }
}
