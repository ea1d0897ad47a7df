/// Security headers for every HTTP response
///
/// Shared by the API and the dashboard so both surfaces send the same
/// baseline. The dashboard serves HTML and swaps in its own
/// Content-Security-Policy via [`SecurityHeadersLayer::with_csp`].
///
/// # Headers Applied
///
/// - `X-Content-Type-Options: nosniff`
/// - `X-Frame-Options: DENY`
/// - `Referrer-Policy: strict-origin-when-cross-origin`
/// - `Permissions-Policy`
/// - `Content-Security-Policy`
/// - `Strict-Transport-Security` (only when HSTS is enabled)
///
/// # Example
///
/// ```no_run
/// use axum::Router;
/// use taskdesk_shared::web::SecurityHeadersLayer;
///
/// let app: Router = Router::new().layer(SecurityHeadersLayer::new(false));
/// ```

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{
    extract::Request,
    http::{header, HeaderName, HeaderValue},
    response::Response,
};
use tower::{Layer, Service};

/// CSP for JSON endpoints: nothing may be loaded or framed
pub const API_CSP: &str = "default-src 'none'; frame-ancestors 'none'";

/// CSP for server-rendered pages with an inline stylesheet and same-origin forms
pub const PAGE_CSP: &str =
    "default-src 'self'; style-src 'self' 'unsafe-inline'; form-action 'self'; frame-ancestors 'none'";

const HSTS: &str = "max-age=31536000; includeSubDomains";

const BASELINE: [(&str, &str); 4] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    (
        "permissions-policy",
        "geolocation=(), microphone=(), camera=(), payment=()",
    ),
];

/// Security headers middleware layer
#[derive(Clone)]
pub struct SecurityHeadersLayer {
    enable_hsts: bool,
    csp: &'static str,
}

impl SecurityHeadersLayer {
    /// Creates a layer with the API policy; pass `true` behind HTTPS
    pub fn new(enable_hsts: bool) -> Self {
        Self {
            enable_hsts,
            csp: API_CSP,
        }
    }

    /// Replaces the Content-Security-Policy value
    pub fn with_csp(mut self, csp: &'static str) -> Self {
        self.csp = csp;
        self
    }
}

impl<S> Layer<S> for SecurityHeadersLayer {
    type Service = SecurityHeadersMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SecurityHeadersMiddleware {
            inner,
            enable_hsts: self.enable_hsts,
            csp: self.csp,
        }
    }
}

/// Security headers middleware service
#[derive(Clone)]
pub struct SecurityHeadersMiddleware<S> {
    inner: S,
    enable_hsts: bool,
    csp: &'static str,
}

impl<S> Service<Request> for SecurityHeadersMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let future = self.inner.call(request);
        let enable_hsts = self.enable_hsts;
        let csp = self.csp;

        Box::pin(async move {
            let mut response = future.await?;
            let headers = response.headers_mut();

            for (name, value) in BASELINE {
                headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
            }
            headers.insert(header::CONTENT_SECURITY_POLICY, HeaderValue::from_static(csp));

            if enable_hsts {
                headers.insert(header::STRICT_TRANSPORT_SECURITY, HeaderValue::from_static(HSTS));
            }

            Ok(response)
        })
    }
}
