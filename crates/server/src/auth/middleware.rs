use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::header::LOCATION;
use axum::http::{Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tower::{Layer, Service};
use tracing::debug;

use super::SessionManager;
use super::identity::CurrentUser;
use crate::cookies::read_cookie;

/// Characters escaped in the `redirectTo` query value.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Sign-in location for an unauthenticated request to `uri`.
pub fn signin_location(signin_path: &str, uri: &Uri) -> String {
    let target = uri.path_and_query().map_or("/", |pq| pq.as_str());
    format!(
        "{signin_path}?redirectTo={}",
        utf8_percent_encode(target, QUERY_VALUE)
    )
}

/// Tower layer that requires a valid session cookie.
#[derive(Clone)]
pub struct SessionLayer {
    sessions: Arc<SessionManager>,
}

impl SessionLayer {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self { sessions }
    }
}

impl<S> Layer<S> for SessionLayer {
    type Service = SessionMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SessionMiddleware {
            inner,
            sessions: Arc::clone(&self.sessions),
        }
    }
}

/// Tower service that resolves the session cookie into a [`CurrentUser`]
/// request extension, or redirects to the sign-in page.
#[derive(Clone)]
pub struct SessionMiddleware<S> {
    inner: S,
    sessions: Arc<SessionManager>,
}

impl<S> Service<Request<Body>> for SessionMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let sessions = Arc::clone(&self.sessions);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let user_id = read_cookie(req.headers(), sessions.cookie_name())
                .and_then(|token| sessions.verify(&token));

            match user_id {
                Some(user_id) => {
                    req.extensions_mut().insert(CurrentUser(user_id));
                    inner.call(req).await
                }
                None => {
                    debug!(path = %req.uri().path(), "no session, redirecting to sign-in");
                    let location = signin_location(sessions.signin_path(), req.uri());
                    Ok((StatusCode::FOUND, [(LOCATION, location)]).into_response())
                }
            }
        })
    }
}
