//! The signed-in worker, resolved from the session cookie.

use super::{AppState, WebError, cookies, session::SESSION_COOKIE};
use crate::worker::domain::{Requester, Worker};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::Response,
};
use mockable::Clock;
use std::sync::Arc;

/// An authenticated, active worker and their session key.
///
/// Extracting it from a request without a valid session redirects HTML
/// clients to the sign-in page and answers AJAX clients with 401.
#[derive(Debug, Clone)]
pub struct CurrentWorker {
    /// The account.
    pub worker: Worker,
    /// Server-side session key.
    pub session: String,
}

impl CurrentWorker {
    /// Identity passed to every service call.
    #[must_use]
    pub const fn requester(&self) -> Requester {
        Requester::for_worker(&self.worker)
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentWorker {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let unauthenticated = || {
            let next = parts
                .uri
                .path_and_query()
                .map_or("/", |target| target.as_str())
                .to_owned();
            WebError::Unauthenticated { next }.respond(&parts.headers)
        };

        let Some((worker_id, session)) = cookies::read(&parts.headers, SESSION_COOKIE)
            .and_then(|token| state.keys.verify(&token))
        else {
            return Err(unauthenticated());
        };
        if !state
            .sessions
            .resolve(&session, worker_id, state.clock.utc())
        {
            return Err(unauthenticated());
        }
        let worker = state
            .workers
            .find(worker_id)
            .await
            .map_err(|err| WebError::from(err).respond(&parts.headers))?;
        match worker {
            Some(worker) if worker.is_active() => Ok(Self { worker, session }),
            _ => {
                state.sessions.close(&session);
                Err(unauthenticated())
            }
        }
    }
}
