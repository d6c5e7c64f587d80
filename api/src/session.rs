//! Cookie-identified per-browser contexts

use std::collections::HashMap;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use shared::SessionContext;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "dashboard_session";

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionContext>>,
}

impl SessionStore {
    /// Run a transition on the session's context and keep its result.
    /// Unknown ids start from an empty context; blank contexts are not kept.
    pub async fn update<F, R>(&self, id: Uuid, transition: F) -> R
    where
        F: FnOnce(SessionContext) -> (SessionContext, R),
    {
        let mut sessions = self.sessions.write().await;
        let current = sessions.remove(&id).unwrap_or_default();
        let (next, out) = transition(current);
        if next.is_blank() {
            debug!("Dropping blank session {}", id);
        } else {
            sessions.insert(id, next);
        }
        out
    }

    #[cfg(test)]
    pub async fn snapshot(&self, id: Uuid) -> SessionContext {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Find the session id in the cookie jar, issuing a new one if needed.
pub fn resolve(jar: CookieJar) -> (CookieJar, Uuid) {
    if let Some(id) = jar
        .get(SESSION_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok())
    {
        return (jar, id);
    }

    let id = Uuid::new_v4();
    debug!("Starting session {}", id);
    let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    (jar.add(cookie), id)
}
