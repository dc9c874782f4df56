//! In-process session store.
//!
//! Each session is an isolated key/value map addressed by a random id carried
//! in the `sessionid` cookie. A session left idle for longer than its max age
//! is treated as absent and pruned on the next write.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum::http::HeaderMap;
use parking_lot::RwLock;
use serde_json::Value;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "sessionid";

/// Session key holding the authenticated user's id
pub const AUTH_USER_KEY: &str = "_auth_user_id";

/// Session key for the home page visit counter
pub const VISITS_KEY: &str = "num_visits";

/// Two weeks of inactivity ends a session.
pub const SESSION_MAX_AGE: Duration = Duration::from_secs(14 * 24 * 60 * 60);

type SessionData = HashMap<String, Value>;

struct Session {
    data: SessionData,
    last_access: Instant,
}

impl Session {
    fn new(now: Instant) -> Self {
        Self {
            data: SessionData::new(),
            last_access: now,
        }
    }

    fn is_live(&self, now: Instant, max_age: Duration) -> bool {
        now.saturating_duration_since(self.last_access) < max_age
    }
}

pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    max_age: Duration,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_max_age(SESSION_MAX_AGE)
    }

    pub fn with_max_age(max_age: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_age,
        }
    }

    /// Live session for `session_id`, started afresh if missing or expired.
    /// Refreshes its last access time.
    fn touch<'a>(&self, sessions: &'a mut HashMap<String, Session>, session_id: &str, now: Instant) -> &'a mut Session {
        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Session::new(now));
        if !session.is_live(now, self.max_age) {
            *session = Session::new(now);
        }
        session.last_access = now;
        session
    }

    /// Resolve the caller's session, creating a fresh one if the id is
    /// missing, unknown or expired. Returns the id to (re)send in the cookie.
    pub fn resolve(&self, requested: Option<&str>) -> String {
        let now = Instant::now();
        let mut sessions = self.sessions.write();

        if let Some(id) = requested {
            if let Some(session) = sessions.get_mut(id) {
                if session.is_live(now, self.max_age) {
                    session.last_access = now;
                    return id.to_string();
                }
            }
        }

        let before = sessions.len();
        sessions.retain(|_, session| session.is_live(now, self.max_age));
        let pruned = before - sessions.len();

        let id = Uuid::new_v4().simple().to_string();
        sessions.insert(id.clone(), Session::new(now));
        tracing::debug!("Created session {} ({} expired sessions pruned)", id, pruned);
        id
    }

    pub fn get(&self, session_id: &str, key: &str) -> Option<Value> {
        let now = Instant::now();
        self.sessions
            .read()
            .get(session_id)
            .filter(|session| session.is_live(now, self.max_age))
            .and_then(|session| session.data.get(key).cloned())
    }

    pub fn set(&self, session_id: &str, key: &str, value: Value) {
        let mut sessions = self.sessions.write();
        self.touch(&mut sessions, session_id, Instant::now())
            .data
            .insert(key.to_string(), value);
    }

    pub fn remove(&self, session_id: &str, key: &str) {
        if let Some(session) = self.sessions.write().get_mut(session_id) {
            session.data.remove(key);
        }
    }

    /// Read-and-increment a counter entry, returning the value before the bump.
    pub fn increment(&self, session_id: &str, key: &str) -> u64 {
        let mut sessions = self.sessions.write();
        let data = &mut self.touch(&mut sessions, session_id, Instant::now()).data;
        let current = data.get(key).and_then(Value::as_u64).unwrap_or(0);
        data.insert(key.to_string(), Value::from(current + 1));
        current
    }

    /// Drop the whole session (logout).
    pub fn flush(&self, session_id: &str) {
        self.sessions.write().remove(session_id);
    }

    #[cfg(test)]
    fn session_count(&self) -> usize {
        self.sessions.read().len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the session id from the request's cookie header
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get("cookie")?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some(id) = part.strip_prefix("sessionid=") {
            if !id.is_empty() {
                return Some(id.to_string());
            }
        }
    }
    None
}

pub fn session_cookie(session_id: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, session_id
    )
}

pub fn expired_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::thread;

    #[test]
    fn test_counter_is_per_session() {
        let store = SessionStore::new();
        let a = store.resolve(None);
        let b = store.resolve(None);
        assert_ne!(a, b);

        assert_eq!(store.increment(&a, VISITS_KEY), 0);
        assert_eq!(store.increment(&a, VISITS_KEY), 1);
        assert_eq!(store.increment(&a, VISITS_KEY), 2);
        assert_eq!(store.increment(&b, VISITS_KEY), 0);
        assert_eq!(store.get(&a, VISITS_KEY), Some(Value::from(3u64)));
    }

    #[test]
    fn test_resolve_reuses_known_ids_only() {
        let store = SessionStore::new();
        let id = store.resolve(None);
        assert_eq!(store.resolve(Some(&id)), id);

        let fresh = store.resolve(Some("forged"));
        assert_ne!(fresh, "forged");
        assert_eq!(store.session_count(), 2);
    }

    #[test]
    fn test_set_remove_flush() {
        let store = SessionStore::new();
        let id = store.resolve(None);
        store.set(&id, AUTH_USER_KEY, Value::from(7));
        assert_eq!(store.get(&id, AUTH_USER_KEY), Some(Value::from(7)));

        store.remove(&id, AUTH_USER_KEY);
        assert_eq!(store.get(&id, AUTH_USER_KEY), None);

        store.set(&id, VISITS_KEY, Value::from(3));
        store.flush(&id);
        assert_eq!(store.get(&id, VISITS_KEY), None);
        assert_eq!(store.session_count(), 0);
    }

    #[test]
    fn test_expired_session_starts_over() {
        let store = SessionStore::with_max_age(Duration::from_millis(50));
        let id = store.resolve(None);
        assert_eq!(store.increment(&id, VISITS_KEY), 0);
        assert_eq!(store.increment(&id, VISITS_KEY), 1);

        thread::sleep(Duration::from_millis(80));
        assert_eq!(store.get(&id, VISITS_KEY), None);

        let fresh = store.resolve(Some(&id));
        assert_ne!(fresh, id);
        assert_eq!(store.increment(&fresh, VISITS_KEY), 0);
        // the stale entry went when the new one was created
        assert_eq!(store.session_count(), 1);
    }

    #[test]
    fn test_activity_keeps_session_alive() {
        let store = SessionStore::with_max_age(Duration::from_secs(1));
        let id = store.resolve(None);
        thread::sleep(Duration::from_millis(600));
        assert_eq!(store.resolve(Some(&id)), id);
        thread::sleep(Duration::from_millis(600));
        assert_eq!(store.resolve(Some(&id)), id);
    }

    #[test]
    fn test_forged_ids_do_not_accumulate() {
        let store = SessionStore::with_max_age(Duration::from_millis(50));
        for n in 0..50 {
            store.resolve(Some(&format!("forged{}", n)));
        }
        assert_eq!(store.session_count(), 50);

        thread::sleep(Duration::from_millis(80));
        store.resolve(None);
        assert_eq!(store.session_count(), 1);
    }

    #[test]
    fn test_cookie_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_id_from_headers(&headers), None);

        headers.insert("cookie", HeaderValue::from_static("theme=dark; sessionid=abc123; other=1"));
        assert_eq!(session_id_from_headers(&headers), Some("abc123".to_string()));

        headers.insert("cookie", HeaderValue::from_static("sessionid="));
        assert_eq!(session_id_from_headers(&headers), None);
    }
}
