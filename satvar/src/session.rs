//! Per-session live state.
//!
//! Every session (one user, identified by an opaque string) owns its current
//! [`Location`] and a bounded [`Route`]. Sessions live in a concurrent
//! [`moka`] cache: creating a session is coordinated by the cache, after which
//! each session is only mutated under its own mutex. Requests for different
//! sessions never wait on each other.
//!
//! Sessions that stay idle longer than the configured period are evicted.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use moka::sync::Cache;

use crate::route::{Location, Route, DEFAULT_ROUTE_CAPACITY};

/// Default maximum number of concurrent sessions.
pub const DEFAULT_MAX_SESSIONS: u64 = 10_000;

/// Default idle period after which a session is evicted.
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(60 * 60);

/// State of one session.
#[derive(Debug, Clone)]
pub struct SessionState {
    location: Option<Location>,
    route: Route,
    replay_cursor: usize,
}

impl SessionState {
    fn new(route_capacity: usize) -> Self {
        Self {
            location: None,
            route: Route::with_capacity(route_capacity),
            replay_cursor: 0,
        }
    }

    /// Record a new current location and append it to the route.
    pub fn set_location(&mut self, location: Location) {
        self.location = Some(location);
        self.route.add_point(location);
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Heading of the session, see [`Route::direction`].
    pub fn direction(&self) -> f64 {
        self.route.direction()
    }

    /// Return the current replay position and move it `step` points ahead,
    /// wrapping to the start once `len` is reached.
    pub fn advance_replay(&mut self, step: usize, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let current = self.replay_cursor % len;
        let next = current + step;
        self.replay_cursor = if next >= len { 0 } else { next };
        current
    }
}

/// Statistics about session usage.
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Number of sessions currently held.
    pub active_sessions: u64,
    /// Maximum number of sessions.
    pub max_sessions: u64,
}

/// Concurrent store of [`SessionState`] keyed by session id.
pub struct SessionStore {
    sessions: Cache<String, Arc<Mutex<SessionState>>>,
    route_capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_ROUTE_CAPACITY, DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE)
    }
}

impl SessionStore {
    /// Create a session store.
    ///
    /// # Arguments
    ///
    /// * `route_capacity` - Locations kept per session route
    /// * `max_sessions` - Maximum number of sessions held at once
    /// * `idle` - Sessions not touched for this long are evicted
    pub fn new(route_capacity: usize, max_sessions: u64, idle: Duration) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(max_sessions)
                .time_to_idle(idle)
                .build(),
            route_capacity,
        }
    }

    /// Get the session, creating it on first use.
    fn session(&self, id: &str) -> Arc<Mutex<SessionState>> {
        let route_capacity = self.route_capacity;
        self.sessions.get_with_by_ref(id, || {
            tracing::debug!(session = id, "Session created");
            Arc::new(Mutex::new(SessionState::new(route_capacity)))
        })
    }

    /// Run `f` with exclusive access to the session's state.
    ///
    /// Only this session is locked while `f` runs.
    pub fn with_session<T>(&self, id: &str, f: impl FnOnce(&mut SessionState) -> T) -> T {
        let session = self.session(id);
        let mut state = lock(&session);
        f(&mut state)
    }

    /// Record a location for the session.
    pub fn set_location(&self, id: &str, location: Location) {
        self.with_session(id, |state| state.set_location(location));
    }

    /// Current location of the session, if it exists and has reported one.
    pub fn location(&self, id: &str) -> Option<Location> {
        let session = self.sessions.get(id)?;
        let state = lock(&session);
        state.location()
    }

    /// Heading of the session; 0.0 for unknown sessions.
    pub fn direction(&self, id: &str) -> f64 {
        let Some(session) = self.sessions.get(id) else {
            return 0.0;
        };
        let state = lock(&session);
        state.direction()
    }

    /// Location and heading of the session, read under one lock.
    pub fn position(&self, id: &str) -> (Option<Location>, f64) {
        let Some(session) = self.sessions.get(id) else {
            return (None, 0.0);
        };
        let state = lock(&session);
        (state.location(), state.direction())
    }

    /// Snapshot of the session's state.
    pub fn snapshot(&self, id: &str) -> Option<SessionState> {
        let session = self.sessions.get(id)?;
        let state = lock(&session);
        Some(state.clone())
    }

    /// Forget a session.
    pub fn remove(&self, id: &str) {
        self.sessions.invalidate(id);
    }

    /// Returns session statistics.
    pub fn stats(&self) -> SessionStats {
        self.sessions.run_pending_tasks();
        SessionStats {
            active_sessions: self.sessions.entry_count(),
            max_sessions: self.sessions.policy().max_capacity().unwrap_or(0),
        }
    }
}

fn lock(session: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn loc(longitude: f64, latitude: f64) -> Location {
        Location::new(longitude, latitude).unwrap()
    }

    #[test]
    fn test_unknown_session() {
        let store = SessionStore::default();
        assert!(store.location("nobody").is_none());
        assert_eq!(store.direction("nobody"), 0.0);
        assert!(store.snapshot("nobody").is_none());
        assert_eq!(store.position("nobody"), (None, 0.0));
        assert_eq!(store.stats().active_sessions, 0);
    }

    #[test]
    fn test_position_pairs_location_with_heading() {
        let store = SessionStore::default();
        for lat in 0..4 {
            store.set_location("a", loc(0.0, lat as f64));
        }
        assert_eq!(store.position("a"), (Some(loc(0.0, 3.0)), 270.0));
    }

    #[test]
    fn test_position_consistent_under_concurrent_updates() {
        let store = Arc::new(SessionStore::default());
        // Moving east: heading 0 once the route is long enough
        for i in 0..4 {
            store.set_location("a", loc(i as f64 * 0.01, 0.0));
        }

        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 4..500 {
                    // Zigzag so the heading keeps changing
                    let lat = (i % 3) as f64 * 0.1;
                    store.set_location("a", loc(i as f64 * 0.01, lat));
                }
            })
        };

        for _ in 0..500 {
            let (location, heading) = store.position("a");
            let snapshot = store.snapshot("a").unwrap();
            let location = location.unwrap();
            // The pair always comes from one route state
            let route = snapshot.route();
            if route.last() == Some(&location) {
                assert_eq!(heading, snapshot.direction());
            }
            assert!((0.0..360.0).contains(&heading));
        }
        writer.join().unwrap();

        let (location, heading) = store.position("a");
        assert_eq!(location, store.location("a"));
        assert_eq!(heading, store.direction("a"));
    }

    #[test]
    fn test_set_location() {
        let store = SessionStore::default();
        store.set_location("a", loc(25.0, 54.0));
        store.set_location("a", loc(25.1, 54.0));

        assert_eq!(store.location("a"), Some(loc(25.1, 54.0)));
        assert_eq!(store.snapshot("a").unwrap().route().len(), 2);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::default();
        for i in 0..4 {
            store.set_location("west", loc(-(i as f64), 0.0));
            store.set_location("north", loc(0.0, i as f64));
        }

        assert_eq!(store.direction("west"), 180.0);
        assert_eq!(store.direction("north"), 270.0);
        assert_eq!(store.location("west"), Some(loc(-3.0, 0.0)));
    }

    #[test]
    fn test_route_capacity_applied() {
        let store = SessionStore::new(5, 100, DEFAULT_SESSION_IDLE);
        for i in 0..20 {
            store.set_location("a", loc(i as f64, 0.0));
        }
        let state = store.snapshot("a").unwrap();
        assert_eq!(state.route().len(), 5);
        assert_eq!(state.route().capacity(), 5);
    }

    #[test]
    fn test_concurrent_updates() {
        let store = Arc::new(SessionStore::default());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let id = format!("session-{t}");
                    for i in 0..50 {
                        store.set_location(&id, loc(i as f64 * 0.001, t as f64));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for t in 0..8 {
            let state = store.snapshot(&format!("session-{t}")).unwrap();
            assert_eq!(state.route().len(), 50);
            assert_eq!(state.location().unwrap().latitude, t as f64);
        }
        assert_eq!(store.stats().active_sessions, 8);
    }

    #[test]
    fn test_remove() {
        let store = SessionStore::default();
        store.set_location("a", loc(1.0, 1.0));
        store.remove("a");
        assert!(store.location("a").is_none());
    }

    #[test]
    fn test_advance_replay_wraps() {
        let store = SessionStore::default();
        let positions: Vec<usize> = (0..5)
            .map(|_| store.with_session("demo", |s| s.advance_replay(5, 12)))
            .collect();
        assert_eq!(positions, vec![0, 5, 10, 0, 5]);
    }

    #[test]
    fn test_advance_replay_empty_track() {
        let store = SessionStore::default();
        assert_eq!(store.with_session("demo", |s| s.advance_replay(5, 0)), 0);
    }
}
