use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::models::{Intensity, SessionId, SymptomReport};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug)]
struct SessionEntry {
    symptoms: Vec<SymptomReport>,
    last_touched_at: DateTime<Utc>,
}

impl SessionEntry {
    fn empty(now: DateTime<Utc>) -> Self {
        Self {
            symptoms: Vec::new(),
            last_touched_at: now,
        }
    }
}

type SharedEntry = Arc<Mutex<SessionEntry>>;

/// In-memory symptom sessions with idle expiry.
///
/// The outer map lock is only held to look up or insert an entry; symptom
/// mutations take the per-session lock, so unrelated sessions never contend.
/// Every operation is lenient: unknown or expired ids behave like empty
/// sessions and nothing here returns an error.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, SharedEntry>>>,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
            clock,
        }
    }

    pub fn create_session(&self) -> SessionId {
        let session_id = generate_session_id();
        let now = self.clock.now();
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                session_id.clone(),
                Arc::new(Mutex::new(SessionEntry::empty(now))),
            );
        debug!("symptom session created");
        session_id
    }

    /// Appends a report unless the name is blank or already present. An
    /// unknown session id is created on the fly.
    pub fn add_symptom(
        &self,
        session_id: &str,
        name: &str,
        duration_days: Option<u32>,
        intensity: Option<Intensity>,
    ) {
        if session_id.trim().is_empty() || name.trim().is_empty() {
            return;
        }

        let now = self.clock.now();
        let entry = self.entry_or_insert(session_id, now);
        let mut entry = entry.lock().unwrap_or_else(PoisonError::into_inner);
        entry.last_touched_at = now;

        if entry.symptoms.iter().any(|report| report.name == name) {
            return;
        }

        entry.symptoms.push(SymptomReport {
            name: name.to_string(),
            duration_days,
            intensity,
        });
    }

    pub fn remove_symptom(&self, session_id: &str, name: &str) {
        let now = self.clock.now();
        let Some(entry) = self.live_entry(session_id, now) else {
            return;
        };

        let mut entry = entry.lock().unwrap_or_else(PoisonError::into_inner);
        entry.last_touched_at = now;
        entry.symptoms.retain(|report| report.name != name);
    }

    pub fn get_symptoms(&self, session_id: &str) -> Vec<SymptomReport> {
        let now = self.clock.now();
        let Some(entry) = self.live_entry(session_id, now) else {
            return Vec::new();
        };

        let mut entry = entry.lock().unwrap_or_else(PoisonError::into_inner);
        entry.last_touched_at = now;
        entry.symptoms.clone()
    }

    /// Drops every session idle for longer than the TTL and returns how many
    /// were evicted.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_expired(entry, now));
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn spawn_sweeper(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let evicted = store.purge_expired();
                if evicted > 0 {
                    debug!(evicted, "expired symptom sessions evicted");
                }
            }
        })
    }

    fn live_entry(&self, session_id: &str, now: DateTime<Utc>) -> Option<SharedEntry> {
        let key = SessionId::from(session_id);
        let entry = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()?;

        if !self.is_expired(&entry, now) {
            return Some(entry);
        }

        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        if sessions
            .get(&key)
            .is_some_and(|current| self.is_expired(current, now))
        {
            sessions.remove(&key);
        }
        None
    }

    fn entry_or_insert(&self, session_id: &str, now: DateTime<Utc>) -> SharedEntry {
        if let Some(entry) = self.live_entry(session_id, now) {
            return entry;
        }

        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let entry = sessions
            .entry(SessionId::from(session_id))
            .or_insert_with(|| Arc::new(Mutex::new(SessionEntry::empty(now))));
        Arc::clone(entry)
    }

    fn is_expired(&self, entry: &SharedEntry, now: DateTime<Utc>) -> bool {
        let last_touched_at = entry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last_touched_at;
        now.signed_duration_since(last_touched_at) > self.ttl
    }
}

fn generate_session_id() -> SessionId {
    SessionId::from(format!(
        "session_{}_{}",
        Uuid::new_v4().as_simple(),
        Uuid::new_v4().as_simple()
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use chrono::{DateTime, TimeZone, Utc};

    use super::{Clock, SessionStore};
    use crate::models::{Intensity, SymptomReport};

    struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        fn starting_at(now: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self {
                now: Mutex::new(now),
            })
        }

        fn advance(&self, by: chrono::Duration) {
            let mut now = self.now.lock().expect("clock mutex should not be poisoned");
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().expect("clock mutex should not be poisoned")
        }
    }

    fn store_with_clock(ttl_seconds: u64) -> (SessionStore, Arc<ManualClock>) {
        let clock = ManualClock::starting_at(
            Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
                .single()
                .expect("fixed timestamp should be valid"),
        );
        let store = SessionStore::with_clock(Duration::from_secs(ttl_seconds), clock.clone());
        (store, clock)
    }

    #[test]
    fn created_sessions_start_empty_and_get_distinct_ids() {
        let store = SessionStore::new(Duration::from_secs(60));
        let first = store.create_session();
        let second = store.create_session();

        assert_ne!(first, second);
        assert!(first.as_str().starts_with("session_"));
        assert!(store.get_symptoms(first.as_str()).is_empty());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn duplicate_add_keeps_the_first_report() {
        let store = SessionStore::new(Duration::from_secs(60));
        let session_id = store.create_session();

        store.add_symptom(session_id.as_str(), "Fever", Some(1), Intensity::new(5));
        store.add_symptom(session_id.as_str(), "Fever", Some(3), Intensity::new(9));

        assert_eq!(
            store.get_symptoms(session_id.as_str()),
            vec![
                SymptomReport::named("Fever")
                    .with_duration_days(1)
                    .with_intensity(5)
            ]
        );
    }

    #[test]
    fn blank_names_are_ignored() {
        let store = SessionStore::new(Duration::from_secs(60));
        let session_id = store.create_session();

        store.add_symptom(session_id.as_str(), "", None, None);
        store.add_symptom(session_id.as_str(), "   ", Some(2), None);

        assert!(store.get_symptoms(session_id.as_str()).is_empty());
    }

    #[test]
    fn add_to_unknown_session_creates_it() {
        let store = SessionStore::new(Duration::from_secs(60));

        store.add_symptom("session_from_elsewhere", "Cough", None, None);

        assert_eq!(
            store.get_symptoms("session_from_elsewhere"),
            vec![SymptomReport::named("Cough")]
        );
    }

    #[test]
    fn remove_is_idempotent_and_never_creates_sessions() {
        let store = SessionStore::new(Duration::from_secs(60));
        let session_id = store.create_session();
        store.add_symptom(session_id.as_str(), "Fever", None, None);
        store.add_symptom(session_id.as_str(), "Cough", None, None);

        store.remove_symptom(session_id.as_str(), "Fever");
        let after_first = store.get_symptoms(session_id.as_str());
        store.remove_symptom(session_id.as_str(), "Fever");
        let after_second = store.get_symptoms(session_id.as_str());

        assert_eq!(after_first, vec![SymptomReport::named("Cough")]);
        assert_eq!(after_first, after_second);

        store.remove_symptom("session_unknown", "Fever");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let store = SessionStore::new(Duration::from_secs(60));
        let session_id = store.create_session();
        for name in ["Headache", "Nausea", "Dizziness"] {
            store.add_symptom(session_id.as_str(), name, None, None);
        }

        let names = store
            .get_symptoms(session_id.as_str())
            .into_iter()
            .map(|report| report.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Headache", "Nausea", "Dizziness"]);
    }

    #[test]
    fn idle_sessions_expire_lazily_on_access() {
        let (store, clock) = store_with_clock(300);
        let session_id = store.create_session();
        store.add_symptom(session_id.as_str(), "Fever", None, None);

        clock.advance(chrono::Duration::seconds(299));
        assert_eq!(store.get_symptoms(session_id.as_str()).len(), 1);

        clock.advance(chrono::Duration::seconds(301));
        assert!(store.get_symptoms(session_id.as_str()).is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn purge_evicts_only_idle_sessions() {
        let (store, clock) = store_with_clock(300);
        let idle = store.create_session();
        clock.advance(chrono::Duration::seconds(200));
        let active = store.create_session();
        clock.advance(chrono::Duration::seconds(200));

        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get_symptoms(idle.as_str()).is_empty());
        store.add_symptom(active.as_str(), "Fatigue", None, None);
        assert_eq!(store.get_symptoms(active.as_str()).len(), 1);
    }

    #[test]
    fn concurrent_adds_to_one_session_keep_every_distinct_name() {
        let store = SessionStore::new(Duration::from_secs(60));
        let session_id = store.create_session();

        let handles = (0..8)
            .map(|worker| {
                let store = store.clone();
                let session_id = session_id.clone();
                std::thread::spawn(move || {
                    for index in 0..25 {
                        store.add_symptom(
                            session_id.as_str(),
                            &format!("symptom-{}", index % 20),
                            Some(worker + 1),
                            None,
                        );
                    }
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().expect("worker thread should finish");
        }

        assert_eq!(store.get_symptoms(session_id.as_str()).len(), 20);
    }
}
