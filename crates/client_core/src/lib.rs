use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use shared::domain::{NewUser, SearchField, SortDirection, SortKey, UserId, UserRecord};
use storage::SnapshotStore;
use tokio::sync::{broadcast, Mutex};
use tracing::{error, info, warn};

pub mod error;
pub mod forms;
pub mod intent;
pub mod query;
pub mod source;

pub use error::{DirectoryError, FetchError};
pub use intent::{DirectoryIntent, IntentOutcome};
pub use query::{project, Query};
pub use source::{HttpUserSource, MissingUserSource, UserSource};

pub const DEFAULT_SNAPSHOT_KEY: &str = "users";
const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub snapshot_key: String,
    /// Snapshots older than this are ignored by [`DirectoryStore::load`].
    /// `None` trusts a snapshot of any age.
    pub snapshot_max_age: Option<ChronoDuration>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            snapshot_key: DEFAULT_SNAPSHOT_KEY.to_string(),
            snapshot_max_age: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryState {
    /// Newest-created first.
    pub records: Vec<UserRecord>,
    pub loading: bool,
    pub error: Option<String>,
    pub search_term: String,
    pub search_fields: Vec<SearchField>,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
}

impl Default for DirectoryState {
    fn default() -> Self {
        let query = Query::default();
        Self {
            records: Vec::new(),
            loading: false,
            error: None,
            search_term: query.search_term,
            search_fields: query.search_fields,
            sort_key: query.sort_key,
            sort_direction: query.sort_direction,
        }
    }
}

impl DirectoryState {
    pub fn query(&self) -> Query {
        Query {
            search_term: self.search_term.clone(),
            search_fields: self.search_fields.clone(),
            sort_key: self.sort_key,
            sort_direction: self.sort_direction,
        }
    }

    pub fn projection(&self) -> Vec<UserRecord> {
        project(&self.records, &self.query())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    Snapshot,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryEvent {
    LoadStarted,
    Loaded { origin: LoadOrigin, count: usize },
    LoadFailed(String),
    Created(UserRecord),
    Updated(UserRecord),
    Removed(UserId),
    QueryChanged,
}

struct StoreInner {
    state: DirectoryState,
    // Highest id handed out this session, so ids of removed records are not reused.
    last_assigned_id: i64,
}

/// Owns the record set and its load status; every mutation goes through here
/// and is followed by a full snapshot write.
pub struct DirectoryStore {
    source: Arc<dyn UserSource>,
    snapshots: Arc<dyn SnapshotStore>,
    options: StoreOptions,
    inner: Mutex<StoreInner>,
    events: broadcast::Sender<DirectoryEvent>,
}

impl DirectoryStore {
    pub fn new(source: Arc<dyn UserSource>, snapshots: Arc<dyn SnapshotStore>) -> Arc<Self> {
        Self::with_options(source, snapshots, StoreOptions::default())
    }

    pub fn with_options(
        source: Arc<dyn UserSource>,
        snapshots: Arc<dyn SnapshotStore>,
        options: StoreOptions,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            source,
            snapshots,
            options,
            inner: Mutex::new(StoreInner {
                state: DirectoryState::default(),
                last_assigned_id: 0,
            }),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DirectoryEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: DirectoryEvent) {
        let _ = self.events.send(event);
    }

    pub async fn state(&self) -> DirectoryState {
        self.inner.lock().await.state.clone()
    }

    pub async fn records(&self) -> Vec<UserRecord> {
        self.inner.lock().await.state.records.clone()
    }

    pub async fn user(&self, id: UserId) -> Option<UserRecord> {
        let guard = self.inner.lock().await;
        guard.state.records.iter().find(|r| r.id == id).cloned()
    }

    pub async fn projection(&self) -> Vec<UserRecord> {
        self.inner.lock().await.state.projection()
    }

    /// Adopts the local snapshot when one is usable, otherwise fetches from the
    /// remote source and persists what arrived.
    ///
    /// Unreadable, corrupt or expired snapshots count as absent. A fetch failure
    /// leaves the records untouched and is recorded in `error` as well as returned.
    pub async fn load(&self) -> Result<LoadOrigin, DirectoryError> {
        self.begin_load().await;

        if let Some(records) = self.read_snapshot().await {
            let count = records.len();
            {
                let mut guard = self.inner.lock().await;
                guard.state.records = records;
                guard.state.loading = false;
            }
            info!(count, "users loaded from local snapshot");
            self.emit(DirectoryEvent::Loaded {
                origin: LoadOrigin::Snapshot,
                count,
            });
            return Ok(LoadOrigin::Snapshot);
        }

        self.fetch_remote().await
    }

    /// Skips the local snapshot and fetches from the remote source.
    pub async fn refresh(&self) -> Result<LoadOrigin, DirectoryError> {
        self.begin_load().await;
        self.fetch_remote().await
    }

    async fn begin_load(&self) {
        {
            let mut guard = self.inner.lock().await;
            guard.state.loading = true;
            guard.state.error = None;
        }
        self.emit(DirectoryEvent::LoadStarted);
    }

    async fn read_snapshot(&self) -> Option<Vec<UserRecord>> {
        let key = &self.options.snapshot_key;
        let snapshot = match self.snapshots.load_snapshot(key).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return None,
            Err(err) => {
                warn!(key, error = %format!("{err:#}"), "failed to read users snapshot; fetching remotely");
                return None;
            }
        };

        if let Some(max_age) = self.options.snapshot_max_age {
            let age = Utc::now() - snapshot.updated_at;
            if age > max_age {
                info!(key, age_secs = age.num_seconds(), "users snapshot expired; fetching remotely");
                return None;
            }
        }

        match serde_json::from_str::<Vec<UserRecord>>(&snapshot.payload) {
            Ok(records) => Some(records),
            Err(err) => {
                warn!(key, error = %err, "users snapshot is corrupt; fetching remotely");
                None
            }
        }
    }

    async fn fetch_remote(&self) -> Result<LoadOrigin, DirectoryError> {
        match self.source.fetch_users().await {
            Ok(records) => {
                let count = records.len();
                let persisted = {
                    let mut guard = self.inner.lock().await;
                    guard.state.records = records;
                    guard.state.loading = false;
                    self.persist(&guard.state.records).await
                };
                info!(count, "users loaded from remote source");
                self.emit(DirectoryEvent::Loaded {
                    origin: LoadOrigin::Remote,
                    count,
                });
                persisted.map(|()| LoadOrigin::Remote)
            }
            Err(err) => {
                let err = DirectoryError::from(err);
                let message = err.to_string();
                {
                    let mut guard = self.inner.lock().await;
                    guard.state.loading = false;
                    guard.state.error = Some(message.clone());
                }
                error!(error = %message, "failed to load users");
                self.emit(DirectoryEvent::LoadFailed(message));
                Err(err)
            }
        }
    }

    /// Inserts `fields` at the front with the next free id. Duplicate emails are
    /// not rejected here; see [`forms::submit_new_user`].
    ///
    /// The id is one past the larger of the highest id present and the highest
    /// id handed out earlier in this session, so deleting the newest record does
    /// not free its id for reuse until the store is rebuilt. Fails without
    /// changing anything once that would pass `i64::MAX`.
    pub async fn create(&self, fields: NewUser) -> Result<UserRecord, DirectoryError> {
        let (record, persisted) = {
            let mut guard = self.inner.lock().await;
            let Some(id) = next_user_id(&guard.state.records, guard.last_assigned_id) else {
                let highest = UserId(i64::MAX);
                warn!(user_id = %highest, "user id space exhausted");
                return Err(DirectoryError::IdSpaceExhausted(highest));
            };
            guard.last_assigned_id = id.0;
            let record = fields.into_record(id);
            guard.state.records.insert(0, record.clone());
            let persisted = self.persist(&guard.state.records).await;
            (record, persisted)
        };
        info!(user_id = %record.id, "user created");
        self.emit(DirectoryEvent::Created(record.clone()));
        persisted.map(|()| record)
    }

    /// Replaces the record with the same id in place. Returns `false`, and
    /// changes nothing, when no such record exists.
    pub async fn update(&self, record: UserRecord) -> Result<bool, DirectoryError> {
        let persisted = {
            let mut guard = self.inner.lock().await;
            let Some(slot) = guard.state.records.iter_mut().find(|r| r.id == record.id) else {
                return Ok(false);
            };
            *slot = record.clone();
            self.persist(&guard.state.records).await
        };
        info!(user_id = %record.id, "user updated");
        self.emit(DirectoryEvent::Updated(record));
        persisted.map(|()| true)
    }

    /// Removes the record with `id`, returning it if it existed.
    pub async fn remove(&self, id: UserId) -> Result<Option<UserRecord>, DirectoryError> {
        let (removed, persisted) = {
            let mut guard = self.inner.lock().await;
            let index = guard.state.records.iter().position(|r| r.id == id);
            let removed = index.map(|index| guard.state.records.remove(index));
            let persisted = self.persist(&guard.state.records).await;
            (removed, persisted)
        };
        if removed.is_some() {
            info!(user_id = %id, "user removed");
            self.emit(DirectoryEvent::Removed(id));
        }
        persisted.map(|()| removed)
    }

    async fn persist(&self, records: &[UserRecord]) -> Result<(), DirectoryError> {
        let payload = serde_json::to_string(records)?;
        self.snapshots
            .save_snapshot(&self.options.snapshot_key, &payload)
            .await
            .map_err(|err| {
                error!(key = %self.options.snapshot_key, error = %format!("{err:#}"), "failed to persist users");
                DirectoryError::Persist(format!("{err:#}"))
            })
    }

    pub async fn set_search_term(&self, term: impl Into<String>) {
        self.inner.lock().await.state.search_term = term.into();
        self.emit(DirectoryEvent::QueryChanged);
    }

    pub async fn set_search_fields(&self, fields: Vec<SearchField>) {
        self.inner.lock().await.state.search_fields = fields;
        self.emit(DirectoryEvent::QueryChanged);
    }

    pub async fn set_sort_key(&self, key: SortKey) {
        self.inner.lock().await.state.sort_key = key;
        self.emit(DirectoryEvent::QueryChanged);
    }

    pub async fn set_sort_direction(&self, direction: SortDirection) {
        self.inner.lock().await.state.sort_direction = direction;
        self.emit(DirectoryEvent::QueryChanged);
    }

    pub async fn set_sort(&self, key: SortKey, direction: SortDirection) {
        {
            let mut guard = self.inner.lock().await;
            guard.state.sort_key = key;
            guard.state.sort_direction = direction;
        }
        self.emit(DirectoryEvent::QueryChanged);
    }

    /// Column-header behaviour: the active key flips direction, any other key
    /// becomes active in ascending order.
    pub async fn toggle_sort(&self, key: SortKey) -> (SortKey, SortDirection) {
        let applied = {
            let mut guard = self.inner.lock().await;
            if guard.state.sort_key == key {
                guard.state.sort_direction = guard.state.sort_direction.toggled();
            } else {
                guard.state.sort_key = key;
                guard.state.sort_direction = SortDirection::Ascending;
            }
            (guard.state.sort_key, guard.state.sort_direction)
        };
        self.emit(DirectoryEvent::QueryChanged);
        applied
    }
}

fn next_user_id(records: &[UserRecord], last_assigned: i64) -> Option<UserId> {
    let max_existing = records.iter().map(|r| r.id.0).fold(0, i64::max);
    max_existing.max(last_assigned).checked_add(1).map(UserId)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
