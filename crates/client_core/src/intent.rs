//! Intents a front end dispatches to the store, one per user action.

use shared::domain::{NewUser, SortDirection, SortKey, UserId, UserRecord};
use tracing::debug;

use crate::{DirectoryError, DirectoryStore, LoadOrigin};

#[derive(Debug, Clone)]
pub enum DirectoryIntent {
    Load,
    Refresh,
    Create(NewUser),
    Update(UserRecord),
    Remove(UserId),
    SetSearchTerm(String),
    SetSortKey(SortKey),
    SetSortDirection(SortDirection),
    ToggleSort(SortKey),
}

impl DirectoryIntent {
    pub fn name(&self) -> &'static str {
        match self {
            DirectoryIntent::Load => "load",
            DirectoryIntent::Refresh => "refresh",
            DirectoryIntent::Create(_) => "create",
            DirectoryIntent::Update(_) => "update",
            DirectoryIntent::Remove(_) => "remove",
            DirectoryIntent::SetSearchTerm(_) => "set_search_term",
            DirectoryIntent::SetSortKey(_) => "set_sort_key",
            DirectoryIntent::SetSortDirection(_) => "set_sort_direction",
            DirectoryIntent::ToggleSort(_) => "toggle_sort",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentOutcome {
    Loaded(LoadOrigin),
    Created(UserRecord),
    Updated { found: bool },
    Removed(Option<UserRecord>),
    QueryChanged,
}

impl DirectoryStore {
    pub async fn dispatch(&self, intent: DirectoryIntent) -> Result<IntentOutcome, DirectoryError> {
        debug!(intent = intent.name(), "dispatching directory intent");
        let outcome = match intent {
            DirectoryIntent::Load => IntentOutcome::Loaded(self.load().await?),
            DirectoryIntent::Refresh => IntentOutcome::Loaded(self.refresh().await?),
            DirectoryIntent::Create(fields) => IntentOutcome::Created(self.create(fields).await?),
            DirectoryIntent::Update(record) => IntentOutcome::Updated {
                found: self.update(record).await?,
            },
            DirectoryIntent::Remove(id) => IntentOutcome::Removed(self.remove(id).await?),
            DirectoryIntent::SetSearchTerm(term) => {
                self.set_search_term(term).await;
                IntentOutcome::QueryChanged
            }
            DirectoryIntent::SetSortKey(key) => {
                self.set_sort_key(key).await;
                IntentOutcome::QueryChanged
            }
            DirectoryIntent::SetSortDirection(direction) => {
                self.set_sort_direction(direction).await;
                IntentOutcome::QueryChanged
            }
            DirectoryIntent::ToggleSort(key) => {
                self.toggle_sort(key).await;
                IntentOutcome::QueryChanged
            }
        };
        Ok(outcome)
    }
}
