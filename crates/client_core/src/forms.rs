//! Create and edit workflows: field validation and the duplicate-email check
//! run before the store is touched.

use shared::{
    domain::{NewUser, UserRecord},
    error::FieldErrors,
    validation::{email_taken, validate_user, validate_user_edit, DUPLICATE_EMAIL_MESSAGE},
};
use tracing::debug;

use crate::{DirectoryError, DirectoryStore};

pub async fn submit_new_user(
    store: &DirectoryStore,
    fields: NewUser,
) -> Result<UserRecord, DirectoryError> {
    let mut errors = match validate_user(&fields) {
        Ok(()) => FieldErrors::new(),
        Err(errors) => errors,
    };

    let records = store.records().await;
    if email_taken(&records, &fields.email, None) {
        errors.insert("email", DUPLICATE_EMAIL_MESSAGE);
    }

    if !errors.is_empty() {
        debug!(errors = %errors, "rejected new user");
        return Err(DirectoryError::Validation(errors));
    }

    store.create(fields).await
}

/// Validates and applies an edit against the stored record. An unknown id is
/// reported as [`DirectoryError::NotFound`] rather than the `false` that
/// [`DirectoryStore::update`] returns.
pub async fn submit_user_edit(
    store: &DirectoryStore,
    record: UserRecord,
) -> Result<UserRecord, DirectoryError> {
    let id = record.id;
    let Some(existing) = store.user(id).await else {
        return Err(DirectoryError::NotFound(id));
    };

    if let Err(errors) = validate_user_edit(&existing.fields(), &record.fields()) {
        debug!(user_id = %id, errors = %errors, "rejected user edit");
        return Err(DirectoryError::Validation(errors));
    }

    if store.update(record.clone()).await? {
        Ok(record)
    } else {
        Err(DirectoryError::NotFound(id))
    }
}

#[cfg(test)]
#[path = "tests/forms_tests.rs"]
mod tests;
