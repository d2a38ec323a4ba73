//! Ownership checks for per-user resources.
//!
//! Every item-level expense operation looks a row up by id and then runs it
//! through these traits. A row that does not exist and a row that belongs to
//! another user produce the same `NotFound`, so a caller can never learn
//! whether a foreign id exists.

use crate::error::ApiError;

/// Resources that belong to exactly one user.
pub trait Owned {
    fn owner_id(&self) -> i64;
}

/// Combined lookup-and-authorize step over an optional row.
pub trait CheckOwner<T> {
    /// Return the resource if `user_id` owns it, otherwise a `NotFound`
    /// carrying `missing` as its detail message.
    fn owned_by(self, user_id: i64, missing: &str) -> Result<T, ApiError>;
}

impl<T: Owned> CheckOwner<T> for Option<T> {
    fn owned_by(self, user_id: i64, missing: &str) -> Result<T, ApiError> {
        match self {
            Some(resource) if resource.owner_id() == user_id => Ok(resource),
            _ => Err(ApiError::not_found(missing)),
        }
    }
}
