//! User repository trait definition.

use draugas_types::error::RepositoryError;
use draugas_types::user::{User, UserId};

/// Repository trait for user document persistence.
///
/// The whole aggregate (identity plus both memory tiers) is loaded and saved
/// as one unit. Implementations live in draugas-infra (e.g.,
/// `SqliteUserRepository`). Uses native async fn in traits (Rust 2024
/// edition, no async_trait macro).
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails with `Conflict` when the username or email
    /// is already taken.
    fn create(
        &self,
        user: &User,
    ) -> impl std::future::Future<Output = Result<User, RepositoryError>> + Send;

    /// Look a user up by exact username.
    fn find_by_username(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Look a user up by id.
    fn find_by_id(
        &self,
        id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Persist the user document.
    ///
    /// Compare-and-swap on `user.revision`: the save only succeeds when the
    /// stored revision still equals the one that was loaded, and returns the
    /// user with the bumped revision. A stale revision fails with
    /// `RepositoryError::Conflict`; a missing row with `NotFound`.
    fn save(
        &self,
        user: &User,
    ) -> impl std::future::Future<Output = Result<User, RepositoryError>> + Send;
}
