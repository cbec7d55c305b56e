//! Persistence seams used by the application layer.
//!
//! [`DbClient`](crate::client::DbClient) implements them on Postgres and
//! [`MemoryStore`](crate::memory::MemoryStore) keeps everything in process.

use async_trait::async_trait;
use cwksocial_common::model::{
    Id, ModelValidationError,
    identity::{IdentityMarker, IdentityUser, Username},
    post::{InteractionMarker, Post, PostComment, PostInteraction, PostMarker},
    user_profile::{UserProfile, UserProfileMarker},
};
use thiserror::Error;

pub use sqlx::Error as SqlxError;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error("The username {0} is already taken")]
    UsernameTaken(String),
    #[error(transparent)]
    Sqlx(#[from] SqlxError),
    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn fetch_identity(&self, identity_id: Id<IdentityMarker>)
    -> Result<Option<IdentityUser>>;

    async fn fetch_identity_by_username(&self, username: &Username)
    -> Result<Option<IdentityUser>>;

    /// Stores a new identity and its first profile atomically.
    async fn create_account(&self, identity: &IdentityUser, profile: &UserProfile) -> Result<()>;

    /// Deletes the identity with all profiles and posts hanging off it.
    async fn remove_account(&self, identity_id: Id<IdentityMarker>) -> Result<bool>;
}

#[async_trait]
pub trait UserProfileStore: Send + Sync {
    async fn fetch_user_profiles(&self) -> Result<Vec<UserProfile>>;

    async fn fetch_user_profile(
        &self,
        user_profile_id: Id<UserProfileMarker>,
    ) -> Result<Option<UserProfile>>;

    /// Returns the oldest profile of the identity.
    async fn fetch_user_profile_by_identity(
        &self,
        identity_id: Id<IdentityMarker>,
    ) -> Result<Option<UserProfile>>;

    async fn insert_user_profile(&self, profile: &UserProfile) -> Result<()>;

    /// Overwrites the basic info of an existing profile. Returns `false` if
    /// the profile is gone.
    async fn update_user_profile(&self, profile: &UserProfile) -> Result<bool>;

    async fn delete_user_profile(&self, user_profile_id: Id<UserProfileMarker>) -> Result<bool>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn fetch_posts(&self) -> Result<Vec<Post>>;

    async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>>;

    /// Inserts a new post together with its comments and interactions.
    async fn insert_post(&self, post: &Post) -> Result<()>;

    /// Writes the text and modification time of `post`, leaving its comments
    /// and interactions alone. Returns `false` if the post is gone.
    async fn update_post_text(&self, post: &Post) -> Result<bool>;

    /// Appends a comment to its post. Returns `false` if the post is gone.
    async fn insert_comment(&self, comment: &PostComment) -> Result<bool>;

    /// Appends an interaction to its post. Returns `false` if the post is gone.
    async fn insert_interaction(&self, interaction: &PostInteraction) -> Result<bool>;

    async fn delete_interaction(
        &self,
        post_id: Id<PostMarker>,
        interaction_id: Id<InteractionMarker>,
    ) -> Result<bool>;

    async fn delete_post(&self, post_id: Id<PostMarker>) -> Result<bool>;
}

pub trait Store: IdentityStore + UserProfileStore + PostStore {}

impl<T> Store for T where T: IdentityStore + UserProfileStore + PostStore {}
