//! In-process store for development and tests.
//!
//! Deletes cascade the same way the Postgres schema does.

use crate::store::{DbError, IdentityStore, PostStore, Result, UserProfileStore};
use async_trait::async_trait;
use cwksocial_common::model::{
    Id,
    identity::{IdentityMarker, IdentityUser, Username},
    post::{InteractionMarker, Post, PostComment, PostInteraction, PostMarker},
    user_profile::{UserProfile, UserProfileMarker},
};
use parking_lot::RwLock;

#[derive(Debug, Default)]
struct MemoryState {
    identities: Vec<IdentityUser>,
    user_profiles: Vec<UserProfile>,
    posts: Vec<Post>,
}

impl MemoryState {
    fn post_mut(&mut self, post_id: Id<PostMarker>) -> Option<&mut Post> {
        self.posts.iter_mut().find(|post| post.id() == post_id)
    }

    fn purge_user_profile(&mut self, user_profile_id: Id<UserProfileMarker>) {
        self.posts
            .retain(|post| post.user_profile_id() != user_profile_id);

        for post in &mut self.posts {
            let comment_ids: Vec<_> = post
                .comments()
                .iter()
                .filter(|comment| comment.user_profile_id == user_profile_id)
                .map(|comment| comment.id)
                .collect();
            for comment_id in comment_ids {
                post.remove_comment(comment_id);
            }

            let interaction_ids: Vec<_> = post
                .interactions()
                .iter()
                .filter(|interaction| interaction.user_profile_id == user_profile_id)
                .map(|interaction| interaction.id)
                .collect();
            for interaction_id in interaction_ids {
                post.remove_interaction(interaction_id);
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn fetch_identity(
        &self,
        identity_id: Id<IdentityMarker>,
    ) -> Result<Option<IdentityUser>> {
        Ok(self
            .state
            .read()
            .identities
            .iter()
            .find(|identity| identity.id == identity_id)
            .cloned())
    }

    async fn fetch_identity_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<IdentityUser>> {
        Ok(self
            .state
            .read()
            .identities
            .iter()
            .find(|identity| identity.username == *username)
            .cloned())
    }

    async fn create_account(&self, identity: &IdentityUser, profile: &UserProfile) -> Result<()> {
        let mut state = self.state.write();

        if state
            .identities
            .iter()
            .any(|existing| existing.username == identity.username)
        {
            return Err(DbError::UsernameTaken(identity.username.get().to_owned()));
        }

        state.identities.push(identity.clone());
        state.user_profiles.push(profile.clone());
        Ok(())
    }

    async fn remove_account(&self, identity_id: Id<IdentityMarker>) -> Result<bool> {
        let mut state = self.state.write();

        let before = state.identities.len();
        state.identities.retain(|identity| identity.id != identity_id);
        if state.identities.len() == before {
            return Ok(false);
        }

        let profile_ids: Vec<_> = state
            .user_profiles
            .iter()
            .filter(|profile| profile.identity_id == identity_id)
            .map(|profile| profile.id)
            .collect();
        state
            .user_profiles
            .retain(|profile| profile.identity_id != identity_id);
        for profile_id in profile_ids {
            state.purge_user_profile(profile_id);
        }

        Ok(true)
    }
}

#[async_trait]
impl UserProfileStore for MemoryStore {
    async fn fetch_user_profiles(&self) -> Result<Vec<UserProfile>> {
        Ok(self.state.read().user_profiles.clone())
    }

    async fn fetch_user_profile(
        &self,
        user_profile_id: Id<UserProfileMarker>,
    ) -> Result<Option<UserProfile>> {
        Ok(self
            .state
            .read()
            .user_profiles
            .iter()
            .find(|profile| profile.id == user_profile_id)
            .cloned())
    }

    async fn fetch_user_profile_by_identity(
        &self,
        identity_id: Id<IdentityMarker>,
    ) -> Result<Option<UserProfile>> {
        Ok(self
            .state
            .read()
            .user_profiles
            .iter()
            .find(|profile| profile.identity_id == identity_id)
            .cloned())
    }

    async fn insert_user_profile(&self, profile: &UserProfile) -> Result<()> {
        self.state.write().user_profiles.push(profile.clone());
        Ok(())
    }

    async fn update_user_profile(&self, profile: &UserProfile) -> Result<bool> {
        let mut state = self.state.write();

        let Some(existing) = state
            .user_profiles
            .iter_mut()
            .find(|existing| existing.id == profile.id)
        else {
            return Ok(false);
        };
        existing.basic_info = profile.basic_info.clone();
        existing.last_modified = profile.last_modified;
        Ok(true)
    }

    async fn delete_user_profile(&self, user_profile_id: Id<UserProfileMarker>) -> Result<bool> {
        let mut state = self.state.write();

        let before = state.user_profiles.len();
        state
            .user_profiles
            .retain(|profile| profile.id != user_profile_id);
        if state.user_profiles.len() == before {
            return Ok(false);
        }

        state.purge_user_profile(user_profile_id);
        Ok(true)
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn fetch_posts(&self) -> Result<Vec<Post>> {
        Ok(self.state.read().posts.clone())
    }

    async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        Ok(self
            .state
            .read()
            .posts
            .iter()
            .find(|post| post.id() == post_id)
            .cloned())
    }

    async fn insert_post(&self, post: &Post) -> Result<()> {
        self.state.write().posts.push(post.clone());
        Ok(())
    }

    async fn update_post_text(&self, post: &Post) -> Result<bool> {
        let mut state = self.state.write();

        let Some(existing) = state.post_mut(post.id()) else {
            return Ok(false);
        };
        *existing = Post::restore(
            post.header(),
            existing.comments().to_vec(),
            existing.interactions().to_vec(),
        );
        Ok(true)
    }

    async fn insert_comment(&self, comment: &PostComment) -> Result<bool> {
        let mut state = self.state.write();

        let Some(post) = state.post_mut(comment.post_id) else {
            return Ok(false);
        };
        post.add_comment(comment.clone());
        Ok(true)
    }

    async fn insert_interaction(&self, interaction: &PostInteraction) -> Result<bool> {
        let mut state = self.state.write();

        let Some(post) = state.post_mut(interaction.post_id) else {
            return Ok(false);
        };
        post.add_interaction(interaction.clone());
        Ok(true)
    }

    async fn delete_interaction(
        &self,
        post_id: Id<PostMarker>,
        interaction_id: Id<InteractionMarker>,
    ) -> Result<bool> {
        let mut state = self.state.write();

        Ok(state
            .post_mut(post_id)
            .and_then(|post| post.remove_interaction(interaction_id))
            .is_some())
    }

    async fn delete_post(&self, post_id: Id<PostMarker>) -> Result<bool> {
        let mut state = self.state.write();

        let before = state.posts.len();
        state.posts.retain(|post| post.id() != post_id);
        Ok(state.posts.len() != before)
    }
}
