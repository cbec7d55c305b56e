use crate::{
    model::{Id, user_profile::UserProfileMarker},
    util::trimmed_within,
};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};
use thiserror::Error;
use time::OffsetDateTime;

pub const TEXT_CONTENT_MAX_LEN: usize = 1000;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct CommentMarker;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct InteractionMarker;

/// A post together with the comments and interactions it owns.
///
/// The child collections are only reachable through slices; changes go through
/// the `add_*`/`remove_*` methods.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Post {
    id: Id<PostMarker>,
    user_profile_id: Id<UserProfileMarker>,
    text_content: TextContent,
    created_date: OffsetDateTime,
    last_modified: OffsetDateTime,
    comments: Vec<PostComment>,
    interactions: Vec<PostInteraction>,
}

impl Post {
    #[must_use]
    pub fn create(user_profile_id: Id<UserProfileMarker>, text_content: TextContent) -> Self {
        let now = OffsetDateTime::now_utc();

        Self {
            id: Id::new_random(),
            user_profile_id,
            text_content,
            created_date: now,
            last_modified: now,
            comments: Vec::new(),
            interactions: Vec::new(),
        }
    }

    /// Rebuilds a post from stored state.
    #[must_use]
    pub fn restore(
        header: PostHeader,
        comments: Vec<PostComment>,
        interactions: Vec<PostInteraction>,
    ) -> Self {
        Self {
            id: header.id,
            user_profile_id: header.user_profile_id,
            text_content: header.text_content,
            created_date: header.created_date,
            last_modified: header.last_modified,
            comments,
            interactions,
        }
    }

    #[must_use]
    pub fn id(&self) -> Id<PostMarker> {
        self.id
    }

    #[must_use]
    pub fn user_profile_id(&self) -> Id<UserProfileMarker> {
        self.user_profile_id
    }

    #[must_use]
    pub fn text_content(&self) -> &TextContent {
        &self.text_content
    }

    #[must_use]
    pub fn created_date(&self) -> OffsetDateTime {
        self.created_date
    }

    #[must_use]
    pub fn last_modified(&self) -> OffsetDateTime {
        self.last_modified
    }

    #[must_use]
    pub fn comments(&self) -> &[PostComment] {
        &self.comments
    }

    #[must_use]
    pub fn interactions(&self) -> &[PostInteraction] {
        &self.interactions
    }

    pub fn update_text(&mut self, text_content: TextContent) {
        self.text_content = text_content;
        self.last_modified = OffsetDateTime::now_utc();
    }

    pub fn add_comment(&mut self, comment: PostComment) {
        self.comments.push(comment);
    }

    pub fn remove_comment(&mut self, comment_id: Id<CommentMarker>) -> Option<PostComment> {
        let index = self
            .comments
            .iter()
            .position(|comment| comment.id == comment_id)?;
        Some(self.comments.remove(index))
    }

    pub fn add_interaction(&mut self, interaction: PostInteraction) {
        self.interactions.push(interaction);
    }

    pub fn remove_interaction(
        &mut self,
        interaction_id: Id<InteractionMarker>,
    ) -> Option<PostInteraction> {
        let index = self
            .interactions
            .iter()
            .position(|interaction| interaction.id == interaction_id)?;
        Some(self.interactions.remove(index))
    }

    #[must_use]
    pub fn header(&self) -> PostHeader {
        PostHeader {
            id: self.id,
            user_profile_id: self.user_profile_id,
            text_content: self.text_content.clone(),
            created_date: self.created_date,
            last_modified: self.last_modified,
        }
    }
}

/// The scalar part of a post, without its child collections.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct PostHeader {
    pub id: Id<PostMarker>,
    pub user_profile_id: Id<UserProfileMarker>,
    pub text_content: TextContent,
    pub created_date: OffsetDateTime,
    pub last_modified: OffsetDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct PostComment {
    pub id: Id<CommentMarker>,
    pub post_id: Id<PostMarker>,
    pub user_profile_id: Id<UserProfileMarker>,
    pub text: TextContent,
    pub created_date: OffsetDateTime,
    pub last_modified: OffsetDateTime,
}

impl PostComment {
    #[must_use]
    pub fn create(
        post_id: Id<PostMarker>,
        user_profile_id: Id<UserProfileMarker>,
        text: TextContent,
    ) -> Self {
        let now = OffsetDateTime::now_utc();

        Self {
            id: Id::new_random(),
            post_id,
            user_profile_id,
            text,
            created_date: now,
            last_modified: now,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct PostInteraction {
    pub id: Id<InteractionMarker>,
    pub post_id: Id<PostMarker>,
    pub user_profile_id: Id<UserProfileMarker>,
    pub interaction_type: InteractionType,
}

impl PostInteraction {
    #[must_use]
    pub fn create(
        post_id: Id<PostMarker>,
        user_profile_id: Id<UserProfileMarker>,
        interaction_type: InteractionType,
    ) -> Self {
        Self {
            id: Id::new_random(),
            post_id,
            user_profile_id,
            interaction_type,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize, Deserialize)]
pub enum InteractionType {
    Like,
    Dislike,
    Haha,
    Wow,
    Heart,
    Angry,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("Unknown interaction type: {0}")]
pub struct InvalidInteractionTypeError(String);

impl InteractionType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            InteractionType::Like => "Like",
            InteractionType::Dislike => "Dislike",
            InteractionType::Haha => "Haha",
            InteractionType::Wow => "Wow",
            InteractionType::Heart => "Heart",
            InteractionType::Angry => "Angry",
        }
    }
}

impl Display for InteractionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionType {
    type Err = InvalidInteractionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Like" => Ok(InteractionType::Like),
            "Dislike" => Ok(InteractionType::Dislike),
            "Haha" => Ok(InteractionType::Haha),
            "Wow" => Ok(InteractionType::Wow),
            "Heart" => Ok(InteractionType::Heart),
            "Angry" => Ok(InteractionType::Angry),
            other => Err(InvalidInteractionTypeError(other.to_owned())),
        }
    }
}

/// Text of a post or comment.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct TextContent(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("Text must be between 1 and 1000 characters long")]
pub struct InvalidTextContentError;

impl TextContent {
    pub fn new(text: String) -> Result<Self, InvalidTextContentError> {
        trimmed_within(&text, TEXT_CONTENT_MAX_LEN)
            .map(|trimmed| Self(trimmed.to_owned()))
            .ok_or(InvalidTextContentError)
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{
        Id,
        post::{InteractionType, Post, PostComment, PostInteraction, TextContent},
    };

    fn text(value: &str) -> TextContent {
        TextContent::new(value.to_owned()).unwrap()
    }

    #[test]
    fn text_content_bounds() {
        assert_eq!(text("  hello  ").get(), "hello");
        assert!(TextContent::new(" \n ".to_owned()).is_err());
        assert!(TextContent::new("a".repeat(1000)).is_ok());
        assert!(TextContent::new("a".repeat(1001)).is_err());
    }

    #[test]
    fn comments_are_added_and_removed_by_id() {
        let author = Id::new_random();
        let mut post = Post::create(author, text("first post"));
        let first = PostComment::create(post.id(), author, text("nice"));
        let second = PostComment::create(post.id(), Id::new_random(), text("agreed"));

        post.add_comment(first.clone());
        post.add_comment(second.clone());
        assert_eq!(post.comments(), [first.clone(), second.clone()]);

        assert_eq!(post.remove_comment(first.id), Some(first.clone()));
        assert_eq!(post.remove_comment(first.id), None);
        assert_eq!(post.comments(), [second]);
    }

    #[test]
    fn interactions_keep_insertion_order_without_dedup() {
        let author = Id::new_random();
        let mut post = Post::create(author, text("first post"));
        let like = PostInteraction::create(post.id(), author, InteractionType::Like);
        let another_like = PostInteraction::create(post.id(), author, InteractionType::Like);

        post.add_interaction(like.clone());
        post.add_interaction(another_like.clone());
        assert_eq!(post.interactions().len(), 2);

        assert_eq!(post.remove_interaction(another_like.id), Some(another_like));
        assert_eq!(post.interactions(), [like]);
    }

    #[test]
    fn restore_keeps_header_and_children() {
        let author = Id::new_random();
        let mut post = Post::create(author, text("original"));
        post.add_comment(PostComment::create(post.id(), author, text("c")));
        post.update_text(text("edited"));

        let restored = Post::restore(
            post.header(),
            post.comments().to_vec(),
            post.interactions().to_vec(),
        );

        assert_eq!(restored, post);
        assert_eq!(restored.text_content().get(), "edited");
        assert!(restored.last_modified() >= restored.created_date());
    }

    #[test]
    fn interaction_type_parses_its_display_form() {
        for interaction_type in [
            InteractionType::Like,
            InteractionType::Dislike,
            InteractionType::Haha,
            InteractionType::Wow,
            InteractionType::Heart,
            InteractionType::Angry,
        ] {
            assert_eq!(interaction_type.to_string().parse(), Ok(interaction_type));
        }
        assert!("Meh".parse::<InteractionType>().is_err());
    }
}
