//! Posts with their comments and interactions.

mod handlers;

pub use handlers::{
    AddPostCommentHandler, AddPostInteractionHandler, CreatePostHandler, DeletePostHandler,
    GetAllPostsHandler, GetPostByIdHandler, GetPostCommentsHandler, GetPostInteractionsHandler,
    RemovePostInteractionHandler, UpdatePostTextHandler,
};

use crate::mediator::Request;
use cwksocial_common::model::{
    Id,
    post::{InteractionMarker, InteractionType, Post, PostComment, PostInteraction, PostMarker},
    user_profile::UserProfileMarker,
};

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct GetAllPostsQuery;

impl Request for GetAllPostsQuery {
    type Response = Vec<Post>;
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct GetPostByIdQuery {
    pub post_id: Id<PostMarker>,
}

impl Request for GetPostByIdQuery {
    type Response = Post;
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct CreatePostCommand {
    pub user_profile_id: Id<UserProfileMarker>,
    pub text_content: String,
}

impl Request for CreatePostCommand {
    type Response = Post;
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct UpdatePostTextCommand {
    pub post_id: Id<PostMarker>,
    pub user_profile_id: Id<UserProfileMarker>,
    pub text_content: String,
}

impl Request for UpdatePostTextCommand {
    type Response = ();
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct DeletePostCommand {
    pub post_id: Id<PostMarker>,
    pub user_profile_id: Id<UserProfileMarker>,
}

/// Responds with the deleted post.
impl Request for DeletePostCommand {
    type Response = Post;
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct GetPostCommentsQuery {
    pub post_id: Id<PostMarker>,
}

impl Request for GetPostCommentsQuery {
    type Response = Vec<PostComment>;
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct AddPostCommentCommand {
    pub post_id: Id<PostMarker>,
    pub user_profile_id: Id<UserProfileMarker>,
    pub text: String,
}

impl Request for AddPostCommentCommand {
    type Response = PostComment;
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct GetPostInteractionsQuery {
    pub post_id: Id<PostMarker>,
}

impl Request for GetPostInteractionsQuery {
    type Response = Vec<PostInteraction>;
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct AddPostInteractionCommand {
    pub post_id: Id<PostMarker>,
    pub user_profile_id: Id<UserProfileMarker>,
    pub interaction_type: InteractionType,
}

impl Request for AddPostInteractionCommand {
    type Response = PostInteraction;
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct RemovePostInteractionCommand {
    pub post_id: Id<PostMarker>,
    pub interaction_id: Id<InteractionMarker>,
    pub user_profile_id: Id<UserProfileMarker>,
}

/// Responds with the removed interaction.
impl Request for RemovePostInteractionCommand {
    type Response = PostInteraction;
}
