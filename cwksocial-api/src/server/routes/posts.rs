use crate::server::{
    Result, ServerError, ServerRouter,
    auth::AuthenticatedUser,
    json::{Created, Json},
};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use cwksocial_application::{
    mediator::Mediator,
    posts::{
        AddPostCommentCommand, AddPostInteractionCommand, CreatePostCommand, DeletePostCommand,
        GetAllPostsQuery, GetPostByIdQuery, GetPostCommentsQuery, GetPostInteractionsQuery,
        RemovePostInteractionCommand, UpdatePostTextCommand,
    },
};
use cwksocial_common::model::{
    Id,
    post::{
        CommentMarker, InteractionMarker, InteractionType, Post, PostComment, PostInteraction,
        PostMarker, TextContent,
    },
    user_profile::UserProfileMarker,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::OffsetDateTime;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(get_all_posts)
        .typed_post(create_post)
        .typed_get(get_post)
        .typed_put(update_post_text)
        .typed_delete(delete_post)
        .typed_get(get_comments)
        .typed_post(add_comment)
        .typed_get(get_interactions)
        .typed_post(add_interaction)
        .typed_delete(remove_interaction)
}

#[derive(Clone, Eq, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostCreate {
    text_content: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostCommentCreate {
    text: String,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostInteractionCreate {
    interaction_type: InteractionType,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostCommentResponse {
    comment_id: Id<CommentMarker>,
    user_profile_id: Id<UserProfileMarker>,
    text: TextContent,
    #[serde(with = "time::serde::rfc3339")]
    created_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    last_modified: OffsetDateTime,
}

impl From<&PostComment> for PostCommentResponse {
    fn from(comment: &PostComment) -> Self {
        Self {
            comment_id: comment.id,
            user_profile_id: comment.user_profile_id,
            text: comment.text.clone(),
            created_date: comment.created_date,
            last_modified: comment.last_modified,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostInteractionResponse {
    interaction_id: Id<InteractionMarker>,
    user_profile_id: Id<UserProfileMarker>,
    interaction_type: InteractionType,
}

impl From<&PostInteraction> for PostInteractionResponse {
    fn from(interaction: &PostInteraction) -> Self {
        Self {
            interaction_id: interaction.id,
            user_profile_id: interaction.user_profile_id,
            interaction_type: interaction.interaction_type,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostResponse {
    post_id: Id<PostMarker>,
    user_profile_id: Id<UserProfileMarker>,
    text_content: TextContent,
    #[serde(with = "time::serde::rfc3339")]
    created_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    last_modified: OffsetDateTime,
    comments: Vec<PostCommentResponse>,
    interactions: Vec<PostInteractionResponse>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            post_id: post.id(),
            user_profile_id: post.user_profile_id(),
            text_content: post.text_content().clone(),
            created_date: post.created_date(),
            last_modified: post.last_modified(),
            comments: post.comments().iter().map(Into::into).collect(),
            interactions: post.interactions().iter().map(Into::into).collect(),
        }
    }
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts", rejection(ServerError))]
struct PostsPath();

async fn get_all_posts(
    PostsPath(): PostsPath,
    State(mediator): State<Arc<Mediator>>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<PostResponse>>> {
    let posts = mediator.send(GetAllPostsQuery).await.into_result()?;

    Ok(Json(posts.into_iter().map(Into::into).collect()))
}

async fn create_post(
    PostsPath(): PostsPath,
    State(mediator): State<Arc<Mediator>>,
    user: AuthenticatedUser,
    Json(post): Json<PostCreate>,
) -> Result<Created<PostResponse>> {
    let post = mediator
        .send(CreatePostCommand {
            user_profile_id: user.user_profile_id(),
            text_content: post.text_content,
        })
        .await
        .into_result()?;

    Ok(Created(post.into()))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}", rejection(ServerError))]
struct PostPath {
    id: Id<PostMarker>,
}

async fn get_post(
    PostPath { id }: PostPath,
    State(mediator): State<Arc<Mediator>>,
    _user: AuthenticatedUser,
) -> Result<Json<PostResponse>> {
    let post = mediator
        .send(GetPostByIdQuery { post_id: id })
        .await
        .into_result()?;

    Ok(Json(post.into()))
}

async fn update_post_text(
    PostPath { id }: PostPath,
    State(mediator): State<Arc<Mediator>>,
    user: AuthenticatedUser,
    Json(post): Json<PostCreate>,
) -> Result<StatusCode> {
    mediator
        .send(UpdatePostTextCommand {
            post_id: id,
            user_profile_id: user.user_profile_id(),
            text_content: post.text_content,
        })
        .await
        .into_result()?;

    Ok(StatusCode::OK)
}

async fn delete_post(
    PostPath { id }: PostPath,
    State(mediator): State<Arc<Mediator>>,
    user: AuthenticatedUser,
) -> Result<Json<PostResponse>> {
    let post = mediator
        .send(DeletePostCommand {
            post_id: id,
            user_profile_id: user.user_profile_id(),
        })
        .await
        .into_result()?;

    Ok(Json(post.into()))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}/comments", rejection(ServerError))]
struct PostCommentsPath {
    id: Id<PostMarker>,
}

async fn get_comments(
    PostCommentsPath { id }: PostCommentsPath,
    State(mediator): State<Arc<Mediator>>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<PostCommentResponse>>> {
    let comments = mediator
        .send(GetPostCommentsQuery { post_id: id })
        .await
        .into_result()?;

    Ok(Json(comments.iter().map(Into::into).collect()))
}

async fn add_comment(
    PostCommentsPath { id }: PostCommentsPath,
    State(mediator): State<Arc<Mediator>>,
    user: AuthenticatedUser,
    Json(comment): Json<PostCommentCreate>,
) -> Result<Created<PostCommentResponse>> {
    let comment = mediator
        .send(AddPostCommentCommand {
            post_id: id,
            user_profile_id: user.user_profile_id(),
            text: comment.text,
        })
        .await
        .into_result()?;

    Ok(Created((&comment).into()))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}/interactions", rejection(ServerError))]
struct PostInteractionsPath {
    id: Id<PostMarker>,
}

async fn get_interactions(
    PostInteractionsPath { id }: PostInteractionsPath,
    State(mediator): State<Arc<Mediator>>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<PostInteractionResponse>>> {
    let interactions = mediator
        .send(GetPostInteractionsQuery { post_id: id })
        .await
        .into_result()?;

    Ok(Json(interactions.iter().map(Into::into).collect()))
}

async fn add_interaction(
    PostInteractionsPath { id }: PostInteractionsPath,
    State(mediator): State<Arc<Mediator>>,
    user: AuthenticatedUser,
    Json(interaction): Json<PostInteractionCreate>,
) -> Result<Created<PostInteractionResponse>> {
    let interaction = mediator
        .send(AddPostInteractionCommand {
            post_id: id,
            user_profile_id: user.user_profile_id(),
            interaction_type: interaction.interaction_type,
        })
        .await
        .into_result()?;

    Ok(Created((&interaction).into()))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}/interactions/{interaction_id}", rejection(ServerError))]
struct PostInteractionPath {
    id: Id<PostMarker>,
    interaction_id: Id<InteractionMarker>,
}

async fn remove_interaction(
    PostInteractionPath { id, interaction_id }: PostInteractionPath,
    State(mediator): State<Arc<Mediator>>,
    user: AuthenticatedUser,
) -> Result<Json<PostInteractionResponse>> {
    let interaction = mediator
        .send(RemovePostInteractionCommand {
            post_id: id,
            interaction_id,
            user_profile_id: user.user_profile_id(),
        })
        .await
        .into_result()?;

    Ok(Json((&interaction).into()))
}
