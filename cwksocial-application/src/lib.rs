pub mod identity;
pub mod mediator;
pub mod operation;
pub mod posts;
pub mod user_profiles;

#[cfg(test)]
mod test_support;

use crate::{
    identity::{
        GetCurrentUserHandler, GetCurrentUserQuery, LoginCommand, LoginHandler, RegisterCommand,
        RegisterHandler, RemoveAccountCommand, RemoveAccountHandler,
    },
    mediator::Mediator,
    posts::{
        AddPostCommentCommand, AddPostCommentHandler, AddPostInteractionCommand,
        AddPostInteractionHandler, CreatePostCommand, CreatePostHandler, DeletePostCommand,
        DeletePostHandler, GetAllPostsHandler, GetAllPostsQuery, GetPostByIdHandler,
        GetPostByIdQuery, GetPostCommentsHandler, GetPostCommentsQuery, GetPostInteractionsHandler,
        GetPostInteractionsQuery, RemovePostInteractionCommand, RemovePostInteractionHandler,
        UpdatePostTextCommand, UpdatePostTextHandler,
    },
    user_profiles::{
        CreateUserProfileCommand, CreateUserProfileHandler, DeleteUserProfileCommand,
        DeleteUserProfileHandler, GetAllUserProfilesHandler, GetAllUserProfilesQuery,
        GetUserProfileByIdHandler, GetUserProfileByIdQuery, UpdateUserProfileBasicInfoCommand,
        UpdateUserProfileBasicInfoHandler,
    },
};
use cwksocial_common::model::auth::TokenService;
use cwksocial_db::store::Store;
use std::sync::Arc;

/// Registers every handler of the application against `store`.
pub fn build_mediator<S: Store + 'static>(store: &Arc<S>, tokens: &Arc<TokenService>) -> Mediator {
    Mediator::builder()
        // identity
        .register::<RegisterCommand, _>(RegisterHandler::new(store.clone(), tokens.clone()))
        .register::<LoginCommand, _>(LoginHandler::new(store.clone(), tokens.clone()))
        .register::<RemoveAccountCommand, _>(RemoveAccountHandler::new(store.clone()))
        .register::<GetCurrentUserQuery, _>(GetCurrentUserHandler::new(store.clone()))
        // user profiles
        .register::<GetAllUserProfilesQuery, _>(GetAllUserProfilesHandler::new(store.clone()))
        .register::<GetUserProfileByIdQuery, _>(GetUserProfileByIdHandler::new(store.clone()))
        .register::<CreateUserProfileCommand, _>(CreateUserProfileHandler::new(store.clone()))
        .register::<UpdateUserProfileBasicInfoCommand, _>(UpdateUserProfileBasicInfoHandler::new(
            store.clone(),
        ))
        .register::<DeleteUserProfileCommand, _>(DeleteUserProfileHandler::new(store.clone()))
        // posts
        .register::<GetAllPostsQuery, _>(GetAllPostsHandler::new(store.clone()))
        .register::<GetPostByIdQuery, _>(GetPostByIdHandler::new(store.clone()))
        .register::<CreatePostCommand, _>(CreatePostHandler::new(store.clone()))
        .register::<UpdatePostTextCommand, _>(UpdatePostTextHandler::new(store.clone()))
        .register::<DeletePostCommand, _>(DeletePostHandler::new(store.clone()))
        .register::<GetPostCommentsQuery, _>(GetPostCommentsHandler::new(store.clone()))
        .register::<AddPostCommentCommand, _>(AddPostCommentHandler::new(store.clone()))
        .register::<GetPostInteractionsQuery, _>(GetPostInteractionsHandler::new(store.clone()))
        .register::<AddPostInteractionCommand, _>(AddPostInteractionHandler::new(store.clone()))
        .register::<RemovePostInteractionCommand, _>(RemovePostInteractionHandler::new(
            store.clone(),
        ))
        .build()
}
