use crate::{
    mediator::RequestHandler,
    operation::{Error, ErrorCode, OperationResult},
    posts::{
        AddPostCommentCommand, AddPostInteractionCommand, CreatePostCommand, DeletePostCommand,
        GetAllPostsQuery, GetPostByIdQuery, GetPostCommentsQuery, GetPostInteractionsQuery,
        RemovePostInteractionCommand, UpdatePostTextCommand,
    },
};
use async_trait::async_trait;
use cwksocial_common::model::{
    Id,
    post::{InteractionMarker, Post, PostComment, PostInteraction, PostMarker, TextContent},
    user_profile::UserProfileMarker,
};
use cwksocial_db::store::{PostStore, UserProfileStore};
use std::sync::Arc;
use tracing::{debug, info};

fn post_not_found(post_id: Id<PostMarker>) -> Error {
    Error::not_found(format!("No post found with ID {post_id}"))
}

fn interaction_not_found(interaction_id: Id<InteractionMarker>) -> Error {
    Error::not_found(format!("No interaction found with ID {interaction_id}"))
}

async fn fetch_post<S: PostStore>(store: &S, post_id: Id<PostMarker>) -> Result<Post, Error> {
    store
        .fetch_post(post_id)
        .await?
        .ok_or_else(|| post_not_found(post_id))
}

/// Fails with `NotFound` when the author profile no longer exists.
async fn ensure_author_exists<S: UserProfileStore>(
    store: &S,
    user_profile_id: Id<UserProfileMarker>,
) -> Result<(), Error> {
    match store.fetch_user_profile(user_profile_id).await? {
        Some(_) => Ok(()),
        None => Err(Error::not_found(format!(
            "No UserProfile found with ID {user_profile_id}"
        ))),
    }
}

macro_rules! post_handlers {
    ($($handler:ident),* $(,)?) => {
        $(
            pub struct $handler<S> {
                store: Arc<S>,
            }

            impl<S> $handler<S> {
                pub fn new(store: Arc<S>) -> Self {
                    Self { store }
                }
            }
        )*
    };
}

post_handlers!(
    GetAllPostsHandler,
    GetPostByIdHandler,
    CreatePostHandler,
    UpdatePostTextHandler,
    DeletePostHandler,
    GetPostCommentsHandler,
    AddPostCommentHandler,
    GetPostInteractionsHandler,
    AddPostInteractionHandler,
    RemovePostInteractionHandler,
);

#[async_trait]
impl<S: PostStore + 'static> RequestHandler<GetAllPostsQuery> for GetAllPostsHandler<S> {
    async fn handle(&self, _request: GetAllPostsQuery) -> OperationResult<Vec<Post>> {
        self.store.fetch_posts().await.map_err(Error::from).into()
    }
}

#[async_trait]
impl<S: PostStore + 'static> RequestHandler<GetPostByIdQuery> for GetPostByIdHandler<S> {
    async fn handle(&self, request: GetPostByIdQuery) -> OperationResult<Post> {
        fetch_post(&*self.store, request.post_id).await.into()
    }
}

impl<S: PostStore + UserProfileStore> CreatePostHandler<S> {
    async fn create(&self, request: CreatePostCommand) -> Result<Post, Error> {
        let text_content = TextContent::new(request.text_content)?;
        ensure_author_exists(&*self.store, request.user_profile_id).await?;

        let post = Post::create(request.user_profile_id, text_content);
        self.store.insert_post(&post).await?;

        info!(post_id = %post.id(), user_profile_id = %post.user_profile_id(), "Created post");
        Ok(post)
    }
}

#[async_trait]
impl<S: PostStore + UserProfileStore + 'static> RequestHandler<CreatePostCommand>
    for CreatePostHandler<S>
{
    async fn handle(&self, request: CreatePostCommand) -> OperationResult<Post> {
        self.create(request).await.into()
    }
}

impl<S: PostStore> UpdatePostTextHandler<S> {
    async fn update(&self, request: UpdatePostTextCommand) -> Result<(), Error> {
        let mut post = fetch_post(&*self.store, request.post_id).await?;

        if post.user_profile_id() != request.user_profile_id {
            return Err(Error::new(
                ErrorCode::PostUpdateNotPossible,
                "Post update not possible because it's not the post owner that initiates the update",
            ));
        }

        post.update_text(TextContent::new(request.text_content)?);
        if !self.store.update_post_text(&post).await? {
            return Err(post_not_found(post.id()));
        }
        Ok(())
    }
}

#[async_trait]
impl<S: PostStore + 'static> RequestHandler<UpdatePostTextCommand> for UpdatePostTextHandler<S> {
    async fn handle(&self, request: UpdatePostTextCommand) -> OperationResult<()> {
        self.update(request).await.into()
    }
}

impl<S: PostStore> DeletePostHandler<S> {
    async fn delete(&self, request: DeletePostCommand) -> Result<Post, Error> {
        let post = fetch_post(&*self.store, request.post_id).await?;

        if post.user_profile_id() != request.user_profile_id {
            return Err(Error::new(
                ErrorCode::PostDeleteNotPossible,
                "Only the owner of a post can delete it",
            ));
        }

        if !self.store.delete_post(post.id()).await? {
            return Err(post_not_found(post.id()));
        }

        info!(post_id = %post.id(), "Deleted post");
        Ok(post)
    }
}

#[async_trait]
impl<S: PostStore + 'static> RequestHandler<DeletePostCommand> for DeletePostHandler<S> {
    async fn handle(&self, request: DeletePostCommand) -> OperationResult<Post> {
        self.delete(request).await.into()
    }
}

#[async_trait]
impl<S: PostStore + 'static> RequestHandler<GetPostCommentsQuery> for GetPostCommentsHandler<S> {
    async fn handle(&self, request: GetPostCommentsQuery) -> OperationResult<Vec<PostComment>> {
        fetch_post(&*self.store, request.post_id)
            .await
            .map(|post| post.comments().to_vec())
            .into()
    }
}

impl<S: PostStore + UserProfileStore> AddPostCommentHandler<S> {
    async fn add(&self, request: AddPostCommentCommand) -> Result<PostComment, Error> {
        let text = TextContent::new(request.text)?;
        ensure_author_exists(&*self.store, request.user_profile_id).await?;

        let comment = PostComment::create(request.post_id, request.user_profile_id, text);
        if !self.store.insert_comment(&comment).await? {
            return Err(post_not_found(request.post_id));
        }

        debug!(post_id = %comment.post_id, comment_id = %comment.id, "Added comment");
        Ok(comment)
    }
}

#[async_trait]
impl<S: PostStore + UserProfileStore + 'static> RequestHandler<AddPostCommentCommand>
    for AddPostCommentHandler<S>
{
    async fn handle(&self, request: AddPostCommentCommand) -> OperationResult<PostComment> {
        self.add(request).await.into()
    }
}

#[async_trait]
impl<S: PostStore + 'static> RequestHandler<GetPostInteractionsQuery>
    for GetPostInteractionsHandler<S>
{
    async fn handle(
        &self,
        request: GetPostInteractionsQuery,
    ) -> OperationResult<Vec<PostInteraction>> {
        fetch_post(&*self.store, request.post_id)
            .await
            .map(|post| post.interactions().to_vec())
            .into()
    }
}

impl<S: PostStore + UserProfileStore> AddPostInteractionHandler<S> {
    async fn add(&self, request: AddPostInteractionCommand) -> Result<PostInteraction, Error> {
        ensure_author_exists(&*self.store, request.user_profile_id).await?;

        let interaction = PostInteraction::create(
            request.post_id,
            request.user_profile_id,
            request.interaction_type,
        );
        if !self.store.insert_interaction(&interaction).await? {
            return Err(post_not_found(request.post_id));
        }

        debug!(
            post_id = %interaction.post_id,
            interaction_id = %interaction.id,
            "Added interaction"
        );
        Ok(interaction)
    }
}

#[async_trait]
impl<S: PostStore + UserProfileStore + 'static> RequestHandler<AddPostInteractionCommand>
    for AddPostInteractionHandler<S>
{
    async fn handle(&self, request: AddPostInteractionCommand) -> OperationResult<PostInteraction> {
        self.add(request).await.into()
    }
}

impl<S: PostStore> RemovePostInteractionHandler<S> {
    async fn remove(
        &self,
        request: RemovePostInteractionCommand,
    ) -> Result<PostInteraction, Error> {
        let post = fetch_post(&*self.store, request.post_id).await?;

        let interaction = post
            .interactions()
            .iter()
            .find(|interaction| interaction.id == request.interaction_id)
            .cloned()
            .ok_or_else(|| interaction_not_found(request.interaction_id))?;

        if interaction.user_profile_id != request.user_profile_id {
            return Err(Error::new(
                ErrorCode::InteractionRemovalNotAuthorized,
                "Cannot remove interaction as you are not its author",
            ));
        }

        if !self
            .store
            .delete_interaction(post.id(), interaction.id)
            .await?
        {
            return Err(interaction_not_found(interaction.id));
        }
        Ok(interaction)
    }
}

#[async_trait]
impl<S: PostStore + 'static> RequestHandler<RemovePostInteractionCommand>
    for RemovePostInteractionHandler<S>
{
    async fn handle(
        &self,
        request: RemovePostInteractionCommand,
    ) -> OperationResult<PostInteraction> {
        self.remove(request).await.into()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        operation::ErrorCode,
        posts::{
            AddPostCommentCommand, AddPostInteractionCommand, CreatePostCommand,
            DeletePostCommand, GetAllPostsQuery, GetPostByIdQuery, GetPostCommentsQuery,
            GetPostInteractionsQuery, RemovePostInteractionCommand, UpdatePostTextCommand,
        },
        test_support::TestApp,
        user_profiles::DeleteUserProfileCommand,
    };
    use cwksocial_common::model::{
        Id,
        post::{InteractionType, Post},
        user_profile::UserProfileMarker,
    };

    async fn create_post(app: &TestApp, author: Id<UserProfileMarker>, text: &str) -> Post {
        app.mediator
            .send(CreatePostCommand {
                user_profile_id: author,
                text_content: text.to_owned(),
            })
            .await
            .into_result()
            .unwrap()
    }

    #[tokio::test]
    async fn created_post_is_listed_and_fetchable() {
        let app = TestApp::new();
        let jane = app.register("jane@example.com").await;
        let post = create_post(&app, jane.user_profile_id, "  Hello world  ").await;

        assert_eq!(post.text_content().get(), "Hello world");

        let fetched = app
            .mediator
            .send(GetPostByIdQuery { post_id: post.id() })
            .await
            .into_result()
            .unwrap();
        assert_eq!(fetched, post);

        let all = app
            .mediator
            .send(GetAllPostsQuery)
            .await
            .into_result()
            .unwrap();
        assert_eq!(all, [post]);
    }

    #[tokio::test]
    async fn empty_post_text_is_rejected() {
        let app = TestApp::new();
        let jane = app.register("jane@example.com").await;

        let result = app
            .mediator
            .send(CreatePostCommand {
                user_profile_id: jane.user_profile_id,
                text_content: "   ".to_owned(),
            })
            .await;

        assert_eq!(result.errors()[0].code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn only_the_author_edits_or_deletes() {
        let app = TestApp::new();
        let jane = app.register("jane@example.com").await;
        let john = app.register("john@example.com").await;
        let post = create_post(&app, jane.user_profile_id, "Original").await;

        let update = app
            .mediator
            .send(UpdatePostTextCommand {
                post_id: post.id(),
                user_profile_id: john.user_profile_id,
                text_content: "Hijacked".to_owned(),
            })
            .await;
        assert_eq!(update.errors()[0].code, ErrorCode::PostUpdateNotPossible);

        let delete = app
            .mediator
            .send(DeletePostCommand {
                post_id: post.id(),
                user_profile_id: john.user_profile_id,
            })
            .await;
        assert_eq!(delete.errors()[0].code, ErrorCode::PostDeleteNotPossible);

        let update = app
            .mediator
            .send(UpdatePostTextCommand {
                post_id: post.id(),
                user_profile_id: jane.user_profile_id,
                text_content: "Edited".to_owned(),
            })
            .await;
        assert!(!update.is_error());

        let deleted = app
            .mediator
            .send(DeletePostCommand {
                post_id: post.id(),
                user_profile_id: jane.user_profile_id,
            })
            .await
            .into_result()
            .unwrap();
        assert_eq!(deleted.text_content().get(), "Edited");

        let fetched = app
            .mediator
            .send(GetPostByIdQuery { post_id: post.id() })
            .await;
        assert_eq!(fetched.errors()[0].code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn comments_are_kept_in_order() {
        let app = TestApp::new();
        let jane = app.register("jane@example.com").await;
        let john = app.register("john@example.com").await;
        let post = create_post(&app, jane.user_profile_id, "Post").await;

        for (author, text) in [(john.user_profile_id, "first"), (jane.user_profile_id, "second")] {
            app.mediator
                .send(AddPostCommentCommand {
                    post_id: post.id(),
                    user_profile_id: author,
                    text: text.to_owned(),
                })
                .await
                .into_result()
                .unwrap();
        }

        let comments = app
            .mediator
            .send(GetPostCommentsQuery { post_id: post.id() })
            .await
            .into_result()
            .unwrap();
        let texts: Vec<_> = comments.iter().map(|comment| comment.text.get()).collect();
        assert_eq!(texts, ["first", "second"]);
        assert_eq!(comments[0].user_profile_id, john.user_profile_id);

        let missing = app
            .mediator
            .send(AddPostCommentCommand {
                post_id: Id::new_random(),
                user_profile_id: john.user_profile_id,
                text: "lost".to_owned(),
            })
            .await;
        assert_eq!(missing.errors()[0].code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn interactions_are_removed_by_their_author_only() {
        let app = TestApp::new();
        let jane = app.register("jane@example.com").await;
        let john = app.register("john@example.com").await;
        let post = create_post(&app, jane.user_profile_id, "Post").await;

        let interaction = app
            .mediator
            .send(AddPostInteractionCommand {
                post_id: post.id(),
                user_profile_id: john.user_profile_id,
                interaction_type: InteractionType::Heart,
            })
            .await
            .into_result()
            .unwrap();

        let removal = RemovePostInteractionCommand {
            post_id: post.id(),
            interaction_id: interaction.id,
            user_profile_id: jane.user_profile_id,
        };
        let rejected = app.mediator.send(removal).await;
        assert_eq!(
            rejected.errors()[0].code,
            ErrorCode::InteractionRemovalNotAuthorized
        );

        let removed = app
            .mediator
            .send(RemovePostInteractionCommand {
                user_profile_id: john.user_profile_id,
                ..removal
            })
            .await
            .into_result()
            .unwrap();
        assert_eq!(removed, interaction);

        let interactions = app
            .mediator
            .send(GetPostInteractionsQuery { post_id: post.id() })
            .await
            .into_result()
            .unwrap();
        assert!(interactions.is_empty());

        let again = app
            .mediator
            .send(RemovePostInteractionCommand {
                user_profile_id: john.user_profile_id,
                ..removal
            })
            .await;
        assert_eq!(again.errors()[0].code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn writes_by_a_deleted_author_are_not_found() {
        let app = TestApp::new();
        let jane = app.register("jane@example.com").await;
        let john = app.register("john@example.com").await;
        let post = create_post(&app, jane.user_profile_id, "Post").await;

        let deleted = app
            .mediator
            .send(DeleteUserProfileCommand {
                user_profile_id: john.user_profile_id,
                requested_by: john.identity_id,
            })
            .await;
        assert!(!deleted.is_error());

        let created = app
            .mediator
            .send(CreatePostCommand {
                user_profile_id: john.user_profile_id,
                text_content: "Ghost post".to_owned(),
            })
            .await;
        assert_eq!(created.errors()[0].code, ErrorCode::NotFound);

        let comment = app
            .mediator
            .send(AddPostCommentCommand {
                post_id: post.id(),
                user_profile_id: john.user_profile_id,
                text: "Ghost comment".to_owned(),
            })
            .await;
        assert_eq!(comment.errors()[0].code, ErrorCode::NotFound);

        let interaction = app
            .mediator
            .send(AddPostInteractionCommand {
                post_id: post.id(),
                user_profile_id: john.user_profile_id,
                interaction_type: InteractionType::Like,
            })
            .await;
        assert_eq!(interaction.errors()[0].code, ErrorCode::NotFound);

        let all = app
            .mediator
            .send(GetAllPostsQuery)
            .await
            .into_result()
            .unwrap();
        assert_eq!(all, [post]);
        assert!(all[0].comments().is_empty());
        assert!(all[0].interactions().is_empty());
    }

    #[tokio::test]
    async fn editing_text_keeps_comments_and_interactions() {
        let app = TestApp::new();
        let jane = app.register("jane@example.com").await;
        let john = app.register("john@example.com").await;
        let post = create_post(&app, jane.user_profile_id, "Original").await;

        let comment = app
            .mediator
            .send(AddPostCommentCommand {
                post_id: post.id(),
                user_profile_id: john.user_profile_id,
                text: "Nice".to_owned(),
            })
            .await
            .into_result()
            .unwrap();
        let interaction = app
            .mediator
            .send(AddPostInteractionCommand {
                post_id: post.id(),
                user_profile_id: john.user_profile_id,
                interaction_type: InteractionType::Heart,
            })
            .await
            .into_result()
            .unwrap();

        let update = app
            .mediator
            .send(UpdatePostTextCommand {
                post_id: post.id(),
                user_profile_id: jane.user_profile_id,
                text_content: "Edited".to_owned(),
            })
            .await;
        assert!(!update.is_error());

        let fetched = app
            .mediator
            .send(GetPostByIdQuery { post_id: post.id() })
            .await
            .into_result()
            .unwrap();
        assert_eq!(fetched.text_content().get(), "Edited");
        assert_eq!(fetched.comments(), [comment]);
        assert_eq!(fetched.interactions(), [interaction]);
    }

    #[tokio::test]
    async fn comments_on_a_deleted_post_are_not_found() {
        let app = TestApp::new();
        let jane = app.register("jane@example.com").await;
        let post = create_post(&app, jane.user_profile_id, "Post").await;

        app.mediator
            .send(DeletePostCommand {
                post_id: post.id(),
                user_profile_id: jane.user_profile_id,
            })
            .await
            .into_result()
            .unwrap();

        let comment = app
            .mediator
            .send(AddPostCommentCommand {
                post_id: post.id(),
                user_profile_id: jane.user_profile_id,
                text: "Too late".to_owned(),
            })
            .await;
        assert_eq!(comment.errors()[0].code, ErrorCode::NotFound);

        let interaction = app
            .mediator
            .send(AddPostInteractionCommand {
                post_id: post.id(),
                user_profile_id: jane.user_profile_id,
                interaction_type: InteractionType::Like,
            })
            .await;
        assert_eq!(interaction.errors()[0].code, ErrorCode::NotFound);

        let fetched = app
            .mediator
            .send(GetPostByIdQuery { post_id: post.id() })
            .await;
        assert_eq!(fetched.errors()[0].code, ErrorCode::NotFound);
    }
}
