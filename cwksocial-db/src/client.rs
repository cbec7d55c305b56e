use crate::{
    record::{
        IdentityUserRecord, PostCommentRecord, PostInteractionRecord, PostRecord, UserProfileRecord,
    },
    store::{DbError, IdentityStore, PostStore, Result, UserProfileStore},
};
use async_trait::async_trait;
use cwksocial_common::model::{
    Id,
    identity::{IdentityMarker, IdentityUser, Username},
    post::{InteractionMarker, Post, PostComment, PostHeader, PostInteraction, PostMarker},
    user_profile::{UserProfile, UserProfileMarker},
};
use sqlx::{
    PgPool,
    migrate::Migrator,
    postgres::{PgExecutor, PgPoolOptions},
    query, query_as,
};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

static MIGRATOR: Migrator = sqlx::migrate!();

const USER_PROFILE_COLUMNS: &str = "
    user_profile_id,
    identity_id,
    first_name,
    last_name,
    email_address,
    phone_number,
    date_of_birth,
    current_city,
    date_created,
    last_modified
";

#[derive(Clone, Debug)]
pub struct DbClient {
    pool: PgPool,
}

impl DbClient {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<()> {
        info!("Running database migrations");
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

    async fn assemble_posts(&self, records: Vec<PostRecord>) -> Result<Vec<Post>> {
        let post_ids: Vec<Uuid> = records.iter().map(|record| record.post_id).collect();

        let comment_records = query_as::<_, PostCommentRecord>(
            "
            SELECT
                comment_id,
                post_id,
                user_profile_id,
                text,
                created_date,
                last_modified
            FROM
                posts.post_comments
            WHERE
                post_id = ANY($1)
            ORDER BY
                position
            ",
        )
        .bind(post_ids.as_slice())
        .fetch_all(&self.pool)
        .await?;

        let interaction_records = query_as::<_, PostInteractionRecord>(
            "
            SELECT
                interaction_id,
                post_id,
                user_profile_id,
                interaction_type
            FROM
                posts.post_interactions
            WHERE
                post_id = ANY($1)
            ORDER BY
                position
            ",
        )
        .bind(post_ids.as_slice())
        .fetch_all(&self.pool)
        .await?;

        let mut comments: HashMap<Uuid, Vec<PostComment>> = HashMap::new();
        for record in comment_records {
            comments
                .entry(record.post_id)
                .or_default()
                .push(record.try_into()?);
        }

        let mut interactions: HashMap<Uuid, Vec<PostInteraction>> = HashMap::new();
        for record in interaction_records {
            interactions
                .entry(record.post_id)
                .or_default()
                .push(record.try_into()?);
        }

        records
            .into_iter()
            .map(|record| -> Result<Post> {
                let post_id = record.post_id;
                let header = PostHeader::try_from(record)?;
                Ok(Post::restore(
                    header,
                    comments.remove(&post_id).unwrap_or_default(),
                    interactions.remove(&post_id).unwrap_or_default(),
                ))
            })
            .collect()
    }
}

async fn insert_user_profile<'c>(
    executor: impl PgExecutor<'c>,
    profile: &UserProfile,
) -> Result<()> {
    let basic_info = &profile.basic_info;

    query(
        "
        INSERT INTO user_profiles.user_profiles (
            user_profile_id,
            identity_id,
            first_name,
            last_name,
            email_address,
            phone_number,
            date_of_birth,
            current_city,
            date_created,
            last_modified
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ",
    )
    .bind(profile.id.uuid())
    .bind(profile.identity_id.uuid())
    .bind(basic_info.first_name.get())
    .bind(basic_info.last_name.get())
    .bind(basic_info.email_address.get())
    .bind(&basic_info.phone_number)
    .bind(basic_info.date_of_birth)
    .bind(&basic_info.current_city)
    .bind(profile.date_created)
    .bind(profile.last_modified)
    .execute(executor)
    .await?;

    Ok(())
}

async fn insert_comment<'c>(
    executor: impl PgExecutor<'c>,
    comment: &PostComment,
) -> Result<bool> {
    let result = query(
        "
        INSERT INTO posts.post_comments (
            comment_id,
            post_id,
            user_profile_id,
            text,
            created_date,
            last_modified,
            position
        )
        SELECT
            $1, $2, $3, $4, $5, $6,
            (SELECT COALESCE(MAX(position) + 1, 0) FROM posts.post_comments WHERE post_id = $2)
        WHERE
            EXISTS (SELECT 1 FROM posts.posts WHERE post_id = $2)
        ",
    )
    .bind(comment.id.uuid())
    .bind(comment.post_id.uuid())
    .bind(comment.user_profile_id.uuid())
    .bind(comment.text.get())
    .bind(comment.created_date)
    .bind(comment.last_modified)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

async fn insert_interaction<'c>(
    executor: impl PgExecutor<'c>,
    interaction: &PostInteraction,
) -> Result<bool> {
    let result = query(
        "
        INSERT INTO posts.post_interactions (
            interaction_id,
            post_id,
            user_profile_id,
            interaction_type,
            position
        )
        SELECT
            $1, $2, $3, $4,
            (SELECT COALESCE(MAX(position) + 1, 0) FROM posts.post_interactions WHERE post_id = $2)
        WHERE
            EXISTS (SELECT 1 FROM posts.posts WHERE post_id = $2)
        ",
    )
    .bind(interaction.id.uuid())
    .bind(interaction.post_id.uuid())
    .bind(interaction.user_profile_id.uuid())
    .bind(interaction.interaction_type.as_str())
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

fn username_taken(err: sqlx::Error, username: &Username) -> DbError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            DbError::UsernameTaken(username.get().to_owned())
        }
        other => other.into(),
    }
}

#[async_trait]
impl IdentityStore for DbClient {
    async fn fetch_identity(
        &self,
        identity_id: Id<IdentityMarker>,
    ) -> Result<Option<IdentityUser>> {
        let record = query_as::<_, IdentityUserRecord>(
            "
            SELECT
                identity_id,
                username,
                password_hash
            FROM
                identity.identity_users
            WHERE
                identity_id = $1
            ",
        )
        .bind(identity_id.uuid())
        .fetch_optional(&self.pool)
        .await?;

        let identity = record.map(IdentityUser::try_from).transpose()?;
        Ok(identity)
    }

    async fn fetch_identity_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<IdentityUser>> {
        let record = query_as::<_, IdentityUserRecord>(
            "
            SELECT
                identity_id,
                username,
                password_hash
            FROM
                identity.identity_users
            WHERE
                username = $1
            ",
        )
        .bind(username.get())
        .fetch_optional(&self.pool)
        .await?;

        let identity = record.map(IdentityUser::try_from).transpose()?;
        Ok(identity)
    }

    async fn create_account(&self, identity: &IdentityUser, profile: &UserProfile) -> Result<()> {
        let mut transaction = self.pool.begin().await?;

        query(
            "
            INSERT INTO identity.identity_users (identity_id, username, password_hash)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(identity.id.uuid())
        .bind(identity.username.get())
        .bind(identity.password_hash.as_phc_str())
        .execute(&mut *transaction)
        .await
        .map_err(|err| username_taken(err, &identity.username))?;

        insert_user_profile(&mut *transaction, profile).await?;

        transaction.commit().await?;
        debug!(identity_id = %identity.id, user_profile_id = %profile.id, "Created account");
        Ok(())
    }

    async fn remove_account(&self, identity_id: Id<IdentityMarker>) -> Result<bool> {
        // Profiles, posts, comments and interactions go with it via ON DELETE CASCADE.
        let result = query("DELETE FROM identity.identity_users WHERE identity_id = $1")
            .bind(identity_id.uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserProfileStore for DbClient {
    async fn fetch_user_profiles(&self) -> Result<Vec<UserProfile>> {
        let records = query_as::<_, UserProfileRecord>(&format!(
            "SELECT {USER_PROFILE_COLUMNS} FROM user_profiles.user_profiles ORDER BY date_created"
        ))
        .fetch_all(&self.pool)
        .await?;

        let profiles = records
            .into_iter()
            .map(UserProfile::try_from)
            .collect::<Result<_, _>>()?;
        Ok(profiles)
    }

    async fn fetch_user_profile(
        &self,
        user_profile_id: Id<UserProfileMarker>,
    ) -> Result<Option<UserProfile>> {
        let record = query_as::<_, UserProfileRecord>(&format!(
            "SELECT {USER_PROFILE_COLUMNS} FROM user_profiles.user_profiles WHERE user_profile_id = $1"
        ))
        .bind(user_profile_id.uuid())
        .fetch_optional(&self.pool)
        .await?;

        let profile = record.map(UserProfile::try_from).transpose()?;
        Ok(profile)
    }

    async fn fetch_user_profile_by_identity(
        &self,
        identity_id: Id<IdentityMarker>,
    ) -> Result<Option<UserProfile>> {
        let record = query_as::<_, UserProfileRecord>(&format!(
            "
            SELECT {USER_PROFILE_COLUMNS}
            FROM user_profiles.user_profiles
            WHERE identity_id = $1
            ORDER BY date_created
            LIMIT 1
            "
        ))
        .bind(identity_id.uuid())
        .fetch_optional(&self.pool)
        .await?;

        let profile = record.map(UserProfile::try_from).transpose()?;
        Ok(profile)
    }

    async fn insert_user_profile(&self, profile: &UserProfile) -> Result<()> {
        insert_user_profile(&self.pool, profile).await
    }

    async fn update_user_profile(&self, profile: &UserProfile) -> Result<bool> {
        let basic_info = &profile.basic_info;

        let result = query(
            "
            UPDATE user_profiles.user_profiles SET
                first_name = $2,
                last_name = $3,
                email_address = $4,
                phone_number = $5,
                date_of_birth = $6,
                current_city = $7,
                last_modified = $8
            WHERE
                user_profile_id = $1
            ",
        )
        .bind(profile.id.uuid())
        .bind(basic_info.first_name.get())
        .bind(basic_info.last_name.get())
        .bind(basic_info.email_address.get())
        .bind(&basic_info.phone_number)
        .bind(basic_info.date_of_birth)
        .bind(&basic_info.current_city)
        .bind(profile.last_modified)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_user_profile(&self, user_profile_id: Id<UserProfileMarker>) -> Result<bool> {
        let result = query("DELETE FROM user_profiles.user_profiles WHERE user_profile_id = $1")
            .bind(user_profile_id.uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PostStore for DbClient {
    async fn fetch_posts(&self) -> Result<Vec<Post>> {
        let records = query_as::<_, PostRecord>(
            "
            SELECT
                post_id,
                user_profile_id,
                text_content,
                created_date,
                last_modified
            FROM
                posts.posts
            ORDER BY
                created_date
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        self.assemble_posts(records).await
    }

    async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        let record = query_as::<_, PostRecord>(
            "
            SELECT
                post_id,
                user_profile_id,
                text_content,
                created_date,
                last_modified
            FROM
                posts.posts
            WHERE
                post_id = $1
            ",
        )
        .bind(post_id.uuid())
        .fetch_optional(&self.pool)
        .await?;

        let Some(record) = record else {
            return Ok(None);
        };

        Ok(self.assemble_posts(vec![record]).await?.pop())
    }

    async fn insert_post(&self, post: &Post) -> Result<()> {
        let mut transaction = self.pool.begin().await?;

        query(
            "
            INSERT INTO posts.posts (
                post_id,
                user_profile_id,
                text_content,
                created_date,
                last_modified
            )
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(post.id().uuid())
        .bind(post.user_profile_id().uuid())
        .bind(post.text_content().get())
        .bind(post.created_date())
        .bind(post.last_modified())
        .execute(&mut *transaction)
        .await?;

        for comment in post.comments() {
            insert_comment(&mut *transaction, comment).await?;
        }
        for interaction in post.interactions() {
            insert_interaction(&mut *transaction, interaction).await?;
        }

        transaction.commit().await?;
        Ok(())
    }

    async fn update_post_text(&self, post: &Post) -> Result<bool> {
        let result = query(
            "
            UPDATE posts.posts SET
                text_content = $2,
                last_modified = $3
            WHERE
                post_id = $1
            ",
        )
        .bind(post.id().uuid())
        .bind(post.text_content().get())
        .bind(post.last_modified())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_comment(&self, comment: &PostComment) -> Result<bool> {
        insert_comment(&self.pool, comment).await
    }

    async fn insert_interaction(&self, interaction: &PostInteraction) -> Result<bool> {
        insert_interaction(&self.pool, interaction).await
    }

    async fn delete_interaction(
        &self,
        post_id: Id<PostMarker>,
        interaction_id: Id<InteractionMarker>,
    ) -> Result<bool> {
        let result = query(
            "DELETE FROM posts.post_interactions WHERE post_id = $1 AND interaction_id = $2",
        )
        .bind(post_id.uuid())
        .bind(interaction_id.uuid())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_post(&self, post_id: Id<PostMarker>) -> Result<bool> {
        let result = query("DELETE FROM posts.posts WHERE post_id = $1")
            .bind(post_id.uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
