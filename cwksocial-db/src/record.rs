use cwksocial_common::model::{
    ModelValidationError,
    identity::{IdentityUser, Username},
    post::{PostComment, PostHeader, PostInteraction, TextContent},
    user_profile::{BasicInfo, UserProfile},
};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct IdentityUserRecord {
    pub identity_id: Uuid,
    pub username: String,
    pub password_hash: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct UserProfileRecord {
    pub user_profile_id: Uuid,
    pub identity_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub phone_number: String,
    pub date_of_birth: Date,
    pub current_city: String,
    pub date_created: OffsetDateTime,
    pub last_modified: OffsetDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct PostRecord {
    pub post_id: Uuid,
    pub user_profile_id: Uuid,
    pub text_content: String,
    pub created_date: OffsetDateTime,
    pub last_modified: OffsetDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct PostCommentRecord {
    pub comment_id: Uuid,
    pub post_id: Uuid,
    pub user_profile_id: Uuid,
    pub text: String,
    pub created_date: OffsetDateTime,
    pub last_modified: OffsetDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct PostInteractionRecord {
    pub interaction_id: Uuid,
    pub post_id: Uuid,
    pub user_profile_id: Uuid,
    pub interaction_type: String,
}

impl TryFrom<IdentityUserRecord> for IdentityUser {
    type Error = ModelValidationError;

    fn try_from(value: IdentityUserRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.identity_id.into(),
            username: Username::new(value.username)?,
            password_hash: value.password_hash.try_into()?,
        })
    }
}

impl TryFrom<UserProfileRecord> for UserProfile {
    type Error = ModelValidationError;

    fn try_from(value: UserProfileRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.user_profile_id.into(),
            identity_id: value.identity_id.into(),
            basic_info: BasicInfo::new(
                value.first_name,
                value.last_name,
                value.email_address,
                value.phone_number,
                value.date_of_birth,
                value.current_city,
            )?,
            date_created: value.date_created,
            last_modified: value.last_modified,
        })
    }
}

impl TryFrom<PostRecord> for PostHeader {
    type Error = ModelValidationError;

    fn try_from(value: PostRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.post_id.into(),
            user_profile_id: value.user_profile_id.into(),
            text_content: TextContent::new(value.text_content)?,
            created_date: value.created_date,
            last_modified: value.last_modified,
        })
    }
}

impl TryFrom<PostCommentRecord> for PostComment {
    type Error = ModelValidationError;

    fn try_from(value: PostCommentRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.comment_id.into(),
            post_id: value.post_id.into(),
            user_profile_id: value.user_profile_id.into(),
            text: TextContent::new(value.text)?,
            created_date: value.created_date,
            last_modified: value.last_modified,
        })
    }
}

impl TryFrom<PostInteractionRecord> for PostInteraction {
    type Error = ModelValidationError;

    fn try_from(value: PostInteractionRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.interaction_id.into(),
            post_id: value.post_id.into(),
            user_profile_id: value.user_profile_id.into(),
            interaction_type: value.interaction_type.parse()?,
        })
    }
}
