use crate::server::{
    Result, ServerError, ServerRouter,
    auth::AuthenticatedUser,
    json::{Created, Json},
};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use cwksocial_application::{
    mediator::Mediator,
    user_profiles::{
        BasicInfoFields, CreateUserProfileCommand, DeleteUserProfileCommand,
        GetAllUserProfilesQuery, GetUserProfileByIdQuery, UpdateUserProfileBasicInfoCommand,
    },
};
use cwksocial_common::{
    model::{
        Id,
        user_profile::{BasicInfo, EmailAddress, PersonName, UserProfile, UserProfileMarker},
    },
    util::iso_date,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::{Date, OffsetDateTime};

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(get_all_profiles)
        .typed_post(create_profile)
        .typed_get(get_profile)
        .typed_put(update_profile)
        .typed_delete(delete_profile)
}

#[derive(Clone, Eq, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserProfileCreateUpdate {
    first_name: String,
    last_name: String,
    email_address: String,
    phone_number: String,
    #[serde(with = "iso_date")]
    date_of_birth: Date,
    current_city: String,
}

impl From<UserProfileCreateUpdate> for BasicInfoFields {
    fn from(request: UserProfileCreateUpdate) -> Self {
        Self {
            first_name: request.first_name,
            last_name: request.last_name,
            email_address: request.email_address,
            phone_number: request.phone_number,
            date_of_birth: request.date_of_birth,
            current_city: request.current_city,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BasicInfoResponse {
    first_name: PersonName,
    last_name: PersonName,
    email_address: EmailAddress,
    phone_number: String,
    #[serde(with = "iso_date")]
    date_of_birth: Date,
    current_city: String,
}

impl From<BasicInfo> for BasicInfoResponse {
    fn from(basic_info: BasicInfo) -> Self {
        Self {
            first_name: basic_info.first_name,
            last_name: basic_info.last_name,
            email_address: basic_info.email_address,
            phone_number: basic_info.phone_number,
            date_of_birth: basic_info.date_of_birth,
            current_city: basic_info.current_city,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserProfileResponse {
    user_profile_id: Id<UserProfileMarker>,
    basic_info: BasicInfoResponse,
    #[serde(with = "time::serde::rfc3339")]
    date_created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    last_modified: OffsetDateTime,
}

impl From<UserProfile> for UserProfileResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            user_profile_id: profile.id,
            basic_info: profile.basic_info.into(),
            date_created: profile.date_created,
            last_modified: profile.last_modified,
        }
    }
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/userprofiles", rejection(ServerError))]
struct UserProfilesPath();

async fn get_all_profiles(
    UserProfilesPath(): UserProfilesPath,
    State(mediator): State<Arc<Mediator>>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<UserProfileResponse>>> {
    let profiles = mediator.send(GetAllUserProfilesQuery).await.into_result()?;

    Ok(Json(profiles.into_iter().map(Into::into).collect()))
}

async fn create_profile(
    UserProfilesPath(): UserProfilesPath,
    State(mediator): State<Arc<Mediator>>,
    user: AuthenticatedUser,
    Json(profile): Json<UserProfileCreateUpdate>,
) -> Result<Created<UserProfileResponse>> {
    let profile = mediator
        .send(CreateUserProfileCommand {
            identity_id: user.identity_id(),
            fields: profile.into(),
        })
        .await
        .into_result()?;

    Ok(Created(profile.into()))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/userprofiles/{id}", rejection(ServerError))]
struct UserProfilePath {
    id: Id<UserProfileMarker>,
}

async fn get_profile(
    UserProfilePath { id }: UserProfilePath,
    State(mediator): State<Arc<Mediator>>,
    _user: AuthenticatedUser,
) -> Result<Json<UserProfileResponse>> {
    let profile = mediator
        .send(GetUserProfileByIdQuery {
            user_profile_id: id,
        })
        .await
        .into_result()?;

    Ok(Json(profile.into()))
}

async fn update_profile(
    UserProfilePath { id }: UserProfilePath,
    State(mediator): State<Arc<Mediator>>,
    user: AuthenticatedUser,
    Json(profile): Json<UserProfileCreateUpdate>,
) -> Result<StatusCode> {
    mediator
        .send(UpdateUserProfileBasicInfoCommand {
            user_profile_id: id,
            requested_by: user.identity_id(),
            fields: profile.into(),
        })
        .await
        .into_result()?;

    Ok(StatusCode::OK)
}

async fn delete_profile(
    UserProfilePath { id }: UserProfilePath,
    State(mediator): State<Arc<Mediator>>,
    user: AuthenticatedUser,
) -> Result<StatusCode> {
    mediator
        .send(DeleteUserProfileCommand {
            user_profile_id: id,
            requested_by: user.identity_id(),
        })
        .await
        .into_result()?;

    Ok(StatusCode::OK)
}
