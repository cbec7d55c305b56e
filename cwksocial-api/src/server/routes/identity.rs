use crate::server::{Result, ServerError, ServerRouter, auth::AuthenticatedUser, json::Json};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use cwksocial_application::{
    identity::{
        GetCurrentUserQuery, IdentityUserProfile, LoginCommand, RegisterCommand,
        RemoveAccountCommand,
    },
    mediator::Mediator,
};
use cwksocial_common::{
    model::{
        Id,
        identity::{IdentityMarker, Username},
        user_profile::{EmailAddress, PersonName, UserProfileMarker},
    },
    util::iso_date,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::Date;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_post(register)
        .typed_post(login)
        .typed_delete(remove_account)
        .typed_get(current_user)
}

#[derive(Clone, Eq, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistrationRequest {
    username: String,
    password: String,
    first_name: String,
    last_name: String,
    #[serde(with = "iso_date")]
    date_of_birth: Date,
    phone_number: String,
    current_city: String,
}

impl From<RegistrationRequest> for RegisterCommand {
    fn from(request: RegistrationRequest) -> Self {
        Self {
            username: request.username,
            password: request.password,
            first_name: request.first_name,
            last_name: request.last_name,
            date_of_birth: request.date_of_birth,
            phone_number: request.phone_number,
            current_city: request.current_city,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IdentityUserResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    identity_id: Id<IdentityMarker>,
    username: Username,
    user_profile_id: Id<UserProfileMarker>,
    first_name: PersonName,
    last_name: PersonName,
    email_address: EmailAddress,
    phone_number: String,
    #[serde(with = "iso_date")]
    date_of_birth: Date,
    current_city: String,
}

impl From<IdentityUserProfile> for IdentityUserResponse {
    fn from(user: IdentityUserProfile) -> Self {
        let basic_info = user.basic_info;

        Self {
            token: user.token.map(|token| token.into_inner()),
            identity_id: user.identity_id,
            username: user.username,
            user_profile_id: user.user_profile_id,
            first_name: basic_info.first_name,
            last_name: basic_info.last_name,
            email_address: basic_info.email_address,
            phone_number: basic_info.phone_number,
            date_of_birth: basic_info.date_of_birth,
            current_city: basic_info.current_city,
        }
    }
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/identity/registration", rejection(ServerError))]
struct RegistrationPath();

async fn register(
    RegistrationPath(): RegistrationPath,
    State(mediator): State<Arc<Mediator>>,
    Json(request): Json<RegistrationRequest>,
) -> Result<Json<IdentityUserResponse>> {
    let user = mediator
        .send(RegisterCommand::from(request))
        .await
        .into_result()?;

    Ok(Json(user.into()))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/identity/login", rejection(ServerError))]
struct LoginPath();

async fn login(
    LoginPath(): LoginPath,
    State(mediator): State<Arc<Mediator>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<IdentityUserResponse>> {
    let user = mediator
        .send(LoginCommand {
            username: request.username,
            password: request.password,
        })
        .await
        .into_result()?;

    Ok(Json(user.into()))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/identity/account", rejection(ServerError))]
struct AccountPath();

async fn remove_account(
    AccountPath(): AccountPath,
    State(mediator): State<Arc<Mediator>>,
    user: AuthenticatedUser,
) -> Result<StatusCode> {
    mediator
        .send(RemoveAccountCommand {
            identity_id: user.identity_id(),
            requested_by: user.identity_id(),
        })
        .await
        .into_result()?;

    Ok(StatusCode::OK)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/identity/current", rejection(ServerError))]
struct CurrentUserPath();

async fn current_user(
    CurrentUserPath(): CurrentUserPath,
    State(mediator): State<Arc<Mediator>>,
    user: AuthenticatedUser,
) -> Result<Json<IdentityUserResponse>> {
    let user = mediator
        .send(GetCurrentUserQuery {
            identity_id: user.identity_id(),
            user_profile_id: user.user_profile_id(),
        })
        .await
        .into_result()?;

    Ok(Json(user.into()))
}
