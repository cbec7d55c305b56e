use crate::server::ServerError;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::TypedHeader;
use cwksocial_common::model::{
    Id, auth::TokenService, identity::IdentityMarker, user_profile::UserProfileMarker,
};
use headers::{Authorization, authorization::Bearer};
use std::{hash::Hash, sync::Arc};

type AuthorizationHeader = TypedHeader<Authorization<Bearer>>;

/// The caller, as named by a valid bearer token.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct AuthenticatedUser {
    identity_id: Id<IdentityMarker>,
    user_profile_id: Id<UserProfileMarker>,
}

impl AuthenticatedUser {
    #[must_use]
    pub fn identity_id(self) -> Id<IdentityMarker> {
        self.identity_id
    }

    #[must_use]
    pub fn user_profile_id(self) -> Id<UserProfileMarker> {
        self.user_profile_id
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = AuthorizationHeader::from_request_parts(parts, state)
            .await
            .map_err(ServerError::InvalidAuthorizationHeader)?;

        let claims = Arc::<TokenService>::from_ref(state).validate(header.token())?;

        Ok(Self {
            identity_id: claims.identity_id,
            user_profile_id: claims.user_profile_id,
        })
    }
}
