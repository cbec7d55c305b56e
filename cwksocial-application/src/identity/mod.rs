//! Registration, login and account lifecycle.

mod handlers;

pub use handlers::{GetCurrentUserHandler, LoginHandler, RegisterHandler, RemoveAccountHandler};

use crate::mediator::Request;
use cwksocial_common::model::{
    Id,
    auth::AuthToken,
    identity::{IdentityMarker, IdentityUser, Username},
    user_profile::{BasicInfo, UserProfile, UserProfileMarker},
};
use time::Date;

/// An identity together with its profile, and a token if one was issued.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct IdentityUserProfile {
    pub identity_id: Id<IdentityMarker>,
    pub username: Username,
    pub user_profile_id: Id<UserProfileMarker>,
    pub basic_info: BasicInfo,
    pub token: Option<AuthToken>,
}

impl IdentityUserProfile {
    #[must_use]
    pub fn new(identity: IdentityUser, profile: UserProfile, token: Option<AuthToken>) -> Self {
        Self {
            identity_id: identity.id,
            username: identity.username,
            user_profile_id: profile.id,
            basic_info: profile.basic_info,
            token,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct RegisterCommand {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Date,
    pub phone_number: String,
    pub current_city: String,
}

impl Request for RegisterCommand {
    type Response = IdentityUserProfile;
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct LoginCommand {
    pub username: String,
    pub password: String,
}

impl Request for LoginCommand {
    type Response = IdentityUserProfile;
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct RemoveAccountCommand {
    pub identity_id: Id<IdentityMarker>,
    pub requested_by: Id<IdentityMarker>,
}

impl Request for RemoveAccountCommand {
    type Response = ();
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct GetCurrentUserQuery {
    pub identity_id: Id<IdentityMarker>,
    pub user_profile_id: Id<UserProfileMarker>,
}

impl Request for GetCurrentUserQuery {
    type Response = IdentityUserProfile;
}
