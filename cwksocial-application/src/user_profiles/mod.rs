//! Profile management for registered identities.

mod handlers;

pub use handlers::{
    CreateUserProfileHandler, DeleteUserProfileHandler, GetAllUserProfilesHandler,
    GetUserProfileByIdHandler, UpdateUserProfileBasicInfoHandler,
};

use crate::mediator::Request;
use cwksocial_common::model::{
    Id,
    identity::IdentityMarker,
    user_profile::{BasicInfo, InvalidBasicInfoError, UserProfile, UserProfileMarker},
};
use time::Date;

/// Unvalidated basic info as submitted by a client.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct BasicInfoFields {
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub phone_number: String,
    pub date_of_birth: Date,
    pub current_city: String,
}

impl TryFrom<BasicInfoFields> for BasicInfo {
    type Error = InvalidBasicInfoError;

    fn try_from(fields: BasicInfoFields) -> Result<Self, Self::Error> {
        BasicInfo::new(
            fields.first_name,
            fields.last_name,
            fields.email_address,
            fields.phone_number,
            fields.date_of_birth,
            fields.current_city,
        )
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct GetAllUserProfilesQuery;

impl Request for GetAllUserProfilesQuery {
    type Response = Vec<UserProfile>;
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct GetUserProfileByIdQuery {
    pub user_profile_id: Id<UserProfileMarker>,
}

impl Request for GetUserProfileByIdQuery {
    type Response = UserProfile;
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct CreateUserProfileCommand {
    pub identity_id: Id<IdentityMarker>,
    pub fields: BasicInfoFields,
}

impl Request for CreateUserProfileCommand {
    type Response = UserProfile;
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct UpdateUserProfileBasicInfoCommand {
    pub user_profile_id: Id<UserProfileMarker>,
    pub requested_by: Id<IdentityMarker>,
    pub fields: BasicInfoFields,
}

impl Request for UpdateUserProfileBasicInfoCommand {
    type Response = ();
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct DeleteUserProfileCommand {
    pub user_profile_id: Id<UserProfileMarker>,
    pub requested_by: Id<IdentityMarker>,
}

impl Request for DeleteUserProfileCommand {
    type Response = ();
}
