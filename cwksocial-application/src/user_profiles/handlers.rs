use crate::{
    mediator::RequestHandler,
    operation::{Error, ErrorCode, OperationResult},
    user_profiles::{
        CreateUserProfileCommand, DeleteUserProfileCommand, GetAllUserProfilesQuery,
        GetUserProfileByIdQuery, UpdateUserProfileBasicInfoCommand,
    },
};
use async_trait::async_trait;
use cwksocial_common::model::{
    Id,
    identity::IdentityMarker,
    user_profile::{BasicInfo, UserProfile, UserProfileMarker},
};
use cwksocial_db::store::{IdentityStore, UserProfileStore};
use std::sync::Arc;
use tracing::info;

fn profile_not_found(user_profile_id: Id<UserProfileMarker>) -> Error {
    Error::not_found(format!("No UserProfile found with ID {user_profile_id}"))
}

/// Loads the profile and checks that `requested_by` owns it.
async fn fetch_owned_profile<S: UserProfileStore>(
    store: &S,
    user_profile_id: Id<UserProfileMarker>,
    requested_by: Id<IdentityMarker>,
) -> Result<UserProfile, Error> {
    let profile = store
        .fetch_user_profile(user_profile_id)
        .await?
        .ok_or_else(|| profile_not_found(user_profile_id))?;

    if profile.identity_id != requested_by {
        return Err(Error::new(
            ErrorCode::ProfileModificationNotAllowed,
            "Only the owner of a profile can modify it",
        ));
    }

    Ok(profile)
}

pub struct GetAllUserProfilesHandler<S> {
    store: Arc<S>,
}

impl<S> GetAllUserProfilesHandler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: UserProfileStore + 'static> RequestHandler<GetAllUserProfilesQuery>
    for GetAllUserProfilesHandler<S>
{
    async fn handle(&self, _request: GetAllUserProfilesQuery) -> OperationResult<Vec<UserProfile>> {
        self.store
            .fetch_user_profiles()
            .await
            .map_err(Error::from)
            .into()
    }
}

pub struct GetUserProfileByIdHandler<S> {
    store: Arc<S>,
}

impl<S> GetUserProfileByIdHandler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S: UserProfileStore> GetUserProfileByIdHandler<S> {
    async fn get(&self, request: GetUserProfileByIdQuery) -> Result<UserProfile, Error> {
        self.store
            .fetch_user_profile(request.user_profile_id)
            .await?
            .ok_or_else(|| profile_not_found(request.user_profile_id))
    }
}

#[async_trait]
impl<S: UserProfileStore + 'static> RequestHandler<GetUserProfileByIdQuery>
    for GetUserProfileByIdHandler<S>
{
    async fn handle(&self, request: GetUserProfileByIdQuery) -> OperationResult<UserProfile> {
        self.get(request).await.into()
    }
}

pub struct CreateUserProfileHandler<S> {
    store: Arc<S>,
}

impl<S> CreateUserProfileHandler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S: IdentityStore + UserProfileStore> CreateUserProfileHandler<S> {
    async fn create(&self, request: CreateUserProfileCommand) -> Result<UserProfile, Error> {
        let basic_info = BasicInfo::try_from(request.fields)?;

        let identity = self.store.fetch_identity(request.identity_id).await?;
        if identity.is_none() {
            return Err(Error::not_found(format!(
                "No identity found with ID {}",
                request.identity_id
            )));
        }

        let profile = UserProfile::create(request.identity_id, basic_info);
        self.store.insert_user_profile(&profile).await?;

        info!(
            user_profile_id = %profile.id,
            identity_id = %profile.identity_id,
            "Created user profile"
        );
        Ok(profile)
    }
}

#[async_trait]
impl<S: IdentityStore + UserProfileStore + 'static> RequestHandler<CreateUserProfileCommand>
    for CreateUserProfileHandler<S>
{
    async fn handle(&self, request: CreateUserProfileCommand) -> OperationResult<UserProfile> {
        self.create(request).await.into()
    }
}

pub struct UpdateUserProfileBasicInfoHandler<S> {
    store: Arc<S>,
}

impl<S> UpdateUserProfileBasicInfoHandler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S: UserProfileStore> UpdateUserProfileBasicInfoHandler<S> {
    async fn update(&self, request: UpdateUserProfileBasicInfoCommand) -> Result<(), Error> {
        let mut profile =
            fetch_owned_profile(&*self.store, request.user_profile_id, request.requested_by)
                .await?;

        profile.update_basic_info(BasicInfo::try_from(request.fields)?);
        if !self.store.update_user_profile(&profile).await? {
            return Err(profile_not_found(profile.id));
        }
        Ok(())
    }
}

#[async_trait]
impl<S: UserProfileStore + 'static> RequestHandler<UpdateUserProfileBasicInfoCommand>
    for UpdateUserProfileBasicInfoHandler<S>
{
    async fn handle(&self, request: UpdateUserProfileBasicInfoCommand) -> OperationResult<()> {
        self.update(request).await.into()
    }
}

pub struct DeleteUserProfileHandler<S> {
    store: Arc<S>,
}

impl<S> DeleteUserProfileHandler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S: UserProfileStore> DeleteUserProfileHandler<S> {
    async fn delete(&self, request: DeleteUserProfileCommand) -> Result<(), Error> {
        let profile =
            fetch_owned_profile(&*self.store, request.user_profile_id, request.requested_by)
                .await?;

        // Another request may have removed it between the two calls.
        if !self.store.delete_user_profile(profile.id).await? {
            return Err(profile_not_found(profile.id));
        }

        info!(user_profile_id = %profile.id, "Deleted user profile");
        Ok(())
    }
}

#[async_trait]
impl<S: UserProfileStore + 'static> RequestHandler<DeleteUserProfileCommand>
    for DeleteUserProfileHandler<S>
{
    async fn handle(&self, request: DeleteUserProfileCommand) -> OperationResult<()> {
        self.delete(request).await.into()
    }
}
