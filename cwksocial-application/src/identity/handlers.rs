use crate::{
    identity::{
        GetCurrentUserQuery, IdentityUserProfile, LoginCommand, RegisterCommand,
        RemoveAccountCommand,
    },
    mediator::RequestHandler,
    operation::{Error, ErrorCode, OperationResult},
};
use async_trait::async_trait;
use cwksocial_common::model::{
    auth::TokenService,
    identity::{IdentityUser, Username, validate_password},
    user_profile::{BasicInfo, UserProfile},
};
use cwksocial_db::store::{IdentityStore, UserProfileStore};
use std::sync::Arc;
use tracing::{info, warn};

const IDENTITY_USER_DOES_NOT_EXIST: &str = "Unable to find a user with the specified username";
const INCORRECT_PASSWORD: &str = "The provided password is incorrect. Login failed";

fn identity_user_does_not_exist() -> Error {
    Error::new(
        ErrorCode::IdentityUserDoesNotExist,
        IDENTITY_USER_DOES_NOT_EXIST,
    )
}

pub struct RegisterHandler<S> {
    store: Arc<S>,
    tokens: Arc<TokenService>,
}

impl<S> RegisterHandler<S> {
    pub fn new(store: Arc<S>, tokens: Arc<TokenService>) -> Self {
        Self { store, tokens }
    }
}

impl<S: IdentityStore> RegisterHandler<S> {
    async fn register(&self, request: RegisterCommand) -> Result<IdentityUserProfile, Error> {
        let username = Username::new(request.username)?;

        if self
            .store
            .fetch_identity_by_username(&username)
            .await?
            .is_some()
        {
            return Err(Error::new(
                ErrorCode::IdentityUserAlreadyExists,
                format!("Provided username {} is already taken", username.get()),
            ));
        }

        validate_password(&request.password)?;
        let basic_info = BasicInfo::new(
            request.first_name,
            request.last_name,
            username.get().to_owned(),
            request.phone_number,
            request.date_of_birth,
            request.current_city,
        )?;

        let identity = IdentityUser::register(username, &request.password)?;
        let profile = UserProfile::create(identity.id, basic_info);
        self.store.create_account(&identity, &profile).await?;

        let token = self.tokens.issue(&identity, &profile)?;
        info!(identity_id = %identity.id, user_profile_id = %profile.id, "Registered new identity");

        Ok(IdentityUserProfile::new(identity, profile, Some(token)))
    }
}

#[async_trait]
impl<S: IdentityStore + 'static> RequestHandler<RegisterCommand> for RegisterHandler<S> {
    async fn handle(&self, request: RegisterCommand) -> OperationResult<IdentityUserProfile> {
        self.register(request).await.into()
    }
}

pub struct LoginHandler<S> {
    store: Arc<S>,
    tokens: Arc<TokenService>,
}

impl<S> LoginHandler<S> {
    pub fn new(store: Arc<S>, tokens: Arc<TokenService>) -> Self {
        Self { store, tokens }
    }
}

impl<S: IdentityStore + UserProfileStore> LoginHandler<S> {
    async fn validate_and_get_identity(
        &self,
        request: &LoginCommand,
    ) -> Result<IdentityUser, Error> {
        // A malformed username cannot belong to anyone.
        let username =
            Username::new(request.username.clone()).map_err(|_| identity_user_does_not_exist())?;

        let identity = self
            .store
            .fetch_identity_by_username(&username)
            .await?
            .ok_or_else(identity_user_does_not_exist)?;

        if !identity.password_hash.verify(&request.password)? {
            warn!(identity_id = %identity.id, "Rejected login with incorrect password");
            return Err(Error::new(ErrorCode::IncorrectPassword, INCORRECT_PASSWORD));
        }

        Ok(identity)
    }

    async fn login(&self, request: LoginCommand) -> Result<IdentityUserProfile, Error> {
        let identity = self.validate_and_get_identity(&request).await?;

        let profile = self
            .store
            .fetch_user_profile_by_identity(identity.id)
            .await?
            .ok_or_else(|| {
                Error::not_found(format!("No UserProfile for identity {}", identity.id))
            })?;

        let token = self.tokens.issue(&identity, &profile)?;
        Ok(IdentityUserProfile::new(identity, profile, Some(token)))
    }
}

#[async_trait]
impl<S: IdentityStore + UserProfileStore + 'static> RequestHandler<LoginCommand>
    for LoginHandler<S>
{
    async fn handle(&self, request: LoginCommand) -> OperationResult<IdentityUserProfile> {
        self.login(request).await.into()
    }
}

pub struct RemoveAccountHandler<S> {
    store: Arc<S>,
}

impl<S> RemoveAccountHandler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S: IdentityStore> RemoveAccountHandler<S> {
    async fn remove_account(&self, request: RemoveAccountCommand) -> Result<(), Error> {
        if request.identity_id != request.requested_by {
            return Err(Error::new(
                ErrorCode::UnauthorizedAccountRemoval,
                "Cannot remove account as you are not its owner",
            ));
        }

        if !self.store.remove_account(request.identity_id).await? {
            return Err(identity_user_does_not_exist());
        }

        info!(identity_id = %request.identity_id, "Removed account");
        Ok(())
    }
}

#[async_trait]
impl<S: IdentityStore + 'static> RequestHandler<RemoveAccountCommand> for RemoveAccountHandler<S> {
    async fn handle(&self, request: RemoveAccountCommand) -> OperationResult<()> {
        self.remove_account(request).await.into()
    }
}

pub struct GetCurrentUserHandler<S> {
    store: Arc<S>,
}

impl<S> GetCurrentUserHandler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S: IdentityStore + UserProfileStore> GetCurrentUserHandler<S> {
    async fn current_user(
        &self,
        request: GetCurrentUserQuery,
    ) -> Result<IdentityUserProfile, Error> {
        let identity = self
            .store
            .fetch_identity(request.identity_id)
            .await?
            .ok_or_else(|| {
                Error::not_found(format!("No identity with ID {}", request.identity_id))
            })?;

        let profile = self
            .store
            .fetch_user_profile(request.user_profile_id)
            .await?
            .filter(|profile| profile.identity_id == identity.id)
            .ok_or_else(|| {
                Error::not_found(format!(
                    "No UserProfile with ID {}",
                    request.user_profile_id
                ))
            })?;

        Ok(IdentityUserProfile::new(identity, profile, None))
    }
}

#[async_trait]
impl<S: IdentityStore + UserProfileStore + 'static> RequestHandler<GetCurrentUserQuery>
    for GetCurrentUserHandler<S>
{
    async fn handle(&self, request: GetCurrentUserQuery) -> OperationResult<IdentityUserProfile> {
        self.current_user(request).await.into()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        identity::{GetCurrentUserQuery, LoginCommand, RemoveAccountCommand},
        operation::ErrorCode,
        test_support::{TestApp, register_command},
    };
    use cwksocial_common::model::Id;

    #[tokio::test]
    async fn registration_returns_token_and_echoes_profile() {
        let app = TestApp::new();

        let registered = app
            .mediator
            .send(register_command("jane@example.com"))
            .await
            .into_result()
            .unwrap();

        let token = registered.token.clone().unwrap();
        assert!(!token.as_str().is_empty());
        assert_eq!(registered.username.get(), "jane@example.com");
        assert_eq!(registered.basic_info.first_name.get(), "Jane");
        assert_eq!(registered.basic_info.last_name.get(), "Doe");
        assert_eq!(registered.basic_info.email_address.get(), "jane@example.com");
        assert_eq!(registered.basic_info.current_city, "Cluj");

        let claims = app.tokens.validate(token.as_str()).unwrap();
        assert_eq!(claims.identity_id, registered.identity_id);
        assert_eq!(claims.user_profile_id, registered.user_profile_id);
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let app = TestApp::new();
        app.register("jane@example.com").await;

        let result = app.mediator.send(register_command("jane@example.com")).await;

        assert_eq!(
            result.errors()[0].code,
            ErrorCode::IdentityUserAlreadyExists
        );
    }

    #[tokio::test]
    async fn registration_validates_input() {
        let app = TestApp::new();

        let mut command = register_command("jane@example.com");
        command.first_name = "  ".to_owned();
        let result = app.mediator.send(command).await;
        assert_eq!(result.errors()[0].code, ErrorCode::ValidationError);

        let mut command = register_command("jane@example.com");
        command.password = "123".to_owned();
        let result = app.mediator.send(command).await;
        assert_eq!(result.errors()[0].code, ErrorCode::ValidationError);

        let result = app.mediator.send(register_command("not-an-email")).await;
        assert_eq!(result.errors()[0].code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn login_succeeds_with_correct_credentials() {
        let app = TestApp::new();
        let registered = app.register("jane@example.com").await;

        let logged_in = app
            .mediator
            .send(LoginCommand {
                username: "jane@example.com".to_owned(),
                password: "Passw0rd!".to_owned(),
            })
            .await
            .into_result()
            .unwrap();

        assert_eq!(logged_in.user_profile_id, registered.user_profile_id);
        assert!(logged_in.token.is_some());
    }

    #[tokio::test]
    async fn login_with_unknown_username_stops_early() {
        let app = TestApp::new();

        let result = app
            .mediator
            .send(LoginCommand {
                username: "nobody@example.com".to_owned(),
                password: "whatever".to_owned(),
            })
            .await;

        assert_eq!(result.errors().len(), 1);
        assert_eq!(
            result.errors()[0].code,
            ErrorCode::IdentityUserDoesNotExist
        );
    }

    #[tokio::test]
    async fn login_with_wrong_password_fails() {
        let app = TestApp::new();
        app.register("jane@example.com").await;

        let result = app
            .mediator
            .send(LoginCommand {
                username: "jane@example.com".to_owned(),
                password: "wrong password".to_owned(),
            })
            .await;

        assert_eq!(result.errors()[0].code, ErrorCode::IncorrectPassword);
    }

    #[tokio::test]
    async fn remove_account_only_by_owner() {
        let app = TestApp::new();
        let jane = app.register("jane@example.com").await;

        let result = app
            .mediator
            .send(RemoveAccountCommand {
                identity_id: jane.identity_id,
                requested_by: Id::new_random(),
            })
            .await;
        assert_eq!(
            result.errors()[0].code,
            ErrorCode::UnauthorizedAccountRemoval
        );

        let removal = RemoveAccountCommand {
            identity_id: jane.identity_id,
            requested_by: jane.identity_id,
        };
        assert!(!app.mediator.send(removal).await.is_error());

        let again = app.mediator.send(removal).await;
        assert_eq!(
            again.errors()[0].code,
            ErrorCode::IdentityUserDoesNotExist
        );

        let current = app
            .mediator
            .send(GetCurrentUserQuery {
                identity_id: jane.identity_id,
                user_profile_id: jane.user_profile_id,
            })
            .await;
        assert_eq!(current.errors()[0].code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn current_user_has_no_token() {
        let app = TestApp::new();
        let jane = app.register("jane@example.com").await;

        let current = app
            .mediator
            .send(GetCurrentUserQuery {
                identity_id: jane.identity_id,
                user_profile_id: jane.user_profile_id,
            })
            .await
            .into_result()
            .unwrap();

        assert_eq!(current.username, jane.username);
        assert_eq!(current.basic_info, jane.basic_info);
        assert_eq!(current.token, None);
    }
}
