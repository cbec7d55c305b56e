use crate::{
    build_mediator,
    identity::{IdentityUserProfile, RegisterCommand},
    mediator::Mediator,
    user_profiles::BasicInfoFields,
};
use cwksocial_common::{
    model::auth::{TokenService, TokenSettings},
    util::PositiveDuration,
};
use cwksocial_db::memory::MemoryStore;
use std::sync::Arc;
use time::macros::date;

pub struct TestApp {
    pub tokens: Arc<TokenService>,
    pub mediator: Mediator,
}

impl TestApp {
    pub fn new() -> Self {
        let tokens = Arc::new(TokenService::new(&TokenSettings {
            signing_key: "test signing key that is long enough".to_owned(),
            issuer: "cwksocial".to_owned(),
            audience: "cwksocial".to_owned(),
            lifetime: PositiveDuration::from_seconds(600).unwrap(),
        }));
        let store = Arc::new(MemoryStore::new());
        let mediator = build_mediator(&store, &tokens);

        Self { tokens, mediator }
    }

    pub async fn register(&self, username: &str) -> IdentityUserProfile {
        self.mediator
            .send(register_command(username))
            .await
            .into_result()
            .unwrap()
    }
}

pub fn register_command(username: &str) -> RegisterCommand {
    RegisterCommand {
        username: username.to_owned(),
        password: "Passw0rd!".to_owned(),
        first_name: "Jane".to_owned(),
        last_name: "Doe".to_owned(),
        date_of_birth: date!(1990 - 04 - 12),
        phone_number: "+40 700 000 000".to_owned(),
        current_city: "Cluj".to_owned(),
    }
}

pub fn basic_info_fields(first_name: &str, email_address: &str) -> BasicInfoFields {
    BasicInfoFields {
        first_name: first_name.to_owned(),
        last_name: "Doe".to_owned(),
        email_address: email_address.to_owned(),
        phone_number: "+40 700 000 000".to_owned(),
        date_of_birth: date!(1991 - 02 - 03),
        current_city: "Iasi".to_owned(),
    }
}
