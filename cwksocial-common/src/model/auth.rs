use crate::{
    model::{
        Id,
        identity::{IdentityMarker, IdentityUser},
        user_profile::{UserProfile, UserProfileMarker},
    },
    util::PositiveDuration,
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Signing auth token failed: {0}")]
    Sign(jsonwebtoken::errors::Error),
    #[error("The auth token was rejected: {0}")]
    Rejected(jsonwebtoken::errors::Error),
}

/// Claims carried by every issued token.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub jti: Uuid,
    pub email: String,
    pub identity_id: Id<IdentityMarker>,
    pub user_profile_id: Id<UserProfileMarker>,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

#[derive(Clone, Eq, PartialEq, Hash)]
pub struct AuthToken(String);

impl AuthToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Debug for AuthToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AuthToken").field(&"[redacted]").finish()
    }
}

#[derive(Clone, Eq, PartialEq, Hash)]
pub struct TokenSettings {
    pub signing_key: String,
    pub issuer: String,
    pub audience: String,
    pub lifetime: PositiveDuration,
}

impl Debug for TokenSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("signing_key", &"[redacted]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

/// Issues and validates HS256-signed JWTs.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    lifetime: PositiveDuration,
}

impl TokenService {
    #[must_use]
    pub fn new(settings: &TokenSettings) -> Self {
        let secret = settings.signing_key.as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&settings.issuer]);
        validation.set_audience(&[&settings.audience]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            issuer: settings.issuer.clone(),
            audience: settings.audience.clone(),
            lifetime: settings.lifetime,
        }
    }

    pub fn issue(
        &self,
        identity: &IdentityUser,
        profile: &UserProfile,
    ) -> Result<AuthToken, TokenError> {
        self.issue_at(identity, profile, OffsetDateTime::now_utc())
    }

    pub fn issue_at(
        &self,
        identity: &IdentityUser,
        profile: &UserProfile,
        issued_at: OffsetDateTime,
    ) -> Result<AuthToken, TokenError> {
        let claims = Claims {
            sub: identity.username.get().to_owned(),
            jti: Uuid::new_v4(),
            email: identity.username.get().to_owned(),
            identity_id: identity.id,
            user_profile_id: profile.id,
            iat: issued_at.unix_timestamp(),
            exp: (issued_at + self.lifetime.get()).unix_timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map(AuthToken)
            .map_err(TokenError::Sign)
    }

    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Rejected)
    }
}

impl Debug for TokenService {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("keys", &"[redacted]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        model::{
            Id,
            auth::{TokenError, TokenService, TokenSettings},
            identity::{HashedPassword, IdentityUser, Username},
            user_profile::{BasicInfo, UserProfile},
        },
        util::PositiveDuration,
    };
    use time::{Duration, OffsetDateTime, macros::date};

    fn settings(signing_key: &str) -> TokenSettings {
        TokenSettings {
            signing_key: signing_key.to_owned(),
            issuer: "cwksocial".to_owned(),
            audience: "cwksocial".to_owned(),
            lifetime: PositiveDuration::from_seconds(7200).unwrap(),
        }
    }

    fn identity_with_profile() -> (IdentityUser, UserProfile) {
        let identity = IdentityUser {
            id: Id::new_random(),
            username: Username::new("jane@example.com".to_owned()).unwrap(),
            password_hash: HashedPassword::generate("pw").unwrap(),
        };
        let basic_info = BasicInfo::new(
            "Jane".to_owned(),
            "Doe".to_owned(),
            "jane@example.com".to_owned(),
            String::new(),
            date!(1990 - 01 - 01),
            String::new(),
        )
        .unwrap();
        let profile = UserProfile::create(identity.id, basic_info);
        (identity, profile)
    }

    #[test]
    fn issued_token_validates_with_claims() {
        let service = TokenService::new(&settings("secret"));
        let (identity, profile) = identity_with_profile();

        let token = service.issue(&identity, &profile).unwrap();
        let claims = service.validate(token.as_str()).unwrap();

        assert_eq!(claims.sub, "jane@example.com");
        assert_eq!(claims.email, "jane@example.com");
        assert_eq!(claims.identity_id, identity.id);
        assert_eq!(claims.user_profile_id, profile.id);
        assert_eq!(claims.exp - claims.iat, 7200);
        assert_eq!(format!("{token:?}"), "AuthToken(\"[redacted]\")");
    }

    #[test]
    fn each_token_gets_its_own_jti() {
        let service = TokenService::new(&settings("secret"));
        let (identity, profile) = identity_with_profile();

        let first = service.issue(&identity, &profile).unwrap();
        let second = service.issue(&identity, &profile).unwrap();

        assert_ne!(
            service.validate(first.as_str()).unwrap().jti,
            service.validate(second.as_str()).unwrap().jti
        );
    }

    #[test]
    fn expired_or_foreign_tokens_are_rejected() {
        let service = TokenService::new(&settings("secret"));
        let (identity, profile) = identity_with_profile();

        let expired = service
            .issue_at(
                &identity,
                &profile,
                OffsetDateTime::now_utc() - Duration::days(1),
            )
            .unwrap();
        assert!(matches!(
            service.validate(expired.as_str()),
            Err(TokenError::Rejected(_))
        ));

        let foreign = TokenService::new(&settings("other secret"))
            .issue(&identity, &profile)
            .unwrap();
        assert!(service.validate(foreign.as_str()).is_err());
        assert!(service.validate("not a token").is_err());
    }
}
