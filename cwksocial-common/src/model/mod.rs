pub mod auth;
pub mod identity;
pub mod post;
pub mod user_profile;

use crate::model::{
    identity::{InvalidPasswordHashError, InvalidUsernameError},
    post::{InvalidInteractionTypeError, InvalidTextContentError},
    user_profile::InvalidBasicInfoError,
};
use derive_where::derive_where;
use std::{
    fmt::{Display, Formatter},
    marker::PhantomData,
    str::FromStr,
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
pub enum ModelValidationError {
    #[error(transparent)]
    Username(#[from] InvalidUsernameError),
    #[error(transparent)]
    PasswordHash(#[from] InvalidPasswordHashError),
    #[error(transparent)]
    BasicInfo(#[from] InvalidBasicInfoError),
    #[error(transparent)]
    TextContent(#[from] InvalidTextContentError),
    #[error(transparent)]
    InteractionType(#[from] InvalidInteractionTypeError),
}

/// A UUID tagged with the kind of entity it identifies.
#[derive_where(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Debug,
    Default,
    Hash,
    Serialize,
    Deserialize
)]
#[serde(transparent)]
pub struct Id<Marker>(Uuid, #[serde(skip)] PhantomData<Marker>);

impl<Marker> Id<Marker> {
    #[must_use]
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid, PhantomData)
    }

    #[must_use]
    pub fn new_random() -> Self {
        Self::new(Uuid::new_v4())
    }

    #[must_use]
    pub fn uuid(self) -> Uuid {
        self.0
    }
}

impl<Marker> Display for Id<Marker> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<Marker> FromStr for Id<Marker> {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self::new)
    }
}

impl<Marker> From<Uuid> for Id<Marker> {
    fn from(value: Uuid) -> Self {
        Self::new(value)
    }
}

impl<Marker> From<Id<Marker>> for Uuid {
    fn from(value: Id<Marker>) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{Id, user_profile::UserProfileMarker};
    use uuid::Uuid;

    #[test]
    fn id_serializes_as_plain_uuid() {
        let uuid = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        let id = Id::<UserProfileMarker>::new(uuid);

        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"67e55044-10b1-426f-9247-bb680e5fe0c8\"");

        let parsed: Id<UserProfileMarker> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
        assert_eq!(id.to_string().parse::<Id<UserProfileMarker>>(), Ok(id));
    }

    #[test]
    fn random_ids_differ() {
        assert_ne!(
            Id::<UserProfileMarker>::new_random(),
            Id::<UserProfileMarker>::new_random()
        );
    }
}
