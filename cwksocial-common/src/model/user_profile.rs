use crate::{
    model::{Id, identity::IdentityMarker},
    util::{is_email_address, trimmed_within},
};
use serde::Serialize;
use thiserror::Error;
use time::{Date, OffsetDateTime};

pub const PERSON_NAME_MAX_LEN: usize = 50;
pub const EMAIL_ADDRESS_MAX_LEN: usize = 256;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct UserProfileMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct UserProfile {
    pub id: Id<UserProfileMarker>,
    pub identity_id: Id<IdentityMarker>,
    pub basic_info: BasicInfo,
    pub date_created: OffsetDateTime,
    pub last_modified: OffsetDateTime,
}

impl UserProfile {
    #[must_use]
    pub fn create(identity_id: Id<IdentityMarker>, basic_info: BasicInfo) -> Self {
        let now = OffsetDateTime::now_utc();

        Self {
            id: Id::new_random(),
            identity_id,
            basic_info,
            date_created: now,
            last_modified: now,
        }
    }

    pub fn update_basic_info(&mut self, basic_info: BasicInfo) {
        self.basic_info = basic_info;
        self.last_modified = OffsetDateTime::now_utc();
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct BasicInfo {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email_address: EmailAddress,
    pub phone_number: String,
    pub date_of_birth: Date,
    pub current_city: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
pub enum InvalidBasicInfoError {
    #[error("First name is invalid: {0}")]
    FirstName(InvalidPersonNameError),
    #[error("Last name is invalid: {0}")]
    LastName(InvalidPersonNameError),
    #[error(transparent)]
    EmailAddress(#[from] InvalidEmailAddressError),
}

impl BasicInfo {
    pub fn new(
        first_name: String,
        last_name: String,
        email_address: String,
        phone_number: String,
        date_of_birth: Date,
        current_city: String,
    ) -> Result<Self, InvalidBasicInfoError> {
        Ok(Self {
            first_name: PersonName::new(first_name).map_err(InvalidBasicInfoError::FirstName)?,
            last_name: PersonName::new(last_name).map_err(InvalidBasicInfoError::LastName)?,
            email_address: EmailAddress::new(email_address)?,
            phone_number,
            date_of_birth,
            current_city,
        })
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct PersonName(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("must be between 1 and 50 characters, got {0:?}")]
pub struct InvalidPersonNameError(String);

impl PersonName {
    pub fn new(name: String) -> Result<Self, InvalidPersonNameError> {
        trimmed_within(&name, PERSON_NAME_MAX_LEN)
            .map(|trimmed| Self(trimmed.to_owned()))
            .ok_or(InvalidPersonNameError(name))
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The e-mail address is invalid: {0:?}")]
pub struct InvalidEmailAddressError(String);

impl EmailAddress {
    pub fn new(address: String) -> Result<Self, InvalidEmailAddressError> {
        match trimmed_within(&address, EMAIL_ADDRESS_MAX_LEN) {
            Some(trimmed) if is_email_address(trimmed) => Ok(Self(trimmed.to_owned())),
            _ => Err(InvalidEmailAddressError(address)),
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{
        Id,
        user_profile::{BasicInfo, InvalidBasicInfoError, UserProfile},
    };
    use time::macros::date;

    fn basic_info(
        first_name: &str,
        email_address: &str,
    ) -> Result<BasicInfo, InvalidBasicInfoError> {
        BasicInfo::new(
            first_name.to_owned(),
            "Doe".to_owned(),
            email_address.to_owned(),
            "+40 712 345 678".to_owned(),
            date!(1990 - 04 - 12),
            "Cluj".to_owned(),
        )
    }

    #[test]
    fn basic_info_validation() {
        let info = basic_info(" Jane ", "jane@example.com").unwrap();
        assert_eq!(info.first_name.get(), "Jane");
        assert_eq!(info.last_name.get(), "Doe");

        assert!(matches!(
            basic_info("", "jane@example.com"),
            Err(InvalidBasicInfoError::FirstName(_))
        ));
        assert!(matches!(
            basic_info(&"x".repeat(51), "jane@example.com"),
            Err(InvalidBasicInfoError::FirstName(_))
        ));
        assert!(matches!(
            basic_info("Jane", "jane"),
            Err(InvalidBasicInfoError::EmailAddress(_))
        ));
    }

    #[test]
    fn update_basic_info_touches_last_modified() {
        let mut profile = UserProfile::create(
            Id::new_random(),
            basic_info("Jane", "jane@example.com").unwrap(),
        );
        let created = profile.date_created;
        assert_eq!(profile.last_modified, created);

        profile.update_basic_info(basic_info("Janet", "janet@example.com").unwrap());

        assert_eq!(profile.basic_info.first_name.get(), "Janet");
        assert_eq!(profile.date_created, created);
        assert!(profile.last_modified >= created);
    }
}
