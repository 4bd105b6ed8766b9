//! Access credentials for the Product Advertising API.

use crate::error::{Error, Result};
use std::fmt;

/// Immutable identity used to sign requests.
///
/// All three fields are mandatory; [`Credential::new`] rejects empty values.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    access_key_id: String,
    secret_key: String,
    associate_tag: String,
}

impl Credential {
    /// Creates a credential, failing on the first missing field.
    ///
    /// Fields are checked in the order key ID, secret key, associate tag.
    pub fn new(
        access_key_id: impl Into<String>,
        secret_key: impl Into<String>,
        associate_tag: impl Into<String>,
    ) -> Result<Self> {
        let access_key_id = required(access_key_id.into(), "Amazon key ID")?;
        let secret_key = required(secret_key.into(), "Amazon secret key")?;
        let associate_tag = required(associate_tag.into(), "Amazon associate tag")?;

        Ok(Self { access_key_id, secret_key, associate_tag })
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn associate_tag(&self) -> &str {
        &self.associate_tag
    }
}

fn required(value: String, name: &'static str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(Error::Configuration(name));
    }
    Ok(value)
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_key_id", &self.access_key_id)
            .field("secret_key", &"***")
            .field("associate_tag", &self.associate_tag)
            .finish()
    }
}
