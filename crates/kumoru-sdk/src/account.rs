//! User accounts on the authorization service.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::client::{Client, endpoint};
use crate::config::Endpoints;
use crate::error::Result;
use crate::request::Request;
use crate::serde_helpers::null_as_default;

/// A Kumoru user account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    /// Creation timestamp, UTC without zone.
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    /// Login e-mail, also the account identifier.
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    /// First name.
    #[serde(deserialize_with = "null_as_default")]
    pub given_name: String,
    /// Role the account acts as by default.
    #[serde(deserialize_with = "null_as_default")]
    pub role_uuid: String,
    /// Last name.
    #[serde(deserialize_with = "null_as_default")]
    pub surname: String,
    /// Last update timestamp.
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: String,
}

impl Account {
    /// An account identified by `email`.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }

    /// Sets first and last name.
    #[must_use]
    pub fn with_name(mut self, given_name: impl Into<String>, surname: impl Into<String>) -> Self {
        self.given_name = given_name.into();
        self.surname = surname.into();
        self
    }

    /// `{authorization}/v1/accounts/{email}`
    #[must_use]
    pub fn url(endpoints: &Endpoints, email: &str) -> String {
        endpoint(&endpoints.authorization, &format!("v1/accounts/{email}"))
    }

    /// Registers the account. Not signed: the caller has no tokens yet.
    ///
    /// # Errors
    ///
    /// Fails unless the service answers `201 Created`.
    pub async fn create(&self, client: &Client, password: &str) -> Result<Self> {
        let request = Request::put(Self::url(client.endpoints(), &self.email)).form([
            ("given_name", self.given_name.as_str()),
            ("surname", self.surname.as_str()),
            ("password", password),
        ]);

        let response = client.execute(request).await?.expect_status(StatusCode::CREATED)?;
        if response.body.is_empty() {
            return Ok(self.clone());
        }
        response.json()
    }

    /// Asks the service to mail a password reset link.
    ///
    /// # Errors
    ///
    /// Fails unless the service answers `204 No Content`.
    pub async fn reset_password(&self, client: &Client) -> Result<()> {
        let url = format!("{}/password/resets/", Self::url(client.endpoints(), &self.email));
        client
            .execute(Request::get(url))
            .await?
            .expect_status(StatusCode::NO_CONTENT)?;
        Ok(())
    }

    /// Fetches an account.
    ///
    /// # Errors
    ///
    /// Fails on transport errors or any status other than `200 OK`.
    pub async fn show(client: &Client, email: &str) -> Result<Self> {
        let request = Request::get(Self::url(client.endpoints(), email)).sign(true);
        client.execute(request).await?.expect_status(StatusCode::OK)?.json()
    }
}
