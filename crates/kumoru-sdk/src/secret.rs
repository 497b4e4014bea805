//! Secrets stored by the authorization service.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::client::{Client, endpoint};
use crate::config::Endpoints;
use crate::error::Result;
use crate::request::Request;
use crate::serde_helpers::null_as_default;

/// A stored secret value.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Secret {
    /// Creation timestamp, UTC without zone.
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    /// Labels attached at creation.
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub labels: Vec<String>,
    /// Last update timestamp.
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: String,
    /// Identifier.
    #[serde(deserialize_with = "null_as_default")]
    pub uuid: String,
    /// Secret value.
    #[serde(deserialize_with = "null_as_default")]
    pub value: String,
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secret")
            .field("uuid", &self.uuid)
            .field("labels", &self.labels)
            .field("value", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl Secret {
    /// A secret to be created.
    pub fn new(value: impl Into<String>, labels: Vec<String>) -> Self {
        Self {
            value: value.into(),
            labels,
            ..Self::default()
        }
    }

    /// `{authorization}/v1/secrets/`
    #[must_use]
    pub fn collection_url(endpoints: &Endpoints) -> String {
        endpoint(&endpoints.authorization, "v1/secrets/")
    }

    /// Form fields for creation: `value` unless empty, then one `labels`
    /// field per label.
    #[must_use]
    pub fn form_fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = Vec::with_capacity(self.labels.len() + 1);
        if !self.value.is_empty() {
            fields.push(("value", self.value.as_str()));
        }
        fields.extend(self.labels.iter().map(|label| ("labels", label.as_str())));
        fields
    }

    /// Stores the secret.
    ///
    /// # Errors
    ///
    /// Fails unless the service answers `201 Created`.
    pub async fn create(&self, client: &Client) -> Result<Self> {
        let request = Request::post(Self::collection_url(client.endpoints()))
            .form(self.form_fields())
            .sign(true);
        client
            .execute(request)
            .await?
            .expect_status(StatusCode::CREATED)?
            .json()
    }

    /// Fetches a secret.
    ///
    /// # Errors
    ///
    /// Fails on an error status or an undecodable body.
    pub async fn show(client: &Client, uuid: &str) -> Result<Self> {
        let url = format!("{}{uuid}", Self::collection_url(client.endpoints()));
        client.execute(Request::get(url).sign(true)).await?.error_for_status()?.json()
    }

    /// Lists secrets.
    ///
    /// # Errors
    ///
    /// Fails on an error status or an undecodable body.
    pub async fn list(client: &Client) -> Result<Vec<Self>> {
        let request = Request::get(Self::collection_url(client.endpoints())).sign(true);
        client.execute(request).await?.error_for_status()?.json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_fields_repeat_labels() {
        let secret = Secret::new("hunter2", vec!["db".into(), "prod".into()]);
        assert_eq!(
            secret.form_fields(),
            [("value", "hunter2"), ("labels", "db"), ("labels", "prod")]
        );
    }

    #[test]
    fn empty_value_is_omitted() {
        let secret = Secret::new("", vec!["db".into()]);
        assert_eq!(secret.form_fields(), [("labels", "db")]);
    }

    #[test]
    fn debug_redacts_value() {
        let secret = Secret::new("hunter2", Vec::new());
        assert!(!format!("{secret:?}").contains("hunter2"));
    }

    #[test]
    fn decodes_null_labels() {
        let secret: Secret = serde_json::from_str(r#"{"uuid":"s-1","labels":null,"value":"v"}"#).expect("decode");
        assert_eq!(secret.uuid, "s-1");
        assert!(secret.labels.is_empty());
        assert_eq!(secret.value, "v");
    }
}
