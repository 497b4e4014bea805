//! Applications on the application service.

use std::collections::BTreeMap;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::client::{Client, endpoint};
use crate::config::Endpoints;
use crate::error::Result;
use crate::request::Request;
use crate::serde_helpers::null_as_default;

/// Status reported for archived applications.
pub const ARCHIVED: &str = "archived";

/// Where an application runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppLocation {
    /// Cloud provider, e.g. `aws`.
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub provider: String,
    /// Provider region, e.g. `us-east-1`.
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub region: String,
}

/// TLS material served for the application's SSL ports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Certificates {
    /// PEM certificate.
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub certificate: String,
    /// PEM private key.
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub private_key: String,
    /// PEM intermediate chain.
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub certificate_chain: String,
}

impl Certificates {
    /// Whether no certificate material is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.certificate.is_empty() && self.private_key.is_empty() && self.certificate_chain.is_empty()
    }
}

/// A deployable application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Application {
    /// Public addresses.
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub addresses: Vec<String>,
    /// Creation timestamp, UTC without zone.
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub created_at: String,
    /// Deployment UUID per image tag.
    #[serde(skip_serializing_if = "BTreeMap::is_empty", deserialize_with = "null_as_default")]
    pub current_deployments: BTreeMap<String, String>,
    /// Token required to trigger a deployment.
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub deployment_token: String,
    /// Environment variables.
    #[serde(skip_serializing_if = "BTreeMap::is_empty", deserialize_with = "null_as_default")]
    pub environment: BTreeMap<String, String>,
    /// Content hash of the current definition.
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub hash: String,
    /// Container image.
    #[serde(deserialize_with = "null_as_default")]
    pub image_url: String,
    /// Placement.
    #[serde(deserialize_with = "null_as_default")]
    pub location: AppLocation,
    /// Free-form JSON; `labels` holds the application's labels.
    #[serde(skip_serializing_if = "BTreeMap::is_empty", deserialize_with = "null_as_default")]
    pub metadata: BTreeMap<String, Value>,
    /// Display name.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Owning role.
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub owner_uuid: String,
    /// Exposed ports.
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub ports: Vec<String>,
    /// Traffic weight per image tag.
    #[serde(skip_serializing_if = "BTreeMap::is_empty", deserialize_with = "null_as_default")]
    pub rules: BTreeMap<String, i32>,
    /// Ports served over TLS.
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub ssl_ports: Vec<String>,
    /// Lifecycle status.
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub status: String,
    /// Last update timestamp.
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub updated_at: String,
    /// Service URL.
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub url: String,
    /// Identifier.
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub uuid: String,
    /// API version that produced the record.
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub api_version: String,
    /// TLS material.
    #[serde(skip_serializing_if = "Certificates::is_empty", deserialize_with = "null_as_default")]
    pub certificates: Certificates,
}

impl Application {
    /// An application handle for an existing UUID.
    pub fn with_uuid(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            ..Self::default()
        }
    }

    /// `{application}/v1/applications/`
    #[must_use]
    pub fn collection_url(endpoints: &Endpoints) -> String {
        endpoint(&endpoints.application, "v1/applications/")
    }

    /// `{application}/v1/applications/{uuid}`
    #[must_use]
    pub fn url(endpoints: &Endpoints, uuid: &str) -> String {
        endpoint(&endpoints.application, &format!("v1/applications/{uuid}"))
    }

    /// Whether the application has been archived.
    #[must_use]
    pub fn is_archived(&self) -> bool {
        self.status.eq_ignore_ascii_case(ARCHIVED)
    }

    /// Labels from the metadata, if any.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.metadata
            .get("labels")
            .and_then(Value::as_array)
            .map(|labels| labels.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// RFC 6902 patch turning `self` into `patched`.
    ///
    /// # Errors
    ///
    /// Fails if either application cannot be serialized.
    pub fn diff(&self, patched: &Self) -> Result<json_patch::Patch> {
        let original = serde_json::to_value(self)?;
        let patched = serde_json::to_value(patched)?;
        Ok(json_patch::diff(&original, &patched))
    }

    /// Creates the application.
    ///
    /// # Errors
    ///
    /// Fails unless the service answers `201 Created`.
    pub async fn create(&self, client: &Client) -> Result<Self> {
        let request = Request::post(Self::collection_url(client.endpoints()))
            .json(self)
            .sign(true);
        client
            .execute(request)
            .await?
            .expect_status(StatusCode::CREATED)?
            .json()
    }

    /// Archives the application.
    ///
    /// # Errors
    ///
    /// Fails unless the service answers `202 Accepted`.
    pub async fn delete(&self, client: &Client) -> Result<()> {
        let request = Request::delete(Self::url(client.endpoints(), &self.uuid)).sign(true);
        client
            .execute(request)
            .await?
            .expect_status(StatusCode::ACCEPTED)?;
        Ok(())
    }

    /// Starts a deployment using the application's deployment token.
    ///
    /// # Errors
    ///
    /// Fails unless the service answers `202 Accepted`.
    pub async fn deploy(&self, client: &Client) -> Result<()> {
        let url = format!("{}/deployments/", Self::url(client.endpoints(), &self.uuid));
        let request = Request::post(url)
            .param("deployment_token", self.deployment_token.as_str())
            .sign(true);
        client
            .execute(request)
            .await?
            .expect_status(StatusCode::ACCEPTED)?;
        Ok(())
    }

    /// Sends the difference between `self` and `patched` as a JSON Patch and
    /// returns the updated application.
    ///
    /// # Errors
    ///
    /// Fails unless the service answers `200 OK`.
    pub async fn patch(&self, client: &Client, patched: &Self) -> Result<Self> {
        let patch = self.diff(patched)?;
        debug!(operations = patch.0.len(), "application patch");

        let request = Request::patch(Self::url(client.endpoints(), &self.uuid))
            .json_patch(&patch)
            .sign(true);
        client.execute(request).await?.expect_status(StatusCode::OK)?.json()
    }

    /// Fetches an application.
    ///
    /// # Errors
    ///
    /// Fails unless the service answers `200 OK`.
    pub async fn show(client: &Client, uuid: &str) -> Result<Self> {
        let request = Request::get(Self::url(client.endpoints(), uuid)).sign(true);
        client.execute(request).await?.expect_status(StatusCode::OK)?.json()
    }

    /// Lists applications, archived ones included.
    ///
    /// # Errors
    ///
    /// Fails unless the service answers `200 OK`.
    pub async fn list(client: &Client) -> Result<Vec<Self>> {
        let request = Request::get(Self::collection_url(client.endpoints())).sign(true);
        client.execute(request).await?.expect_status(StatusCode::OK)?.json()
    }
}
