//! Deployments of an application.

use std::collections::BTreeMap;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::Application;
use crate::client::Client;
use crate::config::Endpoints;
use crate::error::Result;
use crate::request::Request;
use crate::serde_helpers::null_as_default;

/// One rollout of an application image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deployment {
    /// Owning application.
    #[serde(deserialize_with = "null_as_default")]
    pub application_uuid: String,
    /// Creation timestamp, UTC without zone.
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    /// Environment variables.
    #[serde(deserialize_with = "null_as_default")]
    pub environment: BTreeMap<String, String>,
    /// Resolved image identifier.
    #[serde(deserialize_with = "null_as_default")]
    pub image_id: String,
    /// Image tag.
    #[serde(deserialize_with = "null_as_default")]
    pub tag: String,
    /// Container image.
    #[serde(deserialize_with = "null_as_default")]
    pub image_url: String,
    /// Free-form JSON.
    #[serde(deserialize_with = "null_as_default")]
    pub metadata: BTreeMap<String, Value>,
    /// Exposed ports.
    #[serde(deserialize_with = "null_as_default")]
    pub ports: Vec<String>,
    /// Ports served over TLS.
    #[serde(deserialize_with = "null_as_default")]
    pub ssl_ports: Vec<String>,
    /// Service URL.
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    /// Identifier.
    #[serde(deserialize_with = "null_as_default")]
    pub uuid: String,
}

impl Deployment {
    /// `{application}/v1/applications/{app}/deployments/`
    #[must_use]
    pub fn collection_url(endpoints: &Endpoints, application_uuid: &str) -> String {
        format!("{}/deployments/", Application::url(endpoints, application_uuid))
    }

    /// Lists the deployments of an application.
    ///
    /// # Errors
    ///
    /// Fails unless the service answers `200 OK`.
    pub async fn list(client: &Client, application_uuid: &str) -> Result<Vec<Self>> {
        let url = Self::collection_url(client.endpoints(), application_uuid);
        client
            .execute(Request::get(url).sign(true))
            .await?
            .expect_status(StatusCode::OK)?
            .json()
    }

    /// Fetches one deployment.
    ///
    /// # Errors
    ///
    /// Fails unless the service answers `200 OK`.
    pub async fn show(client: &Client, application_uuid: &str, uuid: &str) -> Result<Self> {
        let url = format!("{}{uuid}", Self::collection_url(client.endpoints(), application_uuid));
        client
            .execute(Request::get(url).sign(true))
            .await?
            .expect_status(StatusCode::OK)?
            .json()
    }
}
