//! Capacity pools on the pool service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::client::{Client, endpoint};
use crate::config::Endpoints;
use crate::error::Result;
use crate::request::Request;
use crate::serde_helpers::null_as_default;

/// A pool of compute capacity in one location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pool {
    /// Capacity totals by resource name.
    #[serde(deserialize_with = "null_as_default")]
    pub aggregate_resources: BTreeMap<String, f32>,
    /// Creation timestamp, UTC without zone.
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    /// Location identifier the pool runs in.
    #[serde(deserialize_with = "null_as_default")]
    pub location: String,
    /// Cloud provider.
    #[serde(deserialize_with = "null_as_default")]
    pub provider: String,
    /// Provider stack backing the pool.
    #[serde(deserialize_with = "null_as_default")]
    pub stack_id: String,
    /// Provisioning status.
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    /// Last update timestamp.
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: String,
    /// Pool API URL.
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    /// Identifier.
    #[serde(deserialize_with = "null_as_default")]
    pub uuid: String,
    /// API version that produced the record.
    #[serde(deserialize_with = "null_as_default")]
    pub api_version: String,
}

impl Pool {
    /// `{pool}/v1/pools/`
    #[must_use]
    pub fn collection_url(endpoints: &Endpoints) -> String {
        endpoint(&endpoints.pool, "v1/pools/")
    }

    /// Requests a pool in `location`.
    ///
    /// # Errors
    ///
    /// Fails on an error status or an undecodable body.
    pub async fn create(client: &Client, location: &str) -> Result<Self> {
        let request = Request::post(Self::collection_url(client.endpoints()))
            .form([("location", location)])
            .sign(true);
        client.execute(request).await?.error_for_status()?.json()
    }

    /// Archives a pool.
    ///
    /// # Errors
    ///
    /// Fails on an error status.
    pub async fn delete(client: &Client, uuid: &str) -> Result<()> {
        let url = format!("{}{uuid}", Self::collection_url(client.endpoints()));
        client.execute(Request::delete(url).sign(true)).await?.error_for_status()?;
        Ok(())
    }

    /// Lists pools.
    ///
    /// # Errors
    ///
    /// Fails on an error status or an undecodable body.
    pub async fn list(client: &Client) -> Result<Vec<Self>> {
        let request = Request::get(Self::collection_url(client.endpoints())).sign(true);
        client.execute(request).await?.error_for_status()?.json()
    }

    /// Fetches a pool.
    ///
    /// # Errors
    ///
    /// Fails on an error status or an undecodable body.
    pub async fn show(client: &Client, uuid: &str) -> Result<Self> {
        let url = format!("{}{uuid}", Self::collection_url(client.endpoints()));
        client.execute(Request::get(url).sign(true)).await?.error_for_status()?.json()
    }
}
