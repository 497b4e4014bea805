//! Provider locations known to the location service.

use serde::{Deserialize, Serialize};

use crate::client::{Client, endpoint};
use crate::config::Endpoints;
use crate::error::Result;
use crate::request::Request;
use crate::serde_helpers::null_as_default;

/// A provider region applications can be placed in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    /// Orchestrator endpoint serving the region.
    #[serde(rename = "kubernetes_api_url", deserialize_with = "null_as_default")]
    pub orchestration_url: String,
    /// Cloud provider, e.g. `amazon`.
    #[serde(deserialize_with = "null_as_default")]
    pub provider: String,
    /// Provider specific region identifier, e.g. `us-east-1`.
    #[serde(deserialize_with = "null_as_default")]
    pub region: String,
}

impl Location {
    /// A location filter or handle.
    pub fn new(provider: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            region: region.into(),
            ..Self::default()
        }
    }

    fn url(&self, endpoints: &Endpoints) -> String {
        endpoint(
            &endpoints.location,
            &format!("v1/locations/{}/{}", self.provider, self.region),
        )
    }

    /// Lookup path: all locations, a provider's locations, or one region.
    ///
    /// A region without a provider is ignored.
    #[must_use]
    pub fn find_path(&self, base: &str) -> String {
        let mut path = endpoint(base, "v1/locations/");
        if !self.provider.is_empty() {
            path.push_str(&self.provider);
            if !self.region.is_empty() {
                path.push('/');
                path.push_str(&self.region);
            }
        }
        path
    }

    /// Registers the location.
    ///
    /// # Errors
    ///
    /// Fails on an error status or an undecodable body.
    pub async fn create(&self, client: &Client) -> Result<Self> {
        let request = Request::put(self.url(client.endpoints())).sign(true);
        client.execute(request).await?.error_for_status()?.json()
    }

    /// Removes the location.
    ///
    /// # Errors
    ///
    /// Fails on an error status.
    pub async fn delete(&self, client: &Client) -> Result<()> {
        let request = Request::delete(self.url(client.endpoints())).sign(true);
        client.execute(request).await?.error_for_status()?;
        Ok(())
    }

    /// Lists locations matching this filter.
    ///
    /// # Errors
    ///
    /// Fails on an error status or an undecodable body.
    pub async fn find(&self, client: &Client) -> Result<Vec<Self>> {
        let request = Request::get(self.find_path(&client.endpoints().location)).sign(true);
        client.execute(request).await?.error_for_status()?.json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const BASE: &str = "https://locations.kumoru.io";

    #[test_case("", "", "https://locations.kumoru.io/v1/locations/" ; "all")]
    #[test_case("amazon", "", "https://locations.kumoru.io/v1/locations/amazon" ; "provider")]
    #[test_case("amazon", "us-east-1", "https://locations.kumoru.io/v1/locations/amazon/us-east-1" ; "region")]
    #[test_case("", "us-east-1", "https://locations.kumoru.io/v1/locations/" ; "region without provider")]
    fn find_path(provider: &str, region: &str, expected: &str) {
        assert_eq!(Location::new(provider, region).find_path(BASE), expected);
    }

    #[test]
    fn orchestration_url_wire_name() {
        let location: Location = serde_json::from_str(
            r#"{"kubernetes_api_url":"https://k8s.example","provider":"amazon","region":"us-east-1"}"#,
        )
        .expect("decode");
        assert_eq!(location.orchestration_url, "https://k8s.example");
    }
}
