//! Token pair issuance.

use reqwest::StatusCode;
use tracing::debug;
use uuid::Uuid;

use crate::client::{Client, endpoint};
use crate::config::Tokens;
use crate::error::{Error, Result};
use crate::request::Request;

/// Issues a new token pair for `username`.
///
/// A fresh v4 UUID becomes the public token; the service answers with the
/// private token as the response body.
///
/// # Errors
///
/// Fails unless the service answers `201 Created` with a non-empty body.
pub async fn issue_tokens(client: &Client, username: &str, password: &str) -> Result<Tokens> {
    let public = Uuid::new_v4().to_string();
    let url = endpoint(&client.endpoints().authorization, &format!("v1/tokens/{public}"));

    debug!(public_token = %public, "requesting token pair");

    let response = client
        .execute(Request::put(url).basic_auth(username, password))
        .await?
        .expect_status(StatusCode::CREATED)?;

    let private = response.text().trim().to_string();
    if private.is_empty() {
        return Err(Error::Api {
            status: response.status,
            body: "empty private token".to_string(),
        });
    }

    Ok(Tokens::new(public, private))
}
