//! Authorization resource lookup.
//!
//! Services call this to ask the authorization service whether the caller
//! of a request they received may perform an action on a resource.

use crate::client::{Client, Response, endpoint};
use crate::error::Result;
use crate::request::Request;
use crate::signer::ForwardedRequest;

/// Builds the `select_by` query value.
#[must_use]
pub fn select_by(resource_type: &str, action: &str, uuid: Option<&str>) -> String {
    let mut value = format!("type={resource_type},action={action}");
    if let Some(uuid) = uuid.filter(|u| !u.is_empty()) {
        value.push_str(&format!(",uuid={uuid},"));
    }
    value
}

/// Looks up resources of `resource_type` the caller may `action`.
///
/// When `forwarded` is given, the received request's signature is embedded
/// and its role context is used.
///
/// # Errors
///
/// Fails on transport or signing errors. The status is left to the caller.
pub async fn find_resources(
    client: &Client,
    resource_type: &str,
    action: &str,
    uuid: Option<&str>,
    forwarded: Option<ForwardedRequest>,
) -> Result<Response> {
    let url = endpoint(&client.endpoints().authorization, "v1/resources/");
    let mut request = Request::get(url)
        .param("select_by", select_by(resource_type, action, uuid))
        .sign(true);
    if let Some(forwarded) = forwarded {
        request = request.forward(forwarded);
    }
    client.execute(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("application", "read", None, "type=application,action=read" ; "without uuid")]
    #[test_case("application", "read", Some(""), "type=application,action=read" ; "empty uuid")]
    #[test_case("pool", "delete", Some("p-1"), "type=pool,action=delete,uuid=p-1," ; "with uuid")]
    fn select_by_value(resource_type: &str, action: &str, uuid: Option<&str>, expected: &str) {
        assert_eq!(select_by(resource_type, action, uuid), expected);
    }
}
