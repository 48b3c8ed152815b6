use url::Url;

use crate::AuthError;

/// Builds the URL the user opens to grant access.
///
/// Parameters are appended in a fixed order, so equal inputs always give a
/// byte-identical URL.
pub fn authorization_url(
    authorize_url: &str,
    client_id: &str,
    redirect_uri: &str,
    scope: &str,
    state: &str,
) -> Result<String, AuthError> {
    let mut url = Url::parse(authorize_url)?;
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("scope", scope)
        .append_pair("state", state);
    Ok(url.to_string())
}
