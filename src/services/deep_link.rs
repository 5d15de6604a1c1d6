use url::Url;

use crate::error::AppError;

pub const DEEP_LINK_SCHEME: &str = "travel-planner";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Reads the token pair out of a desktop login callback such as
/// `travel-planner://auth#access_token=..&refresh_token=..`. Tokens in the
/// query string are accepted too; the fragment wins when both carry one.
pub fn parse_auth_deep_link(raw: &str) -> Result<AuthTokens, AppError> {
    let url = Url::parse(raw.trim())
        .map_err(|err| AppError::BadRequest(format!("invalid deep link: {err}")))?;
    if url.scheme() != DEEP_LINK_SCHEME {
        return Err(AppError::BadRequest(format!(
            "unexpected deep link scheme: {}",
            url.scheme()
        )));
    }

    let mut access_token = None;
    let mut refresh_token = None;
    let fragment_pairs = url
        .fragment()
        .map(|fragment| url::form_urlencoded::parse(fragment.as_bytes()).into_owned().collect())
        .unwrap_or_else(Vec::new);
    let query_pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

    for (key, value) in query_pairs.into_iter().chain(fragment_pairs) {
        if value.is_empty() {
            continue;
        }
        match key.as_str() {
            "access_token" => access_token = Some(value),
            "refresh_token" => refresh_token = Some(value),
            _ => {}
        }
    }

    match (access_token, refresh_token) {
        (Some(access_token), Some(refresh_token)) => Ok(AuthTokens {
            access_token,
            refresh_token,
        }),
        _ => Err(AppError::BadRequest("deep link carries no session tokens".into())),
    }
}
