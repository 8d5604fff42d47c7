//! Credentials that prepare an outbound EWS request.
//!
//! This crate does not send requests. A transport hands each request to the session's
//! [`Credentials`] before it goes out, through the small [`WebRequest`] surface.

use std::fmt;

use crate::error::{Result, ValidateError};

/// The parts of an outbound HTTP request that credentials may inspect or change.
pub trait WebRequest {
    /// The URI the request will be sent to.
    fn request_uri(&self) -> &str;

    /// Set a header, replacing any previous value.
    fn set_header(&mut self, name: &str, value: String);
}

/// This will allow plugable authentication mechanisms.
pub trait Credentials: fmt::Debug + Send + Sync {
    /// Called on every request before it is sent.
    fn prepare_web_request(&mut self, request: &mut dyn WebRequest) -> Result<()>;
}

/// A bare-bones [`WebRequest`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpRequest {
    /// Target of the request.
    pub uri: String,
    /// Headers in insertion order.
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Make a request to the given URI with no headers.
    pub fn new(uri: impl Into<String>) -> Self {
        HttpRequest {
            uri: uri.into(),
            headers: Vec::new(),
        }
    }

    /// Look up a header by name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl WebRequest for HttpRequest {
    fn request_uri(&self) -> &str {
        &self.uri
    }

    fn set_header(&mut self, name: &str, value: String) {
        match self
            .headers
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some(header) => header.1 = value,
            None => self.headers.push((name.to_owned(), value)),
        }
    }
}

fn validate_token(token: String, name: &'static str) -> Result<String> {
    if token.is_empty() {
        return Err(ValidateError::Empty(name).into());
    }
    Ok(token)
}

/// Credentials for a caller that already holds a WS-Security token.
///
/// The token travels in the SOAP header rather than in HTTP headers, so preparing a request
/// only remembers which endpoint the token is being presented to.
#[derive(Clone)]
pub struct TokenCredentials {
    security_token: String,
    ews_url: Option<String>,
}

impl TokenCredentials {
    /// Wrap a security token. The token must not be empty.
    pub fn new(security_token: impl Into<String>) -> Result<Self> {
        Ok(TokenCredentials {
            security_token: validate_token(security_token.into(), "security_token")?,
            ews_url: None,
        })
    }

    /// The wrapped token.
    pub fn security_token(&self) -> &str {
        &self.security_token
    }

    /// The endpoint of the last request these credentials prepared.
    pub fn ews_url(&self) -> Option<&str> {
        self.ews_url.as_deref()
    }
}

impl Credentials for TokenCredentials {
    fn prepare_web_request(&mut self, request: &mut dyn WebRequest) -> Result<()> {
        self.ews_url = Some(request.request_uri().to_owned());
        Ok(())
    }
}

impl fmt::Debug for TokenCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCredentials")
            .field("security_token", &"<redacted>")
            .field("ews_url", &self.ews_url)
            .finish()
    }
}

/// OAuth 2.0 bearer token credentials.
#[derive(Clone)]
pub struct OAuthCredentials {
    token: String,
}

impl OAuthCredentials {
    /// Wrap an access token. The token must not be empty.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Ok(OAuthCredentials {
            token: validate_token(token.into(), "token")?,
        })
    }
}

impl Credentials for OAuthCredentials {
    fn prepare_web_request(&mut self, request: &mut dyn WebRequest) -> Result<()> {
        request.set_header("Authorization", format!("Bearer {}", self.token));
        Ok(())
    }
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn empty_tokens_are_rejected() {
        assert!(matches!(
            TokenCredentials::new(""),
            Err(Error::Validate(ValidateError::Empty("security_token")))
        ));
        assert!(matches!(
            OAuthCredentials::new(String::new()),
            Err(Error::Validate(ValidateError::Empty("token")))
        ));
    }

    #[test]
    fn token_credentials_remember_endpoint() {
        let mut creds = TokenCredentials::new("opaque").unwrap();
        assert_eq!(creds.ews_url(), None);
        let mut request = HttpRequest::new("https://outlook.office365.com/EWS/Exchange.asmx");
        creds.prepare_web_request(&mut request).unwrap();
        assert_eq!(
            creds.ews_url(),
            Some("https://outlook.office365.com/EWS/Exchange.asmx")
        );
        assert!(request.headers.is_empty());
        assert_eq!(creds.security_token(), "opaque");
    }

    #[test]
    fn oauth_credentials_set_bearer_header() {
        let mut creds = OAuthCredentials::new("eyJ0eXAi").unwrap();
        let mut request = HttpRequest::new("https://example.com/EWS/Exchange.asmx");
        request.set_header("authorization", "Basic Zm9vOmJhcg==".to_string());
        creds.prepare_web_request(&mut request).unwrap();
        assert_eq!(request.header("Authorization"), Some("Bearer eyJ0eXAi"));
        assert_eq!(request.headers.len(), 1);
    }

    #[test]
    fn debug_output_hides_tokens() {
        let creds = OAuthCredentials::new("secret-value").unwrap();
        assert!(!format!("{:?}", creds).contains("secret-value"));
    }
}
