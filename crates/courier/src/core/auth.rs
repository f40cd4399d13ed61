use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Strategy producing the value of the `Authorization` header.
///
/// Implementations are stateless; the token is recomputed for every
/// request. "No authentication" is expressed by not attaching a strategy.
pub trait AuthSpec: Send + Sync {
    fn token(&self) -> String;
}

/// HTTP Basic credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub user: String,
    pub pass: String,
}

impl BasicAuth {
    pub fn new(user: impl Into<String>, pass: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            pass: pass.into(),
        }
    }
}

impl AuthSpec for BasicAuth {
    fn token(&self) -> String {
        let payload = format!("{}:{}", self.user, self.pass);
        format!("Basic {}", STANDARD.encode(payload))
    }
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .finish()
    }
}

/// Bearer (personal access) token.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl AuthSpec for BearerToken {
    fn token(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

impl<A: AuthSpec + ?Sized> AuthSpec for std::sync::Arc<A> {
    fn token(&self) -> String {
        (**self).token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_auth_token() {
        assert_eq!(BasicAuth::new("foo", "bar").token(), "Basic Zm9vOmJhcg==");
    }

    #[test]
    fn basic_auth_empty_password() {
        assert_eq!(BasicAuth::new("admin", "").token(), "Basic YWRtaW46");
    }

    #[test]
    fn bearer_token() {
        assert_eq!(BearerToken::new("abc123").token(), "Bearer abc123");
    }

    #[test]
    fn debug_hides_secrets() {
        let rendered = format!("{:?} {:?}", BasicAuth::new("foo", "bar"), BearerToken::new("abc123"));
        assert!(!rendered.contains("bar"));
        assert!(!rendered.contains("abc123"));
    }
}
