use serde::{Deserialize, Serialize};

/// A login name within a realm.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UserIdentity {
    pub login: String,
    pub realm: String,
}

impl UserIdentity {
    pub fn new(login: impl Into<String>, realm: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            realm: realm.into(),
        }
    }
}

impl std::fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.login, self.realm)
    }
}

/// Request-scoped data the policy matcher consults.
///
/// Built once per inbound request and only ever read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    client_address: Option<String>,
}

impl RequestContext {
    pub fn new(client_address: Option<String>) -> Self {
        Self { client_address }
    }

    pub fn with_client(client_address: impl Into<String>) -> Self {
        Self::new(Some(client_address.into()))
    }

    /// The originating client address. Blank addresses read as absent.
    pub fn client_address(&self) -> Option<&str> {
        self.client_address
            .as_deref()
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_client_address_is_absent() {
        assert_eq!(RequestContext::with_client("  ").client_address(), None);
        assert_eq!(RequestContext::default().client_address(), None);
        assert_eq!(
            RequestContext::with_client("123.123.123.123").client_address(),
            Some("123.123.123.123")
        );
    }
}
