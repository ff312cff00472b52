use serde::{Deserialize, Serialize};

/// A configured policy as handed over by the policy matcher.
///
/// `action` holds comma separated `key=value` assignments, e.g.
/// `sms_provider=primary backup, otp_length=8`. The selectors are matched by
/// the policy matcher and are opaque to the resolver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyDescriptor {
    pub name: String,
    pub scope: String,
    #[serde(default = "default_active")]
    pub active: bool,
    pub action: String,
    #[serde(default = "wildcard")]
    pub realm: String,
    #[serde(default = "wildcard")]
    pub user: String,
    #[serde(default = "wildcard")]
    pub client: String,
}

fn default_active() -> bool {
    true
}

fn wildcard() -> String {
    "*".to_string()
}

impl PolicyDescriptor {
    /// An active policy that applies to every realm, user and client.
    pub fn new(
        name: impl Into<String>,
        scope: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            scope: scope.into(),
            active: true,
            action: action.into(),
            realm: wildcard(),
            user: wildcard(),
            client: wildcard(),
        }
    }

    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = client.into();
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}
