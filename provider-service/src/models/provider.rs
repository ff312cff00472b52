use serde::{Deserialize, Serialize};

/// Name of a configured provider instance, e.g. a specific SMS gateway account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ProviderName(String);

impl ProviderName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProviderName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ProviderName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl PartialEq<str> for ProviderName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ProviderName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Ordered provider names for one resolution. Never empty.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ResolvedProviderList(Vec<ProviderName>);

impl ResolvedProviderList {
    /// Returns `None` for an empty list.
    pub fn new(providers: Vec<ProviderName>) -> Option<Self> {
        if providers.is_empty() {
            None
        } else {
            Some(Self(providers))
        }
    }

    pub fn single(provider: ProviderName) -> Self {
        Self(vec![provider])
    }

    /// The provider to try first.
    pub fn primary(&self) -> &ProviderName {
        &self.0[0]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProviderName> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[ProviderName] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a ResolvedProviderList {
    type Item = &'a ProviderName;
    type IntoIter = std::slice::Iter<'a, ProviderName>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
