//! Policy lookup.
//!
//! [`PolicyMatcher`] is the seam to whatever stores and evaluates policies.
//! [`StaticPolicyMatcher`] evaluates a fixed list loaded from configuration.

use super::action::has_action_key;
use crate::models::{PolicyDescriptor, UserIdentity};
use async_trait::async_trait;
use std::net::IpAddr;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MatcherError {
    #[error("Policy store unavailable: {0}")]
    Unavailable(String),

    #[error("Policy query failed: {0}")]
    Query(String),
}

/// What a policy has to match.
#[derive(Debug, Clone, Copy)]
pub struct PolicyQuery<'a> {
    pub scope: &'a str,
    pub action: &'a str,
    pub user: &'a UserIdentity,
    /// Realm to match against. Usually the user's own realm.
    pub realm: &'a str,
    pub client: Option<&'a str>,
}

#[async_trait]
pub trait PolicyMatcher: Send + Sync {
    /// All active policies of `query.scope` that configure `query.action` and
    /// apply to the user, realm and client, in match order.
    async fn matching_policies(
        &self,
        query: PolicyQuery<'_>,
    ) -> Result<Vec<PolicyDescriptor>, MatcherError>;
}

/// Matches against a fixed, ordered set of policies.
///
/// Selectors are comma separated entries. `*` or an empty selector matches
/// anything. Realms and logins compare case-insensitively, user entries may
/// be `login@realm`, and client entries are addresses or CIDR blocks.
#[derive(Debug, Clone, Default)]
pub struct StaticPolicyMatcher {
    policies: Vec<PolicyDescriptor>,
}

impl StaticPolicyMatcher {
    pub fn new(policies: Vec<PolicyDescriptor>) -> Self {
        Self { policies }
    }

    pub fn policies(&self) -> &[PolicyDescriptor] {
        &self.policies
    }

    fn matches(policy: &PolicyDescriptor, query: &PolicyQuery<'_>, client: Option<IpAddr>) -> bool {
        policy.active
            && policy.scope == query.scope
            && has_action_key(&policy.action, query.action)
            && selector_matches(&policy.realm, |entry| {
                entry.eq_ignore_ascii_case(query.realm)
            })
            && selector_matches(&policy.user, |entry| user_entry_matches(entry, query))
            && client_matches(&policy.client, query.client, client)
    }
}

#[async_trait]
impl PolicyMatcher for StaticPolicyMatcher {
    async fn matching_policies(
        &self,
        query: PolicyQuery<'_>,
    ) -> Result<Vec<PolicyDescriptor>, MatcherError> {
        let client = query.client.and_then(|addr| match addr.parse::<IpAddr>() {
            Ok(ip) => Some(ip),
            Err(_) => {
                tracing::warn!(client = %addr, "Client address is not an IP address");
                None
            }
        });

        let matched: Vec<PolicyDescriptor> = self
            .policies
            .iter()
            .filter(|policy| Self::matches(policy, &query, client))
            .cloned()
            .collect();

        tracing::debug!(
            scope = %query.scope,
            action = %query.action,
            matched = matched.len(),
            "Evaluated static policies"
        );

        Ok(matched)
    }
}

fn entries(selector: &str) -> impl Iterator<Item = &str> {
    selector
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
}

fn is_wildcard(selector: &str) -> bool {
    let mut entries = entries(selector).peekable();
    entries.peek().is_none() || entries.any(|entry| entry == "*")
}

fn selector_matches(selector: &str, matches_entry: impl Fn(&str) -> bool) -> bool {
    is_wildcard(selector) || entries(selector).any(matches_entry)
}

fn user_entry_matches(entry: &str, query: &PolicyQuery<'_>) -> bool {
    match entry.split_once('@') {
        Some((login, realm)) => {
            (login == "*" || login.eq_ignore_ascii_case(&query.user.login))
                && (realm == "*" || realm.eq_ignore_ascii_case(query.realm))
        }
        None => entry.eq_ignore_ascii_case(&query.user.login),
    }
}

fn client_matches(selector: &str, raw: Option<&str>, client: Option<IpAddr>) -> bool {
    if is_wildcard(selector) {
        return true;
    }
    let Some(raw) = raw else {
        return false;
    };

    entries(selector).any(|entry| {
        if entry == raw {
            return true;
        }
        match client {
            Some(ip) => client_entry_matches(entry, ip),
            None => false,
        }
    })
}

fn client_entry_matches(entry: &str, client: IpAddr) -> bool {
    let (network, prefix) = match entry.split_once('/') {
        Some((network, prefix)) => match prefix.trim().parse::<u8>() {
            Ok(prefix) => (network.trim(), Some(prefix)),
            Err(_) => {
                tracing::warn!(entry = %entry, "Invalid CIDR prefix in client selector");
                return false;
            }
        },
        None => (entry, None),
    };

    let Ok(network) = network.parse::<IpAddr>() else {
        tracing::warn!(entry = %entry, "Invalid address in client selector");
        return false;
    };

    match (network, client) {
        (IpAddr::V4(net), IpAddr::V4(ip)) => {
            prefix_matches(u32::from(net).into(), u32::from(ip).into(), prefix.unwrap_or(32), 32)
        }
        (IpAddr::V6(net), IpAddr::V6(ip)) => {
            prefix_matches(u128::from(net), u128::from(ip), prefix.unwrap_or(128), 128)
        }
        _ => false,
    }
}

fn prefix_matches(network: u128, ip: u128, prefix: u8, bits: u8) -> bool {
    if prefix > bits {
        tracing::warn!(prefix, bits, "CIDR prefix longer than address");
        return false;
    }
    if prefix == 0 {
        return true;
    }
    let shift = u32::from(bits - prefix);
    (network >> shift) == (ip >> shift)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserIdentity {
        UserIdentity::new("login", "realm")
    }

    fn query<'a>(user: &'a UserIdentity, client: Option<&'a str>) -> PolicyQuery<'a> {
        PolicyQuery {
            scope: "authentication",
            action: "sms_provider",
            user,
            realm: &user.realm,
            client,
        }
    }

    fn policy(name: &str) -> PolicyDescriptor {
        PolicyDescriptor::new(name, "authentication", "sms_provider=gw")
    }

    async fn matched_names(matcher: &StaticPolicyMatcher, query: PolicyQuery<'_>) -> Vec<String> {
        matcher
            .matching_policies(query)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect()
    }

    #[tokio::test]
    async fn wildcard_policy_matches_everyone() {
        let matcher = StaticPolicyMatcher::new(vec![policy("all")]);
        let user = user();

        assert_eq!(matched_names(&matcher, query(&user, None)).await, vec!["all"]);
        assert_eq!(
            matched_names(&matcher, query(&user, Some("10.1.2.3"))).await,
            vec!["all"]
        );
    }

    #[tokio::test]
    async fn skips_inactive_other_scope_and_other_action() {
        let matcher = StaticPolicyMatcher::new(vec![
            policy("inactive").inactive(),
            PolicyDescriptor::new("admin", "admin", "sms_provider=gw"),
            PolicyDescriptor::new("email", "authentication", "email_provider=mailer"),
            policy("kept"),
        ]);
        let user = user();

        assert_eq!(matched_names(&matcher, query(&user, None)).await, vec!["kept"]);
    }

    #[tokio::test]
    async fn flag_form_of_the_action_key_matches() {
        let matcher = StaticPolicyMatcher::new(vec![
            PolicyDescriptor::new("flag", "authentication", "otp_length=8, sms_provider"),
            PolicyDescriptor::new("case", "Authentication", "sms_provider=gw"),
        ]);
        let user = user();

        assert_eq!(matched_names(&matcher, query(&user, None)).await, vec!["flag"]);
    }

    #[tokio::test]
    async fn realm_and_user_selectors() {
        let matcher = StaticPolicyMatcher::new(vec![
            policy("other-realm").with_realm("elsewhere"),
            policy("realm-list").with_realm("elsewhere, REALM"),
            policy("other-user").with_user("someone"),
            policy("qualified").with_user("login@realm"),
            policy("qualified-other-realm").with_user("login@elsewhere"),
            policy("any-login-in-realm").with_user("*@realm"),
        ]);
        let user = user();

        assert_eq!(
            matched_names(&matcher, query(&user, None)).await,
            vec!["realm-list", "qualified", "any-login-in-realm"]
        );
    }

    #[tokio::test]
    async fn realm_override_is_used_for_matching() {
        let matcher = StaticPolicyMatcher::new(vec![policy("mapped").with_realm("mapped")]);
        let user = user();
        let mut q = query(&user, None);
        q.realm = "mapped";

        assert_eq!(matched_names(&matcher, q).await, vec!["mapped"]);
    }

    #[tokio::test]
    async fn client_selectors_support_addresses_and_networks() {
        let matcher = StaticPolicyMatcher::new(vec![
            policy("exact").with_client("123.123.123.123"),
            policy("network").with_client("123.123.0.0/16"),
            policy("elsewhere").with_client("10.0.0.0/8"),
            policy("v6").with_client("2001:db8::/32"),
            policy("broken").with_client("not-an-ip/99"),
        ]);
        let user = user();

        assert_eq!(
            matched_names(&matcher, query(&user, Some("123.123.123.123"))).await,
            vec!["exact", "network"]
        );
        assert_eq!(
            matched_names(&matcher, query(&user, Some("2001:db8::1"))).await,
            vec!["v6"]
        );
    }

    #[tokio::test]
    async fn absent_client_only_matches_wildcard_selectors() {
        let matcher = StaticPolicyMatcher::new(vec![
            policy("restricted").with_client("10.0.0.0/8"),
            policy("open").with_client(""),
        ]);
        let user = user();

        assert_eq!(matched_names(&matcher, query(&user, None)).await, vec!["open"]);
    }

    #[test]
    fn prefix_boundaries() {
        assert!(prefix_matches(0, u128::MAX, 0, 32));
        assert!(!prefix_matches(0, 0, 33, 32));
        assert!(client_entry_matches("192.168.1.0/24", "192.168.1.77".parse().unwrap()));
        assert!(!client_entry_matches("192.168.1.0/24", "192.168.2.1".parse().unwrap()));
        assert!(!client_entry_matches("192.168.1.0/24", "::1".parse().unwrap()));
    }
}
