//! Resolution of the providers that deliver an authentication challenge.
//!
//! Policies of the `authentication` scope name providers through an action
//! key derived from the channel (`sms` reads `sms_provider`). Every matching
//! policy contributes its names in match order, first occurrence wins. When
//! no policy contributes anything the channel's configured default is used.
//! An empty result is never returned.

use super::action::providers_from_action;
use super::matcher::{MatcherError, PolicyMatcher, PolicyQuery};
use super::metrics::{
    record_resolution, OUTCOME_DEFAULT, OUTCOME_MATCHER_ERROR, OUTCOME_POLICY,
    OUTCOME_UNCONFIGURED,
};
use super::registry::DefaultProviderRegistry;
use crate::models::{Channel, ProviderName, RequestContext, ResolvedProviderList, UserIdentity};
use serde::Serialize;
use service_core::error::AppError;
use std::sync::Arc;
use thiserror::Error;

pub const AUTHENTICATION_SCOPE: &str = "authentication";

const PROVIDER_ACTION_SUFFIX: &str = "_provider";

/// The action key naming providers for `channel`, e.g. `sms_provider`.
pub fn provider_action_key(channel: Channel) -> String {
    format!("{}{}", channel, PROVIDER_ACTION_SUFFIX)
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Policy matcher unavailable: {0}")]
    MatcherUnavailable(#[from] MatcherError),

    #[error("No {channel} provider configured")]
    NoProviderConfigured { channel: Channel },
}

impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::MatcherUnavailable(e) => AppError::BadGateway(e.to_string()),
            e @ ResolveError::NoProviderConfigured { .. } => {
                AppError::ConfigError(anyhow::anyhow!(e))
            }
        }
    }
}

/// Overrides for a single resolution. Unset fields use the defaults.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Policy scope, `authentication` by default.
    pub scope: Option<String>,
    /// Action key, derived from the channel by default.
    pub action: Option<String>,
    /// Realm handed to the matcher, the user's realm by default.
    pub realm: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionSource {
    Policy,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub providers: ResolvedProviderList,
    pub source: ResolutionSource,
    /// Names of the policies that contributed providers.
    pub policies: Vec<String>,
}

#[derive(Clone)]
pub struct ProviderResolver {
    matcher: Arc<dyn PolicyMatcher>,
    defaults: Arc<dyn DefaultProviderRegistry>,
}

impl ProviderResolver {
    pub fn new(
        matcher: Arc<dyn PolicyMatcher>,
        defaults: Arc<dyn DefaultProviderRegistry>,
    ) -> Self {
        Self { matcher, defaults }
    }

    pub async fn resolve(
        &self,
        channel: Channel,
        user: &UserIdentity,
        context: &RequestContext,
    ) -> Result<ResolvedProviderList, ResolveError> {
        self.resolve_with(channel, user, context, &ResolveOptions::default())
            .await
            .map(|resolution| resolution.providers)
    }

    #[tracing::instrument(
        skip(self, channel, user, context, options),
        fields(channel = %channel, user = %user, client = ?context.client_address())
    )]
    pub async fn resolve_with(
        &self,
        channel: Channel,
        user: &UserIdentity,
        context: &RequestContext,
        options: &ResolveOptions,
    ) -> Result<Resolution, ResolveError> {
        let scope = options.scope.as_deref().unwrap_or(AUTHENTICATION_SCOPE);
        let action = options
            .action
            .clone()
            .unwrap_or_else(|| provider_action_key(channel));
        let realm = options.realm.as_deref().unwrap_or(&user.realm);

        let query = PolicyQuery {
            scope,
            action: &action,
            user,
            realm,
            client: context.client_address(),
        };

        let policies = match self.matcher.matching_policies(query).await {
            Ok(policies) => policies,
            Err(e) => {
                tracing::error!(error = %e, scope = %scope, action = %action, "Policy lookup failed");
                record_resolution(channel, OUTCOME_MATCHER_ERROR);
                return Err(e.into());
            }
        };

        let mut providers: Vec<ProviderName> = Vec::new();
        let mut contributing = Vec::new();

        for policy in &policies {
            if !policy.active || policy.scope != scope {
                tracing::debug!(policy = %policy.name, "Ignoring inactive or out-of-scope policy");
                continue;
            }

            let names = providers_from_action(&policy.action, &action);
            if names.is_empty() {
                tracing::debug!(
                    policy = %policy.name,
                    action = %action,
                    "Policy names no providers"
                );
                continue;
            }

            for name in names {
                if !providers.contains(&name) {
                    providers.push(name);
                }
            }
            contributing.push(policy.name.clone());
        }

        if let Some(providers) = ResolvedProviderList::new(providers) {
            tracing::info!(
                providers = ?providers.as_slice(),
                policies = ?contributing,
                "Resolved providers from policy"
            );
            record_resolution(channel, OUTCOME_POLICY);
            return Ok(Resolution {
                providers,
                source: ResolutionSource::Policy,
                policies: contributing,
            });
        }

        match self.defaults.default_provider(channel).await {
            Some(provider) => {
                tracing::info!(
                    provider = %provider,
                    matched_policies = policies.len(),
                    "No policy names a provider, using default"
                );
                record_resolution(channel, OUTCOME_DEFAULT);
                Ok(Resolution {
                    providers: ResolvedProviderList::single(provider),
                    source: ResolutionSource::Default,
                    policies: Vec::new(),
                })
            }
            None => {
                tracing::warn!("No policy names a provider and no default is configured");
                record_resolution(channel, OUTCOME_UNCONFIGURED);
                Err(ResolveError::NoProviderConfigured { channel })
            }
        }
    }
}
