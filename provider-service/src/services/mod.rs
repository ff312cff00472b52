pub mod action;
pub mod matcher;
pub mod metrics;
pub mod registry;
pub mod resolver;

pub use matcher::{MatcherError, PolicyMatcher, PolicyQuery, StaticPolicyMatcher};
pub use metrics::{get_metrics, init_metrics, record_resolution};
pub use registry::{ConfiguredDefaultProviders, DefaultProviderRegistry};
pub use resolver::{
    provider_action_key, ProviderResolver, Resolution, ResolutionSource, ResolveError,
    ResolveOptions, AUTHENTICATION_SCOPE,
};
