//! Parsing of policy action strings.
//!
//! An action is a comma separated list of assignments such as
//! `sms_provider=primary backup, otp_length=8`. A fragment without `=` is a
//! bare flag wherever it appears, so `sms_provider=gw, passthru` assigns `gw`
//! and sets the `passthru` flag.

use crate::models::ProviderName;

/// One `key=value` assignment. Flags carry an empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment<'a> {
    pub key: &'a str,
    pub value: String,
}

pub fn parse_action(action: &str) -> Vec<Assignment<'_>> {
    let mut assignments: Vec<Assignment<'_>> = Vec::new();

    for fragment in action.split(',') {
        match fragment.split_once('=') {
            Some((key, value)) => assignments.push(Assignment {
                key: key.trim(),
                value: value.to_string(),
            }),
            None if fragment.trim().is_empty() => {}
            None => assignments.push(Assignment {
                key: fragment.trim(),
                value: String::new(),
            }),
        }
    }

    assignments
}

/// Whether `key` is assigned or set as a flag anywhere in `action`.
pub fn has_action_key(action: &str, key: &str) -> bool {
    parse_action(action).iter().any(|a| a.key == key)
}

/// The joined values of every assignment to `key`, or `None` if the action
/// never mentions it.
pub fn action_value(action: &str, key: &str) -> Option<String> {
    let values: Vec<String> = parse_action(action)
        .into_iter()
        .filter(|a| a.key == key)
        .map(|a| a.value)
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.join(","))
    }
}

/// Split a provider list value on any run of whitespace and commas.
pub fn parse_provider_list(value: &str) -> Vec<ProviderName> {
    value
        .split(|c: char| c.is_whitespace() || c == ',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ProviderName::from)
        .collect()
}

/// Provider names assigned to `key` in `action`, in the order written.
pub fn providers_from_action(action: &str, key: &str) -> Vec<ProviderName> {
    action_value(action, key)
        .map(|value| parse_provider_list(&value))
        .unwrap_or_default()
}
