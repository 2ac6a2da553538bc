//! Environment variable references (`$NAME` / `${NAME}`) inside config values.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static ENV_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(?:\{(\w+)\}|(\w+))").expect("regex"));

/// Variable names referenced by `value`, in order of appearance.
pub fn references(value: &str) -> impl Iterator<Item = &str> {
    ENV_REF.captures_iter(value).filter_map(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|name| name.as_str())
    })
}

/// First referenced variable across `values` that `lookup` cannot resolve.
pub fn first_undefined_with<'a, F>(
    values: impl IntoIterator<Item = &'a str>,
    lookup: F,
) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    values
        .into_iter()
        .flat_map(|value| references(value))
        .find(|name| lookup(name).is_none())
        .map(str::to_string)
}

/// Substitute every reference in `value` with its resolved value.
pub fn expand_with<F>(value: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    ENV_REF
        .replace_all(value, |caps: &Captures| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .and_then(|name| lookup(name.as_str()))
                .unwrap_or_default()
        })
        .into_owned()
}

/// Resolve a variable from the process environment.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
}
