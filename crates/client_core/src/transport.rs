//! URL building and query encoding for API requests.

use serde_json::Value;
use shared::domain::Conditions;
use url::Url;

use crate::error::ClientError;

/// Joins `path` onto `base` with exactly one `/` between segments.
///
/// Empty segments are dropped, a scheme's `//` is kept, and segments are not
/// decoded or checked for traversal.
pub fn join_url(base: &str, path: &str) -> String {
    let (scheme, rest) = match base.find("://") {
        Some(idx) => base.split_at(idx + 3),
        None => ("", base),
    };

    let segments: Vec<&str> = rest
        .split('/')
        .chain(path.split('/'))
        .filter(|segment| !segment.is_empty())
        .collect();

    let mut joined = String::with_capacity(base.len() + path.len());
    joined.push_str(scheme);
    if scheme.is_empty() && base.starts_with('/') {
        joined.push('/');
    }
    joined.push_str(&segments.join("/"));
    if path.ends_with('/') && !joined.ends_with('/') {
        joined.push('/');
    }
    joined
}

/// Resolves the configured api host into an absolute base url.
///
/// Absolute hosts are used as-is; relative ones (like the default `/api`) hang
/// off `origin`.
pub fn resolve_base_url(api_host: &str, origin: &str) -> Result<String, ClientError> {
    let resolved = if api_host.contains("://") {
        Url::parse(api_host)
    } else {
        Url::parse(origin).and_then(|origin| origin.join(api_host))
    }
    .map_err(|source| ClientError::InvalidBaseUrl {
        url: api_host.to_string(),
        source,
    })?;

    Ok(resolved.as_str().trim_end_matches('/').to_string())
}

/// Flattens row conditions into query pairs.
///
/// Nulls are left out, strings go raw, other scalars use their JSON text and
/// nested values are sent as JSON.
pub fn conditions_query(conditions: &Conditions) -> Vec<(String, String)> {
    conditions
        .iter()
        .filter_map(|(column, value)| {
            let encoded = match value {
                Value::Null => return None,
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            Some((column.clone(), encoded))
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
