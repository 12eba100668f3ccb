/*
 * Responsibility
 * - trusted header 名 → canonical attribute key の正規化
 * - 複数値 attribute (roles / service catalog) の分割
 */
use serde::Serialize;

/// Prefix carried by every header the upstream identity validator injects.
pub const IDENTITY_HEADER_PREFIX: &str = "X-";

/// Canonical keys whose raw value is a comma-separated list.
pub const MULTI_VALUED_KEYS: &[&str] = &["roles", "service_roles", "service_catalog"];

const LIST_DELIMITER: char = ',';

/// Value of one identity attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Scalar(String),
    List(Vec<String>),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            Self::Scalar(_) => None,
        }
    }
}

pub fn is_identity_header(name: &str) -> bool {
    name.starts_with(IDENTITY_HEADER_PREFIX)
}

/// "X-Project-Id" => "project_id"
///
/// Total: a name without the prefix is normalized as-is. Callers filter with
/// [`is_identity_header`] first.
pub fn normalize(header_name: &str) -> String {
    header_name
        .strip_prefix(IDENTITY_HEADER_PREFIX)
        .unwrap_or(header_name)
        .replace('-', "_")
        .to_lowercase()
}

pub fn is_multi_valued(key: &str) -> bool {
    MULTI_VALUED_KEYS.contains(&key)
}

/// Splits a delimited list, trimming each element and dropping empty ones.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(LIST_DELIMITER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Maps one trusted header to its `(key, value)` attribute, or `None` for
/// headers outside the identity prefix.
pub fn map_header(name: &str, raw_value: &str) -> Option<(String, AttributeValue)> {
    if !is_identity_header(name) {
        return None;
    }

    let key = normalize(name);
    let value = if is_multi_valued(&key) {
        AttributeValue::List(split_list(raw_value))
    } else {
        AttributeValue::Scalar(raw_value.to_string())
    };

    Some((key, value))
}
