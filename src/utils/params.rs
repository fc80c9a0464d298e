//! Best-effort parsing of query parameters.
//!
//! Query values arrive as strings; lists are comma separated. Malformed values
//! never fail a request: booleans fall back to `false`, integers to `0`, and
//! malformed list elements are dropped.

use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParamError {
    #[error("Invalid label selector: {0}")]
    InvalidLabelSelector(#[from] serde_json::Error),
}

pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_bool(value: &str) -> bool {
    value == "true"
}

pub fn parse_bools(value: &str) -> Vec<bool> {
    value
        .split(',')
        .filter(|item| !item.is_empty())
        .map(parse_bool)
        .collect()
}

pub fn parse_uint32(value: &str) -> u32 {
    value.parse::<u32>().unwrap_or(0)
}

pub fn parse_uint32s(value: &str) -> Vec<u32> {
    value
        .split(',')
        .filter_map(|item| item.parse::<u32>().ok())
        .collect()
}

/// Turns `[{"app":"x"},{"env":"y"}]` into `app=x,env=y`.
///
/// Every pair of every map is emitted, keys of one map in sorted order.
pub fn parse_label_selector(value: &str) -> Result<String, ParamError> {
    if value.trim().is_empty() {
        return Ok(String::new());
    }
    let selectors: Vec<BTreeMap<String, String>> = serde_json::from_str(value)?;
    let pairs: Vec<String> = selectors
        .iter()
        .flat_map(|selector| selector.iter().map(|(k, v)| format!("{k}={v}")))
        .collect();
    Ok(pairs.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("TRUE"));
        assert!(!parse_bool("1"));
        assert!(!parse_bool(""));
    }

    #[test]
    fn test_parse_bools() {
        assert_eq!(parse_bools("true,false,yes,true"), vec![true, false, false, true]);
        assert!(parse_bools("").is_empty());
    }

    #[test]
    fn test_parse_uint32() {
        assert_eq!(parse_uint32("42"), 42);
        assert_eq!(parse_uint32(""), 0);
        assert_eq!(parse_uint32("-1"), 0);
        assert_eq!(parse_uint32("abc"), 0);
        assert_eq!(parse_uint32("4294967296"), 0);
    }

    #[test]
    fn test_parse_uint32s_drops_invalid() {
        assert_eq!(parse_uint32s("1,x,3,,-4,5"), vec![1, 3, 5]);
        assert!(parse_uint32s("").is_empty());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a,b,,c"), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_parse_label_selector() {
        let selector = parse_label_selector(r#"[{"app":"x"},{"env":"y"}]"#).unwrap();
        assert_eq!(selector, "app=x,env=y");
    }

    #[test]
    fn test_parse_label_selector_multi_key_map_is_stable() {
        let selector = parse_label_selector(r#"[{"tier":"web","app":"x"}]"#).unwrap();
        assert_eq!(selector, "app=x,tier=web");
    }

    #[test]
    fn test_parse_label_selector_empty_and_invalid() {
        assert_eq!(parse_label_selector("").unwrap(), "");
        assert_eq!(parse_label_selector("[]").unwrap(), "");
        assert!(parse_label_selector("{not json").is_err());
    }
}
