// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Conversion between Hive-style partition names (`k1=v1/k2=v2`) and the
//! value lists Glue identifies partitions by.

use crate::error::{CatalogError, CatalogResult};

/// Split a partition name into its (unescaped) values, in key order.
pub fn partition_values(partition_name: &str) -> CatalogResult<Vec<String>> {
    if partition_name.is_empty() {
        return Err(CatalogError::InvalidArgument(
            "partition name is empty".to_string(),
        ));
    }

    partition_name
        .split('/')
        .map(|segment| match segment.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok(unescape_path_name(value)),
            _ => Err(CatalogError::InvalidArgument(format!(
                "malformed partition name '{}': segment '{}' is not key=value",
                partition_name, segment
            ))),
        })
        .collect()
}

/// Build a partition name from key names and values.
pub fn make_partition_name(keys: &[String], values: &[String]) -> CatalogResult<String> {
    if keys.len() != values.len() {
        return Err(CatalogError::InvalidResponse(format!(
            "partition has {} values but table has {} partition keys",
            values.len(),
            keys.len()
        )));
    }

    Ok(keys
        .iter()
        .zip(values)
        .map(|(key, value)| format!("{}={}", escape_path_name(key), escape_path_name(value)))
        .collect::<Vec<_>>()
        .join("/"))
}

fn needs_escaping(c: char) -> bool {
    c.is_ascii_control()
        || matches!(
            c,
            '"' | '#' | '%' | '\'' | '*' | '/' | ':' | '=' | '?' | '\\' | '{' | '[' | ']' | '^'
        )
}

pub fn escape_path_name(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars() {
        if needs_escaping(c) {
            escaped.push_str(&format!("%{:02X}", c as u32));
        } else {
            escaped.push(c);
        }
    }
    escaped
}

pub fn unescape_path_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut unescaped = String::with_capacity(name.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '%' && i + 2 < chars.len() {
            let hex: String = chars[i + 1..=i + 2].iter().collect();
            if let Ok(code) = u8::from_str_radix(&hex, 16) {
                unescaped.push(char::from(code));
                i += 3;
                continue;
            }
        }
        unescaped.push(chars[i]);
        i += 1;
    }
    unescaped
}
