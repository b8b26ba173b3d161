// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Column statistics stored in a table's or partition's `Parameters` map.
//!
//! Each column lives under its own key, `column_stats.<column>`, holding the
//! JSON encoding of [`ColumnStatistics`]. Unrelated parameters are never
//! touched.

use std::collections::{HashMap, HashSet};

use crate::error::{CatalogError, CatalogResult};
use crate::model::{ColumnStatistics, ColumnStatisticsMap};

pub const COLUMN_STATISTICS_PREFIX: &str = "column_stats.";

pub fn column_statistics_key(column: &str) -> String {
    format!("{}{}", COLUMN_STATISTICS_PREFIX, column)
}

/// Decode statistics for the requested columns. Columns without an entry are
/// omitted.
pub fn decode_column_statistics(
    parameters: &HashMap<String, String>,
    column_names: &HashSet<String>,
) -> CatalogResult<ColumnStatisticsMap> {
    let mut decoded = ColumnStatisticsMap::new();
    for column in column_names {
        let Some(raw) = parameters.get(&column_statistics_key(column)) else {
            continue;
        };
        let stats: ColumnStatistics = serde_json::from_str(raw).map_err(|e| {
            CatalogError::InvalidResponse(format!(
                "malformed statistics for column '{}': {}",
                column, e
            ))
        })?;
        decoded.insert(column.clone(), stats);
    }
    Ok(decoded)
}

/// Overlay `column_statistics` onto `parameters`. New values win on
/// collision; columns not mentioned keep their stored statistics.
pub fn merge_column_statistics(
    parameters: &mut HashMap<String, String>,
    column_statistics: &ColumnStatisticsMap,
) -> CatalogResult<()> {
    for (column, stats) in column_statistics {
        let encoded = serde_json::to_string(stats).map_err(|e| {
            CatalogError::InvalidArgument(format!(
                "cannot encode statistics for column '{}': {}",
                column, e
            ))
        })?;
        parameters.insert(column_statistics_key(column), encoded);
    }
    Ok(())
}
