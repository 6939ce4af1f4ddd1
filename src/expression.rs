use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cell_type::CellType;

/// Expression bucket colors, low to high, used to paint cells once a gene
/// is selected.
pub const BUCKET_PALE_GRAY: &str = "#E8E8E8";
pub const BUCKET_PALE_ORANGE: &str = "#FEE5D9";
pub const BUCKET_LIGHT_ORANGE: &str = "#FCAE91";
pub const BUCKET_ORANGE_RED: &str = "#FB6A4A";
pub const BUCKET_DEEP_RED: &str = "#CB181D";

pub const BUCKET_COLORS: [&str; 5] = [
    BUCKET_PALE_GRAY,
    BUCKET_PALE_ORANGE,
    BUCKET_LIGHT_ORANGE,
    BUCKET_ORANGE_RED,
    BUCKET_DEEP_RED,
];

/// Per-gene average expression level for each of the six cell types.
///
/// Serialized as a JSON map keyed by the full cell-type labels; all six
/// labels must be present. Values are plotted as-is, no range validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<CellType, f32>", into = "BTreeMap<CellType, f32>")]
pub struct ExpressionProfile {
    levels: [f32; 6],
}

impl ExpressionProfile {
    /// Levels in [`CellType::ALL`] order.
    pub fn new(levels: [f32; 6]) -> Self {
        Self { levels }
    }

    pub fn level(&self, cell_type: CellType) -> f32 {
        self.levels[cell_type.index()]
    }

    pub fn levels(&self) -> impl Iterator<Item = (CellType, f32)> + '_ {
        CellType::ALL.iter().map(|ct| (*ct, self.level(*ct)))
    }

    pub fn max_level(&self) -> f32 {
        self.levels.iter().copied().fold(0.0f32, f32::max)
    }

    /// Percentage measure of how much the highest cell type's expression
    /// exceeds the average of the other five:
    /// `round((max - avg_others) / max * 100)`.
    ///
    /// Exactly one occurrence of the maximum (by slot) is excluded from the
    /// average, so an all-equal nonzero profile scores 0. Policy for the
    /// degenerate all-zero profile: returns 0.
    pub fn specificity_score(&self) -> i32 {
        let max_idx = self
            .levels
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let max = self.levels[max_idx];
        if max == 0.0 {
            return 0;
        }
        let sum_others: f32 = self
            .levels
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != max_idx)
            .map(|(_, v)| *v)
            .sum();
        let avg_others = sum_others / (self.levels.len() - 1) as f32;
        ((max - avg_others) / max * 100.0).round() as i32
    }
}

impl TryFrom<BTreeMap<CellType, f32>> for ExpressionProfile {
    type Error = String;

    fn try_from(map: BTreeMap<CellType, f32>) -> Result<Self, Self::Error> {
        let mut levels = [0.0f32; 6];
        for ct in CellType::ALL {
            match map.get(&ct) {
                Some(v) => levels[ct.index()] = *v,
                None => return Err(format!("expression profile is missing '{}'", ct.label())),
            }
        }
        Ok(Self { levels })
    }
}

impl From<ExpressionProfile> for BTreeMap<CellType, f32> {
    fn from(profile: ExpressionProfile) -> Self {
        profile.levels().collect()
    }
}

/// Deterministic step function from an expression value to a bucket color.
/// Boundaries are inclusive below, exclusive above; the last bucket is
/// unbounded. A missing value maps to pale gray.
pub fn expression_color_bucket(value: Option<f32>) -> &'static str {
    let Some(value) = value else {
        return BUCKET_PALE_GRAY;
    };
    if value < 1.0 {
        BUCKET_PALE_GRAY
    } else if value < 3.0 {
        BUCKET_PALE_ORANGE
    } else if value < 5.0 {
        BUCKET_LIGHT_ORANGE
    } else if value < 7.0 {
        BUCKET_ORANGE_RED
    } else {
        BUCKET_DEEP_RED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(levels: [f32; 6]) -> ExpressionProfile {
        ExpressionProfile::new(levels)
    }

    #[test]
    fn test_specificity_single_expressed_type_is_100() {
        assert_eq!(
            profile([10.0, 0.0, 0.0, 0.0, 0.0, 0.0]).specificity_score(),
            100
        );
    }

    #[test]
    fn test_specificity_flat_nonzero_profile_is_0() {
        assert_eq!(
            profile([3.0, 3.0, 3.0, 3.0, 3.0, 3.0]).specificity_score(),
            0
        );
    }

    #[test]
    fn test_specificity_all_zero_profile_is_0() {
        assert_eq!(profile([0.0; 6]).specificity_score(), 0);
    }

    #[test]
    fn test_specificity_rounding() {
        // max = 9.0, avg_others = 1.0 → 88.888… rounds to 89.
        assert_eq!(
            profile([9.0, 1.0, 1.0, 1.0, 1.0, 1.0]).specificity_score(),
            89
        );
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(expression_color_bucket(None), BUCKET_PALE_GRAY);
        assert_eq!(expression_color_bucket(Some(0.5)), BUCKET_PALE_GRAY);
        assert_eq!(expression_color_bucket(Some(1.0)), BUCKET_PALE_ORANGE);
        assert_eq!(expression_color_bucket(Some(2.999)), BUCKET_PALE_ORANGE);
        assert_eq!(expression_color_bucket(Some(3.0)), BUCKET_LIGHT_ORANGE);
        assert_eq!(expression_color_bucket(Some(5.0)), BUCKET_ORANGE_RED);
        assert_eq!(expression_color_bucket(Some(6.999)), BUCKET_ORANGE_RED);
        assert_eq!(expression_color_bucket(Some(7.0)), BUCKET_DEEP_RED);
        assert_eq!(expression_color_bucket(Some(42.0)), BUCKET_DEEP_RED);
    }

    #[test]
    fn test_profile_deserialize_requires_all_labels() {
        let good = r#"{
            "CD4 T cells": 1.0, "CD8 T cells": 2.0, "NK cells": 3.0,
            "B cells": 4.0, "Monocytes": 5.0, "Dendritic cells": 6.0
        }"#;
        let p: ExpressionProfile = serde_json::from_str(good).unwrap();
        assert_eq!(p.level(crate::cell_type::CellType::Monocytes), 5.0);

        let missing = r#"{
            "CD4 T cells": 1.0, "CD8 T cells": 2.0, "NK cells": 3.0,
            "B cells": 4.0, "Monocytes": 5.0
        }"#;
        assert!(serde_json::from_str::<ExpressionProfile>(missing).is_err());
    }
}
