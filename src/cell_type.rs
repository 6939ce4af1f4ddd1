use eframe::egui::Color32;
use serde::{Deserialize, Serialize};

/// The six fixed immune cell subsets of the simulated PBMC dataset.
///
/// Serde names are the exact user-facing labels; they double as the JSON
/// wire form for the catalog asset and the CLI exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CellType {
    #[serde(rename = "CD4 T cells")]
    Cd4T,
    #[serde(rename = "CD8 T cells")]
    Cd8T,
    #[serde(rename = "NK cells")]
    Nk,
    #[serde(rename = "B cells")]
    B,
    #[serde(rename = "Monocytes")]
    Monocytes,
    #[serde(rename = "Dendritic cells")]
    Dendritic,
}

impl CellType {
    pub const ALL: [CellType; 6] = [
        CellType::Cd4T,
        CellType::Cd8T,
        CellType::Nk,
        CellType::B,
        CellType::Monocytes,
        CellType::Dendritic,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CellType::Cd4T => "CD4 T cells",
            CellType::Cd8T => "CD8 T cells",
            CellType::Nk => "NK cells",
            CellType::B => "B cells",
            CellType::Monocytes => "Monocytes",
            CellType::Dendritic => "Dendritic cells",
        }
    }

    /// Radar axis label, the full label with the " cells" suffix stripped.
    pub fn short_label(&self) -> &'static str {
        match self {
            CellType::Cd4T => "CD4 T",
            CellType::Cd8T => "CD8 T",
            CellType::Nk => "NK",
            CellType::B => "B",
            CellType::Monocytes => "Monocytes",
            CellType::Dendritic => "Dendritic",
        }
    }

    /// Fixed label→color table used for the base scatter coloring and the
    /// bar chart fills.
    pub fn color_hex(&self) -> &'static str {
        match self {
            CellType::Cd4T => "#FF6B6B",
            CellType::Cd8T => "#4ECDC4",
            CellType::Nk => "#45B7D1",
            CellType::B => "#FFA07A",
            CellType::Monocytes => "#98D8C8",
            CellType::Dendritic => "#C7CEEA",
        }
    }

    /// Position in [`CellType::ALL`]; expression profiles store their six
    /// levels in this order.
    pub fn index(&self) -> usize {
        match self {
            CellType::Cd4T => 0,
            CellType::Cd8T => 1,
            CellType::Nk => 2,
            CellType::B => 3,
            CellType::Monocytes => 4,
            CellType::Dendritic => 5,
        }
    }
}

/// Parses a `#RRGGBB` string into an egui color. Unknown input falls back
/// to mid-gray, matching the original app's `'#999'` fallback.
pub fn hex_color32(hex: &str) -> Color32 {
    let parse = |s: &str| u8::from_str_radix(s, 16).ok();
    if let Some(rest) = hex.strip_prefix('#') {
        if rest.len() == 6 {
            if let (Some(r), Some(g), Some(b)) =
                (parse(&rest[0..2]), parse(&rest[2..4]), parse(&rest[4..6]))
            {
                return Color32::from_rgb(r, g, b);
            }
        }
    }
    Color32::from_rgb(0x99, 0x99, 0x99)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_order_matches_index() {
        for (i, ct) in CellType::ALL.iter().enumerate() {
            assert_eq!(ct.index(), i);
        }
    }

    #[test]
    fn test_labels_round_trip_through_serde() {
        for ct in CellType::ALL {
            let json = serde_json::to_string(&ct).unwrap();
            assert_eq!(json, format!("\"{}\"", ct.label()));
            let back: CellType = serde_json::from_str(&json).unwrap();
            assert_eq!(back, ct);
        }
    }

    #[test]
    fn test_hex_color32() {
        assert_eq!(hex_color32("#FF6B6B"), Color32::from_rgb(0xFF, 0x6B, 0x6B));
        assert_eq!(hex_color32("bogus"), Color32::from_rgb(0x99, 0x99, 0x99));
    }
}
