use std::collections::HashMap;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::expression::ExpressionProfile;

const BUILTIN_GENES_JSON: &str = include_str!("../assets/genes.json");

/// One gene of the built-in catalog: descriptive metadata plus the
/// per-cell-type average expression profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneRecord {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub expression_profile: ExpressionProfile,
    pub pathways: Vec<String>,
    pub clinical_note: String,
    /// Curated hint shipped with the catalog; the displayed score is
    /// always derived from the profile instead.
    pub specificity_hint: f32,
}

/// Immutable gene table, loaded once at startup from the embedded JSON
/// asset. Iteration order is the order of the asset.
#[derive(Debug, Clone)]
pub struct GeneCatalog {
    genes: Vec<GeneRecord>,
    by_id: HashMap<String, usize>,
}

impl GeneCatalog {
    pub fn from_json_text(json_text: &str) -> Result<Self> {
        let res: serde_json::Value = serde_json::from_str(json_text)?;
        let arr = res
            .as_array()
            .ok_or(anyhow!("Gene catalog file is not a JSON array"))?;
        let mut genes: Vec<GeneRecord> = Vec::with_capacity(arr.len());
        let mut by_id = HashMap::with_capacity(arr.len());
        for row in arr {
            let gene: GeneRecord = match serde_json::from_str(&row.to_string()) {
                Ok(gene) => gene,
                Err(e) => return Err(anyhow!("Bad gene record: {row}: {e}")),
            };
            if by_id.insert(gene.id.clone(), genes.len()).is_some() {
                return Err(anyhow!("Duplicate gene id '{}'", gene.id));
            }
            genes.push(gene);
        }
        Ok(Self { genes, by_id })
    }

    pub fn lookup(&self, id: &str) -> Option<&GeneRecord> {
        self.by_id.get(id).map(|idx| &self.genes[*idx])
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.genes.iter().map(|g| g.id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneRecord> {
        self.genes.iter()
    }

    /// Case-insensitive substring match against gene ids, catalog order
    /// preserved.
    pub fn search(&self, query: &str) -> Vec<&str> {
        let query = query.to_lowercase();
        self.genes
            .iter()
            .filter(|g| g.id.to_lowercase().contains(&query))
            .map(|g| g.id.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

impl Default for GeneCatalog {
    fn default() -> Self {
        GeneCatalog::from_json_text(BUILTIN_GENES_JSON).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell_type::CellType;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = GeneCatalog::default();
        assert_eq!(catalog.len(), 43);
        assert_eq!(catalog.ids().next(), Some("CD3D"));
    }

    #[test]
    fn test_lookup_known_and_unknown() {
        let catalog = GeneCatalog::default();
        let cd3d = catalog.lookup("CD3D").unwrap();
        assert_eq!(cd3d.expression_profile.level(CellType::Cd4T), 8.5);
        assert!(catalog.lookup("NOPE").is_none());
        assert!(catalog.lookup("cd3d").is_none(), "lookup is exact-match");
    }

    #[test]
    fn test_search_is_case_insensitive_substring_in_catalog_order() {
        let catalog = GeneCatalog::default();
        assert_eq!(
            catalog.search("cd3"),
            vec!["CD3D", "CD3E"],
            "matches keep catalog order"
        );
        let brca = catalog.search("brCA");
        assert_eq!(brca, vec!["BRCA1", "BRCA2"]);
        assert!(catalog.search("zzz").is_empty());
        assert_eq!(catalog.search("").len(), catalog.len());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let text = r#"[
            {"id":"X","display_name":"X","description":"","expression_profile":{
                "CD4 T cells":1.0,"CD8 T cells":1.0,"NK cells":1.0,
                "B cells":1.0,"Monocytes":1.0,"Dendritic cells":1.0},
             "pathways":[],"clinical_note":"","specificity_hint":0.0},
            {"id":"X","display_name":"X","description":"","expression_profile":{
                "CD4 T cells":1.0,"CD8 T cells":1.0,"NK cells":1.0,
                "B cells":1.0,"Monocytes":1.0,"Dendritic cells":1.0},
             "pathways":[],"clinical_note":"","specificity_hint":0.0}
        ]"#;
        assert!(GeneCatalog::from_json_text(text).is_err());
    }

    #[test]
    fn test_every_profile_has_six_levels() {
        let catalog = GeneCatalog::default();
        for gene in catalog.iter() {
            for ct in CellType::ALL {
                assert!(gene.expression_profile.level(ct) >= 0.0);
            }
        }
    }
}
