pub const ATLAS_DISPLAY_VERSION: &str = env!("ATLAS_DISPLAY_VERSION");
pub const ATLAS_BUILD_N: &str = env!("ATLAS_BUILD_N");

pub fn version_cli_text() -> String {
    format!(
        "CellAtlas {}\nBuild {}\nSingle-cell gene expression explorer",
        ATLAS_DISPLAY_VERSION, ATLAS_BUILD_N
    )
}

pub fn footer_text() -> String {
    format!(
        "Demo dataset: simulated PBMC ({} cells) • CellAtlas {}",
        crate::cell_table::CELL_COUNT,
        ATLAS_DISPLAY_VERSION
    )
}
