use catalog::GeneCatalog;
use lazy_static::lazy_static;

pub mod about;
pub mod app;
pub mod catalog;
pub mod cell_table;
pub mod cell_type;
pub mod derived_views;
pub mod engine;
pub mod expression;
pub mod left_panel;
pub mod main_area;
pub mod render_bar;
pub mod render_export;
pub mod render_radar;
pub mod render_scatter;

lazy_static! {
    // The built-in gene catalog, loaded once from the embedded asset
    pub static ref CATALOG: GeneCatalog = GeneCatalog::default();
}
