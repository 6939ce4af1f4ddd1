use eframe::egui::{self, Align2, Color32, FontFamily, FontId, Pos2, Rect, Sense, Stroke, Vec2};
use lazy_static::lazy_static;

use crate::catalog::GeneRecord;
use crate::cell_type::{CellType, hex_color32};
use crate::derived_views::ExpressionPoint;
use crate::expression::BUCKET_COLORS;

lazy_static! {
    pub static ref GRID_STROKE: Stroke = Stroke {
        width: 1.0,
        color: Color32::from_rgb(0xE2, 0xE8, 0xF0),
    };
}

/// Axis window around the [-10, 10] coordinate range so jittered points
/// never clip.
const DOMAIN: f32 = 12.0;
const POINT_RADIUS: f32 = 2.0;
const HOVER_RADIUS: f32 = 6.0;

/// The UMAP scatter of all simulated cells. Points are colored by cell type
/// while browsing without a selection, and by expression bucket once a gene
/// is selected.
#[derive(Debug)]
pub struct RenderScatter<'a> {
    points: &'a [ExpressionPoint],
    gene: Option<&'a GeneRecord>,
    area: Rect,
}

impl<'a> RenderScatter<'a> {
    pub fn new(points: &'a [ExpressionPoint], gene: Option<&'a GeneRecord>) -> Self {
        Self {
            points,
            gene,
            area: Rect::NOTHING,
        }
    }

    pub fn render(&mut self, ui: &mut egui::Ui) {
        let size = ui.available_size_before_wrap();
        let (response, painter) = ui.allocate_painter(size, Sense::hover());
        self.area = response.rect;

        self.draw_grid(&painter);
        for point in self.points {
            painter.circle_filled(
                self.plot_pos(point.coord1, point.coord2),
                POINT_RADIUS,
                hex_color32(point.plot_color()).gamma_multiply(0.8),
            );
        }
        self.draw_legend(&painter);
        if let Some(pos) = response.hover_pos() {
            self.draw_hover_tooltip(&painter, pos);
        }
    }

    fn plot_pos(&self, coord1: f32, coord2: f32) -> Pos2 {
        Pos2 {
            x: self.area.left() + (coord1 + DOMAIN) / (2.0 * DOMAIN) * self.area.width(),
            y: self.area.top() + (DOMAIN - coord2) / (2.0 * DOMAIN) * self.area.height(),
        }
    }

    fn draw_grid(&self, painter: &egui::Painter) {
        let font_tick = FontId {
            size: 9.0,
            family: FontFamily::Monospace,
        };
        let mut tick = -10i32;
        while tick <= 10 {
            let p = self.plot_pos(tick as f32, tick as f32);
            painter.line_segment(
                [
                    Pos2::new(p.x, self.area.top()),
                    Pos2::new(p.x, self.area.bottom()),
                ],
                GRID_STROKE.to_owned(),
            );
            painter.line_segment(
                [
                    Pos2::new(self.area.left(), p.y),
                    Pos2::new(self.area.right(), p.y),
                ],
                GRID_STROKE.to_owned(),
            );
            painter.text(
                Pos2::new(p.x, self.area.bottom() - 2.0),
                Align2::CENTER_BOTTOM,
                format!("{tick}"),
                font_tick.to_owned(),
                Color32::GRAY,
            );
            tick += 5;
        }
    }

    fn draw_legend(&self, painter: &egui::Painter) {
        let font = FontId {
            size: 10.0,
            family: FontFamily::Proportional,
        };
        let base = Pos2::new(self.area.left() + 8.0, self.area.top() + 8.0);
        match self.gene {
            Some(_) => {
                painter.text(
                    base,
                    Align2::LEFT_TOP,
                    "Low",
                    font.to_owned(),
                    Color32::DARK_GRAY,
                );
                let mut x = base.x + 28.0;
                for color in BUCKET_COLORS {
                    painter.rect_filled(
                        Rect::from_min_size(Pos2::new(x, base.y), Vec2::new(18.0, 10.0)),
                        0.0,
                        hex_color32(color),
                    );
                    x += 20.0;
                }
                painter.text(
                    Pos2::new(x + 4.0, base.y),
                    Align2::LEFT_TOP,
                    "High",
                    font,
                    Color32::DARK_GRAY,
                );
            }
            None => {
                let mut y = base.y;
                for ct in CellType::ALL {
                    painter.rect_filled(
                        Rect::from_min_size(Pos2::new(base.x, y), Vec2::new(10.0, 10.0)),
                        0.0,
                        hex_color32(ct.color_hex()),
                    );
                    painter.text(
                        Pos2::new(base.x + 14.0, y),
                        Align2::LEFT_TOP,
                        ct.label(),
                        font.to_owned(),
                        Color32::DARK_GRAY,
                    );
                    y += 14.0;
                }
            }
        }
    }

    fn draw_hover_tooltip(&self, painter: &egui::Painter, pos: Pos2) {
        let nearest = self
            .points
            .iter()
            .map(|p| (p, self.plot_pos(p.coord1, p.coord2).distance(pos)))
            .filter(|(_, d)| *d <= HOVER_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(p, _)| p);
        let Some(point) = nearest else {
            return;
        };
        let label = match point.expression {
            Some(value) => format!(
                "Cell {} · {} · {:.2}",
                point.id,
                point.cell_type.label(),
                value
            ),
            None => format!("Cell {} · {}", point.id, point.cell_type.label()),
        };
        let font = FontId {
            size: 11.0,
            family: FontFamily::Monospace,
        };
        let anchor = Pos2::new(pos.x + 10.0, pos.y - 10.0);
        let galley_rect = painter
            .text(anchor, Align2::LEFT_BOTTOM, &label, font.to_owned(), Color32::TRANSPARENT)
            .expand(3.0);
        painter.rect_filled(galley_rect, 2.0, Color32::from_black_alpha(190));
        painter.text(anchor, Align2::LEFT_BOTTOM, label, font, Color32::WHITE);
    }
}
