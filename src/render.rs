// ============================================================================
// GRID RENDERER — grid + hover state → ordered draw commands
// ============================================================================
//
// Layering, back to front:
//   backdrop image (half opacity) → background → separator lines →
//   cell shapes → hover-region preview → pointer dot
//
// `render` is pure; `paint` replays the commands onto an egui painter.

use eframe::egui;
use egui::{Color32, Pos2, Rect, Stroke, TextureId, Vec2};

use crate::geometry::resolve;
use crate::grid::{CellState, Corner, Grid};

pub const BACKGROUND_COLOR: Color32 = Color32::WHITE;
pub const INK_COLOR: Color32 = Color32::BLACK;
const GRID_LINE_COLOR: Color32 = Color32::from_rgb(200, 200, 200);
const BACKDROP_OPACITY: f32 = 0.5;
const MARKER_RADIUS: f32 = 3.0;
/// Smallest on-screen cell the canvas will shrink to.
pub const MIN_VISIBLE_CELL: f32 = 1.0;

/// Geometry of a painted cell, in whatever coordinate space `rect` was given.
#[derive(Clone, Debug, PartialEq)]
pub enum CellShape {
    Square(Rect),
    Triangle([Pos2; 3]),
}

/// Shape that `state` occupies inside `rect`; `None` for empty cells.
///
/// Triangles are the half of the cell containing the named corner: the right
/// angle sits at that corner and the hypotenuse is the opposite diagonal.
pub fn cell_shape(state: CellState, rect: Rect) -> Option<CellShape> {
    let (tl, tr) = (rect.left_top(), rect.right_top());
    let (bl, br) = (rect.left_bottom(), rect.right_bottom());
    match state {
        CellState::Empty => None,
        CellState::Filled => Some(CellShape::Square(rect)),
        CellState::Triangle(Corner::TopLeft) => Some(CellShape::Triangle([tl, tr, bl])),
        CellState::Triangle(Corner::TopRight) => Some(CellShape::Triangle([tl, tr, br])),
        CellState::Triangle(Corner::BottomLeft) => Some(CellShape::Triangle([tl, br, bl])),
        CellState::Triangle(Corner::BottomRight) => Some(CellShape::Triangle([tr, br, bl])),
    }
}

/// Screen rectangle of cell `(row, col)` for a grid drawn at `origin`.
pub fn cell_rect(origin: Pos2, cell_size: f32, row: usize, col: usize) -> Rect {
    Rect::from_min_size(
        origin + Vec2::new(col as f32 * cell_size, row as f32 * cell_size),
        Vec2::splat(cell_size),
    )
}

/// On-screen cell size: `preferred`, shrunk so `grid_size` cells fit in
/// `available` along its shorter side.
pub fn fit_cell_size(available: Vec2, grid_size: usize, preferred: f32) -> f32 {
    let side = available.x.min(available.y).max(0.0);
    let fit = side / grid_size.max(1) as f32;
    preferred.min(fit).max(MIN_VISIBLE_CELL)
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Image {
        texture: TextureId,
        rect: Rect,
        tint: Color32,
    },
    Rect {
        rect: Rect,
        color: Color32,
    },
    Line {
        from: Pos2,
        to: Pos2,
        stroke: Stroke,
    },
    Polygon {
        points: Vec<Pos2>,
        color: Color32,
    },
    Circle {
        center: Pos2,
        radius: f32,
        color: Color32,
    },
}

impl DrawCommand {
    fn shape(shape: CellShape, color: Color32) -> DrawCommand {
        match shape {
            CellShape::Square(rect) => DrawCommand::Rect { rect, color },
            CellShape::Triangle(points) => DrawCommand::Polygon {
                points: points.to_vec(),
                color,
            },
        }
    }
}

/// Everything a frame of the editor canvas depends on.
pub struct RenderParams<'a> {
    pub grid: &'a Grid,
    /// Screen position of the grid's top-left corner.
    pub origin: Pos2,
    pub cell_size: f32,
    /// Pointer position relative to `origin`, if over the canvas.
    pub hover: Option<Vec2>,
    /// Shape to preview for the hovered cell; defaults to the region's mode.
    pub hover_mode: Option<CellState>,
    pub backdrop: Option<TextureId>,
    pub show_grid_lines: bool,
}

pub fn render(params: &RenderParams<'_>) -> Vec<DrawCommand> {
    let n = params.grid.size();
    let cs = params.cell_size;
    let extent = Rect::from_min_size(params.origin, Vec2::splat(n as f32 * cs));
    let mut out = Vec::with_capacity(n * n + 2 * n + 8);

    if let Some(texture) = params.backdrop {
        out.push(DrawCommand::Image {
            texture,
            rect: extent,
            tint: Color32::from_white_alpha((255.0 * BACKDROP_OPACITY) as u8),
        });
    }

    // A backdrop stays visible through a translucent background
    let background = if params.backdrop.is_some() {
        Color32::from_white_alpha(96)
    } else {
        BACKGROUND_COLOR
    };
    out.push(DrawCommand::Rect {
        rect: extent,
        color: background,
    });

    if params.show_grid_lines {
        let stroke = Stroke::new(1.0, GRID_LINE_COLOR);
        for i in 0..=n {
            let offset = i as f32 * cs;
            out.push(DrawCommand::Line {
                from: params.origin + Vec2::new(offset, 0.0),
                to: params.origin + Vec2::new(offset, extent.height()),
                stroke,
            });
            out.push(DrawCommand::Line {
                from: params.origin + Vec2::new(0.0, offset),
                to: params.origin + Vec2::new(extent.width(), offset),
                stroke,
            });
        }
    }

    for (row, col, state) in params.grid.iter_cells() {
        if let Some(shape) = cell_shape(state, cell_rect(params.origin, cs, row, col)) {
            out.push(DrawCommand::shape(shape, INK_COLOR));
        }
    }

    if let Some(hover) = params.hover {
        if let Some(hit) = resolve(hover.x, hover.y, cs, n) {
            let mode = params.hover_mode.unwrap_or_else(|| hit.region.paint_mode());
            let rect = cell_rect(params.origin, cs, hit.row, hit.col);
            // Erase previews as the whole cell
            let preview = cell_shape(mode, rect).unwrap_or(CellShape::Square(rect));
            out.push(DrawCommand::shape(
                preview,
                Color32::from_rgba_unmultiplied(0, 120, 255, 90),
            ));
        }
        out.push(DrawCommand::Circle {
            center: params.origin + hover,
            radius: MARKER_RADIUS,
            color: Color32::from_rgb(255, 64, 64),
        });
    }

    out
}

/// Replay draw commands onto an egui painter.
pub fn paint(painter: &egui::Painter, commands: &[DrawCommand]) {
    let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
    for cmd in commands {
        match cmd {
            DrawCommand::Image { texture, rect, tint } => {
                painter.image(*texture, *rect, uv, *tint);
            }
            DrawCommand::Rect { rect, color } => {
                painter.rect_filled(*rect, 0.0, *color);
            }
            DrawCommand::Line { from, to, stroke } => {
                painter.line_segment([*from, *to], *stroke);
            }
            DrawCommand::Polygon { points, color } => {
                painter.add(egui::Shape::convex_polygon(points.clone(), *color, Stroke::NONE));
            }
            DrawCommand::Circle { center, radius, color } => {
                painter.circle_filled(*center, *radius, *color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_size_shrinks_to_fit_the_view() {
        // Default cell size fits a 26-grid in a roomy view
        assert_eq!(fit_cell_size(Vec2::new(900.0, 700.0), 26, 24.0), 24.0);
        // Growing past the view shrinks cells so the last row stays visible
        let cs = fit_cell_size(Vec2::new(900.0, 650.0), 28, 24.0);
        assert!(cs * 28.0 <= 650.0 + 1e-3);
        assert!(cs < 24.0);
        // The largest grid still fits
        let cs = fit_cell_size(Vec2::new(800.0, 600.0), 256, 24.0);
        assert!(cs * 256.0 <= 600.0 + 1e-3);
        // Degenerate views fall back to the floor
        assert_eq!(fit_cell_size(Vec2::new(-5.0, 0.0), 10, 24.0), MIN_VISIBLE_CELL);
    }

    fn params(grid: &Grid) -> RenderParams<'_> {
        RenderParams {
            grid,
            origin: Pos2::new(10.0, 20.0),
            cell_size: 8.0,
            hover: None,
            hover_mode: None,
            backdrop: None,
            show_grid_lines: true,
        }
    }

    #[test]
    fn triangle_shapes_keep_the_named_corner() {
        let rect = Rect::from_min_size(Pos2::ZERO, Vec2::splat(1.0));
        for &corner in Corner::all() {
            let Some(CellShape::Triangle(pts)) = cell_shape(CellState::Triangle(corner), rect) else {
                panic!("expected triangle");
            };
            let anchor = match corner {
                Corner::TopLeft => rect.left_top(),
                Corner::TopRight => rect.right_top(),
                Corner::BottomLeft => rect.left_bottom(),
                Corner::BottomRight => rect.right_bottom(),
            };
            let opposite = match corner.opposite() {
                Corner::TopLeft => rect.left_top(),
                Corner::TopRight => rect.right_top(),
                Corner::BottomLeft => rect.left_bottom(),
                Corner::BottomRight => rect.right_bottom(),
            };
            assert!(pts.contains(&anchor));
            assert!(!pts.contains(&opposite));
        }
        assert_eq!(cell_shape(CellState::Empty, rect), None);
    }

    #[test]
    fn empty_grid_draws_background_and_lines_only() {
        let grid = Grid::new(3);
        let cmds = render(&params(&grid));
        assert_eq!(cmds.len(), 1 + 2 * 4);
        assert!(matches!(cmds[0], DrawCommand::Rect { color: BACKGROUND_COLOR, .. }));
        assert!(cmds[1..].iter().all(|c| matches!(c, DrawCommand::Line { .. })));
    }

    #[test]
    fn layers_are_ordered_back_to_front() {
        let mut grid = Grid::new(2);
        grid.set(0, 0, CellState::Filled);
        grid.set(1, 1, CellState::Triangle(Corner::TopLeft));
        let mut p = params(&grid);
        p.backdrop = Some(TextureId::Managed(1));
        p.hover = Some(Vec2::new(12.0, 4.0));
        let cmds = render(&p);

        assert!(matches!(cmds[0], DrawCommand::Image { .. }));
        assert!(matches!(cmds[1], DrawCommand::Rect { .. }));
        let lines_end = 2 + 2 * 3;
        assert!(cmds[2..lines_end].iter().all(|c| matches!(c, DrawCommand::Line { .. })));
        assert_eq!(
            cmds[lines_end],
            DrawCommand::Rect {
                rect: cell_rect(p.origin, 8.0, 0, 0),
                color: INK_COLOR
            }
        );
        assert!(matches!(cmds[lines_end + 1], DrawCommand::Polygon { color: INK_COLOR, .. }));
        assert!(matches!(cmds[lines_end + 2], DrawCommand::Rect { .. } | DrawCommand::Polygon { .. }));
        assert!(matches!(cmds.last(), Some(DrawCommand::Circle { .. })));
        assert_eq!(cmds.len(), lines_end + 4);
    }

    #[test]
    fn hover_outside_grid_only_draws_marker() {
        let grid = Grid::new(2);
        let mut p = params(&grid);
        p.show_grid_lines = false;
        p.hover = Some(Vec2::new(100.0, 4.0));
        let cmds = render(&p);
        assert_eq!(cmds.len(), 2);
        assert!(matches!(cmds[1], DrawCommand::Circle { .. }));
    }

    #[test]
    fn hover_preview_follows_region() {
        let grid = Grid::new(1);
        let mut p = params(&grid);
        p.show_grid_lines = false;
        p.hover = Some(Vec2::new(7.5, 0.5));
        let cmds = render(&p);
        let rect = cell_rect(p.origin, 8.0, 0, 0);
        let Some(CellShape::Triangle(expected)) = cell_shape(CellState::Triangle(Corner::TopRight), rect) else {
            panic!("expected triangle");
        };
        match &cmds[1] {
            DrawCommand::Polygon { points, .. } => assert_eq!(points.as_slice(), &expected),
            other => panic!("unexpected {other:?}"),
        }
    }
}
