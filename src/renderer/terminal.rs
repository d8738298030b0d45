//! Top-down character rasterizer for the terminal.
//!
//! Projects the scene onto the X/Z plane around the camera target, one cell
//! per `units_per_cell` world units (columns are doubled to compensate for
//! the cell aspect ratio). Annotation overlays are drawn on top.
//!
//! The first frame is written in full; later frames write only the cells
//! that changed.

use std::collections::BTreeMap;
use std::io::{self, Write};

use crossterm::{cursor, queue, style};
use glam::{Vec2, Vec3};

use crate::engine::source::Annotation;
use crate::errors::Result;
use crate::types::{
    AnnotationView, CameraState, Color, NamedColor, PrimitiveHandle, PrimitiveSpec, Shape,
    Transform,
};

use super::RenderAdapter;

/// Approximate pixel size of one terminal cell, for annotation offsets.
const CELL_PIXELS: Vec2 = Vec2::new(8.0, 16.0);

/// Particle systems draw at most this many points.
const MAX_DRAWN_PARTICLES: u32 = 512;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    ch: char,
    fg: Option<Color>,
    bold: bool,
    dim: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            ch: ' ',
            fg: None,
            bold: false,
            dim: false,
        }
    }
}

struct Overlay {
    text: String,
    offset: Option<Vec2>,
    view: AnnotationView,
}

pub struct TerminalAdapter {
    width: u16,
    height: u16,
    /// Terminal row of the canvas' top edge.
    origin_row: u16,
    units_per_cell: f32,
    primitives: BTreeMap<PrimitiveHandle, (PrimitiveSpec, Transform)>,
    overlays: Vec<Overlay>,
    camera: Option<CameraState>,
    prev_grid: Option<Vec<Vec<Cell>>>,
    next_handle: u64,
    out: io::Stdout,
}

impl TerminalAdapter {
    pub fn new(width: u16, height: u16, origin_row: u16, units_per_cell: f32) -> Self {
        TerminalAdapter {
            width,
            height,
            origin_row,
            units_per_cell: units_per_cell.max(f32::EPSILON),
            primitives: BTreeMap::new(),
            overlays: Vec::new(),
            camera: None,
            prev_grid: None,
            next_handle: 0,
            out: io::stdout(),
        }
    }

    /// Force the next frame to be written in full (after a resize or clear).
    pub fn invalidate(&mut self) {
        self.prev_grid = None;
    }

    // -----------------------------------------------------------------------
    // Rasterization
    // -----------------------------------------------------------------------

    fn center(&self) -> Vec3 {
        self.camera.map_or(Vec3::ZERO, |c| c.target)
    }

    /// World position → (column, row) on the canvas. May be off-canvas.
    fn project(&self, p: Vec3) -> (i32, i32) {
        let c = self.center();
        let col = f32::from(self.width) / 2.0 + (p.x - c.x) / self.units_per_cell * 2.0;
        let row = f32::from(self.height) / 2.0 + (p.z - c.z) / self.units_per_cell;
        (col.round() as i32, row.round() as i32)
    }

    fn rasterize(&self) -> Vec<Vec<Cell>> {
        let w = self.width as usize;
        let h = self.height as usize;
        let mut grid = vec![vec![Cell::default(); w]; h];

        // Ground planes first, then everything else from low to high.
        let mut ordered: Vec<_> = self.primitives.values().collect();
        ordered.sort_by(|(sa, ta), (sb, tb)| {
            let plane_a = !matches!(sa.shape, Shape::Plane { .. });
            let plane_b = !matches!(sb.shape, Shape::Plane { .. });
            plane_a
                .cmp(&plane_b)
                .then(ta.position.y.total_cmp(&tb.position.y))
        });

        for (spec, transform) in ordered {
            let cell = Cell {
                ch: ' ',
                fg: Some(spec.material.color),
                bold: spec.material.emissive.is_some(),
                dim: spec.material.opacity < 0.5,
            };
            self.draw_shape(&mut grid, &spec.shape, transform, cell);
        }

        for (i, overlay) in self.overlays.iter().enumerate() {
            if !overlay.view.visible {
                continue;
            }
            let (col, row) = match overlay.offset {
                Some(offset) => {
                    let cells = offset / CELL_PIXELS;
                    (cells.x as i64, cells.y as i64)
                }
                None => (1, h as i64 - 1 - i as i64),
            };
            let cell = Cell {
                ch: ' ',
                fg: Some(Color::WHITE),
                bold: true,
                dim: overlay.view.opacity < 0.5,
            };
            put_text(&mut grid, col, row, &overlay.text, cell);
        }

        grid
    }

    fn draw_shape(&self, grid: &mut [Vec<Cell>], shape: &Shape, t: &Transform, cell: Cell) {
        let upc = self.units_per_cell;
        let (col, row) = self.project(t.position);
        match shape {
            Shape::Sphere { radius } => {
                fill_disc(grid, col, row, radius * t.scale.x / upc, Cell { ch: '@', ..cell });
            }
            Shape::Cylinder { radius, .. } => {
                fill_disc(grid, col, row, radius * t.scale.x / upc, Cell { ch: '%', ..cell });
            }
            Shape::Cube { width, depth, .. } => {
                let half = Vec2::new(width * t.scale.x, depth * t.scale.z) / (2.0 * upc);
                fill_rect(grid, col, row, half, Cell { ch: '#', ..cell });
            }
            Shape::Plane { width, height } => {
                let half = Vec2::new(width * t.scale.x, height * t.scale.y) / (2.0 * upc);
                fill_rect(grid, col, row, half, Cell { ch: '.', ..cell });
            }
            Shape::Line { points } => {
                let projected: Vec<_> = points
                    .iter()
                    .map(|p| self.project(*p * t.scale + t.position))
                    .collect();
                for pair in projected.windows(2) {
                    draw_segment(grid, pair[0], pair[1], Cell { ch: '*', ..cell });
                }
                if let [only] = projected.as_slice() {
                    put(grid, only.0.into(), only.1.into(), Cell { ch: '*', ..cell });
                }
            }
            Shape::Particles { count, spread } => {
                for i in 0..(*count).min(MAX_DRAWN_PARTICLES) {
                    let offset = scatter(i) * *spread * t.scale;
                    let (c, r) = self.project(t.position + offset);
                    put(grid, c.into(), r.into(), Cell { ch: '·', ..cell });
                }
            }
            Shape::Text { content, .. } => {
                let start = i64::from(col) - content.chars().count() as i64 / 2;
                put_text(grid, start, row.into(), content, cell);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Terminal output
    // -----------------------------------------------------------------------

    fn write_cell(&mut self, x: usize, y: usize, cell: &Cell) -> io::Result<()> {
        queue!(
            self.out,
            cursor::MoveTo(x as u16, y as u16 + self.origin_row),
            style::PrintStyledContent(style::StyledContent::new(to_content_style(cell), cell.ch)),
        )
    }
}

impl RenderAdapter for TerminalAdapter {
    fn create_primitive(&mut self, spec: &PrimitiveSpec) -> Result<PrimitiveHandle> {
        let handle = PrimitiveHandle(self.next_handle);
        self.next_handle += 1;
        self.primitives
            .insert(handle, (spec.clone(), Transform::default()));
        Ok(handle)
    }

    fn set_transform(&mut self, handle: PrimitiveHandle, transform: &Transform) -> Result<()> {
        if let Some(entry) = self.primitives.get_mut(&handle) {
            entry.1 = *transform;
        }
        Ok(())
    }

    fn render_frame(&mut self) -> Result<()> {
        let grid = self.rasterize();
        match self.prev_grid.take() {
            None => {
                for (y, row) in grid.iter().enumerate() {
                    for (x, cell) in row.iter().enumerate() {
                        self.write_cell(x, y, cell)?;
                    }
                }
            }
            Some(prev) => {
                for (y, (prev_row, next_row)) in prev.iter().zip(grid.iter()).enumerate() {
                    for (x, (prev_cell, next_cell)) in prev_row.iter().zip(next_row).enumerate() {
                        if prev_cell != next_cell {
                            self.write_cell(x, y, next_cell)?;
                        }
                    }
                }
            }
        }
        self.out.flush()?;
        self.prev_grid = Some(grid);
        Ok(())
    }

    fn destroy_primitive(&mut self, handle: PrimitiveHandle) -> Result<()> {
        self.primitives.remove(&handle);
        Ok(())
    }

    fn set_camera(&mut self, camera: &CameraState) -> Result<()> {
        self.camera = Some(*camera);
        Ok(())
    }

    fn create_annotation(&mut self, index: usize, annotation: &Annotation) -> Result<()> {
        if self.overlays.len() <= index {
            self.overlays.resize_with(index + 1, || Overlay {
                text: String::new(),
                offset: None,
                view: AnnotationView::HIDDEN,
            });
        }
        self.overlays[index] = Overlay {
            text: annotation.text.clone(),
            offset: annotation.position,
            view: AnnotationView::HIDDEN,
        };
        Ok(())
    }

    fn update_annotation(&mut self, index: usize, view: AnnotationView) -> Result<()> {
        if let Some(overlay) = self.overlays.get_mut(index) {
            overlay.view = view;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Grid drawing helpers
// ---------------------------------------------------------------------------

fn put(grid: &mut [Vec<Cell>], col: i64, row: i64, cell: Cell) {
    let (Ok(col), Ok(row)) = (usize::try_from(col), usize::try_from(row)) else {
        return;
    };
    if let Some(slot) = grid.get_mut(row).and_then(|r| r.get_mut(col)) {
        *slot = cell;
    }
}

fn put_text(grid: &mut [Vec<Cell>], col: i64, row: i64, text: &str, cell: Cell) {
    for (i, ch) in text.chars().enumerate() {
        put(grid, col.saturating_add(i as i64), row, Cell { ch, ..cell });
    }
}

/// Canvas extent as (columns, rows).
fn grid_size(grid: &[Vec<Cell>]) -> (i64, i64) {
    let w = grid.first().map_or(0, Vec::len);
    (w as i64, grid.len() as i64)
}

/// Half extents in cells, bounded so that `center ± extent` cannot overflow.
fn extent(cells: f32) -> i64 {
    (cells.max(0.0) as i64).min(i64::from(i32::MAX))
}

/// Disc of `radius` rows; a single cell when smaller than one.
/// Only the on-canvas part is visited.
fn fill_disc(grid: &mut [Vec<Cell>], col: i32, row: i32, radius: f32, cell: Cell) {
    let (col, row) = (i64::from(col), i64::from(row));
    if radius.is_nan() || radius < 1.0 {
        put(grid, col, row, Cell { ch: 'o', ..cell });
        return;
    }
    let (w, h) = grid_size(grid);
    let r = extent(radius.ceil());
    for y in (row - r).max(0)..=(row + r).min(h - 1) {
        for x in (col - 2 * r).max(0)..=(col + 2 * r).min(w - 1) {
            let dx = (x - col) as f32 / 2.0;
            let dy = (y - row) as f32;
            if dx * dx + dy * dy <= radius * radius {
                put(grid, x, y, cell);
            }
        }
    }
}

/// Rectangle with half extents in cells (X doubled for aspect).
fn fill_rect(grid: &mut [Vec<Cell>], col: i32, row: i32, half: Vec2, cell: Cell) {
    let (col, row) = (i64::from(col), i64::from(row));
    let (w, h) = grid_size(grid);
    let hx = extent((half.x * 2.0).round());
    let hy = extent(half.y.round());
    for y in (row - hy).max(0)..=(row + hy).min(h - 1) {
        for x in (col - hx).max(0)..=(col + hx).min(w - 1) {
            put(grid, x, y, cell);
        }
    }
}

/// Draw the part of the segment that lies on the canvas.
fn draw_segment(grid: &mut [Vec<Cell>], from: (i32, i32), to: (i32, i32), cell: Cell) {
    let (w, h) = grid_size(grid);
    let from = (f64::from(from.0), f64::from(from.1));
    let to = (f64::from(to.0), f64::from(to.1));
    let Some((a, b)) = clip_segment(from, to, (w - 1) as f64, (h - 1) as f64) else {
        return;
    };
    let steps = (b.0 - a.0).abs().max((b.1 - a.1).abs()).ceil().max(1.0) as i64;
    for i in 0..=steps {
        let f = i as f64 / steps as f64;
        let c = a.0 + (b.0 - a.0) * f;
        let r = a.1 + (b.1 - a.1) * f;
        put(grid, c.round() as i64, r.round() as i64, cell);
    }
}

/// Liang–Barsky clip of a segment to `[0, max_x] × [0, max_y]`.
fn clip_segment(
    from: (f64, f64),
    to: (f64, f64),
    max_x: f64,
    max_y: f64,
) -> Option<((f64, f64), (f64, f64))> {
    if max_x < 0.0 || max_y < 0.0 {
        return None;
    }
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    for (p, q) in [
        (-dx, from.0),
        (dx, max_x - from.0),
        (-dy, from.1),
        (dy, max_y - from.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
        }
    }
    if t0 > t1 {
        return None;
    }
    let at = |t: f64| (from.0 + dx * t, from.1 + dy * t);
    Some((at(t0), at(t1)))
}

/// Deterministic pseudo-random offset in the unit cube for particle `i`.
fn scatter(i: u32) -> Vec3 {
    let mut state = i.wrapping_mul(747_796_405).wrapping_add(2_891_336_453);
    let mut next = || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        (state as f32 / u32::MAX as f32) * 2.0 - 1.0
    };
    Vec3::new(next(), next(), next())
}

// ---------------------------------------------------------------------------
// Style conversion
// ---------------------------------------------------------------------------

fn to_content_style(cell: &Cell) -> style::ContentStyle {
    let mut cs = style::ContentStyle::default();
    if let Some(fg) = &cell.fg {
        cs.foreground_color = Some(to_ct_color(fg));
    }
    if cell.bold {
        cs.attributes.set(style::Attribute::Bold);
    }
    if cell.dim {
        cs.attributes.set(style::Attribute::Dim);
    }
    cs
}

pub fn to_ct_color(c: &Color) -> style::Color {
    match c {
        Color::Named(n) => match n {
            NamedColor::Black => style::Color::Black,
            NamedColor::Red => style::Color::Red,
            NamedColor::Green => style::Color::Green,
            NamedColor::Yellow => style::Color::Yellow,
            NamedColor::Blue => style::Color::Blue,
            NamedColor::Magenta => style::Color::Magenta,
            NamedColor::Cyan => style::Color::Cyan,
            NamedColor::White => style::Color::White,
            NamedColor::Grey => style::Color::Grey,
        },
        Color::Rgb { r, g, b } => style::Color::Rgb {
            r: *r,
            g: *g,
            b: *b,
        },
    }
}
