//! Scene rasterisation.
//!
//! Maps the retained [`Scene`] onto terminal cells. World pixels become cells
//! through [`CellMetrics`]; the main layer is drawn in element creation
//! order (parents before children), then the minimap on top.

use super::styles::SceneStyles;
use crate::layout::{Decoration, Header, HeaderSlot};
use crate::model::{Point, Rect, Size};
use crate::scene::{ElementHandle, Layer, NodeAttrs, Scene};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect as Area;
use ratatui::style::Style;
use ratatui::widgets::Widget;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Size of one terminal cell in world pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    /// Pixels per column.
    pub cell_width: f64,
    /// Pixels per row.
    pub cell_height: f64,
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self {
            cell_width: 8.0,
            cell_height: 16.0,
        }
    }
}

impl CellMetrics {
    /// Surface size covered by `columns` x `rows` cells.
    pub fn surface_size(&self, columns: u16, rows: u16) -> Size {
        Size::new(
            f64::from(columns) * self.cell_width,
            f64::from(rows) * self.cell_height,
        )
    }

    /// Surface point at the centre of a cell relative to the diagram area.
    pub fn cell_center(&self, column: u16, row: u16) -> Point {
        Point::new(
            (f64::from(column) + 0.5) * self.cell_width,
            (f64::from(row) + 0.5) * self.cell_height,
        )
    }

    /// Column index containing surface x; may be negative.
    fn column(&self, x: f64) -> i64 {
        (x / self.cell_width).floor() as i64
    }

    /// Row index containing surface y; may be negative.
    fn row(&self, y: f64) -> i64 {
        (y / self.cell_height).floor() as i64
    }
}

/// Cells covered by a surface rectangle, before clipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellSpan {
    left: i64,
    top: i64,
    right: i64,
    bottom: i64,
}

impl CellSpan {
    /// Every non-empty rectangle covers at least one cell.
    fn of(rect: &Rect, cell: CellMetrics) -> Option<Self> {
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return None;
        }
        let left = cell.column(rect.x);
        let top = cell.row(rect.y);
        let right = ((rect.right() / cell.cell_width).ceil() as i64).max(left + 1);
        let bottom = ((rect.bottom() / cell.cell_height).ceil() as i64).max(top + 1);
        Some(Self {
            left,
            top,
            right,
            bottom,
        })
    }

    fn width(&self) -> i64 {
        self.right - self.left
    }

    fn height(&self) -> i64 {
        self.bottom - self.top
    }
}

/// Writes into the buffer inside `area`, in area-relative cell coordinates.
struct Canvas<'b> {
    area: Area,
    buf: &'b mut Buffer,
    cell: CellMetrics,
}

impl Canvas<'_> {
    fn cell_mut(&mut self, column: i64, row: i64) -> Option<&mut ratatui::buffer::Cell> {
        let inside = (0..i64::from(self.area.width)).contains(&column)
            && (0..i64::from(self.area.height)).contains(&row);
        if !inside {
            return None;
        }
        let x = self.area.x + column as u16;
        let y = self.area.y + row as u16;
        self.buf.cell_mut((x, y))
    }

    fn fill(&mut self, rect: &Rect, style: Style) {
        let Some(span) = CellSpan::of(rect, self.cell) else {
            return;
        };
        for row in span.top..span.bottom {
            for column in span.left..span.right {
                if let Some(cell) = self.cell_mut(column, row) {
                    cell.set_symbol(" ");
                    cell.set_style(style);
                }
            }
        }
    }

    fn restyle(&mut self, rect: &Rect, style: Style) {
        let Some(span) = CellSpan::of(rect, self.cell) else {
            return;
        };
        for row in span.top..span.bottom {
            for column in span.left..span.right {
                if let Some(cell) = self.cell_mut(column, row) {
                    cell.set_style(style);
                }
            }
        }
    }

    /// Box-drawing outline; spans narrower than two cells only get the style.
    fn outline(&mut self, rect: &Rect, style: Style) {
        let Some(span) = CellSpan::of(rect, self.cell) else {
            return;
        };
        if span.width() < 2 || span.height() < 2 {
            self.restyle(rect, style);
            return;
        }
        let (right, bottom) = (span.right - 1, span.bottom - 1);
        for column in span.left..=right {
            for row in [span.top, bottom] {
                let symbol = match (column == span.left, column == right, row == span.top) {
                    (true, _, true) => "┌",
                    (_, true, true) => "┐",
                    (true, _, false) => "└",
                    (_, true, false) => "┘",
                    _ => "─",
                };
                self.put(column, row, symbol, style);
            }
        }
        for row in span.top + 1..bottom {
            self.put(span.left, row, "│", style);
            self.put(right, row, "│", style);
        }
    }

    fn put(&mut self, column: i64, row: i64, symbol: &str, style: Style) {
        if let Some(cell) = self.cell_mut(column, row) {
            cell.set_symbol(symbol);
            cell.set_style(style);
        }
    }

    /// Single-line label on the middle row of `rect`, cut to its width.
    fn label(&mut self, rect: &Rect, text: &str, style: Style) {
        let Some(span) = CellSpan::of(rect, self.cell) else {
            return;
        };
        let row = self.cell.row(rect.y + rect.height / 2.0);
        let fitted = fit_to_width(text, span.width().max(0) as usize);
        let mut column = span.left;
        for ch in fitted.chars() {
            let width = ch.width().unwrap_or(0) as i64;
            if width == 0 {
                continue;
            }
            let mut buf = [0u8; 4];
            self.put(column, row, ch.encode_utf8(&mut buf), style);
            // the trailing half of a wide glyph
            for skip in 1..width {
                self.put(column + skip, row, "", style);
            }
            column += width;
        }
    }
}

/// Truncate `text` to at most `max` columns, ending in `…` when cut.
pub fn fit_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let width = ch.width().unwrap_or(0);
        if used + width > max - 1 {
            break;
        }
        out.push(ch);
        used += width;
    }
    out.push('…');
    out
}

/// Glyph for a decoration image reference.
fn image_glyph(image: &str) -> Option<&'static str> {
    match image {
        "expander:open" => Some("▾"),
        "expander:closed" => Some("▸"),
        _ if image.starts_with("flag:") => Some("⚑"),
        _ => None,
    }
}

/// Widget drawing a recorded scene.
#[derive(Debug, Clone, Copy)]
pub struct SceneWidget<'a> {
    scene: &'a Scene,
    cell: CellMetrics,
    styles: SceneStyles,
}

impl<'a> SceneWidget<'a> {
    /// Widget for `scene` at the given cell size.
    pub fn new(scene: &'a Scene, cell: CellMetrics) -> Self {
        Self {
            scene,
            cell,
            styles: SceneStyles::default(),
        }
    }

    /// Use `styles` instead of the default colors.
    pub fn styles(mut self, styles: SceneStyles) -> Self {
        self.styles = styles;
        self
    }

    fn draw_node(&self, canvas: &mut Canvas<'_>, handle: ElementHandle, attrs: &NodeAttrs) {
        let offset = self.scene.root_transform;
        let body = attrs.rect.translate(offset);
        let origin = body.origin();
        let palette = &attrs.palette;

        canvas.fill(&body, self.styles.bg(&palette.bg_fill));
        let header = Rect::new(body.x, body.y, body.width, attrs.header_height);
        canvas.restyle(&header, self.styles.bg(&palette.header_bg_fill));
        let highlight = Rect::new(body.x, body.y, attrs.header_highlight_width, attrs.header_height);
        canvas.restyle(&highlight, self.styles.bg(&palette.header_fill));
        canvas.outline(&body, self.styles.fg(&palette.stroke));

        for Header { slot, rect, text } in &attrs.headers {
            let rect = rect.translate(origin);
            match (slot, text) {
                (HeaderSlot::Logo, _) => canvas.label(&rect, "◆", self.styles.fg(&palette.stroke)),
                (_, Some(text)) => canvas.label(&rect, text, Style::default()),
                (_, None) => {}
            }
        }

        for deco in self.scene.decorations_of(handle) {
            let Decoration {
                rect,
                fill,
                text,
                image,
                ..
            } = &deco.decoration;
            let rect = rect.translate(origin);
            if let Some(fill) = fill {
                canvas.fill(&rect, self.styles.bg(fill));
            }
            let content = text
                .as_deref()
                .or_else(|| image.as_deref().and_then(image_glyph));
            if let Some(content) = content {
                canvas.label(&rect, content, Style::default());
            }
        }
    }

    fn draw_minimap(&self, canvas: &mut Canvas<'_>) {
        let Some(frame) = &self.scene.minimap else {
            return;
        };
        canvas.fill(&frame.bounds(), self.styles.minimap);

        let scaled = |rect: &Rect| {
            Rect::new(
                frame.origin.x + rect.x * frame.scale,
                frame.origin.y + rect.y * frame.scale,
                rect.width * frame.scale,
                rect.height * frame.scale,
            )
        };
        for (_, element) in self.scene.layer(Layer::Minimap) {
            let Some(attrs) = &element.minimap_attrs else {
                continue;
            };
            canvas.restyle(&scaled(&attrs.rect), self.styles.bg(&attrs.bg_fill));
            let strip = Rect::new(
                attrs.rect.x,
                attrs.rect.y,
                attrs.header_highlight_width,
                attrs.header_height,
            );
            canvas.restyle(&scaled(&strip), self.styles.bg(&attrs.header_fill));
        }

        canvas.outline(
            &frame.visible.translate(frame.origin),
            self.styles.visible_region,
        );
    }
}

impl Widget for SceneWidget<'_> {
    fn render(self, area: Area, buf: &mut Buffer) {
        let mut canvas = Canvas {
            area,
            buf,
            cell: self.cell,
        };
        for (handle, element) in self.scene.layer(Layer::Main) {
            if let Some(attrs) = &element.attrs {
                self.draw_node(&mut canvas, *handle, attrs);
            }
        }
        self.draw_minimap(&mut canvas);
    }
}

/// Rasterise `scene` into `area` of `buf` with default styles.
pub fn render_scene(scene: &Scene, cell: CellMetrics, area: Area, buf: &mut Buffer) {
    SceneWidget::new(scene, cell).render(area, buf);
}

#[cfg(test)]
#[path = "canvas_tests.rs"]
mod tests;
