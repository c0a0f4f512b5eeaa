//! Terminal rendering of a [`NodeTree`] and the overlays stacked on it.
//!
//! `UiFrame` wraps `ratatui::Frame` and clips every draw call to the visible
//! area, so dialog rectangles computed for a small terminal cannot write
//! outside the buffer. The page is drawn first, then the backdrop dims it,
//! then each overlay slot is drawn in ascending z-index order.

use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap};

use crate::document::{Document, NodeTree};
use crate::handle::NodeId;
use crate::manager::OverlayManager;

pub const DIALOG_WIDTH: u16 = 48;
pub const DIALOG_HEIGHT: u16 = 9;
const CASCADE_STEP: u16 = 2;

pub struct UiFrame<'a> {
    area: Rect,
    buffer: &'a mut Buffer,
}

impl<'a> UiFrame<'a> {
    pub fn new(frame: &'a mut Frame<'_>) -> Self {
        let area = frame.area();
        let buffer = frame.buffer_mut();
        Self { area, buffer }
    }

    /// Draw into an offscreen buffer, as tests do.
    pub fn from_parts(area: Rect, buffer: &'a mut Buffer) -> Self {
        Self { area, buffer }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        self.buffer
    }

    fn clip_rect(&self, rect: Rect) -> Option<Rect> {
        let clipped = rect.intersection(self.area);
        if clipped.width == 0 || clipped.height == 0 {
            None
        } else {
            Some(clipped)
        }
    }

    pub fn render_widget<W>(&mut self, widget: W, area: Rect)
    where
        W: Widget,
    {
        if let Some(clipped) = self.clip_rect(area) {
            widget.render(clipped, self.buffer);
        }
    }

    pub fn dim(&mut self, area: Rect) {
        let Some(area) = self.clip_rect(area) else {
            return;
        };
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        for y in area.y..area.y.saturating_add(area.height) {
            for x in area.x..area.x.saturating_add(area.width) {
                if let Some(cell) = self.buffer.cell_mut((x, y)) {
                    cell.set_style(dim_style);
                }
            }
        }
    }
}

pub(crate) fn truncate_to_width(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    value.chars().take(width).collect()
}

/// Centered dialog rectangle, shifted down and right by `depth` steps so
/// stacked dialogs stay distinguishable. Clamped to `area`.
pub fn dialog_rect(area: Rect, depth: usize) -> Rect {
    let mut width = area.width.min(DIALOG_WIDTH).max(1);
    let mut height = area.height.min(DIALOG_HEIGHT).max(1);
    if area.width >= 24 {
        width = width.max(24);
    }
    if area.height >= 5 {
        height = height.max(5);
    }
    let shift = u16::try_from(depth)
        .unwrap_or(u16::MAX)
        .saturating_mul(CASCADE_STEP);
    let max_x = area.x.saturating_add(area.width.saturating_sub(width));
    let max_y = area.y.saturating_add(area.height.saturating_sub(height));
    let x = area
        .x
        .saturating_add(area.width.saturating_sub(width) / 2)
        .saturating_add(shift)
        .min(max_x);
    let y = area
        .y
        .saturating_add(area.height.saturating_sub(height) / 2)
        .saturating_add(shift / 2)
        .min(max_y);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn node_line(doc: &NodeTree, node: NodeId, width: usize) -> Option<Line<'static>> {
    let text = doc.text(node).filter(|t| !t.is_empty())?;
    if !doc.is_focusable(node) {
        return Some(Line::from(truncate_to_width(text, width)));
    }
    let label = truncate_to_width(&format!("[ {text} ]"), width);
    let style = if doc.focused() == Some(node) {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default().fg(Color::Cyan)
    };
    Some(Line::from(Span::styled(label, style)))
}

/// Visible text under `root`, one line per node, skipping hidden subtrees and
/// anything listed in `skip`.
pub fn text_lines(doc: &NodeTree, root: NodeId, skip: &[NodeId], width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut pending = vec![root];
    while let Some(node) = pending.pop() {
        if doc.is_hidden(node) || skip.contains(&node) {
            continue;
        }
        lines.extend(node_line(doc, node, width));
        pending.extend(doc.children(node).into_iter().rev());
    }
    lines
}

/// Draw the page, the backdrop, and every open overlay.
pub fn render_document(frame: &mut UiFrame<'_>, manager: &OverlayManager<NodeTree>, area: Rect) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let doc = manager.document();
    let skip: Vec<NodeId> = manager.container().map(|c| c.root).into_iter().collect();
    let page = text_lines(doc, doc.root(), &skip, area.width as usize);
    frame.render_widget(Paragraph::new(page), area);

    if manager.backdrop_visible() {
        frame.dim(area);
    }

    let mut layers: Vec<_> = manager
        .records()
        .into_iter()
        .filter_map(|record| {
            let slot = manager.slot(record.handle)?;
            if !doc.is_rendered(slot) {
                return None;
            }
            Some((doc.z_index(slot).unwrap_or(0), record))
        })
        .collect();
    layers.sort_by_key(|(z, _)| *z);

    for (depth, (z, record)) in layers.into_iter().enumerate() {
        let rect = dialog_rect(area, depth);
        let inner_width = rect.width.saturating_sub(2) as usize;
        let body = text_lines(doc, record.content_anchor, &[], inner_width);
        let border = if manager.active() == Some(record.handle) {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .title(format!(" {} z={z} ", record.handle))
            .borders(Borders::ALL)
            .border_style(border);
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(body)
                .style(Style::default().bg(Color::Black))
                .block(block)
                .wrap(Wrap { trim: true }),
            rect,
        );
    }
}
