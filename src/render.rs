use crate::shelf::Layout;
use crate::types::Article;

const MAX_WIDTH: f64 = 80.0;
const MAX_HEIGHT: f64 = 40.0;

/// Cell symbols, assigned by piece id.
const SYMBOLS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const EMPTY: char = '.';

/// Produces a diagnostic map for a packed roll. The returned string is
/// whatever reference the renderer hands out: inline text, a path, a URL.
pub trait LayoutRenderer {
    fn render(&self, article: Article, layout: &Layout) -> Option<String>;
}

/// Renders the roll's occupancy grid as text, one symbol per piece, followed
/// by a legend line per placement.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiRenderer;

impl LayoutRenderer for AsciiRenderer {
    fn render(&self, _article: Article, layout: &Layout) -> Option<String> {
        let map = render_layout(layout);
        if map.is_empty() { None } else { Some(map) }
    }
}

pub fn symbol(piece: usize) -> char {
    SYMBOLS[piece % SYMBOLS.len()] as char
}

/// Roll width runs left to right, roll length top to bottom. Each character
/// samples the grid cell under its centre; waste shows as `.`.
pub fn render_layout(layout: &Layout) -> String {
    if layout.roll_width == 0 || layout.height == 0 {
        return String::new();
    }
    let scale = f64::min(
        MAX_WIDTH / layout.roll_width as f64,
        MAX_HEIGHT / layout.height as f64,
    );
    let cols = ((layout.roll_width as f64 * scale).round() as u32).max(1);
    let rows = ((layout.height as f64 * scale).round() as u32).max(1);

    let sample = |i: u32, cells: u32, limit: u32| -> u32 {
        let at = (i as f64 + 0.5) * cells as f64 / limit as f64;
        (at as u32).min(cells - 1)
    };

    let mut result = String::new();
    for row in 0..rows {
        let y = sample(row, layout.height, rows);
        let line: String = (0..cols)
            .map(|col| {
                let x = sample(col, layout.roll_width, cols);
                layout.grid.cell(x, y).map_or(EMPTY, symbol)
            })
            .collect();
        result.push_str(&line);
        result.push('\n');
    }

    for p in &layout.placements {
        result.push_str(&format!(
            "{} {} @ ({}, {}){}\n",
            symbol(p.piece),
            p.rect,
            p.x,
            p.y,
            if p.rotated { " rotated" } else { "" }
        ));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::build_queue;
    use crate::shelf::ShelfPacker;
    use crate::types::{Demand, Rect};

    fn layout(roll_width: u32, demands: &[Demand]) -> Layout {
        ShelfPacker::new(roll_width).pack(build_queue(demands)).unwrap()
    }

    fn map_rows(output: &str) -> Vec<&str> {
        output.lines().take_while(|l| !l.contains(' ')).collect()
    }

    #[test]
    fn test_render_single_piece() {
        let output = render_layout(&layout(100, &[Demand::new(Rect::new(100, 100), 1)]));
        let rows = map_rows(&output);
        assert_eq!(rows.len(), 40);
        assert!(rows.iter().all(|r| r.len() == 40 && r.chars().all(|c| c == 'a')));
        assert!(output.contains("a 100x100 @ (0, 0)\n"));
    }

    #[test]
    fn test_render_follows_grid() {
        // Two shelves lying across the roll: top half a, bottom half b.
        let output = render_layout(&layout(100, &[Demand::new(Rect::new(100, 50), 2)]));
        let rows = map_rows(&output);
        assert_eq!(rows.len(), 40);
        assert!(rows[..20].iter().all(|r| r.chars().all(|c| c == 'a')));
        assert!(rows[20..].iter().all(|r| r.chars().all(|c| c == 'b')));
        assert_eq!(output.matches("50x100").count(), 2);
        assert!(output.contains("b 50x100 @ (0, 50) rotated\n"));
    }

    #[test]
    fn test_render_shows_waste() {
        let output = render_layout(&layout(100, &[Demand::new(Rect::new(60, 40), 1)]));
        let rows = map_rows(&output);
        assert!(rows.iter().all(|r| r.starts_with('a') && r.ends_with(EMPTY)));
    }

    #[test]
    fn test_render_empty() {
        let empty = layout(100, &[]);
        assert!(render_layout(&empty).is_empty());
        assert!(AsciiRenderer.render(1, &empty).is_none());
    }
}
