use crate::types::{Placement, Rect};

/// Cell map of a roll: each cell records which piece covers it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    width: u32,
    height: u32,
    cells: Vec<Option<usize>>,
}

impl OccupancyGrid {
    pub fn new(width: u32) -> Self {
        Self {
            width,
            height: 0,
            cells: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Adds empty rows until the grid is at least `height` tall.
    pub fn grow_to(&mut self, height: u32) {
        if height > self.height {
            self.cells
                .resize(height as usize * self.width as usize, None);
            self.height = height;
        }
    }

    pub fn cell(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[self.index(x, y)]
    }

    pub fn is_free(&self, x: u32, y: u32, rect: Rect) -> bool {
        if x as u64 + rect.width as u64 > self.width as u64
            || y as u64 + rect.length as u64 > self.height as u64
        {
            return false;
        }
        (y..y + rect.length).all(|row| {
            let start = self.index(x, row);
            self.cells[start..start + rect.width as usize]
                .iter()
                .all(Option::is_none)
        })
    }

    /// Marks the placement's cells. Returns false, leaving the grid untouched,
    /// when any cell is taken or out of bounds.
    pub fn occupy(&mut self, placement: &Placement) -> bool {
        if !self.is_free(placement.x, placement.y, placement.rect) {
            return false;
        }
        for row in placement.y..placement.y_end() {
            let start = self.index(placement.x, row);
            self.cells[start..start + placement.rect.width as usize].fill(Some(placement.piece));
        }
        true
    }

    pub fn occupied_cells(&self) -> u64 {
        self.cells.iter().filter(|c| c.is_some()).count() as u64
    }

    pub fn cells_of(&self, piece: usize) -> u64 {
        self.cells.iter().filter(|c| **c == Some(piece)).count() as u64
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement(piece: usize, x: u32, y: u32, length: u32, width: u32) -> Placement {
        Placement {
            piece,
            rect: Rect::new(length, width),
            x,
            y,
            rotated: false,
        }
    }

    #[test]
    fn test_occupy_and_query() {
        let mut grid = OccupancyGrid::new(10);
        grid.grow_to(5);
        assert!(grid.occupy(&placement(3, 2, 1, 2, 4)));
        assert_eq!(grid.cell(2, 1), Some(3));
        assert_eq!(grid.cell(5, 2), Some(3));
        assert_eq!(grid.cell(6, 2), None);
        assert_eq!(grid.cells_of(3), 8);
        assert_eq!(grid.occupied_cells(), 8);
    }

    #[test]
    fn test_rejects_overlap() {
        let mut grid = OccupancyGrid::new(10);
        grid.grow_to(10);
        assert!(grid.occupy(&placement(0, 0, 0, 5, 5)));
        assert!(!grid.occupy(&placement(1, 4, 4, 3, 3)));
        assert_eq!(grid.cells_of(1), 0);
        assert!(grid.occupy(&placement(1, 5, 0, 5, 5)));
    }

    #[test]
    fn test_rejects_out_of_bounds() {
        let mut grid = OccupancyGrid::new(10);
        grid.grow_to(4);
        assert!(!grid.is_free(8, 0, Rect::new(1, 3)));
        assert!(!grid.is_free(0, 2, Rect::new(3, 1)));
        assert!(grid.is_free(7, 1, Rect::new(3, 3)));
        assert!(!grid.is_free(u32::MAX, 0, Rect::new(1, 1)));
        assert!(!grid.is_free(0, u32::MAX, Rect::new(1, 1)));
    }

    #[test]
    fn test_grow_keeps_cells() {
        let mut grid = OccupancyGrid::new(4);
        grid.grow_to(2);
        assert!(grid.occupy(&placement(0, 0, 0, 2, 4)));
        grid.grow_to(6);
        assert_eq!(grid.height(), 6);
        assert_eq!(grid.cell(3, 1), Some(0));
        assert_eq!(grid.cell(3, 2), None);
        grid.grow_to(3);
        assert_eq!(grid.height(), 6);
    }
}
