use crate::config::MAX_ROLL_CELLS;
use crate::error::{LayoutError, Result};
use crate::grid::OccupancyGrid;
use crate::queue::{PieceQueue, QueuedPiece};
use crate::types::{Placement, Rect};

/// Packed roll: every placement plus the cell map they were checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub roll_width: u32,
    /// Used roll length in internal units.
    pub height: u32,
    pub placements: Vec<Placement>,
    pub grid: OccupancyGrid,
}

impl Layout {
    pub fn used_area(&self) -> u64 {
        self.placements.iter().map(|p| p.rect.area()).sum()
    }

    pub fn waste_area(&self) -> u64 {
        self.roll_width as u64 * self.height as u64 - self.used_area()
    }

    pub fn waste_percent(&self) -> f64 {
        let total = self.roll_width as u64 * self.height as u64;
        if total == 0 {
            return 0.0;
        }
        self.waste_area() as f64 / total as f64 * 100.0
    }
}

/// Greedy shelf packer for a roll of fixed width.
///
/// Each shelf is opened by the largest remaining piece, turned across the roll
/// when it spans the full width that way and the shelf gets lower. Pieces are first laid
/// left to right along the shelf floor; once nothing more fits there, the
/// remaining space is filled right to left hanging from the shelf ceiling,
/// trying each piece as queued and then rotated.
pub struct ShelfPacker {
    roll_width: u32,
}

struct Shelf {
    floor: u32,
    ceiling: u32,
}

impl ShelfPacker {
    pub fn new(roll_width: u32) -> Self {
        Self { roll_width }
    }

    pub fn pack(&self, mut queue: PieceQueue) -> Result<Layout> {
        self.validate(&queue)?;

        let mut grid = OccupancyGrid::new(self.roll_width);
        let mut placements = Vec::with_capacity(queue.len());
        let mut floor = 0;

        while let Some(opener) = queue.pop_front() {
            let (rect, rotated) = self.opening_orientation(opener.rect);
            let shelf = Shelf {
                floor,
                ceiling: self.shelf_ceiling(floor, rect.length)?,
            };
            grid.grow_to(shelf.ceiling);
            self.place(&mut grid, &mut placements, opener, rect, 0, floor, rotated);

            let floor_end =
                self.fill_floor(&shelf, &mut queue, &mut grid, &mut placements, rect.width);
            let ceiling_start = self.fill_ceiling(&shelf, &mut queue, &mut grid, &mut placements);

            tracing::debug!(
                floor = shelf.floor,
                ceiling = shelf.ceiling,
                floor_end,
                ceiling_start,
                remaining = queue.len(),
                "shelf closed"
            );
            floor = shelf.ceiling;
        }

        Ok(Layout {
            roll_width: self.roll_width,
            height: floor,
            placements,
            grid,
        })
    }

    fn validate(&self, queue: &PieceQueue) -> Result<()> {
        for piece in queue.iter() {
            if piece.rect.is_empty() {
                return Err(LayoutError::InvalidPiece { piece: piece.rect });
            }
            if piece.rect.shorter() > self.roll_width {
                return Err(LayoutError::PieceTooLarge {
                    piece: piece.rect,
                    roll_width: self.roll_width,
                });
            }
        }
        Ok(())
    }

    /// A piece whose longer side equals the roll width opens a lower shelf
    /// lying across the roll.
    fn opening_orientation(&self, rect: Rect) -> (Rect, bool) {
        let across = rect.rotated();
        if across.width == self.roll_width && across.length < rect.length {
            (across, true)
        } else {
            (rect, false)
        }
    }

    fn shelf_ceiling(&self, floor: u32, length: u32) -> Result<u32> {
        let height = floor as u64 + length as u64;
        match u32::try_from(height) {
            Ok(ceiling) if height * self.roll_width as u64 <= MAX_ROLL_CELLS => Ok(ceiling),
            _ => Err(LayoutError::LayoutTooLarge {
                height,
                roll_width: self.roll_width,
            }),
        }
    }

    /// Lays pieces left to right on the shelf floor. Returns the final cursor.
    fn fill_floor(
        &self,
        shelf: &Shelf,
        queue: &mut PieceQueue,
        grid: &mut OccupancyGrid,
        placements: &mut Vec<Placement>,
        mut cursor: u32,
    ) -> u32 {
        let shelf_height = shelf.ceiling - shelf.floor;
        while let Some(idx) = queue.position(|p| {
            cursor as u64 + p.rect.width as u64 <= self.roll_width as u64
                && p.rect.length <= shelf_height
        }) {
            let piece = queue.remove(idx);
            self.place(grid, placements, piece, piece.rect, cursor, shelf.floor, false);
            cursor += piece.rect.width;
        }
        cursor
    }

    /// Hangs pieces from the shelf ceiling right to left. Returns the final cursor.
    fn fill_ceiling(
        &self,
        shelf: &Shelf,
        queue: &mut PieceQueue,
        grid: &mut OccupancyGrid,
        placements: &mut Vec<Placement>,
    ) -> u32 {
        let mut cursor = self.roll_width;
        loop {
            let found = queue.iter().enumerate().find_map(|(idx, piece)| {
                [(piece.rect, false), (piece.rect.rotated(), true)]
                    .into_iter()
                    .find(|(rect, _)| Self::fits_under_ceiling(grid, shelf, cursor, *rect))
                    .map(|(rect, rotated)| (idx, rect, rotated))
            });
            let Some((idx, rect, rotated)) = found else {
                return cursor;
            };
            let piece = queue.remove(idx);
            let x = cursor - rect.width;
            self.place(grid, placements, piece, rect, x, shelf.ceiling - rect.length, rotated);
            cursor = x;
        }
    }

    fn fits_under_ceiling(grid: &OccupancyGrid, shelf: &Shelf, cursor: u32, rect: Rect) -> bool {
        rect.width <= cursor
            && rect.length <= shelf.ceiling - shelf.floor
            && grid.is_free(cursor - rect.width, shelf.ceiling - rect.length, rect)
    }

    #[allow(clippy::too_many_arguments)]
    fn place(
        &self,
        grid: &mut OccupancyGrid,
        placements: &mut Vec<Placement>,
        piece: QueuedPiece,
        rect: Rect,
        x: u32,
        y: u32,
        rotated: bool,
    ) {
        let placement = Placement {
            piece: piece.id,
            rect,
            x,
            y,
            rotated,
        };
        let written = grid.occupy(&placement);
        debug_assert!(written, "placement {rect} @ ({x}, {y}) collides");
        placements.push(placement);
    }
}
