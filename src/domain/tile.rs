/// Tile types and the static level grid.
/// Solidity is queried via methods, not stored as flags,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Empty,
    Solid,
}

impl Tile {
    /// Does this tile block movement?
    pub fn is_solid(self) -> bool {
        matches!(self, Tile::Solid)
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Empty
    }
}

/// Immutable 2D grid of tiles forming the level.
///
/// Coordinates are (column, row) with row 0 at the top. Any coordinate
/// outside `[0,width) × [0,height)` reads as solid: collision resolution
/// never indexes out of range and bodies cannot leave the world.
pub struct TileWorld {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl TileWorld {
    /// Build an all-empty world. Callers fill it before freezing.
    pub fn empty(width: usize, height: usize) -> Self {
        TileWorld {
            width,
            height,
            tiles: vec![Tile::Empty; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Closed-world solidity query: out of bounds is solid.
    #[inline]
    pub fn is_solid(&self, col: i32, row: i32) -> bool {
        if col < 0 || row < 0 || col as usize >= self.width || row as usize >= self.height {
            return true;
        }
        self.tiles[row as usize * self.width + col as usize].is_solid()
    }

    /// Set a single cell. Only used during level construction.
    pub fn set(&mut self, col: usize, row: usize, tile: Tile) {
        if col < self.width && row < self.height {
            self.tiles[row * self.width + col] = tile;
        }
    }

    /// Fill a rectangular span of cells (inclusive ranges).
    pub fn fill(
        &mut self,
        cols: std::ops::RangeInclusive<usize>,
        rows: std::ops::RangeInclusive<usize>,
        tile: Tile,
    ) {
        for row in rows {
            for col in cols.clone() {
                self.set(col, row, tile);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_world_reads_empty_in_bounds() {
        let w = TileWorld::empty(4, 3);
        assert!(!w.is_solid(0, 0));
        assert!(!w.is_solid(3, 2));
    }

    #[test]
    fn out_of_bounds_is_solid_on_all_sides() {
        let w = TileWorld::empty(4, 3);
        assert!(w.is_solid(-1, 0));
        assert!(w.is_solid(0, -1));
        assert!(w.is_solid(4, 0));
        assert!(w.is_solid(0, 3));
        assert!(w.is_solid(1000, 1000));
        assert!(w.is_solid(-1000, -1000));
    }

    #[test]
    fn set_and_fill() {
        let mut w = TileWorld::empty(6, 6);
        w.set(2, 2, Tile::Solid);
        w.fill(0..=5, 5..=5, Tile::Solid);
        assert!(w.is_solid(2, 2));
        assert!(!w.is_solid(3, 2));
        for col in 0..6 {
            assert!(w.is_solid(col, 5));
        }
    }
}
