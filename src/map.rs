use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash, Serialize, Deserialize)]
pub enum TileType {
    /// Solid, blocks movement.
    Wall,
    /// Open, walkable.
    Floor,
}

impl TileType {
    pub fn is_blocked(&self) -> bool {
        *self == TileType::Wall
    }

    pub fn is_open(&self) -> bool {
        *self == TileType::Floor
    }

    pub fn glyph(&self) -> char {
        match self {
            TileType::Wall => '#',
            TileType::Floor => '.',
        }
    }
}

/// A rectangular grid of tiles. (0, 0) is the upper left corner; x grows to
/// the right and y grows downward.
#[derive(Resource, Clone, Debug, PartialEq, Eq)]
pub struct Map {
    pub tiles: Vec<TileType>,
    pub width: i32,
    pub height: i32,
}

impl Map {
    /// Allocates a `width` x `height` grid. Every cell starts as a wall;
    /// builders call [`Map::clear`] with the tile they actually want.
    pub fn new(width: i32, height: i32) -> Map {
        let width = width.max(0);
        let height = height.max(0);
        Map {
            tiles: vec![TileType::Wall; (width * height) as usize],
            width,
            height,
        }
    }

    pub fn xy_idx(&self, x: i32, y: i32) -> usize {
        (y as usize * self.width as usize) + x as usize
    }

    pub fn idx_xy(&self, idx: usize) -> (i32, i32) {
        let w = self.width as usize;
        ((idx % w) as i32, (idx / w) as i32)
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    pub fn clear(&mut self, tile: TileType) {
        self.tiles.fill(tile);
    }

    /// Tile at (x, y), or `None` outside the grid.
    pub fn get(&self, x: i32, y: i32) -> Option<TileType> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(self.tiles[self.xy_idx(x, y)])
    }

    /// Tile at (x, y). Everything outside the grid reads as solid rock.
    pub fn tile_at(&self, x: i32, y: i32) -> TileType {
        self.get(x, y).unwrap_or(TileType::Wall)
    }

    /// Writes a tile. Coordinates outside the grid are ignored.
    pub fn set(&mut self, x: i32, y: i32, tile: TileType) {
        if self.in_bounds(x, y) {
            let idx = self.xy_idx(x, y);
            self.tiles[idx] = tile;
        }
    }

    pub fn is_border(&self, x: i32, y: i32) -> bool {
        x == 0 || x == self.width - 1 || y == 0 || y == self.height - 1
    }

    pub fn clamp_x(&self, x: i32) -> i32 {
        x.clamp(0, (self.width - 1).max(0))
    }

    pub fn clamp_y(&self, y: i32) -> i32 {
        y.clamp(0, (self.height - 1).max(0))
    }

    pub fn count_tiles(&self, tile: TileType) -> usize {
        self.tiles.iter().filter(|t| **t == tile).count()
    }

    /// Every tile in row-major order.
    pub fn all_tiles(&self) -> impl Iterator<Item = ((i32, i32), TileType)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(move |(idx, tile)| (self.idx_xy(idx), *tile))
    }

    /// Tiles of the given rows, row by row. Rows outside the grid are skipped.
    pub fn tiles_in_rows<'a>(
        &'a self,
        rows: &'a [i32],
    ) -> impl Iterator<Item = ((i32, i32), TileType)> + 'a {
        rows.iter()
            .filter(move |y| **y >= 0 && **y < self.height)
            .flat_map(move |&y| (0..self.width).map(move |x| ((x, y), self.tile_at(x, y))))
    }

    /// Tiles of the given columns, column by column. Columns outside the grid are skipped.
    pub fn tiles_in_columns<'a>(
        &'a self,
        columns: &'a [i32],
    ) -> impl Iterator<Item = ((i32, i32), TileType)> + 'a {
        columns
            .iter()
            .filter(move |x| **x >= 0 && **x < self.width)
            .flat_map(move |&x| (0..self.height).map(move |y| ((x, y), self.tile_at(x, y))))
    }

    /// Tiles of the square of half-size `radius` around (cx, cy), clipped to
    /// the grid. The center is included.
    pub fn tiles_in_square(
        &self,
        cx: i32,
        cy: i32,
        radius: i32,
    ) -> impl Iterator<Item = ((i32, i32), TileType)> + '_ {
        let x_min = (cx - radius).max(0);
        let x_max = (cx + radius).min(self.width - 1);
        let y_min = (cy - radius).max(0);
        let y_max = (cy + radius).min(self.height - 1);

        (y_min..=y_max)
            .flat_map(move |y| (x_min..=x_max).map(move |x| ((x, y), self.tile_at(x, y))))
    }

    /// Bresenham line from origin to destination, both endpoints included.
    /// Endpoints outside the grid are clamped first, so every returned point
    /// is in bounds.
    pub fn cells_along_line(&self, x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<(i32, i32)> {
        let mut points = Vec::new();
        if self.width == 0 || self.height == 0 {
            return points;
        }

        let mut x = self.clamp_x(x0);
        let mut y = self.clamp_y(y0);
        let x_end = self.clamp_x(x1);
        let y_end = self.clamp_y(y1);

        let dx = (x_end - x).abs();
        let dy = (y_end - y).abs();
        let sx = if x < x_end { 1 } else { -1 };
        let sy = if y < y_end { 1 } else { -1 };
        let mut err = dx - dy;

        loop {
            points.push((x, y));
            if x == x_end && y == y_end {
                break;
            }
            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x += sx;
            }
            if e2 < dx {
                err += dx;
                y += sy;
            }
        }
        points
    }

    /// Renders the map as text, one line per row.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(self.tiles.len() + self.height as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(self.tile_at(x, y).glyph());
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn get_outside_is_none() {
        let map = Map::new(4, 3);
        assert_eq!(map.get(-1, 0), None);
        assert_eq!(map.get(4, 0), None);
        assert_eq!(map.get(0, 3), None);
        assert_eq!(map.get(3, 2), Some(TileType::Wall));
        assert_eq!(map.tile_at(10, 10), TileType::Wall);
    }

    #[test]
    fn set_outside_is_ignored() {
        let mut map = Map::new(3, 3);
        map.clear(TileType::Floor);
        map.set(-1, 1, TileType::Wall);
        map.set(3, 1, TileType::Wall);
        assert_eq!(map.count_tiles(TileType::Floor), 9);
    }

    #[test]
    fn border_ring() {
        let map = Map::new(5, 4);
        let border: Vec<_> = map
            .all_tiles()
            .filter(|((x, y), _)| map.is_border(*x, *y))
            .collect();
        assert_eq!(border.len(), 2 * 5 + 2 * 2);
        assert!(!map.is_border(2, 2));
    }

    #[test]
    fn clamping() {
        let map = Map::new(5, 4);
        assert_eq!(map.clamp_x(-3), 0);
        assert_eq!(map.clamp_x(9), 4);
        assert_eq!(map.clamp_y(2), 2);
        assert_eq!(map.clamp_y(4), 3);
    }

    #[test]
    fn rows_and_columns() {
        let map = Map::new(4, 3);
        let rows: Vec<_> = map.tiles_in_rows(&[0, 2, 7]).map(|(p, _)| p).collect();
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[0], (0, 0));
        assert_eq!(rows[4], (0, 2));

        let cols: Vec<_> = map.tiles_in_columns(&[3]).map(|(p, _)| p).collect();
        assert_eq!(cols, vec![(3, 0), (3, 1), (3, 2)]);
    }

    #[test]
    fn square_is_clipped() {
        let map = Map::new(10, 10);
        assert_eq!(map.tiles_in_square(5, 5, 1).count(), 9);
        assert_eq!(map.tiles_in_square(5, 5, 2).count(), 25);
        assert_eq!(map.tiles_in_square(0, 0, 1).count(), 4);
        assert_eq!(map.tiles_in_square(9, 0, 2).count(), 9);
    }

    #[test]
    fn line_single_point() {
        let map = Map::new(10, 10);
        assert_eq!(map.cells_along_line(3, 4, 3, 4), vec![(3, 4)]);
    }

    #[test]
    fn line_corner_to_corner() {
        let map = Map::new(8, 5);
        let line = map.cells_along_line(0, 0, 7, 4);
        assert_eq!(line.len(), 8);
        assert_eq!(line.first(), Some(&(0, 0)));
        assert_eq!(line.last(), Some(&(7, 4)));
    }

    #[test]
    fn line_clamps_endpoints() {
        let map = Map::new(6, 6);
        let line = map.cells_along_line(-10, 2, 20, 2);
        assert_eq!(line.len(), 6);
        assert!(line.iter().all(|(x, y)| map.in_bounds(*x, *y)));
    }

    #[test]
    fn clone_is_disjoint() {
        let mut map = Map::new(4, 4);
        map.clear(TileType::Floor);
        let copy = map.clone();
        map.set(1, 1, TileType::Wall);
        assert_eq!(copy.tile_at(1, 1), TileType::Floor);
        assert_eq!(copy.width, map.width);
        assert_eq!(copy.height, map.height);
    }

    #[test]
    fn ascii_rendering() {
        let mut map = Map::new(3, 2);
        map.set(1, 0, TileType::Floor);
        assert_eq!(map.to_ascii(), "#.#\n###\n");
    }

    proptest! {
        #[test]
        fn line_steps_are_monotonic(
            x0 in 0i32..40, y0 in 0i32..30, x1 in 0i32..40, y1 in 0i32..30
        ) {
            let map = Map::new(40, 30);
            let line = map.cells_along_line(x0, y0, x1, y1);
            let expected = (x1 - x0).abs().max((y1 - y0).abs()) as usize + 1;
            prop_assert_eq!(line.len(), expected);
            prop_assert_eq!(line[0], (x0, y0));
            prop_assert_eq!(*line.last().unwrap(), (x1, y1));
            for pair in line.windows(2) {
                let (ax, ay) = pair[0];
                let (bx, by) = pair[1];
                prop_assert!((bx - ax).abs() <= 1 && (by - ay).abs() <= 1);
                prop_assert!((bx - ax) * (x1 - x0).signum() >= 0);
                prop_assert!((by - ay) * (y1 - y0).signum() >= 0);
            }
        }
    }
}
