use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{check_dimensions, check_range};
use crate::directions::FOUR_DIRECTIONS;
use crate::error::MapGenError;
use crate::map::{Map, TileType};
use crate::rng::GameRng;

use super::common::{apply_horizontal_tunnel, apply_vertical_tunnel};
use super::MapBuilder;

/// Distance between neighbouring maze cells on the tile grid.
const JUMP: i32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunnelingMazeSettings {
    /// Iterations during which every visited cell is redrawn.
    pub flush_iterations: i32,
}

impl Default for TunnelingMazeSettings {
    fn default() -> Self {
        Self {
            flush_iterations: 666,
        }
    }
}

impl TunnelingMazeSettings {
    pub fn validate(&self, width: i32, height: i32) -> Result<(), MapGenError> {
        check_range("flush_iterations", self.flush_iterations, 0, i32::MAX)?;
        check_dimensions(width, height, 3, 3)
    }
}

/// A random walk over a lattice of cells at odd coordinates. The walker
/// tunnels into unvisited neighbours and teleports to a random visited cell
/// when it gets stuck, until every cell has been reached.
pub struct TunnelingMazeBuilder {
    width: i32,
    height: i32,
    settings: TunnelingMazeSettings,
}

impl TunnelingMazeBuilder {
    pub fn new(width: i32, height: i32, settings: TunnelingMazeSettings) -> Self {
        Self {
            width,
            height,
            settings,
        }
    }

    fn lattice_size(&self) -> (i32, i32) {
        ((self.width - 1) / JUMP, (self.height - 1) / JUMP)
    }

    fn to_tile(cell: (i32, i32)) -> (i32, i32) {
        (cell.0 * JUMP + 1, cell.1 * JUMP + 1)
    }

    fn link_cells(map: &mut Map, from: (i32, i32), to: (i32, i32)) {
        let (x0, y0) = Self::to_tile(from);
        let (x1, y1) = Self::to_tile(to);
        apply_horizontal_tunnel(map, x0, x1, y0);
        apply_vertical_tunnel(map, y0, y1, x1);
    }
}

impl MapBuilder for TunnelingMazeBuilder {
    fn create_map(&mut self, rng: &mut GameRng) -> Map {
        let mut map = Map::new(self.width, self.height);
        map.clear(TileType::Wall);

        let (cols, rows) = self.lattice_size();
        if cols <= 0 || rows <= 0 {
            return map;
        }

        let total = (cols * rows) as usize;
        let cell_idx = |(cx, cy): (i32, i32)| (cy * cols + cx) as usize;

        let mut seen = vec![false; total];
        let mut visited: Vec<(i32, i32)> = Vec::with_capacity(total);
        let mut current = (cols / 2, rows / 2);
        seen[cell_idx(current)] = true;
        visited.push(current);
        let (x, y) = Self::to_tile(current);
        map.set(x, y, TileType::Floor);

        let mut iterations = 0;
        while visited.len() < total {
            iterations += 1;
            if iterations < self.settings.flush_iterations {
                for &cell in &visited {
                    let (x, y) = Self::to_tile(cell);
                    map.set(x, y, TileType::Floor);
                }
            }

            let (dx, dy) = FOUR_DIRECTIONS[rng.0.gen_range(0..FOUR_DIRECTIONS.len())];
            let next = (current.0 + dx, current.1 + dy);
            let in_lattice = next.0 >= 0 && next.0 < cols && next.1 >= 0 && next.1 < rows;

            if in_lattice && !seen[cell_idx(next)] {
                Self::link_cells(&mut map, current, next);
                seen[cell_idx(next)] = true;
                visited.push(next);
                current = next;
            } else {
                current = visited[rng.0.gen_range(0..visited.len())];
            }
        }

        debug!(
            "Tunneling maze: {} cells in {} iterations",
            visited.len(),
            iterations
        );
        map
    }

    fn name(&self) -> &'static str {
        "Tunneling Maze"
    }
}
