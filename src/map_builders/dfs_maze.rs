use bevy::prelude::*;
use rand::seq::SliceRandom;

use crate::directions::FOUR_DIRECTIONS;
use crate::map::{Map, TileType};
use crate::rng::GameRng;

use super::MapBuilder;

/// One pending cell on the backtrace stack, with the order its neighbours
/// are visited in and how many of them have been tried.
struct Frame {
    x: i32,
    y: i32,
    order: [usize; 4],
    next: usize,
}

/// A perfect maze carved by randomized depth-first search from (1, 1).
/// Every open cell is reachable and there are no loops.
pub struct DfsMazeBuilder {
    width: i32,
    height: i32,
    carved: usize,
}

impl DfsMazeBuilder {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            carved: 0,
        }
    }

    /// Cells opened by the last run.
    pub fn carved(&self) -> usize {
        self.carved
    }

    /// Opens (x, y) unless it is outside the interior, already open, or
    /// would touch more than one open cell.
    fn try_carve(map: &mut Map, x: i32, y: i32) -> bool {
        if x < 1 || y < 1 || x >= map.width - 1 || y >= map.height - 1 {
            return false;
        }
        if map.tile_at(x, y).is_open() {
            return false;
        }
        let open_neighbours = FOUR_DIRECTIONS
            .iter()
            .filter(|(dx, dy)| map.get(x + dx, y + dy) == Some(TileType::Floor))
            .count();
        if open_neighbours > 1 {
            return false;
        }
        map.set(x, y, TileType::Floor);
        true
    }

    fn shuffled_order(rng: &mut GameRng) -> [usize; 4] {
        let mut order = [0, 1, 2, 3];
        order.shuffle(&mut rng.0);
        order
    }
}

impl MapBuilder for DfsMazeBuilder {
    fn create_map(&mut self, rng: &mut GameRng) -> Map {
        let mut map = Map::new(self.width, self.height);
        map.clear(TileType::Wall);
        self.carved = 0;

        let mut backtrace = Vec::new();
        if Self::try_carve(&mut map, 1, 1) {
            self.carved += 1;
            backtrace.push(Frame {
                x: 1,
                y: 1,
                order: Self::shuffled_order(rng),
                next: 0,
            });
        }

        while let Some(frame) = backtrace.last_mut() {
            if frame.next == FOUR_DIRECTIONS.len() {
                backtrace.pop();
                continue;
            }

            let (dx, dy) = FOUR_DIRECTIONS[frame.order[frame.next]];
            frame.next += 1;
            let (x, y) = (frame.x + dx, frame.y + dy);

            if Self::try_carve(&mut map, x, y) {
                self.carved += 1;
                backtrace.push(Frame {
                    x,
                    y,
                    order: Self::shuffled_order(rng),
                    next: 0,
                });
            }
        }

        debug!("DFS maze: carved {} cells", self.carved);
        map
    }

    fn name(&self) -> &'static str {
        "DFS Maze"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::find_regions;

    fn open_edges(map: &Map) -> usize {
        map.all_tiles()
            .filter(|(_, t)| t.is_open())
            .map(|((x, y), _)| {
                [(1, 0), (0, 1)]
                    .iter()
                    .filter(|(dx, dy)| map.tile_at(x + dx, y + dy).is_open())
                    .count()
            })
            .sum()
    }

    #[test]
    fn maze_is_a_tree() {
        for seed in [1, 2, 3] {
            let mut builder = DfsMazeBuilder::new(31, 21);
            let map = builder.create_map(&mut GameRng::seeded(seed));
            let cells = map.count_tiles(TileType::Floor);
            assert_eq!(cells, builder.carved());
            assert_eq!(open_edges(&map), cells - 1);
            assert_eq!(find_regions(&map).len(), 1);
        }
    }

    #[test]
    fn tiny_map_has_nothing_to_carve() {
        let mut builder = DfsMazeBuilder::new(2, 2);
        let map = builder.create_map(&mut GameRng::seeded(0));
        assert_eq!(map.count_tiles(TileType::Floor), 0);
        assert_eq!(builder.carved(), 0);
    }
}
