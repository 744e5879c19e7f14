use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{check_dimensions, check_range};
use crate::error::MapGenError;
use crate::map::{Map, TileType};
use crate::regions::connect_all;
use crate::rng::GameRng;

use super::MapBuilder;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellularAutomataSettings {
    /// Percent chance that an interior cell starts open.
    pub fill_probability: i32,
    pub iterations: i32,
    /// Passes that use the big-area rule before switching to nearest neighbours.
    pub big_area_cutoff: i32,
}

impl Default for CellularAutomataSettings {
    fn default() -> Self {
        Self {
            fill_probability: 50,
            iterations: 3,
            big_area_cutoff: 3,
        }
    }
}

impl CellularAutomataSettings {
    pub fn validate(&self, width: i32, height: i32) -> Result<(), MapGenError> {
        check_range("fill_probability", self.fill_probability, 0, 100)?;
        check_range("iterations", self.iterations, 0, i32::MAX)?;
        check_range("big_area_cutoff", self.big_area_cutoff, 0, i32::MAX)?;
        check_dimensions(width, height, 3, 3)
    }
}

/// Walls within `radius` of (x, y), the cell itself excluded.
fn count_walls_near(map: &Map, x: i32, y: i32, radius: i32) -> usize {
    map.tiles_in_square(x, y, radius)
        .filter(|(pos, tile)| *pos != (x, y) && tile.is_blocked())
        .count()
}

/// Random noise smoothed into caves, then stitched into one region.
pub struct CellularAutomataBuilder {
    width: i32,
    height: i32,
    settings: CellularAutomataSettings,
}

impl CellularAutomataBuilder {
    pub fn new(width: i32, height: i32, settings: CellularAutomataSettings) -> Self {
        Self {
            width,
            height,
            settings,
        }
    }

    fn random_fill(&self, map: &mut Map, rng: &mut GameRng) {
        for y in 1..self.height - 1 {
            for x in 1..self.width - 1 {
                if rng.0.gen_range(1..100) < self.settings.fill_probability {
                    map.set(x, y, TileType::Floor);
                } else {
                    map.set(x, y, TileType::Wall);
                }
            }
        }
    }

    /// One generation. Reads `map`, writes the result into a copy.
    fn step(map: &Map, big_area: bool) -> Map {
        let mut next = map.clone();
        for y in 1..map.height - 1 {
            for x in 1..map.width - 1 {
                let near = count_walls_near(map, x, y, 1);
                let wall = if big_area {
                    near >= 5 || count_walls_near(map, x, y, 2) <= 2
                } else {
                    near >= 5
                };
                next.set(x, y, if wall { TileType::Wall } else { TileType::Floor });
            }
        }
        next
    }
}

impl MapBuilder for CellularAutomataBuilder {
    fn create_map(&mut self, rng: &mut GameRng) -> Map {
        let mut map = Map::new(self.width, self.height);
        map.clear(TileType::Wall);

        self.random_fill(&mut map, rng);

        for i in 0..self.settings.iterations {
            map = Self::step(&map, i < self.settings.big_area_cutoff);
        }

        let regions = connect_all(&mut map);
        debug!("Cellular automata: joined {} caves", regions);
        map
    }

    fn name(&self) -> &'static str {
        "Cellular Automata"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::find_regions;

    #[test]
    fn counts_clip_at_edges() {
        let mut map = Map::new(5, 5);
        map.clear(TileType::Wall);
        assert_eq!(count_walls_near(&map, 2, 2, 1), 8);
        assert_eq!(count_walls_near(&map, 2, 2, 2), 24);
        assert_eq!(count_walls_near(&map, 0, 0, 1), 3);
        map.clear(TileType::Floor);
        assert_eq!(count_walls_near(&map, 2, 2, 2), 0);
    }

    #[test]
    fn big_area_rule_fills_empty_space() {
        let mut map = Map::new(7, 7);
        map.clear(TileType::Floor);
        map.set(3, 3, TileType::Wall);
        let next = CellularAutomataBuilder::step(&map, true);
        assert_eq!(next.tile_at(3, 3), TileType::Wall);
        let next = CellularAutomataBuilder::step(&map, false);
        assert_eq!(next.tile_at(3, 3), TileType::Floor);
    }

    #[test]
    fn step_leaves_input_untouched() {
        let mut map = Map::new(6, 6);
        map.clear(TileType::Floor);
        let before = map.clone();
        let next = CellularAutomataBuilder::step(&map, true);
        assert_eq!(map, before);
        // Zero walls within radius 2 triggers the big-area wall rule.
        assert_eq!(next.tile_at(2, 2), TileType::Wall);
    }

    #[test]
    fn caves_end_up_connected() {
        let mut rng = GameRng::seeded(4);
        let map = CellularAutomataBuilder::new(60, 40, CellularAutomataSettings::default())
            .create_map(&mut rng);
        assert!(map.count_tiles(TileType::Floor) > 0);
        assert_eq!(find_regions(&map).len(), 1);
        for ((x, y), tile) in map.all_tiles() {
            if map.is_border(x, y) {
                assert_eq!(tile, TileType::Wall);
            }
        }
    }
}
