use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{check_dimensions, check_range};
use crate::directions::CardinalDirection;
use crate::error::MapGenError;
use crate::map::{Map, TileType};
use crate::rng::{GameRng, RandomTable};

use super::MapBuilder;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrunkardSettings {
    /// Fraction of the map to open before stopping.
    pub percent_goal: f32,
    /// Minimum step budget; the walk always gets at least ten steps per tile.
    pub walk_iterations: i32,
    /// Extra weight toward the center while in an outer quarter of the map.
    pub weighted_toward_center: f32,
    /// Extra weight for repeating the last step's direction.
    pub weighted_toward_previous_direction: f32,
}

impl Default for DrunkardSettings {
    fn default() -> Self {
        Self {
            percent_goal: 0.3,
            walk_iterations: 50000,
            weighted_toward_center: 0.15,
            weighted_toward_previous_direction: 0.7,
        }
    }
}

impl DrunkardSettings {
    pub fn validate(&self, width: i32, height: i32) -> Result<(), MapGenError> {
        if !(0.0..=1.0).contains(&self.percent_goal) {
            return Err(MapGenError::parameter("percent_goal", "must be between 0 and 1"));
        }
        if self.weighted_toward_center < 0.0 || self.weighted_toward_previous_direction < 0.0 {
            return Err(MapGenError::parameter(
                "weighted_toward_center",
                "direction weights cannot be negative",
            ));
        }
        check_range("walk_iterations", self.walk_iterations, 0, i32::MAX)?;
        check_dimensions(width, height, 5, 5)
    }
}

/// A single random walker that opens every tile it steps on, nudged back
/// toward the middle of the map and toward its previous heading.
pub struct DrunkardsWalkBuilder {
    width: i32,
    height: i32,
    settings: DrunkardSettings,
    steps: usize,
}

impl DrunkardsWalkBuilder {
    pub fn new(width: i32, height: i32, settings: DrunkardSettings) -> Self {
        Self {
            width,
            height,
            settings,
            steps: 0,
        }
    }

    /// Steps taken by the last run.
    pub fn steps(&self) -> usize {
        self.steps
    }

    fn step_limit(&self) -> usize {
        let floor = 10 * self.width as i64 * self.height as i64;
        (self.settings.walk_iterations as i64).max(floor) as usize
    }

    fn goal(&self) -> f32 {
        self.width as f32 * self.height as f32 * self.settings.percent_goal
    }

    fn direction_table(
        &self,
        (x, y): (i32, i32),
        previous: Option<CardinalDirection>,
    ) -> RandomTable<CardinalDirection> {
        let mut north = 1.0;
        let mut south = 1.0;
        let mut east = 1.0;
        let mut west = 1.0;
        let toward_center = self.settings.weighted_toward_center;

        if (x as f32) < self.width as f32 * 0.25 {
            east += toward_center;
        } else if (x as f32) > self.width as f32 * 0.75 {
            west += toward_center;
        }
        if (y as f32) < self.height as f32 * 0.25 {
            south += toward_center;
        } else if (y as f32) > self.height as f32 * 0.75 {
            north += toward_center;
        }

        let toward_previous = self.settings.weighted_toward_previous_direction;
        match previous {
            Some(CardinalDirection::North) => north += toward_previous,
            Some(CardinalDirection::South) => south += toward_previous,
            Some(CardinalDirection::East) => east += toward_previous,
            Some(CardinalDirection::West) => west += toward_previous,
            None => {}
        }

        RandomTable::new()
            .add(CardinalDirection::North, north)
            .add(CardinalDirection::South, south)
            .add(CardinalDirection::East, east)
            .add(CardinalDirection::West, west)
    }
}

impl MapBuilder for DrunkardsWalkBuilder {
    fn create_map(&mut self, rng: &mut GameRng) -> Map {
        let mut map = Map::new(self.width, self.height);
        map.clear(TileType::Wall);

        let mut x = rng.range_or_min(2, self.width - 2);
        let mut y = rng.range_or_min(2, self.height - 2);
        let mut previous = None;
        let goal = self.goal();
        let limit = self.step_limit();
        let mut filled = 0.0f32;

        self.steps = 0;
        while self.steps < limit && filled < goal {
            self.steps += 1;

            let Some(direction) = self.direction_table((x, y), previous).roll(rng) else {
                break;
            };
            let (dx, dy) = direction.offset();
            let (nx, ny) = (x + dx, y + dy);

            // Never step onto the outer ring.
            if nx <= 0 || nx >= self.width - 1 || ny <= 0 || ny >= self.height - 1 {
                continue;
            }

            x = nx;
            y = ny;
            if map.tile_at(x, y).is_blocked() {
                map.set(x, y, TileType::Floor);
                filled += 1.0;
            }
            previous = Some(direction);
        }

        debug!(
            "Drunkard's walk: opened {} tiles in {} steps",
            filled, self.steps
        );
        map
    }

    fn name(&self) -> &'static str {
        "Drunkard's Walk"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::find_regions;

    #[test]
    fn reaches_goal() {
        let mut builder = DrunkardsWalkBuilder::new(60, 40, DrunkardSettings::default());
        let map = builder.create_map(&mut GameRng::seeded(77));
        let goal = (60.0 * 40.0 * 0.3f32).ceil() as usize;
        assert!(builder.steps() < builder.step_limit());
        assert_eq!(map.count_tiles(TileType::Floor), goal);
        assert_eq!(find_regions(&map).len(), 1);
    }

    #[test]
    fn step_limit_scales_with_area() {
        let settings = DrunkardSettings {
            walk_iterations: 10,
            ..DrunkardSettings::default()
        };
        let builder = DrunkardsWalkBuilder::new(20, 10, settings);
        assert_eq!(builder.step_limit(), 2000);
        let builder = DrunkardsWalkBuilder::new(5, 5, DrunkardSettings::default());
        assert_eq!(builder.step_limit(), 50000);
    }

    #[test]
    fn unreachable_goal_stops_at_limit() {
        let settings = DrunkardSettings {
            percent_goal: 1.0,
            walk_iterations: 0,
            ..DrunkardSettings::default()
        };
        let mut builder = DrunkardsWalkBuilder::new(8, 8, settings);
        let map = builder.create_map(&mut GameRng::seeded(5));
        assert_eq!(builder.steps(), 640);
        assert!(map.count_tiles(TileType::Floor) <= 36);
        for ((x, y), tile) in map.all_tiles() {
            if map.is_border(x, y) {
                assert_eq!(tile, TileType::Wall);
            }
        }
    }

    #[test]
    fn tiny_maps_start_on_the_inner_edge() {
        let mut builder = DrunkardsWalkBuilder::new(4, 4, DrunkardSettings::default());
        let map = builder.create_map(&mut GameRng::seeded(3));
        // The goal of 4.8 tiles cannot be met by a 2x2 interior.
        assert_eq!(builder.steps(), builder.step_limit());
        assert_eq!(map.count_tiles(TileType::Floor), 4);
        for ((x, y), tile) in map.all_tiles() {
            assert_eq!(tile.is_open(), !map.is_border(x, y));
        }

        let mut builder = DrunkardsWalkBuilder::new(2, 2, DrunkardSettings::default());
        let map = builder.create_map(&mut GameRng::seeded(3));
        assert_eq!(map.count_tiles(TileType::Floor), 0);
    }

    #[test]
    fn outer_quarters_pull_toward_center() {
        let settings = DrunkardSettings {
            weighted_toward_center: 1.0,
            ..DrunkardSettings::default()
        };
        let builder = DrunkardsWalkBuilder::new(40, 40, settings);
        let mut rng = GameRng::seeded(9);
        let table = builder.direction_table((2, 2), None);
        let mut counts = [0usize; 4];
        for _ in 0..4000 {
            match table.roll(&mut rng) {
                Some(CardinalDirection::North) => counts[0] += 1,
                Some(CardinalDirection::South) => counts[1] += 1,
                Some(CardinalDirection::East) => counts[2] += 1,
                Some(CardinalDirection::West) => counts[3] += 1,
                None => unreachable!(),
            }
        }
        assert!(counts[1] > counts[0]);
        assert!(counts[2] > counts[3]);
    }
}
