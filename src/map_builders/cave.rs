//! Organic caves joined by narrow, winding corridors.
//!
//! Noise is seeded, roughened by random single-cell flips, smoothed and
//! patched, then split into caves. Caves outside the size limits are filled
//! back in. Corridors are then tunnelled outward from the connected caves
//! (or from earlier corridors) until every cave has been reached or the
//! attempt budget runs out.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{check_dimensions, check_range};
use crate::directions::{CardinalDirection, FOUR_DIRECTIONS, NINE_DIRECTIONS};
use crate::error::MapGenError;
use crate::map::{Map, TileType};
use crate::regions::find_regions;
use crate::rng::GameRng;

use super::MapBuilder;

const SMOOTHING_PASSES: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaveSettings {
    /// A flipped cell opens when more than this many of its 3x3 block are open.
    pub neighbours: i32,
    pub iterations: i32,
    /// Percent chance that an interior cell starts open.
    pub close_tile_prob: i32,
    /// Caves of this size or smaller are filled in.
    pub lower_limit: usize,
    /// Caves larger than this are filled in.
    pub upper_limit: usize,
    /// Open cells with at least this many walled sides are closed while smoothing.
    pub empty_neighbours: i32,
    /// Walls with at least this many open sides are opened when filling holes.
    pub empty_tile_neighbours: i32,
    /// Lateral clearance a corridor keeps from open tiles.
    pub corridor_space: i32,
    pub corridor_max_turns: i32,
    pub corridor_min: i32,
    pub corridor_max: i32,
    /// Percent chance of starting a corridor from a cave rather than from an
    /// earlier corridor, once corridors exist.
    pub corridor_branch_chance: i32,
    /// Corridor attempts allowed before giving up.
    pub break_out: i32,
}

impl Default for CaveSettings {
    fn default() -> Self {
        Self {
            neighbours: 4,
            iterations: 50000,
            close_tile_prob: 45,
            lower_limit: 16,
            upper_limit: 500,
            empty_neighbours: 3,
            empty_tile_neighbours: 4,
            corridor_space: 2,
            corridor_max_turns: 10,
            corridor_min: 2,
            corridor_max: 5,
            corridor_branch_chance: 50,
            break_out: 100000,
        }
    }
}

impl CaveSettings {
    pub fn validate(&self, width: i32, height: i32) -> Result<(), MapGenError> {
        check_range("neighbours", self.neighbours, 0, 9)?;
        check_range("iterations", self.iterations, 0, i32::MAX)?;
        check_range("close_tile_prob", self.close_tile_prob, 0, 100)?;
        if self.lower_limit >= self.upper_limit {
            return Err(MapGenError::parameter(
                "lower_limit",
                format!("must be below upper_limit ({})", self.upper_limit),
            ));
        }
        check_range("empty_neighbours", self.empty_neighbours, 0, 4)?;
        check_range("empty_tile_neighbours", self.empty_tile_neighbours, 0, 4)?;
        check_range("corridor_space", self.corridor_space, 0, i32::MAX)?;
        check_range("corridor_max_turns", self.corridor_max_turns, 0, i32::MAX)?;
        check_range("corridor_min", self.corridor_min, 1, self.corridor_max)?;
        check_range("corridor_branch_chance", self.corridor_branch_chance, 0, 100)?;
        check_range("break_out", self.break_out, 0, i32::MAX)?;
        check_dimensions(width, height, 3, 3)
    }
}

/// Where a corridor attempt starts and the way it first heads.
#[derive(Clone, Copy, Debug)]
struct CorridorStart {
    point: (i32, i32),
    direction: CardinalDirection,
}

pub struct CaveBuilder {
    width: i32,
    height: i32,
    settings: CaveSettings,
    caves_connected: bool,
}

impl CaveBuilder {
    pub fn new(width: i32, height: i32, settings: CaveSettings) -> Self {
        Self {
            width,
            height,
            settings,
            caves_connected: false,
        }
    }

    /// Whether the last generated map had every cave joined up.
    pub fn caves_connected(&self) -> bool {
        self.caves_connected
    }

    // ========================================================================
    // Cave building
    // ========================================================================

    fn build_caves(&self, map: &mut Map, rng: &mut GameRng) {
        for y in 1..self.height - 1 {
            for x in 1..self.width - 1 {
                if rng.0.gen_range(0..100) < self.settings.close_tile_prob {
                    map.set(x, y, TileType::Floor);
                }
            }
        }

        for _ in 0..=self.settings.iterations {
            let x = rng.0.gen_range(1..self.width - 1);
            let y = rng.0.gen_range(1..self.height - 1);
            let open = open_around(map, x, y, &NINE_DIRECTIONS);
            if open > self.settings.neighbours as usize {
                map.set(x, y, TileType::Floor);
            } else {
                map.set(x, y, TileType::Wall);
            }
        }

        // Knock off rough edges and single open cells.
        for _ in 0..SMOOTHING_PASSES {
            for y in 1..self.height - 1 {
                for x in 1..self.width - 1 {
                    let walls = 4 - open_around(map, x, y, &FOUR_DIRECTIONS);
                    if map.tile_at(x, y).is_open() && walls >= self.settings.empty_neighbours as usize {
                        map.set(x, y, TileType::Wall);
                    }
                }
            }
        }

        // Fill pinholes inside caves.
        for y in 1..self.height - 1 {
            for x in 1..self.width - 1 {
                let open = open_around(map, x, y, &FOUR_DIRECTIONS);
                if map.tile_at(x, y).is_blocked() && open >= self.settings.empty_tile_neighbours as usize {
                    map.set(x, y, TileType::Floor);
                }
            }
        }
    }

    /// Splits the open tiles into caves, filling in the ones outside the
    /// size limits.
    fn find_caves(&self, map: &mut Map) -> Vec<Vec<(i32, i32)>> {
        let mut caves = Vec::new();
        for region in find_regions(map) {
            let size = region.len();
            if size <= self.settings.lower_limit || size > self.settings.upper_limit {
                for (x, y) in region.tiles {
                    map.set(x, y, TileType::Wall);
                }
            } else {
                caves.push(region.tiles);
            }
        }
        caves
    }

    // ========================================================================
    // Corridors
    // ========================================================================

    fn random_direction(rng: &mut GameRng) -> CardinalDirection {
        CardinalDirection::ALL[rng.0.gen_range(0..CardinalDirection::ALL.len())]
    }

    /// A random direction that reverses neither of the given ones.
    fn turn(rng: &mut GameRng, current: CardinalDirection, initial: CardinalDirection) -> CardinalDirection {
        loop {
            let dir = Self::random_direction(rng);
            if dir.reverse() != current && dir.reverse() != initial {
                return dir;
            }
        }
    }

    /// Picks a random tile of `cave` and walks in a random direction until
    /// the first wall.
    fn cave_edge(
        map: &Map,
        cave: &[(i32, i32)],
        previous: CardinalDirection,
        rng: &mut GameRng,
    ) -> Option<CorridorStart> {
        let (mut x, mut y) = cave[rng.0.gen_range(0..cave.len())];
        let direction = loop {
            let dir = Self::random_direction(rng);
            if dir != previous.reverse() {
                break dir;
            }
        };

        let (dx, dy) = direction.offset();
        loop {
            x += dx;
            y += dy;
            match map.get(x, y) {
                None => return None,
                Some(TileType::Wall) => {
                    return Some(CorridorStart {
                        point: (x, y),
                        direction,
                    })
                }
                Some(TileType::Floor) => {}
            }
        }
    }

    /// Picks a corridor tile with a wall beside it and steps into that wall.
    fn corridor_edge(map: &Map, corridors: &[(i32, i32)], rng: &mut GameRng) -> Option<CorridorStart> {
        let candidates: Vec<((i32, i32), Vec<CardinalDirection>)> = corridors
            .iter()
            .filter_map(|&(x, y)| {
                let walls: Vec<CardinalDirection> = CardinalDirection::ALL
                    .into_iter()
                    .filter(|dir| {
                        let (dx, dy) = dir.offset();
                        map.get(x + dx, y + dy) == Some(TileType::Wall)
                    })
                    .collect();
                (!walls.is_empty()).then_some(((x, y), walls))
            })
            .collect();

        if candidates.is_empty() {
            return None;
        }

        let ((x, y), walls) = &candidates[rng.0.gen_range(0..candidates.len())];
        let direction = walls[rng.0.gen_range(0..walls.len())];
        let (dx, dy) = direction.offset();
        Some(CorridorStart {
            point: (x + dx, y + dy),
            direction,
        })
    }

    /// True if no open tile lies within `corridor_space` of `point` across
    /// the direction of travel.
    fn has_clearance(&self, map: &Map, point: (i32, i32), direction: CardinalDirection) -> bool {
        let space = self.settings.corridor_space;
        (-space..=space).all(|r| {
            let (x, y) = if direction.is_vertical() {
                (point.0 + r, point.1)
            } else {
                (point.0, point.1 + r)
            };
            map.get(x, y) != Some(TileType::Floor)
        })
    }

    /// Tunnels straight runs from `start`, turning between runs, until an
    /// open tile is hit. Returns the path including the open tile it ended
    /// on, or `None` if the corridor ran out of turns, left the map, reached
    /// the border or came too close to something open.
    fn corridor_attempt(&self, map: &Map, start: CorridorStart, rng: &mut GameRng) -> Option<Vec<(i32, i32)>> {
        if map.is_border(start.point.0, start.point.1) {
            return None;
        }

        let mut path = vec![start.point];
        let (mut x, mut y) = start.point;
        let mut direction = start.direction;

        for turn in 0..=self.settings.corridor_max_turns {
            let length = rng.range_or_min(self.settings.corridor_min, self.settings.corridor_max);
            let (dx, dy) = direction.offset();

            for _ in 0..length {
                x += dx;
                y += dy;

                match map.get(x, y) {
                    None => return None,
                    Some(TileType::Floor) => {
                        path.push((x, y));
                        return Some(path);
                    }
                    Some(TileType::Wall) => {}
                }
                if map.is_border(x, y) || !self.has_clearance(map, (x, y), direction) {
                    return None;
                }
                path.push((x, y));
            }

            if turn < self.settings.corridor_max_turns {
                direction = Self::turn(rng, direction, start.direction);
            }
        }

        None
    }

    /// Tunnels between caves until all are connected. Returns false if
    /// there were no caves or the attempt budget ran out first.
    fn connect_caves(&self, map: &mut Map, caves: &[Vec<(i32, i32)>], rng: &mut GameRng) -> bool {
        if caves.is_empty() {
            return false;
        }

        let mut cave_at: Vec<Option<usize>> = vec![None; map.tiles.len()];
        for (i, cave) in caves.iter().enumerate() {
            for &(x, y) in cave {
                cave_at[map.xy_idx(x, y)] = Some(i);
            }
        }

        let mut unconnected: Vec<usize> = (0..caves.len()).collect();
        let mut connected = vec![unconnected.remove(rng.0.gen_range(0..unconnected.len()))];
        let mut corridors: Vec<(i32, i32)> = Vec::new();
        let mut direction = CardinalDirection::North;
        let mut attempts = 0;

        while !unconnected.is_empty() {
            let from_cave = corridors.is_empty()
                || rng.0.gen_range(0..100) < self.settings.corridor_branch_chance;

            let start = if from_cave {
                None
            } else {
                Self::corridor_edge(map, &corridors, rng)
            };
            let start = match start {
                Some(start) => Some(start),
                None => {
                    let cave = &caves[connected[rng.0.gen_range(0..connected.len())]];
                    Self::cave_edge(map, cave, direction, rng)
                }
            };

            if let Some(start) = start {
                direction = start.direction;
                if let Some(mut path) = self.corridor_attempt(map, start, rng) {
                    let hit = path.last().and_then(|&(x, y)| cave_at[map.xy_idx(x, y)]);
                    if let Some(pos) = hit.and_then(|c| unconnected.iter().position(|u| *u == c)) {
                        path.pop();
                        for &(x, y) in &path {
                            map.set(x, y, TileType::Floor);
                        }
                        corridors.extend(path);
                        connected.push(unconnected.remove(pos));
                    }
                }
            }

            attempts += 1;
            if attempts > self.settings.break_out {
                return false;
            }
        }

        debug!(
            "Cave: {} caves joined by {} corridor tiles",
            connected.len(),
            corridors.len()
        );
        true
    }
}

/// Open tiles at the given offsets from (x, y); offsets leaving the map are skipped.
fn open_around(map: &Map, x: i32, y: i32, offsets: &[(i32, i32)]) -> usize {
    offsets
        .iter()
        .filter(|(dx, dy)| map.get(x + dx, y + dy) == Some(TileType::Floor))
        .count()
}

impl MapBuilder for CaveBuilder {
    fn create_map(&mut self, rng: &mut GameRng) -> Map {
        let mut map = Map::new(self.width, self.height);
        map.clear(TileType::Wall);
        self.caves_connected = false;

        // No interior to dig.
        if self.width < 3 || self.height < 3 {
            return map;
        }

        self.build_caves(&mut map, rng);
        let caves = self.find_caves(&mut map);
        debug!("Cave: {} caves within size limits", caves.len());

        self.caves_connected = self.connect_caves(&mut map, &caves, rng);
        if !self.caves_connected {
            warn!("Cave: could not connect all {} caves", caves.len());
        }
        map
    }

    fn name(&self) -> &'static str {
        "Cave"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_from(rows: &[&str]) -> Map {
        let mut map = Map::new(rows[0].len() as i32, rows.len() as i32);
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                if c == '.' {
                    map.set(x as i32, y as i32, TileType::Floor);
                }
            }
        }
        map
    }

    #[test]
    fn size_limits_fill_small_and_large_caves() {
        let settings = CaveSettings {
            lower_limit: 2,
            upper_limit: 8,
            ..CaveSettings::default()
        };
        let builder = CaveBuilder::new(12, 5, settings);
        let mut map = map_from(&[
            "############", //
            "#.#...#.....", //
            "###...#.....", //
            "############", //
            "############",
        ]);
        let caves = builder.find_caves(&mut map);
        assert_eq!(caves.len(), 1);
        assert_eq!(caves[0].len(), 6);
        assert!(map.tile_at(1, 1).is_blocked());
        assert!(map.tile_at(4, 2).is_open());
        assert!(map.tile_at(8, 1).is_blocked());
    }

    #[test]
    fn clearance_checks_both_sides() {
        let builder = CaveBuilder::new(9, 9, CaveSettings::default());
        let map = map_from(&[
            "#########", //
            "#########", //
            "#########", //
            "#########", //
            "######.##", //
            "#########", //
            "#########", //
            "#########", //
            "#########",
        ]);
        assert!(!builder.has_clearance(&map, (4, 4), CardinalDirection::North));
        assert!(builder.has_clearance(&map, (4, 4), CardinalDirection::East));
        assert!(builder.has_clearance(&map, (4, 2), CardinalDirection::North));
    }

    #[test]
    fn turns_never_reverse() {
        let mut rng = GameRng::seeded(8);
        for _ in 0..200 {
            let dir = CaveBuilder::turn(&mut rng, CardinalDirection::East, CardinalDirection::North);
            assert_ne!(dir, CardinalDirection::West);
            assert_ne!(dir, CardinalDirection::South);
        }
    }

    #[test]
    fn cave_edge_stops_at_first_wall() {
        let map = map_from(&["#####", "#...#", "#####"]);
        let mut rng = GameRng::seeded(2);
        let cave = vec![(1, 1), (2, 1), (3, 1)];
        for _ in 0..20 {
            let start = CaveBuilder::cave_edge(&map, &cave, CardinalDirection::North, &mut rng).unwrap();
            assert!(map.tile_at(start.point.0, start.point.1).is_blocked());
            let (dx, dy) = start.direction.offset();
            let back = (start.point.0 - dx, start.point.1 - dy);
            assert!(map.tile_at(back.0, back.1).is_open());
        }
    }

    #[test]
    fn no_caves_means_not_connected() {
        let settings = CaveSettings {
            close_tile_prob: 0,
            iterations: 0,
            ..CaveSettings::default()
        };
        let mut builder = CaveBuilder::new(20, 20, settings);
        let map = builder.create_map(&mut GameRng::seeded(1));
        assert_eq!(map.count_tiles(TileType::Floor), 0);
        assert!(!builder.caves_connected());
    }

    #[test]
    fn grids_without_an_interior_stay_solid() {
        for (width, height) in [(2, 2), (1, 6), (6, 2)] {
            let mut builder = CaveBuilder::new(width, height, CaveSettings::default());
            let map = builder.create_map(&mut GameRng::seeded(4));
            assert_eq!(map.count_tiles(TileType::Floor), 0);
            assert!(!builder.caves_connected());
        }
    }

    #[test]
    fn connected_caves_form_one_region() {
        let mut builder = CaveBuilder::new(80, 50, CaveSettings::default());
        let map = builder.create_map(&mut GameRng::seeded(17));
        for ((x, y), tile) in map.all_tiles() {
            if map.is_border(x, y) {
                assert_eq!(tile, TileType::Wall);
            }
        }
        if builder.caves_connected() {
            assert_eq!(find_regions(&map).len(), 1);
        }
    }
}
