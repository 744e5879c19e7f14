use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{check_dimensions, check_range};
use crate::error::MapGenError;
use crate::map::{Map, TileType};
use crate::rng::GameRng;
use crate::shapes::Rect;

use super::common::{apply_dogleg_corridor, apply_room_to_map};
use super::MapBuilder;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunnelingRoomsSettings {
    pub max_rooms: i32,
    pub room_max_size: i32,
    pub room_min_size: i32,
}

impl Default for TunnelingRoomsSettings {
    fn default() -> Self {
        Self {
            max_rooms: 30,
            room_max_size: 15,
            room_min_size: 6,
        }
    }
}

impl TunnelingRoomsSettings {
    pub fn validate(&self, width: i32, height: i32) -> Result<(), MapGenError> {
        check_range("max_rooms", self.max_rooms, 0, i32::MAX)?;
        check_range("room_min_size", self.room_min_size, 2, self.room_max_size)?;
        check_dimensions(width, height, self.room_max_size, self.room_max_size)
    }
}

/// Non-overlapping rooms scattered at random, each tunnelled to the one
/// placed before it.
pub struct TunnelingRoomsBuilder {
    width: i32,
    height: i32,
    settings: TunnelingRoomsSettings,
    rooms: Vec<Rect>,
}

impl TunnelingRoomsBuilder {
    pub fn new(width: i32, height: i32, settings: TunnelingRoomsSettings) -> Self {
        Self {
            width,
            height,
            settings,
            rooms: Vec::new(),
        }
    }

    /// Rooms accepted by the last run, in placement order.
    pub fn rooms(&self) -> &[Rect] {
        &self.rooms
    }
}

impl MapBuilder for TunnelingRoomsBuilder {
    fn create_map(&mut self, rng: &mut GameRng) -> Map {
        let mut map = Map::new(self.width, self.height);
        map.clear(TileType::Wall);
        self.rooms.clear();

        for _ in 0..self.settings.max_rooms {
            let w = rng.range_or_min(self.settings.room_min_size, self.settings.room_max_size);
            let h = rng.range_or_min(self.settings.room_min_size, self.settings.room_max_size);
            let x = rng.range_or_min(0, self.width - w);
            let y = rng.range_or_min(0, self.height - h);
            let candidate = Rect::new(x, y, w, h);

            if !self.rooms.iter().any(|room| candidate.intersect(room)) {
                self.rooms.push(candidate);
            }
        }

        for room in &self.rooms {
            apply_room_to_map(&mut map, room);
        }
        for pair in self.rooms.windows(2) {
            apply_dogleg_corridor(&mut map, rng, &pair[0], &pair[1]);
        }

        debug!("Tunneling rooms: placed {} rooms", self.rooms.len());
        map
    }

    fn name(&self) -> &'static str {
        "Tunneling With Rooms"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::find_regions;

    #[test]
    fn rooms_never_overlap() {
        let mut builder = TunnelingRoomsBuilder::new(80, 50, TunnelingRoomsSettings::default());
        let map = builder.create_map(&mut GameRng::seeded(12));
        let rooms = builder.rooms();
        assert!(!rooms.is_empty());
        for (i, a) in rooms.iter().enumerate() {
            for b in rooms.iter().skip(i + 1) {
                assert!(!a.intersect(b));
            }
        }
        assert_eq!(find_regions(&map).len(), 1);
    }

    #[test]
    fn zero_rooms_leaves_solid_rock() {
        let settings = TunnelingRoomsSettings {
            max_rooms: 0,
            ..TunnelingRoomsSettings::default()
        };
        let map = TunnelingRoomsBuilder::new(40, 40, settings).create_map(&mut GameRng::seeded(1));
        assert_eq!(map.count_tiles(TileType::Floor), 0);
    }
}
