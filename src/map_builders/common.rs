use crate::map::{Map, TileType};
use crate::rng::GameRng;
use crate::shapes::Rect;

/// Opens the interior of `room`, leaving its outline solid.
pub fn apply_room_to_map(map: &mut Map, room: &Rect) {
    for y in room.y1 + 1..room.y2 {
        for x in room.x1 + 1..room.x2 {
            map.set(x, y, TileType::Floor);
        }
    }
}

/// Walls the outline of `room` (inclusive of `x2`/`y2`) and opens its interior.
pub fn apply_hollow_room_to_map(map: &mut Map, room: &Rect) {
    for y in room.y1..=room.y2 {
        for x in room.x1..=room.x2 {
            map.set(x, y, TileType::Wall);
        }
    }
    apply_room_to_map(map, room);
}

pub fn apply_horizontal_tunnel(map: &mut Map, x1: i32, x2: i32, y: i32) {
    for x in x1.min(x2)..=x1.max(x2) {
        map.set(x, y, TileType::Floor);
    }
}

pub fn apply_vertical_tunnel(map: &mut Map, y1: i32, y2: i32, x: i32) {
    for y in y1.min(y2)..=y1.max(y2) {
        map.set(x, y, TileType::Floor);
    }
}

/// L-shaped corridor between the centers of two rooms. A coin flip decides
/// whether the horizontal or the vertical leg comes first.
pub fn apply_dogleg_corridor(map: &mut Map, rng: &mut GameRng, from: &Rect, to: &Rect) {
    let (x1, y1) = from.center();
    let (x2, y2) = to.center();

    if rng.coin() {
        apply_horizontal_tunnel(map, x1, x2, y1);
        apply_vertical_tunnel(map, y1, y2, x2);
    } else {
        apply_vertical_tunnel(map, y1, y2, x1);
        apply_horizontal_tunnel(map, x1, x2, y2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_interior_only() {
        let mut map = Map::new(8, 8);
        apply_room_to_map(&mut map, &Rect::new(1, 1, 4, 3));
        assert_eq!(map.count_tiles(TileType::Floor), 3 * 2);
        assert!(map.tile_at(1, 1).is_blocked());
        assert!(map.tile_at(2, 2).is_open());
        assert!(map.tile_at(5, 4).is_blocked());
    }

    #[test]
    fn hollow_room_keeps_walls() {
        let mut map = Map::new(8, 8);
        map.clear(TileType::Floor);
        let room = Rect::new(1, 1, 4, 4);
        apply_hollow_room_to_map(&mut map, &room);
        assert!(map.tile_at(1, 1).is_blocked());
        assert!(map.tile_at(5, 5).is_blocked());
        assert!(map.tile_at(3, 3).is_open());
        assert!(map.tile_at(6, 6).is_open());
        assert_eq!(map.count_tiles(TileType::Wall), 25 - 9);
    }

    #[test]
    fn dogleg_joins_centers() {
        let mut map = Map::new(20, 20);
        let a = Rect::new(1, 1, 4, 4);
        let b = Rect::new(12, 10, 4, 4);
        let mut rng = GameRng::seeded(9);
        apply_dogleg_corridor(&mut map, &mut rng, &a, &b);
        let (ax, ay) = a.center();
        let (bx, by) = b.center();
        assert!(map.tile_at(ax, ay).is_open());
        assert!(map.tile_at(bx, by).is_open());
        let opened = map.count_tiles(TileType::Floor) as i32;
        assert_eq!(opened, (bx - ax).abs() + (by - ay).abs() + 1);
    }
}
