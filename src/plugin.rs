use bevy::prelude::*;

use crate::config::MapGenConfig;
use crate::map_builders::generate_with;
use crate::rng::GameRng;

/// Generates one [`crate::map::Map`] resource at startup from the given config.
pub struct MapGenPlugin {
    pub config: MapGenConfig,
}

impl Plugin for MapGenPlugin {
    fn build(&self, app: &mut App) {
        let rng = match self.config.seed {
            Some(seed) => GameRng::seeded(seed),
            None => GameRng::default(),
        };
        app.insert_resource(self.config.clone())
            .insert_resource(rng)
            .add_systems(Startup, generate_map);
    }
}

fn generate_map(mut commands: Commands, config: Res<MapGenConfig>, mut rng: ResMut<GameRng>) {
    match generate_with(&config, &mut rng) {
        Ok(map) => commands.insert_resource(map),
        Err(e) => error!("Map generation failed: {}", e),
    }
}
