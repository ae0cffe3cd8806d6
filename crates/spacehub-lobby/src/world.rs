//! Initial world layout for a new lobby.

use spacehub_protocol::{Entity, EntityKind};

use crate::LobbyConfig;

/// Generates a lobby's entity set: `asteroid_count` stationary asteroids
/// on a grid `grid_width` wide, centred on the origin along x and z.
///
/// Deterministic: the same config always yields the same entities.
pub fn initial_entities(config: &LobbyConfig) -> Vec<Entity> {
    let width = config.grid_width.max(1);
    let half = f64::from(width / 2);

    (0..config.asteroid_count)
        .map(|i| {
            let col = f64::from(i % width);
            let row = f64::from(i / width);
            Entity {
                id: config.first_entity_id + i,
                kind: Some(EntityKind::Asteroid),
                x: (col - half) * config.grid_spacing,
                y: 0.0,
                z: (row - half) * config.grid_spacing,
                vx: 0.0,
                vy: 0.0,
                vz: 0.0,
                hp: Some(config.asteroid_hp),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_world_has_twenty_asteroids() {
        let entities = initial_entities(&LobbyConfig::default());
        assert_eq!(entities.len(), 20);
        for (i, e) in entities.iter().enumerate() {
            assert_eq!(e.id, 100 + i as u32);
            assert_eq!(e.kind, Some(EntityKind::Asteroid));
            assert_eq!(e.hp, Some(50));
            assert_eq!((e.vx, e.vy, e.vz), (0.0, 0.0, 0.0));
            assert_eq!(e.y, 0.0);
        }
    }

    #[test]
    fn test_default_world_grid_positions() {
        let entities = initial_entities(&LobbyConfig::default());
        // First row runs along x at z = -40.
        let first_row: Vec<(f64, f64)> =
            entities[..5].iter().map(|e| (e.x, e.z)).collect();
        assert_eq!(
            first_row,
            vec![(-40.0, -40.0), (-20.0, -40.0), (0.0, -40.0), (20.0, -40.0), (40.0, -40.0)]
        );
        // Entity 107 is column 2, row 1.
        assert_eq!((entities[7].x, entities[7].z), (0.0, -20.0));
        // Last entity is column 4, row 3.
        assert_eq!((entities[19].x, entities[19].z), (40.0, 20.0));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let config = LobbyConfig::default();
        assert_eq!(initial_entities(&config), initial_entities(&config));
    }

    #[test]
    fn test_empty_world() {
        let config = LobbyConfig {
            asteroid_count: 0,
            ..LobbyConfig::default()
        };
        assert!(initial_entities(&config).is_empty());
    }
}
