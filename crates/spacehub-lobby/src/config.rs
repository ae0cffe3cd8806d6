//! Lobby settings.

/// Configuration shared by every lobby the hub creates.
///
/// The defaults reproduce the current game: two players per match and a
/// field of twenty asteroids laid out on a five-wide grid.
#[derive(Debug, Clone, PartialEq)]
pub struct LobbyConfig {
    /// Hard cap on members. A join beyond this is rejected.
    pub max_players: usize,

    /// Number of asteroids generated when a lobby is created.
    pub asteroid_count: u32,

    /// Asteroids per grid row.
    pub grid_width: u32,

    /// Distance between neighbouring asteroids, in world units.
    pub grid_spacing: f64,

    /// Hit points each asteroid starts with.
    pub asteroid_hp: u32,

    /// Entity id of the first asteroid; the rest follow consecutively.
    pub first_entity_id: u32,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            max_players: 2,
            asteroid_count: 20,
            grid_width: 5,
            grid_spacing: 20.0,
            asteroid_hp: 50,
            first_entity_id: 100,
        }
    }
}

impl LobbyConfig {
    /// Fix values that would break lobby invariants: a lobby must admit
    /// at least its creator, and a grid row holds at least one asteroid.
    pub fn validated(mut self) -> Self {
        if self.max_players == 0 {
            tracing::warn!("max_players of 0 would reject every join, using 1");
            self.max_players = 1;
        }
        if self.grid_width == 0 {
            self.grid_width = 1;
        }
        self
    }
}
