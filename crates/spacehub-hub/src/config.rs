//! Hub settings.

use spacehub_lobby::LobbyConfig;
use spacehub_tick::TickConfig;

/// Configuration for the hub actor.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Snapshot broadcast cadence.
    pub tick: TickConfig,

    /// Frames each client's outbound queue holds before new ones are
    /// dropped.
    pub outbound_capacity: usize,

    /// Pending commands the hub accepts before callers wait.
    pub command_capacity: usize,

    /// Settings applied to every lobby.
    pub lobby: LobbyConfig,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            tick: TickConfig::default(),
            outbound_capacity: 256,
            command_capacity: 1024,
            lobby: LobbyConfig::default(),
        }
    }
}

impl HubConfig {
    /// Channel capacities must be non-zero; tokio panics otherwise.
    pub(crate) fn validated(mut self) -> Self {
        self.outbound_capacity = self.outbound_capacity.max(1);
        self.command_capacity = self.command_capacity.max(1);
        self
    }
}
