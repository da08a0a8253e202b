//! Game modes, as entities that watch the player store.

use tracing::info;

use crate::game::entity::Entity;
use crate::game::simulation::Simulation;
use crate::game::state::EntityHandle;

/// Last player standing: once at most one player is left, record the winner
/// and stop the simulation.
#[derive(Debug, Default)]
pub struct LastStanding {
    finished: bool,
    winner: Option<String>,
}

impl LastStanding {
    /// Fresh, undecided match.
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the match has ended.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Name of the surviving player, `None` while undecided or if nobody survived.
    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }
}

impl Entity for LastStanding {
    fn tick(&mut self, _handle: EntityHandle, sim: &mut Simulation, _dt: f64) {
        if self.finished || sim.player_count() > 1 {
            return;
        }
        self.finished = true;
        self.winner = sim.players().next().map(|p| p.config().name.clone());
        info!(winner = ?self.winner, frame = sim.frame_count(), "match decided");
        sim.stop();
    }
}
