//! Scheduled population seeding.

use crate::world::World;
use humus_core::{Result, SeedingEvent};
use tracing::debug;

/// Seeding events evaluated once per tick, after both lifecycle passes
#[derive(Debug, Clone, Default)]
pub struct SeedingSchedule {
    events: Vec<SeedingEvent>,
}

impl SeedingSchedule {
    pub fn new(events: Vec<SeedingEvent>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[SeedingEvent] {
        &self.events
    }

    /// Events whose window contains `tick`
    pub fn active(&self, tick: u64) -> impl Iterator<Item = &SeedingEvent> + '_ {
        self.events.iter().filter(move |event| event.is_active(tick))
    }

    /// Spawn this tick's organisms, returning how many were placed
    pub fn apply(&self, world: &mut World) -> Result<usize> {
        let tick = world.clock();
        let mut placed = 0;

        for event in self.active(tick) {
            for _ in 0..event.per_tick {
                if world.spawn_at_random(event.kind)?.is_some() {
                    world.stats.record_spawn(event.kind);
                    placed += 1;
                }
            }
            debug!(
                event = "seeding",
                kind = %event.kind,
                per_tick = event.per_tick,
                tick = tick,
                "Seeding event fired"
            );
        }

        Ok(placed)
    }
}
