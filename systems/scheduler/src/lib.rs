#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-timestep scheduling system that meters out simulation steps.
//!
//! Rendering runs every frame; the simulation advances only on 50 ms
//! boundaries, and at most one boundary per frame. Unconsumed accumulated
//! time is retained so a backlog drains gradually across frames instead of
//! bursting.

use std::time::Duration;

use crownhold_core::{Command, Event, SimSpeed, SIMULATION_STEP};

/// Frame deltas above this threshold are treated as a stall, not catch-up.
const MAX_FRAME_DELTA: Duration = Duration::from_millis(1000);

/// Pure system that converts real frame time into [`Command::Step`] batches.
#[derive(Debug)]
pub struct Scheduler {
    accumulator: Duration,
    speed: SimSpeed,
}

impl Scheduler {
    /// Creates a scheduler running at the provided initial speed.
    #[must_use]
    pub const fn new(speed: SimSpeed) -> Self {
        Self {
            accumulator: Duration::ZERO,
            speed,
        }
    }

    /// Consumes one frame's real-time delta and emits at most one step.
    ///
    /// Speed changes announced by the world take effect before accumulation.
    /// A frame delta above one second (a backgrounded window, a debugger
    /// pause) is dropped entirely rather than converted into a catch-up
    /// burst.
    pub fn handle(&mut self, frame_dt: Duration, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            if let Event::SpeedChanged { speed } = event {
                self.speed = *speed;
            }
        }

        if frame_dt > MAX_FRAME_DELTA {
            return;
        }

        let scaled = frame_dt.saturating_mul(self.speed.multiplier());
        self.accumulator = self.accumulator.saturating_add(scaled);

        if self.accumulator >= SIMULATION_STEP {
            self.accumulator -= SIMULATION_STEP;
            out.push(Command::Step);
        }
    }

    /// Simulated time accumulated but not yet consumed by a step.
    #[must_use]
    pub const fn accumulated(&self) -> Duration {
        self.accumulator
    }

    /// Speed multiplier currently applied to incoming frame deltas.
    #[must_use]
    pub const fn speed(&self) -> SimSpeed {
        self.speed
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SimSpeed::Normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_even_frames_consume_cleanly() {
        let mut scheduler = Scheduler::default();
        let mut commands = Vec::new();

        for _ in 0..20 {
            scheduler.handle(Duration::from_millis(50), &[], &mut commands);
        }

        assert_eq!(commands.len(), 20);
        assert!(commands.iter().all(|command| *command == Command::Step));
        assert_eq!(scheduler.accumulated(), Duration::ZERO);
    }

    #[test]
    fn paused_speed_accumulates_nothing() {
        let mut scheduler = Scheduler::new(SimSpeed::Paused);
        let mut commands = Vec::new();

        scheduler.handle(Duration::from_millis(500), &[], &mut commands);

        assert!(commands.is_empty());
        assert_eq!(scheduler.accumulated(), Duration::ZERO);
    }

    #[test]
    fn stalled_frames_are_dropped_not_replayed() {
        let mut scheduler = Scheduler::default();
        let mut commands = Vec::new();

        scheduler.handle(Duration::from_millis(1001), &[], &mut commands);
        assert!(commands.is_empty());
        assert_eq!(scheduler.accumulated(), Duration::ZERO);

        scheduler.handle(Duration::from_millis(1000), &[], &mut commands);
        assert_eq!(commands.len(), 1);
        assert_eq!(scheduler.accumulated(), Duration::from_millis(950));
    }

    #[test]
    fn backlog_drains_one_step_per_frame() {
        let mut scheduler = Scheduler::default();
        let mut commands = Vec::new();

        scheduler.handle(Duration::from_millis(500), &[], &mut commands);
        assert_eq!(commands.len(), 1, "a single frame yields a single step");

        for _ in 0..9 {
            scheduler.handle(Duration::ZERO, &[], &mut commands);
        }

        assert_eq!(commands.len(), 10);
        assert_eq!(scheduler.accumulated(), Duration::ZERO);
    }

    #[test]
    fn speed_change_events_rescale_following_frames() {
        let mut scheduler = Scheduler::default();
        let mut commands = Vec::new();

        scheduler.handle(
            Duration::from_millis(50),
            &[Event::SpeedChanged {
                speed: SimSpeed::Fastest,
            }],
            &mut commands,
        );

        assert_eq!(scheduler.speed(), SimSpeed::Fastest);
        assert_eq!(commands.len(), 1);
        assert_eq!(scheduler.accumulated(), Duration::from_millis(4950));
    }

    #[test]
    fn double_speed_steps_on_half_frames() {
        let mut scheduler = Scheduler::new(SimSpeed::Double);
        let mut commands = Vec::new();

        for _ in 0..4 {
            scheduler.handle(Duration::from_millis(25), &[], &mut commands);
        }

        assert_eq!(commands.len(), 4);
        assert_eq!(scheduler.accumulated(), Duration::ZERO);
    }
}
