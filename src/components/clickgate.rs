//! Per-owner click state machine.
//!
//! ```text
//! OneShot:  Idle --click--> Animating --complete--> Done
//! Repeat:   Idle --click--> Animating --complete--> Idle
//! Toggle:   Toggled(p) --click--> Animating{toward !p} --complete--> Toggled(!p)
//! ```
//!
//! Clicks arriving while `Animating` (or `Done`) are rejected. Deactivation
//! resets any state back to the initial one.

use bevy_ecs::prelude::{Component, Entity};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GateMode {
    /// First click plays, later clicks are ignored forever.
    OneShot,
    /// Each click plays once the previous run finished.
    Repeat,
    /// Clicks alternate between the start pose and the target pose.
    Toggle,
}

/// Resting side of a toggle gate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TogglePose {
    Start,
    Target,
}

impl TogglePose {
    pub fn flipped(self) -> Self {
        match self {
            TogglePose::Start => TogglePose::Target,
            TogglePose::Target => TogglePose::Start,
        }
    }
}

/// What an accepted click asks the choreography to play.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cue {
    Trigger,
    ToTarget,
    ToStart,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Animating { sequence: Entity, cue: Cue },
    Done,
    Toggled(TogglePose),
}

#[derive(Component, Clone, Debug)]
pub struct ClickGate {
    pub mode: GateMode,
    pub state: GateState,
    /// Idle loop player started after the last settle, if any.
    pub idle: Option<Entity>,
}

impl ClickGate {
    pub fn new(mode: GateMode) -> Self {
        Self {
            mode,
            state: Self::initial(mode),
            idle: None,
        }
    }

    fn initial(mode: GateMode) -> GateState {
        match mode {
            GateMode::Toggle => GateState::Toggled(TogglePose::Start),
            GateMode::OneShot | GateMode::Repeat => GateState::Idle,
        }
    }

    /// Cue for a click in the current state, `None` if the click is rejected.
    pub fn accept(&self) -> Option<Cue> {
        match (self.mode, self.state) {
            (GateMode::OneShot | GateMode::Repeat, GateState::Idle) => Some(Cue::Trigger),
            (GateMode::Toggle, GateState::Toggled(TogglePose::Start)) => Some(Cue::ToTarget),
            (GateMode::Toggle, GateState::Toggled(TogglePose::Target)) => Some(Cue::ToStart),
            _ => None,
        }
    }

    pub fn begin(&mut self, sequence: Entity, cue: Cue) {
        self.state = GateState::Animating { sequence, cue };
    }

    /// Leave `Animating` when `sequence` is the one the gate is waiting on.
    /// Returns whether the state changed.
    pub fn settle(&mut self, sequence: Entity) -> bool {
        let GateState::Animating { sequence: running, cue } = self.state else {
            return false;
        };
        if running != sequence {
            return false;
        }
        self.state = match (self.mode, cue) {
            (GateMode::OneShot, _) => GateState::Done,
            (GateMode::Repeat, _) => GateState::Idle,
            (GateMode::Toggle, Cue::ToStart) => GateState::Toggled(TogglePose::Start),
            (GateMode::Toggle, _) => GateState::Toggled(TogglePose::Target),
        };
        true
    }

    pub fn reset(&mut self) {
        self.state = Self::initial(self.mode);
        self.idle = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::world::World;

    #[test]
    fn test_one_shot_accepts_once() {
        let seq = World::new().spawn_empty().id();
        let mut gate = ClickGate::new(GateMode::OneShot);
        assert_eq!(gate.accept(), Some(Cue::Trigger));
        gate.begin(seq, Cue::Trigger);
        assert_eq!(gate.accept(), None);
        assert!(gate.settle(seq));
        assert_eq!(gate.state, GateState::Done);
        assert_eq!(gate.accept(), None);
    }

    #[test]
    fn test_repeat_returns_to_idle() {
        let seq = World::new().spawn_empty().id();
        let mut gate = ClickGate::new(GateMode::Repeat);
        gate.begin(seq, Cue::Trigger);
        assert_eq!(gate.state, GateState::Animating { sequence: seq, cue: Cue::Trigger });
        assert!(gate.settle(seq));
        assert_eq!(gate.accept(), Some(Cue::Trigger));
    }

    #[test]
    fn test_toggle_alternates() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();
        let mut gate = ClickGate::new(GateMode::Toggle);
        assert_eq!(gate.accept(), Some(Cue::ToTarget));
        gate.begin(a, Cue::ToTarget);
        gate.settle(a);
        assert_eq!(gate.state, GateState::Toggled(TogglePose::Target));
        assert_eq!(gate.accept(), Some(Cue::ToStart));
        gate.begin(b, Cue::ToStart);
        gate.settle(b);
        assert_eq!(gate.state, GateState::Toggled(TogglePose::Start));
    }

    #[test]
    fn test_settle_ignores_other_sequences() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();
        let mut gate = ClickGate::new(GateMode::Repeat);
        gate.begin(a, Cue::Trigger);
        assert!(!gate.settle(b));
        assert_eq!(gate.state, GateState::Animating { sequence: a, cue: Cue::Trigger });
    }

    #[test]
    fn test_reset_from_any_state() {
        let seq = World::new().spawn_empty().id();
        let mut gate = ClickGate::new(GateMode::Toggle);
        gate.begin(seq, Cue::ToTarget);
        gate.idle = Some(seq);
        gate.reset();
        assert_eq!(gate.state, GateState::Toggled(TogglePose::Start));
        assert!(gate.idle.is_none());

        let mut gate = ClickGate::new(GateMode::OneShot);
        gate.state = GateState::Done;
        gate.reset();
        assert_eq!(gate.state, GateState::Idle);
    }
}
