//! Sequence composition and playback.
//!
//! A [`SequenceSpec`] is a plain builder describing a timeline of steps:
//! tweens, intervals, instant [`Action`]s and nested sub-sequences. Each step
//! is placed at a start offset:
//!
//! - [`append`](SequenceSpec::append) places a step after everything added so far
//! - [`join`](SequenceSpec::join) places it at the start of the previously added step
//! - [`insert`](SequenceSpec::insert) places it at an absolute offset
//!
//! Spawning a [`SequencePlayer`] built from a spec starts playback; the
//! player entity is the sequence handle. Despawning it (or calling
//! [`SequencePlayer::cancel`]) stops every tween inside.

use bevy_ecs::prelude::{Component, Entity};

use crate::components::tween::{
    LoopMode, Loops, NodeId, Property, PropertyValue, TweenSpec, TweenState,
};
use crate::timeline::{Frame, PropertyHost, Sweep, Timeline};

/// Instant effect fired when playback crosses its position.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// Write a property value immediately.
    Set {
        target: Entity,
        property: Property,
        value: PropertyValue,
    },
    /// Show (`true`) or hide (`false`) an entity.
    SetActive { target: Entity, active: bool },
    /// Fire-and-forget sound effect.
    PlayFx(String),
    /// Trigger a [`SequenceSignal`](crate::events::sequence::SequenceSignal).
    Emit(String),
    /// Start an independent sequence owned by the same owner.
    Play(Box<SequenceSpec>),
}

impl Action {
    pub fn set(target: Entity, property: Property, value: impl Into<PropertyValue>) -> Self {
        Action::Set {
            target,
            property,
            value: value.into(),
        }
    }

    pub fn play(spec: SequenceSpec) -> Self {
        Action::Play(Box::new(spec))
    }

    fn targets(&self, entity: Entity) -> bool {
        match self {
            Action::Set { target, .. } | Action::SetActive { target, .. } => *target == entity,
            Action::Play(spec) => spec.targets(entity),
            Action::PlayFx(_) | Action::Emit(_) => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    Tween(TweenSpec),
    Interval(f32),
    Call(Action),
    Sequence(SequenceSpec),
}

impl Step {
    /// Time the step occupies in its parent.
    pub fn span(&self) -> f32 {
        match self {
            Step::Tween(tween) => tween.span(),
            Step::Interval(seconds) => seconds.max(0.0),
            Step::Call(_) => 0.0,
            Step::Sequence(spec) => spec.total(),
        }
    }
}

impl From<TweenSpec> for Step {
    fn from(tween: TweenSpec) -> Self {
        Step::Tween(tween)
    }
}

impl From<SequenceSpec> for Step {
    fn from(spec: SequenceSpec) -> Self {
        Step::Sequence(spec)
    }
}

impl From<Action> for Step {
    fn from(action: Action) -> Self {
        Step::Call(action)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlacedStep {
    pub start: f32,
    pub step: Step,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SequenceSpec {
    steps: Vec<PlacedStep>,
    cursor: f32,
    last_start: f32,
    pub(crate) loops: Loops,
    pub(crate) loop_mode: LoopMode,
    pub(crate) delay: f32,
    pub(crate) signal: Option<String>,
    pub(crate) anchored: bool,
}

impl SequenceSpec {
    pub fn new() -> Self {
        Self::default()
    }

    fn place(mut self, start: f32, step: Step) -> Self {
        let start = start.max(0.0);
        let end = start + step.span();
        self.cursor = self.cursor.max(end);
        self.last_start = start;
        self.steps.push(PlacedStep { start, step });
        self
    }

    pub fn append(self, step: impl Into<Step>) -> Self {
        let start = self.cursor;
        self.place(start, step.into())
    }

    pub fn join(self, step: impl Into<Step>) -> Self {
        let start = self.last_start;
        self.place(start, step.into())
    }

    pub fn insert(self, at: f32, step: impl Into<Step>) -> Self {
        self.place(at, step.into())
    }

    pub fn append_call(self, action: Action) -> Self {
        self.append(Step::Call(action))
    }

    pub fn insert_call(self, at: f32, action: Action) -> Self {
        self.insert(at, Step::Call(action))
    }

    pub fn append_interval(self, seconds: f32) -> Self {
        self.append(Step::Interval(seconds))
    }

    pub fn append_sequence(self, spec: SequenceSpec) -> Self {
        self.append(Step::Sequence(spec))
    }

    pub fn join_sequence(self, spec: SequenceSpec) -> Self {
        self.join(Step::Sequence(spec))
    }

    pub fn insert_sequence(self, at: f32, spec: SequenceSpec) -> Self {
        self.insert(at, Step::Sequence(spec))
    }

    pub fn with_loops(mut self, loops: Loops, loop_mode: LoopMode) -> Self {
        self.loops = loops;
        self.loop_mode = loop_mode;
        self
    }

    /// Wait `seconds` before the first iteration. The delay is not repeated.
    pub fn with_delay(mut self, seconds: f32) -> Self {
        self.delay = seconds.max(0.0);
        self
    }

    /// Restart the clock at a top-level call's own position on the tick it
    /// fires. Time between two calls then never runs shorter than their
    /// spacing, whatever the tick length. Meant for call-only coordinators;
    /// looping sequences ignore it.
    pub fn anchor_calls(mut self) -> Self {
        self.anchored = true;
        self
    }

    /// Signal carried by the completion event.
    pub fn on_complete(mut self, signal: impl Into<String>) -> Self {
        self.signal = Some(signal.into());
        self
    }

    /// Length of one iteration.
    pub fn span(&self) -> f32 {
        self.cursor
    }

    /// Delay plus every iteration; infinite when looping forever.
    pub fn total(&self) -> f32 {
        let iterations = match self.loops {
            Loops::Infinite => return f32::INFINITY,
            Loops::Finite(n) => n.max(1) as f32,
        };
        self.delay + self.cursor * iterations
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[PlacedStep] {
        &self.steps
    }

    /// Latest top-level call position in `(from, to]`, delay included.
    fn last_call_in(&self, from: f32, to: f32) -> Option<f32> {
        self.steps
            .iter()
            .filter(|placed| matches!(placed.step, Step::Call(_)))
            .map(|placed| self.delay + placed.start)
            .filter(|&at| at > from && at <= to)
            .reduce(f32::max)
    }

    /// Whether any step (including nested sequences and `Play` calls) touches `entity`.
    pub fn targets(&self, entity: Entity) -> bool {
        self.steps.iter().any(|placed| match &placed.step {
            Step::Tween(tween) => tween.target == entity,
            Step::Interval(_) => false,
            Step::Call(action) => action.targets(entity),
            Step::Sequence(spec) => spec.targets(entity),
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum PlayerState {
    Running,
    Completed,
    Cancelled,
}

/// Runs one [`SequenceSpec`]. The entity holding this component is the
/// sequence handle.
#[derive(Component, Debug)]
pub struct SequencePlayer {
    /// Rig (or any entity) that started the sequence.
    pub owner: Entity,
    timeline: Timeline,
    spec: SequenceSpec,
    elapsed: f64,
    last: Option<f32>,
    signal: Option<String>,
    state: PlayerState,
}

impl SequencePlayer {
    pub fn new(owner: Entity, spec: SequenceSpec) -> Self {
        let signal = spec.signal.clone();
        let timeline = Timeline::build(&spec);
        Self {
            owner,
            timeline,
            spec,
            elapsed: 0.0,
            last: None,
            signal,
            state: PlayerState::Running,
        }
    }

    pub fn signal(&self) -> Option<&str> {
        self.signal.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.state == PlayerState::Running
    }

    pub fn targets(&self, entity: Entity) -> bool {
        self.spec.targets(entity)
    }

    /// Stop playback. Properties keep the last written value and no
    /// completion is reported.
    pub fn cancel(&mut self) {
        if self.state == PlayerState::Running {
            self.state = PlayerState::Cancelled;
            self.timeline.finish(TweenState::Cancelled);
        }
    }

    /// Stop a single tween, e.g. when a newer sequence took its channel.
    pub fn cancel_tween(&mut self, node: NodeId) {
        self.timeline.cancel_node(node);
    }

    pub fn tween_state(&self, node: NodeId) -> Option<TweenState> {
        self.timeline.node_state(node)
    }

    /// Move the clock forward by `dt` and collect everything the traversed
    /// range produces. Returns `None` once the player is no longer running;
    /// the flag is `true` on the tick the last finite iteration ends.
    ///
    /// The first call only sweeps position zero: the tick a player starts on
    /// is its time zero, whichever path spawned it.
    pub fn advance(
        &mut self,
        sequence: Entity,
        dt: f32,
        host: &dyn PropertyHost,
    ) -> Option<(Frame, bool)> {
        if self.state != PlayerState::Running {
            return None;
        }
        let from = self.last;
        if from.is_some() {
            self.elapsed += f64::from(dt.max(0.0));
        }
        let to = self.elapsed as f32;
        let mut sweep = Sweep::new(host, sequence);
        self.timeline
            .traverse(from.unwrap_or(0.0), to, from.is_none(), &mut sweep);

        let mut now = to;
        if self.spec.anchored
            && self.spec.loops == Loops::default()
            && let Some(from) = from
            && let Some(anchor) = self.spec.last_call_in(from, to)
        {
            self.elapsed = f64::from(anchor);
            now = anchor;
        }
        self.last = Some(now);

        let total = self.timeline.total();
        let completed = total.is_finite() && now >= total;
        if completed {
            self.state = PlayerState::Completed;
            self.timeline.finish(TweenState::Completed);
        }
        Some((sweep.into_frame(), completed))
    }
}
