//! Tween definitions and per-entity tween ownership.
//!
//! A [`TweenSpec`] describes one interpolation of a single property of a
//! single target entity. Tweens never run on their own: they are placed in a
//! [`SequenceSpec`](super::sequence::SequenceSpec) and driven by a
//! [`SequencePlayer`](super::sequence::SequencePlayer). A lone tween is simply
//! a sequence with one step.
//!
//! Every animatable entity carries a [`TweenLocks`] table (it is a required
//! component of the property components), which records the
//! [`TweenHandle`] currently allowed to write each [`Channel`].
//!
//! See [`crate::systems::tween`] for easing and the update system.

use bevy_ecs::prelude::{Component, Entity};
use glam::Vec3;

/// Direction of successive loop iterations.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LoopMode {
    /// Every iteration plays from start to end.
    #[default]
    Restart,
    /// Odd iterations play backwards (ping-pong).
    Yoyo,
}

/// How many times a tween or sequence repeats.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Loops {
    Finite(u32),
    Infinite,
}

impl Default for Loops {
    fn default() -> Self {
        Loops::Finite(1)
    }
}

/// Easing functions for smooth interpolation.
///
/// These functions transform a linear `t` value (0.0 to 1.0) to create
/// different acceleration/deceleration curves.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    /// Constant speed (no easing).
    #[default]
    Linear,
    /// Starts slow, accelerates (quadratic).
    QuadIn,
    /// Starts fast, decelerates (quadratic).
    QuadOut,
    /// Slow start and end (quadratic).
    QuadInOut,
    /// Starts slow, accelerates (cubic).
    CubicIn,
    /// Starts fast, decelerates (cubic).
    CubicOut,
    /// Slow start and end (cubic).
    CubicInOut,
    /// Quarter sine, slow start.
    SineIn,
    /// Quarter sine, slow end.
    SineOut,
    /// Half sine, slow start and end. Used for every idle loop.
    SineInOut,
    /// Overshoots the end value, then settles back.
    BackOut,
    /// Bounces against the end value like a dropped ball.
    BounceOut,
}

/// Animatable property of an entity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Property {
    /// Full local position ([`MapPosition`](super::mapposition::MapPosition)).
    Position,
    /// Only the y coordinate of the local position.
    PositionY,
    /// Z-axis angle in degrees ([`Rotation`](super::rotation::Rotation)).
    Rotation,
    /// Local scale ([`Scale`](super::scale::Scale)).
    Scale,
    /// Visual alpha ([`Opacity`](super::opacity::Opacity)).
    Opacity,
}

/// Lock slot a property writes through. `Position` and `PositionY` share one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Position,
    Rotation,
    Scale,
    Opacity,
}

impl Channel {
    fn index(self) -> usize {
        match self {
            Channel::Position => 0,
            Channel::Rotation => 1,
            Channel::Scale => 2,
            Channel::Opacity => 3,
        }
    }
}

impl Property {
    pub fn channel(self) -> Channel {
        match self {
            Property::Position | Property::PositionY => Channel::Position,
            Property::Rotation => Channel::Rotation,
            Property::Scale => Channel::Scale,
            Property::Opacity => Channel::Opacity,
        }
    }

    /// Name of the component that backs this property.
    pub fn capability(self) -> &'static str {
        match self {
            Property::Position | Property::PositionY => "MapPosition",
            Property::Rotation => "Rotation",
            Property::Scale => "Scale",
            Property::Opacity => "Opacity",
        }
    }
}

/// A value written to a [`Property`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PropertyValue {
    Vector(Vec3),
    Scalar(f32),
}

impl From<Vec3> for PropertyValue {
    fn from(v: Vec3) -> Self {
        PropertyValue::Vector(v)
    }
}

impl From<f32> for PropertyValue {
    fn from(v: f32) -> Self {
        PropertyValue::Scalar(v)
    }
}

impl PropertyValue {
    pub fn as_vector(self) -> Option<Vec3> {
        match self {
            PropertyValue::Vector(v) => Some(v),
            PropertyValue::Scalar(_) => None,
        }
    }

    pub fn as_scalar(self) -> Option<f32> {
        match self {
            PropertyValue::Scalar(s) => Some(s),
            PropertyValue::Vector(_) => None,
        }
    }
}

/// Lifecycle of a tween node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TweenState {
    /// Not reached yet; `from` has not been captured.
    Pending,
    /// Reached at least once and still allowed to write.
    Running,
    /// Its sequence finished its last iteration.
    Completed,
    /// Stopped by a newer tween on the same channel, by its sequence being
    /// cancelled, or because its target could not be resolved.
    Cancelled,
}

/// Index of a tween node inside a sequence tree, unique per player.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// Identifies one tween: the player entity running it plus the node inside it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TweenHandle {
    pub sequence: Entity,
    pub node: NodeId,
}

/// One iteration span repeated `loops` times.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Repeat {
    /// Length of one iteration in seconds, possibly infinite.
    pub span: f32,
    pub loops: Loops,
    pub mode: LoopMode,
}

impl Repeat {
    pub fn new(span: f32, loops: Loops, mode: LoopMode) -> Self {
        Self { span, loops, mode }
    }

    /// Total playing time of all iterations.
    pub fn total(&self) -> f32 {
        match self.loops {
            Loops::Infinite => f32::INFINITY,
            Loops::Finite(n) => {
                if self.span > 0.0 {
                    self.span * n.max(1) as f32
                } else {
                    0.0
                }
            }
        }
    }

    /// Whether iteration `k` plays backwards.
    pub fn reversed(&self, k: u32) -> bool {
        self.mode == LoopMode::Yoyo && k % 2 == 1
    }

    /// Position inside the span where iteration `k` begins.
    pub fn start_of(&self, k: u32) -> f32 {
        if self.reversed(k) { self.span } else { 0.0 }
    }

    /// Position inside the span where iteration `k` ends.
    pub fn end_of(&self, k: u32) -> f32 {
        if self.reversed(k) { 0.0 } else { self.span }
    }

    /// Map elapsed time to `(iteration, position within the span)`.
    ///
    /// Yoyo iterations mirror the position. Past the last finite iteration
    /// the result stays pinned to the end of that iteration.
    pub fn locate(&self, elapsed: f32) -> (u32, f32) {
        if !(self.span > 0.0) {
            return (0, 0.0);
        }
        if self.span.is_infinite() {
            return (0, elapsed.max(0.0));
        }
        let elapsed = elapsed.max(0.0);
        let (k, rem) = match self.loops {
            Loops::Finite(n) if elapsed >= self.span * n.max(1) as f32 => {
                (n.max(1) - 1, self.span)
            }
            _ => {
                let k = (elapsed / self.span).floor();
                (k as u32, (elapsed - k * self.span).clamp(0.0, self.span))
            }
        };
        let pos = if self.reversed(k) { self.span - rem } else { rem };
        (k, pos)
    }
}

/// A single property interpolation.
///
/// Without an explicit `from`, the start value is read from the target the
/// first time the tween is reached, so `scale_to(body, rest, 0.5)` animates
/// from whatever scale the body has at that moment.
#[derive(Clone, Debug, PartialEq)]
pub struct TweenSpec {
    /// Entity whose property is animated.
    pub target: Entity,
    /// Animated property.
    pub property: Property,
    /// Explicit start value.
    pub from: Option<PropertyValue>,
    /// End value.
    pub to: PropertyValue,
    /// Duration of one iteration in seconds.
    pub duration: f32,
    /// Easing function to use.
    pub easing: Easing,
    /// Number of iterations.
    pub loops: Loops,
    /// Direction of successive iterations.
    pub loop_mode: LoopMode,
}

impl TweenSpec {
    fn new(target: Entity, property: Property, to: PropertyValue, duration: f32) -> Self {
        TweenSpec {
            target,
            property,
            from: None,
            to,
            duration: duration.max(0.0),
            easing: Easing::Linear,
            loops: Loops::Finite(1),
            loop_mode: LoopMode::Restart,
        }
    }
    pub fn move_to(target: Entity, to: Vec3, duration: f32) -> Self {
        Self::new(target, Property::Position, to.into(), duration)
    }
    pub fn move_y(target: Entity, y: f32, duration: f32) -> Self {
        Self::new(target, Property::PositionY, y.into(), duration)
    }
    pub fn rotate_to(target: Entity, degrees: f32, duration: f32) -> Self {
        Self::new(target, Property::Rotation, degrees.into(), duration)
    }
    pub fn scale_to(target: Entity, to: Vec3, duration: f32) -> Self {
        Self::new(target, Property::Scale, to.into(), duration)
    }
    pub fn fade_to(target: Entity, alpha: f32, duration: f32) -> Self {
        Self::new(target, Property::Opacity, alpha.into(), duration)
    }
    pub fn from(mut self, value: impl Into<PropertyValue>) -> Self {
        self.from = Some(value.into());
        self
    }
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
    pub fn with_loops(mut self, loops: Loops, loop_mode: LoopMode) -> Self {
        self.loops = loops;
        self.loop_mode = loop_mode;
        self
    }
    pub fn repeat(&self) -> Repeat {
        Repeat::new(self.duration, self.loops, self.loop_mode)
    }
    /// Total time the tween occupies in its sequence.
    pub fn span(&self) -> f32 {
        match self.loops {
            Loops::Infinite => f32::INFINITY,
            Loops::Finite(n) => self.duration * n.max(1) as f32,
        }
    }
}

/// Which tween currently owns each property channel of an entity.
///
/// At most one [`TweenHandle`] owns a channel. Writes from any other
/// sequence to that channel are dropped by the update system.
#[derive(Component, Clone, Debug, Default)]
pub struct TweenLocks {
    owners: [Option<TweenHandle>; 4],
}

impl TweenLocks {
    pub fn owner(&self, channel: Channel) -> Option<TweenHandle> {
        self.owners[channel.index()]
    }

    /// Give `channel` to `handle`, returning the previous owner if any.
    pub fn claim(&mut self, channel: Channel, handle: TweenHandle) -> Option<TweenHandle> {
        self.owners[channel.index()]
            .replace(handle)
            .filter(|prior| *prior != handle)
    }

    pub fn holds(&self, sequence: Entity) -> bool {
        self.owners.iter().flatten().any(|h| h.sequence == sequence)
    }

    /// Release every channel held by `sequence`.
    pub fn release_sequence(&mut self, sequence: Entity) {
        for slot in self.owners.iter_mut() {
            if slot.is_some_and(|h| h.sequence == sequence) {
                *slot = None;
            }
        }
    }

    pub fn clear(&mut self) {
        self.owners = [None; 4];
    }

    pub fn is_empty(&self) -> bool {
        self.owners.iter().all(Option::is_none)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::world::World;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn entity() -> Entity {
        World::new().spawn_empty().id()
    }

    #[test]
    fn test_tween_spec_defaults() {
        let e = entity();
        let tw = TweenSpec::move_to(e, Vec3::new(1.0, 2.0, 0.0), 2.0);
        assert_eq!(tw.target, e);
        assert_eq!(tw.property, Property::Position);
        assert!(tw.from.is_none());
        assert!(approx_eq(tw.duration, 2.0));
        assert_eq!(tw.easing, Easing::Linear);
        assert_eq!(tw.loops, Loops::Finite(1));
        assert_eq!(tw.loop_mode, LoopMode::Restart);
    }

    #[test]
    fn test_tween_spec_builder_chaining() {
        let tw = TweenSpec::rotate_to(entity(), 25.0, 0.8)
            .from(0.0)
            .with_easing(Easing::SineInOut)
            .with_loops(Loops::Infinite, LoopMode::Yoyo);
        assert_eq!(tw.from, Some(PropertyValue::Scalar(0.0)));
        assert_eq!(tw.easing, Easing::SineInOut);
        assert_eq!(tw.loops, Loops::Infinite);
        assert!(tw.span().is_infinite());
    }

    #[test]
    fn test_negative_duration_is_clamped() {
        let tw = TweenSpec::fade_to(entity(), 1.0, -3.0);
        assert!(approx_eq(tw.duration, 0.0));
    }

    #[test]
    fn test_span_counts_loops() {
        let tw = TweenSpec::scale_to(entity(), Vec3::ONE, 0.3)
            .with_loops(Loops::Finite(2), LoopMode::Yoyo);
        assert!(approx_eq(tw.span(), 0.6));
    }

    #[test]
    fn test_position_y_shares_position_channel() {
        assert_eq!(Property::PositionY.channel(), Channel::Position);
        assert_eq!(Property::Position.channel(), Channel::Position);
        assert_ne!(Property::Scale.channel(), Channel::Position);
    }

    // ==================== REPEAT TESTS ====================

    #[test]
    fn test_repeat_total() {
        assert!(approx_eq(Repeat::new(0.5, Loops::Finite(4), LoopMode::Yoyo).total(), 2.0));
        assert!(Repeat::new(0.5, Loops::Infinite, LoopMode::Restart).total().is_infinite());
        assert!(approx_eq(Repeat::new(0.0, Loops::Finite(3), LoopMode::Restart).total(), 0.0));
    }

    #[test]
    fn test_locate_restart_wraps() {
        let r = Repeat::new(1.0, Loops::Finite(3), LoopMode::Restart);
        let (k, s) = r.locate(1.25);
        assert_eq!(k, 1);
        assert!(approx_eq(s, 0.25));
    }

    #[test]
    fn test_locate_yoyo_mirrors_odd_iterations() {
        let r = Repeat::new(1.0, Loops::Infinite, LoopMode::Yoyo);
        let (k, s) = r.locate(1.25);
        assert_eq!(k, 1);
        assert!(approx_eq(s, 0.75));
        let (k, s) = r.locate(2.25);
        assert_eq!(k, 2);
        assert!(approx_eq(s, 0.25));
    }

    #[test]
    fn test_locate_pins_after_last_iteration() {
        let r = Repeat::new(1.0, Loops::Finite(2), LoopMode::Yoyo);
        assert_eq!(r.locate(5.0), (1, 0.0));
        let r = Repeat::new(1.0, Loops::Finite(1), LoopMode::Restart);
        assert_eq!(r.locate(1.0), (0, 1.0));
    }

    #[test]
    fn test_locate_zero_span() {
        let r = Repeat::new(0.0, Loops::Infinite, LoopMode::Restart);
        assert_eq!(r.locate(10.0), (0, 0.0));
    }

    // ==================== LOCK TESTS ====================

    #[test]
    fn test_locks_claim_returns_prior_owner() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();
        let ha = TweenHandle { sequence: a, node: NodeId(0) };
        let hb = TweenHandle { sequence: b, node: NodeId(3) };

        let mut locks = TweenLocks::default();
        assert!(locks.claim(Channel::Rotation, ha).is_none());
        assert_eq!(locks.claim(Channel::Rotation, ha), None);
        assert_eq!(locks.claim(Channel::Rotation, hb), Some(ha));
        assert_eq!(locks.owner(Channel::Rotation), Some(hb));
        assert!(locks.owner(Channel::Scale).is_none());
    }

    #[test]
    fn test_locks_release_sequence() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();
        let mut locks = TweenLocks::default();
        locks.claim(Channel::Position, TweenHandle { sequence: a, node: NodeId(0) });
        locks.claim(Channel::Opacity, TweenHandle { sequence: b, node: NodeId(1) });

        assert!(locks.holds(a));
        locks.release_sequence(a);
        assert!(!locks.holds(a));
        assert!(locks.owner(Channel::Position).is_none());
        assert!(locks.owner(Channel::Opacity).is_some());
        locks.clear();
        assert!(locks.is_empty());
    }
}
