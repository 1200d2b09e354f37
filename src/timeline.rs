//! Runtime evaluation of sequence timelines.
//!
//! A [`Timeline`] is the compiled form of a
//! [`SequenceSpec`](crate::components::sequence::SequenceSpec). Playback is a
//! series of sweeps: each tick the player moves its clock from the previous
//! position to the new one and the timeline visits every node the traversed
//! range touches.
//!
//! - tweens intersecting the range write their value at the range end
//! - calls fire when the range crosses their position
//! - nested timelines are swept with the range shifted into their local time
//!
//! Loop iterations are handled by splitting the sweep at iteration
//! boundaries. Yoyo iterations sweep backwards, so calls fire in reverse and
//! earlier nodes win per channel on the way back.
//!
//! Nothing is written to the world here: results are collected in a
//! [`Frame`] that [`tween_sequence_system`](crate::systems::tween::tween_sequence_system)
//! applies afterwards.

use bevy_ecs::prelude::Entity;
use log::warn;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::components::sequence::{Action, SequenceSpec, Step};
use crate::components::tween::{
    Channel, LoopMode, NodeId, Property, PropertyValue, Repeat, TweenHandle, TweenSpec,
    TweenState,
};
use crate::error::AnimError;
use crate::systems::tween::{ease, lerp_value};

/// Read access to the animatable properties of the world.
pub trait PropertyHost {
    fn read(&self, target: Entity, property: Property) -> Result<PropertyValue, AnimError>;
}

/// One property write. `handle` is `None` for instant [`Action::Set`] writes,
/// which are not bound by channel locks.
#[derive(Clone, Debug, PartialEq)]
pub struct Write {
    pub handle: Option<TweenHandle>,
    pub target: Entity,
    pub property: Property,
    pub value: PropertyValue,
}

/// Everything one player produced during one tick, in evaluation order.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    pub writes: Vec<Write>,
    /// Tweens that activated this tick and want their channel.
    pub claims: Vec<(Entity, Channel, TweenHandle)>,
    /// Non-property actions, executed after the writes.
    pub actions: Vec<Action>,
}

/// Traversal context shared by all nodes of one player during one tick.
pub struct Sweep<'a> {
    host: &'a dyn PropertyHost,
    sequence: Entity,
    // Values written earlier in the same sweep; `PositionY` is folded into `Position`.
    overlay: FxHashMap<(Entity, Property), PropertyValue>,
    frame: Frame,
}

impl<'a> Sweep<'a> {
    pub fn new(host: &'a dyn PropertyHost, sequence: Entity) -> Self {
        Self {
            host,
            sequence,
            overlay: FxHashMap::default(),
            frame: Frame::default(),
        }
    }

    pub fn into_frame(self) -> Frame {
        self.frame
    }

    fn read(&self, target: Entity, property: Property) -> Result<PropertyValue, AnimError> {
        let key = match property {
            Property::PositionY => (target, Property::Position),
            _ => (target, property),
        };
        match (self.overlay.get(&key), property) {
            (Some(PropertyValue::Vector(v)), Property::PositionY) => Ok(v.y.into()),
            (Some(value), _) => Ok(*value),
            (None, _) => self.host.read(target, property),
        }
    }

    fn write(&mut self, handle: Option<TweenHandle>, target: Entity, property: Property, value: PropertyValue) {
        match (property, value) {
            (Property::PositionY, PropertyValue::Scalar(y)) => {
                if let Ok(PropertyValue::Vector(mut pos)) = self.read(target, Property::Position) {
                    pos.y = y;
                    self.overlay.insert((target, Property::Position), pos.into());
                }
            }
            _ => {
                self.overlay.insert((target, property), value);
            }
        }
        self.frame.writes.push(Write {
            handle,
            target,
            property,
            value,
        });
    }

    fn act(&mut self, action: &Action) {
        match action {
            Action::Set {
                target,
                property,
                value,
            } => self.write(None, *target, *property, *value),
            other => self.frame.actions.push(other.clone()),
        }
    }
}

#[derive(Clone, Debug)]
struct TweenNode {
    id: NodeId,
    spec: TweenSpec,
    from: Option<PropertyValue>,
    state: TweenState,
}

impl TweenNode {
    fn sample(&self, from: PropertyValue, local: f32) -> PropertyValue {
        let (_, phase) = self.spec.repeat().locate(local);
        let t = if self.spec.duration > 0.0 {
            phase / self.spec.duration
        } else {
            1.0
        };
        lerp_value(from, self.spec.to, ease(self.spec.easing, t))
    }

    fn visit(&mut self, start: f32, b: f32, cx: &mut Sweep) {
        if matches!(self.state, TweenState::Cancelled | TweenState::Completed) {
            return;
        }
        if self.state == TweenState::Pending {
            let from = match self.spec.from {
                Some(value) => Ok(value),
                None => cx.read(self.spec.target, self.spec.property),
            };
            match from {
                Ok(value) => {
                    self.from = Some(value);
                    self.state = TweenState::Running;
                    let handle = TweenHandle {
                        sequence: cx.sequence,
                        node: self.id,
                    };
                    cx.frame
                        .claims
                        .push((self.spec.target, self.spec.property.channel(), handle));
                }
                Err(err) => {
                    warn!("skipping tween {:?}: {}", self.spec.property, err);
                    self.state = TweenState::Cancelled;
                    return;
                }
            }
        }
        let Some(from) = self.from else {
            return;
        };
        let local = (b - start).clamp(0.0, self.spec.span());
        let value = self.sample(from, local);
        let handle = TweenHandle {
            sequence: cx.sequence,
            node: self.id,
        };
        cx.write(Some(handle), self.spec.target, self.spec.property, value);
    }
}

#[derive(Clone, Debug)]
enum NodeKind {
    Tween(TweenNode),
    Interval,
    Call(Action),
    Nested(Box<Timeline>),
}

#[derive(Clone, Debug)]
struct Node {
    start: f32,
    span: f32,
    kind: NodeKind,
}

#[derive(Clone, Debug)]
pub struct Timeline {
    nodes: SmallVec<[Node; 4]>,
    repeat: Repeat,
    delay: f32,
}

impl Timeline {
    pub fn build(spec: &SequenceSpec) -> Self {
        let mut next_id = 0;
        Self::compile(spec, &mut next_id)
    }

    fn compile(spec: &SequenceSpec, next_id: &mut u32) -> Self {
        let mut placed: Vec<_> = spec.steps().iter().collect();
        placed.sort_by(|a, b| a.start.total_cmp(&b.start));

        let mut nodes = SmallVec::with_capacity(placed.len());
        for step in placed {
            let kind = match &step.step {
                Step::Tween(tween) => {
                    let id = NodeId(*next_id);
                    *next_id += 1;
                    NodeKind::Tween(TweenNode {
                        id,
                        spec: tween.clone(),
                        from: None,
                        state: TweenState::Pending,
                    })
                }
                Step::Interval(_) => NodeKind::Interval,
                Step::Call(action) => NodeKind::Call(action.clone()),
                Step::Sequence(inner) => NodeKind::Nested(Box::new(Self::compile(inner, next_id))),
            };
            nodes.push(Node {
                start: step.start,
                span: step.step.span(),
                kind,
            });
        }
        Timeline {
            nodes,
            repeat: Repeat::new(spec.span(), spec.loops, spec.loop_mode),
            delay: spec.delay,
        }
    }

    /// Delay plus every iteration.
    pub fn total(&self) -> f32 {
        self.delay + self.repeat.total()
    }

    /// Sweep from `a` to `b`, both in the parent's time (delay included).
    /// With `inclusive` set, calls sitting exactly at `a` fire too.
    pub fn traverse(&mut self, a: f32, b: f32, inclusive: bool, cx: &mut Sweep) {
        let (mut a, mut b) = (a - self.delay, b - self.delay);
        if a < 0.0 && b < 0.0 {
            return;
        }
        let total = self.repeat.total();
        if a > total && b > total {
            return;
        }
        let mut inclusive = inclusive;
        if a < 0.0 || a > total {
            a = a.clamp(0.0, total);
            inclusive = true;
        }
        b = b.clamp(0.0, total);
        if a == b && !inclusive {
            return;
        }

        let (ka, pa) = self.repeat.locate(a);
        let (kb, pb) = self.repeat.locate(b);
        let wrap = self.repeat.mode == LoopMode::Restart;

        if ka == kb {
            self.sweep(pa, pb, inclusive, cx);
        } else if kb > ka {
            self.sweep(pa, self.repeat.end_of(ka), inclusive, cx);
            for k in ka + 1..kb {
                self.sweep(self.repeat.start_of(k), self.repeat.end_of(k), wrap, cx);
            }
            self.sweep(self.repeat.start_of(kb), pb, wrap, cx);
        } else {
            self.sweep(pa, self.repeat.start_of(ka), inclusive, cx);
            for k in (kb + 1..ka).rev() {
                self.sweep(self.repeat.end_of(k), self.repeat.start_of(k), wrap, cx);
            }
            self.sweep(self.repeat.end_of(kb), pb, wrap, cx);
        }
    }

    /// One sweep inside a single iteration, positions in local span time.
    fn sweep(&mut self, a: f32, b: f32, inclusive: bool, cx: &mut Sweep) {
        let forward = b >= a;
        let (lo, hi) = if forward { (a, b) } else { (b, a) };
        let order: SmallVec<[usize; 8]> = if forward {
            (0..self.nodes.len()).collect()
        } else {
            (0..self.nodes.len()).rev().collect()
        };

        for i in order {
            let node = &mut self.nodes[i];
            let (t0, t1) = (node.start, node.start + node.span);
            match &mut node.kind {
                NodeKind::Interval => {}
                NodeKind::Call(action) => {
                    let crossed = if forward {
                        a < t0 && t0 <= b
                    } else {
                        b <= t0 && t0 < a
                    };
                    if crossed || (inclusive && t0 == a) {
                        cx.act(action);
                    }
                }
                NodeKind::Tween(tween) => {
                    if t0 <= hi && t1 >= lo {
                        tween.visit(t0, b, cx);
                    }
                }
                NodeKind::Nested(inner) => {
                    if t0 <= hi && t1 >= lo {
                        inner.traverse(a - t0, b - t0, inclusive, cx);
                    }
                }
            }
        }
    }

    /// Mark every tween node still alive as `state`.
    pub fn finish(&mut self, state: TweenState) {
        for node in self.nodes.iter_mut() {
            match &mut node.kind {
                NodeKind::Tween(tween) => {
                    if matches!(tween.state, TweenState::Pending | TweenState::Running) {
                        tween.state = state;
                    }
                }
                NodeKind::Nested(inner) => inner.finish(state),
                NodeKind::Interval | NodeKind::Call(_) => {}
            }
        }
    }

    fn find_mut(&mut self, id: NodeId) -> Option<&mut TweenNode> {
        for node in self.nodes.iter_mut() {
            match &mut node.kind {
                NodeKind::Tween(tween) if tween.id == id => return Some(tween),
                NodeKind::Nested(inner) => {
                    if let Some(found) = inner.find_mut(id) {
                        return Some(found);
                    }
                }
                _ => {}
            }
        }
        None
    }

    pub fn cancel_node(&mut self, id: NodeId) {
        if let Some(tween) = self.find_mut(id) {
            tween.state = TweenState::Cancelled;
        }
    }

    pub fn node_state(&self, id: NodeId) -> Option<TweenState> {
        self.nodes.iter().find_map(|node| match &node.kind {
            NodeKind::Tween(tween) if tween.id == id => Some(tween.state),
            NodeKind::Nested(inner) => inner.node_state(id),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::tween::{Easing, Loops};
    use bevy_ecs::world::World;
    use glam::Vec3;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    /// Host where every entity sits at the origin with unit scale and full alpha.
    struct RestHost;

    impl PropertyHost for RestHost {
        fn read(&self, _target: Entity, property: Property) -> Result<PropertyValue, AnimError> {
            Ok(match property {
                Property::Position => Vec3::ZERO.into(),
                Property::PositionY | Property::Rotation => PropertyValue::Scalar(0.0),
                Property::Scale => Vec3::ONE.into(),
                Property::Opacity => PropertyValue::Scalar(1.0),
            })
        }
    }

    struct NoOpacityHost;

    impl PropertyHost for NoOpacityHost {
        fn read(&self, target: Entity, property: Property) -> Result<PropertyValue, AnimError> {
            match property {
                Property::Opacity => Err(AnimError::MissingCapability {
                    entity: target,
                    property,
                    capability: property.capability(),
                }),
                _ => RestHost.read(target, property),
            }
        }
    }

    fn entities(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|_| world.spawn_empty().id()).collect()
    }

    fn sweep_frame(tl: &mut Timeline, host: &dyn PropertyHost, seq: Entity, a: f32, b: f32, inclusive: bool) -> Frame {
        let mut cx = Sweep::new(host, seq);
        tl.traverse(a, b, inclusive, &mut cx);
        cx.into_frame()
    }

    fn last_scalar(frame: &Frame, property: Property) -> Option<f32> {
        frame
            .writes
            .iter()
            .rev()
            .find(|w| w.property == property)
            .and_then(|w| w.value.as_scalar())
    }

    fn emitted(frame: &Frame) -> Vec<String> {
        frame
            .actions
            .iter()
            .filter_map(|a| match a {
                Action::Emit(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_tween_samples_at_sweep_end() {
        let e = entities(2);
        let spec = SequenceSpec::new().append(TweenSpec::rotate_to(e[0], 10.0, 1.0));
        let mut tl = Timeline::build(&spec);
        let frame = sweep_frame(&mut tl, &RestHost, e[1], 0.0, 0.5, true);
        assert!(approx_eq(last_scalar(&frame, Property::Rotation).unwrap_or(-1.0), 5.0));
        assert_eq!(frame.claims.len(), 1);

        // Claims only on first activation.
        let frame = sweep_frame(&mut tl, &RestHost, e[1], 0.5, 1.0, false);
        assert!(frame.claims.is_empty());
        assert!(approx_eq(last_scalar(&frame, Property::Rotation).unwrap_or(-1.0), 10.0));
    }

    #[test]
    fn test_from_is_captured_once() {
        let e = entities(2);
        let spec = SequenceSpec::new().append(TweenSpec::fade_to(e[0], 0.0, 1.0));
        let mut tl = Timeline::build(&spec);
        sweep_frame(&mut tl, &RestHost, e[1], 0.0, 0.5, true);
        // Host still reports 1.0 but the captured start value is used.
        let frame = sweep_frame(&mut tl, &RestHost, e[1], 0.5, 0.75, false);
        assert!(approx_eq(last_scalar(&frame, Property::Opacity).unwrap_or(-1.0), 0.25));
    }

    #[test]
    fn test_sequential_tween_reads_previous_end_value() {
        let e = entities(2);
        let spec = SequenceSpec::new()
            .append(TweenSpec::rotate_to(e[0], 10.0, 0.5))
            .append(TweenSpec::rotate_to(e[0], 20.0, 0.5));
        let mut tl = Timeline::build(&spec);
        // A single large step crosses both tweens; the second starts from 10.
        let frame = sweep_frame(&mut tl, &RestHost, e[1], 0.0, 0.75, true);
        assert!(approx_eq(last_scalar(&frame, Property::Rotation).unwrap_or(-1.0), 15.0));
    }

    #[test]
    fn test_calls_fire_once_when_crossed() {
        let e = entities(1);
        let spec = SequenceSpec::new()
            .append_call(Action::Emit("start".into()))
            .append_interval(1.0)
            .append_call(Action::Emit("end".into()));
        let mut tl = Timeline::build(&spec);
        let f1 = sweep_frame(&mut tl, &RestHost, e[0], 0.0, 0.5, true);
        assert_eq!(emitted(&f1), vec!["start".to_string()]);
        let f2 = sweep_frame(&mut tl, &RestHost, e[0], 0.5, 0.9, false);
        assert!(emitted(&f2).is_empty());
        let f3 = sweep_frame(&mut tl, &RestHost, e[0], 0.9, 1.5, false);
        assert_eq!(emitted(&f3), vec!["end".to_string()]);
    }

    #[test]
    fn test_restart_loop_refires_calls_each_iteration() {
        let e = entities(1);
        let spec = SequenceSpec::new()
            .append_call(Action::Emit("tick".into()))
            .append_interval(1.0)
            .with_loops(Loops::Infinite, LoopMode::Restart);
        let mut tl = Timeline::build(&spec);
        let mut count = 0;
        let mut prev = None;
        for i in 1..=40 {
            let now = i as f32 * 0.1;
            let frame = sweep_frame(&mut tl, &RestHost, e[0], prev.unwrap_or(0.0), now, prev.is_none());
            count += emitted(&frame).len();
            prev = Some(now);
        }
        // Iterations start at 0, 1, 2, 3 and 4 (reached at exactly 4.0).
        assert!(count == 4 || count == 5, "count = {}", count);
    }

    #[test]
    fn test_yoyo_plays_backwards() {
        let e = entities(2);
        let spec = SequenceSpec::new()
            .append(TweenSpec::rotate_to(e[0], 10.0, 1.0))
            .with_loops(Loops::Finite(2), LoopMode::Yoyo);
        let mut tl = Timeline::build(&spec);
        sweep_frame(&mut tl, &RestHost, e[1], 0.0, 0.5, true);
        let frame = sweep_frame(&mut tl, &RestHost, e[1], 0.5, 1.25, false);
        assert!(approx_eq(last_scalar(&frame, Property::Rotation).unwrap_or(-1.0), 7.5));
        let frame = sweep_frame(&mut tl, &RestHost, e[1], 1.25, 2.0, false);
        assert!(approx_eq(last_scalar(&frame, Property::Rotation).unwrap_or(-1.0), 0.0));
    }

    #[test]
    fn test_tween_yoyo_loops_are_symmetric() {
        let e = entities(2);
        let spec = SequenceSpec::new().append(
            TweenSpec::rotate_to(e[0], 25.0, 0.8)
                .from(-25.0)
                .with_easing(Easing::SineInOut)
                .with_loops(Loops::Infinite, LoopMode::Yoyo),
        );
        let mut tl = Timeline::build(&spec);
        let f1 = sweep_frame(&mut tl, &RestHost, e[1], 0.0, 0.2, true);
        let up = last_scalar(&f1, Property::Rotation).unwrap_or(0.0);
        let f2 = sweep_frame(&mut tl, &RestHost, e[1], 0.2, 1.4, false);
        let down = last_scalar(&f2, Property::Rotation).unwrap_or(0.0);
        assert!(approx_eq(up, down));
    }

    #[test]
    fn test_delay_postpones_everything() {
        let e = entities(2);
        let spec = SequenceSpec::new()
            .append(TweenSpec::fade_to(e[0], 0.0, 0.4))
            .with_delay(1.2);
        let mut tl = Timeline::build(&spec);
        let frame = sweep_frame(&mut tl, &RestHost, e[1], 0.0, 1.0, true);
        assert!(frame.writes.is_empty());
        let frame = sweep_frame(&mut tl, &RestHost, e[1], 1.0, 1.4, false);
        assert!(approx_eq(last_scalar(&frame, Property::Opacity).unwrap_or(-1.0), 0.5));
        assert!(approx_eq(tl.total(), 1.6));
    }

    #[test]
    fn test_nested_restart_loop_rewinds() {
        let e = entities(2);
        // Tear drop: reset to start, fall, wait, repeat.
        let drop = SequenceSpec::new()
            .append_call(Action::set(e[0], Property::Position, Vec3::ZERO))
            .append(TweenSpec::move_to(e[0], Vec3::new(0.0, -1.0, 0.0), 1.0).from(Vec3::ZERO))
            .append_interval(0.5)
            .with_loops(Loops::Infinite, LoopMode::Restart);
        let spec = SequenceSpec::new().append_sequence(drop);
        let mut tl = Timeline::build(&spec);
        sweep_frame(&mut tl, &RestHost, e[1], 0.0, 1.2, true);
        let frame = sweep_frame(&mut tl, &RestHost, e[1], 1.2, 2.0, false);
        let pos = frame
            .writes
            .iter()
            .rev()
            .find(|w| w.property == Property::Position)
            .and_then(|w| w.value.as_vector())
            .unwrap_or(Vec3::ONE);
        assert!(approx_eq(pos.y, -0.5), "pos = {:?}", pos);
    }

    #[test]
    fn test_position_y_keeps_x() {
        let e = entities(2);
        let spec = SequenceSpec::new()
            .append(TweenSpec::move_to(e[0], Vec3::new(2.0, 0.0, 0.0), 0.0))
            .append(TweenSpec::move_y(e[0], 1.0, 1.0));
        let mut tl = Timeline::build(&spec);
        let frame = sweep_frame(&mut tl, &RestHost, e[1], 0.0, 0.5, true);
        let y = last_scalar(&frame, Property::PositionY).unwrap_or(-1.0);
        assert!(approx_eq(y, 0.5));
    }

    #[test]
    fn test_missing_capability_skips_only_that_tween() {
        let e = entities(3);
        let spec = SequenceSpec::new()
            .append(TweenSpec::fade_to(e[0], 1.0, 1.0))
            .join(TweenSpec::rotate_to(e[1], 10.0, 1.0));
        let mut tl = Timeline::build(&spec);
        let frame = sweep_frame(&mut tl, &NoOpacityHost, e[2], 0.0, 0.5, true);
        assert!(last_scalar(&frame, Property::Opacity).is_none());
        assert!(approx_eq(last_scalar(&frame, Property::Rotation).unwrap_or(-1.0), 5.0));
        assert_eq!(tl.node_state(NodeId(0)), Some(TweenState::Cancelled));
        assert_eq!(tl.node_state(NodeId(1)), Some(TweenState::Running));
    }

    #[test]
    fn test_cancelled_node_stops_writing() {
        let e = entities(2);
        let spec = SequenceSpec::new().append(TweenSpec::rotate_to(e[0], 10.0, 1.0));
        let mut tl = Timeline::build(&spec);
        sweep_frame(&mut tl, &RestHost, e[1], 0.0, 0.2, true);
        tl.cancel_node(NodeId(0));
        let frame = sweep_frame(&mut tl, &RestHost, e[1], 0.2, 0.4, false);
        assert!(frame.writes.is_empty());
    }

    #[test]
    fn test_zero_length_timeline_fires_on_first_sweep() {
        let e = entities(2);
        let spec = SequenceSpec::new()
            .append_call(Action::SetActive { target: e[0], active: true })
            .append(TweenSpec::fade_to(e[0], 0.3, 0.0));
        let mut tl = Timeline::build(&spec);
        let frame = sweep_frame(&mut tl, &RestHost, e[1], 0.0, 0.016, true);
        assert_eq!(frame.actions.len(), 1);
        assert!(approx_eq(last_scalar(&frame, Property::Opacity).unwrap_or(-1.0), 0.3));
    }
}
