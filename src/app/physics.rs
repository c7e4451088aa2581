use std::collections::HashMap;

use eframe::egui::{Pos2, Vec2, vec2};

use crate::ledger::ExpenseId;

use super::layout::NodeTarget;

const ALPHA_RESTART: f32 = 0.9;
const ALPHA_MIN: f32 = 0.001;
const ALPHA_DECAY: f32 = 0.004;
const DRAG_ALPHA_TARGET: f32 = 0.3;
const FOCUS_STRENGTH: f32 = 0.1;
const VELOCITY_DECAY: f32 = 0.3;
const COLLIDE_PADDING: f32 = 2.0;
const COLLIDE_STRENGTH: f32 = 0.7;
const COLLIDE_ITERATIONS: usize = 2;

pub struct SimNode {
    pub id: ExpenseId,
    pub pos: Pos2,
    pub vel: Vec2,
    pub focus: Pos2,
    pub radius: f32,
    pub pinned: Option<Pos2>,
}

/// Relaxation solver pulling each node toward its focus target while
/// pushing overlapping pairs apart. Activity is governed by an alpha value
/// that decays to zero unless a drag holds a floor under it.
pub struct Simulation {
    nodes: Vec<SimNode>,
    index_by_id: HashMap<ExpenseId, usize>,
    alpha: f32,
    alpha_target: f32,
    floor_holds: u32,
}

impl Simulation {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index_by_id: HashMap::new(),
            alpha: 0.0,
            alpha_target: 0.0,
            floor_holds: 0,
        }
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: ExpenseId) -> Option<&SimNode> {
        self.index_by_id.get(&id).map(|&index| &self.nodes[index])
    }

    pub fn position(&self, id: ExpenseId) -> Option<Pos2> {
        self.node(id).map(|node| node.pos)
    }

    /// Reconcile simulation nodes against the layout targets. Existing
    /// nodes keep their live position and velocity and only get new
    /// focus/radius values; fresh nodes seed at their focus; vanished
    /// nodes drop along with any pin they held. Re-wakes the solver.
    pub fn sync(&mut self, targets: &[NodeTarget]) {
        let mut prior: HashMap<ExpenseId, SimNode> = self
            .nodes
            .drain(..)
            .map(|node| (node.id, node))
            .collect();

        self.nodes = targets
            .iter()
            .map(|target| match prior.remove(&target.id) {
                Some(mut node) => {
                    node.focus = target.focus;
                    node.radius = target.radius;
                    node
                }
                None => SimNode {
                    id: target.id,
                    pos: target.focus,
                    vel: Vec2::ZERO,
                    focus: target.focus,
                    radius: target.radius,
                    pinned: None,
                },
            })
            .collect();

        self.index_by_id = self
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id, index))
            .collect();

        self.reheat();
    }

    pub fn reheat(&mut self) {
        self.alpha = ALPHA_RESTART;
    }

    pub fn pin(&mut self, id: ExpenseId, pos: Pos2) {
        if let Some(&index) = self.index_by_id.get(&id) {
            self.nodes[index].pinned = Some(pos);
            self.nodes[index].pos = pos;
            self.nodes[index].vel = Vec2::ZERO;
        }
    }

    pub fn release(&mut self, id: ExpenseId) {
        if let Some(&index) = self.index_by_id.get(&id) {
            self.nodes[index].pinned = None;
        }
    }

    /// Raise the alpha floor for an active drag. Floors stack, so
    /// overlapping drags keep the system awake until the last release.
    pub fn hold_floor(&mut self) {
        self.floor_holds += 1;
        self.alpha_target = DRAG_ALPHA_TARGET;
    }

    pub fn release_floor(&mut self) {
        self.floor_holds = self.floor_holds.saturating_sub(1);
        if self.floor_holds == 0 {
            self.alpha_target = 0.0;
        }
    }

    pub fn active(&self) -> bool {
        !self.nodes.is_empty() && (self.alpha >= ALPHA_MIN || self.alpha_target >= ALPHA_MIN)
    }

    /// Advance the solver by one frame. Runs whole fixed ticks, scaled to
    /// the frame delta so slow frames do not slow the settling motion.
    /// Returns whether anything is still in motion.
    pub fn step(&mut self, delta_seconds: f32) -> bool {
        if !self.active() {
            return false;
        }

        let ticks = ((delta_seconds * 60.0).round() as usize).clamp(1, 3);
        for _ in 0..ticks {
            self.tick();
        }
        self.active()
    }

    fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * ALPHA_DECAY;

        for node in &mut self.nodes {
            if node.pinned.is_some() {
                continue;
            }
            node.vel += (node.focus - node.pos) * (FOCUS_STRENGTH * self.alpha);
        }

        for _ in 0..COLLIDE_ITERATIONS {
            self.resolve_collisions();
        }

        for node in &mut self.nodes {
            match node.pinned {
                Some(pin) => {
                    node.pos = pin;
                    node.vel = Vec2::ZERO;
                }
                None => {
                    node.vel *= 1.0 - VELOCITY_DECAY;
                    node.pos += node.vel;
                }
            }
        }
    }

    /// Pairwise overlap resolution on projected positions, corrections
    /// split by radius-squared weight. Pinned nodes are immovable, so the
    /// free side absorbs the whole correction.
    fn resolve_collisions(&mut self) {
        let count = self.nodes.len();
        for i in 0..count {
            for j in (i + 1)..count {
                let (head, tail) = self.nodes.split_at_mut(j);
                let a = &mut head[i];
                let b = &mut tail[0];

                let projected_a = a.pinned.unwrap_or(a.pos + a.vel);
                let projected_b = b.pinned.unwrap_or(b.pos + b.vel);
                let r_a = a.radius + COLLIDE_PADDING;
                let r_b = b.radius + COLLIDE_PADDING;
                let min_distance = r_a + r_b;

                let mut delta = projected_a - projected_b;
                let mut distance_sq = delta.length_sq();
                if distance_sq >= min_distance * min_distance {
                    continue;
                }
                if distance_sq < 1e-8 {
                    // Coincident centers: separate along a stable direction.
                    let angle = ((i * 31 + j) as f32) * 0.618_034;
                    delta = vec2(angle.cos(), angle.sin()) * 1e-3;
                    distance_sq = delta.length_sq();
                }

                let distance = distance_sq.sqrt();
                let correction = delta / distance * (min_distance - distance) * COLLIDE_STRENGTH;

                match (a.pinned.is_some(), b.pinned.is_some()) {
                    (false, false) => {
                        let weight_a = r_b * r_b / (r_a * r_a + r_b * r_b);
                        a.vel += correction * weight_a;
                        b.vel -= correction * (1.0 - weight_a);
                    }
                    (true, false) => b.vel -= correction,
                    (false, true) => a.vel += correction,
                    (true, true) => {}
                }
            }
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    fn target(id: ExpenseId, x: f32, y: f32, radius: f32) -> NodeTarget {
        NodeTarget {
            id,
            focus: pos2(x, y),
            radius,
        }
    }

    fn settle(sim: &mut Simulation, ticks: usize) {
        for _ in 0..ticks {
            if !sim.step(1.0 / 60.0) {
                break;
            }
        }
    }

    #[test]
    fn lone_node_converges_to_its_focus() {
        let mut sim = Simulation::new();
        sim.sync(&[target(0, 400.0, 600.0, 10.0)]);
        // Knock it away from the target first.
        sim.pin(0, pos2(100.0, 100.0));
        sim.release(0);

        settle(&mut sim, 4000);

        let node = sim.node(0).unwrap();
        assert!((node.pos - pos2(400.0, 600.0)).length() < 1.0);
    }

    #[test]
    fn resting_nodes_do_not_overlap() {
        let mut sim = Simulation::new();
        // Four nodes fighting over the same focus point.
        sim.sync(&[
            target(0, 300.0, 300.0, 12.0),
            target(1, 300.0, 300.0, 12.0),
            target(2, 300.0, 300.0, 16.0),
            target(3, 300.0, 300.0, 16.0),
        ]);

        settle(&mut sim, 4000);

        let nodes = sim.nodes();
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let distance = (nodes[i].pos - nodes[j].pos).length();
                let min_distance =
                    nodes[i].radius + nodes[j].radius + 2.0 * COLLIDE_PADDING;
                assert!(
                    distance >= min_distance - 1.5,
                    "nodes {i} and {j} overlap: {distance} < {min_distance}"
                );
            }
        }
    }

    #[test]
    fn positions_stay_finite() {
        let mut sim = Simulation::new();
        sim.sync(&[
            target(0, 100.0, 100.0, 8.0),
            target(1, 100.0, 100.0, 8.0),
        ]);
        settle(&mut sim, 500);
        for node in sim.nodes() {
            assert!(node.pos.x.is_finite() && node.pos.y.is_finite());
            assert!(node.vel.x.is_finite() && node.vel.y.is_finite());
        }
    }

    #[test]
    fn pinned_node_holds_exactly_while_forces_run() {
        let mut sim = Simulation::new();
        sim.sync(&[
            target(0, 200.0, 200.0, 10.0),
            target(1, 200.0, 200.0, 10.0),
        ]);
        sim.pin(0, pos2(50.0, 50.0));
        sim.hold_floor();

        settle(&mut sim, 200);
        assert_eq!(sim.node(0).unwrap().pos, pos2(50.0, 50.0));

        sim.release(0);
        sim.release_floor();
        settle(&mut sim, 4000);
        let node = sim.node(0).unwrap();
        assert!((node.pos - pos2(200.0, 200.0)).length() < 60.0);
    }

    #[test]
    fn alpha_floor_keeps_the_system_awake_until_the_last_drag_ends() {
        let mut sim = Simulation::new();
        sim.sync(&[target(0, 0.0, 0.0, 8.0)]);
        sim.hold_floor();
        sim.hold_floor();

        settle(&mut sim, 8000);
        assert!(sim.active(), "floor held, must not sleep");

        sim.release_floor();
        assert!(sim.active(), "one drag still holds the floor");
        sim.release_floor();
        settle(&mut sim, 20000);
        assert!(!sim.active(), "floor released, alpha must decay out");
    }

    #[test]
    fn sleeping_simulation_does_no_work() {
        let mut sim = Simulation::new();
        sim.sync(&[target(0, 10.0, 10.0, 8.0)]);
        settle(&mut sim, 20000);
        assert!(!sim.active());

        let before = sim.node(0).unwrap().pos;
        assert!(!sim.step(1.0 / 60.0));
        assert_eq!(sim.node(0).unwrap().pos, before);
    }

    #[test]
    fn sync_to_empty_clears_nodes_and_pins() {
        let mut sim = Simulation::new();
        sim.sync(&[
            target(0, 0.0, 0.0, 8.0),
            target(1, 10.0, 0.0, 8.0),
            target(2, 20.0, 0.0, 8.0),
            target(3, 30.0, 0.0, 8.0),
            target(4, 40.0, 0.0, 8.0),
        ]);
        sim.pin(2, pos2(5.0, 5.0));

        sim.sync(&[]);
        assert!(sim.is_empty());
        assert!(sim.node(2).is_none());
        assert!(!sim.step(1.0 / 60.0));
    }

    #[test]
    fn sync_preserves_live_positions_and_replaces_targets() {
        let mut sim = Simulation::new();
        sim.sync(&[target(0, 100.0, 100.0, 8.0)]);
        settle(&mut sim, 50);
        let live = sim.node(0).unwrap().pos;

        sim.sync(&[target(0, 500.0, 500.0, 12.0)]);
        let node = sim.node(0).unwrap();
        assert_eq!(node.pos, live, "recompute must not jump the node");
        assert_eq!(node.focus, pos2(500.0, 500.0));
        assert_eq!(node.radius, 12.0);
    }
}
