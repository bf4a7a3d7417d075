//! Growth engine: one 60° sector of an ice crystal, grown as a tree of
//! line segments under humidity and temperature.
//!
//! Nodes live in an arena owned by [`Snowflake`] and are addressed by
//! [`NodeId`]. Parent links are plain optional handles used for ancestor
//! walks only. Purging a node drops it from the active set and clears the
//! parent handle of its children; nothing is ever freed until the whole
//! crystal is dropped.

use crate::config::{FlakeConfig, Rgb};
use crate::geometry::{interp, Point};
use serde::Serialize;
use std::f64::consts::{PI, TAU};
use tracing::{debug, trace};

/// Length gained per unit of time at a growth factor of 1.0
const ELONGATION_RATE: f64 = 20.0;
/// Budget consumed per unit of time spent elongating
const GROWTH_COST: f64 = 1.0;

const BUILDUP_RATE: f64 = 2.0;
const BUILDUP_THRESHOLD: f64 = 4.0;
const BRANCH_COST: f64 = 0.2;
/// Minimum simulated time between two branch events on the same node
const MIN_BRANCH_INTERVAL: f64 = 1.0;
/// Child cap at depth 0; one less per level
const ROOT_CHILD_CAP: u32 = 8;
const BRANCH_MAX_TEMPERATURE: f64 = -10.0;
const BRANCH_MAX_FACTOR: f64 = 0.35;

const THICKEN_RATE: f64 = 0.4;
const THICKEN_COST: f64 = 0.1;
const THICKEN_MIN_FACTOR: f64 = 0.3;
const THICKEN_MAX_HUMIDITY: f64 = 50.0;

/// Stable handle of a node inside its crystal's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One grown line segment
#[derive(Debug, Clone, PartialEq)]
pub struct LineNode {
    angle: f64,
    parent: Option<NodeId>,
    depth: u32,
    start: Point,
    length: f64,
    thickness: f64,
    buildup: f64,
    growth: f64,
    children: Vec<NodeId>,
    last_branch: f64,
}

impl LineNode {
    fn new(angle: f64, parent: Option<NodeId>, depth: u32, start: Point, config: &FlakeConfig, now: f64) -> Self {
        Self {
            angle,
            parent,
            depth,
            start,
            length: 0.0,
            thickness: config.thickness,
            buildup: 0.0,
            growth: config.growth,
            children: Vec::new(),
            last_branch: now,
        }
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// `None` for the root and for nodes whose parent has been purged
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Where the parent ended when this node branched off
    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        Point {
            x: self.length * self.angle.cos() + self.start.x,
            y: -self.length * self.angle.sin() + self.start.y,
        }
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    pub fn buildup(&self) -> f64 {
        self.buildup
    }

    /// Remaining growth budget
    pub fn growth(&self) -> f64 {
        self.growth
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn last_branch(&self) -> f64 {
        self.last_branch
    }
}

/// Combined growth factor, nominally in `[0, 1]`.
///
/// Humidity `[0, 100]` contributes up to 0.7 and temperature `[-5, -20]` up
/// to 0.3, the colder the more.
pub fn growth_factor(humidity: f64, temperature: f64) -> f64 {
    interp(humidity, 0.0, 100.0, 0.0, 0.7) + interp(temperature, -5.0, -20.0, 0.0, 0.3)
}

/// Angle between a parent and a new child: 30° at -10 widening to 60° at -20
pub fn branch_angle(temperature: f64) -> f64 {
    interp(temperature, -10.0, -20.0, PI / 6.0, PI / 3.0)
}

/// A growing crystal sector
#[derive(Debug, Clone)]
pub struct Snowflake {
    config: FlakeConfig,
    center: Point,
    nodes: Vec<LineNode>,
    active: Vec<NodeId>,
    elapsed: f64,
    branch_count: u32,
}

impl Snowflake {
    /// Create a crystal with a single root node at `center` pointing up.
    pub fn new(config: FlakeConfig, center: Point) -> Self {
        let root = LineNode::new(PI / 2.0, None, 0, center, &config, 0.0);
        Self {
            config,
            center,
            nodes: vec![root],
            active: vec![NodeId(0)],
            elapsed: 0.0,
            branch_count: 0,
        }
    }

    pub fn config(&self) -> &FlakeConfig {
        &self.config
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn branch_count(&self) -> u32 {
        self.branch_count
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &LineNode {
        &self.nodes[id.0]
    }

    /// Every node ever created, purged ones included
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &LineNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes still being advanced each tick, in creation order
    pub fn active(&self) -> &[NodeId] {
        &self.active
    }

    pub fn is_active(&self, id: NodeId) -> bool {
        self.active.contains(&id)
    }

    /// Advance every active node by `dt`.
    ///
    /// Nodes born during this tick are appended to the active set and are
    /// advanced in the same pass. Purging a node leaves the one that slides
    /// into its slot untouched until the next tick.
    pub fn tick(&mut self, humidity: f64, temperature: f64, dt: f64) {
        self.elapsed += dt;

        let mut i = 0;
        while i < self.active.len() {
            let id = self.active[i];
            let keep = if self.config.branch_crossing || self.inside_sector(id) {
                self.advance(id, humidity, temperature, dt)
            } else {
                false
            };

            if !keep {
                // The next node slides into slot `i` and waits a tick
                self.purge(id);
            }
            i += 1;
        }
    }

    /// Whether the node's end point lies in the simulated half-sector,
    /// measured in local coordinates (center at origin, root pointing up).
    pub fn inside_sector(&self, id: NodeId) -> bool {
        let end = self.nodes[id.0].end();
        let x = end.x - self.center.x;
        let y = end.y - self.center.y;
        -y >= (x * (PI / 3.0).tan()).abs()
    }

    /// Remove a node from the active set and orphan its children.
    ///
    /// The children keep their place in the active set and their geometry but lose their
    /// ancestor chain, so they render without mirror copies from now on.
    pub fn purge(&mut self, id: NodeId) {
        self.active.retain(|&a| a != id);
        let children = self.nodes[id.0].children.clone();
        for child in &children {
            self.nodes[child.0].parent = None;
        }
        debug!(node = id.0, orphaned = children.len(), "purged node");
    }

    /// Returns false when the node should be purged.
    fn advance(&mut self, id: NodeId, humidity: f64, temperature: f64, dt: f64) -> bool {
        let node = &self.nodes[id.0];
        if node.growth <= 0.0 {
            return node.children.is_empty();
        }

        // Colder and busier crystals only grow at their deep front
        let frontier = interp(temperature, -5.0, -20.0, -1.0, 3.0 * self.branch_count as f64 / 4.0);
        if (node.depth as f64) < frontier {
            return true;
        }

        let factor = growth_factor(humidity, temperature);
        let can_branch = self.can_branch(id, temperature);

        let node = &mut self.nodes[id.0];
        node.length += ELONGATION_RATE * factor * dt;
        node.growth -= GROWTH_COST * dt;

        if factor < BRANCH_MAX_FACTOR && can_branch {
            node.buildup += BUILDUP_RATE * dt;
            if node.buildup >= BUILDUP_THRESHOLD {
                self.branch(id, branch_angle(temperature));
                let node = &mut self.nodes[id.0];
                node.buildup = 0.0;
                node.growth -= BRANCH_COST * dt;
            }
        } else if factor > THICKEN_MIN_FACTOR
            && humidity > -4.0 * temperature
            && humidity < THICKEN_MAX_HUMIDITY
        {
            node.thickness += THICKEN_RATE * dt;
            node.growth -= THICKEN_COST * dt;
        }

        true
    }

    fn can_branch(&self, id: NodeId, temperature: f64) -> bool {
        let node = &self.nodes[id.0];
        let rested = self.elapsed - node.last_branch > MIN_BRANCH_INTERVAL;
        let room = (node.children.len() as i64) < ROOT_CHILD_CAP as i64 - node.depth as i64;
        let budget = self.branch_count < self.config.max_branching;
        let cold = temperature <= BRANCH_MAX_TEMPERATURE;
        rested && room && budget && cold
    }

    /// Spawn one child `angle` radians clockwise of the parent.
    fn branch(&mut self, parent: NodeId, angle: f64) -> NodeId {
        self.branch_count += 1;
        let now = self.elapsed;
        let p = &mut self.nodes[parent.0];
        p.last_branch = now;
        let child_angle = (p.angle - angle).rem_euclid(TAU);
        let child = LineNode::new(child_angle, Some(parent), p.depth + 1, p.end(), &self.config, now);

        let id = NodeId(self.nodes.len());
        self.nodes.push(child);
        self.nodes[parent.0].children.push(id);
        self.active.push(id);
        trace!(parent = parent.0, child = id.0, angle = child_angle, branches = self.branch_count, "branch");
        id
    }

    /// Age color: young while the budget is full, fading to old as it runs out.
    pub fn color(&self, id: NodeId) -> Rgb {
        let growth = self.nodes[id.0].growth;
        let (young, old) = (self.config.color_young, self.config.color_old);
        if self.config.growth <= 0.0 {
            return old;
        }
        let channel = |o: u8, y: u8| {
            let v = interp(growth, 0.0, self.config.growth, o as f64, y as f64) as i64;
            v.clamp(0, 255) as u8
        };
        (channel(old.0, young.0), channel(old.1, young.1), channel(old.2, young.2))
    }

    pub fn stats(&self) -> FlakeStats {
        FlakeStats {
            elapsed: self.elapsed,
            branch_count: self.branch_count,
            active_nodes: self.active.len(),
            total_nodes: self.nodes.len(),
            nodes: self
                .active
                .iter()
                .map(|&id| {
                    let n = &self.nodes[id.0];
                    NodeStats {
                        id: id.0,
                        parent: n.parent.map(NodeId::index),
                        depth: n.depth,
                        angle: n.angle,
                        length: n.length,
                        thickness: n.thickness,
                        growth: n.growth,
                    }
                })
                .collect(),
        }
    }
}

/// Snapshot of a crystal for reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlakeStats {
    pub elapsed: f64,
    pub branch_count: u32,
    pub active_nodes: usize,
    pub total_nodes: usize,
    pub nodes: Vec<NodeStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeStats {
    pub id: usize,
    pub parent: Option<usize>,
    pub depth: u32,
    pub angle: f64,
    pub length: f64,
    pub thickness: f64,
    pub growth: f64,
}
