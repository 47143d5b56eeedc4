use eframe::egui::{Vec2, vec2};

use crate::util::Lcg;

use super::graph::{GraphEdge, GraphNode};
use super::quadtree::Quadtree;

/// Squared distances below this are clamped before dividing.
const MIN_DISTANCE_SQ: f32 = 1.0;

/// Tiny random offset that separates coincident bodies.
fn jiggle(random: &mut Lcg) -> f32 {
    ((random.next_f64() - 0.5) * 1e-6) as f32
}

#[derive(Clone, Copy, Debug)]
pub(super) struct ManyBody {
    pub(super) strength: f32,
    pub(super) theta: f32,
}

impl ManyBody {
    /// Velocity change on the body at `index` from every other body.
    ///
    /// Walks `tree` from the root. A cell that does not hold the body and
    /// looks small from it (`size / distance < theta`) acts as one body at
    /// its centre of mass; leaves are summed exactly.
    pub(super) fn charge_on(
        self,
        tree: &Quadtree,
        index: usize,
        positions: &[Vec2],
        alpha: f32,
        random: &mut Lcg,
    ) -> Vec2 {
        let point = positions[index];
        let theta_sq = self.theta * self.theta;
        let mut change = Vec2::ZERO;
        let mut pending = vec![tree.root()];

        while let Some(id) = pending.pop() {
            let cell = tree.cell(id);
            if cell.mass <= 0.0 {
                continue;
            }

            if cell.is_leaf() {
                for &other in cell.bodies.iter().filter(|other| **other != index) {
                    change += self.pull(positions[other] - point, 1.0, alpha, random);
                }
                continue;
            }

            let delta = cell.center_of_mass - point;
            if !cell.contains(point) && cell.size * cell.size < theta_sq * delta.length_sq() {
                change += self.pull(delta, cell.mass, alpha, random);
            } else {
                pending.extend(cell.children.iter().flatten());
            }
        }
        change
    }

    fn pull(self, delta: Vec2, mass: f32, alpha: f32, random: &mut Lcg) -> Vec2 {
        let delta = separated(delta, random);
        let distance_sq = delta.length_sq().max(MIN_DISTANCE_SQ);
        delta * (self.strength * mass * alpha / distance_sq)
    }
}

fn separated(mut delta: Vec2, random: &mut Lcg) -> Vec2 {
    if delta.x == 0.0 {
        delta.x = jiggle(random);
    }
    if delta.y == 0.0 {
        delta.y = jiggle(random);
    }
    delta
}

/// Per-link spring constants, fixed when the simulation is built.
#[derive(Clone, Debug)]
pub(super) struct LinkSprings {
    pub(super) distance: f32,
    strengths: Vec<f32>,
    /// Share of the correction applied to the target end.
    biases: Vec<f32>,
}

impl LinkSprings {
    pub(super) fn new(node_count: usize, edges: &[GraphEdge], distance: f32) -> Self {
        let mut degree = vec![0usize; node_count];
        for edge in edges {
            degree[edge.source] += 1;
            degree[edge.target] += 1;
        }

        let strengths = edges
            .iter()
            .map(|edge| 1.0 / degree[edge.source].min(degree[edge.target]).max(1) as f32)
            .collect();
        let biases = edges
            .iter()
            .map(|edge| {
                let (source, target) = (degree[edge.source] as f32, degree[edge.target] as f32);
                source / (source + target)
            })
            .collect();

        Self {
            distance,
            strengths,
            biases,
        }
    }

    /// Nudges both ends of every link toward the rest distance, using the
    /// positions each end is about to reach.
    pub(super) fn apply(&self, nodes: &mut [GraphNode], edges: &[GraphEdge], alpha: f32, random: &mut Lcg) {
        for (index, edge) in edges.iter().enumerate() {
            let (source, target) = (&nodes[edge.source], &nodes[edge.target]);
            let delta = separated(
                (target.position + target.velocity) - (source.position + source.velocity),
                random,
            );

            let length = delta.length();
            let pull = (length - self.distance) / length * alpha * self.strengths[index];
            let correction = delta * pull;
            let bias = self.biases[index];

            nodes[edge.target].velocity -= correction * bias;
            nodes[edge.source].velocity += correction * (1.0 - bias);
        }
    }
}

/// Shifts every body so their centroid sits on `center`.
pub(super) fn apply_centering(nodes: &mut [GraphNode], center: Vec2) {
    if nodes.is_empty() {
        return;
    }
    let mut sum = Vec2::ZERO;
    for node in nodes.iter() {
        sum += node.position;
    }
    let shift = sum / nodes.len() as f32 - center;
    for node in nodes.iter_mut() {
        node.position -= shift;
    }
}

/// Phyllotaxis spiral offset for the `index`-th body.
pub(super) fn phyllotaxis(index: usize) -> Vec2 {
    let initial_radius = 10.0_f32;
    let initial_angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
    let radius = initial_radius * (0.5 + index as f32).sqrt();
    let angle = index as f32 * initial_angle;
    vec2(radius * angle.cos(), radius * angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(x: f32, y: f32) -> GraphNode {
        GraphNode {
            position: vec2(x, y),
            ..GraphNode::default()
        }
    }

    #[test]
    fn charge_pushes_bodies_apart() {
        let positions = vec![vec2(0.0, 0.0), vec2(10.0, 0.0)];
        let tree = Quadtree::build(&positions).unwrap();
        let params = ManyBody {
            strength: -200.0,
            theta: 0.9,
        };
        let mut random = Lcg::default();

        let velocity = params.charge_on(&tree, 0, &positions, 1.0, &mut random);
        assert!((velocity.x - -20.0).abs() < 1e-4);
        assert!(velocity.y.abs() < 1e-6);
    }

    #[test]
    fn far_cells_are_approximated_close_to_exact() {
        let mut positions = (0..30)
            .map(|index| vec2(500.0 + (index % 6) as f32, 500.0 + (index / 6) as f32))
            .collect::<Vec<_>>();
        positions.push(vec2(0.0, 0.0));
        let probe = positions.len() - 1;
        let tree = Quadtree::build(&positions).unwrap();
        let mut random = Lcg::default();

        let params = ManyBody {
            strength: -1.0,
            theta: 0.9,
        };
        let approximate = params.charge_on(&tree, probe, &positions, 1.0, &mut random);

        let exact = positions[..probe]
            .iter()
            .fold(Vec2::ZERO, |sum, other| sum - *other / other.length_sq());
        assert!((approximate - exact).length() < exact.length() * 0.01);
    }

    #[test]
    fn link_springs_pull_toward_rest_length() {
        let mut nodes = vec![node(0.0, 0.0), node(300.0, 0.0)];
        let edges = vec![GraphEdge { source: 0, target: 1 }];
        let springs = LinkSprings::new(2, &edges, 100.0);
        springs.apply(&mut nodes, &edges, 1.0, &mut Lcg::default());

        assert!((nodes[0].velocity.x - 100.0).abs() < 1e-3);
        assert!((nodes[1].velocity.x - -100.0).abs() < 1e-3);
    }

    #[test]
    fn centering_moves_the_centroid() {
        let mut nodes = vec![node(0.0, 0.0), node(10.0, 20.0)];
        apply_centering(&mut nodes, vec2(400.0, 300.0));
        let centroid = (nodes[0].position + nodes[1].position) / 2.0;
        assert_eq!(centroid, vec2(400.0, 300.0));
        assert_eq!(nodes[1].position - nodes[0].position, vec2(10.0, 20.0));
    }

    #[test]
    fn phyllotaxis_starts_near_the_origin() {
        assert!((phyllotaxis(0).length() - 10.0 * 0.5_f32.sqrt()).abs() < 1e-5);
        assert!(phyllotaxis(50).length() > phyllotaxis(10).length());
    }
}
