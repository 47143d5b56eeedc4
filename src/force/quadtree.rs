use eframe::egui::{Vec2, vec2};

/// Splits below this depth stop; points that still share a quadrant are
/// treated as coincident.
const MAX_DEPTH: usize = 32;

pub(super) type CellId = usize;

/// Square cell `[x0, x0 + size) × [y0, y0 + size)`.
#[derive(Clone, Debug)]
pub(super) struct Cell {
    pub(super) x0: f32,
    pub(super) y0: f32,
    pub(super) size: f32,
    pub(super) children: [Option<CellId>; 4],
    /// Bodies of a leaf. More than one only when they coincide.
    pub(super) bodies: Vec<usize>,
    pub(super) center_of_mass: Vec2,
    pub(super) mass: f32,
}

impl Cell {
    fn new(x0: f32, y0: f32, size: f32, bodies: Vec<usize>) -> Self {
        Self {
            x0,
            y0,
            size,
            children: [None; 4],
            bodies,
            center_of_mass: Vec2::ZERO,
            mass: 0.0,
        }
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub(super) fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x0
            && point.x < self.x0 + self.size
            && point.y >= self.y0
            && point.y < self.y0 + self.size
    }

    fn midpoint(&self) -> Vec2 {
        vec2(self.x0 + self.size / 2.0, self.y0 + self.size / 2.0)
    }

    /// 0 top-left, 1 top-right, 2 bottom-left, 3 bottom-right.
    fn quadrant_for(&self, point: Vec2) -> usize {
        let mid = self.midpoint();
        usize::from(point.x >= mid.x) | (usize::from(point.y >= mid.y) << 1)
    }

    fn child_cell(&self, quadrant: usize, bodies: Vec<usize>) -> Self {
        let half = self.size / 2.0;
        let x0 = if quadrant & 1 == 1 { self.x0 + half } else { self.x0 };
        let y0 = if quadrant & 2 == 2 { self.y0 + half } else { self.y0 };
        Self::new(x0, y0, half, bodies)
    }
}

/// Point quadtree over body positions, stored as an arena. Parents always
/// precede their children, so `cells[0]` is the root.
#[derive(Clone, Debug)]
pub(super) struct Quadtree {
    cells: Vec<Cell>,
}

impl Quadtree {
    /// Inserts every finite position one at a time, then aggregates centres
    /// of mass bottom-up. `None` when there is nothing to insert.
    pub(super) fn build(positions: &[Vec2]) -> Option<Self> {
        let finite = (0..positions.len())
            .filter(|index| positions[*index].x.is_finite() && positions[*index].y.is_finite())
            .collect::<Vec<_>>();
        let (&first, rest) = finite.split_first()?;

        let (x0, y0, size) = covering_square(finite.iter().map(|index| positions[*index]));
        let mut tree = Self {
            cells: vec![Cell::new(x0, y0, size, vec![first])],
        };
        for &index in rest {
            tree.insert(index, positions);
        }
        tree.aggregate(positions);
        Some(tree)
    }

    pub(super) fn root(&self) -> CellId {
        0
    }

    pub(super) fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id]
    }

    fn push(&mut self, cell: Cell) -> CellId {
        self.cells.push(cell);
        self.cells.len() - 1
    }

    fn insert(&mut self, index: usize, positions: &[Vec2]) {
        let point = positions[index];
        let mut current = self.root();
        let mut depth = 0;

        loop {
            if self.cells[current].is_leaf() {
                let resident = self.cells[current].bodies[0];
                if positions[resident] == point || depth >= MAX_DEPTH {
                    self.cells[current].bodies.push(index);
                    return;
                }
                // Push the resident bodies one level down and retry here.
                let bodies = std::mem::take(&mut self.cells[current].bodies);
                let quadrant = self.cells[current].quadrant_for(positions[resident]);
                let child = self.cells[current].child_cell(quadrant, bodies);
                let child = self.push(child);
                self.cells[current].children[quadrant] = Some(child);
            }

            let quadrant = self.cells[current].quadrant_for(point);
            match self.cells[current].children[quadrant] {
                Some(child) => {
                    current = child;
                    depth += 1;
                }
                None => {
                    let child = self.cells[current].child_cell(quadrant, vec![index]);
                    let child = self.push(child);
                    self.cells[current].children[quadrant] = Some(child);
                    return;
                }
            }
        }
    }

    fn aggregate(&mut self, positions: &[Vec2]) {
        for id in (0..self.cells.len()).rev() {
            let (sum, mass) = if self.cells[id].is_leaf() {
                let bodies = &self.cells[id].bodies;
                let sum = bodies.iter().fold(Vec2::ZERO, |sum, body| sum + positions[*body]);
                (sum, bodies.len() as f32)
            } else {
                self.cells[id]
                    .children
                    .iter()
                    .flatten()
                    .map(|child| &self.cells[*child])
                    .fold((Vec2::ZERO, 0.0), |(sum, mass), child| {
                        (sum + child.center_of_mass * child.mass, mass + child.mass)
                    })
            };
            let cell = &mut self.cells[id];
            cell.mass = mass;
            if mass > 0.0 {
                cell.center_of_mass = sum / mass;
            }
        }
    }
}

/// Smallest power-of-two square anchored at the floored minimum that covers
/// every point.
fn covering_square(points: impl Iterator<Item = Vec2>) -> (f32, f32, f32) {
    let (min, max) = points.fold(
        (vec2(f32::INFINITY, f32::INFINITY), vec2(f32::NEG_INFINITY, f32::NEG_INFINITY)),
        |(min, max), point| (min.min(point), max.max(point)),
    );
    let (x0, y0) = (min.x.floor(), min.y.floor());
    let span = (max.x - x0).max(max.y - y0);
    let mut size = 1.0_f32;
    while size <= span {
        size *= 2.0;
    }
    (x0, y0, size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(count: usize) -> Vec<Vec2> {
        (0..count)
            .map(|index| vec2((index % 10) as f32 * 7.0, (index / 10) as f32 * 7.0))
            .collect()
    }

    fn collect_bodies(tree: &Quadtree, id: CellId, out: &mut Vec<usize>) {
        let cell = tree.cell(id);
        out.extend(&cell.bodies);
        for child in cell.children.iter().flatten() {
            collect_bodies(tree, *child, out);
        }
    }

    #[test]
    fn each_body_sits_in_one_leaf_inside_its_cell() {
        let positions = grid(100);
        let tree = Quadtree::build(&positions).unwrap();
        let root = tree.cell(tree.root());
        assert_eq!(root.mass, 100.0);
        assert_eq!(root.size, 64.0);

        let mut bodies = Vec::new();
        collect_bodies(&tree, tree.root(), &mut bodies);
        bodies.sort_unstable();
        assert_eq!(bodies, (0..100).collect::<Vec<_>>());

        for cell in &tree.cells {
            assert!(cell.bodies.iter().all(|body| cell.contains(positions[*body])));
            let first = cell.bodies.first().map(|body| positions[*body]);
            assert!(cell.bodies.iter().all(|body| Some(positions[*body]) == first));
        }
    }

    #[test]
    fn centre_of_mass_is_the_mean() {
        let positions = vec![vec2(0.0, 0.0), vec2(10.0, 0.0), vec2(5.0, 15.0)];
        let tree = Quadtree::build(&positions).unwrap();
        let root = tree.cell(tree.root());
        assert!((root.center_of_mass - vec2(5.0, 5.0)).length() < 1e-5);
        assert!(root.contains(vec2(5.0, 15.0)));
    }

    #[test]
    fn coincident_points_share_a_leaf() {
        let positions = vec![vec2(3.0, 3.0); 40];
        let tree = Quadtree::build(&positions).unwrap();
        let root = tree.cell(tree.root());
        assert!(root.is_leaf());
        assert_eq!(root.bodies.len(), 40);
    }

    #[test]
    fn empty_or_non_finite_input_has_no_tree() {
        assert!(Quadtree::build(&[]).is_none());
        assert!(Quadtree::build(&[vec2(f32::NAN, 0.0)]).is_none());
    }
}
