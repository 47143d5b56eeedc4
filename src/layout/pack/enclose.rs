use crate::util::Lcg;

use super::super::Circle;

/// Smallest circle enclosing every circle in `circles`.
///
/// Incremental basis extension over a shuffled copy of the input; the shuffle
/// is driven by `random`, so equal inputs and seeds give equal results.
pub fn enclose(circles: &[Circle], random: &mut Lcg) -> Option<Circle> {
    let mut shuffled = circles.to_vec();
    shuffle(&mut shuffled, random);

    let mut basis: Vec<Circle> = Vec::new();
    let mut enclosing: Option<Circle> = None;
    let mut index = 0;

    while index < shuffled.len() {
        let point = shuffled[index];
        if enclosing.is_some_and(|circle| encloses_weak(circle, point)) {
            index += 1;
            continue;
        }

        let Some(next_basis) = extend_basis(&basis, point) else {
            break;
        };
        basis = next_basis;
        enclosing = Some(enclose_basis(&basis));
        index = 0;
    }

    enclosing
}

fn shuffle(circles: &mut [Circle], random: &mut Lcg) {
    let mut remaining = circles.len();
    while remaining > 0 {
        let pick = (random.next_f64() * remaining as f64) as usize;
        remaining -= 1;
        circles.swap(remaining, pick);
    }
}

fn extend_basis(basis: &[Circle], point: Circle) -> Option<Vec<Circle>> {
    if encloses_weak_all(point, basis) {
        return Some(vec![point]);
    }

    for &member in basis {
        if encloses_not(point, member) && encloses_weak_all(enclose_pair(member, point), basis) {
            return Some(vec![member, point]);
        }
    }

    for i in 0..basis.len().saturating_sub(1) {
        for j in (i + 1)..basis.len() {
            let (a, b) = (basis[i], basis[j]);
            if encloses_not(enclose_pair(a, b), point)
                && encloses_not(enclose_pair(a, point), b)
                && encloses_not(enclose_pair(b, point), a)
                && encloses_weak_all(enclose_triple(a, b, point), basis)
            {
                return Some(vec![a, b, point]);
            }
        }
    }

    None
}

fn encloses_not(a: Circle, b: Circle) -> bool {
    let dr = a.r - b.r;
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    dr < 0.0 || dr * dr < dx * dx + dy * dy
}

fn encloses_weak(a: Circle, b: Circle) -> bool {
    let dr = a.r - b.r + a.r.max(b.r).max(1.0) * 1e-9;
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    dr > 0.0 && dr * dr > dx * dx + dy * dy
}

fn encloses_weak_all(a: Circle, basis: &[Circle]) -> bool {
    basis.iter().all(|&member| encloses_weak(a, member))
}

fn enclose_basis(basis: &[Circle]) -> Circle {
    match basis {
        [a] => *a,
        [a, b] => enclose_pair(*a, *b),
        [a, b, c] => enclose_triple(*a, *b, *c),
        _ => Circle::default(),
    }
}

fn enclose_pair(a: Circle, b: Circle) -> Circle {
    let (x21, y21, r21) = (b.x - a.x, b.y - a.y, b.r - a.r);
    let distance = (x21 * x21 + y21 * y21).sqrt();
    Circle {
        x: (a.x + b.x + x21 / distance * r21) / 2.0,
        y: (a.y + b.y + y21 / distance * r21) / 2.0,
        r: (distance + a.r + b.r) / 2.0,
    }
}

fn enclose_triple(a: Circle, b: Circle, c: Circle) -> Circle {
    let (x1, y1, r1) = (a.x, a.y, a.r);
    let (x2, y2, r2) = (b.x, b.y, b.r);
    let (x3, y3, r3) = (c.x, c.y, c.r);

    let a2 = x1 - x2;
    let a3 = x1 - x3;
    let b2 = y1 - y2;
    let b3 = y1 - y3;
    let c2 = r2 - r1;
    let c3 = r3 - r1;
    let d1 = x1 * x1 + y1 * y1 - r1 * r1;
    let d2 = d1 - x2 * x2 - y2 * y2 + r2 * r2;
    let d3 = d1 - x3 * x3 - y3 * y3 + r3 * r3;
    let ab = a3 * b2 - a2 * b3;
    let xa = (b2 * d3 - b3 * d2) / (ab * 2.0) - x1;
    let xb = (b3 * c2 - b2 * c3) / ab;
    let ya = (a3 * d2 - a2 * d3) / (ab * 2.0) - y1;
    let yb = (a2 * c3 - a3 * c2) / ab;
    let qa = xb * xb + yb * yb - 1.0;
    let qb = 2.0 * (r1 + xa * xb + ya * yb);
    let qc = xa * xa + ya * ya - r1 * r1;
    let r = -(if qa.abs() > 1e-6 {
        (qb + (qb * qb - 4.0 * qa * qc).sqrt()) / (2.0 * qa)
    } else {
        qc / qb
    });

    Circle {
        x: x1 + xa + xb * r,
        y: y1 + ya + yb * r,
        r,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_encloses(outer: Circle, inner: &[Circle]) {
        for circle in inner {
            let distance = ((circle.x - outer.x).powi(2) + (circle.y - outer.y).powi(2)).sqrt();
            assert!(
                distance + circle.r <= outer.r + 1e-6,
                "{circle:?} escapes {outer:?}"
            );
        }
    }

    #[test]
    fn single_circle_encloses_itself() {
        let circle = Circle::new(3.0, 4.0, 2.0);
        assert_eq!(enclose(&[circle], &mut Lcg::default()), Some(circle));
    }

    #[test]
    fn two_touching_circles() {
        let circles = [Circle::new(-1.0, 0.0, 1.0), Circle::new(1.0, 0.0, 1.0)];
        let outer = enclose(&circles, &mut Lcg::default()).unwrap();
        assert!((outer.r - 2.0).abs() < 1e-9);
        assert!(outer.x.abs() < 1e-9 && outer.y.abs() < 1e-9);
    }

    #[test]
    fn encloses_scattered_circles_tightly() {
        let circles = [
            Circle::new(0.0, 0.0, 1.0),
            Circle::new(5.0, 1.0, 2.0),
            Circle::new(-3.0, 4.0, 1.5),
            Circle::new(1.0, -4.0, 0.5),
            Circle::new(1.0, 1.0, 0.2),
        ];
        let outer = enclose(&circles, &mut Lcg::default()).unwrap();
        assert_encloses(outer, &circles);
        assert!(outer.r < 8.0);
    }

    #[test]
    fn empty_input_has_no_enclosure() {
        assert_eq!(enclose(&[], &mut Lcg::default()), None);
    }
}
