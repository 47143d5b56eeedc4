use crate::util::Lcg;

use super::super::Circle;
use super::enclose::enclose;

/// Packs `circles` (radii set, positions overwritten) tangent to each other
/// around the origin and returns the enclosing radius.
///
/// Front-chain packing: each new circle is placed tangent to the chain pair
/// `(a, b)`; if it hits a chain member the chain is cut back to that member and
/// the placement retried.
pub fn pack_siblings(circles: &mut [Circle], random: &mut Lcg) -> f64 {
    let count = circles.len();
    if count == 0 {
        return 0.0;
    }

    circles[0].x = 0.0;
    circles[0].y = 0.0;
    if count == 1 {
        return circles[0].r;
    }

    circles[0].x = -circles[1].r;
    circles[1].x = circles[0].r;
    circles[1].y = 0.0;
    if count == 2 {
        return circles[0].r + circles[1].r;
    }

    circles[2] = place(circles[1], circles[0], circles[2]);

    // Doubly linked front chain over circle indices.
    let mut next = vec![usize::MAX; count];
    let mut previous = vec![usize::MAX; count];
    let (mut a, mut b) = (0usize, 1usize);
    next[0] = 1;
    previous[1] = 0;
    next[1] = 2;
    previous[2] = 1;
    next[2] = 0;
    previous[0] = 2;

    let mut index = 3;
    'pack: while index < count {
        circles[index] = place(circles[a], circles[b], circles[index]);
        let candidate = circles[index];

        let mut j = next[b];
        let mut k = previous[a];
        let mut sj = circles[b].r;
        let mut sk = circles[a].r;
        loop {
            if sj <= sk {
                if intersects(circles[j], candidate) {
                    b = j;
                    next[a] = b;
                    previous[b] = a;
                    continue 'pack;
                }
                sj += circles[j].r;
                j = next[j];
            } else {
                if intersects(circles[k], candidate) {
                    a = k;
                    next[a] = b;
                    previous[b] = a;
                    continue 'pack;
                }
                sk += circles[k].r;
                k = previous[k];
            }

            if j == next[k] {
                break;
            }
        }

        previous[index] = a;
        next[index] = b;
        next[a] = index;
        previous[b] = index;
        b = index;

        let mut best = a;
        let mut best_score = score(circles, a, next[a]);
        let mut cursor = next[b];
        while cursor != b {
            let cursor_score = score(circles, cursor, next[cursor]);
            if cursor_score < best_score {
                best = cursor;
                best_score = cursor_score;
            }
            cursor = next[cursor];
        }
        a = best;
        b = next[a];
        index += 1;
    }

    let mut chain = vec![circles[b]];
    let mut cursor = next[b];
    while cursor != b {
        chain.push(circles[cursor]);
        cursor = next[cursor];
    }

    let Some(enclosing) = enclose(&chain, random) else {
        return 0.0;
    };
    for circle in circles.iter_mut() {
        circle.x -= enclosing.x;
        circle.y -= enclosing.y;
    }
    enclosing.r
}

/// Positions `c` tangent to both `b` and `a`.
fn place(b: Circle, a: Circle, mut c: Circle) -> Circle {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let d2 = dx * dx + dy * dy;

    if d2 > 0.0 {
        let a2 = (a.r + c.r).powi(2);
        let b2 = (b.r + c.r).powi(2);
        if a2 > b2 {
            let x = (d2 + b2 - a2) / (2.0 * d2);
            let y = (b2 / d2 - x * x).max(0.0).sqrt();
            c.x = b.x - x * dx - y * dy;
            c.y = b.y - x * dy + y * dx;
        } else {
            let x = (d2 + a2 - b2) / (2.0 * d2);
            let y = (a2 / d2 - x * x).max(0.0).sqrt();
            c.x = a.x + x * dx - y * dy;
            c.y = a.y + x * dy + y * dx;
        }
    } else {
        c.x = a.x + c.r;
        c.y = a.y;
    }
    c
}

fn intersects(a: Circle, b: Circle) -> bool {
    let dr = a.r + b.r - 1e-6;
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    dr > 0.0 && dr * dr > dx * dx + dy * dy
}

/// Squared distance from the origin to the weighted midpoint of a chain pair.
fn score(circles: &[Circle], a: usize, b: usize) -> f64 {
    let (a, b) = (circles[a], circles[b]);
    let ab = a.r + b.r;
    let dx = (a.x * b.r + b.x * a.r) / ab;
    let dy = (a.y * b.r + b.y * a.r) / ab;
    dx * dx + dy * dy
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_no_overlap(circles: &[Circle]) {
        for (i, a) in circles.iter().enumerate() {
            for b in &circles[i + 1..] {
                let distance = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
                assert!(distance + 1e-6 >= a.r + b.r, "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn two_circles_touch() {
        let mut circles = [Circle::new(0.0, 0.0, 1.0), Circle::new(0.0, 0.0, 2.0)];
        let radius = pack_siblings(&mut circles, &mut Lcg::default());
        assert!((radius - 3.0).abs() < 1e-9);
        assert_no_overlap(&circles);
    }

    #[test]
    fn many_circles_do_not_overlap_and_fit() {
        let mut circles = (1..=40)
            .map(|index| Circle::new(0.0, 0.0, 1.0 + (index % 7) as f64))
            .collect::<Vec<_>>();
        let radius = pack_siblings(&mut circles, &mut Lcg::default());

        assert_no_overlap(&circles);
        for circle in &circles {
            let distance = (circle.x.powi(2) + circle.y.powi(2)).sqrt();
            assert!(distance + circle.r <= radius + 1e-6);
        }
    }

    #[test]
    fn equal_triple_is_symmetric() {
        let mut circles = [Circle::new(0.0, 0.0, 1.0); 3];
        let radius = pack_siblings(&mut circles, &mut Lcg::default());
        let expected = 1.0 + 2.0 / 3f64.sqrt();
        assert!((radius - expected).abs() < 1e-9);
    }
}
