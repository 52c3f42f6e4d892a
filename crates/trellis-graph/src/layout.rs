//! Force-directed layout for the rendered graph.
//!
//! A Fruchterman-Reingold spring layout: every pair of nodes repels,
//! connected nodes attract, and the step size cools linearly over the
//! iterations. Positions start on a circle so the result is the same
//! for the same graph on every run.

use crate::graph::CallGraph;

/// Optimal distance between nodes.
pub const SPRING_K: f64 = 1.5;

/// Number of cooling iterations.
pub const SPRING_ITERATIONS: usize = 100;

/// Smallest distance used in force computations.
const MIN_DISTANCE: f64 = 0.01;

/// A 2D position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Computes a spring layout for `graph`.
///
/// The returned positions are indexed like `graph.nodes()` and
/// rescaled so that the largest coordinate magnitude is 1, centered on
/// the origin.
///
/// # Arguments
///
/// * `graph` - The graph to lay out
/// * `k` - Optimal node distance (1.5 spreads nodes well apart)
/// * `iterations` - Number of cooling steps
pub fn spring_layout(graph: &CallGraph, k: f64, iterations: usize) -> Vec<Point> {
    let n = graph.node_count();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![Point { x: 0.0, y: 0.0 }];
    }

    let mut positions = circular_seed(n);
    let neighbors = undirected_neighbors(graph, n);

    // Cooling schedule: a tenth of the initial extent, down to zero.
    let mut temperature = 0.1;
    let cooling = temperature / (iterations as f64 + 1.0);

    for _ in 0..iterations {
        let mut displacement = vec![Point { x: 0.0, y: 0.0 }; n];

        for i in 0..n {
            // Every pair repels.
            for j in 0..n {
                if i == j {
                    continue;
                }
                let (dx, dy, distance) = offset(positions[i], positions[j]);
                let force = k * k / (distance * distance);
                displacement[i].x += dx * force;
                displacement[i].y += dy * force;
            }
            // Connected pairs attract, weighted by edge count.
            for &(j, weight) in &neighbors[i] {
                let (dx, dy, distance) = offset(positions[i], positions[j]);
                let force = weight * distance / k;
                displacement[i].x -= dx * force;
                displacement[i].y -= dy * force;
            }
        }

        for (position, delta) in positions.iter_mut().zip(&displacement) {
            let length = (delta.x * delta.x + delta.y * delta.y)
                .sqrt()
                .max(MIN_DISTANCE);
            position.x += delta.x * temperature / length;
            position.y += delta.y * temperature / length;
        }
        temperature -= cooling;
    }

    rescale(&mut positions);
    positions
}

/// Nodes evenly spaced on a circle inside the unit square.
fn circular_seed(n: usize) -> Vec<Point> {
    (0..n)
        .map(|i| {
            let angle = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
            Point {
                x: 0.5 + 0.5 * angle.cos(),
                y: 0.5 + 0.5 * angle.sin(),
            }
        })
        .collect()
}

/// `a - b` and its length, clamped away from zero.
fn offset(a: Point, b: Point) -> (f64, f64, f64) {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx, dy, (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE))
}

/// Per-node neighbor lists, symmetric, parallel edges summed into the
/// weight.
fn undirected_neighbors(graph: &CallGraph, n: usize) -> Vec<Vec<(usize, f64)>> {
    let mut neighbors: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
    let mut add = |from: usize, to: usize| {
        match neighbors[from].iter_mut().find(|(j, _)| *j == to) {
            Some((_, weight)) => *weight += 1.0,
            None => neighbors[from].push((to, 1.0)),
        }
    };
    for (from, to) in graph.edge_endpoints() {
        let (a, b) = (from.index(), to.index());
        if a == b {
            continue;
        }
        add(a, b);
        add(b, a);
    }
    neighbors
}

/// Centers the layout on the origin and scales it into [-1, 1].
fn rescale(positions: &mut [Point]) {
    let n = positions.len() as f64;
    let cx = positions.iter().map(|p| p.x).sum::<f64>() / n;
    let cy = positions.iter().map(|p| p.y).sum::<f64>() / n;

    let mut extent: f64 = 0.0;
    for p in positions.iter_mut() {
        p.x -= cx;
        p.y -= cy;
        extent = extent.max(p.x.abs()).max(p.y.abs());
    }
    if extent > 0.0 {
        for p in positions.iter_mut() {
            p.x /= extent;
            p.y /= extent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(ids: &[&str]) -> CallGraph {
        let mut graph = CallGraph::new();
        for pair in ids.windows(2) {
            graph.add_call(pair[0], pair[1]);
        }
        graph
    }

    #[test]
    fn test_empty_and_single_node() {
        assert!(spring_layout(&CallGraph::new(), SPRING_K, SPRING_ITERATIONS).is_empty());

        let mut graph = CallGraph::new();
        graph.ensure_node("lonely");
        assert_eq!(
            spring_layout(&graph, SPRING_K, SPRING_ITERATIONS),
            vec![Point { x: 0.0, y: 0.0 }]
        );
    }

    #[test]
    fn test_layout_is_bounded_and_deterministic() {
        let graph = chain(&["a", "b", "c", "d", "e"]);
        let first = spring_layout(&graph, SPRING_K, SPRING_ITERATIONS);
        let second = spring_layout(&graph, SPRING_K, SPRING_ITERATIONS);

        assert_eq!(first.len(), 5);
        assert_eq!(first, second);
        for p in &first {
            assert!(p.x.abs() <= 1.0 + 1e-9 && p.y.abs() <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn test_nodes_do_not_collapse() {
        let graph = chain(&["a", "b", "c"]);
        let positions = spring_layout(&graph, SPRING_K, SPRING_ITERATIONS);

        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                let dx = positions[i].x - positions[j].x;
                let dy = positions[i].y - positions[j].y;
                assert!((dx * dx + dy * dy).sqrt() > 0.05);
            }
        }
    }

    #[test]
    fn test_parallel_edges_add_weight() {
        let mut graph = CallGraph::new();
        graph.add_call("a", "b");
        graph.add_call("a", "b");
        graph.add_call("b", "a");
        graph.add_call("b", "c");

        let neighbors = undirected_neighbors(&graph, graph.node_count());
        assert_eq!(neighbors[0], vec![(1, 3.0)]);
        assert_eq!(neighbors[1], vec![(0, 3.0), (2, 1.0)]);
        assert_eq!(neighbors[2], vec![(1, 1.0)]);
    }
}
