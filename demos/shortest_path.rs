//! Dijkstra over a small road grid.
//!
//! Junctions are indexed as points so that arbitrary coordinates can be snapped to the
//! nearest one; the search frontier is a `PriorityQueue` ordered by tentative distance.
//!
//! ```text
//! cargo run --example shortest_path
//! ```

use netroute::{Coordinate, PriorityQueue, QuadtreeIndex, Rectangle, Result};
use std::cmp::Ordering;
use tracing::{debug, info};

/// Frontier entry ordered by tentative distance only.
#[derive(Debug, Clone, Copy)]
struct State {
    cost: f64,
    junction: usize,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.cost.partial_cmp(&other.cost)
    }
}

struct RoadNetwork {
    junctions: Vec<Coordinate>,
    /// adjacency list: (neighbour, length)
    roads: Vec<Vec<(usize, f64)>>,
    index: QuadtreeIndex<usize>,
}

impl RoadNetwork {
    /// `size` x `size` grid with unit spacing; every third horizontal road is missing
    /// west of the middle column.
    fn grid(size: usize, origin: Coordinate) -> Result<Self> {
        let mut junctions = Vec::with_capacity(size * size);
        for row in 0..size {
            for col in 0..size {
                junctions.push(Coordinate::new(
                    origin.x + col as f64,
                    origin.y + row as f64,
                ));
            }
        }

        let mut roads = vec![Vec::new(); junctions.len()];
        let mut connect = |a: usize, b: usize| {
            let d = distance(junctions[a], junctions[b]);
            roads[a].push((b, d));
            roads[b].push((a, d));
        };
        for row in 0..size {
            for col in 0..size {
                let id = row * size + col;
                if col + 1 < size && !(row % 3 == 1 && col < size / 2) {
                    connect(id, id + 1);
                }
                if row + 1 < size {
                    connect(id, id + size);
                }
            }
        }

        let mut index = QuadtreeIndex::new();
        for (id, junction) in junctions.iter().enumerate() {
            index.insert(Rectangle::from_point(*junction), id)?;
        }
        info!(
            "Indexed {} junctions (depth {}, {} nodes)",
            index.count(),
            index.depth(),
            index.node_count()
        );

        Ok(RoadNetwork {
            junctions,
            roads,
            index,
        })
    }

    /// Nearest junction to `point`, searching windows of doubling size.
    fn snap(&self, point: Coordinate) -> Option<usize> {
        let mut radius = 0.5;
        for _ in 0..32 {
            let mut window = Rectangle::from_point(point);
            window.expand_by_distance(radius);

            // primary filter, then exact distance
            let nearest = self
                .index
                .query(&window)
                .into_iter()
                .map(|&id| (id, distance(point, self.junctions[id])))
                .filter(|&(_, d)| d <= radius)
                .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
            if let Some((id, _)) = nearest {
                return Some(id);
            }
            radius *= 2.0;
        }
        None
    }

    fn shortest_path(&self, from: usize, to: usize) -> Result<Option<(f64, Vec<usize>)>> {
        let mut dist = vec![f64::INFINITY; self.junctions.len()];
        let mut prev = vec![None; self.junctions.len()];
        let mut frontier = PriorityQueue::new();

        dist[from] = 0.0;
        frontier.push(State {
            cost: 0.0,
            junction: from,
        })?;

        while let Some(State { cost, junction }) = frontier.pop() {
            if junction == to {
                let mut path = vec![to];
                let mut current = to;
                while let Some(p) = prev[current] {
                    path.push(p);
                    current = p;
                }
                path.reverse();
                return Ok(Some((cost, path)));
            }
            // stale entry
            if cost > dist[junction] {
                continue;
            }

            for &(next, length) in &self.roads[junction] {
                let candidate = cost + length;
                if candidate < dist[next] {
                    dist[next] = candidate;
                    prev[next] = Some(junction);
                    frontier.push(State {
                        cost: candidate,
                        junction: next,
                    })?;
                }
            }
            debug!("Settled junction {} at {:.2}, frontier {}", junction, cost, frontier.len());
        }
        Ok(None)
    }
}

fn distance(a: Coordinate, b: Coordinate) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    // 网格跨越坐标轴，部分路口会存放在根节点
    let network = RoadNetwork::grid(12, Coordinate::new(-3.0, -2.0))?;

    let start = Coordinate::new(-2.8, -1.7);
    let goal = Coordinate::new(7.6, 8.9);
    let (Some(from), Some(to)) = (network.snap(start), network.snap(goal)) else {
        println!("could not snap endpoints to the network");
        return Ok(());
    };
    println!(
        "snapped {} -> {} and {} -> {}",
        start, network.junctions[from], goal, network.junctions[to]
    );

    match network.shortest_path(from, to)? {
        Some((length, path)) => {
            println!("length {:.2} over {} junctions", length, path.len());
            let route: Vec<String> = path
                .iter()
                .map(|&id| network.junctions[id].to_string())
                .collect();
            println!("{}", route.join(" -> "));
        }
        None => println!("no route"),
    }

    Ok(())
}
