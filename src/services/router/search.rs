//! Local-search solver over the routing model.
//!
//! Seeds with cheapest insertion, then improves with relocate / swap /
//! segment-reversal moves under a simulated-annealing acceptance rule so
//! worsening moves can escape local optima. Constraint violations are
//! penalized, not rejected: a solution is feasible once its penalty hits
//! zero, and the search stops there — the router only needs existence.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::model::RoutingModel;

/// Penalty per violation minute / load unit. Dominates any realistic travel
/// delta so the search always prefers restoring feasibility.
const VIOLATION_WEIGHT: i64 = 10_000;
const COOLING: f64 = 0.9995;
const MIN_TEMPERATURE: f64 = 1.0;
/// Accepted-move drought after which the search is considered converged.
const CONVERGENCE_ITERATIONS: u64 = 20_000;

/// Result of one solve attempt at a fixed vehicle count.
#[derive(Debug)]
pub struct SearchOutcome {
    /// Job-node indices per vehicle, depot legs implied.
    pub routes: Vec<Vec<usize>>,
    pub feasible: bool,
    pub iterations: u64,
}

fn route_score(model: &RoutingModel, route: &[usize]) -> i64 {
    let eval = model.evaluate_route(route);
    eval.travel_minutes + VIOLATION_WEIGHT * eval.total_violation()
}

/// Current solution with per-route cached evaluation.
#[derive(Debug, Clone)]
struct Incumbent {
    routes: Vec<Vec<usize>>,
    travel: Vec<i64>,
    violation: Vec<i64>,
}

impl Incumbent {
    fn evaluate(model: &RoutingModel, routes: Vec<Vec<usize>>) -> Self {
        let mut travel = Vec::with_capacity(routes.len());
        let mut violation = Vec::with_capacity(routes.len());
        for route in &routes {
            let eval = model.evaluate_route(route);
            travel.push(eval.travel_minutes);
            violation.push(eval.total_violation());
        }
        Self {
            routes,
            travel,
            violation,
        }
    }

    fn cached_score(&self, r: usize) -> i64 {
        self.travel[r] + VIOLATION_WEIGHT * self.violation[r]
    }

    fn score(&self) -> i64 {
        self.travel.iter().sum::<i64>() + VIOLATION_WEIGHT * self.total_violation()
    }

    fn total_violation(&self) -> i64 {
        self.violation.iter().sum()
    }

    fn commit(&mut self, model: &RoutingModel, touched: Vec<(usize, Vec<usize>)>) {
        for (r, route) in touched {
            let eval = model.evaluate_route(&route);
            self.travel[r] = eval.travel_minutes;
            self.violation[r] = eval.total_violation();
            self.routes[r] = route;
        }
    }
}

/// Insert every job node at its cheapest position across all vehicles,
/// in window-open order.
fn cheapest_insertion(model: &RoutingModel) -> Incumbent {
    let mut routes: Vec<Vec<usize>> = vec![Vec::new(); model.vehicles];
    let mut order: Vec<usize> = (1..=model.job_count()).collect();
    order.sort_by_key(|&i| (model.nodes[i].window.0, i));

    for node in order {
        let mut best: Option<(i64, usize, usize)> = None;
        for (r, route) in routes.iter().enumerate() {
            let base = route_score(model, route);
            for pos in 0..=route.len() {
                let mut candidate = route.clone();
                candidate.insert(pos, node);
                let delta = route_score(model, &candidate) - base;
                if best.map_or(true, |(d, _, _)| delta < d) {
                    best = Some((delta, r, pos));
                }
            }
        }
        let (_, r, pos) = best.expect("at least one vehicle in the model");
        routes[r].insert(pos, node);
    }

    Incumbent::evaluate(model, routes)
}

type Touched = Vec<(usize, Vec<usize>)>;

/// Propose one random neighborhood move; returns the replacement routes and
/// the score delta, or `None` for a degenerate draw.
fn propose_move(model: &RoutingModel, current: &Incumbent, rng: &mut StdRng) -> Option<(Touched, i64)> {
    let non_empty: Vec<usize> = current
        .routes
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.is_empty())
        .map(|(i, _)| i)
        .collect();
    if non_empty.is_empty() {
        return None;
    }

    match rng.gen_range(0..3u8) {
        // Relocate one job to another position, possibly another vehicle.
        0 => {
            let from = non_empty[rng.gen_range(0..non_empty.len())];
            let pos = rng.gen_range(0..current.routes[from].len());
            let to = rng.gen_range(0..current.routes.len());

            let mut source = current.routes[from].clone();
            let node = source.remove(pos);
            if to == from {
                let insert = rng.gen_range(0..=source.len());
                source.insert(insert, node);
                let delta = route_score(model, &source) - current.cached_score(from);
                Some((vec![(from, source)], delta))
            } else {
                let mut target = current.routes[to].clone();
                let insert = rng.gen_range(0..=target.len());
                target.insert(insert, node);
                let delta = route_score(model, &source) + route_score(model, &target)
                    - current.cached_score(from)
                    - current.cached_score(to);
                Some((vec![(from, source), (to, target)], delta))
            }
        }
        // Swap two jobs between (or within) routes.
        1 => {
            let r1 = non_empty[rng.gen_range(0..non_empty.len())];
            let r2 = non_empty[rng.gen_range(0..non_empty.len())];
            let p1 = rng.gen_range(0..current.routes[r1].len());
            let p2 = rng.gen_range(0..current.routes[r2].len());

            if r1 == r2 {
                if p1 == p2 {
                    return None;
                }
                let mut route = current.routes[r1].clone();
                route.swap(p1, p2);
                let delta = route_score(model, &route) - current.cached_score(r1);
                Some((vec![(r1, route)], delta))
            } else {
                let mut a = current.routes[r1].clone();
                let mut b = current.routes[r2].clone();
                std::mem::swap(&mut a[p1], &mut b[p2]);
                let delta = route_score(model, &a) + route_score(model, &b)
                    - current.cached_score(r1)
                    - current.cached_score(r2);
                Some((vec![(r1, a), (r2, b)], delta))
            }
        }
        // Reverse a segment within one route (2-opt).
        _ => {
            let r = non_empty[rng.gen_range(0..non_empty.len())];
            let len = current.routes[r].len();
            if len < 2 {
                return None;
            }
            let a = rng.gen_range(0..len);
            let b = rng.gen_range(0..len);
            let (i, j) = (a.min(b), a.max(b));
            if i == j {
                return None;
            }
            let mut route = current.routes[r].clone();
            route[i..=j].reverse();
            let delta = route_score(model, &route) - current.cached_score(r);
            Some((vec![(r, route)], delta))
        }
    }
}

/// Run one bounded-time solve attempt against the model.
///
/// `should_stop` is polled alongside the wall-clock budget so concurrent
/// attempts can be cancelled cooperatively.
pub fn solve_model(
    model: &RoutingModel,
    budget: Duration,
    seed: u64,
    should_stop: &(dyn Fn() -> bool + Sync),
) -> SearchOutcome {
    let started = Instant::now();
    let mut rng = StdRng::seed_from_u64(seed);

    let current = cheapest_insertion(model);
    if current.total_violation() == 0 {
        return SearchOutcome {
            routes: current.routes,
            feasible: true,
            iterations: 0,
        };
    }

    let mut current = current;
    let mut best = current.clone();
    let mut best_score = best.score();
    let mut temperature = (best_score as f64 * 0.05).max(MIN_TEMPERATURE);
    let mut iterations = 0u64;
    let mut since_improvement = 0u64;

    loop {
        iterations += 1;
        since_improvement += 1;
        if iterations % 128 == 0 && (started.elapsed() >= budget || should_stop()) {
            break;
        }
        if since_improvement > CONVERGENCE_ITERATIONS {
            break;
        }
        temperature = (temperature * COOLING).max(MIN_TEMPERATURE);

        let Some((touched, delta)) = propose_move(model, &current, &mut rng) else {
            continue;
        };
        let accept = delta <= 0 || rng.gen::<f64>() < (-(delta as f64) / temperature).exp();
        if !accept {
            continue;
        }

        current.commit(model, touched);
        let score = current.score();
        if score < best_score {
            best = current.clone();
            best_score = score;
            since_improvement = 0;
            if best.total_violation() == 0 {
                // Existence is all the fleet search needs at this K.
                break;
            }
        }
    }

    let feasible = best.total_violation() == 0;
    debug!(
        "search finished: feasible={} iterations={} violation={}",
        feasible,
        iterations,
        best.total_violation()
    );
    SearchOutcome {
        routes: best.routes,
        feasible,
        iterations,
    }
}
