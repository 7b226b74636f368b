//! Schedule extraction from solved routes.
//!
//! Walks each vehicle's route in visiting order and translates minute
//! offsets back to absolute timestamps using the model origin.

use chrono::Duration;

use crate::types::{PickupJob, Schedule, ScheduleStop, VehicleRoute};

use super::model::{RouteNodeKind, RoutingModel};

/// Turn solved routes into the consumer-facing schedule. Vehicles with no
/// visited job are omitted.
pub fn extract_schedule(model: &RoutingModel, routes: &[Vec<usize>], jobs: &[PickupJob]) -> Schedule {
    let mut vehicle_routes = Vec::new();

    for (v, route) in routes.iter().enumerate() {
        if route.is_empty() {
            continue;
        }
        let eval = model.evaluate_route(route);

        let stops = eval
            .visits
            .iter()
            .map(|visit| {
                let (node_id, job_id) = match model.nodes[visit.node].kind {
                    RouteNodeKind::Depot => (model.depot_id.clone(), None),
                    RouteNodeKind::Job(i) => (jobs[i].node_id.clone(), Some(jobs[i].job_id.clone())),
                };
                ScheduleStop {
                    node_id,
                    job_id,
                    arrival: model.origin + Duration::minutes(visit.arrival_minute),
                    departure: model.origin + Duration::minutes(visit.departure_minute),
                    load: visit.load_units,
                }
            })
            .collect();

        vehicle_routes.push(VehicleRoute {
            vehicle_id: format!("vehicle-{v}"),
            stops,
        });
    }

    Schedule {
        routes: vehicle_routes,
    }
}
