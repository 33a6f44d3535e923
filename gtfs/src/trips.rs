use std::collections::BTreeSet;

use anyhow::Result;
use serde::Deserialize;

use crate::{RouteID, ServiceID, TripID};

#[derive(Clone, Debug)]
pub struct Trip {
    pub trip_id: TripID,
    pub route_id: RouteID,
    pub service_id: ServiceID,
}

pub fn load<R: std::io::Read>(reader: R) -> Result<Vec<Trip>> {
    let mut trips = Vec::new();
    let mut seen = BTreeSet::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        if !seen.insert(rec.trip_id.clone()) {
            bail!("Duplicate {:?}", rec.trip_id);
        }
        trips.push(Trip {
            trip_id: rec.trip_id,
            route_id: rec.route_id,
            service_id: rec.service_id,
        });
    }
    Ok(trips)
}

#[derive(Deserialize)]
struct Record {
    trip_id: TripID,
    route_id: RouteID,
    service_id: ServiceID,
}
