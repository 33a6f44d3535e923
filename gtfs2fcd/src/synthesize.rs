use std::collections::{BTreeMap, HashMap};
use std::io::Write;

use anyhow::Result;

use gtfs::{RouteID, RouteTypeCode, ScheduleRow, StopID, TripID};

use crate::modes::classify;
use crate::write::OutputFiles;

/// One position sample in a synthesized trace.
pub struct Timestep {
    pub time: i64,
    pub vehicle_id: String,
    pub x: String,
    pub y: String,
    pub until: i64,
    pub name: String,
    pub fare_zone: String,
    pub fare_token: String,
    pub start_char: String,
}

/// Everything derived from one trip's rows.
pub struct TripTrace {
    pub pattern: Vec<StopID>,
    pub timesteps: Vec<Timestep>,
    /// Parsed departure at the first stop, as plain seconds since midnight
    pub first_departure: u32,
    /// Arrival at the last stop shifted by the clock origin, but not by
    /// accumulated dwell
    pub last_arrival: i64,
    pub route_type: RouteTypeCode,
}

/// The one clock shared by every route and mode. It only moves forward, once
/// per newly emitted pattern, so samples in different files never share a
/// timestamp range.
pub struct Clock {
    now: i64,
}

impl Clock {
    pub fn new() -> Self {
        Self { now: 0 }
    }

    pub fn current(&self) -> i64 {
        self.now
    }

    pub fn advance(&mut self, to: i64) {
        assert!(to >= self.now, "clock went backwards: {} to {to}", self.now);
        self.now = to;
    }
}

/// Per-route map from ordered stop pattern to the first trip that produced
/// it. Never shrinks within a run.
pub struct PatternCache {
    seen: BTreeMap<RouteID, HashMap<Vec<StopID>, TripID>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self {
            seen: BTreeMap::new(),
        }
    }

    /// Decides whether this pattern is new for the route, and names the
    /// canonical trip every sharing trip should reference.
    pub fn resolve(
        &mut self,
        route_id: &RouteID,
        pattern: &[StopID],
        trip_id: &TripID,
    ) -> (bool, TripID) {
        let per_route = self.seen.entry(route_id.clone()).or_insert_with(HashMap::new);
        if let Some(canonical) = per_route.get(pattern) {
            return (false, canonical.clone());
        }
        per_route.insert(pattern.to_vec(), trip_id.clone());
        (true, trip_id.clone())
    }
}

/// Reduces one trip's rows into a trace whose timestamps start at the clock
/// origin. Subtracting the dwell accumulated at earlier stops keeps a
/// sample's time equal to when the vehicle actually moves again.
///
/// Rows must be sorted by stop_sequence and non-empty; the joiner guarantees
/// both.
pub fn build_trip(rows: &[ScheduleRow], clock_start: i64) -> TripTrace {
    let mut pattern = Vec::new();
    let mut timesteps = Vec::new();
    let mut offset = 0;
    let mut first_departure = None;
    let mut last_arrival = clock_start;

    for row in rows {
        let arrival = i64::from(row.arrival_time.seconds()) + clock_start;
        let departure = i64::from(row.departure_time.seconds()) + clock_start;
        let until = match first_departure {
            None => 0,
            Some(dep) => i64::from(row.departure_time.seconds()) - i64::from(dep),
        };
        pattern.push(row.stop_id.clone());
        timesteps.push(Timestep {
            time: arrival - offset,
            vehicle_id: format!("{}_{}", row.route_short_name, row.trip_id.0),
            x: row.stop_lon.clone(),
            y: row.stop_lat.clone(),
            until,
            name: row.stop_name.clone(),
            fare_zone: row.fare_zone.clone(),
            fare_token: row.fare_token.clone(),
            start_char: row.start_char.clone(),
        });
        if first_departure.is_none() {
            first_departure = Some(row.departure_time.seconds());
        }
        offset += departure - arrival;
        last_arrival = arrival;
    }

    TripTrace {
        pattern,
        timesteps,
        first_departure: first_departure.unwrap(),
        last_arrival,
        route_type: rows.last().unwrap().route_type.clone(),
    }
}

/// Turns joined schedule rows into per-mode traces and vehicle definitions.
/// Trips repeating a stop pattern already seen on their route reuse the
/// first trip's trace; only their vehicle entry is written, referencing the
/// canonical trip.
pub fn export_rows<W: Write>(rows: &[ScheduleRow], out: &mut OutputFiles<W>) -> Result<()> {
    let mut clock = Clock::new();
    let mut patterns = PatternCache::new();
    for route_rows in rows.chunk_by(|a, b| a.route_id == b.route_id) {
        for trip_rows in route_rows.chunk_by(|a, b| a.trip_id == b.trip_id) {
            let trace = build_trip(trip_rows, clock.current());
            let mode = classify(&trace.route_type)?;
            let (is_new, canonical) =
                patterns.resolve(&trip_rows[0].route_id, &trace.pattern, &trip_rows[0].trip_id);
            if is_new {
                out.write_trace(mode, &trace.timesteps)?;
                clock.advance(trace.last_arrival);
            }
            out.write_vehicle(
                mode,
                &trip_rows[0].trip_id,
                &canonical,
                trace.first_departure,
                &trip_rows[0].route_short_name,
            )?;
        }
    }
    Ok(())
}
