use std::collections::BTreeMap;

use anyhow::Result;
use serde::Deserialize;

use crate::{StopID, Time, TripID};

#[derive(Clone, Debug)]
pub struct StopTime {
    pub stop_sequence: usize,
    pub stop_id: StopID,
    pub arrival_time: Time,
    pub departure_time: Time,
}

pub fn load<R: std::io::Read>(reader: R) -> Result<BTreeMap<TripID, Vec<StopTime>>> {
    let mut stop_times: BTreeMap<TripID, Vec<StopTime>> = BTreeMap::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        let arrival_time = Time::parse(&rec.arrival_time)?;
        let departure_time = Time::parse(&rec.departure_time)?;
        if arrival_time > departure_time {
            bail!("Arrival time {arrival_time} is > departure time {departure_time}");
        }
        stop_times
            .entry(rec.trip_id)
            .or_insert_with(Vec::new)
            .push(StopTime {
                stop_sequence: rec.stop_sequence,
                stop_id: rec.stop_id,
                arrival_time,
                departure_time,
            });
    }

    // Sort by stop_sequence, in case the file isn't in order
    for stops in stop_times.values_mut() {
        stops.sort_by_key(|st| st.stop_sequence);
    }
    Ok(stop_times)
}

#[derive(Deserialize)]
struct Record {
    trip_id: TripID,
    arrival_time: String,
    departure_time: String,
    stop_id: StopID,
    stop_sequence: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_sorts_by_sequence() {
        let input = "trip_id,arrival_time,departure_time,stop_id,stop_sequence\n\
                     t1,08:10:00,08:11:00,s2,2\n\
                     t1,08:00:00,08:01:00,s1,1\n";
        let stop_times = load(input.as_bytes()).unwrap();
        let t1 = &stop_times[&TripID("t1".to_string())];
        assert_eq!(t1.len(), 2);
        assert_eq!(t1[0].stop_id, StopID("s1".to_string()));
        assert_eq!(t1[1].stop_id, StopID("s2".to_string()));
    }

    #[test]
    fn reject_arrival_after_departure() {
        let input = "trip_id,arrival_time,departure_time,stop_id,stop_sequence\n\
                     t1,08:10:00,08:05:00,s1,1\n";
        assert!(load(input.as_bytes()).is_err());
    }

    #[test]
    fn reject_malformed_time() {
        let input = "trip_id,arrival_time,departure_time,stop_id,stop_sequence\n\
                     t1,8am,8am,s1,1\n";
        assert!(load(input.as_bytes()).is_err());
    }
}
