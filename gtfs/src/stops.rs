use std::collections::BTreeMap;

use anyhow::Result;
use serde::Deserialize;

use crate::StopID;

/// Positions stay as the feed's own text. The exporter echoes them into the
/// output unchanged; nothing here does geometry.
#[derive(Clone, Debug)]
pub struct Stop {
    pub stop_id: StopID,
    pub name: String,
    pub lon: String,
    pub lat: String,
}

pub fn load<R: std::io::Read>(reader: R) -> Result<BTreeMap<StopID, Stop>> {
    let mut stops = BTreeMap::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        if stops.contains_key(&rec.stop_id) {
            bail!("Duplicate {:?}", rec.stop_id);
        }
        stops.insert(
            rec.stop_id.clone(),
            Stop {
                stop_id: rec.stop_id,
                name: rec.stop_name,
                lon: rec.stop_lon,
                lat: rec.stop_lat,
            },
        );
    }
    Ok(stops)
}

#[derive(Deserialize)]
struct Record {
    stop_id: StopID,
    stop_name: String,
    stop_lon: String,
    stop_lat: String,
}
