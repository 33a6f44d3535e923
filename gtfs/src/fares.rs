use std::collections::BTreeMap;

use anyhow::Result;
use serde::Deserialize;

use crate::StopID;

/// Per-stop fare info from the regional fare_stops.txt extension.
#[derive(Clone, Debug)]
pub struct Fare {
    pub fare_zone: String,
    pub fare_token: String,
    pub start_char: String,
}

pub fn load<R: std::io::Read>(reader: R) -> Result<BTreeMap<StopID, Fare>> {
    let mut fares = BTreeMap::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        fares.insert(
            rec.stop_id,
            Fare {
                fare_zone: rec.fare_zone,
                fare_token: rec.fare_token,
                start_char: rec.start_char,
            },
        );
    }
    Ok(fares)
}

#[derive(Deserialize)]
struct Record {
    stop_id: StopID,
    fare_zone: String,
    fare_token: String,
    start_char: String,
}
