use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::RouteID;

/// The raw route_type code. Feeds mix the numeric vocabulary with short
/// carrier strings, so this stays text until classification.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RouteTypeCode(pub String);

#[derive(Clone, Debug)]
pub struct Route {
    pub route_id: RouteID,
    pub route_type: RouteTypeCode,
    pub short_name: Option<String>,
}

pub fn load<R: std::io::Read>(reader: R) -> Result<BTreeMap<RouteID, Route>> {
    let mut routes = BTreeMap::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        if routes.contains_key(&rec.route_id) {
            bail!("Duplicate {:?}", rec.route_id);
        }
        routes.insert(
            rec.route_id.clone(),
            Route {
                route_id: rec.route_id,
                route_type: rec.route_type,
                short_name: rec.route_short_name,
            },
        );
    }
    Ok(routes)
}

#[derive(Deserialize)]
struct Record {
    route_id: RouteID,
    route_type: RouteTypeCode,
    route_short_name: Option<String>,
}
