#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod calendar;
mod fares;
mod ids;
mod routes;
mod stop_times;
mod stops;
mod time;
mod trips;

use std::collections::{BTreeMap, HashSet};

use anyhow::Result;
use chrono::NaiveDate;
use zip::ZipArchive;

pub use calendar::{Calendar, Service};
pub use fares::Fare;
pub use ids::{RouteID, ServiceID, StopID, TripID};
pub use routes::{Route, RouteTypeCode};
pub use stop_times::StopTime;
pub use stops::Stop;
pub use time::Time;
pub use trips::Trip;

#[derive(Debug)]
pub struct GTFS {
    pub routes: BTreeMap<RouteID, Route>,
    pub stops: BTreeMap<StopID, Stop>,
    pub trips: Vec<Trip>,
    // Sorted by stop_sequence
    pub stop_times: BTreeMap<TripID, Vec<StopTime>>,
    pub calendar: Calendar,
    pub fares: BTreeMap<StopID, Fare>,
}

/// One (trip, stop) pairing from the joined schedule tables. Built once;
/// nothing downstream goes back to the raw tables.
#[derive(Clone)]
pub struct ScheduleRow {
    pub trip_id: TripID,
    pub route_id: RouteID,
    pub route_short_name: String,
    pub route_type: RouteTypeCode,
    pub stop_id: StopID,
    pub stop_name: String,
    pub stop_lon: String,
    pub stop_lat: String,
    pub stop_sequence: usize,
    pub arrival_time: Time,
    pub departure_time: Time,
    pub fare_zone: String,
    pub fare_token: String,
    pub start_char: String,
}

impl GTFS {
    pub fn load_from_zip<R: std::io::Read + std::io::Seek>(
        archive: &mut ZipArchive<R>,
    ) -> Result<Self> {
        let routes = routes::load(get_zip_file(archive, "routes.txt")?)?;
        let stops = stops::load(get_zip_file(archive, "stops.txt")?)?;
        let trips = trips::load(get_zip_file(archive, "trips.txt")?)?;
        let stop_times = stop_times::load(get_zip_file(archive, "stop_times.txt")?)?;
        let calendar = calendar::load(get_zip_file(archive, "calendar_dates.txt")?)?;
        // Only some regional feeds carry fare info
        let fares = match archive.by_name("fare_stops.txt") {
            Ok(file) => fares::load(file)?,
            Err(_) => BTreeMap::new(),
        };
        Ok(Self {
            routes,
            stops,
            trips,
            stop_times,
            calendar,
            fares,
        })
    }

    /// Joins the tables into one denormalized row set for all trips running
    /// on one day. Rows come back grouped by route, then trip, sorted by
    /// stop_sequence within a trip.
    pub fn rows_on_date(&self, date: NaiveDate) -> Result<Vec<ScheduleRow>> {
        let services = self.calendar.services_active_on(date);
        let mut rows = Vec::new();
        let mut seen = HashSet::new();
        for trip in &self.trips {
            if !services.contains(&trip.service_id) {
                continue;
            }
            let route = match self.routes.get(&trip.route_id) {
                Some(x) => x,
                None => {
                    warn!("{:?} references unknown {:?}", trip.trip_id, trip.route_id);
                    continue;
                }
            };
            let stop_times = match self.stop_times.get(&trip.trip_id) {
                Some(x) => x,
                None => continue,
            };
            for st in stop_times {
                let stop = match self.stops.get(&st.stop_id) {
                    Some(x) => x,
                    None => {
                        warn!("{:?} visits unknown {:?}", trip.trip_id, st.stop_id);
                        continue;
                    }
                };
                // When a fare table is present, it joins like any other
                // table; stops it doesn't cover drop out.
                let (fare_zone, fare_token, start_char) = if self.fares.is_empty() {
                    (String::new(), String::new(), String::new())
                } else {
                    match self.fares.get(&st.stop_id) {
                        Some(f) => (
                            f.fare_zone.clone(),
                            f.fare_token.clone(),
                            f.start_char.clone(),
                        ),
                        None => continue,
                    }
                };
                if !seen.insert((
                    trip.trip_id.clone(),
                    st.stop_sequence,
                    st.stop_id.clone(),
                    st.arrival_time,
                    st.departure_time,
                )) {
                    continue;
                }
                rows.push(ScheduleRow {
                    trip_id: trip.trip_id.clone(),
                    route_id: trip.route_id.clone(),
                    route_short_name: route.short_name.clone().unwrap_or_default(),
                    route_type: route.route_type.clone(),
                    stop_id: stop.stop_id.clone(),
                    stop_name: stop.name.clone(),
                    stop_lon: stop.lon.clone(),
                    stop_lat: stop.lat.clone(),
                    stop_sequence: st.stop_sequence,
                    arrival_time: st.arrival_time,
                    departure_time: st.departure_time,
                    fare_zone,
                    fare_token,
                    start_char,
                });
            }
        }
        if rows.is_empty() {
            bail!("No trips on {date}");
        }
        rows.sort_by(|a, b| {
            (&a.route_id, &a.trip_id, a.stop_sequence).cmp(&(&b.route_id, &b.trip_id, b.stop_sequence))
        });
        Ok(rows)
    }
}

// Adds the path in the error message
pub fn get_zip_file<'a, R: std::io::Read + std::io::Seek>(
    archive: &'a mut ZipArchive<R>,
    path: &str,
) -> Result<zip::read::ZipFile<'a>> {
    archive
        .by_name(path)
        .map_err(|err| anyhow!("{path}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_gtfs(fare_stops: Option<&str>) -> GTFS {
        let routes = routes::load(
            "route_id,route_short_name,route_type\nr1,12,3\n".as_bytes(),
        )
        .unwrap();
        let stops = stops::load(
            "stop_id,stop_name,stop_lat,stop_lon\n\
             s1,First,52.1,13.1\n\
             s2,Second,52.2,13.2\n"
                .as_bytes(),
        )
        .unwrap();
        let trips = trips::load(
            "route_id,service_id,trip_id\nr1,weekday,t1\nr1,sunday,t2\n".as_bytes(),
        )
        .unwrap();
        let stop_times = stop_times::load(
            "trip_id,arrival_time,departure_time,stop_id,stop_sequence\n\
             t1,08:00:00,08:01:00,s1,1\n\
             t1,08:10:00,08:10:00,s2,2\n\
             t1,08:10:00,08:10:00,s2,2\n\
             t2,09:00:00,09:00:00,s1,1\n"
                .as_bytes(),
        )
        .unwrap();
        let calendar = calendar::load(
            "service_id,date,exception_type\nweekday,20200715,1\nsunday,20200719,1\n".as_bytes(),
        )
        .unwrap();
        let fares = match fare_stops {
            Some(input) => fares::load(input.as_bytes()).unwrap(),
            None => BTreeMap::new(),
        };
        GTFS {
            routes,
            stops,
            trips,
            stop_times,
            calendar,
            fares,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y%m%d").unwrap()
    }

    #[test]
    fn join_filters_by_date_and_dedupes() {
        let gtfs = test_gtfs(None);
        let rows = gtfs.rows_on_date(date("20200715")).unwrap();
        // Only t1 runs that day, and its duplicated second stop collapses
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].trip_id, TripID("t1".to_string()));
        assert_eq!(rows[0].route_short_name, "12");
        assert_eq!(rows[0].stop_name, "First");
        assert_eq!(rows[0].stop_lon, "13.1");
        assert_eq!(rows[0].fare_zone, "");
        assert_eq!(rows[1].stop_sequence, 2);
    }

    #[test]
    fn no_trips_on_date_is_an_error() {
        let gtfs = test_gtfs(None);
        assert!(gtfs.rows_on_date(date("20200718")).is_err());
    }

    #[test]
    fn fare_table_joins_per_stop() {
        let gtfs = test_gtfs(Some(
            "stop_id,fare_zone,fare_token,start_char\ns1,110,T,A\ns2,110,T,B\n",
        ));
        let rows = gtfs.rows_on_date(date("20200715")).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fare_zone, "110");
        assert_eq!(rows[1].start_char, "B");
    }

    #[test]
    fn stops_missing_from_fare_table_drop_out() {
        let gtfs = test_gtfs(Some("stop_id,fare_zone,fare_token,start_char\ns1,110,T,A\n"));
        let rows = gtfs.rows_on_date(date("20200715")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].stop_id, StopID("s1".to_string()));
    }

    fn zip_feed(files: Vec<(&str, &str)>) -> ZipArchive<std::io::Cursor<Vec<u8>>> {
        use std::io::Write;

        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for (name, contents) in files {
            writer
                .start_file(name, zip::write::FileOptions::default())
                .unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        ZipArchive::new(writer.finish().unwrap()).unwrap()
    }

    #[test]
    fn load_whole_archive() {
        let mut archive = zip_feed(vec![
            ("routes.txt", "route_id,route_short_name,route_type\nr1,12,3\n"),
            ("stops.txt", "stop_id,stop_name,stop_lat,stop_lon\ns1,First,52.1,13.1\n"),
            ("trips.txt", "route_id,service_id,trip_id\nr1,weekday,t1\n"),
            (
                "stop_times.txt",
                "trip_id,arrival_time,departure_time,stop_id,stop_sequence\n\
                 t1,08:00:00,08:00:00,s1,1\n",
            ),
            (
                "calendar_dates.txt",
                "service_id,date,exception_type\nweekday,20200715,1\n",
            ),
        ]);
        let gtfs = GTFS::load_from_zip(&mut archive).unwrap();
        assert_eq!(gtfs.trips.len(), 1);
        assert!(gtfs.fares.is_empty());
        assert_eq!(gtfs.rows_on_date(date("20200715")).unwrap().len(), 1);
    }

    #[test]
    fn missing_table_names_the_file() {
        let mut archive = zip_feed(vec![(
            "routes.txt",
            "route_id,route_short_name,route_type\nr1,12,3\n",
        )]);
        let err = GTFS::load_from_zip(&mut archive).unwrap_err();
        assert!(err.to_string().contains("stops.txt"));
    }
}
