use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::ServiceID;

/// Built purely from calendar_dates.txt; services exist on exactly the days
/// listed with exception_type 1.
#[derive(Clone, Debug)]
pub struct Calendar {
    pub services: BTreeMap<ServiceID, Service>,
}

#[derive(Clone, Debug)]
pub struct Service {
    pub service_id: ServiceID,
    pub extra_days: BTreeSet<NaiveDate>,
    pub removed_days: BTreeSet<NaiveDate>,
}

impl Calendar {
    pub fn services_active_on(&self, day: NaiveDate) -> BTreeSet<&ServiceID> {
        let mut result = BTreeSet::new();
        for service in self.services.values() {
            if service.active_on(day) {
                result.insert(&service.service_id);
            }
        }
        result
    }
}

impl Service {
    pub fn active_on(&self, day: NaiveDate) -> bool {
        if self.removed_days.contains(&day) {
            return false;
        }
        self.extra_days.contains(&day)
    }
}

pub fn load<R: std::io::Read>(reader: R) -> Result<Calendar> {
    let mut calendar = Calendar {
        services: BTreeMap::new(),
    };
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        let date = NaiveDate::parse_from_str(&rec.date, "%Y%m%d")?;
        let service = calendar
            .services
            .entry(rec.service_id.clone())
            .or_insert_with(|| Service {
                service_id: rec.service_id,
                extra_days: BTreeSet::new(),
                removed_days: BTreeSet::new(),
            });
        if rec.exception_type == 1 {
            service.extra_days.insert(date);
        } else if rec.exception_type == 2 {
            service.removed_days.insert(date);
        } else {
            bail!("Unknown exception_type {}", rec.exception_type);
        }
    }
    Ok(calendar)
}

#[derive(Deserialize)]
struct Record {
    service_id: ServiceID,
    date: String,
    exception_type: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y%m%d").unwrap()
    }

    #[test]
    fn services_on_a_day() {
        let input = "service_id,date,exception_type\n\
                     weekday,20200715,1\n\
                     weekday,20200716,1\n\
                     sunday,20200719,1\n";
        let calendar = load(input.as_bytes()).unwrap();
        let active = calendar.services_active_on(date("20200715"));
        assert_eq!(active.len(), 1);
        assert!(active.contains(&ServiceID("weekday".to_string())));
        assert!(calendar.services_active_on(date("20200718")).is_empty());
    }

    #[test]
    fn removed_day_wins() {
        let input = "service_id,date,exception_type\n\
                     weekday,20200715,1\n\
                     weekday,20200715,2\n";
        let calendar = load(input.as_bytes()).unwrap();
        assert!(calendar.services_active_on(date("20200715")).is_empty());
    }

    #[test]
    fn reject_unknown_exception_type() {
        let input = "service_id,date,exception_type\nweekday,20200715,3\n";
        assert!(load(input.as_bytes()).is_err());
    }
}
