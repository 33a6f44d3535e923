use std::fmt;

use anyhow::Result;

/// A time of day in the feed, stored as seconds since midnight. Hours exceed
/// 23 for service running past midnight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(u32);

impl Time {
    pub fn seconds(self) -> u32 {
        self.0
    }

    /// Parses "HH:MM:SS" or "H:MM:SS".
    pub fn parse(x: &str) -> Result<Time> {
        let parts: Vec<&str> = x.split(':').collect();
        if parts.len() != 3 {
            bail!("Time {x} isn't in HH:MM:SS form");
        }
        let (hours, minutes, seconds) = match (
            parts[0].parse::<u32>(),
            parts[1].parse::<u32>(),
            parts[2].parse::<u32>(),
        ) {
            (Ok(h), Ok(m), Ok(s)) => (h, m, s),
            _ => bail!("Time {x} has non-numeric pieces"),
        };
        if minutes > 59 || seconds > 59 {
            bail!("Time {x} is out of range");
        }
        Ok(Time(hours * 3600 + minutes * 60 + seconds))
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.0 / 3600,
            (self.0 % 3600) / 60,
            self.0 % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_times() {
        assert_eq!(Time::parse("08:00:00").unwrap().seconds(), 28800);
        assert_eq!(Time::parse("8:05:09").unwrap().seconds(), 29109);
        assert_eq!(Time::parse("00:00:00").unwrap().seconds(), 0);
        // Past midnight
        assert_eq!(Time::parse("25:10:00").unwrap().seconds(), 90600);
    }

    #[test]
    fn reject_malformed_times() {
        assert!(Time::parse("8:00").is_err());
        assert!(Time::parse("ab:cd:ef").is_err());
        assert!(Time::parse("08:61:00").is_err());
        assert!(Time::parse("").is_err());
    }

    #[test]
    fn ordering_and_display() {
        let t1 = Time::parse("08:00:00").unwrap();
        let t2 = Time::parse("08:10:00").unwrap();
        assert!(t1 < t2);
        assert_eq!(t2.to_string(), "08:10:00");
    }
}
