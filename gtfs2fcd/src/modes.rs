use std::fmt;

use anyhow::Result;

use gtfs::RouteTypeCode;

/// The output bucket a trip is filed under. Every mode gets its own pair of
/// trace and vehicle files, whether or not any trip lands in it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Mode {
    Tram,
    Subway,
    Rail,
    RailElectric,
    LightRail,
    Bus,
    Ship,
}

impl Mode {
    pub fn all() -> Vec<Self> {
        use Mode::*;
        vec![Tram, Subway, Rail, RailElectric, LightRail, Bus, Ship]
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let x = match self {
            Mode::Tram => "tram",
            Mode::Subway => "subway",
            Mode::Rail => "rail",
            Mode::RailElectric => "rail_electric",
            Mode::LightRail => "light_rail",
            Mode::Bus => "bus",
            Mode::Ship => "ship",
        };
        write!(f, "{x}")
    }
}

/// Maps a route_type code to a mode. One table covers the standard numeric
/// vocabulary (https://developers.google.com/transit/gtfs/reference/#routestxt),
/// the extended European codes
/// (https://developers.google.com/transit/gtfs/reference/extended-route-types),
/// and the short carrier strings hafas feeds use.
pub fn classify(code: &RouteTypeCode) -> Result<Mode> {
    let mode = match code.0.as_str() {
        "0" => Mode::Tram,
        "1" => Mode::Subway,
        "2" => Mode::Rail,
        "3" => Mode::Bus,
        "4" => Mode::Ship,

        "100" => Mode::Rail,
        // S-Bahn
        "109" => Mode::LightRail,
        // U-Bahn
        "400" => Mode::Subway,
        // Bus, SEV, Rufbus
        "700" | "714" | "715" => Mode::Bus,
        "900" => Mode::Tram,
        // Faehre
        "1000" => Mode::Ship,

        "s" | "lt" => Mode::LightRail,
        "RE" | "RB" | "IXB" | "IRX" | "EC" | "NJ" | "RHI" | "DPN" | "SCH" | "Bsv" | "KAT"
        | "AIR" | "DPS" | "DPF" => Mode::Rail,
        "ICE" | "IC" => Mode::RailElectric,
        "BUS" => Mode::Bus,
        "Str" => Mode::Tram,

        x => bail!("Unknown route_type {x}"),
    };
    Ok(mode)
}
