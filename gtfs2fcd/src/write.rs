use std::collections::BTreeMap;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;

use gtfs::TripID;

use crate::modes::Mode;
use crate::synthesize::Timestep;

pub fn trace_path(dir: &Path, mode: Mode) -> PathBuf {
    dir.join(format!("{mode}.fcd.xml"))
}

fn vehicle_path(dir: &Path, mode: Mode) -> PathBuf {
    dir.join(format!("{mode}.rou.xml"))
}

/// One pair of sinks per mode, opened before any trip is processed and kept
/// open for the whole run.
pub struct OutputFiles<W: Write> {
    traces: BTreeMap<Mode, W>,
    vehicles: BTreeMap<Mode, W>,
}

impl OutputFiles<BufWriter<fs_err::File>> {
    pub fn create(dir: &Path) -> Result<Self> {
        fs_err::create_dir_all(dir)?;
        let mut traces = BTreeMap::new();
        let mut vehicles = BTreeMap::new();
        for mode in Mode::all() {
            let path = trace_path(dir, mode);
            info!("Writing trace file {}", path.display());
            traces.insert(mode, BufWriter::new(fs_err::File::create(path)?));
            vehicles.insert(mode, BufWriter::new(fs_err::File::create(vehicle_path(dir, mode))?));
        }
        Self::new(traces, vehicles)
    }
}

impl<W: Write> OutputFiles<W> {
    /// Takes one sink per mode in each map and writes the container open
    /// markers.
    pub fn new(mut traces: BTreeMap<Mode, W>, mut vehicles: BTreeMap<Mode, W>) -> Result<Self> {
        for file in traces.values_mut() {
            writeln!(file, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
            writeln!(file)?;
            writeln!(file, "<fcd-export>")?;
        }
        for file in vehicles.values_mut() {
            writeln!(file, "<routes>")?;
        }
        Ok(Self { traces, vehicles })
    }

    pub fn write_trace(&mut self, mode: Mode, steps: &[Timestep]) -> Result<()> {
        let file = self.traces.get_mut(&mode).unwrap();
        for step in steps {
            writeln!(
                file,
                "    <timestep time=\"{}\"><vehicle id=\"{}\" x=\"{}\" y=\"{}\" until=\"{}\" \
                 name={} fareZone=\"{}\" fareSymbol=\"{}\" startFare=\"{}\" speed=\"20\"/></timestep>",
                step.time,
                step.vehicle_id,
                step.x,
                step.y,
                step.until,
                quote_attr(&step.name),
                step.fare_zone,
                step.fare_token,
                step.start_char
            )?;
        }
        Ok(())
    }

    pub fn write_vehicle(
        &mut self,
        mode: Mode,
        trip: &TripID,
        canonical: &TripID,
        depart: u32,
        route_short_name: &str,
    ) -> Result<()> {
        let file = self.vehicles.get_mut(&mode).unwrap();
        writeln!(
            file,
            "    <vehicle id=\"{}\" route=\"{}\" type=\"{}\" depart=\"{}\" line=\"{}_{}\"/>",
            trip.0, canonical.0, mode, depart, route_short_name, canonical.0
        )?;
        Ok(())
    }

    /// Writes the close markers and flushes. Call exactly once, after the
    /// last trip.
    pub fn finish(&mut self) -> Result<()> {
        for file in self.traces.values_mut() {
            writeln!(file, "</fcd-export>")?;
            file.flush()?;
        }
        for file in self.vehicles.values_mut() {
            writeln!(file, "</routes>")?;
            file.flush()?;
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn into_sinks(self) -> (BTreeMap<Mode, W>, BTreeMap<Mode, W>) {
        (self.traces, self.vehicles)
    }
}

/// Wraps a free-text attribute value in quotes, escaping the characters XML
/// forbids. The other attributes come from feed IDs and stay raw.
fn quote_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('"');
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped.push('"');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_attr_escapes() {
        assert_eq!(quote_attr("Main St"), "\"Main St\"");
        assert_eq!(quote_attr("Park & Ride"), "\"Park &amp; Ride\"");
        assert_eq!(quote_attr("A \"B\" <C>"), "\"A &quot;B&quot; &lt;C&gt;\"");
    }

    #[test]
    fn containers_open_and_close() {
        let mut traces = BTreeMap::new();
        let mut vehicles = BTreeMap::new();
        for mode in Mode::all() {
            traces.insert(mode, Vec::new());
            vehicles.insert(mode, Vec::new());
        }
        let mut out = OutputFiles::new(traces, vehicles).unwrap();
        out.finish().unwrap();
        let (traces, vehicles) = out.into_sinks();

        let trace = String::from_utf8(traces[&Mode::Tram].clone()).unwrap();
        assert_eq!(
            trace,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\n<fcd-export>\n</fcd-export>\n"
        );
        let vehicle = String::from_utf8(vehicles[&Mode::Tram].clone()).unwrap();
        assert_eq!(vehicle, "<routes>\n</routes>\n");
    }

    #[test]
    fn trace_line_form() {
        let mut traces = BTreeMap::new();
        let mut vehicles = BTreeMap::new();
        for mode in Mode::all() {
            traces.insert(mode, Vec::new());
            vehicles.insert(mode, Vec::new());
        }
        let mut out = OutputFiles::new(traces, vehicles).unwrap();
        out.write_trace(
            Mode::Bus,
            &[Timestep {
                time: 28800,
                vehicle_id: "12_t1".to_string(),
                x: "13.4051".to_string(),
                y: "52.5201".to_string(),
                until: 0,
                name: "Main St".to_string(),
                fare_zone: "110".to_string(),
                fare_token: "T".to_string(),
                start_char: "A".to_string(),
            }],
        )
        .unwrap();
        let (traces, _) = out.into_sinks();
        let trace = String::from_utf8(traces[&Mode::Bus].clone()).unwrap();
        assert!(trace.contains(
            "    <timestep time=\"28800\"><vehicle id=\"12_t1\" x=\"13.4051\" y=\"52.5201\" \
             until=\"0\" name=\"Main St\" fareZone=\"110\" fareSymbol=\"T\" startFare=\"A\" \
             speed=\"20\"/></timestep>\n"
        ));
    }
}
