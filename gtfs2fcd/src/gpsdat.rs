use std::path::Path;
use std::process::Command;

use anyhow::Result;

use crate::modes::Mode;
use crate::write::trace_path;

/// Derives a gpsdat position log from every finished trace file by running
/// an external converter over it, then strips the synthesized vehicle id
/// prefix from each line. The first conversion failure aborts the run.
pub fn export_gpsdat(exporter: &str, fcd_dir: &Path, out_dir: &Path) -> Result<()> {
    fs_err::create_dir_all(out_dir)?;
    for mode in Mode::all() {
        let trace = trace_path(fcd_dir, mode);
        let raw = format!("gpsdat_{mode}.csv");
        info!("Converting {}", trace.display());
        let status = Command::new(exporter)
            .arg("--base-date")
            .arg("0")
            .arg("-i")
            .arg(&trace)
            .arg("--gpsdat-output")
            .arg(&raw)
            .status()
            .map_err(|err| anyhow!("Couldn't run {exporter}: {err}"))?;
        if !status.success() {
            bail!("{exporter} failed on {}: {status}", trace.display());
        }

        let input = fs_err::read_to_string(&raw)?;
        let mut output = String::new();
        for line in input.lines() {
            output.push_str(strip_vehicle_prefix(line)?);
            output.push('\n');
        }
        fs_err::write(out_dir.join(&raw), output)?;
        fs_err::remove_file(&raw)?;
    }
    Ok(())
}

/// The converter repeats the synthesized `{route}_{trip}` vehicle id at the
/// start of each line; everything through the first underscore is the
/// injected route prefix.
fn strip_vehicle_prefix(line: &str) -> Result<&str> {
    match line.find('_') {
        Some(idx) => Ok(&line[idx + 1..]),
        None => bail!("No vehicle id prefix in line {line}"),
    }
}
