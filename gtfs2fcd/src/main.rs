#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use structopt::StructOpt;

use gtfs::GTFS;
use gtfs2fcd::{export_gpsdat, export_rows, OutputFiles};

#[derive(StructOpt)]
#[structopt(
    name = "gtfs2fcd",
    about = "Converts GTFS data into separate fcd traces for every distinct trip"
)]
struct Args {
    /// The region to process; names the default output directories
    #[structopt(long)]
    region: String,
    /// The GTFS zip file to load
    #[structopt(long)]
    gtfs: PathBuf,
    /// The day to import, as YYYYMMDD
    #[structopt(long)]
    date: u32,
    /// Directory to write the generated FCD files to
    #[structopt(long)]
    fcd: Option<PathBuf>,
    /// Directory to write the derived gpsdat files to; the conversion is
    /// skipped when absent
    #[structopt(long)]
    gpsdat: Option<PathBuf>,
    /// The external command deriving gpsdat files from finished traces
    #[structopt(long, default_value = "traceExporter.py")]
    trace_exporter: String,
    /// Tell me what you are doing
    #[structopt(long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::from_args();
    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Info
        } else {
            log::LevelFilter::Warn
        })
        .init();

    let date = NaiveDate::parse_from_str(&args.date.to_string(), "%Y%m%d")
        .map_err(|err| anyhow!("Bad --date {}: {err}", args.date))?;
    let fcd_dir = args
        .fcd
        .unwrap_or_else(|| PathBuf::from("fcd").join(&args.region));

    info!("Loading GTFS data {}", args.gtfs.display());
    let mut archive = zip::ZipArchive::new(fs_err::File::open(&args.gtfs)?)?;
    let gtfs = GTFS::load_from_zip(&mut archive)?;
    let rows = gtfs.rows_on_date(date)?;

    let mut out = OutputFiles::create(&fcd_dir)?;
    export_rows(&rows, &mut out)?;
    out.finish()?;

    if let Some(gpsdat_dir) = args.gpsdat {
        export_gpsdat(&args.trace_exporter, &fcd_dir, &gpsdat_dir)?;
    }
    Ok(())
}
