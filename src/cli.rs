use std::path::PathBuf;

use clap::Parser;

use crate::config::NamingConfig;
use crate::query::PickedObject;

/// Command-line arguments for galaxy-explorer
#[derive(Parser, Debug)]
#[command(version, about = "Explore raw and derived parameters of a galaxy catalog")]
pub struct Args {
    /// Catalog file (.csv, .txt, .json, .parquet)
    pub path: PathBuf,

    /// TOML configuration file
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// X parameter: a column name or an expression such as "bt - vt"
    #[arg(short = 'x', long = "x")]
    pub x: Option<String>,

    /// Y parameter, paired with X by object identity
    #[arg(short = 'y', long = "y")]
    pub y: Option<String>,

    /// Object designator to profile (display name, PGC number, or name fragment)
    #[arg(long = "object")]
    pub object: Option<String>,

    /// List object names containing this text
    #[arg(long = "search")]
    pub search: Option<String>,

    /// Restrict X to "MIN,MAX" for the distribution summary
    #[arg(long = "x-range")]
    pub x_range: Option<String>,

    /// List the analyzable parameters and exit
    #[arg(long = "list-parameters", action)]
    pub list_parameters: bool,
}

/// Parse `"MIN,MAX"` (whitespace allowed).
pub fn parse_range(text: &str) -> Option<(f64, f64)> {
    let (low, high) = text.split_once(',')?;
    Some((low.trim().parse().ok()?, high.trim().parse().ok()?))
}

/// `"NGC 224 (PGC 2557)"`, or just the name without a catalog number.
pub fn object_heading(picked: &PickedObject, naming: &NamingConfig) -> String {
    match picked.secondary_id {
        Some(number) => format!("{} ({} {number})", picked.name, naming.secondary_prefix),
        None => picked.name.clone(),
    }
}
