use std::path::PathBuf;

/// Massif vegetation CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "massifveg", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Download and extract a zipped shapefile archive
    Fetch(FetchArgs),

    /// Print the schema and geometry summary of a shapefile
    Inspect(InspectArgs),

    /// Print the vegetation composition for a selected key
    Compose(ComposeArgs),

    /// Export a layer as GeoJSON for the map widget
    Export(ExportArgs),
}

#[derive(clap::Args, Debug)]
pub struct FetchArgs {
    /// HTTP(S) URL of a .zip archive containing a shapefile
    pub url: String,

    /// Output directory, defaults to "."
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Overwrite an already-downloaded archive
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct InspectArgs {
    /// Path to a .shp file
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub shapefile: PathBuf,
}

#[derive(clap::Args, Debug)]
#[command(group = clap::ArgGroup::new("selection").required(true))]
pub struct ComposeArgs {
    /// Massifs shapefile
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub massifs: PathBuf,

    /// Vegetation shapefile
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub vegetation: PathBuf,

    /// Column configuration JSON (defaults to the Bouches-du-Rhône schema)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub columns: Option<PathBuf>,

    /// Massif to break down by vegetation category
    #[arg(long, group = "selection")]
    pub massif: Option<String>,

    /// Vegetation category to break down by massif
    #[arg(long, group = "selection")]
    pub category: Option<String>,

    /// Select the massif under this point (map-click equivalent)
    #[arg(long, value_name = "LON,LAT", group = "selection")]
    pub at: Option<String>,

    /// List selectable massifs and categories instead of composing
    #[arg(long, group = "selection")]
    pub list: bool,

    /// Write rows to a .json or .csv file in addition to printing
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, clap::ValueEnum)]
pub enum Mode { Massifs, Vegetation }

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Shapefile of the layer to export
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub shapefile: PathBuf,

    /// Which layer this is (controls id, tooltip and style columns)
    #[arg(long, value_enum, default_value_t = Mode::Massifs)]
    pub mode: Mode,

    /// Column configuration JSON (defaults to the Bouches-du-Rhône schema)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub columns: Option<PathBuf>,

    /// Output GeoJSON file (must be a file path; "-" is rejected)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: PathBuf,

    /// Overwrite if the file exists
    #[arg(long)]
    pub force: bool,
}
