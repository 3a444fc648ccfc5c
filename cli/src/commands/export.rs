use anyhow::{Result, bail};
use massifveg::{ColumnSpec, LayerStyle, VectorLayer};

use crate::cli::Mode;

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::ExportArgs) -> Result<()> {
    let columns = match &args.columns {
        Some(path) => ColumnSpec::from_json_file(path)?,
        None => ColumnSpec::default(),
    };

    if args.output == std::path::Path::new("-") {
        bail!("stdout is not supported; provide a real file path.");
    }
    if args.output.exists() && !args.force {
        bail!("Refusing to overwrite existing file: {} (use --force)", args.output.display());
    }

    let (name, id_column, tooltips, style) = match args.mode {
        Mode::Massifs => (
            "massifs",
            columns.massif_name.clone(),
            vec![columns.massif_name.clone()],
            LayerStyle::massifs(),
        ),
        Mode::Vegetation => (
            "vegetation",
            columns.category.clone(),
            vec![columns.category.clone(), columns.link.clone()],
            LayerStyle::vegetation(),
        ),
    };

    let layer = VectorLayer::from_shapefile(name, &args.shapefile)?;
    if cli.verbose > 0 {
        eprintln!("[export] {} features -> {}", layer.len(), args.output.display());
    }

    let tooltip_refs: Vec<&str> = tooltips.iter().map(String::as_str).collect();
    layer.write_geojson(&args.output, &id_column, &tooltip_refs, &style)?;

    println!("Wrote {}", args.output.display());
    Ok(())
}
