use anyhow::Result;
use massifveg::VectorLayer;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::InspectArgs) -> Result<()> {
    let layer = VectorLayer::from_shapefile("inspect", &args.shapefile)?;
    let summary = layer.summary();

    println!("Number of records: {}", summary.records);
    if summary.empty_geometries > 0 {
        println!("Empty geometries: {}", summary.empty_geometries);
    }
    println!("Attribute columns:");
    for (name, dtype) in &summary.columns {
        println!("  - {name} ({dtype})");
    }

    Ok(())
}
