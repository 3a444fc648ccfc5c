use anyhow::Result;
use massifveg::fetch_archive;

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::FetchArgs) -> Result<()> {
    let out_dir = args.output.clone().unwrap_or(".".into());

    let manifest = fetch_archive(&args.url, &out_dir, args.force, cli.verbose)?;

    println!("Fetched {} (sha256 {})", manifest.archive.display(), manifest.sha256);
    println!("Shapefiles:");
    for shp in &manifest.shapefiles {
        println!("  - {}", shp.display());
    }

    Ok(())
}
