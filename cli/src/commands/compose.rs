use std::path::Path;

use anyhow::{Context, Result, bail};
use massifveg::{Atlas, ColumnSpec, Composition, ViewMode};

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::ComposeArgs) -> Result<()> {
    let columns = match &args.columns {
        Some(path) => ColumnSpec::from_json_file(path)?,
        None => ColumnSpec::default(),
    };

    let mut atlas = Atlas::open(&args.massifs, &args.vegetation, columns, cli.verbose)?;

    if args.list {
        println!("Massifs:");
        for name in atlas.massif_names()? {
            println!("  - {name}");
        }
        println!("Vegetation categories:");
        for name in atlas.categories()? {
            println!("  - {name}");
        }
        return Ok(());
    }

    let result = if let Some(massif) = &args.massif {
        if !atlas.has_massif(massif) {
            eprintln!("note: {massif:?} is not a massif in this dataset (see --list)");
        }
        atlas.select(massif.clone())?
    } else if let Some(category) = &args.category {
        atlas.set_mode(ViewMode::Vegetation);
        atlas.select(category.clone())?
    } else if let Some(at) = &args.at {
        let (lon, lat) = parse_lon_lat(at)?;
        let result = atlas.select_at(lon, lat)?;
        if atlas.selection().is_none() {
            println!("No massif at ({lon}, {lat}).");
        } else if cli.verbose > 0 {
            eprintln!("[compose] ({lon}, {lat}) -> {:?}", atlas.selection().unwrap_or_default());
        }
        result
    } else {
        bail!("nothing selected; pass --massif, --category or --at");
    };

    print_composition(&result);

    if let Some(path) = &args.output {
        write_rows(&result, path).with_context(|| format!("write {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

fn print_composition(result: &Composition) {
    match result {
        Composition::Idle => println!("Nothing selected."),
        Composition::NoMatch { key } => println!("No vegetation data for {key:?}."),
        Composition::ZeroMeasure { key } => {
            println!("Vegetation rows for {key:?} have zero total surface.")
        }
        Composition::Breakdown { key, rows } => {
            println!("Vegetation composition for {key:?}:");
            let width = rows.iter().map(|r| r.category.chars().count()).max().unwrap_or(0);
            for row in rows {
                println!("  {:<width$}  {:>12.2}  {:>6.2} %", row.category, row.surface, row.share);
            }
        }
    }
}

fn write_rows(result: &Composition, path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => result.write_csv(path)?,
        _ => result.write_json(path)?,
    }
    Ok(())
}

fn parse_lon_lat(s: &str) -> Result<(f64, f64)> {
    let (lon, lat) = s.split_once(',').context("expected LON,LAT")?;
    Ok((
        lon.trim().parse().with_context(|| format!("bad longitude {lon:?}"))?,
        lat.trim().parse().with_context(|| format!("bad latitude {lat:?}"))?,
    ))
}
