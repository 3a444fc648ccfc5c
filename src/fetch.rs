use std::{
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::{common, error::DataError};

/// Record of one fetched archive: where it came from, its checksum, and the
/// shapefiles found inside.
#[derive(Debug, Serialize)]
pub struct FetchManifest {
    pub url: String,
    pub archive: PathBuf,
    pub sha256: String,
    pub shapefiles: Vec<PathBuf>,
}

/// Download a zipped shapefile archive, extract it next to the archive, and
/// record what was fetched in `<name>.manifest.json`.
///
/// The body streams to a temp file in `out_dir` and is renamed into place
/// only once the transfer completes, so an interrupted download never leaves
/// a half-written archive behind. Nothing is retried: fetch, archive and
/// missing-shapefile failures are reported to the caller as is.
pub fn fetch_archive(
    url: &str,
    out_dir: &Path,
    force: bool,
    verbose: u8,
) -> Result<FetchManifest, DataError> {
    common::ensure_dir_exists(out_dir)?;

    let file_name = url
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("archive.zip");
    let zip_path = out_dir.join(file_name);
    if zip_path.exists() && !force {
        return Err(DataError::Archive {
            path: zip_path,
            reason: "already downloaded (pass force to overwrite)".to_string(),
        });
    }

    let fetch_err = |reason: String| DataError::Fetch {
        url: url.to_string(),
        reason,
    };

    if verbose > 0 { eprintln!("[fetch] {url} -> {}", zip_path.display()); }
    let mut response = reqwest::blocking::get(url).map_err(|e| fetch_err(e.to_string()))?;
    if !response.status().is_success() {
        return Err(fetch_err(format!("HTTP status {}", response.status())));
    }

    let mut tmp = NamedTempFile::new_in(out_dir)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = response.read(&mut buf).map_err(|e| fetch_err(e.to_string()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        tmp.write_all(&buf[..n])?;
    }
    tmp.persist(&zip_path).map_err(|e| DataError::Io(e.error))?;
    let sha256 = hex::encode(hasher.finalize());

    let stem = zip_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("archive")
        .to_string();
    let dest_dir = out_dir.join(&stem);
    if verbose > 0 { eprintln!("[extract] {} -> {}", zip_path.display(), dest_dir.display()); }
    common::extract_zip(&zip_path, &dest_dir)?;

    let shapefiles = common::find_shapefiles(&dest_dir);
    if shapefiles.is_empty() {
        return Err(DataError::MissingShapefile(dest_dir));
    }

    let manifest = FetchManifest {
        url: url.to_string(),
        archive: zip_path,
        sha256,
        shapefiles,
    };

    let manifest_path = out_dir.join(format!("{stem}.manifest.json"));
    let file = File::create(&manifest_path)?;
    serde_json::to_writer_pretty(file, &manifest)
        .map_err(|e| DataError::Io(std::io::Error::other(e)))?;
    if verbose > 0 { eprintln!("[fetch] wrote {}", manifest_path.display()); }

    Ok(manifest)
}
