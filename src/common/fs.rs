use std::fs;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::error::DataError;

/// Create the directory if it doesn't exist; error if a non-directory exists there.
pub(crate) fn ensure_dir_exists(path: &Path) -> Result<(), DataError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(std::io::Error::other(format!(
                "Path exists but is not a directory: {}",
                path.display()
            ))
            .into());
        }
    } else {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Extracts the given `.zip` file to the target directory.
pub(crate) fn extract_zip(zip_path: &Path, dest_dir: &Path) -> Result<(), DataError> {
    let archive_err = |reason: String| DataError::Archive {
        path: zip_path.to_path_buf(),
        reason,
    };

    let file = fs::File::open(zip_path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| archive_err(e.to_string()))?;
    archive
        .extract(dest_dir)
        .map_err(|e| archive_err(e.to_string()))?;

    Ok(())
}

/// All `.shp` entries under `dir`, sorted so repeated scans agree.
pub(crate) fn find_shapefiles(dir: &Path) -> Vec<PathBuf> {
    let mut found = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("shp"))
        })
        .collect::<Vec<_>>();
    found.sort();
    found
}
