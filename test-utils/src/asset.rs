use std::{
    env::var_os,
    io::{Error, ErrorKind, Result},
    path::{Path, PathBuf},
};

pub const DATA_DIR: &str = "data";

/// Resolves the path to the requested data relative to the workspace directory.
pub fn resolve_path(path: &[impl AsRef<Path>]) -> Result<PathBuf> {
    let manifest = var_os("CARGO_MANIFEST_DIR")
        .ok_or_else(|| Error::new(ErrorKind::NotFound, "missing CARGO_MANIFEST_DIR"))?;
    let workspace = Path::new(&manifest)
        .parent()
        .ok_or_else(|| Error::new(ErrorKind::NotFound, "missing cargo workspace dir"))?
        .to_path_buf();

    path.iter()
        .fold(workspace, |path, component| path.join(component))
        .canonicalize()
}

/// The small sample catalogue of movies with 8 dimensional genre and mood features.
pub fn catalogue() -> Result<PathBuf> {
    resolve_path(&[DATA_DIR, "catalogue.json"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_exists() {
        assert!(catalogue().unwrap().is_file());
    }

    #[test]
    fn test_missing_data() {
        let error = resolve_path(&[DATA_DIR, "missing.json"]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }
}
