use std::{io, path::PathBuf};

use directories::ProjectDirs;

/// Directory holding the SQLite database and locally stored media.
///
/// Debug builds keep everything under `dev_assets/` in the workspace so a
/// development database never mixes with an installed one.
pub fn asset_dir() -> io::Result<PathBuf> {
    let path = if cfg!(debug_assertions) {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../dev_assets")
    } else {
        ProjectDirs::from("com", "brightsmile", "clinic-cms")
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no home directory"))?
            .data_dir()
            .to_path_buf()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path)?;
        tracing::debug!(path = %path.display(), "Created asset directory");
    }
    Ok(path)
}
