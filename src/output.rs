//! Reading definition files and writing generated files.
//!
//! Each footprint produces `<name>.kicad_mod` and, if it has a body,
//! `<name>.wrl` in the output directory.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::OutputError;
use crate::footprint::GeneratedFootprint;
use crate::{kicad, vrml};

/// Files written for one footprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFiles {
    /// The KiCad footprint.
    pub footprint: PathBuf,
    /// The VRML model, if the footprint has a body.
    pub model: Option<PathBuf>,
}

/// Reads a definition file.
///
/// # Errors
///
/// Returns [`OutputError::FileRead`] if the file cannot be read.
pub async fn read_definitions(path: &Path) -> Result<String, OutputError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| OutputError::file_read(path, e))
}

async fn write_file(path: PathBuf, contents: String) -> Result<PathBuf, OutputError> {
    tokio::fs::write(&path, contents)
        .await
        .map_err(|e| OutputError::file_write(&path, e))?;
    debug!(path = %path.display(), "Wrote file");
    Ok(path)
}

/// Writes the footprint and its model into `dir`, creating it if needed.
///
/// # Errors
///
/// Returns [`OutputError::FileWrite`] if the directory or a file cannot be
/// written.
pub async fn write_outputs(
    dir: &Path,
    footprint: &GeneratedFootprint,
) -> Result<WrittenFiles, OutputError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| OutputError::file_write(dir, e))?;

    let footprint_path = write_file(
        dir.join(format!("{}.{}", footprint.name, kicad::EXTENSION)),
        kicad::write_footprint(footprint),
    )
    .await?;

    let model = match &footprint.body {
        Some(body) => Some(
            write_file(
                dir.join(format!("{}.{}", footprint.name, vrml::EXTENSION)),
                vrml::write_box(body),
            )
            .await?,
        ),
        None => None,
    };

    Ok(WrittenFiles {
        footprint: footprint_path,
        model,
    })
}
