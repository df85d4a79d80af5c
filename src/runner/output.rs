//! Writing artifacts below the output directory.
//!
//! All writes go through a `cap-std` directory handle opened on the output
//! directory, so artifact paths are always resolved beneath it.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use tracing::{debug, info};

use super::RunnerError;
use crate::render::Artifact;

/// Create `path` if needed and open it.
pub(super) fn open_output_dir(path: &Utf8Path) -> Result<Dir, RunnerError> {
    let write_error = |source| RunnerError::Write {
        path: path.to_owned(),
        source,
    };
    Dir::create_ambient_dir_all(path, ambient_authority()).map_err(write_error)?;
    Dir::open_ambient_dir(path, ambient_authority()).map_err(write_error)
}

/// Write `contents` to `relative`, creating parent directories.
pub(super) fn write_file(
    dir: &Dir,
    root: &Utf8Path,
    relative: &Utf8Path,
    contents: &str,
) -> Result<(), RunnerError> {
    let write_error = |source| RunnerError::Write {
        path: root.join(relative),
        source,
    };
    if let Some(parent) = relative.parent().filter(|p| !p.as_str().is_empty()) {
        dir.create_dir_all(parent).map_err(write_error)?;
    }
    dir.write(relative, contents).map_err(write_error)?;
    debug!(path = %relative, bytes = contents.len(), "file written");
    Ok(())
}

/// Write every artifact, stopping at the first failure.
pub(super) fn write_artifacts(
    dir: &Dir,
    root: &Utf8Path,
    artifacts: &[Artifact],
) -> Result<Vec<Utf8PathBuf>, RunnerError> {
    artifacts
        .iter()
        .map(|artifact| -> Result<Utf8PathBuf, RunnerError> {
            write_file(dir, root, &artifact.path, &artifact.content)?;
            info!(path = %artifact.path, "Exported {}", artifact.description);
            Ok(artifact.path.clone())
        })
        .collect()
}
