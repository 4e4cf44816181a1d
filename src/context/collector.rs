use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use super::Context;
use crate::encoding::Encoding;
use crate::source::{DataFormat, SourceKind, SourceLoader};

/// Collects a context from directories and files of configuration sources.
///
/// Roots are processed in the order given. A directory contributes its
/// immediate files with a recognized extension, in file name order; a file is
/// loaded as given. Partial contexts are merged so that later sources override
/// earlier ones.
///
/// Nothing here fails as a whole: every broken source is logged and counted,
/// and a missing root only produces a warning.
#[derive(Debug, Default)]
pub struct ContextCollector {
    loader: SourceLoader,
    encoding: Encoding,
}

impl ContextCollector {
    pub fn new(encoding: Encoding) -> Self {
        Self {
            loader: SourceLoader::new(),
            encoding,
        }
    }

    pub fn loader(&self) -> &SourceLoader {
        &self.loader
    }

    /// Returns the number of sources that failed and the merged context.
    pub fn collect<P: AsRef<Path>>(&self, roots: &[P]) -> (usize, Context) {
        let mut failures = 0;
        let mut context = Context::new();
        let mut loaded = HashSet::new();

        for root in roots {
            for (path, kind) in candidates(root.as_ref()) {
                let identity = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
                if !loaded.insert(identity) {
                    debug!(path = %path.display(), "skipping configuration file loaded before");
                    continue;
                }

                match self.loader.load_as(kind, &path, self.encoding) {
                    Ok(partial) => {
                        debug!(path = %path.display(), keys = partial.len(), "loaded configuration file");
                        context.merge(partial);
                    }
                    Err(e) => {
                        error!(path = %path.display(), error = %e, "failed to load configuration file");
                        failures += 1;
                    }
                }
            }
        }

        (failures, context)
    }
}

/// Collects a context with a fresh collector. See [`ContextCollector::collect`].
pub fn collect_context<P: AsRef<Path>>(roots: &[P], encoding: Encoding) -> (usize, Context) {
    ContextCollector::new(encoding).collect(roots)
}

fn candidates(root: &Path) -> Vec<(PathBuf, SourceKind)> {
    let metadata = match fs::metadata(root) {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!(path = %root.display(), error = %e, "failed to read configuration directory");
            return Vec::new();
        }
    };

    if !metadata.is_dir() {
        let kind = SourceKind::from_path(root).unwrap_or(SourceKind::Data(DataFormat::Yaml));
        return vec![(root.to_path_buf(), kind)];
    }

    let mut entries = match fs::read_dir(root) {
        Ok(entries) => entries
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.path()),
                Err(e) => {
                    warn!(path = %root.display(), error = %e, "failed to read configuration directory entry");
                    None
                }
            })
            .collect::<Vec<_>>(),
        Err(e) => {
            warn!(path = %root.display(), error = %e, "failed to read configuration directory");
            return Vec::new();
        }
    };
    entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    entries
        .into_iter()
        .filter_map(|path| {
            if path.is_dir() {
                debug!(path = %path.display(), "skipping subdirectory of configuration directory");
                return None;
            }
            match SourceKind::from_path(&path) {
                Some(kind) => Some((path, kind)),
                None => {
                    info!(
                        path = %path.display(),
                        expected = %SourceKind::expected(),
                        "skipping configuration file without a recognized suffix"
                    );
                    None
                }
            }
        })
        .collect()
}
