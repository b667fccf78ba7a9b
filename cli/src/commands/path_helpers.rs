use std::path::PathBuf;

use walkdir::{DirEntry, WalkDir};

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(true)
}

/// Expand directories into the files below them that have one of `extensions`
///
/// Paths given explicitly are kept whatever their extension.
pub(crate) fn get_all_files(paths: &[PathBuf], extensions: &[&str]) -> Vec<PathBuf> {
    paths
        .iter()
        .flat_map(move |path| {
            if path.is_dir() {
                WalkDir::new(path)
                    .into_iter()
                    .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
                    .filter_map(Result::ok)
                    .filter(|e| e.path().is_file())
                    .filter(|e| {
                        e.path()
                            .extension()
                            .and_then(|ext| ext.to_str())
                            .is_some_and(|ext| extensions.contains(&ext))
                    })
                    .map(|e| e.path().to_path_buf())
                    .collect::<Vec<_>>()
            } else {
                vec![path.clone()]
            }
        })
        .collect()
}
