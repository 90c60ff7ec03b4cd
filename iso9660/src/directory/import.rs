//! Build a tree from a host directory (`std` only)

use crate::directory::tree::{DirectoryTree, NodeId};
use crate::error::{Iso9660Error, Result};
use crate::file::source::{io_error, HostFile};
use std::path::Path;
use std::string::String;
use std::vec::Vec;

/// Copy the contents of `path` into `parent`, recursing into subdirectories
///
/// File names are used as-is and must satisfy the tree's name policy.
/// Anything that is neither a regular file nor a directory is skipped.
pub fn import_dir(tree: &mut DirectoryTree, parent: NodeId, path: &Path) -> Result<()> {
    let mut entries = std::fs::read_dir(path)
        .map_err(io_error)?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(io_error)?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let name: String = entry
            .file_name()
            .into_string()
            .map_err(|raw| Iso9660Error::invalid_name(&raw.to_string_lossy(), "not valid UTF-8"))?;
        let file_type = entry.file_type().map_err(io_error)?;

        if file_type.is_dir() {
            let dir = tree.create_dir(parent, &name)?;
            import_dir(tree, dir, &entry.path())?;
        } else if file_type.is_file() {
            tree.create_file(parent, &name, HostFile::open(entry.path())?)?;
        } else {
            log::debug!("skipping {}: not a file or directory", entry.path().display());
        }
    }
    Ok(())
}

/// New tree holding the contents of `path`
pub fn tree_from_dir(path: &Path, policy: crate::utils::string::NamePolicy) -> Result<DirectoryTree> {
    let mut tree = DirectoryTree::with_policy(policy);
    let root = tree.root();
    import_dir(&mut tree, root, path)?;
    Ok(tree)
}
