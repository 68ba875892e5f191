use std::io::Write;

use log::{info, warn};

use crate::error::Error;
use crate::filesystem::Filesystem;
use crate::filetypes::{find_match, DirectoryWalker, Entry, DEFAULT_MAX_DEPTH};
use crate::identifier::check_length;
use crate::structs::FileType;

#[derive(Debug, Clone)]
pub struct Options {
    /// Data identifier to look for, `None` only prints the tree
    pub identifier: Option<Vec<u8>>,
    /// Deepest directory nesting descended into
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            identifier: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Live path owning a block that starts with the identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub path: String,
    pub inode: u32,
    pub block: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub entries: usize,
    pub directories: usize,
    pub files: usize,
    /// Local failures that cut a subtree or skipped a file
    pub diagnostics: usize,
    pub found: Option<Match>,
}

/// Indented tree line for one entry
pub fn tree_line(entry: &Entry) -> String {
    let marker = if entry.file_type == FileType::Directory {
        "/"
    } else {
        ""
    };
    format!("{} {}{marker}", "-".repeat(entry.depth + 1), entry.name)
}

fn match_entry(fs: &mut Filesystem, entry: &Entry, pattern: &[u8]) -> Result<Option<u32>, Error> {
    let inode = fs.load_inode(entry.inode)?;
    if !inode.is_regular_file() {
        return Ok(None);
    }
    find_match(fs, &inode, pattern)
}

/// Walk the whole tree, printing it to `out`, and report the first live path
/// owning a block that starts with the identifier.
pub fn inspect<W: Write>(fs: &mut Filesystem, options: &Options, out: &mut W) -> Result<Summary, Error> {
    if let Some(pattern) = &options.identifier {
        check_length(pattern, fs.block_size())?;
    }
    let mut summary = Summary::default();
    let mut walker = DirectoryWalker::new(fs, options.max_depth)?;
    while let Some(item) = walker.next() {
        let entry = match item {
            Ok(entry) => entry,
            Err(_) => {
                summary.diagnostics += 1;
                continue;
            }
        };
        writeln!(out, "{}", tree_line(&entry))?;
        summary.entries += 1;
        match entry.file_type {
            FileType::Directory => summary.directories += 1,
            FileType::RegularFile => summary.files += 1,
            _ => {}
        }
        let Some(pattern) = &options.identifier else {
            continue;
        };
        if entry.file_type != FileType::RegularFile || summary.found.is_some() {
            continue;
        }
        match match_entry(walker.filesystem(), &entry, pattern) {
            Ok(Some(block)) => {
                info!("Identifier found in {} at block {block}", entry.path);
                summary.found = Some(Match {
                    path: entry.path,
                    inode: entry.inode,
                    block,
                });
            }
            Ok(None) => {}
            Err(e) if !e.is_local() => return Err(e),
            Err(e) => {
                warn!("Cannot search {}: {e}", entry.path);
                summary.diagnostics += 1;
            }
        }
    }
    if let Some(found) = &summary.found {
        writeln!(
            out,
            "identifier found in {} (inode {}, block {})",
            found.path, found.inode, found.block
        )?;
    } else if options.identifier.is_some() {
        info!("Identifier not found in any live file");
    }
    info!(
        "Walked {} entries ({} directories, {} files), {} diagnostics",
        summary.entries, summary.directories, summary.files, summary.diagnostics
    );
    Ok(summary)
}
