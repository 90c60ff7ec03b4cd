//! Logical directory tree
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]; every node
//! stores its parent's index, so ".." navigation needs no back-pointers.
//! The same tree is what the decoder produces and what the encoder consumes.

use crate::boot::BootImageSpec;
use crate::directory::iterator::DirectoryIterator;
use crate::directory::record::DirectoryRecord;
use crate::error::{Iso9660Error, Result, Structure};
use crate::file::extent::Extent;
use crate::file::source::ByteSource;
use crate::store::SectorStore;
use crate::types::{BootPlatform, FileRecord, MAX_DIRECTORY_DEPTH, SECTOR_SIZE};
use crate::utils::datetime::DateTime7;
use crate::utils::string::{
    compare_file_identifiers, file_identifier_bytes, validate_directory_identifier,
    validate_file_identifier, NamePolicy,
};
use alloc::boxed::Box;
use alloc::collections::{BTreeSet, VecDeque};
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

/// Index of a node in a [`DirectoryTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Position in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// Where a file's bytes come from
pub enum FileContent {
    /// Caller-supplied bytes, used when encoding
    Source(Box<dyn ByteSource>),
    /// Extents of a decoded volume
    Stored(FileRecord),
}

impl FileContent {
    /// Length in bytes
    pub fn len(&self) -> u64 {
        match self {
            Self::Source(source) => source.len(),
            Self::Stored(record) => record.size,
        }
    }

    /// Is the file empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for FileContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(source) => f.debug_tuple("Source").field(&source.len()).finish(),
            Self::Stored(record) => f.debug_tuple("Stored").field(record).finish(),
        }
    }
}

/// Directory or file
#[derive(Debug)]
pub enum NodeKind {
    /// Directory with children in insertion (or on-disk) order
    Directory {
        /// Child nodes
        children: Vec<NodeId>,
    },
    /// Regular file
    File(FileContent),
}

/// Tree node
#[derive(Debug)]
pub struct Node {
    name: String,
    parent: NodeId,
    recorded: DateTime7,
    hidden: bool,
    extent: Option<Extent>,
    kind: NodeKind,
}

impl Node {
    /// Identifier without version suffix ("" for the root)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Recording timestamp written to the node's directory record
    pub fn recorded(&self) -> DateTime7 {
        self.recorded
    }

    /// Hidden (existence) flag
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Is this a directory?
    pub fn is_directory(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }

    /// First extent on a decoded volume
    pub fn extent(&self) -> Option<Extent> {
        self.extent
    }

    /// Directory or file payload
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }
}

/// Arena-backed directory hierarchy
#[derive(Debug)]
pub struct DirectoryTree {
    nodes: Vec<Node>,
    policy: NamePolicy,
    boot_images: Vec<BootImageSpec>,
}

impl Default for DirectoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryTree {
    /// Empty tree with the default (level 1) name policy
    pub fn new() -> Self {
        Self::with_policy(NamePolicy::default())
    }

    /// Empty tree validating names with `policy`
    pub fn with_policy(policy: NamePolicy) -> Self {
        let root = Node {
            name: String::new(),
            parent: NodeId(0),
            recorded: DateTime7::default(),
            hidden: false,
            extent: None,
            kind: NodeKind::Directory {
                children: Vec::new(),
            },
        };
        Self {
            nodes: vec![root],
            policy,
            boot_images: Vec::new(),
        }
    }

    /// Root directory
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Active name policy
    pub fn policy(&self) -> NamePolicy {
        self.policy
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds its root
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Node by id, if it belongs to this tree
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Node by id
    ///
    /// Panics when `id` was not handed out by this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(Iso9660Error::NotFound)
    }

    /// Parent directory; `None` for the root
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        if id == self.root() {
            return None;
        }
        self.get(id).map(|n| n.parent)
    }

    /// Children in insertion order (empty for files)
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.get(id).map(|n| &n.kind) {
            Some(NodeKind::Directory { children }) => children,
            _ => &[],
        }
    }

    /// Depth below the root (root = 0)
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// File payload, `None` for directories
    pub fn file_content(&self, id: NodeId) -> Option<&FileContent> {
        match self.get(id).map(|n| &n.kind) {
            Some(NodeKind::File(content)) => Some(content),
            _ => None,
        }
    }

    /// File length in bytes (0 for directories)
    pub fn file_len(&self, id: NodeId) -> u64 {
        self.file_content(id).map_or(0, FileContent::len)
    }

    /// Create a subdirectory of `parent`
    pub fn create_dir(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        validate_directory_identifier(name, self.policy)?;
        // Root is level 1 of at most 8
        if self.depth(parent) + 2 > MAX_DIRECTORY_DEPTH {
            return Err(Iso9660Error::PathTooLong);
        }
        self.insert(
            parent,
            name,
            NodeKind::Directory {
                children: Vec::new(),
            },
        )
    }

    /// Create a file in `parent` backed by `source`
    pub fn create_file(
        &mut self,
        parent: NodeId,
        name: &str,
        source: impl ByteSource + 'static,
    ) -> Result<NodeId> {
        validate_file_identifier(name, self.policy)?;
        self.insert(parent, name, NodeKind::File(FileContent::Source(Box::new(source))))
    }

    fn insert(&mut self, parent: NodeId, name: &str, kind: NodeKind) -> Result<NodeId> {
        if !self.get(parent).ok_or(Iso9660Error::NotFound)?.is_directory() {
            return Err(Iso9660Error::NotADirectory);
        }
        let key = match kind {
            NodeKind::Directory { .. } => name.as_bytes().to_vec(),
            NodeKind::File(_) => file_identifier_bytes(name, false),
        };
        let taken = self
            .children(parent)
            .iter()
            .any(|&c| self.node(c).name == name || self.identifier_is(c, &key));
        if taken {
            return Err(Iso9660Error::invalid_name(name, "duplicate name in directory"));
        }
        Ok(self.push(parent, String::from(name), DateTime7::default(), false, None, kind))
    }

    fn push(
        &mut self,
        parent: NodeId,
        name: String,
        recorded: DateTime7,
        hidden: bool,
        extent: Option<Extent>,
        kind: NodeKind,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name,
            parent,
            recorded,
            hidden,
            extent,
            kind,
        });
        if let NodeKind::Directory { children } = &mut self.nodes[parent.0].kind {
            children.push(id);
        }
        id
    }

    /// Set a node's recording timestamp
    pub fn set_recorded(&mut self, id: NodeId, recorded: DateTime7) -> Result<()> {
        self.node_mut(id)?.recorded = recorded;
        Ok(())
    }

    /// Set a node's hidden flag
    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) -> Result<()> {
        self.node_mut(id)?.hidden = hidden;
        Ok(())
    }

    /// Replace a file's content with caller-supplied bytes
    pub fn set_source(&mut self, id: NodeId, source: impl ByteSource + 'static) -> Result<()> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::File(content) => {
                *content = FileContent::Source(Box::new(source));
                Ok(())
            }
            NodeKind::Directory { .. } => Err(Iso9660Error::NotAFile),
        }
    }

    /// Mark `file` as an El Torito boot image for `platform`
    ///
    /// The returned entry can be adjusted (media type, load segment, ...).
    pub fn attach_boot_image(
        &mut self,
        file: NodeId,
        platform: BootPlatform,
    ) -> Result<&mut BootImageSpec> {
        if self.file_content(file).is_none() {
            return Err(Iso9660Error::InvalidBootImage("boot image must be a file"));
        }
        if self.is_boot_image(file) {
            return Err(Iso9660Error::InvalidBootImage("file is already a boot image"));
        }
        self.boot_images.push(BootImageSpec::new(file, platform));
        let index = self.boot_images.len() - 1;
        Ok(&mut self.boot_images[index])
    }

    pub(crate) fn link_boot_image(&mut self, spec: BootImageSpec) {
        if !self.is_boot_image(spec.file) {
            self.boot_images.push(spec);
        }
    }

    /// Boot images in attachment order
    pub fn boot_images(&self) -> &[BootImageSpec] {
        &self.boot_images
    }

    /// Is `id` attached as a boot image
    pub fn is_boot_image(&self, id: NodeId) -> bool {
        self.boot_images.iter().any(|b| b.file == id)
    }

    /// Child of `dir` named exactly `name`
    pub fn child(&self, dir: NodeId, name: &str) -> Option<NodeId> {
        self.children(dir)
            .iter()
            .copied()
            .find(|&c| self.node(c).name == name)
    }

    /// Resolve an absolute path ("/", "/SUB/B.TXT")
    pub fn find(&self, path: &str) -> Option<NodeId> {
        path.split('/')
            .filter(|c| !c.is_empty())
            .try_fold(self.root(), |dir, component| self.child(dir, component))
    }

    /// Absolute path of a node
    pub fn path(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            parts.push(self.node(current).name());
            current = parent;
        }
        if parts.is_empty() {
            return String::from("/");
        }
        let mut path = String::new();
        for part in parts.iter().rev() {
            path.push('/');
            path.push_str(part);
        }
        path
    }

    /// Pre-order walk from the root, children in identifier order
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            tree: self,
            stack: vec![self.root()],
        }
    }

    /// Does `id` carry the on-disk identifier `key` (no version suffix)
    fn identifier_is(&self, id: NodeId, key: &[u8]) -> bool {
        let node = self.node(id);
        let name = node.name.as_bytes();
        if node.is_directory() || name.contains(&b'.') {
            name == key
        } else {
            key.len() == name.len() + 1 && key.starts_with(name) && key.ends_with(b".")
        }
    }

    /// On-disk identifier used for ordering
    pub(crate) fn sort_key(&self, id: NodeId) -> Vec<u8> {
        let node = self.node(id);
        if node.is_directory() {
            node.name.as_bytes().to_vec()
        } else {
            file_identifier_bytes(&node.name, false)
        }
    }

    /// Children sorted by identifier (ECMA-119 9.3)
    pub fn sorted_children(&self, dir: NodeId) -> Vec<NodeId> {
        let mut children = self.children(dir).to_vec();
        children.sort_by(|&a, &b| compare_file_identifiers(&self.sort_key(a), &self.sort_key(b)));
        children
    }

    /// Directories breadth-first, siblings in identifier order
    ///
    /// This is the path table numbering: the root is number 1.
    pub fn directories_breadth_first(&self) -> Vec<NodeId> {
        let mut order = vec![self.root()];
        let mut next = 0;
        while next < order.len() {
            let dir = order[next];
            next += 1;
            order.extend(
                self.sorted_children(dir)
                    .into_iter()
                    .filter(|&c| self.node(c).is_directory()),
            );
        }
        order
    }

    /// Read a file's bytes, from its source or from `store`
    pub fn read_file<S: SectorStore + ?Sized>(&self, store: &mut S, id: NodeId) -> Result<Vec<u8>> {
        match self.file_content(id) {
            Some(FileContent::Source(source)) => {
                let len = usize::try_from(source.len()).map_err(|_| Iso9660Error::ExtentOutOfBounds)?;
                let mut out = vec![0u8; len];
                source.read_at(0, &mut out)?;
                Ok(out)
            }
            Some(FileContent::Stored(record)) => crate::file::read_file_vec(store, record),
            None => Err(Iso9660Error::NotAFile),
        }
    }

    /// Turn every decoded file into an in-memory source so the tree can be
    /// encoded again
    pub fn load_file_data<S: SectorStore + ?Sized>(&mut self, store: &mut S) -> Result<()> {
        for index in 0..self.nodes.len() {
            let data = match &self.nodes[index].kind {
                NodeKind::File(FileContent::Stored(record)) => {
                    crate::file::read_file_vec(store, record)?
                }
                _ => continue,
            };
            self.nodes[index].kind = NodeKind::File(FileContent::Source(Box::new(data)));
        }
        Ok(())
    }

    /// Decode the hierarchy below `root`
    ///
    /// Fails on the first malformed record; a directory extent reached twice
    /// is reported as a cycle.
    pub fn parse<S: SectorStore + ?Sized>(
        store: &mut S,
        root: &DirectoryRecord,
        policy: NamePolicy,
    ) -> Result<Self> {
        let mut tree = Self::with_policy(policy);
        tree.nodes[0].recorded = root.recorded;
        tree.nodes[0].extent = Some(root.extent());

        let mut visited = BTreeSet::new();
        visited.insert(root.extent_lba);

        let mut queue = VecDeque::new();
        queue.push_back((tree.root(), root.extent(), root.extent_lba));

        while let Some((dir, extent, parent_lba)) = queue.pop_front() {
            let records = DirectoryIterator::new(store, extent).collect::<Result<Vec<_>>>()?;
            let base = extent.lba as u64 * SECTOR_SIZE as u64;
            check_dot_records(&records, extent.lba, parent_lba, base)?;
            log::trace!("directory {} at LBA {}: {} records", tree.path(dir), extent.lba, records.len());

            let mut chain: Option<(DirectoryRecord, Vec<Extent>)> = None;
            for record in records.into_iter().skip(2) {
                if record.is_self() || record.is_parent() {
                    return Err(Iso9660Error::format(
                        Structure::DirectoryRecord,
                        base,
                        "'.' or '..' record after the first two",
                    ));
                }

                if record.is_directory() {
                    if chain.is_some() {
                        return Err(Iso9660Error::format(
                            Structure::DirectoryRecord,
                            base,
                            "multi-extent file interrupted",
                        ));
                    }
                    if !visited.insert(record.extent_lba) {
                        return Err(Iso9660Error::format(
                            Structure::DirectoryRecord,
                            record.extent_lba as u64 * SECTOR_SIZE as u64,
                            "directory extent referenced twice",
                        ));
                    }
                    let child_extent = record.extent();
                    let child = tree.push(
                        dir,
                        record.name(),
                        record.recorded,
                        record.flags.hidden,
                        Some(child_extent),
                        NodeKind::Directory {
                            children: Vec::new(),
                        },
                    );
                    queue.push_back((child, child_extent, extent.lba));
                    continue;
                }

                let mut extents = match chain.take() {
                    Some((first, extents)) if first.identifier == record.identifier => extents,
                    Some(_) => {
                        return Err(Iso9660Error::format(
                            Structure::DirectoryRecord,
                            base,
                            "multi-extent file interrupted",
                        ));
                    }
                    None => Vec::new(),
                };
                extents.push(record.extent());

                if record.flags.not_final {
                    chain = Some((record, extents));
                    continue;
                }

                let file = FileRecord {
                    name: record.name(),
                    size: extents.iter().map(|e| e.length as u64).sum(),
                    extents,
                    flags: record.flags,
                    recorded: record.recorded,
                    file_unit_size: record.file_unit_size,
                    interleave_gap: record.interleave_gap,
                };
                let first = file.extents.first().copied();
                tree.push(
                    dir,
                    file.name.clone(),
                    record.recorded,
                    record.flags.hidden,
                    first,
                    NodeKind::File(FileContent::Stored(file)),
                );
            }

            if chain.is_some() {
                return Err(Iso9660Error::format(
                    Structure::DirectoryRecord,
                    base,
                    "multi-extent file has no final record",
                ));
            }
        }

        log::debug!("decoded directory tree: {} nodes", tree.nodes.len());
        Ok(tree)
    }
}

fn check_dot_records(
    records: &[DirectoryRecord],
    self_lba: u32,
    parent_lba: u32,
    base: u64,
) -> Result<()> {
    match records.first() {
        Some(r) if r.is_self() && r.extent_lba == self_lba => {}
        _ => {
            return Err(Iso9660Error::format(
                Structure::DirectoryRecord,
                base,
                "first record is not '.' for this directory",
            ))
        }
    }
    match records.get(1) {
        Some(r) if r.is_parent() && r.extent_lba == parent_lba => Ok(()),
        _ => Err(Iso9660Error::format(
            Structure::DirectoryRecord,
            base,
            "second record is not '..' for the parent directory",
        )),
    }
}

/// Pre-order iterator over a [`DirectoryTree`]
pub struct Walk<'a> {
    tree: &'a DirectoryTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let children = self.tree.sorted_children(id);
        self.stack.extend(children.into_iter().rev());
        Some(id)
    }
}
