//! Saving and restoring a [`DockContainer`] layout.
//!
//! A layout is first captured as a [`LayoutSnapshot`], which only refers to contents by their
//! unique name. The snapshot has a compact big-endian binary form:
//!
//! ```text
//! magic: u32 = 0x0000_1337
//! version: u32 = 1
//! floating_count: i32, floating_count * (content_name: string, geometry: bytes)
//! node
//!
//! node := kind: i32
//!   0: empty layout (or a skipped child)
//!   1: orientation: i32 (1 = horizontal, 2 = vertical), child_count: i32,
//!      child_count * size: i32, child_count * node
//!   2: active_index: i32 (-1 = none), content_count: i32, content_count * content_name: string
//! ```
//!
//! `string` is a `u32` byte length followed by UTF-16BE code units, `bytes` a `u32` length
//! followed by raw bytes, both with `0xFFFF_FFFF` meaning null. Floating geometry is four
//! big-endian `f32`: `min.x, min.y, max.x, max.y`.
//!
//! With the `serde` feature the snapshot can also be stored in any serde format (e.g. RON).

use egui::{Pos2, Rect};

use super::section::Section;
use super::stream::{DataReader, DataWriter};
use super::tree::{Node, Splitter, SplitterTree};
use super::types::{ContentPayload, FloatingPanel, NodeId, Orientation};
use super::DockContainer;
use crate::registry::{ContentRef, ContentResolver};

pub const LAYOUT_MAGIC: u32 = 0x0000_1337;
pub const LAYOUT_VERSION: u32 = 1;

/// Deepest splitter nesting accepted when decoding or restoring.
const MAX_DEPTH: usize = 128;

const KIND_EMPTY: i32 = 0;
const KIND_SPLITTER: i32 = 1;
const KIND_SECTION: i32 = 2;

const GEOMETRY_LEN: usize = 16;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutPersistenceError {
    BadMagic { found: u32 },
    UnsupportedVersion { found: u32, expected: u32 },
    Truncated { offset: usize, needed: usize },
    NegativeCount { offset: usize, count: i32 },
    UnknownNodeKind { offset: usize, kind: i32 },
    InvalidOrientation { offset: usize, value: i32 },
    InvalidString { offset: usize },
    SectionOutsideSplitter,
    TooDeep { limit: usize },
}

impl std::fmt::Display for LayoutPersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadMagic { found } => {
                write!(f, "not a saved layout: magic {found:#010x} (expected {LAYOUT_MAGIC:#010x})")
            }
            Self::UnsupportedVersion { found, expected } => {
                write!(f, "unsupported layout version: {found} (expected {expected})")
            }
            Self::Truncated { offset, needed } => {
                write!(f, "layout data truncated at byte {offset}: {needed} more bytes needed")
            }
            Self::NegativeCount { offset, count } => {
                write!(f, "negative element count {count} at byte {offset}")
            }
            Self::UnknownNodeKind { offset, kind } => {
                write!(f, "unknown layout node kind {kind} at byte {offset}")
            }
            Self::InvalidOrientation { offset, value } => {
                write!(f, "invalid splitter orientation {value} at byte {offset}")
            }
            Self::InvalidString { offset } => write!(f, "invalid UTF-16 string at byte {offset}"),
            Self::SectionOutsideSplitter => write!(f, "layout root must be a splitter"),
            Self::TooDeep { limit } => write!(f, "layout nested deeper than {limit} splitters"),
        }
    }
}

impl std::error::Error for LayoutPersistenceError {}

/// A floating panel, by content name.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FloatingSnapshot {
    pub content: String,

    /// `None` restores with the default floating geometry.
    pub geometry: Option<Rect>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeSnapshot {
    Splitter {
        orientation: Orientation,
        sizes: Vec<i32>,
        children: Vec<NodeSnapshot>,
    },
    Section {
        active: Option<usize>,
        contents: Vec<String>,
    },
}

/// Serializable description of a whole layout. Holds no live state.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutSnapshot {
    pub floating: Vec<FloatingSnapshot>,

    /// `None` for an empty layout. Otherwise a [`NodeSnapshot::Splitter`].
    pub root: Option<NodeSnapshot>,
}

/// What a restore could not honor.
#[derive(Clone, Debug, Default)]
pub struct RestoreReport {
    /// Names in the saved layout that did not resolve, or that were placed twice.
    pub skipped: Vec<String>,

    /// Contents of the previous layout that the restored one does not place.
    pub orphaned: Vec<ContentRef>,
}

impl RestoreReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.orphaned.is_empty()
    }
}

impl LayoutSnapshot {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = DataWriter::new();
        out.write_u32(LAYOUT_MAGIC);
        out.write_u32(LAYOUT_VERSION);

        out.write_count(self.floating.len());
        for floating in &self.floating {
            out.write_string(&floating.content);
            let geometry = floating.geometry.map(encode_geometry);
            out.write_bytes(geometry.as_ref().map(|bytes| bytes.as_slice()));
        }

        match &self.root {
            None => out.write_i32(KIND_EMPTY),
            Some(section @ NodeSnapshot::Section { .. }) => {
                // The wire root is always a splitter.
                out.write_i32(KIND_SPLITTER);
                out.write_i32(Orientation::default().to_wire());
                out.write_count(1);
                out.write_i32(0);
                encode_node(&mut out, section);
            }
            Some(root) => encode_node(&mut out, root),
        }
        out.finish()
    }

    /// Parse a blob produced by [`Self::encode`]. Trailing bytes are ignored.
    ///
    /// # Errors
    /// Anything that is not a well-formed layout of the supported version.
    pub fn decode(bytes: &[u8]) -> Result<Self, LayoutPersistenceError> {
        let mut input = DataReader::new(bytes);

        let magic = input.read_u32()?;
        if magic != LAYOUT_MAGIC {
            return Err(LayoutPersistenceError::BadMagic { found: magic });
        }
        let version = input.read_u32()?;
        if version != LAYOUT_VERSION {
            return Err(LayoutPersistenceError::UnsupportedVersion {
                found: version,
                expected: LAYOUT_VERSION,
            });
        }

        // Each entry carries at least two length prefixes.
        let count = input.read_count(8)?;
        let mut floating = Vec::with_capacity(count);
        for _ in 0..count {
            let content = input.read_string()?;
            let geometry = input.read_bytes()?.and_then(decode_geometry);
            floating.push(FloatingSnapshot { content, geometry });
        }

        let root = match decode_node(&mut input, 0)? {
            Some(NodeSnapshot::Section { .. }) => {
                return Err(LayoutPersistenceError::SectionOutsideSplitter);
            }
            root => root,
        };

        if input.remaining() > 0 {
            log::debug!("ignoring {} trailing bytes after saved layout", input.remaining());
        }
        Ok(Self { floating, root })
    }

    /// Unique names of every content the snapshot places, floating ones first.
    pub fn content_names(&self) -> Vec<&str> {
        fn walk<'a>(node: &'a NodeSnapshot, out: &mut Vec<&'a str>) {
            match node {
                NodeSnapshot::Splitter { children, .. } => {
                    for child in children {
                        walk(child, out);
                    }
                }
                NodeSnapshot::Section { contents, .. } => {
                    out.extend(contents.iter().map(String::as_str));
                }
            }
        }

        let mut out: Vec<&str> = self.floating.iter().map(|f| f.content.as_str()).collect();
        if let Some(root) = &self.root {
            walk(root, &mut out);
        }
        out
    }
}

fn encode_node(out: &mut DataWriter, node: &NodeSnapshot) {
    match node {
        NodeSnapshot::Splitter {
            orientation,
            sizes,
            children,
        } => {
            out.write_i32(KIND_SPLITTER);
            out.write_i32(orientation.to_wire());
            out.write_count(children.len());
            for index in 0..children.len() {
                out.write_i32(sizes.get(index).copied().unwrap_or(0));
            }
            for child in children {
                encode_node(out, child);
            }
        }
        NodeSnapshot::Section { active, contents } => {
            out.write_i32(KIND_SECTION);
            out.write_i32(active.and_then(|index| i32::try_from(index).ok()).unwrap_or(-1));
            out.write_count(contents.len());
            for name in contents {
                out.write_string(name);
            }
        }
    }
}

/// `Ok(None)` for a null node.
fn decode_node(
    input: &mut DataReader<'_>,
    depth: usize,
) -> Result<Option<NodeSnapshot>, LayoutPersistenceError> {
    if depth > MAX_DEPTH {
        return Err(LayoutPersistenceError::TooDeep { limit: MAX_DEPTH });
    }

    let offset = input.offset();
    match input.read_i32()? {
        KIND_EMPTY => Ok(None),
        KIND_SPLITTER => {
            let offset = input.offset();
            let value = input.read_i32()?;
            let orientation = Orientation::from_wire(value)
                .ok_or(LayoutPersistenceError::InvalidOrientation { offset, value })?;

            // A size and at least a node kind per child.
            let count = input.read_count(8)?;
            let raw_sizes = (0..count)
                .map(|_| input.read_i32())
                .collect::<Result<Vec<_>, _>>()?;

            let mut sizes = Vec::with_capacity(count);
            let mut children = Vec::with_capacity(count);
            for size in raw_sizes {
                if let Some(child) = decode_node(input, depth + 1)? {
                    sizes.push(size.max(0));
                    children.push(child);
                }
            }
            Ok(Some(NodeSnapshot::Splitter {
                orientation,
                sizes,
                children,
            }))
        }
        KIND_SECTION => {
            let active = input.read_i32()?;
            let count = input.read_count(4)?;
            let contents = (0..count)
                .map(|_| input.read_string())
                .collect::<Result<Vec<_>, _>>()?;
            let active = usize::try_from(active).ok().filter(|&index| index < count);
            Ok(Some(NodeSnapshot::Section { active, contents }))
        }
        kind => Err(LayoutPersistenceError::UnknownNodeKind { offset, kind }),
    }
}

fn encode_geometry(rect: Rect) -> [u8; GEOMETRY_LEN] {
    let mut out = [0; GEOMETRY_LEN];
    let values = [rect.min.x, rect.min.y, rect.max.x, rect.max.y];
    for (chunk, value) in out.chunks_exact_mut(4).zip(values) {
        chunk.copy_from_slice(&value.to_be_bytes());
    }
    out
}

fn decode_geometry(bytes: &[u8]) -> Option<Rect> {
    if bytes.len() != GEOMETRY_LEN {
        return None;
    }
    let mut values = bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    let mut next = || values.next().filter(|value| value.is_finite());
    let min = Pos2::new(next()?, next()?);
    let max = Pos2::new(next()?, next()?);
    Some(Rect::from_min_max(min, max))
}

// ----------------------------------------------------------------------------

impl DockContainer {
    /// Capture the current layout by content name.
    pub fn snapshot(&self) -> LayoutSnapshot {
        let floating = self
            .floating
            .iter()
            .map(|panel| FloatingSnapshot {
                content: panel.content().unique_name().to_owned(),
                geometry: Some(panel.geometry),
            })
            .collect();
        let root = self
            .tree
            .root()
            .and_then(|root| snapshot_node(&self.tree, root));
        LayoutSnapshot { floating, root }
    }

    /// Serialize the current layout. See the [module docs](self) for the format.
    pub fn save_state(&self) -> Vec<u8> {
        self.snapshot().encode()
    }

    /// Replace the current layout with one produced by [`Self::save_state`].
    ///
    /// Names are looked up through `resolver`; unknown ones are skipped. Splitters and sections
    /// come back with their saved nesting, except for sections none of whose contents resolved.
    /// The new layout is built off to the side and swapped in only when complete.
    ///
    /// # Errors
    /// On malformed data the current layout is left untouched.
    pub fn restore_state<R: ContentResolver + ?Sized>(
        &mut self,
        bytes: &[u8],
        resolver: &R,
    ) -> Result<RestoreReport, LayoutPersistenceError> {
        let snapshot = LayoutSnapshot::decode(bytes)?;
        self.restore_snapshot(&snapshot, resolver)
    }

    /// Like [`Self::restore_state`], from an already decoded snapshot.
    ///
    /// # Errors
    /// A snapshot whose root is a section or that nests too deep; the current layout is left
    /// untouched.
    pub fn restore_snapshot<R: ContentResolver + ?Sized>(
        &mut self,
        snapshot: &LayoutSnapshot,
        resolver: &R,
    ) -> Result<RestoreReport, LayoutPersistenceError> {
        let previous: Vec<ContentPayload> = self.payloads().cloned().collect();
        let mut restorer = Restorer {
            resolver,
            previous: previous
                .iter()
                .map(|payload| (payload.uid(), payload.visible))
                .collect(),
            placed: Default::default(),
            report: RestoreReport::default(),
            tree: SplitterTree::new(),
        };

        // Floating entries first: a content saved both floating and docked stays floating.
        let floating: Vec<(ContentPayload, Option<Rect>)> = snapshot
            .floating
            .iter()
            .filter_map(|entry| {
                let payload = restorer.resolve(&entry.content, "floating")?;
                Some((payload, entry.geometry))
            })
            .collect();

        match &snapshot.root {
            None => {}
            Some(NodeSnapshot::Section { .. }) => {
                return Err(LayoutPersistenceError::SectionOutsideSplitter);
            }
            Some(root) => {
                let root = restorer.build(root, 0)?;
                restorer.tree.set_root(root);
            }
        }

        let Restorer {
            placed,
            mut report,
            tree,
            ..
        } = restorer;

        let panels: Vec<FloatingPanel> = floating
            .into_iter()
            .map(|(payload, geometry)| FloatingPanel {
                id: self.allocate_floating_id(),
                payload,
                geometry: geometry.unwrap_or_else(|| self.default_floating_geometry()),
            })
            .collect();

        self.tree = tree;
        self.floating = panels;

        report.orphaned = previous
            .into_iter()
            .filter(|payload| !placed.contains(&payload.uid()))
            .map(|payload| payload.content)
            .collect();

        log::debug!(
            "restored layout: {} sections, {} floating panels, {} skipped, {} orphaned",
            self.tree.sections().len(),
            self.floating.len(),
            report.skipped.len(),
            report.orphaned.len()
        );
        Ok(report)
    }
}

fn snapshot_node(tree: &SplitterTree, id: NodeId) -> Option<NodeSnapshot> {
    match tree.get(id)? {
        Node::Splitter(splitter) => {
            let (sizes, children) = splitter
                .children()
                .iter()
                .zip(splitter.sizes())
                .filter_map(|(&child, &size)| Some((size, snapshot_node(tree, child)?)))
                .unzip();
            Some(NodeSnapshot::Splitter {
                orientation: splitter.orientation(),
                sizes,
                children,
            })
        }
        Node::Section(section) => Some(NodeSnapshot::Section {
            active: section.active_index(),
            contents: section
                .contents()
                .map(|content| content.unique_name().to_owned())
                .collect(),
        }),
    }
}

/// Builds a restored tree without touching the live container.
struct Restorer<'a, R: ?Sized> {
    resolver: &'a R,

    /// Visibility of each content in the layout being replaced.
    previous: ahash::HashMap<u32, bool>,
    placed: ahash::HashSet<u32>,
    report: RestoreReport,
    tree: SplitterTree,
}

impl<R: ContentResolver + ?Sized> Restorer<'_, R> {
    fn resolve(&mut self, name: &str, place: &str) -> Option<ContentPayload> {
        let Some(content) = self.resolver.resolve(name) else {
            log::warn!("cannot find {place} content {name:?}; skipping it");
            self.report.skipped.push(name.to_owned());
            return None;
        };
        if !self.placed.insert(content.uid()) {
            log::warn!("content {name:?} is placed more than once in the saved layout; skipping");
            self.report.skipped.push(name.to_owned());
            return None;
        }
        let visible = self.previous.get(&content.uid()).copied().unwrap_or(true);
        Some(ContentPayload { content, visible })
    }

    /// Rebuild `node` as saved. Sections whose names all failed to resolve are left out, and so
    /// are splitters left without children; everything else keeps its saved shape.
    fn build(
        &mut self,
        node: &NodeSnapshot,
        depth: usize,
    ) -> Result<Option<NodeId>, LayoutPersistenceError> {
        if depth > MAX_DEPTH {
            return Err(LayoutPersistenceError::TooDeep { limit: MAX_DEPTH });
        }

        match node {
            NodeSnapshot::Splitter {
                orientation,
                sizes,
                children,
            } => {
                let mut slots = Vec::with_capacity(children.len());
                for (index, child) in children.iter().enumerate() {
                    let Some(child) = self.build(child, depth + 1)? else {
                        continue;
                    };
                    let size = sizes.get(index).copied().unwrap_or(0).max(0);
                    slots.push((child, size));
                }
                if slots.is_empty() {
                    return Ok(None);
                }
                let splitter = Splitter::from_slots(*orientation, slots);
                Ok(Some(self.tree.insert(Node::Splitter(splitter))))
            }
            NodeSnapshot::Section { active, contents } => {
                let mut section = Section::new();
                let mut active_uid = None;
                for (index, name) in contents.iter().enumerate() {
                    let Some(payload) = self.resolve(name, "section") else {
                        continue;
                    };
                    if *active == Some(index) {
                        active_uid = Some(payload.uid());
                    }
                    section.add_content(payload, false);
                }
                if section.is_empty() && !contents.is_empty() {
                    return Ok(None);
                }
                if let Some(index) = active_uid.and_then(|uid| section.position(uid)) {
                    section.set_active_index(index);
                }
                Ok(Some(self.tree.insert_section(section)))
            }
        }
    }
}
