// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chunk planner: partitions a profiled source tree into bounded copy jobs.
//!
//! Smart mode walks the directory tree depth-first and emits the largest
//! subtrees that fit the byte/file limits; a subtree that still exceeds the
//! limits when the depth budget is exhausted is emitted whole (the engine
//! handles it as one large job — never split below the limits). When a
//! directory is exploded into per-child chunks, its own loose files become
//! one non-recursive chunk.
//!
//! Flat mode emits one chunk per directory at exactly `max_depth`, with
//! loose-file chunks above that level so the mirror stays complete.
//!
//! Chunks are emitted in deterministic pre-order (children sorted by name),
//! so planning the same tree twice yields identical ids, order and bounds.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use vmir_adapters::ListEntry;
use vmir_core::{Chunk, ChunkId, ChunkLimits, ScanMode};

/// Monotonic chunk-id allocator, reset once per run.
#[derive(Debug, Default)]
pub struct ChunkIdGen {
    next: u64,
}

impl ChunkIdGen {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    pub fn next_id(&mut self) -> ChunkId {
        self.next += 1;
        ChunkId(self.next)
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }
}

#[derive(Default)]
struct DirNode {
    children: BTreeMap<String, DirNode>,
    direct_bytes: u64,
    direct_files: u64,
    total_bytes: u64,
    total_files: u64,
}

impl DirNode {
    fn ensure_child_path(&mut self, components: &[String]) -> &mut DirNode {
        let mut node = self;
        for name in components {
            node = node.children.entry(name.clone()).or_default();
        }
        node
    }

    fn compute_totals(&mut self) {
        self.total_bytes = self.direct_bytes;
        self.total_files = self.direct_files;
        for child in self.children.values_mut() {
            child.compute_totals();
            self.total_bytes = self.total_bytes.saturating_add(child.total_bytes);
            self.total_files = self.total_files.saturating_add(child.total_files);
        }
    }
}

fn path_components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(os) => Some(os.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

fn build_tree(entries: &[ListEntry]) -> DirNode {
    let mut root = DirNode::default();
    for entry in entries {
        let components = path_components(&entry.path);
        if entry.is_dir {
            root.ensure_child_path(&components);
        } else {
            let Some((_, parents)) = components.split_last() else {
                continue;
            };
            let node = root.ensure_child_path(parents);
            node.direct_bytes = node.direct_bytes.saturating_add(entry.size);
            node.direct_files += 1;
        }
    }
    root.compute_totals();
    root
}

struct PlanCtx<'a> {
    scan_root: &'a Path,
    dest_root: &'a Path,
    limits: &'a ChunkLimits,
    ids: &'a mut ChunkIdGen,
    chunks: Vec<Chunk>,
}

impl PlanCtx<'_> {
    fn emit(&mut self, rel: &Path, bytes: u64, files: u64, depth: u32, recursive: bool) {
        let source = join_rel(self.scan_root, rel);
        let destination = join_rel(self.dest_root, rel);
        self.chunks.push(Chunk::new(
            self.ids.next_id(),
            source,
            destination,
            bytes,
            files,
            depth,
            recursive,
        ));
    }
}

fn join_rel(root: &Path, rel: &Path) -> PathBuf {
    if rel.as_os_str().is_empty() {
        root.to_path_buf()
    } else {
        root.join(rel)
    }
}

/// Plan the chunk list for one profile.
///
/// `entries` are root-relative (as produced by the directory profiler);
/// destinations are the source paths rebased onto `dest_root`.
pub fn plan_chunks(
    entries: &[ListEntry],
    scan_root: &Path,
    dest_root: &Path,
    limits: &ChunkLimits,
    mode: ScanMode,
    ids: &mut ChunkIdGen,
) -> Vec<Chunk> {
    let root = build_tree(entries);
    let mut ctx = PlanCtx { scan_root, dest_root, limits, ids, chunks: Vec::new() };
    match mode {
        ScanMode::Smart => plan_smart(&root, &PathBuf::new(), 0, &mut ctx),
        ScanMode::Flat => plan_flat(&root, &PathBuf::new(), 0, limits.max_depth, &mut ctx),
    }
    ctx.chunks
}

fn plan_smart(node: &DirNode, rel: &Path, depth: u32, ctx: &mut PlanCtx<'_>) {
    // Fits, or out of depth budget: one chunk covers the whole subtree.
    // Oversize-at-max-depth lands here too, emitted whole rather than split.
    if ctx.limits.fits(node.total_bytes, node.total_files) || depth >= ctx.limits.max_depth {
        ctx.emit(rel, node.total_bytes, node.total_files, depth, true);
        return;
    }

    for (name, child) in &node.children {
        plan_smart(child, &rel.join(name), depth + 1, ctx);
    }

    // Loose files at an exploded level: one non-recursive chunk, emitted
    // after the subdirectory chunks.
    if node.direct_files > 0 {
        ctx.emit(rel, node.direct_bytes, node.direct_files, depth, false);
    }
}

fn plan_flat(node: &DirNode, rel: &Path, depth: u32, target: u32, ctx: &mut PlanCtx<'_>) {
    if depth == target {
        ctx.emit(rel, node.total_bytes, node.total_files, depth, true);
        return;
    }

    // A directory with no subdirectories can never reach the target depth;
    // emit it whole so its contents are still mirrored.
    if node.children.is_empty() {
        ctx.emit(rel, node.total_bytes, node.total_files, depth, true);
        return;
    }

    for (name, child) in &node.children {
        plan_flat(child, &rel.join(name), depth + 1, target, ctx);
    }

    if node.direct_files > 0 {
        ctx.emit(rel, node.direct_bytes, node.direct_files, depth, false);
    }
}

#[cfg(test)]
#[path = "planner_tests.rs"]
mod tests;
