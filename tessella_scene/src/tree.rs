// Copyright 2026 the Tessella Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, update cascade, picking, rendering.

use alloc::boxed::Box;
use alloc::vec::Vec;
use kurbo::{Affine, Point, Rect};
use smallvec::SmallVec;
use tessella_events::Event;

use crate::buffer::Buffer;
use crate::ctx::EventCtx;
use crate::drawable::Drawable;
use crate::types::{Cascade, ItemFlags, ItemId, Pick};
use crate::util::{has_area, transform_rect_bbox};

enum ItemKind {
    Group,
    Leaf(Box<dyn Drawable>),
}

struct Item {
    generation: u32,
    parent: Option<ItemId>,
    children: SmallVec<[ItemId; 4]>,
    /// Transform relative to the parent. Takes effect immediately for
    /// queries; world geometry catches up on the next update pass.
    transform: Affine,
    flags: ItemFlags,
    /// World-space bounding box as of the last update pass.
    bbox: Rect,
    kind: ItemKind,
}

impl Item {
    fn new(generation: u32, kind: ItemKind) -> Self {
        Self {
            generation,
            parent: None,
            children: SmallVec::new(),
            transform: Affine::IDENTITY,
            flags: ItemFlags::VISIBLE | ItemFlags::NEED_UPDATE,
            bbox: Rect::ZERO,
            kind,
        }
    }

    fn is_group(&self) -> bool {
        matches!(self.kind, ItemKind::Group)
    }
}

/// The scene tree.
///
/// Items live in an arena of slots with generational ids. The tree always
/// has a root group, created by [`Tree::new`]; every other item is inserted
/// under an existing group. Child order is z-order: later children paint on
/// top and win picks.
///
/// Geometry changes ([`Tree::set_transform`], [`Tree::request_update`]) only
/// set flags; the deferred [`Tree::update_world`] pass recomputes world
/// bounding boxes and reports damage. Queries that read cached world data
/// ([`Tree::world_bbox`], [`Tree::point_distance`], [`Tree::render`]) see
/// the state as of the last update pass.
pub struct Tree {
    /// slots
    items: Vec<Option<Item>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    root: ItemId,
}

impl core::fmt::Debug for Tree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.items.len();
        let alive = self.items.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Tree")
            .field("items_total", &total)
            .field("items_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("update_pending", &self.update_pending())
            .finish_non_exhaustive()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create a tree containing only the root group.
    pub fn new() -> Self {
        let mut tree = Self {
            items: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root: ItemId::new(0, 0),
        };
        tree.root = tree.alloc(Item::new(0, ItemKind::Group));
        tree
    }

    /// The root group.
    pub fn root(&self) -> ItemId {
        self.root
    }

    fn alloc(&mut self, mut item: Item) -> ItemId {
        if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            item.generation = generation;
            self.items[idx] = Some(item);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ItemId uses 32-bit indices by design."
            )]
            ItemId::new(idx as u32, generation)
        } else {
            let generation = 1_u32;
            item.generation = generation;
            self.items.push(Some(item));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ItemId uses 32-bit indices by design."
            )]
            ItemId::new((self.items.len() - 1) as u32, generation)
        }
    }

    /// Insert an empty group under `parent`.
    ///
    /// Returns `None` if `parent` is stale or a leaf.
    pub fn insert_group(&mut self, parent: ItemId) -> Option<ItemId> {
        self.insert(parent, ItemKind::Group)
    }

    /// Insert a drawable leaf under `parent`.
    ///
    /// Returns `None` if `parent` is stale or a leaf. The new item starts
    /// with an update pending, so its bounding box and first damage appear
    /// on the next update pass.
    pub fn insert_leaf(&mut self, parent: ItemId, item: Box<dyn Drawable>) -> Option<ItemId> {
        self.insert(parent, ItemKind::Leaf(item))
    }

    fn insert(&mut self, parent: ItemId, kind: ItemKind) -> Option<ItemId> {
        if !self.is_alive(parent) || !self.item(parent).is_group() {
            return None;
        }
        let id = self.alloc(Item::new(0, kind));
        self.item_mut(id).parent = Some(parent);
        self.item_mut(parent).children.push(id);
        self.request_update(id);
        Some(id)
    }

    /// Remove an item and its subtree.
    ///
    /// Returns the union of the last-known world bounding boxes of the
    /// removed subtree, so the caller can repaint the area the items
    /// occupied. Returns `None` for stale ids and for the root; removing an
    /// already-removed id is a no-op.
    pub fn remove(&mut self, id: ItemId) -> Option<Rect> {
        if !self.is_alive(id) || id == self.root {
            return None;
        }
        let parent = self.item(id).parent;
        if let Some(p) = parent {
            self.item_mut(p).children.retain(|c| *c != id);
        }
        let mut area: Option<Rect> = None;
        self.free_subtree(id, &mut area);
        if let Some(p) = parent {
            // Ancestor bounding boxes shrink on the next update pass.
            self.request_update(p);
        }
        Some(area.unwrap_or(Rect::ZERO))
    }

    fn free_subtree(&mut self, id: ItemId, area: &mut Option<Rect>) {
        let Some(item) = self.items[id.idx()].take() else {
            return;
        };
        self.free_list.push(id.idx());
        if has_area(item.bbox) {
            *area = Some(match *area {
                Some(a) => a.union(item.bbox),
                None => item.bbox,
            });
        }
        for child in item.children {
            self.free_subtree(child, area);
        }
    }

    /// Mark an item as needing an update, propagating up the parent chain.
    ///
    /// Propagation stops as soon as an ancestor is already marked. Returns
    /// true exactly when the root newly transitioned to pending, which is
    /// the caller's cue to schedule an update pass; repeated requests
    /// return false until [`Tree::update_world`] runs.
    pub fn request_update(&mut self, id: ItemId) -> bool {
        let mut cur = id;
        loop {
            let Some(item) = self.item_opt_mut(cur) else {
                return false;
            };
            if item.flags.contains(ItemFlags::NEED_UPDATE) {
                return false;
            }
            item.flags.insert(ItemFlags::NEED_UPDATE);
            match item.parent {
                Some(p) => cur = p,
                None => return true,
            }
        }
    }

    /// Whether the root has an update pending.
    pub fn update_pending(&self) -> bool {
        self.item(self.root).flags.contains(ItemFlags::NEED_UPDATE)
    }

    /// Set an item's transform relative to its parent.
    ///
    /// The new transform is visible to [`Tree::transform`] immediately;
    /// world bounding boxes catch up on the next update pass. Returns true
    /// when the root newly transitioned to pending. Setting the same
    /// transform again is a no-op.
    pub fn set_transform(&mut self, id: ItemId, transform: Affine) -> bool {
        let Some(item) = self.item_opt_mut(id) else {
            return false;
        };
        if item.transform == transform {
            return false;
        }
        item.transform = transform;
        item.flags.insert(ItemFlags::NEED_AFFINE);
        self.request_update(id)
    }

    /// Show or hide an item.
    ///
    /// Returns the item's current world bounding box when the flag actually
    /// changed (the area the caller should repaint), or `None` for stale
    /// ids and no-op changes. An update is requested so ancestor bounding
    /// boxes recompute.
    pub fn set_visible(&mut self, id: ItemId, visible: bool) -> Option<Rect> {
        let item = self.item_opt_mut(id)?;
        if item.flags.contains(ItemFlags::VISIBLE) == visible {
            return None;
        }
        item.flags.set(ItemFlags::VISIBLE, visible);
        let bbox = item.bbox;
        self.request_update(id);
        Some(bbox)
    }

    /// Move an item one step later in its parent's child list (toward the
    /// top of the paint order). Returns whether the order changed.
    pub fn raise(&mut self, id: ItemId) -> bool {
        self.reorder(id, |pos, len| if pos + 1 < len { Some(pos + 1) } else { None })
    }

    /// Move an item one step earlier in its parent's child list (toward the
    /// bottom of the paint order). Returns whether the order changed.
    pub fn lower(&mut self, id: ItemId) -> bool {
        self.reorder(id, |pos, _| pos.checked_sub(1))
    }

    /// Move an item to the end of its parent's child list (top of the paint
    /// order). Returns whether the order changed.
    pub fn raise_to_top(&mut self, id: ItemId) -> bool {
        self.reorder(id, |pos, len| if pos + 1 < len { Some(len - 1) } else { None })
    }

    /// Move an item to the start of its parent's child list (bottom of the
    /// paint order). Returns whether the order changed.
    pub fn lower_to_bottom(&mut self, id: ItemId) -> bool {
        self.reorder(id, |pos, _| if pos > 0 { Some(0) } else { None })
    }

    fn reorder(&mut self, id: ItemId, dest: impl Fn(usize, usize) -> Option<usize>) -> bool {
        let Some(parent) = self.parent_of(id) else {
            return false;
        };
        let children = &mut self.item_mut(parent).children;
        let Some(pos) = children.iter().position(|&c| c == id) else {
            return false;
        };
        let Some(new_pos) = dest(pos, children.len()) else {
            return false;
        };
        children.remove(pos);
        children.insert(new_pos, id);
        true
    }

    /// Run the deferred update pass from the root.
    ///
    /// Recomputes world transforms and bounding boxes for every item whose
    /// flags are set or whose ancestor's transform changed, clears the
    /// update flags, and pushes the old and new world bounding boxes of
    /// every recomputed leaf into `damage`. A group's bounding box is the
    /// union of its visible, positive-area children.
    pub fn update_world(&mut self, damage: &mut Vec<Rect>) {
        self.update_recursive(self.root, Affine::IDENTITY, Cascade::empty(), damage);
    }

    fn update_recursive(
        &mut self,
        id: ItemId,
        parent_world: Affine,
        cascade: Cascade,
        damage: &mut Vec<Rect>,
    ) -> Rect {
        let (flags, transform) = {
            let item = self.item(id);
            (item.flags, item.transform)
        };
        let entered = flags.intersects(ItemFlags::NEED_UPDATE | ItemFlags::NEED_AFFINE)
            || cascade.contains(Cascade::AFFINE_CHANGED);
        if !entered {
            return self.item(id).bbox;
        }

        let affine_changed = flags.contains(ItemFlags::NEED_AFFINE)
            || cascade.contains(Cascade::AFFINE_CHANGED);
        let mut child_cascade = cascade | Cascade::REQUESTED;
        if affine_changed {
            child_cascade |= Cascade::AFFINE_CHANGED;
        }

        let world = parent_world * transform;
        let old_bbox = self.item(id).bbox;

        let new_bbox = if self.item(id).is_group() {
            let children: SmallVec<[ItemId; 4]> = self.item(id).children.clone();
            let mut acc: Option<Rect> = None;
            for child in children {
                let child_bbox = self.update_recursive(child, world, child_cascade, damage);
                let visible = self.item(child).flags.contains(ItemFlags::VISIBLE);
                if visible && has_area(child_bbox) {
                    acc = Some(match acc {
                        Some(a) => a.union(child_bbox),
                        None => child_bbox,
                    });
                }
            }
            acc.unwrap_or(Rect::ZERO)
        } else {
            let item = self.item_mut(id);
            let ItemKind::Leaf(drawable) = &mut item.kind else {
                unreachable!("checked to be a leaf above")
            };
            drawable.update(world)
        };

        let is_leaf = !self.item(id).is_group();
        let item = self.item_mut(id);
        item.bbox = new_bbox;
        item.flags.remove(ItemFlags::NEED_UPDATE | ItemFlags::NEED_AFFINE);

        // Every recomputed leaf damages both the area it occupied and the
        // area it occupies now. Groups carry no pixels of their own.
        if is_leaf {
            if has_area(old_bbox) {
                damage.push(old_bbox);
            }
            if has_area(new_bbox) && new_bbox != old_bbox {
                damage.push(new_bbox);
            }
        }

        new_bbox
    }

    /// Pick the topmost leaf within `tolerance` of a world-space point.
    ///
    /// Groups are pruned by their bounding box inflated by the tolerance.
    /// Among in-tolerance leaves the last one in paint order wins, even if
    /// an earlier sibling is strictly closer. Invisible items and items
    /// with empty bounding boxes never match.
    pub fn point_distance(&self, pt: Point, tolerance: f64) -> Option<Pick> {
        self.pick_recursive(self.root, pt, tolerance)
    }

    fn pick_recursive(&self, id: ItemId, pt: Point, tolerance: f64) -> Option<Pick> {
        let item = self.item(id);
        if !item.flags.contains(ItemFlags::VISIBLE) || !has_area(item.bbox) {
            return None;
        }
        if !item.bbox.inflate(tolerance, tolerance).contains(pt) {
            return None;
        }
        match &item.kind {
            ItemKind::Group => {
                let mut best: Option<Pick> = None;
                for &child in &item.children {
                    // Later children paint on top, so the last match wins.
                    if let Some(pick) = self.pick_recursive(child, pt, tolerance) {
                        best = Some(pick);
                    }
                }
                best
            }
            ItemKind::Leaf(drawable) => drawable
                .point_distance(pt)
                .filter(|&d| d <= tolerance)
                .map(|distance| Pick { item: id, distance }),
        }
    }

    /// Paint every visible leaf overlapping the buffer, in paint order.
    pub fn render(&mut self, buf: &mut Buffer) {
        self.render_recursive(self.root, buf);
    }

    fn render_recursive(&mut self, id: ItemId, buf: &mut Buffer) {
        let item = self.item(id);
        if !item.flags.contains(ItemFlags::VISIBLE)
            || !has_area(item.bbox)
            || !buf.intersects_world(item.bbox)
        {
            return;
        }
        if item.is_group() {
            let children: SmallVec<[ItemId; 4]> = item.children.clone();
            for child in children {
                self.render_recursive(child, buf);
            }
        } else {
            let ItemKind::Leaf(drawable) = &mut self.item_mut(id).kind else {
                unreachable!("checked to be a leaf above")
            };
            drawable.render(buf);
        }
    }

    /// Notify every live leaf that the visible world area changed.
    pub fn viewbox_changed(&mut self, area: Rect) {
        for slot in self.items.iter_mut().flatten() {
            if let ItemKind::Leaf(drawable) = &mut slot.kind {
                drawable.viewbox_changed(area);
            }
        }
    }

    /// Offer an event to a leaf's handler. Groups and stale ids decline.
    pub fn deliver_event(&mut self, id: ItemId, event: &Event, ctx: &mut EventCtx) -> bool {
        let Some(item) = self.item_opt_mut(id) else {
            return false;
        };
        let ItemKind::Leaf(drawable) = &mut item.kind else {
            return false;
        };
        ctx.set_item(id);
        drawable.handle_event(event, ctx)
    }

    // --- accessors ---

    /// Returns true if `id` refers to a live item.
    pub fn is_alive(&self, id: ItemId) -> bool {
        self.items
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// Whether a live item is a group.
    pub fn is_group(&self, id: ItemId) -> bool {
        self.item_opt(id).is_some_and(Item::is_group)
    }

    /// The parent of a live item, or `None` for the root and stale ids.
    pub fn parent_of(&self, id: ItemId) -> Option<ItemId> {
        self.item_opt(id).and_then(|item| item.parent)
    }

    /// The children of a live item in paint order, or an empty slice for
    /// leaves and stale ids.
    pub fn children_of(&self, id: ItemId) -> &[ItemId] {
        self.item_opt(id).map_or(&[], |item| &item.children)
    }

    /// The world bounding box as of the last update pass.
    pub fn world_bbox(&self, id: ItemId) -> Option<Rect> {
        self.item_opt(id).map(|item| item.bbox)
    }

    /// The item's transform relative to its parent. Reflects
    /// [`Tree::set_transform`] immediately.
    pub fn transform(&self, id: ItemId) -> Option<Affine> {
        self.item_opt(id).map(|item| item.transform)
    }

    /// The item's flags.
    pub fn flags(&self, id: ItemId) -> Option<ItemFlags> {
        self.item_opt(id).map(|item| item.flags)
    }

    /// Whether `ancestor` is on `item`'s parent chain. An item counts as
    /// its own ancestor.
    pub fn is_ancestor(&self, ancestor: ItemId, item: ItemId) -> bool {
        if !self.is_alive(ancestor) || !self.is_alive(item) {
            return false;
        }
        let mut cur = Some(item);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.item(id).parent;
        }
        false
    }

    /// Path from `item` up to the root, inclusive, target first. Empty for
    /// stale ids. This is the bubble order for event dispatch.
    pub fn ancestor_path(&self, item: ItemId) -> Vec<ItemId> {
        let mut path = Vec::new();
        if !self.is_alive(item) {
            return path;
        }
        let mut cur = Some(item);
        while let Some(id) = cur {
            path.push(id);
            cur = self.item(id).parent;
        }
        path
    }

    // --- internals ---

    fn item(&self, id: ItemId) -> &Item {
        self.items[id.idx()].as_ref().expect("dangling ItemId")
    }

    fn item_mut(&mut self, id: ItemId) -> &mut Item {
        self.items[id.idx()].as_mut().expect("dangling ItemId")
    }

    fn item_opt(&self, id: ItemId) -> Option<&Item> {
        let item = self.items.get(id.idx())?.as_ref()?;
        if item.generation != id.1 {
            return None;
        }
        Some(item)
    }

    fn item_opt_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        let item = self.items.get_mut(id.idx())?.as_mut()?;
        if item.generation != id.1 {
            return None;
        }
        Some(item)
    }
}
