//! Arena-backed intrusive circular doubly-linked rings.
//!
//! Every ring owns a head slot that never carries data. Nodes are slots in the
//! same arena, addressed by `u32` indices instead of pointers, so splicing and
//! moving between rings is pure index rewiring. Handles carry a generation
//! stamp: a handle to a freed (or reused) slot is rejected with
//! [`RingError::StaleHandle`] rather than silently touching someone else's node.

use crate::types::RingError;

/// Link value of a node removed with [`Arena::unlink`].
const NIL: u32 = u32::MAX;

enum Payload<T> {
    Head,
    Data(T),
    /// Free slot; `next` holds the next free index.
    Vacant,
}

struct Slot<T> {
    next: u32,
    prev: u32,
    generation: u32,
    payload: Payload<T>,
}

/// Handle to a data node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// Handle to a ring, i.e. to its head slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RingId {
    index: u32,
    generation: u32,
}

/// Position to insert next to: a ring's head or a node already in a ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Head(RingId),
    Node(NodeId),
}

impl From<RingId> for Anchor {
    fn from(ring: RingId) -> Self {
        Anchor::Head(ring)
    }
}

impl From<NodeId> for Anchor {
    fn from(node: NodeId) -> Self {
        Anchor::Node(node)
    }
}

/// Slot storage shared by any number of rings.
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_head: u32,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: NIL,
        }
    }

    /// Creates an empty ring: a head linked to itself in both directions.
    pub fn new_ring(&mut self) -> Result<RingId, RingError> {
        let (index, generation) = self.grab_slot(Payload::Head)?;
        Ok(RingId { index, generation })
    }

    /// Allocates a detached node holding `value`.
    ///
    /// The node starts as a single-element ring of its own and must be inserted
    /// with [`insert_after`](Self::insert_after) or
    /// [`insert_before`](Self::insert_before) before it is visible to iteration.
    pub fn alloc(&mut self, value: T) -> Result<NodeId, RingError> {
        let (index, generation) = self.grab_slot(Payload::Data(value))?;
        Ok(NodeId { index, generation })
    }

    pub fn push_back(&mut self, ring: RingId, value: T) -> Result<NodeId, RingError> {
        self.resolve_ring(ring)?;
        let node = self.alloc(value)?;
        self.insert_before(node, ring)?;
        Ok(node)
    }

    pub fn push_front(&mut self, ring: RingId, value: T) -> Result<NodeId, RingError> {
        self.resolve_ring(ring)?;
        let node = self.alloc(value)?;
        self.insert_after(node, ring)?;
        Ok(node)
    }

    pub fn insert_after(&mut self, node: NodeId, anchor: impl Into<Anchor>) -> Result<(), RingError> {
        let new = self.resolve_detached(node)?;
        let at = self.resolve_anchor(anchor.into())?;
        let next = self.slot(at).next;
        self.link_between(new, at, next);
        Ok(())
    }

    pub fn insert_before(&mut self, node: NodeId, anchor: impl Into<Anchor>) -> Result<(), RingError> {
        let new = self.resolve_detached(node)?;
        let at = self.resolve_anchor(anchor.into())?;
        let prev = self.slot(at).prev;
        self.link_between(new, prev, at);
        Ok(())
    }

    /// Unlinks `node` and leaves its links undefined.
    ///
    /// The node keeps its payload and can still be [`remove`](Self::remove)d
    /// or re-inserted.
    pub fn unlink(&mut self, node: NodeId) -> Result<(), RingError> {
        let index = self.resolve_linked(node)?;
        self.detach(index);
        let slot = self.slot_mut(index);
        slot.next = NIL;
        slot.prev = NIL;
        Ok(())
    }

    /// Unlinks `node` and reinitialises it as a single-element ring.
    pub fn unlink_and_init(&mut self, node: NodeId) -> Result<(), RingError> {
        let index = self.resolve_linked(node)?;
        self.detach(index);
        let slot = self.slot_mut(index);
        slot.next = index;
        slot.prev = index;
        Ok(())
    }

    /// Unlinks `node` if needed, frees its slot and hands back the payload.
    pub fn remove(&mut self, node: NodeId) -> Result<T, RingError> {
        let index = self.resolve_node(node)?;
        if self.is_linked(index) {
            self.detach(index);
        }
        match self.release_slot(index) {
            Payload::Data(value) => Ok(value),
            _ => Err(RingError::StaleHandle),
        }
    }

    /// Moves `node` from wherever it is to just after `anchor`.
    pub fn move_after(&mut self, node: NodeId, anchor: impl Into<Anchor>) -> Result<(), RingError> {
        let (index, at) = self.resolve_move(node, anchor.into())?;
        if index != at {
            let next = self.slot(at).next;
            self.link_between(index, at, next);
        }
        Ok(())
    }

    /// Moves `node` from wherever it is to just before `anchor`.
    pub fn move_before(&mut self, node: NodeId, anchor: impl Into<Anchor>) -> Result<(), RingError> {
        let (index, at) = self.resolve_move(node, anchor.into())?;
        if index != at {
            let prev = self.slot(at).prev;
            self.link_between(index, prev, at);
        }
        Ok(())
    }

    /// True iff the ring holds no data nodes. A freed ring reads as empty.
    pub fn is_empty(&self, ring: RingId) -> bool {
        match self.resolve_ring(ring) {
            Ok(head) => self.slot(head).next == head,
            Err(_) => true,
        }
    }

    pub fn len(&self, ring: RingId) -> usize {
        self.iter(ring).count()
    }

    pub fn get(&self, node: NodeId) -> Option<&T> {
        let index = self.resolve_node(node).ok()?;
        match &self.slot(index).payload {
            Payload::Data(value) => Some(value),
            _ => None,
        }
    }

    pub fn front(&self, ring: RingId) -> Option<NodeId> {
        self.iter(ring).next().map(|(id, _)| id)
    }

    pub fn back(&self, ring: RingId) -> Option<NodeId> {
        let head = self.resolve_ring(ring).ok()?;
        let last = self.slot(head).prev;
        (last != head).then(|| self.node_id(last))
    }

    pub fn pop_front(&mut self, ring: RingId) -> Option<T> {
        let node = self.front(ring)?;
        self.remove(node).ok()
    }

    pub fn pop_back(&mut self, ring: RingId) -> Option<T> {
        let node = self.back(ring)?;
        self.remove(node).ok()
    }

    /// Moves every node of `source` to just after `anchor`, keeping their order.
    ///
    /// O(1). `source` is left empty. A no-op when `source` is already empty.
    ///
    /// Anchoring on `source`'s head, first or last node is
    /// [`RingError::SelfSplice`]. Any other anchor inside `source` is only
    /// caught by a debug assertion; in release builds the moved nodes are
    /// lost from every ring.
    pub fn splice_after(&mut self, source: RingId, anchor: impl Into<Anchor>) -> Result<(), RingError> {
        let Some((first, last, at)) = self.splice_bounds(source, anchor.into())? else {
            return Ok(());
        };
        let next = self.slot(at).next;
        self.slot_mut(first).prev = at;
        self.slot_mut(at).next = first;
        self.slot_mut(last).next = next;
        self.slot_mut(next).prev = last;
        self.reset_head(source.index);
        Ok(())
    }

    /// Moves every node of `source` to just before `anchor`, keeping their order.
    ///
    /// Splicing before a ring's head appends `source` at that ring's tail.
    /// The anchor rules of [`splice_after`](Self::splice_after) apply.
    pub fn splice_before(&mut self, source: RingId, anchor: impl Into<Anchor>) -> Result<(), RingError> {
        let Some((first, last, at)) = self.splice_bounds(source, anchor.into())? else {
            return Ok(());
        };
        let prev = self.slot(at).prev;
        self.slot_mut(first).prev = prev;
        self.slot_mut(prev).next = first;
        self.slot_mut(last).next = at;
        self.slot_mut(at).prev = last;
        self.reset_head(source.index);
        Ok(())
    }

    /// Drops every payload of `ring` and frees its head.
    pub fn free_ring(&mut self, ring: RingId) -> Result<(), RingError> {
        let head = self.resolve_ring(ring)?;
        while self.pop_front(ring).is_some() {}
        self.release_slot(head);
        Ok(())
    }

    /// Forward iteration from the first node up to, not including, the head.
    pub fn iter(&self, ring: RingId) -> Iter<'_, T> {
        let (head, pos) = self.start_of(ring);
        Iter {
            arena: self,
            head,
            pos,
        }
    }

    /// Removal-safe traversal of `ring`; see [`Cursor`].
    pub fn cursor(&self, ring: RingId) -> Cursor {
        let (head, pos) = self.start_of(ring);
        Cursor {
            head,
            pos,
            generation: self.slots.get(pos as usize).map_or(0, |slot| slot.generation),
        }
    }

    /// Removes and yields every payload of `ring`, front to back.
    ///
    /// Dropping the iterator early still empties the ring.
    pub fn drain(&mut self, ring: RingId) -> Drain<'_, T> {
        Drain { arena: self, ring }
    }

    /// Checks `next.prev == node` and `prev.next == node` for every linked slot.
    ///
    /// Unlinked data nodes must carry either both `NIL` links or a self-ring.
    pub fn check_links(&self) -> bool {
        self.slots.iter().enumerate().all(|(index, slot)| {
            let index = index as u32;
            match slot.payload {
                Payload::Vacant => true,
                _ if slot.next == NIL || slot.prev == NIL => {
                    matches!(slot.payload, Payload::Data(_)) && slot.next == slot.prev
                }
                _ => match (self.slots.get(slot.next as usize), self.slots.get(slot.prev as usize)) {
                    (Some(next), Some(prev)) => {
                        !matches!(next.payload, Payload::Vacant)
                            && !matches!(prev.payload, Payload::Vacant)
                            && next.prev == index
                            && prev.next == index
                    }
                    _ => false,
                },
            }
        })
    }

    fn start_of(&self, ring: RingId) -> (u32, u32) {
        match self.resolve_ring(ring) {
            Ok(head) => (head, self.slot(head).next),
            Err(_) => (NIL, NIL),
        }
    }

    /// Validates a splice and returns `(first, last, anchor)` of a non-empty source.
    fn splice_bounds(&self, source: RingId, anchor: Anchor) -> Result<Option<(u32, u32, u32)>, RingError> {
        let head = self.resolve_ring(source)?;
        let at = self.resolve_anchor(anchor)?;
        if at == head {
            return Err(RingError::SelfSplice);
        }
        let first = self.slot(head).next;
        if first == head {
            return Ok(None);
        }
        let last = self.slot(head).prev;
        if at == first || at == last {
            return Err(RingError::SelfSplice);
        }
        debug_assert!(
            self.iter(source).all(|(id, _)| id.index != at),
            "splice anchor lies inside the source ring"
        );
        Ok(Some((first, last, at)))
    }

    /// Resolves both ends of a move and detaches the node from its ring.
    fn resolve_move(&mut self, node: NodeId, anchor: Anchor) -> Result<(u32, u32), RingError> {
        let index = self.resolve_node(node)?;
        let at = self.resolve_anchor(anchor)?;
        if index != at && self.is_linked(index) {
            self.detach(index);
        }
        Ok((index, at))
    }

    fn reset_head(&mut self, head: u32) {
        let slot = self.slot_mut(head);
        slot.next = head;
        slot.prev = head;
    }

    fn link_between(&mut self, new: u32, prev: u32, next: u32) {
        self.slot_mut(next).prev = new;
        let slot = self.slot_mut(new);
        slot.next = next;
        slot.prev = prev;
        self.slot_mut(prev).next = new;
    }

    /// Rewires the neighbours of `index` to each other. Leaves `index` untouched.
    fn detach(&mut self, index: u32) {
        let (next, prev) = {
            let slot = self.slot(index);
            (slot.next, slot.prev)
        };
        self.slot_mut(next).prev = prev;
        self.slot_mut(prev).next = next;
    }

    fn is_linked(&self, index: u32) -> bool {
        let slot = self.slot(index);
        slot.next != NIL && slot.next != index
    }

    fn grab_slot(&mut self, payload: Payload<T>) -> Result<(u32, u32), RingError> {
        if self.free_head != NIL {
            let index = self.free_head;
            let slot = self.slot_mut(index);
            let next_free = slot.next;
            slot.next = index;
            slot.prev = index;
            slot.payload = payload;
            let generation = slot.generation;
            self.free_head = next_free;
            return Ok((index, generation));
        }
        let index = u32::try_from(self.slots.len())
            .ok()
            .filter(|index| *index != NIL)
            .ok_or(RingError::AllocationFailure)?;
        self.slots
            .try_reserve(1)
            .map_err(|_| RingError::AllocationFailure)?;
        self.slots.push(Slot {
            next: index,
            prev: index,
            generation: 0,
            payload,
        });
        Ok((index, 0))
    }

    fn release_slot(&mut self, index: u32) -> Payload<T> {
        let free_head = self.free_head;
        let slot = self.slot_mut(index);
        slot.generation = slot.generation.wrapping_add(1);
        slot.next = free_head;
        slot.prev = NIL;
        let payload = std::mem::replace(&mut slot.payload, Payload::Vacant);
        self.free_head = index;
        payload
    }

    fn resolve_ring(&self, ring: RingId) -> Result<u32, RingError> {
        match self.slots.get(ring.index as usize) {
            Some(slot) if slot.generation == ring.generation && matches!(slot.payload, Payload::Head) => {
                Ok(ring.index)
            }
            _ => Err(RingError::StaleHandle),
        }
    }

    fn resolve_node(&self, node: NodeId) -> Result<u32, RingError> {
        match self.slots.get(node.index as usize) {
            Some(slot) if slot.generation == node.generation && matches!(slot.payload, Payload::Data(_)) => {
                Ok(node.index)
            }
            _ => Err(RingError::StaleHandle),
        }
    }

    fn resolve_linked(&self, node: NodeId) -> Result<u32, RingError> {
        let index = self.resolve_node(node)?;
        if self.is_linked(index) {
            Ok(index)
        } else {
            Err(RingError::NotLinked)
        }
    }

    fn resolve_detached(&self, node: NodeId) -> Result<u32, RingError> {
        let index = self.resolve_node(node)?;
        if self.is_linked(index) {
            Err(RingError::AlreadyLinked)
        } else {
            Ok(index)
        }
    }

    /// A head anchors anything; a data node only while it sits in a ring.
    fn resolve_anchor(&self, anchor: Anchor) -> Result<u32, RingError> {
        match anchor {
            Anchor::Head(ring) => self.resolve_ring(ring),
            Anchor::Node(node) => self.resolve_linked(node),
        }
    }

    fn node_id(&self, index: u32) -> NodeId {
        NodeId {
            index,
            generation: self.slot(index).generation,
        }
    }

    fn slot(&self, index: u32) -> &Slot<T> {
        &self.slots[index as usize]
    }

    fn slot_mut(&mut self, index: u32) -> &mut Slot<T> {
        &mut self.slots[index as usize]
    }
}

/// Borrowing forward iterator over one ring.
pub struct Iter<'a, T> {
    arena: &'a Arena<T>,
    head: u32,
    pos: u32,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (NodeId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos == self.head || self.pos == NIL {
            return None;
        }
        let index = self.pos;
        let slot = self.arena.slots.get(index as usize)?;
        self.pos = slot.next;
        match &slot.payload {
            Payload::Data(value) => Some((
                NodeId {
                    index,
                    generation: slot.generation,
                },
                value,
            )),
            _ => None,
        }
    }
}

/// Traversal that tolerates removal of the node it just yielded.
///
/// The successor is captured before each node is handed out, so the caller can
/// [`Arena::remove`] or [`Arena::move_before`] the yielded node between steps.
/// Removing any *other* node of the ring ends the traversal early.
#[derive(Debug, Clone, Copy)]
pub struct Cursor {
    head: u32,
    pos: u32,
    generation: u32,
}

impl Cursor {
    pub fn next<T>(&mut self, arena: &Arena<T>) -> Option<NodeId> {
        if self.pos == self.head || self.pos == NIL {
            return None;
        }
        let slot = arena.slots.get(self.pos as usize)?;
        if slot.generation != self.generation || !matches!(slot.payload, Payload::Data(_)) {
            self.pos = NIL;
            return None;
        }
        let current = NodeId {
            index: self.pos,
            generation: self.generation,
        };
        self.pos = slot.next;
        self.generation = arena
            .slots
            .get(self.pos as usize)
            .map_or(0, |next| next.generation);
        Some(current)
    }
}

/// Draining iterator returned by [`Arena::drain`].
pub struct Drain<'a, T> {
    arena: &'a mut Arena<T>,
    ring: RingId,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.arena.pop_front(self.ring)
    }
}

impl<T> Drop for Drain<'_, T> {
    fn drop(&mut self) {
        while self.arena.pop_front(self.ring).is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(arena: &Arena<&'static str>, ring: RingId) -> Vec<&'static str> {
        arena.iter(ring).map(|(_, v)| *v).collect()
    }

    #[test]
    fn new_ring_is_empty_and_self_linked() {
        let mut arena: Arena<u8> = Arena::new();
        let ring = arena.new_ring().unwrap();
        assert!(arena.is_empty(ring));
        assert_eq!(arena.len(ring), 0);
        assert!(arena.check_links());
    }

    #[test]
    fn tail_insertion_preserves_order() {
        let mut arena = Arena::new();
        let ring = arena.new_ring().unwrap();
        arena.push_back(ring, "a").unwrap();
        let b = arena.push_back(ring, "b").unwrap();
        arena.push_back(ring, "c").unwrap();
        assert_eq!(contents(&arena, ring), ["a", "b", "c"]);

        assert_eq!(arena.remove(b).unwrap(), "b");
        assert_eq!(contents(&arena, ring), ["a", "c"]);
        assert!(arena.check_links());
    }

    #[test]
    fn insert_next_to_a_node() {
        let mut arena = Arena::new();
        let ring = arena.new_ring().unwrap();
        let a = arena.push_back(ring, "a").unwrap();
        let c = arena.push_back(ring, "c").unwrap();
        let b = arena.alloc("b").unwrap();
        arena.insert_after(b, a).unwrap();
        let d = arena.alloc("d").unwrap();
        arena.insert_before(d, ring).unwrap();
        let z = arena.alloc("z").unwrap();
        arena.insert_before(z, c).unwrap();
        assert_eq!(contents(&arena, ring), ["a", "b", "z", "c", "d"]);
        assert!(arena.check_links());
    }

    #[test]
    fn push_front_acts_as_a_stack() {
        let mut arena = Arena::new();
        let ring = arena.new_ring().unwrap();
        for v in ["a", "b", "c"] {
            arena.push_front(ring, v).unwrap();
        }
        assert_eq!(contents(&arena, ring), ["c", "b", "a"]);
        assert_eq!(arena.pop_back(ring), Some("a"));
        assert_eq!(arena.pop_front(ring), Some("c"));
    }

    #[test]
    fn linked_node_cannot_be_inserted_twice() {
        let mut arena = Arena::new();
        let one = arena.new_ring().unwrap();
        let two = arena.new_ring().unwrap();
        let a = arena.push_back(one, "a").unwrap();
        assert_eq!(arena.insert_after(a, two), Err(RingError::AlreadyLinked));
        assert!(arena.is_empty(two));
        assert_eq!(contents(&arena, one), ["a"]);
    }

    #[test]
    fn detached_node_is_not_an_anchor() {
        let mut arena = Arena::new();
        let a = arena.alloc("a").unwrap();
        let b = arena.alloc("b").unwrap();
        assert_eq!(arena.insert_after(b, a), Err(RingError::NotLinked));
    }

    #[test]
    fn unlink_leaves_nil_links_and_allows_reinsert() {
        let mut arena = Arena::new();
        let ring = arena.new_ring().unwrap();
        let a = arena.push_back(ring, "a").unwrap();
        arena.push_back(ring, "b").unwrap();

        arena.unlink(a).unwrap();
        assert_eq!(arena.unlink(a), Err(RingError::NotLinked));
        assert_eq!(contents(&arena, ring), ["b"]);
        assert_eq!(arena.get(a), Some(&"a"));
        assert!(arena.check_links());

        arena.insert_before(a, ring).unwrap();
        assert_eq!(contents(&arena, ring), ["b", "a"]);
    }

    #[test]
    fn unlink_and_init_yields_a_self_ring() {
        let mut arena = Arena::new();
        let ring = arena.new_ring().unwrap();
        let a = arena.push_back(ring, "a").unwrap();
        arena.unlink_and_init(a).unwrap();
        assert!(arena.is_empty(ring));
        assert!(arena.check_links());
        arena.insert_after(a, ring).unwrap();
        assert_eq!(contents(&arena, ring), ["a"]);
    }

    #[test]
    fn removed_handle_goes_stale_even_after_slot_reuse() {
        let mut arena = Arena::new();
        let ring = arena.new_ring().unwrap();
        let a = arena.push_back(ring, "a").unwrap();
        arena.remove(a).unwrap();
        let b = arena.push_back(ring, "b").unwrap();

        assert_eq!(arena.remove(a), Err(RingError::StaleHandle));
        assert_eq!(arena.get(a), None);
        assert_eq!(arena.get(b), Some(&"b"));
    }

    #[test]
    fn move_between_rings() {
        let mut arena = Arena::new();
        let one = arena.new_ring().unwrap();
        let two = arena.new_ring().unwrap();
        let a = arena.push_back(one, "a").unwrap();
        arena.push_back(one, "b").unwrap();
        let x = arena.push_back(two, "x").unwrap();

        arena.move_before(a, two).unwrap();
        arena.move_before(x, one).unwrap();
        assert_eq!(contents(&arena, one), ["b", "x"]);
        assert_eq!(contents(&arena, two), ["a"]);

        arena.move_after(x, one).unwrap();
        assert_eq!(contents(&arena, one), ["x", "b"]);
        assert!(arena.check_links());
    }

    #[test]
    fn splice_to_tail() {
        let mut arena = Arena::new();
        let dest = arena.new_ring().unwrap();
        let src = arena.new_ring().unwrap();
        arena.push_back(dest, "a").unwrap();
        arena.push_back(dest, "b").unwrap();
        arena.push_back(src, "x").unwrap();
        arena.push_back(src, "y").unwrap();

        arena.splice_before(src, dest).unwrap();
        assert_eq!(contents(&arena, dest), ["a", "b", "x", "y"]);
        assert!(arena.is_empty(src));
        assert!(arena.check_links());
    }

    #[test]
    fn splice_after_a_node() {
        let mut arena = Arena::new();
        let dest = arena.new_ring().unwrap();
        let src = arena.new_ring().unwrap();
        let a = arena.push_back(dest, "a").unwrap();
        arena.push_back(dest, "b").unwrap();
        arena.push_back(src, "x").unwrap();
        arena.push_back(src, "y").unwrap();

        arena.splice_after(src, a).unwrap();
        assert_eq!(contents(&arena, dest), ["a", "x", "y", "b"]);
        assert!(arena.is_empty(src));
        assert!(arena.check_links());
    }

    #[test]
    fn splicing_an_empty_ring_is_a_noop() {
        let mut arena = Arena::new();
        let dest = arena.new_ring().unwrap();
        let src = arena.new_ring().unwrap();
        arena.push_back(dest, "a").unwrap();
        arena.splice_after(src, dest).unwrap();
        arena.splice_before(src, dest).unwrap();
        assert_eq!(contents(&arena, dest), ["a"]);
        assert!(arena.check_links());
    }

    #[test]
    fn splicing_onto_own_head_is_rejected() {
        let mut arena = Arena::new();
        let ring = arena.new_ring().unwrap();
        arena.push_back(ring, "a").unwrap();
        assert_eq!(arena.splice_before(ring, ring), Err(RingError::SelfSplice));
        assert_eq!(contents(&arena, ring), ["a"]);
    }

    #[test]
    fn splicing_onto_own_end_nodes_is_rejected() {
        let mut arena = Arena::new();
        let ring = arena.new_ring().unwrap();
        let first = arena.push_back(ring, "a").unwrap();
        arena.push_back(ring, "b").unwrap();
        let last = arena.push_back(ring, "c").unwrap();

        assert_eq!(arena.splice_after(ring, first), Err(RingError::SelfSplice));
        assert_eq!(arena.splice_before(ring, last), Err(RingError::SelfSplice));
        assert_eq!(contents(&arena, ring), ["a", "b", "c"]);
        assert!(arena.check_links());
    }

    #[test]
    fn cursor_survives_removing_the_current_node() {
        let mut arena = Arena::new();
        let ring = arena.new_ring().unwrap();
        for v in ["a", "b", "c"] {
            arena.push_back(ring, v).unwrap();
        }

        let mut seen = Vec::new();
        let mut cursor = arena.cursor(ring);
        while let Some(node) = cursor.next(&arena) {
            seen.push(arena.remove(node).unwrap());
        }
        assert_eq!(seen, ["a", "b", "c"]);
        assert!(arena.is_empty(ring));
        assert!(arena.check_links());
    }

    #[test]
    fn cursor_can_move_the_current_node_elsewhere() {
        let mut arena = Arena::new();
        let ring = arena.new_ring().unwrap();
        let evens = arena.new_ring().unwrap();
        for v in 1..=6 {
            arena.push_back(ring, v).unwrap();
        }
        let mut cursor = arena.cursor(ring);
        while let Some(node) = cursor.next(&arena) {
            if arena.get(node).is_some_and(|v| v % 2 == 0) {
                arena.move_before(node, evens).unwrap();
            }
        }
        let odd: Vec<_> = arena.iter(ring).map(|(_, v)| *v).collect();
        let even: Vec<_> = arena.iter(evens).map(|(_, v)| *v).collect();
        assert_eq!(odd, [1, 3, 5]);
        assert_eq!(even, [2, 4, 6]);
    }

    #[test]
    fn drain_empties_even_when_dropped_early() {
        let mut arena = Arena::new();
        let ring = arena.new_ring().unwrap();
        for v in ["a", "b", "c"] {
            arena.push_back(ring, v).unwrap();
        }
        let first: Vec<_> = arena.drain(ring).take(1).collect();
        assert_eq!(first, ["a"]);
        assert!(arena.is_empty(ring));
    }

    #[test]
    fn free_ring_drops_payloads_and_head() {
        use std::rc::Rc;

        let marker = Rc::new(());
        let mut arena = Arena::new();
        let ring = arena.new_ring().unwrap();
        arena.push_back(ring, Rc::clone(&marker)).unwrap();
        arena.push_back(ring, Rc::clone(&marker)).unwrap();
        assert_eq!(Rc::strong_count(&marker), 3);

        arena.free_ring(ring).unwrap();
        assert_eq!(Rc::strong_count(&marker), 1);
        assert!(arena.is_empty(ring));
        assert_eq!(arena.push_back(ring, Rc::clone(&marker)), Err(RingError::StaleHandle));
        assert!(arena.check_links());
    }
}
