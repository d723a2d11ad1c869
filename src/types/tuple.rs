//! Arena-backed partial-match ancestry.
//!
//! Every tuple lives in a [`TupleArena`] slot and names its parent by
//! [`TupleId`]. A node can only be created under a live parent, and
//! retracting a node retracts every descendant, so a parent chain is always
//! finite and ends at a root.
//!
//! Freed slots are reused LIFO. Each slot carries a generation, odd while
//! occupied and even while free, and a `TupleId` records the generation it
//! was issued under. An id kept past its tuple's retraction stays dead even
//! after the slot is reused.

use std::fmt;

use super::error::TupleError;
use super::fact::{Fact, FactHandle};

/// Generational index of a tuple in its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TupleId {
    index: u32,
    generation: u32,
}

impl TupleId {
    /// Slot index; shared by every tuple that ever occupied the slot.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Slot generation this id was issued under. Always odd.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for TupleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tuple#{}", self.index)
    }
}

#[derive(Debug, Clone)]
struct TupleNode {
    handle: Option<FactHandle>,
    parent: Option<TupleId>,
    children: Vec<TupleId>,
}

#[derive(Debug, Clone)]
struct Slot {
    /// Odd while occupied, even while free.
    generation: u32,
    node: Option<TupleNode>,
    next_free: Option<u32>,
}

/// Owner of all tuples of a working memory.
#[derive(Debug, Clone, Default)]
pub struct TupleArena {
    slots: Vec<Slot>,
    free_list_head: Option<u32>,
    live_count: usize,
}

impl TupleArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new ancestry with `handle` bound at its root.
    pub fn root(&mut self, handle: FactHandle) -> TupleId {
        self.allocate(TupleNode {
            handle: Some(handle),
            parent: None,
            children: Vec::new(),
        })
    }

    /// Advance the match at `parent` by one bound pattern.
    ///
    /// # Errors
    ///
    /// Returns [`TupleError::Dead`] if `parent` is not live.
    pub fn extend(&mut self, parent: TupleId, handle: FactHandle) -> Result<TupleId, TupleError> {
        self.attach(Some(parent), Some(handle))
    }

    /// Add an empty-handle placeholder, either as a root or under `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`TupleError::Dead`] if `parent` is given and not live.
    pub fn placeholder(&mut self, parent: Option<TupleId>) -> Result<TupleId, TupleError> {
        self.attach(parent, None)
    }

    /// Retract `id` and every tuple built on it. Returns the removed ids,
    /// `id` first.
    ///
    /// # Errors
    ///
    /// Returns [`TupleError::Dead`] if `id` is not live.
    pub fn retract(&mut self, id: TupleId) -> Result<Vec<TupleId>, TupleError> {
        let parent = self.node(id).ok_or(TupleError::Dead(id))?.parent;
        if let Some(parent) = parent.and_then(|p| self.node_mut(p)) {
            parent.children.retain(|&child| child != id);
        }

        let mut removed = Vec::new();
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.deallocate(next) {
                pending.extend(node.children.into_iter().rev());
                removed.push(next);
            }
        }
        Ok(removed)
    }

    /// A read-only view of a live tuple.
    #[must_use]
    pub fn get(&self, id: TupleId) -> Option<TupleRef<'_>> {
        self.node(id).map(|node| TupleRef {
            arena: self,
            id,
            node,
        })
    }

    #[must_use]
    pub fn contains(&self, id: TupleId) -> bool {
        self.node(id).is_some()
    }

    /// Number of live tuples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    fn attach(
        &mut self,
        parent: Option<TupleId>,
        handle: Option<FactHandle>,
    ) -> Result<TupleId, TupleError> {
        if let Some(parent) = parent {
            if !self.contains(parent) {
                return Err(TupleError::Dead(parent));
            }
        }
        let id = self.allocate(TupleNode {
            handle,
            parent,
            children: Vec::new(),
        });
        if let Some(node) = parent.and_then(|p| self.node_mut(p)) {
            node.children.push(id);
        }
        Ok(id)
    }

    #[allow(clippy::cast_possible_truncation)] // arenas never hold u32::MAX tuples
    fn allocate(&mut self, node: TupleNode) -> TupleId {
        self.live_count += 1;
        if let Some(index) = self.free_list_head {
            let slot = &mut self.slots[index as usize];
            self.free_list_head = slot.next_free.take();
            slot.generation = slot.generation.wrapping_add(1);
            slot.node = Some(node);
            TupleId {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 1,
                node: Some(node),
                next_free: None,
            });
            TupleId {
                index: (self.slots.len() - 1) as u32,
                generation: 1,
            }
        }
    }

    fn deallocate(&mut self, id: TupleId) -> Option<TupleNode> {
        let head = self.free_list_head;
        let slot = self.slot_mut(id)?;
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        slot.next_free = head;
        self.free_list_head = Some(id.index);
        self.live_count -= 1;
        Some(node)
    }

    fn slot(&self, id: TupleId) -> Option<&Slot> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
    }

    fn slot_mut(&mut self, id: TupleId) -> Option<&mut Slot> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
    }

    fn node(&self, id: TupleId) -> Option<&TupleNode> {
        self.slot(id)?.node.as_ref()
    }

    fn node_mut(&mut self, id: TupleId) -> Option<&mut TupleNode> {
        self.slot_mut(id)?.node.as_mut()
    }
}

/// Borrowed view of one live tuple and its ancestry.
#[derive(Clone, Copy)]
pub struct TupleRef<'a> {
    arena: &'a TupleArena,
    id: TupleId,
    node: &'a TupleNode,
}

impl<'a> TupleRef<'a> {
    #[must_use]
    pub fn id(&self) -> TupleId {
        self.id
    }

    /// The bound fact handle, `None` for a placeholder.
    #[must_use]
    pub fn handle(&self) -> Option<&'a FactHandle> {
        self.node.handle.as_ref()
    }

    #[must_use]
    pub fn fact(&self) -> Option<&'a Fact> {
        self.handle().map(FactHandle::fact)
    }

    /// Runtime type name of the bound fact.
    #[must_use]
    pub fn fact_type(&self) -> Option<&'a str> {
        self.handle().map(FactHandle::type_name)
    }

    #[must_use]
    pub fn is_empty_handle(&self) -> bool {
        self.node.handle.is_none()
    }

    #[must_use]
    pub fn parent(&self) -> Option<TupleRef<'a>> {
        self.arena.get(self.node.parent?)
    }

    /// The nearest tuple, starting at this one, that has a bound handle.
    #[must_use]
    pub fn skip_empty_handles(self) -> Option<TupleRef<'a>> {
        self.ancestors().find(|t| !t.is_empty_handle())
    }

    /// This tuple followed by each parent up to the root.
    #[must_use]
    pub fn ancestors(self) -> Ancestors<'a> {
        Ancestors { next: Some(self) }
    }

    /// The nearest tuple, starting at this one, binding a fact of `type_name`.
    #[must_use]
    pub fn find_binding(self, type_name: &str) -> Option<TupleRef<'a>> {
        self.ancestors().find(|t| t.fact_type() == Some(type_name))
    }

    /// Number of tuples from this one to the root, inclusive.
    #[must_use]
    pub fn depth(self) -> usize {
        self.ancestors().count()
    }
}

impl fmt::Debug for TupleRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TupleRef")
            .field("id", &self.id)
            .field("fact_type", &self.fact_type())
            .field("parent", &self.node.parent)
            .finish()
    }
}

/// Iterator walking from a tuple to its root.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    next: Option<TupleRef<'a>>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = TupleRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}
