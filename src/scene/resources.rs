//! Handle-based, reference-counted resource storage.
//!
//! Geometries and materials are shared between symmetric instances. The
//! pool tracks how many scene nodes hold each handle so that a resource is
//! disposed exactly when its last holder lets go, and so that mutation can
//! go through an explicit copy-on-write step ([`ResourcePool::make_unique`]).

use std::fmt;
use std::marker::PhantomData;

/// Typed handle into a [`ResourcePool`].
///
/// Disposed slots are recycled. Each reuse bumps the slot's version, and
/// the handle carries the version it was issued with, so a handle to a
/// disposed resource never matches the slot's next occupant.
pub struct Handle<T> {
    index: u32,
    version: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    const fn new(index: u32, version: u32) -> Self {
        Self {
            index,
            version,
            _marker: PhantomData,
        }
    }

    /// Raw slot index. May be shared with handles of disposed resources.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Slot version this handle was issued with.
    #[must_use]
    pub const fn version(self) -> u32 {
        self.version
    }
}

// Manual impls: derives would add a `T: Trait` bound.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.version == other.version
    }
}

impl<T> Eq for Handle<T> {}

impl<T> std::hash::Hash for Handle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.version.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.version)
    }
}

struct Slot<T> {
    value: T,
    refs: u32,
    /// Bumped on every mutable access so GPU caches know to re-upload.
    generation: u64,
}

struct Entry<T> {
    version: u32,
    slot: Option<Slot<T>>,
}

/// Reference-counted storage with explicit disposal.
///
/// Storage stays bounded by the peak number of live resources: disposed
/// slots go on a free list and are refilled before the pool grows.
pub struct ResourcePool<T> {
    entries: Vec<Entry<T>>,
    free: Vec<u32>,
    live: usize,
    /// Handles freed since the last [`drain_disposed`](Self::drain_disposed).
    disposed: Vec<Handle<T>>,
    total_disposed: u64,
}

impl<T> Default for ResourcePool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResourcePool<T> {
    /// Empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            free: Vec::new(),
            live: 0,
            disposed: Vec::new(),
            total_disposed: 0,
        }
    }

    /// Store a resource with a reference count of zero.
    ///
    /// The caller is expected to [`retain`](Self::retain) it once per holder.
    pub fn insert(&mut self, value: T) -> Handle<T> {
        let slot = Slot {
            value,
            refs: 0,
            generation: 0,
        };
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let entry = &mut self.entries[index as usize];
            entry.slot = Some(slot);
            return Handle::new(index, entry.version);
        }
        let index = self.entries.len() as u32;
        self.entries.push(Entry {
            version: 0,
            slot: Some(slot),
        });
        Handle::new(index, 0)
    }

    fn slot(&self, handle: Handle<T>) -> Option<&Slot<T>> {
        let entry = self.entries.get(handle.index as usize)?;
        if entry.version != handle.version {
            return None;
        }
        entry.slot.as_ref()
    }

    fn slot_mut(&mut self, handle: Handle<T>) -> Option<&mut Slot<T>> {
        let entry = self.entries.get_mut(handle.index as usize)?;
        if entry.version != handle.version {
            return None;
        }
        entry.slot.as_mut()
    }

    /// Read a live resource.
    #[must_use]
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.slot(handle).map(|s| &s.value)
    }

    /// Mutable access to a live resource. Bumps its generation.
    ///
    /// This does not check sharing; callers that must not affect other
    /// holders go through [`make_unique`](Self::make_unique) first.
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        let slot = self.slot_mut(handle)?;
        slot.generation += 1;
        Some(&mut slot.value)
    }

    /// Current generation of a live resource.
    #[must_use]
    pub fn generation(&self, handle: Handle<T>) -> Option<u64> {
        self.slot(handle).map(|s| s.generation)
    }

    /// Number of holders of a live resource.
    #[must_use]
    pub fn ref_count(&self, handle: Handle<T>) -> Option<u32> {
        self.slot(handle).map(|s| s.refs)
    }

    /// Whether the handle still points at a live resource.
    #[must_use]
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.slot(handle).is_some()
    }

    /// Add a holder. Returns `false` for a stale handle.
    pub fn retain(&mut self, handle: Handle<T>) -> bool {
        match self.slot_mut(handle) {
            Some(slot) => {
                slot.refs += 1;
                true
            }
            None => false,
        }
    }

    /// Drop a holder, disposing the resource when no holders remain.
    ///
    /// Returns `true` if this call disposed the resource.
    pub fn release(&mut self, handle: Handle<T>) -> bool {
        let Some(slot) = self.slot_mut(handle) else {
            return false;
        };
        slot.refs = slot.refs.saturating_sub(1);
        if slot.refs > 0 {
            return false;
        }
        let entry = &mut self.entries[handle.index as usize];
        entry.slot = None;
        entry.version = entry.version.wrapping_add(1);
        self.free.push(handle.index);
        self.live -= 1;
        self.disposed.push(handle);
        self.total_disposed += 1;
        log::debug!("disposed resource {handle:?}");
        true
    }

    /// Number of live resources.
    #[must_use]
    pub const fn live_count(&self) -> usize {
        self.live
    }

    /// Number of allocated slots, live or free.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Number of resources disposed over the pool's lifetime.
    #[must_use]
    pub fn total_disposed(&self) -> u64 {
        self.total_disposed
    }

    /// Take the handles disposed since the previous call.
    pub fn drain_disposed(&mut self) -> Vec<Handle<T>> {
        std::mem::take(&mut self.disposed)
    }

    /// Iterate live handles with their resources.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.entries.iter().enumerate().filter_map(|(i, entry)| {
            let slot = entry.slot.as_ref()?;
            Some((Handle::new(i as u32, entry.version), &slot.value))
        })
    }
}

impl<T: Clone> ResourcePool<T> {
    /// Copy-on-write: give a single holder its own copy of `handle`.
    ///
    /// If the caller is the only holder the same handle comes back
    /// untouched. Otherwise the resource is cloned into a new handle held
    /// once, and one reference on the original is released. Returns `None`
    /// for a stale handle.
    pub fn make_unique(&mut self, handle: Handle<T>) -> Option<Handle<T>> {
        let slot = self.slot(handle)?;
        if slot.refs <= 1 {
            return Some(handle);
        }
        let copy = slot.value.clone();
        let fresh = self.insert(copy);
        let _ = self.retain(fresh);
        let _ = self.release(handle);
        Some(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_disposes_at_zero() {
        let mut pool = ResourcePool::new();
        let h = pool.insert(1u32);
        assert!(pool.retain(h));
        assert!(pool.retain(h));
        assert!(!pool.release(h));
        assert!(pool.contains(h));
        assert!(pool.release(h));
        assert!(!pool.contains(h));
        assert_eq!(pool.drain_disposed(), vec![h]);
        assert!(pool.drain_disposed().is_empty());
        assert_eq!(pool.total_disposed(), 1);
    }

    #[test]
    fn make_unique_on_sole_holder_keeps_handle() {
        let mut pool = ResourcePool::new();
        let h = pool.insert(String::from("a"));
        let _ = pool.retain(h);
        assert_eq!(pool.make_unique(h), Some(h));
        assert_eq!(pool.live_count(), 1);
    }

    #[test]
    fn make_unique_on_shared_handle_copies() {
        let mut pool = ResourcePool::new();
        let h = pool.insert(String::from("a"));
        for _ in 0..5 {
            let _ = pool.retain(h);
        }
        let fresh = pool.make_unique(h).unwrap();
        assert_ne!(fresh, h);
        assert_eq!(pool.ref_count(h), Some(4));
        assert_eq!(pool.ref_count(fresh), Some(1));
        assert_eq!(pool.get(fresh).map(String::as_str), Some("a"));
        assert_eq!(pool.live_count(), 2);
    }

    #[test]
    fn stale_handles_are_rejected() {
        let mut pool = ResourcePool::new();
        let h = pool.insert(0u8);
        let _ = pool.retain(h);
        let _ = pool.release(h);
        assert!(pool.get(h).is_none());
        assert!(!pool.retain(h));
        assert!(!pool.release(h));
        assert!(pool.make_unique(h).is_none());
    }

    #[test]
    fn churn_reuses_slots() {
        let mut pool = ResourcePool::new();
        let mut current = pool.insert(0u32);
        let _ = pool.retain(current);
        for i in 1..10_000 {
            let next = pool.insert(i);
            let _ = pool.retain(next);
            assert!(pool.release(current));
            current = next;
        }
        assert_eq!(pool.live_count(), 1);
        assert_eq!(pool.capacity(), 2);
        assert_eq!(pool.get(current), Some(&9_999));
        assert_eq!(pool.drain_disposed().len(), 9_999);
    }

    #[test]
    fn reused_slot_does_not_revive_old_handle() {
        let mut pool = ResourcePool::new();
        let old = pool.insert("old");
        let _ = pool.retain(old);
        let _ = pool.release(old);
        let new = pool.insert("new");
        assert_eq!(new.index(), old.index());
        assert_ne!(new, old);
        assert!(pool.get(old).is_none());
        assert!(!pool.retain(old));
        assert_eq!(pool.get(new), Some(&"new"));
        assert_eq!(pool.iter().map(|(h, _)| h).collect::<Vec<_>>(), vec![new]);
    }

    #[test]
    fn get_mut_bumps_generation() {
        let mut pool = ResourcePool::new();
        let h = pool.insert(0u8);
        assert_eq!(pool.generation(h), Some(0));
        *pool.get_mut(h).unwrap() = 3;
        assert_eq!(pool.generation(h), Some(1));
        assert_eq!(pool.get(h), Some(&3));
    }
}
