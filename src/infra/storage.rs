//! Storage Infrastructure
//!
//! This module provides [`Arena`] and [`ArenaPtr`] as storage infrastructure.
//! [`GenericArena`] and [`GenericPtr`] are the basic arena and pointer that
//! the sequence nodes live in.
//!
//! The arena owns every value stored in it, and the pointers are lightweight
//! handles to those values. A pointer never owns anything, so copying it
//! around is free and cannot cause double drops.
//!
//! Pointers are generational: deallocating a slot bumps its generation, so a
//! pointer to a deallocated slot stays invalid even after the slot is reused.
//! Every arena also has its own id, so a pointer handed out by one arena is
//! never valid in another.

use std::collections::TryReserveError;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::{fmt, mem};

/// The id of the next arena to be created.
static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(0);

/// A trait for indexing into an arena.
pub trait ArenaPtr: Copy + Eq + Hash {
    /// The arena type, which should support the pointer type.
    type Arena: Arena<Self>;

    /// The internal data.
    type Data;

    /// Try to dereference the pointer with an arena.
    ///
    /// # Returns
    ///
    /// - `Some(&Self::Data)`: A reference to the data in the arena.
    /// - `None`: The pointer is invalid.
    fn try_deref(self, arena: &Self::Arena) -> Option<&Self::Data> { arena.try_deref(self) }

    /// Try to mutably dereference the pointer with an arena.
    ///
    /// # Returns
    ///
    /// - `Some(&mut Self::Data)`: A mutable reference to the data in the arena.
    /// - `None`: The pointer is invalid.
    fn try_deref_mut(self, arena: &mut Self::Arena) -> Option<&mut Self::Data> {
        arena.try_deref_mut(self)
    }

    /// Convenient method to dereference the pointer.
    fn deref(self, arena: &Self::Arena) -> &Self::Data {
        self.try_deref(arena).expect("invalid pointer dereferenced")
    }

    /// Convenient method to mutably dereference the pointer.
    fn deref_mut(self, arena: &mut Self::Arena) -> &mut Self::Data {
        self.try_deref_mut(arena)
            .expect("invalid pointer dereferenced")
    }
}

/// A trait for an arena that can store data and allocate pointers.
///
/// # Type Parameters
///
/// - `Ptr`: The pointer type that is supported by the arena. The data type is
///   inferred from the pointer type by using [`ArenaPtr::Data`].
pub trait Arena<Ptr>
where
    Ptr: ArenaPtr<Arena = Self>,
{
    /// Construct data with the allocated pointer and store it into the arena.
    ///
    /// This allows the stored data to know its own pointer.
    ///
    /// # Panics
    ///
    /// Panics (or aborts) if the arena cannot grow, in the same way
    /// [`Vec::push`] does. Use [`try_alloc_with`](Arena::try_alloc_with) to
    /// handle the failure instead.
    fn alloc_with<F>(&mut self, f: F) -> Ptr
    where
        F: FnOnce(Ptr) -> Ptr::Data;

    /// Fallible version of [`alloc_with`](Arena::alloc_with).
    ///
    /// The storage is reserved before `f` is called, so when this returns an
    /// error, `f` has not run and the arena is untouched.
    ///
    /// # Returns
    ///
    /// - `Ok(Ptr)`: The allocated pointer to the stored data.
    /// - `Err(TryReserveError)`: The arena could not grow.
    fn try_alloc_with<F>(&mut self, f: F) -> Result<Ptr, TryReserveError>
    where
        F: FnOnce(Ptr) -> Ptr::Data;

    /// Store data into the arena and return the allocated pointer.
    fn alloc(&mut self, data: Ptr::Data) -> Ptr { self.alloc_with(|_| data) }

    /// Deallocate the data of the pointer from the arena.
    ///
    /// # Returns
    ///
    /// - `Some(Ptr::Data)`: The data of the deallocated pointer.
    /// - `None`: The pointer is invalid.
    fn try_dealloc(&mut self, ptr: Ptr) -> Option<Ptr::Data>;

    /// Try to dereference a pointer.
    ///
    /// # Returns
    ///
    /// - `Some(&Ptr::Data)`: A reference to the data in the arena.
    /// - `None`: The pointer is invalid.
    fn try_deref(&self, ptr: Ptr) -> Option<&Ptr::Data>;

    /// Try to mutably dereference a pointer.
    ///
    /// # Returns
    ///
    /// - `Some(&mut Ptr::Data)`: A mutable reference to the data in the arena.
    /// - `None`: The pointer is invalid.
    fn try_deref_mut(&mut self, ptr: Ptr) -> Option<&mut Ptr::Data>;
}

/// A generic arena pointer.
///
/// The pointer can only be allocated by [`GenericArena`]. One should not create
/// a pointer manually.
///
/// The pointer is a raw index into the arena plus the generation of the slot
/// at the time of allocation, tagged with the id of the arena. Two pointers are
/// equal only if the arena, the index and the generation all match.
///
/// # Type Parameters
///
/// - `Data`: The type of the stored data, which is the same as the data type in
///   the arena.
pub struct GenericPtr<Data> {
    /// The id of the arena that allocated this pointer.
    arena: u64,
    /// The raw index of the pointer.
    index: usize,
    /// The generation of the slot when this pointer was handed out.
    generation: u64,
    _phantom: PhantomData<fn() -> Data>,
}

impl<Data> GenericPtr<Data> {
    fn new(arena: u64, index: usize, generation: u64) -> Self {
        Self {
            arena,
            index,
            generation,
            _phantom: PhantomData,
        }
    }

    /// Get the raw index of the slot.
    pub fn index(self) -> usize { self.index }
}

impl<Data> Clone for GenericPtr<Data> {
    fn clone(&self) -> Self { *self }
}

impl<Data> Copy for GenericPtr<Data> {}

impl<Data> Hash for GenericPtr<Data> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.arena.hash(state);
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<Data> PartialEq for GenericPtr<Data> {
    fn eq(&self, other: &Self) -> bool {
        self.arena == other.arena
            && self.index == other.index
            && self.generation == other.generation
    }
}

impl<Data> Eq for GenericPtr<Data> {}

impl<Data> fmt::Debug for GenericPtr<Data> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "*{}@{}#{}", self.index, self.generation, self.arena)
    }
}

/// An entry in a generic arena.
pub enum GenericEntry<Data> {
    /// The entry is vacant.
    ///
    /// The free list is not ordered by its index, but by the order of
    /// de-allocation, the last deallocated entry will be the first entry in
    /// the free list.
    Vacant {
        /// The index of the next vacant entry.
        next: Option<usize>,
        /// The generation the slot will carry when it is occupied again.
        generation: u64,
    },
    /// The entry is occupied.
    Occupied {
        /// The generation of the current occupant.
        generation: u64,
        data: Data,
    },
}

/// A generic arena.
///
/// # Type Parameters
///
/// - `Data`: The type of the stored data. All allocated pointers will have this
///   as the data type.
///
/// # Examples
///
/// ```
/// use slist::infra::storage::{Arena, ArenaPtr, GenericArena};
///
/// let mut arena = GenericArena::default();
///
/// let one = arena.alloc(1); // allocate a pointer with data 1
/// let two = arena.alloc(2); // allocate a pointer with data 2
///
/// assert_ne!(one, two); // allocated pointers are different
///
/// assert_eq!(one.try_deref(&arena), Some(&1));
/// assert_eq!(two.try_deref(&arena), Some(&2));
///
/// // the slot of `one` is reused, but `one` itself stays invalid
/// assert_eq!(arena.try_dealloc(one), Some(1));
/// let three = arena.alloc(3);
/// assert_eq!(one.try_deref(&arena), None);
/// assert_eq!(three.try_deref(&arena), Some(&3));
/// ```
pub struct GenericArena<Data> {
    /// The id stamped on every pointer this arena hands out.
    id: u64,
    /// The entries in the arena.
    ///
    /// An entry is not valid if it is [`GenericEntry::Vacant`]. Otherwise, it
    /// should store the data.
    entries: Vec<GenericEntry<Data>>,
    /// The head of the free list.
    ///
    /// This is the index of the first vacant entry, also the last deallocated
    /// entry.
    free_head: Option<usize>,
    /// The number of occupied entries.
    len: usize,
}

impl<Data> Default for GenericArena<Data> {
    fn default() -> Self { Self::with_capacity(0) }
}

impl<Data> GenericArena<Data> {
    /// Reserve additional capacity.
    pub fn reserve(&mut self, additional: usize) { self.entries.reserve(additional) }

    /// Try to reserve additional capacity.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.entries.try_reserve(additional)
    }

    /// Create a new arena with a specific capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id: NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed),
            entries: Vec::with_capacity(capacity),
            free_head: None,
            len: 0,
        }
    }

    /// The number of occupied entries.
    pub fn len(&self) -> usize { self.len }

    /// If no entry is occupied.
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// If `ptr` was allocated by this arena, whether or not it is still valid.
    pub fn owns(&self, ptr: GenericPtr<Data>) -> bool { ptr.arena == self.id }

    /// The entry `ptr` refers to, if it was allocated here.
    fn entry(&self, ptr: GenericPtr<Data>) -> Option<&GenericEntry<Data>> {
        if self.owns(ptr) {
            self.entries.get(ptr.index)
        } else {
            None
        }
    }

    /// See [`entry`](Self::entry).
    fn entry_mut(&mut self, ptr: GenericPtr<Data>) -> Option<&mut GenericEntry<Data>> {
        if self.owns(ptr) {
            self.entries.get_mut(ptr.index)
        } else {
            None
        }
    }

    /// The slot the next allocation will use, as an index and the generation
    /// its occupant will have.
    fn next_slot(&self) -> (usize, u64) {
        match self.free_head {
            Some(index) => match self.entries[index] {
                GenericEntry::Vacant { generation, .. } => (index, generation),
                // we have a `free_head`, this entry should be vacant
                GenericEntry::Occupied { .. } => unreachable!(),
            },
            // we have no `free_head`, so a new entry will be pushed
            None => (self.entries.len(), 0),
        }
    }

    /// Store `data` into the slot returned by [`next_slot`](Self::next_slot).
    fn occupy(&mut self, index: usize, generation: u64, data: Data) {
        let entry = GenericEntry::Occupied { generation, data };
        if index == self.entries.len() {
            self.entries.push(entry);
        } else {
            match mem::replace(&mut self.entries[index], entry) {
                // the vacant is taken, so the next will be the new `free_head`
                GenericEntry::Vacant { next, .. } => self.free_head = next,
                GenericEntry::Occupied { .. } => unreachable!(),
            }
        }
        self.len += 1;
    }
}

impl<Data> ArenaPtr for GenericPtr<Data> {
    type Arena = GenericArena<Data>;
    type Data = Data;
}

impl<Data> Arena<GenericPtr<Data>> for GenericArena<Data> {
    fn alloc_with<F>(&mut self, f: F) -> GenericPtr<Data>
    where
        F: FnOnce(GenericPtr<Data>) -> Data,
    {
        let (index, generation) = self.next_slot();
        let ptr = GenericPtr::new(self.id, index, generation);
        // nothing is touched until `f` returns
        let data = f(ptr);
        self.occupy(index, generation, data);
        ptr
    }

    fn try_alloc_with<F>(&mut self, f: F) -> Result<GenericPtr<Data>, TryReserveError>
    where
        F: FnOnce(GenericPtr<Data>) -> Data,
    {
        if self.free_head.is_none() {
            // a reused slot needs no storage, a pushed one does
            self.entries.try_reserve(1)?;
        }
        Ok(self.alloc_with(f))
    }

    fn try_dealloc(&mut self, ptr: GenericPtr<Data>) -> Option<Data> {
        match self.entry(ptr) {
            Some(GenericEntry::Occupied { generation, .. }) if *generation == ptr.generation => {}
            _ => return None,
        }
        let old_entry = mem::replace(
            &mut self.entries[ptr.index],
            GenericEntry::Vacant {
                next: self.free_head,
                generation: ptr.generation.wrapping_add(1),
            },
        );
        self.free_head = Some(ptr.index);
        self.len -= 1;
        match old_entry {
            GenericEntry::Occupied { data, .. } => Some(data),
            GenericEntry::Vacant { .. } => unreachable!(),
        }
    }

    fn try_deref(&self, ptr: GenericPtr<Data>) -> Option<&Data> {
        match self.entry(ptr)? {
            GenericEntry::Occupied { generation, data } if *generation == ptr.generation => {
                Some(data)
            }
            _ => None,
        }
    }

    fn try_deref_mut(&mut self, ptr: GenericPtr<Data>) -> Option<&mut Data> {
        match self.entry_mut(ptr)? {
            GenericEntry::Occupied { generation, data } if *generation == ptr.generation => {
                Some(data)
            }
            _ => None,
        }
    }
}

impl<Data> fmt::Debug for GenericArena<Data> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericArena")
            .field("id", &self.id)
            .field("len", &self.len)
            .field("slots", &self.entries.len())
            .field("free_head", &self.free_head)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_arena() {
        let mut arena = GenericArena::default();
        let ptr1 = arena.alloc(1);
        let ptr2 = arena.alloc(2);
        let ptr3 = arena.alloc(3);
        assert_eq!(arena.len(), 3);
        assert_eq!(ptr1.try_deref(&arena), Some(&1));
        assert_eq!(ptr2.try_deref(&arena), Some(&2));
        assert_eq!(ptr3.try_deref(&arena), Some(&3));
        assert_eq!(arena.try_dealloc(ptr2), Some(2));
        assert_eq!(arena.len(), 2);
        assert_eq!(ptr2.try_deref(&arena), None);
        let ptr4 = arena.alloc(4);
        // same slot, but a newer generation
        assert_eq!(ptr4.index(), ptr2.index());
        assert_ne!(ptr2, ptr4);
        assert_eq!(ptr2.try_deref(&arena), None);
        assert_eq!(ptr4.try_deref(&arena), Some(&4));
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn test_generic_arena_double_free() {
        let mut arena = GenericArena::default();
        let ptr1 = arena.alloc(1);
        assert_eq!(arena.try_dealloc(ptr1), Some(1));
        assert_eq!(arena.try_dealloc(ptr1), None); // double free
        assert!(arena.is_empty());
    }

    #[test]
    fn test_generic_arena_stale_dealloc() {
        let mut arena = GenericArena::default();
        let ptr1 = arena.alloc(1);
        arena.try_dealloc(ptr1).unwrap();
        let ptr2 = arena.alloc(2);
        // the stale pointer must not free the new occupant
        assert_eq!(arena.try_dealloc(ptr1), None);
        assert_eq!(ptr2.try_deref(&arena), Some(&2));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_generic_arena_invalid_index() {
        let mut arena = GenericArena::default();
        let ptr1 = arena.alloc(1);
        let mut ptr2 = ptr1;
        ptr2.index = 1; // should not happen in normal usage
        assert_eq!(arena.try_dealloc(ptr2), None);
        assert_eq!(ptr2.try_deref(&arena), None);
    }

    #[test]
    fn test_generic_arena_foreign_ptr() {
        let mut arena1 = GenericArena::default();
        let mut arena2 = GenericArena::default();
        let ptr1 = arena1.alloc(1);
        let ptr2 = arena2.alloc(2);
        // same slot and generation, different arenas
        assert_eq!(ptr1.index(), ptr2.index());
        assert_ne!(ptr1, ptr2);
        assert!(arena1.owns(ptr1));
        assert!(!arena2.owns(ptr1));

        assert_eq!(ptr1.try_deref(&arena2), None);
        assert_eq!(ptr1.try_deref_mut(&mut arena2), None);
        assert_eq!(arena2.try_dealloc(ptr1), None);
        assert_eq!(arena2.len(), 1);
        assert_eq!(ptr2.try_deref(&arena2), Some(&2));
    }

    #[test]
    fn test_generic_arena_free_list_is_lifo() {
        let mut arena = GenericArena::default();
        let ptrs: Vec<_> = (0..4).map(|i| arena.alloc(i)).collect();
        arena.try_dealloc(ptrs[1]).unwrap();
        arena.try_dealloc(ptrs[3]).unwrap();
        assert_eq!(arena.alloc(10).index(), 3);
        assert_eq!(arena.alloc(11).index(), 1);
        assert_eq!(arena.alloc(12).index(), 4);
    }

    #[test]
    fn test_generic_arena_try_alloc() {
        let mut arena = GenericArena::with_capacity(1);
        let ptr1 = arena.try_alloc_with(|_| "a").unwrap();
        let ptr2 = arena.try_alloc_with(|_| "b").unwrap();
        arena.try_dealloc(ptr1).unwrap();
        let ptr3 = arena.try_alloc_with(|_| "c").unwrap();
        assert_eq!(ptr3.index(), ptr1.index());
        assert_eq!(ptr2.try_deref(&arena), Some(&"b"));
        assert_eq!(ptr3.try_deref(&arena), Some(&"c"));
    }

    #[test]
    fn test_generic_arena_alloc_with_self_ptr() {
        let mut arena: GenericArena<usize> = GenericArena::default();
        let ptr = arena.alloc_with(|ptr| ptr.index());
        assert_eq!(ptr.try_deref(&arena), Some(&ptr.index()));
    }

    #[test]
    fn test_generic_arena_deref_mut() {
        let mut arena = GenericArena::default();
        let ptr1 = arena.alloc(1);
        *ptr1.deref_mut(&mut arena) = 5;
        assert_eq!(*ptr1.deref(&arena), 5);
        arena.try_dealloc(ptr1).unwrap();
        assert_eq!(ptr1.try_deref_mut(&mut arena), None);
    }

    #[test]
    #[should_panic(expected = "invalid pointer dereferenced")]
    fn test_generic_arena_deref_panics_on_stale() {
        let mut arena = GenericArena::default();
        let ptr1 = arena.alloc(1);
        arena.try_dealloc(ptr1).unwrap();
        let _ = ptr1.deref(&arena);
    }
}
