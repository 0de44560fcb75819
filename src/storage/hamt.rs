//! Persistent hash array mapped trie
//!
//! Every update returns a new map. Only the nodes on the path from the root
//! to the touched slot are copied; all other nodes are shared with the prior
//! version through `Arc`. A published node is never mutated.
//!
//! Keys are hashed with `FxHasher`, consumed five bits per level. Keys whose
//! full 64-bit hashes are equal share a collision slot.

use rustc_hash::FxHasher;
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;
use std::sync::Arc;

const BITS: u32 = 5;
const MASK: u64 = (1 << BITS) - 1;

type Entry<K, V> = Arc<(K, V)>;

fn hash_key<Q: Hash + ?Sized>(key: &Q) -> u64 {
    let mut hasher = FxHasher::default();
    key.hash(&mut hasher);
    hasher.finish()
}

#[inline]
fn fragment(hash: u64, shift: u32) -> u32 {
    ((hash >> shift) & MASK) as u32
}

enum Slot<K, V> {
    Leaf(u64, Entry<K, V>),
    Collision(u64, Vec<Entry<K, V>>),
    Branch(Arc<Node<K, V>>),
}

impl<K, V> Clone for Slot<K, V> {
    fn clone(&self) -> Self {
        match self {
            Slot::Leaf(hash, entry) => Slot::Leaf(*hash, Arc::clone(entry)),
            Slot::Collision(hash, entries) => Slot::Collision(*hash, entries.clone()),
            Slot::Branch(node) => Slot::Branch(Arc::clone(node)),
        }
    }
}

struct Node<K, V> {
    bitmap: u32,
    slots: Vec<Slot<K, V>>,
}

impl<K, V> Node<K, V> {
    fn empty() -> Self {
        Node {
            bitmap: 0,
            slots: Vec::new(),
        }
    }

    #[inline]
    fn position(&self, bit: u32) -> usize {
        (self.bitmap & (bit - 1)).count_ones() as usize
    }

    /// Node holding two slots whose hashes differ at or below `shift`
    fn pair(shift: u32, h1: u64, s1: Slot<K, V>, h2: u64, s2: Slot<K, V>) -> Self {
        let f1 = fragment(h1, shift);
        let f2 = fragment(h2, shift);
        if f1 == f2 {
            let child = Self::pair(shift + BITS, h1, s1, h2, s2);
            return Node {
                bitmap: 1 << f1,
                slots: vec![Slot::Branch(Arc::new(child))],
            };
        }
        let slots = if f1 < f2 { vec![s1, s2] } else { vec![s2, s1] };
        Node {
            bitmap: (1 << f1) | (1 << f2),
            slots,
        }
    }

    /// Collapse a node into the slot its parent should hold
    fn into_slot(mut self) -> Option<Slot<K, V>> {
        match self.slots.len() {
            0 => None,
            1 if !matches!(self.slots[0], Slot::Branch(_)) => self.slots.pop(),
            _ => Some(Slot::Branch(Arc::new(self))),
        }
    }

    fn get<Q>(&self, hash: u64, shift: u32, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let bit = 1 << fragment(hash, shift);
        if self.bitmap & bit == 0 {
            return None;
        }
        match &self.slots[self.position(bit)] {
            Slot::Leaf(h, entry) => {
                (*h == hash && Borrow::<Q>::borrow(&entry.0) == key).then_some(&entry.1)
            }
            Slot::Collision(h, entries) if *h == hash => entries
                .iter()
                .find(|entry| Borrow::<Q>::borrow(&entry.0) == key)
                .map(|entry| &entry.1),
            Slot::Collision(..) => None,
            Slot::Branch(node) => node.get(hash, shift + BITS, key),
        }
    }
}

impl<K: Eq, V> Node<K, V> {
    /// Copy of this node with `entry` stored; the flag reports a new key
    fn insert(&self, hash: u64, shift: u32, entry: Entry<K, V>) -> (Self, bool) {
        let bit = 1 << fragment(hash, shift);
        let idx = self.position(bit);
        let mut slots = self.slots.clone();

        if self.bitmap & bit == 0 {
            slots.insert(idx, Slot::Leaf(hash, entry));
            return (
                Node {
                    bitmap: self.bitmap | bit,
                    slots,
                },
                true,
            );
        }

        let (slot, added) = match &self.slots[idx] {
            Slot::Leaf(h, existing) if *h == hash => {
                if existing.0 == entry.0 {
                    (Slot::Leaf(hash, entry), false)
                } else {
                    (Slot::Collision(hash, vec![Arc::clone(existing), entry]), true)
                }
            }
            Slot::Leaf(h, existing) => {
                let node = Self::pair(
                    shift + BITS,
                    *h,
                    Slot::Leaf(*h, Arc::clone(existing)),
                    hash,
                    Slot::Leaf(hash, entry),
                );
                (Slot::Branch(Arc::new(node)), true)
            }
            Slot::Collision(h, entries) if *h == hash => {
                let mut entries = entries.clone();
                match entries.iter().position(|e| e.0 == entry.0) {
                    Some(pos) => {
                        entries[pos] = entry;
                        (Slot::Collision(hash, entries), false)
                    }
                    None => {
                        entries.push(entry);
                        (Slot::Collision(hash, entries), true)
                    }
                }
            }
            Slot::Collision(h, entries) => {
                let node = Self::pair(
                    shift + BITS,
                    *h,
                    Slot::Collision(*h, entries.clone()),
                    hash,
                    Slot::Leaf(hash, entry),
                );
                (Slot::Branch(Arc::new(node)), true)
            }
            Slot::Branch(child) => {
                let (node, added) = child.insert(hash, shift + BITS, entry);
                (Slot::Branch(Arc::new(node)), added)
            }
        };

        slots[idx] = slot;
        (
            Node {
                bitmap: self.bitmap,
                slots,
            },
            added,
        )
    }

    /// Copy of this node without `key`, or `None` when the key is absent
    fn remove<Q>(&self, hash: u64, shift: u32, key: &Q) -> Option<Self>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let bit = 1 << fragment(hash, shift);
        if self.bitmap & bit == 0 {
            return None;
        }
        let idx = self.position(bit);

        let replacement = match &self.slots[idx] {
            Slot::Leaf(h, entry) => {
                if *h != hash || Borrow::<Q>::borrow(&entry.0) != key {
                    return None;
                }
                None
            }
            Slot::Collision(h, entries) => {
                if *h != hash {
                    return None;
                }
                let pos = entries.iter().position(|e| Borrow::<Q>::borrow(&e.0) == key)?;
                let mut rest = entries.clone();
                rest.remove(pos);
                if rest.len() == 1 {
                    rest.pop().map(|entry| Slot::Leaf(hash, entry))
                } else {
                    Some(Slot::Collision(hash, rest))
                }
            }
            Slot::Branch(child) => child.remove(hash, shift + BITS, key)?.into_slot(),
        };

        let mut slots = self.slots.clone();
        let mut bitmap = self.bitmap;
        match replacement {
            Some(slot) => slots[idx] = slot,
            None => {
                slots.remove(idx);
                bitmap &= !bit;
            }
        }
        Some(Node { bitmap, slots })
    }
}

/// Persistent hash map with structural sharing
pub struct HamtMap<K, V> {
    root: Option<Arc<Node<K, V>>>,
    len: usize,
}

impl<K, V> Clone for HamtMap<K, V> {
    fn clone(&self) -> Self {
        HamtMap {
            root: self.root.clone(),
            len: self.len,
        }
    }
}

impl<K, V> Default for HamtMap<K, V> {
    fn default() -> Self {
        HamtMap { root: None, len: 0 }
    }
}

impl<K, V> HamtMap<K, V> {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the map is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if two maps share the same root node
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Borrowing iterator over entries, in trie order
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            stack: self.root.iter().map(|node| node.slots.iter()).collect(),
            collision: None,
            remaining: self.len,
        }
    }

    /// Borrowing iterator over keys
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    /// Borrowing iterator over values
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }
}

impl<K: Hash + Eq, V> HamtMap<K, V> {
    /// Look up a value
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.root
            .as_ref()
            .and_then(|root| root.get(hash_key(key), 0, key))
    }

    /// Check if a key is present
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// New map with `key` set to `value`
    pub fn insert(&self, key: K, value: V) -> Self {
        let hash = hash_key(&key);
        let entry = Arc::new((key, value));
        let (root, added) = match &self.root {
            Some(root) => root.insert(hash, 0, entry),
            None => Node::empty().insert(hash, 0, entry),
        };
        HamtMap {
            root: Some(Arc::new(root)),
            len: if added { self.len + 1 } else { self.len },
        }
    }

    /// New map without `key`; shares the root when the key is absent
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self
            .root
            .as_ref()
            .and_then(|root| root.remove(hash_key(key), 0, key));
        match removed {
            Some(root) if root.slots.is_empty() => HamtMap::new(),
            Some(root) => HamtMap {
                root: Some(Arc::new(root)),
                len: self.len - 1,
            },
            None => self.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for HamtMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for HamtMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(HamtMap::new(), |map, (k, v)| map.insert(k, v))
    }
}

impl<'a, K, V> IntoIterator for &'a HamtMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Clone, V: Clone> IntoIterator for HamtMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            stack: self.root.into_iter().map(|node| (node, 0)).collect(),
            collision: None,
        }
    }
}

/// Borrowing iterator over a `HamtMap`
pub struct Iter<'a, K, V> {
    stack: Vec<std::slice::Iter<'a, Slot<K, V>>>,
    collision: Option<std::slice::Iter<'a, Entry<K, V>>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entries) = &mut self.collision {
                if let Some(entry) = entries.next() {
                    self.remaining -= 1;
                    return Some((&entry.0, &entry.1));
                }
                self.collision = None;
            }
            let slots = self.stack.last_mut()?;
            match slots.next() {
                None => {
                    self.stack.pop();
                }
                Some(Slot::Leaf(_, entry)) => {
                    self.remaining -= 1;
                    return Some((&entry.0, &entry.1));
                }
                Some(Slot::Collision(_, entries)) => self.collision = Some(entries.iter()),
                Some(Slot::Branch(node)) => self.stack.push(node.slots.iter()),
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

/// Owning iterator over a `HamtMap`.
///
/// Holds `Arc`s to the nodes it still has to visit, so it stays valid after
/// the map it came from is dropped or replaced.
pub struct IntoIter<K, V> {
    stack: Vec<(Arc<Node<K, V>>, usize)>,
    collision: Option<(Vec<Entry<K, V>>, usize)>,
}

impl<K: Clone, V: Clone> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((entries, pos)) = &mut self.collision {
                if let Some(entry) = entries.get(*pos) {
                    *pos += 1;
                    return Some((entry.0.clone(), entry.1.clone()));
                }
                self.collision = None;
            }
            let (node, pos) = self.stack.last_mut()?;
            let Some(slot) = node.slots.get(*pos).cloned() else {
                self.stack.pop();
                continue;
            };
            *pos += 1;
            match slot {
                Slot::Leaf(_, entry) => return Some((entry.0.clone(), entry.1.clone())),
                Slot::Collision(_, entries) => self.collision = Some((entries, 0)),
                Slot::Branch(child) => self.stack.push((child, 0)),
            }
        }
    }
}

/// Persistent hash set with structural sharing
pub struct HamtSet<T> {
    map: HamtMap<T, ()>,
}

impl<T> Clone for HamtSet<T> {
    fn clone(&self) -> Self {
        HamtSet {
            map: self.map.clone(),
        }
    }
}

impl<T> Default for HamtSet<T> {
    fn default() -> Self {
        HamtSet {
            map: HamtMap::new(),
        }
    }
}

impl<T> HamtSet<T> {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Check if two sets share the same root node
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.map.ptr_eq(&other.map)
    }

    /// Borrowing iterator over members
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.map.keys()
    }
}

impl<T: Hash + Eq> HamtSet<T> {
    /// Check membership
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(value)
    }

    /// New set with `value` added; shares the root when already present
    pub fn insert(&self, value: T) -> Self {
        if self.contains(&value) {
            return self.clone();
        }
        HamtSet {
            map: self.map.insert(value, ()),
        }
    }

    /// New set without `value`
    pub fn remove<Q>(&self, value: &Q) -> Self
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        HamtSet {
            map: self.map.remove(value),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for HamtSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: Hash + Eq> FromIterator<T> for HamtSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        iter.into_iter().fold(HamtSet::new(), |set, v| set.insert(v))
    }
}

impl<T: Clone> IntoIterator for HamtSet<T> {
    type Item = T;
    type IntoIter = std::iter::Map<IntoIter<T, ()>, fn((T, ())) -> T>;

    fn into_iter(self) -> Self::IntoIter {
        let first: fn((T, ())) -> T = |(value, ())| value;
        self.map.into_iter().map(first)
    }
}
