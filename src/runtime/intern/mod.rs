//! Interning store
//!
//! Maps an ordered tuple of heterogeneous keys to one canonical value. The
//! store is a chain of per-position maps: position *i*'s map, keyed by the
//! [`KeyBox`] of `keys[i]`, yields a slot holding the value stored for the
//! path ending there and the map for position *i + 1*.
//!
//! | Key kind | Boxed by | Retained |
//! |----------|----------|----------|
//! | null, bool, numbers, strings, symbols, labeled functions, tags | value | strongly |
//! | lists, records, functions, lazy accessors, instances | address | weakly |
//!
//! Stored values follow the store's [`Retention`]. Entries whose key or
//! value died are invisible to lookups and are reclaimed by [`InternStore::purge`].
//!
//! All operations take one `parking_lot::Mutex`; [`InternStore::get_or_insert_with`]
//! looks up and inserts under a single acquisition, which is what keeps
//! concurrent canonical construction convergent.

mod key;

pub use key::{KeyBox, RefKey};

use hashbrown::{HashMap, HashSet};
use parking_lot::Mutex;

use crate::error::{Result, StoreError};
use crate::runtime::value::{Value, WeakValue};

/// How a store holds its values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retention {
    /// Values stay alive as long as their keys are alive
    ///
    /// A value that reaches one of its own reference keys, directly or
    /// through instance fields, list items or record entries, is held weakly
    /// instead, so an entry never keeps its key alive. Closures are opaque
    /// and are not searched.
    Strong,
    /// Reference values are held weakly and vanish with their last owner
    Weak,
}

#[derive(Debug, Clone)]
enum Stored {
    Strong(Value),
    Weak(WeakValue),
}

impl Stored {
    fn load(&self) -> Option<Value> {
        match self {
            Stored::Strong(v) => Some(v.clone()),
            Stored::Weak(w) => w.upgrade(),
        }
    }

    fn is_alive(&self) -> bool {
        match self {
            Stored::Strong(_) => true,
            Stored::Weak(w) => w.is_alive(),
        }
    }
}

type Level = HashMap<KeyBox, Slot>;

#[derive(Debug, Default)]
struct Slot {
    value: Option<Stored>,
    next: Option<Level>,
}

/// Canonicalizing multi-key store
#[derive(Debug)]
pub struct InternStore {
    root: Mutex<Level>,
    retention: Retention,
}

impl Default for InternStore {
    fn default() -> Self {
        Self::new(Retention::Weak)
    }
}

impl InternStore {
    /// Create an empty store
    pub fn new(retention: Retention) -> Self {
        Self {
            root: Mutex::new(Level::new()),
            retention,
        }
    }

    /// Retention policy of this store
    pub fn retention(&self) -> Retention {
        self.retention
    }

    /// Look up the value stored under exactly `keys`
    pub fn get(
        &self,
        keys: &[Value],
    ) -> Result<Option<Value>> {
        self.get_boxed(&box_keys(keys)?)
    }

    /// Check whether a live value is stored under exactly `keys`
    pub fn has(
        &self,
        keys: &[Value],
    ) -> Result<bool> {
        Ok(self.get(keys)?.is_some())
    }

    /// Store `value` under `keys`, creating intermediate maps as needed
    pub fn set(
        &self,
        keys: &[Value],
        value: Value,
    ) -> Result<()> {
        let boxes = box_keys(keys)?;
        let (last, path) = split(&boxes)?;
        let stored = self.stored(&boxes, &value);
        let mut root = self.root.lock();
        slot_mut(&mut root, path, last).value = Some(stored);
        Ok(())
    }

    /// Remove the value stored under exactly `keys`
    ///
    /// Returns `false` when no live value ends at that path, whether the path
    /// is shorter, longer or diverges from every stored one.
    pub fn delete(
        &self,
        keys: &[Value],
    ) -> Result<bool> {
        let boxes = box_keys(keys)?;
        let mut root = self.root.lock();
        let Some(slot) = find_mut(&mut root, &boxes) else {
            return Ok(false);
        };
        Ok(slot.value.take().is_some_and(|stored| stored.is_alive()))
    }

    /// Return the value under `keys`, inserting `make()` if none is live
    pub fn get_or_insert_with<F>(
        &self,
        keys: &[Value],
        make: F,
    ) -> Result<Value>
    where
        F: FnOnce() -> Value,
    {
        Ok(self.intern_boxed(&box_keys(keys)?, make)?.0)
    }

    /// Drop every entry whose key or value died
    ///
    /// Returns the number of stored values released.
    pub fn purge(&self) -> usize {
        let mut root = self.root.lock();
        purge_level(&mut root)
    }

    /// Number of live stored values
    pub fn len(&self) -> usize {
        let root = self.root.lock();
        count_live(&root)
    }

    /// Check whether no live value is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove everything
    pub fn clear(&self) {
        self.root.lock().clear();
    }

    pub(crate) fn get_boxed(
        &self,
        keys: &[KeyBox],
    ) -> Result<Option<Value>> {
        if keys.is_empty() {
            return Err(StoreError::EmptyKeyPath.into());
        }
        let root = self.root.lock();
        Ok(find(&root, keys)
            .and_then(|slot| slot.value.as_ref())
            .and_then(Stored::load))
    }

    /// Lookup-or-create; the flag reports whether `make` ran
    ///
    /// `make` runs with the store locked and must not call back into it.
    pub(crate) fn intern_boxed<F>(
        &self,
        keys: &[KeyBox],
        make: F,
    ) -> Result<(Value, bool)>
    where
        F: FnOnce() -> Value,
    {
        let (last, path) = split(keys)?;
        let mut root = self.root.lock();
        let slot = slot_mut(&mut root, path, last);
        if let Some(existing) = slot.value.as_ref().and_then(Stored::load) {
            return Ok((existing, false));
        }
        let value = make();
        slot.value = Some(self.stored(keys, &value));
        Ok((value, true))
    }

    fn stored(
        &self,
        keys: &[KeyBox],
        value: &Value,
    ) -> Stored {
        match self.retention {
            Retention::Strong if !reaches_key(value, keys) => Stored::Strong(value.clone()),
            _ => Stored::Weak(value.downgrade()),
        }
    }
}

/// Whether `value` holds one of the reference `keys`
fn reaches_key(
    value: &Value,
    keys: &[KeyBox],
) -> bool {
    let targets: Vec<usize> = keys.iter().filter_map(KeyBox::addr).collect();
    if targets.is_empty() {
        return false;
    }
    let mut seen = HashSet::new();
    let mut pending = vec![value];
    while let Some(value) = pending.pop() {
        let Some(addr) = KeyBox::of(value).addr() else {
            continue;
        };
        if targets.contains(&addr) {
            return true;
        }
        if !seen.insert(addr) {
            continue;
        }
        match value {
            Value::Instance(instance) => pending.extend(instance.raw_fields()),
            Value::List(items) => pending.extend(items.iter()),
            Value::Record(record) => pending.extend(record.values()),
            _ => {}
        }
    }
    false
}

fn box_keys(keys: &[Value]) -> Result<Vec<KeyBox>> {
    if keys.is_empty() {
        return Err(StoreError::EmptyKeyPath.into());
    }
    Ok(keys.iter().map(KeyBox::of).collect())
}

fn find<'a>(
    root: &'a Level,
    keys: &[KeyBox],
) -> Option<&'a Slot> {
    let (last, path) = keys.split_last()?;
    let mut level = root;
    for key in path {
        level = level.get(key)?.next.as_ref()?;
    }
    level.get(last)
}

fn find_mut<'a>(
    root: &'a mut Level,
    keys: &[KeyBox],
) -> Option<&'a mut Slot> {
    let (last, path) = keys.split_last()?;
    let mut level = root;
    for key in path {
        level = level.get_mut(key)?.next.as_mut()?;
    }
    level.get_mut(last)
}

fn split(keys: &[KeyBox]) -> Result<(&KeyBox, &[KeyBox])> {
    keys.split_last()
        .ok_or_else(|| StoreError::EmptyKeyPath.into())
}

/// Walk to the slot for `path` followed by `last`, creating missing maps
fn slot_mut<'a>(
    root: &'a mut Level,
    path: &[KeyBox],
    last: &KeyBox,
) -> &'a mut Slot {
    let mut level = root;
    for key in path {
        level = level
            .entry(key.clone())
            .or_default()
            .next
            .get_or_insert_with(Level::new);
    }
    level.entry(last.clone()).or_default()
}

fn count_all(level: &Level) -> usize {
    level
        .values()
        .map(|slot| {
            usize::from(slot.value.is_some()) + slot.next.as_ref().map_or(0, count_all)
        })
        .sum()
}

fn count_live(level: &Level) -> usize {
    level
        .iter()
        .filter(|(key, _)| key.is_alive())
        .map(|(_, slot)| {
            usize::from(slot.value.as_ref().is_some_and(Stored::is_alive))
                + slot.next.as_ref().map_or(0, count_live)
        })
        .sum()
}

fn purge_level(level: &mut Level) -> usize {
    let mut released = 0;
    level.retain(|key, slot| {
        if !key.is_alive() {
            released += usize::from(slot.value.is_some()) + slot.next.as_ref().map_or(0, count_all);
            return false;
        }
        if slot.value.as_ref().is_some_and(|stored| !stored.is_alive()) {
            slot.value = None;
            released += 1;
        }
        if let Some(next) = slot.next.as_mut() {
            released += purge_level(next);
            if next.is_empty() {
                slot.next = None;
            }
        }
        slot.value.is_some() || slot.next.is_some()
    });
    released
}
