//! Point-keyed hash table.
//!
//! An open-addressing table (linear probing) whose keys are 2D points and
//! whose hash and equality come from a [`PointKey`] scheme. Capacity is
//! always a power of two so the probe position is a mask of the hash.
//! There is no removal; the table only ever grows.
//!
//! The default scheme, [`ExactPoint`], hashes the raw IEEE-754 bits of each
//! coordinate with a fixed 32-bit mixing function. The values it produces
//! are part of the crate's contract and are pinned by tests, so that probe
//! sequences (and therefore iteration-independent behavior) are identical
//! across platforms.

use crate::types::Point;

/// Hash and equality scheme for [`PointHashTable`] keys.
///
/// Implementations must keep the two consistent: points that compare equal
/// must hash equal for lookups to find them.
pub trait PointKey {
    /// Non-negative 32-bit hash of a point.
    fn hash_point(&self, point: Point) -> u32;

    /// Whether two points are the same key.
    fn eq_point(&self, a: Point, b: Point) -> bool;
}

/// Exact-match scheme: [`hash_point`] plus bitwise-value float equality.
///
/// `0.0` and `-0.0` compare equal but hash differently, so they do not
/// reliably find each other. Upstream quantization never produces negative
/// zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExactPoint;

impl PointKey for ExactPoint {
    fn hash_point(&self, point: Point) -> u32 {
        hash_point(point)
    }

    fn eq_point(&self, a: Point, b: Point) -> bool {
        a == b
    }
}

/// Mix the two 32-bit halves of a float's bit pattern into one word.
///
/// The halves are XORed, then folded with
/// `x ^= (x >> 20) ^ (x >> 12); x ^= (x >> 7) ^ (x >> 4)` using logical
/// shifts. The result is the same bit pattern read as a signed integer.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub const fn hash_float(value: f64) -> i32 {
    let bits = value.to_bits();
    let mut x = (bits as u32) ^ ((bits >> 32) as u32);
    x ^= (x >> 20) ^ (x >> 12);
    x ^= (x >> 7) ^ (x >> 4);
    x as i32
}

/// Hash a point as `hash_float(x) + 31 * hash_float(y)` in wrapping 32-bit
/// signed arithmetic, with negative results bit-inverted so the hash is
/// never negative.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub const fn hash_point(point: Point) -> u32 {
    let h = hash_float(point.x).wrapping_add(hash_float(point.y).wrapping_mul(31));
    (if h < 0 { !h } else { h }) as u32
}

/// Largest slot count a capacity hint can request up front. Tables can
/// still grow past it as entries arrive.
pub const MAX_INITIAL_CAPACITY: usize = 1 << 24;

/// Smallest power of two that can hold `hint` entries (at least 1), capped
/// at [`MAX_INITIAL_CAPACITY`].
#[must_use]
pub const fn capacity_for(hint: usize) -> usize {
    if hint <= 1 {
        1
    } else if hint >= MAX_INITIAL_CAPACITY {
        MAX_INITIAL_CAPACITY
    } else {
        hint.next_power_of_two()
    }
}

/// Associative container keyed by [`Point`].
#[derive(Debug, Clone)]
pub struct PointHashTable<V, K = ExactPoint> {
    slots: Vec<Option<(Point, V)>>,
    len: usize,
    key: K,
}

impl<V> PointHashTable<V> {
    /// Create a table with the [`ExactPoint`] scheme, sized for about
    /// `hint` entries.
    #[must_use]
    pub fn with_capacity_hint(hint: usize) -> Self {
        Self::with_key(hint, ExactPoint)
    }
}

impl<V, K: PointKey> PointHashTable<V, K> {
    /// Create a table with a custom key scheme, sized for about `hint`
    /// entries.
    #[must_use]
    pub fn with_key(hint: usize, key: K) -> Self {
        Self {
            slots: empty_slots(capacity_for(hint)),
            len: 0,
            key,
        }
    }

    /// Number of stored entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing has been stored.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current number of slots (always a power of two).
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// The value stored for `point`, if any.
    #[must_use]
    pub fn get(&self, point: Point) -> Option<&V> {
        match self.find(point) {
            Probe::Occupied(i) => self.slots[i].as_ref().map(|(_, v)| v),
            Probe::Vacant(_) => None,
        }
    }

    /// Mutable access to the value stored for `point`, if any.
    pub fn get_mut(&mut self, point: Point) -> Option<&mut V> {
        match self.find(point) {
            Probe::Occupied(i) => self.slots[i].as_mut().map(|(_, v)| v),
            Probe::Vacant(_) => None,
        }
    }

    /// Store `value` for `point`, replacing any previous value.
    pub fn set(&mut self, point: Point, value: V) {
        let i = self.slot_for_insert(point);
        let slot = &mut self.slots[i];
        if let Some((_, existing)) = slot {
            *existing = value;
        } else {
            *slot = Some((point, value));
            self.len += 1;
        }
    }

    /// The value stored for `point`, inserting `make()` first if absent.
    pub fn get_or_insert_with(&mut self, point: Point, make: impl FnOnce() -> V) -> &mut V {
        let i = self.slot_for_insert(point);
        let slot = &mut self.slots[i];
        if slot.is_none() {
            self.len += 1;
        }
        &mut slot.get_or_insert_with(|| (point, make())).1
    }

    /// Iterate over stored entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Point, &V)> {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref().map(|(p, v)| (*p, v)))
    }

    /// Index of the slot holding `point`, or the vacant slot where it
    /// would go. Grows first when an insert would leave the table more
    /// than three quarters full.
    fn slot_for_insert(&mut self, point: Point) -> usize {
        match self.find(point) {
            Probe::Occupied(i) => i,
            Probe::Vacant(i) => {
                if (self.len + 1) * 4 > self.capacity() * 3 {
                    self.grow();
                    match self.find(point) {
                        Probe::Occupied(i) | Probe::Vacant(i) => i,
                    }
                } else {
                    i
                }
            }
        }
    }

    /// Linear probe from the point's home slot.
    ///
    /// The load-factor bound keeps at least one slot vacant, so the probe
    /// always terminates within `capacity` steps.
    fn find(&self, point: Point) -> Probe {
        let mask = self.capacity() - 1;
        let mut i = self.key.hash_point(point) as usize & mask;
        loop {
            match &self.slots[i] {
                None => return Probe::Vacant(i),
                Some((p, _)) if self.key.eq_point(*p, point) => return Probe::Occupied(i),
                Some(_) => i = (i + 1) & mask,
            }
        }
    }

    /// Double the slot count and reinsert every entry.
    fn grow(&mut self) {
        let doubled = self.capacity() * 2;
        let old = std::mem::replace(&mut self.slots, empty_slots(doubled));
        let mask = self.capacity() - 1;
        for (point, value) in old.into_iter().flatten() {
            let mut i = self.key.hash_point(point) as usize & mask;
            while self.slots[i].is_some() {
                i = (i + 1) & mask;
            }
            self.slots[i] = Some((point, value));
        }
    }
}

/// Outcome of a probe: the slot holds the key, or the key is absent and
/// this is the first vacant slot on its chain.
enum Probe {
    Occupied(usize),
    Vacant(usize),
}

fn empty_slots<V>(capacity: usize) -> Vec<Option<(Point, V)>> {
    std::iter::repeat_with(|| None).take(capacity).collect()
}
