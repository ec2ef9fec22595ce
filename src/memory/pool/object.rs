/*!
 * Pooled Objects
 * Fixed-size buffers handed out by the size-class pools
 */

use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide id source so objects from different managers never collide
static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Size classes, smallest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    Small,
    Medium,
    Large,
    XLarge,
}

impl SizeClass {
    pub const ALL: [SizeClass; 4] = [
        SizeClass::Small,
        SizeClass::Medium,
        SizeClass::Large,
        SizeClass::XLarge,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SizeClass::Small => "small",
            SizeClass::Medium => "medium",
            SizeClass::Large => "large",
            SizeClass::XLarge => "xlarge",
        }
    }
}

impl std::fmt::Display for SizeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A fixed-size buffer owned by the caller while checked out
///
/// Ownership moves to the caller on allocation and back to the pool on a
/// successful return. A rejected return hands the object back untouched.
#[derive(Debug, PartialEq, Eq)]
pub struct PoolObject {
    id: u64,
    class: SizeClass,
    buffer: Box<[u8]>,
}

impl PoolObject {
    pub(super) fn fresh(class: SizeClass, size: usize) -> Self {
        Self {
            id: NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed),
            class,
            buffer: vec![0u8; size].into_boxed_slice(),
        }
    }

    /// Unique identity of this object
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Class the object was allocated from
    #[inline]
    pub fn size_class(&self) -> SizeClass {
        self.class
    }

    /// Fixed byte size of the object
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Zero the contents before the object is reused
    pub(super) fn scrub(&mut self) {
        self.buffer.fill(0);
    }
}

impl Deref for PoolObject {
    type Target = [u8];

    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        &self.buffer
    }
}

impl DerefMut for PoolObject {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buffer
    }
}
