//! Handle: a copyable, identity-compared reference to an interned string.

use crate::entry::Entry;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{BuildHasherDefault, Hash, Hasher};
use std::collections::{HashMap, HashSet};

/// A reference to the canonical entry for one byte string.
///
/// Equality is pointer identity and hashing reuses the entry's stored
/// hash, so both are O(1) regardless of length. The lifetime `'t` is the
/// borrow of the owning [`InternTable`](crate::InternTable); handles from
/// the global pool are `Handle<'static>`.
#[derive(Copy, Clone)]
pub struct Handle<'t> {
    entry: &'t Entry,
}

impl<'t> Handle<'t> {
    /// Wrap an entry, counting the issued handle.
    #[inline]
    pub(crate) fn issue(entry: &'t Entry) -> Self {
        entry.issue();
        Self { entry }
    }

    /// The interned bytes.
    #[inline]
    pub fn as_bytes(&self) -> &'t [u8] {
        self.entry.bytes()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entry.bytes().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entry.bytes().is_empty()
    }

    /// The bytes as `str` if they are valid UTF-8.
    pub fn to_str(&self) -> Result<&'t str, core::str::Utf8Error> {
        core::str::from_utf8(self.entry.bytes())
    }

    /// The content hash computed when the entry was created.
    #[inline]
    pub fn hash_value(&self) -> u64 {
        self.entry.hash()
    }

    /// How many handles have been issued for this entry by `intern` and
    /// `lookup`. Copies of a handle are not counted.
    pub fn request_count(&self) -> usize {
        self.entry.issued()
    }

    /// Whether two handles refer to the same entry.
    #[inline]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        core::ptr::eq(a.entry, b.entry)
    }
}

impl PartialEq for Handle<'_> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Handle::ptr_eq(self, other)
    }
}

impl Eq for Handle<'_> {}

impl Hash for Handle<'_> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.entry.hash());
    }
}

// Content order, with the address as tie-break so `Ord` agrees with
// identity equality for equal strings from different tables.
impl Ord for Handle<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        if Handle::ptr_eq(self, other) {
            return Ordering::Equal;
        }
        self.as_bytes()
            .cmp(other.as_bytes())
            .then_with(|| (self.entry as *const Entry).cmp(&(other.entry as *const Entry)))
    }
}

impl PartialOrd for Handle<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq<[u8]> for Handle<'_> {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl PartialEq<str> for Handle<'_> {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for Handle<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl AsRef<[u8]> for Handle<'_> {
    fn as_ref(&self) -> &[u8] {
        self.entry.bytes()
    }
}

impl fmt::Display for Handle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_str() {
            Ok(s) => f.pad(s),
            Err(_) => f.pad(&String::from_utf8_lossy(self.as_bytes())),
        }
    }
}

impl fmt::Debug for Handle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handle")
            .field(&String::from_utf8_lossy(self.as_bytes()))
            .finish()
    }
}

/// Hasher for handle-keyed collections: passes the stored content hash
/// through instead of hashing again.
#[derive(Default, Clone, Copy, Debug)]
pub struct HandleHasher {
    hash: u64,
}

impl Hasher for HandleHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }

    #[inline]
    fn write_u64(&mut self, n: u64) {
        self.hash = n;
    }

    // Only reached if something other than a `Handle` is hashed.
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.hash = self.hash.rotate_left(8) ^ u64::from(b);
        }
    }
}

pub type HandleBuildHasher = BuildHasherDefault<HandleHasher>;

/// `HashMap` keyed by handles without re-hashing string bytes.
pub type HandleMap<'t, V> = HashMap<Handle<'t>, V, HandleBuildHasher>;

/// `HashSet` of handles without re-hashing string bytes.
pub type HandleSet<'t> = HashSet<Handle<'t>, HandleBuildHasher>;
