//! A cache for parsed distinguished names.
//!
//! This is a private module. Its public types are re-exported by the
//! parent.

use super::dn::Dn;
use crate::schema::Schema;

//------------ DnCache -------------------------------------------------------

/// A small, least-recently-used cache of parsed DNs.
///
/// Directory workloads parse long runs of names that share suffixes, so
/// [`Dn::parse_with_cache`] caches parent names — never the full input —
/// and turns the decode of a sibling into a single RDN decode plus a
/// lookup. The cache is an exclusive handle: callers keep one per worker
/// or wrap one in a lock themselves; the type does no synchronization of
/// its own.
///
/// Cached entries were produced under a particular schema and are only
/// valid under it. The cache remembers the schema it was last used with
/// and silently discards everything when it is handed a different one,
/// so a stale handle can never serve names parsed under a replaced
/// schema.
#[derive(Clone, Debug, Default)]
pub struct DnCache {
    /// The schema the cached entries were parsed under.
    schema: Option<Schema>,

    /// The entries, most recently used first.
    entries: Vec<(Box<str>, Dn)>,

    /// The maximum number of entries, zero meaning the default.
    capacity: usize,
}

/// The number of entries a default cache holds.
///
/// Suffix sets in practice are shallow; a few dozen entries cover the
/// parents seen while decoding a typical result set.
const DEFAULT_CAPACITY: usize = 32;

impl DnCache {
    /// Creates an empty cache with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// A capacity of zero is replaced by the default capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        DnCache {
            schema: None,
            entries: Vec::new(),
            capacity,
        }
    }

    /// Returns the maximum number of entries the cache will hold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        if self.capacity == 0 {
            DEFAULT_CAPACITY
        } else {
            self.capacity
        }
    }

    /// Returns the number of entries currently cached.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops all entries and forgets the bound schema.
    pub fn clear(&mut self) {
        self.schema = None;
        self.entries.clear();
    }

    /// Looks up a previously cached DN, refreshing its recency.
    ///
    /// If the cache was last used with a different schema, every entry
    /// is discarded and the cache rebinds to `schema` before the lookup
    /// fails.
    pub(super) fn get(
        &mut self,
        schema: &Schema,
        string: &str,
    ) -> Option<Dn> {
        match self.schema {
            Some(ref bound) if bound.same(schema) => {}
            _ => {
                if !self.entries.is_empty() {
                    tracing::trace!(
                        discarded = self.entries.len(),
                        "dn cache rebound to new schema"
                    );
                }
                self.entries.clear();
                self.schema = Some(schema.clone());
                return None;
            }
        }
        match self.entries.iter().position(|(key, _)| key.as_ref() == string)
        {
            Some(idx) => {
                let entry = self.entries.remove(idx);
                let dn = entry.1.clone();
                self.entries.insert(0, entry);
                tracing::trace!(dn = string, "dn cache hit");
                Some(dn)
            }
            None => {
                tracing::trace!(dn = string, "dn cache miss");
                None
            }
        }
    }

    /// Caches a DN under its string, evicting the least recently used
    /// entry if the cache is full.
    pub(super) fn insert(&mut self, string: &str, dn: Dn) {
        if let Some(idx) =
            self.entries.iter().position(|(key, _)| key.as_ref() == string)
        {
            self.entries.remove(idx);
        } else if self.entries.len() >= self.capacity() {
            let _ = self.entries.pop();
        }
        self.entries.insert(0, (Box::from(string), dn));
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    fn schema() -> Schema {
        Schema::core()
    }

    fn dn(s: &str) -> Dn {
        Dn::parse(s, &schema()).unwrap()
    }

    #[test]
    fn get_and_insert() {
        let schema = schema();
        let mut cache = DnCache::new();
        assert!(cache.get(&schema, "dc=example,dc=com").is_none());
        cache.insert("dc=example,dc=com", dn("dc=example,dc=com"));
        assert_eq!(
            cache.get(&schema, "dc=example,dc=com").unwrap(),
            dn("dc=example,dc=com")
        );
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn evicts_least_recently_used() {
        let schema = schema();
        let mut cache = DnCache::with_capacity(2);
        // Bind the schema first so inserts survive the next get.
        assert!(cache.get(&schema, "dc=a").is_none());

        cache.insert("dc=a", dn("dc=a"));
        cache.insert("dc=b", dn("dc=b"));

        // Touch the older entry so the newer one becomes the victim.
        assert!(cache.get(&schema, "dc=a").is_some());
        cache.insert("dc=c", dn("dc=c"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&schema, "dc=a").is_some());
        assert!(cache.get(&schema, "dc=b").is_none());
        assert!(cache.get(&schema, "dc=c").is_some());
    }

    #[test]
    fn reinsert_refreshes_instead_of_duplicating() {
        let schema = schema();
        let mut cache = DnCache::with_capacity(2);
        assert!(cache.get(&schema, "dc=a").is_none());

        cache.insert("dc=a", dn("dc=a"));
        cache.insert("dc=b", dn("dc=b"));
        cache.insert("dc=a", dn("dc=a"));

        assert_eq!(cache.len(), 2);
        cache.insert("dc=c", dn("dc=c"));
        assert!(cache.get(&schema, "dc=a").is_some());
        assert!(cache.get(&schema, "dc=b").is_none());
    }

    #[test]
    fn schema_change_discards_entries() {
        let strict = schema().as_strict();
        let permissive = strict.as_permissive();
        let mut cache = DnCache::new();

        assert!(cache.get(&permissive, "dc=a").is_none());
        cache.insert("dc=a", dn("dc=a"));
        assert!(cache.get(&permissive, "dc=a").is_some());

        // Same schema object, different strictness: a different schema.
        assert!(cache.get(&strict, "dc=a").is_none());
        assert!(cache.is_empty());

        // And it is now bound to the strict one.
        cache.insert("dc=a", dn("dc=a"));
        assert!(cache.get(&strict, "dc=a").is_some());
        assert!(cache.get(&permissive, "dc=a").is_none());
    }

    #[test]
    fn cached_parse_is_transparent() {
        let schema = schema();
        let mut cache = DnCache::new();
        let names = [
            "uid=alice,ou=people,dc=example,dc=com",
            "uid=bob,ou=people,dc=example,dc=com",
            "uid=carol,ou=people,dc=example,dc=com",
            "ou=people,dc=example,dc=com",
        ];
        for name in names {
            let cached =
                Dn::parse_with_cache(name, &schema, &mut cache).unwrap();
            let plain = Dn::parse(name, &schema).unwrap();
            assert_eq!(cached, plain);
            assert_eq!(cached.to_string(), plain.to_string());
        }
        // Shared parents got cached, the full leaf names did not.
        assert!(cache
            .get(&schema, "ou=people,dc=example,dc=com")
            .is_some());
        assert!(cache
            .get(&schema, "uid=alice,ou=people,dc=example,dc=com")
            .is_none());
    }

    #[test]
    fn clear() {
        let schema = schema();
        let mut cache = DnCache::new();
        assert!(cache.get(&schema, "dc=a").is_none());
        cache.insert("dc=a", dn("dc=a"));
        cache.clear();
        assert!(cache.is_empty());
    }
}
