//! Arena-of-indices intrusive LRU ordering over the block pool.
//!
//! This is the Rust realization of spec §4.1 and §9's "arena plus two index
//! fields" design note: a fixed `Vec<Link>` (one per pool entry, never
//! resized after construction) with `prev`/`next` slots pointing at other
//! indices in the same arena, rather than a heap-allocated linked list of
//! owning nodes. Grounded directly in the xv6-in-Rust buffer cache's
//! `BufMetaLru`/`BufMeta` (see
//! `examples/other_examples/...kazukousen-xv6rs__kernel-src-bio.rs.rs`),
//! adapted to use `Option<usize>` links instead of raw pointers so the whole
//! structure stays free of `unsafe`.
//!
//! No sentinel/sigil nodes: `head` is the MRU index, `tail` is the LRU
//! index, both `None` only when the arena itself is empty (never true for a
//! constructed [`crate::pool::BlockPool`], since its entry count is fixed
//! and non-zero).

#[derive(Clone, Copy, Debug, Default)]
struct Link {
    prev: Option<usize>,
    next: Option<usize>,
}

/// Doubly-linked ordering over a fixed set of `0..len` indices.
#[derive(Debug)]
pub(crate) struct LruIndex {
    links: Vec<Link>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl LruIndex {
    /// Builds an index over `len` slots, initially ordered `0, 1, .., len-1`
    /// from MRU to LRU (so slot 0 is promoted first, slot `len-1` is the
    /// first victim).
    pub(crate) fn new(len: usize) -> Self {
        let mut links = Vec::with_capacity(len);
        for i in 0..len {
            links.push(Link {
                prev: i.checked_sub(1),
                next: if i + 1 < len { Some(i + 1) } else { None },
            });
        }
        Self {
            head: if len == 0 { None } else { Some(0) },
            tail: if len == 0 { None } else { Some(len - 1) },
            links,
        }
    }

    /// The LRU tail: the next entry to be reused on a pool miss.
    pub(crate) fn victim(&self) -> usize {
        self.tail.expect("lru index is never empty once constructed")
    }

    /// Walks the ordering from LRU tail towards MRU head, yielding every
    /// index in eviction order. Used to skip entries already pinned by the
    /// current call's working set when picking a victim (see
    /// `crate::pool::BlockPool::acquire`), matching xv6 bio's practice of
    /// never reusing a buffer with a nonzero `refcnt`.
    pub(crate) fn iter_from_tail(&self) -> impl Iterator<Item = usize> + '_ {
        let mut cur = self.tail;
        std::iter::from_fn(move || {
            let idx = cur?;
            cur = self.links[idx].prev;
            Some(idx)
        })
    }

    fn unlink(&mut self, idx: usize) {
        let Link { prev, next } = self.links[idx];
        match prev {
            Some(p) => self.links[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.links[n].prev = prev,
            None => self.tail = prev,
        }
        self.links[idx] = Link::default();
    }

    fn insert_front(&mut self, idx: usize) {
        self.links[idx].prev = None;
        self.links[idx].next = self.head;
        if let Some(h) = self.head {
            self.links[h].prev = Some(idx);
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn insert_back(&mut self, idx: usize) {
        self.links[idx].next = None;
        self.links[idx].prev = self.tail;
        if let Some(t) = self.tail {
            self.links[t].next = Some(idx);
        }
        self.tail = Some(idx);
        if self.head.is_none() {
            self.head = Some(idx);
        }
    }

    /// Moves `idx` to the MRU position. O(1).
    pub(crate) fn promote(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.insert_front(idx);
    }

    /// Moves `idx` to the LRU position, making it the first candidate for
    /// reuse. O(1). Used for `NO_CACHE` entries, which should not linger.
    pub(crate) fn demote(&mut self, idx: usize) {
        if self.tail == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.insert_back(idx);
    }

    #[cfg(test)]
    fn order_from_mru(&self) -> Vec<usize> {
        let mut out = Vec::new();
        let mut cur = self.head;
        while let Some(idx) = cur {
            out.push(idx);
            cur = self.links[idx].next;
        }
        out
    }
}
