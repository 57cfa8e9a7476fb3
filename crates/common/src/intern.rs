use bumpalo::Bump;
use std::collections::HashSet;

/// String interner backed by an arena.
///
/// Interned strings live as long as the arena and compare equal by pointer
/// for identical content, so they can be used as cheap node labels.
pub struct StringInterner<'a> {
    arena: &'a Bump,
    seen: HashSet<&'a str>,
}

impl<'a> StringInterner<'a> {
    pub fn new(arena: &'a Bump) -> Self {
        Self {
            arena,
            seen: HashSet::new(),
        }
    }

    pub fn intern(&mut self, s: &str) -> &'a str {
        if let Some(&existing) = self.seen.get(s) {
            existing
        } else {
            let interned: &'a str = self.arena.alloc_str(s);
            self.seen.insert(interned);
            interned
        }
    }
}
