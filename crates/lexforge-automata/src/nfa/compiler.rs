//! Thompson construction from `HirKind` to `Nfa`.

use std::collections::HashMap;

use super::{Builder, Config, Nfa, PatternId, StateId, Transition};
use crate::NfaConstructionError;
use crate::hir::{CharacterClass, HirKind, Quantification};
use crate::utf8::{Utf8Range, Utf8Sequences};

/// Single-entry, single-exit piece of the NFA under construction.
///
/// `exit` is always patchable: an empty placeholder, a byte range or a union.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fragment {
    entry: StateId,
    exit: StateId,
}

impl Fragment {
    fn new(entry: StateId, exit: StateId) -> Self {
        Self { entry, exit }
    }

    fn single(id: StateId) -> Self {
        Self::new(id, id)
    }
}

/// Compiles a list of patterns into one NFA.
///
/// Pattern `i` ends in `Match { pattern_id: i }`. Patterns are joined at the
/// start by a union in input order.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: Config,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn compile(&self, patterns: &[HirKind]) -> Result<Nfa, NfaConstructionError> {
        let limit = self.config.pattern_limit.min(PatternId::MAX as usize);
        if patterns.len() > limit {
            return Err(NfaConstructionError::PatternLimitExceeded { limit });
        }

        let mut c = Compilation::new(&self.config);
        let start = c.builder.add_union(Vec::with_capacity(patterns.len()))?;
        for (pattern_id, hir) in (0..).zip(patterns) {
            let fragment = c.hir(hir)?;
            let done = c.builder.add_match(pattern_id)?;
            c.builder.patch(fragment.exit, done)?;
            c.builder.patch(start, fragment.entry)?;
        }

        let built = c.builder.len();
        let nfa = c.builder.build(start, patterns.len())?;
        log::debug!(
            "nfa: {} patterns, {} builder states, {} final states",
            patterns.len(),
            built,
            nfa.len()
        );
        Ok(nfa)
    }
}

/// State for a single `Compiler::compile` call.
struct Compilation {
    builder: Builder,
    suffixes: SuffixCache,
}

impl Compilation {
    fn new(config: &Config) -> Self {
        Self {
            builder: Builder::new().with_state_limit(config.state_limit),
            suffixes: SuffixCache::new(config.suffix_cache_capacity),
        }
    }

    fn hir(&mut self, hir: &HirKind) -> Result<Fragment, NfaConstructionError> {
        match hir {
            HirKind::Empty => self.empty(),
            HirKind::Literal(scalars) => self.literal(scalars),
            HirKind::Concat(items) => {
                let mut fragments = Vec::with_capacity(items.len());
                for item in items {
                    fragments.push(self.hir(item)?);
                }
                self.concat(&fragments)
            }
            HirKind::Alternation(branches) => self.alternation(branches),
            HirKind::Quantification(q) => self.quantification(q),
            HirKind::Class(class) => self.class(class),
            HirKind::Group(child) => self.hir(child),
        }
    }

    fn empty(&mut self) -> Result<Fragment, NfaConstructionError> {
        Ok(Fragment::single(self.builder.add_empty()?))
    }

    /// Fragment that matches nothing but still has a patchable exit.
    fn nothing(&mut self) -> Result<Fragment, NfaConstructionError> {
        let entry = self.builder.add_union(Vec::new())?;
        let exit = self.builder.add_empty()?;
        Ok(Fragment::new(entry, exit))
    }

    fn literal(&mut self, scalars: &[char]) -> Result<Fragment, NfaConstructionError> {
        let mut buf = [0; 4];
        let mut fragment: Option<Fragment> = None;
        for c in scalars {
            for &byte in c.encode_utf8(&mut buf).as_bytes() {
                let id = self.builder.add_range(Transition::new(byte, byte, 0))?;
                fragment = Some(match fragment {
                    None => Fragment::single(id),
                    Some(prev) => {
                        self.builder.patch(prev.exit, id)?;
                        Fragment::new(prev.entry, id)
                    }
                });
            }
        }
        match fragment {
            Some(fragment) => Ok(fragment),
            None => self.empty(),
        }
    }

    fn concat(&mut self, fragments: &[Fragment]) -> Result<Fragment, NfaConstructionError> {
        let (Some(first), Some(last)) = (fragments.first(), fragments.last()) else {
            return self.empty();
        };
        for pair in fragments.windows(2) {
            self.builder.patch(pair[0].exit, pair[1].entry)?;
        }
        Ok(Fragment::new(first.entry, last.exit))
    }

    fn alternation(&mut self, branches: &[HirKind]) -> Result<Fragment, NfaConstructionError> {
        if branches.is_empty() {
            return self.nothing();
        }
        let union = self.builder.add_union(Vec::with_capacity(branches.len()))?;
        let join = self.builder.add_empty()?;
        for branch in branches {
            let fragment = self.hir(branch)?;
            self.builder.patch(union, fragment.entry)?;
            self.builder.patch(fragment.exit, join)?;
        }
        Ok(Fragment::new(union, join))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Repetition
    //
    // Eager unions list "repeat" before "leave"; reluctant ones are built
    // with the same patch order and reversed at build time.
    // ─────────────────────────────────────────────────────────────────────

    fn add_branch(&mut self, eager: bool) -> Result<StateId, NfaConstructionError> {
        if eager {
            self.builder.add_union(Vec::new())
        } else {
            self.builder.add_union_reverse(Vec::new())
        }
    }

    fn repeat_exactly(&mut self, child: &HirKind, n: u32) -> Result<Fragment, NfaConstructionError> {
        // Chained as built so a huge `n` runs into the state limit.
        let mut chain: Option<Fragment> = None;
        for _ in 0..n {
            let next = self.hir(child)?;
            chain = Some(match chain {
                None => next,
                Some(prev) => {
                    self.builder.patch(prev.exit, next.entry)?;
                    Fragment::new(prev.entry, next.exit)
                }
            });
        }
        match chain {
            Some(fragment) => Ok(fragment),
            None => self.empty(),
        }
    }

    fn quantification(&mut self, q: &Quantification) -> Result<Fragment, NfaConstructionError> {
        match q.max {
            Some(max) if max == q.min => self.repeat_exactly(&q.child, q.min),
            None => self.repeat_at_least(&q.child, q.min, q.eager),
            Some(max) => self.repeat_between(&q.child, q.min, max, q.eager),
        }
    }

    /// `child{n,}`: `n - 1` copies, then a copy looping back on itself.
    fn repeat_at_least(
        &mut self,
        child: &HirKind,
        n: u32,
        eager: bool,
    ) -> Result<Fragment, NfaConstructionError> {
        if n == 0 {
            let branch = self.add_branch(eager)?;
            let body = self.hir(child)?;
            self.builder.patch(branch, body.entry)?;
            self.builder.patch(body.exit, branch)?;
            return Ok(Fragment::single(branch));
        }

        let prefix = self.repeat_exactly(child, n - 1)?;
        let body = self.hir(child)?;
        let branch = self.add_branch(eager)?;
        self.builder.patch(prefix.exit, body.entry)?;
        self.builder.patch(body.exit, branch)?;
        self.builder.patch(branch, body.entry)?;
        Ok(Fragment::new(prefix.entry, branch))
    }

    /// `child{n,m}`: `n` copies, then `m - n` nested optional copies.
    fn repeat_between(
        &mut self,
        child: &HirKind,
        min: u32,
        max: u32,
        eager: bool,
    ) -> Result<Fragment, NfaConstructionError> {
        let prefix = self.repeat_exactly(child, min)?;
        let end = self.builder.add_empty()?;
        let mut tail = prefix.exit;
        for _ in min..max {
            let branch = self.add_branch(eager)?;
            self.builder.patch(tail, branch)?;
            let body = self.hir(child)?;
            self.builder.patch(branch, body.entry)?;
            self.builder.patch(branch, end)?;
            tail = body.exit;
        }
        self.builder.patch(tail, end)?;
        Ok(Fragment::new(prefix.entry, end))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Classes
    // ─────────────────────────────────────────────────────────────────────

    fn class(&mut self, class: &CharacterClass) -> Result<Fragment, NfaConstructionError> {
        if class.is_empty() {
            return self.nothing();
        }
        let end = self.builder.add_empty()?;
        if class.is_ascii() {
            let transitions = class
                .iter()
                .map(|r| Transition::new(r.start() as u8, r.end() as u8, end))
                .collect();
            let entry = self.builder.add_sparse(transitions)?;
            return Ok(Fragment::new(entry, end));
        }

        // Each sequence is compiled last byte first so equal suffixes share
        // states through the cache.
        let mut heads: Vec<StateId> = Vec::new();
        for range in class.iter() {
            for seq in Utf8Sequences::new(range.start(), range.end()) {
                let mut next = end;
                for &byte_range in seq.as_slice().iter().rev() {
                    next = self.suffix(byte_range, next)?;
                }
                if !heads.contains(&next) {
                    heads.push(next);
                }
            }
        }
        let entry = self.builder.add_union(heads)?;
        Ok(Fragment::new(entry, end))
    }

    fn suffix(&mut self, range: Utf8Range, next: StateId) -> Result<StateId, NfaConstructionError> {
        let key = SuffixKey {
            next,
            start: range.start,
            end: range.end,
        };
        if let Some(id) = self.suffixes.get(&key) {
            return Ok(id);
        }
        let id = self
            .builder
            .add_range(Transition::new(range.start, range.end, next))?;
        self.suffixes.insert(key, id);
        Ok(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SuffixKey {
    next: StateId,
    start: u8,
    end: u8,
}

/// Byte-range state lookup keyed by content. Cleared when full.
#[derive(Debug)]
struct SuffixCache {
    map: HashMap<SuffixKey, StateId>,
    capacity: usize,
}

impl SuffixCache {
    fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::new(),
            capacity,
        }
    }

    fn get(&self, key: &SuffixKey) -> Option<StateId> {
        self.map.get(key).copied()
    }

    fn insert(&mut self, key: SuffixKey, id: StateId) {
        if self.capacity == 0 {
            return;
        }
        if self.map.len() >= self.capacity {
            log::trace!("utf-8 suffix cache full at {} entries, clearing", self.map.len());
            self.map.clear();
        }
        self.map.insert(key, id);
    }
}
