//! Shortest encodings of ids under each boundary mode.
//!
//! An id with a parent is decomposed by a dynamic program over its span. At
//! each position the candidates are the position-anchored repeat and its
//! ancestors (the parent itself at position zero), each either inlined under a
//! compatible mode or referenced by symbol. Relaxation orders cells by
//! `penalty + length * precision`, so rarely used but costly symbols are
//! avoided even when their raw length looks cheap.

use crate::catalog::{Catalog, Id, EMPTY_ID};
use crate::config::Config;
use crate::literal::quoted_len;
use crate::mode::{Boundary, BoundaryMode, Choice, Step};
use crate::parents::ParentLinks;
use crate::symbols::SymbolTable;

/// Lengths of the position-zero cells, by mode index: the three modes that may
/// need a leading quote start from an empty literal, the free mode absorbs the
/// first separator.
const INITIAL_LEN: [i64; 4] = [2, 2, 2, -1];

/// Junction cost when two quoted segments merge.
const MERGE_COST: i64 = -2;
/// Junction cost of a separator.
const SEPARATOR_COST: i64 = 1;

/// Ordered pieces of one encoding, starting from a position-zero cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// Mode of the position-zero cell the encoding grew from.
    pub start: BoundaryMode,
    pub steps: Vec<Step>,
}

/// Per-mode minimal lengths and substitutions of one id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    lengths: [Option<i64>; 4],
    substitutions: [Option<Substitution>; 4],
}

impl Definition {
    fn literal(bytes: &[u8]) -> Self {
        Self {
            lengths: [Some(quoted_len(bytes) as i64), None, None, None],
            substitutions: [None, None, None, None],
        }
    }

    /// Encoded length under `mode`, if the mode is available.
    pub fn length(&self, mode: BoundaryMode) -> Option<usize> {
        self.lengths[mode.index()].map(|len| len as usize)
    }

    /// Substitution under `mode`; `None` for literal-only ids.
    pub fn substitution(&self, mode: BoundaryMode) -> Option<&Substitution> {
        self.substitutions[mode.index()].as_ref()
    }

    /// Whether the id is encoded as a plain quoted literal.
    pub fn is_literal(&self) -> bool {
        self.substitutions.iter().all(Option::is_none)
    }

    /// Shortest available mode, lowest index on ties.
    pub fn best_mode(&self) -> BoundaryMode {
        let mut best: Option<(i64, BoundaryMode)> = None;
        for mode in BoundaryMode::ALL {
            if let Some(len) = self.lengths[mode.index()] {
                if best.map_or(true, |(b, _)| len < b) {
                    best = Some((len, mode));
                }
            }
        }
        best.expect("every definition has an available mode").1
    }

    pub fn best_length(&self) -> usize {
        self.length(self.best_mode())
            .expect("best mode is available")
    }
}

/// Everything a definition depends on besides other definitions.
#[derive(Clone, Copy)]
pub struct Inputs<'a> {
    pub text: &'a [u8],
    pub catalog: &'a Catalog,
    pub links: &'a ParentLinks,
    pub symbols: &'a SymbolTable,
    pub refcounts: &'a [u32],
}

/// Work counters, reported at debug level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DpCounters {
    /// Candidates skipped because they overshoot the span.
    pub retries: u64,
    /// Transition pairs scored.
    pub transitions: u64,
    /// Back-pointers followed.
    pub backtrace_steps: u64,
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    penalty: i64,
    len: i64,
    /// Arena index of the predecessor cell.
    prev: Option<usize>,
    step: Option<Step>,
}

impl Cell {
    #[inline]
    fn cost(&self, precision: i64) -> i64 {
        self.penalty
            .saturating_add(self.len.saturating_mul(precision))
    }
}

#[inline]
fn cell_index(pos: usize, mode: BoundaryMode) -> usize {
    pos * 4 + mode.index()
}

/// Memoised definitions for one fixpoint iteration.
#[derive(Debug, Clone)]
pub struct DefinitionEngine {
    depth: usize,
    precision: i64,
    definitions: Vec<Option<Definition>>,
    penalties: Vec<i64>,
    /// DP cells of the id being defined, indexed by `(position, mode)`.
    arena: Vec<Option<Cell>>,
    counters: DpCounters,
}

impl DefinitionEngine {
    pub fn new(ids: usize, config: &Config) -> Self {
        Self {
            depth: config.dp_depth(),
            precision: config.penalty_precision,
            definitions: vec![None; ids],
            penalties: vec![0; ids],
            arena: Vec::new(),
            counters: DpCounters::default(),
        }
    }

    /// Forgets every cached definition, keeping the storage.
    pub fn clear(&mut self) {
        self.definitions.iter_mut().for_each(|d| *d = None);
        self.penalties.fill(0);
        self.counters = DpCounters::default();
    }

    pub fn get(&self, id: Id) -> Option<&Definition> {
        self.definitions[id].as_ref()
    }

    /// Amortised per-use cost of `id`, valid once it is defined.
    #[cfg(test)]
    pub fn penalty(&self, id: Id) -> i64 {
        self.penalties[id]
    }

    pub fn counters(&self) -> DpCounters {
        self.counters
    }

    /// Defines `id` and, first, every id its program may consult.
    pub fn define(&mut self, id: Id, inputs: &Inputs<'_>) -> &Definition {
        let mut stack = vec![(id, false)];
        while let Some((next, ready)) = stack.pop() {
            if self.definitions[next].is_some() {
                continue;
            }
            if ready {
                self.compute(next, inputs);
                continue;
            }
            stack.push((next, true));
            if inputs.links.parent(next) == EMPTY_ID {
                continue;
            }
            let span = inputs.catalog.span(next);
            for i in 0..span.len {
                self.for_each_candidate(next, i, inputs, |pid, _| {
                    stack.push((pid, false));
                });
            }
        }
        self.definitions[id]
            .as_ref()
            .expect("definition was just computed")
    }

    /// Visits the usable decompositions starting `i` bytes into `id` and
    /// returns how many overshooting candidates were passed over.
    fn for_each_candidate<F>(&self, id: Id, i: usize, inputs: &Inputs<'_>, mut f: F) -> u64
    where
        F: FnMut(Id, usize),
    {
        let span = inputs.catalog.span(id);
        let mut pid = if i == 0 {
            inputs.links.parent(id)
        } else {
            inputs.catalog.position_id(span.offset + i)
        };
        let mut budget = self.depth;
        let mut overshoots = 0;
        while budget > 0 && pid != EMPTY_ID {
            let plen = inputs.catalog.span(pid).len;
            if i + plen > span.len {
                overshoots += 1;
                pid = inputs.links.parent(pid);
                continue;
            }
            f(pid, plen);
            budget -= 1;
            pid = inputs.links.parent(pid);
        }
        overshoots
    }

    /// Runs the program for `id`; all its candidates must already be defined.
    fn compute(&mut self, id: Id, inputs: &Inputs<'_>) {
        let span = inputs.catalog.span(id);
        let definition = if inputs.links.parent(id) == EMPTY_ID {
            Definition::literal(&inputs.text[span.offset..span.end()])
        } else {
            self.run_program(id, span.len, inputs)
        };

        let refs = inputs.refcounts[id].max(1) as i64;
        self.penalties[id] = self
            .precision
            .saturating_mul(definition.best_length() as i64)
            / refs;
        self.definitions[id] = Some(definition);
    }

    fn run_program(&mut self, id: Id, len: usize, inputs: &Inputs<'_>) -> Definition {
        let mut arena = std::mem::take(&mut self.arena);
        arena.clear();
        arena.resize((len + 1) * 4, None);
        for mode in BoundaryMode::ALL {
            arena[cell_index(0, mode)] = Some(Cell {
                penalty: 0,
                len: INITIAL_LEN[mode.index()],
                prev: None,
                step: None,
            });
        }

        let mut candidates = Vec::new();
        for i in 0..len {
            candidates.clear();
            let overshoots =
                self.for_each_candidate(id, i, inputs, |pid, plen| candidates.push((pid, plen)));
            self.counters.retries += overshoots;

            for &(pid, plen) in &candidates {
                let sub = self.definitions[pid]
                    .as_ref()
                    .expect("candidates are defined before their users")
                    .lengths;
                let sub_penalty = self.penalties[pid];
                let symbol_len = inputs.symbols.name_len(pid) as i64;

                for target in BoundaryMode::ALL {
                    for junction in BoundaryMode::ALL {
                        self.counters.transitions += 1;
                        let prev = BoundaryMode::new(target.start, junction.end);
                        let choice = BoundaryMode::new(junction.start, target.end);
                        let from = cell_index(i, prev);
                        let Some(src) = arena[from] else {
                            continue;
                        };
                        let to = cell_index(i + plen, target);

                        if let Some(sub_len) = sub[choice.index()] {
                            let joint = if junction.merges() {
                                MERGE_COST
                            } else {
                                SEPARATOR_COST
                            };
                            let cell = Cell {
                                penalty: src.penalty,
                                len: src.len + joint + sub_len,
                                prev: Some(from),
                                step: Some(Step {
                                    id: pid,
                                    choice: Choice::Inline(choice),
                                }),
                            };
                            relax(&mut arena[to], cell, self.precision);
                        }

                        if target.end == Boundary::Symbol {
                            let cell = Cell {
                                penalty: src.penalty.saturating_add(sub_penalty),
                                len: src.len + SEPARATOR_COST + symbol_len,
                                prev: Some(from),
                                step: Some(Step {
                                    id: pid,
                                    choice: Choice::Reference,
                                }),
                            };
                            relax(&mut arena[to], cell, self.precision);
                        }
                    }
                }
            }
        }

        let mut lengths = [None; 4];
        let mut substitutions = [None, None, None, None];
        for mode in BoundaryMode::ALL {
            let Some(end) = arena[cell_index(len, mode)] else {
                continue;
            };
            let mut steps = Vec::new();
            let mut cell = end;
            let mut at = cell_index(len, mode);
            while let (Some(prev), Some(step)) = (cell.prev, cell.step) {
                self.counters.backtrace_steps += 1;
                steps.push(step);
                at = prev;
                cell = arena[prev].expect("back-pointers lead to reached cells");
            }
            assert!(at < 4, "backtrace of id {id} did not return to position zero");
            steps.reverse();
            lengths[mode.index()] = Some(end.len);
            substitutions[mode.index()] = Some(Substitution {
                start: BoundaryMode::ALL[at],
                steps,
            });
        }
        assert!(
            lengths.iter().any(Option::is_some),
            "program for id {id} never reached the end of its span"
        );

        self.arena = arena;
        Definition {
            lengths,
            substitutions,
        }
    }
}

#[inline]
fn relax(slot: &mut Option<Cell>, cell: Cell, precision: i64) {
    if slot.map_or(true, |old| cell.cost(precision) < old.cost(precision)) {
        *slot = Some(cell);
    }
}
