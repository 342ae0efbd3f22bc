use crate::catalog::Id;

/// How one end of an encoded value is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Boundary {
    /// A quoted literal, which can merge with an adjacent quoted literal.
    Quoted = 0,
    /// Anything else; adjacent tokens need a separator.
    Symbol = 1,
}

/// Start and end delimiting of an encoded value.
///
/// Adjacent quoted segments merge into one literal, saving the closing quote,
/// the opening quote and the separator between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundaryMode {
    pub start: Boundary,
    pub end: Boundary,
}

impl BoundaryMode {
    pub const QUOTED: Self = Self::new(Boundary::Quoted, Boundary::Quoted);
    pub const SYMBOL_QUOTED: Self = Self::new(Boundary::Symbol, Boundary::Quoted);
    pub const QUOTED_SYMBOL: Self = Self::new(Boundary::Quoted, Boundary::Symbol);
    pub const SYMBOL: Self = Self::new(Boundary::Symbol, Boundary::Symbol);

    /// Every mode, in index order.
    pub const ALL: [Self; 4] = [
        Self::QUOTED,
        Self::SYMBOL_QUOTED,
        Self::QUOTED_SYMBOL,
        Self::SYMBOL,
    ];

    pub const fn new(start: Boundary, end: Boundary) -> Self {
        Self { start, end }
    }

    /// Dense index: bit 0 is the start, bit 1 the end.
    #[inline]
    pub const fn index(self) -> usize {
        self.start as usize | (self.end as usize) << 1
    }

    /// Whether this junction (start of the next piece, end of the prefix) merges
    /// two quoted literals.
    #[inline]
    pub fn merges(self) -> bool {
        self == Self::QUOTED
    }
}

/// How a sub-id appears inside a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Choice {
    /// The sub-id's own encoding under the given mode, spliced in place.
    Inline(BoundaryMode),
    /// The sub-id's allocated symbol.
    Reference,
}

/// One piece of a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step {
    pub id: Id,
    pub choice: Choice,
}
