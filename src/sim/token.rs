//! Tokens placed on the board

use std::fmt;

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Token shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Shape {
    Circle,
    Square,
    Triangle,
    Diamond,
    Hexagon,
    Star,
}

impl Shape {
    pub const ALL: [Shape; 6] = [
        Shape::Circle,
        Shape::Square,
        Shape::Triangle,
        Shape::Diamond,
        Shape::Hexagon,
        Shape::Star,
    ];

    /// Display color (CSS hex)
    pub fn color(self) -> &'static str {
        match self {
            Shape::Circle => "#EF4444",
            Shape::Square => "#3B82F6",
            Shape::Triangle => "#22C55E",
            Shape::Diamond => "#EAB308",
            Shape::Hexagon => "#A855F7",
            Shape::Star => "#F97316",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Special item kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialKind {
    /// Clears its whole row
    LineH,
    /// Clears its whole column
    LineV,
    /// Clears the 3x3 neighborhood
    Bomb,
    /// Clears every occupied cell
    ScreenClear,
    /// Clears its row and its column
    CrossClear,
}

impl SpecialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialKind::LineH => "line_h",
            SpecialKind::LineV => "line_v",
            SpecialKind::Bomb => "bomb",
            SpecialKind::ScreenClear => "screen_clear",
            SpecialKind::CrossClear => "cross_clear",
        }
    }

    fn glyph(self) -> char {
        match self {
            SpecialKind::LineH => 'H',
            SpecialKind::LineV => 'V',
            SpecialKind::Bomb => 'B',
            SpecialKind::ScreenClear => 'S',
            SpecialKind::CrossClear => 'X',
        }
    }
}

/// Identity of a token instance, stable across swaps, falls and promotion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(pub u32);

/// A placed game piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,
    pub shape: Shape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special: Option<SpecialKind>,
}

impl Token {
    pub fn new(id: TokenId, shape: Shape) -> Self {
        Self {
            id,
            shape,
            special: None,
        }
    }

    pub fn color(&self) -> &'static str {
        self.shape.color()
    }

    pub fn is_special(&self) -> bool {
        self.special.is_some()
    }

    /// Same shape, used by every matching rule
    #[inline]
    pub fn matches(&self, other: &Token) -> bool {
        self.shape == other.shape
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.special {
            Some(kind) => write!(f, "{}", kind.glyph()),
            None => write!(f, "{}", self.shape.index()),
        }
    }
}

/// Seeded token factory: random shapes plus fresh ids
#[derive(Debug, Clone)]
pub struct TokenSource {
    rng: Pcg32,
    next_id: u32,
}

impl TokenSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Continue numbering after ids that already exist on a board
    pub fn starting_after(seed: u64, last_id: TokenId) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            next_id: last_id.0 + 1,
        }
    }

    pub fn next_id(&mut self) -> TokenId {
        let id = TokenId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Random token avoiding `exclude`; falls back to every shape if all are excluded
    pub fn spawn(&mut self, exclude: &[Shape]) -> Token {
        let available: Vec<Shape> = Shape::ALL
            .iter()
            .copied()
            .filter(|s| !exclude.contains(s))
            .collect();
        let pool: &[Shape] = if available.is_empty() {
            &Shape::ALL
        } else {
            &available
        };
        let shape = pool[self.rng.random_range(0..pool.len())];
        let id = self.next_id();
        Token::new(id, shape)
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_respects_exclusions() {
        let mut source = TokenSource::new(7);
        for _ in 0..200 {
            let token = source.spawn(&[Shape::Circle, Shape::Star]);
            assert_ne!(token.shape, Shape::Circle);
            assert_ne!(token.shape, Shape::Star);
        }
    }

    #[test]
    fn test_spawn_all_excluded_falls_back() {
        let mut source = TokenSource::new(7);
        let token = source.spawn(&Shape::ALL);
        assert!(Shape::ALL.contains(&token.shape));
    }

    #[test]
    fn test_ids_are_unique() {
        let mut source = TokenSource::starting_after(1, TokenId(41));
        let a = source.spawn(&[]);
        let b = source.spawn(&[]);
        assert_eq!(a.id, TokenId(42));
        assert_eq!(b.id, TokenId(43));
    }

    #[test]
    fn test_same_seed_same_shapes() {
        let mut s1 = TokenSource::new(99);
        let mut s2 = TokenSource::new(99);
        for _ in 0..32 {
            assert_eq!(s1.spawn(&[]).shape, s2.spawn(&[]).shape);
        }
    }
}
