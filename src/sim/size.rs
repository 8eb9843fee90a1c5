//! Token size progression
//!
//! Ten ordered size classes, each tied to one skin. The linear size of a class
//! depends on the active [`SizeTable`]; merging two equal classes yields the
//! next class, saturating at the largest.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of size classes in the progression
pub const SIZE_CLASS_COUNT: usize = 10;

/// One step in the token size progression (smallest first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SizeClass {
    Coin,
    Gem1,
    Gem2,
    Gem3,
    Gem4,
    Gem5,
    Diamond,
    Nugget,
    Potion,
    Skull,
}

impl SizeClass {
    /// All classes in ascending order
    pub const ALL: [SizeClass; SIZE_CLASS_COUNT] = [
        SizeClass::Coin,
        SizeClass::Gem1,
        SizeClass::Gem2,
        SizeClass::Gem3,
        SizeClass::Gem4,
        SizeClass::Gem5,
        SizeClass::Diamond,
        SizeClass::Nugget,
        SizeClass::Potion,
        SizeClass::Skull,
    ];

    pub const fn smallest() -> Self {
        SizeClass::Coin
    }

    pub const fn largest() -> Self {
        SizeClass::Skull
    }

    pub fn is_largest(self) -> bool {
        self == Self::largest()
    }

    /// Position in the progression (0 = smallest)
    pub fn rank(self) -> usize {
        match self {
            SizeClass::Coin => 0,
            SizeClass::Gem1 => 1,
            SizeClass::Gem2 => 2,
            SizeClass::Gem3 => 3,
            SizeClass::Gem4 => 4,
            SizeClass::Gem5 => 5,
            SizeClass::Diamond => 6,
            SizeClass::Nugget => 7,
            SizeClass::Potion => 8,
            SizeClass::Skull => 9,
        }
    }

    /// Successor class; the largest maps to itself
    pub fn next(self) -> Self {
        match self {
            SizeClass::Coin => SizeClass::Gem1,
            SizeClass::Gem1 => SizeClass::Gem2,
            SizeClass::Gem2 => SizeClass::Gem3,
            SizeClass::Gem3 => SizeClass::Gem4,
            SizeClass::Gem4 => SizeClass::Gem5,
            SizeClass::Gem5 => SizeClass::Diamond,
            SizeClass::Diamond => SizeClass::Nugget,
            SizeClass::Nugget => SizeClass::Potion,
            SizeClass::Potion => SizeClass::Skull,
            SizeClass::Skull => SizeClass::Skull,
        }
    }

    /// Visual asset for this class
    pub fn skin(self) -> Skin {
        match self {
            SizeClass::Coin => Skin::Coin,
            SizeClass::Gem1 => Skin::Gem1,
            SizeClass::Gem2 => Skin::Gem2,
            SizeClass::Gem3 => Skin::Gem3,
            SizeClass::Gem4 => Skin::Gem4,
            SizeClass::Gem5 => Skin::Gem5,
            SizeClass::Diamond => Skin::Diamond,
            SizeClass::Nugget => Skin::Nugget,
            SizeClass::Potion => Skin::Potion,
            SizeClass::Skull => Skin::Skull,
        }
    }
}

/// Visual asset selector, one per size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Skin {
    Coin,
    Gem1,
    Gem2,
    Gem3,
    Gem4,
    Gem5,
    Diamond,
    Nugget,
    Potion,
    Skull,
}

impl Skin {
    /// Asset key handed to the renderer
    pub fn name(self) -> &'static str {
        match self {
            Skin::Coin => "coin",
            Skin::Gem1 => "gem1",
            Skin::Gem2 => "gem2",
            Skin::Gem3 => "gem3",
            Skin::Gem4 => "gem4",
            Skin::Gem5 => "gem5",
            Skin::Diamond => "diamond",
            Skin::Nugget => "nugget",
            Skin::Potion => "potion",
            Skin::Skull => "skull",
        }
    }
}

/// Linear sizes assigned to each class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeTable {
    /// 30, 40, 50, 60, 70, 80, 100, 120, 130, 150
    #[default]
    Classic,
    /// 30, 50, 60, 70, 80, 100, 120, 150, 170, 200
    Revised,
}

impl SizeTable {
    /// Width/height of a token of the given class, in field units
    pub fn units(self, class: SizeClass) -> f32 {
        match self {
            SizeTable::Classic => match class {
                SizeClass::Coin => 30.0,
                SizeClass::Gem1 => 40.0,
                SizeClass::Gem2 => 50.0,
                SizeClass::Gem3 => 60.0,
                SizeClass::Gem4 => 70.0,
                SizeClass::Gem5 => 80.0,
                SizeClass::Diamond => 100.0,
                SizeClass::Nugget => 120.0,
                SizeClass::Potion => 130.0,
                SizeClass::Skull => 150.0,
            },
            SizeTable::Revised => match class {
                SizeClass::Coin => 30.0,
                SizeClass::Gem1 => 50.0,
                SizeClass::Gem2 => 60.0,
                SizeClass::Gem3 => 70.0,
                SizeClass::Gem4 => 80.0,
                SizeClass::Gem5 => 100.0,
                SizeClass::Diamond => 120.0,
                SizeClass::Nugget => 150.0,
                SizeClass::Potion => 170.0,
                SizeClass::Skull => 200.0,
            },
        }
    }

    /// Score awarded for merging two tokens of `class`: floor(units * 0.1)
    pub fn merge_score(self, class: SizeClass) -> u64 {
        (self.units(class) * 0.1).floor() as u64
    }

    /// Uniform pick from the `count` smallest classes.
    ///
    /// `count` is clamped to `1..=SIZE_CLASS_COUNT`; larger classes only ever
    /// appear through merging.
    pub fn spawnable<R: Rng>(rng: &mut R, count: usize) -> SizeClass {
        let count = count.clamp(1, SIZE_CLASS_COUNT);
        SizeClass::ALL[rng.random_range(0..count)]
    }
}
