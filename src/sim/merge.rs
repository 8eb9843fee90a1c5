//! Merge rules for colliding tokens
//!
//! Two tokens of the same size class merge into one token of the next class,
//! placed between them. The largest class never merges.

use glam::Vec2;
use rand::Rng;

use super::drop::clamp_to_field;
use super::size::{SizeClass, SizeTable};
use super::token::TokenId;

/// One side of a contact reported by the physics collaborator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactBody {
    pub id: TokenId,
    pub size: SizeClass,
    pub pos: Vec2,
}

/// What a successful merge does to the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeOutcome {
    /// Both input tokens, destroyed by the merge
    pub consumed: [TokenId; 2],
    pub size: SizeClass,
    pub pos: Vec2,
    /// Outward kick applied to the new token
    pub impulse: Vec2,
    pub score_delta: u64,
}

/// Same class, not the largest, and two distinct tokens
pub fn can_merge(a: &ContactBody, b: &ContactBody) -> bool {
    a.id != b.id && a.size == b.size && !a.size.is_largest()
}

/// Decides merges and computes their output
#[derive(Debug, Clone, Copy)]
pub struct MergeResolver {
    table: SizeTable,
    min_x: f32,
    max_x: f32,
    /// Max impulse per axis
    impulse: f32,
}

impl MergeResolver {
    pub fn new(table: SizeTable, min_x: f32, max_x: f32, impulse: f32) -> Self {
        Self {
            table,
            min_x,
            max_x,
            impulse: impulse.abs(),
        }
    }

    /// Midpoint of the pair, with the merged token kept inside the walls
    pub fn merge_position(&self, a: Vec2, b: Vec2, size: SizeClass) -> Vec2 {
        let mid = (a + b) * 0.5;
        let half = self.table.units(size) / 2.0;
        let (x, _) = clamp_to_field(mid.x, half, self.min_x, self.max_x);
        Vec2::new(x, mid.y)
    }

    /// Resolve a contact. `None` leaves both tokens untouched.
    pub fn resolve<R: Rng>(
        &self,
        a: &ContactBody,
        b: &ContactBody,
        rng: &mut R,
    ) -> Option<MergeOutcome> {
        if !can_merge(a, b) {
            return None;
        }

        let size = a.size.next();
        let pos = self.merge_position(a.pos, b.pos, size);
        let impulse = if self.impulse > 0.0 {
            Vec2::new(
                rng.random_range(-self.impulse..=self.impulse),
                rng.random_range(-self.impulse..=self.impulse),
            )
        } else {
            Vec2::ZERO
        };

        log::debug!(
            "Merge {:?}+{:?} ({:?}) -> {:?} at ({:.1}, {:.1})",
            a.id,
            b.id,
            a.size,
            size,
            pos.x,
            pos.y
        );

        Some(MergeOutcome {
            consumed: [a.id, b.id],
            size,
            pos,
            impulse,
            score_delta: self.table.merge_score(a.size),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn resolver() -> MergeResolver {
        MergeResolver::new(SizeTable::Classic, 0.0, 390.0, 15.0)
    }

    fn body(id: TokenId, size: SizeClass, x: f32, y: f32) -> ContactBody {
        ContactBody {
            id,
            size,
            pos: Vec2::new(x, y),
        }
    }

    #[test]
    fn test_equal_coins_merge_into_next_class() {
        let mut rng = Pcg32::seed_from_u64(1);
        let a = body(1, SizeClass::Coin, 100.0, 640.0);
        let b = body(2, SizeClass::Coin, 100.0, 640.0);
        let out = resolver().resolve(&a, &b, &mut rng).unwrap();
        assert_eq!(out.size, SizeClass::Gem1);
        assert_eq!(SizeTable::Classic.units(out.size), 40.0);
        assert_eq!(out.pos, Vec2::new(100.0, 640.0));
        assert_eq!(out.score_delta, 3);
        assert_eq!(out.consumed, [1, 2]);
        assert!(out.impulse.x.abs() <= 15.0 && out.impulse.y.abs() <= 15.0);
    }

    #[test]
    fn test_different_classes_do_not_merge() {
        let mut rng = Pcg32::seed_from_u64(1);
        let a = body(1, SizeClass::Coin, 100.0, 100.0);
        let b = body(2, SizeClass::Gem1, 110.0, 100.0);
        assert!(resolver().resolve(&a, &b, &mut rng).is_none());
    }

    #[test]
    fn test_largest_class_never_merges() {
        let mut rng = Pcg32::seed_from_u64(1);
        let a = body(1, SizeClass::Skull, 100.0, 100.0);
        let b = body(2, SizeClass::Skull, 200.0, 100.0);
        assert!(resolver().resolve(&a, &b, &mut rng).is_none());
    }

    #[test]
    fn test_self_contact_does_not_merge() {
        let a = body(4, SizeClass::Gem2, 100.0, 100.0);
        assert!(!can_merge(&a, &a));
    }

    #[test]
    fn test_merge_position_is_midpoint() {
        let pos = resolver().merge_position(
            Vec2::new(100.0, 200.0),
            Vec2::new(140.0, 180.0),
            SizeClass::Gem1,
        );
        assert_eq!(pos, Vec2::new(120.0, 190.0));
    }

    #[test]
    fn test_merge_position_respects_right_wall() {
        // Two 120s against the right wall produce a 130 that must fit
        let pos = resolver().merge_position(
            Vec2::new(330.0, 60.0),
            Vec2::new(330.0, 180.0),
            SizeClass::Potion,
        );
        assert_eq!(pos.x, 390.0 - 65.0);
        assert_eq!(pos.y, 120.0);
    }

    #[test]
    fn test_zero_impulse_config() {
        let mut rng = Pcg32::seed_from_u64(3);
        let r = MergeResolver::new(SizeTable::Classic, 0.0, 390.0, 0.0);
        let a = body(1, SizeClass::Gem3, 50.0, 50.0);
        let b = body(2, SizeClass::Gem3, 90.0, 50.0);
        assert_eq!(r.resolve(&a, &b, &mut rng).unwrap().impulse, Vec2::ZERO);
    }

    proptest! {
        #[test]
        fn merge_grows_by_one_class(idx in 0usize..9, seed in any::<u64>(), ax in 40.0f32..350.0, bx in 40.0f32..350.0) {
            let size = SizeClass::ALL[idx];
            let mut rng = Pcg32::seed_from_u64(seed);
            let a = body(10, size, ax, 300.0);
            let b = body(11, size, bx, 320.0);
            let out = resolver().resolve(&a, &b, &mut rng).unwrap();
            prop_assert_eq!(out.size, size.next());
            prop_assert_eq!(out.score_delta, (SizeTable::Classic.units(size) * 0.1).floor() as u64);
            prop_assert!(out.pos.x + SizeTable::Classic.units(out.size) / 2.0 <= 390.0);
            prop_assert!(out.impulse.x.abs() <= 15.0);
            prop_assert!(out.impulse.y.abs() <= 15.0);
        }
    }
}
