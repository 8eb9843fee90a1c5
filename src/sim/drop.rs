//! Held-token placement: pointer drag, edge clamping and next spawn position

use glam::Vec2;

use super::token::{TokenDescriptor, TokenId};

/// The token following the pointer, not yet physics-active
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeldToken {
    pub id: TokenId,
    pub descriptor: TokenDescriptor,
    pub pos: Vec2,
}

/// A token the player just let go of
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Release {
    pub token: HeldToken,
    /// Where the next held token appears if no clamped drag was remembered
    pub fallback: Vec2,
}

/// Keep a box of `half_width` inside `[min_x, max_x]`.
///
/// Returns the (possibly moved) x and whether it had to be moved.
pub fn clamp_to_field(x: f32, half_width: f32, min_x: f32, max_x: f32) -> (f32, bool) {
    if x - half_width < min_x {
        (min_x + half_width, true)
    } else if x + half_width > max_x {
        (max_x - half_width, true)
    } else {
        (x, false)
    }
}

/// Nudge a remembered drop position inward when the upcoming token is larger
/// than the one just released and would otherwise overhang a wall.
pub fn edge_corrected(
    remembered: Vec2,
    released_width: f32,
    upcoming_width: f32,
    min_x: f32,
    max_x: f32,
) -> Vec2 {
    if upcoming_width <= released_width {
        return remembered;
    }
    let half_next = upcoming_width / 2.0;
    let shift = (released_width / 2.0 - half_next).abs();
    let mut pos = remembered;
    if pos.x - half_next <= min_x {
        pos.x += shift;
    } else if pos.x + half_next >= max_x {
        pos.x -= shift;
    }
    pos
}

/// Tracks the held token and where the next one should spawn
#[derive(Debug, Clone)]
pub struct DropController {
    held: Option<HeldToken>,
    last_drop_position: Option<Vec2>,
    min_x: f32,
    max_x: f32,
    drop_y: f32,
}

impl DropController {
    pub fn new(min_x: f32, max_x: f32, drop_y: f32) -> Self {
        Self {
            held: None,
            last_drop_position: None,
            min_x,
            max_x,
            drop_y,
        }
    }

    pub fn held(&self) -> Option<&HeldToken> {
        self.held.as_ref()
    }

    pub fn last_drop_position(&self) -> Option<Vec2> {
        self.last_drop_position
    }

    pub fn drop_y(&self) -> f32 {
        self.drop_y
    }

    /// Forget the held token and any remembered position
    pub fn clear(&mut self) {
        self.held = None;
        self.last_drop_position = None;
    }

    /// Take the held token out of player control without dropping it
    pub fn take_held(&mut self) -> Option<HeldToken> {
        self.held.take()
    }

    /// Place a freshly spawned held token. Replaces any previous one.
    pub fn hold(&mut self, id: TokenId, descriptor: TokenDescriptor, pos: Vec2) -> HeldToken {
        let held = HeldToken { id, descriptor, pos };
        self.held = Some(held);
        held
    }

    fn clamped(&self, pointer_x: f32, half_width: f32) -> (Vec2, bool) {
        let (x, moved) = clamp_to_field(pointer_x, half_width, self.min_x, self.max_x);
        (Vec2::new(x, self.drop_y), moved)
    }

    /// Touch down: move the held token under the pointer.
    ///
    /// Follows the same remember-only-when-clamped rule as a drag so a plain
    /// tap never inherits a stale edge position.
    pub fn begin_drag(&mut self, pointer_x: f32) -> Option<Vec2> {
        self.continue_drag(pointer_x)
    }

    /// Pointer moved: follow it, remembering the position only when clamped
    pub fn continue_drag(&mut self, pointer_x: f32) -> Option<Vec2> {
        let half = self.held?.descriptor.half_width();
        let (pos, clamped) = self.clamped(pointer_x, half);
        self.last_drop_position = clamped.then_some(pos);
        let held = self.held.as_mut()?;
        held.pos = pos;
        Some(pos)
    }

    /// Touch up: hand the held token over to physics
    pub fn release(&mut self, pointer_x: f32) -> Option<Release> {
        let mut token = self.held.take()?;
        let (pos, _) = self.clamped(pointer_x, token.descriptor.half_width());
        token.pos = pos;
        Some(Release {
            token,
            fallback: pos,
        })
    }

    /// Where the next held token goes after `released`, given the upcoming descriptor.
    ///
    /// Starts from the remembered edge position, or the release point when
    /// none was remembered, and always keeps the upcoming box inside the walls.
    pub fn next_spawn_position(
        &self,
        released: &TokenDescriptor,
        upcoming: &TokenDescriptor,
        fallback: Vec2,
    ) -> Vec2 {
        let mut pos = edge_corrected(
            self.last_drop_position.unwrap_or(fallback),
            released.visual.x,
            upcoming.visual.x,
            self.min_x,
            self.max_x,
        );
        (pos.x, _) = clamp_to_field(pos.x, upcoming.half_width(), self.min_x, self.max_x);
        pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::size::{SizeClass, SizeTable};
    use proptest::prelude::*;

    const MIN_X: f32 = 0.0;
    const MAX_X: f32 = 390.0;
    const DROP_Y: f32 = 640.0;

    fn descriptor(size: SizeClass) -> TokenDescriptor {
        TokenDescriptor::new(size, SizeTable::Classic)
    }

    fn holding(size: SizeClass) -> DropController {
        let mut ctl = DropController::new(MIN_X, MAX_X, DROP_Y);
        ctl.hold(1, descriptor(size), Vec2::new(195.0, DROP_Y));
        ctl
    }

    #[test]
    fn test_drag_without_held_token_is_noop() {
        let mut ctl = DropController::new(MIN_X, MAX_X, DROP_Y);
        assert_eq!(ctl.begin_drag(10.0), None);
        assert_eq!(ctl.continue_drag(10.0), None);
        assert_eq!(ctl.release(10.0), None);
    }

    #[test]
    fn test_begin_drag_clamps_to_drop_line() {
        let mut ctl = holding(SizeClass::Diamond);
        let pos = ctl.begin_drag(-40.0).unwrap();
        assert_eq!(pos, Vec2::new(50.0, DROP_Y));
        assert_eq!(ctl.held().unwrap().pos, pos);
        assert_eq!(ctl.last_drop_position(), Some(pos));
        ctl.begin_drag(200.0);
        assert_eq!(ctl.last_drop_position(), None);
    }

    #[test]
    fn test_continue_drag_remembers_only_clamped_positions() {
        let mut ctl = holding(SizeClass::Diamond);
        ctl.continue_drag(380.0);
        assert_eq!(ctl.last_drop_position(), Some(Vec2::new(340.0, DROP_Y)));
        ctl.continue_drag(200.0);
        assert_eq!(ctl.last_drop_position(), None);
        ctl.continue_drag(10.0);
        assert_eq!(ctl.last_drop_position(), Some(Vec2::new(50.0, DROP_Y)));
    }

    #[test]
    fn test_release_hands_over_token() {
        let mut ctl = holding(SizeClass::Coin);
        ctl.begin_drag(120.0);
        let release = ctl.release(125.0).unwrap();
        assert_eq!(release.token.id, 1);
        assert_eq!(release.fallback, Vec2::new(125.0, DROP_Y));
        assert!(ctl.held().is_none());
    }

    #[test]
    fn test_larger_upcoming_token_is_pushed_off_right_wall() {
        let mut ctl = holding(SizeClass::Diamond);
        ctl.last_drop_position = Some(Vec2::new(MAX_X - 20.0, DROP_Y));
        let pos = ctl.next_spawn_position(
            &descriptor(SizeClass::Diamond),
            &descriptor(SizeClass::Skull),
            Vec2::new(100.0, DROP_Y),
        );
        // Shifted by 25, then pulled fully inside the wall
        assert_eq!(pos.x, MAX_X - 75.0);
    }

    #[test]
    fn test_correction_shifts_by_half_the_size_delta() {
        let remembered = Vec2::new(MAX_X - 20.0, DROP_Y);
        let pos = edge_corrected(remembered, 100.0, 150.0, MIN_X, MAX_X);
        assert_eq!(pos.x, MAX_X - 20.0 - 25.0);
    }

    #[test]
    fn test_larger_upcoming_token_is_pushed_off_left_wall() {
        let mut ctl = holding(SizeClass::Coin);
        ctl.last_drop_position = Some(Vec2::new(15.0, DROP_Y));
        let pos = ctl.next_spawn_position(
            &descriptor(SizeClass::Coin),
            &descriptor(SizeClass::Gem5),
            Vec2::new(100.0, DROP_Y),
        );
        assert_eq!(pos.x, 15.0 + 25.0);
    }

    #[test]
    fn test_smaller_upcoming_token_keeps_remembered_position() {
        let mut ctl = holding(SizeClass::Gem5);
        ctl.last_drop_position = Some(Vec2::new(350.0, DROP_Y));
        let pos = ctl.next_spawn_position(
            &descriptor(SizeClass::Gem5),
            &descriptor(SizeClass::Coin),
            Vec2::new(100.0, DROP_Y),
        );
        assert_eq!(pos.x, 350.0);
    }

    #[test]
    fn test_unclamped_release_near_wall_is_corrected() {
        let ctl = holding(SizeClass::Coin);
        let pos = ctl.next_spawn_position(
            &descriptor(SizeClass::Coin),
            &descriptor(SizeClass::Gem5),
            Vec2::new(20.0, DROP_Y),
        );
        assert_eq!(pos, Vec2::new(45.0, DROP_Y));
        assert!(pos.x - descriptor(SizeClass::Gem5).half_width() >= MIN_X);
    }

    #[test]
    fn test_without_remembered_position_uses_fallback() {
        let ctl = holding(SizeClass::Coin);
        let fallback = Vec2::new(77.0, DROP_Y);
        let pos = ctl.next_spawn_position(
            &descriptor(SizeClass::Coin),
            &descriptor(SizeClass::Skull),
            fallback,
        );
        assert_eq!(pos, fallback);
    }

    proptest! {
        #[test]
        fn drag_keeps_box_inside_field(x in -500.0f32..900.0, idx in 0usize..10) {
            let size = SizeClass::ALL[idx];
            let mut ctl = holding(size);
            let half = descriptor(size).half_width();
            let pos = ctl.continue_drag(x).unwrap();
            prop_assert!(MIN_X <= pos.x - half);
            prop_assert!(pos.x + half <= MAX_X);
            prop_assert_eq!(pos.y, DROP_Y);
            let outside = x - half < MIN_X || x + half > MAX_X;
            prop_assert_eq!(ctl.last_drop_position().is_some(), outside);
        }

        #[test]
        fn next_spawn_stays_inside_field(
            x in -100.0f32..500.0,
            released in 0usize..10,
            upcoming in 0usize..10,
            remember in any::<bool>(),
        ) {
            let released = descriptor(SizeClass::ALL[released]);
            let upcoming = descriptor(SizeClass::ALL[upcoming]);
            let mut ctl = holding(released.size);
            if remember {
                ctl.last_drop_position = Some(Vec2::new(x, DROP_Y));
            }
            let pos = ctl.next_spawn_position(&released, &upcoming, Vec2::new(x, DROP_Y));
            let half = upcoming.half_width();
            prop_assert!(MIN_X <= pos.x - half);
            prop_assert!(pos.x + half <= MAX_X);
        }
    }
}
