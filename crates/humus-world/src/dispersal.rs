//! Wraparound arithmetic and randomized child placement.

use humus_core::{Position, WrapMode};
use rand::Rng;

/// Single-step wraparound: one step past either edge lands on the opposite edge.
///
/// Displacements of `max` or more do not land on their true toroidal
/// position; they still always produce an in-range coordinate.
pub fn wrap(coord: i32, max: i32) -> i32 {
    if coord < 0 {
        max - 1
    } else if coord >= max {
        0
    } else {
        coord
    }
}

/// True modulo wraparound
pub fn wrap_toroidal(coord: i32, max: i32) -> i32 {
    coord.rem_euclid(max)
}

pub fn wrap_with(mode: WrapMode, coord: i32, max: i32) -> i32 {
    match mode {
        WrapMode::SingleStep => wrap(coord, max),
        WrapMode::Toroidal => wrap_toroidal(coord, max),
    }
}

/// Uniform non-zero integer in `[-distance, distance]`.
///
/// `distance` must be at least 1; config validation guarantees it.
pub fn random_offset<R: Rng + ?Sized>(distance: i32, rng: &mut R) -> i32 {
    debug_assert!(distance >= 1, "dispersal distance must be positive");
    loop {
        let offset = rng.gen_range(-distance..=distance);
        if offset != 0 {
            return offset;
        }
    }
}

/// Raw per-axis displacement for a child, before wrapping
pub fn random_displacement<R: Rng + ?Sized>(distance: i32, rng: &mut R) -> (i32, i32) {
    let dx = random_offset(distance, rng);
    let dy = random_offset(distance, rng);
    (dx, dy)
}

/// Position of a child dispersed up to `distance` cells from `origin` on each axis
pub fn new_position<R: Rng + ?Sized>(
    origin: Position,
    width: i32,
    height: i32,
    distance: i32,
    mode: WrapMode,
    rng: &mut R,
) -> Position {
    let (dx, dy) = random_displacement(distance, rng);
    let raw = origin.add(dx, dy);
    Position::new(wrap_with(mode, raw.x, width), wrap_with(mode, raw.y, height))
}

/// Uniformly random cell
pub fn random_position<R: Rng + ?Sized>(width: i32, height: i32, rng: &mut R) -> Position {
    Position::new(rng.gen_range(0..width), rng.gen_range(0..height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_single_step_wrap() {
        assert_eq!(wrap(5, 10), 5);
        assert_eq!(wrap(-1, 10), 9);
        assert_eq!(wrap(10, 10), 0);
        // Only one step: deeper displacements collapse onto the edge
        assert_eq!(wrap(-3, 10), 9);
        assert_eq!(wrap(12, 10), 0);
    }

    #[test]
    fn test_toroidal_wrap() {
        assert_eq!(wrap_toroidal(-3, 10), 7);
        assert_eq!(wrap_toroidal(12, 10), 2);
        assert_eq!(wrap_toroidal(-25, 10), 5);
    }

    #[test]
    fn test_offsets_cover_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..500 {
            seen.insert(random_offset(2, &mut rng));
        }
        assert_eq!(seen.into_iter().collect::<Vec<_>>(), vec![-2, -1, 1, 2]);
    }

    #[test]
    fn test_same_seed_same_positions() {
        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);
        let origin = Position::new(3, 3);
        for _ in 0..20 {
            assert_eq!(
                new_position(origin, 10, 10, 2, WrapMode::SingleStep, &mut a),
                new_position(origin, 10, 10, 2, WrapMode::SingleStep, &mut b)
            );
        }
    }

    proptest! {
        #[test]
        fn displacement_is_bounded_and_non_zero(seed in any::<u64>(), distance in 1i32..8) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let (dx, dy) = random_displacement(distance, &mut rng);
            prop_assert!(dx != 0 && dy != 0);
            prop_assert!(dx.abs() <= distance && dy.abs() <= distance);
        }

        #[test]
        fn dispersed_position_stays_in_bounds(
            seed in any::<u64>(),
            x in 0i32..16,
            y in 0i32..12,
            distance in 1i32..30,
            toroidal in any::<bool>(),
        ) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mode = if toroidal { WrapMode::Toroidal } else { WrapMode::SingleStep };
            let pos = new_position(Position::new(x, y), 16, 12, distance, mode, &mut rng);
            prop_assert!(pos.in_bounds(16, 12));
        }

        #[test]
        fn toroidal_matches_single_step_for_short_hops(coord in 0i32..20, step in -1i32..=1) {
            prop_assert_eq!(wrap(coord + step, 20), wrap_toroidal(coord + step, 20));
        }
    }
}
