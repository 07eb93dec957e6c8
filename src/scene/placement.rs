//! Pipe pair placement and recycling.

use rand::Rng;

use crate::config::PipeConfig;
use crate::engine::physics::ArcadeWorld;
use crate::engine::{BodyHandle, GroupHandle, Vec2};

/// Random offsets for one pair, drawn in the order the game has always used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairOffsets {
    /// Distance from the previous pair.
    pub horizontal: i64,
    /// Gap between the upper pipe's bottom and the lower pipe's top.
    pub vertical: i64,
    /// y of the upper pipe's bottom edge.
    pub upper_y: i64,
}

impl PairOffsets {
    /// The gap keeps `margin` units clear of both viewport edges.
    pub fn draw<R: Rng>(rng: &mut R, pipes: &PipeConfig, view_height: f64) -> Self {
        let h = pipes.horizontal_distance;
        let v = pipes.vertical_distance;
        let horizontal = rng.gen_range(h.min..=h.max);
        let vertical = rng.gen_range(v.min..=v.max);
        let upper_y = rng.gen_range(pipes.margin..=view_height as i64 - pipes.margin - vertical);
        Self {
            horizontal,
            vertical,
            upper_y,
        }
    }
}

/// Moves both pipes to `x`; the lower one sits `vertical` below the upper one.
pub fn place_pair(
    world: &mut ArcadeWorld,
    upper: BodyHandle,
    lower: BodyHandle,
    x: f64,
    offsets: PairOffsets,
) {
    let upper_y = offsets.upper_y as f64;
    world.body_mut(upper).position = Vec2::new(x, upper_y);
    world.body_mut(lower).position = Vec2::new(x, upper_y + offsets.vertical as f64);
}

/// Largest pipe x, never below 0.
pub fn rightmost_x(world: &ArcadeWorld, pipes: &[BodyHandle]) -> f64 {
    pipes
        .iter()
        .map(|&pipe| world.body(pipe).position.x)
        .fold(0.0, f64::max)
}

/// Places a grouped pair relative to the group's rightmost pipe.
pub fn place_after_rightmost<R: Rng>(
    world: &mut ArcadeWorld,
    group: GroupHandle,
    (upper, lower): (BodyHandle, BodyHandle),
    rng: &mut R,
    pipes: &PipeConfig,
    view_height: f64,
) -> PairOffsets {
    let rightmost = rightmost_x(world, world.children(group));
    let offsets = PairOffsets::draw(rng, pipes, view_height);
    place_pair(world, upper, lower, rightmost + offsets.horizontal as f64, offsets);
    offsets
}

/// Scans the group in insertion order and re-places the first two pipes whose
/// right edge has reached 0. Any further expired pipes wait for a later call.
///
/// Returns whether a pair was placed.
pub fn recycle_pipes<R: Rng>(
    world: &mut ArcadeWorld,
    group: GroupHandle,
    rng: &mut R,
    pipes: &PipeConfig,
    view_height: f64,
) -> bool {
    let members = world.children(group).to_vec();
    let mut expired = Vec::with_capacity(2);
    let mut recycled = false;

    for pipe in members {
        if world.body(pipe).bounds().right() <= 0.0 {
            expired.push(pipe);
            if expired.len() == 2 {
                let offsets = place_after_rightmost(
                    world,
                    group,
                    (expired[0], expired[1]),
                    rng,
                    pipes,
                    view_height,
                );
                log::debug!("recycled pipe pair to x={}", world.body(expired[0]).position.x);
                log::trace!("{offsets:?}");
                recycled = true;
            }
        }
    }
    recycled
}

/// Running x for pairs that are placed once and never revisited.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PlacementCursor {
    x: f64,
}

impl PlacementCursor {
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Moves the cursor right by `distance` and returns the new x.
    pub fn advance(&mut self, distance: i64) -> f64 {
        self.x += distance as f64;
        self.x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::physics::Body;
    use crate::scene::testing::rng;

    const HEIGHT: f64 = 600.0;

    fn pipe(x: f64) -> Body {
        let mut body = Body::new("pipe", Vec2::new(x, 0.0), Vec2::new(52.0, 480.0));
        body.set_origin(0.0, 0.0);
        body
    }

    /// Four pairs, pair `i` at `xs[i]`.
    fn field(xs: [f64; 4]) -> (ArcadeWorld, GroupHandle) {
        let mut world = ArcadeWorld::default();
        let group = world.add_group();
        for x in xs {
            world.add_to_group(group, pipe(x));
            world.add_to_group(group, pipe(x));
        }
        (world, group)
    }

    fn pair(world: &ArcadeWorld, group: GroupHandle, i: usize) -> (BodyHandle, BodyHandle) {
        let children = world.children(group);
        (children[2 * i], children[2 * i + 1])
    }

    #[test]
    fn draws_stay_in_range() {
        let pipes = PipeConfig::default();
        let mut rng = rng(7);
        for _ in 0..2000 {
            let o = PairOffsets::draw(&mut rng, &pipes, HEIGHT);
            assert!((380..=430).contains(&o.horizontal), "{o:?}");
            assert!((150..=250).contains(&o.vertical), "{o:?}");
            assert!((20..=600 - 20 - o.vertical).contains(&o.upper_y), "{o:?}");
            assert!(o.upper_y + o.vertical <= 580);
        }
    }

    #[test]
    fn draws_reach_both_range_ends() {
        let pipes = PipeConfig::default();
        let mut rng = rng(11);
        let draws: Vec<_> = (0..5000)
            .map(|_| PairOffsets::draw(&mut rng, &pipes, HEIGHT))
            .collect();
        assert!(draws.iter().any(|o| o.horizontal == 380));
        assert!(draws.iter().any(|o| o.horizontal == 430));
        assert!(draws.iter().any(|o| o.vertical == 150));
        assert!(draws.iter().any(|o| o.vertical == 250));
    }

    #[test]
    fn place_pair_shares_x_and_spaces_by_gap() {
        let (mut world, group) = field([0.0; 4]);
        let (upper, lower) = pair(&world, group, 0);
        let offsets = PairOffsets {
            horizontal: 400,
            vertical: 180,
            upper_y: 120,
        };
        place_pair(&mut world, upper, lower, 512.0, offsets);
        assert_eq!(world.body(upper).position, Vec2::new(512.0, 120.0));
        assert_eq!(world.body(lower).position, Vec2::new(512.0, 300.0));
    }

    #[test]
    fn rightmost_never_below_zero() {
        let (world, group) = field([-300.0, -120.0, -60.0, -52.0]);
        assert_eq!(rightmost_x(&world, world.children(group)), 0.0);
        let (world, group) = field([-300.0, 410.0, 815.0, 120.0]);
        assert_eq!(rightmost_x(&world, world.children(group)), 815.0);
        assert_eq!(rightmost_x(&world, &[]), 0.0);
    }

    #[test]
    fn recycles_expired_pair_past_the_rightmost() {
        let pipes = PipeConfig::default();
        let (mut world, group) = field([-52.0, 300.0, 700.0, 1100.0]);
        let (upper, lower) = pair(&world, group, 0);

        assert!(recycle_pipes(&mut world, group, &mut rng(3), &pipes, HEIGHT));

        let x = world.body(upper).position.x;
        assert!((1100.0 + 380.0..=1100.0 + 430.0).contains(&x), "x={x}");
        assert_eq!(world.body(lower).position.x, x);
        let gap = world.body(lower).position.y - world.body(upper).position.y;
        assert!((150.0..=250.0).contains(&gap));
        assert_eq!(world.len(), 8);
        assert_eq!(world.children(group).len(), 8);
    }

    #[test]
    fn pipes_still_on_screen_are_left_alone() {
        let pipes = PipeConfig::default();
        let (mut world, group) = field([-51.0, 300.0, 700.0, 1100.0]);
        let before: Vec<_> = world.bodies().cloned().collect();

        assert!(!recycle_pipes(&mut world, group, &mut rng(3), &pipes, HEIGHT));
        assert_eq!(world.bodies().cloned().collect::<Vec<_>>(), before);
    }

    #[test]
    fn at_most_one_pair_per_call() {
        let pipes = PipeConfig::default();
        let (mut world, group) = field([-400.0, -100.0, 200.0, 600.0]);
        let second = pair(&world, group, 1);

        assert!(recycle_pipes(&mut world, group, &mut rng(5), &pipes, HEIGHT));
        assert_eq!(world.body(second.0).position.x, -100.0);
        assert_eq!(world.body(second.1).position.x, -100.0);

        // Still expired, so the next scan picks it up.
        assert!(recycle_pipes(&mut world, group, &mut rng(6), &pipes, HEIGHT));
        assert!(world.body(second.0).position.x > 600.0);

        assert!(!recycle_pipes(&mut world, group, &mut rng(7), &pipes, HEIGHT));
    }

    #[test]
    fn cursor_only_moves_right() {
        let pipes = PipeConfig::default();
        let mut rng = rng(9);
        let mut cursor = PlacementCursor::default();
        assert_eq!(cursor.x(), 0.0);
        let mut prev = cursor.x();
        for _ in 0..50 {
            let draw = PairOffsets::draw(&mut rng, &pipes, HEIGHT).horizontal;
            let x = cursor.advance(draw);
            assert_eq!(x, prev + draw as f64);
            assert!(x - prev >= 380.0);
            prev = x;
        }
    }
}
