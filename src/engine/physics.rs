//! Arcade-style bodies: axis-aligned rectangles with velocity and gravity.

use super::math::{Rect, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupHandle(usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub texture: String,
    /// Game object position; the origin decides which point of the body it names.
    pub position: Vec2,
    /// Normalized anchor: (0, 0) top-left, (0, 1) bottom-left.
    pub origin: Vec2,
    pub size: Vec2,
    pub velocity: Vec2,
    /// Per-body gravity, added to the world gravity.
    pub gravity: Vec2,
}

impl Body {
    pub fn new(texture: &str, position: Vec2, size: Vec2) -> Self {
        Self {
            texture: texture.to_string(),
            position,
            origin: Vec2::new(0.5, 0.5),
            size,
            velocity: Vec2::ZERO,
            gravity: Vec2::ZERO,
        }
    }

    pub fn set_origin(&mut self, x: f64, y: f64) -> &mut Self {
        self.origin = Vec2::new(x, y);
        self
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x - self.origin.x * self.size.x,
            self.position.y - self.origin.y * self.size.y,
            self.size.x,
            self.size.y,
        )
    }

    pub fn height(&self) -> f64 {
        self.size.y
    }
}

#[derive(Debug, Clone, Default)]
struct Group {
    members: Vec<BodyHandle>,
}

/// Owns every body in a scene; scenes keep handles.
#[derive(Debug, Default)]
pub struct ArcadeWorld {
    pub gravity: Vec2,
    bodies: Vec<Body>,
    groups: Vec<Group>,
}

impl ArcadeWorld {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            ..Self::default()
        }
    }

    pub fn add(&mut self, body: Body) -> BodyHandle {
        self.bodies.push(body);
        BodyHandle(self.bodies.len() - 1)
    }

    pub fn body(&self, handle: BodyHandle) -> &Body {
        &self.bodies[handle.0]
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> &mut Body {
        &mut self.bodies[handle.0]
    }

    /// Bodies in creation order.
    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn add_group(&mut self) -> GroupHandle {
        self.groups.push(Group::default());
        GroupHandle(self.groups.len() - 1)
    }

    pub fn add_to_group(&mut self, group: GroupHandle, body: Body) -> BodyHandle {
        let handle = self.add(body);
        self.groups[group.0].members.push(handle);
        handle
    }

    /// Members in insertion order.
    pub fn children(&self, group: GroupHandle) -> &[BodyHandle] {
        &self.groups[group.0].members
    }

    pub fn set_group_velocity_x(&mut self, group: GroupHandle, vx: f64) {
        for &handle in &self.groups[group.0].members {
            self.bodies[handle.0].velocity.x = vx;
        }
    }

    /// Advances every body by `dt` seconds with semi-implicit Euler.
    pub fn step(&mut self, dt: f64) {
        let gravity = self.gravity;
        for body in &mut self.bodies {
            body.velocity = body.velocity + (gravity + body.gravity) * dt;
            body.position = body.position + body.velocity * dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_follow_origin() {
        let mut pipe = Body::new("pipe", Vec2::new(100.0, 200.0), Vec2::new(52.0, 480.0));
        pipe.set_origin(0.0, 1.0);
        assert_eq!(pipe.bounds(), Rect::new(100.0, -280.0, 52.0, 480.0));

        pipe.set_origin(0.0, 0.0);
        assert_eq!(pipe.bounds(), Rect::new(100.0, 200.0, 52.0, 480.0));
    }

    #[test]
    fn body_gravity_accelerates_only_its_body() {
        let mut world = ArcadeWorld::new(Vec2::ZERO);
        let mut bird = Body::new("bird", Vec2::new(80.0, 300.0), Vec2::new(34.0, 24.0));
        bird.gravity.y = 300.0;
        let bird = world.add(bird);
        let pipe = world.add(Body::new("pipe", Vec2::ZERO, Vec2::new(52.0, 480.0)));

        world.step(0.5);

        assert_eq!(world.body(bird).velocity, Vec2::new(0.0, 150.0));
        assert_eq!(world.body(bird).position, Vec2::new(80.0, 375.0));
        assert_eq!(world.body(pipe).position, Vec2::ZERO);
    }

    #[test]
    fn group_keeps_insertion_order_and_sets_velocity() {
        let mut world = ArcadeWorld::default();
        let loose = world.add(Body::new("bird", Vec2::ZERO, Vec2::new(34.0, 24.0)));
        let group = world.add_group();
        let a = world.add_to_group(group, Body::new("pipe", Vec2::ZERO, Vec2::new(52.0, 480.0)));
        let b = world.add_to_group(group, Body::new("pipe", Vec2::ZERO, Vec2::new(52.0, 480.0)));
        assert_eq!(world.children(group), &[a, b]);
        assert_eq!(world.len(), 3);

        world.set_group_velocity_x(group, -200.0);
        world.step(0.5);
        assert_eq!(world.body(b).position.x, -100.0);
        assert_eq!(world.body(b).velocity.y, 0.0);
        assert_eq!(world.body(loose).velocity.x, 0.0);
    }
}
