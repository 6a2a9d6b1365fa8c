//! Collider Demo
//!
//! Runs a short scripted scene through the collision core and logs what
//! happens:
//! - a player walks into a row of crates and shoves them against a wall
//! - a linked cart pair rolls until its front car hits the wall
//! - a gate swings shut on its hinge and stops on a post
//!
//! Pass a `.toml` or `.ron` file as the first argument to override the
//! collision settings.

use collider_core::prelude::*;
use std::f32::consts::FRAC_PI_2;

const PLAYER: CollisionLayers = CollisionLayers::PLAYER;
const CRATE: CollisionLayers = CollisionLayers::DEBRIS;
const GATE: CollisionLayers = CollisionLayers::PLATFORM;

/// Game-defined layer bit for fence posts
const POST_BIT: u32 = 8;

struct Scene {
    entities: Entities,
    world: SegmentWorld,
    collision: Collision,
    post: CollisionLayers,
}

impl Scene {
    fn new(config: CollisionConfig, post: CollisionLayers) -> Self {
        let mut world = SegmentWorld::new(config.bucket_size);
        world.add_room(Aabb::new(Vec2::new(-20.0, -10.0), Vec2::new(20.0, 10.0)));
        world.add_block(Aabb::new(Vec2::new(-2.0, -10.0), Vec2::new(-1.0, -6.0)));

        Self {
            entities: Entities::new(),
            world,
            collision: Collision::with_config(config),
            post,
        }
    }

    fn spawn_box(&mut self, at: Vec2, size: Vec2, kind: CollisionLayers) -> Result<Entity, CollisionError> {
        let mask = self.solid();
        let entity = self.entities.spawn(at);
        let bodies = self.collision.bodies_mut();
        let body = bodies.create_obj(entity, &self.entities)?;
        bodies.set_size(body, size, &self.entities)?;
        bodies.set_collide_type(body, kind)?;
        bodies.set_collide_mask(body, mask)?;
        Ok(entity)
    }

    fn solid(&self) -> CollisionLayers {
        CollisionLayers::WORLD | PLAYER | CRATE | GATE | self.post
    }

    fn walk(&mut self, entity: Entity, step: Vec2, steps: usize) {
        for _ in 0..steps {
            let result = self
                .collision
                .collider_move(&mut self.entities, &self.world, entity, step, CRATE, 4);
            for pushed in &result.pushed {
                log::debug!("  pushed {:?} by {:?}", pushed.entity, pushed.movement);
            }
            self.collision.process_events(&mut self.entities);
            if !result.is_complete() {
                log::info!("{:?} blocked at ratio {:.3}", entity, result.ratio);
                break;
            }
        }
    }

    fn origin(&self, entity: Entity) -> Vec2 {
        self.entities.origin(entity).unwrap_or_else(Vec2::zeros)
    }
}

fn load_config() -> Result<CollisionConfig, ConfigError> {
    let config = match std::env::args().nth(1) {
        Some(path) => CollisionConfig::load_from_file(path)?,
        None => CollisionConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting collider demo");
    let post = CollisionLayers::custom(POST_BIT).ok_or("post layer bit out of range")?;
    let mut scene = Scene::new(load_config()?, post);

    // Player shoves a row of crates towards the east wall
    let player = scene.spawn_box(Vec2::new(0.0, 0.0), Vec2::new(2.0, 2.0), PLAYER)?;
    let crates: Vec<Entity> = (0..3)
        .map(|i| scene.spawn_box(Vec2::new(4.0 + 3.0 * i as f32, 0.0), Vec2::new(2.0, 2.0), CRATE))
        .collect::<Result<_, _>>()?;
    scene.walk(player, Vec2::new(1.5, 0.0), 20);
    log::info!("player at {:?}", scene.origin(player));
    for c in &crates {
        log::info!("crate {:?} at {:?}", c, scene.origin(*c));
    }

    // Two linked carts roll west until the lead cart reaches the block
    let lead = scene.spawn_box(Vec2::new(6.0, -8.0), Vec2::new(2.0, 2.0), CRATE)?;
    let trailer = scene.spawn_box(Vec2::new(9.0, -8.0), Vec2::new(2.0, 2.0), CRATE)?;
    scene
        .collision
        .constraints_mut()
        .create_constraint(lead, trailer, false, false, 1);
    scene.walk(trailer, Vec2::new(-2.0, 0.0), 10);
    log::info!("carts at {:?} and {:?}", scene.origin(lead), scene.origin(trailer));

    // Gate hinged at its west end swings down onto a post
    let gate = scene.spawn_box(Vec2::new(-10.0, 5.0), Vec2::new(6.0, 0.5), GATE)?;
    scene.spawn_box(Vec2::new(-8.0, 1.0), Vec2::new(1.0, 2.0), post)?;
    let swing = scene.collision.collider_rotate(
        &mut scene.entities,
        &scene.world,
        gate,
        -FRAC_PI_2,
        Vec2::new(-3.0, 0.0),
    );
    log::info!("gate turned {:.3} rad ({:.0}% of the request)", swing.rotation, swing.ratio * 100.0);

    let mut draw = DebugDrawSystem::new();
    scene.collision.render(
        &scene.entities,
        &scene.world,
        &Aabb::new(Vec2::new(-25.0, -15.0), Vec2::new(25.0, 15.0)),
        &mut draw,
    );
    log::info!("{} debug shapes queued", draw.shape_count());

    scene.entities.despawn(crates[0]);
    scene.collision.process_events(&mut scene.entities);
    let purged = scene.collision.clean_up(&scene.entities);
    log::info!("purged {} stale records", purged);

    log::info!("Collider demo finished");
    Ok(())
}
