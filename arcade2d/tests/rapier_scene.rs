use arcade2d::physics::{BodyDesc, BodyShape, Category, PhysicsBackend};
use arcade2d::world::Node;
use arcade2d::{ArcadeScene, NodeTag, RapierBackend, SceneConfig, SpawnPosition, Vec2, World};

const DT: f64 = 1.0 / 60.0;

fn run(scene: &mut ArcadeScene<RapierBackend>, frames: u32) {
    for frame in 0..frames {
        scene.tick(f64::from(frame) * DT).unwrap();
    }
}

#[test]
fn obstacle_hitting_player_is_removed() {
    let mut config = SceneConfig::top_right().with_frame(400.0, 800.0);
    // Spawn level with the player, 80 points to its right, sliding left.
    config.spawn.position = SpawnPosition::Fixed {
        x_fraction: 0.7,
        y_fraction: 0.75,
    };
    let mut scene = ArcadeScene::new(config, RapierBackend::new()).unwrap();
    scene.did_move().unwrap();

    scene.tick(0.0).unwrap();
    assert_eq!(scene.obstacle_count(), 1);
    let obstacle = scene.world().tagged(NodeTag::Obstacle)[0];

    run(&mut scene, 90);

    assert!(scene.session().hits() >= 1);
    assert!(!scene.world().is_alive(obstacle));
    assert!(!scene.physics().has_body(obstacle));
    // The player survives the hit.
    assert!(scene.player_position().is_some());
}

#[test]
fn obstacle_landing_on_floor_stays() {
    let mut config = SceneConfig::edge_spawn().with_frame(2000.0, 800.0);
    config.obstacles.speed = 0.0;
    config.spawn.interval = 100.0;
    config.spawn.position = SpawnPosition::Fixed {
        x_fraction: 0.5,
        y_fraction: 0.5,
    };
    let mut scene = ArcadeScene::new(config, RapierBackend::new()).unwrap();
    scene.did_move().unwrap();

    run(&mut scene, 180);

    assert_eq!(scene.obstacle_count(), 1);
    assert_eq!(scene.session().hits(), 0);
    let view = scene.obstacles()[0];
    // Resting on the floor at y = 200, not fallen through it.
    assert!(view.position.y > 190.0, "obstacle at {}", view.position);
}

#[test]
fn backend_reports_only_configured_contacts() {
    let mut world = World::new();
    let player = world.spawn(Node::new(NodeTag::Player, Category::PLAYER, Vec2::splat(20.0)));
    let obstacle = world.spawn(Node::new(NodeTag::Obstacle, Category::OBSTACLE, Vec2::splat(20.0)));
    let floor = world.spawn(Node::new(NodeTag::Floor, Category::FLOOR, Vec2::new(400.0, 1.0)));

    let mut physics = RapierBackend::with_gravity(Vec2::new(0.0, -135.0));
    physics
        .create_body(
            floor,
            &BodyDesc::fixed(Vec2::new(200.0, 0.0), BodyShape::Rect { width: 400.0, height: 1.0 })
                .with_category(Category::FLOOR)
                .with_contact_mask(Category::OBSTACLE)
                .with_collision_mask(Category::OBSTACLE),
        )
        .unwrap();
    // Sitting on the floor; it has no relationship with it.
    physics
        .create_body(
            player,
            &BodyDesc::dynamic(Vec2::new(50.0, 5.0), BodyShape::Circle { radius: 10.0 })
                .with_gravity(false)
                .with_category(Category::PLAYER)
                .with_contact_mask(Category::OBSTACLE)
                .with_collision_mask(Category::OBSTACLE),
        )
        .unwrap();
    physics
        .create_body(
            obstacle,
            &BodyDesc::dynamic(Vec2::new(300.0, 30.0), BodyShape::Circle { radius: 10.0 })
                .with_category(Category::OBSTACLE)
                .with_contact_mask(Category::PLAYER | Category::FLOOR)
                .with_collision_mask(Category::PLAYER | Category::FLOOR),
        )
        .unwrap();

    let mut contacts = Vec::new();
    for _ in 0..120 {
        physics.step(DT as f32);
        contacts.extend(physics.drain_contacts());
    }

    assert!(contacts
        .iter()
        .any(|c| (c.a == floor && c.b == obstacle) || (c.a == obstacle && c.b == floor)));
    assert!(!contacts
        .iter()
        .any(|c| (c.a == floor && c.b == player) || (c.a == player && c.b == floor)));
}

#[test]
fn held_thrust_keeps_player_on_screen() {
    let config = SceneConfig::edge_spawn().with_seed(2);
    let height = config.frame.height;
    let mut scene = ArcadeScene::new(config, RapierBackend::new()).unwrap();
    scene.did_move().unwrap();

    scene.touch_began(10.0);
    for frame in 0..600 {
        scene.tick(f64::from(frame) * DT).unwrap();
        let position = scene.player_position().unwrap();
        assert!(position.y <= height, "player escaped to {position}");
    }
}

#[test]
fn released_touch_leaves_no_push() {
    let mut config = SceneConfig::edge_spawn().with_seed(2);
    config.gravity = Vec2::ZERO;
    config.obstacles.speed = 0.0;
    let mut scene = ArcadeScene::new(config, RapierBackend::new()).unwrap();
    scene.did_move().unwrap();
    let player = scene.player().unwrap();

    scene.touch_began(10.0);
    scene.tick(3.0).unwrap();
    scene.tick(2.0).unwrap();
    scene.tick(2.0).unwrap();
    scene.touch_ended();
    scene.tick(2.0 + DT).unwrap();

    assert_eq!(scene.physics().linear_velocity(player), Some(Vec2::ZERO));
}
