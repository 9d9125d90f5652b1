// Ship equipment routing demo
//
// Builds an engine room, routes between pieces of equipment with each
// planner, and saves a top-down plot of the result.
//
// usage: ship_route [config.toml]

use std::env;
use std::f64::consts::FRAC_PI_2;
use std::process;

use log::{error, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ship_routing::scene::ObstacleCache;
use ship_routing::utils::{colors, PathStyle, Visualizer};
use ship_routing::{PlannerMethod, Router, RouterConfig, RoutingResult, Scene, SceneNode, Solid, SystemTag};

fn engine_room(rng: &mut StdRng) -> Scene {
    let mut root = SceneNode::group("engine room");

    for (name, z) in [("main engine port", -4.0), ("main engine starboard", 4.0)].iter() {
        root.add_child(
            SceneNode::solid(name, Solid::cuboid(6.0, 3.0, 2.4).tagged(SystemTag::Propulsion))
                .with_translation(-10.0 + rng.gen_range(-1.0..1.0), 0.0, *z),
        );
    }
    root.add_child(
        SceneNode::solid("generator", Solid::cuboid(3.0, 2.0, 2.0).tagged(SystemTag::Electrical))
            .with_translation(2.0, -1.0, -7.0 + rng.gen_range(-0.5..0.5)),
    );
    root.add_child(
        SceneNode::solid("switchboard", Solid::cuboid(4.0, 2.5, 0.6).tagged(SystemTag::Electrical))
            .with_translation(15.0, 0.0, 7.5),
    );

    // Overhead ventilation trunk with two drops
    let mut hvac = SceneNode::group("ventilation").with_translation(0.0, 3.5, 0.0);
    hvac.add_child(SceneNode::solid("supply trunk", Solid::cuboid(24.0, 1.0, 1.2).tagged(SystemTag::Hvac)));
    for n in 0..2 {
        let x = -6.0 + 10.0 * n as f64 + rng.gen_range(-1.0..1.0);
        hvac.add_child(
            SceneNode::solid(&format!("drop {}", n), Solid::cylinder(0.4, 0.4, 3.0).tagged(SystemTag::Hvac))
                .with_translation(x, -2.0, 0.0),
        );
    }
    root.add_child(hvac);

    // Pipe run lying along z
    root.add_child(
        SceneNode::solid("fuel main", Solid::cylinder(0.3, 0.3, 12.0).tagged(SystemTag::Piping))
            .with_rotation_euler(FRAC_PI_2, 0.0, 0.0)
            .with_translation(6.0, -2.0, 0.0),
    );
    // Untagged decoration never blocks routes
    root.add_child(SceneNode::solid("handrail", Solid::cuboid(20.0, 0.1, 0.1)).with_translation(0.0, 1.0, -9.0));

    Scene::new(root)
}

fn load_config() -> RoutingResult<RouterConfig> {
    match env::args().nth(1) {
        Some(path) => {
            info!("loading router config from {}", path);
            RouterConfig::load_from_file(path)
        }
        None => Ok(RouterConfig::default()),
    }
}

fn run() -> RoutingResult<()> {
    let base = load_config()?;
    let mut rng = StdRng::seed_from_u64(7);
    let scene = engine_room(&mut rng);

    let mut cache = ObstacleCache::new();
    let obstacles = cache.get(&scene, base.margin).clone();
    info!("engine room has {} obstacle boxes", obstacles.len());

    let mut vis = Visualizer::new();
    vis.set_title("Engine room routes (top view)")
        .set_x_range(base.grid.bounds.min.x, base.grid.bounds.max.x)
        .set_z_range(base.grid.bounds.min.z, base.grid.bounds.max.z)
        .plot_obstacles(&obstacles);

    let queries = [
        ("main engine port", "switchboard", PlannerMethod::Grid, colors::PATH),
        ("generator", "main engine starboard", PlannerMethod::Steering, colors::RAW_PATH),
    ];
    for (from, to, method, color) in queries.iter() {
        let mut config = base.clone();
        config.method = *method;
        let router = Router::new(config);

        match router.route_between(&scene, from, to) {
            Ok(route) => {
                info!(
                    "{} -> {} via {:?}: {} waypoints (raw {}), length {:.2} m",
                    from,
                    to,
                    route.method_used,
                    route.path.len(),
                    route.raw_len,
                    route.path.total_length()
                );
                if let (Some(start), Some(goal)) = (route.path.first(), route.path.last()) {
                    vis.plot_start(*start).plot_goal(*goal);
                }
                vis.plot_path(&route.path, &PathStyle::new(color, &format!("{} -> {}", from, to)));
            }
            Err(e) => error!("{} -> {}: {}", from, to, e),
        }
    }

    if let Err(e) = vis.save_png("ship_route.png", 1000, 600) {
        error!("failed to save plot: {}", e);
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        error!("{}", e);
        process::exit(1);
    }
}
