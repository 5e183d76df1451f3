use bevy::prelude::*;

use waterway::config::{InitialConfig, INITIAL_CONFIG_PATH};
use waterway::generation::generate_map;
use waterway::map::WaterMap;
use waterway::savegame::{load_game, save_game, SaveGame};
use waterway::track::TileCoord;
use waterway::water_regions::{
    WaterRegionPatchDesc, WaterRegions, WaterRegionsPlugin, WaterTileChanged, WaterwayOracle,
    WATER_REGION_EDGE_LENGTH,
};

use fixedbitset::FixedBitSet;
use rustc_hash::FxHashSet;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;

fn setup_file_logging() -> String {
    // Create logs directory if it doesn't exist
    let log_dir = PathBuf::from("logs");
    if !log_dir.exists() {
        fs::create_dir_all(&log_dir).expect("Failed to create logs directory");
    }

    cleanup_old_logs(&log_dir, 25);

    let now = chrono::Local::now();
    let log_filename = format!("waterway_{}.log", now.format("%Y%m%d_%H%M%S"));
    let log_path_str = log_dir.join(&log_filename).to_string_lossy().to_string();

    let file_appender = RollingFileAppender::new(Rotation::NEVER, &log_dir, &log_filename);

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("waterway=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    log_path_str
}

fn cleanup_old_logs(log_dir: &PathBuf, keep_count: usize) {
    if let Ok(entries) = fs::read_dir(log_dir) {
        let mut log_files: Vec<_> = entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|s| s.starts_with("waterway") && s.ends_with(".log"))
                    .unwrap_or(false)
            })
            .collect();

        // Oldest first
        log_files.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

        if log_files.len() > keep_count {
            for file in log_files.iter().take(log_files.len() - keep_count) {
                let _ = fs::remove_file(file.path());
            }
        }
    }
}

/// Breadth-first walk over the patch graph starting at `start`.
/// Returns (patches reached, regions touched).
fn explore_patch_graph(regions: &mut WaterRegions, map: &WaterMap, start: WaterRegionPatchDesc) -> (usize, usize) {
    let mut visited: FxHashSet<WaterRegionPatchDesc> = FxHashSet::default();
    let mut regions_seen = FixedBitSet::with_capacity(regions.len());
    let mut queue = VecDeque::new();

    visited.insert(start);
    queue.push_back(start);
    while let Some(patch) = queue.pop_front() {
        if let Some(index) = regions.index_of(patch.region()) {
            regions_seen.insert(index);
        }
        regions.visit_patch_neighbors(map, patch, |neighbor| {
            if visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        });
    }

    (visited.len(), regions_seen.count_ones(..))
}

fn first_water_tile(map: &WaterMap) -> Option<TileCoord> {
    (0..map.size_y())
        .flat_map(|y| (0..map.size_x()).map(move |x| TileCoord::new(x, y)))
        .find(|&tile| !map.water_tracks(tile).is_empty())
}

fn main() {
    let log_file = setup_file_logging();

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║  Waterway - Logging to file                              ║");
    println!("╠══════════════════════════════════════════════════════════╣");
    println!("║  Log file: {:<45} ║", log_file);
    println!("╚══════════════════════════════════════════════════════════╝");

    let config = InitialConfig::load_or_default(INITIAL_CONFIG_PATH);
    let map = generate_map(&config);

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(map)
        .add_plugins(WaterRegionsPlugin::<WaterMap>::default());
    app.update();

    if app.world().resource::<WaterRegions>().is_empty() {
        error!(
            "No water regions built for a {}x{} map, sizes must be multiples of {}",
            config.map_size_x, config.map_size_y, WATER_REGION_EDGE_LENGTH
        );
        return;
    }

    let Some(start_tile) = first_water_tile(app.world().resource::<WaterMap>()) else {
        warn!("Generated map has no water, nothing to explore");
        return;
    };

    let world = app.world_mut();
    let (patches, regions_touched, start) = world.resource_scope(|world, mut regions: Mut<WaterRegions>| {
        let map = world.resource::<WaterMap>();
        let start = regions.patch_info(map, start_tile);
        let region = regions.get_updated(map, start_tile);
        debug!("Start region labels:\n{}", region.format_labels());
        let (patches, touched) = explore_patch_graph(&mut *regions, map, start);
        (patches, touched, start)
    });
    info!(
        "Patch {:?} reaches {} patches across {} regions",
        start, patches, regions_touched
    );

    // Dry out the start tile and let the plugin invalidate its region.
    let partner = app.world_mut().resource_mut::<WaterMap>().set_land(start_tile);
    app.world_mut().write_message(WaterTileChanged { tile: start_tile });
    if let Some(partner) = partner {
        // Drying an aqueduct head takes the whole aqueduct with it.
        app.world_mut().write_message(WaterTileChanged { tile: partner });
    }
    app.update();

    let world = app.world_mut();
    let save = world.resource_scope(|world, mut regions: Mut<WaterRegions>| {
        let map = world.resource::<WaterMap>();
        let after = regions.patch_info(map, start_tile);
        info!("After terraforming, tile ({}, {}) is in patch {:?}", start_tile.x, start_tile.y, after);
        SaveGame::capture(map, &*regions)
    });

    if let Err(e) = save_game(&config.save_path, &save) {
        error!("Failed to save {}: {}", config.save_path, e);
        return;
    }

    match load_game(&config.save_path) {
        Ok(loaded) => {
            let mut restored: WaterRegions = WaterRegions::new();
            match loaded.restore_regions(&mut restored) {
                Ok(()) => {
                    let matches = restored.snapshot_validity() == save.water_regions;
                    info!(
                        "Reloaded {} regions ({} recomputed), validity flags match: {}",
                        restored.len(), restored.recompute_count(), matches
                    );
                }
                Err(e) => error!("Failed to restore water regions: {}", e),
            }
        }
        Err(e) => error!("Failed to load {}: {}", config.save_path, e),
    }
}
