use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::config::InitialConfig;
use crate::map::WaterMap;
use crate::track::TileCoord;

/// Generate a map of round lakes joined by straight canals, plus a few
/// aqueducts. The same config always yields the same map.
pub fn generate_map(config: &InitialConfig) -> WaterMap {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let (size_x, size_y) = (config.map_size_x, config.map_size_y);
    let mut map = WaterMap::new(size_x, size_y);

    if size_x == 0 || size_y == 0 {
        warn!("[GENERATION] Empty map requested");
        return map;
    }

    let min_radius = config.lake_min_radius.min(config.lake_max_radius);
    let max_radius = config.lake_max_radius.max(min_radius);

    let mut lake_centers = Vec::with_capacity(config.lake_count);
    for _ in 0..config.lake_count {
        let center = TileCoord::new(rng.random_range(0..size_x), rng.random_range(0..size_y));
        let radius = rng.random_range(min_radius..=max_radius);
        dig_lake(&mut map, center, radius);
        lake_centers.push(center);
    }

    if lake_centers.len() >= 2 {
        for _ in 0..config.canal_count {
            let a = lake_centers[rng.random_range(0..lake_centers.len())];
            let b = lake_centers[rng.random_range(0..lake_centers.len())];
            dig_canal(&mut map, a, b);
        }
    }

    let mut built = 0;
    for _ in 0..config.aqueduct_count * 8 {
        if built == config.aqueduct_count {
            break;
        }
        let from = TileCoord::new(rng.random_range(0..size_x), rng.random_range(0..size_y));
        let length = rng.random_range(2..=8);
        let to = if rng.random_bool(0.5) {
            TileCoord::new(from.x + length, from.y)
        } else {
            TileCoord::new(from.x, from.y + length)
        };
        if map.build_aqueduct(from, to).is_ok() {
            built += 1;
        }
    }

    info!(
        "[GENERATION] {}x{} map: {} lakes, {} canals, {} aqueducts, {} water tiles",
        size_x, size_y, lake_centers.len(), config.canal_count, built, map.water_tile_count()
    );
    map
}

fn dig_lake(map: &mut WaterMap, center: TileCoord, radius: u32) {
    let r = radius as i64;
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy > r * r {
                continue;
            }
            let (x, y) = (center.x as i64 + dx, center.y as i64 + dy);
            if x >= 0 && y >= 0 {
                map.set_water(TileCoord::new(x as u32, y as u32));
            }
        }
    }
}

/// L-shaped canal: along x first, then along y.
fn dig_canal(map: &mut WaterMap, from: TileCoord, to: TileCoord) {
    for x in from.x.min(to.x)..=from.x.max(to.x) {
        map.set_water(TileCoord::new(x, from.y));
    }
    for y in from.y.min(to.y)..=from.y.max(to.y) {
        map.set_water(TileCoord::new(to.x, y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::water_regions::WaterwayOracle;

    fn small_config(seed: u64) -> InitialConfig {
        InitialConfig {
            map_size_x: 64,
            map_size_y: 64,
            seed,
            lake_count: 6,
            lake_min_radius: 2,
            lake_max_radius: 5,
            canal_count: 3,
            aqueduct_count: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = generate_map(&small_config(42));
        let b = generate_map(&small_config(42));
        for y in 0..64 {
            for x in 0..64 {
                let tile = TileCoord::new(x, y);
                assert_eq!(a.tile(tile), b.tile(tile));
            }
        }
        assert!(a.water_tile_count() > 0);
    }

    #[test]
    fn test_generated_map_has_requested_size() {
        let map = generate_map(&small_config(1));
        assert_eq!(map.size_x(), 64);
        assert_eq!(map.size_y(), 64);
    }
}
