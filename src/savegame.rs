use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use flate2::write::ZlibEncoder;
use flate2::read::ZlibDecoder;
use flate2::Compression;
use crate::map::WaterMap;
use crate::water_regions::{WaterRegionSaveLoadInfo, WaterRegions, WaterwayOracle};

pub const SAVEGAME_VERSION: u32 = 1;

/// Everything written to disk. Water regions only contribute their validity
/// flags; labels are always rebuilt from the map after loading.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SaveGame {
    pub version: u32,
    pub map: WaterMap,
    pub water_regions: Vec<WaterRegionSaveLoadInfo>,
}

impl SaveGame {
    pub fn capture<const EDGE: usize>(map: &WaterMap, regions: &WaterRegions<EDGE>) -> Self {
        Self {
            version: SAVEGAME_VERSION,
            map: map.clone(),
            water_regions: regions.snapshot_validity(),
        }
    }

    /// Rebuild the region grid for the loaded map.
    pub fn restore_regions<const EDGE: usize>(&self, regions: &mut WaterRegions<EDGE>) -> Result<(), Box<dyn std::error::Error>> {
        regions.restore(&self.map, &self.water_regions)?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct VersionMismatch {
    pub found: u32,
}

impl std::fmt::Display for VersionMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "savegame version {} is not supported (expected {})", self.found, SAVEGAME_VERSION)
    }
}

impl std::error::Error for VersionMismatch {}

pub fn save_game(path: impl AsRef<Path>, save: &SaveGame) -> Result<(), Box<dyn std::error::Error>> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let mut encoder = ZlibEncoder::new(writer, Compression::default());
    bincode::serialize_into(&mut encoder, save)?;
    encoder.finish()?;
    info!(
        "[SAVEGAME] Wrote {} ({}x{} map, {} water regions)",
        path.display(), save.map.size_x(), save.map.size_y(), save.water_regions.len()
    );
    Ok(())
}

pub fn load_game(path: impl AsRef<Path>) -> Result<SaveGame, Box<dyn std::error::Error>> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);
    let mut decoder = ZlibDecoder::new(reader);
    let save: SaveGame = bincode::deserialize_from(&mut decoder)?;
    if save.version != SAVEGAME_VERSION {
        return Err(Box::new(VersionMismatch { found: save.version }));
    }
    Ok(save)
}
