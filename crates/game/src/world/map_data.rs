use engine::{Rect, Vec2};
use serde::Deserialize;

use super::{WorldBuildError, WorldId};

const TOWN_MAP_JSON: &str = include_str!("../../assets/maps/town.json");
const DUNGEON_MAP_JSON: &str = include_str!("../../assets/maps/dungeon.json");

fn default_cell_size() -> f32 {
    16.0
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CoinData {
    pub(crate) position: Vec2,
    pub(crate) value: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct PortalData {
    pub(crate) area: Rect,
    pub(crate) destination: WorldId,
}

/// On-disk description of one world area.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct MapData {
    pub(crate) world_id: WorldId,
    pub(crate) width: f32,
    pub(crate) height: f32,
    #[serde(default = "default_cell_size")]
    pub(crate) cell_size: f32,
    pub(crate) hero_spawn: Vec2,
    #[serde(default)]
    pub(crate) walls: Vec<Rect>,
    #[serde(default)]
    pub(crate) npcs: Vec<Vec2>,
    #[serde(default)]
    pub(crate) coins: Vec<CoinData>,
    #[serde(default)]
    pub(crate) speed_shrines: Vec<Vec2>,
    #[serde(default)]
    pub(crate) portals: Vec<PortalData>,
}

impl MapData {
    pub(crate) fn world_area(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

pub(crate) fn parse_map(raw: &str) -> Result<MapData, WorldBuildError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let map: MapData = serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        WorldBuildError::MapParse {
            path,
            source: error.into_inner(),
        }
    })?;
    if !(map.width > 0.0 && map.height > 0.0) {
        return Err(WorldBuildError::EmptyWorldArea {
            world: map.world_id,
        });
    }
    Ok(map)
}

pub(crate) fn builtin_map(world_id: WorldId) -> Result<MapData, WorldBuildError> {
    let raw = match world_id {
        WorldId::Town => TOWN_MAP_JSON,
        WorldId::Dungeon => DUNGEON_MAP_JSON,
    };
    let map = parse_map(raw)?;
    if map.world_id != world_id {
        return Err(WorldBuildError::MapIdMismatch {
            expected: world_id,
            actual: map.world_id,
        });
    }
    Ok(map)
}
