//! Loading and saving of instance documents.
//!
//! An instance is a JSON object with a `_version` tag and a list of cubes:
//!
//! ```json
//! { "_version": 1,
//!   "cubes": [ { "x": 0, "y": 0, "color": [68, 187, 248] } ] }
//! ```
//!
//! `color` is optional. Versions other than 1 are rejected, as are documents
//! whose cubes are not 4-connected or collide on a cell.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::cube::Color;
use crate::error::InstanceError;
use crate::topology;
use crate::world::World;

pub const INSTANCE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct InstanceDoc {
    #[serde(rename = "_version")]
    version: u32,
    cubes: Vec<CubeDoc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CubeDoc {
    x: i32,
    y: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<[u8; 3]>,
}

/// Parses an instance document into a marked world.
pub fn deserialize(text: &str) -> Result<World, InstanceError> {
    let doc: InstanceDoc = serde_json::from_str(text)?;
    if doc.version != INSTANCE_VERSION {
        return Err(InstanceError::BadVersion(doc.version));
    }

    let mut world = World::new();
    for cube in &doc.cubes {
        let color = cube
            .color
            .map(|[r, g, b]| Color(r, g, b))
            .unwrap_or_default();
        world.add_unmarked(Cell::new(cube.x, cube.y), color)?;
    }
    if !topology::is_connected(&world) {
        return Err(InstanceError::Disconnected);
    }
    world.mark();
    Ok(world)
}

/// Renders a world back into an instance document.
pub fn serialize(world: &World) -> Result<String, InstanceError> {
    let doc = InstanceDoc {
        version: INSTANCE_VERSION,
        cubes: world
            .cubes()
            .iter()
            .map(|cube| {
                let Color(r, g, b) = cube.color();
                CubeDoc {
                    x: cube.pos().x,
                    y: cube.pos().y,
                    color: Some([r, g, b]),
                }
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

pub fn load(path: &Path) -> Result<World, InstanceError> {
    deserialize(&fs::read_to_string(path)?)
}

pub fn save(path: &Path, world: &World) -> Result<(), InstanceError> {
    fs::write(path, serialize(world)?)?;
    Ok(())
}
