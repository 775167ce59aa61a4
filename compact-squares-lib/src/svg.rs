//! Deterministic SVG export of a configuration.
//!
//! Each cube becomes a unit square scaled by 8, topped by a glyph encoding
//! its classification: a filled square for stable chunk cubes, a filled disk
//! for stable links, hollow variants for their cut counterparts, and a hollow
//! square with a cross for connectors. Cubes are emitted in id order, so two
//! exports of the same configuration are byte-identical.

use crate::cube::Classification;
use crate::world::World;

/// Pixels per grid unit.
const SCALE: i32 = 8;

/// Renders the configuration as an SVG document.
pub fn render(world: &World) -> String {
    let Some(bounds) = world.bounds() else {
        return String::from(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 0 0\"></svg>\n",
        );
    };
    let width = bounds.width() * SCALE;
    let height = bounds.height() * SCALE;

    let mut out = String::new();
    out.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {width} {height}\">\n"
    ));

    for cube in world.cubes() {
        // flip y so north points up in the image
        let x = (cube.pos().x - bounds.min_x) * SCALE;
        let y = (bounds.max_y - cube.pos().y) * SCALE;
        let color = cube.color();
        out.push_str(&format!(
            "  <path d=\"M {x} {y} h {SCALE} v {SCALE} h -{SCALE} Z\" \
             fill=\"rgb({},{},{})\"/>\n",
            color.0, color.1, color.2
        ));
        glyph(&mut out, cube.tag(), x, y);
    }

    out.push_str("</svg>\n");
    out
}

fn glyph(out: &mut String, tag: Classification, x: i32, y: i32) {
    let cx = x + SCALE / 2;
    let cy = y + SCALE / 2;
    match tag {
        Classification::ChunkStable => out.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"4\" height=\"4\" fill=\"black\"/>\n",
            cx - 2,
            cy - 2
        )),
        Classification::ChunkCut => out.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"4\" height=\"4\" fill=\"none\" \
             stroke=\"black\" stroke-width=\"1\"/>\n",
            cx - 2,
            cy - 2
        )),
        Classification::LinkStable => out.push_str(&format!(
            "  <circle cx=\"{cx}\" cy=\"{cy}\" r=\"2\" fill=\"black\"/>\n"
        )),
        Classification::LinkCut => out.push_str(&format!(
            "  <circle cx=\"{cx}\" cy=\"{cy}\" r=\"2\" fill=\"none\" \
             stroke=\"black\" stroke-width=\"1\"/>\n"
        )),
        Classification::Connector => {
            out.push_str(&format!(
                "  <rect x=\"{}\" y=\"{}\" width=\"4\" height=\"4\" fill=\"none\" \
                 stroke=\"black\" stroke-width=\"1\"/>\n",
                cx - 2,
                cy - 2
            ));
            out.push_str(&format!(
                "  <path d=\"M {} {cy} h 4 M {cx} {} v 4\" stroke=\"black\" \
                 stroke-width=\"1\"/>\n",
                cx - 2,
                cy - 2
            ));
        }
        Classification::None => {}
    }
}
