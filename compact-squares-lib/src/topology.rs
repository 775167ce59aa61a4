//! Connectivity and boundary-decomposition analysis.
//!
//! Everything here is a pure function of the occupied cell set: positions are
//! never mutated, only the classification metadata written back by
//! [`mark_components`]. The decomposition walks the outside boundary of the
//! configuration and splits it into chunks (fat regions), links (thin paths)
//! and connectors (cubes joining multiple components), then refines each tag
//! with articulation-point analysis.

use std::collections::{HashSet, VecDeque};

use tracing::trace;

use crate::cell::Cell;
use crate::cube::Classification;
use crate::direction::{Compass, CARDINALS};
use crate::world::World;

/// Whether the occupied set is 4-connected. Empty and single-cube
/// configurations are trivially connected.
pub fn is_connected(world: &World) -> bool {
    connected_except(world, None)
}

/// Whether the occupied set stays 4-connected with cube `skip` treated as
/// absent.
pub fn is_connected_without(world: &World, skip: usize) -> bool {
    connected_except(world, Some(skip))
}

fn connected_except(world: &World, skip: Option<usize>) -> bool {
    let total = world.len().saturating_sub(usize::from(skip.is_some()));
    if total <= 1 {
        return true;
    }
    let start = match skip {
        Some(0) => 1,
        _ => 0,
    };
    reachable_from(world, start, skip) == total
}

/// Number of cubes reachable from `start` by cardinal steps, `skip` treated
/// as absent.
fn reachable_from(world: &World, start: usize, skip: Option<usize>) -> usize {
    let mut visited = vec![false; world.len()];
    let mut queue = VecDeque::from([start]);
    visited[start] = true;
    let mut count = 0;

    while let Some(id) = queue.pop_front() {
        count += 1;
        let pos = world.cube(id).pos();
        for dir in CARDINALS {
            if let Some(next) = world.at(pos + dir.step()) {
                if Some(next) != skip && !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }
    }
    count
}

/// Articulation-point analysis over the cube adjacency graph.
///
/// Returns `stable[id] = true` iff removing cube `id` keeps the rest
/// connected. Runs the low-link depth-first search with an explicit stack;
/// instances of 10^4 cubes would overflow the machine stack otherwise.
pub fn stable_cubes(world: &World) -> Vec<bool> {
    let n = world.len();
    let mut depth = vec![usize::MAX; n];
    let mut low = vec![0; n];
    let mut parent = vec![usize::MAX; n];
    let mut cut = vec![false; n];

    for start in 0..n {
        if depth[start] != usize::MAX {
            continue;
        }
        depth[start] = 0;
        low[start] = 0;
        let mut root_children = 0;
        // (cube, next cardinal slot to explore)
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];

        while let Some(frame) = stack.last_mut() {
            let (id, slot) = *frame;
            if slot < CARDINALS.len() {
                frame.1 += 1;
                let dir = CARDINALS[slot];
                let Some(next) = world.at(world.cube(id).pos() + dir.step()) else {
                    continue;
                };
                if depth[next] == usize::MAX {
                    depth[next] = depth[id] + 1;
                    low[next] = depth[next];
                    parent[next] = id;
                    if id == start {
                        root_children += 1;
                    }
                    stack.push((next, 0));
                } else if next != parent[id] {
                    low[id] = low[id].min(depth[next]);
                }
            } else {
                stack.pop();
                if let Some(&(up, _)) = stack.last() {
                    low[up] = low[up].min(low[id]);
                    if up != start && low[id] >= depth[up] {
                        cut[up] = true;
                    }
                }
            }
        }
        if root_children >= 2 {
            cut[start] = true;
        }
    }

    cut.into_iter().map(|c| !c).collect()
}

/// Preference order for the next outward direction, given the direction of
/// travel into the current cube. First present neighbor wins; the order keeps
/// the outside of the configuration on the walker's right.
fn bend_preferences(incoming: Compass) -> [Compass; 4] {
    match incoming {
        Compass::N => [Compass::E, Compass::N, Compass::W, Compass::S],
        Compass::E => [Compass::S, Compass::E, Compass::N, Compass::W],
        Compass::S => [Compass::W, Compass::S, Compass::E, Compass::N],
        Compass::W => [Compass::N, Compass::W, Compass::S, Compass::E],
        _ => unreachable!(),
    }
}

/// Counter-clockwise walk along the outside boundary.
///
/// Starts at the downmost-leftmost cube with an artificial incoming direction
/// of south and stops when a (cell, outgoing direction) edge repeats. The
/// start cube is both the first and the last element of the returned list;
/// cubes visited from several sides appear once per visit.
pub fn outside_cubes(world: &World) -> Vec<usize> {
    let Some(root) = world.root() else {
        return Vec::new();
    };
    let mut walk = Vec::new();
    let mut seen: HashSet<(Cell, Compass)> = HashSet::new();
    let mut current = root;
    let mut incoming = Compass::S;

    loop {
        walk.push(current);
        let pos = world.cube(current).pos();
        let Some(outgoing) = bend_preferences(incoming)
            .into_iter()
            .find(|dir| world.has(pos, *dir))
        else {
            break; // isolated cube
        };
        if !seen.insert((pos, outgoing)) {
            break;
        }
        current = match world.at(pos + outgoing.step()) {
            Some(next) => next,
            None => unreachable!(),
        };
        incoming = outgoing;
    }
    walk
}

/// Classifies every cube from the occupied set and writes the result into the
/// cube metadata: tag, chunk id and boundary flag.
///
/// The outside walk is traversed with a stack. A cube's first appearance
/// pushes it. A reappearance matching the element one below the top pops the
/// top: the pair forms a degenerate link component. Any other reappearance
/// closed a cycle along the boundary: everything above the match pops as a
/// fresh chunk, and the match itself joins the chunk as its attachment point.
/// Cubes recorded in more than one component become connectors. Cubes never
/// visited by the walk are interior and inherit the chunk id of their
/// surrounding boundary. A final pass merges a stray degree-1 link into its
/// parent chunk when its sole neighbor is a connector with no other link
/// neighbor.
pub fn mark_components(world: &mut World) {
    let n = world.len();
    for cube in world.cubes_mut() {
        cube.tag = Classification::None;
        cube.chunk = None;
        cube.on_boundary = false;
    }
    if n == 0 {
        return;
    }

    let stable = stable_cubes(world);
    let walk = outside_cubes(world);

    let mut chunk_of: Vec<Option<usize>> = vec![None; n];
    let mut chunk_members = vec![0u32; n];
    let mut link_members = vec![0u32; n];
    let mut attachment = vec![false; n];
    let mut on_boundary = vec![false; n];
    let mut pushed = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut chunks_seen = 0;

    for &cube in &walk {
        on_boundary[cube] = true;
        if !pushed[cube] {
            pushed[cube] = true;
            stack.push(cube);
            continue;
        }
        if stack.len() >= 2 && stack[stack.len() - 2] == cube {
            // the top is a spur between two visits of the same cube
            let top = stack.pop().unwrap_or(cube);
            link_members[top] += 1;
            link_members[cube] += 1;
        } else if let Some(at) = stack.iter().rposition(|&c| c == cube) {
            while stack.len() > at + 1 {
                let member = stack.pop().unwrap_or(cube);
                chunk_members[member] += 1;
                chunk_of[member].get_or_insert(chunks_seen);
            }
            chunk_members[cube] += 1;
            chunk_of[cube].get_or_insert(chunks_seen);
            if at > 0 {
                attachment[cube] = true;
            }
            chunks_seen += 1;
        }
        // reappearance of a fully popped cube: memberships already recorded
    }
    trace!(chunks = chunks_seen, walk_len = walk.len(), "outside walk decomposed");

    // interior cubes inherit the chunk id of the boundary enclosing them
    let mut queue: VecDeque<usize> = (0..n).filter(|&id| chunk_of[id].is_some()).collect();
    while let Some(id) = queue.pop_front() {
        let chunk = chunk_of[id];
        let pos = world.cube(id).pos();
        for dir in CARDINALS {
            if let Some(next) = world.at(pos + dir.step()) {
                if chunk_of[next].is_none() && !on_boundary[next] {
                    chunk_of[next] = chunk;
                    chunk_members[next] += 1;
                    queue.push_back(next);
                }
            }
        }
    }

    let mut is_chunk: Vec<bool> = (0..n).map(|id| chunk_members[id] > 0).collect();
    let mut is_connector: Vec<bool> = (0..n)
        .map(|id| {
            attachment[id]
                || chunk_members[id] >= 2
                || (chunk_members[id] >= 1 && link_members[id] >= 1)
        })
        .collect();

    // merge stray leaves into their parent chunk
    for id in 0..n {
        if is_chunk[id] || is_connector[id] {
            continue;
        }
        let pos = world.cube(id).pos();
        let adjacent: Vec<usize> = CARDINALS
            .iter()
            .filter_map(|dir| world.at(pos + dir.step()))
            .collect();
        let &[sole] = adjacent.as_slice() else {
            continue;
        };
        if !is_connector[sole] || chunk_of[sole].is_none() {
            continue;
        }
        let connector_pos = world.cube(sole).pos();
        let other_link = CARDINALS
            .iter()
            .filter_map(|dir| world.at(connector_pos + dir.step()))
            .any(|other| other != id && !is_chunk[other] && !is_connector[other]);
        if other_link {
            continue;
        }
        is_connector[sole] = false;
        is_chunk[sole] = true;
        is_chunk[id] = true;
        chunk_of[id] = chunk_of[sole];
    }

    for id in 0..n {
        let cube = &mut world.cubes_mut()[id];
        cube.on_boundary = on_boundary[id];
        cube.chunk = chunk_of[id];
        cube.tag = if is_connector[id] {
            Classification::Connector
        } else if is_chunk[id] {
            if stable[id] {
                Classification::ChunkStable
            } else {
                Classification::ChunkCut
            }
        } else if stable[id] {
            Classification::LinkStable
        } else {
            Classification::LinkCut
        };
    }
}

/// Whether the whole configuration forms one chunk: every cube carries a
/// chunk tag and the same chunk id.
pub fn is_single_chunk(world: &World) -> bool {
    let mut cubes = world.cubes().iter();
    let Some(first) = cubes.next() else {
        return false;
    };
    let chunk = first.chunk();
    first.tag().is_chunk()
        && chunk.is_some()
        && cubes.all(|cube| cube.tag().is_chunk() && cube.chunk() == chunk)
}

/// Number of cubes reachable from the root with cube `bridge` treated as
/// absent, minus one. Equals `len - 2` exactly when removing `bridge` strands
/// nothing, which is how the gather phase sizes candidate movers.
pub fn bridge_capacity(world: &World, bridge: usize) -> usize {
    let Some(root) = world.root() else {
        return 0;
    };
    if root == bridge {
        return 0;
    }
    reachable_from(world, root, Some(bridge)).saturating_sub(1)
}

/// Cap on how far a cube may travel while being gathered: twice the bounding
/// box perimeter half, `2 * (width + height)`.
pub fn bridge_limit(world: &World) -> i32 {
    match world.bounds() {
        Some(bounds) => 2 * (bounds.width() + bounds.height()),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::Color;

    fn world_of(cells: &[(i32, i32)]) -> World {
        let mut world = World::new();
        for &(x, y) in cells {
            world.add_unmarked(Cell::new(x, y), Color::DEFAULT).unwrap();
        }
        world
    }

    fn tag_at(world: &World, x: i32, y: i32) -> Classification {
        world.cube(world.at(Cell::new(x, y)).unwrap()).tag()
    }

    #[test]
    fn test_connectivity() {
        assert!(is_connected(&World::new()));
        assert!(is_connected(&world_of(&[(0, 0)])));
        assert!(is_connected(&world_of(&[(0, 0), (1, 0), (1, 1)])));
        // diagonal adjacency does not connect
        assert!(!is_connected(&world_of(&[(0, 0), (1, 1)])));
    }

    #[test]
    fn test_connectivity_with_skip() {
        let world = world_of(&[(0, 0), (1, 0), (2, 0)]);
        assert!(is_connected_without(&world, 0));
        assert!(!is_connected_without(&world, 1));
        assert!(is_connected_without(&world, 2));

        // skipping the only cube leaves a trivially connected set
        assert!(is_connected_without(&world_of(&[(0, 0)]), 0));
    }

    #[test]
    fn test_stable_cubes_on_a_line() {
        let world = world_of(&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);
        assert_eq!(stable_cubes(&world), [true, false, false, false, true]);
    }

    #[test]
    fn test_stable_cubes_on_a_block() {
        let world = world_of(&[(0, 0), (1, 0), (0, 1), (1, 1)]);
        assert_eq!(stable_cubes(&world), [true; 4]);
    }

    #[test]
    fn test_outside_walk_of_a_line_bounces_back() {
        let world = world_of(&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);
        let walk = outside_cubes(&world);

        assert_eq!(walk, [0, 1, 2, 3, 4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_outside_walk_is_a_cycle_without_repeated_edges() {
        let world = world_of(&[(0, 0), (1, 0), (2, 0), (0, 1), (2, 1)]);
        let walk = outside_cubes(&world);
        let root = world.root().unwrap();

        assert_eq!(*walk.first().unwrap(), root);
        assert_eq!(*walk.last().unwrap(), root);

        let mut edges = HashSet::new();
        for pair in walk.windows(2) {
            let from = world.cube(pair[0]).pos();
            let to = world.cube(pair[1]).pos();
            assert!(edges.insert((from, to)), "repeated edge {from} -> {to}");
        }
    }

    #[test]
    fn test_line_classifies_as_links() {
        let mut world = world_of(&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);
        mark_components(&mut world);

        assert_eq!(tag_at(&world, 0, 0), Classification::LinkStable);
        assert_eq!(tag_at(&world, 4, 0), Classification::LinkStable);
        for x in 1..4 {
            assert_eq!(tag_at(&world, x, 0), Classification::LinkCut);
        }
        assert!(world.cubes().iter().all(|c| c.on_boundary()));
    }

    #[test]
    fn test_block_classifies_as_one_chunk() {
        let mut world = world_of(&[(0, 0), (1, 0), (0, 1), (1, 1)]);
        mark_components(&mut world);

        for cube in world.cubes() {
            assert_eq!(cube.tag(), Classification::ChunkStable);
            assert_eq!(cube.chunk(), Some(0));
            assert!(cube.on_boundary());
        }
        assert!(is_single_chunk(&world));
    }

    #[test]
    fn test_staircase_tail_merges_into_the_chunk() {
        // a 2x2 block with one cube hanging east off the bottom row
        let mut world = world_of(&[(0, 0), (1, 0), (2, 0), (0, 1), (1, 1)]);
        mark_components(&mut world);

        for cube in world.cubes() {
            assert!(cube.tag().is_chunk(), "{} is {}", cube.pos(), cube.tag());
            assert_eq!(cube.chunk(), Some(0));
        }
        assert!(is_single_chunk(&world));
        assert_eq!(tag_at(&world, 1, 0), Classification::ChunkCut);
        assert_eq!(tag_at(&world, 2, 0), Classification::ChunkStable);
    }

    #[test]
    fn test_dumbbell_connectors_join_chunks_and_path() {
        // two 2x2 blocks joined by a two-cube path
        let mut world = world_of(&[
            (0, 0),
            (1, 0),
            (0, 1),
            (1, 1),
            (2, 0),
            (3, 0),
            (4, 0),
            (5, 0),
            (4, 1),
            (5, 1),
        ]);
        mark_components(&mut world);

        assert_eq!(tag_at(&world, 1, 0), Classification::Connector);
        assert_eq!(tag_at(&world, 4, 0), Classification::Connector);
        assert_eq!(tag_at(&world, 2, 0), Classification::LinkCut);
        assert_eq!(tag_at(&world, 3, 0), Classification::LinkCut);
        assert_eq!(tag_at(&world, 0, 0), Classification::ChunkStable);
        assert_eq!(tag_at(&world, 5, 1), Classification::ChunkStable);
        assert!(!is_single_chunk(&world));

        // the two blocks carry different chunk ids
        let west = world.cube(world.at(Cell::new(0, 0)).unwrap()).chunk();
        let east = world.cube(world.at(Cell::new(5, 0)).unwrap()).chunk();
        assert!(west.is_some() && east.is_some());
        assert_ne!(west, east);
    }

    #[test]
    fn test_interior_cube_inherits_the_surrounding_chunk() {
        let mut cells = Vec::new();
        for x in 0..3 {
            for y in 0..3 {
                cells.push((x, y));
            }
        }
        let mut world = world_of(&cells);
        mark_components(&mut world);

        let center = world.cube(world.at(Cell::new(1, 1)).unwrap());
        assert!(!center.on_boundary());
        assert_eq!(center.tag(), Classification::ChunkStable);
        assert_eq!(center.chunk(), Some(0));
        assert!(is_single_chunk(&world));
    }

    #[test]
    fn test_marking_is_idempotent() {
        let mut world = world_of(&[(0, 0), (1, 0), (2, 0), (0, 1), (2, 1)]);
        mark_components(&mut world);
        let first: Vec<_> = world
            .cubes()
            .iter()
            .map(|c| (c.tag(), c.chunk(), c.on_boundary()))
            .collect();

        mark_components(&mut world);
        let second: Vec<_> = world
            .cubes()
            .iter()
            .map(|c| (c.tag(), c.chunk(), c.on_boundary()))
            .collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_bridge_capacity() {
        let world = world_of(&[(0, 0), (1, 0), (2, 0), (3, 0)]);

        // removing an end cube strands nothing
        assert_eq!(bridge_capacity(&world, 3), world.len() - 2);
        // removing an interior cube strands everything east of it
        assert_eq!(bridge_capacity(&world, 1), 0);
        assert_eq!(bridge_capacity(&world, 0), 0);
    }

    #[test]
    fn test_bridge_limit_follows_the_bounding_box() {
        assert_eq!(bridge_limit(&World::new()), 0);
        let world = world_of(&[(0, 0), (1, 0), (2, 0), (0, 1)]);
        assert_eq!(bridge_limit(&world), 2 * (3 + 2));
    }
}
