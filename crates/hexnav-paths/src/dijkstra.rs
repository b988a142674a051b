use std::collections::BinaryHeap;

use hexnav_core::{Cost, HexCoord, Hexside};

use crate::pathfinder::{NodeRef, NodeTable, UNREACHABLE, add_cost};
use crate::traits::{Direction, StepGraph};

/// Compute a multi-source Dijkstra distance map over the whole board.
///
/// Forward, entry `i` is the cheapest cost from any source to the hex with
/// dense index `i`; backward, the cheapest cost from that hex to any source.
/// Every source starts at cost 0, off-board sources are ignored, and
/// expansion stops at `max_cost`. Entries not reached hold [`UNREACHABLE`].
pub fn dijkstra_map<G: StepGraph>(
    graph: &G,
    sources: &[HexCoord],
    direction: Direction,
    max_cost: Cost,
) -> Box<[Cost]> {
    let size = graph.size();
    let mut nodes = NodeTable::new(size.len());
    nodes.reset(size.len());
    let mut dist = vec![UNREACHABLE; size.len()].into_boxed_slice();
    let mut open: BinaryHeap<NodeRef> = BinaryHeap::new();
    let mut seq = 0;

    for &src in sources {
        if let Some(si) = size.index(src) {
            if nodes.label(si, 0, None) {
                seq += 1;
                open.push(NodeRef {
                    idx: si,
                    f: 0,
                    h: 0,
                    seq,
                });
            }
        }
    }

    while let Some(current) = open.pop() {
        let ci = current.idx;
        if !nodes.close(ci) {
            continue;
        }
        let g = nodes.g(ci);
        dist[ci] = g;

        let here = size.coord(ci);
        for side in Hexside::ALL {
            let Some((next, cost)) = graph.edge(here, side, direction) else {
                continue;
            };
            let Some(ni) = size.index(next) else {
                continue;
            };
            let tentative = add_cost(g, cost);
            if tentative > max_cost {
                continue;
            }
            if nodes.label(ni, tentative, Some(side.opposite())) {
                seq += 1;
                open.push(NodeRef {
                    idx: ni,
                    f: tentative,
                    h: 0,
                    seq,
                });
            }
        }
    }
    dist
}
