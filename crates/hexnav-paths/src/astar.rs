use hexnav_core::{HexCoord, Hexside};

use crate::PathFinder;
use crate::path::{DirectedPath, PathArena};
use crate::pathfinder::{Algorithm, SearchStats, add_cost};
use crate::traits::{Direction, Heuristic, StepGraph};

impl PathFinder {
    /// Cheapest path from `source` to `target` by unidirectional A*.
    ///
    /// `heuristic` must be admissible and consistent. Returns `None` if no
    /// path exists, either endpoint is off the board, or the expansion cap
    /// is hit.
    pub fn astar_path<G: StepGraph, H: Heuristic>(
        &mut self,
        graph: &G,
        heuristic: &H,
        source: HexCoord,
        target: HexCoord,
    ) -> Option<DirectedPath> {
        self.stats = SearchStats {
            algorithm: Algorithm::Direct,
            ..SearchStats::default()
        };
        let size = graph.size();
        if size != self.size {
            self.resize(size);
        }
        let start_idx = size.index(source)?;
        let goal_idx = size.index(target)?;

        self.forward.reset(size.len());
        let mut open = std::mem::take(&mut self.open_fwd);
        open.clear();

        self.forward.label(start_idx, 0, None);
        let h = heuristic.estimate(source, target);
        let e = self.entry(start_idx, 0, h);
        open.push(e);

        let found = 'search: loop {
            let Some(current) = open.pop() else {
                break 'search false;
            };
            let ci = current.idx;
            if !self.forward.close(ci) {
                continue;
            }
            if ci == goal_idx {
                break 'search true;
            }
            if self.exhausted() {
                break 'search false;
            }
            self.stats.expanded += 1;

            let here = size.coord(ci);
            let g = self.forward.g(ci);
            for side in Hexside::ALL {
                let Some((next, cost)) = graph.edge(here, side, Direction::Forward) else {
                    continue;
                };
                let Some(ni) = size.index(next) else {
                    continue;
                };
                let ng = add_cost(g, cost);
                if self.forward.label(ni, ng, Some(side.opposite())) {
                    let h = heuristic.estimate(next, target);
                    let e = self.entry(ni, ng, h);
                    open.push(e);
                }
            }
        };

        self.open_fwd = open;
        if !found {
            return None;
        }
        let mut arena = PathArena::new();
        let root = arena.root(target);
        let head = self.prepend_forward(&mut arena, root, goal_idx);
        Some(arena.into_path(head))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathfinder::SearchConfig;
    use crate::traits::RangeHeuristic;
    use hexnav_core::{Board, BoardSize, Hex};

    fn c(col: i32, row: i32) -> HexCoord {
        HexCoord::from_offset(col, row)
    }

    #[test]
    fn uniform_board_costs_equal_range() {
        let board = Board::uniform(BoardSize::new(8, 6), 1).unwrap();
        let mut pf = PathFinder::new(board.size());
        for target in board.size().iter() {
            let p = pf
                .astar_path(&board, &RangeHeuristic, c(3, 2), target)
                .unwrap();
            assert_eq!(p.total_cost(), c(3, 2).range(target));
            assert_eq!(p.total_steps() as i32, c(3, 2).range(target));
            assert_eq!(p.start(), c(3, 2));
            assert_eq!(p.end(), target);
        }
    }

    #[test]
    fn path_steps_are_adjacent_and_priced() {
        let board = Board::new(BoardSize::new(6, 6), |c| {
            Hex::uniform(c, 1 + (c.col() + c.row()) % 3)
        })
        .unwrap();
        let mut pf = PathFinder::new(board.size());
        let p = pf
            .astar_path(&board, &RangeHeuristic, c(0, 0), c(5, 5))
            .unwrap();
        let mut prev = p.start();
        let mut total = 0;
        for step in p.steps() {
            assert_eq!(prev.neighbor(step.direction()), step.hex);
            assert_eq!(board.step_cost(prev, step.direction()), Some(step.cost));
            total += step.cost;
            prev = step.hex;
        }
        assert_eq!(prev, c(5, 5));
        assert_eq!(total, p.total_cost());
    }

    #[test]
    fn walls_force_a_detour() {
        // Column 2 is a wall except at the bottom row.
        let board = Board::new(BoardSize::new(5, 5), |c| {
            if c.col() == 2 && c.row() < 4 {
                Hex::impassable(c)
            } else {
                Hex::uniform(c, 1)
            }
        })
        .unwrap();
        let mut pf = PathFinder::new(board.size());
        let p = pf
            .astar_path(&board, &RangeHeuristic, c(0, 0), c(4, 0))
            .unwrap();
        assert!(p.hexes().all(|h| h.col() != 2 || h.row() == 4));
        assert!(p.total_cost() > c(0, 0).range(c(4, 0)));
    }

    #[test]
    fn unreachable_and_wall_targets() {
        let board = Board::new(BoardSize::new(5, 5), |c| {
            if c.col() == 2 { Hex::impassable(c) } else { Hex::uniform(c, 1) }
        })
        .unwrap();
        let mut pf = PathFinder::new(board.size());
        assert!(pf.astar_path(&board, &RangeHeuristic, c(0, 0), c(4, 4)).is_none());
        assert!(pf.astar_path(&board, &RangeHeuristic, c(0, 0), c(2, 2)).is_none());
        // A later query on the same finder is unaffected.
        assert_eq!(
            pf.astar_path(&board, &RangeHeuristic, c(0, 0), c(1, 4))
                .unwrap()
                .total_cost(),
            c(0, 0).range(c(1, 4))
        );
    }

    #[test]
    fn one_way_exit_costs() {
        // Leaving (1,1) southwards is expensive, entering it from the south is not.
        let board = Board::new(BoardSize::new(3, 3), |c| {
            let hex = Hex::uniform(c, 1);
            if c == HexCoord::from_offset(1, 1) {
                hex.with_exit_cost(Hexside::S, Some(10))
            } else {
                hex
            }
        })
        .unwrap();
        let mut pf = PathFinder::new(board.size());
        let down = pf
            .astar_path(&board, &RangeHeuristic, c(1, 0), c(1, 2))
            .unwrap();
        let up = pf
            .astar_path(&board, &RangeHeuristic, c(1, 2), c(1, 0))
            .unwrap();
        assert_eq!(up.total_cost(), 2);
        assert_eq!(down.total_cost(), 3);
        assert!(down.steps().all(|s| s.cost == 1));
    }

    #[test]
    fn equal_cost_ties_break_by_hexside_order() {
        let board = Board::uniform(BoardSize::new(4, 4), 1).unwrap();
        let mut pf = PathFinder::new(board.size());
        let a = pf
            .astar_path(&board, &RangeHeuristic, c(0, 0), c(3, 3))
            .unwrap();
        let b = pf
            .astar_path(&board, &RangeHeuristic, c(0, 0), c(3, 3))
            .unwrap();
        assert_eq!(a.hexes().collect::<Vec<_>>(), b.hexes().collect::<Vec<_>>());
    }

    #[test]
    fn counters_cover_one_query_only() {
        let board = Board::uniform(BoardSize::new(20, 20), 1).unwrap();
        let mut pf = PathFinder::with_config(
            board.size(),
            SearchConfig {
                max_expansions: Some(50),
                ..SearchConfig::default()
            },
        );
        let mut counts = Vec::new();
        for _ in 0..5 {
            assert!(pf.astar_path(&board, &RangeHeuristic, c(0, 0), c(5, 0)).is_some());
            assert_eq!(pf.stats().algorithm, Algorithm::Direct);
            counts.push(pf.stats());
        }
        assert!(counts[0].expanded > 0);
        assert!(counts.iter().all(|s| *s == counts[0]));
    }

    #[test]
    fn large_costs_stay_below_unreachable() {
        let board = Board::uniform(BoardSize::new(4, 1), 700_000_000).unwrap();
        let mut pf = PathFinder::new(board.size());
        let p = pf
            .astar_path(&board, &RangeHeuristic, c(0, 0), c(3, 0))
            .unwrap();
        assert_eq!(p.total_steps(), 3);
        assert_eq!(p.total_cost(), 2_100_000_000);
    }

    #[test]
    #[should_panic(expected = "does not fit below the unreachable marker")]
    fn cost_overflow_fails_fast() {
        let board = Board::uniform(BoardSize::new(4, 1), 1_000_000_000).unwrap();
        let mut pf = PathFinder::new(board.size());
        pf.astar_path(&board, &RangeHeuristic, c(0, 0), c(3, 0));
    }
}
