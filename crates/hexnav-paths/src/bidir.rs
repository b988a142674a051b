use hexnav_core::{HexCoord, Hexside};

use crate::PathFinder;
use crate::landmark::LandmarkSet;
use crate::path::{DirectedPath, PathArena};
use crate::pathfinder::{Algorithm, SearchStats, UNREACHABLE, add_cost, skip_stale};
use crate::traits::{Direction, Heuristic, StepGraph};

impl PathFinder {
    /// Cheapest path from `source` to `target` by bidirectional A* with
    /// landmark bounds.
    ///
    /// The forward search grows from `source` along exit costs, estimating
    /// the remaining cost to `target`; the backward search grows from
    /// `target` over reversed edges, estimating the cost from `source`.
    /// Whenever a hex carries a label from both sides the combined cost is a
    /// candidate. The search stops once neither open set can beat the best
    /// candidate or either runs dry, and always expands the side with the
    /// smaller open set.
    pub fn bidirectional_path<G: StepGraph>(
        &mut self,
        graph: &G,
        landmarks: &LandmarkSet,
        source: HexCoord,
        target: HexCoord,
    ) -> Option<DirectedPath> {
        self.stats = SearchStats {
            algorithm: Algorithm::Bidirectional,
            ..SearchStats::default()
        };
        let size = graph.size();
        if size != self.size {
            self.resize(size);
        }
        let start_idx = size.index(source)?;
        let goal_idx = size.index(target)?;
        if start_idx == goal_idx {
            return Some(DirectedPath::empty(source));
        }

        self.forward.reset(size.len());
        self.backward.reset(size.len());
        let mut open_fwd = std::mem::take(&mut self.open_fwd);
        let mut open_bwd = std::mem::take(&mut self.open_bwd);
        open_fwd.clear();
        open_bwd.clear();

        let h = landmarks.estimate(source, target);
        self.forward.label(start_idx, 0, None);
        let e = self.entry(start_idx, 0, h);
        open_fwd.push(e);
        self.backward.label(goal_idx, 0, None);
        let e = self.entry(goal_idx, 0, h);
        open_bwd.push(e);

        let mut best = UNREACHABLE;
        let mut meet = None;

        loop {
            skip_stale(&mut open_fwd, &self.forward);
            skip_stale(&mut open_bwd, &self.backward);
            let (Some(top_f), Some(top_b)) = (open_fwd.peek(), open_bwd.peek()) else {
                break;
            };
            if top_f.f.min(top_b.f) >= best {
                break;
            }
            if self.exhausted() {
                meet = None;
                break;
            }

            let direction = if open_fwd.len() <= open_bwd.len() {
                Direction::Forward
            } else {
                Direction::Backward
            };
            let (open, nodes, other) = match direction {
                Direction::Forward => (&mut open_fwd, &mut self.forward, &self.backward),
                Direction::Backward => (&mut open_bwd, &mut self.backward, &self.forward),
            };
            let Some(current) = open.pop() else { break };
            nodes.close(current.idx);
            self.stats.expanded += 1;

            let here = size.coord(current.idx);
            let g = nodes.g(current.idx);
            let mut queued = Vec::with_capacity(Hexside::ALL.len());
            for side in Hexside::ALL {
                let Some((next, cost)) = graph.edge(here, side, direction) else {
                    continue;
                };
                let Some(ni) = size.index(next) else {
                    continue;
                };
                let ng = add_cost(g, cost);
                if !nodes.label(ni, ng, Some(side.opposite())) {
                    continue;
                }
                let through = other.g(ni);
                if through != UNREACHABLE {
                    let total = add_cost(ng, through);
                    if total < best {
                        best = total;
                        meet = Some(ni);
                    }
                }
                let h = match direction {
                    Direction::Forward => landmarks.estimate(next, target),
                    Direction::Backward => landmarks.estimate(source, next),
                };
                queued.push((ni, ng, h));
            }
            for (ni, ng, h) in queued {
                let e = self.entry(ni, ng, h);
                match direction {
                    Direction::Forward => open_fwd.push(e),
                    Direction::Backward => open_bwd.push(e),
                }
            }
        }

        self.open_fwd = open_fwd;
        self.open_bwd = open_bwd;
        let meet = meet?;
        log::trace!(
            "bidirectional {source} -> {target} met at {} with cost {best}",
            size.coord(meet)
        );

        let mut arena = PathArena::new();
        let mut chain = vec![meet];
        let mut cur = meet;
        while let Some(via) = self.backward.via(cur) {
            let Some(next) = size.index(size.coord(cur).neighbor(via)) else {
                break;
            };
            chain.push(next);
            cur = next;
        }
        let mut head = arena.root(target);
        for pair in chain.windows(2).rev() {
            let (a, b) = (pair[0], pair[1]);
            let from = size.coord(a);
            let exit = self.backward.via(a)?;
            let cost = self.backward.g(a) - self.backward.g(b);
            head = arena.prepend(head, from, exit, cost);
        }
        let head = self.prepend_forward(&mut arena, head, meet);
        Some(arena.into_path(head))
    }
}
