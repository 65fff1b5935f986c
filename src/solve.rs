use std::cmp::Reverse;
use std::collections::BinaryHeap;

use arrayvec::ArrayVec;

use crate::fingerprint::{Fingerprint, FingerprintKind};
use crate::{Goal, Move, Puzzle};

type IndexSet<K> = indexmap::IndexSet<K, fxhash::FxBuildHasher>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone)]
pub struct Node {
    pub puzzle: Puzzle,
    pub fingerprint: Fingerprint,
    pub g: u32,
    pub f: u32,
    pub action: Move,
    pub parent: Option<NodeId>,
}

impl Node {
    pub fn root(puzzle: Puzzle, goal: Goal, kind: FingerprintKind) -> Self {
        let f = puzzle.heuristic(goal);
        Self {
            fingerprint: kind.of(&puzzle),
            puzzle,
            g: 0,
            f,
            action: Move::Start,
            parent: None,
        }
    }

    /// Successors of the node stored at `id`.
    pub fn expand(&self, id: NodeId, goal: Goal, kind: FingerprintKind) -> ArrayVec<Node, 4> {
        let g = self.g + 1;
        self.puzzle
            .neighbors()
            .into_iter()
            .map(|(action, puzzle)| Node {
                f: g + puzzle.heuristic(goal),
                fingerprint: kind.of(&puzzle),
                puzzle,
                g,
                action,
                parent: Some(id),
            })
            .collect()
    }
}

/// Open list. Pops the smallest `f`; ties go to the deeper node, then to the
/// earlier one.
#[derive(Debug, Default)]
pub struct Frontier {
    heap: BinaryHeap<Reverse<(u32, Reverse<u32>, NodeId)>>,
}

impl Frontier {
    pub fn push(&mut self, id: NodeId, node: &Node) {
        self.heap.push(Reverse((node.f, Reverse(node.g), id)));
    }

    pub fn pop_min(&mut self) -> Option<NodeId> {
        self.heap.pop().map(|Reverse((_, _, id))| id)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Initialized,
    Running,
    Solved(NodeId),
    Exhausted,
}

impl Status {
    pub fn is_finished(self) -> bool {
        matches!(self, Status::Solved(_) | Status::Exhausted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub action: Move,
    pub puzzle: Puzzle,
    pub cost: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solution {
    /// Start to goal inclusive, empty if the search space was exhausted.
    pub path: Vec<Step>,
    pub nodes_expanded: usize,
}

impl Solution {
    pub fn is_solved(&self) -> bool {
        !self.path.is_empty()
    }

    /// Number of moves, `None` when no solution was found.
    pub fn steps(&self) -> Option<usize> {
        self.path.len().checked_sub(1)
    }

    pub fn moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.path.iter().map(|step| step.action)
    }
}

/// A single A* search over one start board.
#[derive(Debug)]
pub struct Search {
    goal: Goal,
    kind: FingerprintKind,
    goal_fingerprint: Fingerprint,
    nodes: Vec<Node>,
    frontier: Frontier,
    expanded: IndexSet<Fingerprint>,
    status: Status,
}

impl Search {
    pub fn new(initial: Puzzle, goal: Goal) -> Self {
        let kind = FingerprintKind::for_len(initial.len());
        let goal_fingerprint = kind.of(&goal.puzzle(initial.dim()));
        let root = Node::root(initial, goal, kind);
        let mut frontier = Frontier::default();
        frontier.push(NodeId(0), &root);
        Self {
            goal,
            kind,
            goal_fingerprint,
            nodes: vec![root],
            frontier,
            expanded: IndexSet::default(),
            status: Status::Initialized,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn nodes_expanded(&self) -> usize {
        self.expanded.len()
    }

    /// Fingerprints of every expanded board, in expansion order.
    pub fn expanded(&self) -> impl Iterator<Item = &Fingerprint> + '_ {
        self.expanded.iter()
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    /// Expands at most one node.
    pub fn step(&mut self) -> Status {
        if self.status.is_finished() {
            return self.status;
        }
        self.status = Status::Running;

        let id = loop {
            let Some(id) = self.frontier.pop_min() else {
                self.status = Status::Exhausted;
                return self.status;
            };
            // Stale duplicates of already expanded boards are dropped.
            let fingerprint = self[id].fingerprint.clone();
            let is_goal = fingerprint == self.goal_fingerprint;
            if self.expanded.insert(fingerprint) {
                if is_goal {
                    self.status = Status::Solved(id);
                    return self.status;
                }
                break id;
            }
        };

        let children = self[id].expand(id, self.goal, self.kind);
        for child in children {
            if self.expanded.contains(&child.fingerprint) {
                continue;
            }
            let child_id = NodeId(self.nodes.len() as u32);
            self.frontier.push(child_id, &child);
            self.nodes.push(child);
        }
        self.status
    }

    pub fn run(mut self, mut on_expand: impl FnMut()) -> Solution {
        loop {
            #[cfg(feature = "coz")]
            coz::progress!("Expand");

            match self.step() {
                Status::Initialized | Status::Running => on_expand(),
                Status::Solved(id) => {
                    on_expand();
                    return Solution {
                        path: self.reconstruct(id),
                        nodes_expanded: self.nodes_expanded(),
                    };
                }
                Status::Exhausted => {
                    return Solution {
                        path: Vec::new(),
                        nodes_expanded: self.nodes_expanded(),
                    };
                }
            }
        }
    }

    fn reconstruct(&self, leaf: NodeId) -> Vec<Step> {
        let mut path = std::iter::successors(Some(leaf), |&id| self[id].parent)
            .map(|id| {
                let node = &self[id];
                Step {
                    action: node.action,
                    puzzle: node.puzzle.clone(),
                    cost: node.g,
                }
            })
            .collect::<Vec<_>>();
        path.reverse();
        path
    }
}

impl std::ops::Index<NodeId> for Search {
    type Output = Node;
    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.0 as usize]
    }
}

/// Finds a shortest solution of `initial` with A* and the Manhattan heuristic.
pub fn astar(initial: Puzzle, goal: Goal, on_expand: impl FnMut()) -> Solution {
    Search::new(initial, goal).run(on_expand)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tile;

    fn puzzle(tiles: &[Tile]) -> Puzzle {
        Puzzle::new(tiles).unwrap()
    }

    fn replay(start: &Puzzle, solution: &Solution) -> Puzzle {
        solution
            .moves()
            .skip(1)
            .fold(start.clone(), |state, mv| state.slide(mv).unwrap())
    }

    #[test]
    fn goal_root_is_solved_immediately() {
        let goal = Goal::BlankFirst.puzzle(3);
        let solution = astar(goal.clone(), Goal::BlankFirst, || {});
        assert_eq!(solution.path.len(), 1);
        assert_eq!(solution.path[0].action, Move::Start);
        assert_eq!(solution.path[0].puzzle, goal);
        assert_eq!(solution.nodes_expanded, 1);
        assert_eq!(solution.steps(), Some(0));
    }

    #[test]
    fn two_move_instances() {
        let start = puzzle(&[1, 4, 2, 3, 0, 5, 6, 7, 8]);
        let solution = astar(start.clone(), Goal::BlankFirst, || {});
        assert_eq!(solution.steps(), Some(2));
        assert_eq!(
            solution.moves().collect::<Vec<_>>(),
            [Move::Start, Move::Up, Move::Left]
        );
        assert!(replay(&start, &solution).is_goal(Goal::BlankFirst));

        let start = puzzle(&[1, 2, 3, 4, 0, 6, 7, 5, 8]);
        let solution = astar(start.clone(), Goal::BlankLast, || {});
        assert_eq!(solution.steps(), Some(2));
        assert_eq!(
            solution.moves().collect::<Vec<_>>(),
            [Move::Start, Move::Down, Move::Right]
        );
        assert!(replay(&start, &solution).is_goal(Goal::BlankLast));
    }

    #[test]
    fn path_costs_increase_by_one() {
        let start = puzzle(&[8, 7, 6, 5, 4, 3, 2, 1, 0]);
        let solution = astar(start, Goal::BlankFirst, || {});
        assert_eq!(solution.steps(), Some(28));
        for (step, cost) in solution.path.iter().zip(0..) {
            assert_eq!(step.cost, cost);
        }
    }

    #[test]
    fn unsolvable_exhausts_reachable_half() {
        // A 2x2 board has 4!/2 reachable arrangements.
        let start = puzzle(&[0, 2, 1, 3]);
        let mut search = Search::new(start, Goal::BlankFirst);
        assert_eq!(search.status(), Status::Initialized);
        assert_eq!(search.frontier_len(), 1);
        while !search.step().is_finished() {}
        assert_eq!(search.status(), Status::Exhausted);
        assert_eq!(search.nodes_expanded(), 12);

        let solution = astar(puzzle(&[0, 2, 1, 3]), Goal::BlankFirst, || {});
        assert!(!solution.is_solved());
        assert_eq!(solution.steps(), None);
        assert_eq!(solution.nodes_expanded, 12);
    }

    #[test]
    fn expands_each_board_once() {
        let start = puzzle(&[7, 2, 4, 5, 0, 6, 8, 3, 1]);
        let mut search = Search::new(start, Goal::BlankFirst);
        let mut pops = 0;
        while !search.step().is_finished() {
            pops += 1;
        }
        let Status::Solved(leaf) = search.status() else {
            panic!("Expected a solution, got {:?}", search.status());
        };
        assert_eq!(search[leaf].g, 26);
        assert_eq!(search.nodes_expanded(), 1482);
        let expanded = search.expanded().collect::<Vec<_>>();
        let unique = expanded.iter().collect::<std::collections::HashSet<_>>();
        assert_eq!(unique.len(), expanded.len());
        // The final step pops the goal.
        assert_eq!(expanded.len(), pops + 1);
    }

    #[test]
    fn on_expand_counts_nodes() {
        let start = puzzle(&[3, 1, 2, 4, 0, 5, 6, 7, 8]);
        let mut calls = 0;
        let solution = astar(start, Goal::BlankFirst, || calls += 1);
        assert_eq!(calls, solution.nodes_expanded);
    }

    #[test]
    fn children_carry_their_fingerprint() {
        for dim in [3, 5] {
            let kind = FingerprintKind::for_len(dim * dim);
            let root = Node::root(Goal::BlankFirst.puzzle(dim), Goal::BlankFirst, kind);
            assert_eq!(root.fingerprint, kind.of(&root.puzzle));
            let children = root.expand(NodeId(0), Goal::BlankFirst, kind);
            assert_eq!(children.len(), 2);
            for child in &children {
                assert_eq!(child.fingerprint, kind.of(&child.puzzle));
                assert_ne!(child.fingerprint, root.fingerprint);
                assert_eq!(child.parent, Some(NodeId(0)));
                assert_eq!((child.g, child.f), (1, 2));
            }
        }
    }

    #[test]
    fn frontier_ordering() {
        let p = Goal::BlankFirst.puzzle(2);
        let node = |g, f| Node {
            fingerprint: FingerprintKind::Packed.of(&p),
            puzzle: p.clone(),
            g,
            f,
            action: Move::Start,
            parent: None,
        };
        let mut frontier = Frontier::default();
        frontier.push(NodeId(0), &node(1, 5));
        frontier.push(NodeId(1), &node(2, 4));
        frontier.push(NodeId(2), &node(3, 4));
        frontier.push(NodeId(3), &node(3, 4));
        frontier.push(NodeId(4), &node(0, 6));
        assert_eq!(frontier.len(), 5);
        let order = std::iter::from_fn(|| frontier.pop_min()).collect::<Vec<_>>();
        assert_eq!(
            order,
            [NodeId(2), NodeId(3), NodeId(1), NodeId(0), NodeId(4)]
        );
        assert!(frontier.is_empty());
    }

    #[test]
    fn larger_boards_use_byte_keys() {
        let start = Goal::BlankFirst
            .puzzle(5)
            .slide(Move::Right)
            .and_then(|p| p.slide(Move::Down))
            .and_then(|p| p.slide(Move::Right))
            .unwrap();
        let solution = astar(start.clone(), Goal::BlankFirst, || {});
        assert_eq!(solution.steps(), Some(3));
        assert!(replay(&start, &solution).is_goal(Goal::BlankFirst));
    }
}
