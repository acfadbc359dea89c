//! Monte Carlo Tree Search over Xiangqi positions.
//!
//! The search repeats select → expand → simulate → backpropagate for a
//! fixed iteration budget and answers with the most-visited root move.
//! Selection uses UCT (`wins/visits + C * sqrt(ln(parent.visits)/visits)`,
//! unvisited children scoring infinity so each is tried once), optionally
//! perturbed by a heuristic bonus for checking, king-restricting, and
//! palace-contesting moves.
//!
//! The tree lives in an arena: a `Vec` of nodes addressed by index, with
//! the parent link stored as an index and children as owned indices. That
//! gives backpropagation its walk to the root without an ownership cycle,
//! and the whole tree drops with the engine after one search — no node
//! outlives the move it helped choose. Each node owns an independent
//! snapshot of board + side to move, so iterations never share mutable
//! state.

use crate::board::{Board, GameState, Move, Side};
use crate::constants::{BONUS_WEIGHT, N_SIMS, PRIOR_SCALE, ROLLOUT_MAX_PLIES, UCT_C};
use crate::heuristics::move_priority;
use crate::playout::{RolloutPolicy, simulate};
use crate::rules::legal_moves;

/// How the move heuristics feed the search.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum HeuristicMode {
    /// Ignore the heuristics entirely.
    Off,
    /// Expand the highest-priority untried move first.
    OrderMoves,
    /// Add a weighted priority bonus to the UCT score of visited children.
    #[default]
    SelectionBonus,
}

/// Tunables for one search. `Default` gives the standard engine setup;
/// `bonus_weight: 0.0` recovers pure UCT.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Number of select/expand/simulate/backpropagate iterations.
    pub iterations: usize,
    /// UCT exploration constant.
    pub exploration: f64,
    /// Rollout policy for the simulate step.
    pub rollout: RolloutPolicy,
    /// Ply cap per rollout.
    pub rollout_max_plies: usize,
    /// How heuristics bias the search.
    pub heuristic_mode: HeuristicMode,
    /// Scale of the selection-time heuristic bonus.
    pub bonus_weight: f64,
    /// Seed for the search RNG; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            iterations: N_SIMS,
            exploration: UCT_C,
            rollout: RolloutPolicy::default(),
            rollout_max_plies: ROLLOUT_MAX_PLIES,
            heuristic_mode: HeuristicMode::default(),
            bonus_weight: BONUS_WEIGHT,
            seed: None,
        }
    }
}

/// One node of the search tree.
struct Node {
    /// Independent snapshot of the position this node represents.
    state: GameState,
    /// Arena index of the parent; `None` only for the root.
    parent: Option<usize>,
    /// The move that produced this node; `None` only for the root.
    incoming: Option<Move>,
    /// Heuristic priority of `incoming`, computed once on the parent board.
    priority: u32,
    /// Arena indices of expanded children.
    children: Vec<usize>,
    /// Legal moves not yet expanded into children.
    untried: Vec<Move>,
    visits: u32,
    /// Accumulated rollout value, stored for the side to move here.
    score: f64,
}

impl Node {
    fn new(mut state: GameState, parent: Option<usize>, incoming: Option<Move>, priority: u32) -> Self {
        let untried = legal_moves(&state.board, state.to_move);
        state.over = untried.is_empty();
        Node {
            state,
            parent,
            incoming,
            priority,
            children: Vec::new(),
            untried,
            visits: 0,
            score: 0.0,
        }
    }
}

/// A single-search engine instance: the arena, the config, and the RNG.
pub struct SearchTree {
    nodes: Vec<Node>,
    config: SearchConfig,
    rng: fastrand::Rng,
}

impl SearchTree {
    /// Build a tree rooted at the given position.
    pub fn new(state: GameState, config: SearchConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let mut root = Node::new(state, None, None, 0);
        if config.heuristic_mode == HeuristicMode::OrderMoves {
            sort_by_priority(&root.state.board, &mut root.untried);
        }
        SearchTree {
            nodes: vec![root],
            config,
            rng,
        }
    }

    /// Run the configured iteration budget and return the most-visited
    /// root move, or `None` when the side to move has no legal move at
    /// all (mate or stalemate for the caller to report).
    pub fn run(&mut self) -> Option<Move> {
        for _ in 0..self.config.iterations {
            let mut id = self.select();
            // Interior nodes expand once they have been visited; the root
            // counts as visited from the start, so even a one-iteration
            // budget produces an answer.
            if !self.nodes[id].untried.is_empty() && (self.nodes[id].visits > 0 || id == 0) {
                id = self.expand(id);
            }
            let value = simulate(
                &self.nodes[id].state,
                self.config.rollout,
                self.config.rollout_max_plies,
                &mut self.rng,
            );
            self.backpropagate(id, value);
        }
        self.best_move()
    }

    /// The current best answer: most-visited root child. Usable even after
    /// a truncated search — whatever partial tree exists decides.
    pub fn best_move(&self) -> Option<Move> {
        self.nodes[0]
            .children
            .iter()
            .max_by_key(|&&child| self.nodes[child].visits)
            .and_then(|&child| self.nodes[child].incoming)
    }

    /// Visit counts per expanded root move, for diagnostics and tests.
    pub fn root_stats(&self) -> Vec<(Move, u32)> {
        self.nodes[0]
            .children
            .iter()
            .filter_map(|&child| {
                let node = &self.nodes[child];
                node.incoming.map(|mv| (mv, node.visits))
            })
            .collect()
    }

    /// Descend from the root while the node is fully expanded and has at
    /// least one child, picking the highest-scoring child each step.
    fn select(&self) -> usize {
        let mut id = 0;
        loop {
            let node = &self.nodes[id];
            if !node.untried.is_empty() || node.children.is_empty() {
                return id;
            }
            id = node
                .children
                .iter()
                .copied()
                .max_by(|&a, &b| {
                    self.selection_score(node, a)
                        .partial_cmp(&self.selection_score(node, b))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .unwrap_or(node.children[0]);
        }
    }

    /// UCT score of a child, plus the heuristic bonus when configured.
    /// Unvisited children score infinity so each gets tried once before
    /// the comparison means anything; the bonus only perturbs ranking
    /// among already-visited children.
    fn selection_score(&self, parent: &Node, child_id: usize) -> f64 {
        let child = &self.nodes[child_id];
        if child.visits == 0 {
            return f64::INFINITY;
        }
        let exploit = child.score / child.visits as f64;
        let explore = self.config.exploration
            * ((parent.visits as f64).ln() / child.visits as f64).sqrt();
        let mut score = exploit + explore;
        if self.config.heuristic_mode == HeuristicMode::SelectionBonus {
            score += self.config.bonus_weight * child.priority as f64 / PRIOR_SCALE;
        }
        score
    }

    /// Materialize one untried move of `id` as a new child node.
    fn expand(&mut self, id: usize) -> usize {
        let mv = {
            let len = self.nodes[id].untried.len();
            let pick = match self.config.heuristic_mode {
                // Untried moves are kept sorted ascending by priority, so
                // the best one sits at the end.
                HeuristicMode::OrderMoves => len - 1,
                _ => self.rng.usize(..len),
            };
            self.nodes[id].untried.swap_remove(pick)
        };

        let parent_board = &self.nodes[id].state.board;
        let priority = move_priority(parent_board, mv);
        let mut state = self.nodes[id].state.clone();
        state.apply(mv);

        let mut child = Node::new(state, Some(id), Some(mv), priority);
        if self.config.heuristic_mode == HeuristicMode::OrderMoves {
            sort_by_priority(&child.state.board, &mut child.untried);
        }
        let child_id = self.nodes.len();
        self.nodes.push(child);
        self.nodes[id].children.push(child_id);
        child_id
    }

    /// Walk the parent links back to the root, crediting the rollout
    /// value. The value is Black's; each node stores it flipped to its own
    /// side to move, so `score/visits` is always that side's win rate.
    fn backpropagate(&mut self, mut id: usize, value: f64) {
        loop {
            let node = &mut self.nodes[id];
            node.visits += 1;
            node.score += match node.state.to_move {
                Side::Black => value,
                Side::Red => 1.0 - value,
            };
            match node.parent {
                Some(parent) => id = parent,
                None => return,
            }
        }
    }

    /// Print the root children statistics to stderr.
    pub fn dump_root(&self) {
        for &child in &self.nodes[0].children {
            let node = &self.nodes[child];
            let winrate = if node.visits > 0 {
                node.score / node.visits as f64
            } else {
                0.0
            };
            eprintln!(
                "move {} v={} prior={} wr={:.3}",
                node.incoming.map(|m| m.to_string()).unwrap_or_default(),
                node.visits,
                node.priority,
                winrate
            );
        }
    }
}

/// Sort moves ascending by heuristic priority (so `pop` takes the best).
fn sort_by_priority(board: &Board, moves: &mut [Move]) {
    moves.sort_by_key(|&mv| move_priority(board, mv));
}

/// Pick a move for `to_move` on `board` with the default configuration
/// and the given iteration budget. `None` means no legal move exists.
pub fn choose_move(board: &Board, to_move: Side, iterations: usize) -> Option<Move> {
    choose_move_with(
        board,
        to_move,
        SearchConfig {
            iterations,
            ..SearchConfig::default()
        },
    )
}

/// Pick a move with full control over the search configuration.
pub fn choose_move_with(board: &Board, to_move: Side, config: SearchConfig) -> Option<Move> {
    let state = GameState::from_board(board.clone(), to_move);
    SearchTree::new(state, config).run()
}
