//! Xiangqi-Rust: a Chinese Chess rule engine with an MCTS move chooser.
//!
//! The crate has two halves. The rule core answers legality, check, and
//! checkmate questions about a 10x9 Xiangqi board. The search core builds
//! a Monte Carlo tree over that rule core and picks the engine's move.
//! Everything else — rendering, input, history — is a consumer of these
//! two and lives outside this crate.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry and engine parameters
//! - [`board`] - Pieces, moves, the grid, and the minimal game state
//! - [`rules`] - Movement legality, check, and checkmate detection
//! - [`heuristics`] - Static move-bias signals for the search
//! - [`playout`] - Random game simulation for position evaluation
//! - [`mcts`] - Monte Carlo Tree Search over an index arena
//! - [`cli`] - Line-oriented play session
//!
//! ## Example
//!
//! ```
//! use xiangqi_rust::board::{Board, Side};
//! use xiangqi_rust::mcts::choose_move;
//! use xiangqi_rust::rules::{is_in_check, legal_moves};
//!
//! let mut board = Board::opening();
//!
//! // Let the engine open for Red.
//! let mv = choose_move(&board, Side::Red, 20).expect("the opening has moves");
//! assert!(legal_moves(&board, Side::Red).contains(&mv));
//!
//! board.apply(mv);
//! assert!(!is_in_check(&board, Side::Black));
//! ```

pub mod board;
pub mod cli;
pub mod constants;
pub mod heuristics;
pub mod mcts;
pub mod playout;
pub mod rules;
