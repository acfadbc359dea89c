//! Interactive play session.
//!
//! A line-oriented command interface for playing against the engine, in
//! the spirit of a text game protocol: one command per line, one response
//! per command. The human usually plays Red (`play`), the engine answers
//! with `genmove`.
//!
//! ## Supported Commands
//!
//! - `new` - Reset to the opening position
//! - `board` - Print the board and whose turn it is
//! - `play <move>` - Play a move for the side to move (e.g. `play b7e7`)
//! - `genmove` - Let the engine pick and play a move for the side to move
//! - `legal <square>` - List legal destinations for the piece on a square
//! - `help` - List all supported commands
//! - `quit` - End the session
//!
//! Moves are validated through the rule engine: illegal geometry is
//! rejected, and a move that would leave the mover's own general in check
//! is refused with an explicit warning. After every applied move the
//! session reports check or checkmate for the side now to move.

use std::io::{self, BufRead, Write};

use anyhow::Result;

use crate::board::{GameState, parse_move, parse_square, str_square};
use crate::mcts::{SearchConfig, choose_move_with};
use crate::rules::{is_checkmate, is_in_check, leaves_self_in_check, legal_moves, pseudo_legal};

/// The list of known session commands.
const KNOWN_COMMANDS: &[&str] = &["board", "genmove", "help", "legal", "new", "play", "quit"];

/// Session state: the authoritative game plus the engine configuration.
pub struct Session {
    state: GameState,
    config: SearchConfig,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl Session {
    /// Start a fresh game with the given engine configuration.
    pub fn new(config: SearchConfig) -> Self {
        Session {
            state: GameState::new(),
            config,
        }
    }

    /// Run the command loop, reading from stdin and writing to stdout.
    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        writeln!(stdout, "{}", self.state.board)?;
        for line in stdin.lock().lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            let command = parts[0].to_lowercase();
            let args = &parts[1..];

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            writeln!(stdout, "{prefix} {message}")?;

            // Show the position after anything that changed it.
            if success && matches!(command.as_str(), "play" | "genmove" | "new") {
                writeln!(stdout, "{}", self.state.board)?;
            }
            stdout.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Execute a session command and return (success, response).
    pub fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "help" => (true, KNOWN_COMMANDS.join(" ")),

            "new" => {
                self.state = GameState::new();
                (true, String::new())
            }

            "board" => (
                true,
                format!("{}\n{} to move", self.state.board, self.state.to_move.name()),
            ),

            "legal" => {
                let Some(&arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let Some(from) = parse_square(arg) else {
                    return (false, format!("bad square: {arg}"));
                };
                match self.state.board.get(from) {
                    Some(piece) if piece.side == self.state.to_move => {
                        let dests: Vec<String> = legal_moves(&self.state.board, self.state.to_move)
                            .into_iter()
                            .filter(|mv| mv.from == from)
                            .map(|mv| str_square(mv.to))
                            .collect();
                        (true, dests.join(" "))
                    }
                    Some(_) => (false, format!("{arg} is not yours to move")),
                    None => (false, format!("no piece on {arg}")),
                }
            }

            "play" => {
                if self.state.over {
                    return (false, "the game is over".to_string());
                }
                let Some(&arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let Some(mv) = parse_move(arg) else {
                    return (false, format!("bad move: {arg}"));
                };
                match self.state.board.get(mv.from) {
                    Some(piece) if piece.side == self.state.to_move => {}
                    Some(_) => return (false, "that piece is not yours".to_string()),
                    None => return (false, format!("no piece on {}", str_square(mv.from))),
                }
                if !pseudo_legal(&self.state.board, mv.from, mv.to) {
                    return (false, format!("illegal move: {mv}"));
                }
                if leaves_self_in_check(&self.state.board, mv) {
                    return (false, "illegal move: your general would be in check".to_string());
                }
                self.state.apply(mv);
                (true, self.report_position())
            }

            "genmove" => {
                if self.state.over {
                    return (false, "the game is over".to_string());
                }
                let side = self.state.to_move;
                match choose_move_with(&self.state.board, side, self.config.clone()) {
                    Some(mv) => {
                        self.state.apply(mv);
                        (true, format!("{mv} {}", self.report_position()).trim_end().to_string())
                    }
                    None => {
                        // No legal move at all: mate or stalemate against us.
                        self.state.over = true;
                        (true, format!("no move: {} loses", side.name()))
                    }
                }
            }

            "quit" => (true, String::new()),

            _ => (false, format!("unknown command: {command}")),
        }
    }

    /// Check/checkmate report for the side now to move; marks the game
    /// over on mate.
    fn report_position(&mut self) -> String {
        let side = self.state.to_move;
        if is_checkmate(&self.state.board, side) {
            self.state.over = true;
            format!("checkmate, {} wins", side.flip().name())
        } else if is_in_check(&self.state.board, side) {
            format!("{} is in check", side.name())
        } else {
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Piece, PieceKind, Side};

    fn quick_session() -> Session {
        Session::new(SearchConfig {
            iterations: 30,
            rollout_max_plies: 20,
            seed: Some(3),
            ..SearchConfig::default()
        })
    }

    #[test]
    fn test_help_lists_commands() {
        let mut session = quick_session();
        let (success, message) = session.execute("help", &[]);
        assert!(success);
        assert!(message.contains("genmove"));
        assert!(message.contains("play"));
    }

    #[test]
    fn test_play_and_new() {
        let mut session = quick_session();
        // Red cannon b7 to the central file.
        let (success, message) = session.execute("play", &["b7e7"]);
        assert!(success, "{message}");
        assert_eq!(session.state.to_move, Side::Black);

        let (success, _) = session.execute("new", &[]);
        assert!(success);
        assert_eq!(session.state.to_move, Side::Red);
    }

    #[test]
    fn test_play_rejects_wrong_side_and_garbage() {
        let mut session = quick_session();
        // Black piece while Red is to move.
        let (success, _) = session.execute("play", &["b2e2"]);
        assert!(!success);

        let (success, _) = session.execute("play", &["zz99"]);
        assert!(!success);

        let (success, _) = session.execute("play", &["e5e6"]);
        assert!(!success, "empty origin square must be refused");
    }

    #[test]
    fn test_play_rejects_illegal_geometry() {
        let mut session = quick_session();
        // A chariot does not move diagonally.
        let (success, message) = session.execute("play", &["a9b8"]);
        assert!(!success);
        assert!(message.contains("illegal"));
    }

    #[test]
    fn test_play_rejects_self_check() {
        let mut session = quick_session();
        let mut board = Board::empty();
        board.set((9, 4), Some(Piece::new(Side::Red, PieceKind::General)));
        board.set((0, 3), Some(Piece::new(Side::Black, PieceKind::General)));
        // Red soldier shields the general from the chariot behind it.
        board.set((4, 4), Some(Piece::new(Side::Red, PieceKind::Soldier)));
        board.set((2, 4), Some(Piece::new(Side::Black, PieceKind::Chariot)));
        session.state = GameState::from_board(board, Side::Red);

        let (success, message) = session.execute("play", &["e4d4"]);
        assert!(!success);
        assert!(message.contains("check"));
    }

    #[test]
    fn test_legal_lists_destinations() {
        let mut session = quick_session();
        // The b9 horse has exactly two opening moves, a7 and c7.
        let (success, message) = session.execute("legal", &["b9"]);
        assert!(success);
        let mut dests: Vec<&str> = message.split_whitespace().collect();
        dests.sort();
        assert_eq!(dests, ["a7", "c7"]);
    }

    #[test]
    fn test_genmove_plays_a_legal_move() {
        let mut session = quick_session();
        let before = legal_moves(&session.state.board, Side::Red);

        let (success, message) = session.execute("genmove", &[]);
        assert!(success, "{message}");
        assert_eq!(session.state.to_move, Side::Black);

        let played = parse_move(&message[..4]).expect("response starts with the move");
        assert!(before.contains(&played), "engine move must be legal");
    }

    #[test]
    fn test_genmove_with_no_moves_reports_loss() {
        let mut session = quick_session();
        let mut board = Board::empty();
        board.set((9, 4), Some(Piece::new(Side::Red, PieceKind::General)));
        board.set((0, 4), Some(Piece::new(Side::Black, PieceKind::General)));
        board.set((0, 3), Some(Piece::new(Side::Black, PieceKind::Chariot)));
        board.set((0, 5), Some(Piece::new(Side::Black, PieceKind::Chariot)));
        session.state = GameState::from_board(board, Side::Red);

        let (success, message) = session.execute("genmove", &[]);
        assert!(success);
        assert!(message.contains("no move"));
        assert!(session.state.over);

        let (success, _) = session.execute("play", &["e9e8"]);
        assert!(!success, "game over locks the board");
    }

    #[test]
    fn test_unknown_command() {
        let mut session = quick_session();
        let (success, message) = session.execute("resign", &[]);
        assert!(!success);
        assert!(message.contains("unknown"));
    }
}
