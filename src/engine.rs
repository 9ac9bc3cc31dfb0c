//! Engine façade: the single entry point a hosting application uses (spec
//! §6).
//!
//! Spec §9 flags the source's global mutable tables (attack tables,
//! Zobrist, transposition table, opening book) as a redesign target. Attack
//! and Zobrist tables stay process-wide, immutable-after-one-shot-init
//! statics (see `attack_tables`, `zobrist`, `book` — read-only from every
//! caller once built, spec §5), since they have no per-game state. The
//! transposition table and move-ordering heuristics, which *do* accumulate
//! per-game state, become an explicit owned resource of this `Engine`
//! handle instead of a hidden process singleton: callers construct one
//! handle per logical game/session and every search call goes through it,
//! which makes multi-instance embedding (e.g. two simultaneous games)
//! trivial instead of requiring external synchronization around a global.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::fen;
use crate::make_move;
use crate::movegen;
use crate::moves::{Move, MoveList};
use crate::notation;
use crate::ordering::OrderingState;
use crate::position::Position;
use crate::search::{self, SearchLimits, SearchResult};
use crate::tt::TranspositionTable;
use crate::types::Side;

/// Owns the per-game search state: the transposition table and the killer/
/// history move-ordering tables. Attack tables, Zobrist keys, and the
/// opening book are process-wide immutable statics shared by every
/// `Engine` (spec §5).
pub struct Engine {
    tt: TranspositionTable,
    ordering: OrderingState,
    stop: AtomicBool,
}

impl Engine {
    /// Constructs a fresh engine handle with an empty transposition table
    /// (spec §6 `init()`). Also forces the one-shot initialization of the
    /// process-wide attack/Zobrist tables so the first search doesn't pay
    /// for it.
    #[must_use]
    pub fn new() -> Self {
        let _ = crate::zobrist::ZOBRIST.side_to_move_key();
        let _ = crate::attack_tables::knight_attacks(crate::types::Square::new(0));
        Engine {
            tt: TranspositionTable::new(),
            ordering: OrderingState::new(),
            stop: AtomicBool::new(false),
        }
    }

    /// Clears the transposition table and move-ordering heuristics (spec §6
    /// `reset_transposition_table()`). Safe between unrelated games; must
    /// not be called while a search on this handle is in progress (spec
    /// §5).
    pub fn reset_transposition_table(&mut self) {
        self.tt.clear();
        self.ordering.clear();
    }

    /// Sets the cooperative stop flag, causing any in-flight search on this
    /// handle to unwind at its next 1024-node time check (spec §5).
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Runs iterative-deepening search from `pos` under `limits` (spec §6
    /// `search_best_move`), reusing this handle's transposition table and
    /// move-ordering heuristics across calls: positions visited in
    /// different searches often share sub-trees, so reuse is beneficial
    /// (spec §5).
    pub fn search_best_move(&mut self, pos: &Position, limits: &SearchLimits) -> SearchResult {
        self.stop.store(false, Ordering::Relaxed);
        search::search_best_move(pos, limits, &mut self.tt, &mut self.ordering, &self.stop)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

// Free functions with the exact names spec §6 lists, for operations that
// don't touch per-game search state (parsing, move generation, static
// evaluation). Search itself goes through `Engine` above.

/// Spec §6 `position_set_empty`.
pub fn position_set_empty(pos: &mut Position) {
    pos.set_empty();
}

/// Spec §6 `position_set_start`.
pub fn position_set_start(pos: &mut Position) {
    pos.set_start();
}

/// Spec §6 `position_set_from_fen`. On malformed input, leaves `pos` as an
/// empty position and returns `false` (spec §7); the caller is responsible
/// for the prior state only insofar as it was already overwritten.
pub fn position_set_from_fen(pos: &mut Position, fen_str: &str) -> bool {
    match fen::parse_fen(fen_str) {
        Ok(parsed) => {
            *pos = parsed;
            true
        }
        Err(_err) => {
            #[cfg(feature = "logging")]
            log::warn!("rejected malformed FEN '{fen_str}': {_err}");
            pos.set_empty();
            false
        }
    }
}

/// Spec §6 `generate_legal_moves`.
pub fn generate_legal_moves(pos: &Position, out: &mut MoveList) {
    movegen::generate_legal_moves(pos, out);
}

/// Spec §6 `engine_apply_move`: applies `mv` without re-validating it
/// against the legal move list (used internally by move generation's
/// legality filter and by search, where moves always come from the
/// generator). Returns `false` without mutating `pos` if there is no piece
/// on the source square.
pub fn engine_apply_move(pos: &mut Position, mv: Move) -> bool {
    if pos.piece_at(mv.from).is_none() {
        return false;
    }
    make_move::apply_move(pos, mv);
    true
}

/// Spec §6 `engine_make_move`: validates `mv` against the freshly generated
/// legal list (equality on from/to and, for promotions, the promotion
/// kind), then applies the canonical legal move. Leaves `pos` unchanged on
/// an illegal move (spec §7).
pub fn engine_make_move(pos: &mut Position, mv: Move) -> bool {
    let mut legal = MoveList::new();
    movegen::generate_legal_moves(pos, &mut legal);
    match legal.iter().find(|m| **m == mv) {
        Some(&canonical) => {
            make_move::apply_move(pos, canonical);
            true
        }
        None => false,
    }
}

/// Spec §6 `engine_in_check`.
#[must_use]
pub fn engine_in_check(pos: &Position, side: Side) -> bool {
    pos.in_check(side)
}

/// Spec §6 `evaluate_position`: static evaluation from White's perspective.
#[must_use]
pub fn evaluate_position(pos: &Position) -> i32 {
    crate::eval::evaluate_position(pos)
}

/// Spec §6 `move_to_uci`.
#[must_use]
pub fn move_to_uci(mv: Move) -> String {
    notation::format_uci_move(&mv)
}

/// Spec §6 `move_from_uci`. The returned `Move` carries only
/// from/to/promotion; match it against `generate_legal_moves` output (e.g.
/// via `engine_make_move`) to recover capture/castle/en-passant flags.
#[must_use]
pub fn move_from_uci(s: &str) -> Option<Move> {
    match notation::parse_uci_move(s) {
        Ok(mv) => Some(mv),
        Err(_err) => {
            #[cfg(feature = "logging")]
            log::warn!("rejected malformed coordinate move '{s}': {_err}");
            None
        }
    }
}
