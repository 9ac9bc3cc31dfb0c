//! The `Position` value type: board state, rights, counters, and hash
//! (spec §3).

use crate::attack_tables::is_attacked;
use crate::bitboard::Bitboard;
use crate::types::{CastlingRights, PieceKind, Side, Square};
use crate::zobrist::ZOBRIST;

/// Full game state. A value type: positions are cloned during search tree
/// traversal and constructed by `set_empty`, `set_start`, or
/// `set_from_fen` (spec §3).
#[derive(Clone, Debug)]
pub struct Position {
    /// `pieces[side][kind]`, indexed by `Side::index()`/`PieceKind::index()`.
    pieces: [[Bitboard; 6]; 2],
    pub side_occupancy: [Bitboard; 2],
    pub occupied: Bitboard,
    pub side_to_move: Side,
    pub castling_rights: CastlingRights,
    /// En-passant target square, or `Square::NONE` if none.
    pub en_passant: Square,
    pub halfmove_clock: u16,
    pub fullmove_number: u32,
    pub hash: u64,
}

impl Position {
    /// An empty board: no pieces, White to move, no castling rights, no
    /// en-passant target, clocks at their defaults.
    #[must_use]
    pub fn empty() -> Self {
        let mut pos = Position {
            pieces: [[Bitboard::EMPTY; 6]; 2],
            side_occupancy: [Bitboard::EMPTY; 2],
            occupied: Bitboard::EMPTY,
            side_to_move: Side::White,
            castling_rights: CastlingRights::NONE,
            en_passant: Square::NONE,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
        };
        pos.hash = pos.compute_hash();
        pos
    }

    /// The standard starting position.
    #[must_use]
    pub fn start() -> Self {
        let mut pos = Position::empty();
        pos.set_start_in_place();
        pos
    }

    pub fn set_empty(&mut self) {
        *self = Position::empty();
    }

    pub fn set_start(&mut self) {
        self.set_start_in_place();
    }

    fn set_start_in_place(&mut self) {
        *self = Position::empty();
        let back_rank: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (file, &kind) in back_rank.iter().enumerate() {
            self.set_piece(Side::White, kind, Square::from_rank_file(0, file as u8));
            self.set_piece(Side::Black, kind, Square::from_rank_file(7, file as u8));
        }
        for file in 0..8u8 {
            self.set_piece(Side::White, PieceKind::Pawn, Square::from_rank_file(1, file));
            self.set_piece(Side::Black, PieceKind::Pawn, Square::from_rank_file(6, file));
        }
        self.castling_rights = CastlingRights::ALL;
        self.refresh_occupancy();
        self.hash = self.compute_hash();
    }

    #[inline]
    #[must_use]
    pub fn piece_bb(&self, side: Side, kind: PieceKind) -> Bitboard {
        self.pieces[side.index()][kind.index()]
    }

    #[inline]
    fn piece_bb_mut(&mut self, side: Side, kind: PieceKind) -> &mut Bitboard {
        &mut self.pieces[side.index()][kind.index()]
    }

    /// The kind of piece occupying `sq`, and its side, or `None` if empty.
    #[must_use]
    pub fn piece_at(&self, sq: Square) -> Option<(Side, PieceKind)> {
        for &side in &[Side::White, Side::Black] {
            for &kind in &PieceKind::ALL {
                if self.piece_bb(side, kind).contains(sq) {
                    return Some((side, kind));
                }
            }
        }
        None
    }

    pub fn set_piece(&mut self, side: Side, kind: PieceKind, sq: Square) {
        self.piece_bb_mut(side, kind).set(sq);
    }

    pub fn remove_piece(&mut self, side: Side, kind: PieceKind, sq: Square) {
        self.piece_bb_mut(side, kind).clear(sq);
    }

    /// Recomputes `side_occupancy` and `occupied` from the piece bitboards.
    /// Must be called after any mutation of the piece bitboards (spec §3
    /// invariant).
    pub fn refresh_occupancy(&mut self) {
        for &side in &[Side::White, Side::Black] {
            let mut bb = Bitboard::EMPTY;
            for &kind in &PieceKind::ALL {
                bb |= self.piece_bb(side, kind);
            }
            self.side_occupancy[side.index()] = bb;
        }
        self.occupied = self.side_occupancy[0] | self.side_occupancy[1];
    }

    #[inline]
    #[must_use]
    pub fn king_square(&self, side: Side) -> Option<Square> {
        self.piece_bb(side, PieceKind::King).lsb().map(Square::new)
    }

    /// True if `side`'s king is attacked in the current position.
    #[must_use]
    pub fn in_check(&self, side: Side) -> bool {
        let Some(king_sq) = self.king_square(side) else {
            return false;
        };
        self.is_square_attacked(king_sq, side.opposite())
    }

    /// True if any piece of `attacker` attacks `sq`.
    #[must_use]
    pub fn is_square_attacked(&self, sq: Square, attacker: Side) -> bool {
        is_attacked(
            sq,
            attacker,
            self.occupied,
            self.piece_bb(attacker, PieceKind::Pawn),
            self.piece_bb(attacker, PieceKind::Knight),
            self.piece_bb(attacker, PieceKind::Bishop),
            self.piece_bb(attacker, PieceKind::Rook),
            self.piece_bb(attacker, PieceKind::Queen),
            self.piece_bb(attacker, PieceKind::King),
        )
    }

    /// Recomputes the Zobrist key from scratch (spec §3, §4.2, §9: this
    /// design recomputes rather than incrementally updating).
    #[must_use]
    pub fn compute_hash(&self) -> u64 {
        let mut hash = 0u64;
        for &side in &[Side::White, Side::Black] {
            for &kind in &PieceKind::ALL {
                for sq in self.piece_bb(side, kind).iter() {
                    hash ^= ZOBRIST.piece_key(side, kind, sq);
                }
            }
        }
        hash ^= ZOBRIST.castling_key(self.castling_rights);
        if self.en_passant != Square::NONE {
            hash ^= ZOBRIST.en_passant_key(self.en_passant.file());
        }
        if self.side_to_move == Side::Black {
            hash ^= ZOBRIST.side_to_move_key();
        }
        hash
    }

    /// True when the position is a draw by the fifty-move rule (spec §4.5).
    #[inline]
    #[must_use]
    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Non-pawn, non-king material count for `side`, used by the game-phase
    /// calculation in evaluation (spec §4.6): Knight=1, Bishop=1, Rook=2,
    /// Queen=4.
    #[must_use]
    pub fn phase_material(&self, side: Side) -> i32 {
        self.piece_bb(side, PieceKind::Knight).popcount() as i32
            + self.piece_bb(side, PieceKind::Bishop).popcount() as i32
            + 2 * self.piece_bb(side, PieceKind::Rook).popcount() as i32
            + 4 * self.piece_bb(side, PieceKind::Queen).popcount() as i32
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_position_has_32_pieces() {
        let pos = Position::start();
        assert_eq!(pos.occupied.popcount(), 32);
        assert_eq!(pos.side_occupancy[Side::White.index()].popcount(), 16);
        assert_eq!(pos.side_occupancy[Side::Black.index()].popcount(), 16);
    }

    #[test]
    fn start_position_not_in_check() {
        let pos = Position::start();
        assert!(!pos.in_check(Side::White));
        assert!(!pos.in_check(Side::Black));
    }

    #[test]
    fn hash_recomputation_matches_stored() {
        let pos = Position::start();
        assert_eq!(pos.hash, pos.compute_hash());
    }
}
