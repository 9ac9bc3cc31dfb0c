//! Move execution: applies a move to a position, updating bitboards,
//! rights, counters, and hash (spec §4.4).

use crate::moves::Move;
use crate::position::Position;
use crate::types::{CastlingRights, PieceKind, Side, Square};

/// Applies `mv` to `pos` without validating it against the legal move list
/// (spec §6 `engine_apply_move`). Caller must ensure `mv` is at least
/// pseudo-legal for `pos`; used internally by move generation's legality
/// filter and by search, where moves always come from the generator.
pub fn apply_move(pos: &mut Position, mv: Move) {
    let side = pos.side_to_move;
    let enemy = side.opposite();

    let Some((_, moving_kind)) = pos.piece_at(mv.from) else {
        debug_assert!(false, "apply_move called with no piece on source square");
        return;
    };

    let mut is_capture = false;

    if mv.is_en_passant() {
        let captured_sq = match side {
            Side::White => Square::new(mv.to.index() as u8 - 8),
            Side::Black => Square::new(mv.to.index() as u8 + 8),
        };
        pos.remove_piece(enemy, PieceKind::Pawn, captured_sq);
        is_capture = true;
    } else if let Some((_, captured_kind)) = pos.piece_at(mv.to) {
        pos.remove_piece(enemy, captured_kind, mv.to);
        is_capture = true;
        if mv.to == corner_square(enemy, true) {
            pos.castling_rights.clear(CastlingRights::kingside_bit(enemy));
        }
        if mv.to == corner_square(enemy, false) {
            pos.castling_rights.clear(CastlingRights::queenside_bit(enemy));
        }
    }

    pos.remove_piece(side, moving_kind, mv.from);
    let placed_kind = if mv.is_promotion() {
        mv.promotion_or_default()
    } else {
        moving_kind
    };
    pos.set_piece(side, placed_kind, mv.to);

    if mv.is_king_castle() {
        let (rook_from, rook_to) = rook_castle_squares(side, true);
        pos.remove_piece(side, PieceKind::Rook, rook_from);
        pos.set_piece(side, PieceKind::Rook, rook_to);
    } else if mv.is_queen_castle() {
        let (rook_from, rook_to) = rook_castle_squares(side, false);
        pos.remove_piece(side, PieceKind::Rook, rook_from);
        pos.set_piece(side, PieceKind::Rook, rook_to);
    }

    if moving_kind == PieceKind::King {
        pos.castling_rights.clear(CastlingRights::kingside_bit(side));
        pos.castling_rights.clear(CastlingRights::queenside_bit(side));
    } else if moving_kind == PieceKind::Rook {
        if mv.from == corner_square(side, true) {
            pos.castling_rights.clear(CastlingRights::kingside_bit(side));
        } else if mv.from == corner_square(side, false) {
            pos.castling_rights.clear(CastlingRights::queenside_bit(side));
        }
    }

    pos.en_passant = if mv.is_double_pawn_push() {
        match side {
            Side::White => Square::new(mv.from.index() as u8 + 8),
            Side::Black => Square::new(mv.from.index() as u8 - 8),
        }
    } else {
        Square::NONE
    };

    if moving_kind == PieceKind::Pawn || is_capture {
        pos.halfmove_clock = 0;
    } else {
        pos.halfmove_clock = pos.halfmove_clock.saturating_add(1).min(65_535);
    }

    if side == Side::Black {
        pos.fullmove_number += 1;
    }

    pos.side_to_move = enemy;
    pos.refresh_occupancy();
    pos.hash = pos.compute_hash();
}

/// Builds and applies a null move: flips the side to move, clears the
/// en-passant target, and increments the halfmove clock, without moving
/// any piece (spec §4.7 null-move pruning, §9: the hash is rebuilt from
/// scratch after flipping, which an incremental update could do faster
/// but equivalently).
pub fn apply_null_move(pos: &mut Position) {
    pos.side_to_move = pos.side_to_move.opposite();
    pos.en_passant = Square::NONE;
    pos.halfmove_clock = pos.halfmove_clock.saturating_add(1).min(65_535);
    pos.hash = pos.compute_hash();
}

#[inline]
fn corner_square(side: Side, kingside: bool) -> Square {
    match (side, kingside) {
        (Side::White, true) => Square::new(7),   // h1
        (Side::White, false) => Square::new(0),  // a1
        (Side::Black, true) => Square::new(63),  // h8
        (Side::Black, false) => Square::new(56), // a8
    }
}

#[inline]
fn rook_castle_squares(side: Side, kingside: bool) -> (Square, Square) {
    match (side, kingside) {
        (Side::White, true) => (Square::new(7), Square::new(5)),    // h1 -> f1
        (Side::White, false) => (Square::new(0), Square::new(3)),   // a1 -> d1
        (Side::Black, true) => (Square::new(63), Square::new(61)),  // h8 -> f8
        (Side::Black, false) => (Square::new(56), Square::new(59)), // a8 -> d8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::parse_fen;
    use crate::moves::MoveFlags;

    #[test]
    fn pawn_double_push_sets_en_passant_and_flips_side() {
        let mut pos = Position::start();
        let mv = Move::new(
            Square::from_rank_file(1, 4),
            Square::from_rank_file(3, 4),
            PieceKind::None,
            MoveFlags(MoveFlags::DOUBLE_PAWN),
        );
        apply_move(&mut pos, mv);
        assert_eq!(pos.side_to_move, Side::Black);
        assert_eq!(pos.en_passant, Square::from_rank_file(2, 4));
        assert_eq!(pos.halfmove_clock, 0);
        assert_eq!(pos.hash, pos.compute_hash());
    }

    #[test]
    fn en_passant_capture_removes_pawn_behind_target() {
        let mut pos = parse_fen("rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 2")
            .unwrap();
        let mv = Move::new(
            Square::from_rank_file(3, 3),
            Square::from_rank_file(2, 4),
            PieceKind::None,
            MoveFlags(MoveFlags::EN_PASSANT | MoveFlags::CAPTURE),
        );
        apply_move(&mut pos, mv);
        assert!(pos.piece_at(Square::from_rank_file(3, 4)).is_none());
        assert_eq!(pos.halfmove_clock, 0);
    }

    #[test]
    fn kingside_castle_moves_rook() {
        let mut pos = parse_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let mv = Move::new(
            Square::new(4),
            Square::new(6),
            PieceKind::None,
            MoveFlags(MoveFlags::KING_CASTLE),
        );
        apply_move(&mut pos, mv);
        assert_eq!(pos.piece_at(Square::new(5)), Some((Side::White, PieceKind::Rook)));
        assert!(pos.piece_at(Square::new(7)).is_none());
        assert_eq!(
            pos.castling_rights.has(CastlingRights::WHITE_KINGSIDE),
            false
        );
    }

    #[test]
    fn rook_capture_on_corner_clears_right() {
        let mut pos = parse_fen("r3k3/8/8/8/8/8/8/R3K2R w KQq - 0 1").unwrap();
        let mv = Move::new(Square::new(0), Square::new(56), PieceKind::None, MoveFlags(MoveFlags::CAPTURE));
        apply_move(&mut pos, mv);
        assert!(!pos.castling_rights.has(CastlingRights::BLACK_QUEENSIDE));
    }
}
