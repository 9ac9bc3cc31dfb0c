//! Pseudo-legal move generation and the legal-move filter (spec §4.3).

use crate::attack_tables::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::make_move::apply_move;
use crate::moves::{Move, MoveFlags, MoveList};
use crate::position::Position;
use crate::types::{CastlingRights, PieceKind, Side, Square};

/// Generates the fully legal move list for `pos.side_to_move` into `out`.
///
/// Standard approach (spec §4.3): generate pseudo-legal moves, then for
/// each candidate simulate the move and drop any that leave the mover's
/// king attacked.
pub fn generate_legal_moves(pos: &Position, out: &mut MoveList) {
    out.clear();
    let mut pseudo = MoveList::new();
    generate_pseudo_legal_moves(pos, &mut pseudo);

    let side = pos.side_to_move;
    for &mv in pseudo.iter() {
        let mut after = pos.clone();
        apply_move(&mut after, mv);
        if !after.in_check(side) {
            out.push(mv);
        }
    }
}

/// Generates pseudo-legal moves for `pos.side_to_move` into `out`: moves
/// that follow movement rules but may leave the mover's own king in check.
pub fn generate_pseudo_legal_moves(pos: &Position, out: &mut MoveList) {
    let side = pos.side_to_move;
    generate_pawn_moves(pos, side, out);
    generate_knight_moves(pos, side, out);
    generate_slider_moves(pos, side, PieceKind::Bishop, out);
    generate_slider_moves(pos, side, PieceKind::Rook, out);
    generate_slider_moves(pos, side, PieceKind::Queen, out);
    generate_king_moves(pos, side, out);
    generate_castling_moves(pos, side, out);
}

fn own_and_enemy(pos: &Position, side: Side) -> (Bitboard, Bitboard) {
    (
        pos.side_occupancy[side.index()],
        pos.side_occupancy[side.opposite().index()],
    )
}

fn generate_pawn_moves(pos: &Position, side: Side, out: &mut MoveList) {
    let (own, enemy) = own_and_enemy(pos, side);
    let empty = !pos.occupied;
    let pawns = pos.piece_bb(side, PieceKind::Pawn);

    let (start_rank, last_rank, forward): (u8, u8, i32) = match side {
        Side::White => (1, 7, 8),
        Side::Black => (6, 0, -8),
    };

    for from in pawns.iter() {
        let one_forward_idx = from.index() as i32 + forward;
        if !(0..64).contains(&one_forward_idx) {
            continue;
        }
        let one_forward = Square::new(one_forward_idx as u8);

        if empty.contains(one_forward) {
            if one_forward.rank() == last_rank {
                push_promotions(out, from, one_forward, MoveFlags::NONE);
            } else {
                out.push(Move::new(from, one_forward, PieceKind::None, MoveFlags::NONE));
                if from.rank() == start_rank {
                    let two_forward = Square::new((one_forward_idx + forward) as u8);
                    if empty.contains(two_forward) {
                        out.push(Move::new(
                            from,
                            two_forward,
                            PieceKind::None,
                            MoveFlags(MoveFlags::DOUBLE_PAWN),
                        ));
                    }
                }
            }
        }

        let attacks = pawn_attacks(side, from);
        for to in (attacks & enemy).iter() {
            if to.rank() == last_rank {
                push_promotions(out, from, to, MoveFlags(MoveFlags::CAPTURE));
            } else {
                out.push(Move::new(from, to, PieceKind::None, MoveFlags(MoveFlags::CAPTURE)));
            }
        }

        if pos.en_passant != Square::NONE && attacks.contains(pos.en_passant) {
            out.push(Move::new(
                from,
                pos.en_passant,
                PieceKind::None,
                MoveFlags(MoveFlags::EN_PASSANT | MoveFlags::CAPTURE),
            ));
        }
    }
    let _ = own;
}

fn push_promotions(out: &mut MoveList, from: Square, to: Square, extra: MoveFlags) {
    for &promo in &PieceKind::PROMOTIONS {
        out.push(Move::new(
            from,
            to,
            promo,
            MoveFlags(extra.0 | MoveFlags::PROMOTION),
        ));
    }
}

fn generate_knight_moves(pos: &Position, side: Side, out: &mut MoveList) {
    let (own, enemy) = own_and_enemy(pos, side);
    for from in pos.piece_bb(side, PieceKind::Knight).iter() {
        let targets = knight_attacks(from) & !own;
        for to in targets.iter() {
            let flags = if enemy.contains(to) {
                MoveFlags(MoveFlags::CAPTURE)
            } else {
                MoveFlags::NONE
            };
            out.push(Move::new(from, to, PieceKind::None, flags));
        }
    }
}

fn generate_slider_moves(pos: &Position, side: Side, kind: PieceKind, out: &mut MoveList) {
    let (own, enemy) = own_and_enemy(pos, side);
    for from in pos.piece_bb(side, kind).iter() {
        let attacks = match kind {
            PieceKind::Bishop => bishop_attacks(from, pos.occupied),
            PieceKind::Rook => rook_attacks(from, pos.occupied),
            PieceKind::Queen => bishop_attacks(from, pos.occupied) | rook_attacks(from, pos.occupied),
            _ => unreachable!(),
        };
        let targets = attacks & !own;
        for to in targets.iter() {
            let flags = if enemy.contains(to) {
                MoveFlags(MoveFlags::CAPTURE)
            } else {
                MoveFlags::NONE
            };
            out.push(Move::new(from, to, PieceKind::None, flags));
        }
    }
}

fn generate_king_moves(pos: &Position, side: Side, out: &mut MoveList) {
    let (own, enemy) = own_and_enemy(pos, side);
    if let Some(from) = pos.king_square(side) {
        let targets = king_attacks(from) & !own;
        for to in targets.iter() {
            let flags = if enemy.contains(to) {
                MoveFlags(MoveFlags::CAPTURE)
            } else {
                MoveFlags::NONE
            };
            out.push(Move::new(from, to, PieceKind::None, flags));
        }
    }
}

fn generate_castling_moves(pos: &Position, side: Side, out: &mut MoveList) {
    let enemy = side.opposite();
    let (king_from, kingside_to, queenside_to, kingside_transit, queenside_transit, queenside_empty_extra): (
        Square,
        Square,
        Square,
        [Square; 1],
        [Square; 1],
        Square,
    ) = match side {
        Side::White => (
            Square::new(4),
            Square::new(6),
            Square::new(2),
            [Square::new(5)],
            [Square::new(3)],
            Square::new(1),
        ),
        Side::Black => (
            Square::new(60),
            Square::new(62),
            Square::new(58),
            [Square::new(61)],
            [Square::new(59)],
            Square::new(57),
        ),
    };

    if pos.king_square(side) != Some(king_from) {
        return;
    }

    if pos.castling_rights.has(CastlingRights::kingside_bit(side)) {
        let squares_empty = !pos.occupied.contains(kingside_transit[0]) && !pos.occupied.contains(kingside_to);
        let not_attacked = ![king_from, kingside_transit[0], kingside_to]
            .iter()
            .any(|&sq| pos.is_square_attacked(sq, enemy));
        if squares_empty && not_attacked {
            out.push(Move::new(
                king_from,
                kingside_to,
                PieceKind::None,
                MoveFlags(MoveFlags::KING_CASTLE),
            ));
        }
    }

    if pos.castling_rights.has(CastlingRights::queenside_bit(side)) {
        let squares_empty = !pos.occupied.contains(queenside_transit[0])
            && !pos.occupied.contains(queenside_to)
            && !pos.occupied.contains(queenside_empty_extra);
        let not_attacked = ![king_from, queenside_transit[0], queenside_to]
            .iter()
            .any(|&sq| pos.is_square_attacked(sq, enemy));
        if squares_empty && not_attacked {
            out.push(Move::new(
                king_from,
                queenside_to,
                PieceKind::None,
                MoveFlags(MoveFlags::QUEEN_CASTLE),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::parse_fen;

    #[test]
    fn start_position_has_20_legal_moves() {
        let pos = Position::start();
        let mut list = MoveList::new();
        generate_legal_moves(&pos, &mut list);
        assert_eq!(list.len(), 20);
    }

    #[test]
    fn pinned_knight_has_no_legal_moves() {
        // White king e1, white knight e2 pinned by black rook e8: any
        // knight move would expose the king, so none are legal.
        let pos = parse_fen("4r3/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        let mut list = MoveList::new();
        generate_legal_moves(&pos, &mut list);
        assert!(list.iter().all(|mv| mv.from != Square::new(12)));
    }

    #[test]
    fn no_legal_moves_leave_king_in_check() {
        let pos = parse_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
            .unwrap();
        let mut list = MoveList::new();
        generate_legal_moves(&pos, &mut list);
        for mv in list.iter() {
            let mut after = pos.clone();
            apply_move(&mut after, *mv);
            assert!(!after.in_check(Side::White));
        }
    }

    #[test]
    fn castling_blocked_when_transit_square_attacked() {
        // Black rook on f8 attacks f1, so white can't castle kingside.
        let pos = parse_fen("4k2r/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let mut list = MoveList::new();
        generate_legal_moves(&pos, &mut list);
        assert!(list.iter().any(|m| m.is_king_castle()));

        let blocked = parse_fen("5r1k/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let mut list2 = MoveList::new();
        generate_legal_moves(&blocked, &mut list2);
        assert!(!list2.iter().any(|m| m.is_king_castle()));
    }
}
