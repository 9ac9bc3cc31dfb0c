//! Precomputed knight/king/pawn attack tables and on-the-fly slider rays.
//!
//! Initialized once per process via `once_cell::sync::Lazy`, matching the
//! teacher's `board/attack_tables.rs` convention. Immutable after that
//! first access; read-only from every caller (spec §5).

use once_cell::sync::Lazy;

use crate::bitboard::Bitboard;
use crate::types::{Side, Square};

static KNIGHT_ATTACKS: Lazy<[Bitboard; 64]> = Lazy::new(|| {
    let mut table = [Bitboard::EMPTY; 64];
    for idx in 0..64u8 {
        let sq = Square::new(idx);
        let rank = sq.rank() as i32;
        let file = sq.file() as i32;
        let mut bb = Bitboard::EMPTY;
        const JUMPS: [(i32, i32); 8] = [
            (1, 2), (2, 1), (2, -1), (1, -2),
            (-1, -2), (-2, -1), (-2, 1), (-1, 2),
        ];
        for (dr, df) in JUMPS {
            let r = rank + dr;
            let f = file + df;
            if (0..8).contains(&r) && (0..8).contains(&f) {
                bb.set(Square::from_rank_file(r as u8, f as u8));
            }
        }
        table[idx as usize] = bb;
    }
    table
});

static KING_ATTACKS: Lazy<[Bitboard; 64]> = Lazy::new(|| {
    let mut table = [Bitboard::EMPTY; 64];
    for idx in 0..64u8 {
        let sq = Square::new(idx);
        let rank = sq.rank() as i32;
        let file = sq.file() as i32;
        let mut bb = Bitboard::EMPTY;
        for dr in -1..=1i32 {
            for df in -1..=1i32 {
                if dr == 0 && df == 0 {
                    continue;
                }
                let r = rank + dr;
                let f = file + df;
                if (0..8).contains(&r) && (0..8).contains(&f) {
                    bb.set(Square::from_rank_file(r as u8, f as u8));
                }
            }
        }
        table[idx as usize] = bb;
    }
    table
});

/// `PAWN_ATTACKS[side][square]`: diagonal capture targets, forward = +7/+9
/// for White, -7/-9 for Black (spec §4.1).
static PAWN_ATTACKS: Lazy<[[Bitboard; 64]; 2]> = Lazy::new(|| {
    let mut table = [[Bitboard::EMPTY; 64]; 2];
    for idx in 0..64u8 {
        let bb = Bitboard::from_square(Square::new(idx));
        table[Side::White.index()][idx as usize] =
            bb.shift_north_east() | bb.shift_north_west();
        table[Side::Black.index()][idx as usize] =
            bb.shift_south_east() | bb.shift_south_west();
    }
    table
});

#[inline]
#[must_use]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq.index()]
}

#[inline]
#[must_use]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq.index()]
}

#[inline]
#[must_use]
pub fn pawn_attacks(side: Side, sq: Square) -> Bitboard {
    PAWN_ATTACKS[side.index()][sq.index()]
}

const BISHOP_DIRS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ROOK_DIRS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Walks a ray of directions from `sq` outward, stopping at and including
/// the first blocker in each direction (spec §4.1).
fn ray_attacks(sq: Square, occupied: Bitboard, dirs: &[(i32, i32); 4]) -> Bitboard {
    let mut bb = Bitboard::EMPTY;
    let start_rank = sq.rank() as i32;
    let start_file = sq.file() as i32;
    for &(dr, df) in dirs {
        let mut rank = start_rank;
        let mut file = start_file;
        loop {
            rank += dr;
            file += df;
            if !(0..8).contains(&rank) || !(0..8).contains(&file) {
                break;
            }
            let target = Square::from_rank_file(rank as u8, file as u8);
            bb.set(target);
            if occupied.contains(target) {
                break;
            }
        }
    }
    bb
}

#[inline]
#[must_use]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    ray_attacks(sq, occupied, &BISHOP_DIRS)
}

#[inline]
#[must_use]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    ray_attacks(sq, occupied, &ROOK_DIRS)
}

#[inline]
#[must_use]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}

/// True if any piece of `side` attacks `target`, given the full board
/// occupancy and per-side piece bitboards indexed `[PieceKind::index()]`.
#[must_use]
pub fn is_attacked(
    target: Square,
    side: Side,
    occupied: Bitboard,
    pawns: Bitboard,
    knights: Bitboard,
    bishops: Bitboard,
    rooks: Bitboard,
    queens: Bitboard,
    king: Bitboard,
) -> bool {
    if !(pawn_attacks(side.opposite(), target) & pawns).is_empty() {
        return true;
    }
    if !(knight_attacks(target) & knights).is_empty() {
        return true;
    }
    if !(king_attacks(target) & king).is_empty() {
        return true;
    }
    let diag = bishop_attacks(target, occupied);
    if !(diag & (bishops | queens)).is_empty() {
        return true;
    }
    let ortho = rook_attacks(target, occupied);
    if !(ortho & (rooks | queens)).is_empty() {
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knight_in_corner_has_two_targets() {
        assert_eq!(knight_attacks(Square::new(0)).popcount(), 2);
    }

    #[test]
    fn king_in_center_has_eight_targets() {
        assert_eq!(king_attacks(Square::from_rank_file(3, 3)).popcount(), 8);
    }

    #[test]
    fn rook_attacks_stop_at_blocker() {
        let occ = Bitboard::from_square(Square::from_rank_file(0, 4));
        let attacks = rook_attacks(Square::from_rank_file(0, 0), occ);
        assert!(attacks.contains(Square::from_rank_file(0, 4)));
        assert!(!attacks.contains(Square::from_rank_file(0, 5)));
    }

    #[test]
    fn pawn_attacks_do_not_wrap_files() {
        let a_file_pawn = Square::from_rank_file(3, 0);
        let attacks = pawn_attacks(Side::White, a_file_pawn);
        assert_eq!(attacks.popcount(), 1);
        assert!(attacks.contains(Square::from_rank_file(4, 1)));
    }
}
