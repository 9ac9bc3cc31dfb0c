//! Zobrist hash key tables (spec §4.2).
//!
//! Seeded from a PRNG mixed with wall-clock time so tables are fresh per
//! process; every position created within a run shares the same tables.

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::{CastlingRights, PieceKind, Side, Square};

pub struct ZobristKeys {
    /// `piece[side][kind][square]`, 2 * 6 * 64 = 768 values.
    piece: [[[u64; 64]; 6]; 2],
    castling: [u64; 16],
    en_passant_file: [u64; 8],
    side_to_move: u64,
}

impl ZobristKeys {
    fn new() -> Self {
        let seed = xorshift_seed();
        let mut rng = StdRng::seed_from_u64(seed);

        let mut piece = [[[0u64; 64]; 6]; 2];
        for side in piece.iter_mut() {
            for kind in side.iter_mut() {
                for key in kind.iter_mut() {
                    *key = rng.gen();
                }
            }
        }

        let mut castling = [0u64; 16];
        for key in castling.iter_mut() {
            *key = rng.gen();
        }

        let mut en_passant_file = [0u64; 8];
        for key in en_passant_file.iter_mut() {
            *key = rng.gen();
        }

        ZobristKeys {
            piece,
            castling,
            en_passant_file,
            side_to_move: rng.gen(),
        }
    }

    #[inline]
    #[must_use]
    pub fn piece_key(&self, side: Side, kind: PieceKind, sq: Square) -> u64 {
        self.piece[side.index()][kind.index()][sq.index()]
    }

    #[inline]
    #[must_use]
    pub fn castling_key(&self, rights: CastlingRights) -> u64 {
        self.castling[rights.0 as usize]
    }

    #[inline]
    #[must_use]
    pub fn en_passant_key(&self, file: u8) -> u64 {
        self.en_passant_file[file as usize]
    }

    #[inline]
    #[must_use]
    pub fn side_to_move_key(&self) -> u64 {
        self.side_to_move
    }
}

/// A simple xorshift mix of the PRNG seed with wall-clock time, per spec
/// §4.2 ("the seed is mixed with wall-clock time so tables are fresh per
/// process").
fn xorshift_seed() -> u64 {
    let mut x = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x9E37_79B9_7F4A_7C15);
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    if x == 0 {
        x = 0x9E37_79B9_7F4A_7C15;
    }
    x
}

pub static ZOBRIST: Lazy<ZobristKeys> = Lazy::new(ZobristKeys::new);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_distinct() {
        let a = ZOBRIST.piece_key(Side::White, PieceKind::Pawn, Square::new(0));
        let b = ZOBRIST.piece_key(Side::White, PieceKind::Pawn, Square::new(1));
        let c = ZOBRIST.piece_key(Side::Black, PieceKind::Pawn, Square::new(0));
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
