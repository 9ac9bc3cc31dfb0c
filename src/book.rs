//! Built-in opening book (spec §4.7, §9): a small curated table of known
//! lines, keyed by Zobrist hash, with weighted-random or best-weight move
//! selection.

use once_cell::sync::Lazy;
use rand::Rng;

use crate::make_move::apply_move;
use crate::moves::MoveList;
use crate::notation::parse_uci_move;
use crate::position::Position;
use crate::types::PieceKind;

const MAX_BOOK_PLY: u32 = 24;

struct BookSeed {
    line: &'static str,
    weight: i32,
}

/// Curated opening lines with a base weight, one popular continuation per
/// entry.
const BOOK_SEEDS: &[BookSeed] = &[
    BookSeed { line: "e2e4 e7e5 g1f3 b8c6 f1b5 a7a6 b5a4 g8f6 e1g1 f8e7", weight: 90 },
    BookSeed { line: "e2e4 e7e5 g1f3 b8c6 f1c4 f8c5 c2c3 g8f6 d2d3 d7d6 e1g1 e8g8", weight: 88 },
    BookSeed { line: "e2e4 e7e5 g1f3 b8c6 d2d4 e5d4 f3d4 f8c5 d4b3 c5b6 b1c3", weight: 68 },
    BookSeed { line: "e2e4 e7e5 g1f3 g8f6 f3e5 d7d6 e5f3 f6e4 d2d4", weight: 60 },
    BookSeed { line: "e2e4 c7c5 g1f3 d7d6 d2d4 c5d4 f3d4 g8f6 b1c3 a7a6", weight: 95 },
    BookSeed { line: "e2e4 c7c5 g1f3 b8c6 d2d4 c5d4 f3d4 g7g6 b1c3 f8g7", weight: 74 },
    BookSeed { line: "e2e4 c7c5 c2c3 d7d5 e4d5 d8d5 d2d4", weight: 56 },
    BookSeed { line: "e2e4 e7e6 d2d4 d7d5 b1c3 g8f6 e4e5 f6d7 g1f3 c7c5", weight: 82 },
    BookSeed { line: "e2e4 e7e6 d2d4 d7d5 b1c3 f8b4 e4e5 c7c5 a2a3 b4c3 b2c3", weight: 63 },
    BookSeed { line: "e2e4 c7c6 d2d4 d7d5 b1c3 d5e4 c3e4 c8f5", weight: 84 },
    BookSeed { line: "e2e4 c7c6 d2d4 d7d5 e4e5 c8f5 g1f3", weight: 57 },
    BookSeed { line: "d2d4 d7d5 c2c4 e7e6 b1c3 g8f6 c1g5 f8e7 e2e3 e8g8", weight: 92 },
    BookSeed { line: "d2d4 d7d5 c2c4 c7c6 g1f3 g8f6 b1c3 d5c4 a2a4", weight: 77 },
    BookSeed { line: "d2d4 d7d5 c2c4 d5c4 g1f3 g8f6 e2e3 e7e6 f1c4 c7c5 e1g1", weight: 52 },
    BookSeed { line: "d2d4 g8f6 c2c4 e7e6 b1c3 f8b4 e2e3 e8g8 f1d3 d7d5", weight: 79 },
    BookSeed { line: "d2d4 g8f6 c2c4 g7g6 b1c3 f8g7 e2e4 d7d6 g1f3 e8g8", weight: 86 },
    BookSeed { line: "d2d4 g8f6 c2c4 g7g6 b1c3 f8g7 e2e4 d7d6 f2f4", weight: 55 },
    BookSeed { line: "c2c4 e7e5 b1c3 g8f6 g2g3 d7d5 c4d5 f6d5 f1g2", weight: 58 },
    BookSeed { line: "g1f3 d7d5 c2c4 e7e6 g2g3 g8f6 f1g2 f8e7 e1g1", weight: 54 },
    BookSeed { line: "d2d4 d7d5 g1f3 g8f6 c1f4 c7c5 e2e3 b8c6 c2c3", weight: 61 },
    BookSeed { line: "e2e4 d7d6 d2d4 g8f6 b1c3 g7g6 g1f3 f8g7", weight: 70 },
    BookSeed { line: "e2e4 g7g6 d2d4 f8g7 b1c3 d7d6 g1f3", weight: 46 },
    BookSeed { line: "e2e4 c7c5 g1f3 e7e6 d2d4 c5d4 f3d4 b8c6 b1c3 d7d6", weight: 72 },
    BookSeed { line: "e2e4 c7c5 g1f3 d7d6 d2d4 c5d4 f3d4 g8f6 b1c3 e7e6", weight: 69 },
    BookSeed { line: "d2d4 g8f6 c2c4 e7e6 g1f3 d7d5 b1c3 f8e7 c1g5 e8g8", weight: 73 },
];

struct BookEntry {
    key: u64,
    mv: crate::moves::Move,
    weight: i32,
}

fn build_book() -> Vec<BookEntry> {
    let mut entries = Vec::new();
    for seed in BOOK_SEEDS {
        let mut pos = Position::start();
        for (ply, token) in seed.line.split_whitespace().enumerate() {
            let ply = ply as u32;
            if ply >= MAX_BOOK_PLY {
                break;
            }
            let Ok(parsed) = parse_uci_move(token) else {
                break;
            };
            let mut legal = MoveList::new();
            crate::movegen::generate_legal_moves(&pos, &mut legal);
            let Some(canonical) = legal.iter().find(|m| **m == parsed) else {
                break;
            };
            entries.push(BookEntry {
                key: pos.hash,
                mv: *canonical,
                weight: seed.weight - (ply as i32 / 2),
            });
            apply_move(&mut pos, *canonical);
        }
    }
    entries
}

static BOOK: Lazy<Vec<BookEntry>> = Lazy::new(build_book);

/// Looks up a book move for `pos`. Returns `None` once either side has
/// traded off a queen or the position has moved far enough from book ply
/// (mirrors the reference engine's book-applicability gates).
#[must_use]
pub fn probe(pos: &Position, randomness: i32) -> Option<crate::moves::Move> {
    if pos.fullmove_number > 12 || pos.halfmove_clock > 10 {
        return None;
    }
    let queens = pos.piece_bb(crate::types::Side::White, PieceKind::Queen)
        | pos.piece_bb(crate::types::Side::Black, PieceKind::Queen);
    if queens.popcount() < 2 {
        return None;
    }

    let mut legal = MoveList::new();
    crate::movegen::generate_legal_moves(pos, &mut legal);
    if legal.is_empty() {
        return None;
    }

    let mut candidates: Vec<(crate::moves::Move, i32)> = Vec::new();
    for entry in BOOK.iter().filter(|e| e.key == pos.hash) {
        if !legal.iter().any(|m| *m == entry.mv) {
            continue;
        }
        if let Some(slot) = candidates.iter_mut().find(|(m, _)| *m == entry.mv) {
            slot.1 += entry.weight;
        } else {
            candidates.push((entry.mv, entry.weight));
        }
    }

    if candidates.is_empty() {
        return None;
    }

    if randomness <= 0 || candidates.len() == 1 {
        return candidates
            .iter()
            .max_by_key(|(_, w)| *w)
            .map(|(m, _)| *m);
    }

    let total: i32 = candidates.iter().map(|(_, w)| (*w).max(1)).sum();
    if total <= 0 {
        return Some(candidates[0].0);
    }
    let mut pick = rand::thread_rng().gen_range(0..total);
    for (mv, w) in &candidates {
        let w = (*w).max(1);
        if pick < w {
            return Some(*mv);
        }
        pick -= w;
    }
    Some(candidates[0].0)
}
