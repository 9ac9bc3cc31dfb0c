//! FEN parsing and serialization (spec §4.2, §6).

use std::fmt;

use crate::position::Position;
use crate::types::{CastlingRights, PieceKind, Side, Square};

/// Errors returned while parsing a FEN string. Mirrors the teacher's
/// `board::error::FenError` shape: one variant per malformed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    TooFewParts { found: usize },
    InvalidPiece { char: char },
    InvalidCastling { char: char },
    InvalidSideToMove { found: String },
    InvalidEnPassant { found: String },
    WrongRankCount { found: usize },
    WrongFileCount { rank: usize, files: usize },
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::TooFewParts { found } => {
                write!(f, "FEN must have at least 4 fields, found {found}")
            }
            FenError::InvalidPiece { char } => write!(f, "invalid piece character '{char}'"),
            FenError::InvalidCastling { char } => write!(f, "invalid castling character '{char}'"),
            FenError::InvalidSideToMove { found } => {
                write!(f, "invalid side to move '{found}', expected 'w' or 'b'")
            }
            FenError::InvalidEnPassant { found } => {
                write!(f, "invalid en-passant square '{found}'")
            }
            FenError::WrongRankCount { found } => {
                write!(f, "board must have exactly 8 ranks, found {found}")
            }
            FenError::WrongFileCount { rank, files } => {
                write!(f, "rank {rank} has {files} files, expected 8")
            }
        }
    }
}

impl std::error::Error for FenError {}

/// Parses a FEN string into `pos`, replacing its contents entirely.
///
/// Accepts the standard six fields; halfmove/fullmove default to 0 and 1
/// when absent (spec §4.2). Fails on any malformed field, on a board that
/// does not sum to 8 files per rank, or that does not have exactly 8 ranks.
pub fn parse_fen(fen: &str) -> Result<Position, FenError> {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    if parts.len() < 4 {
        return Err(FenError::TooFewParts { found: parts.len() });
    }

    let mut pos = Position::empty();
    parse_board(&mut pos, parts[0])?;

    pos.side_to_move = match parts[1] {
        "w" => Side::White,
        "b" => Side::Black,
        other => {
            return Err(FenError::InvalidSideToMove {
                found: other.to_string(),
            })
        }
    };

    pos.castling_rights = parse_castling(parts[2])?;

    pos.en_passant = if parts[3] == "-" {
        Square::NONE
    } else {
        parts[3].parse::<Square>().map_err(|_| FenError::InvalidEnPassant {
            found: parts[3].to_string(),
        })?
    };

    pos.halfmove_clock = parts
        .get(4)
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(0);
    pos.fullmove_number = parts
        .get(5)
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(1);

    pos.refresh_occupancy();
    pos.hash = pos.compute_hash();
    Ok(pos)
}

fn parse_board(pos: &mut Position, board_field: &str) -> Result<(), FenError> {
    let ranks: Vec<&str> = board_field.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::WrongRankCount { found: ranks.len() });
    }

    // FEN ranks run 8 down to 1; our internal rank index 0 is rank 1.
    for (rank_from_top, rank_str) in ranks.iter().enumerate() {
        let rank_index = 7 - rank_from_top;
        let mut file = 0usize;
        for c in rank_str.chars() {
            if let Some(empty) = c.to_digit(10) {
                file += empty as usize;
                continue;
            }
            if file >= 8 {
                return Err(FenError::WrongFileCount {
                    rank: rank_index,
                    files: file + 1,
                });
            }
            let side = if c.is_ascii_uppercase() {
                Side::White
            } else {
                Side::Black
            };
            let kind = PieceKind::from_char(c).ok_or(FenError::InvalidPiece { char: c })?;
            pos.set_piece(side, kind, Square::from_rank_file(rank_index as u8, file as u8));
            file += 1;
        }
        if file != 8 {
            return Err(FenError::WrongFileCount {
                rank: rank_index,
                files: file,
            });
        }
    }
    Ok(())
}

fn parse_castling(field: &str) -> Result<CastlingRights, FenError> {
    if field == "-" {
        return Ok(CastlingRights::NONE);
    }
    let mut rights = CastlingRights::NONE;
    for c in field.chars() {
        let bit = match c {
            'K' => CastlingRights::WHITE_KINGSIDE,
            'Q' => CastlingRights::WHITE_QUEENSIDE,
            'k' => CastlingRights::BLACK_KINGSIDE,
            'q' => CastlingRights::BLACK_QUEENSIDE,
            other => return Err(FenError::InvalidCastling { char: other }),
        };
        rights.set(bit);
    }
    Ok(rights)
}

/// Serializes `pos` to a FEN string. Not required for round-tripping by the
/// spec, but provided since it is a small, purely derived operation useful
/// for debugging and tests.
#[must_use]
pub fn to_fen(pos: &Position) -> String {
    let mut board = String::new();
    for rank_from_top in 0..8 {
        let rank_index = 7 - rank_from_top;
        let mut empty_run = 0u32;
        for file in 0..8u8 {
            let sq = Square::from_rank_file(rank_index as u8, file);
            match pos.piece_at(sq) {
                Some((side, kind)) => {
                    if empty_run > 0 {
                        board.push_str(&empty_run.to_string());
                        empty_run = 0;
                    }
                    board.push(kind.to_fen_char(side));
                }
                None => empty_run += 1,
            }
        }
        if empty_run > 0 {
            board.push_str(&empty_run.to_string());
        }
        if rank_from_top != 7 {
            board.push('/');
        }
    }

    let side = match pos.side_to_move {
        Side::White => "w",
        Side::Black => "b",
    };

    let mut castling = String::new();
    if pos.castling_rights.has(CastlingRights::WHITE_KINGSIDE) {
        castling.push('K');
    }
    if pos.castling_rights.has(CastlingRights::WHITE_QUEENSIDE) {
        castling.push('Q');
    }
    if pos.castling_rights.has(CastlingRights::BLACK_KINGSIDE) {
        castling.push('k');
    }
    if pos.castling_rights.has(CastlingRights::BLACK_QUEENSIDE) {
        castling.push('q');
    }
    if castling.is_empty() {
        castling.push('-');
    }

    let ep = if pos.en_passant == Square::NONE {
        "-".to_string()
    } else {
        pos.en_passant.to_string()
    };

    format!(
        "{board} {side} {castling} {ep} {} {}",
        pos.halfmove_clock, pos.fullmove_number
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn parses_start_position() {
        let pos = parse_fen(START_FEN).unwrap();
        assert_eq!(pos.occupied.popcount(), 32);
        assert_eq!(pos.side_to_move, Side::White);
        assert_eq!(pos.castling_rights, CastlingRights::ALL);
    }

    #[test]
    fn round_trips_start_position() {
        let pos = parse_fen(START_FEN).unwrap();
        assert_eq!(to_fen(&pos), START_FEN);
    }

    #[test]
    fn rejects_wrong_rank_count() {
        let err = parse_fen("8/8/8 w - - 0 1").unwrap_err();
        assert!(matches!(err, FenError::WrongRankCount { .. }));
    }

    #[test]
    fn rejects_wrong_file_count() {
        let err = parse_fen("pppppppp/8/8/8/8/8/8/8p w - - 0 1").unwrap_err();
        assert!(matches!(err, FenError::WrongFileCount { .. }));
    }

    #[test]
    fn defaults_halfmove_and_fullmove_when_absent() {
        let pos = parse_fen("8/8/8/8/8/8/8/4K2k w - -").unwrap();
        assert_eq!(pos.halfmove_clock, 0);
        assert_eq!(pos.fullmove_number, 1);
    }

    #[test]
    fn accepts_kiwipete() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let pos = parse_fen(fen).unwrap();
        assert_eq!(pos.side_to_move, Side::White);
    }
}
