//! Perft integration tests: the move generator's correctness oracle (spec
//! §8). Each position exercises a different rule: the start position for
//! ordinary development, Kiwipete for castling plus mixed captures, the en
//! passant endgame for the en passant edge case, and the castling maze for
//! rook/king path legality interacting with checks.

use chess_core::fen::parse_fen;
use chess_core::perft::perft;
use chess_core::position::Position;

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const ENDGAME_EP: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
const CASTLING_MAZE: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";

#[test]
fn start_position_depth_4() {
    let pos = Position::start();
    assert_eq!(perft(&pos, 4), 197_281);
}

#[test]
#[ignore = "several million nodes, run explicitly with --ignored"]
fn start_position_depth_5() {
    let pos = Position::start();
    assert_eq!(perft(&pos, 5), 4_865_609);
}

#[test]
fn kiwipete_depth_3() {
    let pos = parse_fen(KIWIPETE).unwrap();
    assert_eq!(perft(&pos, 3), 97_862);
}

#[test]
#[ignore = "several million nodes, run explicitly with --ignored"]
fn kiwipete_depth_4() {
    let pos = parse_fen(KIWIPETE).unwrap();
    assert_eq!(perft(&pos, 4), 4_085_603);
}

#[test]
fn endgame_en_passant_depth_4() {
    let pos = parse_fen(ENDGAME_EP).unwrap();
    assert_eq!(perft(&pos, 4), 43_238);
}

#[test]
#[ignore = "several hundred thousand nodes, run explicitly with --ignored"]
fn endgame_en_passant_depth_5() {
    let pos = parse_fen(ENDGAME_EP).unwrap();
    assert_eq!(perft(&pos, 5), 674_624);
}

#[test]
fn castling_maze_depth_3() {
    let pos = parse_fen(CASTLING_MAZE).unwrap();
    assert_eq!(perft(&pos, 3), 89_890);
}

#[test]
#[ignore = "over a million nodes, run explicitly with --ignored"]
fn castling_maze_depth_4() {
    let pos = parse_fen(CASTLING_MAZE).unwrap();
    assert_eq!(perft(&pos, 4), 1_371_859);
}
