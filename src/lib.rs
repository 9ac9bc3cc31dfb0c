//! Bitboard move generation, rules, evaluation and alpha-beta search for a
//! chess engine core (spec §1): fully legal move generation, move
//! execution with complete chess rules, static evaluation, and an
//! iterative-deepening alpha-beta search with transposition table and an
//! opening book. The GUI, audio, themes, profile persistence, local
//! settings, and peer-to-peer networking that consume this core are out of
//! scope; see `engine` for the surface those collaborators talk to.

pub mod attack_tables;
pub mod bitboard;
pub mod book;
pub mod engine;
pub mod eval;
pub mod fen;
pub mod make_move;
pub mod movegen;
pub mod moves;
pub mod notation;
pub mod ordering;
pub mod perft;
pub mod position;
pub mod search;
pub mod tt;
pub mod types;
pub mod zobrist;
