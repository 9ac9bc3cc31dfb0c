//! Perft divide benchmark tool (spec §6: "the benchmark tool (perft and
//! tactical tests) uses only the [engine] API"). Takes an optional FEN and
//! depth; defaults to the Kiwipete position at depth 4, matching one of the
//! spec §8 perft equivalences.

use std::env;
use std::time::Instant;

use chess_core::engine;
use chess_core::notation::format_uci_move;
use chess_core::perft::{perft, perft_divide};
use chess_core::position::Position;

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn main() {
    let mut args = env::args().skip(1);
    let fen = args.next().unwrap_or_else(|| KIWIPETE.to_string());
    let depth: u32 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(4);

    let mut pos = Position::start();
    if !engine::position_set_from_fen(&mut pos, &fen) {
        eprintln!("invalid FEN: {fen}");
        std::process::exit(1);
    }

    println!("perft divide depth {depth} from: {fen}");
    let start = Instant::now();
    let divide = perft_divide(&pos, depth);
    let mut total = 0u64;
    for (mv, count) in &divide {
        println!("{}: {count}", format_uci_move(mv));
        total += count;
    }
    let elapsed = start.elapsed();
    println!("total: {total}");
    println!(
        "{:.3}s, {:.0} nodes/sec",
        elapsed.as_secs_f64(),
        total as f64 / elapsed.as_secs_f64().max(1e-9)
    );

    debug_assert_eq!(total, perft(&pos, depth));
}
