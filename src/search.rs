//! Iterative-deepening alpha-beta search: negamax with TT, PVS, null-move
//! pruning, late-move reduction/pruning, razoring, reverse futility,
//! quiescence, aspiration windows, and repetition detection (spec §4.7).

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::book;
use crate::eval::evaluate_relative;
use crate::make_move::apply_move;
use crate::moves::{Move, MoveList};
use crate::ordering::{score_moves, OrderingState};
use crate::position::Position;
use crate::tt::{from_tt_score, to_tt_score, BoundType, TranspositionTable};
use crate::types::{PieceKind, Side};

pub const INF_SCORE: i32 = 300_000;
pub const MATE_SCORE: i32 = 250_000;
pub const MATE_BOUND: i32 = MATE_SCORE - 1024;

pub const SEARCH_MIN_DEPTH: u32 = 1;
pub const SEARCH_MAX_DEPTH: u32 = 14;
const MAX_SEARCH_PLY: usize = 128;
const MAX_HISTORY_PLY: usize = 256;
const ASPIRATION_BASE_WINDOW: i32 = 35;
const ASPIRATION_MIN_DEPTH: u32 = 3;
const ASPIRATION_MAX_WINDOW: i32 = 1200;

/// Caller-supplied bounds on a single `search_best_move` call (spec §6).
/// Out-of-range values are silently clamped, never rejected (spec §7).
#[derive(Clone, Copy, Debug)]
pub struct SearchLimits {
    pub depth: u32,
    pub max_time_ms: i64,
    pub randomness: i32,
}

impl SearchLimits {
    #[must_use]
    pub fn clamped(self) -> Self {
        SearchLimits {
            depth: self.depth.clamp(SEARCH_MIN_DEPTH, SEARCH_MAX_DEPTH),
            max_time_ms: self.max_time_ms,
            randomness: self.randomness.max(0),
        }
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits {
            depth: SEARCH_MAX_DEPTH,
            max_time_ms: 0,
            randomness: 0,
        }
    }
}

/// Result of a completed (or time-cut) search (spec §6).
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub score: i32,
    pub depth_reached: u32,
    pub nodes: u64,
}

struct SearchContext<'a> {
    tt: &'a mut TranspositionTable,
    ordering: &'a mut OrderingState,
    stop: &'a AtomicBool,
    limits: SearchLimits,
    start: Instant,
    nodes: u64,
    path_keys: [u64; MAX_HISTORY_PLY],
    path_len: usize,
    timed_out: bool,
}

impl<'a> SearchContext<'a> {
    fn should_stop(&mut self) -> bool {
        if self.timed_out || self.stop.load(Ordering::Relaxed) {
            self.timed_out = true;
            return true;
        }
        if self.limits.max_time_ms <= 0 {
            return false;
        }
        if self.nodes & 1023 != 0 {
            return false;
        }
        if self.start.elapsed().as_millis() as i64 >= self.limits.max_time_ms {
            self.timed_out = true;
            return true;
        }
        false
    }

    fn push_path(&mut self, key: u64) -> bool {
        if self.path_len < MAX_HISTORY_PLY {
            self.path_keys[self.path_len] = key;
            self.path_len += 1;
            true
        } else {
            false
        }
    }

    fn pop_path(&mut self, pushed: bool) {
        if pushed && self.path_len > 0 {
            self.path_len -= 1;
        }
    }

    /// True if `key` has occurred earlier on the current search path at a
    /// matching side-to-move parity (spec §9: lookback steps by 2).
    fn is_repetition(&self, key: u64) -> bool {
        if self.path_len < 3 {
            return false;
        }
        let mut i = self.path_len - 1;
        while i >= 2 {
            i -= 2;
            if self.path_keys[i] == key {
                return true;
            }
            if i < 2 {
                break;
            }
        }
        false
    }
}

#[must_use]
fn side_has_non_pawn_material(pos: &Position, side: Side) -> bool {
    !pos.piece_bb(side, PieceKind::Knight).is_empty()
        || !pos.piece_bb(side, PieceKind::Bishop).is_empty()
        || !pos.piece_bb(side, PieceKind::Rook).is_empty()
        || !pos.piece_bb(side, PieceKind::Queen).is_empty()
}

fn make_null_move(pos: &Position) -> Position {
    let mut next = pos.clone();
    crate::make_move::apply_null_move(&mut next);
    next
}

/// MVV/LVA-style capture gain estimate used by quiescence delta pruning:
/// captured piece's material value (spec §4.7).
#[must_use]
fn capture_gain(pos: &Position, mv: Move) -> i32 {
    if mv.is_en_passant() {
        PieceKind::Pawn.material_value()
    } else {
        pos.piece_at(mv.to)
            .map_or(0, |(_, kind)| kind.material_value())
    }
}

fn negamax(ctx: &mut SearchContext, pos: &Position, mut depth: i32, mut alpha: i32, mut beta: i32, ply: usize) -> i32 {
    let alpha_orig = alpha;
    let beta_orig = beta;

    if ctx.should_stop() {
        return 0;
    }
    if pos.is_fifty_move_draw() {
        return 0;
    }
    if ctx.is_repetition(pos.hash) {
        return 0;
    }
    if depth <= 0 {
        return quiescence(ctx, pos, alpha, beta, ply);
    }
    if ply >= MAX_SEARCH_PLY - 1 {
        return evaluate_relative(pos);
    }

    ctx.nodes += 1;
    let pushed = ctx.push_path(pos.hash);

    let mut hash_move: Option<Move> = None;
    if let Some(entry) = ctx.tt.probe(pos.hash) {
        let tt_score = from_tt_score(entry.score, ply as i32);
        hash_move = entry.best_move;
        if entry.depth as i32 >= depth {
            match entry.bound {
                BoundType::Exact => {
                    ctx.pop_path(pushed);
                    return tt_score;
                }
                BoundType::LowerBound => alpha = alpha.max(tt_score),
                BoundType::UpperBound => beta = beta.min(tt_score),
            }
            if alpha >= beta {
                ctx.pop_path(pushed);
                return tt_score;
            }
        }
    }

    let side = pos.side_to_move;
    let in_check = pos.in_check(side);
    if in_check && depth < SEARCH_MAX_DEPTH as i32 + 2 {
        depth += 1;
    }

    let static_eval = evaluate_relative(pos);

    if !in_check && depth <= 2 && static_eval + 120 * depth <= alpha {
        let result = quiescence(ctx, pos, alpha, beta, ply);
        ctx.pop_path(pushed);
        return result;
    }

    if !in_check && depth <= 3 && beta < MATE_BOUND {
        let rfp_margin = 85 * depth;
        if static_eval - rfp_margin >= beta {
            ctx.pop_path(pushed);
            return static_eval - rfp_margin;
        }
    }

    if depth >= 3
        && !in_check
        && beta < MATE_BOUND
        && static_eval >= beta - 40
        && side_has_non_pawn_material(pos, side)
    {
        let reduction = 2 + i32::from(depth >= 7);
        let null_pos = make_null_move(pos);
        let score = -negamax(ctx, &null_pos, depth - 1 - reduction, -beta, -beta + 1, ply + 1);
        if ctx.timed_out {
            ctx.pop_path(pushed);
            return 0;
        }
        if score >= beta {
            #[cfg(feature = "logging")]
            log::trace!("null-move cutoff at ply {ply} depth {depth}: {score} >= {beta}");
            ctx.pop_path(pushed);
            return beta;
        }
    }

    let mut moves = MoveList::new();
    crate::movegen::generate_legal_moves(pos, &mut moves);
    if moves.is_empty() {
        let result = if in_check { -MATE_SCORE + ply as i32 } else { 0 };
        ctx.pop_path(pushed);
        return result;
    }

    score_moves(pos, &mut moves, hash_move, ctx.ordering, ply);

    let mut best_score = -INF_SCORE;
    let mut best_move = moves.get(0);

    for i in 0..moves.len() {
        moves.select_best(i);
        let mv = moves.get(i).unwrap();

        let tactical = mv.is_capture() || mv.is_promotion();
        let quiet_non_castle = !tactical && !mv.is_castle();

        let mut next = pos.clone();
        apply_move(&mut next, mv);
        let gives_check = next.in_check(next.side_to_move);

        if !in_check && !gives_check && quiet_non_castle && i > 0 && depth <= 3 {
            let lmp_threshold = 4 + depth * depth;
            let futility_margin = 85 * depth + if i as i32 >= 6 { 30 } else { 0 };
            if i as i32 >= lmp_threshold {
                continue;
            }
            if static_eval + futility_margin <= alpha {
                continue;
            }
        }

        let mut child_depth = depth - 1;
        if !in_check && !gives_check && quiet_non_castle && depth >= 4 && i >= 3 {
            let mut reduction = 1;
            if depth >= 8 {
                reduction += 1;
            }
            if i >= 8 {
                reduction += 1;
            }
            child_depth = (child_depth - reduction).max(1);
        }

        let score = if i == 0 {
            -negamax(ctx, &next, depth - 1, -beta, -alpha, ply + 1)
        } else {
            let mut s = -negamax(ctx, &next, child_depth, -alpha - 1, -alpha, ply + 1);
            if !ctx.timed_out && s > alpha && s < beta {
                s = -negamax(ctx, &next, depth - 1, -beta, -alpha, ply + 1);
            } else if !ctx.timed_out && child_depth != depth - 1 && s > alpha {
                s = -negamax(ctx, &next, depth - 1, -beta, -alpha, ply + 1);
            }
            s
        };

        if ctx.timed_out {
            ctx.pop_path(pushed);
            return 0;
        }

        if score > best_score {
            best_score = score;
            best_move = Some(mv);
        }
        alpha = alpha.max(best_score);

        if alpha >= beta {
            if mv.is_quiet() {
                ctx.ordering.record_killer(ply, mv);
                ctx.ordering.record_history(side, mv.from, mv.to, depth.max(0) as u32);
            }
            break;
        }
    }

    let bound = if best_score <= alpha_orig {
        BoundType::UpperBound
    } else if best_score >= beta_orig {
        BoundType::LowerBound
    } else {
        BoundType::Exact
    };
    ctx.tt.store(
        pos.hash,
        depth.max(0) as u32,
        to_tt_score(best_score, ply as i32),
        bound,
        best_move,
    );

    ctx.pop_path(pushed);
    best_score
}

fn quiescence(ctx: &mut SearchContext, pos: &Position, mut alpha: i32, beta: i32, ply: usize) -> i32 {
    if ctx.should_stop() {
        return 0;
    }
    if pos.is_fifty_move_draw() {
        return 0;
    }
    if ctx.is_repetition(pos.hash) {
        return 0;
    }
    if ply >= MAX_HISTORY_PLY - 1 {
        return evaluate_relative(pos);
    }

    ctx.nodes += 1;
    let pushed = ctx.push_path(pos.hash);

    let side = pos.side_to_move;
    let in_check = pos.in_check(side);
    let stand_pat = evaluate_relative(pos);
    let mut best_score = stand_pat;

    if !in_check {
        if stand_pat >= beta {
            ctx.pop_path(pushed);
            return stand_pat;
        }
        alpha = alpha.max(stand_pat);
    }

    let mut moves = MoveList::new();
    crate::movegen::generate_legal_moves(pos, &mut moves);
    if moves.is_empty() {
        let result = if in_check { -MATE_SCORE + ply as i32 } else { 0 };
        ctx.pop_path(pushed);
        return result;
    }

    score_moves(pos, &mut moves, None, ctx.ordering, 0);

    for i in 0..moves.len() {
        moves.select_best(i);
        let mv = moves.get(i).unwrap();

        if !in_check && !mv.is_capture() && !mv.is_promotion() {
            continue;
        }
        if !in_check && mv.is_capture() && !mv.is_promotion() {
            let gain = capture_gain(pos, mv);
            if stand_pat + gain + 90 < alpha {
                continue;
            }
        }

        let mut next = pos.clone();
        apply_move(&mut next, mv);
        let score = -quiescence(ctx, &next, -beta, -alpha, ply + 1);

        if ctx.timed_out {
            ctx.pop_path(pushed);
            return 0;
        }

        best_score = best_score.max(score);
        alpha = alpha.max(best_score);
        if alpha >= beta {
            break;
        }
    }

    ctx.pop_path(pushed);
    best_score
}

/// Runs iterative-deepening search from `pos` under `limits`, sharing
/// `tt` across calls (spec §5: the TT is a process-global, reused
/// resource) and `stop` as a cooperative cancellation flag.
pub fn search_best_move(
    pos: &Position,
    limits: &SearchLimits,
    tt: &mut TranspositionTable,
    ordering: &mut OrderingState,
    stop: &AtomicBool,
) -> SearchResult {
    let limits = limits.clamped();

    if let Some(book_move) = book::probe(pos, limits.randomness) {
        let mut next = pos.clone();
        apply_move(&mut next, book_move);
        return SearchResult {
            best_move: Some(book_move),
            score: -evaluate_relative(&next),
            depth_reached: 0,
            nodes: 0,
        };
    }

    let mut root_moves = MoveList::new();
    crate::movegen::generate_legal_moves(pos, &mut root_moves);
    if root_moves.is_empty() {
        return SearchResult::default();
    }
    if root_moves.len() == 1 {
        let mv = root_moves.get(0).unwrap();
        return SearchResult {
            best_move: Some(mv),
            score: 0,
            depth_reached: 0,
            nodes: 0,
        };
    }

    let mut ctx = SearchContext {
        tt,
        ordering,
        stop,
        limits,
        start: Instant::now(),
        nodes: 0,
        path_keys: [0; MAX_HISTORY_PLY],
        path_len: 0,
        timed_out: false,
    };
    ctx.push_path(pos.hash);

    #[allow(clippy::needless_range_loop)]
    let mut root_scores = vec![-INF_SCORE; root_moves.len()];
    let mut best_move = root_moves.get(0);
    let mut best_score = -INF_SCORE;
    let mut depth_reached = 0u32;

    'iterative: for depth in 1..=limits.depth {
        if ctx.should_stop() {
            break;
        }

        let mut aspiration_window = ASPIRATION_BASE_WINDOW + depth as i32 * 8;
        let mut use_aspiration =
            depth >= ASPIRATION_MIN_DEPTH && best_score > -MATE_BOUND && best_score < MATE_BOUND;
        let (mut alpha, mut beta) = if use_aspiration {
            (
                (best_score - aspiration_window).max(-INF_SCORE),
                (best_score + aspiration_window).min(INF_SCORE),
            )
        } else {
            (-INF_SCORE, INF_SCORE)
        };

        let hash_move = ctx.tt.probe(pos.hash).and_then(|e| e.best_move);

        loop {
            let mut depth_moves = root_moves.as_slice().to_vec();
            score_moves_vec(pos, &mut depth_moves, hash_move, ctx.ordering, 0);
            depth_moves.sort_by(|a, b| b.score.cmp(&a.score));

            let mut search_alpha = alpha;
            let search_beta = beta;
            let mut depth_best_score = -INF_SCORE;
            let mut depth_best_move = depth_moves[0];
            let mut completed = false;

            for (i, &mv) in depth_moves.iter().enumerate() {
                let mut next = pos.clone();
                apply_move(&mut next, mv);

                let score = if i == 0 {
                    -negamax(&mut ctx, &next, depth as i32 - 1, -search_beta, -search_alpha, 1)
                } else {
                    let mut s = -negamax(&mut ctx, &next, depth as i32 - 1, -search_alpha - 1, -search_alpha, 1);
                    if !ctx.timed_out && s > search_alpha && s < search_beta {
                        s = -negamax(&mut ctx, &next, depth as i32 - 1, -search_beta, -search_alpha, 1);
                    }
                    s
                };

                if ctx.timed_out {
                    break;
                }

                completed = true;
                if let Some(root_idx) = root_moves.iter().position(|m| *m == mv) {
                    root_scores[root_idx] = score;
                }

                if score > depth_best_score {
                    depth_best_score = score;
                    depth_best_move = mv;
                }
                search_alpha = search_alpha.max(score);
                if search_alpha >= search_beta {
                    break;
                }
            }

            if ctx.timed_out || !completed {
                break 'iterative;
            }

            if !use_aspiration {
                best_score = depth_best_score;
                best_move = Some(depth_best_move);
                depth_reached = depth;
                break;
            }

            if depth_best_score <= alpha || depth_best_score >= beta {
                aspiration_window *= 2;
                if aspiration_window > ASPIRATION_MAX_WINDOW {
                    use_aspiration = false;
                    alpha = -INF_SCORE;
                    beta = INF_SCORE;
                    continue;
                }
                alpha = (best_score - aspiration_window).max(-INF_SCORE);
                beta = (best_score + aspiration_window).min(INF_SCORE);
                continue;
            }

            best_score = depth_best_score;
            best_move = Some(depth_best_move);
            depth_reached = depth;
            break;
        }

        #[cfg(feature = "logging")]
        log::debug!(
            "depth {depth} score {best_score} nodes {} best {}",
            ctx.nodes,
            best_move.map_or_else(|| "none".to_string(), |m| crate::notation::format_uci_move(&m)),
        );
    }

    if !ctx.timed_out
        && limits.randomness > 0
        && root_moves.len() > 1
        && best_score > -MATE_BOUND
        && best_score < MATE_BOUND
    {
        let candidates: Vec<Move> = root_moves
            .iter()
            .copied()
            .zip(root_scores.iter().copied())
            .filter(|(_, s)| *s > -INF_SCORE / 2 && *s >= best_score - limits.randomness)
            .map(|(m, _)| m)
            .collect();
        if candidates.len() > 1 {
            let pick = rand::random::<usize>() % candidates.len();
            best_move = Some(candidates[pick]);
        }
    }

    if best_score == -INF_SCORE {
        if let Some(mv) = best_move {
            let mut next = pos.clone();
            apply_move(&mut next, mv);
            best_score = -evaluate_relative(&next);
        } else {
            best_score = 0;
        }
    }

    SearchResult {
        best_move,
        score: best_score,
        depth_reached,
        nodes: ctx.nodes,
    }
}

fn score_moves_vec(
    pos: &Position,
    moves: &mut [Move],
    hash_move: Option<Move>,
    ordering: &OrderingState,
    ply: usize,
) {
    let mut list = MoveList::new();
    for &mv in moves.iter() {
        list.push(mv);
    }
    score_moves(pos, &mut list, hash_move, ordering, ply);
    for (slot, scored) in moves.iter_mut().zip(list.iter()) {
        slot.score = scored.score;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::parse_fen;
    use crate::notation::format_uci_move;
    use crate::tt::TranspositionTable;

    fn search(fen: &str, depth: u32) -> SearchResult {
        let pos = parse_fen(fen).unwrap();
        let mut tt = TranspositionTable::new();
        let mut ordering = OrderingState::new();
        let stop = AtomicBool::new(false);
        let limits = SearchLimits { depth, max_time_ms: 0, randomness: 0 };
        search_best_move(&pos, &limits, &mut tt, &mut ordering, &stop)
    }

    #[test]
    fn finds_mate_in_one() {
        let result = search("7k/6p1/6KQ/8/8/8/8/8 w - - 0 1", 4);
        let mv = result.best_move.unwrap();
        assert_eq!(format_uci_move(&mv), "h6g7");
    }

    #[test]
    fn finds_winning_queen_fork() {
        let result = search("4k3/8/8/8/3q4/8/8/3QK3 w - - 0 1", 4);
        let mv = result.best_move.unwrap();
        assert_eq!(format_uci_move(&mv), "d1d4");
    }

    #[test]
    fn captures_hanging_queen() {
        let result = search(
            "r1b1kbnr/pppp1ppp/2n5/4p3/3q4/5N2/PPPP1PPP/RNBQKB1R w KQkq - 0 5",
            4,
        );
        let mv = result.best_move.unwrap();
        assert_eq!(format_uci_move(&mv), "f3d4");
    }

    #[test]
    fn depth_zero_plus_quiescence_matches_static_eval_when_quiet() {
        let pos = Position::start();
        let mut tt = TranspositionTable::new();
        let mut ordering = OrderingState::new();
        let stop = AtomicBool::new(false);
        let mut ctx = SearchContext {
            tt: &mut tt,
            ordering: &mut ordering,
            stop: &stop,
            limits: SearchLimits::default(),
            start: Instant::now(),
            nodes: 0,
            path_keys: [0; MAX_HISTORY_PLY],
            path_len: 0,
            timed_out: false,
        };
        let score = quiescence(&mut ctx, &pos, -INF_SCORE, INF_SCORE, 0);
        assert_eq!(score, evaluate_relative(&pos));
    }
}
