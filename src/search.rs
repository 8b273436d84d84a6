use crate::board::BitBoard;
use crate::evaluator::EvaluatorError;
use crate::state::State;
use thiserror::Error;
use tracing::debug;

/// 探索・着手決定パイプラインのエラー
#[derive(Error, Debug)]
pub enum EngineError {
    /// 評価バックエンドの失敗（致命的、リトライしない）
    #[error("評価バックエンドでエラーが発生しました: {0}")]
    Evaluator(#[from] EvaluatorError),

    /// 評価結果の件数が葉の件数と一致しない（内部不整合）
    #[error("評価結果の件数が葉の件数と一致しません")]
    ScoreCountMismatch,

    /// どの合法手の部分木にも目標局面が見つからない（内部不整合）
    #[error("経路復元に失敗しました: 目標局面がどの合法手の部分木にも存在しません")]
    RetraceFailed,
}

/// 根局面から深さ depth でちょうど到達できる全ての葉局面を列挙する
///
/// depth が 0 の局面はそのまま葉として収集される。合法手が一つもない
/// 局面は子を生まず、その分岐は葉を残さずに消える（探索内部では
/// パスを扱わない）。従って葉は常に厳密な合法手の連鎖だけで到達され、
/// 一回の呼び出しで集まる葉は全て同じ手番を持つ
pub fn expand(root: &State, depth: usize) -> Vec<State> {
    let mut leaves = Vec::new();
    collect_leaves(root, depth, &mut leaves);
    debug!(depth, leaf_count = leaves.len(), "探索木を展開しました");
    leaves
}

fn collect_leaves(state: &State, remaining: usize, leaves: &mut Vec<State>) {
    if remaining == 0 {
        leaves.push(*state);
        return;
    }

    for pos in state.legal_moves() {
        collect_leaves(&state.next(pos), remaining - 1, leaves);
    }
}

/// 厳密な最大スコアの添字を返す（同点は最初の出現が勝つ）
pub fn pick_best(scores: &[i32]) -> Option<usize> {
    let mut best_index = None;
    let mut best_score = i32::MIN;

    for (index, &score) in scores.iter().enumerate() {
        if best_index.is_none() || score > best_score {
            best_score = score;
            best_index = Some(index);
        }
    }

    best_index
}

/// 深さ上限付きDFSで target と同じ盤面に到達できるかを調べる
/// 比較は盤面ビットのみで手番は見ない
fn retrace(state: &State, target: &BitBoard, depth: usize, max_depth: usize) -> bool {
    if depth == max_depth {
        return false;
    }
    if state.board == *target {
        return true;
    }

    for pos in state.legal_moves() {
        if retrace(&state.next(pos), target, depth + 1, max_depth) {
            return true;
        }
    }

    false
}

/// 目標の葉局面へ到達できる根の合法手を求める
///
/// 根の合法手を行優先順に試し、部分木に目標盤面を含む最初の手を
/// 返す。複数の手が同一盤面へ合流する場合も最初の手だけが選ばれる。
/// 目標が expand で得た葉でない場合は内部不整合として失敗する
pub fn find_move_to(root: &State, target: &State, max_depth: usize) -> Result<usize, EngineError> {
    for pos in root.legal_moves() {
        let child = root.next(pos);
        if retrace(&child, &target.board, 0, max_depth) {
            return Ok(pos);
        }
    }

    Err(EngineError::RetraceFailed)
}
