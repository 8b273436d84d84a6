use crate::state::State;
use rayon::prelude::*;
use thiserror::Error;

/// 評価バックエンドのエラー
#[derive(Error, Debug)]
pub enum EvaluatorError {
    /// バックエンド資源の確保・実行に失敗した（致命的）
    #[error("評価バックエンドの失敗: {0}")]
    Backend(String),
}

/// 葉局面のバッチ評価の境界
///
/// 出力は入力と同じ長さ・同じ順序で、i 番目のスコアが i 番目の葉に
/// 対応する。スコアはその葉で手番を持つプレイヤーの石数そのもので、
/// ミニマックスの逆伝播は行わない。実行戦略（逐次・並列）が違っても
/// 同じ入力には同じ出力を返さなければならない。空の入力には空の
/// 出力を返す
pub trait Evaluator {
    fn evaluate(&self, leaves: &[State]) -> Result<Vec<i32>, EvaluatorError>;
}

/// 逐次実行の参照実装（テストと比較検証用）
#[derive(Default)]
pub struct SequentialEvaluator;

impl SequentialEvaluator {
    pub fn new() -> Self {
        SequentialEvaluator
    }
}

impl Evaluator for SequentialEvaluator {
    fn evaluate(&self, leaves: &[State]) -> Result<Vec<i32>, EvaluatorError> {
        Ok(leaves.iter().map(|leaf| leaf.own_score()).collect())
    }
}

/// rayon のスレッドプールでバッチを並列評価するバックエンド
///
/// プールは構築時に確保し、drop で解放する。グローバルな共有
/// インスタンスは持たず、利用側が所有権ごと受け取る
pub struct ParallelEvaluator {
    pool: rayon::ThreadPool,
}

impl ParallelEvaluator {
    /// 既定のスレッド数でプールを確保する
    pub fn new() -> Result<Self, EvaluatorError> {
        Self::with_threads(None)
    }

    pub fn with_threads(threads: Option<usize>) -> Result<Self, EvaluatorError> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(num) = threads {
            builder = builder.num_threads(num);
        }

        let pool = builder
            .build()
            .map_err(|e| EvaluatorError::Backend(e.to_string()))?;

        Ok(ParallelEvaluator { pool })
    }
}

impl Evaluator for ParallelEvaluator {
    fn evaluate(&self, leaves: &[State]) -> Result<Vec<i32>, EvaluatorError> {
        // par_iter は索引順を保って収集するため出力順は入力順と一致する
        Ok(self
            .pool
            .install(|| leaves.par_iter().map(|leaf| leaf.own_score()).collect()))
    }
}
