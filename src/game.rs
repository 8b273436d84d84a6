use crate::board::BitBoard;
use crate::evaluator::Evaluator;
use crate::player::Player;
use crate::search::{self, EngineError};
use crate::state::State;
use tracing::{debug, warn};

pub const USER: usize = 0;
pub const COMPUTER: usize = 1;

/// 既定の探索深さ
pub const DEFAULT_DEPTH: usize = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Finished,
}

/// 対局セッション
/// players[0] がユーザー、players[1] がコンピュータ、idx が現在の手番
pub struct Game {
    board: BitBoard,
    players: [Player; 2],
    idx: usize,
    depth: usize,
    evaluator: Box<dyn Evaluator>,
}

impl Game {
    pub fn new(
        user_token: Player,
        computer_token: Player,
        first_idx: usize,
        depth: usize,
        evaluator: Box<dyn Evaluator>,
    ) -> Self {
        debug_assert!(user_token != computer_token, "両者のトークンが同一です");
        debug_assert!(first_idx < 2, "手番インデックスが範囲外です");

        Game {
            board: BitBoard::new(),
            players: [user_token, computer_token],
            idx: first_idx,
            depth,
            evaluator,
        }
    }

    pub fn board(&self) -> &BitBoard {
        &self.board
    }

    pub fn current_index(&self) -> usize {
        self.idx
    }

    pub fn current_player(&self) -> Player {
        self.players[self.idx]
    }

    pub fn player(&self, idx: usize) -> Player {
        self.players[idx]
    }

    pub fn switch_player(&mut self) {
        self.idx = (self.idx + 1) & 1;
    }

    pub fn move_is_possible(&self, pos: usize) -> bool {
        pos < 64 && self.board.is_legal_move(pos, self.players[self.idx])
    }

    /// 現在の手番で着手を適用する（盤面を差し替えるだけで手番は変えない）
    pub fn apply_move(&mut self, pos: usize) {
        self.board = self.board.apply(pos, self.players[self.idx]);
    }

    pub fn has_move(&self, idx: usize) -> bool {
        self.board.mobility(self.players[idx]) > 0
    }

    /// 両者に合法手がなくなった時点で対局終了
    pub fn status(&self) -> GameStatus {
        if self.board.is_game_over() {
            GameStatus::Finished
        } else {
            GameStatus::InProgress
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status() == GameStatus::Finished
    }

    /// 現在の手番の最善手を固定深さ探索で決める
    ///
    /// 現局面から深さ depth の葉を全列挙し、バッチ評価のスコアが
    /// 厳密最大の葉（同点は生成順で最初のもの）へ向かう根の手を
    /// 経路復元で求める。深さ上限の手前で全分岐が詰まり葉が一つも
    /// 残らなかった場合は、評価も経路復元も行わず最初の合法手に
    /// 退避する（合法手すら無ければ None でパス）
    pub fn choose_move(&self) -> Result<Option<usize>, EngineError> {
        let root = State::new(self.board, self.players[self.idx]);
        let leaves = search::expand(&root, self.depth);

        if leaves.is_empty() {
            let fallback = root.legal_moves().into_iter().next();
            warn!(?fallback, "葉が残らなかったため即時の合法手に退避します");
            return Ok(fallback);
        }

        let scores = self.evaluator.evaluate(&leaves)?;
        if scores.len() != leaves.len() {
            return Err(EngineError::ScoreCountMismatch);
        }

        let best = search::pick_best(&scores).ok_or(EngineError::ScoreCountMismatch)?;
        let target = &leaves[best];
        let pos = search::find_move_to(&root, target, self.depth)?;

        debug!(
            leaf_count = leaves.len(),
            best_score = scores[best],
            opponent_score = target.opponent_score(),
            pos,
            "着手を決定しました"
        );

        Ok(Some(pos))
    }

    /// コンピュータの1手: 着手を決めて盤面に適用する
    /// 返り値は実際に打った位置（打てなければ None）
    pub fn play_computer_turn(&mut self) -> Result<Option<usize>, EngineError> {
        match self.choose_move()? {
            Some(pos) => {
                self.apply_move(pos);
                Ok(Some(pos))
            }
            None => Ok(None),
        }
    }

    /// 最終結果: (ユーザーの石数, コンピュータの石数)
    pub fn result_counts(&self) -> (u32, u32) {
        (
            self.board.count_discs(self.players[USER]),
            self.board.count_discs(self.players[COMPUTER]),
        )
    }

    #[cfg(test)]
    pub fn set_board(&mut self, board: BitBoard) {
        self.board = board;
    }
}
