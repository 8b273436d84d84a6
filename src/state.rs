use crate::board::BitBoard;
use crate::player::Player;

/// 盤面と手番のペア（探索中の局面）
/// 値型であり一度作られたら変更されない
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub board: BitBoard,
    pub player: Player,
}

impl State {
    pub fn new(board: BitBoard, player: Player) -> Self {
        State { board, player }
    }

    /// 手番プレイヤーの合法手を行優先順で返す
    pub fn legal_moves(&self) -> Vec<usize> {
        self.board.get_legal_move_positions(self.player)
    }

    /// 着手を適用し手番を入れ替えた子局面を返す
    pub fn next(&self, pos: usize) -> State {
        State {
            board: self.board.apply(pos, self.player),
            player: self.player.opponent(),
        }
    }

    /// 手番プレイヤーの石数
    /// この設計の葉評価はこの生の石数のみを使う（位置評価や機動力は見ない）
    #[inline]
    pub fn own_score(&self) -> i32 {
        self.board.count_discs(self.player) as i32
    }

    /// 相手プレイヤーの石数
    #[inline]
    pub fn opponent_score(&self) -> i32 {
        self.board.count_discs(self.player.opponent()) as i32
    }
}
