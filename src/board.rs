use crate::player::Player;
use std::fmt;

const DEFAULT_BLACK: u64 = 0x0000000810000000; // 初期配置の黒石
const DEFAULT_WHITE: u64 = 0x0000001008000000; // 初期配置の白石

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BitBoard {
    pub black: u64,
    pub white: u64,
}

impl BitBoard {
    // 各方向でのシフト量とマスク (shift, mask, is_forward)
    // シフト量: ビットシフト量
    // マスク: 盤面の端からのはみ出しを防ぐマスク
    // is_forward: trueなら左上から右下へ（<<）、falseなら右下から左上へ（>>）
    const SHIFTS: [(u32, u64, bool); 8] = [
        (1, 0x7f7f7f7f7f7f7f7f, false),  // 左
        (1, 0xfefefefefefefefe, true),   // 右
        (8, 0xffffffffffffff00, false),  // 上
        (8, 0x00ffffffffffffff, true),   // 下
        (9, 0x7f7f7f7f7f7f7f00, false),  // 左上
        (7, 0xfefefefefefefe00, false),  // 右上
        (7, 0x007f7f7f7f7f7f7f, true),   // 左下
        (9, 0x00fefefefefefefe, true),   // 右下
    ];

    /// 新しいビットボードを初期配置で作成
    pub fn new() -> Self {
        BitBoard {
            black: DEFAULT_BLACK,
            white: DEFAULT_WHITE,
        }
    }

    /// 石が一つもない空の盤面を作成（テスト用フィクスチャ）
    #[cfg(test)]
    pub fn empty() -> Self {
        BitBoard { black: 0, white: 0 }
    }

    /// 指定位置に石を置く
    /// すでに石がある場合でも両プレーンの排他性は保たれる
    #[inline(always)]
    pub fn set_disc(&mut self, pos: usize, player: Player) {
        debug_assert!(pos < 64, "ビット位置が範囲外です");
        let bit = 1u64 << pos;

        match player {
            Player::Black => {
                self.black |= bit;
                self.white &= !bit;
            }
            Player::White => {
                self.white |= bit;
                self.black &= !bit;
            }
        }
    }

    /// 石を置いてひっくり返した新しい盤面を返す（純粋関数）
    /// 探索中は共通の祖先盤面から大量の仮想盤面を派生させるため、
    /// 自身は一切変更しない
    #[inline(always)]
    pub fn apply(&self, pos: usize, player: Player) -> BitBoard {
        debug_assert!(pos < 64, "ビット位置が範囲外です");

        let flips = self.compute_flips(pos, player);

        let mut next = *self;
        match player {
            Player::Black => {
                next.black |= flips;
                next.white &= !flips;
            }
            Player::White => {
                next.white |= flips;
                next.black &= !flips;
            }
        }
        next.set_disc(pos, player);

        next
    }

    /// ひっくり返し計算
    /// 8方向それぞれについて、相手石の連続列が自分の石で閉じられている
    /// 場合のみその列をひっくり返し対象に加える
    #[inline(always)]
    pub fn compute_flips(&self, pos: usize, player: Player) -> u64 {
        let (my, opp) = match player {
            Player::Black => (self.black, self.white),
            Player::White => (self.white, self.black),
        };

        let mut flips = 0u64;
        let row = pos / 8;
        let col = pos % 8;

        // 8方向をチェック
        let directions = [
            (-1, -1),
            (-1, 0),
            (-1, 1), // 上左、上、上右
            (0, -1),
            (0, 1), // 左、右
            (1, -1),
            (1, 0),
            (1, 1), // 下左、下、下右
        ];

        for &(dr, dc) in &directions {
            let mut direction_flips = 0u64;
            let mut found_opponent = false;
            let mut r = row as i32 + dr;
            let mut c = col as i32 + dc;

            while r >= 0 && r < 8 && c >= 0 && c < 8 {
                let current_pos = (r * 8 + c) as usize;
                let current_bit = 1u64 << current_pos;

                if (opp & current_bit) != 0 {
                    // 相手の石を発見
                    direction_flips |= current_bit;
                    found_opponent = true;
                } else if (my & current_bit) != 0 {
                    // 自分の石を発見
                    if found_opponent {
                        flips |= direction_flips; // この方向の石をひっくり返す
                    }
                    break;
                } else {
                    // 空きマス
                    break;
                }

                r += dr;
                c += dc;
            }
        }

        flips
    }

    /// 合法手かどうかをチェック
    /// 相手の石を1つ以上ひっくり返せる空きマスのみが合法
    #[inline(always)]
    pub fn is_legal_move(&self, pos: usize, player: Player) -> bool {
        debug_assert!(pos < 64, "ビット位置が範囲外です");

        // すでに石が置かれていたら不正
        let pos_bit = 1u64 << pos;
        if (self.black | self.white) & pos_bit != 0 {
            return false;
        }

        // 隣接する相手の石がなければ不正
        let opp = match player {
            Player::Black => self.white,
            Player::White => self.black,
        };

        let adjacent_mask = Self::get_adjacent_mask(pos);
        if adjacent_mask & opp == 0 {
            return false;
        }

        // 実際にひっくり返せるか詳細チェック
        self.compute_flips(pos, player) != 0
    }

    /// 指定位置の周囲8方向のマスクを計算
    #[inline(always)]
    fn get_adjacent_mask(pos: usize) -> u64 {
        let pos_bit = 1u64 << pos;
        let mut mask = 0;

        for &(shift, dir_mask, is_forward) in Self::SHIFTS.iter() {
            if is_forward {
                mask |= (pos_bit << shift) & dir_mask;
            } else {
                mask |= (pos_bit >> shift) & dir_mask;
            }
        }

        mask
    }

    /// 合法手の一覧をビットボードとして取得
    #[inline(always)]
    pub fn get_legal_moves(&self, player: Player) -> u64 {
        let mut legal_moves = 0u64;
        let occupied = self.black | self.white;

        for pos in 0..64 {
            let pos_bit = 1u64 << pos;

            if (occupied & pos_bit) != 0 {
                continue;
            }

            if self.compute_flips(pos, player) != 0 {
                legal_moves |= pos_bit;
            }
        }

        legal_moves
    }

    /// 合法手の一覧を位置のベクターとして取得
    /// 行優先（row*8+col の昇順）の列挙順は探索とタイブレークの
    /// 正準順序として扱う
    pub fn get_legal_move_positions(&self, player: Player) -> Vec<usize> {
        let legal_moves = self.get_legal_moves(player);
        let mut positions = Vec::new();

        for pos in 0..64 {
            let bit = 1u64 << pos;
            if (legal_moves & bit) != 0 {
                positions.push(pos);
            }
        }

        positions
    }

    /// 指定位置の石を取得
    #[inline]
    pub fn get_disc(&self, pos: usize) -> Option<Player> {
        if pos >= 64 {
            return None;
        }

        let bit = 1u64 << pos;

        if (self.black & bit) != 0 {
            Some(Player::Black)
        } else if (self.white & bit) != 0 {
            Some(Player::White)
        } else {
            None
        }
    }

    /// 指定位置の石を行と列の形式で取得
    pub fn get_disc_at(&self, row: usize, col: usize) -> Option<Player> {
        if row >= 8 || col >= 8 {
            return None;
        }
        self.get_disc(row * 8 + col)
    }

    /// 石の数をカウント
    #[inline]
    pub fn count_discs(&self, player: Player) -> u32 {
        match player {
            Player::Black => self.black.count_ones(),
            Player::White => self.white.count_ones(),
        }
    }

    /// 両プレイヤーの石の数を取得
    pub fn count_all_discs(&self) -> (u32, u32) {
        (self.black.count_ones(), self.white.count_ones())
    }

    /// 合法手の数
    #[inline]
    pub fn mobility(&self, player: Player) -> u32 {
        self.get_legal_moves(player).count_ones()
    }

    /// ゲーム終了判定
    /// 両者に合法手がないことが唯一の終了条件（盤面が埋まれば自動的に成立）
    #[inline]
    pub fn is_game_over(&self) -> bool {
        if self.black | self.white == !0u64 {
            return true;
        }

        self.get_legal_moves(Player::Black) == 0 && self.get_legal_moves(Player::White) == 0
    }

    /// 勝者を返す
    pub fn get_winner(&self) -> Option<Player> {
        let black_count = self.count_discs(Player::Black);
        let white_count = self.count_discs(Player::White);

        if black_count == white_count {
            None // 引き分け
        } else if black_count > white_count {
            Some(Player::Black)
        } else {
            Some(Player::White)
        }
    }
}

impl Default for BitBoard {
    fn default() -> Self {
        BitBoard::new()
    }
}

impl fmt::Display for BitBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  0 1 2 3 4 5 6 7")?;

        for row in 0..8 {
            write!(f, "{}|", row)?;

            for col in 0..8 {
                match self.get_disc_at(row, col) {
                    Some(player) => write!(f, "{}|", player.to_char())?,
                    None => write!(f, " |")?,
                }
            }

            writeln!(f)?;
        }

        let (black_count, white_count) = self.count_all_discs();
        writeln!(
            f,
            "黒({}): {} 白({}): {}",
            Player::Black.to_char(),
            black_count,
            Player::White.to_char(),
            white_count
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::thread_rng;

    /// 'X'/'O'/'-' の8行から盤面を組み立てるテスト用ヘルパー
    fn from_rows(rows: [&str; 8]) -> BitBoard {
        let mut board = BitBoard::empty();
        for (row, line) in rows.iter().enumerate() {
            assert_eq!(line.len(), 8);
            for (col, ch) in line.chars().enumerate() {
                match ch {
                    'X' => board.set_disc(row * 8 + col, Player::Black),
                    'O' => board.set_disc(row * 8 + col, Player::White),
                    '-' => {}
                    _ => panic!("unexpected cell char: {}", ch),
                }
            }
        }
        board
    }

    #[test]
    fn test_initial_placement() {
        let board = BitBoard::new();
        assert_eq!(board.get_disc_at(3, 3), Some(Player::White));
        assert_eq!(board.get_disc_at(4, 4), Some(Player::White));
        assert_eq!(board.get_disc_at(3, 4), Some(Player::Black));
        assert_eq!(board.get_disc_at(4, 3), Some(Player::Black));
        assert_eq!(board.count_all_discs(), (2, 2));
        assert_eq!(board.mobility(Player::Black), 4);
    }

    #[test]
    fn test_set_then_get() {
        let mut board = BitBoard::empty();
        board.set_disc(0, Player::Black);
        assert_eq!(board.get_disc(0), Some(Player::Black));

        // 同じマスに上書きしても両プレーンが排他であること
        board.set_disc(0, Player::White);
        assert_eq!(board.get_disc(0), Some(Player::White));
        assert_eq!(board.black & board.white, 0);
    }

    #[test]
    fn test_opening_move_flips_one_disc() {
        let board = BitBoard::new();
        assert!(board.is_legal_move(2 * 8 + 3, Player::Black));

        let next = board.apply(2 * 8 + 3, Player::Black);
        assert_eq!(next.get_disc_at(2, 3), Some(Player::Black));
        assert_eq!(next.get_disc_at(3, 3), Some(Player::Black));
        assert_eq!(next.count_discs(Player::Black), 4);
        assert_eq!(next.count_discs(Player::White), 1);

        // apply は純粋関数であり元の盤面は変化しない
        assert_eq!(board, BitBoard::new());
    }

    #[test]
    fn test_apply_captures_all_eight_directions() {
        // (4,4) の周囲8マスが白、その外側8マスが黒の放射状配置
        let board = from_rows([
            "--------",
            "--------",
            "--X-X-X-",
            "---OOO--",
            "--XO-OX-",
            "---OOO--",
            "--X-X-X-",
            "--------",
        ]);

        let pos = 4 * 8 + 4;
        assert!(board.is_legal_move(pos, Player::Black));
        let next = board.apply(pos, Player::Black);

        assert_eq!(next.count_discs(Player::White), 0);
        assert_eq!(next.count_discs(Player::Black), 17);
        assert_eq!(next.black & next.white, 0);
    }

    #[test]
    fn test_run_without_terminator_is_illegal() {
        // 相手石の列が盤端まで続き自分の石で閉じられていない
        let board = from_rows([
            "OOOOOOO-",
            "--------",
            "--------",
            "--------",
            "--------",
            "--------",
            "--------",
            "--------",
        ]);
        assert!(!board.is_legal_move(7, Player::Black));
        assert_eq!(board.get_legal_moves(Player::Black), 0);
    }

    #[test]
    fn test_adjacent_own_disc_does_not_qualify() {
        // 隣が直接自分の石（相手石の列の長さ0）は着手不可
        let board = from_rows([
            "X-------",
            "--------",
            "--------",
            "--------",
            "--------",
            "--------",
            "--------",
            "--------",
        ]);
        assert!(!board.is_legal_move(1, Player::Black));
    }

    #[test]
    fn test_legal_moves_are_row_major_and_legal() {
        let board = BitBoard::new();
        let positions = board.get_legal_move_positions(Player::Black);
        assert_eq!(positions, vec![2 * 8 + 3, 3 * 8 + 2, 4 * 8 + 5, 5 * 8 + 4]);

        for &pos in &positions {
            assert!(board.is_legal_move(pos, Player::Black));
        }
    }

    #[test]
    fn test_legal_apply_gains_at_least_two_discs() {
        let board = BitBoard::new();
        for &pos in &board.get_legal_move_positions(Player::Black) {
            let next = board.apply(pos, Player::Black);
            let gained = next.count_discs(Player::Black) - board.count_discs(Player::Black);
            assert!(gained >= 2, "pos {} gained {}", pos, gained);
        }
    }

    #[test]
    fn test_random_playout_keeps_planes_disjoint() {
        let mut rng = thread_rng();

        for _ in 0..20 {
            let mut board = BitBoard::new();
            let mut player = Player::Black;
            let mut pass_count = 0;

            while !board.is_game_over() && pass_count < 2 {
                let moves = board.get_legal_move_positions(player);
                match moves.choose(&mut rng) {
                    Some(&pos) => {
                        pass_count = 0;
                        board = board.apply(pos, player);
                        assert_eq!(board.black & board.white, 0);
                    }
                    None => pass_count += 1,
                }
                player = player.opponent();
            }
        }
    }

    #[test]
    fn test_game_over_with_empty_cells_left() {
        // 白が全滅した時点でどちらにも合法手がない
        let board = from_rows([
            "X-------",
            "--------",
            "--------",
            "--------",
            "--------",
            "--------",
            "--------",
            "--------",
        ]);
        assert!(board.is_game_over());
        assert_eq!(board.get_winner(), Some(Player::Black));
    }

    #[test]
    fn test_display_renders_token_chars() {
        let rendered = format!("{}", BitBoard::new());

        // 盤面の記号はプレイヤートークンの文字表現を経由する
        assert!(rendered.contains("3| | | |O|X| | | |"));
        assert!(rendered.contains("4| | | |X|O| | | |"));
        assert!(rendered.contains("黒(X): 2 白(O): 2"));
    }

    #[test]
    fn test_winner_on_tie_is_none() {
        let board = from_rows([
            "X-------",
            "O-------",
            "--------",
            "--------",
            "--------",
            "--------",
            "--------",
            "--------",
        ]);
        assert_eq!(board.get_winner(), None);
    }
}
