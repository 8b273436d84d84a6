mod board;
mod evaluator;
mod game;
mod player;
mod search;
mod state;

use anyhow::{Context, Result};
use evaluator::{Evaluator, ParallelEvaluator, SequentialEvaluator};
use game::{Game, COMPUTER, DEFAULT_DEPTH, USER};
use player::Player;
use rand::seq::SliceRandom;
use rand::thread_rng;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // コマンドライン引数をチェック
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "quick-game" {
        return run_quick_game();
    }

    // "sequential" 指定で逐次バックエンドに切り替える（結果は並列と同一）
    let sequential = args.iter().skip(1).any(|arg| arg == "sequential");
    run_cli_game(sequential)
}

fn run_cli_game(sequential: bool) -> Result<()> {
    // タイトル表示
    println!("==========================");
    println!("   バッチ オセロ");
    println!("==========================");

    let depth = select_search_depth();

    // 評価バックエンドの確保はセッション開始時に一度だけ行う
    let evaluator: Box<dyn Evaluator> = if sequential {
        println!("逐次評価バックエンドを使用します。");
        Box::new(SequentialEvaluator::new())
    } else {
        Box::new(ParallelEvaluator::new().context("評価バックエンドの初期化に失敗しました")?)
    };

    // ユーザーが黒(X)で先手
    let mut game = Game::new(Player::Black, Player::White, USER, depth, evaluator);

    println!("\nゲーム開始！ あなたは黒(X)です。");

    // ゲームループ
    while !game.is_finished() {
        println!("{}", game.board());

        if game.current_index() == USER && game.has_move(USER) {
            let pos = read_user_move(&game);
            println!(
                "{}を({},{})に置きます",
                game.player(USER).name(),
                pos / 8,
                pos % 8
            );
            game.apply_move(pos);
        } else if game.current_index() == COMPUTER && game.has_move(COMPUTER) {
            let played = game
                .play_computer_turn()
                .context("コンピュータの着手決定に失敗しました")?;
            match played {
                Some(pos) => println!(
                    "{}(コンピュータ)は({},{})に置きました",
                    game.player(COMPUTER).name(),
                    pos / 8,
                    pos % 8
                ),
                None => println!("{}(コンピュータ)はパスします", game.player(COMPUTER).name()),
            }
        } else {
            // 手番側に合法手がなければパスして手番だけ入れ替える
            println!("{}は打てる場所がないためパスします", game.current_player().name());
        }

        game.switch_player();
    }

    println!("{}", game.board());
    display_result(&game);

    Ok(())
}

/// 探索の深さを選択する（空入力で既定値）
fn select_search_depth() -> usize {
    loop {
        print!("探索の深さを入力してください (1-6, 空入力で{}): ", DEFAULT_DEPTH);
        io::stdout().flush().ok();

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => return DEFAULT_DEPTH,
            Ok(_) => {
                let input = input.trim();
                if input.is_empty() {
                    return DEFAULT_DEPTH;
                }

                match input.parse::<usize>() {
                    Ok(depth) if (1..=6).contains(&depth) => return depth,
                    Ok(_) => println!("深さは 1-6 の範囲で入力してください。"),
                    Err(_) => println!("無効な入力です。数字を入力してください。"),
                }
            }
            Err(_) => println!("入力エラー。もう一度入力してください。"),
        }
    }
}

/// ユーザーの着手を読み取る（不正な手は再入力）
fn read_user_move(game: &Game) -> usize {
    println!("行(0-7) 列(0-7) の形式で入力。例: 3 2");

    loop {
        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => {
                println!("ゲームを終了します。");
                std::process::exit(0);
            }
            Ok(_) => {
                let input = input.trim().to_lowercase();

                match input.as_str() {
                    "q" | "quit" | "exit" => {
                        println!("ゲームを終了します。");
                        std::process::exit(0);
                    }
                    "h" | "help" | "?" => {
                        print!("現在の合法手: ");
                        for pos in game
                            .board()
                            .get_legal_move_positions(game.current_player())
                        {
                            print!("({},{}) ", pos / 8, pos % 8);
                        }
                        println!();
                        continue;
                    }
                    _ => {}
                }

                let parts: Vec<&str> = input.split_whitespace().collect();
                if parts.len() != 2 {
                    println!("無効な入力形式です。行(0-7) 列(0-7) の形式で入力してください。");
                    continue;
                }

                let row: std::result::Result<usize, _> = parts[0].parse();
                let col: std::result::Result<usize, _> = parts[1].parse();

                if let (Ok(row), Ok(col)) = (row, col) {
                    if row >= 8 || col >= 8 {
                        println!("無効な座標です。行と列は0-7の範囲で指定してください。");
                        continue;
                    }

                    let pos = row * 8 + col;
                    if game.move_is_possible(pos) {
                        return pos;
                    }

                    println!("そこには置けません。別の場所を選んでください。");
                    println!("'h'または'help'と入力すると合法手の一覧を表示します。");
                } else {
                    println!("無効な入力です。数字を入力してください。");
                }
            }
            Err(_) => println!("入力エラー。もう一度入力してください。"),
        }
    }
}

/// 対局結果の表示
fn display_result(game: &Game) {
    let (user_count, computer_count) = game.result_counts();

    println!("\n==========================");
    println!("      ゲーム終了");
    println!("==========================");

    if user_count > computer_count {
        println!("あなたの勝ちです！");
    } else if user_count < computer_count {
        println!("あなたの負けです…");
    } else {
        println!("引き分けです！");
    }

    println!("結果: あなた({}) : コンピュータ({})", user_count, computer_count);
}

/// クイック対戦: コンピュータ(黒) vs ランダム(白)
/// パイプライン全体の動作確認用モード
fn run_quick_game() -> Result<()> {
    println!("==========================");
    println!("  クイック対戦テスト");
    println!("==========================");
    println!("コンピュータ(黒) vs ランダム(白) で対戦します...");

    let evaluator = ParallelEvaluator::new().context("評価バックエンドの初期化に失敗しました")?;

    // ここでは「ユーザー」枠にランダムプレイヤーが入る
    let mut game = Game::new(
        Player::White,
        Player::Black,
        COMPUTER,
        DEFAULT_DEPTH,
        Box::new(evaluator),
    );

    let mut rng = thread_rng();
    let mut move_count = 0;

    while !game.is_finished() {
        if game.current_index() == COMPUTER && game.has_move(COMPUTER) {
            let played = game
                .play_computer_turn()
                .context("コンピュータの着手決定に失敗しました")?;
            if let Some(pos) = played {
                move_count += 1;
                println!("黒: ({},{})", pos / 8, pos % 8);
            }
        } else if game.current_index() == USER && game.has_move(USER) {
            let moves = game.board().get_legal_move_positions(game.player(USER));
            if let Some(&pos) = moves.choose(&mut rng) {
                move_count += 1;
                game.apply_move(pos);
                println!("白: ({},{})", pos / 8, pos % 8);
            }
        }

        game.switch_player();
    }

    println!("\n{}", game.board());
    println!("総手数: {}", move_count);

    let (random_count, engine_count) = game.result_counts();
    match game.board().get_winner() {
        Some(Player::Black) => println!("コンピュータの勝ち ({} : {})", engine_count, random_count),
        Some(Player::White) => println!("ランダムの勝ち ({} : {})", random_count, engine_count),
        None => println!("引き分け ({} : {})", engine_count, random_count),
    }

    Ok(())
}
