//! Goban: play Go with strict liberty, capture and ko rules.
//!
//! ## Usage
//!
//! - `goban` - Show a demo
//! - `goban play` - Two players take turns on this terminal
//! - `goban serve` - Pair up TCP clients and referee their games
//! - `goban http` - Serve games over HTTP/JSON
//!
//! Set `RUST_LOG` (e.g. `RUST_LOG=goban=debug`) for move-by-move logging.

use std::io;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use goban::board::{apply_move, board_snapshot, create_board};
use goban::constants::{DEFAULT_HTTP_PORT, DEFAULT_KOMI, DEFAULT_PORT, DEFAULT_SIZE};
use goban::game::Game;
use goban::grid::{Color, Move};
use goban::http::{self, HttpConfig};
use goban::protocol::run_local;
use goban::server::{Server, ServerConfig};

/// Goban: a Go rule engine with a line-protocol front end
#[derive(Parser)]
#[command(name = "goban")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone, Copy)]
struct BoardArgs {
    /// Board size (NxN)
    #[arg(short, long, default_value_t = DEFAULT_SIZE)]
    size: usize,

    /// Komi (recorded, not scored)
    #[arg(short, long, default_value_t = DEFAULT_KOMI)]
    komi: f32,
}

#[derive(Args, Clone, Copy)]
struct GameArgs {
    #[command(flatten)]
    board: BoardArgs,

    /// Print each point's liberty count next to its stone
    #[arg(long)]
    liberties: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a local game, both colors on this terminal
    Play(GameArgs),
    /// Start the TCP server; every two connections form a game
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        #[command(flatten)]
        game: GameArgs,
    },
    /// Start the HTTP/JSON server
    Http {
        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_HTTP_PORT)]
        port: u16,

        #[command(flatten)]
        board: BoardArgs,
    },
    /// Run a short demo of captures and ko
    Demo,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Play(args)) => {
            let mut game = Game::new(args.board.size, args.board.komi)?;
            run_local(&mut game, io::stdin().lock(), io::stdout(), args.liberties)
        }
        Some(Commands::Serve { port, game }) => {
            let mut server = Server::bind(ServerConfig {
                port,
                size: game.board.size,
                komi: game.board.komi,
                show_liberties: game.liberties,
            })?;
            server.run()
        }
        Some(Commands::Http { port, board }) => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(http::serve(HttpConfig {
                port,
                size: board.size,
                komi: board.komi,
            }))
        }
        Some(Commands::Demo) | None => run_demo(),
    }
}

fn run_demo() -> Result<()> {
    println!("Goban: Go rule engine\n");

    println!("=== Capture ===");
    let mut board = create_board(5)?;
    let moves = [
        Move::new(2, 2, Color::White),
        Move::new(1, 2, Color::Black),
        Move::new(3, 2, Color::Black),
        Move::new(2, 1, Color::Black),
        Move::new(2, 3, Color::Black),
    ];
    for mv in moves {
        println!("{mv}: {}", apply_move(&mut board, mv));
    }
    println!("{}", board_snapshot(&board).render(true));

    println!("=== Ko ===");
    let mut board = create_board(5)?;
    let setup = [
        Move::new(1, 0, Color::Black),
        Move::new(2, 0, Color::White),
        Move::new(0, 1, Color::Black),
        Move::new(1, 1, Color::White),
        Move::new(1, 2, Color::Black),
        Move::new(3, 1, Color::White),
        Move::new(4, 4, Color::Black),
        Move::new(2, 2, Color::White),
    ];
    for mv in setup {
        apply_move(&mut board, mv);
    }
    println!("{board}");
    for mv in [Move::new(2, 1, Color::Black), Move::new(1, 1, Color::White)] {
        println!("{mv}: {}", apply_move(&mut board, mv));
    }
    println!("{board}");
    Ok(())
}
