//! `extalloc`のアロケータを対話的に操作するためのコマンド.
//!
//! 標準入力から一行ずつコマンドを読み込み、結果を標準出力に書き出す.
//! 利用可能なコマンドについては`extalloc::shell`モジュールを参照のこと.
extern crate extalloc;
#[macro_use]
extern crate slog;
extern crate slog_term;
#[macro_use]
extern crate trackable;

use clap::Parser;
use slog::{Discard, Drain, Logger};
use std::io;

use extalloc::memory::AllocatorBuilder;
use extalloc::render::{MemoryMapRenderer, DEFAULT_ROWS};
use extalloc::shell::Shell;

/// Interactive shell for the extent allocator.
#[derive(Debug, Parser)]
#[command(name = "extalloc")]
#[command(about = "Interactive shell for an extent-based best-fit memory allocator")]
struct Cli {
    /// Number of address units managed by the allocator.
    #[arg(long, default_value_t = 100)]
    capacity: usize,

    /// Number of rows used by the `mem` command.
    #[arg(long, default_value_t = DEFAULT_ROWS)]
    rows: usize,

    /// Emits allocator logs to stderr.
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let logger = if cli.verbose {
        let decorator = slog_term::PlainSyncDecorator::new(io::stderr());
        let drain = slog_term::FullFormat::new(decorator).build().fuse();
        Logger::root(drain, o!())
    } else {
        Logger::root(Discard, o!())
    };
    info!(logger, "Starts shell"; "capacity" => cli.capacity, "rows" => cli.rows);

    let allocator = track_try_unwrap!(AllocatorBuilder::new()
        .logger(logger.clone())
        .build(cli.capacity));
    let renderer = track_try_unwrap!(MemoryMapRenderer::new(cli.rows));

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut shell = Shell::new(allocator, renderer, stdout.lock());
    track_try_unwrap!(shell.run(stdin.lock()));

    let metrics = shell.allocator().metrics();
    let (best_fit, fragmented) = metrics.allocations();
    info!(logger, "Stops shell";
          "best_fit_allocations" => best_fit,
          "fragmented_allocations" => fragmented,
          "free_units" => metrics.free_units());
}
