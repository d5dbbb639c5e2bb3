//! Extent Allocator.
//!
//! `extalloc`は、教育用のOSシミュレーションのための、区間(extent)ベースのメモリアロケータ.
//!
//! # 特徴
//!
//! - 固定長のアドレス空間を、複数のプロセスと"空き領域"の間で分割管理する
//! - 割当はBestFit方式:
//!   - 要求サイズを満たす空き領域の内で、最もサイズの小さいものが選択される
//!   - 単一の空き領域では要求を満たせないが、空き容量の合計は十分な場合には、
//!     大きい順に空き領域を取得して、複数の部分領域を割り当てる
//! - 解放時には、隣接する空き領域群が一つに結合される
//! - 一つのアロケータは一つの[Lock]によって保護され、複数スレッドから並行に利用可能
//! - 割当結果の検証用に、各単位の所有者を並べたスナップショットを取得可能
//!
//! # モジュールの依存関係
//!
//! ```text
//! shell => process => memory => sync
//!       => render  => memory
//! ```
//!
//! - [memory]モジュール:
//!   - 主に[Allocator]構造体を提供
//!   - アドレス空間の分割管理(割当・解放・スナップショット)を担当する
//! - [sync]モジュール:
//!   - 待機者全員を起床させる[Lock]と、その配列版を提供
//! - [process]モジュール:
//!   - シミュレーション上のプロセス群と、そのスケジューリングを担当する
//! - [render]モジュール:
//!   - スナップショットを表形式の文字列に整形する
//! - [shell]モジュール:
//!   - 上記を対話的に操作するためのコマンドインタプリタ
//!
//! [memory]: ./memory/index.html
//! [Allocator]: ./memory/struct.Allocator.html
//! [sync]: ./sync/index.html
//! [Lock]: ./sync/struct.Lock.html
//! [process]: ./process/index.html
//! [render]: ./render/index.html
//! [shell]: ./shell/index.html
#![warn(missing_docs)]
extern crate prometrics;
#[macro_use]
extern crate trackable;
#[macro_use]
extern crate slog;

pub use crate::error::{Error, ErrorKind};

macro_rules! track_io {
    ($expr:expr) => {
        $expr.map_err(|e: ::std::io::Error| track!(crate::Error::from(e)))
    };
}

pub mod memory;
pub mod metrics;
pub mod process;
pub mod render;
pub mod shell;
pub mod sync;

mod error;

/// crate固有の`Result`型.
pub type Result<T> = std::result::Result<T, Error>;
