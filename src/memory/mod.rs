//! メモリアロケータ.
//!
//! 固定長のアドレス空間を、複数の所有者(シミュレーション上のプロセス群と、予約された"空き領域")の間で分割管理する.
//!
//! # 構成要素
//!
//! 葉から根の順に:
//!
//! - [Extent]: 連続したアドレス単位群を表す半開区間の値型
//! - [OwnerTable]: 所有者と、それが保持する部分領域群の対応表
//! - [Partition]: 割当(BestFit + 断片化時の代替経路)と解放(隣接空き領域の結合)のアルゴリズム
//! - [Allocator]: `Partition`を[Lock]で保護し、複数スレッドからの並行利用を可能にしたもの
//!
//! アロケータが担当するのは領域の計算処理のみで、割当失敗時のプロセスの扱いや、
//! メモリマップの表示等は、このモジュールの外側の責務となる.
//!
//! [Extent]: struct.Extent.html
//! [OwnerTable]: struct.OwnerTable.html
//! [Partition]: struct.Partition.html
//! [Allocator]: struct.Allocator.html
//! [Lock]: ../sync/struct.Lock.html
pub use self::allocator::Allocator;
pub use self::builder::AllocatorBuilder;
pub use self::extent::Extent;
pub use self::owner::{Owner, ProcessId};
pub use self::owner_table::{Extents, OwnerTable};
pub use self::partition::{Allocation, AllocationPath, Partition};
pub use self::snapshot::MemorySnapshot;

mod allocator;
mod builder;
mod extent;
mod owner;
mod owner_table;
mod partition;
mod snapshot;
