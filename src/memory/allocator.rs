use slog::Logger;
use std::collections::BTreeMap;

use super::builder::AllocatorBuilder;
use super::extent::Extent;
use super::owner::{Owner, ProcessId};
use super::partition::Partition;
use super::snapshot::MemorySnapshot;
use crate::metrics::AllocatorMetrics;
use crate::sync::Lock;
use crate::{ErrorKind, Result};

/// 複数のプロセスから並行に利用可能なメモリアロケータ.
///
/// 固定長のアドレス空間を、"BestFit"戦略(と断片化時の代替経路)でプロセス群に割り当てる.
/// 割当戦略の詳細は[Partition]を参照のこと.
///
/// 状態を読み書きする全ての操作は、インスタンスが保持する単一の[Lock]を獲得した上で行われ、
/// 操作の途中でロックが解放されることはない.
/// そのため、各操作の結果は常に一つの一貫した状態を反映している.
///
/// 呼び出し元に渡されるのは、状態の複製かスカラー値のみで、内部状態への参照が外に出ることはない.
///
/// [Partition]: struct.Partition.html
/// [Lock]: ../sync/struct.Lock.html
#[derive(Debug)]
pub struct Allocator {
    partition: Lock<Partition>,
    capacity: usize,
    logger: Logger,
    metrics: AllocatorMetrics,
}
impl Allocator {
    /// デフォルト設定で、容量`capacity`のアロケータを生成する.
    ///
    /// 設定を変更したい場合には`AllocatorBuilder`を使用すること.
    pub fn new(capacity: usize) -> Result<Self> {
        track!(AllocatorBuilder::new().build(capacity))
    }

    pub(crate) fn from_builder(builder: &AllocatorBuilder, capacity: usize) -> Self {
        Allocator {
            partition: Lock::new(Partition::new(capacity)),
            capacity,
            logger: builder.logger.clone(),
            metrics: AllocatorMetrics::new(&builder.metrics, capacity),
        }
    }

    /// アドレス空間の容量を返す.
    ///
    /// 容量は構築後に変化しないので、ロックは獲得しない.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// `pid`に`size`分の領域を割り当てる.
    ///
    /// 成功した場合には、今回割り当てられた部分領域群が割当順に返される.
    ///
    /// 割当に失敗した場合でも、状態は一切変更されない.
    /// 失敗時にプロセスをどう扱うか(終了させる、待たせる、等)は呼び出し元の責務となる.
    ///
    /// # Errors
    ///
    /// - `size`が`0`の場合には`ErrorKind::InvalidInput`エラーが返される
    /// - `size`が容量を超えている場合には`ErrorKind::OutOfRange`エラーが返される
    ///   - この場合には、ロックの獲得すら行われない
    /// - `size`が現在の空き容量を超えている場合には`ErrorKind::OutOfMemory`エラーが返される
    pub fn allocate(&self, pid: ProcessId, size: usize) -> Result<Vec<Extent>> {
        track_assert!(size > 0, ErrorKind::InvalidInput; pid, size);
        if size > self.capacity {
            self.metrics.out_of_range_failures.increment();
            warn!(self.logger, "Allocation request exceeds the capacity";
                  "pid" => pid.as_u32(), "size" => size, "capacity" => self.capacity);
            track_panic!(
                ErrorKind::OutOfRange,
                "Requested {} units, but the capacity is {}",
                size,
                self.capacity
            );
        }

        // メトリクスの更新はロックの保持中に行う
        let mut partition = self.partition.acquire();
        let allocation = partition.allocate(pid, size);
        let free_units = partition.free_units();
        debug_assert!(partition.verify().is_ok(), "{:?}", partition.verify());
        if let Some(ref allocation) = allocation {
            self.metrics.count_allocation(size, allocation.path);
            self.metrics.set_free_units(free_units);
        } else {
            self.metrics.out_of_memory_failures.increment();
        }
        drop(partition);

        if let Some(allocation) = allocation {
            debug!(self.logger, "Allocated";
                   "pid" => pid.as_u32(), "size" => size,
                   "path" => allocation.path.as_str(),
                   "extents" => format!("{:?}", allocation.extents));
            Ok(allocation.extents)
        } else {
            warn!(self.logger, "Out of memory";
                  "pid" => pid.as_u32(), "size" => size, "free" => free_units);
            track_panic!(
                ErrorKind::OutOfMemory,
                "Requested {} units, but only {} units are free",
                size,
                free_units
            )
        }
    }

    /// `pid`が保持している全ての領域を解放する.
    ///
    /// 解放された領域は、隣接する空き領域と(左右両方とも)結合される.
    ///
    /// 結果として、解放された単位数が返される.
    /// `pid`が何も保持していない場合には何も行わず、`0`を返す.
    pub fn free(&self, pid: ProcessId) -> usize {
        let mut partition = self.partition.acquire();
        let released = partition.release(pid);
        let units = released.iter().map(|e| e.size()).sum();
        debug_assert!(partition.verify().is_ok(), "{:?}", partition.verify());
        if !released.is_empty() {
            self.metrics.count_releasion(released.len(), units);
            self.metrics.set_free_units(partition.free_units());
        }
        drop(partition);

        if !released.is_empty() {
            info!(self.logger, "Released";
                  "pid" => pid.as_u32(), "units" => units, "extents" => released.len());
        }
        units
    }

    /// 空き単位数を返す.
    pub fn total_free(&self) -> usize {
        self.partition.acquire().free_units()
    }

    /// アドレス単位毎の所有者の一覧を複製して返す.
    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot::new(self.partition.acquire().units().to_vec())
    }

    /// 所有者毎の保持単位数を返す.
    ///
    /// 何も保持していない所有者は結果に含まれない.
    pub fn usage(&self) -> BTreeMap<Owner, usize> {
        let partition = self.partition.acquire();
        let table = partition.table();
        let usage = table
            .owners()
            .map(|owner| (owner, table.total_size(owner)))
            .collect();
        usage
    }

    /// `owner`が保持している部分領域の一覧を返す.
    ///
    /// 結果は始端位置の昇順にソートされている.
    pub fn extents_of(&self, owner: Owner) -> Vec<Extent> {
        self.partition.acquire().table().extents_of(owner)
    }

    /// `pid`が何らかの領域を保持しているかどうかを判定する.
    pub fn has_allocation(&self, pid: ProcessId) -> bool {
        let partition = self.partition.acquire();
        partition.table().total_size(Owner::from(pid)) > 0
    }

    /// 内部状態の不変条件が成立しているかどうかを検査する.
    ///
    /// # Errors
    ///
    /// 不変条件が崩れている場合には`ErrorKind::InconsistentState`エラーが返される.
    /// これはプログラムにバグがあることを示している.
    pub fn verify(&self) -> Result<()> {
        track!(self.partition.acquire().verify())
    }

    /// アロケータ用のメトリクスを返す.
    pub fn metrics(&self) -> &AllocatorMetrics {
        &self.metrics
    }
}
