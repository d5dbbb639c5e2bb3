//! Partition

use std::cmp::Reverse;

use super::extent::Extent;
use super::owner::{Owner, ProcessId};
use super::owner_table::OwnerTable;
use crate::{ErrorKind, Result};

/// 割当がどの経路で行われたか.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationPath {
    /// 要求サイズを満たす単一の空き領域から割り当てられた.
    BestFit,

    /// 単一の空き領域では足りず、複数の空き領域を組み合わせて割り当てられた.
    Fragmented,
}
impl AllocationPath {
    /// ログ出力用の名前を返す.
    pub fn as_str(self) -> &'static str {
        match self {
            AllocationPath::BestFit => "best_fit",
            AllocationPath::Fragmented => "fragmented",
        }
    }
}

/// 一回の割当の結果.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// 割当経路.
    pub path: AllocationPath,

    /// 割り当てられた部分領域群(割当順).
    pub extents: Vec<Extent>,
}

/// アドレス空間の分割状態.
///
/// 所有者毎の部分領域群(`OwnerTable`)と、そこから導出される
/// アドレス単位毎の所有者配列を保持し、割当および解放のアルゴリズムを実装する.
///
/// この構造体自体は排他制御を行わないので、
/// 並行に利用する場合には`Allocator`経由で操作する必要がある.
///
/// # 不変条件
///
/// 公開メソッドの呼び出し前後で、以下が常に成立する:
///
/// - 全ての部分領域の和集合は`[0, capacity)`に過不足なく一致する
/// - 部分領域同士は(所有者が同じか否かに関わらず)互いに重ならない
/// - 空き領域同士が隣接することはない(解放時に必ず結合される)
/// - アドレス単位毎の所有者配列は、部分領域群と矛盾しない
#[derive(Debug)]
pub struct Partition {
    table: OwnerTable,
    units: Vec<Owner>,
    free_units: usize,
}
impl Partition {
    /// 全体が空いている、容量`capacity`の`Partition`を生成する.
    pub fn new(capacity: usize) -> Self {
        let mut table = OwnerTable::new();
        if capacity > 0 {
            table.add(Owner::Free, Extent::new(0, capacity));
        }
        Partition {
            table,
            units: vec![Owner::Free; capacity],
            free_units: capacity,
        }
    }

    /// アドレス空間の容量を返す.
    pub fn capacity(&self) -> usize {
        self.units.len()
    }

    /// 空き単位数を返す.
    pub fn free_units(&self) -> usize {
        self.free_units
    }

    /// 所有者毎の部分領域群を返す.
    pub fn table(&self) -> &OwnerTable {
        &self.table
    }

    /// アドレス単位毎の所有者を返す.
    pub fn units(&self) -> &[Owner] {
        &self.units
    }

    /// `pid`に`size`分の領域を割り当てる.
    ///
    /// `size`が`0`の場合や、空き容量の合計が`size`に満たない場合には、状態は変更されずに`None`が返される.
    ///
    /// # 割当戦略
    ///
    /// 基本は"BestFit"戦略であり、要求サイズを満たす空き領域の中で、一番サイズが小さいものが選択される.
    /// (同じサイズのものが複数ある場合には、始端位置が小さいものが優先される)
    ///
    /// 単一の空き領域では要求を満たせない場合には、空き領域をサイズの大きい順に必要な分だけ集めて割り当てる.
    /// これは断片化を許容して割当を成功させるための代替経路であり、
    /// 割当後の断片化が最小になることは保証しない.
    pub fn allocate(&mut self, pid: ProcessId, size: usize) -> Option<Allocation> {
        if size == 0 || self.free_units < size {
            return None;
        }

        let owner = Owner::from(pid);
        let allocation = if let Some(free) = self.best_fit(size) {
            Allocation {
                path: AllocationPath::BestFit,
                extents: vec![self.allocate_from(owner, free, size)],
            }
        } else {
            Allocation {
                path: AllocationPath::Fragmented,
                extents: self.allocate_fragmented(owner, size),
            }
        };
        self.free_units -= size;
        Some(allocation)
    }

    /// `pid`が保持している全ての部分領域を解放する.
    ///
    /// 解放された部分領域は、左右に隣接する空き領域と結合された上で空き領域に戻される.
    ///
    /// 結果として、解放された(結合前の)部分領域群が返される.
    /// `pid`が何も保持していない場合には、何も行わずに空のリストを返す.
    pub fn release(&mut self, pid: ProcessId) -> Vec<Extent> {
        let owner = Owner::from(pid);
        let held = self.table.extents_of(owner);
        for &extent in &held {
            self.table.remove(owner, extent);
            self.release_extent(extent);
        }
        held
    }

    /// 不変条件が成立しているかどうかを検査する.
    ///
    /// # Errors
    ///
    /// 不変条件のいずれかが崩れている場合には`ErrorKind::InconsistentState`エラーが返される.
    pub fn verify(&self) -> Result<()> {
        let mut extents = self
            .table
            .owners()
            .flat_map(|owner| self.table.extents(owner).map(move |e| (e, owner)))
            .collect::<Vec<_>>();
        extents.sort();

        // 始端位置順に並べた時に、前の終端と次の始端が常に一致していれば、
        // 隙間も重なりも存在しないことになる
        let mut position = 0;
        for &(extent, owner) in &extents {
            track_assert!(!extent.is_empty(), ErrorKind::InconsistentState; extent, owner);
            track_assert_eq!(extent.start(), position, ErrorKind::InconsistentState);
            for address in extent.range() {
                track_assert_eq!(self.units[address], owner, ErrorKind::InconsistentState);
            }
            position = extent.end();
        }
        track_assert_eq!(position, self.capacity(), ErrorKind::InconsistentState);

        let frees = self.table.extents_of(Owner::Free);
        for pair in frees.windows(2) {
            track_assert!(!pair[0].is_adjacent_to(pair[1]), ErrorKind::InconsistentState;
                          pair[0], pair[1]);
        }
        track_assert_eq!(
            self.free_units,
            self.table.total_size(Owner::Free),
            ErrorKind::InconsistentState
        );
        Ok(())
    }

    // 要求サイズ以上で最小の空き領域を探す.
    fn best_fit(&self, size: usize) -> Option<Extent> {
        // `min_by_key`は同値の要素が複数ある場合には最初のものを返す
        self.table
            .extents(Owner::Free)
            .filter(|e| e.size() >= size)
            .min_by_key(|e| e.size())
    }

    // 空き領域`free`の先頭から`size`分を`owner`に割り当てて、余りは空き領域に戻す.
    fn allocate_from(&mut self, owner: Owner, free: Extent, size: usize) -> Extent {
        self.table.remove(Owner::Free, free);
        let (allocated, remainder) = free.split_at(size);
        self.assign(owner, allocated);
        if let Some(remainder) = remainder {
            self.table.add(Owner::Free, remainder);
        }
        allocated
    }

    fn allocate_fragmented(&mut self, owner: Owner, size: usize) -> Vec<Extent> {
        // 安定ソートなので、同じサイズの空き領域同士は始端位置順のままとなる
        let mut frees = self.table.extents_of(Owner::Free);
        frees.sort_by_key(|e| Reverse(e.size()));

        let mut allocated = Vec::new();
        let mut remaining = size;
        for free in frees {
            if free.size() < remaining {
                self.table.remove(Owner::Free, free);
                self.assign(owner, free);
                remaining -= free.size();
                allocated.push(free);
            } else {
                // 最後の一つだけは、必要な分のみを切り出す
                allocated.push(self.allocate_from(owner, free, remaining));
                remaining = 0;
                break;
            }
        }
        debug_assert_eq!(remaining, 0);
        allocated
    }

    fn release_extent(&mut self, extent: Extent) {
        self.fill_units(extent, Owner::Free);
        self.free_units += extent.size();

        // 左右の両方に隣接する空き領域があれば、三つをまとめて一つにする
        let mut merged = extent;
        if let Some(prev) = self.table.find_ending_at(Owner::Free, extent.start()) {
            self.table.remove(Owner::Free, prev);
            merged = prev.merge(merged);
        }
        if let Some(next) = self.table.find_starting_at(Owner::Free, extent.end()) {
            self.table.remove(Owner::Free, next);
            merged = merged.merge(next);
        }
        self.table.add(Owner::Free, merged);
    }

    fn assign(&mut self, owner: Owner, extent: Extent) {
        self.table.add(owner, extent);
        self.fill_units(extent, owner);
    }

    fn fill_units(&mut self, extent: Extent, owner: Owner) {
        for unit in &mut self.units[extent.range()] {
            *unit = owner;
        }
    }
}
