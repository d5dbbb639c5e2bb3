use std::collections::BTreeMap;

use super::owner::Owner;

/// ある時点における、アドレス単位毎の所有者の一覧.
///
/// `Allocator::snapshot`によって、ロックを保持したまま複製されるため、
/// 常に一つの一貫した状態を反映している.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySnapshot {
    units: Vec<Owner>,
}
impl MemorySnapshot {
    pub(crate) fn new(units: Vec<Owner>) -> Self {
        MemorySnapshot { units }
    }

    /// アドレス空間の容量(単位数)を返す.
    pub fn capacity(&self) -> usize {
        self.units.len()
    }

    /// `address`の位置の所有者を返す.
    ///
    /// 範囲外の場合には`None`が返される.
    pub fn owner_at(&self, address: usize) -> Option<Owner> {
        self.units.get(address).cloned()
    }

    /// アドレス単位毎の所有者を先頭から順に返す.
    pub fn units(&self) -> &[Owner] {
        &self.units
    }

    /// 所有者を数値(空き領域は`0`)に変換した一覧を返す.
    pub fn to_ids(&self) -> Vec<u32> {
        self.units.iter().map(|o| o.as_u32()).collect()
    }

    /// 所有者毎の保持単位数を集計する.
    pub fn usage(&self) -> BTreeMap<Owner, usize> {
        let mut usage = BTreeMap::new();
        for owner in &self.units {
            *usage.entry(*owner).or_insert(0) += 1;
        }
        usage
    }
}
