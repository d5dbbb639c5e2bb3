//! 所有者毎の部分領域群を管理するためのテーブル.
use std::collections::{btree_set, BTreeMap, BTreeSet};
use std::ops::Bound::{Excluded, Unbounded};

use super::extent::Extent;
use super::owner::Owner;

/// 所有者と、それが保持する部分領域群の対応表.
///
/// 個々の所有者の部分領域群は始端位置順に保持されているため、
/// 空き領域の結合時に必要となる隣接領域の検索は範囲検索で行える.
///
/// このテーブル自体はロックを持たず、排他制御は利用者(`Allocator`)側の責務となる.
#[derive(Debug, Clone, Default)]
pub struct OwnerTable {
    // 空になったエントリは即座に削除される
    map: BTreeMap<Owner, BTreeSet<Extent>>,
}
impl OwnerTable {
    /// 空の`OwnerTable`インスタンスを生成する.
    pub fn new() -> Self {
        OwnerTable {
            map: BTreeMap::new(),
        }
    }

    /// `owner`が保持している部分領域の一覧を返す.
    ///
    /// 結果は始端位置の昇順にソートされている.
    pub fn extents_of(&self, owner: Owner) -> Vec<Extent> {
        self.extents(owner).collect()
    }

    /// `owner`が保持している部分領域を走査するためのイテレータを返す.
    pub fn extents(&self, owner: Owner) -> Extents {
        Extents(self.map.get(&owner).map(|set| set.iter()))
    }

    /// `owner`が保持している部分領域の長さの合計を返す.
    pub fn total_size(&self, owner: Owner) -> usize {
        self.extents(owner).map(Extent::size).sum()
    }

    /// 部分領域を一つ以上保持している所有者の一覧を返す.
    pub fn owners(&self) -> impl Iterator<Item = Owner> + '_ {
        self.map.keys().cloned()
    }

    /// `owner`に部分領域を追加する.
    ///
    /// # Panics
    ///
    /// 同じ部分領域が既に登録されている場合には、内部状態の不整合とみなしてパニックする.
    pub fn add(&mut self, owner: Owner, extent: Extent) {
        debug_assert!(!extent.is_empty(), "{:?}", extent);
        let inserted = self.map.entry(owner).or_default().insert(extent);
        assert!(inserted, "duplicated extent: owner={}, extent={}", owner, extent);
    }

    /// `owner`から部分領域を削除する.
    ///
    /// # Panics
    ///
    /// 指定の部分領域が`owner`に登録されていない場合には、内部状態の不整合とみなしてパニックする.
    pub fn remove(&mut self, owner: Owner, extent: Extent) {
        let removed = self
            .map
            .get_mut(&owner)
            .map_or(false, |set| set.remove(&extent));
        assert!(removed, "no such extent: owner={}, extent={}", owner, extent);
        if self.map.get(&owner).map_or(false, BTreeSet::is_empty) {
            self.map.remove(&owner);
        }
    }

    /// `owner`の部分領域の中から、終端が`position`に一致するものを探す.
    pub fn find_ending_at(&self, owner: Owner, position: usize) -> Option<Extent> {
        // 終端が`position`の区間は、始端が`position`の区間群よりも必ず前に来る.
        // 各区間は互いに素なので、候補は`[position, position)`の直前の一つだけとなる.
        let key = Extent::new(position, position);
        self.map
            .get(&owner)?
            .range((Unbounded, Excluded(key)))
            .next_back()
            .cloned()
            .filter(|e| e.end() == position)
    }

    /// `owner`の部分領域の中から、始端が`position`に一致するものを探す.
    pub fn find_starting_at(&self, owner: Owner, position: usize) -> Option<Extent> {
        let key = Extent::new(position, position);
        self.map
            .get(&owner)?
            .range(key..)
            .next()
            .cloned()
            .filter(|e| e.start() == position)
    }
}

/// `OwnerTable::extents`が返すイテレータ.
#[derive(Debug)]
pub struct Extents<'a>(Option<btree_set::Iter<'a, Extent>>);
impl<'a> Iterator for Extents<'a> {
    type Item = Extent;
    fn next(&mut self) -> Option<Self::Item> {
        self.0.as_mut().and_then(|i| i.next()).cloned()
    }
}
