//! Extent

use std::cmp;
use std::fmt;
use std::ops::Range;

/// アドレス空間内の連続した部分領域.
///
/// `[start, end)`の半開区間を表す値型であり、一度生成されたら変更されることはない.
/// 分割や結合の際には、新しいインスタンスが生成される.
///
/// 全順序は"始端位置順"(同じ場合は終端位置順)となる.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Extent {
    start: usize,
    end: usize,
}
impl Extent {
    /// `[start, end)`を表す`Extent`を生成する.
    ///
    /// # Panics
    ///
    /// `end`が`start`よりも小さい場合には、現在のスレッドがパニックする.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "start={}, end={}", start, end);
        Extent { start, end }
    }

    /// `start`から`size`分の長さを持つ`Extent`を生成する.
    pub fn with_size(start: usize, size: usize) -> Self {
        Extent::new(start, start + size)
    }

    /// 始端位置を返す.
    pub fn start(self) -> usize {
        self.start
    }

    /// 終端位置を返す.
    ///
    /// **注意**: 区間は半開であるため、`end`の位置自体は含まれない.
    pub fn end(self) -> usize {
        self.end
    }

    /// 長さを返す.
    pub fn size(self) -> usize {
        self.end - self.start
    }

    /// 長さが`0`かどうかを判定する.
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// 含まれるアドレス群を範囲として返す.
    pub fn range(self) -> Range<usize> {
        self.start..self.end
    }

    /// 先頭から`size`分を切り出し、残りがあればそれと共に返す.
    ///
    /// # Panics
    ///
    /// `size`が`self.size()`を超えている場合には、現在のスレッドがパニックする.
    pub fn split_at(self, size: usize) -> (Extent, Option<Extent>) {
        assert!(size <= self.size(), "size={}, extent={:?}", size, self);
        let head = Extent::with_size(self.start, size);
        if head.end < self.end {
            (head, Some(Extent::new(head.end, self.end)))
        } else {
            (head, None)
        }
    }

    /// `other`と隣接しているかどうかを判定する.
    pub fn is_adjacent_to(self, other: Extent) -> bool {
        self.end == other.start || other.end == self.start
    }

    /// `other`と重なる部分があるかどうかを判定する.
    ///
    /// 長さ`0`の区間は何とも重ならない.
    pub fn overlaps(self, other: Extent) -> bool {
        cmp::max(self.start, other.start) < cmp::min(self.end, other.end)
    }

    /// 隣接する`other`と結合した`Extent`を返す.
    ///
    /// # Panics
    ///
    /// 二つの区間が隣接していない場合には、現在のスレッドがパニックする.
    pub fn merge(self, other: Extent) -> Extent {
        assert!(self.is_adjacent_to(other), "{:?}, {:?}", self, other);
        Extent::new(
            cmp::min(self.start, other.start),
            cmp::max(self.end, other.end),
        )
    }
}
impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
