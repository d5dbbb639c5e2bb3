//! メモリマップの表示.
use crate::memory::MemorySnapshot;
use crate::{ErrorKind, Result};

/// デフォルトの表示行数.
pub const DEFAULT_ROWS: usize = 10;

/// `MemorySnapshot`を「行 x 列」の表形式の文字列に整形するためのレンダラ.
///
/// 各アドレス単位は、所有者の数値表現(空き領域は`0`)を空白区切りで出力する.
///
/// 列数は`ceil(容量 / 行数)`となり、容量が行数で割り切れない場合には、最後の行が短くなる.
/// (末尾の単位が表示から漏れることはない)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryMapRenderer {
    rows: usize,
}
impl MemoryMapRenderer {
    /// `rows`行で表示を行うレンダラを生成する.
    ///
    /// # Errors
    ///
    /// `rows`が`0`の場合には`ErrorKind::InvalidInput`エラーが返される.
    pub fn new(rows: usize) -> Result<Self> {
        track_assert!(rows > 0, ErrorKind::InvalidInput);
        Ok(MemoryMapRenderer { rows })
    }

    /// 表示行数を返す.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// `snapshot`を整形した文字列を返す.
    pub fn render(&self, snapshot: &MemorySnapshot) -> String {
        let columns = (snapshot.capacity() + self.rows - 1) / self.rows;
        let mut s = String::new();
        if columns == 0 {
            return s;
        }
        for row in snapshot.units().chunks(columns) {
            for owner in row {
                s.push(' ');
                s.push_str(&owner.to_string());
            }
            s.push('\n');
        }
        s
    }
}
impl Default for MemoryMapRenderer {
    fn default() -> Self {
        MemoryMapRenderer {
            rows: DEFAULT_ROWS,
        }
    }
}

#[cfg(test)]
mod tests {
    use trackable::result::TestResult;

    use super::*;
    use crate::memory::{Allocator, ProcessId};

    #[test]
    fn it_works() -> TestResult {
        let allocator = track!(Allocator::new(6))?;
        track!(allocator.allocate(ProcessId::new(2).unwrap(), 4))?;

        let renderer = track!(MemoryMapRenderer::new(2))?;
        assert_eq!(renderer.render(&allocator.snapshot()), " 2 2 2\n 2 0 0\n");

        let renderer = track!(MemoryMapRenderer::new(4))?;
        assert_eq!(
            renderer.render(&allocator.snapshot()),
            " 2 2\n 2 2\n 0 0\n"
        );
        Ok(())
    }

    #[test]
    fn default_layout() -> TestResult {
        let allocator = track!(Allocator::new(100))?;
        track!(allocator.allocate(ProcessId::new(1).unwrap(), 15))?;

        let renderer = MemoryMapRenderer::default();
        assert_eq!(renderer.rows(), DEFAULT_ROWS);
        let text = renderer.render(&allocator.snapshot());
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], " 1 1 1 1 1 1 1 1 1 1");
        assert_eq!(lines[1], " 1 1 1 1 1 0 0 0 0 0");
        assert_eq!(lines[9], " 0 0 0 0 0 0 0 0 0 0");
        Ok(())
    }

    #[test]
    fn more_rows_than_units() -> TestResult {
        let allocator = track!(Allocator::new(3))?;
        let renderer = track!(MemoryMapRenderer::new(10))?;
        assert_eq!(renderer.render(&allocator.snapshot()), " 0\n 0\n 0\n");
        Ok(())
    }

    #[test]
    fn zero_rows() {
        let e = MemoryMapRenderer::new(0).err().unwrap();
        assert_eq!(*e.kind(), ErrorKind::InvalidInput);
    }
}
