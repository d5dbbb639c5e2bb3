use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::{ErrorKind, Result};

/// 独立に獲得可能な`N`個の二値ロックの配列.
///
/// 番号付けされた複数の資源を個別に保護するために使用する.
/// `Lock`とは異なり値の保護は行わず、ロックの状態のみを管理する.
///
/// いずれかのロックが解放されると、(他の番号を待っているものも含めて)待機中の全てのスレッドが起床させられる.
#[derive(Debug)]
pub struct LockArray {
    held: Mutex<Vec<bool>>,
    released: Condvar,
}
impl LockArray {
    /// `len`個のロックを持つ`LockArray`インスタンスを生成する.
    ///
    /// 初期状態では、全てのロックが解放されている.
    pub fn new(len: usize) -> Self {
        LockArray {
            held: Mutex::new(vec![false; len]),
            released: Condvar::new(),
        }
    }

    /// ロックの数を返す.
    pub fn len(&self) -> usize {
        self.held_flags().len()
    }

    /// ロックの数が`0`かどうかを判定する.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `index`番目のロックを獲得する.
    ///
    /// 既に保持されている場合には、それが解放されるまでブロックする.
    ///
    /// # Errors
    ///
    /// `index`が範囲外の場合には`ErrorKind::InvalidInput`エラーが返される.
    pub fn acquire(&self, index: usize) -> Result<LockArrayGuard> {
        let mut held = self.held_flags();
        track_assert!(index < held.len(), ErrorKind::InvalidInput; index, held.len());
        while held[index] {
            held = self
                .released
                .wait(held)
                .unwrap_or_else(PoisonError::into_inner);
        }
        held[index] = true;
        Ok(LockArrayGuard { array: self, index })
    }

    /// `index`番目のロックが保持されているかどうかを判定する.
    ///
    /// `index`が範囲外の場合には`None`が返される.
    pub fn is_held(&self, index: usize) -> Option<bool> {
        self.held_flags().get(index).cloned()
    }

    fn release(&self, index: usize) {
        let mut held = self.held_flags();
        held[index] = false;
        drop(held);
        self.released.notify_all();
    }

    fn held_flags(&self) -> MutexGuard<Vec<bool>> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// `LockArray::acquire`によって獲得されたロックを表すガード.
///
/// このインスタンスが破棄されると、対応するロックが解放される.
#[must_use]
#[derive(Debug)]
pub struct LockArrayGuard<'a> {
    array: &'a LockArray,
    index: usize,
}
impl<'a> LockArrayGuard<'a> {
    /// 獲得しているロックの番号を返す.
    pub fn index(&self) -> usize {
        self.index
    }
}
impl<'a> Drop for LockArrayGuard<'a> {
    fn drop(&mut self) {
        self.array.release(self.index);
    }
}
