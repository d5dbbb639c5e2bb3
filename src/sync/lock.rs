use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// 二値セマフォの意味論を持つ排他ロック.
///
/// 保護対象の値を内部に保持し、ロックを獲得している間のみ、その値へのアクセスを許可する.
///
/// - `acquire()`は、ロックが解放されるまで呼び出し元のスレッドをブロックする
/// - 解放時には、待機中の**全て**のスレッドが起床させられる
///
/// 公平性の保証はなく、どの待機スレッドが次にロックを獲得するかは不定.
/// そのため飢餓状態は起こり得る.
///
/// ロックの獲得時には値がガード側に移され、`LockGuard`の破棄時に戻される.
/// ガードの保持中にパニックが発生した場合でも、巻き戻しの過程でロックは解放される.
pub struct Lock<T> {
    // `None`の間はロックが保持されている
    slot: Mutex<Option<T>>,
    released: Condvar,
}
impl<T> Lock<T> {
    /// `value`を保護する新しい`Lock`インスタンスを生成する.
    pub fn new(value: T) -> Self {
        Lock {
            slot: Mutex::new(Some(value)),
            released: Condvar::new(),
        }
    }

    /// ロックを獲得する.
    ///
    /// 他のスレッドがロックを保持している場合には、それが解放されるまでブロックする.
    /// タイムアウトやキャンセルの手段は存在しない.
    pub fn acquire(&self) -> LockGuard<T> {
        let mut slot = self.slot();
        loop {
            if let Some(value) = slot.take() {
                return LockGuard::new(self, value);
            }
            slot = self
                .released
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// ブロックせずにロックの獲得を試みる.
    ///
    /// 既に他のスレッドがロックを保持している場合には`None`が返される.
    pub fn try_acquire(&self) -> Option<LockGuard<T>> {
        self.slot().take().map(|value| LockGuard::new(self, value))
    }

    /// ロックが現在保持されているかどうかを判定する.
    pub fn is_held(&self) -> bool {
        self.slot().is_none()
    }

    /// 保護している値への可変参照を返す.
    ///
    /// `&mut self`が得られている時点でガードは存在し得ないので、ロックの獲得は行わない.
    pub fn get_mut(&mut self) -> &mut T {
        self.slot
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
            .expect("Never fails")
    }

    /// インスタンスを破棄して、保護していた値を返す.
    pub fn into_inner(self) -> T {
        self.slot
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .expect("Never fails")
    }

    fn release(&self, value: T) {
        let mut slot = self.slot();
        *slot = Some(value);
        drop(slot);
        self.released.notify_all();
    }

    // スロットの更新中にパニックすることはないので、ポイズン状態は無視して良い
    fn slot(&self) -> MutexGuard<Option<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
impl<T: Default> Default for Lock<T> {
    fn default() -> Self {
        Lock::new(T::default())
    }
}
impl<T> fmt::Debug for Lock<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Lock")
            .field("held", &self.is_held())
            .finish()
    }
}

/// `Lock::acquire`によって獲得されたロックを表すガード.
///
/// このインスタンスが破棄されると、保持していた値が`Lock`に戻されてロックが解放される.
#[must_use]
pub struct LockGuard<'a, T> {
    lock: &'a Lock<T>,
    // 破棄時以外は常に`Some`
    value: Option<T>,
}
impl<'a, T> LockGuard<'a, T> {
    fn new(lock: &'a Lock<T>, value: T) -> Self {
        LockGuard {
            lock,
            value: Some(value),
        }
    }
}
impl<'a, T> Deref for LockGuard<'a, T> {
    type Target = T;
    fn deref(&self) -> &T {
        self.value.as_ref().expect("Never fails")
    }
}
impl<'a, T> DerefMut for LockGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.value.as_mut().expect("Never fails")
    }
}
impl<'a, T> Drop for LockGuard<'a, T> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            self.lock.release(value);
        }
    }
}
impl<'a, T: fmt::Debug> fmt::Debug for LockGuard<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("LockGuard").field(&**self).finish()
    }
}
