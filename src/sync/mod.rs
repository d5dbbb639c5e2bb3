//! 排他制御用のプリミティブ群.
//!
//! [Lock]はアロケータの状態全体を保護するための単一のロックであり、
//! [LockArray]は番号付けされた複数の資源を個別に保護するための変種である.
//!
//! [Lock]: struct.Lock.html
//! [LockArray]: struct.LockArray.html
pub use self::lock::{Lock, LockGuard};
pub use self::lock_array::{LockArray, LockArrayGuard};

mod lock;
mod lock_array;
