use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use trackable::error::ErrorKindExt;

use crate::{Error, ErrorKind, Result};

/// プロセスの識別子.
///
/// `0`は空き領域用に予約されているため、プロセスIDとしては使用できない.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(NonZeroU32);
impl ProcessId {
    /// 新しい`ProcessId`インスタンスを生成する.
    ///
    /// `id`が`0`の場合には`None`が返される.
    pub fn new(id: u32) -> Option<Self> {
        NonZeroU32::new(id).map(ProcessId)
    }

    /// IDの値を返す.
    pub fn as_u32(self) -> u32 {
        self.0.get()
    }
}
impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl FromStr for ProcessId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let id = track!(s.parse::<u32>().map_err(Error::from))?;
        let pid = ProcessId::new(id)
            .ok_or_else(|| Error::from(ErrorKind::InvalidInput.cause("PID 0 is reserved")));
        track!(pid)
    }
}

/// 部分領域の所有者.
///
/// 全順序では`Free`が最小となり、以降はプロセスID順に並ぶ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Owner {
    /// どのプロセスにも割り当てられていない(空き領域).
    Free,

    /// プロセスに割り当てられている.
    Process(ProcessId),
}
impl Owner {
    /// 表示用の数値表現を返す.
    ///
    /// `Free`は`0`となる.
    pub fn as_u32(self) -> u32 {
        match self {
            Owner::Free => 0,
            Owner::Process(pid) => pid.as_u32(),
        }
    }

    /// 空き領域を表しているかどうかを判定する.
    pub fn is_free(self) -> bool {
        self == Owner::Free
    }
}
impl From<ProcessId> for Owner {
    fn from(f: ProcessId) -> Self {
        Owner::Process(f)
    }
}
impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

#[cfg(test)]
mod tests {
    use trackable::result::TestResult;

    use super::*;

    #[test]
    fn it_works() -> TestResult {
        assert_eq!(ProcessId::new(0), None);
        let pid = ProcessId::new(7).unwrap();
        assert_eq!(pid.as_u32(), 7);
        assert_eq!(Owner::from(pid).as_u32(), 7);
        assert_eq!(Owner::Free.as_u32(), 0);
        assert!(Owner::Free.is_free());
        assert!(Owner::Free < Owner::from(pid));

        assert_eq!(track!("7".parse::<ProcessId>())?, pid);
        Ok(())
    }

    #[test]
    fn parse_rejects_reserved_and_garbage() {
        let e = "0".parse::<ProcessId>().err().unwrap();
        assert_eq!(*e.kind(), ErrorKind::InvalidInput);

        let e = "foo".parse::<ProcessId>().err().unwrap();
        assert_eq!(*e.kind(), ErrorKind::InvalidInput);
    }
}
