//! シミュレーション上のプロセス群の管理.
//!
//! プロセスの生成・一覧・状態遷移と、ラウンドロビンによるスケジューリングの一段階分を提供する.
//!
//! メモリの割当自体は[Allocator]が担当し、このモジュールが担うのは
//! 割当失敗時にプロセスをどう扱うか(i.e., ブロック状態にする)、といった判断のみである.
//!
//! [Allocator]: ../memory/struct.Allocator.html
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use trackable::error::ErrorKindExt;

use crate::memory::{Allocator, ProcessId};
use crate::{Error, ErrorKind, Result};

/// プロセスの状態.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessState {
    /// 実行可能.
    Ready,

    /// 実行中.
    Running,

    /// メモリ等の資源を待っている.
    Blocked,
}
impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ProcessState::Ready => write!(f, "READY"),
            ProcessState::Running => write!(f, "RUNNING"),
            ProcessState::Blocked => write!(f, "BLOCKED"),
        }
    }
}

/// プロセス制御ブロック.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pcb {
    pid: ProcessId,
    name: String,
    state: ProcessState,
}
impl Pcb {
    /// プロセスIDを返す.
    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    /// プロセス名を返す.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// プロセスの状態を返す.
    pub fn state(&self) -> ProcessState {
        self.state
    }
}
impl fmt::Display for Pcb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PID {} [{}] : {}", self.pid, self.name, self.state)
    }
}

/// プロセス群を管理するための構造体.
///
/// プロセスIDは`1`から順に採番され、再利用されることはない.
#[derive(Debug)]
pub struct ProcessManager {
    processes: BTreeMap<ProcessId, Pcb>,
    run_queue: VecDeque<ProcessId>,
    // IDを使い切った場合には`None`となる
    next_pid: Option<ProcessId>,
}
impl ProcessManager {
    /// 新しい`ProcessManager`インスタンスを生成する.
    pub fn new() -> Self {
        ProcessManager {
            processes: BTreeMap::new(),
            run_queue: VecDeque::new(),
            next_pid: ProcessId::new(1),
        }
    }

    /// 新しいプロセスを`Ready`状態で生成し、そのIDを返す.
    ///
    /// # Errors
    ///
    /// 採番可能なプロセスIDを使い切っている場合には`ErrorKind::InvalidInput`エラーが返される.
    pub fn create(&mut self, name: &str) -> Result<ProcessId> {
        let pid = self.next_pid.ok_or_else(|| {
            track!(Error::from(
                ErrorKind::InvalidInput.cause("No process IDs are left")
            ))
        })?;
        self.next_pid = pid.as_u32().checked_add(1).and_then(ProcessId::new);
        self.processes.insert(
            pid,
            Pcb {
                pid,
                name: name.to_owned(),
                state: ProcessState::Ready,
            },
        );
        self.run_queue.push_back(pid);
        Ok(pid)
    }

    /// 指定されたプロセスを検索する.
    pub fn get(&self, pid: ProcessId) -> Option<&Pcb> {
        self.processes.get(&pid)
    }

    /// 全てのプロセスを返す.
    ///
    /// 結果はプロセスIDの昇順にソートされている.
    pub fn list(&self) -> Vec<Pcb> {
        self.processes.values().cloned().collect()
    }

    /// 管理しているプロセスの数を返す.
    pub fn len(&self) -> usize {
        self.processes.len()
    }

    /// 管理しているプロセスが存在しないかどうかを判定する.
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// ラウンドロビンによるスケジューリングを一段階分進める.
    ///
    /// 現在`Running`状態のプロセスは`Ready`に戻されて実行キューの末尾に回り、
    /// 実行キューの先頭から`Ready`状態のプロセスが一つ選ばれて`Running`となる.
    /// `Blocked`状態のプロセスは読み飛ばされる.
    ///
    /// 結果として、新たに`Running`となったプロセスのIDが返される.
    /// 実行可能なプロセスが存在しない場合には`None`が返される.
    pub fn schedule(&mut self) -> Option<ProcessId> {
        for pcb in self.processes.values_mut() {
            if pcb.state == ProcessState::Running {
                pcb.state = ProcessState::Ready;
            }
        }
        for _ in 0..self.run_queue.len() {
            let pid = self.run_queue.pop_front()?;
            self.run_queue.push_back(pid);
            if let Some(pcb) = self.processes.get_mut(&pid) {
                if pcb.state == ProcessState::Ready {
                    pcb.state = ProcessState::Running;
                    return Some(pid);
                }
            }
        }
        None
    }

    /// プロセス`pid`に`size`分のメモリを割り当てる.
    ///
    /// 空き容量不足(`ErrorKind::OutOfMemory`)で失敗した場合には、プロセスは`Blocked`状態となる.
    /// 割当に成功した場合には、`Blocked`状態だったプロセスは`Ready`状態に戻される.
    ///
    /// # Errors
    ///
    /// - `pid`に対応するプロセスが存在しない場合には`ErrorKind::InvalidInput`エラーが返される
    /// - その他、`Allocator::allocate`が返すエラー
    pub fn request_memory(
        &mut self,
        allocator: &Allocator,
        pid: ProcessId,
        size: usize,
    ) -> Result<()> {
        let pcb = track!(self.pcb_mut(pid))?;
        match allocator.allocate(pid, size) {
            Ok(_) => {
                if pcb.state == ProcessState::Blocked {
                    pcb.state = ProcessState::Ready;
                }
                Ok(())
            }
            Err(e) => {
                if *e.kind() == ErrorKind::OutOfMemory {
                    pcb.state = ProcessState::Blocked;
                }
                Err(track!(e))
            }
        }
    }

    /// プロセス`pid`を終了させる.
    ///
    /// プロセスが保持していたメモリは全て解放される.
    /// 結果として、解放された単位数が返される.
    ///
    /// # Errors
    ///
    /// `pid`に対応するプロセスが存在しない場合には`ErrorKind::InvalidInput`エラーが返される.
    pub fn terminate(&mut self, allocator: &Allocator, pid: ProcessId) -> Result<usize> {
        track!(self.pcb_mut(pid))?;
        self.processes.remove(&pid);
        self.run_queue.retain(|p| *p != pid);
        Ok(allocator.free(pid))
    }

    fn pcb_mut(&mut self, pid: ProcessId) -> Result<&mut Pcb> {
        self.processes.get_mut(&pid).ok_or_else(|| {
            track!(Error::from(
                ErrorKind::InvalidInput.cause(format!("No such process: PID {}", pid))
            ))
        })
    }
}
impl Default for ProcessManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use trackable::result::TestResult;

    use super::*;

    #[test]
    fn it_works() -> TestResult {
        let mut manager = ProcessManager::new();
        assert!(manager.is_empty());
        let p1 = track!(manager.create("init"))?;
        let p2 = track!(manager.create("shell"))?;
        assert_eq!(p1.as_u32(), 1);
        assert_eq!(p2.as_u32(), 2);
        assert_eq!(manager.len(), 2);

        let list = manager.list();
        assert_eq!(list[0].to_string(), "PID 1 [init] : READY");
        assert_eq!(list[1].name(), "shell");
        assert_eq!(manager.get(p2).map(Pcb::state), Some(ProcessState::Ready));
        Ok(())
    }

    #[test]
    fn process_ids_are_exhausted() -> TestResult {
        let mut manager = ProcessManager::new();
        manager.next_pid = ProcessId::new(u32::MAX);
        let last = track!(manager.create("last"))?;
        assert_eq!(last.as_u32(), u32::MAX);

        let e = manager.create("overflow").err().unwrap();
        assert_eq!(*e.kind(), ErrorKind::InvalidInput);
        assert_eq!(manager.len(), 1);
        Ok(())
    }

    #[test]
    fn round_robin() -> TestResult {
        let allocator = track!(Allocator::new(10))?;
        let mut manager = ProcessManager::new();
        assert_eq!(manager.schedule(), None);

        let p1 = track!(manager.create("a"))?;
        let p2 = track!(manager.create("b"))?;
        let p3 = track!(manager.create("c"))?;
        assert_eq!(manager.schedule(), Some(p1));
        assert_eq!(manager.get(p1).map(Pcb::state), Some(ProcessState::Running));
        assert_eq!(manager.schedule(), Some(p2));
        assert_eq!(manager.get(p1).map(Pcb::state), Some(ProcessState::Ready));

        // ブロック中のプロセスは読み飛ばされる
        track!(manager.request_memory(&allocator, p3, 10))?;
        assert!(manager.request_memory(&allocator, p1, 1).is_err());
        assert_eq!(manager.get(p1).map(Pcb::state), Some(ProcessState::Blocked));
        assert_eq!(manager.schedule(), Some(p3));
        assert_eq!(manager.schedule(), Some(p2));
        assert_eq!(manager.schedule(), Some(p3));
        Ok(())
    }

    #[test]
    fn blocked_on_out_of_memory() -> TestResult {
        let allocator = track!(Allocator::new(10))?;
        let mut manager = ProcessManager::new();
        let p1 = track!(manager.create("a"))?;
        let p2 = track!(manager.create("b"))?;

        track!(manager.request_memory(&allocator, p1, 8))?;
        let e = manager.request_memory(&allocator, p2, 5).err().unwrap();
        assert_eq!(*e.kind(), ErrorKind::OutOfMemory);
        assert_eq!(manager.get(p2).map(Pcb::state), Some(ProcessState::Blocked));

        // 容量超過はブロックの理由にはならない
        let e = manager.request_memory(&allocator, p1, 11).err().unwrap();
        assert_eq!(*e.kind(), ErrorKind::OutOfRange);
        assert_eq!(manager.get(p1).map(Pcb::state), Some(ProcessState::Ready));

        assert_eq!(track!(manager.terminate(&allocator, p1))?, 8);
        assert!(manager.get(p1).is_none());
        track!(manager.request_memory(&allocator, p2, 5))?;
        assert_eq!(manager.get(p2).map(Pcb::state), Some(ProcessState::Ready));
        assert_eq!(allocator.total_free(), 5);
        Ok(())
    }

    #[test]
    fn unknown_process() -> TestResult {
        let allocator = track!(Allocator::new(10))?;
        let mut manager = ProcessManager::new();
        let pid = ProcessId::new(5).unwrap();

        let e = manager.request_memory(&allocator, pid, 1).err().unwrap();
        assert_eq!(*e.kind(), ErrorKind::InvalidInput);
        let e = manager.terminate(&allocator, pid).err().unwrap();
        assert_eq!(*e.kind(), ErrorKind::InvalidInput);
        assert_eq!(allocator.total_free(), 10);
        Ok(())
    }
}
