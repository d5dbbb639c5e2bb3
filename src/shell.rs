//! 対話的にアロケータを操作するためのシェル.
//!
//! 一行に一つのコマンドを受け付ける:
//!
//! ```text
//! create <name>       プロセスを生成する
//! ps                  プロセスの一覧を表示する
//! schedule            スケジューリングを一段階進める
//! alloc <pid> <size>  プロセスにメモリを割り当てる
//! free <pid>          プロセスが保持しているメモリを解放する
//! kill <pid>          プロセスを終了させる (メモリも解放される)
//! mem                 メモリマップを表示する
//! exit                シェルを終了する
//! ```
//!
//! コマンド名の大文字・小文字は区別されない.
use std::io::{BufRead, Write};

use crate::memory::{Allocator, ProcessId};
use crate::process::ProcessManager;
use crate::render::MemoryMapRenderer;
use crate::{Error, ErrorKind, Result};

/// シェルのコマンド.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `create <name>`
    Create(String),

    /// `ps`
    ListProcesses,

    /// `schedule`
    Schedule,

    /// `alloc <pid> <size>`
    Allocate(ProcessId, usize),

    /// `free <pid>`
    Free(ProcessId),

    /// `kill <pid>`
    Kill(ProcessId),

    /// `mem`
    ShowMemory,

    /// `exit`
    Exit,
}
impl Command {
    /// 一行分の入力をコマンドとして解釈する.
    ///
    /// 空行の場合には`None`が返される.
    ///
    /// # Errors
    ///
    /// 未知のコマンドや、引数が不正な場合には`ErrorKind::InvalidInput`エラーが返される.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let mut words = line.splitn(2, char::is_whitespace);
        let name = words.next().unwrap_or("").to_lowercase();
        let rest = words.next().unwrap_or("").trim();
        let args = rest.split_whitespace().collect::<Vec<_>>();

        let command = match name.as_str() {
            "create" => {
                track_assert!(!rest.is_empty(), ErrorKind::InvalidInput, "Usage: create <name>");
                Command::Create(rest.to_owned())
            }
            "ps" => Command::ListProcesses,
            "schedule" => Command::Schedule,
            "alloc" => {
                track_assert_eq!(args.len(), 2, ErrorKind::InvalidInput);
                let pid = track!(args[0].parse::<ProcessId>())?;
                let size = track!(args[1].parse::<usize>().map_err(Error::from))?;
                Command::Allocate(pid, size)
            }
            "free" => {
                track_assert_eq!(args.len(), 1, ErrorKind::InvalidInput);
                Command::Free(track!(args[0].parse::<ProcessId>())?)
            }
            "kill" => {
                track_assert_eq!(args.len(), 1, ErrorKind::InvalidInput);
                Command::Kill(track!(args[0].parse::<ProcessId>())?)
            }
            "mem" => Command::ShowMemory,
            "exit" => Command::Exit,
            _ => track_panic!(ErrorKind::InvalidInput, "Unknown command: {:?}", name),
        };
        Ok(Some(command))
    }
}

/// コマンドを実行し、その結果を`W`に書き出すシェル.
#[derive(Debug)]
pub struct Shell<W> {
    allocator: Allocator,
    processes: ProcessManager,
    renderer: MemoryMapRenderer,
    output: W,
}
impl<W: Write> Shell<W> {
    /// 新しい`Shell`インスタンスを生成する.
    pub fn new(allocator: Allocator, renderer: MemoryMapRenderer, output: W) -> Self {
        Shell {
            allocator,
            processes: ProcessManager::new(),
            renderer,
            output,
        }
    }

    /// シェルが操作しているアロケータを返す.
    pub fn allocator(&self) -> &Allocator {
        &self.allocator
    }

    /// シェルが管理しているプロセス群を返す.
    pub fn processes(&self) -> &ProcessManager {
        &self.processes
    }

    /// 出力先を返す.
    pub fn output(&self) -> &W {
        &self.output
    }

    /// `exit`コマンドか入力の終端に到達するまで、`input`からコマンドを読み込んで実行する.
    ///
    /// 個々のコマンドの失敗はエラーメッセージとして出力され、処理は継続される.
    ///
    /// # Errors
    ///
    /// 入出力エラーが発生した場合には、そのエラーが返される.
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        for line in input.lines() {
            let line = track_io!(line)?;
            match Command::parse(&line) {
                Ok(None) => {}
                Ok(Some(Command::Exit)) => break,
                Ok(Some(command)) => {
                    if let Err(e) = self.execute(command) {
                        if *e.kind() == ErrorKind::Other {
                            return Err(track!(e));
                        }
                        track!(self.report(&e))?;
                    }
                }
                Err(e) => track!(self.report(&e))?,
            }
        }
        track_io!(self.output.flush())?;
        Ok(())
    }

    /// コマンドを一つ実行する.
    ///
    /// `Command::Exit`に対しては何も行わない.
    pub fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Create(name) => {
                let pid = track!(self.processes.create(&name))?;
                track!(self.print(format_args!("Created process: PID {}", pid)))?;
            }
            Command::ListProcesses => {
                for pcb in self.processes.list() {
                    track!(self.print(format_args!("{}", pcb)))?;
                }
            }
            Command::Schedule => {
                if let Some(pid) = self.processes.schedule() {
                    track!(self.print(format_args!("Running process: PID {}", pid)))?;
                } else {
                    track!(self.print(format_args!("No runnable process")))?;
                }
            }
            Command::Allocate(pid, size) => {
                track!(self
                    .processes
                    .request_memory(&self.allocator, pid, size))?;
                track!(self.print(format_args!("Allocated {} units to PID {}", size, pid)))?;
            }
            Command::Free(pid) => {
                let units = self.allocator.free(pid);
                track!(self.print(format_args!("Released {} units from PID {}", units, pid)))?;
            }
            Command::Kill(pid) => {
                let units = track!(self.processes.terminate(&self.allocator, pid))?;
                track!(self.print(format_args!(
                    "Terminated process: PID {} ({} units released)",
                    pid, units
                )))?;
            }
            Command::ShowMemory => {
                let text = self.renderer.render(&self.allocator.snapshot());
                track_io!(self.output.write_all(text.as_bytes()))?;
            }
            Command::Exit => {}
        }
        Ok(())
    }

    fn report(&mut self, e: &Error) -> Result<()> {
        let message = match *e.kind() {
            ErrorKind::OutOfRange => "Cannot fulfill allocation request: out of range",
            ErrorKind::OutOfMemory => "Failed to allocate memory: out of memory",
            _ => "Invalid command",
        };
        track!(self.print(format_args!("{}", message)))
    }

    fn print(&mut self, args: std::fmt::Arguments) -> Result<()> {
        track_io!(writeln!(self.output, "{}", args))
    }
}

#[cfg(test)]
mod tests {
    use trackable::result::TestResult;

    use super::*;
    use crate::memory::Owner;

    fn pid(id: u32) -> ProcessId {
        ProcessId::new(id).unwrap()
    }

    fn shell(capacity: usize, rows: usize) -> Shell<Vec<u8>> {
        let allocator = Allocator::new(capacity).unwrap();
        let renderer = MemoryMapRenderer::new(rows).unwrap();
        Shell::new(allocator, renderer, Vec::new())
    }

    fn output(shell: &Shell<Vec<u8>>) -> String {
        String::from_utf8(shell.output().clone()).unwrap()
    }

    #[test]
    fn parse_commands() -> TestResult {
        assert_eq!(track!(Command::parse(""))?, None);
        assert_eq!(track!(Command::parse("   "))?, None);
        assert_eq!(
            track!(Command::parse("create foo bar"))?,
            Some(Command::Create("foo bar".to_owned()))
        );
        assert_eq!(track!(Command::parse("PS"))?, Some(Command::ListProcesses));
        assert_eq!(track!(Command::parse("schedule"))?, Some(Command::Schedule));
        assert_eq!(
            track!(Command::parse("Alloc 1 30"))?,
            Some(Command::Allocate(pid(1), 30))
        );
        assert_eq!(track!(Command::parse("free 2"))?, Some(Command::Free(pid(2))));
        assert_eq!(track!(Command::parse("kill 3"))?, Some(Command::Kill(pid(3))));
        assert_eq!(track!(Command::parse("mem"))?, Some(Command::ShowMemory));
        assert_eq!(track!(Command::parse("EXIT"))?, Some(Command::Exit));
        Ok(())
    }

    #[test]
    fn parse_errors() {
        for line in &[
            "create",
            "alloc 1",
            "alloc 0 10",
            "alloc 1 x",
            "free",
            "kill a",
            "unknown",
        ] {
            let e = Command::parse(line).err().unwrap();
            assert_eq!(*e.kind(), ErrorKind::InvalidInput, "{}", line);
        }
    }

    #[test]
    fn run_session() -> TestResult {
        let mut shell = shell(10, 2);
        let input = b"create init\ncreate worker\nalloc 1 4\nalloc 2 3\nps\nmem\nexit\nps\n";
        track!(shell.run(&input[..]))?;

        assert_eq!(
            output(&shell),
            "Created process: PID 1\n\
             Created process: PID 2\n\
             Allocated 4 units to PID 1\n\
             Allocated 3 units to PID 2\n\
             PID 1 [init] : READY\n\
             PID 2 [worker] : READY\n \
             1 1 1 1 2\n \
             2 2 0 0 0\n"
        );
        assert_eq!(shell.allocator().total_free(), 3);
        Ok(())
    }

    #[test]
    fn errors_do_not_stop_the_shell() -> TestResult {
        let mut shell = shell(10, 1);
        let input = b"create a\nbogus\nalloc 1 11\nalloc 1 8\ncreate b\nalloc 2 5\nalloc 9 1\nps\n";
        track!(shell.run(&input[..]))?;

        let text = output(&shell);
        let lines = text.lines().collect::<Vec<_>>();
        assert!(lines[1].starts_with("Invalid command"));
        assert!(lines[2].starts_with("Cannot fulfill allocation request: out of range"));
        assert_eq!(lines[3], "Allocated 8 units to PID 1");
        assert!(lines[5].starts_with("Failed to allocate memory: out of memory"));
        assert!(lines[6].starts_with("Invalid command"));
        assert_eq!(lines[7], "PID 1 [a] : READY");
        assert_eq!(lines[8], "PID 2 [b] : BLOCKED");
        Ok(())
    }

    #[test]
    fn free_and_kill() -> TestResult {
        let mut shell = shell(10, 1);
        let input = b"create a\ncreate b\nalloc 1 3\nalloc 2 3\nfree 1\nfree 1\nkill 2\nschedule\nps\n";
        track!(shell.run(&input[..]))?;

        let text = output(&shell);
        assert!(text.contains("Released 3 units from PID 1\n"));
        assert!(text.contains("Released 0 units from PID 1\n"));
        assert!(text.contains("Terminated process: PID 2 (3 units released)\n"));
        assert!(text.contains("Running process: PID 1\n"));
        assert!(text.ends_with("PID 1 [a] : RUNNING\n"));
        assert_eq!(
            shell.allocator().extents_of(Owner::Free),
            vec![crate::memory::Extent::new(0, 10)]
        );
        assert_eq!(shell.processes().len(), 1);
        Ok(())
    }
}
