use trackable::error::ErrorKindExt;

/// crate固有のエラー型.
#[derive(Debug, Clone, TrackableError)]
pub struct Error(trackable::error::TrackableError<ErrorKind>);
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::InvalidInput {
            ErrorKind::InvalidInput.cause(e).into()
        } else {
            ErrorKind::Other.cause(e).into()
        }
    }
}
impl From<std::num::ParseIntError> for Error {
    fn from(e: std::num::ParseIntError) -> Self {
        ErrorKind::InvalidInput.cause(e).into()
    }
}

/// 発生し得るエラーの種別.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 要求サイズがアドレス空間全体の容量を超えている.
    ///
    /// 断片化の状況に関わらず、この要求が満たされることはない.
    ///
    /// # 典型的な対応策
    ///
    /// - 要求サイズを見直す (容量を変えない限り、リトライは無意味)
    OutOfRange,

    /// 要求サイズが現在の空き容量を超えている.
    ///
    /// 他のプロセスがメモリを解放すれば、後で満たせるようになる可能性がある.
    ///
    /// # 典型的な対応策
    ///
    /// - 時間をおいてリトライする
    /// - 要求元のプロセスをブロックないし終了させる
    OutOfMemory,

    /// 入力が不正.
    ///
    /// # 典型的な対応策
    ///
    /// - 利用者側のプログラムを修正して入力を正しくする
    InvalidInput,

    /// 内部状態が不整合に陥っている.
    ///
    /// プログラムにバグがあることを示している.
    ///
    /// # 典型的な対応策
    ///
    /// - バグ修正を行ってプログラムを更新する
    InconsistentState,

    /// その他エラー.
    ///
    /// E.g., シェルの入出力エラー
    Other,
}
impl trackable::error::ErrorKind for ErrorKind {}
