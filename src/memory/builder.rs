use prometrics::metrics::MetricBuilder;
use slog::{Discard, Logger};

use super::allocator::Allocator;
use crate::{ErrorKind, Result};

/// `Allocator`のビルダ.
#[derive(Debug, Clone)]
pub struct AllocatorBuilder {
    pub(crate) logger: Logger,
    pub(crate) metrics: MetricBuilder,
}
impl AllocatorBuilder {
    /// デフォルト設定で`AllocatorBuilder`インスタンスを生成する.
    pub fn new() -> Self {
        AllocatorBuilder {
            logger: Logger::root(Discard, o!()),
            metrics: MetricBuilder::new(),
        }
    }

    /// アロケータ用の logger を登録する.
    ///
    /// デフォルトでは、ログは全て破棄される.
    pub fn logger(&mut self, logger: Logger) -> &mut Self {
        self.logger = logger;
        self
    }

    /// メトリクス用の共通設定を登録する.
    ///
    /// デフォルト値は`MetricBuilder::new()`.
    pub fn metrics(&mut self, metrics: MetricBuilder) -> &mut Self {
        self.metrics = metrics;
        self
    }

    /// 容量`capacity`(単位数)のアドレス空間を管理する`Allocator`を生成する.
    ///
    /// 生成直後は、アドレス空間全体が一つの空き領域となっている.
    ///
    /// # Errors
    ///
    /// `capacity`が`0`の場合には`ErrorKind::InvalidInput`エラーが返される.
    pub fn build(&self, capacity: usize) -> Result<Allocator> {
        track_assert!(capacity > 0, ErrorKind::InvalidInput);
        Ok(Allocator::from_builder(self, capacity))
    }
}
impl Default for AllocatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
