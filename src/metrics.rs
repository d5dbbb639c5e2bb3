//! [Prometheus][prometheus]用のメトリクス.
//!
//! [prometheus]: https://prometheus.io/
use prometrics::metrics::{Counter, Gauge, MetricBuilder};

use crate::memory::AllocationPath;

/// [`Allocator`]のメトリクス.
///
/// [`Allocator`]: ../memory/struct.Allocator.html
#[derive(Debug, Clone)]
pub struct AllocatorMetrics {
    pub(crate) best_fit_allocations: Counter,
    pub(crate) fragmented_allocations: Counter,
    pub(crate) allocated_units: Counter,
    pub(crate) released_extents: Counter,
    pub(crate) released_units: Counter,
    pub(crate) out_of_memory_failures: Counter,
    pub(crate) out_of_range_failures: Counter,
    pub(crate) free_units: Gauge,
    pub(crate) capacity: usize,
}
impl AllocatorMetrics {
    /// アドレス空間の容量.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 割当の成功回数.
    ///
    /// 返り値のタプルの第一要素は`path="best_fit"`ラベルを持ち、第二要素は`path="fragmented"`ラベルを持つ.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// extalloc_allocator_allocations_total { path="best_fit|fragmented" } <COUNTER>
    /// ```
    pub fn allocations(&self) -> (u64, u64) {
        (
            self.best_fit_allocations.value() as u64,
            self.fragmented_allocations.value() as u64,
        )
    }

    /// これまでに割り当てた単位数の合計.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// extalloc_allocator_allocated_units_total <COUNTER>
    /// ```
    pub fn allocated_units(&self) -> u64 {
        self.allocated_units.value() as u64
    }

    /// 解放された部分領域の数.
    ///
    /// 空き領域との結合前の(i.e., プロセスが保持していた)部分領域の数を数える.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// extalloc_allocator_released_extents_total <COUNTER>
    /// ```
    pub fn released_extents(&self) -> u64 {
        self.released_extents.value() as u64
    }

    /// これまでに解放された単位数の合計.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// extalloc_allocator_released_units_total <COUNTER>
    /// ```
    pub fn released_units(&self) -> u64 {
        self.released_units.value() as u64
    }

    /// 空き容量不足による割当失敗回数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// extalloc_allocator_out_of_memory_failures_total <COUNTER>
    /// ```
    pub fn out_of_memory_failures(&self) -> u64 {
        self.out_of_memory_failures.value() as u64
    }

    /// 容量超過の要求による割当失敗回数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// extalloc_allocator_out_of_range_failures_total <COUNTER>
    /// ```
    pub fn out_of_range_failures(&self) -> u64 {
        self.out_of_range_failures.value() as u64
    }

    /// 現在の空き単位数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// extalloc_allocator_free_units <GAUGE>
    /// ```
    pub fn free_units(&self) -> u64 {
        self.free_units.value() as u64
    }

    /// 現在の使用単位数.
    pub fn usage_units(&self) -> u64 {
        // NOTE: 以下の順番で値を取得しないとアンダーフローする可能性がある
        let dec = self.released_units();
        let inc = self.allocated_units();
        inc - dec
    }

    pub(crate) fn new(builder: &MetricBuilder, capacity: usize) -> Self {
        let mut builder = builder.clone();
        builder.namespace("extalloc").subsystem("allocator");
        let metrics = AllocatorMetrics {
            best_fit_allocations: builder
                .counter("allocations_total")
                .help("Number of successful allocations")
                .label("path", "best_fit")
                .finish()
                .expect("Never fails"),
            fragmented_allocations: builder
                .counter("allocations_total")
                .help("Number of successful allocations")
                .label("path", "fragmented")
                .finish()
                .expect("Never fails"),
            allocated_units: builder
                .counter("allocated_units_total")
                .help("Number of allocated address units")
                .finish()
                .expect("Never fails"),
            released_extents: builder
                .counter("released_extents_total")
                .help("Number of extents returned to the free pool")
                .finish()
                .expect("Never fails"),
            released_units: builder
                .counter("released_units_total")
                .help("Number of released address units")
                .finish()
                .expect("Never fails"),
            out_of_memory_failures: builder
                .counter("out_of_memory_failures_total")
                .help("Number of allocation failures caused by no available space")
                .finish()
                .expect("Never fails"),
            out_of_range_failures: builder
                .counter("out_of_range_failures_total")
                .help("Number of allocation requests exceeding the capacity")
                .finish()
                .expect("Never fails"),
            free_units: builder
                .gauge("free_units")
                .help("Number of free address units")
                .finish()
                .expect("Never fails"),
            capacity,
        };
        metrics.free_units.set(capacity as f64);
        metrics
    }

    pub(crate) fn count_allocation(&self, units: usize, path: AllocationPath) {
        match path {
            AllocationPath::BestFit => self.best_fit_allocations.increment(),
            AllocationPath::Fragmented => self.fragmented_allocations.increment(),
        }
        self.allocated_units.add_u64(units as u64);
    }

    pub(crate) fn count_releasion(&self, extents: usize, units: usize) {
        self.released_extents.add_u64(extents as u64);
        self.released_units.add_u64(units as u64);
    }

    pub(crate) fn set_free_units(&self, units: usize) {
        self.free_units.set(units as f64);
    }
}
