//! Processing modes

use std::num::NonZeroUsize;

use cavescan_core::{Error, Result};

/// Processing mode for row-scheduled passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingMode {
    /// Single-threaded processing on the calling thread
    Sequential,
    /// Parallel processing with twice as many workers as hardware threads
    #[default]
    Parallel,
    /// Parallel with a specified number of workers
    ParallelWith(usize),
}

impl ProcessingMode {
    /// Number of rows that may run at once under this mode
    pub fn workers(&self) -> Result<usize> {
        match *self {
            ProcessingMode::Sequential => Ok(1),
            ProcessingMode::Parallel => Ok(2 * hardware_parallelism()),
            ProcessingMode::ParallelWith(0) => Err(Error::invalid_parameter(
                "workers",
                0,
                "a worker pool needs at least one thread",
            )),
            ProcessingMode::ParallelWith(n) => Ok(n),
        }
    }
}

/// Get the number of hardware threads available to this process
pub fn hardware_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
