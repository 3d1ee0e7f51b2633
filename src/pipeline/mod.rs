//! Analysis pipeline: cancellation token, worker invoker, scheduler, progress tracker,
//! finding log, and the [`Pipeline`] facade that wires them together.

pub mod aggregator;
pub mod cancel;
pub mod invoker;
pub mod orchestrator;
mod process;
pub mod scheduler;
pub mod tracker;

pub use aggregator::FindingLog;
pub use cancel::CancelToken;
pub use invoker::{AnalyzerCommand, Invoker};
pub use orchestrator::Pipeline;
pub use scheduler::{Completion, SchedulerHandles, pool_size};
pub use tracker::ProgressTracker;
