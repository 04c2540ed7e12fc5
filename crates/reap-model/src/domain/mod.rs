mod app_id;
pub use app_id::ApplicationId;

mod task_id;
pub use task_id::TaskId;

mod task;
pub use task::TaskDescriptor;

/// Operating-system process identifier as recorded by the scheduler.
///
/// `0` is the "never started" sentinel, see [`NO_PID`].
pub type Pid = u32;

/// Pid recorded for a task whose process was never launched.
pub const NO_PID: Pid = 0;
