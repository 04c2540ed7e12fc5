mod error;
pub use error::{ExecError, ExecResult};

pub mod launch;
pub use launch::{LaunchObserver, LaunchReceipt, LaunchSpec, Launcher, SystemLauncher};

mod killer;
pub use killer::{KillConfig, KillOutcome, ProcessKiller};

pub mod cancel;
pub use cancel::{CancelConfig, CancelOutcome, JobCanceller, KillScript};

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub mod prelude {
    pub use crate::error::{ExecError, ExecResult};
    pub use crate::{
        CancelConfig, CancelOutcome, JobCanceller, KillConfig, KillOutcome, Launcher,
        ProcessKiller, SystemLauncher,
    };
}
