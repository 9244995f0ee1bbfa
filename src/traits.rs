//! The seam between screenorder and the outside world.
//!
//! Parsing, matching and command generation are pure.  Everything that
//! touches a process goes through [`CommandRunner`], so the
//! [`Arranger`](crate::arranger::Arranger) can be driven by the real
//! [`SystemRunner`](crate::system::runner::SystemRunner) or by a test
//! double.

use crate::command::CommandLine;

/// Executes external commands, one at a time, blocking until each exits.
pub trait CommandRunner {
    /// The error type produced by this runner.
    type Error: std::error::Error + Send + 'static;

    /// Run `cmd` and return its stdout.  A non-zero exit is an error.
    fn output(&self, cmd: &CommandLine) -> Result<String, Self::Error>;

    /// Run `cmd` and report whether it exited successfully.  A non-zero
    /// exit is *not* an error here; failing to start the process is.
    fn succeeds(&self, cmd: &CommandLine) -> Result<bool, Self::Error>;

    /// Run `cmd` for its side effect.  A non-zero exit is an error.
    fn run(&self, cmd: &CommandLine) -> Result<(), Self::Error>;
}
