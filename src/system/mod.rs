//! Process-backed implementations.
//!
//! This module provides the concrete backend for the
//! [`CommandRunner`](crate::traits::CommandRunner) trait, spawning real
//! `xrandr`, `pgrep` and `i3-msg` processes.
//!
//! Nothing outside this module should spawn processes directly.

pub mod runner;
