//! **screenorder** — arrange xrandr outputs by stable monitor identity.
//!
//! Connector names (`DP-1`, `HDMI-0`, …) change when cables, docks or GPUs
//! move around.  screenorder instead identifies each monitor by its EDID,
//! looks it up in a small JSON configuration and places the monitors left
//! to right in the configured order.
//!
//! # Architecture
//!
//! Data flows one way through three pure stages:
//!
//! * [`report`] — parses `xrandr --verbose` into detected outputs and the
//!   set of disabled connectors.
//! * [`resolve`] — matches outputs against the [`config`] by EDID, checks
//!   that orders are unique, sorts them and picks the primary.
//! * [`command`] — computes the framebuffer [`layout`] and renders the
//!   `xrandr` and `i3-msg` command lines.
//!
//! The [`arranger`] drives those stages and executes the result through
//! the [`traits::CommandRunner`] seam, implemented for real processes in
//! [`system`].

pub mod arranger;
pub mod command;
pub mod config;
pub mod layout;
pub mod report;
pub mod resolve;
pub mod system;
pub mod traits;
