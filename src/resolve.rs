//! Matching detected outputs against the monitor configuration.
//!
//! The [`MonitorResolver`] looks up each detected output by EDID, merges
//! the configured overrides into it and returns the matched monitors in
//! `order`.  Outputs without an entry are reported with a ready-to-paste
//! template and left out; they do not abort the run.  Two matched
//! monitors sharing an `order` do.

use crate::config::{self, MonitorConfig, Workspace};
use crate::layout::{Resolution, Rotation};
use crate::report::DetectedOutput;
use log::{info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// A detected output merged with its configuration entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfiguredMonitor {
    /// Connector name, e.g. `"DP-1"`.
    pub name: String,
    pub edid: String,
    pub order: u32,
    pub description: Option<String>,
    /// Configured override, else the detected mode.
    pub resolution: Resolution,
    pub rotate: Option<Rotation>,
    pub primary: bool,
    pub i3_workspaces: Option<Vec<Workspace>>,
}

/// Errors that prevent a layout from being produced.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Two or more matched monitors share an `order` value.
    #[error("monitor order collision: {}", format_collisions(.0))]
    OrderCollision(Vec<(String, u32)>),

    /// A matched monitor has no detected mode and no configured override.
    #[error("no resolution known for {output}; set \"resolution\" in the config")]
    MissingResolution { output: String },

    /// Not a single detected monitor has a configuration entry.
    #[error("no configured monitor is connected")]
    NoMatchedMonitors,

    /// Writing a diagnostic failed.
    #[error("failed to write diagnostics: {0}")]
    Io(#[from] std::io::Error),
}

fn format_collisions(collisions: &[(String, u32)]) -> String {
    collisions
        .iter()
        .map(|(name, order)| format!("{} (order {})", name, order))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolves detected outputs into an ordered monitor list.
///
/// The config path is only used in diagnostics, so users know which file
/// to edit.
pub struct MonitorResolver<'a> {
    config: &'a MonitorConfig,
    config_path: &'a Path,
}

impl<'a> MonitorResolver<'a> {
    pub fn new(config: &'a MonitorConfig, config_path: &'a Path) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Match, merge, check and sort.
    ///
    /// Diagnostics for unmatched outputs and order collisions are written
    /// to `out`.  On success the result is non-empty, sorted by `order`,
    /// and has at least one primary monitor.
    pub fn resolve<W: Write>(
        &self,
        detected: &BTreeMap<String, DetectedOutput>,
        out: &mut W,
    ) -> Result<Vec<ConfiguredMonitor>, ResolveError> {
        let mut matched = Vec::new();
        for output in detected.values() {
            match self.config.get(&output.edid) {
                Some(entry) => {
                    let resolution = entry.resolution.or(output.resolution).ok_or_else(|| {
                        ResolveError::MissingResolution {
                            output: output.name.clone(),
                        }
                    })?;
                    matched.push(ConfiguredMonitor {
                        name: output.name.clone(),
                        edid: output.edid.clone(),
                        order: entry.order,
                        description: entry.description.clone(),
                        resolution,
                        rotate: entry.rotate,
                        primary: entry.primary == Some(true),
                        i3_workspaces: entry.i3_workspaces.clone(),
                    });
                }
                None => self.report_unmatched(output, out)?,
            }
        }

        let collisions = find_collisions(&matched);
        if !collisions.is_empty() {
            writeln!(out, "Monitor order collision in set:")?;
            writeln!(out, "{:#}", serde_json::json!(matched))?;
            return Err(ResolveError::OrderCollision(collisions));
        }

        if matched.is_empty() {
            return Err(ResolveError::NoMatchedMonitors);
        }

        matched.sort_by_key(|m| m.order);
        assign_primary(&mut matched);
        info!(
            "resolved order: {}",
            matched
                .iter()
                .map(|m| m.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(matched)
    }

    fn report_unmatched<W: Write>(
        &self,
        output: &DetectedOutput,
        out: &mut W,
    ) -> std::io::Result<()> {
        warn!(
            "monitor {} is not in {}, skipping it",
            output.name,
            self.config_path.display()
        );
        writeln!(
            out,
            "Did not find monitor {} in {}",
            output.name,
            self.config_path.display()
        )?;
        writeln!(out, "Insert:")?;
        writeln!(out, "{:#}", config::template(&output.edid))
    }
}

/// Every monitor whose `order` is shared with another one.
fn find_collisions(monitors: &[ConfiguredMonitor]) -> Vec<(String, u32)> {
    let mut by_order: BTreeMap<u32, Vec<&str>> = BTreeMap::new();
    for m in monitors {
        by_order.entry(m.order).or_default().push(&m.name);
    }
    by_order
        .into_iter()
        .filter(|(_, names)| names.len() > 1)
        .flat_map(|(order, names)| names.into_iter().map(move |n| (n.to_string(), order)))
        .collect()
}

/// Explicit primaries win (first one in order only); otherwise the most
/// central monitor, biased left for even counts.
fn assign_primary(sorted: &mut [ConfiguredMonitor]) {
    let explicit: Vec<usize> = sorted
        .iter()
        .enumerate()
        .filter(|(_, m)| m.primary)
        .map(|(i, _)| i)
        .collect();

    if let Some((&keep, rest)) = explicit.split_first() {
        for &i in rest {
            warn!(
                "{} is also marked primary, keeping {}",
                sorted[i].name, sorted[keep].name
            );
            sorted[i].primary = false;
        }
        return;
    }

    let index = sorted.len().saturating_sub(1) / 2;
    if let Some(m) = sorted.get_mut(index) {
        m.primary = true;
    }
}
