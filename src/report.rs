//! Parser for `xrandr --verbose` reports.
//!
//! The report is free-form text.  Only four kinds of lines matter:
//!
//! | Line                              | Example                                        |
//! |-----------------------------------|------------------------------------------------|
//! | output header (column 0)          | `DP-1 connected primary 1920x1200+0+0 ...`     |
//! | descriptor marker                 | `\tEDID:`                                      |
//! | descriptor data (inside a block)  | `\t\t00ffffffffffff0010acb8a04c4d4a30`         |
//! | mode line                         | `  1920x1200 (0x1c2) 154.000MHz ... +preferred`|
//!
//! [`ReportParser`] walks the text one line at a time with an explicit
//! [`ScanState`].  In [`ScanState::Scanning`] it looks for headers, mode
//! lines and the `EDID:` marker.  The marker switches it to
//! [`ScanState::Munching`], where every line is collected into the EDID blob
//! until a line containing `:` (the next property) ends the block.
//!
//! The concatenated EDID hex is the stable identity of a monitor; the
//! connector name is not, since it changes with cables and docks.
//!
//! An output whose header is followed by neither a descriptor block nor
//! anything else before the next header (or the end of the text) is
//! classified as disabled.

use crate::layout::Resolution;
use log::debug;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

/// Connector-name prefixes that start an output section.
pub const HEADER_PREFIXES: &[&str] = &[
    "DP-",
    "HDMI-",
    "eDP-",
    "DVI-",
    "DisplayPort-",
    "VGA-",
    "LVDS-",
];

/// Line (after trimming) that opens the EDID hex block.
const DESCRIPTOR_MARKER: &str = "EDID:";

/// Any line containing this character ends the EDID hex block.
const DESCRIPTOR_DELIMITER: char = ':';

/// Matches e.g. `  3840x2160 (0x21e) 533.250MHz +HSync -VSync +preferred`.
static MODE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+)x(\d+) \(0x[0-9a-f]+\)").expect("mode line regex is valid")
});

/// A connected output as found in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectedOutput {
    /// Connector name, e.g. `"DP-1"`.
    pub name: String,
    /// Concatenated EDID hex, used as the stable identity.
    pub edid: String,
    /// Preferred mode, or the first listed mode if none is preferred.
    pub resolution: Option<Resolution>,
}

/// Everything the parser extracted from one report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Outputs that produced an EDID block, keyed by connector name.
    pub outputs: BTreeMap<String, DetectedOutput>,
    /// Connector names that appeared as headers but never produced an EDID.
    pub disabled: BTreeSet<String>,
}

/// Scanner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Looking for headers, mode lines and the EDID marker.
    Scanning,
    /// Collecting EDID hex lines.
    Munching,
}

/// Classification of a single line while scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanLine<'a> {
    /// Start of a new output section, carrying the connector name.
    Header(&'a str),
    /// The `EDID:` marker.
    DescriptorMarker,
    /// A mode line.
    Mode {
        resolution: Resolution,
        preferred: bool,
    },
    /// Anything else.
    Other,
}

impl<'a> ScanLine<'a> {
    /// Classify `line` as seen in [`ScanState::Scanning`].
    pub fn classify(line: &'a str) -> Self {
        if line.trim() == DESCRIPTOR_MARKER {
            return ScanLine::DescriptorMarker;
        }
        if HEADER_PREFIXES.iter().any(|p| line.starts_with(p)) {
            if let Some(name) = line.split_whitespace().next() {
                return ScanLine::Header(name);
            }
        }
        if let Some(caps) = MODE_LINE.captures(line) {
            if let (Ok(width), Ok(height)) = (caps[1].parse(), caps[2].parse()) {
                return ScanLine::Mode {
                    resolution: Resolution::new(width, height),
                    preferred: line.contains("+preferred"),
                };
            }
        }
        ScanLine::Other
    }
}

/// Incremental, line-at-a-time report parser.
///
/// Feed lines with [`feed`](Self::feed) and collect the result with
/// [`finish`](Self::finish).  Never looks ahead and never fails:
/// unrecognised lines are ignored.
#[derive(Debug)]
pub struct ReportParser {
    state: ScanState,
    /// Connector name of the section being read.
    current: Option<String>,
    /// Mode seen for `current` before its EDID block was complete.
    pending_mode: Option<Resolution>,
    buffer: Vec<String>,
    report: Report,
}

impl Default for ReportParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportParser {
    pub fn new() -> Self {
        Self {
            state: ScanState::Scanning,
            current: None,
            pending_mode: None,
            buffer: Vec::new(),
            report: Report::default(),
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Connector name of the section currently being read.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Consume one line of the report.
    pub fn feed(&mut self, line: &str) {
        match self.state {
            ScanState::Scanning => self.scan(line),
            ScanState::Munching => self.munch(line),
        }
    }

    /// Close the last section and return the parsed report.
    ///
    /// An EDID block still open at end of input is discarded.
    pub fn finish(mut self) -> Report {
        if self.state == ScanState::Munching {
            debug!("report ended inside an EDID block, discarding it");
        }
        self.close_section();
        self.report
    }

    fn scan(&mut self, line: &str) {
        match ScanLine::classify(line) {
            ScanLine::DescriptorMarker => {
                debug!("EDID block for {:?}", self.current);
                self.state = ScanState::Munching;
                self.buffer.clear();
            }
            ScanLine::Header(name) => {
                self.close_section();
                debug!("output section {}", name);
                self.current = Some(name.to_string());
            }
            ScanLine::Mode {
                resolution,
                preferred,
            } => self.record_mode(resolution, preferred),
            ScanLine::Other => {}
        }
    }

    fn munch(&mut self, line: &str) {
        if !line.contains(DESCRIPTOR_DELIMITER) {
            self.buffer.push(line.trim().to_string());
            return;
        }

        let edid = self.buffer.concat();
        self.buffer.clear();
        self.state = ScanState::Scanning;

        let Some(name) = self.current.clone() else {
            debug!("EDID block outside any output section, ignoring");
            return;
        };
        let pending = self.pending_mode.take();
        self.report.disabled.remove(&name);
        self.report
            .outputs
            .entry(name.clone())
            .or_insert_with(|| DetectedOutput {
                name,
                edid,
                resolution: pending,
            });
    }

    /// A preferred mode always wins; any other mode only fills a gap.
    fn record_mode(&mut self, resolution: Resolution, preferred: bool) {
        let Some(name) = self.current.as_deref() else {
            return;
        };
        let slot = match self.report.outputs.get_mut(name) {
            Some(output) => &mut output.resolution,
            None => &mut self.pending_mode,
        };
        if preferred || slot.is_none() {
            *slot = Some(resolution);
        }
    }

    /// Classify the section being left: no EDID entry means disabled.
    fn close_section(&mut self) {
        self.pending_mode = None;
        if let Some(name) = self.current.take() {
            if !self.report.outputs.contains_key(&name) {
                debug!("{} has no EDID, treating it as disabled", name);
                self.report.disabled.insert(name);
            }
        }
    }
}

/// Parse a complete `xrandr --verbose` report.
pub fn parse_report(text: &str) -> Report {
    let mut parser = ReportParser::new();
    for line in text.lines() {
        parser.feed(line);
    }
    parser.finish()
}
