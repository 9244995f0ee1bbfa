//! External command lines produced by screenorder.
//!
//! This module turns an ordered monitor list into the `xrandr` invocation
//! that applies the layout and the `i3-msg` invocations that move
//! workspaces onto their monitors.  Nothing here runs a process; see
//! [`CommandRunner`](crate::traits::CommandRunner) for that.
//!
//! Example result for three 1920-wide monitors with panning forced:
//!
//! ```text
//! xrandr --fb 5760x1200 \
//!     --output DP-6 --mode 1920x1080 --pos 0x0 --panning 1920x1080+0+0 \
//!     --output DP-0.2.1.8 --mode 1920x1200 --pos 1920x0 --panning 1920x1200+1920+0 --primary \
//!     --output DP-0.2.1.1 --mode 1920x1200 --pos 3840x0 --panning 1920x1200+3840+0
//! ```

use crate::layout::Layout;
use crate::resolve::ConfiguredMonitor;
use std::collections::BTreeSet;
use std::fmt;

pub const XRANDR: &str = "xrandr";
pub const I3_MSG: &str = "i3-msg";
const PGREP: &str = "pgrep";

/// A program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// `xrandr --verbose`, whose output is the report to parse.
pub fn xrandr_query() -> CommandLine {
    CommandLine::new(XRANDR).arg("--verbose")
}

/// `pgrep -x i3`; succeeds only while i3 is running.
pub fn i3_probe() -> CommandLine {
    CommandLine::new(PGREP).args(["-x", "i3"])
}

/// Build the `xrandr` command that applies the layout.
///
/// `monitors` must already be in left-to-right order.  Every name in
/// `disabled` is switched off after the enabled outputs are placed.
pub fn xrandr_command(
    monitors: &[ConfiguredMonitor],
    disabled: &BTreeSet<String>,
    force_panning: bool,
) -> CommandLine {
    let layout = Layout::left_to_right(monitors.iter().map(|m| (m.resolution, m.rotate)));
    let mut cmd = CommandLine::new(XRANDR).args(["--fb".to_string(), layout.framebuffer().to_string()]);

    for (m, offset) in monitors.iter().zip(&layout.offsets) {
        cmd = cmd.args([
            "--output".to_string(),
            m.name.clone(),
            "--mode".to_string(),
            m.resolution.to_string(),
            "--pos".to_string(),
            format!("{}x0", offset),
        ]);
        if force_panning {
            cmd = cmd.args(["--panning".to_string(), format!("{}+{}+0", m.resolution, offset)]);
        }
        if let Some(rotate) = m.rotate {
            cmd = cmd.args(["--rotate".to_string(), rotate.to_string()]);
        }
        if m.primary {
            cmd = cmd.arg("--primary");
        }
    }

    for name in disabled {
        cmd = cmd.args(["--output", name.as_str(), "--off"]);
    }
    cmd
}

/// Build one `i3-msg` command per workspace assignment.
///
/// A monitor with `i3-workspaces` gets each listed workspace; any other
/// monitor gets the workspace numbered like its `order`.
pub fn i3_commands(monitors: &[ConfiguredMonitor]) -> Vec<CommandLine> {
    let mut cmds = Vec::new();
    for m in monitors {
        match &m.i3_workspaces {
            Some(workspaces) => {
                for ws in workspaces {
                    cmds.push(move_workspace(&ws.to_string(), &m.name));
                }
            }
            None => cmds.push(move_workspace(&m.order.to_string(), &m.name)),
        }
    }
    cmds
}

fn move_workspace(workspace: &str, output: &str) -> CommandLine {
    CommandLine::new(I3_MSG).arg(format!(
        "workspace number {}; move workspace to output {}",
        workspace, output
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Workspace;
    use crate::layout::{Resolution, Rotation};

    fn monitor(name: &str, order: u32, w: u32, h: u32) -> ConfiguredMonitor {
        ConfiguredMonitor {
            name: name.into(),
            edid: format!("edid-{}", name),
            order,
            description: None,
            resolution: Resolution::new(w, h),
            rotate: None,
            primary: false,
            i3_workspaces: None,
        }
    }

    fn args(cmd: &CommandLine) -> Vec<&str> {
        cmd.args.iter().map(String::as_str).collect()
    }

    #[test]
    fn two_monitors_side_by_side() {
        let mut a = monitor("DP-1", 1, 1920, 1200);
        a.primary = true;
        let b = monitor("HDMI-0", 2, 1920, 1080);
        let cmd = xrandr_command(&[a, b], &BTreeSet::new(), false);
        assert_eq!(cmd.program, "xrandr");
        assert_eq!(
            args(&cmd),
            vec![
                "--fb", "3840x1200",
                "--output", "DP-1", "--mode", "1920x1200", "--pos", "0x0", "--primary",
                "--output", "HDMI-0", "--mode", "1920x1080", "--pos", "1920x0",
            ]
        );
    }

    #[test]
    fn panning_rotation_and_disabled() {
        let mut a = monitor("DP-1", 1, 1920, 1080);
        a.rotate = Some(Rotation::Left);
        let b = monitor("DP-2", 2, 2560, 1440);
        let disabled: BTreeSet<String> = ["eDP-1".to_string(), "DP-0".to_string()].into();
        let cmd = xrandr_command(&[a, b], &disabled, true);
        assert_eq!(
            args(&cmd),
            vec![
                "--fb", "3640x1920",
                "--output", "DP-1", "--mode", "1920x1080", "--pos", "0x0",
                "--panning", "1920x1080+0+0", "--rotate", "left",
                "--output", "DP-2", "--mode", "2560x1440", "--pos", "1080x0",
                "--panning", "2560x1440+1080+0",
                "--output", "DP-0", "--off",
                "--output", "eDP-1", "--off",
            ]
        );
    }

    #[test]
    fn display_joins_argv() {
        let cmd = xrandr_command(&[monitor("DP-1", 1, 800, 600)], &BTreeSet::new(), false);
        assert_eq!(
            cmd.to_string(),
            "xrandr --fb 800x600 --output DP-1 --mode 800x600 --pos 0x0"
        );
    }

    #[test]
    fn i3_uses_order_as_default_workspace() {
        let cmds = i3_commands(&[monitor("DP-1", 1, 1, 1), monitor("DP-2", 2, 1, 1)]);
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0].program, "i3-msg");
        assert_eq!(
            args(&cmds[0]),
            vec!["workspace number 1; move workspace to output DP-1"]
        );
        assert_eq!(
            args(&cmds[1]),
            vec!["workspace number 2; move workspace to output DP-2"]
        );
    }

    #[test]
    fn i3_explicit_workspaces() {
        let mut a = monitor("DP-1", 1, 1, 1);
        a.i3_workspaces = Some(vec![Workspace::from(3), Workspace("mail".into())]);
        let b = monitor("DP-2", 5, 1, 1);
        let cmds = i3_commands(&[a, b]);
        let rendered: Vec<String> = cmds.iter().map(|c| c.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "i3-msg workspace number 3; move workspace to output DP-1",
                "i3-msg workspace number mail; move workspace to output DP-1",
                "i3-msg workspace number 5; move workspace to output DP-2",
            ]
        );
    }

    #[test]
    fn empty_workspace_list_emits_nothing() {
        let mut a = monitor("DP-1", 1, 1, 1);
        a.i3_workspaces = Some(Vec::new());
        assert!(i3_commands(&[a]).is_empty());
    }

    #[test]
    fn query_and_probe() {
        assert_eq!(xrandr_query().to_string(), "xrandr --verbose");
        assert_eq!(i3_probe().to_string(), "pgrep -x i3");
    }
}
