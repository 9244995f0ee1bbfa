//! The orchestrator that ties parsing, matching and command generation
//! to a [`CommandRunner`].
//!
//! One [`Arranger::run`] is one pass of the whole pipeline against a
//! single `xrandr --verbose` snapshot:
//!
//! 1. query the report and parse it,
//! 2. resolve detected outputs against the configuration,
//! 3. print and run the `xrandr` command,
//! 4. if i3 is running, print and run each `i3-msg` command in order.
//!
//! Commands run strictly one after another; the first failure stops the
//! run.  In dry-run mode the query and the i3 probe still run, but the
//! generated commands are only printed.

use crate::command::{self, CommandLine};
use crate::config::MonitorConfig;
use crate::report::{parse_report, Report};
use crate::resolve::{ConfiguredMonitor, MonitorResolver, ResolveError};
use crate::traits::CommandRunner;
use log::info;
use std::io::Write;
use std::path::PathBuf;

/// Possible errors from a run.
#[derive(Debug, thiserror::Error)]
pub enum ArrangeError {
    /// No usable layout could be computed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// An external command could not be run or exited non-zero.
    #[error("command error: {0}")]
    Command(String),

    /// Writing to the output stream failed.
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}

/// Flags that change how a run behaves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Print generated commands without running them.
    pub dry_run: bool,
    /// Add a `--panning` clause for every output.
    pub force_panning: bool,
}

/// Commands computed from one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Matched monitors, left to right.
    pub monitors: Vec<ConfiguredMonitor>,
    pub xrandr: CommandLine,
    /// Workspace moves, to be run only if i3 is alive.
    pub i3: Vec<CommandLine>,
}

/// Orchestrates a screenorder run.
///
/// Generic over any [`CommandRunner`], so the whole pipeline can be
/// exercised without spawning processes.
pub struct Arranger<R: CommandRunner> {
    runner: R,
    config: MonitorConfig,
    config_path: PathBuf,
    options: Options,
}

impl<R: CommandRunner> Arranger<R> {
    /// `config_path` is where `config` was loaded from; it only appears
    /// in diagnostics.
    pub fn new(runner: R, config: MonitorConfig, config_path: PathBuf, options: Options) -> Self {
        Self {
            runner,
            config,
            config_path,
            options,
        }
    }

    /// Compute the commands for an already parsed report.
    ///
    /// Diagnostics about unmatched or colliding monitors go to `out`.
    pub fn plan<W: Write>(&self, report: &Report, out: &mut W) -> Result<Plan, ArrangeError> {
        let monitors =
            MonitorResolver::new(&self.config, &self.config_path).resolve(&report.outputs, out)?;
        let xrandr = command::xrandr_command(&monitors, &report.disabled, self.options.force_panning);
        let i3 = command::i3_commands(&monitors);
        Ok(Plan {
            monitors,
            xrandr,
            i3,
        })
    }

    /// Run the whole pipeline once.
    pub fn run<W: Write>(&self, out: &mut W) -> Result<(), ArrangeError> {
        let text = self
            .runner
            .output(&command::xrandr_query())
            .map_err(|e| ArrangeError::Command(e.to_string()))?;
        let report = parse_report(&text);
        info!(
            "found {} output(s) with EDID, {} disabled",
            report.outputs.len(),
            report.disabled.len()
        );

        let plan = self.plan(&report, out)?;
        self.execute(&plan.xrandr, out)?;

        if !self.i3_running()? {
            info!("i3 is not running, leaving workspaces alone");
            return Ok(());
        }
        for cmd in &plan.i3 {
            self.execute(cmd, out)?;
        }
        Ok(())
    }

    fn i3_running(&self) -> Result<bool, ArrangeError> {
        self.runner
            .succeeds(&command::i3_probe())
            .map_err(|e| ArrangeError::Command(e.to_string()))
    }

    fn execute<W: Write>(&self, cmd: &CommandLine, out: &mut W) -> Result<(), ArrangeError> {
        writeln!(out, "Running \"{}\"", cmd)?;
        if self.options.dry_run {
            return Ok(());
        }
        self.runner
            .run(cmd)
            .map_err(|e| ArrangeError::Command(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitorConfigEntry;
    use crate::layout::Resolution;
    use crate::traits::mock::MockRunner;

    const REPORT: &str = "\
Screen 0: minimum 8 x 8, current 3840 x 1200, maximum 32767 x 32767
DP-1 connected 1920x1200+0+0 (0x1c2) normal
\tEDID:
\t\tAAAA
\t\tAAAA
\tBorderDimensions: 4
  1920x1080 (0x1c3) 148.500MHz +HSync +VSync
  1920x1200 (0x1c2) 154.000MHz +HSync -VSync *current +preferred
HDMI-0 connected 1920x1080+1920+0 (0x1c4) normal
\tEDID:
\t\tBBBB
\tBorderDimensions: 4
  1920x1080 (0x1c4) 148.500MHz +HSync +VSync *current +preferred
";

    const XRANDR: &str = "xrandr --fb 3840x1200 \
        --output DP-1 --mode 1920x1200 --pos 0x0 --primary \
        --output HDMI-0 --mode 1920x1080 --pos 1920x0";

    fn config() -> MonitorConfig {
        let mut cfg = MonitorConfig::default();
        cfg.insert("AAAAAAAA", MonitorConfigEntry::new(1));
        cfg.insert("BBBB", MonitorConfigEntry::new(2));
        cfg
    }

    fn runner(i3: bool) -> MockRunner {
        let mut runner = MockRunner::default();
        runner
            .outputs
            .insert("xrandr --verbose".into(), REPORT.into());
        if i3 {
            runner.succeeding.push("pgrep -x i3".into());
        }
        runner
    }

    fn arranger(runner: MockRunner, options: Options) -> Arranger<MockRunner> {
        Arranger::new(
            runner,
            config(),
            PathBuf::from("/home/me/.config/screenorder/screenorder_config.json"),
            options,
        )
    }

    fn printed(out: Vec<u8>) -> String {
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn plan_two_monitors() {
        let arranger = arranger(runner(false), Options::default());
        let mut out = Vec::new();
        let plan = arranger.plan(&parse_report(REPORT), &mut out).unwrap();

        assert_eq!(plan.xrandr.to_string(), XRANDR);
        assert_eq!(plan.monitors[0].resolution, Resolution::new(1920, 1200));
        assert!(plan.monitors[0].primary);
        assert!(!plan.monitors[1].primary);
        assert_eq!(plan.i3.len(), 2);
        assert!(out.is_empty());
    }

    #[test]
    fn disabled_output_is_switched_off_even_if_configured() {
        let report = parse_report(&format!("eDP-1 connected\n{}", REPORT));
        let mut cfg = config();
        cfg.insert("CCCC", MonitorConfigEntry::new(3));
        let arranger = Arranger::new(runner(false), cfg, PathBuf::from("cfg.json"), Options::default());

        let plan = arranger.plan(&report, &mut Vec::new()).unwrap();
        assert!(plan.monitors.iter().all(|m| m.name != "eDP-1"));
        assert_eq!(plan.xrandr.to_string(), format!("{} --output eDP-1 --off", XRANDR));
    }

    #[test]
    fn run_executes_xrandr_then_i3() {
        let arranger = arranger(runner(true), Options::default());
        let mut out = Vec::new();
        arranger.run(&mut out).unwrap();

        assert_eq!(
            arranger.runner.ran(),
            vec![
                "xrandr --verbose".to_string(),
                XRANDR.to_string(),
                "pgrep -x i3".to_string(),
                "i3-msg workspace number 1; move workspace to output DP-1".to_string(),
                "i3-msg workspace number 2; move workspace to output HDMI-0".to_string(),
            ]
        );
        let out = printed(out);
        assert!(out.starts_with(&format!("Running \"{}\"\n", XRANDR)));
        assert_eq!(out.lines().count(), 3);
    }

    #[test]
    fn run_skips_i3_when_not_running() {
        let arranger = arranger(runner(false), Options::default());
        let mut out = Vec::new();
        arranger.run(&mut out).unwrap();
        assert_eq!(
            arranger.runner.ran(),
            vec!["xrandr --verbose", XRANDR, "pgrep -x i3"]
        );
        assert_eq!(printed(out).lines().count(), 1);
    }

    #[test]
    fn dry_run_only_prints() {
        let options = Options {
            dry_run: true,
            ..Options::default()
        };
        let arranger = arranger(runner(true), options);
        let mut out = Vec::new();
        arranger.run(&mut out).unwrap();

        assert_eq!(arranger.runner.ran(), vec!["xrandr --verbose", "pgrep -x i3"]);
        let out = printed(out);
        assert_eq!(out.lines().count(), 3);
        assert!(out.contains("Running \"i3-msg workspace number 2; move workspace to output HDMI-0\""));
    }

    #[test]
    fn failing_xrandr_stops_the_run() {
        let mut r = runner(true);
        r.failing.push(XRANDR.into());
        let arranger = arranger(r, Options::default());
        let err = arranger.run(&mut Vec::new()).unwrap_err();

        assert!(matches!(err, ArrangeError::Command(_)));
        assert_eq!(arranger.runner.ran(), vec!["xrandr --verbose", XRANDR]);
    }

    #[test]
    fn failing_i3_command_stops_remaining_ones() {
        let mut r = runner(true);
        r.failing
            .push("i3-msg workspace number 1; move workspace to output DP-1".into());
        let arranger = arranger(r, Options::default());
        assert!(arranger.run(&mut Vec::new()).is_err());
        assert_eq!(arranger.runner.ran().len(), 4);
    }

    #[test]
    fn collision_runs_nothing() {
        let mut cfg = MonitorConfig::default();
        cfg.insert("AAAAAAAA", MonitorConfigEntry::new(1));
        cfg.insert("BBBB", MonitorConfigEntry::new(1));
        let arranger = Arranger::new(runner(true), cfg, PathBuf::from("cfg.json"), Options::default());
        let mut out = Vec::new();
        let err = arranger.run(&mut out).unwrap_err();

        assert!(matches!(
            err,
            ArrangeError::Resolve(ResolveError::OrderCollision(_))
        ));
        assert_eq!(arranger.runner.ran(), vec!["xrandr --verbose"]);
        assert!(printed(out).contains("Monitor order collision"));
    }

    #[test]
    fn empty_config_prints_templates() {
        let arranger = Arranger::new(
            runner(false),
            MonitorConfig::default(),
            PathBuf::from("/cfg/screenorder_config.json"),
            Options::default(),
        );
        let mut out = Vec::new();
        let err = arranger.run(&mut out).unwrap_err();

        assert!(matches!(err, ArrangeError::Resolve(ResolveError::NoMatchedMonitors)));
        let out = printed(out);
        assert!(out.contains("Did not find monitor DP-1 in /cfg/screenorder_config.json"));
        assert!(out.contains("Did not find monitor HDMI-0"));
        assert!(out.contains("\"AAAAAAAA\""));
    }

    #[test]
    fn failing_query_is_command_error() {
        let arranger = arranger(MockRunner::default(), Options::default());
        let err = arranger.run(&mut Vec::new()).unwrap_err();
        assert!(matches!(err, ArrangeError::Command(_)));
    }
}
