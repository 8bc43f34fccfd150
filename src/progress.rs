use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::{Duration, Instant};

const MAX_STORED_WARNINGS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lower")]
pub enum ProgressMode {
    Auto,
    Rich,
    Plain,
    Quiet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedProgressMode {
    Rich,
    Plain,
    Quiet,
}

#[derive(Debug, Clone, Copy)]
pub struct ProgressConfig {
    pub mode: ProgressMode,
    tty_override: Option<bool>,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            mode: ProgressMode::Auto,
            tty_override: None,
        }
    }
}

impl ProgressConfig {
    pub fn new(mode: ProgressMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub fn with_tty_override(mut self, is_tty: bool) -> Self {
        self.tty_override = Some(is_tty);
        self
    }

    pub fn resolve_mode(self) -> ResolvedProgressMode {
        self.mode.resolve(
            self.tty_override
                .unwrap_or_else(|| std::io::stderr().is_terminal()),
        )
    }
}

impl ProgressMode {
    fn resolve(self, stderr_is_tty: bool) -> ResolvedProgressMode {
        match self {
            ProgressMode::Auto => {
                if stderr_is_tty {
                    ResolvedProgressMode::Rich
                } else {
                    ResolvedProgressMode::Plain
                }
            }
            ProgressMode::Rich => ResolvedProgressMode::Rich,
            ProgressMode::Plain => ResolvedProgressMode::Plain,
            ProgressMode::Quiet => ResolvedProgressMode::Quiet,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProgressOutcome {
    pub elapsed: Duration,
    pub warnings: Vec<String>,
}

/// Counts items (replays, artifact directories) through a pass.
pub struct ProgressReporter {
    label: String,
    mode: ResolvedProgressMode,
    started: Instant,
    total_items: u64,
    processed_items: u64,
    bar: Option<ProgressBar>,
    warnings: Vec<String>,
}

impl ProgressReporter {
    pub fn new(label: impl Into<String>, total_items: u64, config: ProgressConfig) -> Self {
        let label = label.into();
        let mode = config.resolve_mode();
        let bar = if mode == ResolvedProgressMode::Rich {
            let pb = ProgressBar::new(total_items);
            let style = ProgressStyle::with_template(
                "[{elapsed_precise}] {prefix} {wide_bar} {pos}/{len} {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar());
            pb.set_style(style);
            pb.set_prefix(label.clone());
            Some(pb)
        } else {
            None
        };

        Self {
            label,
            mode,
            started: Instant::now(),
            total_items,
            processed_items: 0,
            bar,
            warnings: Vec::new(),
        }
    }

    pub fn inc(&mut self, item: &str) {
        self.processed_items = self.processed_items.saturating_add(1);
        match self.mode {
            ResolvedProgressMode::Rich => {
                if let Some(pb) = &self.bar {
                    pb.set_message(item.to_string());
                    pb.inc(1);
                }
            }
            ResolvedProgressMode::Plain => {
                let elapsed = self.started.elapsed();
                let eta = compute_eta(self.total_items, self.processed_items, elapsed);
                eprintln!(
                    "[PROGRESS] {} elapsed={} done={}/{} ({:.1}%) ETA={} item={}",
                    self.label,
                    fmt_duration(elapsed),
                    self.processed_items,
                    self.total_items,
                    percent(self.processed_items, self.total_items),
                    eta.map(fmt_duration).unwrap_or_else(|| "--:--".to_string()),
                    item
                );
            }
            ResolvedProgressMode::Quiet => {}
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        match self.mode {
            ResolvedProgressMode::Rich => {
                if let Some(pb) = &self.bar {
                    pb.println(format!("warning: {}", message));
                }
            }
            ResolvedProgressMode::Plain => eprintln!("[WARN] {}: {}", self.label, message),
            ResolvedProgressMode::Quiet => {}
        }
        if self.warnings.len() < MAX_STORED_WARNINGS {
            self.warnings.push(message);
        }
    }

    pub fn finish(self, final_message: &str) -> ProgressOutcome {
        if let Some(pb) = &self.bar {
            pb.finish_with_message(final_message.to_string());
        }
        ProgressOutcome {
            elapsed: self.started.elapsed(),
            warnings: self.warnings,
        }
    }
}

fn percent(done: u64, total: u64) -> f64 {
    if total == 0 {
        100.0
    } else {
        done as f64 * 100.0 / total as f64
    }
}

fn compute_eta(total: u64, done: u64, elapsed: Duration) -> Option<Duration> {
    if done == 0 || done >= total {
        return None;
    }
    let per_item = elapsed.as_secs_f64() / done as f64;
    Some(Duration::from_secs_f64(per_item * (total - done) as f64))
}

pub fn fmt_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    if h > 0 {
        format!("{:02}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_resolution_respects_tty_override() {
        let cfg_tty = ProgressConfig::new(ProgressMode::Auto).with_tty_override(true);
        assert_eq!(cfg_tty.resolve_mode(), ResolvedProgressMode::Rich);

        let cfg_not_tty = ProgressConfig::new(ProgressMode::Auto).with_tty_override(false);
        assert_eq!(cfg_not_tty.resolve_mode(), ResolvedProgressMode::Plain);

        let cfg_quiet = ProgressConfig::new(ProgressMode::Quiet).with_tty_override(true);
        assert_eq!(cfg_quiet.resolve_mode(), ResolvedProgressMode::Quiet);
    }

    #[test]
    fn eta_uses_remaining_items() {
        let eta = compute_eta(10, 2, Duration::from_secs(4)).expect("eta should exist");
        // 2s per item, 8 items left
        assert_eq!(eta.as_secs(), 16);

        assert!(compute_eta(10, 10, Duration::from_secs(4)).is_none());
        assert!(compute_eta(10, 0, Duration::from_secs(4)).is_none());
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(fmt_duration(Duration::from_secs(75)), "01:15");
        assert_eq!(fmt_duration(Duration::from_secs(3725)), "01:02:05");
    }

    #[test]
    fn stored_warnings_are_capped() {
        let cfg = ProgressConfig::new(ProgressMode::Quiet);
        let mut reporter = ProgressReporter::new("transfer", 3, cfg);
        for i in 0..(MAX_STORED_WARNINGS + 5) {
            reporter.warn(format!("w{i}"));
        }
        reporter.inc("a.roa");
        let outcome = reporter.finish("done");
        assert_eq!(outcome.warnings.len(), MAX_STORED_WARNINGS);
        assert_eq!(outcome.warnings[0], "w0");
    }
}
