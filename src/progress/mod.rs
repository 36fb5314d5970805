//! Hand-off of background progress onto the UI thread.
//!
//! Background tasks hold a cloneable [`ProgressReporter`]; the page that owns
//! the progress bar holds the matching [`ProgressSink`] and drains it once per
//! frame. Updates travel over one ordered channel so status text and
//! percentages are applied in the order they were sent.

use eframe::egui;
use log::debug;
use tokio::sync::mpsc;

use crate::ui::controls::progress_bar::ProgressBar;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Preparing,
    Downloading,
    Installing,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Preparing => "Preparing...",
            Phase::Downloading => "Downloading...",
            Phase::Installing => "Installing...",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressReport {
    pub phase: Phase,
    pub percent: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ActivityUpdate {
    Started,
    Status { text: String, indeterminate: bool },
    Progress(ProgressReport),
    Finished,
}

/// Sending half, safe to clone into any task or thread.
#[derive(Clone)]
pub struct ProgressReporter {
    tx: mpsc::UnboundedSender<ActivityUpdate>,
    repaint: Option<egui::Context>,
}

impl ProgressReporter {
    pub fn channel(style: StatusStyle) -> (Self, ProgressSink) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self { tx, repaint: None },
            ProgressSink {
                rx,
                style,
                active: false,
                status: Phase::Preparing.label().to_owned(),
            },
        )
    }

    /// Wake the UI loop after every send.
    #[must_use]
    pub fn with_repaint(mut self, ctx: egui::Context) -> Self {
        self.repaint = Some(ctx);
        self
    }

    pub fn report(&self, phase: Phase, percent: f32) {
        self.send(ActivityUpdate::Progress(ProgressReport { phase, percent }));
    }

    pub fn status(&self, text: impl Into<String>, indeterminate: bool) {
        self.send(ActivityUpdate::Status {
            text: text.into(),
            indeterminate,
        });
    }

    pub fn started(&self) {
        self.send(ActivityUpdate::Started);
    }

    pub fn finished(&self) {
        self.send(ActivityUpdate::Finished);
    }

    fn send(&self, update: ActivityUpdate) {
        if self.tx.send(update).is_err() {
            debug!("progress: receiver dropped; update discarded");
            return;
        }
        if let Some(ctx) = &self.repaint {
            ctx.request_repaint();
        }
    }
}

/// How percentages appear in the status label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusStyle {
    WithPercent,
    Plain,
}

/// Receiving half, owned by the UI thread.
pub struct ProgressSink {
    rx: mpsc::UnboundedReceiver<ActivityUpdate>,
    style: StatusStyle,
    active: bool,
    status: String,
}

impl ProgressSink {
    /// Whether an activity is between `Started` and `Finished`.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Apply every queued update to `bar` in arrival order. Returns the
    /// number of updates consumed.
    pub fn drain(&mut self, bar: &mut ProgressBar) -> usize {
        let mut applied = 0;
        while let Ok(update) = self.rx.try_recv() {
            self.apply(update, bar);
            applied += 1;
        }
        applied
    }

    pub fn apply(&mut self, update: ActivityUpdate, bar: &mut ProgressBar) {
        match update {
            ActivityUpdate::Started => {
                self.active = true;
                self.status = Phase::Preparing.label().to_owned();
                bar.set_indeterminate(true);
            }
            ActivityUpdate::Status {
                text,
                indeterminate,
            } => {
                self.status = text;
                bar.set_indeterminate(indeterminate);
            }
            ActivityUpdate::Progress(report) => {
                let percent = report.percent.clamp(0.0, 100.0);
                if percent == bar.value() {
                    return;
                }
                self.status = match self.style {
                    StatusStyle::WithPercent => {
                        format!("{} {:.0}%", report.phase.label(), percent)
                    }
                    StatusStyle::Plain => report.phase.label().to_owned(),
                };
                bar.set_indeterminate(false);
                bar.set_value(percent);
            }
            ActivityUpdate::Finished => {
                self.active = false;
                self.status = Phase::Preparing.label().to_owned();
                bar.reset();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar() -> ProgressBar {
        let mut bar = ProgressBar::new();
        bar.set_track_width(200.0);
        bar
    }

    #[test]
    fn duplicate_percent_schedules_one_tween() {
        let (reporter, mut sink) = ProgressReporter::channel(StatusStyle::WithPercent);
        let mut bar = bar();
        reporter.report(Phase::Downloading, 42.0);
        reporter.report(Phase::Downloading, 42.0);
        assert_eq!(sink.drain(&mut bar), 2);
        assert_eq!(bar.width().started(), 1);
        assert_eq!(sink.status(), "Downloading... 42%");
    }

    #[test]
    fn updates_apply_in_arrival_order() {
        let (reporter, mut sink) = ProgressReporter::channel(StatusStyle::WithPercent);
        let mut bar = bar();
        reporter.started();
        reporter.report(Phase::Downloading, 100.0);
        reporter.report(Phase::Installing, 30.0);
        sink.drain(&mut bar);
        assert!(sink.is_active());
        assert!(!bar.is_indeterminate());
        assert_eq!(bar.value(), 30.0);
        assert_eq!(sink.status(), "Installing... 30%");
    }

    #[test]
    fn zero_percent_while_preparing_keeps_the_sweep() {
        let (reporter, mut sink) = ProgressReporter::channel(StatusStyle::Plain);
        let mut bar = bar();
        reporter.started();
        reporter.report(Phase::Downloading, 0.0);
        sink.drain(&mut bar);
        assert!(bar.is_indeterminate());
        assert_eq!(sink.status(), "Preparing...");

        reporter.report(Phase::Downloading, 12.5);
        sink.drain(&mut bar);
        assert_eq!(sink.status(), "Downloading...");
    }

    #[test]
    fn finished_resets_the_bar() {
        let (reporter, mut sink) = ProgressReporter::channel(StatusStyle::Plain);
        let mut bar = bar();
        reporter.started();
        reporter.report(Phase::Downloading, 70.0);
        reporter.status("Launching...", true);
        reporter.finished();
        sink.drain(&mut bar);
        assert!(!sink.is_active());
        assert!(!bar.is_indeterminate());
        assert_eq!(bar.value(), 0.0);
        assert_eq!(bar.width().get(), 0.0);
    }

    #[tokio::test]
    async fn reports_from_other_tasks_arrive() {
        let (reporter, mut sink) = ProgressReporter::channel(StatusStyle::WithPercent);
        let worker = reporter.clone();
        tokio::spawn(async move {
            for percent in [10.0, 20.0, 30.0] {
                worker.report(Phase::Downloading, percent);
            }
        })
        .await
        .unwrap();
        let mut bar = bar();
        assert_eq!(sink.drain(&mut bar), 3);
        assert_eq!(bar.value(), 30.0);
    }
}
