//! Per-list progress bars for `sync --progress`.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use warrior_core::{ListName, SourceItem};
use warrior_sync::{ItemOutcome, ProgressSink};

/// A [`ProgressSink`] drawing one bar per list on stderr.
pub struct BarProgress {
    bar: Option<ProgressBar>,
    dry_run: bool,
}

impl BarProgress {
    pub fn new(dry_run: bool) -> Self {
        Self { bar: None, dry_run }
    }

    fn style(&self) -> ProgressStyle {
        let template = if self.dry_run {
            "{spinner:.yellow} {msg} [{bar:40.yellow/blue}] {pos}/{len}"
        } else {
            "{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}"
        };
        ProgressStyle::default_bar()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░")
    }
}

impl ProgressSink for BarProgress {
    fn list_started(&mut self, list: &ListName, total: usize) {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(self.style());
        let prefix = if self.dry_run { "(dry-run) " } else { "" };
        bar.set_message(format!("{prefix}{list}"));
        bar.enable_steady_tick(Duration::from_millis(100));
        self.bar = Some(bar);
    }

    fn item_processed(&mut self, _list: &ListName, item: &SourceItem, outcome: &ItemOutcome) {
        let Some(bar) = self.bar.as_ref() else { return };
        if let ItemOutcome::Failed(message) = outcome {
            bar.println(format!("  ✗ {}: {message}", item.title));
        }
        bar.inc(1);
    }

    fn list_finished(&mut self, _list: &ListName) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
