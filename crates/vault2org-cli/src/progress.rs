use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use vault2org_pipeline::ProgressObserver;

/// Progress bar over the render phase
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new() -> Result<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        Ok(Self { bar })
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("done");
    }
}

impl ProgressObserver for ProgressReporter {
    fn rendering_started(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn note_finished(&self, relative_path: &Path, _written: bool) {
        self.bar.inc(1);
        self.bar.set_message(relative_path.display().to_string());
    }
}
