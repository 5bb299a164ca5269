use catchment_pipeline::PipelinePhase;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a spinner for indeterminate progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Finish a progress bar with success message
pub fn finish_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✓ {}", message));
}

/// Finish a progress bar with error message
pub fn finish_error(pb: &ProgressBar, message: &str) {
    pb.abandon_with_message(format!("✗ {}", message));
}

/// Spinner following the pipeline phases; silent in JSON mode
pub struct PhaseProgress {
    bar: Option<ProgressBar>,
}

impl PhaseProgress {
    pub fn new(enabled: bool) -> Self {
        Self {
            bar: enabled.then(|| create_spinner(PipelinePhase::Loading.description())),
        }
    }

    pub fn update(&self, phase: PipelinePhase) {
        tracing::info!("{}", phase.description());
        if let Some(pb) = &self.bar {
            pb.set_message(phase.description().to_string());
        }
    }

    pub fn succeed(&self, message: &str) {
        if let Some(pb) = &self.bar {
            finish_success(pb, message);
        }
    }

    pub fn fail(&self, message: &str) {
        if let Some(pb) = &self.bar {
            finish_error(pb, message);
        }
    }
}
