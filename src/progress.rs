use indicatif::ProgressBar;

/// Receives pipeline progress as a percentage in `0.0..=100.0`.
pub trait Progress {
    fn report(&mut self, percent: f64, message: &str);
}

impl Progress for ProgressBar {
    fn report(&mut self, percent: f64, message: &str) {
        self.set_position(percent.clamp(0.0, 100.0) as u64);
        self.set_message(message.to_string());
    }
}

/// Discards progress, for callers that only want the result.
pub struct Silent;

impl Progress for Silent {
    fn report(&mut self, _percent: f64, _message: &str) {}
}
