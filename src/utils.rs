use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use ureq::{Agent, AgentBuilder};

use crate::config::Config;

pub fn progress_bar() -> ProgressBar {
    ProgressBar::new(100).with_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:30} {percent:>3}% {msg}")
            .expect("hardcoded"),
    )
}

pub fn agent(config: &Config) -> Agent {
    AgentBuilder::new()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(&config.user_agent)
        .build()
}
