//! Spinner shown while waiting on the network

use std::future::Future;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::OutputFormat;

/// Run `future` behind a stderr spinner.
///
/// Nothing is drawn for JSON output or when stderr is not a terminal.
pub async fn with_spinner<F, T>(format: OutputFormat, message: &str, future: F) -> T
where
    F: Future<Output = T>,
{
    let spinner = if format == OutputFormat::Table {
        ProgressBar::new_spinner()
    } else {
        ProgressBar::hidden()
    };
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = future.await;
    spinner.finish_and_clear();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spinner_returns_future_output() {
        let value = with_spinner(OutputFormat::Json, "Loading", async { 42 }).await;
        assert_eq!(value, 42);
    }
}
