use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar for a download of `total` bytes (spinner when unknown).
pub fn download_bar(url: &str, total: Option<u64>) -> ProgressBar {
    let bar = match total {
        Some(len) => {
            let bar = ProgressBar::new(len);
            if let Ok(style) = ProgressStyle::default_bar().template(
                "{msg}\n[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
            ) {
                bar.set_style(style.progress_chars("#>-"));
            }
            bar
        }
        None => {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg} {bytes}") {
                bar.set_style(style);
            }
            bar
        }
    };
    bar.set_message(format!("downloading {url}"));
    bar
}
