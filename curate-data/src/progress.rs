use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar in the style used by every long-running stage.
pub fn progress_bar(len: usize, unit: &str) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {unit} ({{per_sec}}, {{eta}})"
            ))
            .unwrap()
            .progress_chars("#>-"),
    );
    pb
}
