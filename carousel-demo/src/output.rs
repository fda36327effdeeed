use console::style;

const STATUS_WIDTH: usize = 10;

pub fn status(label: &str, message: impl AsRef<str>) {
    eprintln!(
        "{:>width$} {}",
        style(label).green().bold(),
        message.as_ref(),
        width = STATUS_WIDTH
    );
}

pub fn event(message: impl AsRef<str>) {
    eprintln!(
        "{:>width$} {}",
        style("selected").cyan().bold(),
        message.as_ref(),
        width = STATUS_WIDTH
    );
}

pub fn error(message: impl AsRef<str>) {
    eprintln!("{}: {}", style("error").red().bold(), message.as_ref());
}

pub fn step(message: impl AsRef<str>) {
    eprintln!("{:>width$} {}", "", message.as_ref(), width = STATUS_WIDTH);
}

/// Renders indicator dots, the selected page filled.
pub fn dots(highlights: &[bool]) -> String {
    highlights
        .iter()
        .map(|selected| if *selected { '●' } else { '○' })
        .collect()
}
