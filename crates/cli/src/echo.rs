use owo_colors::OwoColorize;

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!("\n{} {} {}", "Lens".bold().bright_blue(), "v".dimmed(), VERSION.dimmed());
    eprintln!("{}", "Extract readable articles from web pages\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
#[allow(dead_code)]
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print an error message
#[allow(dead_code)]
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.bright_red());
}

/// Print article metadata after extraction
pub fn print_article_details(article: &lens_core::Article) {
    if let Some(title) = &article.title {
        eprintln!("  {} {}", "Title:".dimmed(), title.bright_white());
    }
    eprintln!("  {} {}", "Pages:".dimmed(), article.page_count.to_string().bright_white());
    eprintln!("  {} {}", "Words:".dimmed(), article.word_count.to_string().bright_white());
    eprintln!(
        "  {} {}",
        "Reading time:".dimmed(),
        format!("{} min", article.reading_time).bright_white()
    );
    if let Some(next) = &article.next_page_url {
        eprintln!("  {} {}", "Continues at:".dimmed(), next.bright_white());
    }
    eprintln!();
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
