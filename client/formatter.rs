use crate::geometry::Rectangle;
use colored::*;

pub struct OutputFormatter;

impl OutputFormatter {
    pub fn format_stats(count: usize, depth: usize, node_count: usize, min_extent: f64) -> String {
        format!(
            "{} {}\n{} {}\n{} {}\n{} {}",
            "(items)".blue(),
            count.to_string().cyan(),
            "(depth)".blue(),
            depth.to_string().cyan(),
            "(nodes)".blue(),
            node_count.to_string().cyan(),
            "(min extent)".blue(),
            min_extent.to_string().cyan()
        )
    }

    /// Numbered list of `(id, bbox)` hits.
    pub fn format_hits(hits: &[(&str, Rectangle)]) -> String {
        if hits.is_empty() {
            return "(empty result)".yellow().to_string();
        }

        let mut result = String::new();
        for (i, (id, bbox)) in hits.iter().enumerate() {
            result.push_str(&format!(
                "{}) {} {}\n",
                (i + 1).to_string().blue(),
                id.green(),
                bbox.to_string().dimmed()
            ));
        }
        result.trim_end().to_string()
    }

    pub fn format_query_header(window: &Rectangle, exact: bool) -> String {
        let mode = if exact { "exact" } else { "candidates" };
        format!("Query {} ({})", window.to_string().cyan(), mode.yellow())
    }

    pub fn format_error(err: &str) -> String {
        format!("(error) {}", err.red())
    }
}
