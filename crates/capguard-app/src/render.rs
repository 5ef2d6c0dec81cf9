//! Render use cases: markdown and GitHub annotations from in-memory reports.

use capguard_render::RenderableReport;

pub fn render_markdown(report: &RenderableReport) -> String {
    capguard_render::render_markdown(report)
}

/// Annotations beyond `max` are dropped; GitHub only shows a limited number per step.
pub fn render_annotations(report: &RenderableReport, max: usize) -> Vec<String> {
    capguard_render::render_github_annotations(report)
        .into_iter()
        .take(max)
        .collect()
}
