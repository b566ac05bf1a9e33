//! Reusable TUI widgets.

use meetingprep_shared::DerivedField;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Bottom status bar.
pub(crate) fn status_bar(msg: &str) -> Paragraph<'_> {
    Paragraph::new(format!(" {msg}")).style(Style::default().bg(Color::DarkGray).fg(Color::White))
}

/// Style markdown text line by line. Heading lines get emphasis; the text
/// itself is passed through untouched.
pub(crate) fn markdown_lines(text: &str) -> Vec<Line<'_>> {
    text.lines()
        .map(|line| {
            let trimmed = line.trim_start();
            let style = if trimmed.starts_with("# ") {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else if trimmed.starts_with("## ") {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else if trimmed.starts_with("### ") {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::styled(line, style)
        })
        .collect()
}

/// Human-readable label for a pipeline step.
pub(crate) fn step_label(field: DerivedField) -> &'static str {
    match field {
        DerivedField::ContextAnalysis => "Context analysis",
        DerivedField::IndustryInsights => "Industry insights",
        DerivedField::Strategy => "Strategy formulation",
        DerivedField::ExecutiveBrief => "Executive brief",
    }
}

/// What the run panel shows while the pipeline blocks the UI.
#[derive(Debug, Clone, Default)]
pub(crate) struct RunView {
    pub company: String,
    pub phase: String,
    pub current: Option<DerivedField>,
    pub completed: Vec<DerivedField>,
}

/// Full-screen checklist of pipeline steps.
pub(crate) fn draw_run_view(f: &mut Frame, view: &RunView) {
    let mut lines = vec![
        Line::from(format!("Preparing meeting with {}", view.company))
            .style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
    ];

    for field in DerivedField::ALL {
        let (marker, style) = if view.completed.contains(&field) {
            ("✔", Style::default().fg(Color::Green))
        } else if view.current == Some(field) {
            ("▸", Style::default().fg(Color::Yellow))
        } else {
            ("·", Style::default().fg(Color::DarkGray))
        };
        lines.push(Line::styled(format!("  {marker} {}", step_label(field)), style));
    }

    lines.push(Line::from(""));
    lines.push(Line::styled(
        view.phase.clone(),
        Style::default().fg(Color::DarkGray),
    ));

    let panel = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Running agents... "),
    );
    f.render_widget(panel, f.area());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn markdown_lines_keep_text_verbatim() {
        let text = "# Brief\n\n## Talking points\n- **Budget** up 10%\n### Q&A";
        let lines = markdown_lines(text);
        assert_eq!(lines.len(), text.lines().count());
        let rebuilt: Vec<String> = lines.iter().map(plain).collect();
        assert_eq!(rebuilt.join("\n"), text);
    }

    #[test]
    fn headings_are_emphasised() {
        let lines = markdown_lines("# Title\nbody");
        assert!(lines[0].style.add_modifier.contains(Modifier::BOLD));
        assert!(!lines[1].style.add_modifier.contains(Modifier::BOLD));
    }
}
