//! "Brief" screen — scrollable view of the finished executive brief.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyModifiers};
use meetingprep_shared::SessionId;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use super::ScreenAction;
use crate::widgets::markdown_lines;

const PAGE: u16 = 10;

pub(crate) struct BriefScreen {
    brief: Option<LoadedBrief>,
    scroll: u16,
}

struct LoadedBrief {
    company: String,
    session: SessionId,
    text: String,
}

impl BriefScreen {
    pub(crate) fn new() -> Self {
        Self {
            brief: None,
            scroll: 0,
        }
    }

    /// Replace the shown brief and reset scrolling.
    pub(crate) fn show(&mut self, company: &str, session: SessionId, text: impl Into<String>) {
        self.brief = Some(LoadedBrief {
            company: company.to_string(),
            session,
            text: text.into(),
        });
        self.scroll = 0;
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let Some(brief) = &self.brief else {
            let placeholder = Paragraph::new(
                "No brief yet.\n\nFill out the Meeting tab and press p to prepare one.",
            )
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Executive Brief "));
            f.render_widget(placeholder, area);
            return;
        };

        let panel = Paragraph::new(markdown_lines(&brief.text))
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Executive Brief: {} ", brief.company))
                    .title_bottom(" ↑/↓ scroll · PgUp/PgDn page · Home top · s save "),
            );
        f.render_widget(panel, area);
    }

    pub(crate) fn handle_key(
        &mut self,
        code: KeyCode,
        _modifiers: KeyModifiers,
    ) -> Option<ScreenAction> {
        let brief = self.brief.as_ref()?;
        match code {
            KeyCode::Down | KeyCode::Char('j') => self.scroll = self.scroll.saturating_add(1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(PAGE),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(PAGE),
            KeyCode::Home => self.scroll = 0,
            KeyCode::Char('s') => {
                let path = PathBuf::from(format!("meeting-brief-{}.md", brief.session));
                let msg = match std::fs::write(&path, &brief.text) {
                    Ok(()) => format!("Brief saved to {}", path.display()),
                    Err(e) => format!("Cannot write {}: {e}", path.display()),
                };
                return Some(ScreenAction::Status(msg));
            }
            _ => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_ignored_without_a_brief() {
        let mut screen = BriefScreen::new();
        assert_eq!(screen.handle_key(KeyCode::Down, KeyModifiers::NONE), None);
        assert_eq!(screen.scroll, 0);
    }

    #[test]
    fn scrolling_saturates_and_resets() {
        let mut screen = BriefScreen::new();
        screen.show("Acme", SessionId::new(), "# Brief\nline");
        screen.handle_key(KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(screen.scroll, 0);
        screen.handle_key(KeyCode::PageDown, KeyModifiers::NONE);
        screen.handle_key(KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(screen.scroll, PAGE + 1);
        screen.handle_key(KeyCode::Home, KeyModifiers::NONE);
        assert_eq!(screen.scroll, 0);

        screen.handle_key(KeyCode::Down, KeyModifiers::NONE);
        screen.show("Acme", SessionId::new(), "new");
        assert_eq!(screen.scroll, 0);
    }
}
