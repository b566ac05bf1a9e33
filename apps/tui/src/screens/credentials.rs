//! "API Keys" screen — masked entry for the two service keys.
//!
//! Keys typed here win over the environment for runs started from this
//! session. They are held in memory only.

use crossterm::event::{KeyCode, KeyModifiers};
use meetingprep_shared::{AppConfig, CredentialOverrides};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use super::ScreenAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Search,
    Generation,
}

pub(crate) struct CredentialsScreen {
    search_key: String,
    generation_key: String,
    search_env: String,
    generation_env: String,
    focused: Field,
    editing: bool,
}

impl CredentialsScreen {
    pub(crate) fn new(config: &AppConfig) -> Self {
        Self {
            search_key: String::new(),
            generation_key: String::new(),
            search_env: config.search.api_key_env.clone(),
            generation_env: config.generation.api_key_env.clone(),
            focused: Field::Search,
            editing: false,
        }
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.editing
    }

    /// Entered keys; blank fields fall through to the environment.
    pub(crate) fn overrides(&self) -> CredentialOverrides {
        fn entered(key: &str) -> Option<String> {
            let key = key.trim();
            (!key.is_empty()).then(|| key.to_string())
        }
        CredentialOverrides {
            search_api_key: entered(&self.search_key),
            generation_api_key: entered(&self.generation_key),
        }
    }

    fn env_hint(var: &str) -> String {
        match std::env::var(var) {
            Ok(v) if !v.trim().is_empty() => format!("{var} is set in the environment"),
            _ => format!("{var} is not set"),
        }
    }

    fn masked_field<'a>(&self, field: Field, title: &'a str, value: &str) -> Paragraph<'a> {
        let style = if self.focused == field && self.editing {
            Style::default().fg(Color::Yellow)
        } else if self.focused == field {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let shown = if value.is_empty() && !(self.editing && self.focused == field) {
            "(from environment)".to_string()
        } else {
            "•".repeat(value.chars().count())
        };
        Paragraph::new(shown).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(style),
        )
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Search key
                Constraint::Length(3), // Generation key
                Constraint::Length(1), // Hint
                Constraint::Min(1),    // Env info
            ])
            .split(area);

        f.render_widget(
            self.masked_field(Field::Search, " Search API key (Tavily) ", &self.search_key),
            chunks[0],
        );
        f.render_widget(
            self.masked_field(
                Field::Generation,
                " Generation API key (Groq) ",
                &self.generation_key,
            ),
            chunks[1],
        );

        let hint = if self.editing {
            "Type or paste the key · Enter/Esc to finish"
        } else {
            "Enter to edit · ↑/↓ to move · c to clear"
        };
        f.render_widget(
            Paragraph::new(hint)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            chunks[2],
        );

        let info = vec![
            Line::from(Self::env_hint(&self.search_env)),
            Line::from(Self::env_hint(&self.generation_env)),
            Line::from(""),
            Line::from("Keys entered here override the environment for this session only."),
        ];
        f.render_widget(
            Paragraph::new(info)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title(" Environment ")),
            chunks[3],
        );
    }

    pub(crate) fn handle_key(
        &mut self,
        code: KeyCode,
        _modifiers: KeyModifiers,
    ) -> Option<ScreenAction> {
        if self.editing {
            match code {
                KeyCode::Enter | KeyCode::Esc => self.editing = false,
                KeyCode::Backspace => {
                    self.current_mut().pop();
                }
                KeyCode::Char(c) => self.current_mut().push(c),
                _ => {}
            }
            return None;
        }

        match code {
            KeyCode::Enter => self.editing = true,
            KeyCode::Up | KeyCode::Down => {
                self.focused = match self.focused {
                    Field::Search => Field::Generation,
                    Field::Generation => Field::Search,
                };
            }
            KeyCode::Char('c') => {
                self.current_mut().clear();
                return Some(ScreenAction::Status("Key cleared".to_string()));
            }
            _ => {}
        }
        None
    }

    fn current_mut(&mut self) -> &mut String {
        match self.focused {
            Field::Search => &mut self.search_key,
            Field::Generation => &mut self.generation_key,
        }
    }
}
