//! "Meeting" screen — the five form fields and the prepare action.

use crossterm::event::{KeyCode, KeyModifiers};
use meetingprep_shared::{DURATION_STEP_MINUTES, MeetingInputs, clamp_duration};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use super::ScreenAction;

/// Which input field is focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Company,
    Objective,
    Attendees,
    Duration,
    Focus,
}

pub(crate) struct MeetingFormScreen {
    company: String,
    objective: String,
    attendees: String,
    duration: u32,
    focus: String,
    focused: Field,
    editing: bool,
    status: String,
}

impl MeetingFormScreen {
    pub(crate) fn new(default_duration: u32) -> Self {
        Self {
            company: String::new(),
            objective: String::new(),
            attendees: String::new(),
            duration: clamp_duration(default_duration),
            focus: String::new(),
            focused: Field::Company,
            editing: false,
            status: "Fill out the meeting details, then press p to prepare.".to_string(),
        }
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.editing
    }

    /// Snapshot of the form as pipeline inputs.
    pub(crate) fn inputs(&self) -> MeetingInputs {
        MeetingInputs::new(
            self.company.trim(),
            self.objective.trim(),
            self.attendees.trim_end(),
            self.duration,
            self.focus.trim(),
        )
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
    }

    fn field_style(&self, field: Field) -> Style {
        if self.focused == field && self.editing {
            Style::default().fg(Color::Yellow)
        } else if self.focused == field {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        }
    }

    fn text_field<'a>(&self, field: Field, title: &'a str, value: &'a str) -> Paragraph<'a> {
        Paragraph::new(value).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(self.field_style(field)),
        )
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Company
                Constraint::Length(3), // Objective
                Constraint::Length(6), // Attendees
                Constraint::Length(3), // Duration
                Constraint::Length(3), // Focus
                Constraint::Length(1), // Action hint
                Constraint::Min(1),    // Status
            ])
            .split(area);

        f.render_widget(
            self.text_field(Field::Company, " Company name ", &self.company),
            chunks[0],
        );
        f.render_widget(
            self.text_field(Field::Objective, " Meeting objective ", &self.objective),
            chunks[1],
        );
        f.render_widget(
            self.text_field(
                Field::Attendees,
                " Attendees and roles (one per line) ",
                &self.attendees,
            ),
            chunks[2],
        );

        let duration_block = Block::default()
            .borders(Borders::ALL)
            .title(" Duration (minutes) ")
            .border_style(self.field_style(Field::Duration));
        let duration_text =
            Paragraph::new(format!("< {} >  (← → to change)", self.duration)).block(duration_block);
        f.render_widget(duration_text, chunks[3]);

        f.render_widget(
            self.text_field(Field::Focus, " Focus areas or concerns ", &self.focus),
            chunks[4],
        );

        let hint = if self.editing && self.focused == Field::Attendees {
            "Type to edit · Enter for new line · Esc to stop editing"
        } else if self.editing {
            "Type to edit · Enter/Tab to next field · Esc to stop editing"
        } else {
            "Enter to edit · ↑/↓ to move · p or F5 to prepare meeting"
        };
        let hint_p = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(hint_p, chunks[5]);

        let status_block = Block::default().borders(Borders::ALL).title(" Status ");
        let status_text = Paragraph::new(self.status.as_str())
            .wrap(Wrap { trim: true })
            .block(status_block);
        f.render_widget(status_text, chunks[6]);
    }

    pub(crate) fn handle_key(
        &mut self,
        code: KeyCode,
        _modifiers: KeyModifiers,
    ) -> Option<ScreenAction> {
        if self.editing {
            match code {
                KeyCode::Esc => {
                    self.editing = false;
                }
                KeyCode::Enter if self.focused == Field::Attendees => {
                    self.attendees.push('\n');
                }
                KeyCode::Enter | KeyCode::Tab => {
                    self.editing = false;
                    self.next_field();
                }
                KeyCode::Backspace => {
                    if let Some(field) = self.current_text_mut() {
                        field.pop();
                    }
                }
                KeyCode::Char(c) => {
                    if let Some(field) = self.current_text_mut() {
                        field.push(c);
                    }
                }
                _ => {}
            }
            return None;
        }

        match code {
            KeyCode::Enter if self.focused != Field::Duration => {
                self.editing = true;
            }
            KeyCode::Char('p') | KeyCode::F(5) => return Some(ScreenAction::Prepare),
            KeyCode::Left if self.focused == Field::Duration => self.step_duration(false),
            KeyCode::Right if self.focused == Field::Duration => self.step_duration(true),
            KeyCode::Up => self.prev_field(),
            KeyCode::Down => self.next_field(),
            _ => {}
        }
        None
    }

    fn current_text_mut(&mut self) -> Option<&mut String> {
        match self.focused {
            Field::Company => Some(&mut self.company),
            Field::Objective => Some(&mut self.objective),
            Field::Attendees => Some(&mut self.attendees),
            Field::Duration => None,
            Field::Focus => Some(&mut self.focus),
        }
    }

    fn step_duration(&mut self, up: bool) {
        let next = if up {
            self.duration.saturating_add(DURATION_STEP_MINUTES)
        } else {
            self.duration.saturating_sub(DURATION_STEP_MINUTES)
        };
        self.duration = clamp_duration(next);
    }

    fn next_field(&mut self) {
        self.focused = match self.focused {
            Field::Company => Field::Objective,
            Field::Objective => Field::Attendees,
            Field::Attendees => Field::Duration,
            Field::Duration => Field::Focus,
            Field::Focus => Field::Company,
        };
    }

    fn prev_field(&mut self) {
        self.focused = match self.focused {
            Field::Company => Field::Focus,
            Field::Objective => Field::Company,
            Field::Attendees => Field::Objective,
            Field::Duration => Field::Attendees,
            Field::Focus => Field::Duration,
        };
    }
}
