//! Modal form for adding or editing a case.
//!
//! - **Tab** / **Down** moves to the next input, **Shift-Tab** / **Up** to the
//!   previous one
//! - **Enter** saves
//! - **Esc** cancels

use casegraph_core::model::{Case, CaseField, CaseFields, CaseId};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

/// Whether the form creates a case or rewrites an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit(CaseId),
}

/// The action the form wants the caller to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    /// Save the current field values.
    Submit,
    /// Close the form without saving.
    Cancel,
}

#[derive(Debug, Clone)]
pub struct CaseForm {
    mode: FormMode,
    fields: CaseFields,
    focus: usize,
}

impl CaseForm {
    /// Blank form for a new case.
    pub fn add() -> Self {
        Self {
            mode: FormMode::Add,
            fields: CaseFields::default(),
            focus: 0,
        }
    }

    /// Form pre-filled with the stored values of `case`.
    pub fn edit(case: &Case) -> Self {
        Self {
            mode: FormMode::Edit(case.id),
            fields: case.fields.clone(),
            focus: 0,
        }
    }

    pub const fn mode(&self) -> FormMode {
        self.mode
    }

    pub const fn fields(&self) -> &CaseFields {
        &self.fields
    }

    /// The attribute currently receiving input.
    pub const fn focused(&self) -> CaseField {
        CaseField::ALL[self.focus]
    }

    // -----------------------------------------------------------------------
    // Input handling
    // -----------------------------------------------------------------------

    /// Feed a key event to the form.
    ///
    /// Returns `Some(FormAction)` when the form is done, or `None` while the
    /// user is still typing.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<FormAction> {
        match key.code {
            KeyCode::Esc => Some(FormAction::Cancel),
            KeyCode::Enter => Some(FormAction::Submit),
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % CaseField::ALL.len();
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = (self.focus + CaseField::ALL.len() - 1) % CaseField::ALL.len();
                None
            }
            KeyCode::Backspace => {
                self.fields.get_mut(self.focused()).pop();
                None
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.fields.get_mut(self.focused()).push(c);
                None
            }
            _ => None,
        }
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    /// Render the form as a centered overlay on top of `area`.
    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let dialog_w: u16 = 60.min(area.width.saturating_sub(4));
        let dialog_h: u16 = 15.min(area.height.saturating_sub(2));
        let dialog_area = Rect {
            x: area.x + area.width.saturating_sub(dialog_w) / 2,
            y: area.y + area.height.saturating_sub(dialog_h) / 2,
            width: dialog_w,
            height: dialog_h,
        };

        frame.render_widget(Clear, dialog_area);

        let title = match self.mode {
            FormMode::Add => " Add case ".to_string(),
            FormMode::Edit(id) => format!(" Edit case #{id} "),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
            .style(Style::default().bg(Color::Black));
        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(inner);

        for (slot, field) in CaseField::ALL.into_iter().enumerate() {
            let focused = field == self.focused();
            let value = self.fields.get(field);
            let display = if focused {
                format!("{value}_")
            } else {
                value.to_string()
            };
            let border = if focused {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let input = Paragraph::new(display)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(format!(" {} ", field.label()))
                        .border_style(border),
                )
                .style(Style::default().fg(Color::White));
            frame.render_widget(input, chunks[slot]);
        }

        let hints = Line::from(vec![
            Span::styled("Tab", Style::default().fg(Color::Cyan)),
            Span::raw(" next  "),
            Span::styled("Shift-Tab", Style::default().fg(Color::Cyan)),
            Span::raw(" prev  "),
            Span::styled("Enter", Style::default().fg(Color::Cyan)),
            Span::raw(" save  "),
            Span::styled("Esc", Style::default().fg(Color::Cyan)),
            Span::raw(" cancel"),
        ]);
        frame.render_widget(Paragraph::new(hints), chunks[4]);
    }
}
