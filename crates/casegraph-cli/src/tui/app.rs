//! Two-screen case manager: a home menu and the case table.
//!
//! The table screen owns the selection. Every action goes through
//! [`CaseManager`], which reports back through [`ManagerView`]; storage
//! failures land on the status line and the session keeps running.

use casegraph_core::graph::GraphStats;
use casegraph_core::model::{Case, CaseField, CaseFields, CaseId};
use casegraph_core::{CaseGraph, CaseManager, CaseView, Notice, NoticeLevel};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, TableState},
};

use super::form::{CaseForm, FormAction, FormMode};

const HOME_ITEMS: [&str; 2] = ["Manage cases", "Exit"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Manager,
}

// ---------------------------------------------------------------------------
// ManagerView
// ---------------------------------------------------------------------------

/// Neighbours of one case in the graph pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphRow {
    pub id: CaseId,
    pub links: Vec<(CaseId, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphPane {
    pub stats: GraphStats,
    pub rows: Vec<GraphRow>,
}

impl From<&CaseGraph> for GraphPane {
    fn from(graph: &CaseGraph) -> Self {
        let rows = graph
            .case_ids()
            .into_iter()
            .map(|id| GraphRow {
                id,
                links: graph
                    .neighbors(id)
                    .into_iter()
                    .map(|other| {
                        let shared = graph
                            .shared_between(id, other)
                            .map(ToString::to_string)
                            .unwrap_or_default();
                        (other, shared)
                    })
                    .collect(),
            })
            .collect();
        Self {
            stats: graph.stats(),
            rows,
        }
    }
}

/// What the case table screen currently shows.
#[derive(Debug, Default)]
pub struct ManagerView {
    cases: Vec<Case>,
    table_state: TableState,
    status: Option<Notice>,
    graph: Option<GraphPane>,
}

impl ManagerView {
    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub const fn status(&self) -> Option<&Notice> {
        self.status.as_ref()
    }

    pub const fn graph(&self) -> Option<&GraphPane> {
        self.graph.as_ref()
    }

    /// The highlighted case, or `None` when nothing is selected.
    pub fn selected(&self) -> Option<&Case> {
        self.table_state.selected().and_then(|idx| self.cases.get(idx))
    }

    pub fn selected_id(&self) -> Option<CaseId> {
        self.selected().map(|case| case.id)
    }

    fn select_next(&mut self) {
        if self.cases.is_empty() {
            return;
        }
        let next = self
            .table_state
            .selected()
            .map_or(0, |idx| (idx + 1).min(self.cases.len() - 1));
        self.table_state.select(Some(next));
    }

    fn select_prev(&mut self) {
        if self.cases.is_empty() {
            return;
        }
        let prev = self
            .table_state
            .selected()
            .map_or(0, |idx| idx.saturating_sub(1));
        self.table_state.select(Some(prev));
    }

    fn clear_selection(&mut self) {
        self.table_state.select(None);
    }
}

impl CaseView for ManagerView {
    fn show_cases(&mut self, cases: &[Case]) -> anyhow::Result<()> {
        self.cases = cases.to_vec();
        match self.table_state.selected() {
            Some(_) if self.cases.is_empty() => self.table_state.select(None),
            Some(idx) if idx >= self.cases.len() => {
                self.table_state.select(Some(self.cases.len() - 1));
            }
            _ => {}
        }
        Ok(())
    }

    fn notify(&mut self, notice: &Notice) -> anyhow::Result<()> {
        self.status = Some(notice.clone());
        Ok(())
    }

    fn show_graph(&mut self, graph: &CaseGraph) -> anyhow::Result<()> {
        self.graph = Some(GraphPane::from(graph));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App<'a> {
    manager: &'a CaseManager,
    screen: Screen,
    home_state: ListState,
    view: ManagerView,
    form: Option<CaseForm>,
    should_quit: bool,
}

impl<'a> App<'a> {
    pub fn new(manager: &'a CaseManager) -> Self {
        Self {
            manager,
            screen: Screen::Home,
            home_state: ListState::default().with_selected(Some(0)),
            view: ManagerView::default(),
            form: None,
            should_quit: false,
        }
    }

    pub const fn screen(&self) -> Screen {
        self.screen
    }

    #[cfg(test)]
    pub const fn view(&self) -> &ManagerView {
        &self.view
    }

    pub const fn form(&self) -> Option<&CaseForm> {
        self.form.as_ref()
    }

    pub const fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Draw and dispatch key presses until the user exits.
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> anyhow::Result<()> {
        while !self.should_quit() {
            terminal.draw(|frame| self.render(frame))?;
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                _ => {}
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Input handling
    // -----------------------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        if let Some(form) = self.form.as_mut() {
            if let Some(action) = form.handle_key(key) {
                self.finish_form(action);
            }
            return;
        }
        match self.screen {
            Screen::Home => self.handle_home_key(key),
            Screen::Manager => self.handle_manager_key(key),
        }
    }

    fn handle_home_key(&mut self, key: KeyEvent) {
        let selected = self.home_state.selected().unwrap_or(0);
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => {
                self.home_state
                    .select(Some((selected + 1).min(HOME_ITEMS.len() - 1)));
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.home_state.select(Some(selected.saturating_sub(1)));
            }
            KeyCode::Enter if selected == 0 => self.open_manager(),
            KeyCode::Enter => self.should_quit = true,
            _ => {}
        }
    }

    fn open_manager(&mut self) {
        self.screen = Screen::Manager;
        self.view = ManagerView::default();
        let result = self.manager.list(&mut self.view);
        log_failure("list", result);
    }

    fn handle_manager_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                if self.view.graph.take().is_none() {
                    self.screen = Screen::Home;
                }
            }
            KeyCode::Char('j') | KeyCode::Down => self.view.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.view.select_prev(),
            KeyCode::Char(' ') => self.view.clear_selection(),
            KeyCode::Char('a') => self.form = Some(CaseForm::add()),
            KeyCode::Char('e') => match self.view.selected() {
                Some(case) => self.form = Some(CaseForm::edit(case)),
                None => {
                    let result = self
                        .manager
                        .edit(&mut self.view, None, &CaseFields::default());
                    log_failure("edit", result);
                }
            },
            KeyCode::Char('d') => {
                let selection = self.view.selected_id();
                let result = self.manager.remove(&mut self.view, selection);
                log_failure("delete", result);
            }
            KeyCode::Char('g') => {
                let result = self.manager.show_graph(&mut self.view);
                log_failure("graph", result);
            }
            KeyCode::Char('r') => {
                let result = self.manager.list(&mut self.view);
                log_failure("list", result);
            }
            _ => {}
        }
    }

    fn finish_form(&mut self, action: FormAction) {
        let Some(form) = self.form.take() else {
            return;
        };
        if action == FormAction::Cancel {
            return;
        }
        match form.mode() {
            FormMode::Add => {
                let result = self.manager.add(&mut self.view, form.fields());
                log_failure("add", result);
            }
            FormMode::Edit(id) => {
                let result = self.manager.edit(&mut self.view, Some(id), form.fields());
                log_failure("edit", result);
            }
        }
        if self.view.graph.is_some() {
            let result = self.manager.show_graph(&mut self.view);
            log_failure("graph", result);
        }
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    pub fn render(&mut self, frame: &mut Frame<'_>) {
        let area = frame.area();
        match self.screen() {
            Screen::Home => self.render_home(frame, area),
            Screen::Manager => self.render_manager(frame, area),
        }
        if let Some(form) = self.form() {
            form.render(frame, area);
        }
    }

    fn render_home(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let width = 32.min(area.width);
        let height = 6.min(area.height);
        let menu_area = Rect {
            x: area.x + area.width.saturating_sub(width) / 2,
            y: area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        };
        let items: Vec<ListItem<'_>> = HOME_ITEMS.iter().map(|&label| ListItem::new(label)).collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_set(border::ROUNDED)
                    .title(" casegraph ")
                    .title_style(
                        Style::default()
                            .fg(Color::Green)
                            .add_modifier(Modifier::BOLD),
                    ),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("► ");
        frame.render_stateful_widget(list, menu_area, &mut self.home_state);
    }

    fn render_manager(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        let body = if self.view.graph().is_some() {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(rows[0])
        } else {
            Layout::default()
                .constraints([Constraint::Percentage(100)])
                .split(rows[0])
        };

        self.render_table(frame, body[0]);
        if let Some(pane) = self.view.graph() {
            render_graph_pane(frame, pane, body[1]);
        }
        frame.render_widget(Paragraph::new(status_line(self.view.status())), rows[1]);
        frame.render_widget(Paragraph::new(hint_line()), rows[2]);
    }

    fn render_table(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let header = Row::new(
            std::iter::once("ID")
                .chain(CaseField::ALL.into_iter().map(CaseField::label))
                .map(|label| Cell::from(label).style(Style::default().add_modifier(Modifier::BOLD))),
        );
        let rows = self.view.cases().iter().map(|case| {
            Row::new(
                std::iter::once(case.id.to_string())
                    .chain(CaseField::ALL.into_iter().map(|f| case.fields.get(f).to_string()))
                    .map(Cell::from),
            )
        });
        let widths = [
            Constraint::Length(6),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Length(10),
            Constraint::Fill(2),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_set(border::ROUNDED)
                    .border_style(Style::default().fg(Color::Green))
                    .title(format!(" cases ({}) ", self.view.cases().len())),
            )
            .row_highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol(" ");
        frame.render_stateful_widget(table, area, &mut self.view.table_state);
    }
}

fn render_graph_pane(frame: &mut Frame<'_>, pane: &GraphPane, area: Rect) {
    let mut lines = vec![Line::from(Span::styled(
        format!(
            "{} cases, {} links, {} groups",
            pane.stats.node_count, pane.stats.edge_count, pane.stats.component_count
        ),
        Style::default().fg(Color::Yellow),
    ))];
    for row in &pane.rows {
        if row.links.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("#{} (no shared values)", row.id),
                Style::default().fg(Color::DarkGray),
            )));
            continue;
        }
        lines.push(Line::from(Span::styled(
            format!("#{}", row.id),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for (other, shared) in &row.links {
            lines.push(Line::from(vec![
                Span::raw(format!("  ── #{other} ")),
                Span::styled(shared.clone(), Style::default().fg(Color::Cyan)),
            ]));
        }
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(border::ROUNDED)
        .title(" graph ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn status_line(status: Option<&Notice>) -> Line<'static> {
    let Some(notice) = status else {
        return Line::default();
    };
    let color = match notice.level {
        NoticeLevel::Success => Color::Green,
        NoticeLevel::Warning => Color::Yellow,
        NoticeLevel::Error => Color::Red,
    };
    Line::from(Span::styled(
        format!(" {}", notice.message),
        Style::default().fg(color),
    ))
}

fn hint_line() -> Line<'static> {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Cyan));
    Line::from(vec![
        key(" a"),
        Span::raw(" add  "),
        key("e"),
        Span::raw(" edit  "),
        key("d"),
        Span::raw(" delete  "),
        key("g"),
        Span::raw(" graph  "),
        key("r"),
        Span::raw(" reload  "),
        key("q"),
        Span::raw(" back"),
    ])
}

/// Manager calls have already put any failure on the status line.
fn log_failure<T>(action: &'static str, result: anyhow::Result<T>) {
    if let Err(err) = result {
        tracing::warn!(action, error = %err, "case action failed");
    }
}
