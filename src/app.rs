use crate::api::StoreClient;
use crate::due_date::{partition, resolve_due_date, DisplayLocale};
use crate::error::TodoError;
use crate::models::{DuePeriod, Todo, TodoStatus};
use crate::parser::{build_new_todo, parse_selection};
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::widgets::ListState;
use std::io;
use tracing::{error, info};

pub struct App {
    pub today: Vec<Todo>,
    pub backlog: Vec<Todo>,
    pub today_state: ListState,
    pub backlog_state: ListState,
    pub focus: Section,
    pub show_completed: bool,
    pub input_mode: InputMode,
    pub active_input: ActiveInput,
    pub new_todo_title: String,
    pub new_todo_period: DuePeriod,
    pub new_todo_selection: String,
    pub form_error: Option<String>,
    pub status_message: Option<String>,
    pub locale: DisplayLocale,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    Today,
    Backlog,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
    Insert,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveInput {
    Title,
    Period,
    Selection,
}

impl App {
    pub fn new(locale: DisplayLocale) -> App {
        App {
            today: Vec::new(),
            backlog: Vec::new(),
            today_state: ListState::default(),
            backlog_state: ListState::default(),
            focus: Section::Today,
            show_completed: true,
            input_mode: InputMode::Normal,
            active_input: ActiveInput::Title,
            new_todo_title: String::new(),
            new_todo_period: DuePeriod::Day,
            new_todo_selection: String::new(),
            form_error: None,
            status_message: None,
            locale,
        }
    }

    /// Replaces both lists with a fresh partition of `todos`. Active items
    /// come before completed ones, each group in store order.
    pub fn set_todos(&mut self, todos: Vec<Todo>, today: NaiveDate) {
        let (today_list, backlog) = partition(todos, today);
        self.today = active_first(today_list);
        self.backlog = active_first(backlog);
        self.clamp_selection(Section::Today);
        self.clamp_selection(Section::Backlog);
    }

    pub async fn refresh(&mut self, store: &StoreClient, today: NaiveDate) -> Result<(), TodoError> {
        let todos = store.fetch_all().await?;
        self.set_todos(todos, today);
        Ok(())
    }

    /// Items rendered for a section; the today list may hide completed ones.
    pub fn visible(&self, section: Section) -> Vec<&Todo> {
        match section {
            Section::Today => self
                .today
                .iter()
                .filter(|todo| self.show_completed || todo.status != TodoStatus::Completed)
                .collect(),
            Section::Backlog => self.backlog.iter().collect(),
        }
    }

    pub fn selected_todo(&self) -> Option<&Todo> {
        let index = self.state(self.focus).selected()?;
        self.visible(self.focus).get(index).copied()
    }

    pub fn state(&self, section: Section) -> &ListState {
        match section {
            Section::Today => &self.today_state,
            Section::Backlog => &self.backlog_state,
        }
    }

    fn state_mut(&mut self, section: Section) -> &mut ListState {
        match section {
            Section::Today => &mut self.today_state,
            Section::Backlog => &mut self.backlog_state,
        }
    }

    fn clamp_selection(&mut self, section: Section) {
        let len = self.visible(section).len();
        let state = self.state_mut(section);
        match state.selected() {
            _ if len == 0 => state.select(None),
            Some(i) if i >= len => state.select(Some(len - 1)),
            None => state.select(Some(0)),
            Some(_) => {}
        }
    }

    pub fn next(&mut self) {
        let len = self.visible(self.focus).len();
        if len == 0 {
            return;
        }
        let state = self.state_mut(self.focus);
        let i = match state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.visible(self.focus).len();
        if len == 0 {
            return;
        }
        let state = self.state_mut(self.focus);
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }

    pub fn switch_focus(&mut self) {
        self.focus = match self.focus {
            Section::Today => Section::Backlog,
            Section::Backlog => Section::Today,
        };
    }

    pub fn toggle_show_completed(&mut self) {
        self.show_completed = !self.show_completed;
        self.clamp_selection(Section::Today);
    }

    /// Due date the form would submit, or why it cannot.
    pub fn due_date_preview(&self, today: NaiveDate) -> Result<Option<NaiveDate>, TodoError> {
        let selection = parse_selection(self.new_todo_period, &self.new_todo_selection, today)?;
        resolve_due_date(self.new_todo_period, selection, today)
    }

    fn open_form(&mut self) {
        self.input_mode = InputMode::Editing;
        self.active_input = ActiveInput::Title;
        self.new_todo_title.clear();
        self.new_todo_period = DuePeriod::Day;
        self.new_todo_selection.clear();
        self.form_error = None;
    }

    fn close_form(&mut self) {
        self.input_mode = InputMode::Normal;
        self.new_todo_title.clear();
        self.new_todo_selection.clear();
        self.form_error = None;
    }

    fn set_period(&mut self, period: DuePeriod) {
        self.new_todo_period = period;
        self.new_todo_selection.clear();
        self.form_error = None;
    }

    async fn submit_form(&mut self, store: &StoreClient, today: NaiveDate) {
        let new_todo = match build_new_todo(
            &self.new_todo_title,
            self.new_todo_period,
            &self.new_todo_selection,
            today,
        ) {
            Ok(new_todo) => new_todo,
            Err(err) => {
                self.form_error = Some(err.to_string());
                return;
            }
        };

        match store.create(&new_todo).await {
            Ok(created) => {
                info!(id = %created.id, period = ?created.due_period, "todo created");
                self.close_form();
                self.status_message = Some(format!("Created \"{}\"", created.title));
                self.reload(store, today).await;
            }
            Err(err) => {
                error!(error = %err, "failed to create todo");
                self.form_error = Some(format!("Error creating todo: {}", err));
            }
        }
    }

    async fn set_selected_status(
        &mut self,
        store: &StoreClient,
        today: NaiveDate,
        transition: fn(TodoStatus) -> TodoStatus,
    ) {
        let Some((id, status)) = self.selected_todo().map(|t| (t.id.clone(), t.status)) else {
            return;
        };

        let next = transition(status);
        match store.update_status(&id, next).await {
            Ok(()) => {
                info!(%id, from = ?status, to = ?next, "status changed");
                self.reload(store, today).await;
            }
            Err(err) => {
                error!(error = %err, %id, "failed to update status");
                self.status_message = Some(format!("Error updating status: {}", err));
            }
        }
    }

    async fn delete_selected(&mut self, store: &StoreClient, today: NaiveDate) {
        let Some(id) = self.selected_todo().map(|t| t.id.clone()) else {
            return;
        };

        match store.delete(&id).await {
            Ok(()) => {
                info!(%id, "todo deleted");
                self.status_message = Some("Todo deleted".to_string());
                self.reload(store, today).await;
            }
            Err(err) => {
                error!(error = %err, %id, "failed to delete todo");
                self.status_message = Some(format!("Error deleting todo: {}", err));
            }
        }
    }

    async fn reload(&mut self, store: &StoreClient, today: NaiveDate) {
        if let Err(err) = self.refresh(store, today).await {
            error!(error = %err, "failed to fetch todos");
            self.status_message = Some(format!("Error fetching todos: {}", err));
        }
    }

    /// Returns `Ok(true)` when the user asked to quit.
    pub async fn handle_input(
        &mut self,
        key: KeyEvent,
        store: &StoreClient,
        today: NaiveDate,
    ) -> io::Result<bool> {
        match self.input_mode {
            InputMode::Normal => {
                self.status_message = None;
                match key.code {
                    KeyCode::Char('q') => return Ok(true),
                    KeyCode::Char('j') | KeyCode::Down => self.next(),
                    KeyCode::Char('k') | KeyCode::Up => self.previous(),
                    KeyCode::Tab => self.switch_focus(),
                    KeyCode::Char('h') => self.toggle_show_completed(),
                    KeyCode::Char('r') => self.reload(store, today).await,
                    KeyCode::Char('s') => {
                        self.set_selected_status(store, today, TodoStatus::cycled).await
                    }
                    KeyCode::Char('c') | KeyCode::Char(' ') => {
                        self.set_selected_status(store, today, TodoStatus::toggled_completion)
                            .await
                    }
                    KeyCode::Char('D') => self.delete_selected(store, today).await,
                    KeyCode::Char('a') => self.open_form(),
                    _ => {}
                }
            }

            InputMode::Editing => match key.code {
                KeyCode::Char('i') if self.active_input != ActiveInput::Period => {
                    self.input_mode = InputMode::Insert;
                }
                KeyCode::Tab => {
                    self.active_input = match self.active_input {
                        ActiveInput::Title => ActiveInput::Period,
                        ActiveInput::Period if self.new_todo_period == DuePeriod::Unspecified => {
                            ActiveInput::Title
                        }
                        ActiveInput::Period => ActiveInput::Selection,
                        ActiveInput::Selection => ActiveInput::Title,
                    };
                }
                KeyCode::Right | KeyCode::Char('l') if self.active_input == ActiveInput::Period => {
                    self.set_period(self.new_todo_period.next());
                }
                KeyCode::Left | KeyCode::Char('h') if self.active_input == ActiveInput::Period => {
                    self.set_period(self.new_todo_period.previous());
                }
                KeyCode::Enter => self.submit_form(store, today).await,
                KeyCode::Esc => self.close_form(),
                _ => {}
            },

            InputMode::Insert => match key.code {
                KeyCode::Char(c) => match self.active_input {
                    ActiveInput::Title => self.new_todo_title.push(c),
                    ActiveInput::Selection => self.new_todo_selection.push(c),
                    ActiveInput::Period => {}
                },
                KeyCode::Backspace => match self.active_input {
                    ActiveInput::Title => {
                        self.new_todo_title.pop();
                    }
                    ActiveInput::Selection => {
                        self.new_todo_selection.pop();
                    }
                    ActiveInput::Period => {}
                },
                KeyCode::Enter => {
                    self.input_mode = InputMode::Editing;
                    self.submit_form(store, today).await;
                }
                KeyCode::Esc => {
                    self.input_mode = InputMode::Editing;
                }
                _ => {}
            },
        }
        Ok(false)
    }
}

fn active_first(todos: Vec<Todo>) -> Vec<Todo> {
    let (mut active, completed): (Vec<Todo>, Vec<Todo>) = todos
        .into_iter()
        .partition(|todo| todo.status != TodoStatus::Completed);
    active.extend(completed);
    active
}
