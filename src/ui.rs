use crate::api::StoreClient;
use crate::app::{ActiveInput, App, InputMode, Section};
use crate::due_date::{format_for_display, is_overdue, ISO_DATE};
use crate::models::{DuePeriod, Todo, TodoStatus};
use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event as CEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

fn centered_rect_absolute(width: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length((r.height.saturating_sub(height)) / 2),
                Constraint::Length(height),
                Constraint::Length((r.height.saturating_sub(height) + 1) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Length((r.width.saturating_sub(width)) / 2),
                Constraint::Length(width),
                Constraint::Length((r.width.saturating_sub(width) + 1) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}

fn get_legend(input_mode: InputMode) -> Text<'static> {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Red));
    match input_mode {
        InputMode::Normal => Text::from(Line::from(vec![
            key(" q "),
            Span::raw(": Quit "),
            key(" j/k "),
            Span::raw(": Move "),
            key(" Tab "),
            Span::raw(": Switch List "),
            key(" s "),
            Span::raw(": Cycle Status "),
            key(" c "),
            Span::raw(": Toggle Done "),
            key(" h "),
            Span::raw(": Hide Done "),
            key(" a "),
            Span::raw(": Add "),
            key(" D "),
            Span::raw(": Delete "),
            key(" r "),
            Span::raw(": Refresh "),
        ])),
        InputMode::Editing => Text::from(Line::from(vec![
            key(" i "),
            Span::raw(": Insert "),
            key(" Tab "),
            Span::raw(": Next Field "),
            key(" ←/→ "),
            Span::raw(": Period "),
            key(" Enter "),
            Span::raw(": Submit "),
            key(" Esc "),
            Span::raw(": Cancel "),
        ])),
        InputMode::Insert => Text::from(Line::from(vec![
            key(" Enter "),
            Span::raw(": Submit "),
            key(" Esc "),
            Span::raw(": Stop Typing "),
        ])),
    }
}

fn status_span(status: TodoStatus) -> Span<'static> {
    let color = match status {
        TodoStatus::Pending => Color::Yellow,
        TodoStatus::InProgress => Color::Blue,
        TodoStatus::Completed => Color::Green,
    };
    Span::styled(format!("[{}] ", status.label()), Style::default().fg(color))
}

fn todo_line(app: &App, todo: &Todo, today: NaiveDate) -> Line<'static> {
    let checkbox = if todo.status == TodoStatus::Completed {
        "[x] "
    } else {
        "[ ] "
    };

    let title_style = if todo.status == TodoStatus::Completed {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
    };

    let mut spans = vec![
        Span::raw(checkbox),
        status_span(todo.status),
        Span::styled(todo.title.clone(), title_style),
    ];

    if let Some(due) = todo.due_date {
        let iso = due.format(ISO_DATE).to_string();
        let due_style = if is_overdue(&iso, today) {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(
            format!("  {}", format_for_display(&iso, app.locale)),
            due_style,
        ));
    }

    Line::from(spans)
}

fn render_section(f: &mut Frame, app: &mut App, section: Section, area: Rect, today: NaiveDate) {
    let (name, empty) = match section {
        Section::Today => ("Today", "Nothing due today"),
        Section::Backlog => ("Backlog", "Backlog is empty"),
    };

    let title = if section == Section::Today && !app.show_completed {
        format!("{} (hiding done)", name)
    } else {
        name.to_string()
    };

    let border_style = if app.focus == section {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);

    let view: &App = app;
    let items: Vec<ListItem> = view
        .visible(section)
        .into_iter()
        .map(|todo| ListItem::new(todo_line(view, todo, today)))
        .collect();

    if items.is_empty() {
        f.render_widget(List::new(vec![ListItem::new(empty)]).block(block), area);
        return;
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol(">> ");

    let state = match section {
        Section::Today => &mut app.today_state,
        Section::Backlog => &mut app.backlog_state,
    };
    f.render_stateful_widget(list, area, state);
}

fn form_width(total: u16) -> u16 {
    let sixty_percent = (u32::from(total) * 60 / 100) as u16;
    sixty_percent.max(40).min(total)
}

fn render_form(f: &mut Frame, app: &App, area: Rect, today: NaiveDate) {
    let popup_width = form_width(area.width);
    let popup_area = centered_rect_absolute(popup_width, 9, area);

    let field_style = |input: ActiveInput| {
        if app.active_input == input {
            let color = if app.input_mode == InputMode::Insert {
                Color::Yellow
            } else {
                Color::Green
            };
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    };

    let periods: Vec<Span> = DuePeriod::ALL
        .iter()
        .map(|period| {
            let style = if *period == app.new_todo_period {
                Style::default().bg(Color::Blue).fg(Color::White)
            } else {
                Style::default()
            };
            Span::styled(format!(" {} ", period), style)
        })
        .collect();

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Title: ", field_style(ActiveInput::Title)),
            Span::raw(app.new_todo_title.clone()),
            Span::styled(
                format!("  {}/20", app.new_todo_title.trim().chars().count()),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(
            std::iter::once(Span::styled("Period: ", field_style(ActiveInput::Period)))
                .chain(periods)
                .collect::<Vec<_>>(),
        ),
    ];

    if app.new_todo_period != DuePeriod::Unspecified {
        lines.push(Line::from(vec![
            Span::styled("Due: ", field_style(ActiveInput::Selection)),
            Span::raw(app.new_todo_selection.clone()),
            Span::styled(
                format!("  ({})", app.new_todo_period.selection_hint()),
                Style::default().fg(Color::DarkGray),
            ),
        ]));

        let preview = match app.due_date_preview(today) {
            Ok(Some(date)) => Span::styled(
                format!("Due on {}", date.format(ISO_DATE)),
                Style::default().fg(Color::Cyan),
            ),
            Ok(None) => Span::raw(""),
            Err(err) => Span::styled(err.to_string(), Style::default().fg(Color::Red)),
        };
        lines.push(Line::from(preview));
    }

    if let Some(err) = &app.form_error {
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let popup_block = Block::default()
        .title("New Todo (Press Enter to Submit)")
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Green));

    let form = Paragraph::new(lines)
        .style(Style::default().fg(Color::White))
        .block(popup_block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(form, popup_area);
}

fn draw(f: &mut Frame, app: &mut App, today: NaiveDate) {
    let size = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints(
            [
                Constraint::Percentage(50),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(2),
            ]
            .as_ref(),
        )
        .split(size);

    render_section(f, app, Section::Today, chunks[0], today);
    render_section(f, app, Section::Backlog, chunks[1], today);

    if let Some(message) = &app.status_message {
        let status = Paragraph::new(message.as_str()).style(Style::default().fg(Color::Yellow));
        f.render_widget(status, chunks[2]);
    }

    if app.input_mode != InputMode::Normal {
        render_form(f, app, size, today);
    }

    let legend = Paragraph::new(get_legend(app.input_mode))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    f.render_widget(legend, chunks[3]);
}

pub async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    store: &StoreClient,
) -> io::Result<()> {
    loop {
        let today = Local::now().date_naive();

        terminal.draw(|f| draw(f, &mut app, today))?;

        // Handle input
        if event::poll(Duration::from_millis(100))? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let should_quit = app.handle_input(key, store, today).await?;
                if should_quit {
                    return Ok(());
                }
            }
        }
    }
}
