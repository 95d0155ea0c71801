mod app;

pub use app::App;

use anyhow::Result;
use app::{EditTarget, Page, PantryColumn, SettingField, StatusKind};
use bakery_pricing::report::{format_optional, format_quantity};
use bakery_pricing::{format_brl, PriceBreakdown};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame, Terminal,
};
use std::io;

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            // Windows reports releases too
            if key.kind != KeyEventKind::Press {
                continue;
            }
            app.handle_key(key);
            if app.should_quit {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Calculator => {
            let content_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Percentage(55), // Ingredient picker
                    Constraint::Percentage(45), // Breakdown
                ])
                .split(chunks[1]);

            render_ingredients(f, content_chunks[0], app);
            render_breakdown(f, content_chunks[1], app);
        }
        Page::Pantry => render_pantry(f, chunks[1], app),
        Page::Settings => render_settings(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![Span::styled(
        "🧁 ",
        Style::default().fg(Color::Magenta),
    )];
    for (i, page) in Page::ALL.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Pantry: {} items", app.catalog.names().len()),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        app.store_label(),
        Style::default().fg(Color::DarkGray),
    ));
    if app.dirty {
        tab_spans.push(Span::raw("  "));
        tab_spans.push(Span::styled(
            "● unsaved",
            Style::default().fg(Color::Red),
        ));
    }

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn header_row(titles: &[&str]) -> Row<'static> {
    let cells = titles.iter().map(|h| {
        Cell::from(h.to_string()).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });
    Row::new(cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1)
}

fn render_ingredients(f: &mut Frame, area: Rect, app: &mut App) {
    if app.catalog.names().is_empty() {
        let text = if app.load_error.is_some() {
            "The pantry could not be read. Fix the store and press r to reload."
        } else {
            "Your pantry is empty! Add items on the My Pantry tab."
        };
        let empty = Paragraph::new(text)
            .style(Style::default().fg(Color::Yellow))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Ingredients "));
        f.render_widget(empty, area);
        return;
    }

    let header = header_row(&["", "Ingredient", "Qty used", "Unit", "Cost"]);

    let rows: Vec<Row> = app
        .calculator_names()
        .into_iter()
        .map(|name| {
            let entry = app.catalog.find(&name);
            let unit = entry.map(|e| e.unit.clone()).unwrap_or_default();
            match app.selection.quantity(&name) {
                Some(quantity) => {
                    let cost = entry.map(|e| e.unit_cost() * quantity).unwrap_or(0.0);
                    Row::new(vec![
                        Cell::from("[x]").style(Style::default().fg(Color::Green)),
                        Cell::from(name),
                        Cell::from(format_quantity(quantity)),
                        Cell::from(unit),
                        Cell::from(format_brl(cost)).style(Style::default().fg(Color::Green)),
                    ])
                }
                None => Row::new(vec![
                    Cell::from("[ ]").style(Style::default().fg(Color::DarkGray)),
                    Cell::from(name),
                    Cell::from(""),
                    Cell::from(unit),
                    Cell::from(""),
                ]),
            }
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Min(18),
            Constraint::Length(10),
            Constraint::Length(6),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Ingredients "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.calculator_state);
}

fn money_line(label: &str, amount: f64, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("  {:<26}", label)),
        Span::styled(format_brl(amount), Style::default().fg(color)),
    ])
}

fn breakdown_lines(breakdown: &PriceBreakdown) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            "📋 Cost breakdown",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        money_line("Ingredients", breakdown.ingredient_cost_total, Color::White),
        money_line("Labor", breakdown.labor_cost, Color::White),
        money_line("Oven/gas", breakdown.oven_cost, Color::White),
        money_line("Total cost", breakdown.total_cost, Color::Yellow),
        money_line(
            &format!("Profit ({}%)", format_quantity(breakdown.profit_margin_percent)),
            breakdown.profit_amount,
            Color::Green,
        ),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                "💰 Suggested price: ",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format_brl(breakdown.sale_price),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    let uncosted: Vec<&str> = breakdown
        .lines
        .iter()
        .filter(|line| !line.costable)
        .map(|line| line.name.as_str())
        .collect();
    if !uncosted.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("⚠️  No package quantity, counted as free: {}", uncosted.join(", ")),
            Style::default().fg(Color::Yellow),
        )));
    }

    lines
}

fn render_breakdown(f: &mut Frame, area: Rect, app: &App) {
    let mut lines = vec![
        Line::from(vec![
            Span::raw("Hands-on time: "),
            Span::styled(
                format!("{} min", app.selection.prep_minutes),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw("   Oven time: "),
            Span::styled(
                format!("{} min", app.selection.oven_minutes),
                Style::default().fg(Color::Cyan),
            ),
        ]),
        Line::from(""),
    ];

    match app.breakdown() {
        Ok(breakdown) => lines.extend(breakdown_lines(&breakdown)),
        Err(err) => lines.push(Line::from(Span::styled(
            format!("❌ {}", err),
            Style::default().fg(Color::Red),
        ))),
    }

    let panel = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Price "),
    );

    f.render_widget(panel, area);
}

fn render_pantry(f: &mut Frame, area: Rect, app: &mut App) {
    let mut titles: Vec<&str> = PantryColumn::ALL.iter().map(|c| c.title()).collect();
    titles.push("Unit cost");
    let header = header_row(&titles);

    let selected_row = app.pantry_state.selected();
    let rows: Vec<Row> = app
        .draft
        .iter()
        .enumerate()
        .map(|(row, entry)| {
            let texts = [
                entry.name.clone(),
                format_optional(entry.package_price),
                format_optional(entry.package_quantity),
                entry.unit.clone(),
            ];
            let mut cells: Vec<Cell> = texts
                .into_iter()
                .zip(PantryColumn::ALL)
                .map(|(text, column)| {
                    let cell = Cell::from(text);
                    if selected_row == Some(row) && column == app.pantry_column {
                        cell.style(Style::default().fg(Color::Black).bg(Color::Yellow))
                    } else {
                        cell
                    }
                })
                .collect();

            let unit_cost = if entry.is_costable() {
                Cell::from(format!("{:.4}", entry.unit_cost()))
            } else {
                Cell::from("-").style(Style::default().fg(Color::DarkGray))
            };
            cells.push(unit_cost);
            Row::new(cells).height(1)
        })
        .collect();

    let title = if app.dirty {
        " My Pantry (unsaved changes) "
    } else {
        " My Pantry "
    };

    let table = Table::new(
        rows,
        [
            Constraint::Min(24),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .highlight_style(Style::default().add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.pantry_state);
}

fn render_settings(f: &mut Frame, area: Rect, app: &mut App) {
    let rows: Vec<Row> = SettingField::ALL
        .iter()
        .map(|field| {
            let value = app.setting_value(*field);
            let shown = match field {
                SettingField::Margin => format!("{}%", format_quantity(value)),
                _ => format_brl(value),
            };
            Row::new(vec![
                Cell::from(field.title().to_string()),
                Cell::from(shown).style(Style::default().fg(Color::Cyan)),
            ])
        })
        .collect();

    let table = Table::new(rows, [Constraint::Length(26), Constraint::Length(14)])
        .header(header_row(&["Setting", "Value"]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Settings (profit between 10% and 100%) "),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.settings_state);
}

fn key_hint(spans: &mut Vec<Span<'static>>, key: &'static str, action: &'static str) {
    spans.push(Span::styled(key, Style::default().fg(Color::Yellow)));
    spans.push(Span::raw(format!(" {} | ", action)));
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans: Vec<Span<'static>> = vec![];

    if let Some(input) = &app.input {
        status_spans.push(Span::styled(
            format!(" {}: ", input.target.label()),
            Style::default().fg(Color::Cyan),
        ));
        status_spans.push(Span::styled(
            format!("{}▏", input.buffer),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ));
        status_spans.push(Span::raw("  "));
        key_hint(&mut status_spans, "Enter", "Apply");
        status_spans.push(Span::styled("Esc", Style::default().fg(Color::Red)));
        status_spans.push(Span::raw(" Cancel"));
        if matches!(input.target, EditTarget::Cell { .. }) {
            status_spans.push(Span::raw(" (saved with s)"));
        }
    } else {
        if let Some(status) = &app.status {
            let color = match status.kind {
                StatusKind::Info => Color::Green,
                StatusKind::Error => Color::Red,
            };
            status_spans.push(Span::styled(
                format!(" {} ", status.text),
                Style::default().fg(color),
            ));
            status_spans.push(Span::raw("| "));
        }

        match app.current_page {
            Page::Calculator => {
                key_hint(&mut status_spans, "Space", "Pick");
                key_hint(&mut status_spans, "Enter", "Qty");
                key_hint(&mut status_spans, "p/o", "Times");
                key_hint(&mut status_spans, "c", "Clear");
            }
            Page::Pantry => {
                key_hint(&mut status_spans, "Enter", "Edit");
                key_hint(&mut status_spans, "a/d", "Add/Del");
                key_hint(&mut status_spans, "s", "Save");
                key_hint(&mut status_spans, "r", "Reload");
            }
            Page::Settings => {
                key_hint(&mut status_spans, "Enter", "Edit");
                key_hint(&mut status_spans, "+/-", "Adjust");
                key_hint(&mut status_spans, "x", "Defaults");
            }
        }
        key_hint(&mut status_spans, "Tab", "Page");
        status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
        status_spans.push(Span::raw(" Quit"));
    }

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}
