use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap,
};
use ratatui::Frame;

use humanity_status::domain::governance::{format_units, ProposalResult, DISPLAY_DECIMALS};
use humanity_status::modules::render;

pub mod layout;

use crate::app::{App, Focus, InputMode, StatusLevel};

pub fn draw(f: &mut Frame, app: &App) {
    let areas = layout::areas(f.size());

    draw_header(f, areas.header, app);
    draw_search_box(f, areas.search, app);
    draw_applications(f, areas.applications, app);
    draw_proposal(f, areas.proposal, app);
    draw_votes(f, areas.votes, app);
    draw_removed_votes(f, areas.removed_votes, app);
    draw_status_line(f, areas.status_line, app);
    draw_command_line(f, areas.command_line, app);

    if app.help_open {
        draw_help_popup(f, areas.size);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let title = Line::from(vec![
        Span::styled(
            "Humanity Status",
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("RPC", Style::default().fg(Color::DarkGray)),
        Span::raw(format!(" {} ", app.rpc_endpoint)),
        Span::styled("Focus", Style::default().fg(Color::DarkGray)),
        Span::raw(format!(" {}", app.focus.title())),
    ]);

    let left = Paragraph::new(title)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    let head = app
        .head_block
        .map(|n| n.to_string())
        .unwrap_or_else(|| "--".to_string());
    let right_line = Line::from(vec![
        Span::styled("Head ", Style::default().fg(Color::DarkGray)),
        Span::raw(head),
    ]);
    let right = Paragraph::new(right_line)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    f.render_widget(left, chunks[0]);
    f.render_widget(right, chunks[1]);
}

fn draw_search_box(f: &mut Frame, area: Rect, app: &App) {
    let editing = app.input_mode == InputMode::Editing;
    let border_style = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let mut spans = Vec::new();
    if editing {
        spans.push(Span::raw(app.input.clone()));
        spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
    } else if app.search.query().is_empty() {
        spans.push(Span::styled(
            "Proposal ID or Address (press / to search)",
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::raw(app.search.query().to_string()));
    }
    if app.search.is_searching() {
        spans.push(Span::styled(
            format!("  {} searching", app.spinner()),
            Style::default().fg(Color::LightCyan),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Search")
            .border_style(border_style),
    );
    f.render_widget(paragraph, area);
}

fn focus_border(app: &App, focus: Focus) -> Style {
    if app.focus == focus {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn highlight_style(app: &App, focus: Focus) -> Style {
    if app.focus == focus {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    }
}

fn yes_no_style(approve: bool) -> Style {
    if approve {
        Style::default().fg(Color::LightGreen)
    } else {
        Style::default().fg(Color::LightRed)
    }
}

fn draw_applications(f: &mut Frame, area: Rect, app: &App) {
    let applications = app.search.address_applications();
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Proposals from Address")
        .border_style(focus_border(app, Focus::Applications));

    if applications.is_empty() {
        let paragraph = Paragraph::new(Span::styled(
            "--",
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let mut spans = Vec::new();
    for (idx, application) in applications.iter().enumerate() {
        let style = if idx == app.selected_application && app.focus == Focus::Applications {
            highlight_style(app, Focus::Applications)
        } else {
            Style::default()
        };
        spans.push(Span::styled(format!("#{}", application.proposal_id), style));
        spans.push(Span::raw(" "));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn draw_proposal(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL).title("Proposal");
    let Some(view) = app.search.view() else {
        let paragraph = Paragraph::new(Span::styled(
            "No proposal loaded",
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        f.render_widget(paragraph, area);
        return;
    };

    let proposal = &view.proposal;
    let twitter = view
        .applicant_handle()
        .map(render::twitter_handle)
        .unwrap_or_else(|| "--".to_string());
    let result_style = match view.result {
        Some(ProposalResult::Approved) => yes_no_style(true),
        Some(ProposalResult::Rejected) => yes_no_style(false),
        Some(ProposalResult::Unrecognized(_)) => Style::default().fg(Color::LightYellow),
        _ => Style::default(),
    };
    let result = view
        .result
        .map(|result| result.label())
        .unwrap_or_else(|| "--".to_string());

    let label = |text: &'static str| Span::styled(format!("{:<18}", text), Style::default().fg(Color::DarkGray));
    let lines = vec![
        Line::from(vec![label("Proposal ID"), Span::raw(view.proposal_id.clone())]),
        Line::from(vec![label("Address"), Span::raw(proposal.fee_recipient.to_string())]),
        Line::from(vec![label("Twitter"), Span::raw(twitter)]),
        Line::from(vec![
            label("Starting Time"),
            Span::raw(render::format_start_time(proposal.start_time)),
        ]),
        Line::from(vec![
            label("Votes (Yes / No)"),
            Span::styled(
                format_units(proposal.yes_count, DISPLAY_DECIMALS),
                yes_no_style(true),
            ),
            Span::raw(" / "),
            Span::styled(
                format_units(proposal.no_count, DISPLAY_DECIMALS),
                yes_no_style(false),
            ),
        ]),
        Line::from(vec![label("Result"), Span::styled(result, result_style)]),
        Line::from(""),
        Line::from(Span::styled(
            render::explorer_address_url(&app.explorer_url, &proposal.fee_recipient),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn draw_votes(f: &mut Frame, area: Rect, app: &App) {
    let votes = app
        .search
        .view()
        .map(|view| view.votes.as_slice())
        .unwrap_or(&[]);

    let rows: Vec<Row> = votes
        .iter()
        .map(|vote| {
            Row::new(vec![
                Cell::from(short_hash(&vote.transaction_hash.to_string(), 12)),
                Cell::from(short_addr(&vote.voter.to_string())),
                Cell::from(render::yes_no(vote.approve)).style(yes_no_style(vote.approve)),
                Cell::from(format_units(vote.weight, DISPLAY_DECIMALS))
                    .style(yes_no_style(vote.approve)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(9),
            Constraint::Min(8),
        ],
    )
    .header(
        Row::new(vec!["TX", "Voter", "Voted for", "Weight"])
            .style(Style::default().fg(Color::DarkGray)),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("{} ({})", Focus::Votes.title(), votes.len()))
            .border_style(focus_border(app, Focus::Votes)),
    )
    .highlight_style(highlight_style(app, Focus::Votes))
    .highlight_symbol(">> ");

    let mut state = TableState::default();
    if !votes.is_empty() {
        state.select(Some(app.selected_vote));
    }
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_removed_votes(f: &mut Frame, area: Rect, app: &App) {
    let removed = app
        .search
        .view()
        .map(|view| view.removed_votes.as_slice())
        .unwrap_or(&[]);

    let rows: Vec<Row> = removed
        .iter()
        .map(|event| {
            Row::new(vec![
                Cell::from(short_hash(&event.transaction_hash.to_string(), 12)),
                Cell::from(short_addr(&event.voter.to_string())),
            ])
        })
        .collect();

    let table = Table::new(rows, [Constraint::Length(14), Constraint::Min(14)])
        .header(Row::new(vec!["TX", "Voter"]).style(Style::default().fg(Color::DarkGray)))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} ({})", Focus::RemovedVotes.title(), removed.len()))
                .border_style(focus_border(app, Focus::RemovedVotes)),
        )
        .highlight_style(highlight_style(app, Focus::RemovedVotes))
        .highlight_symbol(">> ");

    let mut state = TableState::default();
    if !removed.is_empty() {
        state.select(Some(app.selected_removed_vote));
    }
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let query = if app.search.query().is_empty() {
        "--".to_string()
    } else {
        app.search.query().to_string()
    };
    let generation = app
        .search
        .latest_ticket()
        .map(|ticket| ticket.generation().to_string())
        .unwrap_or_else(|| "0".to_string());
    let mut spans = vec![
        Span::styled("Query ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", query)),
        Span::styled("Search ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("#{}  ", generation)),
    ];
    if let Some(error) = app.search.last_error() {
        spans.push(Span::styled(error.to_string(), Style::default().fg(Color::LightRed)));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left);
    f.render_widget(paragraph, area);
}

fn draw_command_line(f: &mut Frame, area: Rect, app: &App) {
    let content = match app.input_mode {
        InputMode::Editing => Line::from(vec![
            Span::styled("/ ", Style::default().fg(Color::Yellow)),
            Span::raw(app.input.clone()),
            Span::styled(
                "  Enter=search Esc=cancel",
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        InputMode::Normal => {
            if let Some((text, level)) = app.status_text() {
                let color = match level {
                    StatusLevel::Info => Color::LightGreen,
                    StatusLevel::Warn => Color::LightYellow,
                    StatusLevel::Error => Color::LightRed,
                };
                let mut spans = vec![
                    Span::styled("msg: ", Style::default().fg(Color::DarkGray)),
                    Span::styled(text.to_string(), Style::default().fg(color)),
                ];
                if app.has_notice() {
                    spans.push(Span::styled(
                        "  (press any key)",
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                Line::from(spans)
            } else {
                action_hints()
            }
        }
    };

    let paragraph = Paragraph::new(content).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}

fn action_hints() -> Line<'static> {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::LightCyan));
    let text = |t: &'static str| Span::styled(t, Style::default().fg(Color::DarkGray));
    Line::from(vec![
        key("/"),
        text(" search  "),
        key("Tab"),
        text(" focus  "),
        key("Enter"),
        text(" open #id  "),
        key("y"),
        text(" copy tx  "),
        key("e"),
        text(" export  "),
        key("?"),
        text(" help  "),
        key("q"),
        text(" quit"),
    ])
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(64, 60, area);
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from("Navigation"),
        Line::from("  Tab / Shift-Tab  Cycle focus"),
        Line::from("  j / k            Move selection"),
        Line::from("  g / G            Top / bottom"),
        Line::from("  Esc              Close / cancel"),
        Line::from(""),
        Line::from("Actions"),
        Line::from("  /                Search a proposal ID or address"),
        Line::from("  Enter            Open selected #id (Proposals from Address)"),
        Line::from("  r                Repeat the last search"),
        Line::from("  y                Copy selected transaction hash"),
        Line::from("  e                Export view (JSON + CSV)"),
        Line::from("  [ / ]            Switch RPC endpoint"),
        Line::from("  ?                Toggle help"),
        Line::from("  q                Quit"),
        Line::from(""),
        Line::from("Search examples:"),
        Line::from("  / 136"),
        Line::from("  / 0x<40-hex-address>"),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().title("Help").borders(Borders::ALL))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

fn short_addr(value: &str) -> String {
    if value.len() <= 10 {
        return value.to_string();
    }
    let start: String = value.chars().take(6).collect();
    let end: String = value
        .chars()
        .rev()
        .take(4)
        .collect::<String>()
        .chars()
        .rev()
        .collect();
    format!("{}..{}", start, end)
}

fn short_hash(value: &str, len: usize) -> String {
    if value.len() <= len {
        return value.to_string();
    }
    value.chars().take(len).collect()
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_addr() {
        assert_eq!(
            short_addr("0x36faa1e49ff125ac72ceae0d5a2e35bc9add6591"),
            "0x36fa..6591"
        );
        assert_eq!(short_addr("0x1234"), "0x1234");
    }

    #[test]
    fn test_short_hash() {
        assert_eq!(short_hash("0xabcdef0123456789", 8), "0xabcdef");
        assert_eq!(short_hash("0xab", 8), "0xab");
    }
}
