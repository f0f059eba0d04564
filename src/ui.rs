pub mod charting;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Gauge, Paragraph, Widget, Wrap},
};
use webbrowser::Browser;

use repline::session::Phase;
use repline::summary::format_time;
use repline::workout::{Exercise, ExerciseKind};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Split `area` into a vertically centred column of `heights` rows plus a legend line
fn centred_rows(area: Rect, heights: &[u16]) -> (Vec<Rect>, Rect) {
    let content: u16 = heights.iter().sum();
    let spare = area.height.saturating_sub(content + 1) / 2;

    let mut constraints = vec![Constraint::Length(spare)];
    constraints.extend(heights.iter().map(|h| Constraint::Length(*h)));
    constraints.push(Constraint::Min(0));
    constraints.push(Constraint::Length(1));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints(constraints)
        .split(area);

    let rows = chunks[1..=heights.len()].to_vec();
    (rows, chunks[chunks.len() - 1])
}

fn centred<'a>(text: impl Into<Line<'a>>) -> Paragraph<'a> {
    Paragraph::new(text.into())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
}

fn notes_line(exercise: &Exercise) -> Paragraph<'_> {
    centred(Span::styled(
        exercise.notes.as_deref().unwrap_or_default(),
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
    ))
}

fn legend(app: &App, phase: Phase) -> Paragraph<'static> {
    let mut keys: Vec<&str> = Vec::new();
    match phase {
        Phase::Exercising | Phase::Resting => {
            keys.push(if app.engine.is_paused() {
                "(space) resume"
            } else {
                "(space) pause"
            });
        }
        Phase::RepConfirm => keys.push("(enter) done"),
        _ => {}
    }
    let has_video = app
        .engine
        .current_exercise()
        .is_some_and(|e| e.video_url.is_some());
    if has_video && matches!(phase, Phase::Exercising | Phase::RepConfirm) {
        keys.push("(v)ideo");
    }
    keys.push("(esc) quit");

    let mut line = keys.join(" / ");
    if let Some(notice) = &app.notice {
        line = format!("{notice}   {line}");
    }
    Paragraph::new(Span::styled(
        line,
        Style::default().add_modifier(Modifier::ITALIC),
    ))
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let engine = &self.engine;
        let Some(state) = engine.state() else {
            centred(Span::styled("Workout cancelled", dim())).render(area, buf);
            return;
        };
        let Some(exercise) = engine.current_exercise() else {
            return;
        };
        let countdown = Span::styled(
            state.time_left_secs.to_string(),
            bold().fg(Color::White),
        );

        match state.phase {
            Phase::Ready => {
                let (rows, footer) = centred_rows(area, &[1, 1, 1, 2]);
                centred(Span::styled("GET READY", dim())).render(rows[0], buf);
                centred(Span::styled(exercise.name.as_str(), bold())).render(rows[2], buf);
                centred(countdown).render(rows[3], buf);
                legend(self, state.phase).render(footer, buf);
            }
            Phase::Exercising => {
                let (rows, footer) = centred_rows(area, &[1, 1, 1, 1, 1, 3]);
                centred(countdown).render(rows[0], buf);

                let duration = exercise.duration_secs().unwrap_or_default();
                let ratio = charting::exercise_progress(duration, state.time_left_secs);
                Gauge::default()
                    .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
                    .ratio(ratio)
                    .label(format!("{}%", (ratio * 100.0).round()))
                    .render(rows[1], buf);

                centred(Span::styled(exercise.name.as_str(), bold())).render(rows[3], buf);
                if state.paused {
                    centred(Span::styled("PAUSED", bold().fg(Color::Yellow))).render(rows[4], buf);
                }
                notes_line(exercise).render(rows[5], buf);
                legend(self, state.phase).render(footer, buf);
            }
            Phase::RepConfirm => {
                let (rows, footer) = centred_rows(area, &[1, 1, 1, 1, 3]);
                centred(Span::styled(exercise.name.as_str(), bold())).render(rows[0], buf);
                if let ExerciseKind::RepBased { sets, reps } = &exercise.kind {
                    centred(Span::styled(
                        format!("{sets} x {reps}"),
                        bold().fg(Color::White),
                    ))
                    .render(rows[2], buf);
                }
                notes_line(exercise).render(rows[4], buf);
                legend(self, state.phase).render(footer, buf);
            }
            Phase::Resting => {
                let (rows, footer) = centred_rows(area, &[1, 1, 1, 1, 1]);
                centred(Span::styled("REST", dim())).render(rows[0], buf);
                centred(countdown).render(rows[2], buf);
                if state.paused {
                    centred(Span::styled("PAUSED", bold().fg(Color::Yellow))).render(rows[3], buf);
                }
                if let Some(next) = engine.next_exercise() {
                    centred(Line::from(vec![
                        Span::raw("Next Up: "),
                        Span::styled(next.name.as_str(), bold().fg(Color::Green)),
                    ]))
                    .render(rows[4], buf);
                }
                legend(self, state.phase).render(footer, buf);
            }
            Phase::Completed => {
                let (rows, footer) = centred_rows(area, &[1, 1, 1]);
                centred(Span::styled("Well Done!", bold().fg(Color::Green))).render(rows[0], buf);
                centred(Span::styled(
                    format!("{} completed.", exercise.name),
                    dim(),
                ))
                .render(rows[2], buf);
                legend(self, state.phase).render(footer, buf);
            }
            Phase::Finished => render_summary(self, area, buf),
        }
    }
}

/// Summary view: totals, estimated calories and an active/rest bar chart
pub fn render_summary(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(summary) = app.engine.summary() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(1), // subtitle
            Constraint::Length(1), // padding
            Constraint::Min(6),    // chart + stats
            Constraint::Length(1), // legend
        ])
        .split(area);

    centred(Span::styled("Workout Summary", bold())).render(chunks[0], buf);
    centred(Span::styled(
        format!("Great job finishing the {}!", app.engine.workout().title),
        Style::default().fg(Color::Green),
    ))
    .render(chunks[1], buf);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[3]);

    let bars: Vec<Bar> = charting::summary_bars(summary)
        .iter()
        .zip([Color::Green, Color::Gray])
        .map(|((label, secs), color)| {
            Bar::default()
                .label(Line::from(*label))
                .value(*secs)
                .text_value(format_time(*secs))
                .style(Style::default().fg(color))
        })
        .collect();
    BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(format!(
            "Active {}%",
            charting::active_percent(summary)
        )))
        .data(BarGroup::default().bars(&bars))
        .bar_width(9)
        .bar_gap(3)
        .render(body[0], buf);

    let stats = vec![
        Line::from(Span::styled("TOTAL DURATION", dim())),
        Line::from(Span::styled(format_time(summary.total_duration_secs), bold())),
        Line::from(""),
        Line::from(Span::styled("ACTIVE TIME", dim())),
        Line::from(Span::styled(format_time(summary.active_duration_secs), bold())),
        Line::from(""),
        Line::from(Span::styled("EST. CALORIES BURNED", dim())),
        Line::from(Span::styled(format!("{} kcal", summary.calories_burned), bold())),
    ];
    Paragraph::new(stats)
        .block(Block::default().borders(Borders::ALL))
        .render(body[1], buf);

    let mut keys = String::from(if Browser::is_available() {
        "(s)hare / (enter) back / (esc)ape"
    } else {
        "(enter) back / (esc)ape"
    });
    if let Some(notice) = &app.notice {
        keys = format!("{notice}   {keys}");
    }
    Paragraph::new(Span::styled(keys, Style::default().add_modifier(Modifier::ITALIC)))
        .render(chunks[4], buf);
}
