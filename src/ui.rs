use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap},
};

use crate::domain::{AppConfig, NULL_MARKER, View};
use crate::model::{Model, PaneData, UIData};
use crate::stats::DataStats;
use crate::view::CellValue;

pub struct TableUI {
    _config: AppConfig,
}

impl TableUI {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            _config: config.clone(),
        }
    }

    pub fn draw(&self, model: &Model, frame: &mut Frame) {
        let data = model.get_uidata();
        let [tabs_area, stats_area, tables_area, status_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(6),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        self.draw_tabs(data, tabs_area, frame);
        self.draw_stats(data, stats_area, frame);

        let [raw_area, cleaned_area] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(tables_area);
        self.draw_pane(&data.raw, raw_area, frame);
        self.draw_pane(&data.cleaned, cleaned_area, frame);

        self.draw_status(data, status_area, frame);

        if data.show_popup {
            self.draw_popup(data, frame);
        }
    }

    fn draw_tabs(&self, data: &UIData, area: Rect, frame: &mut Frame) {
        let tabs = Tabs::new(data.dataset_titles.clone())
            .select(data.selected_dataset)
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, area);
    }

    fn draw_stats(&self, data: &UIData, area: Rect, frame: &mut Frame) {
        let block = Block::bordered().title(" Quality metrics ");
        let lines = match &data.stats {
            Some(stats) => stats_lines(stats, &data.description),
            None => vec![Line::from(if data.loading {
                "Loading ..."
            } else {
                "No dataset loaded"
            })],
        };
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_pane(&self, pane: &PaneData, area: Rect, frame: &mut Frame) {
        let border_style = if pane.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let block = Block::bordered()
            .title(format!(" {} ", pane.title))
            .border_style(border_style);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [table_area, footer_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

        if pane.rows.is_empty() {
            // Placeholder row covering the whole table.
            frame.render_widget(
                Paragraph::new("No matching records").dim().centered(),
                table_area,
            );
        } else {
            let ncols = std::cmp::max(1, pane.columns.len()) as u32;
            let header = Row::new(
                pane.columns
                    .iter()
                    .map(|c| Cell::from(c.clone()).bold()),
            );
            let rows = pane.rows.iter().enumerate().map(|(idx, cells)| {
                let row = Row::new(cells.iter().map(render_cell));
                if pane.focused && idx == pane.cursor {
                    row.style(Style::default().add_modifier(Modifier::REVERSED))
                } else {
                    row
                }
            });
            let widths = vec![Constraint::Ratio(1, ncols); ncols as usize];
            let table = Table::new(rows, widths).header(header).column_spacing(1);
            frame.render_widget(table, table_area);
        }

        frame.render_widget(footer_line(pane), footer_area);
    }

    fn draw_status(&self, data: &UIData, area: Rect, frame: &mut Frame) {
        let line = if data.input_active {
            let view = data.input_view.unwrap_or(View::Raw);
            Line::from(vec![
                Span::styled(
                    format!("Search {}: ", view.label()),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(data.input.input.clone()),
                Span::styled("▏", Style::default().fg(Color::Yellow)),
            ])
        } else {
            Line::from(vec![
                Span::raw(data.status_message.clone()),
                Span::styled("   ? help · q quit", Style::default().dim()),
            ])
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_popup(&self, data: &UIData, frame: &mut Frame) {
        let area = centered_rect(frame.area(), 60, 60);
        frame.render_widget(Clear, area);
        let block = Block::bordered().title(" dqv ");
        frame.render_widget(
            Paragraph::new(data.popup_message.clone())
                .wrap(Wrap { trim: false })
                .block(block),
            area,
        );
    }
}

fn render_cell(cell: &CellValue) -> Cell<'_> {
    match cell {
        CellValue::Null => Cell::from(Span::styled(
            NULL_MARKER,
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::ITALIC),
        )),
        CellValue::Text(value) => Cell::from(value.as_str()),
    }
}

fn footer_line(pane: &PaneData) -> Paragraph<'_> {
    let arrow = |enabled: bool, glyph: &'static str| {
        if enabled {
            Span::raw(glyph)
        } else {
            Span::styled(glyph, Style::default().dim())
        }
    };
    let mut spans = vec![
        arrow(pane.prev_enabled, "← "),
        Span::raw(pane.page_line.clone()),
        arrow(pane.next_enabled, " →"),
        Span::raw(format!(" · {}/page", pane.page_size)),
    ];
    if !pane.term.is_empty() {
        spans.push(Span::styled(
            format!(" · {} matches for \"{}\"", pane.matches, pane.term),
            Style::default().fg(Color::Yellow),
        ));
    }
    Paragraph::new(Line::from(spans))
}

fn stats_lines<'a>(stats: &DataStats, description: &'a str) -> Vec<Line<'a>> {
    vec![
        Line::from(Span::styled(
            description,
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        Line::from(format!(
            "Raw:     {} rows · {} incomplete · {} null fields · completeness {:.1}% · validity {:.1}%",
            stats.raw.total,
            stats.raw.missing,
            stats.raw.nulls,
            stats.raw.completeness,
            stats.raw.validity
        )),
        Line::from(format!(
            "Cleaned: {} rows · completeness {:.1}% · validity {:.1}% · consistency {:.1}%",
            stats.cleaned.total,
            stats.cleaned.completeness,
            stats.cleaned.validity,
            stats.cleaned.consistency
        )),
        Line::from(vec![
            Span::raw("Overall: "),
            Span::styled(
                format!("quality {:.1}%", stats.quality),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(
                " · consistency {:.1}% · {} rows removed",
                stats.raw.consistency, stats.removed
            )),
        ]),
    ]
}

fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [_, mid, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(area);
    let [_, mid, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(mid);
    mid
}
