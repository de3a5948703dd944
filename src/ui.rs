use crate::chart;
use crate::data::DataCatalog;
use crate::indicators;
use crate::map_draw::MapView;
use crate::pages::{gis::GisPage, home::HomePage, reports::ReportsPage};
use crate::report::ReportEntry;
use crate::route::Route;
use crate::state::{AppState, Page};
use crate::theme::Theme;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, BarChart, Block, Borders, Chart, Dataset, GraphType, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};

pub fn draw(f: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)])
        .split(f.area());

    draw_header(f, chunks[0], state);
    match &state.page {
        Page::Home(home) => draw_home(f, chunks[1], &state.catalog, home),
        Page::Reports(list) => draw_reports(f, chunks[1], list),
        Page::Detail(entry) => draw_detail(f, chunks[1], entry),
        Page::GisIndex { selected } => draw_gis_index(f, chunks[1], *selected),
        Page::Gis(gis) => draw_gis(f, chunks[1], &state.catalog, gis),
    }

    let footer = if state.notice.is_empty() { AppState::HELP_TEXT } else { state.notice.as_str() };
    f.render_widget(Paragraph::new(footer).style(Style::default().fg(Color::DarkGray)), chunks[2]);
}

fn draw_header(f: &mut Frame, area: Rect, state: &AppState) {
    let selected = match state.route {
        Route::Home => 0,
        Route::Reports { .. } | Route::ReportDetail(_) => 1,
        Route::GisIndex | Route::Gis(_) => 2,
    };
    let tabs = Tabs::new(vec!["홈", "보고서", "지도"])
        .select(selected)
        .block(Block::default().borders(Borders::ALL).title(format!("제주 농업 아틀라스  {}", state.route)))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, area);
}

fn draw_home(f: &mut Frame, area: Rect, catalog: &DataCatalog, home: &HomePage) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(6), Constraint::Length(6)])
        .split(cols[0]);

    // headline figures
    let lines: Vec<Line> = home
        .indicators
        .iter()
        .map(|i| {
            let change = match i.change {
                Some(c) if c >= 0.0 => Span::styled(format!(" ▲{c:.1}%"), Style::default().fg(Color::Red)),
                Some(c) => Span::styled(format!(" ▼{:.1}%", c.abs()), Style::default().fg(Color::Blue)),
                None => Span::raw(""),
            };
            Line::from(vec![Span::raw(format!("{} ({}): {:.0} {}", i.label, i.year, i.value, i.unit)), change])
        })
        .collect();
    let summary = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("주요 지표"))
        .wrap(Wrap { trim: true });
    f.render_widget(summary, left[0]);

    let label = home.indicators.first().map(|i| i.label).unwrap_or("농가수");
    let points = indicators::series(&catalog.indicators, label);
    let trend_block = Block::default().borders(Borders::ALL).title(format!("{label} 추이"));
    match chart::line_bounds(&points) {
        Some((x, y)) => {
            let dataset = Dataset::default()
                .name(label)
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Cyan))
                .data(&points);
            let trend = Chart::new(vec![dataset])
                .block(trend_block)
                .x_axis(Axis::default().bounds(x).labels(vec![format!("{:.0}", x[0]), format!("{:.0}", x[1])]))
                .y_axis(Axis::default().bounds(y).labels(vec![format!("{:.0}", y[0]), format!("{:.0}", y[1])]));
            f.render_widget(trend, left[1]);
        }
        None => f.render_widget(Paragraph::new("지표 데이터가 없습니다").block(trend_block), left[1]),
    }

    let featured = match home.featured {
        Some(r) => format!("{}\n{} · {}\n{}\n\nEnter 열기 · f 다른 보고서", r.title, r.category, r.date, r.description),
        None => "보고서가 없습니다".to_string(),
    };
    let featured = Paragraph::new(featured)
        .block(Block::default().borders(Borders::ALL).title("추천 보고서"))
        .wrap(Wrap { trim: true });
    f.render_widget(featured, left[2]);

    draw_pyramid(f, cols[1], catalog, home);
}

fn draw_pyramid(f: &mut Frame, area: Rect, catalog: &DataCatalog, home: &HomePage) {
    let Some(year) = home.current_year(catalog) else {
        let empty = Paragraph::new("인구 데이터가 없습니다")
            .block(Block::default().borders(Borders::ALL).title("농가 인구 구조"));
        f.render_widget(empty, area);
        return;
    };
    let state = if home.player.is_playing() { "재생 중" } else { "정지" };
    let outer = Block::default().borders(Borders::ALL).title(format!(
        "농가 인구 구조 {}년 · 65세 이상 {:.1}% · {} (Space 재생, ←→ 이동)",
        year.year,
        year.elderly_share(),
        state
    ));
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);
    let male: Vec<(&str, u64)> = year.cohorts.iter().rev().map(|c| (c.age.as_str(), c.male as u64)).collect();
    let female: Vec<(&str, u64)> = year.cohorts.iter().rev().map(|c| (c.age.as_str(), c.female as u64)).collect();
    let max = year.widest() as u64;
    for (data, title, color, rect) in [(&male, "남", Color::Blue, halves[0]), (&female, "여", Color::Magenta, halves[1])] {
        let bars = BarChart::default()
            .block(Block::default().title(title))
            .direction(Direction::Horizontal)
            .bar_width(1)
            .bar_gap(0)
            .max(max.max(1))
            .bar_style(Style::default().fg(color))
            .data(data.as_slice());
        f.render_widget(bars, rect);
    }
}

fn draw_reports(f: &mut Frame, area: Rect, page: &ReportsPage) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let cursor = if page.editing { "▏" } else { "" };
    let search = Paragraph::new(format!(
        "검색: {}{}   분류: {}   (/ 검색 · c 분류 · Enter 열기)",
        page.query,
        cursor,
        page.category.as_deref().unwrap_or("전체")
    ))
    .block(Block::default().borders(Borders::ALL).title("보고서"));
    f.render_widget(search, rows[0]);

    let results = page.results();
    let items: Vec<ListItem> = results
        .iter()
        .map(|r| ListItem::new(format!("[{}] {} · {}", r.category, r.title, r.date)))
        .collect();
    let mut list_state = ListState::default();
    if !results.is_empty() {
        list_state.select(Some(page.selected));
    }
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!("{}건", results.len())))
        .highlight_symbol(">> ")
        .highlight_style(Style::default().fg(Color::Red));
    f.render_stateful_widget(list, rows[1], &mut list_state);
}

fn draw_detail(f: &mut Frame, area: Rect, entry: &ReportEntry) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Length(12), Constraint::Min(3)])
        .split(area);

    let head = Paragraph::new(format!("{} · {}\n{}", entry.category, entry.date, entry.description))
        .block(Block::default().borders(Borders::ALL).title(entry.title))
        .wrap(Wrap { trim: true });
    f.render_widget(head, rows[0]);

    let series: Vec<(String, f64)> = entry.chart.bars.iter().map(|&(l, v)| (l.to_string(), v)).collect();
    let data = chart::bar_data(&series);
    let bars = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(format!("{} ({})", entry.chart.title, entry.chart.unit)))
        .bar_width(7)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Green))
        .value_style(Style::default().fg(Color::Black).bg(Color::Green))
        .data(data.as_slice());
    f.render_widget(bars, rows[1]);

    let body = Paragraph::new(entry.body.join("\n\n"))
        .block(Block::default().borders(Borders::ALL).title("본문 (Esc 뒤로)"))
        .wrap(Wrap { trim: true });
    f.render_widget(body, rows[2]);
}

fn draw_gis_index(f: &mut Frame, area: Rect, selected: usize) {
    let items: Vec<ListItem> = Theme::ALL
        .iter()
        .map(|t| ListItem::new(Line::from(vec![
            Span::styled("■ ", Style::default().fg(t.color())),
            Span::raw(format!("{}  /gis/{}", t.title(), t.slug())),
        ])))
        .collect();
    let mut list_state = ListState::default();
    list_state.select(Some(selected));
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("주제도 선택"))
        .highlight_symbol(">> ")
        .highlight_style(Style::default().fg(Color::Red));
    f.render_stateful_widget(list, area, &mut list_state);
}

fn draw_gis(f: &mut Frame, area: Rect, catalog: &DataCatalog, page: &GisPage) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(area);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(28), Constraint::Percentage(47), Constraint::Percentage(25)])
        .split(rows[0]);

    draw_filter_panel(f, cols[0], catalog, page);

    let theme = page.theme;
    let highlight = page.highlighted(catalog);
    MapView::new(&page.layers, &highlight).render(f, cols[1], theme.title(), theme.color());

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(4)])
        .split(cols[2]);
    let data = chart::bar_data(&page.chart);
    let bars = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(format!("{} 기준 ({})", page.chart_group(), theme.unit())))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .bar_style(Style::default().fg(theme.color()))
        .data(data.as_slice());
    f.render_widget(bars, right[0]);

    let range = page.layers.get_layer(&theme.data_layer()).and_then(|l| l.value_range());
    let legend = match range {
        Some((lo, hi)) => format!("{} {}\n{lo:.1} ~ {hi:.1} {}", theme.value_property(), "■".repeat(5), theme.unit()),
        None => "데이터 없음".to_string(),
    };
    let legend = Paragraph::new(legend).block(Block::default().borders(Borders::ALL).title("범례"));
    f.render_widget(legend, right[1]);

    let status = match &page.command {
        Some(cmd) => Line::from(vec![Span::styled(":", Style::default().fg(Color::Yellow)), Span::raw(cmd.clone())]),
        None if page.loading => Line::from(Span::styled("불러오는 중…", Style::default().fg(Color::Yellow))),
        None => Line::from(page.status.clone()),
    };
    f.render_widget(Paragraph::new(status), rows[1]);
}

fn draw_filter_panel(f: &mut Frame, area: Rect, catalog: &DataCatalog, page: &GisPage) {
    let focused = page.focused();
    let mut lines = Vec::new();
    for &row in &page.rows {
        let mark = if page.is_active(row) { "[x]" } else { "[ ]" };
        let style = if row == focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(format!("{mark} {}: {}", row.label(), page.value_text(row)), style)));
        if row != focused {
            continue;
        }
        let cursor = page.cursor(row);
        for (i, option) in page.options(catalog, row).iter().enumerate() {
            let pointer = if i == cursor { ">" } else { " " };
            let chosen = if page.is_selected(row, option) { "●" } else { "○" };
            let style = if i == cursor { Style::default().fg(Color::Red) } else { Style::default() };
            lines.push(Line::from(Span::styled(format!("  {pointer} {chosen} {option}"), style)));
        }
    }
    let panel = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("필터 (t 켜기/끄기 · r 초기화 · : 명령)"));
    f.render_widget(panel, area);
}
