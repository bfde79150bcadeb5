use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::indicator::IndicatorSnapshot;
use crate::tick_buffer::BufferStats;

use super::feed_health::FeedHealth;

pub struct LevelsPanel<'a> {
    indicators: Option<&'a IndicatorSnapshot>,
    candle_count: usize,
}

impl<'a> LevelsPanel<'a> {
    pub fn new(indicators: Option<&'a IndicatorSnapshot>, candle_count: usize) -> Self {
        Self {
            indicators,
            candle_count,
        }
    }
}

fn value_line(label: &'static str, value: Option<f64>, color: Color) -> Line<'static> {
    let text = match value {
        Some(v) => format!(" {:.2}", v),
        None => " --".to_string(),
    };
    Line::from(vec![
        Span::styled(label, Style::default().fg(Color::DarkGray)),
        Span::styled(text, Style::default().fg(color)),
    ])
}

impl Widget for LevelsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let ind = self.indicators;
        let lines = vec![
            value_line("Last: ", ind.map(|i| i.last_price), Color::Cyan),
            value_line("R2:   ", ind.map(|i| i.resistance2), Color::Red),
            value_line("R1:   ", ind.map(|i| i.resistance1), Color::LightRed),
            value_line("Pivot:", ind.map(|i| i.pivot), Color::White),
            value_line("S1:   ", ind.map(|i| i.support1), Color::LightGreen),
            value_line("S2:   ", ind.map(|i| i.support2), Color::Green),
            value_line("VWAP: ", ind.and_then(|i| i.vwap), Color::Magenta),
            Line::from(vec![
                Span::styled("Window:", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!(" {}", ind.map(|i| i.window_len).unwrap_or(0)),
                    Style::default().fg(Color::White),
                ),
            ]),
            Line::from(vec![
                Span::styled("Candles:", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!(" {}", self.candle_count),
                    Style::default().fg(Color::White),
                ),
            ]),
        ];

        let block = Block::default()
            .title(" Levels ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

pub struct LogPanel<'a> {
    messages: &'a [String],
}

impl<'a> LogPanel<'a> {
    pub fn new(messages: &'a [String]) -> Self {
        Self { messages }
    }
}

impl Widget for LogPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Log ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let rows = block.inner(area).height as usize;
        let start = self.messages.len().saturating_sub(rows);
        let lines: Vec<Line> = self.messages[start..]
            .iter()
            .map(|m| {
                let color = if m.starts_with("[ERR]") {
                    Color::Red
                } else if m.starts_with("[WARN]") {
                    Color::Yellow
                } else {
                    Color::Gray
                };
                Line::from(Span::styled(m.as_str(), Style::default().fg(color)))
            })
            .collect();
        Paragraph::new(lines).block(block).render(area, buf);
    }
}

pub struct StatusBar<'a> {
    pub symbol: &'a str,
    pub ws_connected: bool,
    pub paused: bool,
    pub health: FeedHealth,
    pub stats: &'a BufferStats,
    pub timeframe: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let conn_status = if self.ws_connected {
            Span::styled("CONNECTED", Style::default().fg(Color::Green))
        } else {
            Span::styled("DISCONNECTED", Style::default().fg(Color::Red))
        };

        let pause_status = if self.paused {
            Span::styled(" PAUSED ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        } else {
            Span::styled(" LIVE ", Style::default().fg(Color::Green))
        };

        let health_color = match self.health {
            FeedHealth::Ok => Color::Green,
            FeedHealth::Warn => Color::Yellow,
            FeedHealth::Crit => Color::Red,
        };

        let line = Line::from(vec![
            Span::styled(
                " ticker-chart ",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("| ", Style::default().fg(Color::DarkGray)),
            Span::styled(self.symbol, Style::default().fg(Color::Cyan)),
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            conn_status,
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("feed {}", self.health.label()),
                Style::default().fg(health_color),
            ),
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            pause_status,
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            Span::styled(self.timeframe, Style::default().fg(Color::White)),
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!(
                    "ticks: {}/{}  rejected: {}  evicted: {}",
                    self.stats.len, self.stats.capacity, self.stats.rejected, self.stats.evicted
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}

pub struct KeybindBar;

impl Widget for KeybindBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(vec![
            Span::styled(" [Q]", Style::default().fg(Color::Yellow)),
            Span::styled("uit  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[P]", Style::default().fg(Color::Yellow)),
            Span::styled("ause  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[R]", Style::default().fg(Color::Yellow)),
            Span::styled("esume  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[Tab]", Style::default().fg(Color::Yellow)),
            Span::styled(" symbol  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[1/2/3]", Style::default().fg(Color::Yellow)),
            Span::styled(" 15s/1m/5m  ", Style::default().fg(Color::DarkGray)),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}
