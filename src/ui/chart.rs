use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Widget},
};

use crate::indicator::IndicatorSnapshot;
use crate::model::candle::Candle;

pub struct CandleChart<'a> {
    candles: &'a [Candle],
    vwap: &'a [Option<f64>],
    levels: Option<&'a IndicatorSnapshot>,
    title: String,
}

impl<'a> CandleChart<'a> {
    pub fn new(candles: &'a [Candle], symbol: &str, timeframe: &str) -> Self {
        Self {
            candles,
            vwap: &[],
            levels: None,
            title: format!(" {} | {} ", symbol, timeframe),
        }
    }

    pub fn vwap(mut self, series: &'a [Option<f64>]) -> Self {
        self.vwap = series;
        self
    }

    pub fn levels(mut self, levels: Option<&'a IndicatorSnapshot>) -> Self {
        self.levels = levels;
        self
    }
}

/// Maps prices onto chart rows, top row = `max`.
struct PriceScale {
    min: f64,
    range: f64,
    top: u16,
    height: u16,
}

impl PriceScale {
    fn row(&self, price: f64) -> Option<u16> {
        if !price.is_finite() {
            return None;
        }
        let rows = (self.height - 1) as f64;
        let normalized = ((price - self.min) / self.range).clamp(0.0, 1.0);
        let offset = rows - (normalized * rows).round();
        Some(self.top + offset as u16)
    }
}

fn level_lines(indicators: &IndicatorSnapshot) -> [(&'static str, f64, Color); 5] {
    let levels = indicators.levels();
    [
        ("R2", levels.resistance2, Color::Red),
        ("R1", levels.resistance1, Color::LightRed),
        ("P", levels.pivot, Color::White),
        ("S1", levels.support1, Color::LightGreen),
        ("S2", levels.support2, Color::Green),
    ]
}

impl Widget for CandleChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title.as_str())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 3 || inner.width < 12 {
            return;
        }
        if self.candles.is_empty() {
            buf.set_string(
                inner.x + 1,
                inner.y,
                "waiting for ticks...",
                Style::default().fg(Color::DarkGray),
            );
            return;
        }

        // Right margin holds level labels.
        let label_width: u16 = 12;
        let plot_width = inner.width.saturating_sub(label_width).max(1) as usize;
        let start = self.candles.len().saturating_sub(plot_width);
        let visible = &self.candles[start..];
        let visible_vwap = self.vwap.get(start..).unwrap_or(&[]);

        let mut min_price = visible.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
        let mut max_price = visible
            .iter()
            .map(|c| c.high)
            .fold(f64::NEG_INFINITY, f64::max);
        if let Some(levels) = self.levels {
            for (_, price, _) in level_lines(levels) {
                min_price = min_price.min(price);
                max_price = max_price.max(price);
            }
        }
        let range = max_price - min_price;
        let scale = PriceScale {
            min: min_price,
            range: if range < 1e-9 { 1.0 } else { range },
            top: inner.y,
            height: inner.height,
        };

        let plot_right = inner.x + plot_width as u16;

        if let Some(levels) = self.levels {
            for (label, price, color) in level_lines(levels) {
                if let Some(y) = scale.row(price) {
                    for x in inner.x..plot_right {
                        buf.set_string(x, y, "╌", Style::default().fg(color));
                    }
                    buf.set_string(
                        plot_right,
                        y,
                        format!("{:<2} {:.2}", label, price),
                        Style::default().fg(color),
                    );
                }
            }
        }

        for (i, candle) in visible.iter().enumerate() {
            let x = inner.x + i as u16;
            let color = if candle.is_bullish() {
                Color::Green
            } else {
                Color::Red
            };
            let style = Style::default().fg(color);
            let (Some(y_high), Some(y_low)) = (scale.row(candle.high), scale.row(candle.low))
            else {
                continue;
            };
            let (Some(y_open), Some(y_close)) = (scale.row(candle.open), scale.row(candle.close))
            else {
                continue;
            };
            let body_top = y_open.min(y_close);
            let body_bottom = y_open.max(y_close);
            for y in y_high..=y_low {
                let glyph = if y >= body_top && y <= body_bottom {
                    "█"
                } else {
                    "│"
                };
                buf.set_string(x, y, glyph, style);
            }
        }

        for (i, value) in visible_vwap.iter().enumerate() {
            if let Some(y) = value.and_then(|v| scale.row(v)) {
                buf.set_string(inner.x + i as u16, y, "•", Style::default().fg(Color::Magenta));
            }
        }
    }
}
