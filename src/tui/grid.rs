use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::shared::{LedState, STEPS_PER_TRACK};

const COLS: usize = 4;
const ROWS: usize = 4;

pub const PAD_LABELS: [&str; STEPS_PER_TRACK] = [
    "1", "2", "3", "4",
    "Q", "W", "E", "R",
    "A", "S", "D", "F",
    "Z", "X", "C", "V",
];

// blink shows as high when the blink phase is on, medium otherwise
pub fn led_style(led: LedState, blink_on: bool) -> Style {
    let lit = match led {
        LedState::Blink if blink_on => LedState::OnHigh,
        LedState::Blink => LedState::OnMedium,
        other => other,
    };
    match lit {
        LedState::OnHigh => Style::default().fg(Color::Black).bg(Color::LightYellow).add_modifier(Modifier::BOLD),
        LedState::OnMedium => Style::default().fg(Color::LightMagenta).bg(Color::Magenta),
        _ => Style::default().fg(Color::DarkGray),
    }
}

pub fn draw_step_grid(frame: &mut Frame, area: Rect, leds: &[LedState; STEPS_PER_TRACK], blink_on: bool) {
    let row_constraints = [Constraint::Percentage(25); ROWS];
    let col_constraints = [Constraint::Percentage(25); COLS];

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(row_constraints)
        .split(area);

    for (row_idx, row_area) in rows.iter().enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(col_constraints)
            .split(*row_area);

        for (col_idx, cell_area) in cols.iter().enumerate() {
            let step = row_idx * COLS + col_idx;
            let style = led_style(leds[step], blink_on);
            let block = Block::default().borders(Borders::ALL).border_style(style).style(style);
            let label = Paragraph::new(PAD_LABELS[step]).alignment(Alignment::Center).block(block);
            frame.render_widget(label, *cell_area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blink_alternates() {
        assert_eq!(led_style(LedState::Blink, true), led_style(LedState::OnHigh, false));
        assert_eq!(led_style(LedState::Blink, false), led_style(LedState::OnMedium, false));
        assert_eq!(led_style(LedState::Off, true), Style::default().fg(Color::DarkGray));
    }
}
