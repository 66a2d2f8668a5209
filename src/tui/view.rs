use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};

use super::grid::draw_step_grid;
use crate::shared::{DOWNBEAT_BRIGHTNESS, DisplayState, MAX_DATA};

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState, blink_on: bool) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // lcd screen
            Constraint::Length(3), // knobs row
            Constraint::Min(12),   // step grid
            Constraint::Length(1), // key help
        ])
        .split(area);

    draw_screen(frame, sections[0], state);
    draw_knobs(frame, sections[1], state);
    draw_step_grid(frame, sections[2], &state.leds, blink_on);
    draw_help(frame, sections[3]);
}

// what mode/pattern/track we're editing, and transport
pub fn screen_lines(state: &DisplayState) -> Vec<Line<'static>> {
    let transport = if state.playing { "PLAY" } else { "STOP" };
    let step = state.playing_step.map_or_else(|| "--".to_string(), |s| format!("{:02}", s + 1));
    vec![
        Line::from(vec![
            Span::styled(
                format!("M{:02} {}", state.edit_mode, state.display_text),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  P{:02}  T{}", state.edit_pattern + 1, state.edit_track + 1)),
        ]),
        Line::from(format!("{transport}  step {step}  seq {:02}", state.sequence_position)),
        Line::from(format!("{:.1} BPM  queued {}", state.bpm, state.pending_messages)),
    ]
}

fn draw_screen(frame: &mut Frame, area: Rect, state: &DisplayState) {
    // the frame flashes on the downbeat
    let border = if state.playing && state.beat_brightness == DOWNBEAT_BRIGHTNESS {
        Color::White
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(" gruvtty ");
    frame.render_widget(Paragraph::new(screen_lines(state)).block(block), area);
}

fn draw_knobs(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50); 2])
        .split(area);

    for (half, label, value) in [
        (halves[0], state.knob_a_label, state.knob_a_value),
        (halves[1], state.knob_b_label, state.knob_b_value),
    ] {
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(label))
            .gauge_style(Style::default().fg(Color::Magenta))
            .ratio(f64::from(value) / f64::from(MAX_DATA))
            .label(value.to_string());
        frame.render_widget(gauge, half);
    }
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let help = "space play  tab page  [ ] knob A  - = knob B  0 clear  esc quit";
    frame.render_widget(Paragraph::new(help).style(Style::default().fg(Color::DarkGray)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_shows_position() {
        let state = DisplayState {
            playing: true,
            playing_step: Some(3),
            edit_mode: 2,
            display_text: "AcidBass",
            edit_pattern: 4,
            edit_track: 1,
            sequence_position: 7,
            ..DisplayState::default()
        };
        let text: Vec<String> = screen_lines(&state).iter().map(|l| l.to_string()).collect();
        assert_eq!(text[0], "M02 AcidBass  P05  T2");
        assert_eq!(text[1], "PLAY  step 04  seq 07");
        assert_eq!(text[2], "120.0 BPM  queued 0");
    }
}
