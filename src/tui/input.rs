use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use crate::shared::InputEvent;

// poll the terminal for one key and turn it into input events. grid keys send
// down on press and up on release (release only shows up when the terminal
// reports event types); everything else acts on press.
pub fn poll_input(timeout: Duration) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(key.code, key.kind).into_iter().collect());
    }
    Ok(vec![])
}

fn handle_key(code: KeyCode, kind: KeyEventKind) -> Option<InputEvent> {
    if let KeyCode::Char(c) = code {
        if let Some(n) = char_to_pad(c) {
            return match kind {
                KeyEventKind::Press => Some(InputEvent::GridDown(n)),
                KeyEventKind::Release => Some(InputEvent::GridUp(n)),
                KeyEventKind::Repeat => None,
            };
        }
    }
    if kind != KeyEventKind::Press {
        return None;
    }

    match code {
        KeyCode::Esc => Some(InputEvent::Quit),
        KeyCode::Char(' ') => Some(InputEvent::PlayPress),
        KeyCode::Tab => Some(InputEvent::NextPage),
        KeyCode::Char('0') => Some(InputEvent::ClearTrack),

        // two knobs, what they drive depends on the page
        KeyCode::Char('[') => Some(InputEvent::KnobTurnA(-1)),
        KeyCode::Char(']') => Some(InputEvent::KnobTurnA(1)),
        KeyCode::Char('{') => Some(InputEvent::KnobTurnA(-4)),
        KeyCode::Char('}') => Some(InputEvent::KnobTurnA(4)),
        KeyCode::Char('-') => Some(InputEvent::KnobTurnB(-1)),
        KeyCode::Char('=') => Some(InputEvent::KnobTurnB(1)),
        KeyCode::Char('_') => Some(InputEvent::KnobTurnB(-4)),
        KeyCode::Char('+') => Some(InputEvent::KnobTurnB(4)),

        _ => None,
    }
}

// convert char to step button index, same 4x4 as on screen
fn char_to_pad(c: char) -> Option<u8> {
    let idx = match c {
        '1' => 0, '2' => 1, '3' => 2, '4' => 3,
        'q' => 4, 'w' => 5, 'e' => 6, 'r' => 7,
        'a' => 8, 's' => 9, 'd' => 10, 'f' => 11,
        'z' => 12, 'x' => 13, 'c' => 14, 'v' => 15,
        _ => return None,
    };
    Some(idx)
}
