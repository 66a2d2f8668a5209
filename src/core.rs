// Bridge from the sequencer's transport boundary to the synth thread. The
// sequencer fires messages on the UI thread; they cross to the audio callback
// as AudioCommands over a bounded channel.

use crossbeam_channel::{Sender, TrySendError};

use crate::audio_api::AudioCommand;
use crate::sequencer::Transport;

/// Transport that forwards to the audio thread. A full queue drops the
/// command, same as a full scheduler does.
pub struct ChannelTransport {
    tx: Sender<AudioCommand>,
    dropped: usize,
}

impl ChannelTransport {
    pub fn new(tx: Sender<AudioCommand>) -> Self {
        Self { tx, dropped: 0 }
    }

    pub fn send(&mut self, cmd: AudioCommand) {
        match self.tx.try_send(cmd) {
            Ok(()) => {}
            Err(TrySendError::Full(cmd)) => {
                self.dropped += 1;
                tracing::debug!(?cmd, "audio queue full, command dropped");
            }
            // audio thread is gone; nothing left to play to
            Err(TrySendError::Disconnected(_)) => self.dropped += 1,
        }
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl Transport for ChannelTransport {
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        self.send(AudioCommand::NoteOn { channel, note, velocity });
    }

    fn note_off(&mut self, channel: u8, note: u8) {
        self.send(AudioCommand::NoteOff { channel, note });
    }

    fn control_change(&mut self, channel: u8, control: u8, value: u8) {
        self.send(AudioCommand::Control { channel, control, value });
    }

    fn all_notes_off(&mut self, channel: u8) {
        self.send(AudioCommand::AllNotesOff { channel });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_forwards_and_counts_drops() {
        let (tx, rx) = crossbeam_channel::bounded(2);
        let mut transport = ChannelTransport::new(tx);
        transport.note_on(1, 60, 100);
        transport.control_change(1, 7, 90);
        transport.note_off(1, 60);
        assert_eq!(transport.dropped(), 1);
        assert_eq!(rx.try_recv().ok(), Some(AudioCommand::NoteOn { channel: 1, note: 60, velocity: 100 }));
        assert_eq!(rx.try_recv().ok(), Some(AudioCommand::Control { channel: 1, control: 7, value: 90 }));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn every_transport_call_keeps_its_channel() {
        let (tx, rx) = crossbeam_channel::bounded(8);
        let mut transport = ChannelTransport::new(tx);
        transport.note_on(2, 36, 100);
        transport.note_off(3, 40);
        transport.control_change(4, 10, 64);
        transport.all_notes_off(5);
        let sent: Vec<AudioCommand> = rx.try_iter().collect();
        assert_eq!(
            sent,
            vec![
                AudioCommand::NoteOn { channel: 2, note: 36, velocity: 100 },
                AudioCommand::NoteOff { channel: 3, note: 40 },
                AudioCommand::Control { channel: 4, control: 10, value: 64 },
                AudioCommand::AllNotesOff { channel: 5 },
            ]
        );
        let channels: Vec<u8> = sent.iter().map(AudioCommand::channel).collect();
        assert_eq!(channels, vec![2, 3, 4, 5]);
        assert_eq!(transport.dropped(), 0);
    }
}
