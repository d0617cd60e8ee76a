//! Pure decoding: inbound byte stream → sysex frames.
//!
//! No I/O, no side effects. Bytes arrive in arbitrary chunks from the serial
//! port, so the parser keeps the partial frame between calls.

use super::{END_SYSEX, START_SYSEX};

/// Frames longer than this are dropped as corrupt
pub const MAX_FRAME_LEN: usize = 256;

/// Incremental sysex framer.
///
/// Completed frames have the form `[command, data..., END_SYSEX]`: the start
/// marker is consumed, the end marker is kept so handlers see both ends of
/// the message.
#[derive(Debug, Default)]
pub struct SysexParser {
    frame: Option<Vec<u8>>,
}

impl SysexParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes and return every frame they complete.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Vec<u8>> {
        let mut frames = Vec::new();

        for &byte in bytes {
            match byte {
                START_SYSEX => {
                    if let Some(open) = &self.frame {
                        log::warn!("Sysex frame restarted after {} bytes", open.len());
                    }
                    self.frame = Some(Vec::new());
                }
                END_SYSEX => match self.frame.take() {
                    Some(frame) if frame.is_empty() => log::warn!("Empty sysex frame dropped"),
                    Some(mut frame) => {
                        frame.push(END_SYSEX);
                        frames.push(frame);
                    }
                    None => log::trace!("Stray END_SYSEX skipped"),
                },
                _ => {
                    let Some(open) = self.frame.as_mut() else {
                        // Non-sysex traffic (digital/analog reports, version) is not ours
                        log::trace!("Skipping non-sysex byte 0x{byte:02X}");
                        continue;
                    };
                    if open.len() < MAX_FRAME_LEN {
                        open.push(byte);
                    } else {
                        log::warn!("Sysex frame exceeded {MAX_FRAME_LEN} bytes, dropped");
                        self.frame = None;
                    }
                }
            }
        }

        frames
    }

    /// True while a frame has been started but not finished
    pub fn in_frame(&self) -> bool {
        self.frame.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_complete_frame() {
        let mut parser = SysexParser::new();
        let frames = parser.push(&[0xF0, 0x67, 2, 26, 34, 0xF7]);
        assert_eq!(frames, vec![vec![0x67, 2, 26, 34, 0xF7]]);
        assert!(!parser.in_frame());
    }

    #[test]
    fn frame_split_across_reads() {
        let mut parser = SysexParser::new();
        assert!(parser.push(&[0xF0, 0x67]).is_empty());
        assert!(parser.in_frame());
        assert!(parser.push(&[2, 26]).is_empty());
        let frames = parser.push(&[34, 0xF7]);
        assert_eq!(frames, vec![vec![0x67, 2, 26, 34, 0xF7]]);
    }

    #[test]
    fn two_frames_in_one_read() {
        let mut parser = SysexParser::new();
        let frames = parser.push(&[0xF0, 0x67, 2, 20, 40, 0xF7, 0xF0, 0x67, 3, 21, 41, 0xF7]);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1], vec![0x67, 3, 21, 41, 0xF7]);
    }

    #[test]
    fn non_sysex_bytes_between_frames_are_skipped() {
        let mut parser = SysexParser::new();
        // Analog report on channel 0 ahead of the reply
        let frames = parser.push(&[0xE0, 0x10, 0x01, 0xF0, 0x67, 4, 22, 50, 0xF7, 0x90]);
        assert_eq!(frames, vec![vec![0x67, 4, 22, 50, 0xF7]]);
    }

    #[test]
    fn restart_marker_discards_partial_frame() {
        let mut parser = SysexParser::new();
        let frames = parser.push(&[0xF0, 0x67, 2, 0xF0, 0x67, 5, 23, 45, 0xF7]);
        assert_eq!(frames, vec![vec![0x67, 5, 23, 45, 0xF7]]);
    }

    #[test]
    fn empty_frame_is_dropped() {
        let mut parser = SysexParser::new();
        assert!(parser.push(&[0xF0, 0xF7]).is_empty());
    }

    #[test]
    fn oversized_frame_is_dropped() {
        let mut parser = SysexParser::new();
        let mut bytes = vec![0xF0];
        bytes.extend(std::iter::repeat(0x01).take(MAX_FRAME_LEN + 1));
        bytes.push(0xF7);
        assert!(parser.push(&bytes).is_empty());
        assert!(!parser.in_frame());
    }
}
