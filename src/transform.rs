use crate::config::ClientConfig;

/// Newline handling applied to typed bytes before they are sent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputTransform {
    /// CR at the end of a chunk becomes CR LF
    pub send_crlf_at_newline: bool,
    /// Second, independent switch for the same expansion; never set from the CLI
    pub send_cr_after_lf: bool,
}

/// What the transform noticed about a chunk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkShape {
    /// First byte was LF
    pub starts_with_lf: bool,
    /// First byte was CR
    pub starts_with_cr: bool,
    /// Bytes appended by the transform (0 or 1)
    pub appended: usize,
}

impl OutputTransform {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            send_crlf_at_newline: config.send_crlf_at_newline,
            send_cr_after_lf: config.send_cr_after_lf,
        }
    }

    /// Rewrite `chunk` in place
    ///
    /// Existing bytes are never reordered; at most one LF is appended.
    pub fn apply(&self, chunk: &mut Vec<u8>) -> ChunkShape {
        let mut shape = ChunkShape {
            starts_with_lf: chunk.first() == Some(&b'\n'),
            starts_with_cr: chunk.first() == Some(&b'\r'),
            appended: 0,
        };

        if (self.send_crlf_at_newline || self.send_cr_after_lf) && chunk.last() == Some(&b'\r') {
            chunk.push(b'\n');
            shape.appended = 1;
        }

        shape
    }
}
