//! Segment counting for single and concatenated SMS.

/// Characters accepted as GSM 7-bit.
const GSM7_ALPHABET: &str = "\\@£$¥èéùìòÇ\nØø\rÅåΔ_ΦΓΛΩΠΨΣΘΞÆæßÉ !\"#¤%&'()*+,-./0123456789:;<=>?¡ABCDEFGHIJKLMNOPQRSTUVWXYZÄÖÑÜ§¿abcdefghijklmnopqrstuvwxyzäöñüà^{}[~]|€";

/// Character encoding a message is sent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Gsm7,
    Ucs2,
}

impl Encoding {
    /// Pick the encoding for `text`.
    pub fn detect(text: &str) -> Self {
        if is_gsm7(text) {
            Encoding::Gsm7
        } else {
            Encoding::Ucs2
        }
    }

    /// Characters that fit in a single, non-concatenated message.
    pub fn single_capacity(self) -> usize {
        match self {
            Encoding::Gsm7 => 160,
            Encoding::Ucs2 => 70,
        }
    }

    /// Characters per part once the user data header is present.
    pub fn concat_capacity(self) -> usize {
        match self {
            Encoding::Gsm7 => 153,
            Encoding::Ucs2 => 67,
        }
    }
}

/// Returns true when every character of `text` is in the GSM 7-bit alphabet.
pub fn is_gsm7(text: &str) -> bool {
    text.chars().all(|c| GSM7_ALPHABET.contains(c))
}

/// Number of segments needed to send `text`.
///
/// Returns 0 for empty text and for text that needs more than
/// `max_segments` parts; callers treat 0 as a rejected message.
pub fn count_segments(text: &str, max_segments: usize) -> usize {
    let len = text.chars().count();
    if len == 0 {
        return 0;
    }

    let encoding = Encoding::detect(text);
    let segments = if len <= encoding.single_capacity() {
        1
    } else {
        len.div_ceil(encoding.concat_capacity())
    };

    if segments > max_segments {
        0
    } else {
        segments
    }
}
