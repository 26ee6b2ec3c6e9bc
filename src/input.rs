//! Byte-stream input: line splitting and lossless text decoding.
//!
//! Diff output is read as raw bytes and decoded per line, UTF-8 first with
//! a latin-1 fallback. Latin-1 maps every byte to a scalar value, so every
//! input line decodes to something renderable.

use std::io::BufRead;

/// Decode one line of diff output.
pub fn decode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

/// Iterator over decoded lines, terminators included.
///
/// Stops at end of input or the first read error; a trailing line without
/// a newline is still yielded.
pub struct Lines<R> {
    reader: R,
}

pub fn lines<R: BufRead>(reader: R) -> Lines<R> {
    Lines { reader }
}

impl<R: BufRead> Iterator for Lines<R> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(decode(&buf)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_utf8() {
        assert_eq!(decode("héllo\n".as_bytes()), "héllo\n");
    }

    #[test]
    fn falls_back_to_latin1() {
        // 0xe9 is 'é' in latin-1 but an invalid UTF-8 sequence here
        assert_eq!(decode(b"caf\xe9\n"), "café\n");
    }

    #[test]
    fn splits_lines_keeping_terminators() {
        let input: &[u8] = b"one\ntwo\nthree";
        let got: Vec<String> = lines(input).collect();
        assert_eq!(got, vec!["one\n", "two\n", "three"]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        let input: &[u8] = b"";
        assert_eq!(lines(input).count(), 0);
    }

    #[test]
    fn mixed_encodings_decode_per_line() {
        let input: &[u8] = b"-caf\xe9\n+caf\xc3\xa9\n";
        let got: Vec<String> = lines(input).collect();
        assert_eq!(got, vec!["-café\n", "+café\n"]);
    }
}
