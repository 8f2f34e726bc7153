//! Helpers for turning raw input bytes into text records.
//!

use std::borrow::Cow;

use bytes::Bytes;

/// Decode a record as UTF-8, replacing invalid sequences with U+FFFD.
pub fn string_from_bytes(buf: &[u8]) -> Cow<'_, str> {
    let (text, _had_errors) = encoding_rs::UTF_8.decode_without_bom_handling(buf);
    text
}

/// Drop a leading UTF-8 byte order mark from a file's contents.
///
/// Only the start of a file can carry one, so this runs once per file
/// before the buffer is cut into records.
pub fn strip_bom(buf: Bytes) -> Bytes {
    match encoding_rs::Encoding::for_bom(&buf) {
        Some((encoding, bom_len)) if encoding == encoding_rs::UTF_8 => buf.slice(bom_len..),
        _ => buf,
    }
}

/// Iterator over the line records of a buffer.
///
/// Records end at `\n`; a trailing `\r` is stripped. A final line without
/// a terminator is still a record, an empty buffer has none.
#[derive(Debug, Clone)]
pub struct Records {
    rest: Bytes,
}

/// Iterate over the line records of `buf`.
///
/// Records share the buffer, so this is cheap.
#[inline]
pub fn records(buf: Bytes) -> Records {
    Records { rest: buf }
}

impl Iterator for Records {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        if self.rest.is_empty() {
            return None;
        }
        let mut line = match self.rest.iter().position(|&b| b == b'\n') {
            Some(pos) => self.rest.split_to(pos + 1).slice(..pos),
            None => std::mem::take(&mut self.rest),
        };
        if line.last() == Some(&b'\r') {
            line.truncate(line.len() - 1);
        }
        Some(line)
    }
}

/// Cut `buf` into chunks of at most `max_records` line records each.
///
/// Chunks always end on a record boundary. An empty buffer yields no chunks.
pub fn chunk_records(mut buf: Bytes, max_records: usize) -> Vec<Bytes> {
    let max_records = max_records.max(1);
    let mut chunks = Vec::new();
    while !buf.is_empty() {
        let boundary = buf
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b == b'\n')
            .nth(max_records - 1)
            .map(|(pos, _)| pos + 1);
        match boundary {
            Some(end) => chunks.push(buf.split_to(end)),
            None => chunks.push(std::mem::take(&mut buf)),
        }
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(input: &'static str) -> Vec<String> {
        records(Bytes::from(input))
            .map(|r| string_from_bytes(&r).into_owned())
            .collect()
    }

    #[test]
    fn splits_lines() {
        assert_eq!(vec!["a b", "c"], lines("a b\nc\n"));
        assert_eq!(vec!["a b", "c"], lines("a b\nc"));
        assert_eq!(vec!["a", "", "b"], lines("a\n\nb"));
        assert!(lines("").is_empty());
    }

    #[test]
    fn strips_carriage_returns() {
        assert_eq!(vec!["dos", "line"], lines("dos\r\nline\r\n"));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let text = string_from_bytes(b"caf\xff");
        assert_eq!("caf\u{FFFD}", text);
    }

    #[test]
    fn leading_bom_is_dropped() {
        assert_eq!(Bytes::from("the cat\n"), strip_bom(Bytes::from("\u{FEFF}the cat\n")));
        assert_eq!(Bytes::from("the cat\n"), strip_bom(Bytes::from("the cat\n")));
        assert_eq!(Bytes::new(), strip_bom(Bytes::from("\u{FEFF}")));
        // Only the leading mark is removed.
        assert_eq!(
            Bytes::from("a\u{FEFF}b"),
            strip_bom(Bytes::from("a\u{FEFF}b"))
        );
    }

    #[test]
    fn chunks_end_on_record_boundaries() {
        let chunks = chunk_records(Bytes::from("1\n2\n3\n4\n5"), 2);
        assert_eq!(
            vec![
                Bytes::from("1\n2\n"),
                Bytes::from("3\n4\n"),
                Bytes::from("5")
            ],
            chunks
        );

        let total: usize = chunks.into_iter().map(|c| records(c).count()).sum();
        assert_eq!(5, total);
    }

    #[test]
    fn chunking_empty_buffer() {
        assert!(chunk_records(Bytes::new(), 3).is_empty());
        assert_eq!(1, chunk_records(Bytes::from("a\nb\n"), 10).len());
    }
}
