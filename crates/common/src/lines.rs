//! Line tables for translating byte offsets into line/column pairs.
//!
//! A [`LineTable`] records the byte offset of every line start in a piece of
//! text. Lookups walk the table, not the text, so repeated queries against a
//! large input stay cheap. LF, CR, and CR+LF each terminate a line exactly
//! once.

use std::collections::BTreeMap;

/// Maps line-start byte offsets to 1-based line numbers.
#[derive(Debug, Clone)]
pub struct LineTable {
    starts: BTreeMap<usize, u32>,
}

impl LineTable {
    /// Scan `text` and record every line start.
    pub fn new(text: &str) -> Self {
        let mut starts = BTreeMap::new();
        starts.insert(0, 1);

        let bytes = text.as_bytes();
        let mut line = 1u32;
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\r' => {
                    line += 1;
                    if bytes.get(i + 1) == Some(&b'\n') {
                        i += 1;
                    }
                    starts.insert(i + 1, line);
                }
                b'\n' => {
                    line += 1;
                    starts.insert(i + 1, line);
                }
                _ => {}
            }
            i += 1;
        }

        Self { starts }
    }

    /// Translate a byte offset into a `(line, column)` pair, both 1-based.
    ///
    /// Columns count bytes from the line start. Offsets past the end of the
    /// text resolve within the last line.
    pub fn line_col(&self, pos: usize) -> (u32, u32) {
        let (start, line) = self
            .starts
            .range(..=pos)
            .next_back()
            .map(|(&s, &l)| (s, l))
            .unwrap_or((0, 1));
        (line, (pos - start + 1) as u32)
    }
}
