//! Append-only scoring ledger.
//!
//! The ledger is a CSV file with the header `clip,median_dist,is_synced,offset`
//! and one row per scored clip. Rows are only ever appended, and every append
//! is flushed to disk before it returns, so the file doubles as the resume
//! point of the scoring stage: a clip whose row is present is never scored
//! again.
//!
//! A crash can leave at most one unterminated row at the end of the file.
//! [`Ledger::open`] cuts it off; that clip is simply scored again. The ledger
//! assumes a single writer.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};

/// Header row of every ledger file.
pub const LEDGER_HEADER: &str = "clip,median_dist,is_synced,offset";

/// One scored clip.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub clip_id: String,
    pub median_distance: f64,
    pub is_synced: bool,
    pub offset: i64,
}

impl LedgerEntry {
    /// CSV row for this entry, newline included.
    #[must_use]
    pub fn to_row(&self) -> String {
        format!(
            "{},{:.3},{},{}\n",
            escape_field(&self.clip_id),
            self.median_distance,
            u8::from(self.is_synced),
            self.offset
        )
    }
}

/// An open ledger file and the set of clips it already records.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    file: File,
    recorded: HashSet<String>,
}

impl Ledger {
    /// Opens or creates the ledger at `path`, recovering from an interrupted write.
    pub fn open(path: &Path) -> CoreResult<Self> {
        let ledger_error = |message: String| CoreError::Ledger {
            path: path.to_path_buf(),
            message,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| ledger_error(format!("creating {}: {e}", parent.display())))?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)
            .map_err(|e| ledger_error(format!("opening: {e}")))?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| ledger_error(format!("reading: {e}")))?;

        if !bytes.is_empty() && !bytes.ends_with(b"\n") {
            let keep = bytes.iter().rposition(|b| *b == b'\n').map_or(0, |i| i + 1);
            log::warn!(
                "Ledger {} ends with an incomplete row; discarding {} byte(s)",
                path.display(),
                bytes.len() - keep
            );
            file.set_len(keep as u64)
                .map_err(|e| ledger_error(format!("truncating incomplete row: {e}")))?;
            bytes.truncate(keep);
        }

        let text = String::from_utf8_lossy(&bytes);
        let recorded = parse_recorded(&text, path)?;

        let mut ledger = Self {
            path: path.to_path_buf(),
            file,
            recorded,
        };

        if bytes.is_empty() {
            ledger.write_durably(&format!("{LEDGER_HEADER}\n"))?;
        }

        log::debug!(
            "Opened ledger {} with {} recorded clip(s)",
            path.display(),
            ledger.recorded.len()
        );
        Ok(ledger)
    }

    /// Whether `clip_id` already has a row.
    #[must_use]
    pub fn contains(&self, clip_id: &str) -> bool {
        self.recorded.contains(clip_id)
    }

    /// Number of recorded clips.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recorded.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recorded.is_empty()
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `entry` and syncs it to disk before returning.
    ///
    /// Fails without writing if the clip is already recorded, or if its id
    /// contains a line break and so could not be read back as one row.
    pub fn append(&mut self, entry: &LedgerEntry) -> CoreResult<()> {
        if entry.clip_id.contains(['\n', '\r']) {
            return Err(CoreError::Ledger {
                path: self.path.clone(),
                message: format!("clip id {:?} contains a line break", entry.clip_id),
            });
        }
        if self.recorded.contains(&entry.clip_id) {
            return Err(CoreError::Ledger {
                path: self.path.clone(),
                message: format!("clip '{}' is already recorded", entry.clip_id),
            });
        }
        self.write_durably(&entry.to_row())?;
        self.recorded.insert(entry.clip_id.clone());
        Ok(())
    }

    fn write_durably(&mut self, text: &str) -> CoreResult<()> {
        self.file
            .write_all(text.as_bytes())
            .and_then(|()| self.file.flush())
            .and_then(|()| self.file.sync_data())
            .map_err(|e| CoreError::Ledger {
                path: self.path.clone(),
                message: format!("writing: {e}"),
            })
    }
}

fn parse_recorded(text: &str, path: &Path) -> CoreResult<HashSet<String>> {
    let mut lines = text.lines();
    let mut recorded = HashSet::new();

    match lines.next() {
        None => return Ok(recorded),
        Some(header) if header.trim_end_matches('\r') == LEDGER_HEADER => {}
        Some(other) => {
            return Err(CoreError::Ledger {
                path: path.to_path_buf(),
                message: format!("unexpected header '{other}'"),
            });
        }
    }

    for (index, line) in lines.enumerate() {
        let line_no = index + 2;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }

        let fields = match split_row(line) {
            Some(fields) if fields.len() == 4 && !fields[0].is_empty() => fields,
            _ => {
                log::warn!("Ignoring malformed ledger row {line_no} in {}", path.display());
                continue;
            }
        };

        let numeric_ok = fields[1].parse::<f64>().is_ok()
            && matches!(fields[2].as_str(), "0" | "1")
            && fields[3].parse::<i64>().is_ok();
        if !numeric_ok {
            // The clip was scored; keep it recorded so it is not appended twice.
            log::warn!(
                "Ledger row {line_no} for '{}' has malformed values",
                fields[0]
            );
        }

        let clip_id = fields.into_iter().next().unwrap_or_default();
        if !recorded.insert(clip_id.clone()) {
            log::warn!("Clip '{clip_id}' appears more than once in {}", path.display());
        }
    }

    Ok(recorded)
}

/// Quotes a field when it contains a delimiter or a quote.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Splits one CSV row, honouring double-quoted fields. `None` if a quote is unbalanced.
fn split_row(line: &str) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut quoted = false;

    while let Some(c) = chars.next() {
        match (quoted, c) {
            (true, '"') if chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            (true, '"') => quoted = false,
            (true, c) => field.push(c),
            (false, '"') if field.is_empty() => quoted = true,
            (false, ',') => fields.push(std::mem::take(&mut field)),
            (false, c) => field.push(c),
        }
    }

    if quoted {
        return None;
    }
    fields.push(field);
    Some(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn entry(clip_id: &str, median_distance: f64, is_synced: bool) -> LedgerEntry {
        LedgerEntry {
            clip_id: clip_id.to_string(),
            median_distance,
            is_synced,
            offset: -1,
        }
    }

    #[test]
    fn test_new_ledger_gets_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores").join("sync_scores.csv");

        let ledger = Ledger::open(&path).unwrap();
        assert!(ledger.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "clip,median_dist,is_synced,offset\n");
    }

    #[test]
    fn test_append_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync_scores.csv");

        let mut ledger = Ledger::open(&path).unwrap();
        ledger.append(&entry("a", 5.12345, true)).unwrap();
        ledger.append(&entry("b", 7.0, false)).unwrap();
        drop(ledger);

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "clip,median_dist,is_synced,offset\na,5.123,1,-1\nb,7.000,0,-1\n"
        );

        let ledger = Ledger::open(&path).unwrap();
        assert_eq!(ledger.len(), 2);
        assert!(ledger.contains("a"));
        assert!(ledger.contains("b"));
        assert!(!ledger.contains("c"));
    }

    #[test]
    fn test_line_break_in_clip_id_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync_scores.csv");

        let mut ledger = Ledger::open(&path).unwrap();
        for id in ["a\nb", "c\rd"] {
            assert!(matches!(
                ledger.append(&entry(id, 2.0, true)),
                Err(CoreError::Ledger { .. })
            ));
        }
        ledger.append(&entry("after", 2.0, true)).unwrap();
        drop(ledger);

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "clip,median_dist,is_synced,offset\nafter,2.000,1,-1\n"
        );
        let ledger = Ledger::open(&path).unwrap();
        assert_eq!(ledger.len(), 1);
        assert!(ledger.contains("after"));
    }

    #[test]
    fn test_duplicate_append_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync_scores.csv");

        let mut ledger = Ledger::open(&path).unwrap();
        ledger.append(&entry("a", 1.0, true)).unwrap();
        assert!(matches!(
            ledger.append(&entry("a", 2.0, true)),
            Err(CoreError::Ledger { .. })
        ));
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 2);
    }

    #[test]
    fn test_incomplete_trailing_row_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync_scores.csv");
        fs::write(&path, "clip,median_dist,is_synced,offset\na,5.000,1,2\nb,7.1").unwrap();

        let mut ledger = Ledger::open(&path).unwrap();
        assert!(ledger.contains("a"));
        assert!(!ledger.contains("b"));

        ledger.append(&entry("b", 7.1, false)).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "clip,median_dist,is_synced,offset\na,5.000,1,2\nb,7.100,0,-1\n"
        );
    }

    #[test]
    fn test_incomplete_header_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync_scores.csv");
        fs::write(&path, "clip,median").unwrap();

        let ledger = Ledger::open(&path).unwrap();
        assert!(ledger.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "clip,median_dist,is_synced,offset\n");
    }

    #[test]
    fn test_malformed_rows_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync_scores.csv");
        fs::write(
            &path,
            "clip,median_dist,is_synced,offset\n\"unclosed,1,1,1\n,1.0,1,1\nx,abc,1,1\ny,1.0,1,1\n",
        )
        .unwrap();

        let ledger = Ledger::open(&path).unwrap();
        assert_eq!(ledger.len(), 2);
        assert!(ledger.contains("x"));
        assert!(ledger.contains("y"));
    }

    #[test]
    fn test_foreign_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.csv");
        fs::write(&path, "name,value\n").unwrap();

        assert!(matches!(Ledger::open(&path), Err(CoreError::Ledger { .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), "name,value\n");
    }

    #[test]
    fn test_quoted_clip_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync_scores.csv");

        let mut ledger = Ledger::open(&path).unwrap();
        ledger.append(&entry("odd,\"name\"", 3.0, true)).unwrap();
        drop(ledger);

        assert!(fs::read_to_string(&path).unwrap().contains("\"odd,\"\"name\"\"\",3.000,1,-1\n"));
        let ledger = Ledger::open(&path).unwrap();
        assert!(ledger.contains("odd,\"name\""));
    }

    #[test]
    fn test_split_row() {
        assert_eq!(split_row("a,b,,d").unwrap(), vec!["a", "b", "", "d"]);
        assert_eq!(split_row("\"a,b\",c").unwrap(), vec!["a,b", "c"]);
        assert!(split_row("\"a,b").is_none());
    }
}
