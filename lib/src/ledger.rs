//! The discovery ledger.

use crate::{detect::Speed, error::Error, lattice::Lattice};
use ca_formats::rle::Rle;
use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
};

/// Longest line emitted by the RLE writer.
const RLE_LINE_WIDTH: usize = 70;

/// The persisted record of distinct discovered speeds, plus one example
/// pattern for the latest discovery.
///
/// The state file is line-oriented text:
///
/// ```text
/// <count> NRSS
/// <dx1>c/<period1> <dx2>c/<period2> ...
/// <RLE block of the most recent discovery>
/// ```
///
/// Every mutation rewrites the file through a temporary and then re-reads
/// it in full, so the in-memory set always reflects what is on durable
/// storage.
pub struct Ledger {
    path: PathBuf,
    speeds: Vec<Speed>,
    pattern: String,
}

impl Ledger {
    /// Loads the ledger from the state file, starting empty if the file
    /// does not exist yet.
    ///
    /// A file that exists but cannot be read or parsed is a fatal error;
    /// discoveries are never silently reset.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        match fs::read_to_string(&path) {
            Ok(text) => {
                let (speeds, pattern) = parse(&text)?;
                Ok(Ledger {
                    path,
                    speeds,
                    pattern,
                })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Ledger {
                path,
                speeds: Vec::new(),
                pattern: String::new(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// The discovered speeds, in discovery order.
    pub fn speeds(&self) -> &[Speed] {
        &self.speeds
    }

    /// Number of discoveries.
    pub fn count(&self) -> usize {
        self.speeds.len()
    }

    /// The RLE block of the most recent discovery.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether the speed has already been discovered.
    pub fn contains(&self, speed: Speed) -> bool {
        self.speeds.contains(&speed)
    }

    /// Records a discovery and persists it.
    ///
    /// Returns `false` without touching the file when the speed is already
    /// known. Otherwise appends the speed, replaces the example pattern,
    /// rewrites the state file atomically, and re-reads it.
    pub fn record(&mut self, speed: Speed, pattern: String) -> Result<bool, Error> {
        if self.contains(speed) {
            return Ok(false);
        }
        self.speeds.push(speed);
        self.pattern = pattern;
        self.write()?;
        self.reload()?;
        Ok(true)
    }

    fn write(&self) -> Result<(), Error> {
        let mut text = format!("{} NRSS\n", self.speeds.len());
        let speeds: Vec<String> = self.speeds.iter().map(Speed::to_string).collect();
        text.push_str(&speeds.join(" "));
        text.push('\n');
        text.push_str(&self.pattern);

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn reload(&mut self) -> Result<(), Error> {
        let text = fs::read_to_string(&self.path)?;
        let (speeds, pattern) = parse(&text)?;
        self.speeds = speeds;
        self.pattern = pattern;
        Ok(())
    }
}

fn parse(text: &str) -> Result<(Vec<Speed>, String), Error> {
    let mut parts = text.splitn(3, '\n');
    let header = parts
        .next()
        .ok_or_else(|| Error::LedgerError("missing header line".to_string()))?;
    let count: usize = header
        .strip_suffix(" NRSS")
        .ok_or_else(|| Error::LedgerError(format!("bad header line {:?}", header)))?
        .parse()
        .map_err(|_| Error::LedgerError(format!("bad header line {:?}", header)))?;

    let speeds_line = parts
        .next()
        .ok_or_else(|| Error::LedgerError("missing speeds line".to_string()))?;
    let speeds = speeds_line
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<Vec<Speed>, Error>>()?;
    if speeds.len() != count {
        return Err(Error::LedgerError(format!(
            "header counts {} ships but {} speeds are listed",
            count,
            speeds.len()
        )));
    }
    let mut seen = HashSet::new();
    for &speed in &speeds {
        if !seen.insert(speed) {
            return Err(Error::LedgerError(format!("duplicate speed {}", speed)));
        }
    }

    let pattern = parts.next().unwrap_or("").to_string();
    if pattern.trim().is_empty() {
        if count > 0 {
            return Err(Error::LedgerError("missing pattern block".to_string()));
        }
    } else {
        validate_pattern(&pattern)?;
    }
    Ok((speeds, pattern))
}

/// Checks that the pattern block is syntactically valid RLE with a header.
fn validate_pattern(block: &str) -> Result<(), Error> {
    let rle =
        Rle::new(block).map_err(|e| Error::LedgerError(format!("bad pattern block: {}", e)))?;
    if rle.header_data().is_none() {
        return Err(Error::LedgerError(
            "pattern block lacks an RLE header".to_string(),
        ));
    }
    for cell in rle {
        cell.map_err(|e| Error::LedgerError(format!("bad pattern block: {}", e)))?;
    }
    Ok(())
}

/// Encodes the lattice's bounding-box content as an RLE block with the
/// standard `x = W, y = H, rule = ...` header.
///
/// Runs longer than one cell get a numeric prefix; `$` separates rows, `!`
/// terminates, and lines wrap at 70 characters. Returns `None` when the
/// lattice is empty.
pub fn encode_rle(lattice: &Lattice, rule_string: &str) -> Option<String> {
    let bbox = lattice.bbox()?;
    let mut out = format!(
        "x = {}, y = {}, rule = {}\n",
        bbox.width(),
        bbox.height(),
        rule_string
    );
    let mut line_len = 0;

    let mut push_run = |out: &mut String, count: usize, tag: char| {
        if count == 0 {
            return;
        }
        let run = if count == 1 {
            tag.to_string()
        } else {
            format!("{}{}", count, tag)
        };
        if line_len + run.len() > RLE_LINE_WIDTH {
            out.push('\n');
            line_len = 0;
        }
        out.push_str(&run);
        line_len += run.len();
    };

    // Row separators accumulate over empty interior rows; the first and
    // last rows of a tight box always hold a live cell.
    let mut row_sep = 0;
    for row in bbox.top..=bbox.bottom {
        let last_live = (bbox.left..=bbox.right)
            .rev()
            .find(|&col| lattice.is_alive(row, col));
        let Some(last_live) = last_live else {
            row_sep += 1;
            continue;
        };
        push_run(&mut out, row_sep, '$');
        row_sep = 1;

        let mut count = 0;
        let mut tag = 'b';
        for col in bbox.left..=last_live {
            let cell = if lattice.is_alive(row, col) { 'o' } else { 'b' };
            if cell == tag {
                count += 1;
            } else {
                push_run(&mut out, count, tag);
                tag = cell;
                count = 1;
            }
        }
        push_run(&mut out, count, tag);
    }
    push_run(&mut out, 1, '!');
    out.push('\n');
    Some(out)
}
