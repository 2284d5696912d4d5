//! graspgrid-labels: label store for cutouts of one kernel size.
//!
//! The store is a semicolon-delimited file `Cutout_<kernel>_Results_Labeled.csv`
//! with a fixed 19-column header. It is read whole on open and rewritten
//! whole on persist.

use graspgrid_core::{Arrow, ArrowFlags, Error, OffsetSet, Result};
use hashbrown::HashMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const DELIM: char = ';';
/// Every n-th new record (counting from zero) goes to the test split.
const TEST_EVERY: usize = 5;

/// Split a record belongs to; fixed at first insertion.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UseCase { Train, Test }

impl UseCase {
    pub fn as_str(self) -> &'static str {
        match self { UseCase::Train => "train", UseCase::Test => "test" }
    }
}

impl fmt::Display for UseCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for UseCase {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s.trim() {
            "train" => Ok(UseCase::Train),
            "test" => Ok(UseCase::Test),
            other => Err(format!("unknown use_case '{other}'")),
        }
    }
}

/// One labeled cutout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelRecord {
    pub filename: String,
    pub use_case: UseCase,
    pub flags: ArrowFlags,
    /// Absent when the cutout was relabeled without a fresh cut.
    pub offsets: Option<OffsetSet>,
}

/// Header of the store file, in column order.
pub fn columns() -> Vec<String> {
    let mut cols = vec!["filename".to_string(), "use_case".to_string()];
    cols.extend(Arrow::ALL.iter().map(|a| a.column()));
    cols.extend(OffsetSet::COLUMNS.iter().map(|c| c.to_string()));
    cols
}

/// File name of the store for `kernel`, e.g. `Cutout_3x3_Results_Labeled.csv`.
pub fn store_file_name(kernel: &str) -> String {
    format!("Cutout_{kernel}_Results_Labeled.csv")
}

/// First `.csv` in `dir` whose name contains `Results_Labeled`.
pub fn find_label_file(dir: &Path) -> Result<Option<PathBuf>> {
    let mut names: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name().and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(".csv") && n.contains("Results_Labeled"))
        })
        .collect();
    names.sort();
    Ok(names.into_iter().next())
}

#[derive(Debug)]
pub struct LabelStore {
    path: PathBuf,
    records: Vec<LabelRecord>,
    index: HashMap<String, usize>,
}

impl LabelStore {
    /// Load the store for `kernel` under `dir`, or start an empty one.
    pub fn open(dir: impl AsRef<Path>, kernel: &str) -> Result<Self> {
        let path = dir.as_ref().join(store_file_name(kernel));
        Self::open_file(path)
    }

    /// Load a store from an explicit file path (empty if it does not exist).
    pub fn open_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut store = LabelStore { path, records: Vec::new(), index: HashMap::new() };
        if store.path.is_file() {
            let text = fs::read_to_string(&store.path)?;
            for rec in parse_store(&store.path, &text)? {
                store.insert_loaded(rec);
            }
            info!("label store {}: {} records", store.path.display(), store.records.len());
        } else {
            debug!("label store {} not found, starting empty", store.path.display());
        }
        Ok(store)
    }

    // later duplicates overwrite earlier rows, as a re-save would
    fn insert_loaded(&mut self, rec: LabelRecord) {
        match self.index.get(&rec.filename) {
            Some(&i) => self.records[i] = rec,
            None => {
                self.index.insert(rec.filename.clone(), self.records.len());
                self.records.push(rec);
            }
        }
    }

    pub fn path(&self) -> &Path { &self.path }
    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }
    pub fn records(&self) -> &[LabelRecord] { &self.records }

    pub fn get(&self, filename: &str) -> Option<&LabelRecord> {
        self.index.get(filename).map(|&i| &self.records[i])
    }

    pub fn by_use_case(&self, use_case: UseCase) -> impl Iterator<Item = &LabelRecord> {
        self.records.iter().filter(move |r| r.use_case == use_case)
    }

    /// Insert or update `filename`. New records take the test split when the
    /// record count before insertion is a multiple of five.
    ///
    /// Updates overwrite the flags but never the filename or split. Offsets are
    /// overwritten only when `offsets` is `Some`: relabeling a reopened cutout
    /// has no fresh cut, so its stored offsets are kept.
    ///
    /// Names that are empty or contain the delimiter or a line break cannot be
    /// read back from the store file and are rejected.
    pub fn upsert(&mut self, filename: &str, flags: ArrowFlags, offsets: Option<OffsetSet>) -> Result<UseCase> {
        if filename.trim().is_empty() || filename.contains([DELIM, '\n', '\r']) {
            return Err(Error::InvalidRecordName(filename.to_string()));
        }
        if let Some(&i) = self.index.get(filename) {
            let rec = &mut self.records[i];
            rec.flags = flags;
            if offsets.is_some() { rec.offsets = offsets; }
            debug!("label store: updated {filename}");
            return Ok(rec.use_case);
        }
        let use_case = if self.records.len() % TEST_EVERY == 0 { UseCase::Test } else { UseCase::Train };
        self.index.insert(filename.to_string(), self.records.len());
        self.records.push(LabelRecord { filename: filename.to_string(), use_case, flags, offsets });
        debug!("label store: added {filename} ({use_case})");
        Ok(use_case)
    }

    /// Stored arrow flags for `filename`.
    pub fn lookup(&self, filename: &str) -> Result<ArrowFlags> {
        self.get(filename)
            .map(|r| r.flags)
            .ok_or_else(|| Error::RecordNotFound(filename.to_string()))
    }

    /// Rewrite the whole store file.
    pub fn persist(&self) -> Result<()> {
        let mut w = BufWriter::new(File::create(&self.path)?);
        writeln!(w, "{}", columns().join(&DELIM.to_string()))?;
        for r in &self.records {
            write!(w, "{}{DELIM}{}", r.filename, r.use_case)?;
            for a in Arrow::ALL {
                write!(w, "{DELIM}{}", u8::from(r.flags.get(a)))?;
            }
            match &r.offsets {
                Some(o) => {
                    for [x, y] in o.to_columns() { write!(w, "{DELIM}({x}, {y})")?; }
                }
                None => {
                    for _ in 0..OffsetSet::COLUMNS.len() { write!(w, "{DELIM}")?; }
                }
            }
            writeln!(w)?;
        }
        w.flush()?;
        info!("label store {}: wrote {} records", self.path.display(), self.records.len());
        Ok(())
    }
}

fn parse_store(path: &Path, text: &str) -> Result<Vec<LabelRecord>> {
    let err = |line: usize, reason: String| Error::Parse { path: path.to_path_buf(), line, reason };
    let mut lines = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());
    let Some((_, header)) = lines.next() else { return Ok(Vec::new()); };

    let header: Vec<&str> = header.trim_start_matches('\u{feff}').split(DELIM).map(str::trim).collect();
    let pos = |name: &str| header.iter().position(|h| *h == name).ok_or_else(|| err(1, format!("missing column '{name}'")));
    let filename_at = pos("filename")?;
    let use_case_at = pos("use_case")?;
    let arrow_at: Vec<usize> = Arrow::ALL.iter().map(|a| pos(a.column().as_str())).collect::<Result<_>>()?;
    let offset_at: Vec<usize> = OffsetSet::COLUMNS.iter().map(|c| pos(*c)).collect::<Result<_>>()?;

    let mut out = Vec::new();
    for (n, line) in lines {
        let line_no = n + 1;
        let cells: Vec<&str> = line.split(DELIM).collect();
        let cell = |i: usize| cells.get(i).map(|s| s.trim()).unwrap_or("");

        let filename = cell(filename_at).to_string();
        if filename.is_empty() { return Err(err(line_no, "empty filename".into())); }
        let use_case = cell(use_case_at).parse::<UseCase>().map_err(|e| err(line_no, e))?;

        let mut flags = ArrowFlags::default();
        for (a, &i) in Arrow::ALL.iter().zip(&arrow_at) {
            let on = parse_flag(cell(i)).ok_or_else(|| err(line_no, format!("bad flag '{}'", cell(i))))?;
            flags.set(*a, on);
        }

        let mut pts = [[0.0f32; 2]; 9];
        let mut complete = true;
        for (slot, &i) in pts.iter_mut().zip(&offset_at) {
            match cell(i) {
                "" | "nan" | "NaN" => complete = false,
                s => *slot = parse_pair(s).ok_or_else(|| err(line_no, format!("bad offset '{s}'")))?,
            }
        }
        let offsets = complete.then(|| OffsetSet::from_columns(pts));
        out.push(LabelRecord { filename, use_case, flags, offsets });
    }
    Ok(out)
}

// accepts 0/1, float spellings (1.0) and True/False
fn parse_flag(s: &str) -> Option<bool> {
    match s {
        "True" | "true" => Some(true),
        "False" | "false" => Some(false),
        _ => s.parse::<f32>().ok().map(|v| v != 0.0),
    }
}

/// Parse "(x, y)".
fn parse_pair(s: &str) -> Option<[f32; 2]> {
    let inner = s.trim().strip_prefix('(')?.strip_suffix(')')?;
    let (x, y) = inner.split_once(',')?;
    Some([x.trim().parse().ok()?, y.trim().parse().ok()?])
}
