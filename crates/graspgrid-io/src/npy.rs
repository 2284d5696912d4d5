//! Minimal `.npy` reader/writer for (N, 3) coordinate arrays.

use graspgrid_core::{Cloud, Error, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

const MAGIC: &[u8; 6] = b"\x93NUMPY";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Kind { Float, Int }

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Dtype { kind: Kind, size: usize, big_endian: bool }

impl Dtype {
    fn parse(descr: &str) -> Option<Dtype> {
        let mut chars = descr.chars();
        let big_endian = match chars.next()? {
            '<' | '|' | '=' => false,
            '>' => true,
            _ => return None,
        };
        let kind = match chars.next()? {
            'f' => Kind::Float,
            'i' => Kind::Int,
            _ => return None,
        };
        let size: usize = chars.as_str().parse().ok()?;
        match (kind, size) {
            (Kind::Float, 4 | 8) | (Kind::Int, 4 | 8) => Some(Dtype { kind, size, big_endian }),
            _ => None,
        }
    }

    fn read(&self, b: &[u8]) -> f32 {
        macro_rules! num {
            ($t:ty, $n:literal) => {{
                let mut a = [0u8; $n];
                a.copy_from_slice(&b[..$n]);
                if self.big_endian { <$t>::from_be_bytes(a) } else { <$t>::from_le_bytes(a) }
            }};
        }
        match (self.kind, self.size) {
            (Kind::Float, 4) => num!(f32, 4),
            (Kind::Float, _) => { let v: f64 = num!(f64, 8); v as f32 }
            (Kind::Int, 4) => { let v: i32 = num!(i32, 4); v as f32 }
            (Kind::Int, _) => { let v: i64 = num!(i64, 8); v as f32 }
        }
    }
}

#[derive(Debug, PartialEq)]
struct Header { dtype: Dtype, fortran: bool, shape: Vec<usize> }

/// Read an (N, 3) array. Broken files (bad magic, short header, truncated
/// payload) are `CorruptArtifact`; well-formed files with an unsupported
/// dtype or shape are `Parse` errors.
pub fn read_npy(path: impl AsRef<Path>) -> Result<Cloud> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let corrupt = |reason: &str| Error::CorruptArtifact { path: path.to_path_buf(), reason: reason.to_string() };
    let bad = |reason: String| Error::Parse { path: path.to_path_buf(), line: 1, reason };

    if bytes.len() < 10 || &bytes[..6] != MAGIC {
        return Err(corrupt("missing NPY magic"));
    }
    let (hlen, start) = match bytes[6] {
        1 => (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10),
        2 | 3 => {
            if bytes.len() < 12 { return Err(corrupt("short header")); }
            (u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize, 12)
        }
        v => return Err(bad(format!("unsupported NPY version {v}"))),
    };
    let header_bytes = bytes.get(start..start + hlen).ok_or_else(|| corrupt("short header"))?;
    let text = std::str::from_utf8(header_bytes).map_err(|_| corrupt("header is not text"))?;
    let header = parse_header(text).map_err(bad)?;

    let (n, cols) = match header.shape.as_slice() {
        [n, 3] => (*n, 3),
        [0] => (0, 3),
        other => return Err(bad(format!("expected shape (N, 3), got {other:?}"))),
    };
    let sz = header.dtype.size;
    let payload = &bytes[start + hlen..];
    let need = n
        .checked_mul(cols)
        .and_then(|v| v.checked_mul(sz))
        .ok_or_else(|| corrupt("shape overflows payload"))?;
    if payload.len() < need {
        return Err(corrupt(&format!("payload has {} bytes, expected {need}", payload.len())));
    }

    let at = |i: usize, k: usize| {
        let flat = if header.fortran { k * n + i } else { i * cols + k };
        header.dtype.read(&payload[flat * sz..])
    };
    let mut c = Cloud::with_capacity(n);
    for i in 0..n {
        c.push(at(i, 0), at(i, 1), at(i, 2));
    }
    Ok(c)
}

fn value_after<'a>(text: &'a str, key: &str) -> std::result::Result<&'a str, String> {
    let k = text.find(key).ok_or_else(|| format!("header lacks {key}"))?;
    let rest = &text[k + key.len()..];
    let colon = rest.find(':').ok_or_else(|| format!("header lacks value for {key}"))?;
    Ok(rest[colon + 1..].trim_start())
}

// {'descr': '<f8', 'fortran_order': False, 'shape': (12, 3), }
fn parse_header(text: &str) -> std::result::Result<Header, String> {
    let descr = value_after(text, "'descr'")?;
    let quote = descr.chars().next().filter(|c| *c == '\'' || *c == '"').ok_or("descr is not a string")?;
    let descr = &descr[1..];
    let end = descr.find(quote).ok_or("unterminated descr")?;
    let dtype = Dtype::parse(&descr[..end]).ok_or_else(|| format!("unsupported dtype '{}'", &descr[..end]))?;

    let fortran = value_after(text, "'fortran_order'")?.starts_with("True");

    let shape = value_after(text, "'shape'")?;
    let shape = shape.strip_prefix('(').ok_or("shape is not a tuple")?;
    let close = shape.find(')').ok_or("unterminated shape")?;
    let shape = shape[..close]
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_end_matches('L').parse::<usize>().map_err(|_| format!("bad dimension '{s}'")))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(Header { dtype, fortran, shape })
}

/// Write a version 1.0 little-endian float64 (N, 3) array, C order.
pub fn write_npy(path: impl AsRef<Path>, cloud: &Cloud) -> Result<()> {
    let mut header = format!("{{'descr': '<f8', 'fortran_order': False, 'shape': ({}, 3), }}", cloud.len());
    // magic(6) + version(2) + len(2) + header + '\n' must be a multiple of 64
    let unpadded = 10 + header.len() + 1;
    header.push_str(&" ".repeat((64 - unpadded % 64) % 64));
    header.push('\n');

    let mut w = BufWriter::new(File::create(path.as_ref())?);
    w.write_all(MAGIC)?;
    w.write_all(&[1, 0])?;
    w.write_all(&(header.len() as u16).to_le_bytes())?;
    w.write_all(header.as_bytes())?;
    for p in cloud.points() {
        for v in p {
            w.write_all(&(v as f64).to_le_bytes())?;
        }
    }
    w.flush()?;
    Ok(())
}
