use graspgrid_core::{Cloud, Error, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Semicolon-delimited `x;y;z` rows, no header. Blank lines and `#`
/// comments are skipped; extra columns after z are ignored.
pub fn read_csv(path: impl AsRef<Path>) -> Result<Cloud> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let mut c = Cloud::default();
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { continue; }
        let mut fields = line.split(';').map(str::trim);
        let mut xyz = [0.0f32; 3];
        for v in xyz.iter_mut() {
            let f = fields.next().unwrap_or("");
            *v = f.parse::<f64>().map_err(|_| Error::Parse {
                path: path.to_path_buf(),
                line: n + 1,
                reason: format!("expected three numbers, got '{line}'"),
            })? as f32;
        }
        c.push(xyz[0], xyz[1], xyz[2]);
    }
    Ok(c)
}

/// Overwrite `path` with one `x;y;z` row per point.
pub fn write_csv(path: impl AsRef<Path>, cloud: &Cloud) -> Result<()> {
    let mut w = BufWriter::new(File::create(path.as_ref())?);
    for i in 0..cloud.len() {
        writeln!(w, "{};{};{}", cloud.x[i], cloud.y[i], cloud.z[i])?;
    }
    w.flush()?;
    Ok(())
}
