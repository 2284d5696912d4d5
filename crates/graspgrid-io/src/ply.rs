use graspgrid_core::{Cloud, Error, Result};
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Ply, Property};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Vertex x/y/z of an ASCII or binary PLY file. Other properties are ignored.
pub fn read_ply(path: impl AsRef<Path>) -> Result<Cloud> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    let parser = Parser::<DefaultElement>::new();
    let ply: Ply<DefaultElement> = parser.read_ply(&mut reader)?;

    let corrupt = |reason: String| Error::CorruptArtifact { path: path.to_path_buf(), reason };
    let vertex = ply.payload.get("vertex").ok_or_else(|| corrupt("PLY missing 'vertex' element".into()))?;

    let mut c = Cloud::with_capacity(vertex.len());
    for el in vertex {
        let x = get_f32(el, "x").map_err(corrupt)?;
        let y = get_f32(el, "y").map_err(corrupt)?;
        let z = get_f32(el, "z").map_err(corrupt)?;
        c.push(x, y, z);
    }
    Ok(c)
}

fn get_f32(el: &DefaultElement, key: &str) -> std::result::Result<f32, String> {
    match el.get(key) {
        Some(Property::Float(v)) => Ok(*v),
        Some(Property::Double(v)) => Ok(*v as f32),
        Some(Property::Int(v)) => Ok(*v as f32),
        Some(Property::Short(v)) => Ok(*v as f32),
        Some(Property::UChar(v)) => Ok(*v as f32),
        Some(_) => Err(format!("property '{key}' not float-like")),
        None => Err(format!("missing property '{key}'")),
    }
}
