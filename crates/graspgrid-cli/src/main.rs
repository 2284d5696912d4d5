use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use graspgrid_bridge::{load_config, load_test_set, load_training_sets, LabelingSession, PipelineConfig};
use graspgrid_core::{Arrow, ArrowFlags};
use graspgrid_cutout::Kernel;
use graspgrid_features::{random_split, Dataset, DEFAULT_TRAIN_FRACTION};
use graspgrid_labels::{find_label_file, LabelStore};
use graspgrid_viewer::{build_view, reference_corner, ViewData, ViewKind};
use log::info;
use serde_json::json;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

// ---------- helpers ----------

fn t0() -> std::time::Instant { std::time::Instant::now() }
fn lap(t: std::time::Instant, label: &str) {
    let ms = t.elapsed().as_secs_f64() * 1000.0;
    info!("[{label}] {ms:.1} ms");
}

/// "lo,o,ru" -> flags; an empty list means no arrow.
fn parse_flags(csv: &str) -> Result<ArrowFlags> {
    let arrows = csv
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<Arrow>().map_err(anyhow::Error::msg))
        .collect::<Result<Vec<_>>>()?;
    Ok(ArrowFlags::from_arrows(&arrows))
}

fn flag_names(flags: &ArrowFlags) -> Vec<&'static str> {
    flags.selected().map(|a| a.name()).collect()
}

fn write_json(path: Option<&Path>, value: &serde_json::Value) -> Result<()> {
    match path {
        Some(p) => {
            let f = File::create(p).with_context(|| format!("create {}", p.display()))?;
            serde_json::to_writer_pretty(BufWriter::new(f), value)?;
            println!("wrote {}", p.display());
        }
        None => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

fn summarize(name: &str, d: &Dataset) {
    let (n, rows, cols) = d.features.shape();
    let mut counts = [0usize; 8];
    for f in &d.labels {
        for a in f.selected() { counts[a.index()] += 1; }
    }
    let per_arrow: Vec<String> = Arrow::ALL.iter().map(|a| format!("{a}={}", counts[a.index()])).collect();
    println!("{name}: {n} samples of {rows}x{cols}  [{}]", per_arrow.join(" "));
}

// ---------- CLI ----------

#[derive(Parser)]
#[command(name = "graspgrid", version, about = "graspgrid: grasp-direction labeling and dataset tools")]
struct Args {
    /// JSON pipeline config; missing fields keep their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Override the floor threshold (points must lie strictly above it)
    #[arg(long, global = true, allow_hyphen_values = true)]
    floor: Option<f32>,
    /// Override the voxel size used for voxels and height maps
    #[arg(long, global = true)]
    voxel_size: Option<f32>,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Copy, Clone, ValueEnum)]
enum Split { Train, Test }

#[derive(Subcommand)]
enum Cmd {
    /// Print point count and bounds of a cloud (.csv / .npy / .ply)
    Info { input: PathBuf },

    /// Voxelize a floor-filtered cloud and write voxel centers as csv
    Voxelize { input: PathBuf, output: PathBuf },

    /// Height map of a floor-filtered cloud as JSON
    Heatmap {
        input: PathBuf,
        #[arg(short, long)] output: Option<PathBuf>,
    },

    /// Floor-filter and rescale every .npy in a directory, in place
    Prepare {
        dir: PathBuf,
        #[arg(long)] scale: Option<f32>,
    },

    /// Cut a kernel-sized rectangle around (cx, cy) and record its labels
    Cut {
        input: PathBuf,
        /// Dataset directory; cutouts go to <dataset>/Cutout_<kernel>
        dataset: PathBuf,
        #[arg(long, allow_hyphen_values = true)] cx: f32,
        #[arg(long, allow_hyphen_values = true)] cy: f32,
        #[arg(short, long)] kernel: Option<Kernel>,
        #[arg(long)] rotated: bool,
        /// Comma separated arrows, e.g. "lo,o"
        #[arg(long, default_value = "")] flags: String,
    },

    /// Print the stored arrows of a cutout file
    Lookup {
        /// Directory holding the label store
        cutout_dir: PathBuf,
        filename: String,
    },

    /// Load one split of a cutout directory and summarize it
    Dataset {
        cutout_dir: PathBuf,
        #[arg(long, value_enum, default_value_t = Split::Train)] split: Split,
        #[arg(long, default_value_t = 0)] seed: u64,
    },

    /// Seeded train/valid index split
    Split {
        n: usize,
        #[arg(long, default_value_t = DEFAULT_TRAIN_FRACTION)] train_fraction: f64,
        #[arg(long, default_value_t = 0)] seed: u64,
    },
}

fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(p) => load_config(p)?,
        None => PipelineConfig::default(),
    };
    if let Some(f) = args.floor { config.floor_threshold = f; }
    if let Some(v) = args.voxel_size { config.voxel_size = v; }

    match args.cmd {
        Cmd::Info { input } => cmd_info(&input, &config),
        Cmd::Voxelize { input, output } => cmd_voxelize(&input, &output, &config),
        Cmd::Heatmap { input, output } => cmd_heatmap(&input, output.as_deref(), &config),
        Cmd::Prepare { dir, scale } => cmd_prepare(&dir, scale.unwrap_or(config.prepare_scale), &config),
        Cmd::Cut { input, dataset, cx, cy, kernel, rotated, flags } => {
            if let Some(k) = kernel { config.kernel = k; }
            cmd_cut(&input, &dataset, cx, cy, rotated, &flags, config)
        }
        Cmd::Lookup { cutout_dir, filename } => cmd_lookup(&cutout_dir, &filename),
        Cmd::Dataset { cutout_dir, split, seed } => cmd_dataset(&cutout_dir, split, seed, &config),
        Cmd::Split { n, train_fraction, seed } => cmd_split(n, train_fraction, seed),
    }
}

// ---------- commands ----------

fn cmd_info(path: &Path, config: &PipelineConfig) -> Result<()> {
    let raw = graspgrid_io::load(path).with_context(|| format!("load {}", path.display()))?;
    let kept = graspgrid_filters::strip_floor(&raw, config.floor_threshold);
    println!("points: {}  (above floor {}: {})", raw.len(), config.floor_threshold, kept.len());
    if let Some(b) = raw.bounds() {
        println!("min: {:?}", b.min);
        println!("max: {:?}", b.max);
    }
    if let Some(c) = reference_corner(&kept) {
        println!("reference corner: ({}, {})", c[0], c[1]);
    }
    Ok(())
}

fn cmd_voxelize(input: &Path, output: &Path, config: &PipelineConfig) -> Result<()> {
    let t = t0();
    let cloud = graspgrid_io::open_for_labeling(input, config.floor_threshold)?;
    let ViewData::Voxel(set) =
        build_view(&cloud, ViewKind::Voxel { voxel_size: config.voxel_size }, config.display_rotate_limit)
    else {
        bail!("voxel view expected");
    };
    lap(t, "voxelize");
    graspgrid_io::write_csv(output, &set.points).with_context(|| format!("write {}", output.display()))?;
    println!("voxelize: {} points -> {} voxels (size {})", cloud.len(), set.len(), config.voxel_size);
    Ok(())
}

fn cmd_heatmap(input: &Path, output: Option<&Path>, config: &PipelineConfig) -> Result<()> {
    let cloud = graspgrid_io::open_for_labeling(input, config.floor_threshold)?;
    let ViewData::Heatmap(view) =
        build_view(&cloud, ViewKind::Heatmap { voxel_size: config.voxel_size }, config.display_rotate_limit)
    else {
        bail!("heatmap view expected");
    };
    let rows: Vec<Vec<f32>> = view.display.row_iter().map(|r| r.iter().copied().collect()).collect();
    let value = json!({
        "source": input.display().to_string(),
        "voxel_size": config.voxel_size,
        "xs": view.map.xs,
        "ys": view.map.ys,
        "extent": view.extent,
        "rotated": view.rotated,
        "display": rows,
    });
    write_json(output, &value)
}

fn cmd_prepare(dir: &Path, scale: f32, config: &PipelineConfig) -> Result<()> {
    let t = t0();
    let report = graspgrid_io::prepare_clouds(dir, config.floor_threshold, scale)
        .with_context(|| format!("prepare {}", dir.display()))?;
    lap(t, "prepare");
    println!("prepare: {} processed, {} deleted", report.processed, report.deleted.len());
    for p in &report.deleted {
        println!("  deleted {}", p.display());
    }
    Ok(())
}

fn cmd_cut(
    input: &Path, dataset: &Path, cx: f32, cy: f32, rotated: bool, flags: &str, config: PipelineConfig,
) -> Result<()> {
    let flags = parse_flags(flags)?;
    let mut session = LabelingSession::new(config);
    if let Some(prev) = session.open(input)? {
        println!("stored arrows: {:?}", flag_names(&prev));
    }
    let drag = session.place_rect(cx, cy, rotated)?;
    let rect = drag.rect();
    println!("rectangle {} at ({}, {}) rotated={}", rect.kernel, rect.cx, rect.cy, rect.rotated);

    let offsets = session.cut_drag(&drag)?;
    let n = session.cloud().map_or(0, |c| c.len());
    println!("cut: {n} points, center ({}, {})", offsets.center[0], offsets.center[1]);

    let saved = session.save(dataset, flags)?;
    println!("saved {} ({}) arrows {:?}", saved.cutout_path.display(), saved.use_case, flag_names(&flags));
    Ok(())
}

fn cmd_lookup(cutout_dir: &Path, filename: &str) -> Result<()> {
    let file = find_label_file(cutout_dir)?
        .with_context(|| format!("no label store in {}", cutout_dir.display()))?;
    let store = LabelStore::open_file(file)?;
    let Some(rec) = store.get(filename) else {
        bail!("{filename} is not labeled in {}", store.path().display());
    };
    println!("{}: {} arrows {:?}", rec.filename, rec.use_case, flag_names(&rec.flags));
    if let Some(o) = rec.offsets {
        println!("center: ({}, {})", o.center[0], o.center[1]);
    }
    Ok(())
}

fn cmd_dataset(cutout_dir: &Path, split: Split, seed: u64, config: &PipelineConfig) -> Result<()> {
    let t = t0();
    match split {
        Split::Train => {
            let sets = load_training_sets(cutout_dir, config, seed)?;
            lap(t, "load");
            summarize("train", &sets.train);
            summarize("valid", &sets.valid);
        }
        Split::Test => {
            let test = load_test_set(cutout_dir, config)?;
            lap(t, "load");
            summarize("test", &test);
        }
    }
    Ok(())
}

fn cmd_split(n: usize, train_fraction: f64, seed: u64) -> Result<()> {
    anyhow::ensure!((0.0..=1.0).contains(&train_fraction), "train fraction must lie in [0, 1]");
    let (train, valid) = random_split(n, train_fraction, seed);
    write_json(None, &json!({ "train": train, "valid": valid }))
}
