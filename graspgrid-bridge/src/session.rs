use anyhow::{bail, Context, Result};
use graspgrid_core::{ArrowFlags, BBox, Cloud, Error, OffsetSet};
use graspgrid_cutout::{compute_offsets, pick_highest, place_rect, Kernel, RectDrag};
use graspgrid_filters::crop_xy;
use graspgrid_grid::heightmap;
use graspgrid_io::{open_for_labeling, write_csv};
use graspgrid_labels::{LabelStore, UseCase};
use graspgrid_viewer::{build_view, HeatmapView, ViewData, ViewKind};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::training::kernel_from_name;

/// Marker in file names of saved cutouts.
const CUTOUT_TAG: &str = "Cutout";

/// Result of [`LabelingSession::save`].
#[derive(Clone, Debug, PartialEq)]
pub struct Saved {
    pub cutout_path: PathBuf,
    pub store_path: PathBuf,
    pub use_case: UseCase,
}

/// State of one interactive labeling pass over a single cloud.
#[derive(Debug)]
pub struct LabelingSession {
    config: PipelineConfig,
    kernel: Kernel,
    source: Option<PathBuf>,
    cloud: Option<Cloud>,
    /// The working cloud is a cutout, either loaded as one or freshly cut.
    cutout: bool,
    offsets: Option<OffsetSet>,
    pick: Option<(i32, i32)>,
}

impl LabelingSession {
    pub fn new(config: PipelineConfig) -> Self {
        let kernel = config.kernel;
        Self { config, kernel, source: None, cloud: None, cutout: false, offsets: None, pick: None }
    }

    pub fn config(&self) -> &PipelineConfig { &self.config }
    pub fn kernel(&self) -> Kernel { self.kernel }
    pub fn source(&self) -> Option<&Path> { self.source.as_deref() }
    pub fn cloud(&self) -> Option<&Cloud> { self.cloud.as_ref() }
    pub fn is_cutout(&self) -> bool { self.cutout }
    pub fn offsets(&self) -> Option<&OffsetSet> { self.offsets.as_ref() }
    pub fn picked(&self) -> Option<(i32, i32)> { self.pick }

    fn working(&self) -> Result<&Cloud> {
        self.cloud.as_ref().context("no point cloud is open")
    }

    /// Open a cloud for labeling. Files named like cutouts are treated as
    /// such; their stored flags are returned when the label store next to
    /// them knows the file.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<Option<ArrowFlags>> {
        let path = path.as_ref();
        let cloud = open_for_labeling(path, self.config.floor_threshold)
            .with_context(|| format!("open {}", path.display()))?;
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let is_cutout = name.contains(CUTOUT_TAG);

        let flags = if is_cutout {
            let dir = path.parent().unwrap_or(Path::new("."));
            let store = LabelStore::open(dir, kernel_from_name(name))?;
            match store.lookup(name) {
                Ok(f) => Some(f),
                Err(Error::RecordNotFound(_)) => None,
                Err(e) => return Err(e.into()),
            }
        } else {
            None
        };

        info!("session: opened {} ({} points, cutout={is_cutout})", path.display(), cloud.len());
        self.source = Some(path.to_path_buf());
        self.cloud = Some(cloud);
        self.cutout = is_cutout;
        self.offsets = None;
        self.pick = None;
        Ok(flags)
    }

    /// Switch kernels. An open cloud is reloaded from disk so it can be cut
    /// again with the new size.
    pub fn select_kernel(&mut self, kernel: Kernel) -> Result<()> {
        self.kernel = kernel;
        if let Some(src) = self.source.clone() {
            self.cloud = Some(open_for_labeling(&src, self.config.floor_threshold)?);
            self.cutout = false;
            self.offsets = None;
            self.pick = None;
            debug!("session: kernel {kernel}, reloaded {}", src.display());
        }
        Ok(())
    }

    /// View data for the working cloud.
    pub fn view(&self, kind: ViewKind) -> Result<ViewData> {
        Ok(build_view(self.working()?, kind, self.config.display_rotate_limit))
    }

    /// Remember the highest of the picked points of a displayed point set as
    /// the next rectangle center.
    pub fn pick(&mut self, shown: &Cloud, picked: &[usize]) -> Option<(i32, i32)> {
        let p = pick_highest(shown, picked)?;
        self.pick = Some(p);
        Some(p)
    }

    fn heatmap_view(&self) -> Result<HeatmapView> {
        let map = heightmap(self.working()?, self.config.voxel_size);
        Ok(HeatmapView::from_map(map, self.config.display_rotate_limit))
    }

    /// Put a kernel-sized rectangle at (cx, cy), clamped into the heat map.
    pub fn place_rect(&self, cx: f32, cy: f32, rotated: bool) -> Result<RectDrag> {
        let bounds = self.heatmap_view()?.plot_bounds().context("heat map is empty")?;
        let rect = place_rect(
            bounds, cx, cy, self.config.col_width, self.config.row_height, self.kernel, rotated,
        );
        Ok(RectDrag::new(rect, bounds))
    }

    /// Crop the working cloud to `bbox` and keep its offsets.
    pub fn cut(&mut self, bbox: &BBox, rotated: bool) -> Result<OffsetSet> {
        if self.cutout {
            bail!("the open point cloud is already a cutout");
        }
        let cropped = crop_xy(self.working()?, bbox);
        let offsets = compute_offsets(bbox, rotated);
        info!("session: cut {} points inside ({}, {})-({}, {})", cropped.len(), bbox.x1, bbox.y1, bbox.x2, bbox.y2);
        self.cloud = Some(cropped);
        self.cutout = true;
        self.offsets = Some(offsets);
        Ok(offsets)
    }

    /// Finish a drag: cut with the rectangle's box and rotation.
    pub fn cut_drag(&mut self, drag: &RectDrag) -> Result<OffsetSet> {
        let (bbox, _) = drag.cut();
        self.cut(&bbox, drag.rect().rotated)
    }

    /// Directory cutouts of the current kernel go to.
    pub fn cutout_dir(&self, dataset_dir: &Path) -> PathBuf {
        dataset_dir.join(format!("{CUTOUT_TAG}_{}", self.kernel))
    }

    /// Write the cutout cloud and record its labels.
    pub fn save(&self, dataset_dir: impl AsRef<Path>, flags: ArrowFlags) -> Result<Saved> {
        if !self.cutout {
            bail!("nothing to save: cut the point cloud first");
        }
        let cloud = self.working()?;
        let src = self.source.as_deref().context("no point cloud is open")?;
        let name = src.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let file_name = if name.contains(CUTOUT_TAG) {
            name.to_string()
        } else {
            let stem = name.split('.').next().unwrap_or(name);
            format!("{stem}_{CUTOUT_TAG}_{}.csv", self.kernel)
        };

        let dir = self.cutout_dir(dataset_dir.as_ref());
        fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        let mut store = LabelStore::open(&dir, &self.kernel.to_string())?;
        let use_case = store.upsert(&file_name, flags, self.offsets)?;

        let cutout_path = dir.join(&file_name);
        write_csv(&cutout_path, cloud).with_context(|| format!("write {}", cutout_path.display()))?;
        store.persist().with_context(|| format!("write {}", store.path().display()))?;
        info!("session: saved {} as {use_case}", cutout_path.display());
        Ok(Saved { cutout_path, store_path: store.path().to_path_buf(), use_case })
    }
}
