use graspgrid_core::{ArrowFlags, Result};
use graspgrid_grid::heightmap;
use graspgrid_io::open_for_labeling;
use graspgrid_labels::{LabelStore, UseCase};
use log::info;
use nalgebra::DMatrix;
use rayon::prelude::*;
use std::path::Path;

use crate::normalize::{prepare, FeatureBatch};

/// Height-map features and arrow labels for one split of a label store.
#[derive(Clone, Debug)]
pub struct Dataset {
    pub filenames: Vec<String>,
    pub features: FeatureBatch,
    pub labels: Vec<ArrowFlags>,
}

impl Dataset {
    /// Load every cutout of `use_case` from `cutout_dir`, in store order.
    /// Clouds are floor-filtered and voxelized in parallel; the first
    /// unreadable cutout fails the whole load.
    pub fn load(
        store: &LabelStore,
        cutout_dir: impl AsRef<Path>,
        use_case: UseCase,
        voxel_size: f32,
        floor: f32,
    ) -> Result<Dataset> {
        let dir = cutout_dir.as_ref();
        let records: Vec<_> = store.by_use_case(use_case).collect();
        let maps: Vec<DMatrix<f32>> = records
            .par_iter()
            .map(|r| {
                let cloud = open_for_labeling(dir.join(&r.filename), floor)?;
                Ok(heightmap(&cloud, voxel_size).values)
            })
            .collect::<Result<_>>()?;

        let features = prepare(maps);
        let (n, rows, cols) = features.shape();
        info!("dataset {use_case}: {n} samples of {rows}x{cols} from {}", dir.display());
        Ok(Dataset {
            filenames: records.iter().map(|r| r.filename.clone()).collect(),
            features,
            labels: records.iter().map(|r| r.flags).collect(),
        })
    }

    pub fn len(&self) -> usize { self.labels.len() }
    pub fn is_empty(&self) -> bool { self.labels.is_empty() }

    /// Label rows as 0/1 vectors in arrow order.
    pub fn targets(&self) -> Vec<[f32; 8]> {
        self.labels.iter().map(|f| f.to_target()).collect()
    }

    /// Subset in the given index order, e.g. one side of a random split.
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            filenames: indices.iter().map(|&i| self.filenames[i].clone()).collect(),
            features: self.features.select(indices),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }
}
