use graspgrid_bridge::{LabelingSession, PipelineConfig};
use graspgrid_core::{Arrow, ArrowFlags, Cloud, OffsetSet};
use graspgrid_cutout::Kernel;
use graspgrid_io::write_csv;
use graspgrid_labels::{LabelStore, UseCase};
use graspgrid_viewer::{ViewData, ViewKind};
use std::path::Path;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// 31 x 21 points on a 10 cm lattice plus three floor points
fn write_scan(path: &Path) {
    let mut c = Cloud::default();
    for i in 0..=30 {
        for j in 0..=20 {
            c.push(i as f32 * 10.0, j as f32 * 10.0, 1.0 + (i % 3) as f32);
        }
    }
    for k in 0..3 {
        c.push(k as f32, 0.0, -3.0);
    }
    write_csv(path, &c).unwrap();
}

fn close(a: [f32; 2], b: [f32; 2]) -> bool {
    (a[0] - b[0]).abs() < 1e-3 && (a[1] - b[1]).abs() < 1e-3
}

#[test]
fn open_cut_save_and_reopen() {
    init_logs();
    let dir = tempfile::tempdir().unwrap();
    let scan = dir.path().join("scan_7.csv");
    write_scan(&scan);
    let dataset = dir.path().join("dataset");

    let mut s = LabelingSession::new(PipelineConfig::default());
    assert_eq!(s.open(&scan).unwrap(), None);
    assert_eq!(s.cloud().unwrap().len(), 31 * 21);
    assert!(!s.is_cutout());

    // height map spans x in [-5, 295], y in [-5, 195]; not rotated
    match s.view(ViewKind::Heatmap { voxel_size: 10.0 }).unwrap() {
        ViewData::Heatmap(h) => {
            assert!(!h.rotated);
            assert_eq!(h.map.shape(), (21, 31));
        }
        other => panic!("unexpected view {other:?}"),
    }

    // 240 x 150 rectangle requested at the origin is pulled inside
    let drag = s.place_rect(0.0, 0.0, false).unwrap();
    let rect = drag.rect();
    assert!((rect.cx - 115.0).abs() < 1e-3 && (rect.cy - 70.0).abs() < 1e-3);

    let offsets = s.cut_drag(&drag).unwrap();
    assert!(close(offsets.center, [115.0, 70.0]));
    assert!(close(offsets.lo, [-5.0, 145.0]));
    assert_eq!(s.cloud().unwrap().len(), 24 * 15);
    assert!(s.is_cutout());
    assert!(s.cut(&drag.cut().0, false).is_err());

    let flags = ArrowFlags::from_arrows(&[Arrow::O]);
    let saved = s.save(&dataset, flags).unwrap();
    assert_eq!(saved.cutout_path, dataset.join("Cutout_3x3").join("scan_7_Cutout_3x3.csv"));
    assert_eq!(saved.use_case, UseCase::Test);

    let store = LabelStore::open(dataset.join("Cutout_3x3"), "3x3").unwrap();
    let rec = store.get("scan_7_Cutout_3x3.csv").unwrap();
    assert_eq!(rec.flags, flags);
    let stored: OffsetSet = rec.offsets.unwrap();
    assert!(close(stored.center, offsets.center));

    // reopening the cutout brings its flags back; relabel keeps split and offsets
    let mut again = LabelingSession::new(PipelineConfig::default());
    assert_eq!(again.open(&saved.cutout_path).unwrap(), Some(flags));
    assert!(again.is_cutout());
    let relabeled = ArrowFlags::from_arrows(&[Arrow::L, Arrow::U]);
    let resaved = again.save(&dataset, relabeled).unwrap();
    assert_eq!(resaved.cutout_path, saved.cutout_path);
    assert_eq!(resaved.use_case, UseCase::Test);
    let store = LabelStore::open(dataset.join("Cutout_3x3"), "3x3").unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.lookup("scan_7_Cutout_3x3.csv").unwrap(), relabeled);
    assert!(store.get("scan_7_Cutout_3x3.csv").unwrap().offsets.is_some());
}

#[test]
fn switching_kernel_reloads_the_source() {
    init_logs();
    let dir = tempfile::tempdir().unwrap();
    let scan = dir.path().join("scan.csv");
    write_scan(&scan);

    let mut s = LabelingSession::new(PipelineConfig::default());
    s.open(&scan).unwrap();
    let drag = s.place_rect(150.0, 100.0, true).unwrap();
    s.cut_drag(&drag).unwrap();
    assert!(s.cloud().unwrap().len() < 31 * 21);

    s.select_kernel(Kernel::K5X5).unwrap();
    assert_eq!(s.kernel(), Kernel::K5X5);
    assert!(!s.is_cutout());
    assert!(s.offsets().is_none());
    assert_eq!(s.cloud().unwrap().len(), 31 * 21);
    assert_eq!(s.cutout_dir(Path::new("d")), Path::new("d").join("Cutout_5x5"));
}

#[test]
fn nothing_open_or_nothing_cut_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = LabelingSession::new(PipelineConfig::default());
    assert!(s.view(ViewKind::PointCloud { sample_rate: 60 }).is_err());
    assert!(s.place_rect(0.0, 0.0, false).is_err());

    let odd = dir.path().join("scan.txt");
    std::fs::write(&odd, "1;2;3\n").unwrap();
    assert!(s.open(&odd).is_err());

    let scan = dir.path().join("scan.csv");
    write_scan(&scan);
    s.open(&scan).unwrap();
    assert!(s.save(dir.path(), ArrowFlags::default()).is_err());
}

#[test]
fn saved_cutouts_feed_the_training_sets() {
    init_logs();
    let dir = tempfile::tempdir().unwrap();
    let dataset = dir.path().join("dataset");
    let config = PipelineConfig::default();

    for k in 0..6 {
        let scan = dir.path().join(format!("scan_{k}.csv"));
        write_scan(&scan);
        let mut s = LabelingSession::new(config.clone());
        s.open(&scan).unwrap();
        let drag = s.place_rect(100.0 + k as f32 * 10.0, 100.0, false).unwrap();
        s.cut_drag(&drag).unwrap();
        s.save(&dataset, ArrowFlags::from_arrows(&[Arrow::ALL[k % 8]])).unwrap();
    }

    let cutouts = dataset.join("Cutout_3x3");
    let sets = graspgrid_bridge::load_training_sets(&cutouts, &config, 42).unwrap();
    assert_eq!(sets.train.len() + sets.valid.len(), 4);
    let test = graspgrid_bridge::load_test_set(&cutouts, &config).unwrap();
    assert_eq!(test.filenames, vec!["scan_0_Cutout_3x3.csv", "scan_5_Cutout_3x3.csv"]);
    let (n, rows, cols) = test.features.shape();
    assert_eq!(n, 2);
    assert!(rows > 0 && cols > 0);
}

#[test]
fn unstorable_name_fails_before_anything_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let scan = dir.path().join("a;b.csv");
    write_scan(&scan);
    let dataset = dir.path().join("dataset");

    let mut s = LabelingSession::new(PipelineConfig::default());
    s.open(&scan).unwrap();
    let drag = s.place_rect(150.0, 100.0, false).unwrap();
    s.cut_drag(&drag).unwrap();
    let err = s.save(&dataset, ArrowFlags::from_arrows(&[Arrow::R])).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<graspgrid_core::Error>(),
        Some(graspgrid_core::Error::InvalidRecordName(_))
    ));
    assert!(!dataset.join("Cutout_3x3").join("a;b_Cutout_3x3.csv").exists());
}
