//! Single-label evaluation over the eight arrow classes.
//!
//! Scores are decoded with arg-max, so a multi-flag label counts as its
//! first flagged arrow.

use graspgrid_core::Arrow;
use serde::{Deserialize, Serialize};

/// Index of the largest value, first one on ties. NaN never wins.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in scores.iter().enumerate() {
        if v.is_nan() { continue; }
        if best.map_or(true, |(_, b)| v > b) { best = Some((i, v)); }
    }
    best.map(|(i, _)| i)
}

/// Arrow with the highest score (8 scores, [`Arrow::ALL`] order).
pub fn decode(scores: &[f32]) -> Option<Arrow> {
    argmax(scores).and_then(|i| Arrow::ALL.get(i).copied())
}

/// 1.0 at the arg-max, 0.0 elsewhere.
pub fn hardmax(scores: &[f32]) -> Vec<f32> {
    let mut out = vec![0.0; scores.len()];
    if let Some(i) = argmax(scores) { out[i] = 1.0; }
    out
}

/// Fraction of matching pairs; 0 for empty input.
pub fn accuracy(truth: &[Arrow], pred: &[Arrow]) -> f32 {
    let n = truth.len().min(pred.len());
    if n == 0 { return 0.0; }
    let hits = truth.iter().zip(pred).filter(|(t, p)| t == p).count();
    hits as f32 / n as f32
}

/// Counts with rows = true class, columns = predicted class.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix(pub [[usize; 8]; 8]);

impl ConfusionMatrix {
    pub fn from_pairs(truth: &[Arrow], pred: &[Arrow]) -> Self {
        let mut m = ConfusionMatrix::default();
        for (t, p) in truth.iter().zip(pred) {
            m.0[t.index()][p.index()] += 1;
        }
        m
    }

    pub fn get(&self, truth: Arrow, pred: Arrow) -> usize { self.0[truth.index()][pred.index()] }

    pub fn total(&self) -> usize { self.0.iter().flatten().sum() }

    /// F1 of one class; 0 when precision or recall is undefined.
    pub fn f1(&self, class: Arrow) -> f32 {
        let k = class.index();
        let tp = self.0[k][k] as f32;
        let predicted: usize = (0..8).map(|r| self.0[r][k]).sum();
        let actual: usize = self.0[k].iter().sum();
        let denom = (predicted + actual) as f32;
        if denom == 0.0 { 0.0 } else { 2.0 * tp / denom }
    }

    /// Unweighted mean of the eight per-class F1 scores.
    pub fn macro_f1(&self) -> f32 {
        Arrow::ALL.iter().map(|&a| self.f1(a)).sum::<f32>() / 8.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub accuracy: f32,
    pub macro_f1: f32,
    pub confusion: ConfusionMatrix,
}

/// Decode score rows against label rows and summarize.
pub fn evaluate(labels: &[[f32; 8]], scores: &[[f32; 8]]) -> Evaluation {
    let (truth, pred): (Vec<Arrow>, Vec<Arrow>) = labels
        .iter()
        .zip(scores)
        .filter_map(|(l, s)| Some((decode(l)?, decode(s)?)))
        .unzip();
    let confusion = ConfusionMatrix::from_pairs(&truth, &pred);
    Evaluation { accuracy: accuracy(&truth, &pred), macro_f1: confusion.macro_f1(), confusion }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use Arrow::*;

    #[test]
    fn argmax_takes_first_of_ties() {
        assert_eq!(argmax(&[0.1, 0.9, 0.9, 0.2]), Some(1));
        assert_eq!(argmax(&[f32::NAN, -1.0]), Some(1));
        assert_eq!(argmax(&[]), None);
        assert_eq!(hardmax(&[0.2, 0.1, 0.7]), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn multi_flag_label_decodes_to_first_flag() {
        let mut l = [0.0; 8];
        l[Ro.index()] = 1.0;
        l[U.index()] = 1.0;
        assert_eq!(decode(&l), Some(Ro));
    }

    #[test]
    fn confusion_rows_are_truth() {
        let truth = [Lo, Lo, O, R];
        let pred = [Lo, O, O, Lo];
        let m = ConfusionMatrix::from_pairs(&truth, &pred);
        assert_eq!(m.get(Lo, O), 1);
        assert_eq!(m.get(R, Lo), 1);
        assert_eq!(m.get(O, Lo), 0);
        assert_eq!(m.total(), 4);
        assert_abs_diff_eq!(accuracy(&truth, &pred), 0.5);
    }

    #[test]
    fn macro_f1_counts_absent_classes_as_zero() {
        let truth = [Lo, O];
        let pred = [Lo, O];
        let m = ConfusionMatrix::from_pairs(&truth, &pred);
        // two perfect classes, six with zero support
        assert_abs_diff_eq!(m.macro_f1(), 2.0 / 8.0);

        let m = ConfusionMatrix::from_pairs(&[Lo, Lo, O], &[Lo, O, O]);
        // Lo: p=1, r=0.5 -> 2/3; O: p=0.5, r=1 -> 2/3
        assert_abs_diff_eq!(m.macro_f1(), (4.0 / 3.0) / 8.0, epsilon = 1e-6);
    }

    #[test]
    fn evaluate_decodes_scores() {
        let mut a = [0.0; 8];
        a[L.index()] = 1.0;
        let mut s = [0.1; 8];
        s[L.index()] = 0.8;
        let e = evaluate(&[a, a], &[s, [0.0; 8]]);
        assert_eq!(e.confusion.get(L, L), 1);
        assert_eq!(e.confusion.get(L, Lo), 1);
        assert_abs_diff_eq!(e.accuracy, 0.5);
    }
}
