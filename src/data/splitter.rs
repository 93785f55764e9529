// ============================================================
// Layer 4 — Stratified Splitter
// ============================================================
// Partitions a normalized table by its target column.
//
//   stratified_kfolds → k (train, test) folds; every row lands in
//                       exactly one test partition
//   stratified_split  → one (train, test) split at a test proportion
//
// Both keep each class's share of the rows roughly equal across
// partitions, and both refuse to return a test partition that is
// missing any class of the full table.
//
// What does "stratified" mean?
//   If 30% of all rows are class "b", every test partition should
//   also be about 30% "b". A plain random split can put most of a
//   small class into one fold and none into another, and a model
//   scored on a fold without class "b" says nothing about "b".
//
// Why k folds?
//   Each row is tested exactly once across the k folds, so a model
//   is scored on every row while never being trained on the row it
//   is scored on.
//
// K-fold assignment:
//   1. Encode labels by first appearance and sort them
//   2. Deal the sorted labels round-robin over the k folds; this
//      fixes how many rows of each class every fold receives
//   3. For each class, shuffle its list of fold ids with a seeded
//      RNG and hand them to the class's rows in row order
//
// Rows keep their original order inside every partition.
//
// Reference: rand crate documentation (SeedableRng, SliceRandom)

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::domain::{error::PrepError, fold::Fold, table::Table};

pub const DEFAULT_NUM_FOLDS: usize = 5;
/// Seed for k-fold assignment unless configured otherwise.
pub const DEFAULT_KFOLD_SEED: u64 = 123;
/// Seed for the single train/test split unless configured otherwise.
pub const DEFAULT_SPLIT_SEED: u64 = 42;
pub const DEFAULT_TEST_SIZE: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KFoldOptions {
    pub num_folds: usize,
    pub shuffle:   bool,
    pub seed:      u64,
}

impl Default for KFoldOptions {
    fn default() -> Self {
        Self { num_folds: DEFAULT_NUM_FOLDS, shuffle: true, seed: DEFAULT_KFOLD_SEED }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitOptions {
    /// Proportion of rows placed in the test partition, in (0, 1)
    pub test_size: f64,
    pub seed:      u64,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self { test_size: DEFAULT_TEST_SIZE, seed: DEFAULT_SPLIT_SEED }
    }
}

/// Target labels encoded as class indices in order of first appearance.
struct Labels<'a> {
    classes: Vec<&'a str>,
    encoded: Vec<usize>,
    counts:  Vec<usize>,
}

impl<'a> Labels<'a> {
    fn from_table(table: &'a Table, target: &str) -> Result<Self, PrepError> {
        let idx = table.require_column(target)?;

        let mut classes: Vec<&str> = Vec::new();
        let mut counts = Vec::new();
        let mut encoded = Vec::with_capacity(table.n_rows());

        for (row, cell) in table.column(idx).enumerate() {
            let label = cell.ok_or_else(|| PrepError::MissingLabel {
                column: target.to_string(),
                row,
            })?;
            let class = match classes.iter().position(|&c| c == label) {
                Some(k) => k,
                None => {
                    classes.push(label);
                    counts.push(0);
                    classes.len() - 1
                }
            };
            counts[class] += 1;
            encoded.push(class);
        }

        Ok(Self { classes, encoded, counts })
    }

    fn rows_of(&self, class: usize) -> impl Iterator<Item = usize> + '_ {
        self.encoded
            .iter()
            .enumerate()
            .filter(move |(_, c)| **c == class)
            .map(|(row, _)| row)
    }

    /// Fail with the names of every class absent from `test_rows`.
    fn ensure_all_present(&self, test_rows: &[usize], fold: usize) -> Result<(), PrepError> {
        let mut seen = vec![false; self.classes.len()];
        for &row in test_rows {
            seen[self.encoded[row]] = true;
        }
        let missing: Vec<String> = self
            .classes
            .iter()
            .zip(&seen)
            .filter(|(_, present)| !**present)
            .map(|(class, _)| class.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PrepError::MissingClasses { fold, missing })
        }
    }
}

// ─── K-fold ───────────────────────────────────────────────────────────────────

/// Split `table` into `opts.num_folds` stratified (train, test) folds.
///
/// # Errors
/// * `InvalidSplit` if fewer than 2 folds are requested or no class has
///   as many rows as there are folds
/// * `MissingLabel` if a target cell is missing
/// * `MissingClasses` as soon as one test fold lacks a class
pub fn stratified_kfolds(
    table:  &Table,
    target: &str,
    opts:   &KFoldOptions,
) -> Result<Vec<Fold>, PrepError> {
    let labels = Labels::from_table(table, target)?;

    if opts.num_folds < 2 {
        return Err(PrepError::InvalidSplit(format!(
            "at least 2 folds are required, got {}",
            opts.num_folds
        )));
    }
    let largest = labels.counts.iter().copied().max().unwrap_or(0);
    if opts.num_folds > largest {
        return Err(PrepError::InvalidSplit(format!(
            "{} folds requested but the largest class has {} rows",
            opts.num_folds, largest
        )));
    }

    let test_fold_of = assign_test_folds(&labels, opts);

    let mut folds = Vec::with_capacity(opts.num_folds);
    for fold in 0..opts.num_folds {
        let (test_rows, train_rows): (Vec<usize>, Vec<usize>) =
            (0..table.n_rows()).partition(|&row| test_fold_of[row] == fold);

        labels.ensure_all_present(&test_rows, fold)?;

        tracing::debug!(
            "Fold {}: {} train rows, {} test rows",
            fold,
            train_rows.len(),
            test_rows.len()
        );
        folds.push(Fold::new(table.select_rows(&train_rows), table.select_rows(&test_rows)));
    }

    Ok(folds)
}

/// For every row, the fold in which it is used as a test row.
fn assign_test_folds(labels: &Labels, opts: &KFoldOptions) -> Vec<usize> {
    let n_classes = labels.classes.len();

    let mut sorted = labels.encoded.clone();
    sorted.sort_unstable();

    // Dealt like cards: with 12 "a" and 8 "b" over 5 folds, folds 0-1
    // test three "a" rows and folds 2-4 test two. The "b" rows carry
    // on the deal from fold 2, so every fold ends up testing four rows.
    // allocation[fold][class] = rows of `class` tested in `fold`
    let mut allocation = vec![vec![0usize; n_classes]; opts.num_folds];
    for (pos, &class) in sorted.iter().enumerate() {
        allocation[pos % opts.num_folds][class] += 1;
    }

    let mut rng          = StdRng::seed_from_u64(opts.seed);
    let mut test_fold_of = vec![0usize; labels.encoded.len()];

    for class in 0..n_classes {
        let mut fold_ids: Vec<usize> = (0..opts.num_folds)
            .flat_map(|fold| std::iter::repeat(fold).take(allocation[fold][class]))
            .collect();
        if opts.shuffle {
            fold_ids.shuffle(&mut rng);
        }
        for (row, fold) in labels.rows_of(class).zip(fold_ids) {
            test_fold_of[row] = fold;
        }
    }

    test_fold_of
}

// ─── Single split ─────────────────────────────────────────────────────────────

/// One stratified (train, test) split.
///
/// The test partition holds `ceil(test_size * rows)` rows, shared out
/// over the classes in proportion to their size.
pub fn stratified_split(
    table:  &Table,
    target: &str,
    opts:   &SplitOptions,
) -> Result<Fold, PrepError> {
    if !(opts.test_size > 0.0 && opts.test_size < 1.0) {
        return Err(PrepError::InvalidSplit(format!(
            "test_size must be between 0 and 1, got {}",
            opts.test_size
        )));
    }

    let labels    = Labels::from_table(table, target)?;
    let n_rows    = table.n_rows();
    let n_classes = labels.classes.len();
    let n_test    = ((opts.test_size * n_rows as f64).ceil() as usize).min(n_rows);
    let n_train   = n_rows - n_test;

    if n_test < n_classes || n_train < n_classes {
        return Err(PrepError::InvalidSplit(format!(
            "{n_rows} rows give {n_train} train and {n_test} test rows, \
             fewer than the {n_classes} classes"
        )));
    }

    let per_class = allocate_proportionally(&labels.counts, n_test);

    let mut rng     = StdRng::seed_from_u64(opts.seed);
    let mut is_test = vec![false; n_rows];
    for (class, &take) in per_class.iter().enumerate() {
        let mut rows: Vec<usize> = labels.rows_of(class).collect();
        rows.shuffle(&mut rng);
        for &row in rows.iter().take(take) {
            is_test[row] = true;
        }
    }

    let (test_rows, train_rows): (Vec<usize>, Vec<usize>) =
        (0..n_rows).partition(|&row| is_test[row]);
    labels.ensure_all_present(&test_rows, 0)?;

    tracing::debug!("Split: {} train rows, {} test rows", train_rows.len(), test_rows.len());
    Ok(Fold::new(table.select_rows(&train_rows), table.select_rows(&test_rows)))
}

/// Share `total` out over classes in proportion to `counts`, handing the
/// leftover units to the largest fractional remainders first.
fn allocate_proportionally(counts: &[usize], total: usize) -> Vec<usize> {
    let n: usize = counts.iter().sum();
    if n == 0 {
        return vec![0; counts.len()];
    }

    let mut alloc: Vec<usize> = counts.iter().map(|&c| c * total / n).collect();
    let mut remaining = total.saturating_sub(alloc.iter().sum());

    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by_key(|&k| std::cmp::Reverse(counts[k] * total % n));

    for k in order {
        if remaining == 0 {
            break;
        }
        if alloc[k] < counts[k] {
            alloc[k] += 1;
            remaining -= 1;
        }
    }
    alloc
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    /// A table with an `id` column 0..n and a `class` column from `labels`.
    fn labelled(labels: &[&str]) -> Table {
        let rows = labels
            .iter()
            .enumerate()
            .map(|(i, l)| vec![Some(i.to_string()), Some(l.to_string())])
            .collect();
        Table::new(vec!["id".into(), "class".into()], rows).unwrap()
    }

    fn ids(t: &Table) -> Vec<usize> {
        t.column(0).map(|c| c.unwrap().parse().unwrap()).collect()
    }

    fn classes_in(t: &Table) -> HashSet<String> {
        t.column(1).map(|c| c.unwrap().to_string()).collect()
    }

    fn repeat_labels(class_sizes: &[(&'static str, usize)]) -> Vec<&'static str> {
        // interleave so classes are not in contiguous blocks
        let mut out = Vec::new();
        let max = class_sizes.iter().map(|(_, n)| *n).max().unwrap_or(0);
        for i in 0..max {
            for (label, n) in class_sizes {
                if i < *n {
                    out.push(*label);
                }
            }
        }
        out
    }

    #[test]
    fn test_kfold_partitions_every_row_once() {
        let labels = repeat_labels(&[("a", 12), ("b", 8), ("c", 5)]);
        let table  = labelled(&labels);
        let folds  = stratified_kfolds(&table, "class", &KFoldOptions::default()).unwrap();

        assert_eq!(folds.len(), 5);
        let mut all_test: Vec<usize> = folds.iter().flat_map(|f| ids(&f.test)).collect();
        all_test.sort_unstable();
        assert_eq!(all_test, (0..labels.len()).collect::<Vec<_>>());

        for f in &folds {
            assert_eq!(f.train.n_rows() + f.test.n_rows(), labels.len());
            let train: HashSet<usize> = ids(&f.train).into_iter().collect();
            assert!(ids(&f.test).iter().all(|id| !train.contains(id)));
        }
    }

    #[test]
    fn test_kfold_preserves_class_proportions() {
        let labels = repeat_labels(&[("a", 20), ("b", 10)]);
        let folds  = stratified_kfolds(&labelled(&labels), "class", &KFoldOptions::default()).unwrap();
        for f in &folds {
            let a = f.test.column(1).filter(|c| *c == Some("a")).count();
            let b = f.test.column(1).filter(|c| *c == Some("b")).count();
            assert_eq!((a, b), (4, 2));
        }
    }

    #[test]
    fn test_kfold_rows_keep_original_order() {
        let labels = repeat_labels(&[("a", 10), ("b", 10)]);
        let folds  = stratified_kfolds(&labelled(&labels), "class", &KFoldOptions::default()).unwrap();
        for f in &folds {
            let test = ids(&f.test);
            assert!(test.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_kfold_is_reproducible_for_a_seed() {
        let table = labelled(&repeat_labels(&[("a", 15), ("b", 10)]));
        let opts  = KFoldOptions { seed: 123, ..Default::default() };
        let one   = stratified_kfolds(&table, "class", &opts).unwrap();
        let two   = stratified_kfolds(&table, "class", &opts).unwrap();
        assert_eq!(one, two);
    }

    #[test]
    fn test_small_class_raises_missing_classes() {
        // 3 classes, k = 5, "rare" has only 2 rows
        let labels = repeat_labels(&[("a", 10), ("b", 10), ("rare", 2)]);
        let err    = stratified_kfolds(&labelled(&labels), "class", &KFoldOptions::default())
            .unwrap_err();
        match err {
            PrepError::MissingClasses { missing, .. } => assert_eq!(missing, vec!["rare"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_too_many_folds_is_invalid() {
        let table = labelled(&["a", "b", "a", "b"]);
        let err   = stratified_kfolds(&table, "class", &KFoldOptions::default()).unwrap_err();
        assert!(matches!(err, PrepError::InvalidSplit(_)));

        let one = KFoldOptions { num_folds: 1, ..Default::default() };
        assert!(matches!(
            stratified_kfolds(&table, "class", &one),
            Err(PrepError::InvalidSplit(_))
        ));
    }

    #[test]
    fn test_missing_label_is_an_error() {
        let table = Table::new(
            vec!["id".into(), "class".into()],
            vec![vec![Some("0".into()), Some("a".into())], vec![Some("1".into()), None]],
        )
        .unwrap();
        assert!(matches!(
            stratified_kfolds(&table, "class", &KFoldOptions::default()),
            Err(PrepError::MissingLabel { row: 1, .. })
        ));
    }

    #[test]
    fn test_unknown_target_column() {
        let table = labelled(&["a"]);
        assert!(matches!(
            stratified_kfolds(&table, "label", &KFoldOptions::default()),
            Err(PrepError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_split_sizes_and_stratification() {
        let labels = repeat_labels(&[("a", 60), ("b", 40)]);
        let table  = labelled(&labels);
        let fold   = stratified_split(&table, "class", &SplitOptions::default()).unwrap();

        assert_eq!(fold.test.n_rows(), 20);
        assert_eq!(fold.train.n_rows(), 80);
        let a = fold.test.column(1).filter(|c| *c == Some("a")).count();
        assert_eq!(a, 12);
        assert_eq!(classes_in(&fold.test), classes_in(&table));
    }

    #[test]
    fn test_split_rounds_test_size_up() {
        let labels = repeat_labels(&[("a", 6), ("b", 5)]);
        let fold   = stratified_split(&labelled(&labels), "class", &SplitOptions::default()).unwrap();
        // ceil(0.2 * 11) = 3
        assert_eq!(fold.test.n_rows(), 3);
        assert_eq!(fold.train.n_rows(), 8);
    }

    #[test]
    fn test_split_rejects_bad_test_size() {
        let table = labelled(&["a", "b", "a", "b"]);
        for size in [0.0, 1.0, -0.5, 1.5] {
            let opts = SplitOptions { test_size: size, ..Default::default() };
            assert!(matches!(
                stratified_split(&table, "class", &opts),
                Err(PrepError::InvalidSplit(_))
            ));
        }
    }

    #[test]
    fn test_allocate_proportionally() {
        assert_eq!(allocate_proportionally(&[60, 40], 20), vec![12, 8]);
        assert_eq!(allocate_proportionally(&[6, 5], 3), vec![2, 1]);
        assert_eq!(allocate_proportionally(&[1, 1, 1], 2).iter().sum::<usize>(), 2);
        assert_eq!(allocate_proportionally(&[], 0), Vec::<usize>::new());
    }

    proptest! {
        #[test]
        fn prop_kfold_test_partitions_cover_rows_exactly_once(
            sizes in proptest::collection::vec(5usize..15, 1..4),
            k in 2usize..=5,
            seed in any::<u64>(),
        ) {
            let names = ["a", "b", "c"];
            let class_sizes: Vec<(&'static str, usize)> =
                sizes.iter().enumerate().map(|(i, &n)| (names[i], n)).collect();
            let labels = repeat_labels(&class_sizes);
            let table  = labelled(&labels);
            let opts   = KFoldOptions { num_folds: k, shuffle: true, seed };

            let folds = stratified_kfolds(&table, "class", &opts).unwrap();
            prop_assert_eq!(folds.len(), k);

            let mut all_test: Vec<usize> = folds.iter().flat_map(|f| ids(&f.test)).collect();
            all_test.sort_unstable();
            prop_assert_eq!(all_test, (0..labels.len()).collect::<Vec<_>>());

            let every_class = classes_in(&table);
            for f in &folds {
                prop_assert_eq!(classes_in(&f.test), every_class.clone());
            }
        }
    }
}
