//! Similarity clusterer — groups automation names that look like duplicates.
//!
//! The default [`cluster`] is seed-centric: each unclustered name, in
//! first-seen order, collects the names directly similar to *it*. Groups
//! are therefore not transitively closed. If `A~B` and `B~C` but not `A~C`,
//! membership depends on which name is seen first, and a name may appear in
//! more than one group. [`cluster_transitive`] is the connected-components
//! alternative and must be asked for explicitly.

use std::collections::{BTreeSet, HashSet};

use petgraph::unionfind::UnionFind;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A symmetric string similarity in `[0, 1]`, `1.0` for identical strings.
pub trait SimilarityScorer: Sync {
    fn score(&self, a: &str, b: &str) -> f64;
}

/// `2 * LCS / (|a| + |b|)` over chars: one minus the normalized
/// insertion/deletion edit distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndelRatio;

impl SimilarityScorer for IndelRatio {
    fn score(&self, a: &str, b: &str) -> f64 {
        indel_ratio(a, b)
    }
}

/// One minus the Levenshtein distance over the longer length.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedLevenshtein;

impl SimilarityScorer for NormalizedLevenshtein {
    fn score(&self, a: &str, b: &str) -> f64 {
        strsim::normalized_levenshtein(a, b)
    }
}

/// Scorer selection, as written in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScorerKind {
    #[default]
    Indel,
    Levenshtein,
}

impl SimilarityScorer for ScorerKind {
    fn score(&self, a: &str, b: &str) -> f64 {
        match self {
            Self::Indel => IndelRatio.score(a, b),
            Self::Levenshtein => NormalizedLevenshtein.score(a, b),
        }
    }
}

/// Grouping strategy, as written in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusteringMode {
    /// Seed-centric, order dependent. See [`cluster`].
    #[default]
    Seed,
    /// Connected components of the similarity graph. See [`cluster_transitive`].
    Transitive,
}

/// A set of names suspected to be duplicates of one another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarityGroup {
    /// The name the group was built around.
    pub seed: String,
    /// Every member, seed included, sorted.
    pub members: Vec<String>,
}

impl SimilarityGroup {
    fn new<'a>(seed: &str, members: impl IntoIterator<Item = &'a str>) -> Self {
        let members: BTreeSet<&str> = members.into_iter().collect();
        Self {
            seed: seed.to_string(),
            members: members.into_iter().map(str::to_string).collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|member| member == name)
    }
}

/// Similarity from the longest common subsequence, over chars.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn indel_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    (2 * lcs_len(&a, &b)) as f64 / total as f64
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Distinct names in first-seen order; blank names are dropped.
pub fn distinct_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| !name.trim().is_empty())
        .filter(|name| seen.insert(*name))
        .collect()
}

/// Group names with the strategy picked by `mode`.
pub fn cluster_with<'a, S: SimilarityScorer + ?Sized>(
    mode: ClusteringMode,
    names: impl IntoIterator<Item = &'a str>,
    scorer: &S,
    threshold: f64,
) -> Vec<SimilarityGroup> {
    match mode {
        ClusteringMode::Seed => cluster(names, scorer, threshold),
        ClusteringMode::Transitive => cluster_transitive(names, scorer, threshold),
    }
}

/// Seed-centric greedy grouping.
///
/// For each distinct name not yet in a group, every other distinct name
/// scoring at least `threshold` against it joins `{seed} ∪ candidates`.
/// The group is emitted unless all its members were already seen. Names
/// with no candidate never form a singleton group.
pub fn cluster<'a, S: SimilarityScorer + ?Sized>(
    names: impl IntoIterator<Item = &'a str>,
    scorer: &S,
    threshold: f64,
) -> Vec<SimilarityGroup> {
    let names = distinct_names(names);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut groups = Vec::new();

    for &seed in &names {
        if seen.contains(seed) {
            continue;
        }
        let candidates: Vec<&str> = names
            .par_iter()
            .copied()
            .filter(|&other| other != seed && scorer.score(seed, other) >= threshold)
            .collect();
        if candidates.is_empty() {
            continue;
        }
        let members: Vec<&str> = std::iter::once(seed).chain(candidates).collect();
        let newly_seen = members.iter().filter(|&&member| seen.insert(member)).count();
        if newly_seen > 0 {
            groups.push(SimilarityGroup::new(seed, members));
        }
    }

    groups
}

/// Connected components of the "scores at least `threshold`" graph.
///
/// Every name lands in at most one group. Groups are ordered by their
/// earliest member, which is also reported as the seed.
pub fn cluster_transitive<'a, S: SimilarityScorer + ?Sized>(
    names: impl IntoIterator<Item = &'a str>,
    scorer: &S,
    threshold: f64,
) -> Vec<SimilarityGroup> {
    let names = distinct_names(names);
    let edges: Vec<(usize, usize)> = (0..names.len())
        .into_par_iter()
        .flat_map_iter(|i| {
            let names = &names;
            ((i + 1)..names.len())
                .filter(move |&j| scorer.score(names[i], names[j]) >= threshold)
                .map(move |j| (i, j))
        })
        .collect();

    let mut sets = UnionFind::<usize>::new(names.len());
    for (i, j) in edges {
        sets.union(i, j);
    }

    let mut components: Vec<Vec<usize>> = Vec::new();
    let mut slot_of_root = vec![None; names.len()];
    for (i, root) in sets.into_labeling().into_iter().enumerate() {
        let slot = *slot_of_root[root].get_or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[slot].push(i);
    }

    components
        .into_iter()
        .filter(|members| members.len() > 1)
        .map(|members| {
            SimilarityGroup::new(names[members[0]], members.iter().map(|&i| names[i]))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::DEFAULT_SIMILARITY_THRESHOLD;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    // A~B and B~C clear 0.85 under IndelRatio, A~C does not.
    const A: &str = "abcdefghij";
    const B: &str = "abcdefghijkl";
    const C: &str = "abcdefghijklmn";

    fn group(seed: &str, members: &[&str]) -> SimilarityGroup {
        SimilarityGroup::new(seed, members.iter().copied())
    }

    #[test]
    fn should_score_identical_strings_as_one() {
        assert!((indel_ratio("Payroll Job", "Payroll Job") - 1.0).abs() < f64::EPSILON);
        assert!((indel_ratio("", "") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_score_disjoint_strings_as_zero() {
        assert!(indel_ratio("abc", "xyz").abs() < f64::EPSILON);
        assert!(indel_ratio("abc", "").abs() < f64::EPSILON);
    }

    #[test]
    fn should_score_suffixed_name_above_threshold() {
        let score = indel_ratio("Invoice Sync", "Invoice Sync v2");
        assert!((score - 24.0 / 27.0).abs() < 1e-12);
        assert!(score >= DEFAULT_SIMILARITY_THRESHOLD);
    }

    #[test]
    fn should_group_near_duplicates_and_skip_unrelated_names() {
        let names = ["Invoice Sync", "Invoice Sync v2", "Payroll Job"];
        let groups = cluster(names, &IndelRatio, DEFAULT_SIMILARITY_THRESHOLD);
        assert_eq!(
            groups,
            vec![group("Invoice Sync", &["Invoice Sync", "Invoice Sync v2"])]
        );
        assert!(!groups.iter().any(|g| g.contains("Payroll Job")));
    }

    #[test]
    fn should_collapse_duplicate_names_before_clustering() {
        let names = ["Invoice Sync", "Invoice Sync", "Payroll Job"];
        let groups = cluster(names, &IndelRatio, DEFAULT_SIMILARITY_THRESHOLD);
        assert!(groups.is_empty());
    }

    #[test]
    fn should_return_no_groups_for_empty_input() {
        let groups = cluster(std::iter::empty(), &IndelRatio, DEFAULT_SIMILARITY_THRESHOLD);
        assert!(groups.is_empty());
    }

    #[test]
    fn should_ignore_blank_names() {
        assert_eq!(distinct_names(["", "  ", "Job", "Job"]), vec!["Job"]);
    }

    #[test]
    fn should_build_seed_groups_without_transitive_closure() {
        let groups = cluster([A, B, C], &IndelRatio, DEFAULT_SIMILARITY_THRESHOLD);
        assert_eq!(groups, vec![group(A, &[A, B]), group(C, &[B, C])]);
    }

    #[test]
    fn should_depend_on_first_seen_order() {
        let groups = cluster([B, A, C], &IndelRatio, DEFAULT_SIMILARITY_THRESHOLD);
        assert_eq!(groups, vec![group(B, &[A, B, C])]);
    }

    #[test]
    fn should_close_groups_transitively_when_asked() {
        let groups = cluster_transitive([A, B, C], &IndelRatio, DEFAULT_SIMILARITY_THRESHOLD);
        assert_eq!(groups, vec![group(A, &[A, B, C])]);
    }

    #[test]
    fn should_keep_transitive_groups_disjoint_and_ordered() {
        let names = ["Payroll Job", A, "Invoice Sync", C, "Invoice Sync v2", B];
        let groups = cluster_transitive(names, &IndelRatio, DEFAULT_SIMILARITY_THRESHOLD);
        assert_eq!(
            groups,
            vec![
                group(A, &[A, B, C]),
                group("Invoice Sync", &["Invoice Sync", "Invoice Sync v2"]),
            ]
        );
    }

    #[test]
    fn should_merge_components_joined_late_in_the_edge_list() {
        let names = [A, "Payroll Job", C, B];
        let groups = cluster_transitive(names, &IndelRatio, DEFAULT_SIMILARITY_THRESHOLD);
        assert_eq!(groups, vec![group(A, &[A, B, C])]);
    }

    #[test]
    fn should_dispatch_on_clustering_mode() {
        let seed = cluster_with(ClusteringMode::Seed, [A, B, C], &ScorerKind::Indel, 0.85);
        let transitive =
            cluster_with(ClusteringMode::Transitive, [A, B, C], &ScorerKind::Indel, 0.85);
        assert_eq!(seed.len(), 2);
        assert_eq!(transitive.len(), 1);
    }

    #[test]
    fn should_score_with_levenshtein_when_selected() {
        let score = ScorerKind::Levenshtein.score("Invoice Sync", "Invoice Sync v2");
        assert!((score - 0.8).abs() < 1e-12);
    }

    #[test]
    fn should_parse_scorer_and_mode_from_lowercase() {
        let kind: ScorerKind = serde_json::from_str("\"levenshtein\"").unwrap();
        let mode: ClusteringMode = serde_json::from_str("\"transitive\"").unwrap();
        assert_eq!(kind, ScorerKind::Levenshtein);
        assert_eq!(mode, ClusteringMode::Transitive);
    }

    proptest! {
        #[test]
        fn indel_ratio_is_symmetric_and_bounded(a in "\\PC{0,24}", b in "\\PC{0,24}") {
            let ab = indel_ratio(&a, &b);
            let ba = indel_ratio(&b, &a);
            prop_assert!((ab - ba).abs() < 1e-12);
            prop_assert!((0.0..=1.0).contains(&ab));
            prop_assert!((indel_ratio(&a, &a) - 1.0).abs() < 1e-12);
        }

        #[test]
        fn levenshtein_scorer_is_symmetric(a in "[a-z ]{0,16}", b in "[a-z ]{0,16}") {
            let scorer = NormalizedLevenshtein;
            prop_assert!((scorer.score(&a, &b) - scorer.score(&b, &a)).abs() < 1e-12);
        }

        #[test]
        fn seed_groups_never_contain_singletons(names in proptest::collection::vec("[ab]{1,4}", 0..12)) {
            let groups = cluster(names.iter().map(String::as_str), &IndelRatio, 0.6);
            for g in &groups {
                prop_assert!(g.members.len() >= 2);
                prop_assert!(g.contains(&g.seed));
            }
        }
    }
}
