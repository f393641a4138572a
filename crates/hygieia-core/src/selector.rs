//! Test selection: an explicit state machine that picks the statistically
//! appropriate group-comparison test and records why.
//!
//! States: `NormalityCheck → {ParametricTest, NonParametricTest} → Done`,
//! or `Insufficient → Unavailable`. The pre-check (Jarque-Bera normality
//! per group at α = 0.05, Levene variance homogeneity, minimum group size)
//! decides the branch up front: the selector never chooses a test by
//! catching a failure, and it never fabricates a statistic when the data
//! cannot support one. The transition reason is part of the output so the
//! decision can be audited without re-deriving it.

use serde::Serialize;

use hygieia_stats::{StatTest, jarque_bera, kruskal_wallis, levene, one_way_anova};

use crate::groups::{GroupedScores, Metric};

/// Significance level for the assumption pre-checks.
pub const PRECHECK_ALPHA: f64 = 0.05;

/// Minimum observations per group for the normality check to be meaningful.
const MIN_GROUP_FOR_NORMALITY: usize = 3;

/// Which comparison branch executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TestBranch {
    /// One-way ANOVA.
    Parametric,
    /// Kruskal-Wallis.
    NonParametric,
}

/// Labeled result of the selection process for one metric.
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub metric: String,
    pub outcome: TestOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TestOutcome {
    Completed {
        branch: TestBranch,
        test_name: String,
        statistic: f64,
        /// Always in [0, 1].
        p_value: f64,
        /// Why this branch was selected.
        rationale: String,
    },
    Unavailable {
        reason: String,
    },
}

impl TestResult {
    pub fn p_value(&self) -> Option<f64> {
        match &self.outcome {
            TestOutcome::Completed { p_value, .. } => Some(*p_value),
            TestOutcome::Unavailable { .. } => None,
        }
    }

    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value().is_some_and(|p| p < alpha)
    }
}

/// Selector states. The machine is linear: each run visits `NormalityCheck`
/// at most once and terminates in `Done` or `Unavailable`.
#[derive(Debug, Clone)]
enum State {
    NormalityCheck,
    ParametricTest { rationale: String },
    NonParametricTest { rationale: String },
    Unavailable { reason: String },
}

/// Run selection for one metric over a grouped partition.
pub fn select_and_run(grouped: &GroupedScores, metric: Metric) -> TestResult {
    let groups: Vec<&[f64]> = grouped
        .metric_groups(metric)
        .into_iter()
        .filter(|g| !g.is_empty())
        .collect();
    let keys: Vec<i64> = grouped
        .buckets
        .iter()
        .filter(|b| !b.values(metric).is_empty())
        .map(|b| b.key)
        .collect();

    // Entry condition: at least two groups with at least one observation.
    let mut state = if groups.len() < 2 {
        State::Unavailable {
            reason: format!(
                "insufficient groups: need at least 2 with observations, found {}",
                groups.len()
            ),
        }
    } else {
        State::NormalityCheck
    };

    loop {
        state = match state {
            State::NormalityCheck => precheck(&groups, &keys),
            State::ParametricTest { rationale } => {
                let test = one_way_anova(&groups);
                log::debug!("{metric}: parametric branch ({rationale})");
                return completed(metric, TestBranch::Parametric, test, rationale);
            }
            State::NonParametricTest { rationale } => {
                let test = kruskal_wallis(&groups);
                log::debug!("{metric}: non-parametric branch ({rationale})");
                return completed(metric, TestBranch::NonParametric, test, rationale);
            }
            State::Unavailable { reason } => {
                log::debug!("{metric}: unavailable ({reason})");
                return TestResult {
                    metric: metric.name().to_string(),
                    outcome: TestOutcome::Unavailable { reason },
                };
            }
        };
    }
}

/// The `NormalityCheck` state: decide the branch and assemble the rationale.
fn precheck(groups: &[&[f64]], keys: &[i64]) -> State {
    let mut violations: Vec<String> = Vec::new();

    for (g, key) in groups.iter().zip(keys) {
        if g.len() < MIN_GROUP_FOR_NORMALITY {
            violations.push(format!(
                "group {key} has {} observation(s), fewer than {MIN_GROUP_FOR_NORMALITY}",
                g.len()
            ));
            continue;
        }
        let normality = jarque_bera(g);
        match normality.p_value {
            Some(p) if p < PRECHECK_ALPHA => {
                violations.push(format!("group {key} fails normality (Jarque-Bera p={p:.4})"));
            }
            Some(_) => {}
            None => {
                violations.push(format!(
                    "group {key} normality not assessable ({})",
                    normality.details
                ));
            }
        }
    }

    let homogeneity = levene(groups);
    match homogeneity.p_value {
        Some(p) if p < PRECHECK_ALPHA => {
            violations.push(format!("variances are heterogeneous (Levene p={p:.4})"));
        }
        Some(_) => {}
        None => {
            violations.push(format!(
                "variance homogeneity not assessable ({})",
                homogeneity.details
            ));
        }
    }

    if violations.is_empty() {
        State::ParametricTest {
            rationale: format!(
                "all {} groups pass Jarque-Bera normality and Levene homogeneity at α={PRECHECK_ALPHA}",
                groups.len()
            ),
        }
    } else {
        State::NonParametricTest {
            rationale: violations.join("; "),
        }
    }
}

/// Wrap a finished comparison. An uncomputable test becomes `Unavailable`
/// rather than a default statistic.
fn completed(metric: Metric, branch: TestBranch, test: StatTest, rationale: String) -> TestResult {
    let outcome = match test.p_value {
        Some(p) => TestOutcome::Completed {
            branch,
            test_name: test.name,
            statistic: test.statistic,
            p_value: p.clamp(0.0, 1.0),
            rationale,
        },
        None => TestOutcome::Unavailable {
            reason: format!("{} could not be computed: {}", test.name, test.details),
        },
    };
    TestResult {
        metric: metric.name().to_string(),
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::{GroupBucket, GroupedScores};

    fn grouped_from(knowledge: Vec<(i64, Vec<f64>)>) -> GroupedScores {
        GroupedScores {
            group_field: "maternal_education".to_string(),
            buckets: knowledge
                .into_iter()
                .map(|(key, values)| GroupBucket {
                    key,
                    practice: values.clone(),
                    knowledge: values,
                })
                .collect(),
            excluded_missing_key: 0,
        }
    }

    /// Near-normal observations from summed LCG uniforms.
    fn normalish(n: usize, seed: u64, shift: f64) -> Vec<f64> {
        let mut state = seed;
        let mut next = || {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 11) as f64 / (1u64 << 53) as f64
        };
        (0..n)
            .map(|_| (0..12).map(|_| next()).sum::<f64>() - 6.0 + shift)
            .collect()
    }

    #[test]
    fn test_single_group_is_unavailable() {
        let grouped = grouped_from(vec![(1, vec![1.0, 2.0, 3.0])]);
        let result = select_and_run(&grouped, Metric::Knowledge);
        match &result.outcome {
            TestOutcome::Unavailable { reason } => {
                assert!(reason.contains("insufficient groups"), "{reason}");
            }
            other => panic!("expected Unavailable, got {other:?}"),
        }
        assert_eq!(result.p_value(), None);
    }

    #[test]
    fn test_no_groups_is_unavailable() {
        let grouped = grouped_from(vec![]);
        let result = select_and_run(&grouped, Metric::Practice);
        assert!(matches!(result.outcome, TestOutcome::Unavailable { .. }));
    }

    #[test]
    fn test_clean_normal_groups_take_parametric_branch() {
        let grouped = grouped_from(vec![
            (1, normalish(60, 101, 0.0)),
            (2, normalish(60, 102, 0.2)),
            (3, normalish(60, 103, 0.4)),
        ]);
        let result = select_and_run(&grouped, Metric::Knowledge);
        match &result.outcome {
            TestOutcome::Completed { branch, test_name, p_value, rationale, .. } => {
                assert_eq!(*branch, TestBranch::Parametric);
                assert_eq!(test_name, "One-way ANOVA");
                assert!((0.0..=1.0).contains(p_value));
                assert!(rationale.contains("pass"), "{rationale}");
            }
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[test]
    fn test_small_group_forces_non_parametric() {
        // Five groups, four well-populated and near-normal, one singleton.
        // Scenario: the singleton alone must route to Kruskal-Wallis.
        let grouped = grouped_from(vec![
            (1, normalish(40, 201, 0.0)),
            (2, normalish(40, 202, 0.0)),
            (3, normalish(40, 203, 0.0)),
            (4, normalish(40, 204, 0.0)),
            (5, vec![3.0]),
        ]);
        let result = select_and_run(&grouped, Metric::Knowledge);
        match &result.outcome {
            TestOutcome::Completed { branch, test_name, rationale, .. } => {
                assert_eq!(*branch, TestBranch::NonParametric);
                assert_eq!(test_name, "Kruskal-Wallis");
                assert!(rationale.contains("fewer than 3"), "{rationale}");
            }
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[test]
    fn test_non_normal_group_forces_non_parametric() {
        // One group heavily skewed (squared values).
        let skewed: Vec<f64> = normalish(60, 301, 0.0).iter().map(|v| v * v).collect();
        let grouped = grouped_from(vec![
            (1, normalish(60, 302, 0.0)),
            (2, skewed),
        ]);
        let result = select_and_run(&grouped, Metric::Knowledge);
        match &result.outcome {
            TestOutcome::Completed { branch, rationale, .. } => {
                assert_eq!(*branch, TestBranch::NonParametric);
                assert!(rationale.contains("normality"), "{rationale}");
            }
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[test]
    fn test_identical_values_everywhere_is_unavailable() {
        let grouped = grouped_from(vec![
            (1, vec![2.0, 2.0, 2.0]),
            (2, vec![2.0, 2.0, 2.0]),
        ]);
        let result = select_and_run(&grouped, Metric::Knowledge);
        // Constant groups cannot be tested; the selector reports that
        // instead of inventing a statistic.
        assert!(matches!(result.outcome, TestOutcome::Unavailable { .. }));
    }

    #[test]
    fn test_p_value_always_in_unit_interval() {
        let cases = vec![
            grouped_from(vec![(1, normalish(30, 401, 0.0)), (2, normalish(30, 402, 3.0))]),
            grouped_from(vec![(1, vec![1.0, 2.0]), (2, vec![9.0, 8.0])]),
            grouped_from(vec![
                (1, normalish(10, 403, 0.0)),
                (2, normalish(10, 404, 0.0)),
                (3, normalish(10, 405, 0.0)),
            ]),
        ];
        for grouped in &cases {
            for metric in Metric::ALL {
                let result = select_and_run(grouped, metric);
                if let Some(p) = result.p_value() {
                    assert!((0.0..=1.0).contains(&p));
                }
            }
        }
    }
}
