//! Native Random Forest evaluation
//!
//! Reads the flat per-tree arrays of a fitted scikit-learn forest
//! (`children_left`, `children_right`, `feature`, `threshold`, `value`)
//! exported as JSON. Each tree votes with its leaf's class distribution;
//! the forest averages them, as `predict_proba` does.

use serde::{Deserialize, Serialize};

use crate::error::InferenceError;
use crate::features::{layout, FEATURE_COUNT};
use crate::prediction::{ClassDistribution, StudentOutcome};
use super::inference::{Classifier, ModelBackend, ModelMetadata};

/// Marker for "no child" in the exported arrays
pub const TREE_LEAF: i64 = -1;

// ============================================================================
// ARTIFACT FORMAT
// ============================================================================

/// On-disk forest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestArtifact {
    /// Class labels in the order of each leaf's `value` entries
    pub classes: Vec<String>,
    /// Column names the forest was fitted on, if exported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    pub trees: Vec<TreeArtifact>,
}

/// One fitted tree in flat array form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeArtifact {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class counts or fractions
    pub value: Vec<Vec<f64>>,
}

// ============================================================================
// COMPILED FOREST
// ============================================================================

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Normalised distribution in canonical class order
    Leaf([f64; 3]),
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn leaf(&self, x: &[f64; FEATURE_COUNT]) -> &[f64; 3] {
        let mut i = 0;
        loop {
            match &self.nodes[i] {
                Node::Leaf(dist) => return dist,
                Node::Split { feature, threshold, left, right } => {
                    // Inputs are compared at float32 precision, like the fitted estimator
                    let value = f64::from(x[*feature] as f32);
                    i = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// Validated forest ready for scoring
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<Tree>,
    metadata: ModelMetadata,
}

impl RandomForest {
    /// Parse and validate a JSON artifact
    pub fn from_slice(bytes: &[u8], source: impl Into<String>) -> Result<Self, InferenceError> {
        let artifact: ForestArtifact = serde_json::from_slice(bytes)?;
        Self::compile(artifact, source.into(), bytes)
    }

    pub fn from_artifact(artifact: ForestArtifact, source: impl Into<String>) -> Result<Self, InferenceError> {
        let bytes = serde_json::to_vec(&artifact)?;
        Self::compile(artifact, source.into(), &bytes)
    }

    fn compile(artifact: ForestArtifact, source: String, bytes: &[u8]) -> Result<Self, InferenceError> {
        let class_map = class_map(&artifact.classes)?;

        if let Some(names) = &artifact.feature_names {
            let as_requests = names.len() == FEATURE_COUNT
                && names.iter().zip(layout::FEATURE_LAYOUT.iter()).all(|(n, s)| n == s.name);
            if !layout::matches_columns(names) && !as_requests {
                log::warn!("Rejecting forest fitted on a different feature layout");
                return Err(InferenceError::Format(
                    "feature_names do not match the student feature layout".to_string(),
                ));
            }
        }

        if artifact.trees.is_empty() {
            return Err(InferenceError::Format("forest has no trees".to_string()));
        }

        let trees = artifact
            .trees
            .iter()
            .enumerate()
            .map(|(t, tree)| {
                compile_tree(tree, &class_map)
                    .map_err(|msg| InferenceError::Format(format!("tree {}: {}", t, msg)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let metadata = ModelMetadata::new(source, ModelBackend::Forest, Some(trees.len()), bytes);

        Ok(Self { trees, metadata })
    }

    pub fn n_estimators(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for RandomForest {
    fn predict_proba(&self, features: &[f64; FEATURE_COUNT]) -> Result<ClassDistribution, InferenceError> {
        let mut sum = [0.0f64; 3];
        for tree in &self.trees {
            let dist = tree.leaf(features);
            for (acc, p) in sum.iter_mut().zip(dist.iter()) {
                *acc += p;
            }
        }

        let n = self.trees.len() as f64;
        Ok(ClassDistribution(sum.map(|s| s / n)))
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Map artifact class positions to canonical indices
fn class_map(classes: &[String]) -> Result<[usize; 3], InferenceError> {
    if classes.len() != 3 {
        return Err(InferenceError::Format(format!(
            "expected 3 classes, found {}",
            classes.len()
        )));
    }

    let mut map = [0usize; 3];
    let mut seen = [false; 3];
    for (slot, label) in map.iter_mut().zip(classes.iter()) {
        let class = StudentOutcome::parse(label)
            .ok_or_else(|| InferenceError::Format(format!("unknown class '{}'", label)))?;
        if seen[class.index()] {
            return Err(InferenceError::Format(format!("duplicate class '{}'", label)));
        }
        seen[class.index()] = true;
        *slot = class.index();
    }

    Ok(map)
}

fn compile_tree(tree: &TreeArtifact, class_map: &[usize; 3]) -> Result<Tree, String> {
    let n = tree.children_left.len();
    if n == 0 {
        return Err("tree has no nodes".to_string());
    }
    if tree.children_right.len() != n
        || tree.feature.len() != n
        || tree.threshold.len() != n
        || tree.value.len() != n
    {
        return Err("node arrays have different lengths".to_string());
    }

    let child = |raw: i64, parent: usize| -> Result<usize, String> {
        // Children always come after their parent, which rules out cycles
        usize::try_from(raw)
            .ok()
            .filter(|c| *c > parent && *c < n)
            .ok_or_else(|| format!("node {} has invalid child {}", parent, raw))
    };

    let mut nodes = Vec::with_capacity(n);
    for i in 0..n {
        let left = tree.children_left[i];
        let right = tree.children_right[i];

        if left == TREE_LEAF {
            if right != TREE_LEAF {
                return Err(format!("node {} has only one child", i));
            }
            nodes.push(Node::Leaf(leaf_distribution(&tree.value[i], class_map, i)?));
            continue;
        }

        let feature = usize::try_from(tree.feature[i])
            .ok()
            .filter(|f| *f < FEATURE_COUNT)
            .ok_or_else(|| format!("node {} splits on unknown feature {}", i, tree.feature[i]))?;
        let threshold = tree.threshold[i];
        if !threshold.is_finite() {
            return Err(format!("node {} has a non-finite threshold", i));
        }

        nodes.push(Node::Split {
            feature,
            threshold,
            left: child(left, i)?,
            right: child(right, i)?,
        });
    }

    Ok(Tree { nodes })
}

fn leaf_distribution(value: &[f64], class_map: &[usize; 3], node: usize) -> Result<[f64; 3], String> {
    if value.len() != 3 {
        return Err(format!("leaf {} has {} class values", node, value.len()));
    }
    if value.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(format!("leaf {} has invalid class values", node));
    }

    let total: f64 = value.iter().sum();
    if total <= 0.0 {
        return Err(format!("leaf {} is empty", node));
    }

    let mut dist = [0.0f64; 3];
    for (j, v) in value.iter().enumerate() {
        dist[class_map[j]] = v / total;
    }
    Ok(dist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stump(feature: i64, threshold: f64, left: [f64; 3], right: [f64; 3]) -> TreeArtifact {
        TreeArtifact {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![feature, -2, -2],
            threshold: vec![threshold, -2.0, -2.0],
            value: vec![vec![1.0, 1.0, 1.0], left.to_vec(), right.to_vec()],
        }
    }

    fn artifact(trees: Vec<TreeArtifact>) -> ForestArtifact {
        ForestArtifact {
            classes: vec!["Dropout".into(), "Enrolled".into(), "Graduate".into()],
            feature_names: None,
            trees,
        }
    }

    fn row_with(index: usize, value: f64) -> [f64; FEATURE_COUNT] {
        let mut row = [0.0; FEATURE_COUNT];
        row[index] = value;
        row
    }

    #[test]
    fn test_stump_routes_on_threshold() {
        let forest = RandomForest::from_artifact(
            artifact(vec![stump(13, 0.5, [8.0, 1.0, 1.0], [0.0, 2.0, 8.0])]),
            "memory",
        )
        .unwrap();

        let left = forest.predict_proba(&row_with(13, 0.0)).unwrap();
        assert_eq!(left.0, [0.8, 0.1, 0.1]);

        let right = forest.predict_proba(&row_with(13, 1.0)).unwrap();
        assert_eq!(right.0, [0.0, 0.2, 0.8]);
    }

    #[test]
    fn test_threshold_is_inclusive_on_the_left() {
        let forest = RandomForest::from_artifact(
            artifact(vec![stump(22, 10.5, [1.0, 0.0, 0.0], [0.0, 0.0, 1.0])]),
            "memory",
        )
        .unwrap();

        assert_eq!(forest.predict_proba(&row_with(22, 10.5)).unwrap().0, [1.0, 0.0, 0.0]);
        assert_eq!(forest.predict_proba(&row_with(22, 10.6)).unwrap().0, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_forest_averages_trees() {
        let forest = RandomForest::from_artifact(
            artifact(vec![
                stump(13, 0.5, [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
                stump(13, 0.5, [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
            ]),
            "memory",
        )
        .unwrap();

        assert_eq!(forest.n_estimators(), 2);
        assert_eq!(forest.predict_proba(&row_with(13, 0.0)).unwrap().0, [0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_classes_are_remapped_to_canonical_order() {
        let mut a = artifact(vec![stump(0, 0.5, [6.0, 3.0, 1.0], [6.0, 3.0, 1.0])]);
        a.classes = vec!["Graduate".into(), "Dropout".into(), "Enrolled".into()];
        let forest = RandomForest::from_artifact(a, "memory").unwrap();

        let dist = forest.predict_proba(&[0.0; FEATURE_COUNT]).unwrap();
        assert_eq!(dist.get(StudentOutcome::Graduate), 0.6);
        assert_eq!(dist.get(StudentOutcome::Dropout), 0.3);
        assert_eq!(dist.get(StudentOutcome::Enrolled), 0.1);
    }

    #[test]
    fn test_from_slice_reads_json_and_records_checksum() {
        let doc = json!({
            "classes": ["Dropout", "Enrolled", "Graduate"],
            "trees": [{
                "children_left": [-1],
                "children_right": [-1],
                "feature": [-2],
                "threshold": [-2.0],
                "value": [[1.0, 1.0, 2.0]]
            }]
        });
        let bytes = serde_json::to_vec(&doc).unwrap();
        let forest = RandomForest::from_slice(&bytes, "forest.json").unwrap();

        let meta = forest.metadata();
        assert_eq!(meta.backend, ModelBackend::Forest);
        assert_eq!(meta.n_estimators, Some(1));
        assert_eq!(meta.model_path, "forest.json");
        assert_eq!(meta.checksum, super::super::inference::checksum(&bytes));
        assert_eq!(forest.predict_proba(&[0.0; FEATURE_COUNT]).unwrap().0, [0.25, 0.25, 0.5]);
    }

    #[test]
    fn test_rejects_wrong_classes() {
        let mut a = artifact(vec![stump(0, 0.5, [1.0, 0.0, 0.0], [0.0, 0.0, 1.0])]);
        a.classes = vec!["Dropout".into(), "Dropout".into(), "Graduate".into()];
        assert!(RandomForest::from_artifact(a.clone(), "m").is_err());

        a.classes = vec!["Dropout".into(), "Graduate".into()];
        assert!(RandomForest::from_artifact(a, "m").is_err());
    }

    #[test]
    fn test_rejects_foreign_feature_names() {
        let mut a = artifact(vec![stump(0, 0.5, [1.0, 0.0, 0.0], [0.0, 0.0, 1.0])]);
        a.feature_names = Some(vec!["cpu_percent".into()]);
        assert!(RandomForest::from_artifact(a.clone(), "m").is_err());

        a.feature_names = Some(layout::FEATURE_LAYOUT.iter().map(|s| s.column.to_string()).collect());
        assert!(RandomForest::from_artifact(a, "m").is_ok());
    }

    #[test]
    fn test_rejects_backward_child() {
        let mut tree = stump(0, 0.5, [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
        tree.children_left[0] = 0;
        let err = RandomForest::from_artifact(artifact(vec![tree]), "m").unwrap_err();
        assert!(err.to_string().contains("invalid child"));
    }

    #[test]
    fn test_rejects_out_of_range_feature() {
        let tree = stump(31, 0.5, [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
        assert!(RandomForest::from_artifact(artifact(vec![tree]), "m").is_err());
    }

    #[test]
    fn test_rejects_empty_leaf_and_empty_forest() {
        let tree = stump(0, 0.5, [0.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
        assert!(RandomForest::from_artifact(artifact(vec![tree]), "m").is_err());
        assert!(RandomForest::from_artifact(artifact(vec![]), "m").is_err());
    }

    #[test]
    fn test_rejects_ragged_arrays() {
        let mut tree = stump(0, 0.5, [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
        tree.threshold.pop();
        assert!(RandomForest::from_artifact(artifact(vec![tree]), "m").is_err());
    }
}
