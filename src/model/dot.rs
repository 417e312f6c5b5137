//! Graphviz DOT rendering of a single decision tree

use std::fmt::Write;

use super::node::Node;
use super::tree::DecisionTree;

const PALETTE: [(u8, u8, u8); 6] = [
    (229, 129, 57),
    (57, 229, 129),
    (129, 57, 229),
    (229, 57, 190),
    (57, 190, 229),
    (190, 229, 57),
];

impl DecisionTree {
    /// Render as a DOT digraph with rounded, class-colored boxes.
    ///
    /// `class_names[i]` labels tree class index `i`; missing names fall back
    /// to `y[i]`, missing feature names to `X[i]`. Numbers use two decimals.
    pub fn to_dot(&self, feature_names: &[String], class_names: &[String]) -> String {
        let mut out = String::new();
        out.push_str("digraph Tree {\n");
        out.push_str(
            "node [shape=box, style=\"filled, rounded\", color=\"black\", fontname=\"helvetica\"] ;\n",
        );
        out.push_str("edge [fontname=\"helvetica\"] ;\n");

        for (idx, node) in self.nodes.iter().enumerate() {
            let class = node.majority_class();
            let mut label = String::new();
            if let Node::Split { feature, threshold, .. } = node {
                let name = feature_names
                    .get(*feature)
                    .cloned()
                    .unwrap_or_else(|| format!("X[{}]", feature));
                let _ = write!(label, "{} <= {:.2}\\n", escape(&name), threshold);
            }
            let values: Vec<String> = node.value().iter().map(|v| v.to_string()).collect();
            let class_name = class_names
                .get(class)
                .cloned()
                .unwrap_or_else(|| format!("y[{}]", class));
            let _ = write!(
                label,
                "gini = {:.2}\\nsamples = {}\\nvalue = [{}]\\nclass = {}",
                node.impurity(),
                node.n_samples(),
                values.join(", "),
                escape(&class_name)
            );
            let _ = writeln!(
                out,
                "{} [label=\"{}\", fillcolor=\"{}\"] ;",
                idx,
                label,
                fill_color(node.value())
            );
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            if let Node::Split { left, right, .. } = node {
                if idx == 0 {
                    let _ = writeln!(out, "{} -> {} [labeldistance=2.5, labelangle=45, headlabel=\"True\"] ;", idx, left);
                    let _ = writeln!(out, "{} -> {} [labeldistance=2.5, labelangle=-45, headlabel=\"False\"] ;", idx, right);
                } else {
                    let _ = writeln!(out, "{} -> {} ;", idx, left);
                    let _ = writeln!(out, "{} -> {} ;", idx, right);
                }
            }
        }

        out.push('}');
        out.push('\n');
        out
    }
}

/// Majority-class color faded toward white as the node gets less pure
fn fill_color(counts: &[usize]) -> String {
    let total: usize = counts.iter().sum();
    if total == 0 || counts.is_empty() {
        return "#ffffff".to_string();
    }
    let mut sorted: Vec<usize> = counts.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    let first = sorted[0] as f64 / total as f64;
    let second = sorted.get(1).map_or(0.0, |&c| c as f64 / total as f64);
    let alpha = if second >= 1.0 { 0.0 } else { (first - second) / (1.0 - second) };

    let class = super::node::majority(counts);
    let (r, g, b) = PALETTE[class % PALETTE.len()];
    let blend = |c: u8| -> u8 { (alpha * c as f64 + (1.0 - alpha) * 255.0).round() as u8 };
    format!("#{:02x}{:02x}{:02x}", blend(r), blend(g), blend(b))
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tree::TreeParams;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn small_tree() -> DecisionTree {
        let columns = vec![vec![1.0, 2.0, 8.0, 9.0]];
        let params = TreeParams {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: 1,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        DecisionTree::grow(&columns, &[0, 0, 1, 1], &[0, 1, 2, 3], 2, params, &mut rng)
    }

    #[test]
    fn test_dot_has_one_line_per_node() {
        let tree = small_tree();
        let dot = tree.to_dot(&["n_age".to_string()], &["released".to_string(), "deceased".to_string()]);

        assert!(dot.starts_with("digraph Tree {"));
        assert!(dot.trim_end().ends_with('}'));
        let node_lines = dot.lines().filter(|l| l.contains("[label=")).count();
        assert_eq!(node_lines, tree.n_nodes());
        assert!(dot.contains("n_age <= 5.00"));
        assert!(dot.contains("class = deceased"));
        assert!(dot.contains("0 -> 1 [labeldistance=2.5, labelangle=45, headlabel=\"True\"]"));
    }

    #[test]
    fn test_missing_names_fall_back_to_indices() {
        let dot = small_tree().to_dot(&[], &[]);
        assert!(dot.contains("X[0] <= 5.00"));
        assert!(dot.contains("class = y[0]"));
    }

    #[test]
    fn test_fill_color_purity() {
        assert_eq!(fill_color(&[3, 0]), "#e58139");
        assert_eq!(fill_color(&[2, 2]), "#ffffff");
        assert_eq!(fill_color(&[]), "#ffffff");
    }
}
