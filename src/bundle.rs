//! The engine's immutable output value. Kept apart from strategy logic so
//! it can cross a serialization boundary on its own.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::classifier::{ProblemDescriptor, Tag};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

impl Step {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { title: title.into(), description: description.into(), latex: None, expression: None }
    }

    pub fn with_latex(mut self, latex: impl Into<String>) -> Self {
        self.latex = Some(latex.into());
        self
    }

    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUp {
    pub label: String,
    pub description: String,
}

/// A 2-D curve to plot alongside the solution (e.g. a quadratic's parabola).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotConfig {
    pub kind: String,
    pub expression: String,
    pub variable: String,
    #[serde(rename = "xMin")]
    pub x_min: f64,
    #[serde(rename = "xMax")]
    pub x_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionBundle {
    #[serde(rename = "type")]
    pub tag: Tag,
    pub descriptor: ProblemDescriptor,
    pub exact: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approx: Option<String>,
    #[serde(rename = "approxValue", skip_serializing_if = "Option::is_none")]
    pub approx_value: Option<f64>,
    pub steps: Vec<Step>,
    #[serde(rename = "followUps")]
    pub follow_ups: Vec<FollowUp>,
    #[serde(rename = "plotConfig", skip_serializing_if = "Option::is_none")]
    pub plot_config: Option<PlotConfig>,
    pub details: BTreeMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_builder_sets_optional_fields() {
        let step = Step::new("Simplify", "Fold constants").with_latex("3").with_expression("3");
        assert_eq!(step.latex.as_deref(), Some("3"));
        assert_eq!(step.expression.as_deref(), Some("3"));
    }

    #[test]
    fn bundle_serializes_type_as_the_tag_field() {
        let bundle = SolutionBundle {
            tag: Tag::Unknown,
            descriptor: ProblemDescriptor { tag: Tag::Unknown, metadata: Default::default() },
            exact: "3".to_string(),
            approx: Some("3".to_string()),
            approx_value: Some(3.0),
            steps: vec![],
            follow_ups: vec![],
            plot_config: None,
            details: BTreeMap::new(),
        };
        let json = serde_json::to_string(&bundle).unwrap();
        assert!(json.contains("\"type\":\"unknown\""));
        assert!(!json.contains("\"plotConfig\""));
    }
}
