//! Step registry: builds the ordered normalization pipeline

use super::filter::{BlankRowFilter, ExclusionFilter};
use super::header::{HeaderReconciler, TitleRowDiscard};
use super::points::PointsReconciler;
use super::NormalizeStep;
use crate::config::NormalizeConfig;

/// Create the normalization steps in the order they must run
pub fn create_steps(config: &NormalizeConfig) -> Vec<Box<dyn NormalizeStep>> {
    vec![
        Box::new(TitleRowDiscard),
        Box::new(HeaderReconciler::new(config)),
        Box::new(PointsReconciler),
        Box::new(BlankRowFilter),
        Box::new(ExclusionFilter::new(config)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_order() {
        let steps = create_steps(&NormalizeConfig::default());
        let ids: Vec<&str> = steps.iter().map(|s| s.id()).collect();
        assert_eq!(ids, ["TITLE", "HEADER", "POINTS", "BLANK", "EXCLUDE"]);
    }
}
