// Insight Generator - Numbers Into Sentences
// Presentation logic layered on the numeric core: fixed-threshold rules
// turn overall and per-metric growth rates into ranked observations. It
// annotates, never alters, the numbers it is given.

use serde::{Deserialize, Serialize};

use crate::services::core::analytics::sampler::Metric;
use crate::utils::helpers::round_to_decimal_places;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Positive,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub message: String,
    pub priority: InsightPriority,
}

/// A metric's growth rate, input to the per-metric rules
#[derive(Debug, Clone, PartialEq)]
pub struct MetricGrowth {
    pub metric: Metric,
    pub rate: f64,
}

pub struct InsightGenerator;

impl InsightGenerator {
    /// Rules, in order:
    /// - overall `>25` positive/high, `>10` positive/medium, `<-10` warning/high
    /// - per-metric `>50` positive/medium, `<-25` warning/high
    /// - one info/low naming the fastest-growing metric (and the steepest
    ///   decline when one exists), or a no-data note when no metrics came in
    ///
    /// Output is ordered high -> medium -> low.
    pub fn generate(overall_rate: f64, per_metric: &[MetricGrowth]) -> Vec<Insight> {
        let mut insights = Vec::new();

        if overall_rate > 25.0 {
            insights.push(Insight {
                kind: InsightKind::Positive,
                message: format!(
                    "Exceptional growth: overall activity is up {}% on the previous period",
                    round_to_decimal_places(overall_rate, 2)
                ),
                priority: InsightPriority::High,
            });
        } else if overall_rate > 10.0 {
            insights.push(Insight {
                kind: InsightKind::Positive,
                message: format!(
                    "Strong growth: overall activity is up {}% on the previous period",
                    round_to_decimal_places(overall_rate, 2)
                ),
                priority: InsightPriority::Medium,
            });
        } else if overall_rate < -10.0 {
            insights.push(Insight {
                kind: InsightKind::Warning,
                message: format!(
                    "Concerning decline: overall activity is down {}% on the previous period",
                    round_to_decimal_places(overall_rate.abs(), 2)
                ),
                priority: InsightPriority::High,
            });
        }

        for mg in per_metric {
            if mg.rate > 50.0 {
                insights.push(Insight {
                    kind: InsightKind::Positive,
                    message: format!(
                        "{} surged {}% period over period",
                        mg.metric.as_str(),
                        round_to_decimal_places(mg.rate, 2)
                    ),
                    priority: InsightPriority::Medium,
                });
            } else if mg.rate < -25.0 {
                insights.push(Insight {
                    kind: InsightKind::Warning,
                    message: format!(
                        "{} dropped {}% period over period",
                        mg.metric.as_str(),
                        round_to_decimal_places(mg.rate.abs(), 2)
                    ),
                    priority: InsightPriority::High,
                });
            }
        }

        if let Some(fastest) = per_metric
            .iter()
            .max_by(|a, b| a.rate.partial_cmp(&b.rate).unwrap_or(std::cmp::Ordering::Equal))
        {
            let slowest = per_metric
                .iter()
                .min_by(|a, b| a.rate.partial_cmp(&b.rate).unwrap_or(std::cmp::Ordering::Equal))
                .filter(|mg| mg.rate < 0.0);

            let message = match slowest {
                Some(s) => format!(
                    "Fastest-growing metric: {} ({}%); steepest decline: {} ({}%)",
                    fastest.metric.as_str(),
                    round_to_decimal_places(fastest.rate, 2),
                    s.metric.as_str(),
                    round_to_decimal_places(s.rate, 2)
                ),
                None => format!(
                    "Fastest-growing metric: {} ({}%)",
                    fastest.metric.as_str(),
                    round_to_decimal_places(fastest.rate, 2)
                ),
            };

            insights.push(Insight {
                kind: InsightKind::Info,
                message,
                priority: InsightPriority::Low,
            });
        } else {
            insights.push(Insight {
                kind: InsightKind::Info,
                message: "No metric data available for this period".to_string(),
                priority: InsightPriority::Low,
            });
        }

        // Ranked output: high first. Stable sort keeps rule order inside a tier.
        insights.sort_by(|a, b| b.priority.cmp(&a.priority));
        insights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates(pairs: &[(Metric, f64)]) -> Vec<MetricGrowth> {
        pairs
            .iter()
            .map(|&(metric, rate)| MetricGrowth { metric, rate })
            .collect()
    }

    #[test]
    fn test_exceptional_growth_is_high_priority() {
        let insights = InsightGenerator::generate(30.0, &rates(&[(Metric::Votes, 30.0)]));
        assert_eq!(insights[0].kind, InsightKind::Positive);
        assert_eq!(insights[0].priority, InsightPriority::High);
        assert!(insights[0].message.contains("Exceptional growth"));
    }

    #[test]
    fn test_strong_growth_is_medium_priority() {
        let insights = InsightGenerator::generate(15.0, &rates(&[(Metric::Votes, 15.0)]));
        assert!(insights
            .iter()
            .any(|i| i.message.contains("Strong growth") && i.priority == InsightPriority::Medium));
    }

    #[test]
    fn test_decline_is_warning() {
        let insights = InsightGenerator::generate(-12.0, &rates(&[(Metric::Revenue, -30.0)]));
        assert!(insights.iter().any(|i| i.kind == InsightKind::Warning
            && i.priority == InsightPriority::High
            && i.message.contains("Concerning decline")));
        assert!(insights
            .iter()
            .any(|i| i.message.contains("revenue dropped 30%")));
    }

    #[test]
    fn test_always_emits_fastest_metric_info() {
        let insights = InsightGenerator::generate(
            2.0,
            &rates(&[(Metric::Votes, 8.0), (Metric::Revenue, -3.0)]),
        );
        let info = insights.last().unwrap();
        assert_eq!(info.kind, InsightKind::Info);
        assert_eq!(info.priority, InsightPriority::Low);
        assert!(info.message.contains("votes"));
        assert!(info.message.contains("steepest decline: revenue"));
    }

    #[test]
    fn test_empty_metrics_still_emit_an_info_note() {
        let insights = InsightGenerator::generate(0.0, &[]);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::Info);
        assert_eq!(insights[0].priority, InsightPriority::Low);
        assert!(insights[0].message.contains("No metric data"));
    }

    #[test]
    fn test_no_decline_mention_when_all_positive() {
        let insights = InsightGenerator::generate(
            5.0,
            &rates(&[(Metric::Votes, 8.0), (Metric::Revenue, 3.0)]),
        );
        let info = insights.last().unwrap();
        assert!(!info.message.contains("decline"));
    }

    #[test]
    fn test_output_ordered_by_priority() {
        let insights = InsightGenerator::generate(
            30.0,
            &rates(&[(Metric::Votes, 60.0), (Metric::Revenue, -30.0)]),
        );
        let priorities: Vec<InsightPriority> = insights.iter().map(|i| i.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(priorities, sorted);
    }
}
