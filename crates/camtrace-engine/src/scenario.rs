use std::collections::HashSet;

use camtrace_types::{
    Presence, Scenario, ScenarioResult, ScenarioStep, Scope, StepOutcome, StepResult, TimelineRow,
};

/// One-level lookahead only: the segment for a Segment-scope step ends at the
/// earliest match of the *next* Required step in sequence, not any step
/// further out.
fn segment_end(timeline: &[TimelineRow], cursor: usize, remaining: &[ScenarioStep]) -> usize {
    let Some(next_required) = remaining.iter().find(|s| s.presence == Presence::Required) else {
        return timeline.len();
    };
    (cursor..timeline.len())
        .find(|&idx| next_required.kind.matches(timeline[idx].kind()))
        .unwrap_or(timeline.len())
}

/// Evaluate a declarative scenario against a flow timeline with a single
/// forward cursor. `critical_item_indices` names every trace item index
/// covered by a Critical validation issue, used to upgrade a step's status.
pub fn run(
    timeline: &[TimelineRow],
    scenario: &Scenario,
    critical_item_indices: &HashSet<usize>,
) -> ScenarioResult {
    let mut cursor = 0usize;
    let mut results = Vec::with_capacity(scenario.sequence.len());
    let mut overall = StepOutcome::Ok;
    // None = no step has consumed yet; Some(ts) = the last consumed step's timestamp.
    let mut prev_consumed: Option<Option<chrono::NaiveDateTime>> = None;

    for (i, step) in scenario.sequence.iter().enumerate() {
        let (start, end) = match step.scope {
            Scope::Global => (0, timeline.len()),
            Scope::Segment => (cursor, segment_end(timeline, cursor, &scenario.sequence[i + 1..])),
        };

        let matched: Vec<usize> = (start..end)
            .filter(|&idx| step.kind.matches(timeline[idx].kind()))
            .collect();

        let (min, max) = step.bounds();
        let count = matched.len();
        let mut status = if count < min {
            step.too_few.unwrap_or_else(|| step.default_too_few())
        } else if count > max {
            step.too_many.unwrap_or_else(|| step.default_too_many())
        } else {
            StepOutcome::Ok
        };

        let consumes = status != StepOutcome::Fail
            && !matched.is_empty()
            && step.presence != Presence::Forbidden
            && step.scope != Scope::Global;

        if consumes {
            let last_idx = *matched.last().unwrap();
            let this_ts = timeline[last_idx].timestamp();

            if scenario.constraints.max_gap_enabled {
                if let Some(prev_ts) = prev_consumed {
                    match (prev_ts, this_ts) {
                        (Some(p), Some(c)) => {
                            let gap = (c - p).num_seconds().abs();
                            if gap > scenario.constraints.max_gap_seconds {
                                status = status.worse(scenario.constraints.max_gap_on_violation);
                            }
                        }
                        _ => status = status.worse(scenario.constraints.max_gap_on_unknown),
                    }
                }
            }

            prev_consumed = Some(this_ts);
            cursor = last_idx + 1;
        }

        if matched
            .iter()
            .any(|&idx| critical_item_indices.contains(&timeline[idx].anchor_index()))
        {
            status = status.worse(StepOutcome::Warn);
        }

        overall = overall.worse(status);

        results.push(StepResult {
            label: step.display_label(),
            status,
            matched_types: matched.iter().map(|&idx| timeline[idx].kind().to_string()).collect(),
            item_indices: matched.iter().map(|&idx| timeline[idx].anchor_index()).collect(),
            reason: None,
        });
    }

    ScenarioResult { steps: results, overall }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camtrace_types::GapConstraints;
    use chrono::NaiveDate;

    fn ts(sec: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, sec).unwrap()
    }

    fn event(kind: &str, index: usize, sec: u32) -> TimelineRow {
        TimelineRow::Event {
            kind: kind.to_string(),
            item_index: index,
            timestamp: Some(ts(sec)),
            detail: None,
        }
    }

    #[test]
    fn happy_path_all_required_in_order_is_ok() {
        let timeline = vec![
            event("DNSbyME", 0, 0),
            event("DNS", 1, 5),
            event("DP+", 2, 10),
            event("TAC", 3, 15),
        ];
        let scenario = Scenario {
            sequence: vec![
                ScenarioStep::required("DNSbyME"),
                ScenarioStep::required("DNS"),
                ScenarioStep::required("DP+"),
                ScenarioStep::required("TAC"),
            ],
            constraints: GapConstraints { max_gap_enabled: true, max_gap_seconds: 30, ..GapConstraints::default() },
        };
        let result = run(&timeline, &scenario, &HashSet::new());
        assert!(result.steps.iter().all(|s| s.status == StepOutcome::Ok));
        assert_eq!(result.overall, StepOutcome::Ok);
    }

    #[test]
    fn missing_required_step_fails() {
        let timeline = vec![event("DNS", 0, 0)];
        let scenario = Scenario {
            sequence: vec![ScenarioStep::required("TAC")],
            constraints: GapConstraints::default(),
        };
        let result = run(&timeline, &scenario, &HashSet::new());
        assert_eq!(result.steps[0].status, StepOutcome::Fail);
        assert_eq!(result.overall, StepOutcome::Fail);
    }

    #[test]
    fn forbidden_global_step_never_consumes_or_advances_cursor() {
        let timeline = vec![event("TAC", 0, 0), event("DNS", 1, 5)];
        let mut forbidden = ScenarioStep::required("TAC");
        forbidden.presence = Presence::Forbidden;
        forbidden.scope = Scope::Global;
        let dns_required = ScenarioStep::required("DNS");
        let scenario = Scenario {
            sequence: vec![forbidden, dns_required],
            constraints: GapConstraints::default(),
        };
        let result = run(&timeline, &scenario, &HashSet::new());
        assert_eq!(result.steps[0].status, StepOutcome::Fail);
        assert_eq!(result.steps[1].status, StepOutcome::Ok);
    }

    #[test]
    fn critical_overlap_upgrades_ok_step_to_warn() {
        let timeline = vec![event("DNS", 7, 0)];
        let scenario = Scenario {
            sequence: vec![ScenarioStep::required("DNS")],
            constraints: GapConstraints::default(),
        };
        let mut critical = HashSet::new();
        critical.insert(7);
        let result = run(&timeline, &scenario, &critical);
        assert_eq!(result.steps[0].status, StepOutcome::Warn);
    }

    #[test]
    fn gap_exceeding_limit_raises_to_configured_outcome() {
        let timeline = vec![event("DNS", 0, 0), event("TAC", 1, 100)];
        let scenario = Scenario {
            sequence: vec![ScenarioStep::required("DNS"), ScenarioStep::required("TAC")],
            constraints: GapConstraints { max_gap_enabled: true, max_gap_seconds: 30, ..GapConstraints::default() },
        };
        let result = run(&timeline, &scenario, &HashSet::new());
        assert_eq!(result.steps[1].status, StepOutcome::Fail);
    }
}
