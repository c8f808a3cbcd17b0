use folio::domain::models::{CorrectionState, Quality, StepSchedule};
use proptest::prelude::*;

fn quality() -> impl Strategy<Value = Quality> {
    prop::sample::select(Quality::ALL.to_vec())
}

proptest! {
    /// Property: the budget is never negative, whatever the grades
    #[test]
    fn prop_budget_never_negative(
        budget in 0i32..10,
        grades in prop::collection::vec(quality(), 0..30)
    ) {
        let schedule = StepSchedule::default();
        let mut state = CorrectionState::new(budget);

        for grade in grades {
            state = state.report(&schedule, grade);
            prop_assert!(state.remain_steps >= 0);
        }
    }

    /// Property: the accepted grade never gets worse
    #[test]
    fn prop_quality_is_monotone(grades in prop::collection::vec(quality(), 1..30)) {
        let schedule = StepSchedule::default();
        let mut state = CorrectionState::new(2);

        for grade in grades {
            let before = state.quality;
            state = state.report(&schedule, grade);
            if let Some(before) = before {
                prop_assert!(state.quality >= Some(before));
            }
        }
    }

    /// Property: a regression costs exactly one step and changes nothing else
    #[test]
    fn prop_regression_only_costs_a_step(
        current in quality(),
        graded in quality(),
        budget in 1i32..20
    ) {
        prop_assume!(graded < current);
        let schedule = StepSchedule::default();
        let state = CorrectionState { quality: Some(current), remain_steps: budget, next_index: 3 };

        let next = state.report(&schedule, graded);

        prop_assert_eq!(next.quality, Some(current));
        prop_assert_eq!(next.remain_steps, budget - 1);
        prop_assert_eq!(next.next_index, 3);
    }

    /// Property: the loop always terminates
    ///
    /// With non-negative deltas, the grade can only climb a finite ladder,
    /// so any grade sequence exhausts the budget or reaches perfect.
    #[test]
    fn prop_loop_terminates(budget in 1i32..10, grades in prop::collection::vec(quality(), 0..8)) {
        let schedule = StepSchedule::default();
        let mut state = CorrectionState::new(budget);
        let mut script = grades.into_iter();
        let mut rounds = 0u32;

        while state.should_continue() {
            // Once the script runs out the oracle keeps saying "poor".
            let grade = script.next().unwrap_or(Quality::Poor);
            state = state.report(&schedule, grade).advanced_past(state.next_index);
            rounds += 1;
            prop_assert!(rounds < 200);
        }

        prop_assert_eq!(state.next_index, rounds + 1);
    }

    /// Property: the transition delta is the sum of deltas from old up to new
    #[test]
    fn prop_transition_sums_passed_grades(old in quality(), new in quality()) {
        let schedule = StepSchedule::default();
        let expected: i32 = schedule
            .entries()
            .iter()
            .filter(|(q, _)| *q >= old && *q < new)
            .map(|(_, delta)| delta)
            .sum();

        if new >= old {
            prop_assert_eq!(schedule.transition(old, new), Some(expected));
        } else {
            prop_assert_eq!(schedule.transition(old, new), None);
        }
    }
}
