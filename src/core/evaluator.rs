use crate::domain::model::{ComparisonResult, CostSummary, LimitCheck, LimitStatus, Trend};

/// Maps a percentage of the limit to a status, first match from the top.
pub fn status_for(percentage_used: f64) -> LimitStatus {
    if percentage_used >= 100.0 {
        LimitStatus::LimitExceeded
    } else if percentage_used >= 90.0 {
        LimitStatus::NearLimit
    } else if percentage_used >= 80.0 {
        LimitStatus::Caution
    } else if percentage_used >= 50.0 {
        LimitStatus::HalfUsed
    } else {
        LimitStatus::WithinLimit
    }
}

/// A limit of zero or less reports 0% used instead of dividing by it.
pub fn evaluate_limit(limit: f64, current_cost: f64) -> LimitCheck {
    let percentage_used = if limit > 0.0 {
        current_cost / limit * 100.0
    } else {
        0.0
    };

    LimitCheck {
        current_cost,
        limit,
        percentage_used,
        over_limit: current_cost > limit,
        status: status_for(percentage_used),
    }
}

/// `alert_threshold` is a fraction of the limit (0.8 = 80%).
pub fn alert_triggered(check: &LimitCheck, alert_threshold: f64) -> bool {
    check.percentage_used >= alert_threshold * 100.0
}

pub fn compare(current: CostSummary, previous: CostSummary) -> ComparisonResult {
    let difference = current.total - previous.total;
    let percentage_change = if previous.total > 0.0 {
        difference / previous.total * 100.0
    } else {
        0.0
    };

    ComparisonResult {
        trend: Trend::from_difference(difference),
        current,
        previous,
        difference,
        percentage_change,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CostPeriod;
    use chrono::NaiveDate;

    fn summary(total: f64) -> CostSummary {
        let day = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        CostSummary {
            total,
            currency: "USD".to_string(),
            services: vec![],
            period: CostPeriod::new(day, day).unwrap(),
        }
    }

    #[test]
    fn test_near_limit() {
        let check = evaluate_limit(100.0, 95.0);
        assert_eq!(check.percentage_used, 95.0);
        assert_eq!(check.status, LimitStatus::NearLimit);
        assert_eq!(check.status.label(), "near limit");
        assert!(!check.over_limit);
    }

    #[test]
    fn test_limit_exceeded() {
        let check = evaluate_limit(100.0, 120.0);
        assert_eq!(check.status, LimitStatus::LimitExceeded);
        assert_eq!(check.status.label(), "limit exceeded");
        assert!(check.over_limit);
    }

    #[test]
    fn test_status_thresholds_are_inclusive() {
        assert_eq!(status_for(100.0), LimitStatus::LimitExceeded);
        assert_eq!(status_for(90.0), LimitStatus::NearLimit);
        assert_eq!(status_for(80.0), LimitStatus::Caution);
        assert_eq!(status_for(50.0), LimitStatus::HalfUsed);
        assert_eq!(status_for(49.99), LimitStatus::WithinLimit);
        assert_eq!(status_for(0.0), LimitStatus::WithinLimit);
    }

    #[test]
    fn test_exactly_at_limit_is_exceeded_but_not_over() {
        let check = evaluate_limit(100.0, 100.0);
        assert_eq!(check.status, LimitStatus::LimitExceeded);
        assert!(!check.over_limit);
    }

    #[test]
    fn test_non_positive_limit() {
        let zero = evaluate_limit(0.0, 10.0);
        assert_eq!(zero.percentage_used, 0.0);
        assert!(zero.over_limit);
        assert_eq!(zero.status, LimitStatus::WithinLimit);

        let negative = evaluate_limit(-5.0, -10.0);
        assert_eq!(negative.percentage_used, 0.0);
        assert!(!negative.over_limit);
    }

    #[test]
    fn test_limit_check_is_monotonic_in_cost() {
        let mut previous = evaluate_limit(250.0, 0.0);
        for step in 1..=400 {
            let check = evaluate_limit(250.0, f64::from(step));
            assert!(check.percentage_used >= previous.percentage_used);
            assert!(check.status >= previous.status);
            previous = check;
        }
    }

    #[test]
    fn test_alert_threshold() {
        let check = evaluate_limit(100.0, 80.0);
        assert!(alert_triggered(&check, 0.8));
        assert!(!alert_triggered(&check, 0.85));
    }

    #[test]
    fn test_compare_from_zero_previous() {
        let result = compare(summary(50.0), summary(0.0));
        assert_eq!(result.difference, 50.0);
        assert_eq!(result.percentage_change, 0.0);
        assert!(result.percentage_change.is_finite());
        assert_eq!(result.trend, Trend::Up);
    }

    #[test]
    fn test_compare_trends() {
        let down = compare(summary(75.0), summary(100.0));
        assert_eq!(down.difference, -25.0);
        assert_eq!(down.percentage_change, -25.0);
        assert_eq!(down.trend, Trend::Down);

        let stable = compare(summary(40.0), summary(40.0));
        assert_eq!(stable.trend, Trend::Stable);
        assert_eq!(stable.percentage_change, 0.0);
    }
}
