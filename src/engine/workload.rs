// ==========================================
// 辅祭排班系统 - 工作量统计
// ==========================================
// 职责: 时间窗计数 / 群体均值 / 阈值与溢出 / 职务重复 / 距上次服务天数
// 参考时刻 T = 弥撒开始时间; 时间窗一律 [T - 窗口, T)
// ==========================================

use crate::config::RosterConfig;
use crate::domain::person::Person;
use crate::domain::types::RoleCode;
use crate::engine::ledger::AssignmentLedger;
use chrono::{DateTime, Duration, FixedOffset};
use uuid::Uuid;

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, Copy)]
pub struct WorkloadAccountant {
    fair_window: Duration,
    rotation_window: Duration,
    tolerance: f64,
    newcomer_recency_days: f64,
}

impl WorkloadAccountant {
    pub fn from_config(config: &RosterConfig) -> Self {
        Self {
            fair_window: config.fair_window(),
            rotation_window: config.rotation_window(),
            tolerance: config.fairness.workload_tolerance as f64,
            newcomer_recency_days: config.weights.newcomer_recency_days,
        }
    }

    /// 公平窗口内的服务次数
    pub fn window_count(&self, ledger: &AssignmentLedger, person_id: &Uuid, at: DateTime<FixedOffset>) -> usize {
        ledger.count_in_range(person_id, at - self.fair_window, at)
    }

    /// 群体平均值: 在岗且具备该职务的人员; 空集为 0
    pub fn population_average<'a, I>(
        &self,
        ledger: &AssignmentLedger,
        people: I,
        role: RoleCode,
        at: DateTime<FixedOffset>,
    ) -> f64
    where
        I: IntoIterator<Item = &'a Person>,
    {
        let (sum, n) = people
            .into_iter()
            .filter(|person| person.active && person.is_qualified(role))
            .fold((0usize, 0usize), |(sum, n), person| {
                (sum + self.window_count(ledger, &person.id, at), n + 1)
            });
        if n == 0 {
            0.0
        } else {
            sum as f64 / n as f64
        }
    }

    pub fn threshold(&self, average: f64) -> f64 {
        average + self.tolerance
    }

    /// 再排一次后是否仍在阈值内
    pub fn is_valid(&self, window_count: usize, threshold: f64) -> bool {
        (window_count + 1) as f64 <= threshold
    }

    pub fn overflow(&self, window_count: usize, threshold: f64) -> f64 {
        ((window_count + 1) as f64 - threshold).max(0.0)
    }

    /// 轮换窗口内担任同一职务的次数
    pub fn role_repetition(
        &self,
        ledger: &AssignmentLedger,
        person_id: &Uuid,
        role: RoleCode,
        at: DateTime<FixedOffset>,
    ) -> usize {
        ledger.role_count_in_range(person_id, role, at - self.rotation_window, at)
    }

    /// 距上次服务的天数（小数）; 公平窗口内无记录时取新人常数
    pub fn days_since_last(&self, ledger: &AssignmentLedger, person_id: &Uuid, at: DateTime<FixedOffset>) -> f64 {
        match ledger.latest_before(person_id, at) {
            Some(last) if at - last <= self.fair_window => {
                (at - last).num_seconds() as f64 / SECONDS_PER_DAY
            }
            _ => self.newcomer_recency_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::Event;
    use crate::domain::types::{Affiliation, EventKind, RoleSlot};
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 3, day, hour, 0, 0)
            .unwrap()
    }

    fn served(ledger: &mut AssignmentLedger, person: Uuid, day: u32, role: RoleCode) {
        let event = Event::new(Affiliation::Mat, at(day, 9), 1, EventKind::Regular).unwrap();
        ledger.record(person, &event, RoleSlot::first(role), Duration::minutes(110));
    }

    fn person(name: &str) -> Person {
        Person::new(name, Affiliation::Mat).unwrap().with_roles([RoleCode::Lib])
    }

    #[test]
    fn test_threshold_from_population_average() {
        let accountant = WorkloadAccountant::from_config(&RosterConfig::default());
        let people = vec![person("Ana"), person("Bia"), person("Caio")];
        let mut ledger = AssignmentLedger::default();
        served(&mut ledger, people[1].id, 1, RoleCode::Lib);
        for day in 2..7 {
            served(&mut ledger, people[2].id, day, RoleCode::Lib);
        }

        let t = at(20, 10);
        let average = accountant.population_average(&ledger, &people, RoleCode::Lib, t);
        assert_eq!(average, 2.0);
        let threshold = accountant.threshold(average);
        assert_eq!(threshold, 4.0);

        let counts: Vec<usize> = people
            .iter()
            .map(|p| accountant.window_count(&ledger, &p.id, t))
            .collect();
        assert_eq!(counts, vec![0, 1, 5]);
        assert!(accountant.is_valid(counts[0], threshold));
        assert!(accountant.is_valid(counts[1], threshold));
        assert!(!accountant.is_valid(counts[2], threshold));
        assert_eq!(accountant.overflow(counts[2], threshold), 2.0);
        assert_eq!(accountant.overflow(counts[0], threshold), 0.0);
    }

    #[test]
    fn test_average_skips_inactive_and_unqualified() {
        let accountant = WorkloadAccountant::from_config(&RosterConfig::default());
        let mut inactive = person("Davi");
        inactive.active = false;
        let unqualified = Person::new("Eva", Affiliation::Mat).unwrap();
        let busy = person("Fabio");
        let mut ledger = AssignmentLedger::default();
        served(&mut ledger, busy.id, 1, RoleCode::Lib);
        served(&mut ledger, inactive.id, 2, RoleCode::Lib);
        served(&mut ledger, unqualified.id, 3, RoleCode::Lib);

        let people = [inactive, unqualified, busy];
        assert_eq!(accountant.population_average(&ledger, &people, RoleCode::Lib, at(20, 10)), 1.0);
        assert_eq!(accountant.population_average(&ledger, &people, RoleCode::Cam, at(20, 10)), 0.0);
    }

    #[test]
    fn test_days_since_last_and_newcomer_constant() {
        let accountant = WorkloadAccountant::from_config(&RosterConfig::default());
        let id = Uuid::new_v4();
        let mut ledger = AssignmentLedger::default();
        assert_eq!(accountant.days_since_last(&ledger, &id, at(20, 9)), 7.5);

        served(&mut ledger, id, 10, RoleCode::Cru);
        let days = accountant.days_since_last(&ledger, &id, at(20, 21));
        assert!((days - 10.5).abs() < 1e-9);
        assert_eq!(accountant.role_repetition(&ledger, &id, RoleCode::Cru, at(20, 9)), 1);
        assert_eq!(accountant.role_repetition(&ledger, &id, RoleCode::Lib, at(20, 9)), 0);
    }

    #[test]
    fn test_future_assignments_do_not_count() {
        let accountant = WorkloadAccountant::from_config(&RosterConfig::default());
        let id = Uuid::new_v4();
        let mut ledger = AssignmentLedger::default();
        served(&mut ledger, id, 25, RoleCode::Lib);
        assert_eq!(accountant.window_count(&ledger, &id, at(20, 9)), 0);
    }
}
