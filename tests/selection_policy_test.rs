// ==========================================
// 选人策略集成测试
// ==========================================
// 测试范围:
// 1. 回退层级顺序（同团体有效 > 他团体有效 > 溢出）
// 2. 溢出层按溢出量升序; 全员超限时同团体仍优先
// 3. 职务轮换 / 上午偏好 / 姓名平分
// ==========================================

mod helpers;

use helpers::{day_off, ts, EventBuilder, PersonBuilder};
use liturgy_roster::config::RosterConfig;
use liturgy_roster::domain::{Affiliation, AssignmentMap, Event, Person, RoleCode, RoleSlot, RosterSnapshot};
use liturgy_roster::engine::{AssignmentLedger, Candidate, SelectionContext, SelectionEngine, SelectionTier};
use uuid::Uuid;

// ==========================================
// 辅助函数
// ==========================================

/// 为某人补一条历史服务记录（8 月 day 日 10:00,单人弥撒）
fn served(events: &mut Vec<Event>, assignments: &mut AssignmentMap, person: &Person, day: u32, role: RoleCode) {
    let event = EventBuilder::new(person.affiliation, ts(8, day, 10, 0)).build();
    assignments.assign(event.id, RoleSlot::first(role), person.id);
    events.push(event);
}

fn rank(config: &RosterConfig, snapshot: &RosterSnapshot, event_id: Uuid, slot: RoleSlot) -> Vec<Candidate> {
    let engine = SelectionEngine::from_config(config);
    let ledger = AssignmentLedger::build(&snapshot.assignments, &snapshot.events, config.overlap_guard());
    let ctx = SelectionContext {
        people: &snapshot.people,
        blocks: &snapshot.blocks,
        assignments: &snapshot.assignments,
        ledger: &ledger,
    };
    engine.evaluate(&ctx, &snapshot.events[&event_id], slot)
}

fn names(ranked: &[Candidate]) -> Vec<&str> {
    ranked.iter().map(|c| c.name.as_str()).collect()
}

// ==========================================
// 测试用例
// ==========================================

#[test]
fn test_valid_visitor_beats_overloaded_local() {
    let mut config = RosterConfig::default();
    config.fairness.workload_tolerance = 0;

    let ana = PersonBuilder::new("Ana").roles([RoleCode::Lib]).build();
    let bia = PersonBuilder::new("Bia").roles([RoleCode::Lib]).build();
    let davi = PersonBuilder::new("Davi")
        .affiliation(Affiliation::Stm)
        .roles([RoleCode::Lib])
        .build();

    let mut events = Vec::new();
    let mut assignments = AssignmentMap::new();
    for day in 1..=3 {
        served(&mut events, &mut assignments, &ana, day, RoleCode::Lib);
    }
    for day in 4..=7 {
        served(&mut events, &mut assignments, &bia, day, RoleCode::Lib);
    }
    let target = EventBuilder::new(Affiliation::Mat, ts(8, 20, 10, 0)).build();
    let target_id = target.id;
    events.push(target);

    let snapshot = RosterSnapshot::from_parts(vec![ana, bia, davi], events, Vec::new(), assignments);
    let ranked = rank(&config, &snapshot, target_id, RoleSlot::first(RoleCode::Lib));

    // 均值 (3 + 4 + 0) / 3,容差 0
    assert_eq!(names(&ranked), vec!["Davi", "Ana", "Bia"]);
    assert_eq!(ranked[0].tier, SelectionTier::OtherAffiliationValid);
    assert_eq!(ranked[1].tier, SelectionTier::SameAffiliationOverflow);
    assert!(ranked[1].overflow < ranked[2].overflow);
    assert!((ranked[0].threshold - 7.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_overloaded_local_beats_visitor_with_less_overflow() {
    let mut config = RosterConfig::default();
    config.fairness.workload_tolerance = 0;

    let ana = PersonBuilder::new("Ana").roles([RoleCode::Lib]).build();
    let davi = PersonBuilder::new("Davi")
        .affiliation(Affiliation::Stm)
        .roles([RoleCode::Lib])
        .build();
    // 有资格但当天请假: 计入均值,自身不可选
    let ze = PersonBuilder::new("Zé").roles([RoleCode::Lib]).build();

    let mut events = Vec::new();
    let mut assignments = AssignmentMap::new();
    for day in 1..=3 {
        served(&mut events, &mut assignments, &ana, day, RoleCode::Lib);
    }
    served(&mut events, &mut assignments, &davi, 4, RoleCode::Lib);
    let target = EventBuilder::new(Affiliation::Mat, ts(8, 20, 10, 0)).build();
    let target_id = target.id;
    events.push(target);

    let blocks = vec![day_off(&ze, 8, 20)];
    let snapshot = RosterSnapshot::from_parts(vec![ana, davi, ze], events, blocks, assignments);
    let ranked = rank(&config, &snapshot, target_id, RoleSlot::first(RoleCode::Lib));

    // 均值 (3 + 1 + 0) / 3: 两人都超限,Ana 超得更多却仍排第一
    assert_eq!(names(&ranked), vec!["Ana", "Davi"]);
    assert_eq!(ranked[0].tier, SelectionTier::SameAffiliationOverflow);
    assert_eq!(ranked[1].tier, SelectionTier::OtherAffiliationOverflow);
    assert!(ranked[0].overflow > ranked[1].overflow);
    assert!((ranked[0].overflow - 8.0 / 3.0).abs() < 1e-9);
    assert!((ranked[1].overflow - 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_without_locals_smallest_overflow_wins() {
    let mut config = RosterConfig::default();
    config.fairness.workload_tolerance = 0;

    let bia = PersonBuilder::new("Bia")
        .affiliation(Affiliation::Stm)
        .roles([RoleCode::Lib])
        .build();
    let caio = PersonBuilder::new("Caio")
        .affiliation(Affiliation::Sjt)
        .roles([RoleCode::Lib])
        .build();
    let ze = PersonBuilder::new("Zé").roles([RoleCode::Lib]).build();

    let mut events = Vec::new();
    let mut assignments = AssignmentMap::new();
    for day in 1..=3 {
        served(&mut events, &mut assignments, &bia, day, RoleCode::Lib);
    }
    for day in 4..=5 {
        served(&mut events, &mut assignments, &caio, day, RoleCode::Lib);
    }
    let target = EventBuilder::new(Affiliation::Mat, ts(8, 20, 10, 0)).build();
    let target_id = target.id;
    events.push(target);

    let blocks = vec![day_off(&ze, 8, 20)];
    let snapshot = RosterSnapshot::from_parts(vec![bia, caio, ze], events, blocks, assignments);
    let ranked = rank(&config, &snapshot, target_id, RoleSlot::first(RoleCode::Lib));

    // 均值 (3 + 2 + 0) / 3; 姓名序 Bia 在前,但溢出量更小的 Caio 胜出
    assert_eq!(names(&ranked), vec!["Caio", "Bia"]);
    assert!(ranked.iter().all(|c| c.tier == SelectionTier::OtherAffiliationOverflow));
    assert!((ranked[0].overflow - 4.0 / 3.0).abs() < 1e-9);
    assert!((ranked[1].overflow - 7.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_recent_same_role_is_rotated_out() {
    let config = RosterConfig::default();
    let ana = PersonBuilder::new("Ana").roles([RoleCode::Lib, RoleCode::Cru]).build();
    let bia = PersonBuilder::new("Bia").roles([RoleCode::Lib, RoleCode::Cru]).build();

    let mut events = Vec::new();
    let mut assignments = AssignmentMap::new();
    served(&mut events, &mut assignments, &ana, 1, RoleCode::Lib);
    served(&mut events, &mut assignments, &bia, 1, RoleCode::Cru);
    let target = EventBuilder::new(Affiliation::Mat, ts(8, 10, 10, 0)).build();
    let target_id = target.id;
    events.push(target);

    let snapshot = RosterSnapshot::from_parts(vec![ana, bia], events, Vec::new(), assignments);
    let ranked = rank(&config, &snapshot, target_id, RoleSlot::first(RoleCode::Lib));

    assert_eq!(names(&ranked), vec!["Bia", "Ana"]);
    assert_eq!(ranked[0].score.rotation, 0.0);
    assert_eq!(ranked[1].score.rotation, -6.0);
}

#[test]
fn test_morning_preference_breaks_even_scores() {
    let config = RosterConfig::default();
    let ana = PersonBuilder::new("Ana").roles([RoleCode::Lib]).build();
    let zeca = PersonBuilder::new("Zeca").roles([RoleCode::Lib]).morning().build();
    let target = EventBuilder::new(Affiliation::Mat, ts(8, 10, 9, 0)).build();
    let target_id = target.id;

    let snapshot = RosterSnapshot::from_parts(vec![ana, zeca], vec![target], Vec::new(), AssignmentMap::new());
    let ranked = rank(&config, &snapshot, target_id, RoleSlot::first(RoleCode::Lib));

    assert_eq!(names(&ranked), vec!["Zeca", "Ana"]);
}

#[test]
fn test_accent_insensitive_name_tie_break() {
    let config = RosterConfig::default();
    let people = vec![
        PersonBuilder::new("Érica").roles([RoleCode::Lib]).build(),
        PersonBuilder::new("Eduardo").roles([RoleCode::Lib]).build(),
        PersonBuilder::new("Fábio").roles([RoleCode::Lib]).build(),
    ];
    let target = EventBuilder::new(Affiliation::Mat, ts(8, 10, 19, 0)).build();
    let target_id = target.id;

    let snapshot = RosterSnapshot::from_parts(people, vec![target], Vec::new(), AssignmentMap::new());
    let ranked = rank(&config, &snapshot, target_id, RoleSlot::first(RoleCode::Lib));

    assert_eq!(names(&ranked), vec!["Eduardo", "Érica", "Fábio"]);
}

#[test]
fn test_inactive_and_unqualified_are_excluded() {
    let config = RosterConfig::default();
    let people = vec![
        PersonBuilder::new("Ana").roles([RoleCode::Lib]).inactive().build(),
        PersonBuilder::new("Bia").roles([RoleCode::Cru]).build(),
        PersonBuilder::new("Caio").roles([RoleCode::Lib]).build(),
    ];
    let target = EventBuilder::new(Affiliation::Mat, ts(8, 10, 19, 0)).build();
    let target_id = target.id;

    let snapshot = RosterSnapshot::from_parts(people, vec![target], Vec::new(), AssignmentMap::new());
    let ranked = rank(&config, &snapshot, target_id, RoleSlot::first(RoleCode::Lib));

    assert_eq!(names(&ranked), vec!["Caio"]);
}
