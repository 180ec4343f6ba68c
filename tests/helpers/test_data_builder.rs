// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::{DateTime, FixedOffset, TimeZone};
use liturgy_roster::domain::{Affiliation, AvailabilityBlock, Event, EventKind, Person, RoleCode};
use uuid::Uuid;

/// 2025 年当地时间（UTC-3）
pub fn ts(month: u32, day: u32, hour: u32, minute: u32) -> DateTime<FixedOffset> {
    FixedOffset::west_opt(3 * 3600)
        .unwrap()
        .with_ymd_and_hms(2025, month, day, hour, minute, 0)
        .unwrap()
}

// ==========================================
// Person 构建器
// ==========================================

pub struct PersonBuilder {
    name: String,
    affiliation: Affiliation,
    roles: Vec<RoleCode>,
    morning: bool,
    active: bool,
}

impl PersonBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            affiliation: Affiliation::Mat,
            roles: Vec::new(),
            morning: false,
            active: true,
        }
    }

    pub fn affiliation(mut self, affiliation: Affiliation) -> Self {
        self.affiliation = affiliation;
        self
    }

    pub fn roles<I>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = RoleCode>,
    {
        self.roles.extend(roles);
        self
    }

    pub fn all_roles(self) -> Self {
        self.roles(RoleCode::ALL)
    }

    pub fn morning(mut self) -> Self {
        self.morning = true;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn build(self) -> Person {
        let mut person = Person::new(&self.name, self.affiliation)
            .unwrap()
            .with_roles(self.roles);
        person.morning = self.morning;
        person.active = self.active;
        person
    }
}

// ==========================================
// Event 构建器
// ==========================================

pub struct EventBuilder {
    affiliation: Affiliation,
    start: DateTime<FixedOffset>,
    end: Option<DateTime<FixedOffset>>,
    quantity: u32,
    kind: EventKind,
    pool: Vec<Uuid>,
}

impl EventBuilder {
    pub fn new(affiliation: Affiliation, start: DateTime<FixedOffset>) -> Self {
        Self {
            affiliation,
            start,
            end: None,
            quantity: 1,
            kind: EventKind::Regular,
            pool: Vec::new(),
        }
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn solemn(mut self) -> Self {
        self.kind = EventKind::Solemn;
        self
    }

    pub fn end(mut self, end: DateTime<FixedOffset>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn pool<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = Uuid>,
    {
        self.pool.extend(ids);
        self
    }

    pub fn build(self) -> Event {
        let mut event = Event::new(self.affiliation, self.start, self.quantity, self.kind).unwrap();
        if let Some(end) = self.end {
            event = event.with_end(end).unwrap();
        }
        if !self.pool.is_empty() {
            event = event.with_pool(self.pool);
        }
        event
    }
}

/// 整天不可用
pub fn day_off(person: &Person, month: u32, day: u32) -> AvailabilityBlock {
    AvailabilityBlock::new(
        person.id,
        ts(month, day, 0, 0),
        ts(month, day, 23, 59),
        Some("请假".to_string()),
    )
    .unwrap()
}

/// 一组具备全部职务的人员
pub fn full_team(prefix: &str, size: usize, affiliation: Affiliation) -> Vec<Person> {
    (0..size)
        .map(|i| {
            PersonBuilder::new(&format!("{} {:02}", prefix, i))
                .affiliation(affiliation)
                .all_roles()
                .build()
        })
        .collect()
}
