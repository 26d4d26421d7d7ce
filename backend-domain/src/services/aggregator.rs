use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;

use crate::entities::{
    ActivityReport, DailySummary, DailyStore, DashboardView, Member, MemberSummary, PassiveMember,
    Record, RecordLine, TagSummary, Totals,
};
use crate::value_objects::ActivityPolicy;

const RECENT_DATE_KEYS: usize = 7;

#[derive(Default)]
struct Sums {
    deposit_count: u64,
    total_deposits: Decimal,
    withdrawal_count: u64,
    total_withdrawals: Decimal,
    record_count: usize,
    members: HashSet<String>,
}

impl Sums {
    fn add(&mut self, record: &Record) {
        self.deposit_count = self.deposit_count.saturating_add(record.deposit_count);
        self.total_deposits = self.total_deposits.saturating_add(record.total_deposits);
        self.withdrawal_count = self.withdrawal_count.saturating_add(record.withdrawal_count);
        self.total_withdrawals = self.total_withdrawals.saturating_add(record.total_withdrawals);
        self.record_count += 1;
        self.members.insert(record.member_id.clone());
    }

    fn net(&self) -> Decimal {
        self.total_deposits.saturating_sub(self.total_withdrawals)
    }

    fn totals(&self) -> Totals {
        Totals {
            deposit_count: self.deposit_count,
            total_deposits: self.total_deposits,
            withdrawal_count: self.withdrawal_count,
            total_withdrawals: self.total_withdrawals,
            net: self.net(),
            record_count: self.record_count,
            member_count: self.members.len(),
        }
    }

    fn daily(&self, date: NaiveDate) -> DailySummary {
        DailySummary {
            date,
            deposit_count: self.deposit_count,
            total_deposits: self.total_deposits,
            withdrawal_count: self.withdrawal_count,
            total_withdrawals: self.total_withdrawals,
            net: self.net(),
            record_count: self.record_count,
            member_count: self.members.len(),
        }
    }
}

struct MemberAcc {
    summary: MemberSummary,
    last_day: Option<NaiveDate>,
}

impl MemberAcc {
    fn new(member_id: &str) -> Self {
        Self {
            summary: MemberSummary {
                member_id: member_id.to_string(),
                username: String::new(),
                customer_name: String::new(),
                deposit_count: 0,
                total_deposits: Decimal::ZERO,
                withdrawal_count: 0,
                total_withdrawals: Decimal::ZERO,
                net: Decimal::ZERO,
                active_days: 0,
                score: None,
                category: None,
            },
            last_day: None,
        }
    }

    fn add(&mut self, date: NaiveDate, record: &Record) {
        let summary = &mut self.summary;
        summary.deposit_count = summary.deposit_count.saturating_add(record.deposit_count);
        summary.total_deposits = summary.total_deposits.saturating_add(record.total_deposits);
        summary.withdrawal_count = summary.withdrawal_count.saturating_add(record.withdrawal_count);
        summary.total_withdrawals = summary.total_withdrawals.saturating_add(record.total_withdrawals);
        summary.net = summary.total_deposits.saturating_sub(summary.total_withdrawals);
        if !record.username.is_empty() {
            summary.username = record.username.clone();
        }
        if !record.customer_name.is_empty() {
            summary.customer_name = record.customer_name.clone();
        }
        if self.last_day != Some(date) {
            summary.active_days += 1;
            self.last_day = Some(date);
        }
    }
}

/// Inclusive calendar days between `start` and `end`; 0 when reversed.
pub fn inclusive_day_count(start: NaiveDate, end: NaiveDate) -> i64 {
    if start > end {
        0
    } else {
        end.signed_duration_since(start).num_days() + 1
    }
}

/// Aggregates every record stored between `start` and `end`. When `active`
/// is given, records whose member id is not in it are skipped.
pub fn summarize(
    store: &DailyStore,
    start: NaiveDate,
    end: NaiveDate,
    active: Option<&HashSet<String>>,
) -> ActivityReport {
    let mut grand = Sums::default();
    let mut daily = Vec::new();
    let mut members: Vec<MemberAcc> = Vec::new();
    let mut member_index: HashMap<String, usize> = HashMap::new();
    let mut tags: BTreeMap<String, Sums> = BTreeMap::new();
    let mut lines = Vec::new();

    for (date, tag_records) in store.days_between(start, end) {
        let date = *date;
        let mut day = Sums::default();
        for (tag, records) in tag_records {
            for record in records {
                if let Some(active) = active {
                    if !active.contains(&record.member_id) {
                        continue;
                    }
                }
                day.add(record);
                grand.add(record);
                tags.entry(tag.clone()).or_default().add(record);
                let index = *member_index
                    .entry(record.member_id.clone())
                    .or_insert_with(|| {
                        members.push(MemberAcc::new(&record.member_id));
                        members.len() - 1
                    });
                members[index].add(date, record);
                lines.push(RecordLine::new(date, tag, record));
            }
        }
        daily.push(day.daily(date));
    }

    let mut members: Vec<MemberSummary> = members.into_iter().map(|acc| acc.summary).collect();
    members.sort_by(|a, b| b.net.cmp(&a.net));

    let tags = tags
        .into_iter()
        .map(|(tag, sums)| TagSummary {
            tag,
            total_deposits: sums.total_deposits,
            total_withdrawals: sums.total_withdrawals,
            net: sums.net(),
            record_count: sums.record_count,
            member_count: sums.members.len(),
        })
        .collect();

    ActivityReport {
        start,
        end,
        day_count: inclusive_day_count(start, end),
        days_with_data: daily.len(),
        active_only: active.is_some(),
        totals: grand.totals(),
        daily,
        members,
        tags,
        records: lines,
    }
}

/// Fills in roster score and category for report members found on the roster.
pub fn attach_scores(report: &mut ActivityReport, roster: &[Member], today: NaiveDate) {
    let by_id: HashMap<&str, &Member> = roster
        .iter()
        .map(|member| (member.member_id.as_str(), member))
        .collect();
    for summary in &mut report.members {
        if let Some(member) = by_id.get(summary.member_id.as_str()) {
            let score = member.score(today);
            summary.score = Some(score);
            summary.category = Some(score.category());
        }
    }
}

pub fn active_member_ids(members: &[Member]) -> HashSet<String> {
    members
        .iter()
        .filter(|member| member.is_active)
        .map(|member| member.member_id.clone())
        .collect()
}

/// Home screen figures: current month totals and the most recent upload
/// days restricted to active roster members, plus members gone passive.
pub fn build_dashboard(
    store: &DailyStore,
    members: &[Member],
    today: NaiveDate,
    policy: &ActivityPolicy,
) -> DashboardView {
    let active = active_member_ids(members);
    let month_start = today.with_day(1).unwrap_or(today);
    let month_end = month_start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(today);
    let month = summarize(store, month_start, month_end, Some(&active)).totals;

    let recent_start = store.dates().rev().take(RECENT_DATE_KEYS).last().copied();
    let recent_days = match (recent_start, store.last_date()) {
        (Some(start), Some(end)) => summarize(store, start, end, Some(&active)).daily,
        _ => Vec::new(),
    };

    let passive_members = members
        .iter()
        .filter(|member| member.is_active && policy.is_passive(member.days_without_deposit))
        .map(|member| PassiveMember::new(member, policy, today))
        .collect();

    DashboardView {
        today,
        month_start,
        month,
        recent_days,
        total_members: members.len(),
        active_members: active.len(),
        passive_members,
        stored_days: store.day_count(),
        first_date: store.first_date(),
        last_date: store.last_date(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::parse_date;
    use crate::value_objects::MemberCategory;
    use chrono::NaiveDateTime;

    fn day(value: &str) -> NaiveDate {
        parse_date(value).expect("date")
    }

    fn record(id: &str, name: &str, deposits: i64, withdrawals: i64) -> Record {
        let mut record = Record::new(id);
        record.username = name.to_string();
        record.deposit_count = 1;
        record.total_deposits = Decimal::from(deposits);
        record.total_withdrawals = Decimal::from(withdrawals);
        record
    }

    fn now() -> NaiveDateTime {
        day("2025-06-15").and_hms_opt(9, 0, 0).expect("time")
    }

    fn sample_store() -> DailyStore {
        let mut store = DailyStore::new();
        store.upsert(
            day("2025-06-01"),
            "AFF-1",
            vec![record("1", "alice", 100, 20), record("2", "bob", 50, 0)],
        );
        store.upsert(day("2025-06-01"), "AFF-2", vec![record("1", "", 10, 0)]);
        store.upsert(day("2025-06-03"), "AFF-1", vec![record("1", "alice2", 5, 50)]);
        store.upsert(day("2025-06-20"), "AFF-1", vec![record("3", "carol", 1000, 0)]);
        store
    }

    #[test]
    fn totals_equal_sum_of_records_in_range() {
        let store = sample_store();
        let report = summarize(&store, day("2025-06-01"), day("2025-06-10"), None);
        assert_eq!(report.totals.total_deposits, Decimal::from(165));
        assert_eq!(report.totals.total_withdrawals, Decimal::from(70));
        assert_eq!(report.totals.net, Decimal::from(95));
        assert_eq!(report.totals.record_count, 4);
        assert_eq!(report.totals.member_count, 2);
        assert_eq!(report.day_count, 10);
        assert_eq!(report.days_with_data, 2);
        assert_eq!(report.daily.len(), 2);
        assert_eq!(report.daily[0].total_deposits, Decimal::from(160));
        assert_eq!(report.daily[1].net, Decimal::from(-45));
    }

    #[test]
    fn members_sorted_by_net_with_last_seen_names() {
        let store = sample_store();
        let report = summarize(&store, day("2025-06-01"), day("2025-06-10"), None);
        let ids: Vec<&str> = report.members.iter().map(|m| m.member_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        let alice = &report.members[1];
        assert_eq!(alice.total_deposits, Decimal::from(115));
        assert_eq!(alice.net, Decimal::from(45));
        assert_eq!(alice.username, "alice2");
        assert_eq!(alice.deposit_count, 3);
        assert_eq!(alice.active_days, 2);
    }

    #[test]
    fn equal_net_keeps_first_seen_order() {
        let mut store = DailyStore::new();
        store.upsert(
            day("2025-06-01"),
            "AFF",
            vec![record("b", "", 10, 0), record("a", "", 10, 0), record("c", "", 20, 0)],
        );
        let report = summarize(&store, day("2025-06-01"), day("2025-06-01"), None);
        let ids: Vec<&str> = report.members.iter().map(|m| m.member_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn active_filter_excludes_other_members() {
        let store = sample_store();
        let active: HashSet<String> = ["2".to_string()].into_iter().collect();
        let report = summarize(&store, day("2025-06-01"), day("2025-06-30"), Some(&active));
        assert!(report.active_only);
        assert_eq!(report.members.len(), 1);
        assert_eq!(report.totals.total_deposits, Decimal::from(50));
        assert_eq!(report.daily.len(), 3);
        assert_eq!(report.daily[1].record_count, 0);
    }

    #[test]
    fn tags_are_summed_and_sorted() {
        let store = sample_store();
        let report = summarize(&store, day("2025-06-01"), day("2025-06-30"), None);
        let tags: Vec<&str> = report.tags.iter().map(|t| t.tag.as_str()).collect();
        assert_eq!(tags, vec!["AFF-1", "AFF-2"]);
        assert_eq!(report.tags[0].total_deposits, Decimal::from(1155));
        assert_eq!(report.tags[0].member_count, 3);
    }

    #[test]
    fn reversed_range_is_empty() {
        let store = sample_store();
        let report = summarize(&store, day("2025-06-10"), day("2025-06-01"), None);
        assert_eq!(report.day_count, 0);
        assert!(report.daily.is_empty());
        assert_eq!(report.totals, Totals::default());
    }

    #[test]
    fn extreme_amounts_saturate_instead_of_overflowing() {
        let mut huge = Record::new("1");
        huge.deposit_count = u64::MAX;
        huge.total_deposits = Decimal::MAX;
        let mut drain = Record::new("2");
        drain.total_withdrawals = Decimal::MAX;
        let mut store = DailyStore::new();
        store.upsert(day("2025-06-01"), "AFF", vec![huge.clone(), huge, drain]);

        let report = summarize(&store, day("2025-06-01"), day("2025-06-01"), None);
        assert_eq!(report.totals.total_deposits, Decimal::MAX);
        assert_eq!(report.totals.deposit_count, u64::MAX);
        assert_eq!(report.totals.net, Decimal::ZERO);
        assert_eq!(report.members[0].total_deposits, Decimal::MAX);
        assert_eq!(report.members[1].net, Decimal::MIN);
    }

    #[test]
    fn record_lines_follow_date_then_tag_order() {
        let store = sample_store();
        let report = summarize(&store, day("2025-06-01"), day("2025-06-03"), None);
        let lines: Vec<(String, &str, &str)> = report
            .records
            .iter()
            .map(|line| (line.date.to_string(), line.tag.as_str(), line.member_id.as_str()))
            .collect();
        assert_eq!(
            lines,
            vec![
                ("2025-06-01".to_string(), "AFF-1", "1"),
                ("2025-06-01".to_string(), "AFF-1", "2"),
                ("2025-06-01".to_string(), "AFF-2", "1"),
                ("2025-06-03".to_string(), "AFF-1", "1"),
            ]
        );
        assert_eq!(report.records[3].net, Decimal::from(-45));
        assert_eq!(report.records[3].username, "alice2");
    }

    #[test]
    fn scores_attach_only_to_roster_members() {
        let store = sample_store();
        let mut report = summarize(&store, day("2025-06-01"), day("2025-06-10"), None);
        let mut alice = Member::new("1", "alice", "Alice", now());
        alice.days_without_deposit = 3;
        alice.balance = Decimal::from(2000);
        alice.total_deposits = Decimal::from(20_000);
        attach_scores(&mut report, &[alice], day("2025-06-15"));

        let alice = report.members.iter().find(|m| m.member_id == "1").expect("alice");
        assert_eq!(alice.score.map(|score| score.value()), Some(85));
        assert_eq!(alice.category, Some(MemberCategory::Vip));
        let bob = report.members.iter().find(|m| m.member_id == "2").expect("bob");
        assert_eq!(bob.score, None);
        assert_eq!(bob.category, None);
    }

    #[test]
    fn dashboard_counts_month_for_active_members_only() {
        let store = sample_store();
        let mut alice = Member::new("1", "alice", "Alice", now());
        alice.days_without_deposit = 2;
        let mut bob = Member::new("2", "bob", "Bob", now());
        bob.days_without_deposit = 40;
        let mut carol = Member::new("3", "carol", "Carol", now());
        carol.is_active = false;
        let members = vec![alice, bob, carol];

        let view = build_dashboard(&store, &members, day("2025-06-15"), &ActivityPolicy::default());
        assert_eq!(view.month_start, day("2025-06-01"));
        assert_eq!(view.month.total_deposits, Decimal::from(165));
        assert_eq!(view.total_members, 3);
        assert_eq!(view.active_members, 2);
        assert_eq!(view.passive_members.len(), 1);
        assert_eq!(view.passive_members[0].member_id, "2");
        assert_eq!(view.passive_members[0].activity, "AT_RISK");
        assert_eq!(view.passive_members[0].score.value(), 15);
        assert_eq!(view.passive_members[0].category, MemberCategory::Risk);
        assert_eq!(view.recent_days.len(), 3);
        assert_eq!(view.stored_days, 3);
    }

    #[test]
    fn dashboard_recent_days_are_the_last_seven_keys() {
        let mut store = DailyStore::new();
        for d in 1..=10 {
            let date = NaiveDate::from_ymd_opt(2025, 5, d).expect("date");
            store.upsert(date, "AFF", vec![record("1", "", 1, 0)]);
        }
        let members = vec![Member::new("1", "a", "A", now())];
        let view = build_dashboard(&store, &members, day("2025-06-15"), &ActivityPolicy::default());
        assert_eq!(view.recent_days.len(), 7);
        assert_eq!(view.recent_days[0].date, day("2025-05-04"));
        assert_eq!(view.month.record_count, 0);
    }
}
