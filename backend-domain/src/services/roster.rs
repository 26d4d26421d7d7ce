use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::entities::{DiscoveredMember, Member, MemberListQuery, Record};
use crate::value_objects::{ActivityLevel, ActivityPolicy, MemberCategory, MemberScore};

#[derive(Debug, Clone, Serialize)]
pub struct MemberView {
    #[serde(flatten)]
    pub member: Member,
    pub activity: ActivityLevel,
    pub passive: bool,
    pub score: MemberScore,
    pub category: MemberCategory,
}

impl MemberView {
    pub fn new(member: Member, policy: &ActivityPolicy, today: NaiveDate) -> Self {
        let activity = member.activity(policy);
        let passive = policy.is_passive(member.days_without_deposit);
        let score = member.score(today);
        Self {
            member,
            activity,
            passive,
            score,
            category: score.category(),
        }
    }
}

pub fn find_member<'a>(members: &'a [Member], member_id: &str) -> Option<&'a Member> {
    members.iter().find(|member| member.member_id == member_id)
}

/// Ids present in an upload but not on the roster, first occurrence wins.
pub fn discover_new_members(members: &[Member], records: &[Record]) -> Vec<DiscoveredMember> {
    let known: HashSet<&str> = members.iter().map(|m| m.member_id.as_str()).collect();
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|record| !known.contains(record.member_id.as_str()))
        .filter(|record| seen.insert(record.member_id.clone()))
        .map(DiscoveredMember::from)
        .collect()
}

pub fn filter_members(
    members: &[Member],
    query: &MemberListQuery,
    policy: &ActivityPolicy,
    today: NaiveDate,
) -> Vec<MemberView> {
    let search = query.search.as_deref().unwrap_or("");
    members
        .iter()
        .filter(|member| !query.active_only || member.is_active)
        .filter(|member| member.matches_search(search))
        .cloned()
        .map(|member| MemberView::new(member, policy, today))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::parse_date;

    fn today() -> NaiveDate {
        parse_date("2025-06-15").expect("date")
    }

    fn member(id: &str, active: bool) -> Member {
        let now = parse_date("2025-06-15")
            .expect("date")
            .and_hms_opt(0, 0, 0)
            .expect("time");
        let mut member = Member::new(id, format!("user{}", id), "", now);
        member.is_active = active;
        member
    }

    #[test]
    fn discovers_unknown_ids_once() {
        let members = vec![member("100001", true)];
        let mut first = Record::new("200002");
        first.username = "new".to_string();
        let records = vec![
            Record::new("100001"),
            first,
            Record::new("200002"),
            Record::new("300003"),
        ];
        let found = discover_new_members(&members, &records);
        let ids: Vec<&str> = found.iter().map(|d| d.member_id.as_str()).collect();
        assert_eq!(ids, vec!["200002", "300003"]);
        assert_eq!(found[0].username, "new");
    }

    #[test]
    fn filters_by_activity_and_search() {
        let members = vec![member("100001", true), member("200002", false)];
        let policy = ActivityPolicy::default();
        let all = filter_members(&members, &MemberListQuery::default(), &policy, today());
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].activity, ActivityLevel::Unknown);
        assert_eq!(all[0].category, MemberCategory::Risk);

        let active = MemberListQuery {
            search: None,
            active_only: true,
        };
        assert_eq!(filter_members(&members, &active, &policy, today()).len(), 1);

        let search = MemberListQuery {
            search: Some("USER2".to_string()),
            active_only: false,
        };
        let found = filter_members(&members, &search, &policy, today());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].member.member_id, "200002");
    }
}
