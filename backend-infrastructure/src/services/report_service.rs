use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::fs;
use tracing::info;

use backend_domain::{ActivityReport, MemberSummary, ReportPublisher};

use crate::utils::escape_html;

const MEMBER_ROW_LIMIT: usize = 500;
const RECORD_ROW_LIMIT: usize = 2000;

/// Standalone HTML reports written as `<start>_<end>.html` under `report_dir`.
pub struct HtmlReportService {
    report_dir: PathBuf,
}

impl HtmlReportService {
    pub fn new(report_dir: impl Into<PathBuf>) -> Self {
        Self {
            report_dir: report_dir.into(),
        }
    }

    pub fn report_path(&self, report: &ActivityReport) -> PathBuf {
        self.report_dir
            .join(format!("{}_{}.html", report.start, report.end))
    }
}

#[async_trait]
impl ReportPublisher for HtmlReportService {
    fn render_html(&self, report: &ActivityReport) -> String {
        render_report(report)
    }

    async fn publish(&self, report: &ActivityReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.report_dir)
            .await
            .with_context(|| format!("create report dir {}", self.report_dir.display()))?;
        let path = self.report_path(report);
        fs::write(&path, render_report(report))
            .await
            .with_context(|| format!("write report {}", path.display()))?;
        info!("report written to {}", path.display());
        Ok(path)
    }
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value)
}

fn net_class(value: Decimal) -> &'static str {
    if value.is_sign_negative() && !value.is_zero() {
        "net-negative"
    } else {
        "net-positive"
    }
}

fn category_label(member: &MemberSummary) -> &'static str {
    member.category.map_or("-", |category| category.as_str())
}

pub fn render_report(report: &ActivityReport) -> String {
    let mut daily_rows = String::new();
    for day in &report.daily {
        daily_rows.push_str(&format!(
            "<tr>\
            <td class=\"date\">{date}</td>\
            <td class=\"count\">{members}</td>\
            <td class=\"count\">{deposit_count}</td>\
            <td class=\"count\">{deposits}</td>\
            <td class=\"count\">{withdrawal_count}</td>\
            <td class=\"count\">{withdrawals}</td>\
            <td class=\"count {net_class}\">{net}</td>\
            </tr>",
            date = day.date,
            members = day.member_count,
            deposit_count = day.deposit_count,
            deposits = money(day.total_deposits),
            withdrawal_count = day.withdrawal_count,
            withdrawals = money(day.total_withdrawals),
            net_class = net_class(day.net),
            net = money(day.net),
        ));
    }

    let mut member_rows = String::new();
    for member in report.members.iter().take(MEMBER_ROW_LIMIT) {
        member_rows.push_str(&format!(
            "<tr>\
            <td class=\"id\">{id}</td>\
            <td>{username}</td>\
            <td>{name}</td>\
            <td>{category}</td>\
            <td class=\"count\">{days}</td>\
            <td class=\"count\">{deposits}</td>\
            <td class=\"count\">{withdrawals}</td>\
            <td class=\"count {net_class}\">{net}</td>\
            </tr>",
            id = escape_html(&member.member_id),
            username = escape_html(&member.username),
            name = escape_html(&member.customer_name),
            category = category_label(member),
            days = member.active_days,
            deposits = money(member.total_deposits),
            withdrawals = money(member.total_withdrawals),
            net_class = net_class(member.net),
            net = money(member.net),
        ));
    }

    let mut record_rows = String::new();
    for line in report.records.iter().take(RECORD_ROW_LIMIT) {
        record_rows.push_str(&format!(
            "<tr>\
            <td class=\"date\">{date}</td>\
            <td>{tag}</td>\
            <td class=\"id\">{id}</td>\
            <td>{username}</td>\
            <td>{name}</td>\
            <td class=\"count\">{deposits}</td>\
            <td class=\"count\">{withdrawals}</td>\
            <td class=\"count {net_class}\">{net}</td>\
            </tr>",
            date = line.date,
            tag = escape_html(&line.tag),
            id = escape_html(&line.member_id),
            username = escape_html(&line.username),
            name = escape_html(&line.customer_name),
            deposits = money(line.total_deposits),
            withdrawals = money(line.total_withdrawals),
            net_class = net_class(line.net),
            net = money(line.net),
        ));
    }

    let mut tag_rows = String::new();
    for tag in &report.tags {
        tag_rows.push_str(&format!(
            "<tr><td>{tag}</td><td class=\"count\">{members}</td><td class=\"count\">{deposits}</td>\
            <td class=\"count\">{withdrawals}</td><td class=\"count {net_class}\">{net}</td></tr>",
            tag = escape_html(&tag.tag),
            members = tag.member_count,
            deposits = money(tag.total_deposits),
            withdrawals = money(tag.total_withdrawals),
            net_class = net_class(tag.net),
            net = money(tag.net),
        ));
    }

    let scope = if report.active_only {
        "Active members only"
    } else {
        "All members"
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="tr">
<head>
<meta charset="utf-8" />
<meta name="viewport" content="width=device-width, initial-scale=1" />
<title>BTag Report {start} - {end}</title>
<style>
:root {{
  --ink: #0f172a;
  --muted: #64748b;
  --border: #e2e8f0;
  --shadow: rgba(15, 23, 42, 0.14);
  --positive: #16a34a;
  --negative: #dc2626;
}}
* {{ box-sizing: border-box; }}
body {{
  margin: 0;
  font-family: "IBM Plex Sans", "Source Sans 3", sans-serif;
  background: radial-gradient(circle at top, #1e293b 0%, #0f172a 55%, #0b1220 100%);
  color: #e2e8f0;
}}
.page {{ max-width: 1200px; margin: 0 auto; padding: 32px 20px 48px; }}
.hero {{
  background: linear-gradient(135deg, rgba(37,99,235,0.18), rgba(15,23,42,0.95));
  border-radius: 20px;
  padding: 28px;
  box-shadow: 0 18px 40px rgba(15, 23, 42, 0.35);
}}
.hero h1 {{ margin: 0 0 6px; font-size: 28px; }}
.hero p {{ margin: 0; color: var(--muted); font-size: 14px; }}
.summary {{
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
  gap: 12px;
  margin-top: 18px;
}}
.card {{
  background: rgba(255,255,255,0.96);
  color: var(--ink);
  padding: 16px 18px;
  border-radius: 14px;
  box-shadow: 0 8px 20px rgba(15, 23, 42, 0.12);
}}
.card .label {{
  font-size: 11px;
  text-transform: uppercase;
  letter-spacing: 0.12em;
  color: var(--muted);
}}
.card .value {{ font-size: 22px; font-weight: 700; margin-top: 6px; }}
h2 {{ margin: 28px 0 12px; font-size: 18px; }}
.table-wrap {{
  background: #ffffff;
  color: var(--ink);
  border-radius: 16px;
  overflow: hidden;
  box-shadow: 0 12px 28px var(--shadow);
}}
.table {{ width: 100%; border-collapse: collapse; font-size: 14px; }}
.table thead th {{
  text-align: left;
  font-size: 11px;
  letter-spacing: 0.12em;
  text-transform: uppercase;
  color: #64748b;
  background: #f1f5f9;
  padding: 12px 14px;
}}
.table tbody td {{ padding: 10px 14px; border-bottom: 1px solid var(--border); }}
.table tbody tr:nth-child(even) {{ background: #f8fafc; }}
.table .count {{
  text-align: right;
  font-variant-numeric: tabular-nums;
  font-family: "IBM Plex Mono", "JetBrains Mono", monospace;
}}
.table .id {{ font-family: "IBM Plex Mono", "JetBrains Mono", monospace; font-size: 12px; }}
.net-positive {{ color: var(--positive); }}
.net-negative {{ color: var(--negative); }}
.footer {{ margin-top: 16px; color: var(--muted); font-size: 12px; }}
</style>
</head>
<body>
<div class="page">
  <section class="hero">
    <h1>BTag Activity Report</h1>
    <p>{start} - {end} · {day_count} day(s), {days_with_data} with uploads · {scope}</p>
    <div class="summary">
      <div class="card"><div class="label">Members</div><div class="value">{member_count}</div></div>
      <div class="card"><div class="label">Deposits</div><div class="value">{deposits}</div></div>
      <div class="card"><div class="label">Withdrawals</div><div class="value">{withdrawals}</div></div>
      <div class="card"><div class="label">Net</div><div class="value {net_class}">{net}</div></div>
    </div>
  </section>

  <h2>Daily</h2>
  <div class="table-wrap">
    <table class="table">
      <thead><tr><th>Date</th><th>Members</th><th>Deposit Count</th><th>Deposits</th><th>Withdrawal Count</th><th>Withdrawals</th><th>Net</th></tr></thead>
      <tbody>
      {daily_rows}
      </tbody>
    </table>
  </div>

  <h2>Members</h2>
  <div class="table-wrap">
    <table class="table">
      <thead><tr><th>ID</th><th>Username</th><th>Name</th><th>Category</th><th>Days</th><th>Deposits</th><th>Withdrawals</th><th>Net</th></tr></thead>
      <tbody>
      {member_rows}
      </tbody>
    </table>
  </div>

  <h2>Tags</h2>
  <div class="table-wrap">
    <table class="table">
      <thead><tr><th>Tag</th><th>Members</th><th>Deposits</th><th>Withdrawals</th><th>Net</th></tr></thead>
      <tbody>
      {tag_rows}
      </tbody>
    </table>
  </div>

  <h2>Records</h2>
  <div class="table-wrap">
    <table class="table">
      <thead><tr><th>Date</th><th>Tag</th><th>ID</th><th>Username</th><th>Name</th><th>Deposits</th><th>Withdrawals</th><th>Net</th></tr></thead>
      <tbody>
      {record_rows}
      </tbody>
    </table>
  </div>

  <div class="footer">Showing up to {limit} members ranked by net amount and the first {record_limit} of {record_count} records.</div>
</div>
</body>
</html>"#,
        start = report.start,
        end = report.end,
        day_count = report.day_count,
        days_with_data = report.days_with_data,
        scope = scope,
        member_count = report.totals.member_count,
        deposits = money(report.totals.total_deposits),
        withdrawals = money(report.totals.total_withdrawals),
        net_class = net_class(report.totals.net),
        net = money(report.totals.net),
        daily_rows = daily_rows,
        member_rows = member_rows,
        tag_rows = tag_rows,
        record_rows = record_rows,
        limit = MEMBER_ROW_LIMIT,
        record_limit = RECORD_ROW_LIMIT,
        record_count = report.records.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend_domain::{parse_date, summarize, DailyStore, MemberCategory, Record};

    fn sample_report() -> ActivityReport {
        let mut store = DailyStore::new();
        let mut record = Record::new("303364529");
        record.username = "<script>alert(1)</script>".to_string();
        record.customer_name = "Ayşe & Co".to_string();
        record.total_deposits = Decimal::from(1500);
        record.total_withdrawals = Decimal::from(1750);
        let date = parse_date("2025-06-01").expect("date");
        store.upsert(date, "AFF", vec![record]);
        summarize(&store, date, date, None)
    }

    #[test]
    fn escapes_member_text() {
        let html = render_report(&sample_report());
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("Ayşe &amp; Co"));
        assert!(!html.contains("<script>alert(1)"));
    }

    #[test]
    fn renders_totals_and_negative_net() {
        let html = render_report(&sample_report());
        assert!(html.contains("2025-06-01 - 2025-06-01"));
        assert!(html.contains("1500.00"));
        assert!(html.contains("-250.00"));
        assert!(html.contains("net-negative"));
    }

    #[test]
    fn lists_every_record_in_the_detail_section() {
        let mut store = DailyStore::new();
        let first = parse_date("2025-06-01").expect("date");
        let second = parse_date("2025-06-02").expect("date");
        let mut early = Record::new("111");
        early.total_deposits = Decimal::from(10);
        let mut late = Record::new("222");
        late.username = "zeynep".to_string();
        late.total_deposits = Decimal::from(75);
        store.upsert(first, "AFF-1", vec![early]);
        store.upsert(second, "AFF-2", vec![late]);
        let html = render_report(&summarize(&store, first, second, None));

        let detail = html.split("<h2>Records</h2>").nth(1).expect("records section");
        assert!(detail.contains("<td class=\"date\">2025-06-01</td><td>AFF-1</td><td class=\"id\">111</td>"));
        assert!(detail.contains("<td class=\"date\">2025-06-02</td><td>AFF-2</td><td class=\"id\">222</td><td>zeynep</td>"));
        assert!(detail.contains("75.00"));
        assert!(html.contains("of 2 records"));
    }

    #[test]
    fn member_rows_show_roster_category() {
        let mut report = sample_report();
        let html = render_report(&report);
        assert!(html.contains("<td>Ayşe &amp; Co</td><td>-</td>"));

        report.members[0].category = Some(MemberCategory::Vip);
        let html = render_report(&report);
        assert!(html.contains("<td>Ayşe &amp; Co</td><td>VIP</td>"));
    }

    #[tokio::test]
    async fn publish_writes_named_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = HtmlReportService::new(dir.path().join("reports"));
        let path = service.publish(&sample_report()).await.expect("publish");
        assert!(path.ends_with("2025-06-01_2025-06-01.html"));
        let written = std::fs::read_to_string(&path).expect("read");
        assert!(written.contains("BTag Activity Report"));
    }
}
