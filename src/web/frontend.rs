//! Embedded HTML frontend for the LAN dashboard.
//!
//! One page compiled into the binary as a string constant — no external
//! assets, no build tools, no CDN. It polls `/api/snapshot` and renders
//! the stat cards and the task table; everything heavier stays in the
//! terminal client.

/// The complete dashboard page.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="th">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>traindash</title>
<style>
:root {
  --bg: #0d1117; --surface: #161b22; --border: #30363d;
  --text: #e6edf3; --muted: #8b949e; --accent: #58a6ff;
  --green: #3fb950; --yellow: #d29922; --red: #f85149;
}
* { margin: 0; padding: 0; box-sizing: border-box; }
body { background: var(--bg); color: var(--text); font-family: sans-serif; font-size: 14px; }
.app { max-width: 1000px; margin: 0 auto; padding: 24px; }
h1 { font-size: 18px; margin-bottom: 16px; }
h1 small { color: var(--muted); font-weight: normal; margin-left: 8px; }
.cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(140px, 1fr)); gap: 12px; margin-bottom: 24px; }
.card { background: var(--surface); border: 1px solid var(--border); border-radius: 8px; padding: 12px; }
.card .label { color: var(--muted); font-size: 12px; }
.card .value { font-size: 24px; font-weight: bold; }
table { width: 100%; border-collapse: collapse; background: var(--surface); border-radius: 8px; }
th, td { text-align: left; padding: 8px 12px; border-bottom: 1px solid var(--border); }
th { color: var(--muted); font-size: 12px; }
.done { color: var(--green); }
.pending { color: var(--yellow); }
.degraded { color: var(--red); margin-bottom: 12px; display: none; }
</style>
</head>
<body>
<div class="app">
  <h1>งานอบรมครู<small id="updated"></small></h1>
  <div class="degraded" id="degraded">การเชื่อมต่อมีปัญหา — แสดงข้อมูลสำรอง</div>
  <div class="cards" id="cards"></div>
  <table>
    <thead><tr><th>งาน</th><th>ผู้รับผิดชอบ</th><th>กำหนดส่ง</th><th>สถานะ</th></tr></thead>
    <tbody id="rows"></tbody>
  </table>
</div>
<script>
const CARDS = [
  ["งานทั้งหมด", s => s.summary.totalTasks],
  ["เสร็จสมบูรณ์", s => s.summary.completedTasks],
  ["ยังไม่เสร็จ", s => s.summary.pendingTasks],
  ["งานปีนี้", s => s.summary.currentYearTasks],
  ["งานเดือนนี้", s => s.summary.currentMonthTasks],
  ["กำลังจะมาถึง", s => s.summary.upcomingTasks],
];

async function refresh() {
  const resp = await fetch("/api/snapshot");
  const data = await resp.json();
  document.getElementById("degraded").style.display = data.degraded ? "block" : "none";
  document.getElementById("cards").innerHTML = CARDS.map(([label, pick]) =>
    `<div class="card"><div class="label">${label}</div><div class="value">${pick(data.stats)}</div></div>`
  ).join("");
  document.getElementById("rows").innerHTML = data.tasks.map(t => {
    const done = t.completed === "Yes";
    return `<tr><td>${t.name}</td><td>${t.assignee}</td><td>${t.dueDate || "-"}</td>` +
      `<td class="${done ? "done" : "pending"}">${done ? "เสร็จสมบูรณ์" : "ยังไม่เสร็จ"}</td></tr>`;
  }).join("");
  document.getElementById("updated").textContent = new Date().toLocaleTimeString("th-TH");
}

refresh();
setInterval(refresh, 300000);
</script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontend_polls_the_snapshot_endpoint() {
        assert!(INDEX_HTML.contains("/api/snapshot"));
        assert!(INDEX_HTML.contains("setInterval(refresh, 300000)"));
    }
}
