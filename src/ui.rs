use crate::models::DashboardTotals;

pub fn render_index(totals: &DashboardTotals) -> String {
    INDEX_HTML
        .replace("{{REPORTS}}", &totals.report_count.to_string())
        .replace("{{ACTIVE}}", &totals.active_warranties.to_string())
        .replace("{{DUE}}", &totals.due_maintenance.to_string())
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Repair Portal</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #eef3f6;
      --bg-2: #c9dbe4;
      --ink: #26303a;
      --accent: #1f7a6d;
      --accent-2: #2f4858;
      --danger: #c63b2b;
      --warn: #b97e1e;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.16);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #e3ecf1 60%, #f2f6f8 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(960px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
      animation: rise 600ms ease;
    }

    header {
      display: flex;
      flex-direction: column;
      gap: 6px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.8rem);
      margin: 0;
    }

    .subtitle {
      margin: 0;
      color: #5c6670;
      font-size: 1rem;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 8px;
    }

    .stat .label {
      display: block;
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #7d8790;
    }

    .stat .value {
      display: block;
      font-size: 1.7rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .stat .value.due {
      color: var(--danger);
    }

    .tabs {
      display: flex;
      gap: 6px;
      padding: 6px;
      background: rgba(47, 72, 88, 0.08);
      border-radius: 999px;
      width: fit-content;
    }

    .tab {
      appearance: none;
      background: transparent;
      border: none;
      border-radius: 999px;
      padding: 8px 16px;
      font-size: 0.9rem;
      font-weight: 600;
      color: #636c75;
      cursor: pointer;
    }

    .tab.active {
      background: white;
      color: var(--accent-2);
      box-shadow: 0 8px 16px rgba(47, 72, 88, 0.12);
    }

    .report-card {
      background: white;
      border-radius: 20px;
      padding: 20px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 14px;
    }

    .report-head {
      display: flex;
      flex-wrap: wrap;
      justify-content: space-between;
      gap: 8px;
      align-items: baseline;
    }

    .report-head h3 {
      margin: 0;
      font-size: 1.15rem;
    }

    .report-meta {
      color: #6b747d;
      font-size: 0.9rem;
    }

    .coverage-row {
      display: grid;
      grid-template-columns: minmax(160px, 1fr) auto;
      gap: 10px;
      align-items: center;
      padding: 10px 0;
      border-top: 1px solid rgba(47, 72, 88, 0.08);
    }

    .coverage-row .name {
      font-weight: 500;
    }

    .coverage-row .detail {
      color: #6b747d;
      font-size: 0.85rem;
    }

    .bar {
      grid-column: 1 / -1;
      height: 8px;
      border-radius: 999px;
      background: rgba(47, 72, 88, 0.1);
      overflow: hidden;
    }

    .bar span {
      display: block;
      height: 100%;
      border-radius: 999px;
      background: var(--accent);
    }

    .bar span.expired {
      background: rgba(47, 72, 88, 0.35);
    }

    .badge {
      justify-self: end;
      font-size: 0.78rem;
      font-weight: 600;
      text-transform: uppercase;
      letter-spacing: 0.08em;
      padding: 4px 12px;
      border-radius: 999px;
    }

    .badge.active, .badge.completed {
      background: rgba(31, 122, 109, 0.14);
      color: var(--accent);
    }

    .badge.expired {
      background: rgba(47, 72, 88, 0.12);
      color: #5c6670;
    }

    .badge.due {
      background: rgba(198, 59, 43, 0.14);
      color: var(--danger);
    }

    .badge.upcoming {
      background: rgba(185, 126, 30, 0.16);
      color: var(--warn);
    }

    .badge.scheduled {
      background: rgba(47, 72, 88, 0.1);
      color: var(--accent-2);
    }

    table {
      width: 100%;
      border-collapse: collapse;
      background: white;
      border-radius: 20px;
      overflow: hidden;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    th, td {
      text-align: left;
      padding: 12px 16px;
      font-size: 0.92rem;
    }

    th {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: #7d8790;
      border-bottom: 1px solid rgba(47, 72, 88, 0.12);
    }

    tr + tr td {
      border-top: 1px solid rgba(47, 72, 88, 0.06);
    }

    .done-btn {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 6px 14px;
      font-size: 0.85rem;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
    }

    .done-btn:disabled {
      background: rgba(47, 72, 88, 0.2);
      cursor: default;
    }

    .status {
      font-size: 0.95rem;
      color: #636c75;
      min-height: 1.2em;
    }

    .status[data-type="error"] {
      color: var(--danger);
    }

    .status[data-type="ok"] {
      color: #2d7a4b;
    }

    .hint {
      margin: 0;
      color: #6f757b;
      font-size: 0.9rem;
    }

    .empty {
      color: #6b747d;
      font-size: 0.95rem;
      padding: 12px 0;
    }

    @keyframes rise {
      from {
        opacity: 0;
        transform: translateY(18px);
      }
      to {
        opacity: 1;
        transform: translateY(0);
      }
    }

    @media (max-width: 600px) {
      .app {
        padding: 28px 22px;
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Repair Portal</h1>
      <p class="subtitle">Warranty and maintenance coverage for your repair reports.</p>
    </header>

    <section class="panel">
      <div class="stat">
        <span class="label">Reports</span>
        <span class="value">{{REPORTS}}</span>
      </div>
      <div class="stat">
        <span class="label">Devices under warranty</span>
        <span class="value">{{ACTIVE}}</span>
      </div>
      <div class="stat">
        <span class="label">Maintenance due</span>
        <span class="value due">{{DUE}}</span>
      </div>
    </section>

    <div class="tabs" role="tablist">
      <button class="tab active" type="button" data-tab="warranties" role="tab" aria-selected="true">Warranties</button>
      <button class="tab" type="button" data-tab="maintenance" role="tab" aria-selected="false">Maintenance</button>
    </div>

    <section id="warranties-view" style="display: grid; gap: 16px;"></section>

    <section id="maintenance-view" style="display: none;">
      <table>
        <thead>
          <tr>
            <th>Device</th>
            <th>Customer</th>
            <th>Service</th>
            <th>Due</th>
            <th>Status</th>
            <th></th>
          </tr>
        </thead>
        <tbody id="maintenance-rows"></tbody>
      </table>
    </section>

    <div class="status" id="status"></div>
    <p class="hint">Coverage is recomputed from the report date on every refresh. Maintenance stays listed until it is marked done.</p>
  </main>

  <script>
    const statusEl = document.getElementById('status');
    const warrantiesView = document.getElementById('warranties-view');
    const maintenanceView = document.getElementById('maintenance-view');
    const maintenanceRows = document.getElementById('maintenance-rows');
    const tabs = Array.from(document.querySelectorAll('.tab'));

    const POLICY_LABELS = {
      manufacturing_defect: 'Manufacturing defect (6 months)',
      replacement: 'Replacement (14 days)',
      general_maintenance_warranty: 'General maintenance warranty (1 year)',
      periodic_maintenance_1: 'Periodic maintenance (6 months)',
      periodic_maintenance_2: 'Periodic maintenance (12 months)'
    };

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const escapeHtml = (value) =>
      String(value).replace(/[&<>"']/g, (ch) => ({
        '&': '&amp;',
        '<': '&lt;',
        '>': '&gt;',
        '"': '&quot;',
        "'": '&#39;'
      })[ch]);

    const badge = (status) =>
      `<span class="badge ${status}">${status}</span>`;

    const formatMoney = (cents) => `$${(cents / 100).toFixed(2)}`;

    const coverageRow = (warranty) => {
      const label = POLICY_LABELS[warranty.policy] || warranty.policy;
      const detail = warranty.status === 'active'
        ? `${warranty.days_remaining} day${warranty.days_remaining === 1 ? '' : 's'} left (ends ${warranty.end_date})`
        : `ended ${warranty.end_date}`;
      return `
        <div class="coverage-row">
          <div>
            <div class="name">${escapeHtml(label)}</div>
            <div class="detail">${escapeHtml(detail)} &middot; ${warranty.percent_elapsed}% elapsed</div>
          </div>
          ${badge(warranty.status)}
          <div class="bar"><span class="${warranty.status}" style="width: ${warranty.percent_elapsed}%"></span></div>
        </div>
      `;
    };

    const renderReports = (payload) => {
      if (!payload.reports.length) {
        warrantiesView.innerHTML = '<div class="empty">No repair reports yet.</div>';
        return;
      }
      warrantiesView.innerHTML = payload.reports
        .map((report) => {
          const invoice = report.invoice
            ? ` &middot; Invoice ${escapeHtml(report.invoice.number)} (${formatMoney(report.invoice.amount_cents)})`
            : '';
          return `
            <article class="report-card">
              <div class="report-head">
                <h3>${escapeHtml(report.device.brand)} ${escapeHtml(report.device.model)}</h3>
                <span class="report-meta">Reported ${escapeHtml(report.reported_at.slice(0, 10))}</span>
              </div>
              <div class="report-meta">
                ${escapeHtml(report.customer)} &middot; ${escapeHtml(report.issue)} &middot; S/N ${escapeHtml(report.device.serial)}${invoice}
              </div>
              <div>${report.warranties.map(coverageRow).join('')}</div>
            </article>
          `;
        })
        .join('');

      if (payload.skipped.length) {
        setStatus(`${payload.skipped.length} report(s) skipped (invalid report date)`, 'error');
      }
    };

    const renderMaintenance = (payload) => {
      if (!payload.entries.length) {
        maintenanceRows.innerHTML = '<tr><td colspan="6" class="empty">Nothing scheduled.</td></tr>';
        return;
      }
      maintenanceRows.innerHTML = payload.entries
        .map((entry) => {
          const action = entry.status === 'completed'
            ? '<button class="done-btn" disabled>Done</button>'
            : `<button class="done-btn" data-report="${escapeHtml(entry.report_id)}" data-policy="${escapeHtml(entry.policy)}">Mark done</button>`;
          const remaining = entry.status === 'due'
            ? 'overdue'
            : entry.status === 'completed'
              ? '&mdash;'
              : `${entry.days_remaining} days`;
          return `
            <tr>
              <td>${escapeHtml(entry.device)}</td>
              <td>${escapeHtml(entry.customer)}</td>
              <td>${escapeHtml(POLICY_LABELS[entry.policy] || entry.policy)}</td>
              <td>${escapeHtml(entry.due_date)} (${remaining})</td>
              <td>${badge(entry.status)}</td>
              <td>${action}</td>
            </tr>
          `;
        })
        .join('');
    };

    const loadReports = async () => {
      const res = await fetch('/api/reports');
      if (!res.ok) {
        throw new Error('Unable to load reports');
      }
      renderReports(await res.json());
    };

    const loadMaintenance = async () => {
      const res = await fetch('/api/maintenance');
      if (!res.ok) {
        throw new Error('Unable to load maintenance schedule');
      }
      renderMaintenance(await res.json());
    };

    const markDone = async (reportId, policy) => {
      setStatus('Saving...', 'info');
      const res = await fetch('/api/maintenance/complete', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ report_id: reportId, policy })
      });

      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }

      await loadMaintenance();
      setStatus('Saved', 'ok');
      setTimeout(() => setStatus('', ''), 1200);
    };

    const setActiveTab = (tab) => {
      tabs.forEach((button) => {
        const isActive = button.dataset.tab === tab;
        button.classList.toggle('active', isActive);
        button.setAttribute('aria-selected', String(isActive));
      });
      warrantiesView.style.display = tab === 'warranties' ? 'grid' : 'none';
      maintenanceView.style.display = tab === 'maintenance' ? 'block' : 'none';
    };

    tabs.forEach((button) => {
      button.addEventListener('click', () => setActiveTab(button.dataset.tab));
    });

    maintenanceRows.addEventListener('click', (event) => {
      const button = event.target.closest('button[data-report]');
      if (!button) {
        return;
      }
      markDone(button.dataset.report, button.dataset.policy).catch((err) =>
        setStatus(err.message, 'error')
      );
    });

    Promise.all([loadReports(), loadMaintenance()]).catch((err) =>
      setStatus(err.message, 'error')
    );
  </script>
</body>
</html>
"#;
