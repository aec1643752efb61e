use crate::dispatch::dispatch;
use crate::models::TabContent;
use crate::state::Dashboard;
use std::collections::BTreeMap;

pub fn render_page(dashboard: &Dashboard) -> Result<String, serde_json::Error> {
    let initial: BTreeMap<&str, TabContent<'_>> = dashboard
        .groups
        .iter()
        .map(|group| {
            let content = dispatch(group, &dashboard.figures, Some(group.default_tab.tab_id()));
            (group.id, content)
        })
        .collect();

    let last_updated = dashboard
        .last_updated
        .map(|date| date.to_string())
        .unwrap_or_else(|| "n/a".to_string());

    let groups: String = dashboard
        .groups
        .iter()
        .map(|group| {
            let tabs: String = group
                .tabs
                .iter()
                .map(|chart| {
                    let active = *chart == group.default_tab;
                    format!(
                        r#"<button class="tab{}" type="button" data-tab="{}" role="tab" aria-selected="{}">{}</button>"#,
                        if active { " active" } else { "" },
                        chart.tab_id(),
                        active,
                        escape_html(chart.label()),
                    )
                })
                .collect();

            format!(
                r#"
    <section class="card" data-group="{id}">
      <div class="card-header">
        <h2>{title}</h2>
        <div class="tabs" id="{id}" role="tablist">{tabs}</div>
      </div>
      <div class="tab-content" id="{content_id}"></div>
    </section>"#,
                id = group.id,
                title = escape_html(group.title),
                content_id = group.content_id(),
            )
        })
        .collect();

    Ok(PAGE_HTML
        .replace("{{STYLE}}", STYLE)
        .replace("{{INITIAL}}", &script_json(&initial)?)
        .replace("{{GROUPS}}", &groups)
        .replace("{{LAST_UPDATED}}", &escape_html(&last_updated))
        .replace("{{TITLE}}", &escape_html(&dashboard.title)))
}

pub fn render_error(title: &str, message: &str) -> String {
    ERROR_HTML
        .replace("{{STYLE}}", STYLE)
        .replace("{{MESSAGE}}", &escape_html(message))
        .replace("{{TITLE}}", &escape_html(title))
}

fn script_json<T: serde::Serialize>(value: &T) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const STYLE: &str = r#"
    :root {
      --bg-1: #f6f2ec;
      --ink: #2b2a28;
      --accent: #e95420;
      --accent-2: #772953;
      --card: rgba(255, 255, 255, 0.92);
      --shadow: 0 24px 60px rgba(60, 30, 40, 0.14);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg-1), #fbe9df 60%, #f7f3ee 100%);
      color: var(--ink);
      font-family: "Ubuntu", "Trebuchet MS", sans-serif;
      padding: 24px 18px 48px;
    }

    .app {
      width: min(1100px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 24px;
    }

    .badge-row {
      display: flex;
      justify-content: flex-end;
    }

    .badge {
      background: var(--accent);
      color: white;
      border-radius: 999px;
      padding: 6px 14px;
      font-size: 0.85rem;
      font-weight: 600;
    }

    h1, h2 {
      text-align: center;
      margin: 0;
    }

    h1 {
      font-size: clamp(2rem, 4vw, 2.6rem);
    }

    .card {
      background: var(--card);
      border-radius: 20px;
      box-shadow: var(--shadow);
      overflow: hidden;
    }

    .card-header {
      display: grid;
      gap: 14px;
      justify-items: center;
      padding: 20px;
      border-bottom: 1px solid rgba(60, 30, 40, 0.08);
    }

    .tabs {
      display: flex;
      gap: 6px;
      padding: 6px;
      background: rgba(119, 41, 83, 0.08);
      border-radius: 999px;
    }

    .tab {
      appearance: none;
      background: transparent;
      border: none;
      border-radius: 999px;
      padding: 8px 16px;
      font-size: 0.9rem;
      font-weight: 600;
      color: #6b645d;
      cursor: pointer;
    }

    .tab.active {
      background: white;
      color: var(--accent-2);
      box-shadow: 0 8px 16px rgba(60, 30, 40, 0.12);
    }

    .tab-content {
      padding: 24px;
      min-height: 120px;
    }

    .tab-content svg {
      width: 100%;
      height: 380px;
      display: block;
    }

    .placeholder, .status {
      text-align: center;
      color: #6b645d;
    }

    .status[data-type="error"], .error {
      color: #c63b2b;
    }

    .chart-bar {
      fill: var(--accent);
    }

    .chart-line {
      fill: none;
      stroke: var(--accent-2);
      stroke-width: 2.5;
    }

    .chart-grid {
      stroke: rgba(60, 30, 40, 0.1);
    }

    .chart-label {
      fill: #7a746d;
      font-size: 11px;
    }

    .chart-title {
      fill: #4a4540;
      font-size: 12px;
      font-weight: 600;
    }
"#;

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main class="app">
    <div class="badge-row">
      <span class="badge" id="last-updated">Last updated: {{LAST_UPDATED}}</span>
    </div>
    <h1>{{TITLE}}</h1>
{{GROUPS}}
    <div class="status" id="status"></div>
  </main>

  <script id="initial-content" type="application/json">{{INITIAL}}</script>
  <script>
    const statusEl = document.getElementById('status');
    const initial = JSON.parse(document.getElementById('initial-content').textContent);
    const SVG_NS = 'http://www.w3.org/2000/svg';

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const formatAxisValue = (value) => {
      const abs = Math.abs(value);
      if (abs >= 1e6) return (value / 1e6).toFixed(1) + 'M';
      if (abs >= 1e3) return (value / 1e3).toFixed(1) + 'k';
      return Math.round(value).toString();
    };

    const el = (name, attrs, text) => {
      const node = document.createElementNS(SVG_NS, name);
      Object.entries(attrs).forEach(([key, value]) => node.setAttribute(key, value));
      if (text !== undefined) node.textContent = text;
      return node;
    };

    const renderFigure = (container, figure) => {
      const width = 960;
      const height = 380;
      const left = 64;
      const right = 16;
      const top = 16;
      const bottom = 56;

      const xs = figure.traces.length ? figure.traces[0].x : [];
      const values = figure.traces.flatMap((trace) => trace.y.filter((v) => v !== null));
      if (!xs.length || !values.length) {
        container.innerHTML = '<p class="placeholder">No data yet</p>';
        return;
      }

      let min = Math.min(0, ...values);
      let max = Math.max(0, ...values);
      if (min === max) {
        max += 1;
      }

      const plotW = width - left - right;
      const plotH = height - top - bottom;
      const band = plotW / xs.length;
      const x = (index) => left + band * (index + 0.5);
      const y = (value) => top + plotH - ((value - min) / (max - min)) * plotH;

      const svg = el('svg', { viewBox: `0 0 ${width} ${height}`, role: 'img', 'aria-label': figure.id });

      const ticks = 5;
      for (let i = 0; i <= ticks; i += 1) {
        const value = min + ((max - min) * i) / ticks;
        svg.appendChild(el('line', { class: 'chart-grid', x1: left, x2: width - right, y1: y(value), y2: y(value) }));
        svg.appendChild(el('text', { class: 'chart-label', x: left - 8, y: y(value) + 4, 'text-anchor': 'end' }, formatAxisValue(value)));
      }

      const labelEvery = Math.max(1, Math.ceil(xs.length / 10));
      xs.forEach((label, index) => {
        if (index % labelEvery === 0) {
          svg.appendChild(el('text', { class: 'chart-label', x: x(index), y: height - bottom + 16, 'text-anchor': 'middle' }, label));
        }
      });

      svg.appendChild(el('text', { class: 'chart-title', x: left + plotW / 2, y: height - 8, 'text-anchor': 'middle' }, figure.layout.x_title));
      svg.appendChild(el('text', { class: 'chart-title', x: 14, y: top + plotH / 2, 'text-anchor': 'middle', transform: `rotate(-90 14 ${top + plotH / 2})` }, figure.layout.y_title));

      figure.traces.forEach((trace) => {
        if (trace.kind === 'bar') {
          trace.y.forEach((value, index) => {
            if (value === null) return;
            const y0 = y(0);
            const y1 = y(value);
            svg.appendChild(el('rect', {
              class: 'chart-bar',
              x: x(index) - band * 0.4,
              y: Math.min(y0, y1),
              width: Math.max(band * 0.8, 0.5),
              height: Math.abs(y0 - y1),
              opacity: trace.opacity
            }));
          });
        } else {
          let path = '';
          let pen = false;
          trace.y.forEach((value, index) => {
            if (value === null) {
              pen = false;
              return;
            }
            path += `${pen ? 'L' : 'M'} ${x(index).toFixed(2)} ${y(value).toFixed(2)} `;
            pen = true;
          });
          svg.appendChild(el('path', { class: 'chart-line', d: path, opacity: trace.opacity }));
        }
      });

      const legendX = left + figure.layout.legend.x * plotW + 8;
      const legendY = top + (1 - figure.layout.legend.y) * plotH + 14;
      figure.traces.forEach((trace, index) => {
        const rowY = legendY + index * 18;
        const swatch = trace.kind === 'bar'
          ? el('rect', { class: 'chart-bar', x: legendX, y: rowY - 9, width: 12, height: 10, opacity: trace.opacity })
          : el('line', { class: 'chart-line', x1: legendX, x2: legendX + 12, y1: rowY - 4, y2: rowY - 4 });
        svg.appendChild(swatch);
        svg.appendChild(el('text', { class: 'chart-label', x: legendX + 18, y: rowY }, trace.name));
      });

      container.replaceChildren(svg);
    };

    const renderContent = (container, content) => {
      if (content.kind === 'chart') {
        renderFigure(container, content.figure);
      } else {
        const note = document.createElement('p');
        note.className = 'placeholder';
        note.textContent = content.message;
        container.replaceChildren(note);
      }
    };

    const selectTab = async (group, tab) => {
      const res = await fetch(`/api/tabs/${encodeURIComponent(group)}?active_tab=${encodeURIComponent(tab)}`);
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Unable to load chart');
      }
      renderContent(document.getElementById(`${group}-content`), await res.json());
    };

    document.querySelectorAll('.card[data-group]').forEach((card) => {
      const group = card.dataset.group;
      const container = document.getElementById(`${group}-content`);
      const tabs = Array.from(card.querySelectorAll('.tab'));

      if (initial[group]) {
        renderContent(container, initial[group]);
      }

      tabs.forEach((button) => {
        button.addEventListener('click', () => {
          tabs.forEach((other) => {
            const isActive = other === button;
            other.classList.toggle('active', isActive);
            other.setAttribute('aria-selected', String(isActive));
          });
          selectTab(group, button.dataset.tab)
            .then(() => setStatus('', ''))
            .catch((err) => setStatus(err.message, 'error'));
        });
      });
    });
  </script>
</body>
</html>
"#;

const ERROR_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main class="app">
    <h1>{{TITLE}}</h1>
    <section class="card">
      <div class="tab-content">
        <p class="error" id="error">{{MESSAGE}}</p>
      </div>
    </section>
  </main>
</body>
</html>
"#;
