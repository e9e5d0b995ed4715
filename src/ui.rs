use crate::models::{HistoryItemView, TrackerResponse};

pub const EMPTY_HISTORY_HTML: &str =
    r#"<div class="history-empty">No entries yet. Add your first result!</div>"#;

pub fn render_index(view: &TrackerResponse) -> String {
    let fill = view.progress_percent.clamp(0, 100);
    INDEX_HTML
        .replace("{{SCORE}}", &view.current_score.to_string())
        .replace("{{GOAL}}", &view.goal.to_string())
        .replace("{{REMAINING}}", &view.remaining.to_string())
        .replace("{{WINS}}", &view.wins.to_string())
        .replace("{{LOSSES}}", &view.losses.to_string())
        .replace("{{PERCENT}}", &view.progress_percent.to_string())
        .replace("{{FILL}}", &fill.to_string())
        .replace("{{TIER}}", view.progress_tier.as_str())
        .replace("{{HISTORY}}", &render_history(&view.history))
}

pub fn render_history(items: &[HistoryItemView]) -> String {
    if items.is_empty() {
        return EMPTY_HISTORY_HTML.to_string();
    }

    items.iter().map(render_history_item).collect()
}

fn render_history_item(item: &HistoryItemView) -> String {
    let (class, sign) = if item.delta > 0 {
        ("positive", "+")
    } else {
        ("negative", "")
    };
    format!(
        r#"<div class="history-item"><span class="history-score {class}">{sign}{delta} pts</span><span class="history-time">{time}</span></div>"#,
        delta = item.delta,
        time = item.relative_time,
    )
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Goal Tracker</title>
  <style>
    :root {
      --bg: #f4f1ea;
      --ink: #23262b;
      --card: rgba(255, 255, 255, 0.9);
      --win: #48bb78;
      --loss: #e53e3e;
      --warn: #ed8936;
      --info: #4299e1;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg), #e6ecf5);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px;
    }

    .app {
      width: min(720px, 100%);
      background: var(--card);
      border-radius: 24px;
      box-shadow: 0 24px 60px rgba(35, 38, 43, 0.15);
      padding: 32px;
      display: grid;
      gap: 24px;
    }

    .score {
      font-size: 3rem;
      font-weight: 600;
    }

    .stats {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(120px, 1fr));
      gap: 12px;
    }

    .stat {
      display: grid;
      gap: 4px;
    }

    .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.08em;
      opacity: 0.7;
    }

    .progress-bar {
      height: 18px;
      border-radius: 9px;
      background: #e2e8f0;
      overflow: hidden;
    }

    .progress-bar-fill {
      height: 100%;
      transition: width 300ms ease;
    }

    .progress-low { background: var(--loss); }
    .progress-medium { background: var(--warn); }
    .progress-high { background: var(--info); }
    .progress-complete { background: var(--win); }

    .actions {
      display: flex;
      gap: 12px;
      flex-wrap: wrap;
    }

    button {
      border: none;
      border-radius: 12px;
      padding: 12px 20px;
      font-size: 1rem;
      cursor: pointer;
      color: white;
      background: var(--ink);
    }

    button:active {
      transform: scale(0.95);
    }

    .btn-add { background: var(--win); }
    .btn-sub { background: var(--loss); }

    .history-item {
      display: flex;
      justify-content: space-between;
      padding: 8px 0;
      border-bottom: 1px solid #e2e8f0;
    }

    .positive { color: var(--win); }
    .negative { color: var(--loss); }
    .history-time { opacity: 0.6; }

    .notification {
      position: fixed;
      top: 20px;
      right: 20px;
      padding: 12px 20px;
      border-radius: 8px;
      color: white;
      max-width: 300px;
    }

    .notification-success { background: var(--win); }
    .notification-error { background: var(--loss); }
    .notification-warning { background: var(--warn); }
    .notification-info { background: var(--info); }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <span class="label">Current score</span>
      <div class="score"><span id="current-score">{{SCORE}}</span> / <span id="goal-score">{{GOAL}}</span></div>
    </header>

    <form id="goal-form" method="post" action="/goal" class="actions">
      <input id="goal-input" name="goal" type="number" min="1" value="{{GOAL}}" />
      <button type="submit">Set goal</button>
    </form>

    <section>
      <div class="progress-bar">
        <div id="progress-fill" class="progress-bar-fill progress-{{TIER}}" style="width: {{FILL}}%"></div>
      </div>
      <span id="progress-percent">{{PERCENT}}%</span>
    </section>

    <section class="stats">
      <div class="stat"><span class="label">Remaining</span><span id="remaining">{{REMAINING}} pts</span></div>
      <div class="stat"><span class="label">Wins</span><span id="wins">{{WINS}}</span></div>
      <div class="stat"><span class="label">Losses</span><span id="losses">{{LOSSES}}</span></div>
    </section>

    <section class="actions">
      <form id="add-form" method="post" action="/score/add">
        <button class="btn-add" type="submit">Win</button>
      </form>
      <form id="sub-form" method="post" action="/score/sub">
        <button class="btn-sub" type="submit">Loss</button>
      </form>
      <form id="clear-form" method="post" action="/clear">
        <input type="hidden" name="confirmed" value="false" />
        <button type="submit">Clear all</button>
      </form>
    </section>

    <section>
      <h2>History</h2>
      <div id="history-list">{{HISTORY}}</div>
    </section>
  </main>

  <script>
    const $ = (id) => document.getElementById(id);
    const emptyHistory = '<div class="history-empty">No entries yet. Add your first result!</div>';

    const notify = (note) => {
      if (!note) {
        return;
      }
      const el = document.createElement('div');
      el.className = `notification notification-${note.kind}`;
      el.textContent = note.message;
      document.body.appendChild(el);
      setTimeout(() => el.remove(), 3000);
    };

    const renderHistory = (items) => {
      if (!items.length) {
        return emptyHistory;
      }
      return items
        .map((item) => {
          const positive = item.delta > 0;
          return `<div class="history-item"><span class="history-score ${positive ? 'positive' : 'negative'}">${positive ? '+' : ''}${item.delta} pts</span><span class="history-time">${item.relative_time}</span></div>`;
        })
        .join('');
    };

    const render = (data) => {
      $('current-score').textContent = data.current_score;
      $('goal-score').textContent = data.goal;
      $('remaining').textContent = `${data.remaining} pts`;
      $('wins').textContent = data.wins;
      $('losses').textContent = data.losses;
      $('progress-percent').textContent = `${data.progress_percent}%`;
      const fill = $('progress-fill');
      fill.style.width = `${Math.max(0, Math.min(100, data.progress_percent))}%`;
      fill.className = `progress-bar-fill progress-${data.progress_tier}`;
      $('history-list').innerHTML = renderHistory(data.history);
      notify(data.notification);
    };

    const send = async (path, body) => {
      const res = await fetch(path, {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(body)
      });
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      render(await res.json());
    };

    const fail = (err) => notify({ kind: 'error', message: err.message });

    // submitting the form also covers pressing Enter in the goal field
    $('goal-form').addEventListener('submit', (event) => {
      event.preventDefault();
      send('/api/goal', { goal: $('goal-input').value }).catch(fail);
    });

    $('add-form').addEventListener('submit', (event) => {
      event.preventDefault();
      send('/api/score', { action: 'add' }).catch(fail);
    });

    $('sub-form').addEventListener('submit', (event) => {
      event.preventDefault();
      send('/api/score', { action: 'sub' }).catch(fail);
    });

    $('clear-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const confirmed = confirm('Clear everything? This removes the history and resets the score and win/loss counters.');
      if (confirmed) {
        send('/api/clear', { confirmed: true }).catch(fail);
      }
    });

    setInterval(() => {
      fetch('/api/state')
        .then((res) => res.json())
        .then((data) => {
          $('history-list').innerHTML = renderHistory(data.history);
        })
        .catch(() => {});
    }, 60000);
  </script>
</body>
</html>
"#;
