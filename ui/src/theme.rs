pub const GLOBAL_CSS: &str = r#"
:root {
  --bg: #121212;
  --bg-elev-1: #1a1a1a;
  --bg-elev-2: #1e1e1e;
  --panel: #181818;
  --border: rgba(255, 255, 255, 0.08);
  --border-strong: rgba(255, 255, 255, 0.16);
  --text: #ffffff;
  --text-dim: #c9d2de;
  --text-muted: #8a94a6;
  --accent: #5cb0ff;
  --accent-strong: #7ac6ff;
  --positive: #3fb68b;
  --negative: #f0635c;
  --warning: #f7c843;
  --surface-hover: rgba(255, 255, 255, 0.05);
  --surface-active: rgba(255, 255, 255, 0.1);
  --shadow-soft: 0 14px 42px rgba(0, 0, 0, 0.38);
  --radius: 10px;
  --radius-pill: 999px;
  --space-1: 4px;
  --space-2: 8px;
  --space-3: 12px;
  --space-4: 16px;
  --font-body: "Inter", "SF Pro Text", system-ui, -apple-system, sans-serif;
  --font-size-xs: 11px;
  --font-size-sm: 13px;
  --font-size-md: 15px;
  --transition: 140ms ease-out;
}

* { box-sizing: border-box; }
html, body {
  padding: 0;
  margin: 0;
  background: var(--bg);
  color: var(--text);
  font-family: var(--font-body);
  font-size: var(--font-size-sm);
  line-height: 1.45;
  min-height: 100%;
}

a { color: var(--accent); text-decoration: none; }
a:hover { color: var(--accent-strong); }

input {
  background: var(--bg-elev-1);
  border: 1px solid var(--border);
  color: var(--text);
  padding: var(--space-2) var(--space-3);
  border-radius: var(--radius);
  font-size: var(--font-size-md);
  outline: none;
  transition: border-color var(--transition), box-shadow var(--transition);
}
input:focus { border-color: var(--accent); box-shadow: 0 0 0 1px rgba(77, 163, 255, 0.35); }

.page { max-width: 1200px; margin: 0 auto; padding: var(--space-4); display: flex; flex-direction: column; gap: var(--space-3); }
.panel { background: var(--panel); border: 1px solid var(--border); border-radius: var(--radius); box-shadow: var(--shadow-soft); padding: var(--space-3); }
.topbar { display: flex; align-items: center; justify-content: space-between; }
.topbar h1 { font-size: 20px; margin: 0; }
.form-row { display: flex; gap: var(--space-2); align-items: flex-start; }
.section-label { font-size: var(--font-size-xs); color: var(--text-muted); letter-spacing: 0.04em; text-transform: uppercase; }
.flex-row { display: flex; gap: var(--space-2); align-items: center; }
.flex-between { display: flex; justify-content: space-between; align-items: center; gap: var(--space-2); }
.chip { padding: var(--space-1) var(--space-2); border-radius: var(--radius-pill); background: var(--surface-hover); border: 1px solid var(--border); font-size: var(--font-size-xs); color: var(--text-dim); }
.d-none { display: none !important; }

.btn { border: 1px solid var(--border); background: var(--bg-elev-1); color: var(--text); padding: 8px 14px; border-radius: var(--radius); font-size: var(--font-size-sm); cursor: pointer; transition: background var(--transition), border-color var(--transition), transform var(--transition); }
.btn:hover { background: var(--surface-hover); border-color: var(--border-strong); }
.btn:active { background: var(--surface-active); transform: translateY(1px); }
.btn:disabled { opacity: 0.6; cursor: progress; }
.btn.primary { min-width: 110px; background: linear-gradient(135deg, var(--accent), var(--accent-strong)); border-color: transparent; color: #02111f; font-weight: 600; }
.btn.ghost { background: transparent; border-style: dashed; color: var(--text-dim); }

.status-spinner { width: 14px; height: 14px; border: 2px solid rgba(2,17,31,0.35); border-top-color: #02111f; border-radius: 50%; display: inline-block; animation: spin 0.9s linear infinite; }
@keyframes spin { to { transform: rotate(360deg); } }

.autocomplete { position: relative; flex: 1; }
.autocomplete input { width: 100%; }
.autocomplete-list { position: absolute; top: 100%; left: 0; right: 0; z-index: 10; margin: 4px 0 0; padding: var(--space-1); list-style: none; max-height: 280px; overflow-y: auto; background: var(--bg-elev-2); border: 1px solid var(--border-strong); border-radius: var(--radius); box-shadow: var(--shadow-soft); }
.autocomplete-item { padding: var(--space-2) var(--space-3); border-radius: 8px; cursor: pointer; color: var(--text-dim); }
.autocomplete-item:hover, .autocomplete-item.active { background: var(--surface-hover); color: var(--text); }

.result-content h2 { text-align: center; font-size: 16px; letter-spacing: 0.04em; }
.result-content h3 { text-align: center; font-size: 14px; }
.result-content .container { display: flex; gap: 30px; justify-content: space-between; flex-wrap: wrap; }
.result-content .box { border: 1px solid var(--border-strong); padding: 15px; border-radius: 8px; flex: 1 1 calc(25% - 20px); min-width: 250px; text-align: center; }
.text-light { color: var(--text-dim); }
.text-warning { color: var(--warning); }
.alert { padding: var(--space-3); border-radius: var(--radius); border: 1px solid var(--border); margin: var(--space-2) 0; }
.alert-danger { color: var(--negative); border-color: rgba(240, 99, 92, 0.4); background: rgba(240, 99, 92, 0.08); }
.alert-warning { color: var(--warning); border-color: rgba(247, 200, 67, 0.4); background: rgba(247, 200, 67, 0.08); }

.chart-section { display: flex; flex-direction: column; gap: var(--space-2); }
.chart-container { position: relative; min-height: 450px; background: #121212; border: 1px solid var(--border); border-radius: var(--radius); overflow: hidden; }
.full-page-graph { position: fixed; inset: 0; z-index: 50; padding: var(--space-4); background: rgba(0, 0, 0, 0.92); }
.full-page-graph #fullPageGraph { margin-top: var(--space-2); }
"#;
