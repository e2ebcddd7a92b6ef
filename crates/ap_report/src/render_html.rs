//! HTML rendering through an embedded minijinja template (no external assets).
//! Auto-escaping is on because the template name ends in `.html`.

use minijinja::{context, Environment};

use crate::{ReportError, ReportModel};

static TEMPLATE: &str = r#"<!doctype html>
<html lang="en"><meta charset="utf-8">
<title>{{ model.title }}</title>
<style>
  table { border-collapse: collapse; margin: 0.5em 0; }
  td, th { border: 1px solid #ccc; padding: 2px 8px; }
  td.n { text-align: right; }
  tr.out td { color: #888; }
  .digest { font-family: monospace; font-size: 0.8em; color: #666; }
</style>
<h1>{{ model.title }}</h1>
{% if model.coalition %}<p>Coalition: {{ model.coalition | join(", ") }}</p>{% endif %}

{% for e in model.elections %}
<h2>Election {{ e.election_id }}</h2>
<p>{{ e.total_votes }} votes cast.</p>
<table>
  <tr>{% for h in e.comparison.header %}<th>{{ h }}</th>{% endfor %}</tr>
  {% for row in e.comparison.rows %}
  <tr>{% for c in row %}<td{% if not loop.first %} class="n"{% endif %}>{{ c }}</td>{% endfor %}</tr>
  {% endfor %}
</table>

{% for s in e.scenarios %}
<h3>{{ s.label }}</h3>
<p>Method {{ s.method }}, threshold {{ s.threshold_pct }}, {{ s.surplus_seats }} surplus of {{ s.parliament_size }} seats.</p>
{% if s.eliminated %}<p>Below threshold: {{ s.eliminated | join(", ") }}</p>{% endif %}
{% if s.dropped_pairs %}<p>Agreements dropped: {{ s.dropped_pairs | join(", ") }}</p>{% endif %}
<table>
  <tr><th>Party</th><th>Votes</th><th>Share</th><th>Baseline</th><th>Seats</th></tr>
  {% for r in s.seats %}
  <tr{% if r.eliminated %} class="out"{% endif %}><td>{{ r.party }}</td><td class="n">{{ r.votes }}</td><td class="n">{{ r.share_pct }}</td><td class="n">{{ r.baseline }}</td><td class="n">{{ r.seats }}</td></tr>
  {% endfor %}
</table>
{% if s.awards %}
<details><summary>Surplus rounds</summary>
<ol>{% for w in s.awards %}<li>{{ w.unit }} to {{ w.recipient }} at {{ w.score }}{% if w.tie %} (tie){% endif %}</li>{% endfor %}</ol>
</details>
{% endif %}
{% if s.coalition_seats is not none %}<p>Coalition seats: {{ s.coalition_seats }}</p>{% endif %}
<p class="digest">input sha256 {{ s.input_digest }}</p>
{% endfor %}
{% endfor %}

{% if model.verification %}
{% set v = model.verification %}
<h2>Verification</h2>
{% if v.success %}<p>All {{ v.checked | length }} checked elections reproduced.</p>{% endif %}
{% for m in v.mismatches %}
<h3>Election {{ m.election_id }}</h3>
{% if m.error %}<p>Rejected: {{ m.error }}</p>{% else %}
<table>
  <tr><th>Party</th><th>Predicted</th><th>Published</th></tr>
  {% for d in m.differences %}<tr><td>{{ d.party }}</td><td class="n">{{ d.predicted }}</td><td class="n">{{ d.actual }}</td></tr>{% endfor %}
</table>
{% endif %}
{% endfor %}
{% if v.unchecked %}<p>No expected result for: {{ v.unchecked | join(", ") }}</p>{% endif %}
{% endif %}
</html>
"#;

pub fn render_html(model: &ReportModel) -> Result<String, ReportError> {
    let mut env = Environment::new();
    env.add_template("report.html", TEMPLATE)
        .map_err(|e| ReportError::Template(e.to_string()))?;
    let tmpl = env
        .get_template("report.html")
        .map_err(|e| ReportError::Template(e.to_string()))?;
    tmpl.render(context! { model => model })
        .map_err(|e| ReportError::Template(e.to_string()))
}
