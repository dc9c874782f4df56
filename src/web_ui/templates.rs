//! Template engine setup and HTML templates.

use once_cell::sync::Lazy;
use tera::{Context, Tera};

/// Global template engine instance with embedded templates.
pub static TEMPLATES: Lazy<Tera> = Lazy::new(|| {
    let mut tera = Tera::default();

    // Embedded in the binary; no template directory at runtime
    tera.add_raw_templates(vec![
        ("base.html", BASE_TEMPLATE),
        ("macros.html", MACROS_TEMPLATE),
        ("index.html", INDEX_TEMPLATE),
        ("vegetable_list.html", VEGETABLE_LIST_TEMPLATE),
        ("vegetable_detail.html", VEGETABLE_DETAIL_TEMPLATE),
        ("farmer_list.html", FARMER_LIST_TEMPLATE),
        ("farmer_detail.html", FARMER_DETAIL_TEMPLATE),
        ("farmer_form.html", FARMER_FORM_TEMPLATE),
        ("farmer_confirm_delete.html", FARMER_CONFIRM_DELETE_TEMPLATE),
        ("my_borrowed.html", MY_BORROWED_TEMPLATE),
        ("all_borrowed.html", ALL_BORROWED_TEMPLATE),
        ("renew.html", RENEW_TEMPLATE),
        ("login.html", LOGIN_TEMPLATE),
        ("error.html", ERROR_TEMPLATE),
        ("admin_index.html", ADMIN_INDEX_TEMPLATE),
        ("admin_list.html", ADMIN_LIST_TEMPLATE),
        ("admin_form.html", ADMIN_FORM_TEMPLATE),
        ("admin_confirm_delete.html", ADMIN_CONFIRM_DELETE_TEMPLATE),
    ])
    .expect("Failed to load templates");

    tera
});

/// Render a template with context
pub fn render(template: &str, context: &Context) -> Result<String, tera::Error> {
    TEMPLATES.render(template, context)
}

// =============================================================================
// Embedded Templates
// =============================================================================

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{% block title %}Vegetable Catalog{% endblock %}</title>
    <style>
        :root {
            --bg: #0b0d0a;
            --bg-secondary: #13170f;
            --foreground: #f4f7f0;
            --foreground-secondary: rgba(244, 247, 240, 0.7);
            --foreground-tertiary: rgba(244, 247, 240, 0.4);
            --border: #252b1f;
            --border-subtle: #191e15;
            --accent: #86c96b;
            --danger: #f87171;
        }

        * { box-sizing: border-box; margin: 0; padding: 0; }

        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Helvetica, Arial, sans-serif;
            background: var(--bg);
            color: var(--foreground);
            line-height: 1.6;
            -webkit-font-smoothing: antialiased;
        }

        a { color: var(--foreground); text-decoration: none; transition: opacity 0.15s; }
        a:hover { opacity: 0.7; }

        .header { border-bottom: 1px solid var(--border-subtle); padding: 20px 32px; }
        .header-content {
            max-width: 1200px;
            margin: 0 auto;
            display: flex;
            align-items: center;
            justify-content: space-between;
        }
        .logo { font-size: 18px; font-weight: 600; letter-spacing: -0.02em; color: var(--accent); }
        .nav { display: flex; gap: 28px; align-items: center; }
        .nav a { color: var(--foreground-secondary); font-size: 14px; }
        .nav a:hover { color: var(--foreground); opacity: 1; }
        .nav .user { color: var(--foreground-tertiary); font-size: 13px; }

        .container { max-width: 1200px; margin: 0 auto; padding: 48px 32px; }

        h1 { font-size: 32px; font-weight: 600; letter-spacing: -0.02em; margin-bottom: 32px; }
        h2 {
            font-size: 14px;
            font-weight: 500;
            color: var(--foreground-secondary);
            text-transform: uppercase;
            letter-spacing: 0.05em;
            margin-bottom: 16px;
        }

        .card {
            background: var(--bg-secondary);
            border: 1px solid var(--border);
            border-radius: 16px;
            overflow: hidden;
        }
        .card + .card, .card + h2 { margin-top: 24px; }
        .card-body { padding: 24px; }

        .list { list-style: none; }
        .list-item {
            padding: 16px 20px;
            border-bottom: 1px solid var(--border-subtle);
            display: flex;
            align-items: center;
            gap: 16px;
        }
        .list-item:last-child { border-bottom: none; }
        .list-item a { flex: 1; }

        table { width: 100%; border-collapse: collapse; font-size: 14px; }
        th {
            text-align: left;
            font-weight: 500;
            color: var(--foreground-tertiary);
            padding: 12px 20px;
            border-bottom: 1px solid var(--border);
        }
        td { padding: 12px 20px; border-bottom: 1px solid var(--border-subtle); }
        tr:last-child td { border-bottom: none; }

        .badge {
            font-size: 11px;
            font-weight: 500;
            padding: 4px 10px;
            border-radius: 100px;
            background: var(--border);
            color: var(--foreground-secondary);
            text-transform: uppercase;
            letter-spacing: 0.02em;
        }
        .badge-a { background: rgba(34, 197, 94, 0.15); color: #4ade80; }
        .badge-o { background: rgba(234, 179, 8, 0.15); color: #facc15; }
        .badge-m { background: rgba(239, 68, 68, 0.15); color: #f87171; }
        .badge-r { background: rgba(59, 130, 246, 0.15); color: #60a5fa; }
        .overdue { color: var(--danger); }

        .stats { display: flex; gap: 16px; margin-bottom: 48px; flex-wrap: wrap; }
        .stat {
            background: var(--bg-secondary);
            border: 1px solid var(--border);
            border-radius: 16px;
            padding: 24px 32px;
            min-width: 180px;
        }
        .stat-value { font-size: 36px; font-weight: 600; letter-spacing: -0.02em; }
        .stat-label { color: var(--foreground-tertiary); font-size: 13px; margin-top: 4px; }

        .btn {
            display: inline-flex;
            align-items: center;
            gap: 8px;
            padding: 10px 20px;
            border-radius: 100px;
            font-size: 14px;
            font-weight: 500;
            border: none;
            cursor: pointer;
        }
        .btn-primary { background: var(--accent); color: var(--bg); }
        .btn-secondary { background: transparent; border: 1px solid var(--border); color: var(--foreground); }
        .btn-danger { background: var(--danger); color: var(--bg); }

        .field { margin-bottom: 20px; }
        .field label { display: block; font-size: 13px; color: var(--foreground-secondary); margin-bottom: 6px; }
        .field input, .field textarea, .field select {
            width: 100%;
            max-width: 480px;
            padding: 10px 12px;
            background: var(--bg);
            border: 1px solid var(--border);
            border-radius: 8px;
            color: var(--foreground);
            font-size: 14px;
        }
        .field textarea { min-height: 120px; }
        .field select[multiple] { min-height: 140px; }
        .field .readonly { font-family: 'SF Mono', Menlo, monospace; font-size: 13px; color: var(--foreground-tertiary); }
        .field .help { font-size: 12px; color: var(--foreground-tertiary); margin-top: 4px; }
        .field .error, .form-error { font-size: 13px; color: var(--danger); margin-top: 4px; }
        .field-error input, .field-error textarea, .field-error select { border-color: var(--danger); }

        .breadcrumb {
            display: flex;
            gap: 8px;
            margin-bottom: 24px;
            font-size: 14px;
            color: var(--foreground-tertiary);
        }
        .breadcrumb a { color: var(--foreground-secondary); }

        .filters { display: flex; gap: 8px; margin-bottom: 16px; flex-wrap: wrap; }
        .filters a { font-size: 13px; padding: 4px 12px; border-radius: 100px; border: 1px solid var(--border); }
        .filters .filter-title { font-size: 13px; color: var(--foreground-tertiary); padding: 4px 0; }
        .filters a.active { background: var(--accent); color: var(--bg); border-color: var(--accent); }

        .pagination { display: flex; gap: 16px; align-items: center; margin-top: 24px; font-size: 14px; }
        .empty { text-align: center; padding: 48px 32px; color: var(--foreground-tertiary); }
        .text-secondary { color: var(--foreground-secondary); }
        .text-tertiary { color: var(--foreground-tertiary); }
        .text-sm { font-size: 13px; }
        .mt-4 { margin-top: 16px; }
        .mt-6 { margin-top: 24px; }
        .mb-4 { margin-bottom: 16px; }
        .actions { display: flex; gap: 12px; margin-top: 24px; }
        dl { display: grid; grid-template-columns: 160px 1fr; gap: 8px 16px; font-size: 14px; }
        dt { color: var(--foreground-tertiary); }

        @media (max-width: 768px) {
            .header { padding: 16px 20px; }
            .container { padding: 32px 20px; }
            .stat { min-width: calc(50% - 8px); }
            h1 { font-size: 24px; }
            .nav { gap: 16px; }
        }
    </style>
</head>
<body>
    <header class="header">
        <div class="header-content">
            <a href="/" class="logo">Vegetable Catalog</a>
            <nav class="nav">
                <a href="/vegetables/">All vegetables</a>
                <a href="/farmers/">All farmers</a>
                {% if current_user %}
                <a href="/myvegetables/">My borrowed</a>
                {% if can_mark_returned %}<a href="/borrowed/">All borrowed</a>{% endif %}
                {% if is_staff %}<a href="/admin/">Admin</a>{% endif %}
                <span class="user">{{ current_user }}</span>
                <a href="/accounts/logout/">Logout</a>
                {% else %}
                <a href="/accounts/login/">Login</a>
                {% endif %}
            </nav>
        </div>
    </header>
    <main class="container">
        {% block content %}{% endblock %}
    </main>
</body>
</html>"##;

const MACROS_TEMPLATE: &str = r##"{% macro field(f) %}
<div class="field{% if f.errors %} field-error{% endif %}">
    <label for="id_{{ f.name }}">{{ f.label }}{% if f.required %} *{% endif %}</label>
    {% if f.kind == "textarea" %}
    <textarea id="id_{{ f.name }}" name="{{ f.name }}">{{ f.value }}</textarea>
    {% elif f.kind == "date" %}
    <input type="date" id="id_{{ f.name }}" name="{{ f.name }}" value="{{ f.value }}">
    {% elif f.kind == "select" %}
    <select id="id_{{ f.name }}" name="{{ f.name }}">
        {% for choice in f.choices %}
        <option value="{{ choice.value }}"{% if choice.selected %} selected{% endif %}>{{ choice.label }}</option>
        {% endfor %}
    </select>
    {% elif f.kind == "multiselect" %}
    <select id="id_{{ f.name }}" name="{{ f.name }}" multiple>
        {% for choice in f.choices %}
        <option value="{{ choice.value }}"{% if choice.selected %} selected{% endif %}>{{ choice.label }}</option>
        {% endfor %}
    </select>
    {% elif f.kind == "readonly" %}
    <div class="readonly">{{ f.value }}</div>
    {% elif f.kind == "password" %}
    <input type="password" id="id_{{ f.name }}" name="{{ f.name }}" autocomplete="new-password">
    {% elif f.kind == "checkbox" %}
    <input type="checkbox" id="id_{{ f.name }}" name="{{ f.name }}"{% if f.value %} checked{% endif %}>
    {% else %}
    <input type="text" id="id_{{ f.name }}" name="{{ f.name }}" value="{{ f.value }}">
    {% endif %}
    {% if f.help %}<p class="help">{{ f.help }}</p>{% endif %}
    {% for error in f.errors %}<p class="error">{{ error }}</p>{% endfor %}
</div>
{% endmacro field %}"##;

const INDEX_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block content %}
<h1>Local Vegetable Library</h1>
<p class="text-secondary mb-4">Welcome to the vegetable lending catalog.</p>

<h2 class="mt-6">Dynamic content</h2>
<div class="stats">
    <div class="stat">
        <div class="stat-value">{{ counts.vegetables }}</div>
        <div class="stat-label">Vegetables</div>
    </div>
    <div class="stat">
        <div class="stat-value">{{ counts.instances }}</div>
        <div class="stat-label">Instances</div>
    </div>
    <div class="stat">
        <div class="stat-value">{{ counts.instances_available }}</div>
        <div class="stat-label">Available</div>
    </div>
    <div class="stat">
        <div class="stat-value">{{ counts.farmers }}</div>
        <div class="stat-label">Farmers</div>
    </div>
</div>

<p class="text-tertiary text-sm">You have visited this page {{ num_visits }} time{{ num_visits | pluralize }}.</p>
{% endblock %}"##;

const VEGETABLE_LIST_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}Vegetables - Vegetable Catalog{% endblock %}
{% block content %}
<h1>Vegetable List</h1>
<div class="card">
    {% if vegetables %}
    <ul class="list">
        {% for veg in vegetables %}
        <li class="list-item">
            <a href="/vegetable/{{ veg.id }}">{{ veg.title }}</a>
            <span class="text-tertiary text-sm">{% if veg.farmer %}{{ veg.farmer }}{% endif %}</span>
        </li>
        {% endfor %}
    </ul>
    {% else %}
    <div class="empty"><p>There are no vegetables in the library.</p></div>
    {% endif %}
</div>
{% endblock %}"##;

const VEGETABLE_DETAIL_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}{{ vegetable.title }} - Vegetable Catalog{% endblock %}
{% block content %}
<div class="breadcrumb">
    <a href="/vegetables/">Vegetables</a><span>/</span><span>{{ vegetable.title }}</span>
</div>
<h1>{{ vegetable.title }}</h1>

<div class="card">
    <div class="card-body">
        <dl>
            <dt>Farmer</dt>
            <dd>{% if farmer %}<a href="/farmer/{{ farmer.id }}">{{ farmer.name }}</a>{% else %}<span class="text-tertiary">Unknown</span>{% endif %}</dd>
            <dt>Summary</dt><dd>{{ vegetable.summary }}</dd>
            <dt>ISBN</dt><dd>{{ vegetable.isbn }}</dd>
            <dt>Family</dt><dd>{{ families }}</dd>
        </dl>
    </div>
</div>

<h2 class="mt-6">Copies</h2>
<div class="card">
    {% if instances %}
    <table>
        <tr><th>Status</th><th>Harvest</th><th>Due back</th><th>Id</th></tr>
        {% for inst in instances %}
        <tr>
            <td><span class="badge badge-{{ inst.status }}">{{ inst.status_label }}</span></td>
            <td>{{ inst.harvest }}</td>
            <td>{% if inst.status != "a" %}<span{% if inst.is_overdue %} class="overdue"{% endif %}>{{ inst.exp_date }}</span>{% endif %}</td>
            <td class="text-tertiary text-sm">{{ inst.id }}</td>
        </tr>
        {% endfor %}
    </table>
    {% else %}
    <div class="empty"><p>No copies of this vegetable.</p></div>
    {% endif %}
</div>
{% endblock %}"##;

const FARMER_LIST_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}Farmers - Vegetable Catalog{% endblock %}
{% block content %}
<div class="flex mb-4" style="display:flex; justify-content: space-between; align-items: baseline;">
    <h1>Farmer List</h1>
    <a class="btn btn-secondary" href="/farmer/create/">Add farmer</a>
</div>
<div class="card">
    {% if farmers %}
    <ul class="list">
        {% for farmer in farmers %}
        <li class="list-item">
            <a href="/farmer/{{ farmer.id }}">{{ farmer.name }}</a>
            <span class="text-tertiary text-sm">{{ farmer.born }}{% if farmer.died %} - {{ farmer.died }}{% endif %}</span>
        </li>
        {% endfor %}
    </ul>
    {% else %}
    <div class="empty"><p>There are no farmers available.</p></div>
    {% endif %}
</div>
{% endblock %}"##;

const FARMER_DETAIL_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}{{ farmer.name }} - Vegetable Catalog{% endblock %}
{% block content %}
<div class="breadcrumb">
    <a href="/farmers/">Farmers</a><span>/</span><span>{{ farmer.name }}</span>
</div>
<h1>Farmer: {{ farmer.name }}</h1>

<div class="card">
    <div class="card-body">
        <dl>
            <dt>Born</dt><dd>{{ farmer.born }}</dd>
            <dt>Died</dt><dd>{{ farmer.died }}</dd>
            <dt>Families</dt><dd>{{ families }}</dd>
        </dl>
        <div class="actions">
            <a class="btn btn-secondary" href="/farmer/{{ farmer.id }}/update/">Update</a>
            <a class="btn btn-secondary" href="/farmer/{{ farmer.id }}/delete/">Delete</a>
        </div>
    </div>
</div>

<h2 class="mt-6">Vegetables</h2>
<div class="card">
    {% if vegetables %}
    <ul class="list">
        {% for veg in vegetables %}
        <li class="list-item">
            <a href="/vegetable/{{ veg.id }}">{{ veg.title }}</a>
            <span class="text-tertiary text-sm">{{ veg.summary | truncate(length=80) }}</span>
        </li>
        {% endfor %}
    </ul>
    {% else %}
    <div class="empty"><p>This farmer has no vegetables.</p></div>
    {% endif %}
</div>
{% endblock %}"##;

const FARMER_FORM_TEMPLATE: &str = r##"{% extends "base.html" %}
{% import "macros.html" as macros %}
{% block title %}{{ heading }} - Vegetable Catalog{% endblock %}
{% block content %}
<h1>{{ heading }}</h1>
<div class="card">
    <div class="card-body">
        <form method="post" action="{{ action }}">
            {% for f in fields %}{{ macros::field(f=f) }}{% endfor %}
            <div class="actions">
                <button class="btn btn-primary" type="submit">Submit</button>
                <a class="btn btn-secondary" href="{{ cancel_url }}">Cancel</a>
            </div>
        </form>
    </div>
</div>
{% endblock %}"##;

const FARMER_CONFIRM_DELETE_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}Delete {{ farmer.name }} - Vegetable Catalog{% endblock %}
{% block content %}
<h1>Delete Farmer</h1>
<div class="card">
    <div class="card-body">
        <p>Are you sure you want to delete the farmer: <strong>{{ farmer.name }}</strong>?</p>
        {% if vegetable_count > 0 %}
        <p class="text-secondary mt-4">{{ vegetable_count }} vegetable{{ vegetable_count | pluralize }} will be left without a farmer.</p>
        {% endif %}
        <form method="post" action="/farmer/{{ farmer.id }}/delete/">
            <div class="actions">
                <button class="btn btn-danger" type="submit">Yes, delete</button>
                <a class="btn btn-secondary" href="/farmer/{{ farmer.id }}">Cancel</a>
            </div>
        </form>
    </div>
</div>
{% endblock %}"##;

const MY_BORROWED_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}Borrowed vegetables - Vegetable Catalog{% endblock %}
{% block content %}
<h1>Borrowed vegetables</h1>
<div class="card">
    {% if loans %}
    <ul class="list">
        {% for loan in loans %}
        <li class="list-item">
            <a href="{% if loan.vegetable_id %}/vegetable/{{ loan.vegetable_id }}{% else %}#{% endif %}">{{ loan.title }}</a>
            <span class="text-sm{% if loan.is_overdue %} overdue{% endif %}">{{ loan.exp_date }}</span>
        </li>
        {% endfor %}
    </ul>
    {% else %}
    <div class="empty"><p>There are no vegetables borrowed.</p></div>
    {% endif %}
</div>
{% if page.num_pages > 1 %}
<div class="pagination">
    {% if page.has_previous %}<a class="btn btn-secondary" href="?page={{ page.number - 1 }}">Previous</a>{% endif %}
    <span class="text-secondary">Page {{ page.number }} of {{ page.num_pages }}</span>
    {% if page.has_next %}<a class="btn btn-secondary" href="?page={{ page.number + 1 }}">Next</a>{% endif %}
</div>
{% endif %}
{% endblock %}"##;

const ALL_BORROWED_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}All borrowed vegetables - Vegetable Catalog{% endblock %}
{% block content %}
<h1>All borrowed vegetables</h1>
<div class="card">
    {% if loans %}
    <table>
        <tr><th>Vegetable</th><th>Due back</th><th>Borrower</th><th></th></tr>
        {% for loan in loans %}
        <tr>
            <td>{% if loan.vegetable_id %}<a href="/vegetable/{{ loan.vegetable_id }}">{{ loan.title }}</a>{% else %}{{ loan.title }}{% endif %}</td>
            <td{% if loan.is_overdue %} class="overdue"{% endif %}>{{ loan.exp_date }}</td>
            <td>{{ loan.borrower }}</td>
            <td><a href="/vegetable/{{ loan.id }}/renew/">Renew</a></td>
        </tr>
        {% endfor %}
    </table>
    {% else %}
    <div class="empty"><p>There are no vegetables borrowed.</p></div>
    {% endif %}
</div>
{% endblock %}"##;

const RENEW_TEMPLATE: &str = r##"{% extends "base.html" %}
{% import "macros.html" as macros %}
{% block title %}Renew - Vegetable Catalog{% endblock %}
{% block content %}
<h1>Renew: {{ instance.title }}</h1>
<div class="card">
    <div class="card-body">
        <dl class="mb-4">
            <dt>Borrower</dt><dd>{{ instance.borrower }}</dd>
            <dt>Due date</dt><dd{% if instance.is_overdue %} class="overdue"{% endif %}>{{ instance.exp_date }}</dd>
        </dl>
        <form method="post" action="/vegetable/{{ instance.id }}/renew/">
            {{ macros::field(f=field) }}
            <div class="actions">
                <button class="btn btn-primary" type="submit">Submit</button>
                <a class="btn btn-secondary" href="/borrowed/">Cancel</a>
            </div>
        </form>
    </div>
</div>
{% endblock %}"##;

const LOGIN_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}Login - Vegetable Catalog{% endblock %}
{% block content %}
<h1>Login</h1>
<div class="card" style="max-width: 480px;">
    <div class="card-body">
        {% if error %}<p class="form-error mb-4">{{ error }}</p>{% endif %}
        <form method="post" action="/accounts/login/">
            <div class="field">
                <label for="id_username">Username</label>
                <input type="text" id="id_username" name="username" value="{{ username }}" autofocus>
            </div>
            <div class="field">
                <label for="id_password">Password</label>
                <input type="password" id="id_password" name="password">
            </div>
            <input type="hidden" name="next" value="{{ next }}">
            <button class="btn btn-primary" type="submit">Login</button>
        </form>
    </div>
</div>
{% endblock %}"##;

const ERROR_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}Error - Vegetable Catalog{% endblock %}
{% block content %}
<div class="card">
    <div style="padding: 48px; text-align: center;">
        <h1 style="margin-bottom: 16px;">{{ status }}</h1>
        <p class="text-secondary">{{ message }}</p>
        <a href="/" class="btn btn-secondary mt-6">Return home</a>
    </div>
</div>
{% endblock %}"##;

const ADMIN_INDEX_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}Site administration{% endblock %}
{% block content %}
<h1>Site administration</h1>
<h2>Catalog</h2>
<div class="card">
    <table>
        {% for model in models %}
        <tr>
            <td><a href="/admin/{{ model.slug }}/">{{ model.name_plural }}</a></td>
            <td class="text-tertiary">{{ model.count }}</td>
            <td><a href="/admin/{{ model.slug }}/add/">Add</a></td>
        </tr>
        {% endfor %}
    </table>
</div>
{% endblock %}"##;

const ADMIN_LIST_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}{{ model.name_plural }} - Site administration{% endblock %}
{% block content %}
<div class="breadcrumb">
    <a href="/admin/">Admin</a><span>/</span><span>{{ model.name_plural }}</span>
</div>
<div style="display:flex; justify-content: space-between; align-items: baseline;">
    <h1>Select {{ model.name | lower }} to change</h1>
    <a class="btn btn-primary" href="/admin/{{ model.slug }}/add/">Add {{ model.name | lower }}</a>
</div>
{% for group in filters %}
<div class="filters">
    <span class="filter-title">{{ group.title }}</span>
    {% for option in group.options %}
    <a href="?{{ option.query }}"{% if option.active %} class="active"{% endif %}>{{ option.label }}</a>
    {% endfor %}
</div>
{% endfor %}
<div class="card">
    {% if rows %}
    <table>
        <tr>{% for header in headers %}<th>{{ header }}</th>{% endfor %}</tr>
        {% for row in rows %}
        <tr>
            {% for cell in row.cells %}
            <td>{% if loop.first %}<a href="/admin/{{ model.slug }}/{{ row.key }}/change/">{{ cell }}</a>{% else %}{{ cell }}{% endif %}</td>
            {% endfor %}
        </tr>
        {% endfor %}
    </table>
    {% else %}
    <div class="empty"><p>0 {{ model.name_plural | lower }}</p></div>
    {% endif %}
</div>
<p class="text-tertiary text-sm mt-4">{{ rows | length }} {% if rows | length == 1 %}{{ model.name | lower }}{% else %}{{ model.name_plural | lower }}{% endif %}</p>
{% endblock %}"##;

const ADMIN_FORM_TEMPLATE: &str = r##"{% extends "base.html" %}
{% import "macros.html" as macros %}
{% block title %}{{ heading }} - Site administration{% endblock %}
{% block content %}
<div class="breadcrumb">
    <a href="/admin/">Admin</a><span>/</span>
    <a href="/admin/{{ model.slug }}/">{{ model.name_plural }}</a><span>/</span>
    <span>{{ heading }}</span>
</div>
<h1>{{ heading }}</h1>
<div class="card">
    <div class="card-body">
        {% if has_errors %}<p class="form-error mb-4">Please correct the errors below.</p>{% endif %}
        <form method="post" action="{{ action }}">
            {% for f in fields %}{{ macros::field(f=f) }}{% endfor %}
            <div class="actions">
                <button class="btn btn-primary" type="submit">Save</button>
                {% if key %}<a class="btn btn-danger" href="/admin/{{ model.slug }}/{{ key }}/delete/">Delete</a>{% endif %}
            </div>
        </form>
    </div>
</div>
{% if inline %}
<h2 class="mt-6">{{ inline.title }}</h2>
<div class="card">
    {% if inline.rows %}
    <table>
        <tr>{% for header in inline.headers %}<th>{{ header }}</th>{% endfor %}</tr>
        {% for row in inline.rows %}
        <tr>
            {% for cell in row.cells %}
            <td>{% if loop.first %}<a href="/admin/{{ inline.model }}/{{ row.key }}/change/">{{ cell }}</a>{% else %}{{ cell }}{% endif %}</td>
            {% endfor %}
        </tr>
        {% endfor %}
    </table>
    {% else %}
    <div class="empty"><p>None</p></div>
    {% endif %}
</div>
{% endif %}
{% endblock %}"##;

const ADMIN_CONFIRM_DELETE_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}Are you sure? - Site administration{% endblock %}
{% block content %}
<h1>Are you sure?</h1>
<div class="card">
    <div class="card-body">
        <p>Are you sure you want to delete the {{ model.name | lower }} "{{ label }}"?</p>
        <form method="post" action="/admin/{{ model.slug }}/{{ key }}/delete/">
            <div class="actions">
                <button class="btn btn-danger" type="submit">Yes, I'm sure</button>
                <a class="btn btn-secondary" href="/admin/{{ model.slug }}/{{ key }}/change/">No, take me back</a>
            </div>
        </form>
    </div>
</div>
{% endblock %}"##;
