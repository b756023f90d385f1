//! Inline HTML pages for the browser-facing side of stash.
//!
//! The pages are small enough that a template engine would be overhead;
//! each function renders a complete document from its inputs. All
//! user-controlled values pass through [`escape_html`].

use crate::files::FileEntry;

const CARD_STYLE: &str = "body{font-family:sans-serif;background:#f4f4f9;display:flex;\
justify-content:center;align-items:center;height:100vh;margin:0;}\
.card{background:white;padding:40px;border-radius:12px;\
box-shadow:0 4px 20px rgba(0,0,0,0.1);text-align:center;}\
input[type=password],input[type=submit]{width:calc(100% - 22px);padding:10px;\
margin:10px 0;border:1px solid #ccc;border-radius:5px;}\
input[type=submit]{background:#007bff;color:white;cursor:pointer;}";

const PANEL_STYLE: &str = "body{font-family:sans-serif;background:#f4f4f9;margin:0;padding:24px;}\
.panel{background:white;max-width:960px;margin:0 auto;padding:24px;border-radius:12px;\
box-shadow:0 4px 20px rgba(0,0,0,0.1);}\
table{width:100%;border-collapse:collapse;margin-top:16px;}\
th,td{text-align:left;padding:8px;border-bottom:1px solid #eee;}\
form.inline{display:inline;}input{padding:6px;margin:2px;border:1px solid #ccc;border-radius:4px;}\
input[type=submit]{background:#007bff;color:white;cursor:pointer;border:none;}\
.msg{background:#d4edda;color:#155724;padding:10px;border-radius:6px;margin-bottom:12px;}";

/// Escape a string for inclusion in HTML text or attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Password prompt shown when a protected file is requested without a valid
/// password.
pub fn password_prompt(filename: &str) -> String {
    let filename = escape_html(filename);
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"UTF-8\">\
<title>Password Required</title><style>{CARD_STYLE}</style></head><body>\
<div class=\"card\"><h2>Password Required for {filename}</h2>\
<form method=\"post\"><input type=\"password\" name=\"password\" \
placeholder=\"Enter password\" required autofocus>\
<input type=\"submit\" value=\"Access File\"></form></div></body></html>"
    )
}

/// Refusal page for a file whose visit limit has been reached.
pub fn locked_page(filename: &str) -> String {
    let filename = escape_html(filename);
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"UTF-8\">\
<title>File Locked</title><style>{CARD_STYLE}\
.card{{color:#721c24;background-color:#f8d7da;border:1px solid #f5c6cb;}}</style></head>\
<body><div class=\"card\"><h2>File Locked</h2>\
<p>The file <strong>{filename}</strong> has reached its visit limit and can no \
longer be accessed.</p></div></body></html>"
    )
}

/// Master password login form for the admin panel.
pub fn login_page(admin_path: &str) -> String {
    let admin_path = escape_html(admin_path);
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"UTF-8\">\
<title>Admin Login</title><style>{CARD_STYLE}</style></head><body>\
<div class=\"card\"><h2>Admin Login</h2>\
<form method=\"post\" action=\"/{admin_path}\">\
<input type=\"password\" name=\"password\" placeholder=\"Master password\" required autofocus>\
<input type=\"submit\" value=\"Log In\"></form></div></body></html>"
    )
}

/// Admin panel: upload form plus a management table over all stored files.
pub fn panel_page(admin_path: &str, files: &[FileEntry], message: Option<&str>) -> String {
    let admin_path = escape_html(admin_path);
    let mut rows = String::new();
    for entry in files {
        let name = escape_html(&entry.name);
        let protection = if entry.protected { "Yes" } else { "No" };
        let lock = match entry.visit_limit {
            Some(limit) => format!("{}/{}", entry.visit_count, limit),
            None => "-".to_string(),
        };
        rows.push_str(&format!(
            "<tr><td><a href=\"/files/{name}\">{name}</a></td>\
<td>{size}</td><td>{modified}</td><td>{protection}</td><td>{lock}</td><td>\
<form class=\"inline\" method=\"post\" action=\"/rename/{name}\">\
<input type=\"text\" name=\"new_name\" placeholder=\"new name\">\
<input type=\"submit\" value=\"Rename\"></form>\
<form class=\"inline\" method=\"post\" action=\"/delete/{name}\">\
<input type=\"submit\" value=\"Delete\"></form></td></tr>",
            size = entry.size,
            modified = entry.modified.format("%Y-%m-%d %H:%M"),
        ));
    }

    let message_html = match message {
        Some(msg) => format!("<div class=\"msg\">{}</div>", escape_html(msg)),
        None => String::new(),
    };

    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"UTF-8\">\
<title>File Admin</title><style>{PANEL_STYLE}</style></head><body>\
<div class=\"panel\"><h2>File Admin</h2>{message_html}\
<form method=\"post\" action=\"/upload\" enctype=\"multipart/form-data\">\
<input type=\"file\" name=\"file\" required>\
<input type=\"text\" name=\"custom_name\" placeholder=\"custom name (optional)\">\
<input type=\"text\" name=\"password\" placeholder=\"password (optional)\">\
<input type=\"text\" name=\"visit_limit\" placeholder=\"visit limit (optional)\">\
<input type=\"submit\" value=\"Upload\"></form>\
<table><tr><th>Name</th><th>Size</th><th>Modified</th><th>Protected</th>\
<th>Visits</th><th>Actions</th></tr>{rows}</table>\
<p><a href=\"/{admin_path}/logout\">Log out</a></p></div></body></html>"
    )
}
