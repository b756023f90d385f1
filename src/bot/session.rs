//! Stateful file management session for chat integrations.
//!
//! A session holds the result of the last search and at most one selected
//! file; commands act on that selection and answer with plain text replies
//! the transport can forward verbatim. The engine is transport-agnostic so
//! the same flow works from any chat frontend.

use std::sync::Arc;

use crate::files::{FileService, UploadRequest};

use super::command::{help_text, parse_command, BotCommand};

/// Whether the session keeps going after a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Session continues.
    Continue,
    /// Session ended (quit command).
    Done,
}

/// A file management conversation.
pub struct ManageSession {
    service: Arc<FileService>,
    base_url: String,
    matches: Vec<String>,
    selected: Option<String>,
}

impl ManageSession {
    /// Start a new session.
    pub fn new(service: Arc<FileService>, base_url: impl Into<String>) -> Self {
        Self {
            service,
            base_url: base_url.into(),
            matches: Vec::new(),
            selected: None,
        }
    }

    /// The currently selected file, if any.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Handle one input line and produce the reply plus the session outcome.
    pub fn handle(&mut self, input: &str) -> (String, SessionOutcome) {
        let Some(command) = parse_command(input) else {
            return ("Type a command, or help.".to_string(), SessionOutcome::Continue);
        };

        let reply = match command {
            BotCommand::Search(query) => self.do_search(query.as_deref()),
            BotCommand::Select(n) => self.do_select(n),
            BotCommand::Rename(new_base) => self.with_selection(|s, name| s.do_rename(name, &new_base)),
            BotCommand::Password(pw) => self.with_selection(|s, name| s.do_password(name, pw.as_deref())),
            BotCommand::Lock(limit) => self.with_selection(|s, name| s.do_lock(name, limit)),
            BotCommand::Delete => self.with_selection(|s, name| s.do_delete(name)),
            BotCommand::Link => self.with_selection(|s, name| s.do_link(name)),
            BotCommand::Status => self.with_selection(|s, name| Ok(s.status_text(&name))),
            BotCommand::Help => Ok(help_text()),
            BotCommand::Quit => return ("Bye.".to_string(), SessionOutcome::Done),
            BotCommand::Unknown(cmd) => Ok(format!("Unknown command \"{cmd}\". Type help.")),
        };

        let text = reply.unwrap_or_else(|e| format!("Error: {e}"));
        (text, SessionOutcome::Continue)
    }

    /// Upload a file through the same service the web layer uses.
    ///
    /// Returns the confirmation message with the shareable link.
    pub fn upload(&self, request: UploadRequest) -> crate::Result<String> {
        let password = request.password.clone().filter(|p| !p.is_empty());
        let stored = self.service.upload(request)?;
        Ok(format!(
            "Success! File uploaded.\nYour link: {}",
            self.share_link(&stored.name, password.as_deref())
        ))
    }

    fn with_selection(
        &mut self,
        f: impl FnOnce(&mut Self, String) -> crate::Result<String>,
    ) -> crate::Result<String> {
        match self.selected.clone() {
            Some(name) => f(self, name),
            None => Ok("No file selected. Use search, then select <n>.".to_string()),
        }
    }

    fn do_search(&mut self, query: Option<&str>) -> crate::Result<String> {
        let entries = self.service.list()?;
        let query_lower = query.map(|q| q.to_lowercase());

        self.matches = entries
            .iter()
            .map(|e| e.name.clone())
            .filter(|name| match &query_lower {
                Some(q) => name.to_lowercase().contains(q),
                None => true,
            })
            .collect();

        if self.matches.is_empty() {
            return Ok(match query {
                Some(q) => format!("No files match \"{q}\"."),
                None => "No files found.".to_string(),
            });
        }

        let mut lines = Vec::with_capacity(self.matches.len() + 1);
        lines.push(match query {
            Some(q) => format!("Files matching \"{q}\":"),
            None => "Files:".to_string(),
        });
        for (index, name) in self.matches.iter().enumerate() {
            lines.push(format!("  {}. {}", index + 1, name));
        }
        lines.push("Pick one with select <n>.".to_string());
        Ok(lines.join("\n"))
    }

    fn do_select(&mut self, n: usize) -> crate::Result<String> {
        match self.matches.get(n - 1).cloned() {
            Some(name) => {
                let status = self.status_text(&name);
                self.selected = Some(name);
                Ok(status)
            }
            None => Ok(format!(
                "No file number {n}. The last search had {} results.",
                self.matches.len()
            )),
        }
    }

    fn status_text(&self, name: &str) -> String {
        let record = self.service.record(name).unwrap_or_default();
        let password = if record.is_protected() { "Yes" } else { "No" };
        let lock = match record.visit_limit {
            Some(limit) => format!("{}/{} visits", record.visit_count, limit),
            None => "Not set".to_string(),
        };
        format!("Managing: {name}\nPassword: {password}\nLock: {lock}")
    }

    fn do_rename(&mut self, name: String, new_base: &str) -> crate::Result<String> {
        let new_name = self.service.rename(&name, new_base)?;
        self.selected = Some(new_name.clone());
        // Keep the listing usable after the rename
        if let Some(entry) = self.matches.iter_mut().find(|m| **m == name) {
            *entry = new_name.clone();
        }
        Ok(format!("Renamed {name} to {new_name}."))
    }

    fn do_password(&mut self, name: String, password: Option<&str>) -> crate::Result<String> {
        self.service.set_password(&name, password)?;
        Ok(match password.filter(|p| !p.is_empty()) {
            Some(_) => format!("Password set for {name}.\n{}", self.status_text(&name)),
            None => format!("Password removed from {name}.\n{}", self.status_text(&name)),
        })
    }

    fn do_lock(&mut self, name: String, limit: Option<u32>) -> crate::Result<String> {
        self.service.set_lock(&name, limit)?;
        Ok(match limit.filter(|l| *l > 0) {
            Some(l) => format!("Visit limit set to {l} for {name}.\n{}", self.status_text(&name)),
            None => format!("Lock removed from {name}.\n{}", self.status_text(&name)),
        })
    }

    fn do_delete(&mut self, name: String) -> crate::Result<String> {
        self.service.delete(&name)?;
        self.selected = None;
        self.matches.retain(|m| *m != name);
        Ok(format!("Deleted {name}. Select a new file."))
    }

    fn do_link(&mut self, name: String) -> crate::Result<String> {
        let record = self.service.record(&name).unwrap_or_default();
        let link = self.share_link(&name, record.password.as_deref());
        Ok(match record.password {
            Some(_) => format!("Link for {name} (includes password):\n{link}"),
            None => format!("Link for {name}:\n{link}"),
        })
    }

    fn share_link(&self, name: &str, password: Option<&str>) -> String {
        let base = format!("{}/files/{}", self.base_url.trim_end_matches('/'), name);
        match password {
            Some(pw) => format!("{base}?password={}", urlencoding::encode(pw)),
            None => base,
        }
    }
}
