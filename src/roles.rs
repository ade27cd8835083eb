//! Role builder — explicit phase machine over experience-section lines.
//!
//! Résumé metadata is disambiguated by position, not by vocabulary: "Acme
//! Corp" on its own is only a company because it follows a title line. The
//! builder therefore tracks which field it expects next and holds a single
//! open role, closed by [`RoleBuilder::finalize`] and nowhere else.

use tracing::trace;

use crate::classify::{strip_bullet, title_head, LineClassifier, LineKind, Metadata};
use crate::model::Role;

/// Title given to bullets that appear before any role title.
pub const PLACEHOLDER_TITLE: &str = "Experience";

/// Prose longer than this is a description, not a company name.
const MAX_FIELD_WORDS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingTitle,
    AwaitingCompany,
    AwaitingMetadata,
    CollectingBullets,
}

pub struct RoleBuilder<'c> {
    classifier: &'c LineClassifier,
    phase: Phase,
    current: Option<Role>,
    /// Company or metadata seen one line ahead of its title
    pending: Option<Metadata>,
    /// The previous line was blank
    after_blank: bool,
    roles: Vec<Role>,
}

/// Build roles from experience-section lines.
pub fn build_roles<S: AsRef<str>>(classifier: &LineClassifier, lines: &[S]) -> Vec<Role> {
    let mut builder = RoleBuilder::new(classifier);
    for (i, line) in lines.iter().enumerate() {
        let next = lines[i + 1..]
            .iter()
            .map(|l| l.as_ref().trim())
            .find(|l| !l.is_empty());
        builder.feed(line.as_ref(), next);
    }
    builder.finish()
}

impl<'c> RoleBuilder<'c> {
    pub fn new(classifier: &'c LineClassifier) -> Self {
        RoleBuilder {
            classifier,
            phase: Phase::AwaitingTitle,
            current: None,
            pending: None,
            after_blank: false,
            roles: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Advance one line. `next` is the following non-blank line, if any.
    pub fn feed(&mut self, line: &str, next: Option<&str>) {
        let line = line.trim();
        let kind = self.classifier.classify(line);
        trace!(phase = ?self.phase, kind = ?kind, line, "role builder step");

        match kind {
            LineKind::Blank => {
                self.after_blank = true;
                return;
            }
            LineKind::Bullet => {
                let text = strip_bullet(line);
                if !text.is_empty() {
                    self.push_bullet(text);
                }
            }
            LineKind::RoleTitle => self.on_title(line),
            LineKind::Metadata => self.on_metadata(line, next),
            LineKind::Company => self.on_company(line, next),
            LineKind::Header(_) | LineKind::Prose => self.on_prose(line),
        }
        self.after_blank = false;
    }

    /// Close the last open role and return every role in order.
    pub fn finish(mut self) -> Vec<Role> {
        self.finalize();
        if let Some(pending) = self.pending.take() {
            let text = metadata_text(&pending);
            if !text.is_empty() {
                self.current = Some(Role::default());
                self.push_bullet(&text);
                self.finalize();
            }
        }
        self.roles
    }

    /// The next line opens a role, either as a bare title or as metadata
    /// led by one ("Senior PM | 2020 – 2021").
    fn next_is_title(&self, next: Option<&str>) -> bool {
        next.is_some_and(|n| match self.classifier.classify(n) {
            LineKind::RoleTitle => true,
            LineKind::Metadata => self
                .classifier
                .metadata(n)
                .is_some_and(|meta| self.title_from_metadata(&meta).is_some()),
            _ => false,
        })
    }

    fn on_title(&mut self, line: &str) {
        let head = title_head(line);
        let tail = line[line.find('|').map_or(line.len(), |i| i + 1)..].trim();
        let mut role = Role {
            title: head.to_string(),
            ..Role::default()
        };
        if !tail.is_empty() {
            match self.classifier.metadata(tail) {
                Some(meta) => absorb(&mut role, meta),
                None => role.company = Some(tail.replace('|', "·")),
            }
        }
        self.open(role);
    }

    fn on_metadata(&mut self, line: &str, next: Option<&str>) {
        let Some(meta) = self.classifier.metadata(line) else {
            return self.on_prose(line);
        };

        match self.phase {
            Phase::AwaitingCompany | Phase::AwaitingMetadata => {
                if let Some(role) = self.current.as_mut() {
                    if fits(role, &meta) {
                        absorb(role, meta);
                        self.phase = Phase::CollectingBullets;
                        return;
                    }
                }
                self.push_bullet(line);
            }
            Phase::AwaitingTitle | Phase::CollectingBullets => {
                if let Some(role) = self.title_from_metadata(&meta) {
                    return self.open(role);
                }
                if self.next_is_title(next) {
                    self.hold(meta);
                    return;
                }
                let fresh = self
                    .current
                    .as_ref()
                    .is_some_and(|role| role.bullets.is_empty() && fits(role, &meta));
                if let Some(role) = self.current.as_mut().filter(|_| fresh) {
                    absorb(role, meta);
                } else {
                    self.push_bullet(line);
                }
            }
        }
    }

    fn on_company(&mut self, line: &str, next: Option<&str>) {
        match self.phase {
            Phase::AwaitingCompany => {
                if let Some(role) = self.current.as_mut() {
                    role.company = Some(line.to_string());
                }
                self.phase = Phase::AwaitingMetadata;
            }
            Phase::AwaitingMetadata => {
                let filled = match self.current.as_mut() {
                    Some(role) if role.location.is_none() => {
                        role.location = Some(line.to_string());
                        true
                    }
                    _ => false,
                };
                if !filled {
                    self.push_bullet(line);
                }
            }
            Phase::AwaitingTitle | Phase::CollectingBullets => {
                if self.next_is_title(next) {
                    self.hold(Metadata {
                        company: Some(line.to_string()),
                        ..Metadata::default()
                    });
                } else {
                    self.on_prose(line);
                }
            }
        }
    }

    fn on_prose(&mut self, line: &str) {
        match self.phase {
            Phase::AwaitingCompany if !is_sentence(line) => {
                if let Some(role) = self.current.as_mut() {
                    role.company = Some(line.to_string());
                }
                self.phase = Phase::AwaitingMetadata;
            }
            Phase::CollectingBullets if self.current.is_some() => {
                let after_blank = self.after_blank;
                if let Some(role) = self.current.as_mut() {
                    continue_role(role, line, after_blank);
                }
            }
            _ => self.push_bullet(line),
        }
    }

    fn push_bullet(&mut self, text: &str) {
        let role = self.current.get_or_insert_with(Role::default);
        role.bullets.push(text.to_string());
        self.phase = Phase::CollectingBullets;
    }

    fn hold(&mut self, meta: Metadata) {
        trace!(?meta, "holding metadata for the next role");
        match self.pending.as_mut() {
            None => self.pending = Some(meta),
            Some(pending) if fits_metadata(pending, &meta) => merge_metadata(pending, meta),
            Some(_) => {
                let text = metadata_text(&meta);
                self.push_bullet(&text);
            }
        }
    }

    /// "Senior PM | Acme | 2020 – 2021" arrives as metadata whose leading
    /// segment is the title.
    fn title_from_metadata(&self, meta: &Metadata) -> Option<Role> {
        let company = meta.company.as_deref()?;
        let mut parts = company.split(" · ");
        let title = parts.next()?.trim();
        if !self.classifier.is_role_title(title) {
            return None;
        }
        let rest: Vec<&str> = parts.collect();
        Some(Role {
            title: title.to_string(),
            company: (!rest.is_empty()).then(|| rest.join(" · ")),
            location: meta.location.clone(),
            start_date: meta.start_date.clone(),
            end_date: meta.end_date.clone(),
            bullets: Vec::new(),
        })
    }

    fn open(&mut self, mut role: Role) {
        self.finalize();
        if let Some(pending) = self.pending.take() {
            if fits(&role, &pending) {
                absorb(&mut role, pending);
            } else {
                role.bullets.push(metadata_text(&pending));
            }
        }
        self.phase = if role.company.is_none() {
            Phase::AwaitingCompany
        } else if role.location.is_none() && role.start_date.is_none() && role.end_date.is_none() {
            Phase::AwaitingMetadata
        } else {
            Phase::CollectingBullets
        };
        trace!(title = %role.title, phase = ?self.phase, "opened role");
        self.current = Some(role);
    }

    /// Push the open role, or fold an untitled one into its neighbour.
    ///
    /// A role with no title and no bullets never reaches the output.
    fn finalize(&mut self) {
        self.phase = Phase::AwaitingTitle;
        let Some(mut role) = self.current.take() else {
            return;
        };
        if !role.title.trim().is_empty() {
            self.roles.push(role);
            return;
        }

        let meta_text = role_metadata_text(&role);
        if let Some(previous) = self.roles.last_mut() {
            if !meta_text.is_empty() {
                previous.bullets.push(meta_text);
            }
            previous.bullets.append(&mut role.bullets);
            return;
        }
        if role.bullets.is_empty() && meta_text.is_empty() {
            return;
        }
        role.title = PLACEHOLDER_TITLE.to_string();
        self.roles.push(role);
    }
}

/// Wrapped text joins the last bullet unless a blank line came between; a
/// short line before any bullet is the missing company.
fn continue_role(role: &mut Role, line: &str, after_blank: bool) {
    let joins = !after_blank
        && role
            .bullets
            .last()
            .is_some_and(|last| !starts_new_paragraph(last, line));
    if joins {
        if let Some(last) = role.bullets.last_mut() {
            last.push(' ');
            last.push_str(line);
        }
    } else if role.bullets.is_empty() && role.company.is_none() && !is_sentence(line) {
        role.company = Some(line.to_string());
    } else {
        role.bullets.push(line.to_string());
    }
}

/// Metadata fields can be merged without overwriting anything.
fn fits(role: &Role, meta: &Metadata) -> bool {
    (role.location.is_none() || meta.location.is_none())
        && ((role.start_date.is_none() && role.end_date.is_none()) || !meta.has_dates())
}

fn fits_metadata(a: &Metadata, b: &Metadata) -> bool {
    (a.location.is_none() || b.location.is_none())
        && (!a.has_dates() || !b.has_dates())
        && (a.company.is_none() || b.company.is_none())
}

/// Fill empty fields of `role`; extra company text is appended.
fn absorb(role: &mut Role, meta: Metadata) {
    if let Some(company) = meta.company {
        role.company = Some(match role.company.take() {
            Some(existing) => format!("{existing} · {company}"),
            None => company,
        });
    }
    if role.location.is_none() {
        role.location = meta.location;
    }
    if role.start_date.is_none() && role.end_date.is_none() {
        role.start_date = meta.start_date;
        role.end_date = meta.end_date;
    }
}

fn merge_metadata(into: &mut Metadata, from: Metadata) {
    into.company = into.company.take().or(from.company);
    into.location = into.location.take().or(from.location);
    if !into.has_dates() {
        into.start_date = from.start_date;
        into.end_date = from.end_date;
    }
}

fn metadata_text(meta: &Metadata) -> String {
    let dates = match (&meta.start_date, &meta.end_date) {
        (Some(s), Some(e)) => Some(format!("{s} – {e}")),
        (Some(d), None) | (None, Some(d)) => Some(d.clone()),
        (None, None) => None,
    };
    [meta.company.clone(), meta.location.clone(), dates]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" · ")
}

fn role_metadata_text(role: &Role) -> String {
    [role.company.clone(), role.location.clone(), role.date_label()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" · ")
}

fn is_sentence(line: &str) -> bool {
    line.ends_with(['.', '!', '?']) || line.split_whitespace().count() > MAX_FIELD_WORDS
}

/// A wrapped line continues the previous bullet unless that bullet ended a
/// sentence and this line starts a new one.
fn starts_new_paragraph(previous: &str, line: &str) -> bool {
    previous.trim_end().ends_with(['.', '!', '?'])
        && line.chars().next().is_some_and(char::is_uppercase)
}
