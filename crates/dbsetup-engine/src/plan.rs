//! Reconciliation plans and their rendering.
//!
//! A [`Plan`] is an ordered list of [`Action`]s. Order is execution order;
//! rendering regroups actions by category (resources, groups, grants) so the
//! operator sees one section per category.

use dbsetup_core::{Grant, PermissionLevel, ResourceKind, ResourceRef, ResourceSpec};
use std::fmt::Write as _;

/// Principal labels in the grant section are padded to this width.
pub const PRINCIPAL_COLUMN_WIDTH: usize = 30;

const UPDATE_HEADER: &str = "The following changes will be applied:";
const DELETE_HEADER: &str = "The following resources will be deleted:";
const EMPTY_PLAN: &str = "No changes.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanMode {
    Update,
    Delete,
}

/// A resource an action applies to.
///
/// `id` is `None` for a resource created earlier in the same plan; the
/// executor fills it in from the create's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub kind: ResourceKind,
    pub name: String,
    pub id: Option<String>,
}

impl Target {
    pub fn new(kind: ResourceKind, name: impl Into<String>, id: Option<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            id,
        }
    }

    pub fn reference(&self) -> Option<ResourceRef> {
        self.id.as_ref().map(|id| ResourceRef::new(self.kind, id.clone()))
    }

    /// `<id>: <name>` when the id differs from the name, otherwise the name.
    pub fn label(&self) -> String {
        match &self.id {
            Some(id) if *id != self.name => format!("{}: {}", id, self.name),
            _ => self.name.clone(),
        }
    }

    /// Key for the grant section: the id when known, otherwise the name.
    fn acl_key(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// `elevated` runs the create under a freshly minted elevated profile.
    CreateResource { spec: ResourceSpec, elevated: bool },
    UpdateResource { target: Target, spec: ResourceSpec },
    TerminateResource { target: Target },
    /// With `verify_absent`, the resource must no longer be listed afterwards.
    DeleteResource { target: Target, verify_absent: bool },
    CreateGroup { name: String },
    GrantPermission { target: Target, grant: Grant },
    /// Remove every direct grant of a principal.
    DeleteGrant {
        target: Target,
        principal: String,
        levels: Vec<PermissionLevel>,
    },
    DeleteGroup { name: String },
}

impl Action {
    /// One-line description used in logs and errors.
    pub fn describe(&self) -> String {
        match self {
            Action::CreateResource { spec, .. } => format!("create {} {}", spec.kind(), spec.name()),
            Action::UpdateResource { target, .. } => format!("update {} {}", target.kind, target.label()),
            Action::TerminateResource { target } => format!("terminate {} {}", target.kind, target.label()),
            Action::DeleteResource { target, .. } => format!("delete {} {}", target.kind, target.label()),
            Action::CreateGroup { name } => format!("create group {}", name),
            Action::GrantPermission { target, grant } => format!(
                "grant {} to {} on {} {}",
                grant.level, grant.principal, target.kind, target.label()
            ),
            Action::DeleteGrant { target, principal, .. } => format!(
                "delete grants of {} on {} {}",
                principal, target.kind, target.label()
            ),
            Action::DeleteGroup { name } => format!("delete group {}", name),
        }
    }

    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            Action::DeleteResource { .. } | Action::DeleteGrant { .. }
                | Action::DeleteGroup { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub mode: PlanMode,
    actions: Vec<Action>,
}

impl Plan {
    pub fn new(mode: PlanMode) -> Self {
        Self {
            mode,
            actions: Vec::new(),
        }
    }

    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Human-readable form shown before the plan is applied.
    pub fn render(&self) -> String {
        if self.is_empty() {
            return format!("{}\n", EMPTY_PLAN);
        }

        let mut out = String::new();
        out.push_str(match self.mode {
            PlanMode::Update => UPDATE_HEADER,
            PlanMode::Delete => DELETE_HEADER,
        });
        out.push('\n');

        for kind in [ResourceKind::Cluster, ResourceKind::Scope] {
            let lines: Vec<String> = self
                .actions
                .iter()
                .filter_map(|a| self.resource_line(a, kind))
                .collect();
            write_section(&mut out, kind.header(), &lines);
        }

        let groups: Vec<String> = self
            .actions
            .iter()
            .filter_map(|a| match a {
                Action::CreateGroup { name } | Action::DeleteGroup { name } => Some(name.clone()),
                _ => None,
            })
            .collect();
        write_section(&mut out, "Groups", &groups);

        let acls = self.acl_lines();
        if !acls.is_empty() {
            out.push_str("Acls:\n");
            for (key, principals) in acls {
                let _ = writeln!(out, "\t{}:", key);
                for (principal, levels) in principals {
                    let label = format!("{}:", principal);
                    let _ = writeln!(
                        out,
                        "\t\t{:<width$}{}",
                        label,
                        levels.join(", "),
                        width = PRINCIPAL_COLUMN_WIDTH
                    );
                }
            }
        }

        out
    }

    fn resource_line(&self, action: &Action, kind: ResourceKind) -> Option<String> {
        let (verb, label) = match action {
            Action::CreateResource { spec, .. } if spec.kind() == kind => ("create", spec.name().to_string()),
            Action::UpdateResource { target, .. } if target.kind == kind => ("update", target.label()),
            Action::TerminateResource { target } if target.kind == kind => ("terminate", target.label()),
            Action::DeleteResource { target, .. } if target.kind == kind => ("delete", target.label()),
            _ => return None,
        };
        Some(match self.mode {
            PlanMode::Update => format!("{} {}", verb, label),
            PlanMode::Delete => label,
        })
    }

    /// Grant lines grouped by resource, then by principal, in first-seen order.
    fn acl_lines(&self) -> Vec<(String, Vec<(String, Vec<String>)>)> {
        let mut sections: Vec<(String, Vec<(String, Vec<String>)>)> = Vec::new();
        let mut add = |key: &str, principal: &str, level: String| {
            let index = match sections.iter().position(|(k, _)| k == key) {
                Some(i) => i,
                None => {
                    sections.push((key.to_string(), Vec::new()));
                    sections.len() - 1
                }
            };
            let principals = &mut sections[index].1;
            match principals.iter_mut().find(|(p, _)| p == principal) {
                Some((_, levels)) => levels.push(level),
                None => principals.push((principal.to_string(), vec![level])),
            }
        };

        let removed = match self.mode {
            PlanMode::Update => "-",
            PlanMode::Delete => "",
        };
        for action in &self.actions {
            match action {
                Action::GrantPermission { target, grant } => {
                    add(target.acl_key(), &grant.principal, format!("+{}", grant.level))
                }
                Action::DeleteGrant {
                    target,
                    principal,
                    levels,
                } => {
                    for level in levels {
                        add(target.acl_key(), principal, format!("{}{}", removed, level));
                    }
                }
                _ => {}
            }
        }
        sections
    }
}

fn write_section(out: &mut String, header: &str, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    let _ = writeln!(out, "{}:", header);
    for line in lines {
        let _ = writeln!(out, "\t{}", line);
    }
}
