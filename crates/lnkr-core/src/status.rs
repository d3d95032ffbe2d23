//! Status reconciler: compares each entry's declared link with the
//! filesystem.
//!
//! The link location is always under the local root and the expected target
//! always under the remote root.

use crate::error::Result;
use crate::platform::FileIdentity;
use crate::project::Project;
use crate::registry::{LinkEntry, LinkKind, Registry};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Raw result of checking one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkCheck {
    /// `false` once the link location is known to be missing
    pub exists: bool,
    /// The link points where the registry says it should
    pub linked: bool,
    pub error: Option<String>,
}

impl LinkCheck {
    fn missing() -> Self {
        Self::default()
    }

    fn linked() -> Self {
        Self {
            exists: true,
            linked: true,
            error: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            exists: true,
            linked: false,
            error: Some(message.into()),
        }
    }

    /// Display text, in priority order: not found, error, linked, not linked.
    pub fn status_text(&self) -> String {
        if !self.exists {
            return "NOT FOUND".to_string();
        }
        if let Some(error) = &self.error {
            return format!("ERROR: {}", error);
        }
        if self.linked {
            "LINKED".to_string()
        } else {
            "NOT LINKED".to_string()
        }
    }
}

/// One row of the status table.
#[derive(Debug, Clone, Serialize)]
pub struct StatusRow {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: LinkKind,
    pub status: String,
    #[serde(skip)]
    pub check: LinkCheck,
}

/// Status of every entry, in registry order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct StatusReport {
    pub rows: Vec<StatusRow>,
}

impl StatusReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render a fixed-width table with a dashed rule under the header.
    pub fn render_table(&self) -> String {
        const HEADERS: [&str; 3] = ["Path", "Type", "Status"];

        let mut widths = HEADERS.map(|h| h.chars().count());
        for row in &self.rows {
            let cells = [row.path.as_str(), row.kind.as_str(), row.status.as_str()];
            for (width, cell) in widths.iter_mut().zip(cells) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let header = table_line(&widths, HEADERS);
        let rule = "-".repeat(header.chars().count());
        let mut out = vec![header.trim_end().to_string(), rule];
        for row in &self.rows {
            out.push(
                table_line(
                    &widths,
                    [row.path.as_str(), row.kind.as_str(), row.status.as_str()],
                )
                .trim_end()
                .to_string(),
            );
        }

        let mut text = out.join("\n");
        text.push('\n');
        text
    }
}

fn table_line(widths: &[usize; 3], cells: [&str; 3]) -> String {
    format!(
        "{:<w0$}  {:<w1$}  {:<w2$}",
        cells[0],
        cells[1],
        cells[2],
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2]
    )
}

/// Check every registered entry.
pub fn status(project: &Project) -> Result<StatusReport> {
    let registry = project.load()?;
    let rows = registry
        .entries
        .iter()
        .map(|entry| {
            let check = check_entry(&registry, entry);
            debug!("{}: {:?}", entry.path, check);
            StatusRow {
                path: entry.path.clone(),
                kind: entry.kind,
                status: check.status_text(),
                check,
            }
        })
        .collect();
    Ok(StatusReport { rows })
}

/// Check a single entry against the configured roots.
pub fn check_entry(registry: &Registry, entry: &LinkEntry) -> LinkCheck {
    let (Some(local), Some(remote)) = (&registry.local, &registry.remote) else {
        return LinkCheck::error("root not configured");
    };

    let link_path = local.join(&entry.path);
    let expected = remote.join(&entry.path);

    let meta = match link_path.symlink_metadata() {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return LinkCheck::missing(),
        Err(e) => return LinkCheck::error(format!("Cannot access link: {}", e)),
    };

    match entry.kind {
        LinkKind::Symbolic => check_symbolic(&link_path, &meta, &expected),
        LinkKind::Hard => check_hard(&meta, &expected),
    }
}

fn check_symbolic(link_path: &Path, meta: &fs::Metadata, expected: &Path) -> LinkCheck {
    if !meta.file_type().is_symlink() {
        return LinkCheck::error("Not a symbolic link");
    }

    let target = match fs::read_link(link_path) {
        Ok(target) => target,
        Err(e) => return LinkCheck::error(format!("Cannot read link target: {}", e)),
    };

    // Relative targets resolve against the directory holding the link.
    let resolved = match link_path.parent() {
        Some(parent) if target.is_relative() => parent.join(&target),
        _ => target.clone(),
    };
    if !resolved.exists() {
        return LinkCheck::error(format!("Target not found: {}", target.display()));
    }

    if target != expected {
        return LinkCheck::error(format!(
            "Wrong target: {} (expected: {})",
            target.display(),
            expected.display()
        ));
    }

    LinkCheck::linked()
}

fn check_hard(meta: &fs::Metadata, expected: &Path) -> LinkCheck {
    if meta.is_dir() {
        return LinkCheck::error("Hard links cannot be created for directories");
    }

    let target_meta = match fs::metadata(expected) {
        Ok(target_meta) => target_meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return LinkCheck::error(format!("Target not found: {}", expected.display()))
        }
        Err(e) => return LinkCheck::error(format!("Cannot access target file: {}", e)),
    };

    match (
        FileIdentity::from_metadata(meta),
        FileIdentity::from_metadata(&target_meta),
    ) {
        (Some(link_id), Some(target_id)) if link_id == target_id => LinkCheck::linked(),
        (Some(_), Some(_)) => LinkCheck::error("Not a hard link (different inodes)"),
        _ => LinkCheck::error("Cannot determine file identity"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn registry_for(temp: &TempDir) -> Registry {
        let local = temp.path().join("local");
        let remote = temp.path().join("remote");
        fs::create_dir_all(&local).unwrap();
        fs::create_dir_all(&remote).unwrap();
        Registry {
            local: Some(local),
            remote: Some(remote),
            ..Default::default()
        }
    }

    #[test]
    fn test_status_text_priority() {
        let check = LinkCheck {
            exists: false,
            linked: true,
            error: Some("boom".into()),
        };
        assert_eq!(check.status_text(), "NOT FOUND");
        assert_eq!(LinkCheck::error("boom").status_text(), "ERROR: boom");
        assert_eq!(LinkCheck::linked().status_text(), "LINKED");
        let idle = LinkCheck {
            exists: true,
            ..Default::default()
        };
        assert_eq!(idle.status_text(), "NOT LINKED");
    }

    #[test]
    fn test_missing_link_location() {
        let temp = TempDir::new().unwrap();
        let registry = registry_for(&temp);
        let check = check_entry(&registry, &LinkEntry::new("nope", LinkKind::Hard));
        assert_eq!(check.status_text(), "NOT FOUND");
    }

    #[test]
    fn test_unconfigured_root() {
        let registry = Registry::default();
        let check = check_entry(&registry, &LinkEntry::new("a", LinkKind::Symbolic));
        assert_eq!(check.status_text(), "ERROR: root not configured");
    }

    #[cfg(unix)]
    #[test]
    fn test_hard_link_identity() {
        let temp = TempDir::new().unwrap();
        let registry = registry_for(&temp);
        let local = registry.local.clone().unwrap();
        let remote = registry.remote.clone().unwrap();
        fs::write(remote.join("f.txt"), "x").unwrap();
        fs::hard_link(remote.join("f.txt"), local.join("f.txt")).unwrap();
        fs::write(remote.join("g.txt"), "x").unwrap();
        fs::write(local.join("g.txt"), "x").unwrap();

        let linked = check_entry(&registry, &LinkEntry::new("f.txt", LinkKind::Hard));
        assert_eq!(linked.status_text(), "LINKED");

        let copy = check_entry(&registry, &LinkEntry::new("g.txt", LinkKind::Hard));
        assert_eq!(
            copy.status_text(),
            "ERROR: Not a hard link (different inodes)"
        );
    }

    #[test]
    fn test_hard_entry_on_directory() {
        let temp = TempDir::new().unwrap();
        let registry = registry_for(&temp);
        fs::create_dir_all(registry.local.as_ref().unwrap().join("d")).unwrap();

        let check = check_entry(&registry, &LinkEntry::new("d", LinkKind::Hard));
        assert!(check.error.unwrap().contains("directories"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symbolic_checks() {
        let temp = TempDir::new().unwrap();
        let registry = registry_for(&temp);
        let local = registry.local.clone().unwrap();
        let remote = registry.remote.clone().unwrap();

        fs::create_dir_all(remote.join("good")).unwrap();
        std::os::unix::fs::symlink(remote.join("good"), local.join("good")).unwrap();
        std::os::unix::fs::symlink(remote.join("missing"), local.join("dangling")).unwrap();
        fs::write(temp.path().join("elsewhere"), "x").unwrap();
        std::os::unix::fs::symlink(temp.path().join("elsewhere"), local.join("wrong")).unwrap();
        fs::write(local.join("plain"), "x").unwrap();

        let text = |p: &str| check_entry(&registry, &LinkEntry::new(p, LinkKind::Symbolic)).status_text();
        assert_eq!(text("good"), "LINKED");
        assert!(text("dangling").starts_with("ERROR: Target not found"));
        assert!(text("wrong").starts_with("ERROR: Wrong target"));
        assert_eq!(text("plain"), "ERROR: Not a symbolic link");
    }

    #[test]
    fn test_render_table_widths() {
        let report = StatusReport {
            rows: vec![
                StatusRow {
                    path: "a".into(),
                    kind: LinkKind::Hard,
                    status: "LINKED".into(),
                    check: LinkCheck::linked(),
                },
                StatusRow {
                    path: "some/longer/path.txt".into(),
                    kind: LinkKind::Symbolic,
                    status: "NOT FOUND".into(),
                    check: LinkCheck::missing(),
                },
            ],
        };

        let table = report.render_table();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Path                  Type      Status");
        assert_eq!(lines[1], "-".repeat(20 + 2 + 8 + 2 + 9));
        assert_eq!(lines[2], "a                     hard      LINKED");
        assert_eq!(lines[3], "some/longer/path.txt  symbolic  NOT FOUND");
    }

    #[test]
    fn test_report_serializes_as_array() {
        let report = StatusReport {
            rows: vec![StatusRow {
                path: "x".into(),
                kind: LinkKind::Symbolic,
                status: "LINKED".into(),
                check: LinkCheck::linked(),
            }],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "path": "x", "type": "symbolic", "status": "LINKED" }])
        );
    }
}
