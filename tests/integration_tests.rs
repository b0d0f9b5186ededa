//! Integration tests for drive-perm-walker
//!
//! These walk an in-memory folder tree through the public API and write
//! reports into temporary directories. No Drive access is needed.

use chrono::Utc;
use drive_perm_walker::drive::types::{FileListPage, RemoteFile, RemotePermission, MIME_TYPE_FOLDER};
use drive_perm_walker::drive::{DirectoryListing, FolderId};
use drive_perm_walker::error::{DriveError, DriveResult, WalkerError};
use drive_perm_walker::report::sqlite::{get_walk_info, keys};
use drive_perm_walker::report::{CsvReport, ReportContext, ReportWriter, SqliteReport};
use drive_perm_walker::walker::Traverser;
use rusqlite::Connection;
use std::cell::Cell;
use std::collections::HashMap;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

/// Folder tree served page by page, `page_size` children per page
struct MemoryDrive {
    children: HashMap<String, Vec<RemoteFile>>,
    page_size: usize,
    requests: Cell<u64>,
}

impl MemoryDrive {
    fn new(page_size: usize) -> Self {
        Self {
            children: HashMap::new(),
            page_size,
            requests: Cell::new(0),
        }
    }

    fn with(mut self, parent: &str, children: Vec<RemoteFile>) -> Self {
        self.children.insert(parent.to_string(), children);
        self
    }
}

impl DirectoryListing for MemoryDrive {
    fn list_page(&self, folder_id: &FolderId, page_token: Option<&str>) -> DriveResult<FileListPage> {
        self.requests.set(self.requests.get() + 1);

        let children = self
            .children
            .get(folder_id.as_str())
            .ok_or_else(|| DriveError::NotFound {
                folder_id: folder_id.to_string(),
            })?;

        let offset: usize = match page_token {
            Some(token) => token.parse().map_err(|_| DriveError::Http {
                folder_id: folder_id.to_string(),
                status: 400,
                message: format!("bad page token {token}"),
            })?,
            None => 0,
        };
        let end = (offset + self.page_size).min(children.len());

        Ok(FileListPage {
            files: children[offset..end].to_vec(),
            next_page_token: (end < children.len()).then(|| end.to_string()),
        })
    }
}

fn folder(id: &str, name: &str) -> RemoteFile {
    RemoteFile {
        id: id.into(),
        name: name.into(),
        mime_type: MIME_TYPE_FOLDER.into(),
        permissions: Some(vec![user("owner", "Alice", "a@x.com")]),
    }
}

fn file(id: &str, name: &str, permissions: Option<Vec<RemotePermission>>) -> RemoteFile {
    RemoteFile {
        id: id.into(),
        name: name.into(),
        mime_type: "application/pdf".into(),
        permissions,
    }
}

fn user(role: &str, name: &str, email: &str) -> RemotePermission {
    RemotePermission {
        kind: "user".into(),
        role: role.into(),
        display_name: Some(name.into()),
        email_address: Some(email.into()),
        ..Default::default()
    }
}

fn domain(role: &str, domain: &str) -> RemotePermission {
    RemotePermission {
        kind: "domain".into(),
        role: role.into(),
        domain: Some(domain.into()),
        ..Default::default()
    }
}

fn traverser(drive: &MemoryDrive) -> Traverser<&MemoryDrive> {
    Traverser::new(drive).with_request_delay(Duration::ZERO)
}

/// r1 ─┬─ Sub ─── doc.txt
///     ├─ Projects ─┬─ plan.pdf
///     │            └─ 2024 ─── budget.pdf
///     └─ readme.pdf
fn sample_drive(page_size: usize) -> MemoryDrive {
    MemoryDrive::new(page_size)
        .with(
            "r1",
            vec![
                folder("s1", "Sub"),
                folder("p1", "Projects"),
                file("f0", "readme.pdf", None),
            ],
        )
        .with(
            "s1",
            vec![file(
                "f1",
                "doc.txt",
                Some(vec![user("owner", "Alice", "a@x.com"), domain("writer", "example.com")]),
            )],
        )
        .with(
            "p1",
            vec![
                file(
                    "f2",
                    "plan.pdf",
                    Some(vec![
                        user("writer", "Bob", "b@x.com"),
                        user("owner", "Alice", "a@x.com"),
                        user("writer", "Carol", "c@x.com"),
                    ]),
                ),
                folder("y1", "2024"),
            ],
        )
        .with("y1", vec![file("f3", "budget.pdf", Some(vec![]))])
}

#[test]
fn test_scenario_single_row() {
    let drive = MemoryDrive::new(100)
        .with("r1", vec![folder("s1", "Sub")])
        .with(
            "s1",
            vec![file(
                "f1",
                "doc.txt",
                Some(vec![user("owner", "Alice", "a@x.com"), domain("writer", "example.com")]),
            )],
        );

    let inventory = traverser(&drive).traverse(&FolderId::from("r1")).unwrap();
    assert_eq!(inventory.len(), 1);

    let row = &inventory.records()[0];
    assert_eq!(row.id, "f1");
    assert_eq!(row.name, "doc.txt");
    assert_eq!(row.path, "/Sub");
    assert_eq!(row.owner, "'Alice' <a@x.com>");
    assert_eq!(row.writers, "example.com");
}

#[test]
fn test_every_file_once_with_folder_path() {
    let drive = sample_drive(100);
    let mut inventory = traverser(&drive).traverse(&FolderId::from("r1")).unwrap();
    inventory.sort_by_path();

    let rows: Vec<_> = inventory
        .iter()
        .map(|r| (r.path.as_str(), r.name.as_str()))
        .collect();
    assert_eq!(
        rows,
        [
            ("", "readme.pdf"),
            ("/Projects", "plan.pdf"),
            ("/Projects/2024", "budget.pdf"),
            ("/Sub", "doc.txt"),
        ]
    );

    let plan = inventory.iter().find(|r| r.id == "f2").unwrap();
    assert_eq!(plan.owner, "'Alice' <a@x.com>");
    assert_eq!(plan.writers, "'Bob' <b@x.com>,'Carol' <c@x.com>");
}

#[test]
fn test_small_pages_give_same_inventory() {
    let big = sample_drive(100);
    let small = sample_drive(1);

    let mut a = traverser(&big).traverse(&FolderId::from("r1")).unwrap();
    let mut b = traverser(&small).traverse(&FolderId::from("r1")).unwrap();
    a.sort_by_path();
    b.sort_by_path();

    assert_eq!(a, b);
    assert!(small.requests.get() > big.requests.get());
}

#[test]
fn test_three_pages_for_one_folder() {
    let children: Vec<_> = (0..7)
        .map(|i| file(&format!("f{i}"), &format!("file{i}.pdf"), None))
        .collect();
    let drive = MemoryDrive::new(3).with("r", children);

    let result = traverser(&drive).walk(&FolderId::from("r"), |_| {}).unwrap();
    let mut ids: Vec<_> = result.inventory.iter().map(|r| r.id.clone()).collect();
    ids.sort();
    ids.dedup();

    assert_eq!(ids.len(), 7);
    assert_eq!(result.inventory.len(), 7);
    assert_eq!(result.stats.pages, 3);
}

#[test]
fn test_unknown_grantee_fails_walk() {
    let drive = MemoryDrive::new(100).with(
        "r",
        vec![file(
            "f",
            "odd.pdf",
            Some(vec![RemotePermission {
                kind: "unexpected_value".into(),
                role: "writer".into(),
                ..Default::default()
            }]),
        )],
    );

    let err = traverser(&drive).traverse(&FolderId::from("r")).unwrap_err();
    assert!(matches!(err, WalkerError::FilePermission { .. }));
}

#[test]
fn test_csv_report_file() {
    let drive = sample_drive(2);
    let result = traverser(&drive).walk(&FolderId::from("r1"), |_| {}).unwrap();
    let mut inventory = result.inventory;
    inventory.sort_by_path();

    let dir = tempdir().unwrap();
    let path = dir.path().join("perms.csv");
    let root = FolderId::from("r1");
    let context = ReportContext {
        root: &root,
        stats: &result.stats,
        started_at: Utc::now(),
    };

    let mut report = CsvReport::create(&path).unwrap();
    report.write_report(&inventory, &context).unwrap();
    drop(report);

    let written = fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = written.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "id,name,path,owner,writers");
    assert_eq!(lines[1], "f0,readme.pdf,,,");
    assert_eq!(
        lines[2],
        "f2,plan.pdf,/Projects,'Alice' <a@x.com>,\"'Bob' <b@x.com>,'Carol' <c@x.com>\""
    );
    assert_eq!(lines[4], "f1,doc.txt,/Sub,'Alice' <a@x.com>,example.com");
}

#[test]
fn test_sqlite_report_file() {
    let drive = sample_drive(100);
    let result = traverser(&drive).walk(&FolderId::from("r1"), |_| {}).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("perms.db");
    let root = FolderId::from("r1");
    let context = ReportContext {
        root: &root,
        stats: &result.stats,
        started_at: Utc::now(),
    };

    let mut report = SqliteReport::create(&path).unwrap();
    report.write_report(&result.inventory, &context).unwrap();
    drop(report);

    let conn = Connection::open(&path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 4);

    let writers: String = conn
        .query_row("SELECT writers FROM files WHERE id = 'f1'", [], |row| row.get(0))
        .unwrap();
    assert_eq!(writers, "example.com");

    assert_eq!(
        get_walk_info(&conn, keys::TOTAL_FOLDERS).unwrap(),
        Some("4".to_string())
    );
    assert_eq!(
        get_walk_info(&conn, keys::ROOT_FOLDER_ID).unwrap(),
        Some("r1".to_string())
    );
}
