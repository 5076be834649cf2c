// src/viewer_state.rs
use std::path::Path;
use std::time::{Duration, Instant};

use crate::data_types::{RawSheet, Record, SheetTable};
use crate::engine;
use crate::table_state::TableState;
use crate::transform::SheetTransform;
use crate::upload_client::{is_supported_file, UploadError};

pub const UPLOAD_FAILED_MESSAGE: &str = "Failed to process the file. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub raised_at: Instant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSheet {
    pub file_name: String,
    pub sheet_name: String,
    pub num_of_sheets: u32,
    pub table: SheetTable,
}

/// Everything the window shows, updated one message at a time.
#[derive(Debug)]
pub struct ViewerState {
    pub sheet: Option<LoadedSheet>,
    pub table_state: TableState,
    pub loading: bool,
    pub notification: Option<Notification>,
    notification_ttl: Duration,
}

impl ViewerState {
    pub fn new(notification_ttl: Duration) -> Self {
        ViewerState {
            sheet: None,
            table_state: TableState::new(),
            loading: false,
            notification: None,
            notification_ttl,
        }
    }

    /// Returns true when the upload may start.
    pub fn begin_upload(&mut self, path: &Path, now: Instant) -> bool {
        if self.loading {
            log::debug!("upload already in flight, ignoring {}", path.display());
            return false;
        }
        if !is_supported_file(path) {
            self.notify(
                NotificationKind::Error,
                "Unsupported file",
                "Please choose an .xlsx or .xls file.".to_string(),
                now,
            );
            return false;
        }
        self.loading = true;
        true
    }

    pub fn finish_upload(&mut self, file_name: &str, result: Result<RawSheet, UploadError>, now: Instant) {
        self.loading = false;

        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("upload of {} failed: {}", file_name, e);
                self.notify(NotificationKind::Error, "Error", UPLOAD_FAILED_MESSAGE.to_string(), now);
                return;
            }
        };

        let table = match SheetTransform::new().transform(&raw.sheet_data) {
            Ok(table) => table,
            Err(e) => {
                log::error!("could not process sheet data of {}: {}", file_name, e);
                self.notify(NotificationKind::Error, "Data processing error", e.to_string(), now);
                return;
            }
        };

        let mut message = format!("Successfully loaded {} rows from {}", table.records.len(), file_name);
        let (kind, title) = if table.issues.is_empty() {
            (NotificationKind::Success, "Success!")
        } else {
            for issue in &table.issues {
                log::warn!(
                    "{}: row {} has {} cells, header has {}",
                    file_name,
                    issue.row,
                    issue.found,
                    issue.expected
                );
            }
            message.push_str(&format!(" ({} rows did not match the header width)", table.issues.len()));
            (NotificationKind::Warning, "Loaded with warnings")
        };
        log::info!("{}", message);

        self.sheet = Some(LoadedSheet {
            file_name: file_name.to_string(),
            sheet_name: raw.sheet_name,
            num_of_sheets: raw.num_of_sheets,
            table,
        });
        self.table_state = TableState::new();
        self.notify(kind, title, message, now);
    }

    /// Back to the upload screen.
    pub fn close_sheet(&mut self) {
        self.sheet = None;
        self.table_state = TableState::new();
    }

    pub fn visible_records(&self) -> Vec<&Record> {
        match &self.sheet {
            Some(sheet) => engine::visible_records(&sheet.table, &self.table_state),
            None => Vec::new(),
        }
    }

    pub fn expire_notification(&mut self, now: Instant) {
        let expired = self
            .notification
            .as_ref()
            .map_or(false, |n| now.duration_since(n.raised_at) >= self.notification_ttl);
        if expired {
            self.notification = None;
        }
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    pub fn notify(&mut self, kind: NotificationKind, title: &str, message: String, now: Instant) {
        self.notification = Some(Notification {
            kind,
            title: title.to_string(),
            message,
            raised_at: now,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn state() -> ViewerState {
        ViewerState::new(Duration::from_secs(5))
    }

    fn people() -> RawSheet {
        RawSheet {
            sheet_name: "People".to_string(),
            num_of_sheets: 1,
            sheet_data: json!([["Name", "Age"], ["Alice", "30"], ["Bob", "25"]]),
        }
    }

    #[test]
    fn successful_upload_loads_the_sheet_and_resets_table_state() {
        let now = Instant::now();
        let mut viewer = state();
        viewer.table_state.set_global_filter("stale".to_string());

        assert!(viewer.begin_upload(Path::new("people.xlsx"), now));
        assert!(viewer.loading);
        viewer.finish_upload("people.xlsx", Ok(people()), now);

        assert!(!viewer.loading);
        let sheet = viewer.sheet.as_ref().unwrap();
        assert_eq!(sheet.sheet_name, "People");
        assert_eq!(sheet.table.records.len(), 2);
        assert_eq!(viewer.table_state, TableState::new());

        let notification = viewer.notification.as_ref().unwrap();
        assert_eq!(notification.kind, NotificationKind::Success);
        assert_eq!(notification.title, "Success!");
        assert_eq!(notification.message, "Successfully loaded 2 rows from people.xlsx");
    }

    #[test]
    fn failed_upload_keeps_previous_state() {
        let now = Instant::now();
        let mut viewer = state();
        viewer.begin_upload(Path::new("people.xlsx"), now);
        viewer.finish_upload("people.xlsx", Err(UploadError::Transport("connection refused".to_string())), now);

        assert!(viewer.sheet.is_none());
        assert!(!viewer.loading);
        let notification = viewer.notification.as_ref().unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.message, UPLOAD_FAILED_MESSAGE);
    }

    #[test]
    fn malformed_sheet_data_is_a_processing_error() {
        let now = Instant::now();
        let mut viewer = state();
        viewer.finish_upload("people.xlsx", Ok(people()), now);
        let loaded = viewer.sheet.clone();

        let broken = RawSheet {
            sheet_data: json!({"rows": 3}),
            ..people()
        };
        viewer.finish_upload("broken.xlsx", Ok(broken), now);

        assert_eq!(viewer.sheet, loaded);
        assert_eq!(viewer.notification.as_ref().unwrap().title, "Data processing error");
    }

    #[test]
    fn empty_sheet_loads_with_no_records() {
        let now = Instant::now();
        let mut viewer = state();
        let header_only = RawSheet {
            sheet_data: json!([["Name", "Age"]]),
            ..people()
        };
        viewer.finish_upload("empty.xlsx", Ok(header_only), now);

        assert!(viewer.sheet.as_ref().unwrap().table.is_empty());
        assert!(viewer.visible_records().is_empty());
        assert_eq!(viewer.notification.as_ref().unwrap().kind, NotificationKind::Success);
    }

    #[test]
    fn ragged_rows_load_with_a_warning() {
        let now = Instant::now();
        let mut viewer = state();
        let ragged = RawSheet {
            sheet_data: json!([["Name", "Age"], ["Alice"], ["Bob", "25"]]),
            ..people()
        };
        viewer.finish_upload("ragged.xlsx", Ok(ragged), now);

        let notification = viewer.notification.as_ref().unwrap();
        assert_eq!(notification.kind, NotificationKind::Warning);
        assert_eq!(notification.title, "Loaded with warnings");
        assert!(notification.message.ends_with("(1 rows did not match the header width)"));
    }

    #[test]
    fn uploads_are_refused_while_loading_or_for_other_extensions() {
        let now = Instant::now();
        let mut viewer = state();
        assert!(!viewer.begin_upload(Path::new("notes.csv"), now));
        assert!(!viewer.loading);
        assert_eq!(viewer.notification.as_ref().unwrap().kind, NotificationKind::Error);

        assert!(viewer.begin_upload(Path::new("a.xls"), now));
        assert!(!viewer.begin_upload(Path::new("b.xlsx"), now));
    }

    #[test]
    fn global_filter_applies_to_visible_records() {
        let now = Instant::now();
        let mut viewer = state();
        viewer.finish_upload("people.xlsx", Ok(people()), now);
        viewer.table_state.set_global_filter("ali".to_string());

        let names: Vec<String> = viewer
            .visible_records()
            .iter()
            .map(|r| r.get("Name").as_string())
            .collect();
        assert_eq!(names, vec!["Alice"]);
    }

    #[test]
    fn closing_the_sheet_resets_everything() {
        let now = Instant::now();
        let mut viewer = state();
        viewer.finish_upload("people.xlsx", Ok(people()), now);
        viewer.table_state.toggle_sort("Age");
        viewer.close_sheet();
        assert!(viewer.sheet.is_none());
        assert_eq!(viewer.table_state, TableState::new());
    }

    #[test]
    fn notifications_expire_after_the_ttl() {
        let now = Instant::now();
        let mut viewer = state();
        viewer.notify(NotificationKind::Success, "Hi", "there".to_string(), now);
        viewer.expire_notification(now + Duration::from_secs(4));
        assert!(viewer.notification.is_some());
        viewer.expire_notification(now + Duration::from_secs(5));
        assert!(viewer.notification.is_none());
    }
}
