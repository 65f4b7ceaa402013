use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

pub const TOAST_LOG_FILE: &str = "toast.log";

pub fn append_toast_log(msg: &str) {
    append_toast_log_to(Path::new(TOAST_LOG_FILE), msg);
}

/// Append `msg` to `path` as `<rfc3339> - <msg>`. Failures are logged and
/// otherwise ignored; a toast must never take the UI down.
pub fn append_toast_log_to(path: &Path, msg: &str) {
    let result = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| writeln!(file, "{} - {}", Local::now().to_rfc3339(), msg));
    if let Err(e) = result {
        tracing::warn!(path = %path.display(), "failed to append toast log: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::append_toast_log_to;
    use tempfile::tempdir;

    #[test]
    fn lines_are_appended_with_timestamp() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("toast.log");
        append_toast_log_to(&path, "License activated");
        append_toast_log_to(&path, "Content copied to clipboard!");
        let text = std::fs::read_to_string(&path).expect("read");
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" - License activated"));
        let (stamp, _) = lines[1].split_once(" - ").expect("separator");
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
    }
}
