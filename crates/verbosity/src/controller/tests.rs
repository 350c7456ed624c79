use super::*;
use crate::spec::SpecToken;
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;
use time::OffsetDateTime;
use time::macros::datetime;

fn fixed_clock() -> OffsetDateTime {
    datetime!(2018-02-28 19:33:06 UTC)
}

/// Shared in-memory sink so tests can inspect output while the controller
/// still holds the stream.
#[derive(Clone, Default)]
struct Sink(Arc<Mutex<Vec<u8>>>);

impl Sink {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("broken pipe"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn controller(sink: &Sink) -> Verbosity<'static> {
    let mut verbosity = Verbosity::with_stream(sink.clone());
    verbosity.set_clock(fixed_clock);
    verbosity
}

mod levels {
    use super::*;

    #[test]
    fn starts_at_threshold_one_without_tags() {
        let verbosity = Verbosity::new();
        assert_eq!(verbosity.levels(), &Levels::fallback());
        assert!(verbosity.owned_path().is_none());
    }

    #[test]
    fn default_threshold_admits_level_one_only() {
        let verbosity = Verbosity::new();
        assert!(verbosity.is_level(1));
        assert!(verbosity.is_level(0));
        assert!(!verbosity.is_level(2));
    }

    #[test]
    fn set_levels_replaces_previous_setting() {
        let mut verbosity = Verbosity::new();
        verbosity.set_levels("3,blah");
        verbosity.set_levels("pod");
        assert!(!verbosity.is_level(3));
        assert!(!verbosity.is_level("blah"));
        assert!(verbosity.is_level("pod"));
        assert_eq!(verbosity.levels().threshold(), None);
    }

    #[test]
    fn set_levels_with_uses_custom_delimiter() {
        let mut verbosity = Verbosity::new();
        verbosity.set_levels_with("2:loop", ':');
        assert!(verbosity.is_level(2));
        assert!(verbosity.is_level("loop"));
    }

    #[test]
    fn queries_always_use_default_delimiter() {
        let mut verbosity = Verbosity::new();
        verbosity.set_levels_with("loop:show", ':');
        assert!(verbosity.is_level("x,loop"));
        assert!(!verbosity.is_level("x:loop"));
    }

    #[test]
    fn tag_match_ignores_threshold() {
        let mut verbosity = Verbosity::new();
        verbosity.set_levels(vec![SpecToken::from(1), "loop".into()]);
        assert!(verbosity.is_level(vec![SpecToken::from(9), "loop".into()]));
    }

    #[test]
    fn tag_only_active_levels_reject_numeric_queries() {
        let mut verbosity = Verbosity::new();
        verbosity.set_levels("show");
        assert!(!verbosity.is_level(0));
        assert!(verbosity.is_level("show"));
    }

    #[test]
    fn query_without_threshold_or_shared_tag_is_rejected() {
        let mut verbosity = Verbosity::new();
        verbosity.set_levels(99);
        assert!(!verbosity.is_level("anything"));
    }
}

mod emission {
    use super::*;

    #[test]
    fn active_message_carries_timestamp_and_caller() {
        let sink = Sink::default();
        let mut verbosity = controller(&sink);
        verbosity.verbose(1, "main", "hello");
        assert_eq!(sink.contents(), "2018-02-28 19:33:06: main: hello\n");
    }

    #[test]
    fn inactive_message_writes_nothing() {
        let sink = Sink::default();
        let mut verbosity = controller(&sink);
        verbosity.verbose(5, "main", "hidden");
        assert_eq!(sink.contents(), "");
    }

    #[test]
    fn tag_admits_message_above_threshold() {
        let sink = Sink::default();
        let mut verbosity = controller(&sink);
        verbosity.set_labels(Labels::NONE);
        verbosity.set_levels("1,loop");
        verbosity.verbose(vec![SpecToken::from(7), "loop".into()], "f", "tagged");
        assert_eq!(sink.contents(), "tagged\n");
    }

    #[test]
    fn high_threshold_admits_tagged_message() {
        let sink = Sink::default();
        let mut verbosity = controller(&sink);
        verbosity.set_labels(Labels::NONE);
        verbosity.set_levels(99);
        verbosity.verbose(vec![SpecToken::from(2), "loop".into()], "f", "in loop");
        assert_eq!(sink.contents(), "in loop\n");
    }

    #[test]
    fn labels_can_be_disabled_individually() {
        let sink = Sink::default();
        let mut verbosity = controller(&sink);
        verbosity.set_labels(Labels::TIMESTAMP);
        verbosity.verbose(1, "main", "a");
        verbosity.set_labels(Labels::CALLER);
        verbosity.verbose(1, "main", "b");
        assert_eq!(sink.contents(), "2018-02-28 19:33:06: a\nmain: b\n");
    }

    #[test]
    fn tee_receives_its_own_labels() {
        let sink = Sink::default();
        let mut tee = Vec::new();
        let mut verbosity = controller(&sink);
        verbosity.verbose_with(
            1,
            "main",
            "both",
            Emit::new().tee(&mut tee).tee_labels(Labels::CALLER),
        );
        assert_eq!(sink.contents(), "2018-02-28 19:33:06: main: both\n");
        assert_eq!(String::from_utf8(tee).unwrap(), "main: both\n");
    }

    #[test]
    fn tee_and_primary_share_one_timestamp() {
        fn ticking_clock() -> OffsetDateTime {
            use std::sync::atomic::{AtomicI64, Ordering};
            static SECONDS: AtomicI64 = AtomicI64::new(0);
            let offset = SECONDS.fetch_add(1, Ordering::SeqCst);
            datetime!(2020-01-01 00:00:00 UTC) + time::Duration::seconds(offset)
        }

        let sink = Sink::default();
        let mut tee = Vec::new();
        let mut verbosity = Verbosity::with_stream(sink.clone());
        verbosity.set_clock(ticking_clock);
        verbosity.set_labels(Labels::TIMESTAMP);
        verbosity.set_tee_labels(Labels::TIMESTAMP);
        verbosity.verbose_with(1, "main", "m", Emit::new().tee(&mut tee));

        let primary = sink.contents();
        let tee = String::from_utf8(tee).unwrap();
        assert_eq!(primary, tee);
    }

    #[test]
    fn inactive_message_skips_tee() {
        let sink = Sink::default();
        let mut tee = Vec::new();
        let mut verbosity = controller(&sink);
        verbosity.verbose_with(2, "main", "hidden", Emit::new().tee(&mut tee));
        assert!(tee.is_empty());
        assert_eq!(sink.contents(), "");
    }

    #[test]
    fn tee_is_written_when_primary_fails() {
        let mut tee = Vec::new();
        let mut verbosity = Verbosity::with_stream(FailingWriter);
        verbosity.set_clock(fixed_clock);
        verbosity.verbose_with(
            1,
            "main",
            "kept",
            Emit::new().tee(&mut tee).tee_labels(Labels::NONE),
        );
        assert_eq!(String::from_utf8(tee).unwrap(), "kept\n");
    }

    #[test]
    fn per_call_labels_override_defaults() {
        let sink = Sink::default();
        let mut verbosity = controller(&sink);
        verbosity.verbose_with(1, "main", "bare", Emit::new().labels(Labels::NONE));
        verbosity.verbose(1, "main", "full");
        assert_eq!(
            sink.contents(),
            "bare\n2018-02-28 19:33:06: main: full\n"
        );
    }

    #[test]
    fn message_accepts_any_display_value() {
        let sink = Sink::default();
        let mut verbosity = controller(&sink);
        verbosity.set_labels(Labels::NONE);
        verbosity.verbose(1, "main", 42);
        verbosity.verbose(1, "main", format_args!("{}-{}", "a", 1));
        assert_eq!(sink.contents(), "42\na-1\n");
    }
}

mod destinations {
    use super::*;

    #[test]
    fn open_file_records_absolute_path_and_receives_lines() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("verbose.log");
        let mut verbosity = Verbosity::new();
        verbosity.set_clock(fixed_clock);
        verbosity.set_labels(Labels::CALLER);

        verbosity.open_file(&path, OpenMode::Truncate).expect("open");
        assert!(verbosity.owned_path().is_some_and(Path::is_absolute));
        verbosity.verbose(1, "main", "to file");
        verbosity.close_file();

        assert!(verbosity.owned_path().is_none());
        assert_eq!(fs::read_to_string(&path).unwrap(), "main: to file\n");
    }

    #[test]
    fn open_file_replaces_previous_owned_file() {
        let dir = tempdir().expect("tempdir");
        let first = dir.path().join("first.log");
        let second = dir.path().join("second.log");
        let mut verbosity = Verbosity::new();
        verbosity.set_labels(Labels::NONE);

        verbosity.open_file(&first, OpenMode::Append).expect("open first");
        verbosity.verbose(1, "f", "one");
        verbosity.open_file(&second, OpenMode::Append).expect("open second");
        verbosity.verbose(1, "f", "two");
        verbosity.close_file();

        assert_eq!(fs::read_to_string(&first).unwrap(), "one\n");
        assert_eq!(fs::read_to_string(&second).unwrap(), "two\n");
    }

    #[test]
    fn set_stream_closes_owned_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("verbose.log");
        let sink = Sink::default();
        let mut verbosity = Verbosity::new();
        verbosity.set_labels(Labels::NONE);

        verbosity.open_file(&path, OpenMode::Append).expect("open");
        verbosity.verbose(1, "f", "file line");
        verbosity.set_stream(sink.clone());
        verbosity.verbose(1, "f", "stream line");

        assert!(verbosity.owned_path().is_none());
        assert_eq!(fs::read_to_string(&path).unwrap(), "file line\n");
        assert_eq!(sink.contents(), "stream line\n");
    }

    #[test]
    fn close_file_without_owned_file_is_a_no_op() {
        let sink = Sink::default();
        let mut verbosity = controller(&sink);
        verbosity.set_labels(Labels::NONE);
        verbosity.close_file();
        verbosity.close_file();
        verbosity.verbose(1, "f", "still here");
        assert_eq!(sink.contents(), "still here\n");
    }

    #[test]
    fn failed_open_leaves_no_owned_file() {
        let dir = tempdir().expect("tempdir");
        let good = dir.path().join("good.log");
        let bad = dir.path().join("missing").join("bad.log");
        let mut verbosity = Verbosity::new();

        verbosity.open_file(&good, OpenMode::Append).expect("open");
        let err = verbosity.open_file(&bad, OpenMode::Append).unwrap_err();

        assert!(matches!(err, VerbosityError::Open { .. }));
        assert!(verbosity.owned_path().is_none());
        assert!(good.exists());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn try_close_file_reports_failure_and_clears_ownership() {
        let mut verbosity = Verbosity::new();
        verbosity.set_labels(Labels::NONE);
        verbosity.open_file("/dev/full", OpenMode::Append).expect("open");
        verbosity.verbose(1, "f", "lost");

        let err = verbosity.try_close_file().unwrap_err();
        assert!(matches!(err, VerbosityError::Close { .. }));
        assert!(verbosity.owned_path().is_none());
    }

    #[test]
    fn flush_reaches_owned_file_before_close() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("verbose.log");
        let mut verbosity = Verbosity::new();
        verbosity.set_labels(Labels::NONE);

        verbosity.open_file(&path, OpenMode::Append).expect("open");
        verbosity.verbose(1, "f", "flushed");
        verbosity.flush().expect("flush");

        assert_eq!(fs::read_to_string(&path).unwrap(), "flushed\n");
        verbosity.close_file();
    }

    #[test]
    fn debug_shows_owned_path() {
        let dir = tempdir().expect("tempdir");
        let mut verbosity = Verbosity::new();
        verbosity
            .open_file(dir.path().join("debug.log"), OpenMode::Append)
            .expect("open");
        assert!(format!("{verbosity:?}").contains("debug.log"));
        verbosity.close_file();
    }
}
