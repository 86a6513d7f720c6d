//! Human-readable status lines emitted while a relocation runs.

use std::io::Write;
use std::path::Path;

/// Line-oriented writer for run progress.
///
/// Write failures are logged and otherwise ignored; losing a status line must
/// not interrupt a half-finished relocation.
pub(crate) struct StatusWriter<'a, W: Write> {
    sink: &'a mut W,
}

impl<'a, W: Write> StatusWriter<'a, W> {
    pub(crate) fn new(sink: &'a mut W) -> Self {
        Self { sink }
    }

    fn emit(&mut self, line: &str) {
        if let Err(e) = writeln!(self.sink, "{line}") {
            tracing::warn!(error = %e, "failed to write status line");
        }
    }

    pub(crate) fn created_destination(&mut self, path_dir_dst: &Path) {
        self.emit(&format!(
            "Created destination directory: {}",
            path_dir_dst.display()
        ));
    }

    pub(crate) fn moved(&mut self, path_src: &Path, path_dst: &Path) {
        self.emit(&format!(
            "Moved: {} -> {}",
            path_src.display(),
            path_dst.display()
        ));
    }

    pub(crate) fn collision(&mut self, name_file: &str, path_dir_dst: &Path) {
        self.emit(&format!(
            "File {name_file} already exists in {}. Skipping.",
            path_dir_dst.display()
        ));
    }

    pub(crate) fn failed(&mut self, path_src: &Path, message: &str) {
        self.emit(&format!(
            "Could not move file {}: {message}",
            path_src.display()
        ));
    }

    pub(crate) fn summary(&mut self, cnt_moved: u64, pattern: &str, name_dir_dst: &str) {
        self.emit("");
        if cnt_moved > 0 {
            self.emit(&format!(
                "Moved {cnt_moved} file(s) in total to directory '{name_dir_dst}'."
            ));
        } else {
            self.emit(&format!(
                "No files matching '{pattern}' were found (outside directory '{name_dir_dst}')."
            ));
        }
    }

    pub(crate) fn flush(&mut self) {
        if let Err(e) = self.sink.flush() {
            tracing::warn!(error = %e, "failed to flush status output");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::Path;

    use super::StatusWriter;

    struct BrokenSink;

    impl io::Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn summary_reports_count_or_nothing_found() {
        let mut buf: Vec<u8> = Vec::new();
        {
            let mut status = StatusWriter::new(&mut buf);
            status.summary(2, "test", "tests");
            status.summary(0, "test", "tests");
        }
        let txt = String::from_utf8(buf).expect("utf8");
        assert_eq!(
            txt,
            "\nMoved 2 file(s) in total to directory 'tests'.\n\
             \nNo files matching 'test' were found (outside directory 'tests').\n"
        );
    }

    #[test]
    fn broken_sink_is_tolerated() {
        let mut sink = BrokenSink;
        let mut status = StatusWriter::new(&mut sink);
        status.moved(Path::new("/a/x_test"), Path::new("/a/tests/x_test"));
        status.flush();
    }
}
