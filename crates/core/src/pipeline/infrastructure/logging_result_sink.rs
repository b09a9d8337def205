use crate::pipeline::result_sink::{CycleResult, ResultSink};

/// Writes each result as the face-count and per-face report lines.
pub struct LoggingResultSink;

impl LoggingResultSink {
    pub fn format(result: &CycleResult) -> String {
        let mut lines = vec![format!("Faces: {}", result.face_count)];
        lines.extend(result.report_lines());
        lines.join("\n")
    }
}

impl ResultSink for LoggingResultSink {
    fn publish(&mut self, result: CycleResult) {
        log::info!(
            "{} ({}x{} from {} camera)",
            Self::format(&result),
            result.display_frame.width(),
            result.display_frame.height(),
            result.display_frame.source()
        );
    }
}
