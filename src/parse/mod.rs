pub mod task_parser;
pub mod task_serializer;

pub use task_parser::{HeaderFields, ParsedDocument, decode_task, parse_document, parse_iso_date};
pub use task_serializer::{encode_task, serialize_document};

/// Indent margin for fenced description blocks inside a record.
pub const DESC_MARGIN: &str = "        ";

/// Section heading that introduces the task records. A file without it is
/// not a todo store.
pub const TASKS_HEADING: &str = "# ToDo List:";

/// True for lines that read as a fence once indented: any run of spaces
/// followed by exactly three backticks. The encoder writes such description
/// lines with one extra leading space and the decoder strips it back, so
/// they can never collide with the real closing fence.
pub(crate) fn fence_like(line: &str) -> bool {
    line.trim_start_matches(' ') == "```"
}
