use super::html::word_count;
use crate::data::ReadingTime;

const WORDS_PER_MINUTE: usize = 200;

/// Reading estimate: words at 200 wpm, half a minute per attachment, one
/// minute per external resource. Partial minutes round up.
pub fn reading_time(content_html: &str, attachments: usize, resources: usize) -> ReadingTime {
    let words = word_count(content_html);
    let reading = words.div_ceil(WORDS_PER_MINUTE);
    let attachment_extra = attachments.div_ceil(2);
    let minutes = reading + attachment_extra + resources;
    ReadingTime { minutes: u32::try_from(minutes).unwrap_or(u32::MAX) }
}
