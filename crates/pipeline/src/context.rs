//! ContextAssembler: joins retrieved texts into the model's grounding context.

use tracing::debug;

/// Default cap on the assembled context, in characters (~3000 tokens).
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 12_000;

const SEPARATOR: &str = "\n\n";

/// Concatenate `documents` in order, separated by a blank line, and cut the
/// result to at most `max_chars` characters.
///
/// The cut is a hard one: it can land mid-document or mid-sentence. Length
/// is counted in `char`s, so the cut never splits a UTF-8 sequence.
pub fn assemble<S: AsRef<str>>(documents: &[S], max_chars: usize) -> String {
    let mut context = documents
        .iter()
        .map(|d| d.as_ref())
        .collect::<Vec<&str>>()
        .join(SEPARATOR);

    if let Some((cut, _)) = context.char_indices().nth(max_chars) {
        debug!(
            original_chars = context.chars().count(),
            max_chars, "Truncating context"
        );
        context.truncate(cut);
    }

    context
}
