use crate::tokenizer::ParsedOpcode;

/// Returns whether the opcode is either not a push instruction or the data
/// associated with the push instruction uses the smallest instruction to do
/// the job.
#[inline]
pub fn is_canonical_push(opcode: &ParsedOpcode<'_>) -> bool {
    opcode.is_canonical_push()
}

/// Returns a new sequence without the canonical pushes whose data contains
/// `data`. Non-canonical pushes are always kept.
pub fn remove_opcode_by_data<'a>(opcodes: &[ParsedOpcode<'a>], data: &[u8]) -> Vec<ParsedOpcode<'a>> {
    opcodes.iter().filter(|opcode| !opcode.is_canonical_push() || !contains_subslice(opcode.data(), data)).copied().collect()
}

fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}
