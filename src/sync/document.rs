use super::error::SyncError;

pub const KEY_BACKSPACE: u32 = 8;
pub const KEY_ENTER: u32 = 13;
pub const KEY_DELETE: u32 = 127;

/// The single shared text buffer.
///
/// Edits are applied in receipt order with last-writer-wins semantics. No
/// history or version is kept.
#[derive(Debug, Default)]
pub struct SharedDocument {
    text: String,
}

impl SharedDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> String {
        self.text.clone()
    }

    /// Length in characters, which is the unit caret offsets are counted in.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn apply_edit(&mut self, new_text: String) {
        self.text = new_text;
    }

    /// Splice one keystroke at `caret_position` and return the resulting text.
    ///
    /// Backspace and delete remove the character before the caret. The caret
    /// is clamped to the end of the text.
    pub fn apply_character_edit(&mut self, caret_position: usize, key_pressed: u32) -> Result<String, SyncError> {
        let caret = caret_position.min(self.char_len());
        match key_pressed {
            KEY_BACKSPACE | KEY_DELETE => {
                if caret > 0 {
                    let start = self.byte_offset(caret - 1);
                    let end = self.byte_offset(caret);
                    self.text.replace_range(start..end, "");
                }
            }
            code => {
                let ch = match code {
                    KEY_ENTER => '\n',
                    _ => char::from_u32(code).ok_or_else(|| {
                        SyncError::malformed("updateInput", format!("key code {} is not a character", code))
                    })?,
                };
                let at = self.byte_offset(caret);
                self.text.insert(at, ch);
            }
        }
        Ok(self.snapshot())
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> SharedDocument {
        let mut doc = SharedDocument::new();
        doc.apply_edit(text.to_string());
        doc
    }

    #[test]
    fn starts_empty() {
        assert_eq!(SharedDocument::new().snapshot(), "");
    }

    #[test]
    fn full_edit_replaces_everything() {
        let mut doc = doc("old content");
        doc.apply_edit("hi".to_string());
        assert_eq!(doc.snapshot(), "hi");
    }

    #[test]
    fn character_is_spliced_at_caret() {
        let mut doc = doc("hi");
        assert_eq!(doc.apply_character_edit(2, '!' as u32).unwrap(), "hi!");
        assert_eq!(doc.apply_character_edit(0, '>' as u32).unwrap(), ">hi!");
    }

    #[test]
    fn backspace_removes_character_before_caret() {
        let mut doc = doc("hi");
        assert_eq!(doc.apply_character_edit(2, KEY_BACKSPACE).unwrap(), "h");
    }

    #[test]
    fn backspace_at_start_is_a_no_op() {
        let mut doc = doc("hi");
        assert_eq!(doc.apply_character_edit(0, KEY_BACKSPACE).unwrap(), "hi");
        assert_eq!(doc.apply_character_edit(0, KEY_DELETE).unwrap(), "hi");
    }

    #[test]
    fn caret_past_end_is_clamped() {
        let mut doc = doc("ab");
        assert_eq!(doc.apply_character_edit(40, 'c' as u32).unwrap(), "abc");
        assert_eq!(doc.apply_character_edit(40, KEY_BACKSPACE).unwrap(), "ab");
    }

    #[test]
    fn offsets_count_characters_not_bytes() {
        let mut doc = doc("héllo");
        assert_eq!(doc.apply_character_edit(2, KEY_BACKSPACE).unwrap(), "hllo");
        assert_eq!(doc.apply_character_edit(1, 'é' as u32).unwrap(), "héllo");
    }

    #[test]
    fn enter_inserts_newline() {
        let mut doc = doc("ab");
        assert_eq!(doc.apply_character_edit(1, KEY_ENTER).unwrap(), "a\nb");
    }

    #[test]
    fn invalid_code_is_rejected_without_mutation() {
        let mut doc = doc("ab");
        let err = doc.apply_character_edit(1, 0xD800).unwrap_err();
        assert!(matches!(err, SyncError::MalformedEventPayload { .. }));
        assert_eq!(doc.snapshot(), "ab");
    }
}
