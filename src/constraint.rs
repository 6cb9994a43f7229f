use crate::constants::{
    DEFAULT_COUNT, MIN_COUNT, PARAGRAPH_MAX_COUNT, SENTENCE_MAX_COUNT, WORD_MAX_COUNT,
};
use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    Word,
    Sentence,
    #[default]
    Paragraph,
}

impl GenerationMode {
    pub const ALL: [GenerationMode; 3] = [
        GenerationMode::Word,
        GenerationMode::Sentence,
        GenerationMode::Paragraph,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GenerationMode::Word => "word",
            GenerationMode::Sentence => "sentence",
            GenerationMode::Paragraph => "paragraph",
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "word" | "words" => Ok(GenerationMode::Word),
            "sentence" | "sentences" => Ok(GenerationMode::Sentence),
            "paragraph" | "paragraphs" => Ok(GenerationMode::Paragraph),
            other => Err(AppError::InvalidInput(format!(
                "Unknown mode '{}'. Use word, sentence or paragraph",
                other
            ))),
        }
    }
}

/// Largest count the server is asked for in each mode.
pub fn max_for(mode: GenerationMode) -> u32 {
    match mode {
        GenerationMode::Word => WORD_MAX_COUNT,
        GenerationMode::Sentence => SENTENCE_MAX_COUNT,
        GenerationMode::Paragraph => PARAGRAPH_MAX_COUNT,
    }
}

/// The count and mode controls of the generation form.
///
/// `count` is kept inside `MIN_COUNT..=max` at all times, so whatever is read
/// back at submit time is already valid for the selected mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationForm {
    mode: GenerationMode,
    count: u32,
    max: u32,
}

impl Default for GenerationForm {
    fn default() -> Self {
        Self::new(GenerationMode::default(), DEFAULT_COUNT)
    }
}

impl GenerationForm {
    pub fn new(mode: GenerationMode, count: u32) -> Self {
        let max = max_for(mode);
        Self {
            mode,
            count: count.clamp(MIN_COUNT, max),
            max,
        }
    }

    pub fn mode(&self) -> GenerationMode {
        self.mode
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Current upper bound of the count control.
    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn on_mode_change(&mut self, mode: GenerationMode) {
        self.mode = mode;
        self.max = max_for(mode);
        let clamped = self.count.min(self.max);
        if clamped != self.count {
            debug!("Clamped count {} -> {} for mode {}", self.count, clamped, mode);
        }
        self.count = clamped;
    }

    /// Applies a typed count and returns the value the control settled on.
    pub fn on_count_input(&mut self, count: i64) -> u32 {
        let bounded = count.clamp(MIN_COUNT as i64, self.max as i64) as u32;
        if bounded as i64 != count {
            debug!("Count input {} bounded to {}", count, bounded);
        }
        self.count = bounded;
        bounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_table_is_fixed() {
        assert_eq!(max_for(GenerationMode::Word), 50);
        assert_eq!(max_for(GenerationMode::Sentence), 10);
        assert_eq!(max_for(GenerationMode::Paragraph), 5);
    }

    #[test]
    fn mode_change_always_leaves_count_within_max() {
        for from in GenerationMode::ALL {
            for to in GenerationMode::ALL {
                let mut form = GenerationForm::new(from, max_for(from));
                form.on_mode_change(to);
                assert!(form.count() <= max_for(to), "{} -> {}", from, to);
                assert_eq!(form.max(), max_for(to));
            }
        }
    }

    #[test]
    fn switching_to_sentence_clamps_fifteen_words_to_ten() {
        let mut form = GenerationForm::new(GenerationMode::Word, 15);
        assert_eq!(form.count(), 15);
        form.on_mode_change(GenerationMode::Sentence);
        assert_eq!(form.count(), 10);
    }

    #[test]
    fn count_input_is_bounded_by_current_mode() {
        let mut form = GenerationForm::new(GenerationMode::Sentence, 1);
        assert_eq!(form.on_count_input(15), 10);
        assert_eq!(form.on_count_input(0), 1);
        assert_eq!(form.on_count_input(-4), 1);
        assert_eq!(form.on_count_input(7), 7);
    }

    #[test]
    fn widening_the_mode_keeps_the_count() {
        let mut form = GenerationForm::new(GenerationMode::Paragraph, 4);
        form.on_mode_change(GenerationMode::Word);
        assert_eq!(form.count(), 4);
        assert_eq!(form.max(), 50);
    }

    #[test]
    fn parses_modes_case_insensitively() {
        assert_eq!("Word".parse::<GenerationMode>().unwrap(), GenerationMode::Word);
        assert_eq!(" sentences ".parse::<GenerationMode>().unwrap(), GenerationMode::Sentence);
        assert!(matches!(
            "chapter".parse::<GenerationMode>(),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&GenerationMode::Paragraph).unwrap(), "\"paragraph\"");
    }
}
