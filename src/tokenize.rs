//! Word / whitespace / newline tokenization of text runs.

use alloc::boxed::Box;

/// Classified slice of a text run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token<'a> {
    /// Maximal run of characters that are neither space nor newline.
    Word(&'a str),
    /// A single space.
    Whitespace(&'a str),
    Newline,
}

impl<'a> Token<'a> {
    /// Text the token covers; `"\n"` for newlines.
    pub fn as_str(&self) -> &'a str {
        match self {
            Self::Word(text) | Self::Whitespace(text) => text,
            Self::Newline => "\n",
        }
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self, Self::Whitespace(_))
    }
}

/// Lazy tokenizer over one text run.
///
/// Each space and each newline is its own token, so runs of spaces yield one
/// token per space.
#[derive(Clone, Debug)]
pub struct Tokens<'a> {
    rest: &'a str,
    break_after_hyphen: bool,
}

impl<'a> Tokens<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            rest: text,
            break_after_hyphen: false,
        }
    }

    /// Also end word tokens after each `-`.
    pub fn breaking_after_hyphens(mut self) -> Self {
        self.break_after_hyphen = true;
        self
    }

    fn word_end(&self) -> usize {
        for (idx, ch) in self.rest.char_indices() {
            match ch {
                ' ' | '\n' => return idx,
                '-' if self.break_after_hyphen => return idx + 1,
                _ => {}
            }
        }
        self.rest.len()
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.rest.chars().next()?;
        let (token, consumed) = match first {
            '\n' => (Token::Newline, 1),
            ' ' => (Token::Whitespace(&self.rest[..1]), 1),
            _ => {
                let end = self.word_end();
                (Token::Word(&self.rest[..end]), end)
            }
        };
        self.rest = &self.rest[consumed..];
        Some(token)
    }
}

/// Splits text runs into tokens for line wrapping.
pub trait TextTokenizer: Send + Sync {
    fn tokenize<'a>(&self, text: &'a str) -> Box<dyn Iterator<Item = Token<'a>> + 'a>;
}

/// Breaks only at spaces and newlines.
#[derive(Clone, Copy, Debug, Default)]
pub struct WhitespaceTokenizer;

impl TextTokenizer for WhitespaceTokenizer {
    fn tokenize<'a>(&self, text: &'a str) -> Box<dyn Iterator<Item = Token<'a>> + 'a> {
        Box::new(Tokens::new(text))
    }
}

/// Like [`WhitespaceTokenizer`], but a hyphen also ends a word.
#[derive(Clone, Copy, Debug, Default)]
pub struct HyphenTokenizer;

impl TextTokenizer for HyphenTokenizer {
    fn tokenize<'a>(&self, text: &'a str) -> Box<dyn Iterator<Item = Token<'a>> + 'a> {
        Box::new(Tokens::new(text).breaking_after_hyphens())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn collect(text: &str) -> Vec<Token<'_>> {
        Tokens::new(text).collect()
    }

    #[test]
    fn splits_words_spaces_and_newlines() {
        assert_eq!(
            collect("Hello  World\nbye"),
            vec![
                Token::Word("Hello"),
                Token::Whitespace(" "),
                Token::Whitespace(" "),
                Token::Word("World"),
                Token::Newline,
                Token::Word("bye"),
            ]
        );
    }

    #[test]
    fn empty_text_has_no_tokens() {
        assert!(collect("").is_empty());
    }

    #[test]
    fn tabs_stay_inside_words() {
        assert_eq!(collect("a\tb"), vec![Token::Word("a\tb")]);
    }

    #[test]
    fn multibyte_words_are_kept_whole() {
        assert_eq!(
            collect("héllo 𝄞x"),
            vec![Token::Word("héllo"), Token::Whitespace(" "), Token::Word("𝄞x")]
        );
    }

    #[test]
    fn hyphen_tokenizer_breaks_after_dash() {
        let tokens: Vec<_> = HyphenTokenizer.tokenize("well-known -x").collect();
        assert_eq!(
            tokens,
            vec![
                Token::Word("well-"),
                Token::Word("known"),
                Token::Whitespace(" "),
                Token::Word("-"),
                Token::Word("x"),
            ]
        );
    }

    #[test]
    fn tokens_concatenate_to_input() {
        let text = "a  b\n\nc- d";
        let joined: alloc::string::String = WhitespaceTokenizer
            .tokenize(text)
            .map(|t| t.as_str())
            .collect();
        assert_eq!(joined, text);
    }
}
