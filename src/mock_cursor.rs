use crate::error::{Result, StructuralError};
use crate::xml::{XmlCursor, XmlNodeType};

/// A node of a scripted document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Start {
        name: String,
        attributes: Vec<(String, String)>,
        empty: bool,
    },
    End(String),
    Text(String),
}

impl Token {
    pub fn start(name: &str) -> Token {
        Token::Start {
            name: name.to_owned(),
            attributes: Vec::new(),
            empty: false,
        }
    }

    pub fn empty(name: &str) -> Token {
        Token::Start {
            name: name.to_owned(),
            attributes: Vec::new(),
            empty: true,
        }
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Token {
        if let Token::Start {
            ref mut attributes, ..
        } = self
        {
            attributes.push((key.to_owned(), value.to_owned()));
        }
        self
    }

    pub fn end(name: &str) -> Token {
        Token::End(name.to_owned())
    }

    pub fn text(value: &str) -> Token {
        Token::Text(value.to_owned())
    }
}

/// A cursor that replays a fixed list of tokens without namespaces.
#[derive(Debug, Default)]
pub struct MockCursor {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    open: usize,
}

impl MockCursor {
    pub fn new(tokens: Vec<Token>) -> MockCursor {
        MockCursor {
            tokens,
            ..MockCursor::default()
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn current(&self) -> Option<&Token> {
        self.pos.checked_sub(1).and_then(|i| self.tokens.get(i))
    }
}

impl XmlCursor for MockCursor {
    fn read(&mut self) -> Result<()> {
        let token = match self.tokens.get(self.pos) {
            Some(token) => token,
            None => return Err(StructuralError::UnexpectedEndOfDocument.into()),
        };
        match token {
            Token::Start { empty, .. } => {
                self.depth = self.open;
                if !empty {
                    self.open += 1;
                }
            }
            Token::End(_) => {
                self.open = self.open.saturating_sub(1);
                self.depth = self.open;
            }
            Token::Text(_) => self.depth = self.open,
        }
        self.pos += 1;
        Ok(())
    }

    fn node_type(&self) -> XmlNodeType {
        match self.current() {
            None => XmlNodeType::None,
            Some(Token::Start { .. }) => XmlNodeType::StartElement,
            Some(Token::End(_)) => XmlNodeType::EndElement,
            Some(Token::Text(_)) => XmlNodeType::Text,
        }
    }

    fn local_name(&self) -> &str {
        match self.current() {
            Some(Token::Start { name, .. }) | Some(Token::End(name)) => name,
            _ => "",
        }
    }

    fn namespace_uri(&self) -> Option<&str> {
        None
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn is_empty_element(&self) -> bool {
        matches!(self.current(), Some(Token::Start { empty: true, .. }))
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        match self.current() {
            Some(Token::Start { attributes, .. }) => attributes
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    fn value(&self) -> &str {
        match self.current() {
            Some(Token::Text(value)) => value,
            _ => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlNamespace;

    #[test]
    fn tracks_depth_like_a_document() {
        let mut cursor = MockCursor::new(vec![
            Token::start("a"),
            Token::empty("b").with_attribute("Id", "1"),
            Token::start("c"),
            Token::text("x"),
            Token::end("c"),
            Token::end("a"),
        ]);
        cursor.read().unwrap();
        assert_eq!(cursor.depth(), 0);
        cursor.read().unwrap();
        assert!(cursor.is_empty_element());
        assert_eq!(cursor.attribute("Id"), Some("1"));
        assert_eq!(cursor.depth(), 1);
        assert_eq!(
            cursor
                .read_element_value_named(XmlNamespace::NotSpecified, "c")
                .unwrap(),
            "x"
        );
        assert_eq!(cursor.depth(), 1);
        cursor.read_end_element(XmlNamespace::NotSpecified, "a").unwrap();
        assert!(cursor.is_exhausted());
        assert!(cursor.read().is_err());
    }
}
