//! Personal name handling for citation styles

/// A parsed author name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName {
    pub given: Vec<String>,
    pub family: String,
}

impl PersonName {
    /// Parse `"Given Middle Family"` or `"Family, Given Middle"`.
    ///
    /// A single token is treated as the family name.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Some((family, given)) = raw.split_once(',') {
            let family = family.trim();
            if !family.is_empty() {
                return Some(Self {
                    given: given.split_whitespace().map(String::from).collect(),
                    family: family.to_string(),
                });
            }
        }

        let mut tokens: Vec<String> = raw.split_whitespace().map(String::from).collect();
        let family = tokens.pop()?;
        Some(Self {
            given: tokens,
            family,
        })
    }

    /// `"A. M."` for given names `["Ada", "Marie"]`
    pub fn initials(&self) -> String {
        self.given
            .iter()
            .filter_map(|g| g.chars().find(|c| c.is_alphabetic()))
            .map(|c| format!("{}.", c.to_uppercase()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn given_joined(&self) -> String {
        self.given.join(" ")
    }

    /// `"Lovelace, A. M."`
    pub fn family_initials(&self) -> String {
        let initials = self.initials();
        if initials.is_empty() {
            self.family.clone()
        } else {
            format!("{}, {}", self.family, initials)
        }
    }

    /// `"Lovelace, Ada Marie"`
    pub fn family_given(&self) -> String {
        if self.given.is_empty() {
            self.family.clone()
        } else {
            format!("{}, {}", self.family, self.given_joined())
        }
    }

    /// `"Ada Marie Lovelace"`
    pub fn given_family(&self) -> String {
        if self.given.is_empty() {
            self.family.clone()
        } else {
            format!("{} {}", self.given_joined(), self.family)
        }
    }
}

/// Parse every non-blank name, dropping the rest
pub fn parse_all(authors: &[String]) -> Vec<PersonName> {
    authors.iter().filter_map(|a| PersonName::parse(a)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_natural_order() {
        let name = PersonName::parse("Ada Marie Lovelace").unwrap();
        assert_eq!(name.family, "Lovelace");
        assert_eq!(name.given, vec!["Ada", "Marie"]);
        assert_eq!(name.initials(), "A. M.");
        assert_eq!(name.family_initials(), "Lovelace, A. M.");
    }

    #[test]
    fn parses_inverted_order() {
        let name = PersonName::parse("van Rossum, Guido").unwrap();
        assert_eq!(name.family, "van Rossum");
        assert_eq!(name.given_family(), "Guido van Rossum");
    }

    #[test]
    fn single_token_is_family() {
        let name = PersonName::parse("Plato").unwrap();
        assert_eq!(name.family_initials(), "Plato");
        assert_eq!(name.family_given(), "Plato");
    }

    #[test]
    fn blank_is_none() {
        assert!(PersonName::parse("   ").is_none());
        assert_eq!(parse_all(&[String::new(), "Alan Turing".to_string()]).len(), 1);
    }
}
