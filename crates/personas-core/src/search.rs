//! The closed set of attributes a person search may target.

use std::str::FromStr;

use strum::{Display, EnumString, VariantNames};

use crate::{Error, Result, person::Person};

/// Which [`Person`] attribute a search matches against.
///
/// The wire names are the `filtro` values accepted by the search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, VariantNames)]
#[strum(ascii_case_insensitive)]
pub enum SearchField {
  #[strum(serialize = "nombre")]
  FirstName,
  #[strum(serialize = "apellido")]
  LastName,
  #[strum(serialize = "email")]
  Email,
}

impl SearchField {
  /// Parse a wire name, ignoring ASCII case.
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s.trim()).map_err(|_| Error::UnknownSearchField(s.to_owned()))
  }

  /// The attribute of `person` this field selects.
  pub fn value_of<'a>(&self, person: &'a Person) -> &'a str {
    match self {
      Self::FirstName => &person.first_name,
      Self::LastName => &person.last_name,
      Self::Email => &person.email,
    }
  }

  /// Case-insensitive substring match. `needle` must already be lowercase.
  pub fn matches(&self, person: &Person, needle: &str) -> bool {
    self.value_of(person).to_lowercase().contains(needle)
  }

  /// Comma-separated list of accepted wire names, for guidance messages.
  pub fn allowed() -> String { Self::VARIANTS.join(", ") }
}
