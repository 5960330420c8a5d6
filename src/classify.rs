use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::text::strip_diacritics;

/// The kind of normative act a publication proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublicationType {
    /// Lege.
    Law,
    /// Hotărâre de Guvern.
    GovernmentDecision,
    /// Ordonanță de Guvern.
    GovernmentOrdinance,
    /// Ordonanță de urgență.
    EmergencyOrdinance,
    /// Ordin de ministru.
    MinisterialOrder,
    /// Anything no rule recognized.
    Other,
}

impl PublicationType {
    /// All known publication types.
    pub const ALL: [PublicationType; 6] = [
        PublicationType::Law,
        PublicationType::GovernmentDecision,
        PublicationType::GovernmentOrdinance,
        PublicationType::EmergencyOrdinance,
        PublicationType::MinisterialOrder,
        PublicationType::Other,
    ];

    /// The short label stored with a record.
    pub fn label(&self) -> &'static str {
        match self {
            PublicationType::Law => "LEGE",
            PublicationType::GovernmentDecision => "HG",
            PublicationType::GovernmentOrdinance => "OG",
            PublicationType::EmergencyOrdinance => "OUG",
            PublicationType::MinisterialOrder => "OM",
            PublicationType::Other => "OTHER",
        }
    }
}

impl Default for PublicationType {
    fn default() -> Self {
        PublicationType::Other
    }
}

impl fmt::Display for PublicationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PublicationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PublicationType::ALL
            .iter()
            .find(|kind| kind.label() == s)
            .copied()
            .ok_or_else(|| format!("unknown publication type `{}`", s))
    }
}

impl Serialize for PublicationType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Maps every text containing `needle` to `kind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRule {
    pub needle: String,
    pub kind: PublicationType,
}

impl TypeRule {
    pub fn new<T: ToString>(needle: T, kind: PublicationType) -> Self {
        Self {
            needle: needle.to_string(),
            kind,
        }
    }
}

/// Best guess classification of a publication by ordered substring rules.
///
/// Rules are matched against the text with its diacritics stripped and the
/// first matching rule wins, so the order of the rules is their priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeClassifier {
    rules: Vec<TypeRule>,
}

impl TypeClassifier {
    pub fn new(rules: Vec<TypeRule>) -> Self {
        Self { rules }
    }

    #[inline]
    pub fn rules(&self) -> &[TypeRule] {
        &self.rules
    }

    /// Classify `text`, falling back to [`PublicationType::Other`].
    ///
    /// # Example
    ///
    /// ```rust
    ///  use avizier::{PublicationType, TypeClassifier};
    ///  let classifier = TypeClassifier::default();
    ///  assert_eq!(
    ///      classifier.classify("Proiect de ordonanță de urgență"),
    ///      PublicationType::EmergencyOrdinance
    ///  );
    /// ```
    pub fn classify(&self, text: &str) -> PublicationType {
        let text = strip_diacritics(text);
        self.rules
            .iter()
            .find(|rule| text.contains(rule.needle.as_str()))
            .map(|rule| rule.kind)
            .unwrap_or_default()
    }
}

impl Default for TypeClassifier {
    fn default() -> Self {
        TypeClassifier::new(vec![
            TypeRule::new("lege", PublicationType::Law),
            TypeRule::new("hotarare de guvern", PublicationType::GovernmentDecision),
            TypeRule::new("hotarare a guvernului", PublicationType::GovernmentDecision),
            TypeRule::new("ordonanta de guvern", PublicationType::GovernmentOrdinance),
            TypeRule::new("ordonanta de urgenta", PublicationType::EmergencyOrdinance),
            TypeRule::new("ordin de ministru", PublicationType::MinisterialOrder),
            TypeRule::new("ordinul", PublicationType::MinisterialOrder),
        ])
    }
}
