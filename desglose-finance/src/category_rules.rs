//! Deterministic merchant → category rules.
//!
//! Keyword match on the upper-cased merchant, first rule wins. User rules are
//! consulted before the built-in ones.

use serde::{Deserialize, Serialize};

pub const FALLBACK_CATEGORY: &str = "Otros";

const BUILTIN_RULES: [(&str, &str); 4] = [
    ("RACING", "Entretenimiento"),
    ("HUSH", "Ropa"),
    ("WWW.AEROLINEAS.COM.AR", "Viajes"),
    ("MERPAGO", "E-commerce"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub keyword: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRules {
    rules: Vec<CategoryRule>,
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self {
            rules: BUILTIN_RULES
                .iter()
                .map(|(k, c)| CategoryRule {
                    keyword: k.to_string(),
                    category: c.to_string(),
                })
                .collect(),
        }
    }
}

impl CategoryRules {
    /// Built-ins preceded by `extra`, in the given order.
    pub fn with_overrides<I, K, C>(extra: I) -> Self
    where
        I: IntoIterator<Item = (K, C)>,
        K: Into<String>,
        C: Into<String>,
    {
        let mut rules: Vec<CategoryRule> = extra
            .into_iter()
            .map(|(k, c)| CategoryRule {
                keyword: k.into().to_uppercase(),
                category: c.into(),
            })
            .filter(|r| !r.keyword.trim().is_empty())
            .collect();
        rules.extend(Self::default().rules);
        Self { rules }
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn categorize(&self, merchant: &str) -> &str {
        let merchant = merchant.to_uppercase();
        self.rules
            .iter()
            .find(|r| merchant.contains(&r.keyword))
            .map(|r| r.category.as_str())
            .unwrap_or(FALLBACK_CATEGORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_rules() {
        let rules = CategoryRules::default();
        assert_eq!(rules.categorize("RACING"), "Entretenimiento");
        assert_eq!(rules.categorize("hush"), "Ropa");
        assert_eq!(rules.categorize("WWW.AEROLINEAS.COM.AR"), "Viajes");
        assert_eq!(rules.categorize("MERPAGO*TIENDA"), "E-commerce");
        assert_eq!(rules.categorize("FARMACIA"), FALLBACK_CATEGORY);
    }

    #[test]
    fn test_overrides_win_over_builtins() {
        let rules = CategoryRules::with_overrides([("merpago*super", "Alimentación"), ("  ", "x")]);
        assert_eq!(rules.rules().len(), 5);
        assert_eq!(rules.categorize("MERPAGO*SUPERMERCADO"), "Alimentación");
        assert_eq!(rules.categorize("MERPAGO*TIENDA"), "E-commerce");
    }
}
