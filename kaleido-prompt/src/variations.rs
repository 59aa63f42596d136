use serde::Serialize;

/// One named axis of variation with at least one option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariationCategory {
    name: String,
    options: Vec<String>,
}

impl VariationCategory {
    /// Returns `None` when no option survives trimming.
    pub fn new<I, S>(name: impl Into<String>, options: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let options: Vec<String> = options
            .into_iter()
            .map(|option| option.as_ref().trim().trim_end_matches(',').trim().to_string())
            .filter(|option| !option.is_empty())
            .collect();

        if options.is_empty() {
            return None;
        }

        Some(Self {
            name: name.into(),
            options,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Option at `index`, wrapping around when the category is shorter.
    pub fn option_cycled(&self, index: usize) -> &str {
        &self.options[index % self.options.len()]
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// Categories in the order they were written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VariationSet {
    categories: Vec<VariationCategory>,
}

impl VariationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a category, replacing the options of an existing one with the
    /// same name (ignoring case). The replaced category keeps its position
    /// and display name; the previous value is returned.
    pub fn insert(&mut self, category: VariationCategory) -> Option<VariationCategory> {
        match self
            .categories
            .iter_mut()
            .find(|existing| existing.matches_name(&category.name))
        {
            Some(existing) => {
                let previous = existing.clone();
                existing.options = category.options;
                Some(previous)
            }
            None => {
                self.categories.push(category);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&VariationCategory> {
        self.categories
            .iter()
            .find(|category| category.matches_name(name))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VariationCategory> {
        self.categories.iter()
    }
}
