use serde::{Deserialize, Serialize};

const NOT_AVAILABLE: &str = "N/A";

/// Exercise from the third-party exercise database
///
/// Favorites are persisted with bincode, so this type must stay free of
/// `skip_serializing_if` and untagged fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub body_part: String,
    pub target: String,
    pub equipment: String,
    pub gif_url: String,
    pub instructions: Vec<String>,
    pub secondary_muscles: Vec<String>,
}

/// Exercise as the API sends it. Any field may be missing or `null`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExerciseRecord {
    id: Option<String>,
    name: Option<String>,
    body_part: Option<String>,
    target: Option<String>,
    equipment: Option<String>,
    gif_url: Option<String>,
    instructions: Option<Vec<Option<String>>>,
    secondary_muscles: Option<Vec<Option<String>>>,
}

impl From<ExerciseRecord> for Exercise {
    fn from(record: ExerciseRecord) -> Self {
        let list = |items: Option<Vec<Option<String>>>| -> Vec<String> {
            items.unwrap_or_default().into_iter().flatten().collect()
        };

        Exercise {
            id: record.id.unwrap_or_default(),
            name: record.name.unwrap_or_default(),
            body_part: record.body_part.unwrap_or_default(),
            target: record.target.unwrap_or_default(),
            equipment: record.equipment.unwrap_or_default(),
            gif_url: record.gif_url.unwrap_or_default(),
            instructions: list(record.instructions),
            secondary_muscles: list(record.secondary_muscles),
        }
        .normalized()
    }
}

impl Exercise {
    /// Fill blank fields so every screen can render the exercise
    pub fn normalized(mut self) -> Self {
        if self.name.trim().is_empty() {
            self.name = "Unknown Exercise".to_string();
        }
        for field in [&mut self.body_part, &mut self.target, &mut self.equipment] {
            if field.trim().is_empty() {
                *field = NOT_AVAILABLE.to_string();
            }
        }

        self.instructions.retain(|step| !step.trim().is_empty());
        if self.instructions.is_empty() {
            self.instructions = vec!["No instructions available".to_string()];
        }

        self
    }

    /// Placeholder built from an id slug when the exercise cannot be fetched,
    /// e.g. `barbell-curl` becomes "Barbell Curl"
    pub fn from_slug(id: &str) -> Self {
        let name = id
            .split('-')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            id: id.to_string(),
            name,
            instructions: vec!["No specific instructions available for this exercise.".to_string()],
            ..Default::default()
        }
        .normalized()
    }

    /// Case-insensitive match on name, target muscle or body part
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        self.name.to_lowercase().contains(&query)
            || self.target.to_lowercase().contains(&query)
            || self.body_part.to_lowercase().contains(&query)
    }
}
