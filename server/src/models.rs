use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl User {
    /// Staff and superusers may see the user roster and edit any recipe.
    pub fn is_privileged(&self) -> bool {
        self.is_staff || self.is_superuser
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub is_staff: bool,
    pub is_superuser: bool,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::sessions)]
pub struct NewSession<'a> {
    pub user_id: Uuid,
    pub token_hash: &'a str,
    pub expires_at: DateTime<Utc>,
}

/// Estimated difficulty of a recipe, stored as its integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    #[default]
    Easy = 1,
    Medium = 2,
    Hard = 3,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl TryFrom<i32> for Difficulty {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Difficulty::Easy),
            2 => Ok(Difficulty::Medium),
            3 => Ok(Difficulty::Hard),
            other => Err(other),
        }
    }
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Recipe {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub description: String,
    pub difficulty: i32,
    pub image: Option<String>,
    pub time: i32,
    pub created_at: DateTime<Utc>,
}

impl Recipe {
    pub fn difficulty(&self) -> Option<Difficulty> {
        Difficulty::try_from(self.difficulty).ok()
    }

    pub fn display_time(&self) -> String {
        format_time(Some(self.time))
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipes)]
pub struct NewRecipe<'a> {
    pub author_id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub difficulty: i32,
    pub image: Option<&'a str>,
    pub time: i32,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::ingredients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Ingredient {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub name: String,
    pub quantity: Option<i32>,
    pub unit: String,
    pub position: i32,
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&ingredient_text(self.quantity, &self.unit, &self.name))
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::ingredients)]
pub struct NewIngredient<'a> {
    pub recipe_id: Uuid,
    pub name: &'a str,
    pub quantity: Option<i32>,
    pub unit: &'a str,
    pub position: i32,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::instructions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Instruction {
    pub id: Uuid,
    pub recipe_id: Option<Uuid>,
    pub step: i32,
    pub description: String,
    pub image: Option<String>,
}

impl Instruction {
    /// Label for this step, naming the recipe when the instruction is still attached.
    pub fn label(&self, recipe_title: Option<&str>) -> String {
        match (self.recipe_id, recipe_title) {
            (Some(_), Some(title)) => format!("Instruction {} for {}", self.step, title),
            _ => format!("Instruction {}", self.step),
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::instructions)]
pub struct NewInstruction<'a> {
    pub recipe_id: Option<Uuid>,
    pub step: i32,
    pub description: &'a str,
    pub image: Option<&'a str>,
}

#[derive(Queryable, Selectable, Debug, Clone, Serialize, ToSchema)]
#[diesel(table_name = crate::schema::flash_messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FlashMessage {
    #[serde(skip)]
    pub id: Uuid,
    pub level: String,
    pub message: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::flash_messages)]
pub struct NewFlashMessage<'a> {
    pub user_id: Uuid,
    pub level: &'a str,
    pub message: &'a str,
}

/// Human-readable cooking time.
///
/// Negative or missing values render as "N/A", anything under an hour in
/// minutes, and an hour or more in hours with one decimal place.
pub fn format_time(minutes: Option<i32>) -> String {
    match minutes {
        None => "N/A".to_string(),
        Some(m) if m < 0 => "N/A".to_string(),
        Some(0) => "0 mins".to_string(),
        Some(m) if m < 60 => format!("{} mins", m),
        Some(m) => format!("{:.1} hrs", f64::from(m) / 60.0),
    }
}

/// "{quantity} {unit} {name}", dropping a null quantity (zero is kept) and a blank unit.
pub fn ingredient_text(quantity: Option<i32>, unit: &str, name: &str) -> String {
    let mut text = String::new();

    if let Some(q) = quantity {
        text.push_str(&q.to_string());
        text.push(' ');
    }
    if !unit.is_empty() {
        text.push_str(unit);
        text.push(' ');
    }

    text.push_str(name);
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe_with_time(time: i32) -> Recipe {
        Recipe {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            title: "Fried Rice".to_string(),
            description: String::new(),
            difficulty: 1,
            image: None,
            time,
            created_at: Utc::now(),
        }
    }

    fn ingredient(quantity: Option<i32>, unit: &str) -> Ingredient {
        Ingredient {
            id: Uuid::new_v4(),
            recipe_id: Uuid::new_v4(),
            name: "Rice".to_string(),
            quantity,
            unit: unit.to_string(),
            position: 0,
        }
    }

    #[test]
    fn test_format_time_minutes() {
        assert_eq!(format_time(Some(0)), "0 mins");
        assert_eq!(format_time(Some(1)), "1 mins");
        assert_eq!(format_time(Some(30)), "30 mins");
        assert_eq!(format_time(Some(59)), "59 mins");
    }

    #[test]
    fn test_format_time_hours() {
        assert_eq!(format_time(Some(60)), "1.0 hrs");
        assert_eq!(format_time(Some(73)), "1.2 hrs");
        assert_eq!(format_time(Some(90)), "1.5 hrs");
        assert_eq!(format_time(Some(240)), "4.0 hrs");
    }

    #[test]
    fn test_format_time_not_available() {
        assert_eq!(format_time(None), "N/A");
        assert_eq!(format_time(Some(-1)), "N/A");
        assert_eq!(format_time(Some(-90)), "N/A");
    }

    #[test]
    fn test_recipe_display_time_and_title() {
        let recipe = recipe_with_time(45);
        assert_eq!(recipe.display_time(), "45 mins");
        assert_eq!(recipe.to_string(), "Fried Rice");
        assert_eq!(recipe.difficulty(), Some(Difficulty::Easy));
    }

    #[test]
    fn test_ingredient_text() {
        assert_eq!(ingredient(Some(1), "cup").to_string(), "1 cup Rice");
        assert_eq!(ingredient(Some(1), "").to_string(), "1 Rice");
        assert_eq!(ingredient(None, "cup").to_string(), "cup Rice");
        assert_eq!(ingredient(Some(0), "cup").to_string(), "0 cup Rice");
        assert_eq!(ingredient(None, "").to_string(), "Rice");
    }

    #[test]
    fn test_instruction_label() {
        let mut instruction = Instruction {
            id: Uuid::new_v4(),
            recipe_id: Some(Uuid::new_v4()),
            step: 2,
            description: "Stir".to_string(),
            image: None,
        };
        assert_eq!(
            instruction.label(Some("Fried Rice")),
            "Instruction 2 for Fried Rice"
        );

        instruction.recipe_id = None;
        assert_eq!(instruction.label(Some("Fried Rice")), "Instruction 2");
        assert_eq!(instruction.label(None), "Instruction 2");
    }

    #[test]
    fn test_difficulty_round_trip() {
        for difficulty in Difficulty::ALL {
            assert_eq!(Difficulty::try_from(difficulty.as_i32()), Ok(difficulty));
        }
        assert_eq!(Difficulty::try_from(0), Err(0));
        assert_eq!(Difficulty::try_from(4), Err(4));
        assert_eq!(Difficulty::default(), Difficulty::Easy);
    }
}
