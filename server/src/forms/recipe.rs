use super::fields::{invalid_choice, CharField, IntegerField, REQUIRED};
use super::{field_key, Choice, FormData, FormErrors, FormView};
use crate::models::Difficulty;

pub const TITLE_MAX_LENGTH: usize = 100;
pub const IMAGE_MAX_LENGTH: usize = 100;
pub const DEFAULT_TIME_MINUTES: i32 = 30;

const TITLE: CharField = CharField::required(TITLE_MAX_LENGTH);
const DESCRIPTION: CharField = CharField::optional(None);
const IMAGE: CharField = CharField::optional(Some(IMAGE_MAX_LENGTH));
const TIME: IntegerField = IntegerField::required();

/// Cleaned top-level recipe values.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeFields {
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub image: Option<String>,
    pub time: i32,
}

pub struct RecipeForm;

impl RecipeForm {
    pub const FIELDS: &'static [&'static str] =
        &["title", "description", "difficulty", "image", "time"];

    pub fn clean(data: &FormData) -> Result<RecipeFields, FormErrors> {
        let mut errors = FormErrors::default();

        let title = errors.check("title", TITLE.clean(data.get("title")));
        let description = errors.check("description", DESCRIPTION.clean(data.get("description")));
        let difficulty = errors.check("difficulty", clean_difficulty(data.get("difficulty")));
        let image = errors.check("image", IMAGE.clean(data.get("image")));
        let time = errors.check("time", TIME.clean(data.get("time")));

        match (title, description, difficulty, image, time) {
            (Some(title), Some(description), Some(difficulty), Some(image), Some(Some(time)))
                if errors.is_empty() =>
            {
                Ok(RecipeFields {
                    title,
                    description,
                    difficulty,
                    image: Some(image).filter(|i| !i.is_empty()),
                    time,
                })
            }
            _ => Err(errors),
        }
    }

    /// Submitted values with errors, for re-rendering.
    pub fn view(data: &FormData, errors: FormErrors) -> FormView {
        FormView {
            data: data.echo(None, Self::FIELDS),
            errors,
        }
    }

    /// The unbound form with its initial values.
    pub fn initial() -> FormView {
        let data = [
            ("difficulty", Difficulty::default().as_i32().to_string()),
            ("time", DEFAULT_TIME_MINUTES.to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (field_key(None, k), v))
        .collect();

        FormView {
            data,
            errors: FormErrors::default(),
        }
    }

    pub fn difficulty_choices() -> Vec<Choice> {
        Difficulty::ALL
            .iter()
            .map(|d| Choice::new(d.as_i32().to_string(), d.label()))
            .collect()
    }
}

fn clean_difficulty(raw: Option<&str>) -> Result<Difficulty, String> {
    let value = raw.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(REQUIRED.to_string());
    }

    value
        .parse::<i32>()
        .ok()
        .and_then(|n| Difficulty::try_from(n).ok())
        .ok_or_else(|| invalid_choice(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> Vec<(&'static str, String)> {
        vec![
            ("title", "Test Recipe".to_string()),
            ("description", "A test recipe description".to_string()),
            ("difficulty", "1".to_string()),
            ("time", "45".to_string()),
        ]
    }

    fn form_data(input: Vec<(&'static str, String)>) -> FormData {
        FormData::new(input.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    fn with(field: &'static str, value: &str) -> FormData {
        let mut input = valid_input();
        input.retain(|(k, _)| *k != field);
        input.push((field, value.to_string()));
        form_data(input)
    }

    #[test]
    fn test_valid_recipe_form() {
        let cleaned = RecipeForm::clean(&form_data(valid_input())).unwrap();
        assert_eq!(cleaned.title, "Test Recipe");
        assert_eq!(cleaned.description, "A test recipe description");
        assert_eq!(cleaned.difficulty, Difficulty::Easy);
        assert_eq!(cleaned.image, None);
        assert_eq!(cleaned.time, 45);
    }

    #[test]
    fn test_title_is_required() {
        let errors = RecipeForm::clean(&with("title", "")).unwrap_err();
        assert_eq!(errors.get("title"), [REQUIRED]);
    }

    #[test]
    fn test_title_length_bound() {
        assert!(RecipeForm::clean(&with("title", &"x".repeat(100))).is_ok());

        let errors = RecipeForm::clean(&with("title", &"x".repeat(101))).unwrap_err();
        assert_eq!(
            errors.get("title"),
            ["Ensure this value has at most 100 characters (it has 101)."]
        );
    }

    #[test]
    fn test_description_can_be_blank() {
        let cleaned = RecipeForm::clean(&with("description", "")).unwrap();
        assert_eq!(cleaned.description, "");
    }

    #[test]
    fn test_difficulty_choices() {
        for (raw, expected) in [
            ("1", Difficulty::Easy),
            ("2", Difficulty::Medium),
            ("3", Difficulty::Hard),
        ] {
            assert_eq!(
                RecipeForm::clean(&with("difficulty", raw)).unwrap().difficulty,
                expected
            );
        }
    }

    #[test]
    fn test_difficulty_is_required_and_bounded() {
        let errors = RecipeForm::clean(&with("difficulty", "")).unwrap_err();
        assert_eq!(errors.get("difficulty"), [REQUIRED]);

        let errors = RecipeForm::clean(&with("difficulty", "4")).unwrap_err();
        assert_eq!(
            errors.get("difficulty"),
            ["Select a valid choice. 4 is not one of the available choices."]
        );

        let errors = RecipeForm::clean(&with("difficulty", "hard")).unwrap_err();
        assert!(errors.has("difficulty"));
    }

    #[test]
    fn test_time_is_required_integer() {
        let errors = RecipeForm::clean(&with("time", "")).unwrap_err();
        assert_eq!(errors.get("time"), [REQUIRED]);

        let errors = RecipeForm::clean(&with("time", "half an hour")).unwrap_err();
        assert_eq!(errors.get("time"), ["Enter a whole number."]);

        assert_eq!(RecipeForm::clean(&with("time", "0")).unwrap().time, 0);
    }

    #[test]
    fn test_image_reference_is_optional() {
        let cleaned = RecipeForm::clean(&with("image", "recipe/images/rice.jpg")).unwrap();
        assert_eq!(cleaned.image.as_deref(), Some("recipe/images/rice.jpg"));
    }

    #[test]
    fn test_reports_every_invalid_field() {
        let data = FormData::from([("title", ""), ("difficulty", "9"), ("time", "x")]);
        let errors = RecipeForm::clean(&data).unwrap_err();
        assert!(errors.has("title"));
        assert!(errors.has("difficulty"));
        assert!(errors.has("time"));
        assert!(!errors.has("description"));
    }

    #[test]
    fn test_initial_values() {
        let initial = RecipeForm::initial();
        assert_eq!(initial.data["difficulty"], "1");
        assert_eq!(initial.data["time"], "30");
        assert!(initial.errors.is_empty());
        assert_eq!(RecipeForm::difficulty_choices().len(), 3);
    }
}
