use super::fields::{CharField, ChoiceField, IntegerField};
use super::{field_key, Choice, FormData, FormErrors, RowForm};

pub const NAME_MAX_LENGTH: usize = 100;

/// Units offered by the ingredient form. Storage accepts any text up to 50 characters.
pub const UNIT_CHOICES: &[(&str, &str)] = &[
    ("tsp", "tsp"),
    ("tbsp", "tbsp"),
    ("cup", "cup"),
    ("cups", "cups"),
    ("ml", "ml"),
    ("l", "l"),
    ("g", "g"),
    ("kg", "kg"),
    ("oz", "oz"),
    ("lb", "lb"),
    ("lbs", "lbs"),
    ("piece", "piece"),
    ("pieces", "pieces"),
    ("pinch", "pinch"),
    ("dash", "dash"),
    ("clove", "clove"),
];

const NAME: CharField = CharField::required(NAME_MAX_LENGTH);
const QUANTITY: IntegerField = IntegerField::optional();
const UNIT: ChoiceField = ChoiceField {
    required: false,
    choices: UNIT_CHOICES,
};

#[derive(Debug, Clone, PartialEq)]
pub struct IngredientFields {
    pub name: String,
    pub quantity: Option<i32>,
    pub unit: String,
}

pub struct IngredientForm;

impl IngredientForm {
    /// Unit choices as shown in the select box, blank option first.
    pub fn unit_choices() -> Vec<Choice> {
        std::iter::once(Choice::new("", "Select unit"))
            .chain(UNIT_CHOICES.iter().map(|(v, l)| Choice::new(*v, *l)))
            .collect()
    }
}

impl RowForm for IngredientForm {
    type Cleaned = IngredientFields;

    const FIELDS: &'static [&'static str] = &["name", "quantity", "unit"];
    const UNIQUE_FIELD: &'static str = "name";
    const STORAGE_CONFLICT: &'static str = "Ingredient with this Recipe and Name already exists.";

    fn clean(data: &FormData, prefix: Option<&str>) -> Result<IngredientFields, FormErrors> {
        let mut errors = FormErrors::default();

        let name = errors.check("name", NAME.clean(data.get(&field_key(prefix, "name"))));
        let quantity = errors.check(
            "quantity",
            QUANTITY.clean(data.get(&field_key(prefix, "quantity"))),
        );
        let unit = errors.check("unit", UNIT.clean(data.get(&field_key(prefix, "unit"))));

        match (name, quantity, unit) {
            (Some(name), Some(quantity), Some(unit)) => Ok(IngredientFields {
                name,
                quantity,
                unit,
            }),
            _ => Err(errors),
        }
    }

    fn unique_value(cleaned: &IngredientFields) -> String {
        cleaned.name.clone()
    }
}
