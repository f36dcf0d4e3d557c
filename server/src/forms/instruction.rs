use super::fields::{CharField, IntegerField};
use super::{field_key, FormData, FormErrors, RowForm};

pub const DESCRIPTION_MAX_LENGTH: usize = 500;
pub const IMAGE_MAX_LENGTH: usize = 100;

const STEP: IntegerField = IntegerField::required();
const DESCRIPTION: CharField = CharField::required(DESCRIPTION_MAX_LENGTH);
const IMAGE: CharField = CharField::optional(Some(IMAGE_MAX_LENGTH));

#[derive(Debug, Clone, PartialEq)]
pub struct InstructionFields {
    pub step: i32,
    pub description: String,
    pub image: Option<String>,
}

pub struct InstructionForm;

impl RowForm for InstructionForm {
    type Cleaned = InstructionFields;

    const FIELDS: &'static [&'static str] = &["step", "description", "image"];
    const UNIQUE_FIELD: &'static str = "step";
    const STORAGE_CONFLICT: &'static str = "Instruction with this Recipe and Step already exists.";

    fn clean(data: &FormData, prefix: Option<&str>) -> Result<InstructionFields, FormErrors> {
        let mut errors = FormErrors::default();

        let step = errors.check("step", STEP.clean(data.get(&field_key(prefix, "step"))));
        let description = errors.check(
            "description",
            DESCRIPTION.clean(data.get(&field_key(prefix, "description"))),
        );
        let image = errors.check("image", IMAGE.clean(data.get(&field_key(prefix, "image"))));

        match (step, description, image) {
            (Some(Some(step)), Some(description), Some(image)) => Ok(InstructionFields {
                step,
                description,
                image: Some(image).filter(|i| !i.is_empty()),
            }),
            _ => Err(errors),
        }
    }

    fn unique_value(cleaned: &InstructionFields) -> String {
        cleaned.step.to_string()
    }
}
