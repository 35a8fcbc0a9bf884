//! Create/edit draft for a single product.

use std::{fmt, str::FromStr};

use shared::{
    domain::{NewProduct, Product, ProductId},
    error::FieldError,
};
use thiserror::Error;
use tracing::info;

use crate::{ClientError, ProductApi};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    Price,
    Description,
}

impl FormField {
    pub const ALL: [FormField; 3] = [FormField::Name, FormField::Price, FormField::Description];

    pub fn as_str(self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Price => "price",
            FormField::Description => "description",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormField {
    type Err = FormError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(FormField::Name),
            "price" => Ok(FormField::Price),
            "description" => Ok(FormField::Description),
            other => Err(FormError::UnknownField(other.to_string())),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormError {
    #[error("no product form is open")]
    NotOpen,
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("price '{0}' is not a number")]
    InvalidPrice(String),
    #[error("name is required")]
    MissingName,
    #[error("price is required")]
    MissingPrice,
    #[error("price must not be negative")]
    NegativePrice,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] FormError),
    #[error("failed to save product: {0}")]
    Rejected(#[from] ClientError),
}

/// Field values typed so far. `None` means the field holds no value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductDraft {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
}

impl ProductDraft {
    fn from_product(product: &Product) -> Self {
        Self {
            name: Some(product.name.clone()),
            price: Some(product.price),
            description: product.description.clone(),
        }
    }

    /// Draft fields win; anything the draft lacks keeps its persisted value.
    pub fn merge_onto(&self, persisted: &Product) -> Product {
        Product {
            id: persisted.id,
            name: self
                .name
                .clone()
                .unwrap_or_else(|| persisted.name.clone()),
            price: self.price.unwrap_or(persisted.price),
            description: self
                .description
                .clone()
                .or_else(|| persisted.description.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    Create,
    Edit(Product),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Create(NewProduct),
    Update { id: ProductId, product: Product },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductForm {
    mode: FormMode,
    draft: ProductDraft,
    field_errors: Vec<FieldError>,
}

impl ProductForm {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            draft: ProductDraft::default(),
            field_errors: Vec::new(),
        }
    }

    pub fn edit(product: Product) -> Self {
        Self {
            draft: ProductDraft::from_product(&product),
            mode: FormMode::Edit(product),
            field_errors: Vec::new(),
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn draft(&self) -> &ProductDraft {
        &self.draft
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::Edit(_))
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Create Product",
            FormMode::Edit(_) => "Edit Product",
        }
    }

    /// Errors the server reported against individual fields on the last submit.
    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    pub fn set_field_errors(&mut self, errors: Vec<FieldError>) {
        self.field_errors = errors;
    }

    /// Text shown in the input for `field`.
    pub fn field_text(&self, field: FormField) -> String {
        match field {
            FormField::Name => self.draft.name.clone().unwrap_or_default(),
            FormField::Price => self.draft.price.map(|p| p.to_string()).unwrap_or_default(),
            FormField::Description => self.draft.description.clone().unwrap_or_default(),
        }
    }

    pub fn set_field(&mut self, field: FormField, value: &str) -> Result<(), FormError> {
        match field {
            FormField::Name => self.draft.name = Some(value.to_string()),
            FormField::Price => self.draft.price = parse_price(value)?,
            FormField::Description => self.draft.description = Some(value.to_string()),
        }
        self.field_errors
            .retain(|err| !err.field.eq_ignore_ascii_case(field.as_str()));
        Ok(())
    }

    pub fn set_named_field(&mut self, name: &str, value: &str) -> Result<(), FormError> {
        let field = name.parse::<FormField>()?;
        self.set_field(field, value)
    }

    /// Checks required fields and builds the request the form would send.
    pub fn submission(&self) -> Result<Submission, FormError> {
        match &self.mode {
            FormMode::Create => {
                let (name, price) = required_fields(self.draft.name.as_deref(), self.draft.price)?;
                Ok(Submission::Create(NewProduct {
                    name,
                    price,
                    description: self.draft.description.clone(),
                }))
            }
            FormMode::Edit(persisted) => {
                let merged = self.draft.merge_onto(persisted);
                required_fields(self.draft.name.as_deref(), self.draft.price)?;
                Ok(Submission::Update {
                    id: persisted.id,
                    product: merged,
                })
            }
        }
    }

    pub async fn submit(&self, api: &dyn ProductApi) -> Result<Product, SubmitError> {
        match self.submission()? {
            Submission::Create(draft) => {
                let created = api.create(&draft).await?;
                info!(id = %created.id, "product created");
                Ok(created)
            }
            Submission::Update { id, product } => {
                let updated = api.update(id, &product).await?;
                info!(%id, "product updated");
                Ok(updated)
            }
        }
    }
}

fn parse_price(raw: &str) -> Result<Option<f64>, FormError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(FormError::InvalidPrice(trimmed.to_string())),
    }
}

fn required_fields(name: Option<&str>, price: Option<f64>) -> Result<(String, f64), FormError> {
    let name = name
        .filter(|name| !name.trim().is_empty())
        .ok_or(FormError::MissingName)?;
    let price = price.ok_or(FormError::MissingPrice)?;
    if price < 0.0 {
        return Err(FormError::NegativePrice);
    }
    Ok((name.to_string(), price))
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
