//! Per-type editing rules for cards, carousel items and about-us items

use serde::de::DeserializeOwned;

use crate::backend::{ClientError, FormPayload};
use crate::models::{AboutUsItem, Card, CarouselItem, ComponentKind, Module, PageOwned, PageRef};

/// A content record that can be drafted and written back as a form.
pub trait EditableContent: Clone + DeserializeOwned + PageOwned + Send + Sync + 'static {
    const COMPONENT: ComponentKind;

    /// Empty draft owned by `page`
    fn blank(page: &PageRef) -> Self;

    /// Persisted id, if the record exists remotely
    fn id(&self) -> Option<i64>;

    /// Editable text field by its form name
    fn field_mut(&mut self, field: &str) -> Option<&mut String>;

    /// Append this record's text fields to `form`
    fn write_fields(&self, page: &PageRef, form: FormPayload) -> Result<FormPayload, ClientError>;

    /// Reason the draft cannot be saved, if any
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    fn modules_mut(&mut self) -> Option<&mut Vec<Module>> {
        None
    }
}

impl EditableContent for Card {
    const COMPONENT: ComponentKind = ComponentKind::Cards;

    fn blank(page: &PageRef) -> Self {
        Self {
            page: Some(page.clone()),
            ..Self::default()
        }
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn field_mut(&mut self, field: &str) -> Option<&mut String> {
        match field {
            "title" => Some(&mut self.title),
            "description" => Some(&mut self.description),
            _ => None,
        }
    }

    fn write_fields(&self, page: &PageRef, form: FormPayload) -> Result<FormPayload, ClientError> {
        Ok(form
            .text("page", page.to_string())
            .text("title", &self.title)
            .text("description", &self.description))
    }
}

impl EditableContent for CarouselItem {
    const COMPONENT: ComponentKind = ComponentKind::Carousel;

    fn blank(page: &PageRef) -> Self {
        Self {
            page: Some(page.clone()),
            ..Self::default()
        }
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn field_mut(&mut self, field: &str) -> Option<&mut String> {
        match field {
            "title" => Some(&mut self.title),
            "sub_title" | "subtitle" => Some(&mut self.sub_title),
            "description" => Some(&mut self.description),
            _ => None,
        }
    }

    fn write_fields(&self, page: &PageRef, form: FormPayload) -> Result<FormPayload, ClientError> {
        Ok(form
            .text("page", page.to_string())
            .text("title", &self.title)
            .text("sub_title", &self.sub_title)
            .text("description", &self.description))
    }

    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title is required".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("description is required".to_string());
        }
        Ok(())
    }
}

impl EditableContent for AboutUsItem {
    const COMPONENT: ComponentKind = ComponentKind::AboutUs;

    fn blank(page: &PageRef) -> Self {
        Self {
            page: Some(page.clone()),
            ..Self::default()
        }
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn field_mut(&mut self, field: &str) -> Option<&mut String> {
        match field {
            "title" => Some(&mut self.title),
            "description" => Some(&mut self.description),
            _ => None,
        }
    }

    fn write_fields(&self, page: &PageRef, form: FormPayload) -> Result<FormPayload, ClientError> {
        let form = form
            .text("page", page.to_string())
            .text("title", &self.title)
            .text("description", &self.description);
        if self.module.is_empty() {
            return Ok(form);
        }
        Ok(form.text("module", serde_json::to_string(&self.module)?))
    }

    fn modules_mut(&mut self) -> Option<&mut Vec<Module>> {
        Some(&mut self.module)
    }
}
