//! Editable line-item lists with derived totals.
//!
//! A [`FormSession`] backs the meal, workout and template forms. It owns its item
//! list exclusively, keeps it non-empty, and recomputes totals on demand so the
//! summary shown next to the form can never drift from the rows being edited.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::aggregate::Totals;
use crate::models::{
    Exercise, FoodItem, MealDraft, MealType, Metric, TemplateDraft, TemplateExercise,
    WorkoutDraft,
};

#[derive(Error, Debug, PartialEq)]
pub enum FormError {
    #[error("No item with key {0} in this form")]
    UnknownItem(ItemKey),

    #[error("Form is already editing record {0}")]
    AlreadyEditing(Uuid),

    #[error("Field '{field}' {message}")]
    Validation { field: String, message: String },

    #[error("{0} has no field '{1}'")]
    UnsupportedField(&'static str, Metric),
}

impl FormError {
    fn required(field: &str) -> Self {
        FormError::Validation {
            field: field.to_string(),
            message: "is required".to_string(),
        }
    }
}

/// A row type editable inside a [`FormSession`]. `Default` is the blank row.
pub trait LineItem: Clone + Default {
    const KIND: &'static str;

    /// Numeric fields this row carries, summed by [`FormSession::totals`].
    const METRICS: &'static [Metric];

    fn name(&self) -> &str;

    fn set_name(&mut self, name: String);

    fn metric(&self, metric: Metric) -> f64;

    fn set_metric(&mut self, metric: Metric, value: f64);
}

impl LineItem for FoodItem {
    const KIND: &'static str = "food item";
    const METRICS: &'static [Metric] = &Metric::NUTRITION;

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Calories => self.calories,
            Metric::Protein => self.protein,
            Metric::Carbs => self.carbs,
            Metric::Fat => self.fat,
            _ => 0.0,
        }
    }

    fn set_metric(&mut self, metric: Metric, value: f64) {
        match metric {
            Metric::Calories => self.calories = value,
            Metric::Protein => self.protein = value,
            Metric::Carbs => self.carbs = value,
            Metric::Fat => self.fat = value,
            _ => {}
        }
    }
}

impl LineItem for Exercise {
    const KIND: &'static str = "exercise";
    const METRICS: &'static [Metric] = &Metric::EXERCISE;

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Sets => f64::from(self.sets),
            Metric::Reps => f64::from(self.reps),
            Metric::Weight => self.weight.unwrap_or(0.0),
            _ => 0.0,
        }
    }

    fn set_metric(&mut self, metric: Metric, value: f64) {
        match metric {
            Metric::Sets => self.sets = whole(value),
            Metric::Reps => self.reps = whole(value),
            Metric::Weight => self.weight = Some(value),
            _ => {}
        }
    }
}

impl LineItem for TemplateExercise {
    const KIND: &'static str = "template exercise";
    const METRICS: &'static [Metric] = &[Metric::Sets];

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Sets => f64::from(self.sets),
            _ => 0.0,
        }
    }

    fn set_metric(&mut self, metric: Metric, value: f64) {
        if metric == Metric::Sets {
            self.sets = whole(value);
        }
    }
}

fn whole(value: f64) -> u32 {
    value.max(0.0).round().min(f64::from(u32::MAX)) as u32
}

/// Coerce form input to a number. Blank, unparsable and non-finite input become 0.
pub fn coerce_number(value: &str) -> f64 {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => {
            tracing::debug!("Clamping non-numeric input {:?} to 0", value);
            0.0
        }
    }
}

/// Stable identity of a row within one session. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey(u64);

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    Name,
    Metric(Metric),
}

impl FromStr for ItemField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("name") {
            Ok(ItemField::Name)
        } else {
            s.parse().map(ItemField::Metric)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    New,
    Existing(Uuid),
}

#[derive(Debug, Clone)]
pub struct Keyed<T> {
    pub key: ItemKey,
    pub item: T,
}

/// What the caller should send to the backend when the form is saved.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveRequest<D> {
    Create(D),
    Update { id: Uuid, draft: D },
}

impl<D> SaveRequest<D> {
    pub fn draft(&self) -> &D {
        match self {
            SaveRequest::Create(draft) => draft,
            SaveRequest::Update { draft, .. } => draft,
        }
    }
}

/// Record-level fields entered alongside the rows of a form.
pub trait SaveMetadata<T: LineItem> {
    type Draft;

    fn validate(&self) -> Result<(), FormError>;

    /// `items` has blank-named rows removed; `totals` was computed before removal.
    fn into_draft(self, items: Vec<T>, totals: &Totals) -> Self::Draft;
}

#[derive(Debug, Clone)]
pub struct MealMetadata {
    pub name: String,
    pub meal_type: MealType,
    pub consumed_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl SaveMetadata<FoodItem> for MealMetadata {
    type Draft = MealDraft;

    fn validate(&self) -> Result<(), FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::required("name"));
        }
        Ok(())
    }

    fn into_draft(self, items: Vec<FoodItem>, totals: &Totals) -> MealDraft {
        MealDraft {
            name: self.name.trim().to_string(),
            meal_type: self.meal_type,
            calories: totals.sum(Metric::Calories),
            protein: totals.sum(Metric::Protein),
            carbs: totals.sum(Metric::Carbs),
            fat: totals.sum(Metric::Fat),
            notes: self.notes,
            items,
            consumed_at: self.consumed_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkoutMetadata {
    pub name: String,
    pub duration: u32,
    pub completed_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl SaveMetadata<Exercise> for WorkoutMetadata {
    type Draft = WorkoutDraft;

    fn validate(&self) -> Result<(), FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::required("name"));
        }
        Ok(())
    }

    fn into_draft(self, items: Vec<Exercise>, _totals: &Totals) -> WorkoutDraft {
        WorkoutDraft {
            name: self.name.trim().to_string(),
            duration: self.duration,
            notes: self.notes,
            exercises: items,
            completed_at: self.completed_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TemplateMetadata {
    pub name: String,
}

impl SaveMetadata<TemplateExercise> for TemplateMetadata {
    type Draft = TemplateDraft;

    fn validate(&self) -> Result<(), FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::required("name"));
        }
        Ok(())
    }

    fn into_draft(self, items: Vec<TemplateExercise>, _totals: &Totals) -> TemplateDraft {
        TemplateDraft {
            name: self.name.trim().to_string(),
            exercises: items,
        }
    }
}

/// An open form: the mode plus its editable, never-empty list of rows.
#[derive(Debug, Clone)]
pub struct FormSession<T> {
    mode: FormMode,
    items: Vec<Keyed<T>>,
    next_key: u64,
}

impl<T: LineItem> Default for FormSession<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: LineItem> FormSession<T> {
    /// A fresh session in [`FormMode::New`] holding one blank row.
    pub fn new() -> Self {
        let mut session = Self {
            mode: FormMode::New,
            items: Vec::new(),
            next_key: 0,
        };
        session.add_item();
        session
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn items(&self) -> &[Keyed<T>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Bind the session to a persisted record and replace the rows with its items.
    pub fn load_for_edit<I>(&mut self, id: Uuid, items: I) -> Result<(), FormError>
    where
        I: IntoIterator<Item = T>,
    {
        if let FormMode::Existing(current) = self.mode {
            return Err(FormError::AlreadyEditing(current));
        }

        self.mode = FormMode::Existing(id);
        self.items.clear();
        for item in items {
            self.push_item(item);
        }
        if self.items.is_empty() {
            self.add_item();
        }
        Ok(())
    }

    /// Append a blank row.
    pub fn add_item(&mut self) -> ItemKey {
        self.push_item(T::default())
    }

    /// Append a prefilled row.
    pub fn push_item(&mut self, item: T) -> ItemKey {
        let key = ItemKey(self.next_key);
        self.next_key += 1;
        self.items.push(Keyed { key, item });
        key
    }

    /// Remove a row. Removing the last row leaves a single fresh blank row.
    pub fn remove_item(&mut self, key: ItemKey) -> Result<(), FormError> {
        let index = self.index_of(key)?;
        self.items.remove(index);
        if self.items.is_empty() {
            self.add_item();
        }
        Ok(())
    }

    pub fn update_item(
        &mut self,
        key: ItemKey,
        field: ItemField,
        value: &str,
    ) -> Result<(), FormError> {
        if let ItemField::Metric(metric) = field {
            if !T::METRICS.contains(&metric) {
                return Err(FormError::UnsupportedField(T::KIND, metric));
            }
        }

        let index = self.index_of(key)?;
        let item = &mut self.items[index].item;
        match field {
            ItemField::Name => item.set_name(value.to_string()),
            ItemField::Metric(metric) => item.set_metric(metric, coerce_number(value)),
        }
        Ok(())
    }

    /// Sum of every metric over every row, blank-named rows included.
    pub fn totals(&self) -> Totals {
        let mut totals = Totals::zeroed(T::METRICS);
        for keyed in &self.items {
            totals.count += 1;
            for metric in T::METRICS {
                totals.add(*metric, keyed.item.metric(*metric));
            }
        }
        totals
    }

    /// Rows whose name is not blank, in list order.
    pub fn named_items(&self) -> Vec<T> {
        self.items
            .iter()
            .filter(|k| !k.item.name().trim().is_empty())
            .map(|k| k.item.clone())
            .collect()
    }

    /// Build the create or update request for the current state.
    pub fn save<M>(&self, metadata: M) -> Result<SaveRequest<M::Draft>, FormError>
    where
        M: SaveMetadata<T>,
    {
        metadata.validate()?;

        let totals = self.totals();
        let draft = metadata.into_draft(self.named_items(), &totals);

        Ok(match self.mode {
            FormMode::New => SaveRequest::Create(draft),
            FormMode::Existing(id) => SaveRequest::Update { id, draft },
        })
    }

    fn index_of(&self, key: ItemKey) -> Result<usize, FormError> {
        self.items
            .iter()
            .position(|k| k.key == key)
            .ok_or(FormError::UnknownItem(key))
    }
}
