//! Query and locator primitives for on-screen element selection.
//!
//! A [`Query`] is a pure value: an ordered list of refinement steps that the
//! automation boundary evaluates against the live view hierarchy. A
//! [`Locator`] names a function from a fresh query to a refined one, so
//! scenario code talks about "the add-to-basket button" rather than marker
//! strings.
//!
//! # Design Philosophy
//!
//! - **No caching**: a query result describes the screen at the moment it was
//!   taken. Re-query after every state-changing action.
//! - **Cardinality is the caller's business**: a locator matches zero or more
//!   elements; scenarios assert the count they expect.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A point in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Screen rectangle of an element
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Get the center point
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if a point is inside this rectangle
    #[must_use]
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Check whether two rectangles overlap
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// One matched on-screen element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Identifier (resource id / accessibility id), may be empty
    pub id: String,
    /// UI class name, e.g. `TextView`
    pub class: String,
    /// Displayed text, empty for containers
    pub text: String,
    /// Screen rectangle
    pub rect: Rect,
    /// Whether the element currently lies inside the viewport
    pub visible: bool,
}

impl Element {
    /// Create a visible element with an empty rectangle
    #[must_use]
    pub fn new(id: impl Into<String>, class: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            class: class.into(),
            text: text.into(),
            rect: Rect::default(),
            visible: true,
        }
    }

    /// Set the rectangle
    #[must_use]
    pub const fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    /// Set visibility
    #[must_use]
    pub const fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// `marked` semantics: identifier or displayed text equals `marker`
    #[must_use]
    pub fn is_marked(&self, marker: &str) -> bool {
        self.id == marker || self.text == marker
    }
}

/// A single refinement step of a [`Query`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryStep {
    /// Identifier or text equals the marker
    Marked(String),
    /// Displayed text equals the value
    Text(String),
    /// Class name equals the value
    Class(String),
    /// A `Button` marked with the value
    Button(String),
    /// Descendants of the current matches with the given class
    Descendant(String),
    /// Keep only the n-th match
    Index(usize),
}

impl fmt::Display for QueryStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Marked(m) => write!(f, ".marked({m:?})"),
            Self::Text(t) => write!(f, ".text({t:?})"),
            Self::Class(c) => write!(f, ".class({c:?})"),
            Self::Button(b) => write!(f, ".button({b:?})"),
            Self::Descendant(c) => write!(f, ".descendant({c:?})"),
            Self::Index(i) => write!(f, ".index({i})"),
        }
    }
}

/// Element query expression, evaluated by the automation boundary
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Query {
    steps: Vec<QueryStep>,
}

impl Query {
    /// Match every element on screen
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    fn push(mut self, step: QueryStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Keep elements whose id or text equals `marker`
    #[must_use]
    pub fn marked(self, marker: impl Into<String>) -> Self {
        self.push(QueryStep::Marked(marker.into()))
    }

    /// Keep elements whose text equals `text`
    #[must_use]
    pub fn text(self, text: impl Into<String>) -> Self {
        self.push(QueryStep::Text(text.into()))
    }

    /// Keep elements of the given class
    #[must_use]
    pub fn class(self, class: impl Into<String>) -> Self {
        self.push(QueryStep::Class(class.into()))
    }

    /// Keep buttons marked `marker`
    #[must_use]
    pub fn button(self, marker: impl Into<String>) -> Self {
        self.push(QueryStep::Button(marker.into()))
    }

    /// Move to descendants of the current matches with the given class
    #[must_use]
    pub fn descendant(self, class: impl Into<String>) -> Self {
        self.push(QueryStep::Descendant(class.into()))
    }

    /// Keep only the n-th match
    #[must_use]
    pub fn index(self, index: usize) -> Self {
        self.push(QueryStep::Index(index))
    }

    /// Refinement steps in order
    #[must_use]
    pub fn steps(&self) -> &[QueryStep] {
        &self.steps
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("all()")?;
        for step in &self.steps {
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

type BuildFn = Arc<dyn Fn(Query) -> Query + Send + Sync>;

/// A named, side-effect free mapping from a query builder to a refined query.
#[derive(Clone)]
pub struct Locator {
    name: String,
    build: BuildFn,
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locator")
            .field("name", &self.name)
            .field("query", &self.query().to_string())
            .finish()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.query())
    }
}

impl Locator {
    /// Create a locator from a builder function
    pub fn new<F>(name: impl Into<String>, build: F) -> Self
    where
        F: Fn(Query) -> Query + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            build: Arc::new(build),
        }
    }

    /// Locator for elements marked `marker`
    #[must_use]
    pub fn marked(marker: impl Into<String>) -> Self {
        let marker = marker.into();
        Self::new(format!("marked {marker}"), move |q| q.marked(marker.clone()))
    }

    /// Locator for elements displaying exactly `text`
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(format!("text {text}"), move |q| q.text(text.clone()))
    }

    /// Locator for buttons marked `marker`
    #[must_use]
    pub fn button(marker: impl Into<String>) -> Self {
        let marker = marker.into();
        Self::new(format!("button {marker}"), move |q| q.button(marker.clone()))
    }

    /// Locator for elements of a UI class
    #[must_use]
    pub fn class(class: impl Into<String>) -> Self {
        let class = class.into();
        Self::new(format!("class {class}"), move |q| q.class(class.clone()))
    }

    /// Refine this locator further (e.g. descendant-of)
    #[must_use]
    pub fn then<F>(&self, name: impl Into<String>, refine: F) -> Self
    where
        F: Fn(Query) -> Query + Send + Sync + 'static,
    {
        let base = Arc::clone(&self.build);
        Self {
            name: name.into(),
            build: Arc::new(move |q| refine(base(q))),
        }
    }

    /// Locator name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the builder to a fresh query
    #[must_use]
    pub fn query(&self) -> Query {
        (self.build)(Query::all())
    }
}
